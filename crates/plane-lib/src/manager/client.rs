//! Collector clients
//!
//! The manager reaches the per-cluster collectors over mutual TLS. The
//! connector builds a channel from the cluster's inventory record: the
//! collector is addressed as `<prefix>.<hostname>:<port>` and the TLS
//! session is verified against the configured CA, presenting a client
//! identity when one is configured.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint, Identity};
use tracing::{debug, warn};

use crate::error::PlaneError;
use crate::proto::monitoring::v1 as pb;
use crate::proto::MetricsCollectorClient;

/// Deadline applied to every collector call.
pub const COLLECTOR_DEADLINE: Duration = Duration::from_secs(30);

/// A connected per-cluster collector.
#[async_trait]
pub trait CollectorClient: Send + Sync {
    async fn get_cluster_summary(
        &self,
        request: pb::ClusterSummaryRequest,
    ) -> Result<pb::ClusterSummary, PlaneError>;

    async fn get_cluster_stats(
        &self,
        request: pb::ClusterStatsRequest,
    ) -> Result<pb::ClusterStats, PlaneError>;

    async fn query(&self, request: pb::QueryRequest) -> Result<pb::QueryResponse, PlaneError>;

    async fn get_container_stats(&self) -> Result<pb::ContainerStatsResponse, PlaneError>;
}

/// Builds collector clients from cluster inventory records.
#[async_trait]
pub trait CollectorConnector: Send + Sync {
    async fn connect(&self, cluster: &pb::Cluster) -> Result<Arc<dyn CollectorClient>, PlaneError>;
}

/// Connection settings shared by every cluster.
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Host label prepended to the cluster hostname.
    pub collector_prefix: String,
    /// Port the collectors listen on.
    pub collector_port: u16,
    /// CA bundle used to verify the collector certificate. When absent the
    /// system roots apply.
    pub ca_cert_path: Option<PathBuf>,
    /// Client certificate and key for mutual TLS. Both must be set for an
    /// identity to be presented.
    pub client_cert_path: Option<PathBuf>,
    pub client_key_path: Option<PathBuf>,
    /// Development switch: connect in plaintext instead of TLS. tonic offers
    /// no verification-free TLS mode, so skipping validation downgrades the
    /// transport entirely.
    pub skip_server_cert_validation: bool,
}

pub struct TlsCollectorConnector {
    config: ConnectorConfig,
}

impl TlsCollectorConnector {
    pub fn new(config: ConnectorConfig) -> Self {
        TlsCollectorConnector { config }
    }

    fn authority(&self, cluster: &pb::Cluster) -> String {
        format!("{}.{}", self.config.collector_prefix, cluster.hostname)
    }

    async fn tls_config(&self, authority: &str) -> Result<ClientTlsConfig, PlaneError> {
        let mut tls = ClientTlsConfig::new().domain_name(authority.to_string());

        if let Some(path) = &self.config.ca_cert_path {
            let pem = tokio::fs::read(path).await.map_err(|e| {
                PlaneError::internal(format!("cannot read CA certificate {:?}: {}", path, e))
            })?;
            tls = tls.ca_certificate(Certificate::from_pem(pem));
        }

        if let (Some(cert_path), Some(key_path)) =
            (&self.config.client_cert_path, &self.config.client_key_path)
        {
            let cert = tokio::fs::read(cert_path).await.map_err(|e| {
                PlaneError::internal(format!(
                    "cannot read client certificate {:?}: {}",
                    cert_path, e
                ))
            })?;
            let key = tokio::fs::read(key_path).await.map_err(|e| {
                PlaneError::internal(format!("cannot read client key {:?}: {}", key_path, e))
            })?;
            tls = tls.identity(Identity::from_pem(cert, key));
        }

        Ok(tls)
    }

    async fn channel(&self, cluster: &pb::Cluster) -> Result<Channel, PlaneError> {
        let authority = self.authority(cluster);
        let scheme = if self.config.skip_server_cert_validation {
            warn!(
                cluster_id = %cluster.cluster_id,
                "server certificate validation disabled, using plaintext transport"
            );
            "http"
        } else {
            "https"
        };
        let uri = format!("{}://{}:{}", scheme, authority, self.config.collector_port);
        debug!(cluster_id = %cluster.cluster_id, uri = %uri, "connecting to cluster collector");

        let mut endpoint = Endpoint::from_shared(uri)
            .map_err(|e| {
                PlaneError::invalid_argument(format!("invalid collector address: {}", e))
            })?
            .timeout(COLLECTOR_DEADLINE);

        if !self.config.skip_server_cert_validation {
            let tls = self.tls_config(&authority).await?;
            endpoint = endpoint.tls_config(tls).map_err(|e| {
                PlaneError::internal(format!("invalid collector TLS configuration: {}", e))
            })?;
        }

        Ok(endpoint.connect_lazy())
    }
}

#[async_trait]
impl CollectorConnector for TlsCollectorConnector {
    async fn connect(&self, cluster: &pb::Cluster) -> Result<Arc<dyn CollectorClient>, PlaneError> {
        let channel = self.channel(cluster).await?;
        Ok(Arc::new(GrpcCollectorClient { channel }))
    }
}

/// gRPC collector client over an established channel.
pub struct GrpcCollectorClient {
    channel: Channel,
}

#[async_trait]
impl CollectorClient for GrpcCollectorClient {
    async fn get_cluster_summary(
        &self,
        request: pb::ClusterSummaryRequest,
    ) -> Result<pb::ClusterSummary, PlaneError> {
        let mut client = MetricsCollectorClient::new(self.channel.clone());
        Ok(client.get_cluster_summary(request).await?.into_inner())
    }

    async fn get_cluster_stats(
        &self,
        request: pb::ClusterStatsRequest,
    ) -> Result<pb::ClusterStats, PlaneError> {
        let mut client = MetricsCollectorClient::new(self.channel.clone());
        Ok(client.get_cluster_stats(request).await?.into_inner())
    }

    async fn query(&self, request: pb::QueryRequest) -> Result<pb::QueryResponse, PlaneError> {
        let mut client = MetricsCollectorClient::new(self.channel.clone());
        Ok(client.query(request).await?.into_inner())
    }

    async fn get_container_stats(&self) -> Result<pb::ContainerStatsResponse, PlaneError> {
        let mut client = MetricsCollectorClient::new(self.channel.clone());
        Ok(client
            .get_container_stats(pb::ContainerStatsRequest {})
            .await?
            .into_inner())
    }
}
