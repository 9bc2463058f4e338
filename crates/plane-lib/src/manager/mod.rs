//! Organization manager
//!
//! Front door of the query plane for cluster-scoped operations. Resolves
//! the target cluster through the inventory, dials its collector and
//! forwards the operation, caching the summary and stats responses for a
//! short interval. Also assembles the organization-wide application
//! statistics view by visiting every cluster of the organization.

mod cache;
pub mod client;

pub use cache::{TtlCache, DEFAULT_CACHE_TTL};
pub use client::{
    CollectorClient, CollectorConnector, ConnectorConfig, GrpcCollectorClient,
    TlsCollectorConnector, COLLECTOR_DEADLINE,
};

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::time::timeout;
use tracing::warn;

use crate::error::PlaneError;
use crate::inventory::{ClusterInventory, INVENTORY_DEADLINE};
use crate::proto::monitoring::v1 as pb;
use crate::validator::{self, PlaneIdentity};

/// Bound on concurrent per-cluster collector calls.
const CLUSTER_FANOUT_CONCURRENCY: usize = 8;

pub struct ClusterManager {
    inventory: Arc<dyn ClusterInventory>,
    connector: Arc<dyn CollectorConnector>,
    identity: PlaneIdentity,
    summary_cache: TtlCache<pb::ClusterSummary>,
    stats_cache: TtlCache<pb::ClusterStats>,
}

impl ClusterManager {
    pub fn new(inventory: Arc<dyn ClusterInventory>, connector: Arc<dyn CollectorConnector>) -> Self {
        Self::with_cache_ttl(inventory, connector, DEFAULT_CACHE_TTL)
    }

    pub fn with_cache_ttl(
        inventory: Arc<dyn ClusterInventory>,
        connector: Arc<dyn CollectorConnector>,
        ttl: Duration,
    ) -> Self {
        ClusterManager {
            inventory,
            connector,
            identity: PlaneIdentity::default(),
            summary_cache: TtlCache::new(ttl),
            stats_cache: TtlCache::new(ttl),
        }
    }

    /// Pin the manager to its deployment identity; requests naming another
    /// organization or cluster are rejected.
    pub fn with_identity(mut self, identity: PlaneIdentity) -> Self {
        self.identity = identity;
        self
    }

    fn check_request(&self, organization_id: &str, cluster_id: &str) -> Result<(), PlaneError> {
        validator::validate_cluster_ids(organization_id, cluster_id)?;
        self.identity.check_organization(organization_id)?;
        self.identity.check_cluster(cluster_id)
    }

    /// Resolve the cluster record and dial its collector.
    async fn cluster_client(
        &self,
        organization_id: &str,
        cluster_id: &str,
    ) -> Result<(pb::Cluster, Arc<dyn CollectorClient>), PlaneError> {
        let cluster = match timeout(
            INVENTORY_DEADLINE,
            self.inventory.get_cluster(organization_id, cluster_id),
        )
        .await
        {
            Ok(Ok(cluster)) => cluster,
            Ok(Err(e)) => {
                return Err(PlaneError::unavailable(format!(
                    "unable to retrieve cluster {}: {}",
                    cluster_id, e
                )))
            }
            Err(_) => {
                return Err(PlaneError::unavailable(format!(
                    "unable to retrieve cluster {}: inventory deadline exceeded",
                    cluster_id
                )))
            }
        };
        let client = self.connector.connect(&cluster).await?;
        Ok((cluster, client))
    }

    pub async fn get_cluster_summary(
        &self,
        request: &pb::ClusterSummaryRequest,
    ) -> Result<pb::ClusterSummary, PlaneError> {
        self.check_request(&request.organization_id, &request.cluster_id)?;
        let key = format!(
            "{}|{}|summary|{}",
            request.organization_id, request.cluster_id, request.range_minutes
        );
        if let Some(cached) = self.summary_cache.get(&key) {
            return Ok(cached);
        }

        let (_, client) = self
            .cluster_client(&request.organization_id, &request.cluster_id)
            .await?;
        let summary = client.get_cluster_summary(request.clone()).await?;
        self.summary_cache.put(key, summary.clone());
        Ok(summary)
    }

    pub async fn get_cluster_stats(
        &self,
        request: &pb::ClusterStatsRequest,
    ) -> Result<pb::ClusterStats, PlaneError> {
        self.check_request(&request.organization_id, &request.cluster_id)?;
        let fields: Vec<String> = request.fields.iter().map(|f| f.to_string()).collect();
        let key = format!(
            "{}|{}|stats|{}|{}",
            request.organization_id,
            request.cluster_id,
            request.range_minutes,
            fields.join(",")
        );
        if let Some(cached) = self.stats_cache.get(&key) {
            return Ok(cached);
        }

        let (_, client) = self
            .cluster_client(&request.organization_id, &request.cluster_id)
            .await?;
        let stats = client.get_cluster_stats(request.clone()).await?;
        self.stats_cache.put(key, stats.clone());
        Ok(stats)
    }

    /// Raw queries bypass the cache: their results are backend-shaped and
    /// parameterized by arbitrary query strings.
    pub async fn query(&self, request: &pb::QueryRequest) -> Result<pb::QueryResponse, PlaneError> {
        validator::validate_query_request(request)?;
        self.identity.check_organization(&request.organization_id)?;
        self.identity.check_cluster(&request.cluster_id)?;
        let (_, client) = self
            .cluster_client(&request.organization_id, &request.cluster_id)
            .await?;
        client.query(request.clone()).await
    }

    /// Organization-wide application statistics, one entry per container
    /// across every cluster of the organization. Clusters are visited with a
    /// bounded number of concurrent collector calls; clusters that cannot be
    /// reached are logged and skipped, and CPU usage is normalized with each
    /// cluster's millicore conversion factor.
    pub async fn get_organization_application_stats(
        &self,
        request: &pb::OrganizationApplicationStatsRequest,
    ) -> Result<pb::OrganizationApplicationStatsResponse, PlaneError> {
        validator::validate_organization_id(&request.organization_id)?;
        self.identity.check_organization(&request.organization_id)?;

        let clusters = self
            .inventory
            .list_clusters(&request.organization_id)
            .await
            .map_err(|e| {
                PlaneError::FailedPrecondition(format!(
                    "cannot list clusters of organization {}: {}",
                    request.organization_id, e
                ))
            })?;

        let responses: Vec<(pb::Cluster, Result<pb::ContainerStatsResponse, PlaneError>)> =
            stream::iter(clusters.into_iter().map(|cluster| async move {
                let result = self.container_stats_of(&cluster).await;
                (cluster, result)
            }))
            .buffer_unordered(CLUSTER_FANOUT_CONCURRENCY)
            .collect()
            .await;

        let mut service_instance_stats = Vec::new();
        for (cluster, result) in responses {
            let container_stats = match result {
                Ok(response) => response.container_stats,
                Err(e) => {
                    warn!(
                        cluster_id = %cluster.cluster_id,
                        error = %e,
                        "skipping unreachable cluster in application stats"
                    );
                    continue;
                }
            };

            for stats in container_stats {
                service_instance_stats.push(pb::ServiceInstanceStats {
                    organization_id: request.organization_id.clone(),
                    cpu_millicore: stats.cpu_millicore * cluster.millicores_conversion_factor,
                    memory_byte: stats.memory_byte,
                    storage_byte: stats.storage_byte,
                    ..Default::default()
                });
            }
        }

        Ok(pb::OrganizationApplicationStatsResponse {
            service_instance_stats,
            timestamp: Utc::now().timestamp(),
        })
    }

    async fn container_stats_of(
        &self,
        cluster: &pb::Cluster,
    ) -> Result<pb::ContainerStatsResponse, PlaneError> {
        let client = self.connector.connect(cluster).await?;
        client.get_container_stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockInventory {
        clusters: Vec<pb::Cluster>,
        fail: bool,
    }

    #[async_trait]
    impl ClusterInventory for MockInventory {
        async fn get_cluster(
            &self,
            _organization_id: &str,
            cluster_id: &str,
        ) -> Result<pb::Cluster, PlaneError> {
            if self.fail {
                return Err(PlaneError::internal("inventory down"));
            }
            self.clusters
                .iter()
                .find(|c| c.cluster_id == cluster_id)
                .cloned()
                .ok_or_else(|| PlaneError::not_found("no such cluster"))
        }

        async fn list_clusters(
            &self,
            _organization_id: &str,
        ) -> Result<Vec<pb::Cluster>, PlaneError> {
            if self.fail {
                return Err(PlaneError::internal("inventory down"));
            }
            Ok(self.clusters.clone())
        }
    }

    struct MockCollector {
        calls: AtomicUsize,
        container_stats: Vec<pb::ContainerStats>,
    }

    #[async_trait]
    impl CollectorClient for MockCollector {
        async fn get_cluster_summary(
            &self,
            request: pb::ClusterSummaryRequest,
        ) -> Result<pb::ClusterSummary, PlaneError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(pb::ClusterSummary {
                organization_id: request.organization_id,
                cluster_id: request.cluster_id,
                cpu_millicores: Some(pb::ResourceAmount {
                    total: 4000,
                    available: 1000,
                }),
                ..Default::default()
            })
        }

        async fn get_cluster_stats(
            &self,
            request: pb::ClusterStatsRequest,
        ) -> Result<pb::ClusterStats, PlaneError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(pb::ClusterStats {
                organization_id: request.organization_id,
                cluster_id: request.cluster_id,
                stats: HashMap::new(),
            })
        }

        async fn query(&self, request: pb::QueryRequest) -> Result<pb::QueryResponse, PlaneError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(pb::QueryResponse {
                organization_id: request.organization_id,
                cluster_id: request.cluster_id,
                r#type: request.r#type,
                result: None,
            })
        }

        async fn get_container_stats(&self) -> Result<pb::ContainerStatsResponse, PlaneError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(pb::ContainerStatsResponse {
                container_stats: self.container_stats.clone(),
            })
        }
    }

    struct MockConnector {
        collectors: HashMap<String, Arc<MockCollector>>,
        fail: Vec<String>,
    }

    #[async_trait]
    impl CollectorConnector for MockConnector {
        async fn connect(
            &self,
            cluster: &pb::Cluster,
        ) -> Result<Arc<dyn CollectorClient>, PlaneError> {
            if self.fail.contains(&cluster.cluster_id) {
                return Err(PlaneError::unavailable("cannot dial collector"));
            }
            Ok(self.collectors[&cluster.cluster_id].clone())
        }
    }

    fn cluster(cluster_id: &str, factor: f64) -> pb::Cluster {
        pb::Cluster {
            organization_id: "org-1".to_string(),
            cluster_id: cluster_id.to_string(),
            hostname: format!("{}.example.net", cluster_id),
            millicores_conversion_factor: factor,
        }
    }

    fn collector(container_stats: Vec<pb::ContainerStats>) -> Arc<MockCollector> {
        Arc::new(MockCollector {
            calls: AtomicUsize::new(0),
            container_stats,
        })
    }

    fn manager_with(
        clusters: Vec<pb::Cluster>,
        collectors: HashMap<String, Arc<MockCollector>>,
        fail: Vec<String>,
    ) -> ClusterManager {
        ClusterManager::new(
            Arc::new(MockInventory {
                clusters,
                fail: false,
            }),
            Arc::new(MockConnector { collectors, fail }),
        )
    }

    fn summary_request(cluster_id: &str) -> pb::ClusterSummaryRequest {
        pb::ClusterSummaryRequest {
            organization_id: "org-1".to_string(),
            cluster_id: cluster_id.to_string(),
            range_minutes: 0,
        }
    }

    #[tokio::test]
    async fn summary_is_forwarded_and_cached() {
        let mock = collector(Vec::new());
        let manager = manager_with(
            vec![cluster("cl-1", 1.0)],
            HashMap::from([("cl-1".to_string(), mock.clone())]),
            Vec::new(),
        );

        let first = manager
            .get_cluster_summary(&summary_request("cl-1"))
            .await
            .unwrap();
        assert_eq!(first.cluster_id, "cl-1");
        assert_eq!(
            first.cpu_millicores,
            Some(pb::ResourceAmount {
                total: 4000,
                available: 1000
            })
        );

        let second = manager
            .get_cluster_summary(&summary_request("cl-1"))
            .await
            .unwrap();
        assert_eq!(second, first);
        // Second response came from the cache.
        assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_parameters_bypass_the_cache_entry() {
        let mock = collector(Vec::new());
        let manager = manager_with(
            vec![cluster("cl-1", 1.0)],
            HashMap::from([("cl-1".to_string(), mock.clone())]),
            Vec::new(),
        );

        manager
            .get_cluster_summary(&summary_request("cl-1"))
            .await
            .unwrap();
        manager
            .get_cluster_summary(&pb::ClusterSummaryRequest {
                range_minutes: 10,
                ..summary_request("cl-1")
            })
            .await
            .unwrap();
        assert_eq!(mock.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_identifiers_are_rejected() {
        let manager = manager_with(Vec::new(), HashMap::new(), Vec::new());

        // Rejected before the inventory is consulted, so the error is
        // InvalidArgument rather than Unavailable.
        let err = manager
            .get_cluster_summary(&pb::ClusterSummaryRequest {
                organization_id: String::new(),
                ..summary_request("cl-1")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PlaneError::InvalidArgument(_)));

        let err = manager
            .get_cluster_stats(&pb::ClusterStatsRequest {
                organization_id: "org-1".to_string(),
                cluster_id: String::new(),
                range_minutes: 0,
                fields: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PlaneError::InvalidArgument(_)));

        let err = manager
            .query(&pb::QueryRequest {
                organization_id: "org-1".to_string(),
                cluster_id: "cl-1".to_string(),
                r#type: "PROMETHEUS".to_string(),
                query: String::new(),
                range: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PlaneError::InvalidArgument(_)));

        let err = manager
            .get_organization_application_stats(&pb::OrganizationApplicationStatsRequest {
                organization_id: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PlaneError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn foreign_identity_is_rejected() {
        let mock = collector(Vec::new());
        let manager = manager_with(
            vec![cluster("cl-1", 1.0)],
            HashMap::from([("cl-1".to_string(), mock.clone())]),
            Vec::new(),
        )
        .with_identity(PlaneIdentity {
            organization_id: Some("org-1".to_string()),
            cluster_id: Some("cl-1".to_string()),
        });

        let err = manager
            .get_cluster_summary(&pb::ClusterSummaryRequest {
                organization_id: "org-2".to_string(),
                ..summary_request("cl-1")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PlaneError::InvalidArgument(_)));

        let err = manager
            .get_cluster_summary(&summary_request("cl-2"))
            .await
            .unwrap_err();
        assert!(matches!(err, PlaneError::InvalidArgument(_)));
        assert_eq!(mock.calls.load(Ordering::SeqCst), 0);

        // The owning identity itself still passes.
        assert!(manager.get_cluster_summary(&summary_request("cl-1")).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_cluster_is_unavailable() {
        let manager = manager_with(Vec::new(), HashMap::new(), Vec::new());
        let err = manager
            .get_cluster_summary(&summary_request("ghost"))
            .await
            .unwrap_err();
        match err {
            PlaneError::Unavailable(message) => {
                assert!(message.contains("unable to retrieve cluster"))
            }
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn application_stats_scale_and_skip_failures() {
        let reachable = collector(vec![pb::ContainerStats {
            namespace: "default".to_string(),
            pod: "web-0".to_string(),
            container: "app".to_string(),
            cpu_millicore: 100.0,
            memory_byte: 1024.0,
            storage_byte: 2048.0,
        }]);
        let manager = manager_with(
            vec![cluster("cl-1", 0.5), cluster("cl-2", 1.0)],
            HashMap::from([("cl-1".to_string(), reachable)]),
            vec!["cl-2".to_string()],
        );

        let response = manager
            .get_organization_application_stats(&pb::OrganizationApplicationStatsRequest {
                organization_id: "org-1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.service_instance_stats.len(), 1);
        let stats = &response.service_instance_stats[0];
        assert_eq!(stats.organization_id, "org-1");
        assert_eq!(stats.cpu_millicore, 50.0);
        assert_eq!(stats.memory_byte, 1024.0);
        assert_eq!(stats.storage_byte, 2048.0);
        assert!(response.timestamp > 0);
    }

    #[tokio::test]
    async fn application_stats_visit_every_cluster() {
        let stats = |cpu| {
            vec![pb::ContainerStats {
                namespace: "default".to_string(),
                pod: "web-0".to_string(),
                container: "app".to_string(),
                cpu_millicore: cpu,
                memory_byte: 0.0,
                storage_byte: 0.0,
            }]
        };
        let manager = manager_with(
            vec![
                cluster("cl-1", 1.0),
                cluster("cl-2", 2.0),
                cluster("cl-3", 1.0),
            ],
            HashMap::from([
                ("cl-1".to_string(), collector(stats(10.0))),
                ("cl-2".to_string(), collector(stats(20.0))),
                ("cl-3".to_string(), collector(stats(30.0))),
            ]),
            Vec::new(),
        );

        let response = manager
            .get_organization_application_stats(&pb::OrganizationApplicationStatsRequest {
                organization_id: "org-1".to_string(),
            })
            .await
            .unwrap();

        // Collector calls run concurrently, so entry order is not fixed.
        let mut cpus: Vec<f64> = response
            .service_instance_stats
            .iter()
            .map(|s| s.cpu_millicore)
            .collect();
        cpus.sort_by(f64::total_cmp);
        assert_eq!(cpus, vec![10.0, 30.0, 40.0]);
    }

    #[tokio::test]
    async fn application_stats_with_no_clusters_is_empty() {
        let manager = manager_with(Vec::new(), HashMap::new(), Vec::new());
        let response = manager
            .get_organization_application_stats(&pb::OrganizationApplicationStatsRequest {
                organization_id: "org-1".to_string(),
            })
            .await
            .unwrap();
        assert!(response.service_instance_stats.is_empty());
    }

    #[tokio::test]
    async fn application_stats_require_the_cluster_list() {
        let manager = ClusterManager::new(
            Arc::new(MockInventory {
                clusters: Vec::new(),
                fail: true,
            }),
            Arc::new(MockConnector {
                collectors: HashMap::new(),
                fail: Vec::new(),
            }),
        );
        let err = manager
            .get_organization_application_stats(&pb::OrganizationApplicationStatsRequest {
                organization_id: "org-1".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PlaneError::FailedPrecondition(_)));
    }
}
