//! Plane configuration

use anyhow::{bail, Result};
use plane_lib::models::ProviderType;
use serde::Deserialize;

/// Query plane configuration, read from `PLANE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaneConfig {
    /// Organization this deployment serves
    #[serde(default)]
    pub organization_id: String,

    /// Owning cluster on app-cluster deployments; requests naming another
    /// cluster are rejected when set
    #[serde(default)]
    pub cluster_id: Option<String>,

    /// HTTP port for health/metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Backend provider type (PROMETHEUS or FAKE)
    #[serde(default = "default_provider_type")]
    pub provider_type: String,

    /// Prometheus HTTP API base URL
    #[serde(default = "default_prometheus_url")]
    pub prometheus_url: String,

    /// System model (inventory) gRPC endpoint
    #[serde(default = "default_inventory_endpoint")]
    pub inventory_endpoint: String,

    /// Edge controller proxy gRPC endpoint
    #[serde(default = "default_edge_proxy_endpoint")]
    pub edge_proxy_endpoint: String,

    /// Host label prepended to cluster hostnames to reach their collectors
    #[serde(default = "default_collector_prefix")]
    pub collector_prefix: String,

    /// Port the per-cluster collectors listen on
    #[serde(default = "default_collector_port")]
    pub collector_port: u16,

    /// CA bundle for collector TLS verification
    #[serde(default)]
    pub ca_cert_path: Option<String>,

    /// Client certificate and key for mutual TLS with the collectors
    #[serde(default)]
    pub client_cert_path: Option<String>,
    #[serde(default)]
    pub client_key_path: Option<String>,

    /// Development switch, downgrades collector connections to plaintext
    #[serde(default)]
    pub skip_server_cert_validation: bool,

    /// Optional static label list file, one entry per line
    #[serde(default)]
    pub static_label_file: Option<String>,

    /// Lifetime of cached collector responses in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_api_port() -> u16 {
    8080
}

fn default_provider_type() -> String {
    "PROMETHEUS".to_string()
}

fn default_prometheus_url() -> String {
    "http://localhost:9090".to_string()
}

fn default_inventory_endpoint() -> String {
    "http://system-model:8800".to_string()
}

fn default_edge_proxy_endpoint() -> String {
    "http://edge-proxy:5544".to_string()
}

fn default_collector_prefix() -> String {
    "metrics-collector".to_string()
}

fn default_collector_port() -> u16 {
    8422
}

fn default_cache_ttl_secs() -> u64 {
    60
}

impl PlaneConfig {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("PLANE"))
            .build()?;

        let config: PlaneConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn provider_type(&self) -> Result<ProviderType> {
        match ProviderType::parse(&self.provider_type) {
            Some(provider_type) => Ok(provider_type),
            None => bail!("unknown provider type {:?}", self.provider_type),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.organization_id.is_empty() {
            bail!("PLANE_ORGANIZATION_ID is required");
        }
        if self.api_port == 0 {
            bail!("api_port must be nonzero");
        }
        let provider_type = self.provider_type()?;
        if provider_type == ProviderType::Prometheus {
            url::Url::parse(&self.prometheus_url)
                .map_err(|e| anyhow::anyhow!("invalid prometheus_url: {}", e))?;
        }
        if self.client_cert_path.is_some() != self.client_key_path.is_some() {
            bail!("client_cert_path and client_key_path must be set together");
        }
        Ok(())
    }
}
