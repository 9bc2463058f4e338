//! Monitoring query plane
//!
//! Front-door deployment serving the monitoring operations of one
//! organization: per-cluster summaries, platform statistics, raw backend
//! queries and cross-edge-controller asset metrics.

use anyhow::Result;
use plane_lib::{
    collector::ClusterCollector,
    health::{components, HealthRegistry},
    inventory::GrpcInventory,
    manager::{ClusterManager, ConnectorConfig, TlsCollectorConnector},
    merger::{GrpcEdgeProxy, QueryMerger},
    models::ProviderType,
    observability::PlaneMetrics,
    provider::{FakeProvider, MetricsProvider, PrometheusProvider, TranslatorRegistry},
    selector::SelectorResolver,
    validator::PlaneIdentity,
    watcher::StaticLabelWatcher,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

/// Everything the gRPC hosting layer consumes. Built once at startup and
/// kept alive for the lifetime of the process.
#[allow(dead_code)]
struct PlaneServices {
    collector: ClusterCollector,
    resolver: SelectorResolver,
    merger: QueryMerger,
    manager: ClusterManager,
}

fn build_services(config: &config::PlaneConfig) -> Result<PlaneServices> {
    let provider: Arc<dyn MetricsProvider> = match config.provider_type()? {
        ProviderType::Prometheus => Arc::new(PrometheusProvider::new(&config.prometheus_url)?),
        ProviderType::Fake => Arc::new(FakeProvider::new()),
    };
    let collector = ClusterCollector::new(vec![provider], TranslatorRegistry::with_defaults());

    let inventory = Arc::new(GrpcInventory::new(&config.inventory_endpoint)?);
    let resolver = SelectorResolver::new(inventory.clone(), inventory.clone());

    let proxy = Arc::new(GrpcEdgeProxy::new(&config.edge_proxy_endpoint)?);
    let merger = QueryMerger::new(proxy);

    let connector = Arc::new(TlsCollectorConnector::new(ConnectorConfig {
        collector_prefix: config.collector_prefix.clone(),
        collector_port: config.collector_port,
        ca_cert_path: config.ca_cert_path.clone().map(PathBuf::from),
        client_cert_path: config.client_cert_path.clone().map(PathBuf::from),
        client_key_path: config.client_key_path.clone().map(PathBuf::from),
        skip_server_cert_validation: config.skip_server_cert_validation,
    }));
    let manager = ClusterManager::with_cache_ttl(
        inventory,
        connector,
        Duration::from_secs(config.cache_ttl_secs),
    )
    .with_identity(PlaneIdentity {
        organization_id: Some(config.organization_id.clone()),
        cluster_id: config.cluster_id.clone(),
    });

    Ok(PlaneServices {
        collector,
        resolver,
        merger,
        manager,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting monitoring-plane");

    let config = config::PlaneConfig::load()?;
    info!(organization_id = %config.organization_id, "Plane configured");

    let health_registry = HealthRegistry::new();
    health_registry.register(components::PROVIDER).await;
    health_registry.register(components::INVENTORY).await;
    health_registry.register(components::EDGE_PROXY).await;

    let metrics = PlaneMetrics::new();

    let _services = build_services(&config)?;

    // Export the operator-maintained label list and keep it fresh.
    let _watcher_handle = match &config.static_label_file {
        Some(path) => {
            health_registry.register(components::LABEL_WATCHER).await;
            let exporter = metrics.clone();
            let handle = StaticLabelWatcher::new(path)
                .with_listener(move |labels| exporter.set_static_labels(labels))
                .start()?;
            Some(handle)
        }
        None => None,
    };

    let app_state = Arc::new(api::AppState::new(health_registry.clone(), metrics));

    health_registry.set_ready(true).await;

    let _api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    shutdown_signal().await?;
    info!("Shutting down");

    Ok(())
}

async fn shutdown_signal() -> Result<()> {
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("SIGINT received");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received");
        }
    }
    Ok(())
}
