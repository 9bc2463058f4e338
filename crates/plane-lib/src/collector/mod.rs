//! Cluster collector
//!
//! The per-cluster leaf of the query plane. Owns the backend providers for
//! its cluster and answers the three cluster operations plus the container
//! statistics view the organization aggregator consumes. All operations
//! echo the request's organization and cluster ids verbatim.


use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

use crate::error::PlaneError;
use crate::models::{
    templates, Feature, PlatformStatsField, ProviderType, Query, QueryRange, StatCounter,
    TemplateVars,
};
use crate::provider::{MetricsProvider, TranslatorRegistry};
use crate::proto::monitoring::v1 as pb;

/// Container-level resource queries, joined by (namespace, pod, container).
const CONTAINER_CPU_QUERY: &str = r#"sum by (namespace, pod, container) (rate(container_cpu_usage_seconds_total{container!=""}[1m])) * 1000"#;
const CONTAINER_MEMORY_QUERY: &str =
    r#"sum by (namespace, pod, container) (container_memory_working_set_bytes{container!=""})"#;
const CONTAINER_STORAGE_QUERY: &str =
    r#"sum by (namespace, pod, container) (container_fs_usage_bytes{container!=""})"#;

/// Per-cluster service executing queries against the local backends.
pub struct ClusterCollector {
    providers: Vec<Arc<dyn MetricsProvider>>,
    translators: TranslatorRegistry,
}

impl ClusterCollector {
    pub fn new(providers: Vec<Arc<dyn MetricsProvider>>, translators: TranslatorRegistry) -> Self {
        ClusterCollector {
            providers,
            translators,
        }
    }

    fn provider_with(&self, feature: Feature) -> Result<&Arc<dyn MetricsProvider>, PlaneError> {
        self.providers
            .iter()
            .find(|provider| provider.supports(feature))
            .ok_or_else(|| {
                PlaneError::unavailable(format!("no provider supports {:?}", feature))
            })
    }

    fn provider_of(
        &self,
        provider_type: ProviderType,
    ) -> Result<&Arc<dyn MetricsProvider>, PlaneError> {
        self.providers
            .iter()
            .find(|provider| provider.provider_type() == provider_type)
            .ok_or_else(|| {
                PlaneError::unavailable(format!("no {} provider configured", provider_type))
            })
    }

    /// Assemble the node-level resource summary of the cluster.
    ///
    /// A failed individual template execution fails the whole operation; no
    /// partial summaries are returned.
    pub async fn get_cluster_summary(
        &self,
        request: &pb::ClusterSummaryRequest,
    ) -> Result<pb::ClusterSummary, PlaneError> {
        let provider = self.provider_with(Feature::SystemStats)?;
        let vars = TemplateVars::with_avg_seconds(request.range_minutes * 60);

        let mut amounts = Vec::with_capacity(templates::SYSTEM_RESOURCES.len());
        for resource in templates::SYSTEM_RESOURCES {
            let total = provider
                .execute_template(&format!("{}{}", resource, templates::SUFFIX_TOTAL), &vars)
                .await?;
            let available = provider
                .execute_template(
                    &format!("{}{}", resource, templates::SUFFIX_AVAILABLE),
                    &vars,
                )
                .await?;
            amounts.push(pb::ResourceAmount { total, available });
        }

        Ok(pb::ClusterSummary {
            organization_id: request.organization_id.clone(),
            cluster_id: request.cluster_id.clone(),
            cpu_millicores: Some(amounts[0]),
            memory_bytes: Some(amounts[1]),
            storage_bytes: Some(amounts[2]),
            usable_storage_bytes: Some(amounts[3]),
        })
    }

    /// Read the platform counters back from the backend.
    pub async fn get_cluster_stats(
        &self,
        request: &pb::ClusterStatsRequest,
    ) -> Result<pb::ClusterStats, PlaneError> {
        let provider = self.provider_with(Feature::PlatformStats)?;

        let fields: Vec<PlatformStatsField> = if request.fields.is_empty() {
            PlatformStatsField::all().to_vec()
        } else {
            request
                .fields
                .iter()
                .map(|&value| {
                    PlatformStatsField::from_i32(value).ok_or_else(|| {
                        PlaneError::invalid_argument(format!(
                            "unknown platform stats field {}",
                            value
                        ))
                    })
                })
                .collect::<Result<_, _>>()?
        };

        let mut stats = HashMap::with_capacity(fields.len());
        for field in fields {
            let mut counters = pb::StatCounters::default();
            for counter in StatCounter::all() {
                let vars = TemplateVars {
                    avg_seconds: request.range_minutes * 60,
                    metric_name: field.metric_name().to_string(),
                    stat_name: counter.stat_name().to_string(),
                };
                let value = provider.execute_template(counter.template(), &vars).await?;
                match counter {
                    StatCounter::Created => counters.created = value,
                    StatCounter::Deleted => counters.deleted = value,
                    StatCounter::Errors => counters.errors = value,
                    StatCounter::Running => counters.running = value,
                }
            }
            stats.insert(field as i32, counters);
        }

        Ok(pb::ClusterStats {
            organization_id: request.organization_id.clone(),
            cluster_id: request.cluster_id.clone(),
            stats,
        })
    }

    /// Run a raw query against the provider the request names.
    pub async fn query(&self, request: &pb::QueryRequest) -> Result<pb::QueryResponse, PlaneError> {
        let provider_type = ProviderType::parse(&request.r#type).ok_or_else(|| {
            PlaneError::invalid_argument(format!("unknown provider type {:?}", request.r#type))
        })?;
        let provider = self.provider_of(provider_type)?;

        let query = Query {
            query_string: request.query.clone(),
            range: match &request.range {
                Some(range) => wire_range(range),
                None => QueryRange::instant(Utc::now()),
            },
        };

        let result = provider.query(&query).await?;
        let translated = self.translators.translate(&result)?;

        Ok(pb::QueryResponse {
            organization_id: request.organization_id.clone(),
            cluster_id: request.cluster_id.clone(),
            r#type: request.r#type.clone(),
            result: Some(translated),
        })
    }

    /// Current per-container resource usage, for the organization-wide
    /// application statistics view.
    pub async fn get_container_stats(
        &self,
        _request: &pb::ContainerStatsRequest,
    ) -> Result<pb::ContainerStatsResponse, PlaneError> {
        let provider = self.provider_with(Feature::SystemStats)?;

        let mut joined: HashMap<(String, String, String), pb::ContainerStats> = HashMap::new();
        for (query_string, assign) in [
            (CONTAINER_CPU_QUERY, 0usize),
            (CONTAINER_MEMORY_QUERY, 1),
            (CONTAINER_STORAGE_QUERY, 2),
        ] {
            let query = Query::instant(query_string, Utc::now());
            let result = provider.query(&query).await?;
            let series = match result.value {
                crate::models::QueryValue::Vector(series) => series,
                other => {
                    return Err(PlaneError::internal(format!(
                        "expected vector result for container stats, got {}",
                        other.kind()
                    )))
                }
            };

            for entry in series {
                let (namespace, pod, container) = match (
                    entry.labels.get("namespace"),
                    entry.labels.get("pod"),
                    entry.labels.get("container"),
                ) {
                    (Some(ns), Some(pod), Some(container)) => {
                        (ns.clone(), pod.clone(), container.clone())
                    }
                    _ => {
                        debug!(labels = ?entry.labels, "container series without identity labels");
                        continue;
                    }
                };
                let value: f64 = match entry.samples.first().map(|s| s.value.parse()) {
                    Some(Ok(value)) => value,
                    _ => continue,
                };

                let stats = joined
                    .entry((namespace.clone(), pod.clone(), container.clone()))
                    .or_insert_with(|| pb::ContainerStats {
                        namespace,
                        pod,
                        container,
                        ..Default::default()
                    });
                match assign {
                    0 => stats.cpu_millicore = value,
                    1 => stats.memory_byte = value,
                    _ => stats.storage_byte = value,
                }
            }
        }

        let mut container_stats: Vec<pb::ContainerStats> = joined.into_values().collect();
        container_stats.sort_by(|a, b| {
            (&a.namespace, &a.pod, &a.container).cmp(&(&b.namespace, &b.pod, &b.container))
        });

        Ok(pb::ContainerStatsResponse { container_stats })
    }
}

fn wire_range(range: &pb::QueryRange) -> QueryRange {
    QueryRange {
        start: wire_time(range.start.as_ref()),
        end: wire_time(range.end.as_ref()),
        step: if range.step > 0.0 {
            std::time::Duration::from_secs_f32(range.step)
        } else {
            std::time::Duration::ZERO
        },
    }
}

fn wire_time(timestamp: Option<&prost_types::Timestamp>) -> DateTime<Utc> {
    match timestamp {
        Some(ts) => Utc
            .timestamp_opt(ts.seconds, ts.nanos.max(0) as u32)
            .single()
            .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap()),
        None => Utc.timestamp_opt(0, 0).unwrap(),
    }
}
