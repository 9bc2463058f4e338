//! Prometheus backend provider
//!
//! Talks to the Prometheus HTTP API (`/api/v1/query` and
//! `/api/v1/query_range`) and carries the default template set for system
//! and platform statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use url::Url;

use crate::error::PlaneError;
use crate::models::{
    Feature, ProviderType, Query, QueryResult, QueryValue, Sample, Series, TemplateVars,
};
use crate::provider::{async_trait, MetricsProvider, TemplateEngine};

/// Default query templates for Prometheus.
///
/// Each template carries its instantaneous and averaging form; the render
/// context's `averaging` flag picks between them. Counter stats report
/// change-over-window, gauge stats report average-over-window.
pub const PROMETHEUS_TEMPLATES: &[(&str, &str)] = &[
    ("cpu_total", r#"sum(machine_cpu_cores) * 1000"#),
    (
        "cpu_available",
        r#"{{#if averaging}}sum(machine_cpu_cores) * 1000 - sum(rate(node_cpu_seconds_total{mode!="idle"}[{{avg_seconds}}s])) * 1000{{else}}sum(machine_cpu_cores) * 1000 - sum(rate(node_cpu_seconds_total{mode!="idle"}[1m])) * 1000{{/if}}"#,
    ),
    ("memory_total", r#"sum(node_memory_MemTotal_bytes)"#),
    (
        "memory_available",
        r#"{{#if averaging}}sum(avg_over_time(node_memory_MemAvailable_bytes[{{avg_seconds}}s])){{else}}sum(node_memory_MemAvailable_bytes){{/if}}"#,
    ),
    (
        "storage_total",
        r#"sum(node_filesystem_size_bytes{fstype!~"tmpfs|overlay"})"#,
    ),
    (
        "storage_available",
        r#"{{#if averaging}}sum(avg_over_time(node_filesystem_avail_bytes{fstype!~"tmpfs|overlay"}[{{avg_seconds}}s])){{else}}sum(node_filesystem_avail_bytes{fstype!~"tmpfs|overlay"}){{/if}}"#,
    ),
    (
        "usablestorage_total",
        r#"sum(node_filesystem_size_bytes{fstype!~"tmpfs|overlay",mountpoint="/"})"#,
    ),
    (
        "usablestorage_available",
        r#"{{#if averaging}}sum(avg_over_time(node_filesystem_avail_bytes{fstype!~"tmpfs|overlay",mountpoint="/"}[{{avg_seconds}}s])){{else}}sum(node_filesystem_avail_bytes{fstype!~"tmpfs|overlay",mountpoint="/"}){{/if}}"#,
    ),
    (
        "platform_stats_counter",
        r#"{{#if averaging}}scalar(ceil(sum(increase({{metric_name}}_{{stat_name}}_total[{{avg_seconds}}s])))){{else}}scalar(ceil(sum(rate({{metric_name}}_{{stat_name}}_total[1m])) * 60)){{/if}}"#,
    ),
    (
        "platform_stats_gauge",
        r#"{{#if averaging}}scalar(avg(avg_over_time({{metric_name}}_{{stat_name}}[{{avg_seconds}}s]))){{else}}scalar(sum({{metric_name}}_{{stat_name}})){{/if}}"#,
    ),
];

const SUPPORTED_FEATURES: &[Feature] = &[Feature::SystemStats, Feature::PlatformStats];

/// Provider backed by a Prometheus server.
pub struct PrometheusProvider {
    client: reqwest::Client,
    base_url: Url,
    engine: TemplateEngine,
}

impl PrometheusProvider {
    /// Build a provider for the given server URL. Compiles all templates;
    /// a template parse failure aborts construction.
    pub fn new(url: &str) -> Result<Self, PlaneError> {
        let base_url = Url::parse(url)
            .map_err(|e| PlaneError::invalid_argument(format!("invalid prometheus url: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| PlaneError::internal(format!("cannot build http client: {}", e)))?;
        let engine = TemplateEngine::new(PROMETHEUS_TEMPLATES)?;
        Ok(PrometheusProvider {
            client,
            base_url,
            engine,
        })
    }

    fn api_url(&self, path: &str) -> Result<Url, PlaneError> {
        self.base_url
            .join(path)
            .map_err(|e| PlaneError::internal(format!("cannot build api url: {}", e)))
    }

    async fn call(&self, url: Url, params: &[(&str, String)]) -> Result<ApiResponse, PlaneError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PlaneError::DeadlineExceeded
                } else {
                    PlaneError::unavailable(format!("prometheus unreachable: {}", e))
                }
            })?;

        response
            .json::<ApiResponse>()
            .await
            .map_err(|e| PlaneError::internal(format!("unparseable prometheus response: {}", e)))
    }
}

#[async_trait]
impl MetricsProvider for PrometheusProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Prometheus
    }

    fn supported(&self) -> &[Feature] {
        SUPPORTED_FEATURES
    }

    async fn query(&self, query: &Query) -> Result<QueryResult, PlaneError> {
        let response = if query.range.is_instant() {
            let url = self.api_url("api/v1/query")?;
            let params = [
                ("query", query.query_string.clone()),
                ("time", format_time(query.range.start)),
            ];
            self.call(url, &params).await?
        } else {
            let step = query.range.step.as_secs_f64();
            if step <= 0.0 {
                return Err(PlaneError::invalid_argument(
                    "range query requires a positive step",
                ));
            }
            let url = self.api_url("api/v1/query_range")?;
            let params = [
                ("query", query.query_string.clone()),
                ("start", format_time(query.range.start)),
                ("end", format_time(query.range.end)),
                ("step", step.to_string()),
            ];
            self.call(url, &params).await?
        };

        response.into_result()
    }

    async fn execute_template(
        &self,
        name: &str,
        vars: &TemplateVars,
    ) -> Result<i64, PlaneError> {
        let query = self.engine.get_template_query(name, vars)?;
        let result = self.query(&query).await?;
        result.scalar_int()
    }
}

fn format_time(at: DateTime<Utc>) -> String {
    format!("{}.{:03}", at.timestamp(), at.timestamp_subsec_millis())
}

fn parse_time(epoch_seconds: f64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt((epoch_seconds * 1000.0) as i64)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap())
}

// HTTP API response shapes, see
// https://prometheus.io/docs/prometheus/latest/querying/api/

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    data: Option<ApiData>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, rename = "errorType")]
    error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    #[serde(rename = "resultType")]
    result_type: String,
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct VectorItem {
    metric: BTreeMap<String, String>,
    value: (f64, String),
}

#[derive(Debug, Deserialize)]
struct MatrixItem {
    metric: BTreeMap<String, String>,
    values: Vec<(f64, String)>,
}

impl ApiResponse {
    fn into_result(self) -> Result<QueryResult, PlaneError> {
        if self.status != "success" {
            let message = self.error.unwrap_or_else(|| "unknown error".to_string());
            return match self.error_type.as_deref() {
                Some("bad_data") => Err(PlaneError::invalid_argument(message)),
                Some("timeout") => Err(PlaneError::DeadlineExceeded),
                _ => Err(PlaneError::internal(format!("prometheus error: {}", message))),
            };
        }

        let data = self
            .data
            .ok_or_else(|| PlaneError::internal("missing data in prometheus response"))?;

        let value = match data.result_type.as_str() {
            "scalar" => {
                let (ts, value): (f64, String) = decode(data.result)?;
                QueryValue::Scalar(sample(ts, value))
            }
            "string" => {
                let (ts, value): (f64, String) = decode(data.result)?;
                QueryValue::String(sample(ts, value))
            }
            "vector" => {
                let items: Vec<VectorItem> = decode(data.result)?;
                QueryValue::Vector(
                    items
                        .into_iter()
                        .map(|item| Series {
                            labels: item.metric,
                            samples: vec![sample(item.value.0, item.value.1)],
                        })
                        .collect(),
                )
            }
            "matrix" => {
                let items: Vec<MatrixItem> = decode(data.result)?;
                QueryValue::Matrix(
                    items
                        .into_iter()
                        .map(|item| Series {
                            labels: item.metric,
                            samples: item
                                .values
                                .into_iter()
                                .map(|(ts, value)| sample(ts, value))
                                .collect(),
                        })
                        .collect(),
                )
            }
            other => {
                return Err(PlaneError::internal(format!(
                    "unknown prometheus result type {:?}",
                    other
                )))
            }
        };

        Ok(QueryResult::new(ProviderType::Prometheus, value))
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, PlaneError> {
    serde_json::from_value(value)
        .map_err(|e| PlaneError::internal(format!("unparseable prometheus result: {}", e)))
}

fn sample(epoch_seconds: f64, value: String) -> Sample {
    Sample {
        timestamp: parse_time(epoch_seconds),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_compile() {
        TemplateEngine::new(PROMETHEUS_TEMPLATES).unwrap();
    }

    #[test]
    fn platform_counter_renders_metric_and_stat() {
        let engine = TemplateEngine::new(PROMETHEUS_TEMPLATES).unwrap();
        let vars = TemplateVars {
            avg_seconds: 600,
            metric_name: "services".to_string(),
            stat_name: "created".to_string(),
        };
        let query = engine
            .get_template_query("platform_stats_counter", &vars)
            .unwrap();
        assert!(query.query_string.contains("services_created_total"));
        assert!(query.query_string.contains("[600s]"));
    }

    #[test]
    fn cpu_available_instant_form_below_threshold() {
        let engine = TemplateEngine::new(PROMETHEUS_TEMPLATES).unwrap();
        let query = engine
            .get_template_query("cpu_available", &TemplateVars::with_avg_seconds(0))
            .unwrap();
        assert!(query.query_string.contains("[1m]"));
    }

    #[test]
    fn parses_vector_response() {
        let body = r#"{
            "status": "success",
            "data": {
                "resultType": "vector",
                "result": [
                    {"metric": {"pod": "web-0"}, "value": [1700000000.123, "42"]}
                ]
            }
        }"#;
        let response: ApiResponse = serde_json::from_str(body).unwrap();
        let result = response.into_result().unwrap();
        match result.value {
            QueryValue::Vector(series) => {
                assert_eq!(series.len(), 1);
                assert_eq!(series[0].labels["pod"], "web-0");
                assert_eq!(series[0].samples[0].value, "42");
            }
            other => panic!("expected vector, got {}", other.kind()),
        }
    }

    #[test]
    fn parses_scalar_response() {
        let body = r#"{
            "status": "success",
            "data": {"resultType": "scalar", "result": [1700000000, "7.5"]}
        }"#;
        let response: ApiResponse = serde_json::from_str(body).unwrap();
        let result = response.into_result().unwrap();
        assert_eq!(result.scalar_int().unwrap(), 7);
    }

    #[test]
    fn error_response_maps_bad_data() {
        let body = r#"{
            "status": "error",
            "errorType": "bad_data",
            "error": "parse error at char 1"
        }"#;
        let response: ApiResponse = serde_json::from_str(body).unwrap();
        let err = response.into_result().unwrap_err();
        assert!(matches!(err, PlaneError::InvalidArgument(_)));
    }
}
