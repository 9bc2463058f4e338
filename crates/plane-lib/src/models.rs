//! Core data model for the monitoring query plane

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PlaneError;

/// Backend identifier a provider declares about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderType {
    Prometheus,
    Fake,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Prometheus => "PROMETHEUS",
            ProviderType::Fake => "FAKE",
        }
    }

    /// Parse the short uppercase wire identifier.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PROMETHEUS" => Some(ProviderType::Prometheus),
            "FAKE" => Some(ProviderType::Fake),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability a provider may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Platform counters (services, volumes, fragments, endpoints).
    PlatformStats,
    /// Node-level resources (cpu, memory, storage, usable storage).
    SystemStats,
}

/// Time range of a backend query. A zero `end` makes the query an instant
/// query evaluated at `start`, and `step` is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub step: std::time::Duration,
}

impl QueryRange {
    pub fn instant(at: DateTime<Utc>) -> Self {
        QueryRange {
            start: at,
            end: zero_instant(),
            step: std::time::Duration::ZERO,
        }
    }

    pub fn is_instant(&self) -> bool {
        self.end == zero_instant()
    }
}

/// The zero instant marking an instant query.
pub fn zero_instant() -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).unwrap()
}

/// A concrete backend query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub query_string: String,
    pub range: QueryRange,
}

impl Query {
    pub fn instant(query_string: impl Into<String>, at: DateTime<Utc>) -> Self {
        Query {
            query_string: query_string.into(),
            range: QueryRange::instant(at),
        }
    }
}

/// A single timestamped sample. The value is kept as the backend's string
/// rendering; scalar extraction parses it on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: String,
}

/// A labelled series of samples. Labels are kept ordered so translated
/// output is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub labels: BTreeMap<String, String>,
    pub samples: Vec<Sample>,
}

/// Shape of a backend result.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Scalar(Sample),
    Vector(Vec<Series>),
    Matrix(Vec<Series>),
    String(Sample),
}

impl QueryValue {
    pub fn kind(&self) -> &'static str {
        match self {
            QueryValue::Scalar(_) => "scalar",
            QueryValue::Vector(_) => "vector",
            QueryValue::Matrix(_) => "matrix",
            QueryValue::String(_) => "string",
        }
    }
}

/// A backend result together with the provider type that produced it, so
/// translators can reject results they were not registered for.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub provider: ProviderType,
    pub value: QueryValue,
}

impl QueryResult {
    pub fn new(provider: ProviderType, value: QueryValue) -> Self {
        QueryResult { provider, value }
    }

    pub fn result_type(&self) -> ProviderType {
        self.provider
    }

    /// Extract an int64 from a scalar result.
    ///
    /// The sample is parsed as a float and truncated. NaN maps to 0 (the
    /// backend answers NaN for rates over an empty window); any other
    /// non-finite value and any non-scalar shape is a structural error.
    pub fn scalar_int(&self) -> Result<i64, PlaneError> {
        let sample = match &self.value {
            QueryValue::Scalar(s) => s,
            other => {
                return Err(PlaneError::internal(format!(
                    "expected scalar result, got {}",
                    other.kind()
                )))
            }
        };
        let parsed: f64 = sample
            .value
            .parse()
            .map_err(|e| PlaneError::internal(format!("unparseable scalar {:?}: {}", sample.value, e)))?;
        if parsed.is_nan() {
            return Ok(0);
        }
        if parsed.is_infinite() {
            return Err(PlaneError::internal("non-finite scalar result"));
        }
        Ok(parsed.trunc() as i64)
    }
}

/// Variable bag a query template is rendered against.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateVars {
    pub avg_seconds: i32,
    pub metric_name: String,
    pub stat_name: String,
}

impl TemplateVars {
    pub fn with_avg_seconds(avg_seconds: i32) -> Self {
        TemplateVars {
            avg_seconds,
            ..Default::default()
        }
    }
}

/// Template name constants. Composite names are formed by concatenation,
/// e.g. `cpu` + `_available`.
pub mod templates {
    pub const CPU: &str = "cpu";
    pub const MEMORY: &str = "memory";
    pub const STORAGE: &str = "storage";
    pub const USABLE_STORAGE: &str = "usablestorage";

    pub const SUFFIX_TOTAL: &str = "_total";
    pub const SUFFIX_AVAILABLE: &str = "_available";

    pub const PLATFORM_STATS_COUNTER: &str = "platform_stats_counter";
    pub const PLATFORM_STATS_GAUGE: &str = "platform_stats_gauge";

    /// System resources the cluster summary is assembled from.
    pub const SYSTEM_RESOURCES: [&str; 4] = [CPU, MEMORY, STORAGE, USABLE_STORAGE];
}

/// Platform statistic families exposed by the event pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum PlatformStatsField {
    Services = 0,
    Volumes = 1,
    Fragments = 2,
    Endpoints = 3,
}

impl PlatformStatsField {
    pub fn all() -> [PlatformStatsField; 4] {
        [
            PlatformStatsField::Services,
            PlatformStatsField::Volumes,
            PlatformStatsField::Fragments,
            PlatformStatsField::Endpoints,
        ]
    }

    /// Metric name prefix on the scrape endpoint.
    pub fn metric_name(&self) -> &'static str {
        match self {
            PlatformStatsField::Services => "services",
            PlatformStatsField::Volumes => "volumes",
            PlatformStatsField::Fragments => "fragments",
            PlatformStatsField::Endpoints => "endpoints",
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(PlatformStatsField::Services),
            1 => Some(PlatformStatsField::Volumes),
            2 => Some(PlatformStatsField::Fragments),
            3 => Some(PlatformStatsField::Endpoints),
            _ => None,
        }
    }
}

/// Per-field counters tracked for every platform statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatCounter {
    Created,
    Deleted,
    Errors,
    Running,
}

impl StatCounter {
    pub fn all() -> [StatCounter; 4] {
        [
            StatCounter::Created,
            StatCounter::Deleted,
            StatCounter::Errors,
            StatCounter::Running,
        ]
    }

    pub fn stat_name(&self) -> &'static str {
        match self {
            StatCounter::Created => "created",
            StatCounter::Deleted => "deleted",
            StatCounter::Errors => "errors",
            StatCounter::Running => "running",
        }
    }

    /// Template used to read this counter back from the backend. Monotonic
    /// stats are counters; `running` is a gauge.
    pub fn template(&self) -> &'static str {
        match self {
            StatCounter::Created | StatCounter::Deleted | StatCounter::Errors => {
                templates::PLATFORM_STATS_COUNTER
            }
            StatCounter::Running => templates::PLATFORM_STATS_GAUGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(provider: ProviderType, value: &str) -> QueryResult {
        QueryResult::new(
            provider,
            QueryValue::Scalar(Sample {
                timestamp: Utc::now(),
                value: value.to_string(),
            }),
        )
    }

    #[test]
    fn scalar_int_truncates() {
        assert_eq!(scalar(ProviderType::Fake, "41.9").scalar_int().unwrap(), 41);
        assert_eq!(scalar(ProviderType::Fake, "-2.5").scalar_int().unwrap(), -2);
        assert_eq!(scalar(ProviderType::Fake, "7").scalar_int().unwrap(), 7);
    }

    #[test]
    fn scalar_int_nan_is_zero() {
        assert_eq!(scalar(ProviderType::Fake, "NaN").scalar_int().unwrap(), 0);
    }

    #[test]
    fn scalar_int_rejects_infinite() {
        let err = scalar(ProviderType::Fake, "+Inf").scalar_int().unwrap_err();
        assert!(matches!(err, PlaneError::Internal(_)));
    }

    #[test]
    fn scalar_int_rejects_non_scalar() {
        let result = QueryResult::new(ProviderType::Fake, QueryValue::Vector(Vec::new()));
        assert!(matches!(
            result.scalar_int(),
            Err(PlaneError::Internal(_))
        ));
    }

    #[test]
    fn scalar_int_rejects_garbage() {
        assert!(scalar(ProviderType::Fake, "not-a-number").scalar_int().is_err());
    }

    #[test]
    fn instant_range_detection() {
        let range = QueryRange::instant(Utc::now());
        assert!(range.is_instant());

        let range = QueryRange {
            start: Utc::now(),
            end: Utc::now() + chrono::Duration::seconds(60),
            step: std::time::Duration::from_secs(15),
        };
        assert!(!range.is_instant());
    }

    #[test]
    fn provider_type_parse() {
        assert_eq!(ProviderType::parse("PROMETHEUS"), Some(ProviderType::Prometheus));
        assert_eq!(ProviderType::parse("FAKE"), Some(ProviderType::Fake));
        assert_eq!(ProviderType::parse("influx"), None);
    }

    #[test]
    fn running_uses_gauge_template() {
        assert_eq!(StatCounter::Running.template(), templates::PLATFORM_STATS_GAUGE);
        assert_eq!(StatCounter::Created.template(), templates::PLATFORM_STATS_COUNTER);
    }
}
