//! Fake backend provider
//!
//! Answers template executions and raw queries from canned queues. Used by
//! the test fixtures and the dev profile; declares both features so every
//! collector operation can run against it.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Utc;

use crate::error::PlaneError;
use crate::models::{
    templates, Feature, ProviderType, Query, QueryResult, QueryValue, Sample, TemplateVars,
};
use crate::provider::{async_trait, MetricsProvider};

const SUPPORTED_FEATURES: &[Feature] = &[Feature::SystemStats, Feature::PlatformStats];

/// Provider returning pre-loaded values in FIFO order.
pub struct FakeProvider {
    features: Vec<Feature>,
    scalars: Mutex<VecDeque<i64>>,
    results: Mutex<VecDeque<QueryResult>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::with_features(SUPPORTED_FEATURES.to_vec())
    }

    /// Provider declaring only the given features.
    pub fn with_features(features: Vec<Feature>) -> Self {
        FakeProvider {
            features,
            scalars: Mutex::new(VecDeque::new()),
            results: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue scalar answers for upcoming template executions.
    pub fn push_scalars(&self, values: impl IntoIterator<Item = i64>) {
        self.scalars.lock().unwrap().extend(values);
    }

    /// Queue a raw query result.
    pub fn push_result(&self, result: QueryResult) {
        self.results.lock().unwrap().push_back(result);
    }

    fn known_template(name: &str) -> bool {
        if name == templates::PLATFORM_STATS_COUNTER || name == templates::PLATFORM_STATS_GAUGE {
            return true;
        }
        templates::SYSTEM_RESOURCES.iter().any(|resource| {
            name == format!("{}{}", resource, templates::SUFFIX_TOTAL)
                || name == format!("{}{}", resource, templates::SUFFIX_AVAILABLE)
        })
    }
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricsProvider for FakeProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Fake
    }

    fn supported(&self) -> &[Feature] {
        &self.features
    }

    async fn query(&self, _query: &Query) -> Result<QueryResult, PlaneError> {
        match self.results.lock().unwrap().pop_front() {
            Some(result) => Ok(result),
            None => Ok(QueryResult::new(
                ProviderType::Fake,
                QueryValue::Vector(Vec::new()),
            )),
        }
    }

    async fn execute_template(
        &self,
        name: &str,
        _vars: &TemplateVars,
    ) -> Result<i64, PlaneError> {
        if !Self::known_template(name) {
            return Err(PlaneError::not_found(format!("template {}", name)));
        }
        self.scalars
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| PlaneError::internal(format!("no canned value for {}", name)))
    }
}

/// Build a canned scalar result, mainly for test fixtures.
pub fn fake_scalar(value: &str) -> QueryResult {
    QueryResult::new(
        ProviderType::Fake,
        QueryValue::Scalar(Sample {
            timestamp: Utc::now(),
            value: value.to_string(),
        }),
    )
}
