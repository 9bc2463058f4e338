//! Result translator registry
//!
//! Maps a provider type onto the function that converts its backend result
//! into the wire response shape. Built explicitly at start and passed into
//! the cluster collector, so tests never depend on registration order.

use std::collections::HashMap;

use crate::error::PlaneError;
use crate::models::{ProviderType, QueryResult, QueryValue, Sample, Series};
use crate::proto::monitoring::v1 as pb;

/// Converts a backend result into the wire shape.
pub type TranslatorFn = fn(&QueryResult) -> Result<pb::QueryResult, PlaneError>;

/// Per-provider-type translator table.
pub struct TranslatorRegistry {
    translators: HashMap<ProviderType, TranslatorFn>,
}

impl TranslatorRegistry {
    pub fn new() -> Self {
        TranslatorRegistry {
            translators: HashMap::new(),
        }
    }

    /// Registry with the translators for all built-in providers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ProviderType::Prometheus, translate_prometheus);
        registry.register(ProviderType::Fake, translate_fake);
        registry
    }

    pub fn register(&mut self, provider: ProviderType, translator: TranslatorFn) {
        self.translators.insert(provider, translator);
    }

    /// Translate a result with the function registered for its provider.
    pub fn translate(&self, result: &QueryResult) -> Result<pb::QueryResult, PlaneError> {
        let translator = self.translators.get(&result.provider).ok_or_else(|| {
            PlaneError::Unimplemented(format!(
                "no translator registered for {}",
                result.provider
            ))
        })?;
        translator(result)
    }
}

impl Default for TranslatorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn translate_prometheus(result: &QueryResult) -> Result<pb::QueryResult, PlaneError> {
    expect_type(result, ProviderType::Prometheus)?;
    Ok(to_wire(result))
}

fn translate_fake(result: &QueryResult) -> Result<pb::QueryResult, PlaneError> {
    expect_type(result, ProviderType::Fake)?;
    Ok(to_wire(result))
}

fn expect_type(result: &QueryResult, expected: ProviderType) -> Result<(), PlaneError> {
    if result.result_type() != expected {
        return Err(PlaneError::internal(format!(
            "translator for {} received {} result",
            expected,
            result.result_type()
        )));
    }
    Ok(())
}

fn to_wire(result: &QueryResult) -> pb::QueryResult {
    let series = match &result.value {
        QueryValue::Scalar(sample) | QueryValue::String(sample) => vec![pb::QuerySeries {
            labels: HashMap::new(),
            samples: vec![wire_sample(sample)],
        }],
        QueryValue::Vector(series) | QueryValue::Matrix(series) => {
            series.iter().map(wire_series).collect()
        }
    };
    pb::QueryResult {
        result_type: result.value.kind().to_string(),
        series,
    }
}

fn wire_series(series: &Series) -> pb::QuerySeries {
    pb::QuerySeries {
        labels: series
            .labels
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        samples: series.samples.iter().map(wire_sample).collect(),
    }
}

fn wire_sample(sample: &Sample) -> pb::QuerySample {
    pb::QuerySample {
        timestamp: sample.timestamp.timestamp(),
        value: sample.value.clone(),
    }
}
