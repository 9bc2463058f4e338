//! Time-series backend providers
//!
//! A provider abstracts one time-series backend: it answers raw instant and
//! range queries and executes named query templates that reduce to a single
//! int64. Providers self-declare their type and supported features; the
//! cluster collector picks providers by feature, never by concrete type.

mod fake;
mod prometheus;
mod templates;
mod translator;

pub use fake::{fake_scalar, FakeProvider};
pub use prometheus::{PrometheusProvider, PROMETHEUS_TEMPLATES};
pub use templates::TemplateEngine;
pub use translator::{TranslatorFn, TranslatorRegistry};

use crate::error::PlaneError;
use crate::models::{Feature, ProviderType, Query, QueryResult, TemplateVars};

pub use async_trait::async_trait;

/// Abstraction over a time-series backend.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Backend type this provider talks to.
    fn provider_type(&self) -> ProviderType;

    /// Features this provider can answer.
    fn supported(&self) -> &[Feature];

    fn supports(&self, feature: Feature) -> bool {
        self.supported().contains(&feature)
    }

    /// Run an instant or range query against the backend.
    async fn query(&self, query: &Query) -> Result<QueryResult, PlaneError>;

    /// Render the named template against `vars`, run it as an instant query
    /// and extract a scalar.
    async fn execute_template(&self, name: &str, vars: &TemplateVars)
        -> Result<i64, PlaneError>;
}
