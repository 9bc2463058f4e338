//! Observability infrastructure for the query plane
//!
//! Provides:
//! - Platform event counters (created/deleted/errors per field) and running
//!   gauges, named exactly as the collector's platform templates expect to
//!   read them back from the backend
//! - A labelled gauge exposing the operator-maintained static label list

use std::collections::HashMap;
use std::sync::OnceLock;

use prometheus::{
    register_gauge_vec, register_int_counter, register_int_gauge, GaugeVec, IntCounter, IntGauge,
};

use crate::models::{PlatformStatsField, StatCounter};

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PlaneMetricsInner> = OnceLock::new();

struct PlaneMetricsInner {
    /// `<metric>_<stat>_total` per platform field and event kind.
    counters: HashMap<(PlatformStatsField, StatCounter), IntCounter>,
    /// `<metric>_running` per platform field.
    running: HashMap<PlatformStatsField, IntGauge>,
    static_labels: GaugeVec,
}

impl PlaneMetricsInner {
    fn new() -> Self {
        let mut counters = HashMap::new();
        let mut running = HashMap::new();

        for field in PlatformStatsField::all() {
            for counter in StatCounter::all() {
                if counter == StatCounter::Running {
                    continue;
                }
                let name = format!("{}_{}_total", field.metric_name(), counter.stat_name());
                let help = format!("Number of {} {}", field.metric_name(), counter.stat_name());
                counters.insert(
                    (field, counter),
                    register_int_counter!(name, help).expect("Failed to register platform counter"),
                );
            }
            let name = format!("{}_running", field.metric_name());
            let help = format!("Number of {} currently running", field.metric_name());
            running.insert(
                field,
                register_int_gauge!(name, help).expect("Failed to register running gauge"),
            );
        }

        Self {
            counters,
            running,
            static_labels: register_gauge_vec!(
                "monitoring_plane_static_labels",
                "Operator-maintained static label list, one series per entry",
                &["name"]
            )
            .expect("Failed to register static_labels"),
        }
    }
}

/// Plane metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the same
/// underlying metrics.
#[derive(Clone)]
pub struct PlaneMetrics {
    _private: (),
}

impl Default for PlaneMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaneMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PlaneMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PlaneMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn inc_created(&self, field: PlatformStatsField) {
        self.inner().counters[&(field, StatCounter::Created)].inc();
    }

    pub fn inc_deleted(&self, field: PlatformStatsField) {
        self.inner().counters[&(field, StatCounter::Deleted)].inc();
    }

    pub fn inc_errors(&self, field: PlatformStatsField) {
        self.inner().counters[&(field, StatCounter::Errors)].inc();
    }

    pub fn inc_running(&self, field: PlatformStatsField) {
        self.inner().running[&field].inc();
    }

    pub fn dec_running(&self, field: PlatformStatsField) {
        self.inner().running[&field].dec();
    }

    pub fn set_running(&self, field: PlatformStatsField, count: i64) {
        self.inner().running[&field].set(count);
    }

    /// Replace the exported static label list.
    pub fn set_static_labels(&self, labels: &[String]) {
        let gauge = &self.inner().static_labels;
        gauge.reset();
        for label in labels {
            if label.is_empty() {
                continue;
            }
            gauge.with_label_values(&[label]).set(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_cover_every_field() {
        // The global registry only accepts each name once per process, so a
        // single test exercises the whole surface.
        let metrics = PlaneMetrics::new();

        for field in PlatformStatsField::all() {
            metrics.inc_created(field);
            metrics.inc_deleted(field);
            metrics.inc_errors(field);
            metrics.set_running(field, 3);
            metrics.inc_running(field);
            metrics.dec_running(field);
        }

        metrics.set_static_labels(&["zone-a".to_string(), String::new()]);
        metrics.set_static_labels(&["zone-b".to_string()]);
    }
}
