//! Asset query merging
//!
//! Fans a metrics query out over the edge controllers a selector resolved
//! to, accumulates the per-timestamp values, and applies the final
//! aggregation. AVG over several controllers is rewritten to SUM on the
//! wire and divided by the merged asset count afterwards; the `asset_count`
//! field of every sample is what makes that rewrite sound.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::time::timeout;
use tonic::transport::{Channel, Endpoint};
use tracing::warn;

use crate::error::PlaneError;
use crate::proto::monitoring::v1 as pb;
use crate::proto::EdgeMonitoringProxyClient;
use crate::selector::SelectorMap;
use crate::validator;

/// Deadline applied to every edge proxy call.
pub const EDGE_PROXY_DEADLINE: Duration = Duration::from_secs(30);

/// Bound on concurrent per-controller sub-requests.
const FANOUT_CONCURRENCY: usize = 8;

/// The proxy service fronting edge controllers.
#[async_trait]
pub trait EdgeProxy: Send + Sync {
    async fn list_metrics(
        &self,
        selector: &pb::AssetSelector,
    ) -> Result<pb::MetricsList, PlaneError>;

    async fn query_metrics(
        &self,
        request: &pb::QueryMetricsRequest,
    ) -> Result<pb::QueryMetricsResult, PlaneError>;
}

/// gRPC-backed edge proxy over a shared channel.
#[derive(Clone)]
pub struct GrpcEdgeProxy {
    channel: Channel,
}

impl GrpcEdgeProxy {
    pub fn new(endpoint: &str) -> Result<Self, PlaneError> {
        let channel = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| {
                PlaneError::invalid_argument(format!("invalid edge proxy endpoint: {}", e))
            })?
            .timeout(EDGE_PROXY_DEADLINE)
            .connect_lazy();
        Ok(GrpcEdgeProxy { channel })
    }
}

#[async_trait]
impl EdgeProxy for GrpcEdgeProxy {
    async fn list_metrics(
        &self,
        selector: &pb::AssetSelector,
    ) -> Result<pb::MetricsList, PlaneError> {
        let mut client = EdgeMonitoringProxyClient::new(self.channel.clone());
        Ok(client.list_metrics(selector.clone()).await?.into_inner())
    }

    async fn query_metrics(
        &self,
        request: &pb::QueryMetricsRequest,
    ) -> Result<pb::QueryMetricsResult, PlaneError> {
        let mut client = EdgeMonitoringProxyClient::new(self.channel.clone());
        Ok(client.query_metrics(request.clone()).await?.into_inner())
    }
}

/// Per-timestamp accumulator for one metric.
type MetricAccumulator = BTreeMap<i64, pb::MetricValue>;

/// Fan-out/merge engine for the asset query plane.
pub struct QueryMerger {
    proxy: Arc<dyn EdgeProxy>,
}

impl QueryMerger {
    pub fn new(proxy: Arc<dyn EdgeProxy>) -> Self {
        QueryMerger { proxy }
    }

    /// Union of metric names across the resolved controllers.
    pub async fn list_metrics(
        &self,
        selector_map: &SelectorMap,
    ) -> Result<pb::MetricsList, PlaneError> {
        let responses = self
            .fan_out(selector_map.iter().map(|(ec, sub)| (ec.clone(), sub.clone())), |sub| {
                let proxy = self.proxy.clone();
                async move { proxy.list_metrics(&sub).await }
            })
            .await;

        let mut names = BTreeSet::new();
        for (edge_controller_id, result) in responses {
            match result {
                Ok(list) => names.extend(list.metrics),
                Err(e) => {
                    warn!(
                        edge_controller_id = %edge_controller_id,
                        error = %e,
                        "skipping controller in metric listing"
                    );
                }
            }
        }
        Ok(pb::MetricsList {
            metrics: names.into_iter().collect(),
        })
    }

    /// Query metrics across the resolved controllers and merge the results.
    /// The request is validated before any controller is contacted.
    pub async fn query_metrics(
        &self,
        request: &pb::QueryMetricsRequest,
        selector_map: &SelectorMap,
    ) -> Result<pb::QueryMetricsResult, PlaneError> {
        let aggregation = validator::validate_query_metrics_request(request)?;
        let metrics = request.metrics.as_slice();
        let time_range = request.time_range.clone();

        if selector_map.is_empty() {
            return Ok(pb::QueryMetricsResult::default());
        }

        // With a single controller there is nothing to merge; forward the
        // request unchanged and return its response verbatim, errors
        // included.
        if selector_map.len() == 1 {
            let sub = selector_map.values().next().unwrap();
            let request = build_request(sub, metrics, time_range.clone(), aggregation);
            return self.call_with_deadline(&request).await;
        }

        // Algebraic rewrite: ask the controllers for SUM and restore the
        // caller's AVG in the final pass, dividing by the asset count.
        let outbound = match aggregation {
            pb::AggregationType::Avg => pb::AggregationType::Sum,
            other => other,
        };

        let responses = self
            .fan_out(
                selector_map.iter().map(|(ec, sub)| (ec.clone(), sub.clone())),
                |sub| {
                    let proxy = self.proxy.clone();
                    let request = build_request(&sub, metrics, time_range.clone(), outbound);
                    async move {
                        match timeout(EDGE_PROXY_DEADLINE, proxy.query_metrics(&request)).await {
                            Ok(result) => result,
                            Err(_) => Err(PlaneError::DeadlineExceeded),
                        }
                    }
                },
            )
            .await;

        let mut accumulators: HashMap<String, MetricAccumulator> = HashMap::new();
        for (edge_controller_id, result) in responses {
            match result {
                Ok(response) => merge_response(&mut accumulators, &edge_controller_id, response),
                Err(e) => {
                    warn!(
                        edge_controller_id = %edge_controller_id,
                        error = %e,
                        "skipping failed controller in metrics merge"
                    );
                }
            }
        }

        finalize(accumulators, aggregation)
    }

    async fn call_with_deadline(
        &self,
        request: &pb::QueryMetricsRequest,
    ) -> Result<pb::QueryMetricsResult, PlaneError> {
        match timeout(EDGE_PROXY_DEADLINE, self.proxy.query_metrics(request)).await {
            Ok(result) => result,
            Err(_) => Err(PlaneError::DeadlineExceeded),
        }
    }

    async fn fan_out<T, F, Fut>(
        &self,
        targets: impl Iterator<Item = (String, pb::AssetSelector)>,
        call: F,
    ) -> Vec<(String, Result<T, PlaneError>)>
    where
        F: Fn(pb::AssetSelector) -> Fut,
        Fut: std::future::Future<Output = Result<T, PlaneError>>,
    {
        stream::iter(targets.map(|(edge_controller_id, sub)| {
            let fut = call(sub);
            async move { (edge_controller_id, fut.await) }
        }))
        .buffer_unordered(FANOUT_CONCURRENCY)
        .collect()
        .await
    }
}

fn build_request(
    selector: &pb::AssetSelector,
    metrics: &[String],
    time_range: Option<pb::TimeRange>,
    aggregation: pb::AggregationType,
) -> pb::QueryMetricsRequest {
    pb::QueryMetricsRequest {
        assets: Some(selector.clone()),
        metrics: metrics.to_vec(),
        time_range,
        aggregation: aggregation as i32,
    }
}

/// Fold one controller response into the accumulators. Only the first
/// asset-metric entry of each metric is merged; a multi-asset response is
/// logged and the extra entries are dropped (known limitation of the
/// summed sub-protocol).
fn merge_response(
    accumulators: &mut HashMap<String, MetricAccumulator>,
    edge_controller_id: &str,
    response: pb::QueryMetricsResult,
) {
    for (metric_name, asset_metrics) in response.metrics {
        if asset_metrics.metrics.len() > 1 {
            warn!(
                edge_controller_id = %edge_controller_id,
                metric = %metric_name,
                entries = asset_metrics.metrics.len(),
                "multi-asset response from controller, merging first entry only"
            );
        }
        let Some(entry) = asset_metrics.metrics.into_iter().next() else {
            continue;
        };

        let accumulator = accumulators.entry(metric_name).or_default();
        for value in entry.values {
            accumulator
                .entry(value.timestamp)
                .and_modify(|merged| {
                    merged.value += value.value;
                    merged.asset_count += value.asset_count;
                })
                .or_insert(value);
        }
    }
}

/// Produce the sorted sample sequences and apply the final aggregation.
fn finalize(
    accumulators: HashMap<String, MetricAccumulator>,
    aggregation: pb::AggregationType,
) -> Result<pb::QueryMetricsResult, PlaneError> {
    let mut metrics = HashMap::with_capacity(accumulators.len());
    for (metric_name, accumulator) in accumulators {
        let values: Vec<pb::MetricValue> = match aggregation {
            pb::AggregationType::Sum => accumulator.into_values().collect(),
            pb::AggregationType::Avg => accumulator
                .into_values()
                .map(|sample| pb::MetricValue {
                    timestamp: sample.timestamp,
                    // A present sample arose from at least one asset, but a
                    // controller may still report a zero count.
                    value: sample.value / sample.asset_count.max(1),
                    asset_count: sample.asset_count,
                })
                .collect(),
            pb::AggregationType::None => {
                return Err(PlaneError::invalid_argument(
                    "cannot merge multi-controller results without aggregation",
                ))
            }
        };

        metrics.insert(
            metric_name,
            pb::AssetMetrics {
                metrics: vec![pb::AssetMetricValues {
                    // Controller granularity has been summed away.
                    asset_id: String::new(),
                    values,
                    aggregation: aggregation as i32,
                }],
            },
        );
    }
    Ok(pb::QueryMetricsResult { metrics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Proxy answering from a canned per-controller table and recording
    /// every request it receives.
    struct MockProxy {
        responses: HashMap<String, Option<pb::QueryMetricsResult>>,
        requests: Mutex<Vec<pb::QueryMetricsRequest>>,
    }

    impl MockProxy {
        fn new() -> Self {
            MockProxy {
                responses: HashMap::new(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn respond(mut self, edge_controller_id: &str, response: pb::QueryMetricsResult) -> Self {
            self.responses
                .insert(edge_controller_id.to_string(), Some(response));
            self
        }

        fn fail(mut self, edge_controller_id: &str) -> Self {
            self.responses.insert(edge_controller_id.to_string(), None);
            self
        }

        fn recorded(&self) -> Vec<pb::QueryMetricsRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EdgeProxy for MockProxy {
        async fn list_metrics(
            &self,
            selector: &pb::AssetSelector,
        ) -> Result<pb::MetricsList, PlaneError> {
            match self.responses.get(&selector.edge_controller_id) {
                Some(Some(_)) | None => Ok(pb::MetricsList {
                    metrics: vec![format!("m-{}", selector.edge_controller_id), "cpu".to_string()],
                }),
                Some(None) => Err(PlaneError::unavailable("controller down")),
            }
        }

        async fn query_metrics(
            &self,
            request: &pb::QueryMetricsRequest,
        ) -> Result<pb::QueryMetricsResult, PlaneError> {
            self.requests.lock().unwrap().push(request.clone());
            let edge_controller_id = request
                .assets
                .as_ref()
                .map(|s| s.edge_controller_id.clone())
                .unwrap_or_default();
            match self.responses.get(&edge_controller_id) {
                Some(Some(response)) => Ok(response.clone()),
                _ => Err(PlaneError::unavailable("controller down")),
            }
        }
    }

    fn sub_selector(edge_controller_id: &str) -> pb::AssetSelector {
        pb::AssetSelector {
            organization_id: "org-1".to_string(),
            edge_controller_id: edge_controller_id.to_string(),
            ..Default::default()
        }
    }

    fn selector_map(ids: &[&str]) -> SelectorMap {
        ids.iter()
            .map(|id| (id.to_string(), sub_selector(id)))
            .collect()
    }

    fn query_request(metrics: &[&str], aggregation: pb::AggregationType) -> pb::QueryMetricsRequest {
        pb::QueryMetricsRequest {
            assets: Some(pb::AssetSelector {
                organization_id: "org-1".to_string(),
                ..Default::default()
            }),
            metrics: metrics.iter().map(|s| s.to_string()).collect(),
            time_range: Some(pb::TimeRange {
                timestamp: 1000,
                ..Default::default()
            }),
            aggregation: aggregation as i32,
        }
    }

    /// Unaggregated queries are only valid for exactly one asset.
    fn single_asset_request(metrics: &[&str]) -> pb::QueryMetricsRequest {
        let mut request = query_request(metrics, pb::AggregationType::None);
        request.assets.as_mut().unwrap().asset_ids = vec!["a1".to_string()];
        request
    }

    fn response(metric: &str, values: &[(i64, i64, i64)]) -> pb::QueryMetricsResult {
        let mut metrics = HashMap::new();
        metrics.insert(
            metric.to_string(),
            pb::AssetMetrics {
                metrics: vec![pb::AssetMetricValues {
                    asset_id: String::new(),
                    values: values
                        .iter()
                        .map(|&(timestamp, value, asset_count)| pb::MetricValue {
                            timestamp,
                            value,
                            asset_count,
                        })
                        .collect(),
                    aggregation: pb::AggregationType::Sum as i32,
                }],
            },
        );
        pb::QueryMetricsResult { metrics }
    }

    fn values_of<'a>(
        result: &'a pb::QueryMetricsResult,
        metric: &str,
    ) -> &'a [pb::MetricValue] {
        &result.metrics[metric].metrics[0].values
    }

    #[tokio::test]
    async fn single_controller_passes_through() {
        let canned = response("m", &[(1000, 10, 2)]);
        let proxy = Arc::new(MockProxy::new().respond("ec1", canned.clone()));
        let merger = QueryMerger::new(proxy.clone());

        let result = merger
            .query_metrics(
                &query_request(&["m"], pb::AggregationType::Avg),
                &selector_map(&["ec1"]),
            )
            .await
            .unwrap();

        // Bit-for-bit the sub-call's output.
        assert_eq!(result, canned);
        // The outbound request kept the caller's aggregation.
        let recorded = proxy.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].aggregation, pb::AggregationType::Avg as i32);
    }

    #[tokio::test]
    async fn single_controller_error_passes_through() {
        let proxy = Arc::new(MockProxy::new().fail("ec1"));
        let merger = QueryMerger::new(proxy);

        let err = merger
            .query_metrics(&single_asset_request(&["m"]), &selector_map(&["ec1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, PlaneError::Unavailable(_)));
    }

    #[tokio::test]
    async fn avg_is_rewritten_to_sum_and_restored() {
        let proxy = Arc::new(
            MockProxy::new()
                .respond("ec1", response("m", &[(1000, 10, 2)]))
                .respond("ec2", response("m", &[(1000, 20, 3)])),
        );
        let merger = QueryMerger::new(proxy.clone());

        let result = merger
            .query_metrics(
                &query_request(&["m"], pb::AggregationType::Avg),
                &selector_map(&["ec1", "ec2"]),
            )
            .await
            .unwrap();

        // Outbound sub-requests carried SUM.
        for request in proxy.recorded() {
            assert_eq!(request.aggregation, pb::AggregationType::Sum as i32);
        }

        let values = values_of(&result, "m");
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].timestamp, 1000);
        assert_eq!(values[0].value, (10 + 20) / (2 + 3));
        assert_eq!(values[0].asset_count, 5);
        assert_eq!(
            result.metrics["m"].metrics[0].aggregation,
            pb::AggregationType::Avg as i32
        );
        // Asset identity is summed away.
        assert!(result.metrics["m"].metrics[0].asset_id.is_empty());
    }

    #[tokio::test]
    async fn sum_merges_and_orders_by_timestamp() {
        let proxy = Arc::new(
            MockProxy::new()
                .respond("ec1", response("m", &[(2000, 4, 1), (1000, 1, 1)]))
                .respond("ec2", response("m", &[(1000, 2, 2), (3000, 8, 1)])),
        );
        let merger = QueryMerger::new(proxy);

        let result = merger
            .query_metrics(
                &query_request(&["m"], pb::AggregationType::Sum),
                &selector_map(&["ec1", "ec2"]),
            )
            .await
            .unwrap();

        let values = values_of(&result, "m");
        let timestamps: Vec<i64> = values.iter().map(|v| v.timestamp).collect();
        assert_eq!(timestamps, vec![1000, 2000, 3000]);
        assert_eq!(values[0].value, 3);
        assert_eq!(values[0].asset_count, 3);
        assert_eq!(values[1].value, 4);
        assert_eq!(values[2].value, 8);
    }

    #[tokio::test]
    async fn failed_controller_is_skipped() {
        let proxy = Arc::new(
            MockProxy::new()
                .respond("ec1", response("m", &[(1000, 10, 2)]))
                .fail("ec2"),
        );
        let merger = QueryMerger::new(proxy);

        let result = merger
            .query_metrics(
                &query_request(&["m"], pb::AggregationType::Sum),
                &selector_map(&["ec1", "ec2"]),
            )
            .await
            .unwrap();

        let values = values_of(&result, "m");
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, 10);
    }

    #[tokio::test]
    async fn multi_asset_response_merges_first_entry_only() {
        let mut canned = response("m", &[(1000, 10, 1)]);
        canned
            .metrics
            .get_mut("m")
            .unwrap()
            .metrics
            .push(pb::AssetMetricValues {
                asset_id: "a2".to_string(),
                values: vec![pb::MetricValue {
                    timestamp: 1000,
                    value: 100,
                    asset_count: 1,
                }],
                aggregation: pb::AggregationType::Sum as i32,
            });
        let proxy = Arc::new(
            MockProxy::new()
                .respond("ec1", canned)
                .respond("ec2", response("m", &[(1000, 5, 1)])),
        );
        let merger = QueryMerger::new(proxy);

        let result = merger
            .query_metrics(
                &query_request(&["m"], pb::AggregationType::Sum),
                &selector_map(&["ec1", "ec2"]),
            )
            .await
            .unwrap();

        assert_eq!(values_of(&result, "m")[0].value, 15);
    }

    #[tokio::test]
    async fn multi_controller_none_aggregation_is_invalid() {
        let proxy = Arc::new(
            MockProxy::new()
                .respond("ec1", response("m", &[(1000, 1, 1)]))
                .respond("ec2", response("m", &[(1000, 2, 1)])),
        );
        let merger = QueryMerger::new(proxy);

        let err = merger
            .query_metrics(&single_asset_request(&["m"]), &selector_map(&["ec1", "ec2"]))
            .await
            .unwrap_err();
        assert!(matches!(err, PlaneError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn invalid_request_is_rejected_before_fan_out() {
        let proxy = Arc::new(MockProxy::new().respond("ec1", response("m", &[(1000, 1, 1)])));
        let merger = QueryMerger::new(proxy.clone());

        // No aggregation method with an unconstrained selector.
        let err = merger
            .query_metrics(
                &query_request(&["m"], pb::AggregationType::None),
                &selector_map(&["ec1"]),
            )
            .await
            .unwrap_err();
        match err {
            PlaneError::InvalidArgument(message) => {
                assert!(message.contains("without aggregation method"))
            }
            other => panic!("expected InvalidArgument, got {:?}", other),
        }

        // Missing time range.
        let mut request = query_request(&["m"], pb::AggregationType::Sum);
        request.time_range = None;
        let err = merger
            .query_metrics(&request, &selector_map(&["ec1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, PlaneError::InvalidArgument(_)));

        // Nothing reached a controller.
        assert!(proxy.recorded().is_empty());
    }

    #[tokio::test]
    async fn empty_map_yields_empty_result() {
        let merger = QueryMerger::new(Arc::new(MockProxy::new()));
        let result = merger
            .query_metrics(
                &query_request(&[], pb::AggregationType::Sum),
                &SelectorMap::new(),
            )
            .await
            .unwrap();
        assert!(result.metrics.is_empty());
    }

    #[tokio::test]
    async fn list_metrics_unions_and_sorts() {
        let proxy = Arc::new(MockProxy::new().fail("ec3"));
        let merger = QueryMerger::new(proxy);

        let list = merger
            .list_metrics(&selector_map(&["ec1", "ec2", "ec3"]))
            .await
            .unwrap();

        // ec3 failed its query table but list_metrics only fails for
        // recorded failures; cpu is shared and deduplicated.
        assert!(list.metrics.contains(&"cpu".to_string()));
        assert!(list.metrics.contains(&"m-ec1".to_string()));
        assert!(list.metrics.contains(&"m-ec2".to_string()));
        assert!(!list.metrics.contains(&"m-ec3".to_string()));
        let mut sorted = list.metrics.clone();
        sorted.sort();
        assert_eq!(sorted, list.metrics);
    }
}
