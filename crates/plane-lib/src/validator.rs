//! Request validation
//!
//! Shared checks applied before any operation touches the inventory or a
//! backend. Every rejection is an `InvalidArgument` naming the offending
//! field.

use crate::error::PlaneError;
use crate::proto::monitoring::v1 as pb;

/// Every request names the organization it is scoped to.
pub fn validate_organization_id(organization_id: &str) -> Result<(), PlaneError> {
    if organization_id.is_empty() {
        return Err(PlaneError::invalid_argument("organization_id is required"));
    }
    Ok(())
}

/// Both identifiers of a cluster-scoped request must be present.
pub fn validate_cluster_ids(organization_id: &str, cluster_id: &str) -> Result<(), PlaneError> {
    validate_organization_id(organization_id)?;
    if cluster_id.is_empty() {
        return Err(PlaneError::invalid_argument("cluster_id is required"));
    }
    Ok(())
}

/// Raw queries additionally need a non-empty query string.
pub fn validate_query_request(request: &pb::QueryRequest) -> Result<(), PlaneError> {
    validate_cluster_ids(&request.organization_id, &request.cluster_id)?;
    if request.query.is_empty() {
        return Err(PlaneError::invalid_argument("query is required"));
    }
    Ok(())
}

/// A time range is either a single point in time or a window, never both.
///
/// Point form: `timestamp` set, `time_start`, `time_end` and `resolution`
/// all zero. Window form: `timestamp` zero and at least one of `time_start`
/// or `time_end` set.
pub fn validate_time_range(range: &pb::TimeRange) -> Result<(), PlaneError> {
    if range.timestamp != 0 {
        if range.time_start != 0 || range.time_end != 0 || range.resolution != 0 {
            return Err(PlaneError::invalid_argument(
                "timestamp and a time window are mutually exclusive",
            ));
        }
        return Ok(());
    }
    if range.time_start == 0 && range.time_end == 0 {
        return Err(PlaneError::invalid_argument(
            "either timestamp or a time window is required",
        ));
    }
    Ok(())
}

/// An asset selector must at least carry the organization.
pub fn validate_asset_selector(selector: &pb::AssetSelector) -> Result<(), PlaneError> {
    validate_organization_id(&selector.organization_id)
}

/// Validate a metrics query and return its parsed aggregation type.
pub fn validate_query_metrics_request(
    request: &pb::QueryMetricsRequest,
) -> Result<pb::AggregationType, PlaneError> {
    let selector = request
        .assets
        .as_ref()
        .ok_or_else(|| PlaneError::invalid_argument("asset selector is required"))?;
    validate_asset_selector(selector)?;

    let range = request
        .time_range
        .as_ref()
        .ok_or_else(|| PlaneError::invalid_argument("time range is required"))?;
    validate_time_range(range)?;

    let aggregation = pb::AggregationType::from_i32(request.aggregation).ok_or_else(|| {
        PlaneError::invalid_argument(format!("unknown aggregation type {}", request.aggregation))
    })?;

    // Without an aggregation method a result can only describe one asset.
    if aggregation == pb::AggregationType::None && selector.asset_ids.len() != 1 {
        return Err(PlaneError::invalid_argument(
            "metrics for more than one asset requested without aggregation method",
        ));
    }

    Ok(aggregation)
}

/// Requests addressed to this deployment must name its organization.
pub fn validate_organization(expected: &str, actual: &str) -> Result<(), PlaneError> {
    if expected != actual {
        return Err(PlaneError::invalid_argument(format!(
            "request for organization {} received by organization {}",
            actual, expected
        )));
    }
    Ok(())
}

/// Identity of the deployment, taken from its environment. IDs the
/// environment leaves unset match anything; a set ID rejects requests that
/// name a different one.
#[derive(Debug, Clone, Default)]
pub struct PlaneIdentity {
    pub organization_id: Option<String>,
    pub cluster_id: Option<String>,
}

impl PlaneIdentity {
    pub fn check_organization(&self, actual: &str) -> Result<(), PlaneError> {
        match &self.organization_id {
            Some(expected) => validate_organization(expected, actual),
            None => Ok(()),
        }
    }

    pub fn check_cluster(&self, actual: &str) -> Result<(), PlaneError> {
        match &self.cluster_id {
            Some(expected) if expected != actual => Err(PlaneError::invalid_argument(format!(
                "request for cluster {} received by cluster {}",
                actual, expected
            ))),
            _ => Ok(()),
        }
    }
}
