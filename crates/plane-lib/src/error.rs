//! Error type shared by every query-plane subsystem
//!
//! One enum covers the failure kinds the plane distinguishes; each variant
//! maps onto exactly one gRPC status code so errors can cross the wire
//! without losing their kind.

use thiserror::Error;

/// Failure kinds of the query plane.
#[derive(Debug, Error)]
pub enum PlaneError {
    /// Request rejected by validation, unparseable query, bad time range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Template name unknown to the provider.
    #[error("not found: {0}")]
    NotFound(String),

    /// Upstream dependency unreachable or a required provider feature absent.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// No translator registered for the backend's provider type.
    #[error("unimplemented: {0}")]
    Unimplemented(String),

    /// Shape mismatch, template render failure, TLS material unreadable.
    #[error("internal: {0}")]
    Internal(String),

    /// Organization-wide aggregation could not obtain its cluster list.
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),

    /// Caller went away.
    #[error("operation canceled")]
    Canceled,

    /// Caller deadline expired.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl PlaneError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        PlaneError::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        PlaneError::NotFound(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        PlaneError::Unavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        PlaneError::Internal(msg.into())
    }
}

impl From<PlaneError> for tonic::Status {
    fn from(err: PlaneError) -> Self {
        let msg = err.to_string();
        match err {
            PlaneError::InvalidArgument(_) => tonic::Status::invalid_argument(msg),
            PlaneError::NotFound(_) => tonic::Status::not_found(msg),
            PlaneError::Unavailable(_) => tonic::Status::unavailable(msg),
            PlaneError::Unimplemented(_) => tonic::Status::unimplemented(msg),
            PlaneError::Internal(_) => tonic::Status::internal(msg),
            PlaneError::FailedPrecondition(_) => tonic::Status::failed_precondition(msg),
            PlaneError::Canceled => tonic::Status::cancelled(msg),
            PlaneError::DeadlineExceeded => tonic::Status::deadline_exceeded(msg),
        }
    }
}

impl From<tonic::Status> for PlaneError {
    fn from(status: tonic::Status) -> Self {
        let msg = status.message().to_string();
        match status.code() {
            tonic::Code::InvalidArgument => PlaneError::InvalidArgument(msg),
            tonic::Code::NotFound => PlaneError::NotFound(msg),
            tonic::Code::Unimplemented => PlaneError::Unimplemented(msg),
            tonic::Code::FailedPrecondition => PlaneError::FailedPrecondition(msg),
            tonic::Code::Internal => PlaneError::Internal(msg),
            tonic::Code::Cancelled => PlaneError::Canceled,
            tonic::Code::DeadlineExceeded => PlaneError::DeadlineExceeded,
            // Everything else reached us over a failing transport.
            _ => PlaneError::Unavailable(msg),
        }
    }
}
