//! Query plane library for multi-cluster monitoring
//!
//! This crate provides the core functionality for:
//! - Template-driven metric queries against per-cluster backends
//! - Cluster summary, platform stats and raw query operations
//! - Cross-cluster fan-out with selector resolution and result merging
//! - Health checks and observability

pub mod collector;
pub mod error;
pub mod health;
pub mod inventory;
pub mod manager;
pub mod merger;
pub mod models;
pub mod observability;
pub mod proto;
pub mod provider;
pub mod selector;
pub mod validator;
pub mod watcher;

pub use error::PlaneError;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::PlaneMetrics;
