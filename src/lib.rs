//! Multi-cluster Kubernetes health grid: batch-queries monitoring
//! workspaces, turns per-cluster node and pod status counts into health
//! classifications, and serves a sortable, filterable grid.

pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod inventory;
pub mod query;
pub mod server;
pub mod strings;
pub mod telemetry;

pub use domain::grid_service::{GridService, GridState, RefreshOutcome};
pub use domain::types::{HealthStatus, ManagedCluster, ResponseStatus};
pub use error::{GridError, HealthError, InterpreterError, QueryError};
