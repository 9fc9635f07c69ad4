//! Batch query engine seam.
//!
//! One batch carries one query statement per workspace; the engine answers
//! each statement independently, so a single workspace failing does not
//! fail the batch.

pub mod builder;
pub mod http;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::WorkspaceRef;
use crate::error::QueryError;

pub use builder::build_batch;
pub use http::HttpQueryEngine;

/// Time window the health query aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn last_hours(hours: i64) -> Self {
        let end = Utc::now();
        Self {
            start: end - Duration::hours(hours),
            end,
        }
    }
}

/// One per-workspace request, kept alongside the batch so responses can be
/// matched back to the clusters they were meant to cover.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterQueryRequest {
    pub id: String,
    pub workspace: WorkspaceRef,
    pub cluster_ids: Vec<String>,
}

// ── Wire format ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchQueryRequest {
    pub session_id: String,
    pub timeout_secs: u64,
    pub requests: Vec<QueryStatement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryStatement {
    pub id: String,
    pub workspace_id: String,
    pub workspace_resource_id: String,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchQueryResponse {
    pub responses: Vec<QueryResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub id: String,
    pub status: u16,
    pub body: QueryResponseBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResponseBody {
    Tables { tables: Vec<Table> },
    Error { error: QueryErrorBody },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub name: Option<String>,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: Option<String>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn batch(&self, request: &BatchQueryRequest) -> Result<BatchQueryResponse, QueryError>;
}
