pub mod vector;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::TelemetryConfig;
use crate::domain::grid::ClusterStatusSummary;
use crate::domain::grid_service::GridService;

pub use vector::TelemetryClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryKind {
    GridLoadFailed,
    GridSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: TelemetryKind,
    pub session_id: String,
    pub daemon_version: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub summary: Option<ClusterStatusSummary>,
}

impl TelemetryEvent {
    pub fn load_failed(session_id: &str, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: TelemetryKind::GridLoadFailed,
            session_id: session_id.to_string(),
            daemon_version: env!("CARGO_PKG_VERSION").to_string(),
            message: Some(message.to_string()),
            summary: None,
        }
    }

    pub fn summary(session_id: &str, summary: ClusterStatusSummary) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: TelemetryKind::GridSummary,
            session_id: session_id.to_string(),
            daemon_version: env!("CARGO_PKG_VERSION").to_string(),
            message: None,
            summary: Some(summary),
        }
    }
}

/// Push a grid summary every `push_interval_secs`. Zero disables the loop.
pub async fn run_push_loop(service: Arc<GridService>, config: &TelemetryConfig) {
    let client = TelemetryClient::new(&config.vector_url);
    let interval_secs = config.push_interval_secs;
    if interval_secs == 0 {
        info!("telemetry push interval is 0, summary push loop disabled");
        return;
    }

    info!(
        vector_url = %config.vector_url,
        interval_secs = interval_secs,
        "Starting telemetry push loop"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;
        let summary = match service.summary().await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "Failed to summarize grid for telemetry");
                continue;
            }
        };
        let event = TelemetryEvent::summary(service.session_id(), summary);
        if let Err(e) = client.push(&event).await {
            warn!(error = %e, "Failed to push telemetry to Vector");
        }
    }
}
