//! Grid service: owns the cluster inventory and the current grid snapshot.
//!
//! Drives the one-way pipeline:
//!   inventory → batch query → interpreter → metadata → grid rows
//!
//! API handlers only read the snapshot. `refresh()` is the single writer and
//! tags each run with a sequence number so a slow response can never
//! overwrite the result of a newer refresh.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{GridError, HealthError, InterpreterError};
use crate::query::{build_batch, QueryEngine, TimeRange};
use crate::strings;
use crate::telemetry::{TelemetryClient, TelemetryEvent};

use super::cluster_metadata::{MonitoredClusterMetaData, UnmonitoredClusterMetaData};
use super::grid::{
    self, ClusterRowView, ClusterStatusSummary, GridQueryProps, GridRow, StatusCategory,
};
use super::response_interpreter::DraftGridResponseInterpreter;
use super::types::{ManagedCluster, MonitoredClusterQueryResponseResultRow};

/// Grid contents as of the last applied refresh.
#[derive(Debug, Clone, Default)]
pub struct GridSnapshot {
    pub monitored: Vec<GridRow>,
    pub unmonitored: Vec<GridRow>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct PageState {
    snapshot: GridSnapshot,
    loading: bool,
    error: Option<String>,
    /// Rows for unavailable workspaces, synthesized once on initial load.
    retained_rows: Option<Vec<MonitoredClusterQueryResponseResultRow>>,
}

/// What a refresh did with its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { sequence: u64, clusters: usize },
    /// A newer refresh was issued while this one was in flight.
    Discarded { sequence: u64 },
}

/// Sorted, filtered grid as served to clients.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct GridState {
    pub rows: Vec<ClusterRowView>,
    pub summary: ClusterStatusSummary,
    pub loading: bool,
    pub error: Option<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Liveness payload for `/health`.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct ServiceHealth {
    pub status: String,
    pub version: String,
    pub session_id: String,
    pub clusters: u64,
    pub loading: bool,
    pub refreshed_at: Option<DateTime<Utc>>,
}

pub struct GridService {
    engine: Arc<dyn QueryEngine>,
    engine_config: EngineConfig,
    clusters: RwLock<Vec<ManagedCluster>>,
    state: RwLock<PageState>,
    pending_query_sequence_number: AtomicU64,
    session_id: String,
    telemetry: Option<TelemetryClient>,
}

fn new_session_id() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

impl GridService {
    /// Create a service whose grid starts with every cluster in its
    /// unqueried state.
    pub fn new(
        engine: Arc<dyn QueryEngine>,
        engine_config: EngineConfig,
        clusters: Vec<ManagedCluster>,
    ) -> Result<Self, GridError> {
        let snapshot = build_snapshot(&clusters, &[], None)?;
        Ok(Self {
            engine,
            engine_config,
            clusters: RwLock::new(clusters),
            state: RwLock::new(PageState {
                snapshot,
                ..PageState::default()
            }),
            pending_query_sequence_number: AtomicU64::new(0),
            session_id: new_session_id(),
            telemetry: None,
        })
    }

    pub fn with_telemetry(mut self, telemetry: TelemetryClient) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Replace the inventory (e.g. the host's subscription list changed).
    /// The next refresh is treated as an initial load again.
    /// Any refresh still in flight was issued against the old inventory and
    /// is discarded when it completes.
    pub async fn set_clusters(&self, clusters: Vec<ManagedCluster>) -> Result<(), GridError> {
        let snapshot = build_snapshot(&clusters, &[], None)?;
        let mut state = self.state.write().await;
        let sequence = self.pending_query_sequence_number.fetch_add(1, Ordering::SeqCst) + 1;
        *self.clusters.write().await = clusters;
        state.snapshot = snapshot;
        state.loading = false;
        state.error = None;
        state.retained_rows = None;
        debug!(sequence, "inventory replacement supersedes in-flight refreshes");
        info!(
            clusters = state.snapshot.monitored.len() + state.snapshot.unmonitored.len(),
            "inventory replaced"
        );
        Ok(())
    }

    pub async fn health(&self) -> ServiceHealth {
        let clusters = self.clusters.read().await.len() as u64;
        let state = self.state.read().await;
        ServiceHealth {
            status: if state.error.is_some() { "degraded" } else { "ok" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            session_id: self.session_id.clone(),
            clusters,
            loading: state.loading,
            refreshed_at: state.snapshot.refreshed_at,
        }
    }

    /// True once a refresh has been applied.
    pub async fn is_ready(&self) -> bool {
        self.state.read().await.snapshot.refreshed_at.is_some()
    }

    pub async fn clusters(&self) -> Vec<ManagedCluster> {
        self.clusters.read().await.clone()
    }

    /// Run one batch query and apply it unless a newer refresh started
    /// meanwhile.
    pub async fn refresh(&self) -> Result<RefreshOutcome, GridError> {
        // Sequence, inventory and retained rows are taken under one state lock
        // so an inventory replacement cannot interleave with them.
        let (sequence, clusters, retained) = {
            let mut state = self.state.write().await;
            let sequence = self.pending_query_sequence_number.fetch_add(1, Ordering::SeqCst) + 1;
            let clusters = self.clusters.read().await.clone();
            state.loading = true;
            (sequence, clusters, state.retained_rows.clone())
        };

        let result = self.load(&clusters, retained).await;

        let mut state = self.state.write().await;
        if self.pending_query_sequence_number.load(Ordering::SeqCst) != sequence {
            debug!(sequence, "discarding stale grid response");
            return Ok(RefreshOutcome::Discarded { sequence });
        }
        state.loading = false;
        match result {
            Ok((snapshot, retained_rows)) => {
                let count = snapshot.monitored.len() + snapshot.unmonitored.len();
                state.snapshot = snapshot;
                state.retained_rows = Some(retained_rows);
                state.error = None;
                info!(sequence, clusters = count, "grid refreshed");
                Ok(RefreshOutcome::Applied {
                    sequence,
                    clusters: count,
                })
            }
            Err(e) => {
                warn!(sequence, error = %e, "grid refresh failed");
                state.error = Some(strings::GRID_LOAD_FAILED.to_string());
                drop(state);
                if let Some(telemetry) = &self.telemetry {
                    let event = TelemetryEvent::load_failed(&self.session_id, &e.to_string());
                    if let Err(push_err) = telemetry.push(&event).await {
                        warn!(error = %push_err, "failed to push grid failure telemetry");
                    }
                }
                Err(e)
            }
        }
    }

    async fn load(
        &self,
        clusters: &[ManagedCluster],
        retained: Option<Vec<MonitoredClusterQueryResponseResultRow>>,
    ) -> Result<(GridSnapshot, Vec<MonitoredClusterQueryResponseResultRow>), GridError> {
        let mapping = grid::workspace_to_monitored_clusters_mapping(clusters);

        let mut rows = if mapping.accessible.is_empty() {
            Vec::new()
        } else {
            let range = TimeRange::last_hours(self.engine_config.lookback_hours);
            let (pending, batch) = build_batch(
                &mapping.accessible,
                Some(&range),
                &self.session_id,
                self.engine_config.timeout_secs,
            )?;
            let response = self.engine.batch(&batch).await?;
            DraftGridResponseInterpreter::new(&pending).interpret(&response)?
        };

        let retained = retained.unwrap_or_else(|| {
            DraftGridResponseInterpreter::unavailable_workspace_rows(&mapping.unavailable)
        });
        rows.extend(retained.iter().cloned());

        let snapshot = build_snapshot(clusters, &rows, Some(Utc::now()))?;
        Ok((snapshot, retained))
    }

    /// Current grid sorted by `props`, narrowed by `search` and `category`.
    /// The summary always covers the full grid.
    pub async fn grid_state(
        &self,
        props: &GridQueryProps,
        search: &str,
        category: StatusCategory,
    ) -> Result<GridState, HealthError> {
        let state = self.state.read().await;
        let snapshot = &state.snapshot;
        let summary = grid::tally_cluster_statuses(&snapshot.monitored, &snapshot.unmonitored)?;

        let all: Vec<GridRow> = snapshot
            .monitored
            .iter()
            .chain(&snapshot.unmonitored)
            .cloned()
            .collect();
        let mut rows = grid::filter_rows(&all, search, category)?;
        grid::sort_rows(&mut rows, props);

        Ok(GridState {
            rows: rows.iter().map(GridRow::view).collect(),
            summary,
            loading: state.loading,
            error: state.error.clone(),
            refreshed_at: snapshot.refreshed_at,
        })
    }

    pub async fn summary(&self) -> Result<ClusterStatusSummary, HealthError> {
        let state = self.state.read().await;
        grid::tally_cluster_statuses(&state.snapshot.monitored, &state.snapshot.unmonitored)
    }

    /// Look a cluster up by name or cluster id (case-insensitive).
    pub async fn cluster(&self, key: &str) -> Option<ClusterRowView> {
        let state = self.state.read().await;
        state
            .snapshot
            .monitored
            .iter()
            .chain(&state.snapshot.unmonitored)
            .find(|row| {
                let meta = row.metadata();
                meta.name().eq_ignore_ascii_case(key) || meta.cluster_id().eq_ignore_ascii_case(key)
            })
            .map(GridRow::view)
    }
}

/// Match result rows to managed clusters and format the grid.
///
/// A row naming a cluster outside the inventory means the batch and the
/// inventory disagree, which is treated as fatal.
pub fn build_snapshot(
    clusters: &[ManagedCluster],
    rows: &[MonitoredClusterQueryResponseResultRow],
    refreshed_at: Option<DateTime<Utc>>,
) -> Result<GridSnapshot, GridError> {
    let known: HashSet<String> = clusters
        .iter()
        .filter(|c| c.is_monitored())
        .map(|c| c.expected_cluster_id().to_lowercase())
        .collect();

    let mut by_id: HashMap<String, &MonitoredClusterQueryResponseResultRow> = HashMap::new();
    for row in rows {
        let Some(id) = row.cluster_id.as_deref() else {
            continue;
        };
        let key = id.to_lowercase();
        if !known.contains(&key) {
            return Err(InterpreterError::UnknownCluster(id.to_string()).into());
        }
        by_id.entry(key).or_insert(row);
    }

    let mut snapshot = GridSnapshot {
        refreshed_at,
        ..GridSnapshot::default()
    };
    for cluster in clusters {
        if cluster.is_monitored() {
            let row = by_id
                .get(&cluster.expected_cluster_id().to_lowercase())
                .copied();
            let meta = MonitoredClusterMetaData::new(row, cluster)?;
            snapshot.monitored.push(meta.format_monitored_cluster_row());
        } else {
            let meta = UnmonitoredClusterMetaData::new(cluster);
            snapshot.unmonitored.push(meta.format_unmonitored_cluster_row());
        }
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{HealthStatus, ResponseStatus, WorkspaceRef};

    fn cluster(name: &str, monitored: bool) -> ManagedCluster {
        ManagedCluster {
            resource_id: format!("/rid/{name}"),
            name: name.to_string(),
            kind: "aks".to_string(),
            kubernetes_version: None,
            location: None,
            workspace: monitored.then(|| WorkspaceRef {
                id: "ws".to_string(),
                resource_id: "/subscriptions/s/resourceGroups/rg/providers/p/workspaces/ws".to_string(),
            }),
            workspace_unavailable: false,
        }
    }

    #[test]
    fn snapshot_matches_rows_case_insensitively() {
        let clusters = vec![cluster("a", true), cluster("b", false)];
        let rows = vec![MonitoredClusterQueryResponseResultRow::failed(
            "/RID/A",
            ResponseStatus::Unauthorized,
            "denied".to_string(),
        )];
        let snapshot = build_snapshot(&clusters, &rows, None).unwrap();
        assert_eq!(snapshot.monitored.len(), 1);
        assert_eq!(snapshot.unmonitored.len(), 1);
        assert_eq!(snapshot.monitored[0].metadata().status(), HealthStatus::UnAuthorized);
        assert_eq!(snapshot.unmonitored[0].metadata().status(), HealthStatus::Unmonitored);
    }

    #[test]
    fn row_for_unknown_cluster_is_fatal() {
        let clusters = vec![cluster("a", true)];
        let rows = vec![MonitoredClusterQueryResponseResultRow::failed(
            "/rid/zzz",
            ResponseStatus::NoData,
            String::new(),
        )];
        let err = build_snapshot(&clusters, &rows, None).unwrap_err();
        assert!(matches!(
            err,
            GridError::Interpreter(InterpreterError::UnknownCluster(id)) if id == "/rid/zzz"
        ));
    }

    #[test]
    fn session_ids_are_hex() {
        let id = new_session_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
