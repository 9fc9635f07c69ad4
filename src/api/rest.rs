use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::grid::{ClusterRowView, ClusterStatusSummary, GridQueryProps, StatusCategory};
use crate::domain::grid_service::{GridService, GridState, RefreshOutcome, ServiceHealth};
use crate::domain::types::ManagedCluster;

/// Shared application state for all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub grid: Arc<GridService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/api/v1/grid", get(grid))
        .route("/api/v1/summary", get(summary))
        .route("/api/v1/refresh", post(refresh))
        .route("/api/v1/clusters", get(clusters).put(replace_clusters))
        .route("/api/v1/clusters/{key}", get(cluster))
        .with_state(state)
}

/// Query string for `/api/v1/grid`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GridParams {
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl GridParams {
    pub fn resolve(&self) -> Result<(GridQueryProps, StatusCategory), String> {
        let props = GridQueryProps::parse(self.sort.as_deref(), self.direction.as_deref())?;
        let category = self
            .status
            .as_deref()
            .map(str::parse::<StatusCategory>)
            .transpose()?
            .unwrap_or(StatusCategory::All);
        Ok((props, category))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// False when a newer refresh superseded this one.
    pub applied: bool,
    pub sequence: u64,
    pub grid: GridState,
}

async fn health(State(state): State<AppState>) -> Json<ServiceHealth> {
    Json(state.grid.health().await)
}

async fn ready(State(state): State<AppState>) -> Result<Json<ServiceHealth>, StatusCode> {
    if state.grid.is_ready().await {
        Ok(Json(state.grid.health().await))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

async fn grid(
    State(state): State<AppState>,
    Query(params): Query<GridParams>,
) -> Result<Json<GridState>, (StatusCode, String)> {
    let (props, category) = params
        .resolve()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    state
        .grid
        .grid_state(&props, params.search.as_deref().unwrap_or(""), category)
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

async fn summary(
    State(state): State<AppState>,
) -> Result<Json<ClusterStatusSummary>, (StatusCode, String)> {
    state
        .grid
        .summary()
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// Run a refresh and return the resulting default-sorted grid.
async fn refresh(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, (StatusCode, String)> {
    let outcome = state
        .grid
        .refresh()
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;
    let (applied, sequence) = match outcome {
        RefreshOutcome::Applied { sequence, .. } => (true, sequence),
        RefreshOutcome::Discarded { sequence } => (false, sequence),
    };
    let grid = state
        .grid
        .grid_state(&GridQueryProps::default(), "", StatusCategory::All)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(RefreshResponse {
        applied,
        sequence,
        grid,
    }))
}

async fn clusters(State(state): State<AppState>) -> Json<Vec<ManagedCluster>> {
    Json(state.grid.clusters().await)
}

/// Replace the inventory. The grid resets to unqueried rows until the next
/// refresh.
async fn replace_clusters(
    State(state): State<AppState>,
    Json(clusters): Json<Vec<ManagedCluster>>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .grid
        .set_clusters(clusters)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
}

async fn cluster(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ClusterRowView>, (StatusCode, String)> {
    state
        .grid
        .cluster(&key)
        .await
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("cluster '{key}' not found")))
}
