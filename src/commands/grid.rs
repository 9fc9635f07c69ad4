//! `clusterscope grid`: query every workspace once and print the grid.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::commands::output;
use crate::config::{self, Config};
use crate::domain::grid::{GridQueryProps, StatusCategory};
use crate::domain::grid_service::{GridService, GridState};
use crate::error::QueryError;
use crate::inventory;
use crate::query::{BatchQueryRequest, BatchQueryResponse, HttpQueryEngine, QueryEngine};

/// Options shared by `grid` and `summary`.
#[derive(Debug, Clone, Default)]
pub struct GridSource {
    pub config: Option<String>,
    pub inventory: Option<PathBuf>,
    /// Recorded batch response to interpret instead of calling the engine.
    pub response: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct GridView {
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub search: String,
    pub status: Option<String>,
}

/// Engine that answers every batch with one recorded response.
pub struct RecordedEngine {
    response: BatchQueryResponse,
}

impl RecordedEngine {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading recorded response {}", path.display()))?;
        let response = serde_json::from_str(&content)
            .with_context(|| format!("parsing recorded response {}", path.display()))?;
        Ok(Self { response })
    }
}

#[async_trait]
impl QueryEngine for RecordedEngine {
    async fn batch(&self, _request: &BatchQueryRequest) -> Result<BatchQueryResponse, QueryError> {
        Ok(self.response.clone())
    }
}

/// Build a grid service from config and inventory and run one refresh.
pub async fn load_grid(source: &GridSource) -> Result<GridService> {
    let cfg: Config = config::load(source.config.as_deref())?;
    let inventory_path = source
        .inventory
        .clone()
        .unwrap_or_else(|| PathBuf::from(&cfg.inventory.path));
    let clusters = inventory::load(&inventory_path)?;

    let engine: Arc<dyn QueryEngine> = match &source.response {
        Some(path) => Arc::new(RecordedEngine::from_file(path)?),
        None => Arc::new(HttpQueryEngine::new(&cfg.engine).context("building query engine")?),
    };

    let service = GridService::new(engine, cfg.engine.clone(), clusters)
        .context("building initial grid")?;
    let outcome = service.refresh().await.context("loading grid")?;
    info!(?outcome, "grid loaded");
    Ok(service)
}

pub async fn grid_state(service: &GridService, view: &GridView) -> Result<GridState> {
    let props = GridQueryProps::parse(view.sort.as_deref(), view.direction.as_deref())
        .map_err(anyhow::Error::msg)?;
    let category = match view.status.as_deref() {
        Some(s) => s.parse::<StatusCategory>().map_err(anyhow::Error::msg)?,
        None => StatusCategory::All,
    };
    Ok(service.grid_state(&props, &view.search, category).await?)
}

pub fn run(source: GridSource, view: GridView, format: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let service = load_grid(&source).await?;
        let state = grid_state(&service, &view).await?;
        match format {
            "json" => output::print_output("json", &state),
            _ => {
                output::print_grid(&state);
                Ok(())
            }
        }
    })
}
