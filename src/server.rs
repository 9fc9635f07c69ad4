use anyhow::{Context, Result};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::graphql::{self, ClusterscopeSchema};
use crate::api::rest::{self, AppState};
use crate::config::Config;
use crate::domain::grid_service::{GridService, RefreshOutcome};
use crate::inventory;
use crate::query::HttpQueryEngine;
use crate::telemetry::TelemetryClient;

/// REST routes plus the GraphQL endpoint, sharing one grid service.
pub fn app(grid: Arc<GridService>) -> Router {
    let schema = graphql::build_schema(grid.clone());

    let graphql_router = Router::new()
        .route("/graphql", get(graphql_playground).post(graphql_handler))
        .with_state(schema);

    rest::router(AppState { grid })
        .merge(graphql_router)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(config: Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.daemon.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "clusterscope daemon starting");

    let inventory_path = Path::new(&config.inventory.path);
    let clusters = if inventory_path.exists() {
        inventory::load(inventory_path)?
    } else {
        warn!(
            path = %inventory_path.display(),
            "inventory file not found; starting empty (PUT /api/v1/clusters to populate)"
        );
        Vec::new()
    };

    let engine = Arc::new(HttpQueryEngine::new(&config.engine).context("building query engine")?);
    let mut service = GridService::new(engine, config.engine.clone(), clusters)
        .context("building initial grid")?;
    if config.telemetry.enabled {
        service = service.with_telemetry(TelemetryClient::new(&config.telemetry.vector_url));
    }
    let grid = Arc::new(service);
    info!(session_id = %grid.session_id(), "grid session created");

    let app = app(grid.clone());

    let http_addr = &config.daemon.http_addr;
    let listener = TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("binding to {}", http_addr))?;

    info!(addr = %http_addr, "HTTP server listening");

    // Initial load runs in the background; the daemon serves immediately.
    {
        let grid = grid.clone();
        tokio::spawn(async move {
            info!("running initial grid load");
            log_refresh("initial grid load", grid.refresh().await);
        });
    }

    if config.telemetry.enabled && config.telemetry.push_interval_secs > 0 {
        let telemetry_grid = grid.clone();
        let telemetry_config = config.telemetry.clone();
        tokio::spawn(async move {
            crate::telemetry::run_push_loop(telemetry_grid, &telemetry_config).await;
        });
    }

    if config.daemon.refresh_interval_secs > 0 {
        let refresh_grid = grid.clone();
        let interval_secs = config.daemon.refresh_interval_secs;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            // First tick fires immediately; the initial load covers it.
            interval.tick().await;
            loop {
                interval.tick().await;
                log_refresh("periodic grid refresh", refresh_grid.refresh().await);
            }
        });
    }

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("clusterscope daemon stopped");
    Ok(())
}

fn log_refresh(what: &str, result: Result<RefreshOutcome, crate::error::GridError>) {
    match result {
        Ok(RefreshOutcome::Applied { sequence, clusters }) => {
            info!(sequence, clusters, "{what} completed");
        }
        Ok(RefreshOutcome::Discarded { sequence }) => {
            info!(sequence, "{what} superseded by a newer refresh");
        }
        Err(e) => warn!(error = %e, "{what} failed"),
    }
}

async fn graphql_playground() -> Html<String> {
    Html(async_graphql::http::playground_source(
        async_graphql::http::GraphQLPlaygroundConfig::new("/graphql"),
    ))
}

async fn graphql_handler(
    State(schema): State<ClusterscopeSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { info!("Received Ctrl+C, shutting down"); },
        _ = terminate => { info!("Received SIGTERM, shutting down"); },
    }
}
