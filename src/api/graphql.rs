use async_graphql::{Context, EmptySubscription, Object, Schema};
use std::sync::Arc;

use crate::domain::grid::{ClusterRowView, ClusterStatusSummary, GridQueryProps, StatusCategory};
use crate::domain::grid_service::{GridService, GridState, ServiceHealth};
use crate::domain::types::ManagedCluster;

pub type ClusterscopeSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn health(&self, ctx: &Context<'_>) -> async_graphql::Result<ServiceHealth> {
        let svc = ctx.data::<Arc<GridService>>()?;
        Ok(svc.health().await)
    }

    /// Sorted and filtered grid. `sort` names a column (`status`,
    /// `user-pods`, ...), `direction` is `asc` or `desc`.
    async fn grid(
        &self,
        ctx: &Context<'_>,
        sort: Option<String>,
        direction: Option<String>,
        search: Option<String>,
        status: Option<String>,
    ) -> async_graphql::Result<GridState> {
        let svc = ctx.data::<Arc<GridService>>()?;
        let props = GridQueryProps::parse(sort.as_deref(), direction.as_deref())
            .map_err(async_graphql::Error::new)?;
        let category = match status.as_deref() {
            Some(s) => s.parse::<StatusCategory>().map_err(async_graphql::Error::new)?,
            None => StatusCategory::All,
        };
        svc.grid_state(&props, search.as_deref().unwrap_or(""), category)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))
    }

    async fn summary(&self, ctx: &Context<'_>) -> async_graphql::Result<ClusterStatusSummary> {
        let svc = ctx.data::<Arc<GridService>>()?;
        svc.summary()
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))
    }

    /// Look up one cluster by name or cluster id.
    async fn cluster(
        &self,
        ctx: &Context<'_>,
        key: String,
    ) -> async_graphql::Result<Option<ClusterRowView>> {
        let svc = ctx.data::<Arc<GridService>>()?;
        Ok(svc.cluster(&key).await)
    }

    async fn clusters(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<ManagedCluster>> {
        let svc = ctx.data::<Arc<GridService>>()?;
        Ok(svc.clusters().await)
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Query every workspace again. Returns the default-sorted grid.
    async fn refresh(&self, ctx: &Context<'_>) -> async_graphql::Result<GridState> {
        let svc = ctx.data::<Arc<GridService>>()?;
        svc.refresh()
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        svc.grid_state(&GridQueryProps::default(), "", StatusCategory::All)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))
    }
}

pub fn build_schema(grid: Arc<GridService>) -> ClusterscopeSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(grid)
        .finish()
}
