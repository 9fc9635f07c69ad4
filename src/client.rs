//! Typed HTTP client for the clusterscope daemon REST API.

use anyhow::{bail, Context, Result};
use reqwest::Client;

use crate::api::rest::{GridParams, RefreshResponse};
use crate::domain::grid::{ClusterRowView, ClusterStatusSummary};
use crate::domain::grid_service::{GridState, ServiceHealth};
use crate::domain::types::ManagedCluster;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:9110";

pub struct ClusterscopeClient {
    base_url: String,
    http: Client,
}

impl ClusterscopeClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub async fn health(&self) -> Result<ServiceHealth> {
        self.get("/health").await
    }

    pub async fn grid(&self, params: &GridParams) -> Result<GridState> {
        let url = format!("{}/api/v1/grid", self.base_url);
        self.send(self.http.get(&url).query(params), &url).await
    }

    pub async fn summary(&self) -> Result<ClusterStatusSummary> {
        self.get("/api/v1/summary").await
    }

    pub async fn clusters(&self) -> Result<Vec<ManagedCluster>> {
        self.get("/api/v1/clusters").await
    }

    pub async fn cluster(&self, key: &str) -> Result<ClusterRowView> {
        // Resource ids contain slashes; the path segment must be encoded.
        let mut url = reqwest::Url::parse(&format!("{}/api/v1/clusters/", self.base_url))
            .with_context(|| format!("invalid base url {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("base url cannot carry a path"))?
            .pop_if_empty()
            .push(key);
        self.send(self.http.get(url.clone()), url.as_str()).await
    }

    pub async fn refresh(&self) -> Result<RefreshResponse> {
        let url = format!("{}/api/v1/refresh", self.base_url);
        self.send(self.http.post(&url), &url).await
    }

    // ── Internal helpers ───────────────────────────────────

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        self.send(self.http.get(&url), &url).await
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<T> {
        let resp = request
            .send()
            .await
            .with_context(|| format!("request to {}", url))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("{} returned {}: {}", url, status, body);
        }

        resp.json()
            .await
            .with_context(|| format!("parsing response from {}", url))
    }
}
