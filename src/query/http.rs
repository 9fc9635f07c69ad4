use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::QueryError;

use super::{BatchQueryRequest, BatchQueryResponse, QueryEngine};

/// Query engine reached over HTTP at `{url}/v1/batch`.
pub struct HttpQueryEngine {
    http: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpQueryEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, QueryError> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }
}

#[async_trait]
impl QueryEngine for HttpQueryEngine {
    async fn batch(&self, request: &BatchQueryRequest) -> Result<BatchQueryResponse, QueryError> {
        let url = format!("{}/v1/batch", self.base_url);
        debug!(
            url = %url,
            session_id = %request.session_id,
            requests = request.requests.len(),
            "sending batch query"
        );

        let mut builder = self
            .http
            .post(&url)
            .header("x-ms-client-session-id", &request.session_id)
            .json(request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let resp = builder.send().await?;
        if !resp.status().is_success() {
            return Err(QueryError::Status(resp.status()));
        }
        Ok(resp.json().await?)
    }
}
