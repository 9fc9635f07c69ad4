use anyhow::{Context, Result};

use super::TelemetryEvent;

/// Pushes grid events to a Vector HTTP source.
#[derive(Clone)]
pub struct TelemetryClient {
    client: reqwest::Client,
    url: String,
}

impl TelemetryClient {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }

    pub async fn push(&self, event: &TelemetryEvent) -> Result<()> {
        self.client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .context("sending telemetry to Vector")?
            .error_for_status()
            .context("Vector returned error status")?;

        Ok(())
    }
}
