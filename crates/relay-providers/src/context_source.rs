//! HTTP context source that fetches the business context injected into prompts.
//!
//! The endpoint (typically a spreadsheet-backed script) answers
//! `GET {url}?action=getContext` with `{"context": "..."}`.

use async_trait::async_trait;
use relay_core::{config::ContextConfig, error::RelayError, traits::ContextSource};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Context source backed by a single HTTP GET with a bounded timeout.
pub struct HttpContextSource {
    client: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct ContextResponse {
    #[serde(default)]
    context: Option<String>,
}

impl HttpContextSource {
    pub fn from_config(config: &ContextConfig) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build context client: {e}")))?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl ContextSource for HttpContextSource {
    async fn fetch(&self) -> Result<String, RelayError> {
        if self.url.is_empty() {
            return Ok(String::new());
        }

        debug!("context: GET {}", self.url);
        let resp = self
            .client
            .get(&self.url)
            .query(&[("action", "getContext")])
            .send()
            .await
            .map_err(|e| RelayError::Context(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(RelayError::Context(format!(
                "source returned {}",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| RelayError::Context(format!("failed to read body: {e}")))?;

        let parsed: ContextResponse = serde_json::from_str(&body)
            .map_err(|e| RelayError::Context(format!("malformed payload: {e}")))?;

        Ok(parsed.context.unwrap_or_default())
    }
}
