/// Model Gateway: the single point of entry for calls to the locally hosted
/// text-generation endpoint (Ollama-compatible `/api/generate`).
///
/// No other module talks to the model server directly.
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model server returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Model call timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model returned no response text")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Stateless client for the local generation endpoint.
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    model: String,
    timeout_secs: u64,
    max_retries: u32,
}

impl LlmClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
        max_retries: u32,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout_secs,
            max_retries,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        Self::new(
            config.model_base_url.clone(),
            config.model_name.clone(),
            config.model_timeout_secs,
            config.model_max_retries,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one prompt and returns the raw `response` text.
    ///
    /// Non-2xx replies fail immediately. Transport failures and timeouts are
    /// retried up to `max_retries` times with a short linear backoff.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let mut attempt = 0;
        let response = loop {
            match self.client.post(&url).json(&body).send().await {
                Ok(response) => break response,
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    let delay = Duration::from_millis(500 * u64::from(attempt));
                    warn!(
                        "Model call failed ({e}), retry {attempt}/{} after {}ms",
                        self.max_retries,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(self.transport_error(e)),
            }
        };

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Model server returned {status}: {message}");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        let parsed: GenerateResponse = serde_json::from_str(&text)?;

        debug!(
            "Model call succeeded: model={}, eval_count={:?}",
            self.model, parsed.eval_count
        );

        parsed
            .response
            .filter(|r| !r.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }

    /// Lists the models the server has pulled. Backs the health check.
    pub async fn ping(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            LlmError::Http(e)
        }
    }
}
