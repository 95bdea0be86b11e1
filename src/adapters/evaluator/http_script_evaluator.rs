//! HTTP Script Evaluator - posts `{script, data}` to a remote evaluator service.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::ports::{ScriptEvaluator, ScriptEvaluatorError, ScriptResponse};

/// Configuration for the remote evaluator. An empty `url` disables evaluation.
#[derive(Debug, Clone)]
pub struct ScriptEvaluatorConfig {
    pub url: String,
    pub timeout: Duration,
}

impl ScriptEvaluatorConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Remote [`ScriptEvaluator`] over HTTP.
pub struct HttpScriptEvaluator {
    config: ScriptEvaluatorConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct EvaluationRequest<'a> {
    script: &'a str,
    data: &'a Value,
}

impl HttpScriptEvaluator {
    pub fn new(config: ScriptEvaluatorConfig) -> Result<Self, ScriptEvaluatorError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScriptEvaluatorError::network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ScriptEvaluator for HttpScriptEvaluator {
    async fn evaluate(&self, script: &str, data: &Value) -> Result<ScriptResponse, ScriptEvaluatorError> {
        if self.config.url.is_empty() {
            return Err(ScriptEvaluatorError::NotConfigured);
        }

        let response = self
            .client
            .post(&self.config.url)
            .json(&EvaluationRequest { script, data })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScriptEvaluatorError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else {
                    ScriptEvaluatorError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Script evaluator returned an error status");
            return Err(ScriptEvaluatorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ScriptResponse>()
            .await
            .map_err(|e| ScriptEvaluatorError::invalid_response(e.to_string()))
    }
}
