//! Script Evaluator Port - remote evaluation of embedded scripts.
//!
//! The request/response shape is `{script, data} -> {success, data}` so the
//! remote service can be replaced by an in-process evaluator without touching
//! callers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Port for evaluating a script against a data payload.
#[async_trait]
pub trait ScriptEvaluator: Send + Sync {
    async fn evaluate(&self, script: &str, data: &Value) -> Result<ScriptResponse, ScriptEvaluatorError>;
}

/// Evaluator reply; `data` holds the result on success or the error otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptResponse {
    pub success: bool,

    #[serde(default)]
    pub data: Option<Value>,
}

impl ScriptResponse {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }

    pub fn failure(data: Value) -> Self {
        Self {
            success: false,
            data: Some(data),
        }
    }
}

/// Errors reaching or talking to the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptEvaluatorError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Evaluator timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("Evaluator returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid evaluator response: {0}")]
    InvalidResponse(String),

    #[error("Script evaluator is not configured")]
    NotConfigured,
}

impl ScriptEvaluatorError {
    pub fn network(message: impl Into<String>) -> Self {
        ScriptEvaluatorError::Network(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        ScriptEvaluatorError::InvalidResponse(message.into())
    }
}
