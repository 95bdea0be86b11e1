//! Nested Action Port - re-entrant invocation of another action.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Runs another action of the same bot without dispatching its response.
#[async_trait]
pub trait NestedActionInvoker: Send + Sync {
    /// Returns the action's computed response value.
    async fn invoke(&self, action_name: &str) -> Result<Value, NestedActionError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NestedActionError {
    #[error("Action '{0}' not found")]
    NotFound(String),

    #[error("Action '{action}' failed: {message}")]
    Failed { action: String, message: String },

    #[error("Nested action depth limit of {max_depth} exceeded")]
    DepthExceeded { max_depth: u32 },
}
