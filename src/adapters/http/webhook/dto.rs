//! Request and response bodies of the action webhook.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::action::{ActionResult, BotUtterance};
use crate::domain::tracker::{DialogueSnapshot, DomainSpec};

/// Body the dialogue manager posts for every custom action call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookRequest {
    #[serde(default)]
    pub next_action: Option<String>,

    #[serde(default)]
    pub sender_id: Option<String>,

    #[serde(default)]
    pub tracker: DialogueSnapshot,

    #[serde(default)]
    pub domain: DomainSpec,

    #[serde(default)]
    pub version: Option<String>,
}

impl WebhookRequest {
    /// Action name, ignoring blank values.
    pub fn action_name(&self) -> Option<&str> {
        self.next_action
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub events: Vec<Value>,
    pub responses: Vec<BotUtterance>,
}

impl From<&ActionResult> for WebhookResponse {
    fn from(result: &ActionResult) -> Self {
        Self {
            events: result.events(),
            responses: result.responses(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }
}
