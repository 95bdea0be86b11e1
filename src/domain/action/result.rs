//! Outcome of one action invocation as returned to the dialogue manager.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Slot filled with the final answer of response-producing actions.
pub const ACTION_RESPONSE_SLOT: &str = "kairon_action_response";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionStatus {
    #[default]
    Success,
    Failure,
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionStatus::Success => write!(f, "SUCCESS"),
            ActionStatus::Failure => write!(f, "FAILURE"),
        }
    }
}

/// A quick-reply button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    pub payload: String,
}

impl Button {
    pub fn new(text: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            payload: payload.into(),
        }
    }
}

/// One bot utterance sent back to the dialogue manager.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BotUtterance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Value>,

    /// Name of a domain response template to utter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl BotUtterance {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn custom(payload: Value) -> Self {
        Self {
            custom: Some(payload),
            ..Self::default()
        }
    }

    pub fn template(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            ..Self::default()
        }
    }

    pub fn with_buttons(mut self, buttons: Vec<Button>) -> Self {
        self.buttons = buttons;
        self
    }

    /// Utterance for a composed response: strings are text, structures are custom payloads.
    pub fn from_rendered(rendered: &Value) -> Option<Self> {
        match rendered {
            Value::Null => None,
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(Self::text(text.clone())),
            other => Some(Self::custom(other.clone())),
        }
    }
}

/// Result of one invocation: slot events, at most one utterance, and status.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionResult {
    /// Insertion order is evaluation order.
    pub filled_slots: Map<String, Value>,
    pub dispatch: Option<BotUtterance>,
    pub status: ActionStatus,
    pub exception: Option<String>,
}

impl ActionResult {
    /// The "not my action" result: no events, no responses.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.filled_slots.is_empty() && self.dispatch.is_none()
    }

    /// One `slot` event per filled slot, in order.
    pub fn events(&self) -> Vec<Value> {
        self.filled_slots
            .iter()
            .map(|(name, value)| json!({"event": "slot", "timestamp": null, "name": name, "value": value}))
            .collect()
    }

    pub fn responses(&self) -> Vec<BotUtterance> {
        self.dispatch.iter().cloned().collect()
    }
}
