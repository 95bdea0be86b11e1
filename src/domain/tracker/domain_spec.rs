//! Bot domain metadata sent alongside the tracker.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response templates and slot declarations of the bot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainSpec {
    #[serde(default)]
    pub responses: Map<String, Value>,

    #[serde(default)]
    pub slots: Map<String, Value>,
}

impl DomainSpec {
    /// First text variation declared for a response template.
    pub fn response_text(&self, response: &str) -> Option<&str> {
        self.responses
            .get(response)?
            .as_array()?
            .iter()
            .find_map(|variation| variation.get("text").and_then(Value::as_str))
    }

    /// Declared initial value of a slot, or null when none is declared.
    pub fn initial_value(&self, slot: &str) -> Value {
        self.slots
            .get(slot)
            .and_then(|declaration| declaration.get("initial_value"))
            .cloned()
            .unwrap_or(Value::Null)
    }
}
