//! Action dispatch configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::DispatchSettings;
use crate::domain::action::DEFAULT_FAILURE_MESSAGE;

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// How deep prompt actions may invoke other actions
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: u32,

    /// Utterance sent when a failing action has no failure message of its own
    #[serde(default = "default_failure_message")]
    pub default_failure_message: String,
}

impl DispatchConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_nesting_depth == 0 || self.max_nesting_depth > 10 {
            return Err(ValidationError::InvalidNestingDepth);
        }
        if self.default_failure_message.trim().is_empty() {
            return Err(ValidationError::MissingRequired("dispatch.default_failure_message"));
        }
        Ok(())
    }

    pub fn settings(&self) -> DispatchSettings {
        DispatchSettings {
            max_nesting_depth: self.max_nesting_depth,
            default_failure_message: self.default_failure_message.clone(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: default_max_nesting_depth(),
            default_failure_message: default_failure_message(),
        }
    }
}

fn default_max_nesting_depth() -> u32 {
    3
}

fn default_failure_message() -> String {
    DEFAULT_FAILURE_MESSAGE.to_string()
}
