//! Action Config Store Port - read access to stored action configuration.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::action::ActionRecord;

/// Port for looking up bot scoped action configuration.
#[async_trait]
pub trait ActionConfigStore: Send + Sync {
    /// Returns the stored action, or `None` when the bot has no such action.
    async fn get_action(&self, bot: &str, name: &str) -> Result<Option<ActionRecord>, ConfigStoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigStoreError {
    #[error("Config store unavailable: {0}")]
    Unavailable(String),

    #[error("Stored configuration for '{name}' is invalid: {reason}")]
    Invalid { name: String, reason: String },
}
