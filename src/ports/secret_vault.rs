//! Secret Vault Port - bot scoped secrets referenced by actions.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

/// Port for reading a bot's key vault.
#[async_trait]
pub trait SecretVault: Send + Sync {
    /// All secrets of the bot, keyed by name.
    async fn get_secrets(&self, bot: &str) -> Result<BTreeMap<String, String>, SecretVaultError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretVaultError {
    #[error("Secret vault unavailable: {0}")]
    Unavailable(String),
}
