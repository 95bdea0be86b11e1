//! In-Memory Action Store and Secret Vault
//!
//! Holds action records and key vault entries per bot in memory.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::action::ActionRecord;
use crate::ports::{ActionConfigStore, ConfigStoreError, SecretVault, SecretVaultError};

/// In-memory action records keyed by `(bot, action name)`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryActionStore {
    actions: Arc<RwLock<HashMap<(String, String), ActionRecord>>>,
}

impl InMemoryActionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record while building the store.
    pub fn with_action(self, bot: impl Into<String>, record: ActionRecord) -> Self {
        if let Ok(mut actions) = self.actions.try_write() {
            actions.insert((bot.into(), record.name.to_lowercase()), record);
        }
        self
    }

    pub async fn insert(&self, bot: impl Into<String>, record: ActionRecord) {
        self.actions
            .write()
            .await
            .insert((bot.into(), record.name.to_lowercase()), record);
    }

    pub async fn action_count(&self) -> usize {
        self.actions.read().await.len()
    }
}

#[async_trait]
impl ActionConfigStore for InMemoryActionStore {
    async fn get_action(&self, bot: &str, name: &str) -> Result<Option<ActionRecord>, ConfigStoreError> {
        let key = (bot.to_string(), name.to_lowercase());
        Ok(self.actions.read().await.get(&key).cloned())
    }
}

/// In-memory key vault.
#[derive(Debug, Clone, Default)]
pub struct InMemorySecretVault {
    secrets: Arc<RwLock<HashMap<String, BTreeMap<String, String>>>>,
    failing: bool,
}

impl InMemorySecretVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a secret while building the vault.
    pub fn with_secret(self, bot: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Ok(mut secrets) = self.secrets.try_write() {
            secrets.entry(bot.into()).or_default().insert(name.into(), value.into());
        }
        self
    }

    /// Makes every lookup fail, for degraded-path tests.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub async fn insert(&self, bot: impl Into<String>, name: impl Into<String>, value: impl Into<String>) {
        self.secrets
            .write()
            .await
            .entry(bot.into())
            .or_default()
            .insert(name.into(), value.into());
    }
}

#[async_trait]
impl SecretVault for InMemorySecretVault {
    async fn get_secrets(&self, bot: &str) -> Result<BTreeMap<String, String>, SecretVaultError> {
        if self.failing {
            return Err(SecretVaultError::Unavailable("vault is offline".to_string()));
        }
        Ok(self.secrets.read().await.get(bot).cloned().unwrap_or_default())
    }
}
