//! File-based Action Catalog
//!
//! Reads action records and key vault entries from one YAML file:
//!
//! ```yaml
//! actions:
//!   bot_1:
//!     - name: reset_slots
//!       type: slot_set_action
//!       set_slots: [{name: location, type: reset_slot}]
//! secrets:
//!   bot_1:
//!     API_KEY: "..."
//! ```
//!
//! The file is read on every lookup, so edits apply without a restart.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::action::ActionRecord;
use crate::ports::{ActionConfigStore, ConfigStoreError, SecretVault, SecretVaultError};

#[derive(Debug, Default, Deserialize)]
struct Catalog {
    #[serde(default)]
    actions: HashMap<String, Vec<ActionRecord>>,
    #[serde(default)]
    secrets: HashMap<String, BTreeMap<String, String>>,
}

/// YAML backed [`ActionConfigStore`] and [`SecretVault`].
#[derive(Debug, Clone)]
pub struct FileActionCatalog {
    path: PathBuf,
}

impl FileActionCatalog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    async fn read_catalog(&self) -> Result<Catalog, String> {
        if !self.path.exists() {
            return Ok(Catalog::default());
        }
        let yaml = fs::read_to_string(&self.path)
            .await
            .map_err(|e| format!("failed to read {}: {}", self.path.display(), e))?;
        serde_yaml::from_str(&yaml).map_err(|e| format!("failed to parse {}: {}", self.path.display(), e))
    }
}

#[async_trait]
impl ActionConfigStore for FileActionCatalog {
    async fn get_action(&self, bot: &str, name: &str) -> Result<Option<ActionRecord>, ConfigStoreError> {
        let catalog = self.read_catalog().await.map_err(ConfigStoreError::Unavailable)?;
        let name = name.to_lowercase();
        Ok(catalog
            .actions
            .get(bot)
            .and_then(|records| records.iter().find(|record| record.name.to_lowercase() == name))
            .cloned())
    }
}

#[async_trait]
impl SecretVault for FileActionCatalog {
    async fn get_secrets(&self, bot: &str) -> Result<BTreeMap<String, String>, SecretVaultError> {
        let catalog = self.read_catalog().await.map_err(SecretVaultError::Unavailable)?;
        Ok(catalog.secrets.get(bot).cloned().unwrap_or_default())
    }
}
