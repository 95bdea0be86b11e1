//! Storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where actions, secrets and execution logs live.
///
/// Both paths are optional; unset paths select the in-memory adapters.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// YAML action catalog
    pub actions_file: Option<PathBuf>,

    /// JSON-lines audit file
    pub audit_log_file: Option<PathBuf>,

    /// Records kept by the in-memory audit log when no file is set
    #[serde(default = "default_audit_buffer_size")]
    pub audit_buffer_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            actions_file: None,
            audit_log_file: None,
            audit_buffer_size: default_audit_buffer_size(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.audit_buffer_size == 0 {
            return Err(ValidationError::MissingRequired("storage.audit_buffer_size"));
        }
        Ok(())
    }
}

fn default_audit_buffer_size() -> usize {
    10_000
}
