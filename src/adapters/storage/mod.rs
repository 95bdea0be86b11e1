//! Action Storage Adapters
//!
//! - `InMemoryActionStore` / `InMemorySecretVault` - Maps in memory
//! - `FileActionCatalog` - YAML catalog of actions and secrets

mod file_action_catalog;
mod in_memory_action_store;

pub use file_action_catalog::FileActionCatalog;
pub use in_memory_action_store::{InMemoryActionStore, InMemorySecretVault};
