//! Audit Log Adapters
//!
//! - `InMemoryAuditLog` - Records kept in memory
//! - `JsonlAuditLog` - One JSON record per line in a file

mod in_memory_audit_log;
mod jsonl_audit_log;

pub use in_memory_audit_log::InMemoryAuditLog;
pub use jsonl_audit_log::JsonlAuditLog;
