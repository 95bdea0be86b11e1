//! Audit Log Port - append-only execution records.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::action::ExecutionLogRecord;

/// Port for persisting one record per action execution.
///
/// Callers treat appends as fire-and-forget: failures are logged, never surfaced.
#[async_trait]
pub trait AuditLogSink: Send + Sync {
    async fn append(&self, record: ExecutionLogRecord) -> Result<(), AuditLogError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditLogError {
    #[error("Failed to write audit record: {0}")]
    Write(String),

    #[error("Failed to serialize audit record: {0}")]
    Serialization(String),
}
