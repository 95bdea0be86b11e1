//! In-Memory Audit Log
//!
//! Keeps execution records in memory. Useful for testing and development.
//! A bounded log drops the oldest record once it is full.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::action::ExecutionLogRecord;
use crate::ports::{AuditLogError, AuditLogSink};

#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    records: Arc<RwLock<VecDeque<ExecutionLogRecord>>>,
    capacity: Option<usize>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `capacity` records.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            records: Arc::default(),
            capacity: Some(capacity.max(1)),
        }
    }

    /// All retained records in append order.
    pub async fn records(&self) -> Vec<ExecutionLogRecord> {
        self.records.read().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl AuditLogSink for InMemoryAuditLog {
    async fn append(&self, record: ExecutionLogRecord) -> Result<(), AuditLogError> {
        let mut records = self.records.write().await;
        if let Some(capacity) = self.capacity {
            while records.len() >= capacity {
                records.pop_front();
            }
        }
        records.push_back(record);
        Ok(())
    }
}
