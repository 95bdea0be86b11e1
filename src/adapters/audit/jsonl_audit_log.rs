//! JSON-lines Audit Log
//!
//! Appends one serialized execution record per line to a file.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::action::ExecutionLogRecord;
use crate::ports::{AuditLogError, AuditLogSink};

#[derive(Debug, Clone)]
pub struct JsonlAuditLog {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonlAuditLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditLogSink for JsonlAuditLog {
    async fn append(&self, record: ExecutionLogRecord) -> Result<(), AuditLogError> {
        let mut line =
            serde_json::to_string(&record).map_err(|e| AuditLogError::Serialization(e.to_string()))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AuditLogError::Write(e.to_string()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| AuditLogError::Write(e.to_string()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| AuditLogError::Write(e.to_string()))?;
        file.flush().await.map_err(|e| AuditLogError::Write(e.to_string()))
    }
}
