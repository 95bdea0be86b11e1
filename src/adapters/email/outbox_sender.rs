//! Outbox Email Sender
//!
//! Collects composed emails in memory instead of talking SMTP. The SMTP
//! transport is deployed separately and drains the same message shape.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::ports::{EmailError, EmailMessage, EmailSender};

#[derive(Debug, Clone, Default)]
pub struct OutboxEmailSender {
    outbox: Arc<Mutex<Vec<EmailMessage>>>,
    rejection: Option<String>,
}

impl OutboxEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every message with `reason`.
    pub fn rejecting(mut self, reason: impl Into<String>) -> Self {
        self.rejection = Some(reason.into());
        self
    }

    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.outbox.lock().await.clone()
    }
}

#[async_trait]
impl EmailSender for OutboxEmailSender {
    async fn send(&self, email: EmailMessage) -> Result<(), EmailError> {
        if let Some(reason) = &self.rejection {
            return Err(EmailError::Rejected(reason.clone()));
        }
        if email.to_email.is_empty() {
            return Err(EmailError::Rejected("no recipients".to_string()));
        }
        tracing::info!(
            smtp_url = %email.smtp_url,
            recipients = email.to_email.len(),
            subject = %email.subject,
            "Email queued"
        );
        self.outbox.lock().await.push(email);
        Ok(())
    }
}
