//! Email Sender Port - delivery of emails composed by email actions.

use async_trait::async_trait;
use secrecy::Secret;
use thiserror::Error;

/// Port for handing a composed email to an SMTP transport.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: EmailMessage) -> Result<(), EmailError>;
}

/// A fully resolved email including the SMTP endpoint to use.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub smtp_url: String,
    pub smtp_port: u16,
    pub tls: bool,
    pub smtp_userid: Option<String>,
    pub smtp_password: Secret<String>,
    pub from_email: String,
    pub to_email: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("SMTP delivery failed: {0}")]
    Delivery(String),

    #[error("Email rejected: {0}")]
    Rejected(String),
}
