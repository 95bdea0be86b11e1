//! Email Adapters
//!
//! - `OutboxEmailSender` - In-memory outbox

mod outbox_sender;

pub use outbox_sender::OutboxEmailSender;
