//! HTTP adapters - REST API implementations.

pub mod webhook;

pub use webhook::{webhook_routes, WebhookHandlers};
