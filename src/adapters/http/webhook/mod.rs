//! HTTP adapter for the action webhook called by the dialogue manager.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, HealthResponse, WebhookRequest, WebhookResponse};
pub use handlers::WebhookHandlers;
pub use routes::webhook_routes;
