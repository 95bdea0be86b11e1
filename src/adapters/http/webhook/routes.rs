//! HTTP routes for the action webhook.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{health, run_action, WebhookHandlers};

/// Creates the webhook router.
pub fn webhook_routes(handlers: WebhookHandlers) -> Router {
    Router::new()
        .route("/webhook", post(run_action))
        .route("/health", get(health))
        .with_state(handlers)
}
