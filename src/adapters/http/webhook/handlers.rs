//! HTTP handlers for the action webhook.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{ActionDispatcher, DispatchActionCommand};

use super::dto::{ErrorResponse, HealthResponse, WebhookRequest, WebhookResponse};

#[derive(Clone)]
pub struct WebhookHandlers {
    dispatcher: Arc<ActionDispatcher>,
}

impl WebhookHandlers {
    pub fn new(dispatcher: Arc<ActionDispatcher>) -> Self {
        Self { dispatcher }
    }
}

/// POST /webhook - Run the requested action
pub async fn run_action(State(handlers): State<WebhookHandlers>, Json(req): Json<WebhookRequest>) -> Response {
    let Some(action_name) = req.action_name().map(str::to_string) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("next_action is required")),
        )
            .into_response();
    };

    let mut snapshot = req.tracker;
    if snapshot.sender_id.is_empty() {
        snapshot.sender_id = req.sender_id.unwrap_or_default();
    }

    tracing::debug!(action = %action_name, sender = %snapshot.sender_id, version = ?req.version, "Webhook call");
    let cmd = DispatchActionCommand {
        action_name,
        snapshot,
        domain: req.domain,
    };
    let result = handlers.dispatcher.handle(&cmd).await;

    (StatusCode::OK, Json(WebhookResponse::from(&result))).into_response()
}

/// GET /health - Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}
