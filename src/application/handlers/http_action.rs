//! HTTP action - calls a configured endpoint and renders its response.

use serde_json::{json, Map, Value};

use super::parameters::{as_pairs, masked_parameters, resolve_parameters};
use super::{render_text, ActionCommand, ActionError, ActionOutcome, ActionServices, ExecutionTrace};
use crate::domain::action::{BotUtterance, ContentType, HttpActionConfig};
use crate::domain::expression::{display_value, summarize, ExpressionSpec};
use crate::domain::slots::SlotAssignmentRule;
use crate::ports::{HttpBody, HttpRequest};

/// Handler for `http_action`.
#[derive(Clone)]
pub struct HttpActionHandler {
    services: ActionServices,
}

impl HttpActionHandler {
    pub fn new(services: ActionServices) -> Self {
        Self { services }
    }

    pub async fn handle(
        &self,
        cmd: ActionCommand<'_, HttpActionConfig>,
        trace: &mut ExecutionTrace,
    ) -> Result<ActionOutcome, ActionError> {
        let ActionCommand { invocation, context, config } = cmd;

        // 1. Render the URL and resolve parameters
        let tree = context.to_value();
        let url = render_text(&config.http_url, &tree, &mut trace.messages)?;

        let (params, logged_params) = match config.dynamic_params.as_deref().filter(|script| !script.trim().is_empty()) {
            Some(script) => {
                let resolved = self
                    .services
                    .resolver
                    .resolve(&ExpressionSpec::script(script), &tree, &mut trace.messages)
                    .await?;
                let Value::Object(params) = resolved else {
                    return Err(ActionError::InvalidRequest(format!(
                        "dynamic_params must evaluate to an object, got {}",
                        summarize(&resolved)
                    )));
                };
                (params.clone(), params)
            }
            None => (
                resolve_parameters(&config.params_list, context),
                masked_parameters(&config.params_list, context),
            ),
        };

        let mut request = HttpRequest::new(config.request_method, url.clone());
        request.headers = as_pairs(&resolve_parameters(&config.headers, context));
        if config.request_method.uses_query_string() {
            request.query = as_pairs(&params);
        } else {
            request.body = match config.content_type {
                ContentType::Json => HttpBody::Json(Value::Object(params)),
                ContentType::Data => HttpBody::Form(as_pairs(&params)),
            };
        }

        trace.request = Some(json!({
            "url": url,
            "method": config.request_method.to_string(),
            "headers": Value::Object(masked_parameters(&config.headers, context)),
            "params": Value::Object(logged_params),
        }));

        // 2. Call the endpoint
        tracing::debug!(action = %invocation.action_name, method = %config.request_method, url = %url, "Calling HTTP endpoint");
        let response = self.services.http.send(request).await?;
        trace.api_response = Some(response.body.clone());
        trace.messages.push(format!("http_status_code: {}", response.status));

        if !response.is_success() {
            return Err(ActionError::HttpStatus {
                status: response.status,
                body: display_value(&response.body),
            });
        }

        // 3. Render the response and fill slots
        let data = json!({
            "data": response.body,
            "context": tree,
            "http_status_code": response.status,
        });
        let bot_response = self.services.composer.compose(&config.response, &data, &mut trace.messages).await?;

        let rules: Vec<SlotAssignmentRule> = config.set_slots.iter().map(Into::into).collect();
        let filled_slots: Map<String, Value> = self
            .services
            .extractor
            .extract(&rules, &data, invocation.slot_sources(), &mut trace.messages)
            .await;

        let dispatch = if config.response.dispatch {
            BotUtterance::from_rendered(&bot_response)
        } else {
            None
        };

        Ok(ActionOutcome {
            filled_slots,
            bot_response,
            dispatch,
        })
    }
}
