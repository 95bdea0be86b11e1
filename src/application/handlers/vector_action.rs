//! Vector database action - similarity or payload search over a bot collection.

use serde_json::{json, Value};

use super::{ActionCommand, ActionError, ActionOutcome, ActionServices, ExecutionTrace};
use crate::domain::action::{BotUtterance, PayloadSource, VectorActionConfig, VectorOperationKind};
use crate::domain::expression::summarize;
use crate::domain::slots::SlotAssignmentRule;

const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Default collection holding a bot's FAQ content.
pub fn default_collection(bot: &str) -> String {
    format!("{}_faq_embd", bot)
}

/// Handler for `vector_embeddings_db_action`.
#[derive(Clone)]
pub struct VectorActionHandler {
    services: ActionServices,
}

impl VectorActionHandler {
    pub fn new(services: ActionServices) -> Self {
        Self { services }
    }

    pub async fn handle(
        &self,
        cmd: ActionCommand<'_, VectorActionConfig>,
        trace: &mut ExecutionTrace,
    ) -> Result<ActionOutcome, ActionError> {
        let ActionCommand { invocation, context, config } = cmd;

        // 1. Resolve the collection and payload
        let collection = config
            .collection
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| default_collection(invocation.bot));

        let payload = match config.payload.source {
            PayloadSource::FromValue => config.payload.value.clone(),
            PayloadSource::FromSlot => {
                let slot = config.payload.value.as_str().unwrap_or_default();
                context.slot.get(slot).cloned().unwrap_or(Value::Null)
            }
        };

        trace.request = Some(json!({
            "db_type": config.db_type,
            "collection": collection,
            "operation": config.operation.value,
            "payload": payload,
        }));
        trace.messages.push(format!(
            "collection: {}, operation: {:?}, payload: {}",
            collection,
            config.operation.value,
            summarize(&payload)
        ));

        // 2. Run the search
        let hits = match config.operation.value {
            VectorOperationKind::EmbeddingSearch => {
                let (text, limit, threshold) = search_arguments(&payload)?;
                self
                    .services
                    .vector_store
                    .search(invocation.bot, &collection, &text, limit, threshold)
                    .await?
            }
            VectorOperationKind::PayloadSearch => {
                if !payload.is_object() {
                    return Err(ActionError::InvalidRequest(format!(
                        "payload_search requires a filter object, got {}",
                        summarize(&payload)
                    )));
                }
                self
                    .services
                    .vector_store
                    .payload_search(invocation.bot, &collection, &payload)
                    .await?
            }
        };

        let result = json!({ "result": hits });
        trace.api_response = Some(result.clone());

        // 3. Render the response and fill slots
        let data = json!({"data": result, "context": context.to_value()});
        let bot_response = self.services.composer.compose(&config.response, &data, &mut trace.messages).await?;

        let rules: Vec<SlotAssignmentRule> = config.set_slots.iter().map(Into::into).collect();
        let filled_slots = self
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

fn search_arguments(payload: &Value) -> Result<(String, usize, f64), ActionError> {
    match payload {
        Value::String(text) => Ok((text.clone(), DEFAULT_SEARCH_LIMIT, 0.0)),
        Value::Object(fields) => {
            let text = fields
                .get("text")
                .and_then(Value::as_str)
                .ok_or_else(|| ActionError::MissingParameter("text".to_string()))?;
            let limit = fields
                .get("limit")
                .and_then(Value::as_u64)
                .map(|limit| limit as usize)
                .unwrap_or(DEFAULT_SEARCH_LIMIT);
            let threshold = fields.get("score_threshold").and_then(Value::as_f64).unwrap_or(0.0);
            Ok((text.to_string(), limit, threshold))
        }
        other => Err(ActionError::InvalidRequest(format!(
            "embedding_search requires text, got {}",
            summarize(other)
        ))),
    }
}
