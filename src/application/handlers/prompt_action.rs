//! Prompt action - answers the user through an LLM completion.
//!
//! The pipeline is assemble, complete, cache and extract slots. When the
//! completion provider is unreachable and the response cache is enabled, the
//! closest cached answer is used instead of failing.

use serde_json::{json, Value};

use super::{ActionCommand, ActionError, ActionOutcome, ActionServices, ExecutionTrace, Invocation};
use crate::domain::action::{BotUtterance, PromptActionConfig};
use crate::domain::prompt::Assembly;
use crate::domain::slots::SlotAssignmentRule;
use crate::domain::tracker::ActionContext;
use crate::ports::NestedActionInvoker;

/// Handler for `prompt_action`.
#[derive(Clone)]
pub struct PromptActionHandler {
    services: ActionServices,
}

impl PromptActionHandler {
    pub fn new(services: ActionServices) -> Self {
        Self { services }
    }

    /// Runs the prompt pipeline; `nested` serves `action` fragments.
    pub async fn handle(
        &self,
        cmd: ActionCommand<'_, PromptActionConfig>,
        nested: &dyn NestedActionInvoker,
        trace: &mut ExecutionTrace,
    ) -> Result<ActionOutcome, ActionError> {
        let ActionCommand { invocation, context, config } = cmd;

        // 1. Validate configuration
        config.validate()?;

        // 2. Generate the answer, falling back to the cache when unreachable
        let answer = match self.generate(&invocation, context, config, nested, trace).await {
            Ok(answer) => answer,
            Err(err) if config.enable_response_cache && err.is_connection_failure() => {
                match self.cached_answer(&invocation, context, config, trace).await {
                    Some(answer) => answer,
                    None => return Err(err),
                }
            }
            Err(err) => return Err(err),
        };

        // 3. Fill slots from the answer
        let bot_response = Value::String(answer);
        let data = json!({"data": bot_response, "context": context.to_value()});
        let rules: Vec<SlotAssignmentRule> = config.set_slots.iter().map(Into::into).collect();
        let filled_slots = self
            .services
            .extractor
            .extract(&rules, &data, invocation.slot_sources(), &mut trace.messages)
            .await;

        Ok(ActionOutcome {
            filled_slots,
            dispatch: if config.dispatch_response {
                BotUtterance::from_rendered(&bot_response)
            } else {
                None
            },
            bot_response,
        })
    }

    async fn generate(
        &self,
        invocation: &Invocation<'_>,
        context: &ActionContext,
        config: &PromptActionConfig,
        nested: &dyn NestedActionInvoker,
        trace: &mut ExecutionTrace,
    ) -> Result<String, ActionError> {
        let assembly = self
            .services
            .assembler
            .assemble(
                &config.llm_prompts,
                context,
                &config.settings(),
                &config.hyperparameters,
                nested,
                &mut trace.messages,
            )
            .await?;

        let prompt = match assembly {
            Assembly::Cached { answer } => {
                trace.api_response = Some(json!({"cached": true, "content": answer}));
                return Ok(answer);
            }
            Assembly::Prompt(prompt) => prompt,
        };

        let request = prompt.to_request(self.services.completion.request_shape(), &config.hyperparameters);
        trace.request = Some(json!({
            "messages": request.to_messages(),
            "hyperparameters": config.hyperparameters,
        }));

        tracing::debug!(action = %invocation.action_name, model = %config.hyperparameters.model, "Requesting completion");
        let response = self.services.completion.complete(request).await?;
        trace.api_response = Some(json!({
            "content": response.content,
            "model": response.model,
            "usage": response.usage,
        }));

        let answer = response.content.trim().to_string();
        if config.enable_response_cache {
            if let Err(err) = self.services.cache.store(invocation.bot, &prompt.question, &answer).await {
                tracing::warn!(bot = %invocation.bot, error = %err, "Failed to cache response");
                trace.messages.push(format!("Failed to cache response: {}", err));
            }
        }
        Ok(answer)
    }

    async fn cached_answer(
        &self,
        invocation: &Invocation<'_>,
        context: &ActionContext,
        config: &PromptActionConfig,
        trace: &mut ExecutionTrace,
    ) -> Option<String> {
        trace
            .messages
            .push("Completion provider unreachable, searching closest match in cache.");
        match self
            .services
            .cache
            .closest_match(invocation.bot, context.question(), config.similarity_threshold)
            .await
        {
            Ok(Some(answer)) => {
                trace.messages.push("Found closest match in cache.");
                Some(answer)
            }
            Ok(None) => {
                trace.messages.push("No cached answer found.");
                None
            }
            Err(err) => {
                tracing::warn!(bot = %invocation.bot, error = %err, "Cache fallback failed");
                trace.messages.push(format!("Cache fallback failed: {}", err));
                None
            }
        }
    }
}
