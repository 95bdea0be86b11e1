//! Bot response action - utters a domain template, optionally rephrased by the LLM.

use serde_json::{json, Value};

use super::{ActionCommand, ActionError, ActionOutcome, ActionServices, ExecutionTrace, Invocation};
use crate::domain::action::{BotResponseConfig, BotUtterance};
use crate::ports::{ChatMessage, CompletionRequest};

const REPHRASE_INSTRUCTION: &str = "You are a AI personal assistant. Rephrase the text below \
keeping its meaning and tone. Reply with the rephrased text only.";

/// Handler for `kairon_bot_response`.
#[derive(Clone)]
pub struct BotResponseHandler {
    services: ActionServices,
}

impl BotResponseHandler {
    pub fn new(services: ActionServices) -> Self {
        Self { services }
    }

    pub async fn handle(
        &self,
        cmd: ActionCommand<'_, BotResponseConfig>,
        trace: &mut ExecutionTrace,
    ) -> Result<ActionOutcome, ActionError> {
        let ActionCommand { invocation, config, .. } = cmd;

        let Some(text) = invocation.domain.response_text(&config.response) else {
            trace
                .messages
                .push(format!("No text variation for {}, uttering template", config.response));
            return Ok(ActionOutcome {
                bot_response: Value::String(config.response.clone()),
                dispatch: Some(BotUtterance::template(&config.response)),
                ..ActionOutcome::default()
            });
        };

        let answer = if config.rephrase {
            rephrase(&self.services, &invocation, config, text, trace).await
        } else {
            text.to_string()
        };

        let bot_response = Value::String(answer);
        Ok(ActionOutcome {
            dispatch: BotUtterance::from_rendered(&bot_response),
            bot_response,
            ..ActionOutcome::default()
        })
    }
}

async fn rephrase(
    services: &ActionServices,
    invocation: &Invocation<'_>,
    config: &BotResponseConfig,
    text: &str,
    trace: &mut ExecutionTrace,
) -> String {
    let messages = vec![ChatMessage::system(REPHRASE_INSTRUCTION), ChatMessage::user(text)];
    trace.request = Some(json!({ "messages": messages }));
    let request =
        CompletionRequest::chat(messages).with_hyperparameters(config.hyperparameters.clone().unwrap_or_default());

    match services.completion.complete(request).await {
        Ok(response) if !response.content.trim().is_empty() => {
            trace.api_response = Some(Value::String(response.content.clone()));
            response.content.trim().to_string()
        }
        Ok(_) => {
            trace.messages.push("Empty rephrase, using static response");
            text.to_string()
        }
        Err(err) => {
            tracing::warn!(action = %invocation.action_name, error = %err, "Rephrase failed, using static response");
            trace.messages.push(format!("Rephrase failed: {}", err));
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{context, invocation, snapshot, Harness};
    use super::*;
    use crate::adapters::ai::MockCompletionClient;
    use crate::domain::tracker::DomainSpec;
    use crate::ports::{CompletionError, CompletionPrompt, MessageRole};

    fn domain() -> DomainSpec {
        serde_json::from_value(json!({
            "responses": {"utter_greet": [{"text": "Hello! How can I help you today?"}]}
        }))
        .unwrap()
    }

    fn config(response: &str, rephrase: bool) -> BotResponseConfig {
        BotResponseConfig {
            response: response.into(),
            rephrase,
            hyperparameters: None,
        }
    }

    async fn run(harness: &Harness, config: &BotResponseConfig) -> ActionOutcome {
        let snapshot = snapshot();
        let domain = domain();
        BotResponseHandler::new(harness.services())
            .handle(
                ActionCommand::new(invocation(&snapshot, &domain), &context(&snapshot), config),
                &mut ExecutionTrace::default(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn utters_static_text() {
        let harness = Harness::default();
        let outcome = run(&harness, &config("utter_greet", false)).await;
        assert_eq!(outcome.dispatch, Some(BotUtterance::text("Hello! How can I help you today?")));
        assert_eq!(harness.completion.call_count(), 0);
    }

    #[tokio::test]
    async fn rephrases_through_completion() {
        let harness = Harness {
            completion: MockCompletionClient::new().with_response("  Hi there! What can I do for you?  "),
            ..Harness::default()
        };
        let outcome = run(&harness, &config("utter_greet", true)).await;

        assert_eq!(outcome.bot_response, json!("Hi there! What can I do for you?"));
        let calls = harness.completion.get_calls();
        let CompletionPrompt::Chat { messages } = &calls[0].prompt else {
            panic!("expected chat prompt");
        };
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[1].content, "Hello! How can I help you today?");
    }

    #[tokio::test]
    async fn rephrase_failure_keeps_static_text() {
        let harness = Harness {
            completion: MockCompletionClient::new().with_error(CompletionError::network("reset")),
            ..Harness::default()
        };
        let outcome = run(&harness, &config("utter_greet", true)).await;
        assert_eq!(outcome.bot_response, json!("Hello! How can I help you today?"));
    }

    #[tokio::test]
    async fn unknown_template_is_uttered_by_name() {
        let outcome = run(&Harness::default(), &config("utter_goodbye", true)).await;
        assert_eq!(outcome.dispatch, Some(BotUtterance::template("utter_goodbye")));
    }
}
