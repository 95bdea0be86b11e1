//! Two-stage fallback - suggests likely intents when NLU confidence is low.

use serde_json::Value;

use super::{ActionCommand, ActionError, ActionOutcome, ActionServices, ExecutionTrace, Invocation};
use crate::domain::action::{BotUtterance, Button, TextRecommendations, TriggerRule, TwoStageFallbackConfig};
use crate::domain::tracker::ActionContext;

const FALLBACK_INTENT: &str = "nlu_fallback";
const DEFAULT_RESPONSE: &str = "utter_default";

/// Handler for `two_stage_fallback`.
#[derive(Clone)]
pub struct TwoStageFallbackHandler {
    services: ActionServices,
}

impl TwoStageFallbackHandler {
    pub fn new(services: ActionServices) -> Self {
        Self { services }
    }

    pub async fn handle(
        &self,
        cmd: ActionCommand<'_, TwoStageFallbackConfig>,
        trace: &mut ExecutionTrace,
    ) -> Result<ActionOutcome, ActionError> {
        let ActionCommand { invocation, context, config } = cmd;

        // 1. Collect suggestion buttons
        let mut buttons = match config.text_recommendations {
            Some(recommendations) if recommendations.count > 0 => {
                suggestions(&self.services, &invocation, context, recommendations).await
            }
            _ => Vec::new(),
        };
        buttons.extend(config.trigger_rules.iter().map(trigger_button));
        trace.messages.push(format!("suggestions: {}", buttons.len()));

        // 2. Offer them, or fall back to the default response
        let dispatch = if buttons.is_empty() {
            BotUtterance::template(DEFAULT_RESPONSE)
        } else {
            BotUtterance::text(&config.fallback_message).with_buttons(buttons)
        };

        Ok(ActionOutcome {
            bot_response: dispatch
                .text
                .clone()
                .map(Value::String)
                .unwrap_or_else(|| Value::String(DEFAULT_RESPONSE.to_string())),
            dispatch: Some(dispatch),
            ..ActionOutcome::default()
        })
    }
}

async fn suggestions(
    services: &ActionServices,
    invocation: &Invocation<'_>,
    context: &ActionContext,
    recommendations: TextRecommendations,
) -> Vec<Button> {
    let store = &services.training_examples;
    let result = if recommendations.use_intent_ranking {
        let intents: Vec<String> = invocation
            .snapshot
            .ranked_intents()
            .into_iter()
            .filter(|intent| *intent != FALLBACK_INTENT)
            .take(recommendations.count)
            .map(str::to_string)
            .collect();
        store.examples_for_intents(invocation.bot, &intents).await.map(|examples| {
            examples
                .into_iter()
                .map(|(intent, example)| Button::new(example, format!("/{}", intent)))
                .collect()
        })
    } else {
        store
            .similar_examples(invocation.bot, context.question(), recommendations.count)
            .await
            .map(|examples| {
                examples
                    .into_iter()
                    .map(|example| Button::new(example.clone(), example))
                    .collect()
            })
    };

    result.unwrap_or_else(|err| {
        tracing::warn!(bot = %invocation.bot, error = %err, "Failed to load suggestions, continuing without them");
        Vec::new()
    })
}

fn trigger_button(rule: &TriggerRule) -> Button {
    let payload = match rule.message.as_deref() {
        Some(message) if rule.is_dynamic_msg => format!(
            "/{}{{\"kairon_user_msg\": {}}}",
            rule.payload,
            Value::String(message.to_string())
        ),
        _ => format!("/{}", rule.payload),
    };
    Button::new(&rule.text, payload)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{context, invocation, snapshot, Harness};
    use super::*;
    use crate::adapters::training::InMemoryTrainingExamples;
    use crate::domain::tracker::DomainSpec;
    use crate::ports::{TrainingExampleError, TrainingExampleStore};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct UnavailableExamples;

    #[async_trait]
    impl TrainingExampleStore for UnavailableExamples {
        async fn examples_for_intents(&self, _: &str, _: &[String]) -> Result<Vec<(String, String)>, TrainingExampleError> {
            Err(TrainingExampleError::Unavailable("down".into()))
        }

        async fn similar_examples(&self, _: &str, _: &str, _: usize) -> Result<Vec<String>, TrainingExampleError> {
            Err(TrainingExampleError::Unavailable("down".into()))
        }
    }

    fn harness() -> Harness {
        Harness {
            training: InMemoryTrainingExamples::new()
                .with_example("b1", "order_status", "where is my parcel")
                .with_example("b1", "greet", "hello there")
                .with_example("b1", "refund", "i want a refund for my order"),
            ..Harness::default()
        }
    }

    fn config(use_intent_ranking: bool) -> TwoStageFallbackConfig {
        TwoStageFallbackConfig {
            text_recommendations: Some(TextRecommendations {
                count: 2,
                use_intent_ranking,
            }),
            trigger_rules: vec![],
            fallback_message: "Did you mean?".into(),
        }
    }

    async fn run(services: &ActionServices, config: &TwoStageFallbackConfig) -> ActionOutcome {
        let snapshot = snapshot();
        let domain = DomainSpec::default();
        TwoStageFallbackHandler::new(services.clone())
            .handle(
                ActionCommand::new(invocation(&snapshot, &domain), &context(&snapshot), config),
                &mut ExecutionTrace::default(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn intent_ranking_skips_fallback_intent() {
        let outcome = run(&harness().services(), &config(true)).await;
        let dispatch = outcome.dispatch.unwrap();
        assert_eq!(dispatch.text.as_deref(), Some("Did you mean?"));
        assert_eq!(
            dispatch.buttons,
            vec![
                Button::new("where is my parcel", "/order_status"),
                Button::new("hello there", "/greet"),
            ]
        );
        assert!(outcome.filled_slots.is_empty());
    }

    #[tokio::test]
    async fn similar_examples_use_text_payloads() {
        let outcome = run(&harness().services(), &config(false)).await;
        let buttons = outcome.dispatch.unwrap().buttons;
        assert_eq!(buttons[0].payload, buttons[0].text);
        assert!(buttons.iter().any(|button| button.text == "i want a refund for my order"));
    }

    #[tokio::test]
    async fn trigger_rules_follow_suggestions() {
        let mut config = config(true);
        config.trigger_rules = vec![
            TriggerRule {
                text: "Talk to agent".into(),
                payload: "handoff".into(),
                message: None,
                is_dynamic_msg: false,
            },
            TriggerRule {
                text: "Track".into(),
                payload: "track_order".into(),
                message: Some("track order 42".into()),
                is_dynamic_msg: true,
            },
        ];

        let buttons = run(&harness().services(), &config).await.dispatch.unwrap().buttons;
        assert_eq!(buttons.len(), 4);
        assert_eq!(buttons[2].payload, "/handoff");
        assert_eq!(buttons[3].payload, "/track_order{\"kairon_user_msg\": \"track order 42\"}");
    }

    #[tokio::test]
    async fn no_suggestions_utter_default() {
        let mut services = harness().services();
        services.training_examples = Arc::new(UnavailableExamples);

        let outcome = run(&services, &config(true)).await;
        assert_eq!(outcome.dispatch, Some(BotUtterance::template("utter_default")));
    }
}
