//! Form validation action - checks the value of the requested form slot.

use serde_json::{json, Map, Value};

use super::{render_text, ActionCommand, ActionError, ActionOutcome, ActionServices, ExecutionTrace};
use crate::domain::action::{BotUtterance, FormSlotSetKind, FormValidationConfig, SlotValidation};
use crate::domain::expression::ExpressionSpec;
use crate::domain::tracker::ActionContext;

const REQUESTED_SLOT: &str = "requested_slot";

/// Handler for `form_validation_action`.
#[derive(Clone)]
pub struct FormValidationHandler {
    services: ActionServices,
}

impl FormValidationHandler {
    pub fn new(services: ActionServices) -> Self {
        Self { services }
    }

    pub async fn handle(
        &self,
        cmd: ActionCommand<'_, FormValidationConfig>,
        trace: &mut ExecutionTrace,
    ) -> Result<ActionOutcome, ActionError> {
        let ActionCommand { invocation, context, config } = cmd;

        // 1. Find the slot being filled
        let Some(slot) = invocation.snapshot.slot(REQUESTED_SLOT).and_then(Value::as_str) else {
            trace.messages.push("No requested_slot set, nothing to validate");
            return Ok(ActionOutcome::default());
        };
        let value = invocation.snapshot.slots.get(slot).cloned().unwrap_or(Value::Null);

        let mut filled_slots = Map::new();
        let Some(validation) = config.validation_for(slot) else {
            trace.messages.push(format!("No validation configured for slot: {}", slot));
            filled_slots.insert(slot.to_string(), value);
            return Ok(ActionOutcome {
                filled_slots,
                ..ActionOutcome::default()
            });
        };

        // 2. Validate the value
        let tree = context.to_value();
        let is_valid = validate(&self.services, validation, slot, &value, &tree, trace).await?;
        trace.messages.push(format!("slot: {} || is_valid: {}", slot, is_valid));

        let (slot_value, response) = if is_valid {
            (slot_value(validation, &value, context), validation.valid_response.as_deref())
        } else {
            (Value::Null, validation.invalid_response.as_deref())
        };
        filled_slots.insert(slot.to_string(), slot_value);

        let bot_response = match response.filter(|text| !text.is_empty()) {
            Some(template) => Value::String(render_text(template, &tree, &mut trace.messages)?),
            None => Value::Null,
        };

        Ok(ActionOutcome {
            filled_slots,
            dispatch: BotUtterance::from_rendered(&bot_response),
            bot_response,
        })
    }
}

async fn validate(
    services: &ActionServices,
    validation: &SlotValidation,
    slot: &str,
    value: &Value,
    tree: &Value,
    trace: &mut ExecutionTrace,
) -> Result<bool, ActionError> {
    if is_blank(value) {
        return Ok(!validation.is_required);
    }

    let Some(script) = validation.validation_semantic.as_deref().filter(|script| !script.trim().is_empty()) else {
        return Ok(true);
    };
    let data = json!({
        "slot": { slot: value },
        "requested_slot": slot,
        "context": tree,
    });
    let verdict = services
        .resolver
        .resolve(&ExpressionSpec::script(script), &data, &mut trace.messages)
        .await?;
    Ok(is_truthy(&verdict))
}

fn slot_value(validation: &SlotValidation, value: &Value, context: &ActionContext) -> Value {
    match validation.slot_set.kind {
        FormSlotSetKind::Current => value.clone(),
        FormSlotSetKind::Custom => validation.slot_set.value.clone(),
        FormSlotSetKind::Slot => validation
            .slot_set
            .value
            .as_str()
            .and_then(|source| context.slot.get(source))
            .cloned()
            .unwrap_or(Value::Null),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty() && !text.eq_ignore_ascii_case("false"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{context, invocation, snapshot, Harness};
    use super::*;
    use crate::adapters::evaluator::MockScriptEvaluator;
    use crate::domain::action::FormSlotSet;
    use crate::domain::tracker::{DialogueSnapshot, DomainSpec};

    fn config() -> FormValidationConfig {
        FormValidationConfig {
            validations: vec![SlotValidation {
                slot: "age".into(),
                is_required: true,
                validation_semantic: Some("return slot['age'] > 18".into()),
                valid_response: Some("Thanks, ${slot.age} noted.".into()),
                invalid_response: Some("Please enter a valid age.".into()),
                slot_set: FormSlotSet::default(),
            }],
        }
    }

    fn form_snapshot(age: Value) -> DialogueSnapshot {
        let mut snapshot = snapshot();
        snapshot.slots.insert("requested_slot".into(), json!("age"));
        snapshot.slots.insert("age".into(), age);
        snapshot
    }

    async fn run(harness: &Harness, snapshot: &DialogueSnapshot, config: &FormValidationConfig) -> ActionOutcome {
        let domain = DomainSpec::default();
        FormValidationHandler::new(harness.services())
            .handle(
                ActionCommand::new(invocation(snapshot, &domain), &context(snapshot), config),
                &mut ExecutionTrace::default(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn valid_value_is_kept_and_acknowledged() {
        let harness = Harness {
            evaluator: MockScriptEvaluator::new().with_success(json!(true)),
            ..Harness::default()
        };
        let outcome = run(&harness, &form_snapshot(json!(30)), &config()).await;

        assert_eq!(outcome.filled_slots["age"], 30);
        assert_eq!(outcome.dispatch, Some(BotUtterance::text("Thanks, 30 noted.")));
        let (_, data) = &harness.evaluator.calls()[0];
        assert_eq!(data["slot"], json!({"age": 30}));
        assert_eq!(data["requested_slot"], "age");
    }

    #[tokio::test]
    async fn falsy_semantic_result_resets_slot() {
        let harness = Harness {
            evaluator: MockScriptEvaluator::new().with_success(json!(false)),
            ..Harness::default()
        };
        let outcome = run(&harness, &form_snapshot(json!(12)), &config()).await;

        assert_eq!(outcome.filled_slots["age"], Value::Null);
        assert_eq!(outcome.dispatch, Some(BotUtterance::text("Please enter a valid age.")));
    }

    #[tokio::test]
    async fn missing_required_value_is_invalid_without_script() {
        let harness = Harness::default();
        let outcome = run(&harness, &form_snapshot(Value::Null), &config()).await;

        assert_eq!(outcome.filled_slots["age"], Value::Null);
        assert!(harness.evaluator.calls().is_empty());
    }

    #[tokio::test]
    async fn slot_without_validation_is_echoed() {
        let mut snapshot = snapshot();
        snapshot.slots.insert("requested_slot".into(), json!("city"));
        let outcome = run(&Harness::default(), &snapshot, &config()).await;

        assert_eq!(outcome.filled_slots["city"], "Pune");
        assert!(outcome.dispatch.is_none());
    }

    #[tokio::test]
    async fn custom_slot_set_overrides_value() {
        let mut config = config();
        config.validations[0].validation_semantic = None;
        config.validations[0].slot_set = FormSlotSet {
            kind: FormSlotSetKind::Custom,
            value: json!("adult"),
        };
        let outcome = run(&Harness::default(), &form_snapshot(json!(40)), &config).await;
        assert_eq!(outcome.filled_slots["age"], "adult");
    }

    #[test]
    fn truthiness() {
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
    }
}
