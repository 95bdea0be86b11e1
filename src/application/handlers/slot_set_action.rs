//! Slot set action - direct slot assignments without a collaborator call.

use serde_json::Value;

use super::{ActionCommand, ActionError, ActionOutcome, ActionServices, ExecutionTrace};
use crate::domain::action::SlotSetActionConfig;
use crate::domain::slots::SlotAssignmentRule;

/// Handler for `slot_set_action`.
#[derive(Clone)]
pub struct SlotSetHandler {
    services: ActionServices,
}

impl SlotSetHandler {
    pub fn new(services: ActionServices) -> Self {
        Self { services }
    }

    pub async fn handle(
        &self,
        cmd: ActionCommand<'_, SlotSetActionConfig>,
        trace: &mut ExecutionTrace,
    ) -> Result<ActionOutcome, ActionError> {
        let ActionCommand { invocation, config, .. } = cmd;

        let rules: Vec<SlotAssignmentRule> = config.set_slots.iter().map(Into::into).collect();
        let filled_slots = self
            .services
            .extractor
            .extract(&rules, &Value::Null, invocation.slot_sources(), &mut trace.messages)
            .await;

        Ok(ActionOutcome {
            filled_slots,
            ..ActionOutcome::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{context, invocation, snapshot, Harness};
    use super::*;
    use crate::domain::slots::{SetSlotDirective, SlotSetKind};
    use crate::domain::tracker::DomainSpec;
    use serde_json::json;

    #[tokio::test]
    async fn applies_directives_in_order() {
        let domain: DomainSpec = serde_json::from_value(json!({
            "slots": {"attempts": {"initial_value": 0}}
        }))
        .unwrap();
        let snapshot = snapshot();
        let config = SlotSetActionConfig {
            set_slots: vec![
                SetSlotDirective { name: "location".into(), kind: SlotSetKind::FromValue, value: json!("Mumbai") },
                SetSlotDirective { name: "attempts".into(), kind: SlotSetKind::ResetSlot, value: Value::Null },
                SetSlotDirective { name: "home_city".into(), kind: SlotSetKind::Slot, value: json!("city") },
            ],
        };

        let outcome = SlotSetHandler::new(Harness::default().services())
            .handle(
                ActionCommand::new(invocation(&snapshot, &domain), &context(&snapshot), &config),
                &mut ExecutionTrace::default(),
            )
            .await
            .unwrap();

        let names: Vec<&String> = outcome.filled_slots.keys().collect();
        assert_eq!(names, ["location", "attempts", "home_city"]);
        assert_eq!(outcome.filled_slots["location"], "Mumbai");
        assert_eq!(outcome.filled_slots["attempts"], 0);
        assert_eq!(outcome.filled_slots["home_city"], "Pune");
        assert!(outcome.dispatch.is_none());
    }
}
