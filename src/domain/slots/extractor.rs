//! Slot extractor - turns assignment rules into ordered slot values.

use serde_json::{Map, Value};

use super::rules::{SlotAssignmentRule, SlotValueSource};
use crate::domain::expression::{summarize, ExpressionResolver, TraceLog};
use crate::domain::tracker::DomainSpec;

/// Current slot values and domain declarations used by direct-lookup rules.
#[derive(Debug, Clone, Copy)]
pub struct SlotSources<'a> {
    pub current_slots: &'a Map<String, Value>,
    pub domain: &'a DomainSpec,
}

/// Applies [`SlotAssignmentRule`] lists.
#[derive(Clone)]
pub struct SlotExtractor {
    resolver: ExpressionResolver,
}

impl SlotExtractor {
    pub fn new(resolver: ExpressionResolver) -> Self {
        Self { resolver }
    }

    /// Evaluates every rule against the same `data`, in declared order.
    ///
    /// A rule that fails to resolve sets its slot to null; the remaining rules
    /// still run.
    pub async fn extract(
        &self,
        rules: &[SlotAssignmentRule],
        data: &Value,
        sources: SlotSources<'_>,
        trace: &mut TraceLog,
    ) -> Map<String, Value> {
        let mut filled = Map::new();
        if rules.is_empty() {
            return filled;
        }

        trace.push("initiating slot evaluation");
        for rule in rules {
            let value = match &rule.source {
                SlotValueSource::Literal(value) => value.clone(),
                SlotValueSource::CopySlot(from) => {
                    sources.current_slots.get(from).cloned().unwrap_or(Value::Null)
                }
                SlotValueSource::Reset => sources.domain.initial_value(&rule.name),
                SlotValueSource::Expression(spec) => {
                    match self.resolver.resolve(spec, data, trace).await {
                        Ok(value) => value,
                        Err(err) => {
                            tracing::warn!(slot = %rule.name, error = %err, "Slot evaluation failed");
                            trace.push(format!("slot: {} || evaluation failed: {}", rule.name, err));
                            filled.insert(rule.name.clone(), Value::Null);
                            continue;
                        }
                    }
                }
            };

            trace.push(format!("slot: {} || value: {}", rule.name, summarize(&value)));
            filled.insert(rule.name.clone(), value);
        }

        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::evaluator::MockScriptEvaluator;
    use crate::domain::expression::EvaluationType;
    use serde_json::json;
    use std::sync::Arc;

    fn extractor(evaluator: MockScriptEvaluator) -> SlotExtractor {
        SlotExtractor::new(ExpressionResolver::new(Arc::new(evaluator)))
    }

    fn data() -> Value {
        json!({"data": {"name": "Nupur", "items": [{"id": 11}, {"id": 12}]}, "context": {}})
    }

    fn domain() -> DomainSpec {
        serde_json::from_value(json!({"slots": {"retries": {"initial_value": 0}}})).unwrap()
    }

    #[tokio::test]
    async fn rules_fill_slots_in_declared_order() {
        let slots = Map::new();
        let domain = domain();
        let rules = vec![
            SlotAssignmentRule::expression("second_id", "${data.items.1.id}", EvaluationType::Expression),
            SlotAssignmentRule::expression("name", "${data.name}", EvaluationType::Expression),
        ];
        let mut trace = TraceLog::new();

        let filled = extractor(MockScriptEvaluator::new())
            .extract(&rules, &data(), SlotSources { current_slots: &slots, domain: &domain }, &mut trace)
            .await;

        let keys: Vec<&String> = filled.keys().collect();
        assert_eq!(keys, vec!["second_id", "name"]);
        assert_eq!(filled["second_id"], json!(12));
        assert!(trace.entries()[0].contains("initiating slot evaluation"));
    }

    #[tokio::test]
    async fn failing_rule_sets_null_and_continues() {
        let slots = Map::new();
        let domain = domain();
        let rules = vec![
            SlotAssignmentRule::expression("a", "${data.name}", EvaluationType::Expression),
            SlotAssignmentRule::expression("b", "${data.nope.x}", EvaluationType::Expression),
            SlotAssignmentRule::expression("c", "${data.items.0.id}", EvaluationType::Expression),
        ];
        let mut trace = TraceLog::new();

        let filled = extractor(MockScriptEvaluator::new())
            .extract(&rules, &data(), SlotSources { current_slots: &slots, domain: &domain }, &mut trace)
            .await;

        assert_eq!(filled["a"], json!("Nupur"));
        assert_eq!(filled["b"], Value::Null);
        assert_eq!(filled["c"], json!(11));
        assert!(trace.contains("slot: b || evaluation failed"));
    }

    #[tokio::test]
    async fn direct_rules_bypass_the_resolver() {
        let evaluator = MockScriptEvaluator::new();
        let mut slots = Map::new();
        slots.insert("location".into(), json!("Bangalore"));
        let domain = domain();
        let rules = vec![
            SlotAssignmentRule::literal("status", json!("confirmed")),
            SlotAssignmentRule::copy_slot("city", "location"),
            SlotAssignmentRule::copy_slot("missing", "unknown"),
            SlotAssignmentRule::reset("retries"),
        ];
        let mut trace = TraceLog::new();

        let filled = extractor(evaluator.clone())
            .extract(&rules, &json!({}), SlotSources { current_slots: &slots, domain: &domain }, &mut trace)
            .await;

        assert_eq!(filled["status"], json!("confirmed"));
        assert_eq!(filled["city"], json!("Bangalore"));
        assert_eq!(filled["missing"], Value::Null);
        assert_eq!(filled["retries"], json!(0));
        assert!(evaluator.calls().is_empty());
    }

    #[tokio::test]
    async fn script_rules_use_evaluator_results() {
        let evaluator = MockScriptEvaluator::new()
            .with_success(json!("from-script"))
            .with_failure(json!("syntax error"));
        let slots = Map::new();
        let domain = domain();
        let rules = vec![
            SlotAssignmentRule::expression("ok", "bot_response = 'from-script'", EvaluationType::Script),
            SlotAssignmentRule::expression("bad", "bot_response = (", EvaluationType::Script),
        ];
        let mut trace = TraceLog::new();

        let filled = extractor(evaluator)
            .extract(&rules, &data(), SlotSources { current_slots: &slots, domain: &domain }, &mut trace)
            .await;

        assert_eq!(filled["ok"], json!("from-script"));
        assert_eq!(filled["bad"], Value::Null);
    }

    #[tokio::test]
    async fn no_rules_leave_trace_untouched() {
        let slots = Map::new();
        let domain = DomainSpec::default();
        let mut trace = TraceLog::new();
        let filled = extractor(MockScriptEvaluator::new())
            .extract(&[], &data(), SlotSources { current_slots: &slots, domain: &domain }, &mut trace)
            .await;

        assert!(filled.is_empty());
        assert!(trace.is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn broken_rule_does_not_disturb_its_neighbours(
                values in prop::collection::vec(any::<i64>(), 1..6),
                broken_seed in any::<usize>(),
            ) {
                let broken = broken_seed % values.len();
                let data = json!({
                    "data": values
                        .iter()
                        .enumerate()
                        .map(|(i, value)| (format!("v{}", i), json!(value)))
                        .collect::<Map<String, Value>>()
                });
                let rules: Vec<SlotAssignmentRule> = (0..values.len())
                    .map(|i| {
                        let path = if i == broken { format!("${{data.missing{}.x}}", i) } else { format!("${{data.v{}}}", i) };
                        SlotAssignmentRule::expression(format!("slot_{}", i), path, EvaluationType::Expression)
                    })
                    .collect();
                let slots = Map::new();
                let domain = domain();
                let mut trace = TraceLog::new();

                let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
                let filled = runtime.block_on(
                    extractor(MockScriptEvaluator::new())
                        .extract(&rules, &data, SlotSources { current_slots: &slots, domain: &domain }, &mut trace),
                );

                prop_assert_eq!(filled.len(), values.len());
                for (i, value) in values.iter().enumerate() {
                    let expected = if i == broken { Value::Null } else { json!(value) };
                    prop_assert_eq!(&filled[&format!("slot_{}", i)], &expected);
                }
            }
        }
    }
}
