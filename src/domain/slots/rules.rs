//! Slot assignment rules and their stored forms.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::expression::{EvaluationType, ExpressionSpec};

/// Where a slot's new value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValueSource {
    /// Resolved through the expression resolver.
    Expression(ExpressionSpec),
    /// Fixed literal value.
    Literal(Value),
    /// Current value of another slot.
    CopySlot(String),
    /// Declared initial value of the slot itself.
    Reset,
}

/// One slot to fill, applied in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAssignmentRule {
    pub name: String,
    pub source: SlotValueSource,
}

impl SlotAssignmentRule {
    pub fn expression(name: impl Into<String>, value: impl Into<String>, evaluation_type: EvaluationType) -> Self {
        Self {
            name: name.into(),
            source: SlotValueSource::Expression(ExpressionSpec {
                value: value.into(),
                evaluation_type,
            }),
        }
    }

    pub fn literal(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            source: SlotValueSource::Literal(value),
        }
    }

    pub fn copy_slot(name: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: SlotValueSource::CopySlot(from.into()),
        }
    }

    pub fn reset(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: SlotValueSource::Reset,
        }
    }
}

/// Stored rule filling a slot from an action's collaborator response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSlotFromResponse {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub evaluation_type: EvaluationType,
}

impl From<&SetSlotFromResponse> for SlotAssignmentRule {
    fn from(stored: &SetSlotFromResponse) -> Self {
        SlotAssignmentRule::expression(&stored.name, &stored.value, stored.evaluation_type)
    }
}

/// Kind of a direct slot assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSetKind {
    FromValue,
    ResetSlot,
    Slot,
}

/// Stored rule of a slot-set action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSlotDirective {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SlotSetKind,
    #[serde(default)]
    pub value: Value,
}

impl From<&SetSlotDirective> for SlotAssignmentRule {
    fn from(stored: &SetSlotDirective) -> Self {
        match stored.kind {
            SlotSetKind::FromValue => SlotAssignmentRule::literal(&stored.name, stored.value.clone()),
            SlotSetKind::ResetSlot => SlotAssignmentRule::reset(&stored.name),
            SlotSetKind::Slot => match &stored.value {
                Value::String(source) => SlotAssignmentRule::copy_slot(&stored.name, source),
                other => SlotAssignmentRule::copy_slot(&stored.name, other.to_string()),
            },
        }
    }
}
