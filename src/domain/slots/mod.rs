//! Slots - assignment rules and the slot extractor.

mod extractor;
mod rules;

pub use extractor::{SlotExtractor, SlotSources};
pub use rules::{SetSlotDirective, SetSlotFromResponse, SlotAssignmentRule, SlotSetKind, SlotValueSource};
