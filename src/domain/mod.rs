//! Domain layer containing the action pipeline's business logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (validation errors, timestamps, masking)
//! - `tracker` - Dialogue snapshots and the action context built from them
//! - `expression` - Path walking, placeholder templates, and the expression resolver
//! - `response` - Response composition for dispatch
//! - `slots` - Slot assignment rules and the slot extractor
//! - `prompt` - Prompt fragments, response cache, and the prompt assembler
//! - `action` - Stored action configuration, results, and audit records

pub mod action;
pub mod expression;
pub mod foundation;
pub mod prompt;
pub mod response;
pub mod slots;
pub mod tracker;
