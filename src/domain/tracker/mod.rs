//! Tracker - dialogue snapshots and the action context built from them.

mod context;
mod domain_spec;
mod snapshot;

pub use context::{ActionContext, ContextBuilder, SESSION_STARTED_SLOT};
pub use domain_spec::DomainSpec;
pub use snapshot::{
    ActiveLoop, ChatTurn, DialogueSnapshot, Entity, IntentPrediction, LatestMessage, TrackerEvent,
    BOT_SLOT, USER_MESSAGE_OVERRIDE_ENTITY,
};
