//! Application layer - action dispatch and the per-type action handlers.
//!
//! The dispatcher resolves stored configuration, runs exactly one handler per
//! invocation, converts handler errors into FAILURE results, and appends one
//! execution record for every action it ran.

mod dispatcher;
pub mod handlers;

pub use dispatcher::{ActionDispatcher, Collaborators, DispatchActionCommand, DispatchSettings};
pub use handlers::{ActionCommand, ActionError, ActionHandlers, ActionOutcome, ActionServices, ExecutionTrace, Invocation};
