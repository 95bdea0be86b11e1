//! Response - composition of action responses for dispatch.

mod composer;

pub use composer::{DispatchType, ResponseComposer, ResponseSpec};
