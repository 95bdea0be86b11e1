//! Script Evaluator Adapters.
//!
//! - `HttpScriptEvaluator` - Remote evaluator over HTTP
//! - `MockScriptEvaluator` - Queued replies for testing

mod http_script_evaluator;
mod mock_evaluator;

pub use http_script_evaluator::{HttpScriptEvaluator, ScriptEvaluatorConfig};
pub use mock_evaluator::MockScriptEvaluator;
