//! Mock Script Evaluator for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{ScriptEvaluator, ScriptEvaluatorError, ScriptResponse};

/// Queued evaluator replies; clones share the queue and call history.
///
/// With an empty queue every script succeeds with `null`.
#[derive(Debug, Clone, Default)]
pub struct MockScriptEvaluator {
    responses: Arc<Mutex<VecDeque<Result<ScriptResponse, ScriptEvaluatorError>>>>,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MockScriptEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_success(self, data: Value) -> Self {
        self.push(Ok(ScriptResponse::success(data)))
    }

    pub fn with_failure(self, data: Value) -> Self {
        self.push(Ok(ScriptResponse::failure(data)))
    }

    pub fn with_error(self, error: ScriptEvaluatorError) -> Self {
        self.push(Err(error))
    }

    fn push(self, response: Result<ScriptResponse, ScriptEvaluatorError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Recorded `(script, data)` pairs.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScriptEvaluator for MockScriptEvaluator {
    async fn evaluate(&self, script: &str, data: &Value) -> Result<ScriptResponse, ScriptEvaluatorError> {
        self.calls.lock().unwrap().push((script.to_string(), data.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ScriptResponse::success(Value::Null)))
    }
}
