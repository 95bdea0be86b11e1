//! Expression resolver - evaluates templated values against a data tree.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::path::PathError;
use super::template;
use super::trace::{summarize, TraceLog};
use crate::ports::{ScriptEvaluator, ScriptEvaluatorError};

/// How a templated value is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationType {
    /// Literal `${path}` substitution against the data tree.
    #[default]
    Expression,
    /// The raw template is shipped to the remote script evaluator.
    Script,
}

impl std::fmt::Display for EvaluationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationType::Expression => write!(f, "expression"),
            EvaluationType::Script => write!(f, "script"),
        }
    }
}

/// A template together with its evaluation mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionSpec {
    pub value: String,

    #[serde(default)]
    pub evaluation_type: EvaluationType,
}

impl ExpressionSpec {
    pub fn expression(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            evaluation_type: EvaluationType::Expression,
        }
    }

    pub fn script(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            evaluation_type: EvaluationType::Script,
        }
    }
}

/// Failure to resolve an expression.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Failed to resolve path: {0}")]
    Path(#[from] PathError),

    #[error("Script evaluation failed: {message}")]
    ScriptRejected { message: String },

    #[error("Script evaluator unavailable: {0}")]
    Evaluator(#[from] ScriptEvaluatorError),
}

/// Resolves [`ExpressionSpec`] values in either evaluation mode.
#[derive(Clone)]
pub struct ExpressionResolver {
    evaluator: Arc<dyn ScriptEvaluator>,
}

impl ExpressionResolver {
    pub fn new(evaluator: Arc<dyn ScriptEvaluator>) -> Self {
        Self { evaluator }
    }

    /// Resolves `spec` against `data`, appending one trace line per attempt.
    pub async fn resolve(
        &self,
        spec: &ExpressionSpec,
        data: &Value,
        trace: &mut TraceLog,
    ) -> Result<Value, ResolutionError> {
        match spec.evaluation_type {
            EvaluationType::Expression => {
                Self::resolve_expression(&spec.value, data, trace).map_err(ResolutionError::from)
            }
            EvaluationType::Script => self.resolve_script(&spec.value, data, trace).await,
        }
    }

    /// Literal path substitution; never suspends.
    pub fn resolve_expression(
        template_text: &str,
        data: &Value,
        trace: &mut TraceLog,
    ) -> Result<Value, PathError> {
        let result = template::render(template_text, data);
        match &result {
            Ok(value) => trace.push(format!(
                "evaluation_type: expression, expression: {}, data: {}, response: {}",
                template_text,
                summarize(data),
                summarize(value)
            )),
            Err(err) => trace.push(format!(
                "evaluation_type: expression, expression: {}, data: {}, error: {}",
                template_text,
                summarize(data),
                err
            )),
        }
        result
    }

    async fn resolve_script(
        &self,
        script: &str,
        data: &Value,
        trace: &mut TraceLog,
    ) -> Result<Value, ResolutionError> {
        tracing::debug!(script_len = script.len(), "Evaluating script remotely");

        let outcome = match self.evaluator.evaluate(script, data).await {
            Ok(response) if response.success => Ok(response.data.unwrap_or(Value::Null)),
            Ok(response) => Err(ResolutionError::ScriptRejected {
                message: response
                    .data
                    .as_ref()
                    .map(template::display_value)
                    .unwrap_or_else(|| "evaluator returned success=false".to_string()),
            }),
            Err(err) => Err(ResolutionError::Evaluator(err)),
        };

        match &outcome {
            Ok(value) => trace.push(format!(
                "evaluation_type: script, script: {}, data: {}, response: {}",
                script,
                summarize(data),
                summarize(value)
            )),
            Err(err) => trace.push(format!(
                "evaluation_type: script, script: {}, data: {}, error: {}",
                script,
                summarize(data),
                err
            )),
        }
        outcome
    }
}
