//! Response composer - renders the user-facing response of an action.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::expression::{
    display_value, has_placeholders, EvaluationType, ExpressionResolver, ExpressionSpec,
    ResolutionError, TraceLog,
};

/// How the rendered response is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchType {
    #[default]
    Text,
    Json,
}

/// Stored response configuration of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSpec {
    #[serde(default)]
    pub value: Option<String>,

    #[serde(default = "default_dispatch")]
    pub dispatch: bool,

    #[serde(default)]
    pub evaluation_type: EvaluationType,

    #[serde(default)]
    pub dispatch_type: DispatchType,
}

fn default_dispatch() -> bool {
    true
}

impl Default for ResponseSpec {
    fn default() -> Self {
        Self {
            value: None,
            dispatch: default_dispatch(),
            evaluation_type: EvaluationType::Expression,
            dispatch_type: DispatchType::Text,
        }
    }
}

impl ResponseSpec {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn with_evaluation_type(mut self, evaluation_type: EvaluationType) -> Self {
        self.evaluation_type = evaluation_type;
        self
    }

    pub fn with_dispatch_type(mut self, dispatch_type: DispatchType) -> Self {
        self.dispatch_type = dispatch_type;
        self
    }

    pub fn without_dispatch(mut self) -> Self {
        self.dispatch = false;
        self
    }
}

/// Renders [`ResponseSpec`] values through the expression resolver.
#[derive(Clone)]
pub struct ResponseComposer {
    resolver: ExpressionResolver,
}

impl ResponseComposer {
    pub fn new(resolver: ExpressionResolver) -> Self {
        Self { resolver }
    }

    /// Renders the response against `data`.
    ///
    /// Text dispatch always yields a string. JSON dispatch yields the parsed
    /// value, or the unparsed string when it is not valid JSON. An unset
    /// response renders as null.
    pub async fn compose(
        &self,
        spec: &ResponseSpec,
        data: &Value,
        trace: &mut TraceLog,
    ) -> Result<Value, ResolutionError> {
        let Some(template) = spec.value.as_deref().filter(|value| !value.is_empty()) else {
            trace.push("No response configured");
            return Ok(Value::Null);
        };

        trace.push("initiating response evaluation");
        let resolved = if spec.evaluation_type == EvaluationType::Expression && !has_placeholders(template) {
            Value::String(template.to_string())
        } else {
            let expression = ExpressionSpec {
                value: template.to_string(),
                evaluation_type: spec.evaluation_type,
            };
            self.resolver.resolve(&expression, data, trace).await?
        };

        let rendered = match spec.dispatch_type {
            DispatchType::Text => Value::String(display_value(&resolved)),
            DispatchType::Json => match resolved {
                Value::String(text) => match serde_json::from_str::<Value>(&text) {
                    Ok(parsed) => parsed,
                    Err(err) => {
                        trace.push(format!(
                            "dispatch_type: json, response is not valid json ({}), dispatching as text",
                            err
                        ));
                        Value::String(text)
                    }
                },
                structured => structured,
            },
        };

        trace.push(format!("response composed for dispatch_type: {}", dispatch_label(spec.dispatch_type)));
        Ok(rendered)
    }
}

fn dispatch_label(dispatch_type: DispatchType) -> &'static str {
    match dispatch_type {
        DispatchType::Text => "text",
        DispatchType::Json => "json",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::evaluator::MockScriptEvaluator;
    use std::sync::Arc;
    use serde_json::json;

    fn composer(evaluator: MockScriptEvaluator) -> ResponseComposer {
        ResponseComposer::new(ExpressionResolver::new(Arc::new(evaluator)))
    }

    fn data() -> Value {
        json!({"data": {"a": {"b": {"3": 2, "d": ["red", "buggy", "bumpers"]}}, "user": {"id": 7}}})
    }

    #[tokio::test]
    async fn static_response_is_returned_without_evaluation() {
        let evaluator = MockScriptEvaluator::new();
        let mut trace = TraceLog::new();
        let rendered = composer(evaluator.clone())
            .compose(&ResponseSpec::text("Thanks, noted."), &data(), &mut trace)
            .await
            .unwrap();

        assert_eq!(rendered, json!("Thanks, noted."));
        assert!(evaluator.calls().is_empty());
    }

    #[tokio::test]
    async fn mixed_template_renders_string() {
        let mut trace = TraceLog::new();
        let rendered = composer(MockScriptEvaluator::new())
            .compose(
                &ResponseSpec::text("The value of ${data.a.b.3} in ${data.a.b.d.0} is ${data.a.b.d}"),
                &data(),
                &mut trace,
            )
            .await
            .unwrap();

        assert_eq!(rendered, json!(r#"The value of 2 in red is ["red","buggy","bumpers"]"#));
    }

    #[tokio::test]
    async fn text_dispatch_stringifies_structured_values() {
        let mut trace = TraceLog::new();
        let rendered = composer(MockScriptEvaluator::new())
            .compose(&ResponseSpec::text("${data.user}"), &data(), &mut trace)
            .await
            .unwrap();

        assert_eq!(rendered, json!(r#"{"id":7}"#));
    }

    #[tokio::test]
    async fn json_dispatch_parses_resolved_text() {
        let mut trace = TraceLog::new();
        let spec = ResponseSpec::text(r#"{"user": ${data.user.id}}"#).with_dispatch_type(DispatchType::Json);
        let rendered = composer(MockScriptEvaluator::new())
            .compose(&spec, &data(), &mut trace)
            .await
            .unwrap();

        assert_eq!(rendered, json!({"user": 7}));
    }

    #[tokio::test]
    async fn json_dispatch_keeps_structured_value() {
        let mut trace = TraceLog::new();
        let spec = ResponseSpec::text("${data.a.b.d}").with_dispatch_type(DispatchType::Json);
        let rendered = composer(MockScriptEvaluator::new())
            .compose(&spec, &data(), &mut trace)
            .await
            .unwrap();

        assert_eq!(rendered, json!(["red", "buggy", "bumpers"]));
    }

    #[tokio::test]
    async fn invalid_json_falls_back_to_original_text() {
        let mut trace = TraceLog::new();
        let spec = ResponseSpec::text("INVALID ${data.user}").with_dispatch_type(DispatchType::Json);
        let rendered = composer(MockScriptEvaluator::new())
            .compose(&spec, &data(), &mut trace)
            .await
            .unwrap();

        assert_eq!(rendered, json!(r#"INVALID {"id":7}"#));
        assert!(trace.contains("dispatching as text"));
    }

    #[tokio::test]
    async fn script_mode_delegates_to_evaluator() {
        let evaluator = MockScriptEvaluator::new().with_success(json!({"greeting": "hello"}));
        let mut trace = TraceLog::new();
        let spec = ResponseSpec::text("bot_response = {'greeting': 'hello'}")
            .with_evaluation_type(EvaluationType::Script)
            .with_dispatch_type(DispatchType::Json);

        let rendered = composer(evaluator).compose(&spec, &data(), &mut trace).await.unwrap();
        assert_eq!(rendered, json!({"greeting": "hello"}));
    }

    #[tokio::test]
    async fn script_rejection_propagates() {
        let evaluator = MockScriptEvaluator::new().with_failure(json!("boom"));
        let mut trace = TraceLog::new();
        let spec = ResponseSpec::text("${RESPONSE}")
            .with_evaluation_type(EvaluationType::Script)
            .with_dispatch_type(DispatchType::Json);

        assert!(composer(evaluator).compose(&spec, &data(), &mut trace).await.is_err());
    }

    #[tokio::test]
    async fn unset_response_renders_null() {
        let mut trace = TraceLog::new();
        let rendered = composer(MockScriptEvaluator::new())
            .compose(&ResponseSpec::default(), &data(), &mut trace)
            .await
            .unwrap();
        assert_eq!(rendered, Value::Null);
    }

    #[test]
    fn response_spec_defaults() {
        let spec: ResponseSpec = serde_json::from_value(json!({"value": "ok"})).unwrap();
        assert!(spec.dispatch);
        assert_eq!(spec.dispatch_type, DispatchType::Text);
        assert_eq!(spec.evaluation_type, EvaluationType::Expression);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn json_dispatch_reparses_identically(
                name in "[a-zA-Z ]{0,12}",
                count in any::<i64>(),
                flag in any::<bool>(),
            ) {
                let data = json!({"data": {"name": name, "count": count, "flag": flag}});
                let spec = ResponseSpec::text(r#"{"name": "${data.name}", "count": ${data.count}, "tags": [${data.flag}, null]}"#)
                    .with_dispatch_type(DispatchType::Json);
                let mut trace = TraceLog::new();

                let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
                let rendered = runtime
                    .block_on(composer(MockScriptEvaluator::new()).compose(&spec, &data, &mut trace))
                    .unwrap();

                prop_assert_eq!(&rendered, &json!({"name": name, "count": count, "tags": [flag, null]}));
                let reparsed: Value = serde_json::from_str(&serde_json::to_string(&rendered).unwrap()).unwrap();
                prop_assert_eq!(reparsed, rendered);
            }
        }
    }
}
