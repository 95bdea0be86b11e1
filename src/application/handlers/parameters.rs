//! Resolution of configured request parameters and credentials.

use secrecy::Secret;
use serde_json::{Map, Value};

use super::ActionError;
use crate::domain::action::{CustomParameter, ParameterType};
use crate::domain::expression::display_value;
use crate::domain::foundation::mask_secret;
use crate::domain::tracker::ActionContext;

/// Value of one parameter according to its `parameter_type`.
pub fn resolve_parameter(parameter: &CustomParameter, context: &ActionContext) -> Value {
    let optional = |text: &Option<String>| text.clone().map(Value::String).unwrap_or(Value::Null);
    match parameter.parameter_type {
        ParameterType::Value => Value::String(parameter.value.clone()),
        ParameterType::Slot => context.slot.get(&parameter.value).cloned().unwrap_or(Value::Null),
        ParameterType::SenderId => Value::String(context.sender_id.clone()),
        ParameterType::UserMessage => optional(&context.user_message),
        ParameterType::Intent => optional(&context.intent),
        ParameterType::ChatLog => context.to_value()["chat_log"].clone(),
        ParameterType::KeyVault => match context.key_vault.get(&parameter.value) {
            Some(secret) => Value::String(secret.clone()),
            None => {
                tracing::warn!(key = %parameter.key, secret = %parameter.value, "Secret not found in key vault");
                Value::Null
            }
        },
    }
}

/// Resolves a parameter list in order.
pub fn resolve_parameters(parameters: &[CustomParameter], context: &ActionContext) -> Map<String, Value> {
    parameters
        .iter()
        .map(|parameter| (parameter.key.clone(), resolve_parameter(parameter, context)))
        .collect()
}

/// Same as [`resolve_parameters`] with secret values masked, for audit records.
pub fn masked_parameters(parameters: &[CustomParameter], context: &ActionContext) -> Map<String, Value> {
    parameters
        .iter()
        .map(|parameter| {
            let value = resolve_parameter(parameter, context);
            let value = if parameter.is_secret() {
                Value::String(mask_secret(&display_value(&value)))
            } else {
                value
            };
            (parameter.key.clone(), value)
        })
        .collect()
}

/// Display text of a parameter; null resolves to `None`.
pub fn parameter_text(parameter: &CustomParameter, context: &ActionContext) -> Option<String> {
    match resolve_parameter(parameter, context) {
        Value::Null => None,
        value => Some(display_value(&value)),
    }
}

/// A credential that must resolve to a non-empty value.
pub fn resolve_secret(parameter: &CustomParameter, context: &ActionContext) -> Result<Secret<String>, ActionError> {
    parameter_text(parameter, context)
        .filter(|secret| !secret.is_empty())
        .map(Secret::new)
        .ok_or_else(|| ActionError::MissingParameter(parameter.key.clone()))
}

/// Resolved parameters as `(name, text)` pairs, e.g. for query strings and headers.
pub fn as_pairs(resolved: &Map<String, Value>) -> Vec<(String, String)> {
    resolved
        .iter()
        .map(|(name, value)| {
            let text = match value {
                Value::Null => String::new(),
                other => display_value(other),
            };
            (name.clone(), text)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tracker::DialogueSnapshot;
    use secrecy::ExposeSecret;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn context() -> ActionContext {
        let snapshot: DialogueSnapshot = serde_json::from_value(json!({
            "sender_id": "u1",
            "slots": {"bot": "b1", "city": "Pune"},
            "latest_message": {"text": "hi", "intent": {"name": "greet"}},
            "events": [{"event": "user", "text": "hi"}]
        }))
        .unwrap();
        let mut vault = BTreeMap::new();
        vault.insert("API_KEY".to_string(), "secret-value".to_string());
        ActionContext::from_snapshot(&snapshot, vault)
    }

    #[test]
    fn parameters_resolve_by_type() {
        let params = vec![
            CustomParameter::value("lang", "en"),
            CustomParameter::of_type("city", ParameterType::Slot, "city"),
            CustomParameter::of_type("sender", ParameterType::SenderId, ""),
            CustomParameter::of_type("msg", ParameterType::UserMessage, ""),
            CustomParameter::of_type("intent", ParameterType::Intent, ""),
            CustomParameter::of_type("history", ParameterType::ChatLog, ""),
            CustomParameter::of_type("key", ParameterType::KeyVault, "API_KEY"),
        ];

        let resolved = resolve_parameters(&params, &context());
        assert_eq!(resolved["lang"], "en");
        assert_eq!(resolved["city"], "Pune");
        assert_eq!(resolved["sender"], "u1");
        assert_eq!(resolved["msg"], "hi");
        assert_eq!(resolved["intent"], "greet");
        assert_eq!(resolved["history"], json!([{"user": "hi"}]));
        assert_eq!(resolved["key"], "secret-value");
    }

    #[test]
    fn secrets_are_masked_for_audit() {
        let params = vec![CustomParameter::of_type("key", ParameterType::KeyVault, "API_KEY")];
        let masked = masked_parameters(&params, &context());
        assert_eq!(masked["key"], "se********ue");
    }

    #[test]
    fn missing_secret_is_an_error() {
        let param = CustomParameter::of_type("token", ParameterType::KeyVault, "ABSENT");
        assert!(matches!(
            resolve_secret(&param, &context()),
            Err(ActionError::MissingParameter(key)) if key == "token"
        ));

        let present = CustomParameter::of_type("key", ParameterType::KeyVault, "API_KEY");
        assert_eq!(resolve_secret(&present, &context()).unwrap().expose_secret(), "secret-value");
    }

    #[test]
    fn pairs_render_text() {
        let mut resolved = Map::new();
        resolved.insert("n".into(), json!(3));
        resolved.insert("none".into(), Value::Null);
        assert_eq!(
            as_pairs(&resolved),
            vec![("n".to_string(), "3".to_string()), ("none".to_string(), String::new())]
        );
    }
}
