//! Masking of secrets in configuration snapshots.

use serde_json::Value;

use crate::domain::foundation::mask_secret;

/// Credential fields masked wherever they appear.
const CREDENTIAL_FIELDS: &[&str] = &["api_key", "api_token", "api_secret", "smtp_password", "smtp_userid"];

/// Masks credential fields and secret parameters of a serialized config.
pub(crate) fn redact_config(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let secret_parameter = is_secret_parameter(&map);
            Value::Object(
                map.into_iter()
                    .map(|(key, value)| {
                        let masked = CREDENTIAL_FIELDS.contains(&key.as_str()) || (secret_parameter && key == "value");
                        let value = if masked {
                            mask_value(value)
                        } else {
                            redact_config(value)
                        };
                        (key, value)
                    })
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(redact_config).collect()),
        other => other,
    }
}

fn is_secret_parameter(map: &serde_json::Map<String, Value>) -> bool {
    let encrypted = map.get("encrypt").and_then(Value::as_bool).unwrap_or(false);
    let from_vault = map.get("parameter_type").and_then(Value::as_str) == Some("key_vault");
    encrypted || from_vault
}

/// Masks a plain string, or the `value` of a parameter object.
fn mask_value(value: Value) -> Value {
    match value {
        Value::String(secret) => Value::String(mask_secret(&secret)),
        Value::Object(mut map) => {
            if let Some(Value::String(secret)) = map.get("value") {
                let masked = mask_secret(secret);
                map.insert("value".to_string(), Value::String(masked));
            }
            Value::Object(map)
        }
        other => other,
    }
}
