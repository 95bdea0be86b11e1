//! `${...}` placeholder templates.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::path::{get_dotted, PathError};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^{}]*)\}").expect("placeholder pattern is valid"));

/// Returns true when the template contains at least one placeholder.
pub fn has_placeholders(template: &str) -> bool {
    PLACEHOLDER.is_match(template)
}

/// Path of the placeholder when the template is exactly one placeholder.
pub fn sole_placeholder(template: &str) -> Option<&str> {
    let captures = PLACEHOLDER.captures(template)?;
    let whole = captures.get(0)?;
    if whole.start() == 0 && whole.end() == template.len() {
        captures.get(1).map(|path| path.as_str())
    } else {
        None
    }
}

/// Paths of all placeholders, in template order.
pub fn placeholder_paths(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|captures| captures.get(1).map(|path| path.as_str()))
        .collect()
}

/// Substitutes every placeholder in `template` with values from `data`.
///
/// A template made of a single placeholder keeps the native type of the value;
/// otherwise the result is a string.
pub fn render(template: &str, data: &Value) -> Result<Value, PathError> {
    if let Some(path) = sole_placeholder(template) {
        return get_dotted(data, path).cloned();
    }

    let mut rendered = String::with_capacity(template.len());
    let mut last = 0;
    for captures in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(path)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        rendered.push_str(&template[last..whole.start()]);
        rendered.push_str(&display_value(get_dotted(data, path.as_str())?));
        last = whole.end();
    }
    rendered.push_str(&template[last..]);

    Ok(Value::String(rendered))
}

/// Text form of a value when substituted into surrounding text.
///
/// Strings are inserted raw; lists and mappings use their JSON text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
