//! Human-readable evaluation trace kept for the audit log.

use serde::Serialize;
use serde_json::Value;

const MAX_DATA_CHARS: usize = 500;

/// Ordered trace lines describing each evaluation step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TraceLog(Vec<String>);

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        self.0.push(entry.into());
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.iter().any(|entry| entry.contains(needle))
    }

    pub fn into_entries(self) -> Vec<String> {
        self.0
    }
}

/// JSON text of a value, truncated for log readability.
pub fn summarize(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= MAX_DATA_CHARS {
        return text;
    }
    let truncated: String = text.chars().take(MAX_DATA_CHARS).collect();
    format!("{}...", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_entries_in_push_order() {
        let mut trace = TraceLog::new();
        trace.push("first");
        trace.push(String::from("second"));

        assert_eq!(trace.entries(), &["first".to_string(), "second".to_string()]);
        assert!(trace.contains("sec"));
    }

    #[test]
    fn summarize_truncates_long_values() {
        let long = json!("x".repeat(2000));
        let summary = summarize(&long);
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), MAX_DATA_CHARS + 3);
    }
}
