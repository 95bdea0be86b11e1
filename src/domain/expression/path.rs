//! Dotted-path lookups over untyped JSON trees.

use serde_json::Value;
use thiserror::Error;

/// Failure to walk a path through a JSON tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path")]
    EmptyPath,

    #[error("key '{segment}' not found at '{path}'")]
    MissingKey { path: String, segment: String },

    #[error("index {index} out of bounds at '{path}' (length {len})")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("cannot look up '{segment}' in a {kind} at '{path}'")]
    NotIndexable {
        path: String,
        segment: String,
        kind: &'static str,
    },
}

/// Walks `value` through `segments`.
///
/// A purely numeric segment indexes into an array; any segment looks up a key
/// in an object, so `"3"` also matches an object key named `3`.
pub fn get_path<'a, S: AsRef<str>>(value: &'a Value, segments: &[S]) -> Result<&'a Value, PathError> {
    if segments.is_empty() {
        return Err(PathError::EmptyPath);
    }

    let mut current = value;
    for (position, segment) in segments.iter().enumerate() {
        let segment = segment.as_ref();
        let walked = || {
            segments[..position]
                .iter()
                .map(|walked| walked.as_ref())
                .collect::<Vec<&str>>()
                .join(".")
        };

        current = match current {
            Value::Object(map) => map.get(segment).ok_or_else(|| PathError::MissingKey {
                path: walked(),
                segment: segment.to_string(),
            })?,
            Value::Array(items) => {
                let index = segment
                    .parse::<usize>()
                    .map_err(|_| PathError::NotIndexable {
                        path: walked(),
                        segment: segment.to_string(),
                        kind: "list",
                    })?;
                items.get(index).ok_or_else(|| PathError::IndexOutOfBounds {
                    path: walked(),
                    index,
                    len: items.len(),
                })?
            }
            other => {
                return Err(PathError::NotIndexable {
                    path: walked(),
                    segment: segment.to_string(),
                    kind: kind_of(other),
                })
            }
        };
    }

    Ok(current)
}

/// Walks a dot separated path such as `data.items.0.name`.
pub fn get_dotted<'a>(value: &'a Value, path: &str) -> Result<&'a Value, PathError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(PathError::EmptyPath);
    }
    let segments: Vec<&str> = path.split('.').map(str::trim).collect();
    get_path(value, &segments)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> Value {
        json!({"a": {"b": {"3": 2, "d": ["red", "buggy", "bumpers"]}}})
    }

    #[test]
    fn numeric_segment_matches_object_key() {
        assert_eq!(get_dotted(&tree(), "a.b.3").unwrap(), &json!(2));
    }

    #[test]
    fn numeric_segment_indexes_list() {
        assert_eq!(get_dotted(&tree(), "a.b.d.0").unwrap(), &json!("red"));
    }

    #[test]
    fn returns_whole_subtree() {
        assert_eq!(
            get_dotted(&tree(), "a.b.d").unwrap(),
            &json!(["red", "buggy", "bumpers"])
        );
    }

    #[test]
    fn missing_key_reports_walked_path() {
        let err = get_dotted(&tree(), "a.x.y").unwrap_err();
        assert_eq!(
            err,
            PathError::MissingKey {
                path: "a".into(),
                segment: "x".into()
            }
        );
    }

    #[test]
    fn out_of_bounds_index_fails() {
        let err = get_dotted(&tree(), "a.b.d.7").unwrap_err();
        assert!(matches!(err, PathError::IndexOutOfBounds { index: 7, len: 3, .. }));
    }

    #[test]
    fn word_segment_on_list_fails() {
        let err = get_dotted(&tree(), "a.b.d.first").unwrap_err();
        assert!(matches!(err, PathError::NotIndexable { kind: "list", .. }));
    }

    #[test]
    fn scalar_cannot_be_walked() {
        let err = get_dotted(&tree(), "a.b.3.x").unwrap_err();
        assert!(matches!(err, PathError::NotIndexable { kind: "number", .. }));
    }

    #[test]
    fn empty_path_is_rejected() {
        assert_eq!(get_dotted(&tree(), "  ").unwrap_err(), PathError::EmptyPath);
        let no_segments: [&str; 0] = [];
        assert_eq!(get_path(&tree(), &no_segments).unwrap_err(), PathError::EmptyPath);
    }
}
