//! Vector Store Port - similarity search over embedded passages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Port for a bot scoped vector database.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Nearest passages to `query_text` scoring at least `threshold`, best first.
    async fn search(
        &self,
        bot: &str,
        collection: &str,
        query_text: &str,
        top_k: usize,
        threshold: f64,
    ) -> Result<Vec<ScoredPoint>, VectorStoreError>;

    /// Points whose payload matches every key of `filter`.
    async fn payload_search(
        &self,
        bot: &str,
        collection: &str,
        filter: &Value,
    ) -> Result<Vec<ScoredPoint>, VectorStoreError>;

    /// Embeds `text` and stores it with `payload`.
    async fn upsert(
        &self,
        bot: &str,
        collection: &str,
        text: &str,
        payload: Value,
    ) -> Result<(), VectorStoreError>;
}

/// A search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f64,
    pub payload: Value,
}

impl ScoredPoint {
    /// Text content of the passage, from the payload's `content` field.
    pub fn content(&self) -> Option<&str> {
        self.payload.get("content").and_then(Value::as_str)
    }

    /// Exact matches score 1.0.
    pub fn is_exact_match(&self) -> bool {
        self.score >= 1.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VectorStoreError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Vector store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid vector store request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exact_match_requires_full_score() {
        let point = ScoredPoint {
            id: "1".into(),
            score: 1.0,
            payload: json!({"content": "cached"}),
        };
        assert!(point.is_exact_match());
        assert_eq!(point.content(), Some("cached"));

        let fuzzy = ScoredPoint { score: 0.93, ..point };
        assert!(!fuzzy.is_exact_match());
    }
}
