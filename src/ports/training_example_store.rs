//! Training Example Store Port - example utterances used for fallback suggestions.

use async_trait::async_trait;
use thiserror::Error;

#[async_trait]
pub trait TrainingExampleStore: Send + Sync {
    /// One representative example per intent, in the order of `intents`.
    /// Intents without examples are omitted.
    async fn examples_for_intents(
        &self,
        bot: &str,
        intents: &[String],
    ) -> Result<Vec<(String, String)>, TrainingExampleError>;

    /// Examples most similar to `text`, best first.
    async fn similar_examples(
        &self,
        bot: &str,
        text: &str,
        limit: usize,
    ) -> Result<Vec<String>, TrainingExampleError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrainingExampleError {
    #[error("Training example store unavailable: {0}")]
    Unavailable(String),
}
