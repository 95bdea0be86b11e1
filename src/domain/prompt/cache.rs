//! Response cache kept as a vector store collection per bot.

use std::sync::Arc;

use serde_json::json;

use crate::ports::{VectorStore, VectorStoreError};

const CACHE_COLLECTION_SUFFIX: &str = "_cache_embd";

/// Cached answers to previously asked questions.
#[derive(Clone)]
pub struct ResponseCache {
    vector_store: Arc<dyn VectorStore>,
}

impl ResponseCache {
    pub fn new(vector_store: Arc<dyn VectorStore>) -> Self {
        Self { vector_store }
    }

    pub fn collection(bot: &str) -> String {
        format!("{}{}", bot, CACHE_COLLECTION_SUFFIX)
    }

    /// Cached answer stored under exactly this question.
    pub async fn exact_match(&self, bot: &str, question: &str) -> Result<Option<String>, VectorStoreError> {
        let hits = self
            .vector_store
            .payload_search(bot, &Self::collection(bot), &json!({ "query": question }))
            .await?;
        Ok(hits
            .into_iter()
            .find_map(|hit| hit.content().map(str::to_string)))
    }

    /// Closest cached answer scoring at least `threshold`.
    pub async fn closest_match(
        &self,
        bot: &str,
        question: &str,
        threshold: f64,
    ) -> Result<Option<String>, VectorStoreError> {
        let hits = self
            .vector_store
            .search(bot, &Self::collection(bot), question, 1, threshold)
            .await?;
        Ok(hits
            .into_iter()
            .next()
            .and_then(|hit| hit.content().map(str::to_string)))
    }

    /// Stores an answer for later lookups.
    pub async fn store(&self, bot: &str, question: &str, answer: &str) -> Result<(), VectorStoreError> {
        self.vector_store
            .upsert(
                bot,
                &Self::collection(bot),
                question,
                json!({"query": question, "content": answer}),
            )
            .await
    }
}
