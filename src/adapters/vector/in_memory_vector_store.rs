//! In-Memory Vector Store
//!
//! Stands in for the vector database. Texts are compared by token overlap
//! (Jaccard similarity of lowercase alphanumeric tokens), so identical
//! questions score exactly 1.0. Upserts replace a point only when the token
//! sequence matches, word order included.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::ports::{ScoredPoint, VectorStore, VectorStoreError};

#[derive(Debug, Clone)]
struct StoredPoint {
    id: String,
    sequence: Vec<String>,
    tokens: BTreeSet<String>,
    payload: Value,
}

/// Collections keyed by `(bot, collection)`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVectorStore {
    collections: Arc<RwLock<HashMap<(String, String), Vec<StoredPoint>>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn point_count(&self, bot: &str, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(&(bot.to_string(), collection.to_string()))
            .map(Vec::len)
            .unwrap_or(0)
    }
}

fn token_sequence(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn tokens(text: &str) -> BTreeSet<String> {
    token_sequence(text).into_iter().collect()
}

fn similarity(left: &BTreeSet<String>, right: &BTreeSet<String>) -> f64 {
    let union = left.union(right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(right).count() as f64 / union as f64
}

fn payload_matches(payload: &Value, filter: &Value) -> bool {
    match filter.as_object() {
        Some(conditions) => conditions
            .iter()
            .all(|(key, expected)| payload.get(key) == Some(expected)),
        None => false,
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn search(
        &self,
        bot: &str,
        collection: &str,
        query_text: &str,
        top_k: usize,
        threshold: f64,
    ) -> Result<Vec<ScoredPoint>, VectorStoreError> {
        let query = tokens(query_text);
        let collections = self.collections.read().await;
        let Some(points) = collections.get(&(bot.to_string(), collection.to_string())) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<ScoredPoint> = points
            .iter()
            .map(|point| ScoredPoint {
                id: point.id.clone(),
                score: similarity(&query, &point.tokens),
                payload: point.payload.clone(),
            })
            .filter(|hit| hit.score >= threshold && hit.score > 0.0)
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn payload_search(
        &self,
        bot: &str,
        collection: &str,
        filter: &Value,
    ) -> Result<Vec<ScoredPoint>, VectorStoreError> {
        if !filter.is_object() {
            return Err(VectorStoreError::InvalidRequest("payload filter must be an object".into()));
        }
        let collections = self.collections.read().await;
        Ok(collections
            .get(&(bot.to_string(), collection.to_string()))
            .map(|points| {
                points
                    .iter()
                    .filter(|point| payload_matches(&point.payload, filter))
                    .map(|point| ScoredPoint {
                        id: point.id.clone(),
                        score: 1.0,
                        payload: point.payload.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn upsert(&self, bot: &str, collection: &str, text: &str, payload: Value) -> Result<(), VectorStoreError> {
        let sequence = token_sequence(text);
        let mut collections = self.collections.write().await;
        let points = collections
            .entry((bot.to_string(), collection.to_string()))
            .or_default();

        match points.iter_mut().find(|point| point.sequence == sequence) {
            Some(existing) => existing.payload = payload,
            None => points.push(StoredPoint {
                id: Uuid::new_v4().to_string(),
                tokens: sequence.iter().cloned().collect(),
                sequence,
                payload,
            }),
        }
        Ok(())
    }
}
