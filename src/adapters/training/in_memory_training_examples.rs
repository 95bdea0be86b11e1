//! In-Memory Training Examples
//!
//! Example utterances per intent, searched by token overlap.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{TrainingExampleError, TrainingExampleStore};

#[derive(Debug, Clone, Default)]
pub struct InMemoryTrainingExamples {
    examples: Arc<RwLock<HashMap<String, Vec<(String, String)>>>>,
}

impl InMemoryTrainingExamples {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an `(intent, example)` pair while building the store.
    pub fn with_example(self, bot: impl Into<String>, intent: impl Into<String>, example: impl Into<String>) -> Self {
        if let Ok(mut examples) = self.examples.try_write() {
            examples.entry(bot.into()).or_default().push((intent.into(), example.into()));
        }
        self
    }
}

fn tokens(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl TrainingExampleStore for InMemoryTrainingExamples {
    async fn examples_for_intents(
        &self,
        bot: &str,
        intents: &[String],
    ) -> Result<Vec<(String, String)>, TrainingExampleError> {
        let examples = self.examples.read().await;
        let Some(examples) = examples.get(bot) else {
            return Ok(Vec::new());
        };
        Ok(intents
            .iter()
            .filter_map(|intent| examples.iter().find(|(name, _)| name == intent).cloned())
            .collect())
    }

    async fn similar_examples(&self, bot: &str, text: &str, limit: usize) -> Result<Vec<String>, TrainingExampleError> {
        let query = tokens(text);
        let examples = self.examples.read().await;
        let Some(examples) = examples.get(bot) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(usize, &String)> = examples
            .iter()
            .map(|(_, example)| (tokens(example).intersection(&query).count(), example))
            .filter(|(overlap, _)| *overlap > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored.into_iter().take(limit).map(|(_, example)| example.clone()).collect())
    }
}
