//! Prompt assembler - renders prompt fragments into a completion request.

use std::sync::Arc;

use thiserror::Error;

use super::cache::ResponseCache;
use super::fragment::{PromptFragment, PromptSettings, PromptSource, PromptType};
use crate::domain::expression::{display_value, get_path, TraceLog};
use crate::domain::tracker::{ActionContext, ChatTurn};
use crate::ports::{
    question_suffixed, ChatMessage, CompletionClient, CompletionError, CompletionRequest,
    LlmHyperparameters, NestedActionError, NestedActionInvoker, RequestShape, VectorStore,
    VectorStoreError,
};

const FAQ_COLLECTION_SUFFIX: &str = "_faq_embd";
const DEFAULT_COLLECTION: &str = "default";

/// Collaborator failure while assembling a prompt.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Query rephrasing failed: {0}")]
    Rephrase(#[source] CompletionError),

    #[error("Similarity search failed: {0}")]
    VectorStore(#[from] VectorStoreError),

    #[error("Nested action failed: {0}")]
    NestedAction(#[from] NestedActionError),
}

/// Outcome of assembly: a prompt to complete, or a cached answer that
/// replaces the whole completion step.
#[derive(Debug, Clone, PartialEq)]
pub enum Assembly {
    Prompt(AssembledPrompt),
    Cached { answer: String },
}

/// A user-side block in configuration order.
#[derive(Debug, Clone, PartialEq)]
enum PromptBlock {
    Text(String),
    History { name: String, turns: Vec<ChatTurn> },
}

/// Rendered prompt, convertible to either completion call shape.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPrompt {
    pub system_prompt: String,
    pub question: String,
    pub rephrased_query: Option<String>,
    blocks: Vec<PromptBlock>,
}

impl AssembledPrompt {
    /// Concatenated user blocks; history is rendered inline when `inline_history` is set.
    fn context(&self, inline_history: bool) -> String {
        self.blocks
            .iter()
            .map(|block| match block {
                PromptBlock::Text(text) => text.clone(),
                PromptBlock::History { name, turns } if inline_history => {
                    let lines: Vec<String> = turns
                        .iter()
                        .map(|turn| match turn {
                            ChatTurn::User(text) => format!("user: {}", text),
                            ChatTurn::Bot(text) => format!("bot: {}", text),
                        })
                        .collect();
                    format!("\n{}:\n{}\n", name, lines.join("\n"))
                }
                PromptBlock::History { .. } => String::new(),
            })
            .collect()
    }

    /// Final user-turn content of a chat-shaped request.
    pub fn user_prompt(&self) -> String {
        question_suffixed(&self.context(false), &self.question)
    }

    /// Flat user context of a legacy request, history included.
    pub fn legacy_context(&self) -> String {
        self.context(true)
    }

    /// Conversation history turns sent as chat messages.
    pub fn history(&self) -> Vec<ChatTurn> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                PromptBlock::History { turns, .. } => Some(turns.clone()),
                PromptBlock::Text(_) => None,
            })
            .flatten()
            .collect()
    }

    /// Builds the completion request in the shape the client expects.
    pub fn to_request(&self, shape: RequestShape, hyperparameters: &LlmHyperparameters) -> CompletionRequest {
        let request = match shape {
            RequestShape::Chat => {
                let mut messages = vec![ChatMessage::system(self.system_prompt.clone())];
                messages.extend(self.history().into_iter().map(|turn| match turn {
                    ChatTurn::User(text) => ChatMessage::user(text),
                    ChatTurn::Bot(text) => ChatMessage::assistant(text),
                }));
                messages.push(ChatMessage::user(self.user_prompt()));
                CompletionRequest::chat(messages)
            }
            RequestShape::Legacy => CompletionRequest::legacy(
                self.question.clone(),
                self.system_prompt.clone(),
                self.legacy_context(),
            ),
        };
        request.with_hyperparameters(hyperparameters.clone())
    }
}

/// Orders and renders prompt fragments.
#[derive(Clone)]
pub struct PromptAssembler {
    completion: Arc<dyn CompletionClient>,
    vector_store: Arc<dyn VectorStore>,
    cache: ResponseCache,
}

impl PromptAssembler {
    pub fn new(completion: Arc<dyn CompletionClient>, vector_store: Arc<dyn VectorStore>) -> Self {
        let cache = ResponseCache::new(vector_store.clone());
        Self {
            completion,
            vector_store,
            cache,
        }
    }

    /// Renders `fragments` in configuration order.
    ///
    /// Disabled fragments are skipped entirely. When a similarity fragment is
    /// enabled, an exact cache hit ends assembly before any user fragment runs.
    pub async fn assemble(
        &self,
        fragments: &[PromptFragment],
        context: &ActionContext,
        settings: &PromptSettings,
        hyperparameters: &LlmHyperparameters,
        nested: &dyn NestedActionInvoker,
        trace: &mut TraceLog,
    ) -> Result<Assembly, PromptError> {
        let enabled: Vec<&PromptFragment> = fragments.iter().filter(|f| f.is_enabled).collect();
        let bot = context.bot().unwrap_or_default().to_string();

        let mut system_prompt = String::new();
        for fragment in enabled.iter().filter(|f| f.prompt_type == PromptType::System) {
            if let Some(text) = fragment.data.as_deref() {
                system_prompt.push_str(text);
                system_prompt.push('\n');
            }
        }

        let query_prompts: Vec<&str> = enabled
            .iter()
            .filter(|f| f.prompt_type == PromptType::Query)
            .filter_map(|f| f.data_text())
            .collect();
        let raw_question = context.question().to_string();
        let rephrased_query = if query_prompts.is_empty() {
            trace.push("No enabled query prompt, using user message as question.");
            None
        } else {
            trace.push(format!("Rephrasing user query using {} query prompt(s).", query_prompts.len()));
            let rephrased = self
                .rephrase(&query_prompts.join("\n"), &raw_question, hyperparameters)
                .await?;
            trace.push(format!("Rephrased query: {}", rephrased));
            Some(rephrased)
        };
        let question = rephrased_query
            .clone()
            .filter(|rephrased| !rephrased.is_empty())
            .unwrap_or(raw_question);

        let has_similarity = enabled
            .iter()
            .any(|f| f.prompt_type == PromptType::User && f.source == PromptSource::BotContent);
        if !has_similarity {
            trace.push("Skipping cache lookup as no similarity prompt is enabled.");
        } else if let Some(answer) = self.lookup_exact(&bot, &question, settings, trace).await {
            return Ok(Assembly::Cached { answer });
        }

        let mut blocks = Vec::new();
        for fragment in enabled.iter().filter(|f| f.prompt_type == PromptType::User) {
            match fragment.source {
                PromptSource::Static => {
                    let text = fragment.data.as_deref().unwrap_or_default();
                    blocks.push(PromptBlock::Text(frame(fragment, text)));
                }
                PromptSource::History => {
                    let turns = recent_history(&context.chat_log, settings.num_bot_responses);
                    trace.push(format!("Using {} history turn(s) for '{}'.", turns.len(), fragment.name));
                    blocks.push(PromptBlock::History {
                        name: fragment.name.clone(),
                        turns,
                    });
                }
                PromptSource::BotContent => {
                    let collection = content_collection(&bot, fragment.data_text());
                    trace.push(format!(
                        "Searching similar content in '{}' (top_results: {}, similarity_threshold: {}).",
                        collection, settings.top_results, settings.similarity_threshold
                    ));
                    let hits = self
                        .vector_store
                        .search(&bot, &collection, &question, settings.top_results, settings.similarity_threshold)
                        .await?;
                    if hits.is_empty() {
                        trace.push(format!("No similar content found for '{}'.", fragment.name));
                        continue;
                    }
                    let passages: Vec<String> = hits
                        .iter()
                        .map(|hit| hit.content().map(str::to_string).unwrap_or_else(|| display_value(&hit.payload)))
                        .collect();
                    blocks.push(PromptBlock::Text(frame(fragment, &passages.join("\n\n"))));
                }
                PromptSource::Slot => {
                    let slot = fragment.data.as_deref().unwrap_or_default();
                    let tree = context.to_value();
                    let value = get_path(&tree, &["slot", slot])
                        .map(display_value)
                        .unwrap_or_else(|_| display_value(&serde_json::Value::Null));
                    blocks.push(PromptBlock::Text(frame(fragment, &value)));
                }
                PromptSource::Action => {
                    let action = fragment.data.as_deref().unwrap_or_default();
                    trace.push(format!("Invoking action '{}' for '{}'.", action, fragment.name));
                    let value = nested.invoke(action).await?;
                    blocks.push(PromptBlock::Text(frame(fragment, &display_value(&value))));
                }
            }
        }

        Ok(Assembly::Prompt(AssembledPrompt {
            system_prompt,
            question,
            rephrased_query,
            blocks,
        }))
    }

    async fn rephrase(
        &self,
        query_prompt: &str,
        question: &str,
        hyperparameters: &LlmHyperparameters,
    ) -> Result<String, PromptError> {
        let request = CompletionRequest::chat(vec![
            ChatMessage::system(query_prompt.to_string()),
            ChatMessage::user(question.to_string()),
        ])
        .with_hyperparameters(hyperparameters.clone());

        let response = self.completion.complete(request).await.map_err(PromptError::Rephrase)?;
        Ok(response.content.trim().to_string())
    }

    async fn lookup_exact(
        &self,
        bot: &str,
        question: &str,
        settings: &PromptSettings,
        trace: &mut TraceLog,
    ) -> Option<String> {
        if !settings.enable_response_cache {
            trace.push("Skipping cache lookup as `enable_response_cache` is disabled.");
            return None;
        }

        trace.push("Searching exact match in cache as `enable_response_cache` is enabled.");
        match self.cache.exact_match(bot, question).await {
            Ok(Some(answer)) => {
                trace.push("Found exact query match in cache.");
                Some(answer)
            }
            Ok(None) => {
                trace.push("Exact match not found in cache.");
                None
            }
            Err(err) => {
                tracing::warn!(bot = %bot, error = %err, "Cache lookup failed");
                trace.push(format!("Cache lookup failed: {}", err));
                None
            }
        }
    }
}

/// Frames one user block: a leading blank line, the name, the content, and
/// the optional instructions line.
fn frame(fragment: &PromptFragment, content: &str) -> String {
    let mut block = format!("\n{}:\n{}\n", fragment.name, content);
    if let Some(instructions) = fragment.instructions.as_deref().filter(|i| !i.is_empty()) {
        block.push_str(&format!("Instructions on how to use {}:\n{}\n", fragment.name, instructions));
    }
    block
}

/// Similarity collection named by a fragment's data, scoped to the bot.
fn content_collection(bot: &str, data: Option<&str>) -> String {
    match data {
        None | Some(DEFAULT_COLLECTION) => format!("{}{}", bot, FAQ_COLLECTION_SUFFIX),
        Some(collection) => format!("{}_{}{}", bot, collection, FAQ_COLLECTION_SUFFIX),
    }
}

/// Trailing turns covering at most `bot_responses` bot turns, without the
/// current user message.
fn recent_history(chat_log: &[ChatTurn], bot_responses: usize) -> Vec<ChatTurn> {
    let mut turns = chat_log;
    if let Some((ChatTurn::User(_), earlier)) = turns.split_last() {
        turns = earlier;
    }

    let mut start = turns.len();
    let mut bots = 0;
    for (index, turn) in turns.iter().enumerate().rev() {
        if turn.is_bot() {
            if bots == bot_responses {
                break;
            }
            bots += 1;
        }
        start = index;
    }
    turns[start..].to_vec()
}
