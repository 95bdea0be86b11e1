//! Action context - the normalized view of a snapshot that templates resolve against.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use super::snapshot::{ChatTurn, DialogueSnapshot, BOT_SLOT};
use crate::ports::SecretVault;

/// Slot holding metadata of the session start, exposed as `session_started`.
pub const SESSION_STARTED_SLOT: &str = "session_started_metadata";

/// Context handed to templates, prompts, and scripts for one action execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionContext {
    pub sender_id: String,
    pub user_message: Option<String>,
    pub slot: Map<String, Value>,
    pub intent: Option<String>,
    pub chat_log: Vec<ChatTurn>,
    pub key_vault: BTreeMap<String, String>,
    pub kairon_user_msg: Option<String>,
    pub session_started: Value,
}

impl ActionContext {
    /// Builds the context from a snapshot with an already loaded key vault.
    pub fn from_snapshot(snapshot: &DialogueSnapshot, key_vault: BTreeMap<String, String>) -> Self {
        let mut slot = snapshot.slots.clone();
        if !slot.contains_key(BOT_SLOT) {
            slot.insert(BOT_SLOT.to_string(), Value::Null);
        }

        let kairon_user_msg = snapshot.user_message_override();
        let user_message = kairon_user_msg
            .clone()
            .or_else(|| snapshot.latest_message.text.clone());

        Self {
            sender_id: snapshot.sender_id.clone(),
            user_message,
            slot,
            intent: snapshot.latest_intent().map(str::to_string),
            chat_log: snapshot.chat_turns(),
            key_vault,
            kairon_user_msg,
            session_started: snapshot
                .slot(SESSION_STARTED_SLOT)
                .cloned()
                .unwrap_or(Value::Null),
        }
    }

    /// Bot identifier stored in the slot mapping.
    pub fn bot(&self) -> Option<&str> {
        self.slot.get(BOT_SLOT).and_then(Value::as_str)
    }

    /// Question to answer: the override text if present, else the user message.
    pub fn question(&self) -> &str {
        self.kairon_user_msg
            .as_deref()
            .or(self.user_message.as_deref())
            .unwrap_or_default()
    }

    /// JSON tree used as template and script input.
    pub fn to_value(&self) -> Value {
        let chat_log = self
            .chat_log
            .iter()
            .map(|turn| match turn {
                ChatTurn::User(text) => single_entry("user", text),
                ChatTurn::Bot(text) => single_entry("bot", text),
            })
            .collect();
        let key_vault = self
            .key_vault
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect();

        let mut tree = Map::new();
        tree.insert("sender_id".into(), Value::String(self.sender_id.clone()));
        tree.insert("user_message".into(), optional_string(&self.user_message));
        tree.insert("slot".into(), Value::Object(self.slot.clone()));
        tree.insert("intent".into(), optional_string(&self.intent));
        tree.insert("chat_log".into(), Value::Array(chat_log));
        tree.insert("key_vault".into(), Value::Object(key_vault));
        tree.insert("kairon_user_msg".into(), optional_string(&self.kairon_user_msg));
        tree.insert("session_started".into(), self.session_started.clone());
        Value::Object(tree)
    }

    /// Conversation rendered one turn per line, used as ticket and email bodies.
    pub fn transcript(&self) -> String {
        self.chat_log
            .iter()
            .map(|turn| match turn {
                ChatTurn::User(text) => format!("user: {}", text),
                ChatTurn::Bot(text) => format!("bot: {}", text),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn single_entry(key: &str, text: &str) -> Value {
    let mut entry = Map::new();
    entry.insert(key.to_string(), Value::String(text.to_string()));
    Value::Object(entry)
}

fn optional_string(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

/// Builds [`ActionContext`] values, loading bot secrets on request.
#[derive(Clone)]
pub struct ContextBuilder {
    secrets: Arc<dyn SecretVault>,
}

impl ContextBuilder {
    pub fn new(secrets: Arc<dyn SecretVault>) -> Self {
        Self { secrets }
    }

    /// Builds the context; vault failures degrade to an empty key vault.
    pub async fn build(&self, snapshot: &DialogueSnapshot, include_key_vault: bool) -> ActionContext {
        let key_vault = match (include_key_vault, snapshot.bot_id()) {
            (true, Some(bot)) => match self.secrets.get_secrets(bot).await {
                Ok(secrets) => secrets,
                Err(err) => {
                    tracing::warn!(bot = %bot, error = %err, "Failed to load key vault, continuing without secrets");
                    BTreeMap::new()
                }
            },
            _ => BTreeMap::new(),
        };

        ActionContext::from_snapshot(snapshot, key_vault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySecretVault;
    use crate::domain::tracker::TrackerEvent;
    use serde_json::json;

    fn snapshot() -> DialogueSnapshot {
        serde_json::from_value(json!({
            "sender_id": "default",
            "slots": {"bot": "bot_1", "name": "Udit"},
            "latest_message": {"text": "what is kairon?", "intent": {"name": "faq"}},
            "events": [
                {"event": "user", "text": "hello"},
                {"event": "bot", "text": "hi, how can I help?"},
                {"event": "user", "text": "what is kairon?"}
            ]
        }))
        .unwrap()
    }

    fn vault() -> Arc<InMemorySecretVault> {
        Arc::new(InMemorySecretVault::new().with_secret("bot_1", "API_KEY", "asdfghjkl"))
    }

    #[tokio::test]
    async fn builds_context_without_key_vault() {
        let builder = ContextBuilder::new(vault());
        let context = builder.build(&snapshot(), false).await;

        assert_eq!(context.sender_id, "default");
        assert_eq!(context.user_message.as_deref(), Some("what is kairon?"));
        assert_eq!(context.intent.as_deref(), Some("faq"));
        assert_eq!(context.chat_log.len(), 3);
        assert!(context.key_vault.is_empty());
        assert_eq!(context.bot(), Some("bot_1"));
    }

    #[tokio::test]
    async fn loads_key_vault_on_request() {
        let builder = ContextBuilder::new(vault());
        let context = builder.build(&snapshot(), true).await;

        assert_eq!(context.key_vault.get("API_KEY").map(String::as_str), Some("asdfghjkl"));
    }

    #[tokio::test]
    async fn vault_failure_degrades_to_empty_mapping() {
        let builder = ContextBuilder::new(Arc::new(InMemorySecretVault::new().failing()));
        let context = builder.build(&snapshot(), true).await;

        assert!(context.key_vault.is_empty());
    }

    #[test]
    fn bot_key_always_present() {
        let context = ActionContext::from_snapshot(&DialogueSnapshot::default(), BTreeMap::new());
        assert_eq!(context.slot.get("bot"), Some(&Value::Null));
        assert_eq!(context.question(), "");
        assert!(context.chat_log.is_empty());
    }

    #[test]
    fn override_message_takes_precedence() {
        let mut snapshot = snapshot();
        snapshot.latest_message.text = Some("/ask{\"kairon_user_msg\": \"price?\"}".into());
        snapshot.latest_message.entities = vec![crate::domain::tracker::Entity {
            entity: "kairon_user_msg".into(),
            value: json!("price?"),
        }];
        let context = ActionContext::from_snapshot(&snapshot, BTreeMap::new());

        assert_eq!(context.kairon_user_msg.as_deref(), Some("price?"));
        assert_eq!(context.question(), "price?");
    }

    #[test]
    fn context_tree_uses_documented_keys() {
        let mut snapshot = snapshot();
        snapshot.events.push(TrackerEvent::SessionStarted);
        let tree = ActionContext::from_snapshot(&snapshot, BTreeMap::new()).to_value();

        let keys: Vec<&str> = tree.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "sender_id",
                "user_message",
                "slot",
                "intent",
                "chat_log",
                "key_vault",
                "kairon_user_msg",
                "session_started"
            ]
        );
        assert_eq!(tree["chat_log"][1], json!({"bot": "hi, how can I help?"}));
        assert_eq!(tree["slot"]["name"], json!("Udit"));
    }

    #[test]
    fn transcript_renders_role_prefixed_lines() {
        let context = ActionContext::from_snapshot(&snapshot(), BTreeMap::new());
        assert_eq!(
            context.transcript(),
            "user: hello\nbot: hi, how can I help?\nuser: what is kairon?"
        );
    }
}
