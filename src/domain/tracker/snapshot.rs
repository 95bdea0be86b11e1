//! Dialogue snapshot - the read-only view of conversation state per invocation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Slot carrying the bot identifier every action is scoped to.
pub const BOT_SLOT: &str = "bot";

/// Entity carrying an override user message attached to a structured command.
pub const USER_MESSAGE_OVERRIDE_ENTITY: &str = "kairon_user_msg";

/// Serialized tracker state handed over by the dialogue manager.
///
/// Never mutated by actions; every handler reads from the same snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueSnapshot {
    #[serde(default)]
    pub sender_id: String,

    #[serde(default)]
    pub conversation_id: Option<String>,

    /// Current slot values, in the order the dialogue manager sent them.
    #[serde(default)]
    pub slots: Map<String, Value>,

    #[serde(default)]
    pub latest_message: LatestMessage,

    #[serde(default)]
    pub events: Vec<TrackerEvent>,

    #[serde(default)]
    pub active_loop: Option<ActiveLoop>,

    #[serde(default)]
    pub latest_action_name: Option<String>,
}

/// The most recent user message as parsed by NLU.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestMessage {
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub intent: Option<IntentPrediction>,

    #[serde(default)]
    pub intent_ranking: Vec<IntentPrediction>,

    #[serde(default)]
    pub entities: Vec<Entity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentPrediction {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity: String,

    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveLoop {
    #[serde(default)]
    pub name: Option<String>,
}

/// Tracker events relevant to actions; other kinds are kept as `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackerEvent {
    User {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        parse_data: Option<Value>,
    },
    Bot {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        data: Option<Value>,
    },
    Slot {
        name: String,
        #[serde(default)]
        value: Value,
    },
    SessionStarted,
    Action {
        #[serde(default)]
        name: Option<String>,
    },
    #[serde(other)]
    Other,
}

/// One textual turn of the conversation, serialized as `{"user": ..}` or `{"bot": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatTurn {
    User(String),
    Bot(String),
}

impl ChatTurn {
    pub fn text(&self) -> &str {
        match self {
            ChatTurn::User(text) | ChatTurn::Bot(text) => text,
        }
    }

    pub fn is_bot(&self) -> bool {
        matches!(self, ChatTurn::Bot(_))
    }
}

impl DialogueSnapshot {
    /// Bot identifier taken from the `bot` slot.
    pub fn bot_id(&self) -> Option<&str> {
        self.slots
            .get(BOT_SLOT)
            .and_then(Value::as_str)
            .filter(|bot| !bot.is_empty())
    }

    /// Returns a slot value, treating explicit nulls as unset.
    pub fn slot(&self, name: &str) -> Option<&Value> {
        self.slots.get(name).filter(|value| !value.is_null())
    }

    /// Name of the top-ranked intent of the latest message.
    pub fn latest_intent(&self) -> Option<&str> {
        self.latest_message
            .intent
            .as_ref()
            .and_then(|intent| intent.name.as_deref())
    }

    /// Value of the first entity with the given name on the latest message.
    pub fn entity_value(&self, entity: &str) -> Option<&Value> {
        self.latest_message
            .entities
            .iter()
            .find(|candidate| candidate.entity == entity)
            .map(|candidate| &candidate.value)
    }

    /// Override text supplied by a structured command, if any.
    pub fn user_message_override(&self) -> Option<String> {
        match self.entity_value(USER_MESSAGE_OVERRIDE_ENTITY)? {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Chronological user and bot turns that carry text.
    pub fn chat_turns(&self) -> Vec<ChatTurn> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TrackerEvent::User {
                    text: Some(text), ..
                } if !text.is_empty() => Some(ChatTurn::User(text.clone())),
                TrackerEvent::Bot {
                    text: Some(text), ..
                } if !text.is_empty() => Some(ChatTurn::Bot(text.clone())),
                _ => None,
            })
            .collect()
    }

    /// Intent names from the ranking, best first.
    pub fn ranked_intents(&self) -> Vec<&str> {
        self.latest_message
            .intent_ranking
            .iter()
            .filter_map(|intent| intent.name.as_deref())
            .collect()
    }
}
