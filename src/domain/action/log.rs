//! Execution log record written once per executed action.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::result::ActionStatus;
use crate::domain::foundation::Timestamp;

/// Append-only audit entry of one action execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLogRecord {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub action_type: String,
    pub intent: Option<String>,
    pub action: String,
    pub sender: String,
    pub bot: String,
    /// Configuration snapshot with secrets masked.
    pub config: Value,
    pub request: Option<Value>,
    pub api_response: Option<Value>,
    pub bot_response: Option<Value>,
    /// Evaluation trace in call order.
    pub messages: Vec<String>,
    pub exception: Option<String>,
    pub status: ActionStatus,
    pub timestamp: Timestamp,
    pub user_msg: Option<String>,
}

impl ExecutionLogRecord {
    pub fn new(action_type: impl Into<String>, action: impl Into<String>, sender: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            action_type: action_type.into(),
            intent: None,
            action: action.into(),
            sender: sender.into(),
            bot: bot.into(),
            config: Value::Null,
            request: None,
            api_response: None,
            bot_response: None,
            messages: Vec::new(),
            exception: None,
            status: ActionStatus::Success,
            timestamp: Timestamp::now(),
            user_msg: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == ActionStatus::Failure
    }
}
