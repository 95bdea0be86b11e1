//! Stored action configuration.
//!
//! An [`ActionRecord`] is the bot scoped row the router looks up by name. Its
//! `type` tag selects one [`ActionConfig`] variant, so dispatch is a single
//! exhaustive match instead of a registry of handler classes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::ValidationError;
use crate::domain::prompt::{validate_fragments, PromptFragment, PromptSettings};
use crate::domain::response::ResponseSpec;
use crate::domain::slots::{SetSlotDirective, SetSlotFromResponse};
use crate::ports::{HttpMethod, LlmHyperparameters};

/// Failure message used when an action does not configure one.
pub const DEFAULT_FAILURE_MESSAGE: &str = "I have failed to process your request.";

const DEFAULT_PROMPT_FAILURE_MESSAGE: &str = "I'm sorry, I didn't quite understand that. Could you rephrase?";
const DEFAULT_FALLBACK_MESSAGE: &str =
    "I could not understand you! Did you mean any of the suggestions below? Or else please rephrase your question.";

/// A stored action of one bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub name: String,

    /// Inactive actions are treated as unknown.
    #[serde(default = "default_true")]
    pub status: bool,

    #[serde(flatten)]
    pub config: ActionConfig,
}

impl ActionRecord {
    pub fn new(name: impl Into<String>, config: ActionConfig) -> Self {
        Self {
            name: name.into().to_lowercase(),
            status: true,
            config,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.status = false;
        self
    }
}

/// Type specific configuration, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionConfig {
    HttpAction(HttpActionConfig),
    VectorEmbeddingsDbAction(VectorActionConfig),
    SlotSetAction(SlotSetActionConfig),
    FormValidationAction(FormValidationConfig),
    EmailAction(EmailActionConfig),
    GoogleSearchAction(GoogleSearchConfig),
    JiraAction(JiraActionConfig),
    ZendeskAction(ZendeskActionConfig),
    PipedriveLeadsAction(PipedriveLeadsConfig),
    RazorpayAction(RazorpayActionConfig),
    HubspotFormsAction(HubspotFormsConfig),
    TwoStageFallback(TwoStageFallbackConfig),
    KaironBotResponse(BotResponseConfig),
    PromptAction(PromptActionConfig),
}

impl ActionConfig {
    /// The stored `type` tag.
    pub fn action_type(&self) -> &'static str {
        match self {
            ActionConfig::HttpAction(_) => "http_action",
            ActionConfig::VectorEmbeddingsDbAction(_) => "vector_embeddings_db_action",
            ActionConfig::SlotSetAction(_) => "slot_set_action",
            ActionConfig::FormValidationAction(_) => "form_validation_action",
            ActionConfig::EmailAction(_) => "email_action",
            ActionConfig::GoogleSearchAction(_) => "google_search_action",
            ActionConfig::JiraAction(_) => "jira_action",
            ActionConfig::ZendeskAction(_) => "zendesk_action",
            ActionConfig::PipedriveLeadsAction(_) => "pipedrive_leads_action",
            ActionConfig::RazorpayAction(_) => "razorpay_action",
            ActionConfig::HubspotFormsAction(_) => "hubspot_forms_action",
            ActionConfig::TwoStageFallback(_) => "two_stage_fallback",
            ActionConfig::KaironBotResponse(_) => "kairon_bot_response",
            ActionConfig::PromptAction(_) => "prompt_action",
        }
    }

    /// Configured failure message, if the action type carries one.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            ActionConfig::VectorEmbeddingsDbAction(config) => config.failure_response.as_deref(),
            ActionConfig::GoogleSearchAction(config) => Some(config.failure_response.as_str()),
            ActionConfig::PromptAction(config) => Some(config.failure_message.as_str()),
            _ => None,
        }
        .filter(|message| !message.is_empty())
    }

    /// Whether the action fills `kairon_action_response` with its final answer.
    pub fn emits_action_response(&self) -> bool {
        !matches!(
            self,
            ActionConfig::SlotSetAction(_)
                | ActionConfig::FormValidationAction(_)
                | ActionConfig::TwoStageFallback(_)
                | ActionConfig::KaironBotResponse(_)
        )
    }

    /// Whether the action's answer is uttered to the user.
    pub fn dispatches_response(&self) -> bool {
        match self {
            ActionConfig::HttpAction(config) => config.response.dispatch,
            ActionConfig::VectorEmbeddingsDbAction(config) => config.response.dispatch,
            ActionConfig::GoogleSearchAction(config) => config.dispatch_response,
            ActionConfig::PromptAction(config) => config.dispatch_response,
            ActionConfig::SlotSetAction(_) => false,
            _ => true,
        }
    }

    /// Whether handlers need the bot's key vault in the context.
    pub fn needs_key_vault(&self) -> bool {
        !matches!(
            self,
            ActionConfig::SlotSetAction(_) | ActionConfig::TwoStageFallback(_) | ActionConfig::KaironBotResponse(_)
        )
    }

    /// Configuration snapshot with secrets masked, for audit records.
    pub fn redacted(&self) -> Value {
        match serde_json::to_value(self) {
            Ok(value) => super::redact::redact_config(value),
            Err(err) => {
                tracing::warn!(action_type = self.action_type(), error = %err, "Failed to snapshot action config");
                Value::Null
            }
        }
    }
}

/// How a [`CustomParameter`] obtains its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    #[default]
    Value,
    Slot,
    SenderId,
    UserMessage,
    Intent,
    ChatLog,
    KeyVault,
}

/// A request parameter or credential resolved against the context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomParameter {
    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub value: String,

    #[serde(default)]
    pub parameter_type: ParameterType,

    #[serde(default)]
    pub encrypt: bool,
}

impl CustomParameter {
    pub fn value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            parameter_type: ParameterType::Value,
            encrypt: false,
        }
    }

    pub fn of_type(key: impl Into<String>, parameter_type: ParameterType, value: impl Into<String>) -> Self {
        Self {
            parameter_type,
            ..Self::value(key, value)
        }
    }

    /// Whether the resolved value must not appear in audit records.
    pub fn is_secret(&self) -> bool {
        self.encrypt || self.parameter_type == ParameterType::KeyVault
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Json,
    Data,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpActionConfig {
    pub http_url: String,

    #[serde(default)]
    pub request_method: HttpMethod,

    #[serde(default)]
    pub content_type: ContentType,

    #[serde(default)]
    pub params_list: Vec<CustomParameter>,

    #[serde(default)]
    pub headers: Vec<CustomParameter>,

    /// Script whose result replaces `params_list`.
    #[serde(default)]
    pub dynamic_params: Option<String>,

    #[serde(default)]
    pub response: ResponseSpec,

    #[serde(default)]
    pub set_slots: Vec<SetSlotFromResponse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorOperationKind {
    EmbeddingSearch,
    PayloadSearch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorOperation {
    #[serde(rename = "type", default = "default_from_value")]
    pub source: String,
    pub value: VectorOperationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadSource {
    FromValue,
    FromSlot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorPayload {
    #[serde(rename = "type")]
    pub source: PayloadSource,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorActionConfig {
    /// Defaults to the bot's FAQ collection.
    #[serde(default)]
    pub collection: Option<String>,

    #[serde(default = "default_db_type")]
    pub db_type: String,

    pub operation: VectorOperation,

    pub payload: VectorPayload,

    #[serde(default)]
    pub response: ResponseSpec,

    #[serde(default)]
    pub set_slots: Vec<SetSlotFromResponse>,

    #[serde(default)]
    pub failure_response: Option<String>,
}

fn default_db_type() -> String {
    "qdrant".to_string()
}

fn default_from_value() -> String {
    "from_value".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSetActionConfig {
    pub set_slots: Vec<SetSlotDirective>,
}

/// How a validated form slot is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormSlotSetKind {
    /// Keep the value the user gave.
    #[default]
    Current,
    /// Fixed value from the configuration.
    Custom,
    /// Value of another slot.
    Slot,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormSlotSet {
    #[serde(rename = "type", default)]
    pub kind: FormSlotSetKind,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotValidation {
    pub slot: String,

    #[serde(default = "default_true")]
    pub is_required: bool,

    /// Script evaluated against `{"slot": value}`; a falsy result rejects the value.
    #[serde(default)]
    pub validation_semantic: Option<String>,

    #[serde(default)]
    pub valid_response: Option<String>,

    #[serde(default)]
    pub invalid_response: Option<String>,

    #[serde(default)]
    pub slot_set: FormSlotSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValidationConfig {
    #[serde(default)]
    pub validations: Vec<SlotValidation>,
}

impl FormValidationConfig {
    pub fn validation_for(&self, slot: &str) -> Option<&SlotValidation> {
        self.validations.iter().find(|validation| validation.slot == slot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailActionConfig {
    pub smtp_url: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_userid: Option<CustomParameter>,

    pub smtp_password: CustomParameter,

    pub from_email: String,

    pub to_email: Vec<String>,

    pub subject: String,

    #[serde(default)]
    pub custom_text: Option<String>,

    pub response: String,

    #[serde(default)]
    pub tls: bool,
}

fn default_smtp_port() -> u16 {
    587
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleSearchConfig {
    pub api_key: CustomParameter,

    pub search_engine_id: String,

    #[serde(default = "default_failure_message")]
    pub failure_response: String,

    #[serde(default = "default_num_results")]
    pub num_results: u32,

    #[serde(default = "default_true")]
    pub dispatch_response: bool,

    #[serde(default)]
    pub set_slot: Option<String>,
}

fn default_num_results() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraActionConfig {
    pub url: String,
    pub user_name: String,
    pub api_token: CustomParameter,
    pub project_key: String,
    pub issue_type: String,
    #[serde(default)]
    pub parent_key: Option<String>,
    pub summary: String,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZendeskActionConfig {
    pub subdomain: String,
    pub user_name: String,
    pub api_token: CustomParameter,
    pub subject: String,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipedriveLeadsConfig {
    pub domain: String,
    pub api_token: CustomParameter,
    pub title: String,
    /// Person field name to the slot holding its value.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubspotFormsConfig {
    pub portal_id: String,
    pub form_guid: String,
    #[serde(default)]
    pub fields: Vec<CustomParameter>,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RazorpayActionConfig {
    pub api_key: CustomParameter,
    pub api_secret: CustomParameter,
    pub amount: CustomParameter,
    pub currency: CustomParameter,
    #[serde(default)]
    pub username: Option<CustomParameter>,
    #[serde(default)]
    pub email: Option<CustomParameter>,
    #[serde(default)]
    pub contact: Option<CustomParameter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextRecommendations {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub use_intent_ranking: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRule {
    pub text: String,
    pub payload: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub is_dynamic_msg: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoStageFallbackConfig {
    #[serde(default)]
    pub text_recommendations: Option<TextRecommendations>,

    #[serde(default)]
    pub trigger_rules: Vec<TriggerRule>,

    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
}

fn default_fallback_message() -> String {
    DEFAULT_FALLBACK_MESSAGE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotResponseConfig {
    /// Name of the domain response template.
    pub response: String,

    #[serde(default)]
    pub rephrase: bool,

    #[serde(default)]
    pub hyperparameters: Option<LlmHyperparameters>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptActionConfig {
    #[serde(default = "default_num_bot_responses")]
    pub num_bot_responses: usize,

    #[serde(default = "default_top_results")]
    pub top_results: usize,

    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    #[serde(default)]
    pub enable_response_cache: bool,

    #[serde(default = "default_prompt_failure_message")]
    pub failure_message: String,

    #[serde(default)]
    pub hyperparameters: LlmHyperparameters,

    pub llm_prompts: Vec<PromptFragment>,

    #[serde(default)]
    pub set_slots: Vec<SetSlotFromResponse>,

    #[serde(default = "default_true")]
    pub dispatch_response: bool,
}

fn default_num_bot_responses() -> usize {
    5
}

fn default_top_results() -> usize {
    10
}

fn default_similarity_threshold() -> f64 {
    0.70
}

fn default_prompt_failure_message() -> String {
    DEFAULT_PROMPT_FAILURE_MESSAGE.to_string()
}

impl PromptActionConfig {
    pub fn settings(&self) -> PromptSettings {
        PromptSettings {
            num_bot_responses: self.num_bot_responses,
            top_results: self.top_results,
            similarity_threshold: self.similarity_threshold,
            enable_response_cache: self.enable_response_cache,
        }
    }

    /// Checks retrieval bounds and the fragment list.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.num_bot_responses > 5 {
            return Err(ValidationError::out_of_range(
                "num_bot_responses",
                0.0,
                5.0,
                self.num_bot_responses as f64,
            ));
        }
        if self.top_results > 30 {
            return Err(ValidationError::out_of_range("top_results", 0.0, 30.0, self.top_results as f64));
        }
        if !(0.3..=1.0).contains(&self.similarity_threshold) {
            return Err(ValidationError::out_of_range(
                "similarity_threshold",
                0.3,
                1.0,
                self.similarity_threshold,
            ));
        }
        validate_fragments(&self.llm_prompts)
    }
}

fn default_true() -> bool {
    true
}

fn default_failure_message() -> String {
    DEFAULT_FAILURE_MESSAGE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn http_record() -> ActionRecord {
        serde_json::from_value(json!({
            "name": "fetch_order",
            "type": "http_action",
            "http_url": "https://shop.example/orders/${slot.order_id}",
            "request_method": "POST",
            "params_list": [
                {"key": "sender", "parameter_type": "sender_id"},
                {"key": "token", "value": "SHOP_TOKEN", "parameter_type": "key_vault"}
            ],
            "response": {"value": "Your order is ${data.status}"},
            "set_slots": [{"name": "order_status", "value": "${data.status}"}]
        }))
        .unwrap()
    }

    #[test]
    fn record_deserializes_tagged_config() {
        let record = http_record();
        assert!(record.status);
        assert_eq!(record.config.action_type(), "http_action");
        match &record.config {
            ActionConfig::HttpAction(config) => {
                assert_eq!(config.request_method, HttpMethod::Post);
                assert_eq!(config.content_type, ContentType::Json);
                assert_eq!(config.params_list[1].parameter_type, ParameterType::KeyVault);
                assert!(config.response.dispatch);
            }
            other => panic!("expected http action, got {:?}", other),
        }
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = http_record();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "http_action");
        let back: ActionRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn action_response_emitters() {
        let slot_set = ActionConfig::SlotSetAction(SlotSetActionConfig { set_slots: vec![] });
        assert!(!slot_set.emits_action_response());
        assert!(!slot_set.dispatches_response());
        assert!(http_record().config.emits_action_response());
    }

    #[test]
    fn failure_messages_fall_back_to_none() {
        assert_eq!(http_record().config.failure_message(), None);

        let prompt: ActionConfig = serde_json::from_value(json!({
            "type": "prompt_action",
            "llm_prompts": [{"name": "System Prompt", "data": "You are a bot", "type": "system"}]
        }))
        .unwrap();
        assert_eq!(prompt.failure_message(), Some(DEFAULT_PROMPT_FAILURE_MESSAGE));
    }

    #[test]
    fn search_failure_response_is_the_failure_message() {
        let mut search: ActionConfig = serde_json::from_value(json!({
            "type": "google_search_action",
            "api_key": {"key": "api_key", "value": "GOOGLE_KEY", "parameter_type": "key_vault"},
            "search_engine_id": "engine-1",
            "failure_response": "Nothing found."
        }))
        .unwrap();
        assert_eq!(search.failure_message(), Some("Nothing found."));

        if let ActionConfig::GoogleSearchAction(config) = &mut search {
            config.failure_response.clear();
        }
        assert_eq!(search.failure_message(), None);
    }

    #[test]
    fn prompt_action_bounds_are_validated() {
        let mut config: PromptActionConfig = serde_json::from_value(json!({
            "llm_prompts": [{"name": "System Prompt", "data": "You are a bot", "type": "system"}]
        }))
        .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.settings(), PromptSettings::default());

        config.similarity_threshold = 0.2;
        assert!(config.validate().is_err());

        config.similarity_threshold = 0.7;
        config.top_results = 31;
        assert!(config.validate().is_err());
    }

    #[test]
    fn names_are_lowercased() {
        let record = ActionRecord::new(
            "Reset_Slots",
            ActionConfig::SlotSetAction(SlotSetActionConfig { set_slots: vec![] }),
        );
        assert_eq!(record.name, "reset_slots");
    }
}
