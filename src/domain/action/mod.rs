//! Action - stored configuration, invocation results, and audit records.

mod config;
mod log;
mod redact;
mod result;

pub use config::{
    ActionConfig, ActionRecord, BotResponseConfig, ContentType, CustomParameter, EmailActionConfig,
    FormSlotSet, FormSlotSetKind, FormValidationConfig, GoogleSearchConfig, HttpActionConfig,
    HubspotFormsConfig, JiraActionConfig, ParameterType, PayloadSource, PipedriveLeadsConfig,
    PromptActionConfig, RazorpayActionConfig, SlotSetActionConfig, SlotValidation,
    TextRecommendations, TriggerRule, TwoStageFallbackConfig, VectorActionConfig, VectorOperation,
    VectorOperationKind, VectorPayload, ZendeskActionConfig, DEFAULT_FAILURE_MESSAGE,
};
pub use log::ExecutionLogRecord;
pub use result::{ActionResult, ActionStatus, BotUtterance, Button, ACTION_RESPONSE_SLOT};
