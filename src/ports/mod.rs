//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the action pipeline and the outside world. Adapters implement these ports.
//!
//! ## Core Collaborators
//!
//! - `ActionConfigStore` - Stored action configuration per bot
//! - `SecretVault` - Bot scoped secrets for the key vault
//! - `ScriptEvaluator` - Remote `{script, data} -> {success, data}` evaluation
//! - `VectorStore` - Similarity search and response cache collections
//! - `CompletionClient` - LLM completion in chat or legacy call shape
//! - `AuditLogSink` - One execution record per invocation
//! - `NestedActionInvoker` - Re-entrant action calls from prompt fragments
//!
//! ## Action Side Effects
//!
//! - `HttpRequester` - Outbound HTTP for HTTP actions
//! - `EmailSender` - SMTP hand-off for email actions
//! - `IntegrationClient` - Google, Jira, Zendesk, Pipedrive, Hubspot, Razorpay
//! - `TrainingExampleStore` - Suggestions for two-stage fallback

mod action_config_store;
mod audit_log;
mod completion_client;
mod email_sender;
mod http_requester;
mod integration_client;
mod nested_action;
mod script_evaluator;
mod secret_vault;
mod training_example_store;
mod vector_store;

pub use action_config_store::{ActionConfigStore, ConfigStoreError};
pub use audit_log::{AuditLogError, AuditLogSink};
pub use completion_client::{
    question_suffixed, ChatMessage, CompletionClient, CompletionError, CompletionPrompt,
    CompletionRequest, CompletionResponse, LlmHyperparameters, MessageRole, ProviderInfo,
    RequestShape, TokenUsage,
};
pub use email_sender::{EmailError, EmailMessage, EmailSender};
pub use http_requester::{HttpBody, HttpMethod, HttpRequest, HttpRequestError, HttpRequester, HttpResponse};
pub use integration_client::{
    GoogleSearchRequest, HubspotFormRequest, IntegrationClient, IntegrationError, JiraIssueRequest,
    PaymentLink, PaymentLinkRequest, PipedriveLeadRequest, SearchResult, ZendeskTicketRequest,
};
pub use nested_action::{NestedActionError, NestedActionInvoker};
pub use script_evaluator::{ScriptEvaluator, ScriptEvaluatorError, ScriptResponse};
pub use secret_vault::{SecretVault, SecretVaultError};
pub use training_example_store::{TrainingExampleError, TrainingExampleStore};
pub use vector_store::{ScoredPoint, VectorStore, VectorStoreError};
