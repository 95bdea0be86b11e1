//! Action handlers - one module per stored action type.
//!
//! Every handler is built from the shared [`ActionServices`] and handles an
//! [`ActionCommand`] carrying its typed configuration, writing audit material
//! into the [`ExecutionTrace`]. It returns an [`ActionOutcome`] or an
//! [`ActionError`]. The dispatcher turns errors into FAILURE results; nothing
//! here dispatches a failure message itself.

pub mod bot_response;
pub mod email_action;
pub mod form_validation_action;
pub mod http_action;
pub mod integration_actions;
pub mod parameters;
pub mod prompt_action;
pub mod slot_set_action;
pub mod two_stage_fallback;
pub mod vector_action;

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::action::BotUtterance;
use crate::domain::expression::{
    display_value, has_placeholders, ExpressionResolver, ResolutionError, TraceLog,
};
use crate::domain::foundation::ValidationError;
use crate::domain::prompt::{PromptAssembler, PromptError, ResponseCache};
use crate::domain::response::ResponseComposer;
use crate::domain::slots::{SlotExtractor, SlotSources};
use crate::domain::tracker::{ActionContext, ContextBuilder, DialogueSnapshot, DomainSpec};
use crate::ports::{
    CompletionClient, CompletionError, EmailError, EmailSender, HttpRequestError, HttpRequester,
    IntegrationClient, IntegrationError, NestedActionError, ScriptEvaluator, SecretVault,
    TrainingExampleError, TrainingExampleStore, VectorStore, VectorStoreError,
};

/// Engines and collaborators shared by all handlers.
#[derive(Clone)]
pub struct ActionServices {
    pub context_builder: ContextBuilder,
    pub resolver: ExpressionResolver,
    pub composer: ResponseComposer,
    pub extractor: SlotExtractor,
    pub assembler: PromptAssembler,
    pub cache: ResponseCache,
    pub completion: Arc<dyn CompletionClient>,
    pub vector_store: Arc<dyn VectorStore>,
    pub http: Arc<dyn HttpRequester>,
    pub email: Arc<dyn EmailSender>,
    pub integrations: Arc<dyn IntegrationClient>,
    pub training_examples: Arc<dyn TrainingExampleStore>,
}

impl ActionServices {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        secrets: Arc<dyn SecretVault>,
        evaluator: Arc<dyn ScriptEvaluator>,
        completion: Arc<dyn CompletionClient>,
        vector_store: Arc<dyn VectorStore>,
        http: Arc<dyn HttpRequester>,
        email: Arc<dyn EmailSender>,
        integrations: Arc<dyn IntegrationClient>,
        training_examples: Arc<dyn TrainingExampleStore>,
    ) -> Self {
        let resolver = ExpressionResolver::new(evaluator);
        Self {
            context_builder: ContextBuilder::new(secrets),
            composer: ResponseComposer::new(resolver.clone()),
            extractor: SlotExtractor::new(resolver.clone()),
            resolver,
            assembler: PromptAssembler::new(completion.clone(), vector_store.clone()),
            cache: ResponseCache::new(vector_store.clone()),
            completion,
            vector_store,
            http,
            email,
            integrations,
            training_examples,
        }
    }
}

/// One action invocation as seen by a handler.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub action_name: &'a str,
    pub bot: &'a str,
    pub snapshot: &'a DialogueSnapshot,
    pub domain: &'a DomainSpec,
    /// Zero for actions called by the dialogue manager.
    pub depth: u32,
}

impl<'a> Invocation<'a> {
    pub fn slot_sources(&self) -> SlotSources<'a> {
        SlotSources {
            current_slots: &self.snapshot.slots,
            domain: self.domain,
        }
    }
}

/// Command to run one stored action of configuration type `C`.
#[derive(Debug)]
pub struct ActionCommand<'a, C> {
    pub invocation: Invocation<'a>,
    pub context: &'a ActionContext,
    pub config: &'a C,
}

impl<'a, C> ActionCommand<'a, C> {
    pub fn new(invocation: Invocation<'a>, context: &'a ActionContext, config: &'a C) -> Self {
        Self {
            invocation,
            context,
            config,
        }
    }
}

/// One handler per stored action type.
#[derive(Clone)]
pub struct ActionHandlers {
    pub http: http_action::HttpActionHandler,
    pub vector: vector_action::VectorActionHandler,
    pub slot_set: slot_set_action::SlotSetHandler,
    pub form_validation: form_validation_action::FormValidationHandler,
    pub email: email_action::EmailActionHandler,
    pub integrations: integration_actions::IntegrationActionHandler,
    pub two_stage_fallback: two_stage_fallback::TwoStageFallbackHandler,
    pub bot_response: bot_response::BotResponseHandler,
    pub prompt: prompt_action::PromptActionHandler,
}

impl ActionHandlers {
    pub fn new(services: &ActionServices) -> Self {
        Self {
            http: http_action::HttpActionHandler::new(services.clone()),
            vector: vector_action::VectorActionHandler::new(services.clone()),
            slot_set: slot_set_action::SlotSetHandler::new(services.clone()),
            form_validation: form_validation_action::FormValidationHandler::new(services.clone()),
            email: email_action::EmailActionHandler::new(services.clone()),
            integrations: integration_actions::IntegrationActionHandler::new(services.clone()),
            two_stage_fallback: two_stage_fallback::TwoStageFallbackHandler::new(services.clone()),
            bot_response: bot_response::BotResponseHandler::new(services.clone()),
            prompt: prompt_action::PromptActionHandler::new(services.clone()),
        }
    }
}

/// Audit material collected while a handler runs; kept when it fails.
#[derive(Debug, Clone, Default)]
pub struct ExecutionTrace {
    pub messages: TraceLog,
    pub request: Option<Value>,
    pub api_response: Option<Value>,
}

/// Successful handler result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOutcome {
    pub filled_slots: Map<String, Value>,
    /// Final answer, stored as `kairon_action_response` by emitting types.
    pub bot_response: Value,
    pub dispatch: Option<BotUtterance>,
}

/// Handler boundary error; converted into a FAILURE result by the dispatcher.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    VectorStore(#[from] VectorStoreError),

    #[error(transparent)]
    Http(#[from] HttpRequestError),

    #[error("Got non-200 status code {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    Integration(#[from] IntegrationError),

    #[error(transparent)]
    TrainingExamples(#[from] TrainingExampleError),

    #[error(transparent)]
    Nested(#[from] NestedActionError),

    #[error(transparent)]
    InvalidConfig(#[from] ValidationError),

    #[error("Parameter '{0}' could not be resolved")]
    MissingParameter(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ActionError {
    /// Whether the failure came from an unreachable collaborator.
    pub fn is_connection_failure(&self) -> bool {
        match self {
            ActionError::Completion(err) | ActionError::Prompt(PromptError::Rephrase(err)) => {
                err.is_connection_failure()
            }
            ActionError::VectorStore(VectorStoreError::Unavailable(_))
            | ActionError::Prompt(PromptError::VectorStore(VectorStoreError::Unavailable(_))) => true,
            _ => false,
        }
    }
}

/// Renders a plain response template against `data` in expression mode.
pub(crate) fn render_text(template: &str, data: &Value, trace: &mut TraceLog) -> Result<String, ActionError> {
    if !has_placeholders(template) {
        return Ok(template.to_string());
    }
    let value = ExpressionResolver::resolve_expression(template, data, trace).map_err(ResolutionError::from)?;
    Ok(display_value(&value))
}
