//! ActionDispatcher - routes a named action to its handler and records the run.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value};
use tracing::Instrument;

use super::handlers::{
    ActionCommand, ActionError, ActionHandlers, ActionOutcome, ActionServices, ExecutionTrace, Invocation,
};
use crate::domain::action::{
    ActionConfig, ActionResult, ActionStatus, BotUtterance, ExecutionLogRecord, ACTION_RESPONSE_SLOT,
    DEFAULT_FAILURE_MESSAGE,
};
use crate::domain::foundation::Timestamp;
use crate::domain::tracker::{ActionContext, DialogueSnapshot, DomainSpec};
use crate::ports::{
    ActionConfigStore, AuditLogSink, CompletionClient, EmailSender, HttpRequester, IntegrationClient,
    NestedActionError, NestedActionInvoker, ScriptEvaluator, SecretVault, TrainingExampleStore, VectorStore,
};

/// Command to run one action for the current dialogue turn.
#[derive(Debug, Clone)]
pub struct DispatchActionCommand {
    pub action_name: String,
    pub snapshot: DialogueSnapshot,
    pub domain: DomainSpec,
}

/// External collaborators the dispatcher is wired with.
#[derive(Clone)]
pub struct Collaborators {
    pub action_store: Arc<dyn ActionConfigStore>,
    pub secrets: Arc<dyn SecretVault>,
    pub evaluator: Arc<dyn ScriptEvaluator>,
    pub vector_store: Arc<dyn VectorStore>,
    pub completion: Arc<dyn CompletionClient>,
    pub audit_log: Arc<dyn AuditLogSink>,
    pub http: Arc<dyn HttpRequester>,
    pub email: Arc<dyn EmailSender>,
    pub integrations: Arc<dyn IntegrationClient>,
    pub training_examples: Arc<dyn TrainingExampleStore>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Deepest chain of actions invoked from prompt fragments.
    pub max_nesting_depth: u32,
    pub default_failure_message: String,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_nesting_depth: 3,
            default_failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// A completed run of a known, active action.
#[derive(Debug, Clone)]
struct Execution {
    result: ActionResult,
    bot_response: Value,
}

/// Handler for [`DispatchActionCommand`].
#[derive(Clone)]
pub struct ActionDispatcher {
    services: ActionServices,
    handlers: ActionHandlers,
    action_store: Arc<dyn ActionConfigStore>,
    audit_log: Arc<dyn AuditLogSink>,
    settings: DispatchSettings,
}

impl ActionDispatcher {
    pub fn new(collaborators: Collaborators, settings: DispatchSettings) -> Self {
        let services = ActionServices::new(
            collaborators.secrets,
            collaborators.evaluator,
            collaborators.completion,
            collaborators.vector_store,
            collaborators.http,
            collaborators.email,
            collaborators.integrations,
            collaborators.training_examples,
        );
        Self {
            handlers: ActionHandlers::new(&services),
            services,
            action_store: collaborators.action_store,
            audit_log: collaborators.audit_log,
            settings,
        }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Runs the action; unknown or inactive actions yield an empty result.
    pub async fn handle(&self, cmd: &DispatchActionCommand) -> ActionResult {
        self.run(&cmd.action_name, &cmd.snapshot, &cmd.domain, 0, false)
            .await
            .map(|execution| execution.result)
            .unwrap_or_default()
    }

    fn run<'a>(
        &'a self,
        action_name: &'a str,
        snapshot: &'a DialogueSnapshot,
        domain: &'a DomainSpec,
        depth: u32,
        suppress_dispatch: bool,
    ) -> BoxFuture<'a, Option<Execution>> {
        let span = tracing::info_span!("action", action = %action_name, sender = %snapshot.sender_id, depth);
        async move {
            // 1. Resolve bot and stored configuration
            let Some(bot) = snapshot.bot_id() else {
                tracing::warn!("No bot id in tracker slots, skipping action");
                return None;
            };
            let record = match self.action_store.get_action(bot, action_name).await {
                Ok(Some(record)) if record.status => record,
                Ok(Some(_)) => {
                    tracing::info!(bot = %bot, "Action is inactive");
                    return None;
                }
                Ok(None) => {
                    tracing::info!(bot = %bot, "Action not found");
                    return None;
                }
                Err(err) => {
                    tracing::warn!(bot = %bot, error = %err, "Failed to load action configuration");
                    return None;
                }
            };
            let config = &record.config;

            // 2. Build context and run the handler
            let started = Timestamp::now();
            let context = self
                .services
                .context_builder
                .build(snapshot, config.needs_key_vault())
                .await;
            let invocation = Invocation {
                action_name,
                bot,
                snapshot,
                domain,
                depth,
            };
            let mut trace = ExecutionTrace::default();
            let outcome = self.execute(config, &invocation, &context, &mut trace).await;

            // 3. Convert the outcome into slot events and at most one utterance
            let (result, bot_response) = match outcome {
                Ok(outcome) => self.success(config, outcome, suppress_dispatch),
                Err(err) => {
                    tracing::warn!(bot = %bot, action_type = config.action_type(), error = %err, "Action failed");
                    self.failure(config, &err, suppress_dispatch)
                }
            };
            tracing::info!(
                status = %result.status,
                slots = result.filled_slots.len(),
                elapsed_ms = Timestamp::now().millis_since(&started),
                "Action executed"
            );

            // 4. Record the execution
            let mut log = ExecutionLogRecord::new(config.action_type(), action_name, &snapshot.sender_id, bot);
            log.config = config.redacted();
            log.intent = context.intent.clone();
            log.user_msg = context.user_message.clone();
            log.request = trace.request;
            log.api_response = trace.api_response;
            log.bot_response = Some(bot_response.clone()).filter(|response| !response.is_null());
            log.messages = trace.messages.into_entries();
            log.exception = result.exception.clone();
            log.status = result.status;
            if let Err(err) = self.audit_log.append(log).await {
                tracing::warn!(error = %err, "Failed to write execution log");
            }

            Some(Execution { result, bot_response })
        }
        .instrument(span)
        .boxed()
    }

    async fn execute(
        &self,
        config: &ActionConfig,
        invocation: &Invocation<'_>,
        context: &ActionContext,
        trace: &mut ExecutionTrace,
    ) -> Result<ActionOutcome, ActionError> {
        let handlers = &self.handlers;
        let invocation = *invocation;
        match config {
            ActionConfig::HttpAction(config) => {
                handlers.http.handle(ActionCommand::new(invocation, context, config), trace).await
            }
            ActionConfig::VectorEmbeddingsDbAction(config) => {
                handlers.vector.handle(ActionCommand::new(invocation, context, config), trace).await
            }
            ActionConfig::SlotSetAction(config) => {
                handlers.slot_set.handle(ActionCommand::new(invocation, context, config), trace).await
            }
            ActionConfig::FormValidationAction(config) => {
                handlers
                    .form_validation
                    .handle(ActionCommand::new(invocation, context, config), trace)
                    .await
            }
            ActionConfig::EmailAction(config) => {
                handlers.email.handle(ActionCommand::new(invocation, context, config), trace).await
            }
            ActionConfig::GoogleSearchAction(config) => {
                handlers
                    .integrations
                    .google_search(ActionCommand::new(invocation, context, config), trace)
                    .await
            }
            ActionConfig::JiraAction(config) => {
                handlers.integrations.jira(ActionCommand::new(invocation, context, config), trace).await
            }
            ActionConfig::ZendeskAction(config) => {
                handlers.integrations.zendesk(ActionCommand::new(invocation, context, config), trace).await
            }
            ActionConfig::PipedriveLeadsAction(config) => {
                handlers.integrations.pipedrive(ActionCommand::new(invocation, context, config), trace).await
            }
            ActionConfig::RazorpayAction(config) => {
                handlers.integrations.razorpay(ActionCommand::new(invocation, context, config), trace).await
            }
            ActionConfig::HubspotFormsAction(config) => {
                handlers.integrations.hubspot(ActionCommand::new(invocation, context, config), trace).await
            }
            ActionConfig::TwoStageFallback(config) => {
                handlers
                    .two_stage_fallback
                    .handle(ActionCommand::new(invocation, context, config), trace)
                    .await
            }
            ActionConfig::KaironBotResponse(config) => {
                handlers.bot_response.handle(ActionCommand::new(invocation, context, config), trace).await
            }
            ActionConfig::PromptAction(config) => {
                let nested = NestedInvocation {
                    dispatcher: self,
                    snapshot: invocation.snapshot,
                    domain: invocation.domain,
                    depth: invocation.depth,
                };
                handlers
                    .prompt
                    .handle(ActionCommand::new(invocation, context, config), &nested, trace)
                    .await
            }
        }
    }

    fn success(&self, config: &ActionConfig, outcome: ActionOutcome, suppress_dispatch: bool) -> (ActionResult, Value) {
        let mut filled_slots = without_action_response(outcome.filled_slots);
        if config.emits_action_response() {
            filled_slots.insert(ACTION_RESPONSE_SLOT.to_string(), outcome.bot_response.clone());
        }
        let result = ActionResult {
            filled_slots,
            dispatch: outcome.dispatch.filter(|_| !suppress_dispatch),
            status: ActionStatus::Success,
            exception: None,
        };
        (result, outcome.bot_response)
    }

    fn failure(&self, config: &ActionConfig, err: &ActionError, suppress_dispatch: bool) -> (ActionResult, Value) {
        let message = config
            .failure_message()
            .unwrap_or(&self.settings.default_failure_message)
            .to_string();

        let mut filled_slots = Map::new();
        if config.emits_action_response() {
            filled_slots.insert(ACTION_RESPONSE_SLOT.to_string(), Value::String(message.clone()));
        }
        let dispatch = (config.dispatches_response() && !suppress_dispatch).then(|| BotUtterance::text(&message));

        let result = ActionResult {
            filled_slots,
            dispatch,
            status: ActionStatus::Failure,
            exception: Some(err.to_string()),
        };
        (result, Value::String(message))
    }
}

/// Filled slots with any handler-set action response dropped, so the
/// dispatcher's own entry always lands last.
fn without_action_response(slots: Map<String, Value>) -> Map<String, Value> {
    slots
        .into_iter()
        .filter(|(name, _)| name != ACTION_RESPONSE_SLOT)
        .collect()
}

/// Re-entrant invocation of other actions from prompt fragments.
struct NestedInvocation<'a> {
    dispatcher: &'a ActionDispatcher,
    snapshot: &'a DialogueSnapshot,
    domain: &'a DomainSpec,
    depth: u32,
}

#[async_trait::async_trait]
impl<'a> NestedActionInvoker for NestedInvocation<'a> {
    async fn invoke(&self, action_name: &str) -> Result<Value, NestedActionError> {
        let max_depth = self.dispatcher.settings.max_nesting_depth;
        if self.depth + 1 > max_depth {
            return Err(NestedActionError::DepthExceeded { max_depth });
        }

        let execution = self
            .dispatcher
            .run(action_name, self.snapshot, self.domain, self.depth + 1, true)
            .await
            .ok_or_else(|| NestedActionError::NotFound(action_name.to_string()))?;

        match execution.result.status {
            ActionStatus::Success => Ok(execution.bot_response),
            ActionStatus::Failure => Err(NestedActionError::Failed {
                action: action_name.to_string(),
                message: execution.result.exception.unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockCompletionClient;
    use crate::adapters::audit::InMemoryAuditLog;
    use crate::adapters::email::OutboxEmailSender;
    use crate::adapters::evaluator::MockScriptEvaluator;
    use crate::adapters::http_client::ReqwestHttpRequester;
    use crate::adapters::integrations::MockIntegrationClient;
    use crate::adapters::storage::{InMemoryActionStore, InMemorySecretVault};
    use crate::adapters::training::InMemoryTrainingExamples;
    use crate::adapters::vector::InMemoryVectorStore;
    use crate::domain::action::ActionRecord;
    use serde_json::json;
    use std::time::Duration;

    struct Fixture {
        audit: InMemoryAuditLog,
        completion: MockCompletionClient,
        dispatcher: ActionDispatcher,
    }

    fn fixture(records: Vec<Value>, completion: MockCompletionClient, settings: DispatchSettings) -> Fixture {
        let store = records.into_iter().fold(InMemoryActionStore::new(), |store, record| {
            let record: ActionRecord = serde_json::from_value(record).unwrap();
            store.with_action("b1", record)
        });
        let audit = InMemoryAuditLog::new();
        let collaborators = Collaborators {
            action_store: Arc::new(store),
            secrets: Arc::new(InMemorySecretVault::new()),
            evaluator: Arc::new(MockScriptEvaluator::new()),
            vector_store: Arc::new(InMemoryVectorStore::new()),
            completion: Arc::new(completion.clone()),
            audit_log: Arc::new(audit.clone()),
            http: Arc::new(ReqwestHttpRequester::new(Duration::from_secs(5)).unwrap()),
            email: Arc::new(OutboxEmailSender::new()),
            integrations: Arc::new(MockIntegrationClient::new()),
            training_examples: Arc::new(InMemoryTrainingExamples::new()),
        };
        Fixture {
            audit,
            completion,
            dispatcher: ActionDispatcher::new(collaborators, settings),
        }
    }

    fn command(action_name: &str) -> DispatchActionCommand {
        DispatchActionCommand {
            action_name: action_name.to_string(),
            snapshot: serde_json::from_value(json!({
                "sender_id": "user-1",
                "slots": {"bot": "b1", "city": "Pune"},
                "latest_message": {"text": "tell me about delivery", "intent": {"name": "ask_delivery"}},
                "events": [{"event": "user", "text": "tell me about delivery"}]
            }))
            .unwrap(),
            domain: serde_json::from_value(json!({
                "responses": {"utter_delivery": [{"text": "Delivery takes 2 days."}]}
            }))
            .unwrap(),
        }
    }

    fn prompt_action(name: &str, nested_action: &str) -> Value {
        json!({
            "name": name,
            "type": "prompt_action",
            "failure_message": "Sorry, I cannot answer that now.",
            "llm_prompts": [
                {"name": "System Prompt", "type": "system", "source": "static", "data": "You are a helpful assistant."},
                {"name": "Delivery", "type": "user", "source": "action", "data": nested_action}
            ]
        })
    }

    fn delivery_response() -> Value {
        json!({"name": "delivery_info", "type": "kairon_bot_response", "response": "utter_delivery"})
    }

    #[tokio::test]
    async fn unknown_action_yields_empty_result_without_log() {
        let fixture = fixture(vec![], MockCompletionClient::new(), DispatchSettings::default());
        let result = fixture.dispatcher.handle(&command("missing_action")).await;

        assert!(result.is_empty());
        assert!(fixture.audit.is_empty().await);
    }

    #[tokio::test]
    async fn inactive_action_is_treated_as_unknown() {
        let fixture = fixture(
            vec![json!({"name": "set_city", "type": "slot_set_action", "status": false, "set_slots": []})],
            MockCompletionClient::new(),
            DispatchSettings::default(),
        );
        assert!(fixture.dispatcher.handle(&command("set_city")).await.is_empty());
        assert!(fixture.audit.is_empty().await);
    }

    #[tokio::test]
    async fn missing_bot_slot_yields_empty_result() {
        let fixture = fixture(vec![delivery_response()], MockCompletionClient::new(), DispatchSettings::default());
        let mut cmd = command("delivery_info");
        cmd.snapshot.slots.remove("bot");

        assert!(fixture.dispatcher.handle(&cmd).await.is_empty());
    }

    #[tokio::test]
    async fn slot_set_success_does_not_emit_action_response() {
        let fixture = fixture(
            vec![json!({
                "name": "set_city",
                "type": "slot_set_action",
                "set_slots": [{"name": "location", "type": "from_value", "value": "Delhi"}]
            })],
            MockCompletionClient::new(),
            DispatchSettings::default(),
        );

        let result = fixture.dispatcher.handle(&command("set_city")).await;
        assert_eq!(result.status, ActionStatus::Success);
        assert_eq!(Value::Object(result.filled_slots), json!({"location": "Delhi"}));
        assert!(result.dispatch.is_none());

        let records = fixture.audit.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action_type, "slot_set_action");
        assert_eq!(records[0].intent.as_deref(), Some("ask_delivery"));
    }

    #[tokio::test]
    async fn failure_uses_configured_message_and_emits_it() {
        let fixture = fixture(
            vec![json!({
                "name": "faq_search",
                "type": "vector_embeddings_db_action",
                "operation": {"type": "from_value", "value": "payload_search"},
                "payload": {"type": "from_value", "value": "not a filter"},
                "response": {"value": "${data.result}"},
                "failure_response": "Search is unavailable."
            })],
            MockCompletionClient::new(),
            DispatchSettings::default(),
        );

        let result = fixture.dispatcher.handle(&command("faq_search")).await;
        assert_eq!(result.status, ActionStatus::Failure);
        assert_eq!(result.filled_slots[ACTION_RESPONSE_SLOT], "Search is unavailable.");
        assert_eq!(result.dispatch, Some(BotUtterance::text("Search is unavailable.")));

        let records = fixture.audit.records().await;
        assert!(records[0].is_failure());
        assert!(records[0].exception.as_deref().unwrap().contains("payload_search"));
    }

    #[tokio::test]
    async fn nested_action_feeds_prompt_and_is_logged_separately() {
        let fixture = fixture(
            vec![prompt_action("answer_delivery", "delivery_info"), delivery_response()],
            MockCompletionClient::new().with_response("It takes 2 days."),
            DispatchSettings::default(),
        );

        let result = fixture.dispatcher.handle(&command("answer_delivery")).await;
        assert_eq!(result.status, ActionStatus::Success);
        assert_eq!(result.filled_slots[ACTION_RESPONSE_SLOT], "It takes 2 days.");

        let request = &fixture.completion.get_calls()[0];
        let messages = request.to_messages();
        assert!(messages.last().unwrap().content.contains("Delivery takes 2 days."));

        let records = fixture.audit.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].action, "delivery_info");
        assert_eq!(records[1].action, "answer_delivery");
    }

    #[tokio::test]
    async fn nesting_beyond_limit_fails_outer_action() {
        let fixture = fixture(
            vec![prompt_action("answer_delivery", "delivery_info"), delivery_response()],
            MockCompletionClient::new(),
            DispatchSettings {
                max_nesting_depth: 0,
                ..DispatchSettings::default()
            },
        );

        let result = fixture.dispatcher.handle(&command("answer_delivery")).await;
        assert_eq!(result.status, ActionStatus::Failure);
        assert_eq!(result.dispatch, Some(BotUtterance::text("Sorry, I cannot answer that now.")));
        assert_eq!(fixture.completion.call_count(), 0);
    }

    #[tokio::test]
    async fn self_referencing_prompt_stops_at_depth_limit() {
        let fixture = fixture(
            vec![prompt_action("loop_action", "loop_action")],
            MockCompletionClient::new(),
            DispatchSettings::default(),
        );

        let result = fixture.dispatcher.handle(&command("loop_action")).await;
        assert_eq!(result.status, ActionStatus::Failure);
        assert_eq!(fixture.audit.len().await, 4);
        assert_eq!(fixture.completion.call_count(), 0);
    }
}
