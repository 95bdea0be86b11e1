use std::error::Error;
use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kairon_action_server::adapters::ai::{MockCompletionClient, OpenAICompletionClient, OpenAIConfig};
use kairon_action_server::adapters::audit::{InMemoryAuditLog, JsonlAuditLog};
use kairon_action_server::adapters::email::OutboxEmailSender;
use kairon_action_server::adapters::evaluator::{HttpScriptEvaluator, ScriptEvaluatorConfig};
use kairon_action_server::adapters::http::{webhook_routes, WebhookHandlers};
use kairon_action_server::adapters::http_client::ReqwestHttpRequester;
use kairon_action_server::adapters::integrations::MockIntegrationClient;
use kairon_action_server::adapters::storage::{FileActionCatalog, InMemoryActionStore, InMemorySecretVault};
use kairon_action_server::adapters::training::InMemoryTrainingExamples;
use kairon_action_server::adapters::vector::InMemoryVectorStore;
use kairon_action_server::application::{ActionDispatcher, Collaborators};
use kairon_action_server::config::{AppConfig, LogFormat};
use kairon_action_server::ports::{ActionConfigStore, AuditLogSink, CompletionClient, SecretVault};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config);

    let dispatcher = ActionDispatcher::new(collaborators(&config)?, config.dispatch.settings());
    let app = webhook_routes(WebhookHandlers::new(Arc::new(dispatcher))).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(config.server.request_timeout())),
    );

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Action server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format() {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn collaborators(config: &AppConfig) -> Result<Collaborators, Box<dyn Error>> {
    let (action_store, secrets): (Arc<dyn ActionConfigStore>, Arc<dyn SecretVault>) =
        match &config.storage.actions_file {
            Some(path) => {
                let catalog = Arc::new(FileActionCatalog::new(path));
                (catalog.clone(), catalog)
            }
            None => {
                tracing::warn!("No action catalog configured, serving an empty in-memory store");
                (Arc::new(InMemoryActionStore::new()), Arc::new(InMemorySecretVault::new()))
            }
        };

    let audit_log: Arc<dyn AuditLogSink> = match &config.storage.audit_log_file {
        Some(path) => Arc::new(JsonlAuditLog::new(path)),
        None => {
            tracing::warn!(
                capacity = config.storage.audit_buffer_size,
                "No audit log file configured, keeping recent execution records in memory"
            );
            Arc::new(InMemoryAuditLog::bounded(config.storage.audit_buffer_size))
        }
    };

    let completion: Arc<dyn CompletionClient> = match &config.llm.openai_api_key {
        Some(key) if config.llm.has_openai() => {
            let openai = OpenAIConfig::new(key.clone())
                .with_base_url(config.llm.base_url.clone())
                .with_model(config.llm.model.clone())
                .with_timeout(config.llm.timeout())
                .with_max_retries(config.llm.max_retries)
                .with_request_shape(config.llm.request_shape);
            Arc::new(OpenAICompletionClient::new(openai)?)
        }
        _ => {
            tracing::warn!("No OpenAI key configured, prompt actions use the mock completion client");
            Arc::new(MockCompletionClient::new().with_request_shape(config.llm.request_shape))
        }
    };

    let evaluator = ScriptEvaluatorConfig::new(config.evaluator.url.clone().unwrap_or_default())
        .with_timeout(config.evaluator.timeout());

    Ok(Collaborators {
        action_store,
        secrets,
        evaluator: Arc::new(HttpScriptEvaluator::new(evaluator)?),
        vector_store: Arc::new(InMemoryVectorStore::new()),
        completion,
        audit_log,
        http: Arc::new(ReqwestHttpRequester::new(config.server.request_timeout())?),
        email: Arc::new(OutboxEmailSender::new()),
        integrations: Arc::new(MockIntegrationClient::new()),
        training_examples: Arc::new(InMemoryTrainingExamples::new()),
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
