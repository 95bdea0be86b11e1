//! OpenAI Completion Client - chat completions over HTTP.
//!
//! Both request shapes are sent to the chat completions endpoint; the legacy
//! `(question, system, context)` triplet is folded into a system message and a
//! single user message first.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_base_url("https://api.openai.com/v1")
//!     .with_max_retries(2);
//!
//! let client = OpenAICompletionClient::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    CompletionClient, CompletionError, CompletionRequest, CompletionResponse, MessageRole,
    ProviderInfo, RequestShape, TokenUsage,
};

/// Configuration for the OpenAI client.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    api_key: Secret<String>,
    /// Model used when a request does not name one.
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
    /// Shape the prompt assembler should build.
    pub request_shape: RequestShape,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-3.5-turbo".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 3,
            request_shape: RequestShape::Chat,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_request_shape(mut self, request_shape: RequestShape) -> Self {
        self.request_shape = request_shape;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI implementation of [`CompletionClient`].
pub struct OpenAICompletionClient {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAICompletionClient {
    pub fn new(config: OpenAIConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        let messages = request
            .to_messages()
            .into_iter()
            .map(|msg| OpenAIMessage {
                role: match msg.role {
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                }
                .to_string(),
                content: msg.content,
            })
            .collect();

        let params = &request.hyperparameters;
        let model = if params.model.is_empty() {
            self.config.model.clone()
        } else {
            params.model.clone()
        };

        OpenAIRequest {
            model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            n: params.n,
            stop: params.stop.clone(),
            presence_penalty: params.presence_penalty,
            frequency_penalty: params.frequency_penalty,
        }
    }

    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, CompletionError> {
        let openai_request = self.to_openai_request(request);

        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    CompletionError::network(format!("Connection failed: {}", e))
                } else {
                    CompletionError::network(e.to_string())
                }
            })
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, CompletionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 => Err(CompletionError::AuthenticationFailed),
            429 => Err(CompletionError::rate_limited(Self::parse_retry_after(&error_body))),
            400 => Err(CompletionError::InvalidRequest(error_body)),
            500..=599 => Err(CompletionError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(CompletionError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Seconds from a "try again in Ns" error message, 30 when absent.
    fn parse_retry_after(error_body: &str) -> u32 {
        serde_json::from_str::<serde_json::Value>(error_body)
            .ok()
            .and_then(|parsed| {
                let message = parsed.get("error")?.get("message")?.as_str()?.to_string();
                let rest = &message[message.find("try again in ")? + 13..];
                let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
                digits.parse::<u32>().ok()
            })
            .unwrap_or(30)
    }

    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, CompletionError> {
        let response = self.handle_response_status(response).await?;

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::parse(format!("Failed to parse response: {}", e)))?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::parse("No choices in response"))?;

        let usage = openai_response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: choice.message.content,
            model: openai_response.model,
            usage,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAICompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, CompletionError> {
        let mut last_error = CompletionError::network("No attempts made");
        let mut retry_count = 0;

        while retry_count <= self.config.max_retries {
            let attempt = match self.send_request(&request).await {
                Ok(response) => self.parse_response(response).await,
                Err(err) => Err(err),
            };

            match attempt {
                Ok(completion) => {
                    tracing::debug!(
                        model = %completion.model,
                        total_tokens = completion.usage.total(),
                        "Completion received"
                    );
                    return Ok(completion);
                }
                Err(err) => {
                    if !err.is_retryable() || retry_count >= self.config.max_retries {
                        return Err(err);
                    }
                    tracing::warn!(retry = retry_count + 1, error = %err, "Retrying completion request");
                    last_error = err;
                }
            }

            // Exponential backoff: 1s, 2s, 4s, ...
            sleep(Duration::from_secs(1 << retry_count)).await;
            retry_count += 1;
        }

        Err(last_error)
    }

    fn request_shape(&self) -> RequestShape {
        self.config.request_shape
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai", &self.config.model)
    }
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    presence_penalty: f32,
    frequency_penalty: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    model: String,
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{ChatMessage, LlmHyperparameters};
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::Server) -> OpenAICompletionClient {
        let config = OpenAIConfig::new("test-key")
            .with_base_url(server.url())
            .with_max_retries(0);
        OpenAICompletionClient::new(config).unwrap()
    }

    fn completion_body(content: &str) -> String {
        json!({
            "model": "gpt-3.5-turbo-0125",
            "choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4}
        })
        .to_string()
    }

    #[test]
    fn config_builder_works() {
        let config = OpenAIConfig::new("test-key")
            .with_model("gpt-4o")
            .with_base_url("https://custom.api.com")
            .with_timeout(Duration::from_secs(30))
            .with_max_retries(5)
            .with_request_shape(RequestShape::Legacy);

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "https://custom.api.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.request_shape, RequestShape::Legacy);
        assert_eq!(config.api_key(), "test-key");
    }

    #[tokio::test]
    async fn chat_request_is_sent_with_hyperparameters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 300,
                "messages": [{"role": "system", "content": "sys"}, {"role": "user", "content": "hi"}]
            })))
            .with_status(200)
            .with_body(completion_body("Hello!"))
            .create_async()
            .await;

        let request = CompletionRequest::chat(vec![ChatMessage::system("sys"), ChatMessage::user("hi")])
            .with_hyperparameters(LlmHyperparameters {
                model: "gpt-4o-mini".into(),
                ..LlmHyperparameters::default()
            });
        let response = client_for(&server).complete(request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.content, "Hello!");
        assert_eq!(response.usage.total(), 16);
    }

    #[tokio::test]
    async fn legacy_request_is_folded_into_messages() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "messages": [
                    {"role": "system", "content": "sys\n"},
                    {"role": "user", "content": "\nDocs:\nKairon\n\n Q: what?\n A:"}
                ]
            })))
            .with_status(200)
            .with_body(completion_body("Kairon"))
            .create_async()
            .await;

        let request = CompletionRequest::legacy("what?", "sys\n", "\nDocs:\nKairon\n");
        client_for(&server).complete(request).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn status_codes_map_to_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("{}")
            .create_async()
            .await;

        let err = client_for(&server)
            .complete(CompletionRequest::chat(vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();
        assert_eq!(err, CompletionError::AuthenticationFailed);
    }

    #[tokio::test]
    async fn server_errors_are_connection_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let err = client_for(&server)
            .complete(CompletionRequest::chat(vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();
        assert!(err.is_connection_failure());
    }

    #[test]
    fn parse_retry_after_from_message() {
        let error = r#"{"error":{"message":"Rate limit exceeded. Please try again in 20 seconds."}}"#;
        assert_eq!(OpenAICompletionClient::parse_retry_after(error), 20);
        assert_eq!(OpenAICompletionClient::parse_retry_after("not json"), 30);
    }
}
