//! Mock Completion Client for testing.
//!
//! Responses are queued and consumed in order; once the queue is empty a
//! default answer is returned. Every request is recorded for verification.
//!
//! # Example
//!
//! ```ignore
//! let client = MockCompletionClient::new()
//!     .with_response("Kairon is a platform")
//!     .with_error(CompletionError::network("reset"));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    CompletionClient, CompletionError, CompletionRequest, CompletionResponse, ProviderInfo,
    RequestShape, TokenUsage,
};

/// Answer returned when no response is queued.
pub const DEFAULT_MOCK_ANSWER: &str = "Mock response";

/// Configurable completion client. Clones share queue and call history.
#[derive(Debug, Clone)]
pub struct MockCompletionClient {
    responses: Arc<Mutex<VecDeque<Result<String, CompletionError>>>>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
    request_shape: RequestShape,
    delay: Duration,
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            request_shape: RequestShape::Chat,
            delay: Duration::ZERO,
        }
    }

    /// Queues a successful completion.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(content.into()));
        self
    }

    /// Queues a failure.
    pub fn with_error(self, error: CompletionError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Sets the call shape reported to the prompt assembler.
    pub fn with_request_shape(mut self, request_shape: RequestShape) -> Self {
        self.request_shape = request_shape;
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<String, CompletionError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(DEFAULT_MOCK_ANSWER.to_string()))
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, CompletionError> {
        let model = request.hyperparameters.model.clone();
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let content = self.next_response()?;
        Ok(CompletionResponse {
            content,
            model,
            usage: TokenUsage::new(10, 20),
        })
    }

    fn request_shape(&self) -> RequestShape {
        self.request_shape
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", "mock-model-1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ChatMessage;

    fn request() -> CompletionRequest {
        CompletionRequest::chat(vec![ChatMessage::user("hi")])
    }

    #[tokio::test]
    async fn responses_are_consumed_in_order() {
        let client = MockCompletionClient::new()
            .with_response("first")
            .with_error(CompletionError::network("reset"));

        assert_eq!(client.complete(request()).await.unwrap().content, "first");
        assert!(client.complete(request()).await.is_err());
        assert_eq!(client.complete(request()).await.unwrap().content, DEFAULT_MOCK_ANSWER);
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn clones_share_history() {
        let client = MockCompletionClient::new();
        let shared = client.clone();

        shared.complete(request()).await.unwrap();
        assert_eq!(client.get_calls(), vec![request()]);
    }

    #[test]
    fn request_shape_is_configurable() {
        let client = MockCompletionClient::new().with_request_shape(RequestShape::Legacy);
        assert_eq!(client.request_shape(), RequestShape::Legacy);
    }
}
