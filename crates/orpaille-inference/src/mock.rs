//! Mock remote-model backend for deterministic testing.
//!
//! Implements all three backend seams with a shared call log, so tests
//! can assert how many remote calls a pipeline made (including zero for
//! fixture paths) and inspect the requests it sent.
//!
//! Responses are selected by substring match against the request's user
//! text, because pipeline prompts embed dynamic coordinates that make
//! exact-prompt matching brittle.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use orpaille_core::models::ChatRequest;
use orpaille_core::traits::{
    GenerationBackend, ImageGenerationBackend, VisionBackend, VisionRequest,
};
use orpaille_core::{Error, Result};

/// One logged backend call.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// "complete", "vision", or "generate_image".
    pub operation: String,
    /// Concatenated user-visible text of the request.
    pub input: String,
}

#[derive(Default)]
struct MockState {
    rules: Vec<(String, String)>,
    default_response: String,
    fail: bool,
    calls: Vec<MockCall>,
    chat_requests: Vec<ChatRequest>,
}

/// Call-logged mock backend.
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                default_response: "Mock response".to_string(),
                ..MockState::default()
            })),
        }
    }

    /// Set the response returned when no rule matches.
    pub fn with_fixed_response(self, response: impl Into<String>) -> Self {
        self.state.lock().unwrap().default_response = response.into();
        self
    }

    /// Return `response` whenever the request text contains `needle`.
    /// Rules are checked in insertion order.
    pub fn with_response_rule(
        self,
        needle: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .rules
            .push((needle.into(), response.into()));
        self
    }

    /// Make every call fail with an inference error.
    pub fn with_failure(self) -> Self {
        self.state.lock().unwrap().fail = true;
        self
    }

    /// All logged calls, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Chat requests seen by `complete`, for sampling-parameter asserts.
    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.state.lock().unwrap().chat_requests.clone()
    }

    /// Number of chat completion calls.
    pub fn complete_call_count(&self) -> usize {
        self.count("complete")
    }

    /// Number of image-analysis calls.
    pub fn vision_call_count(&self) -> usize {
        self.count("vision")
    }

    /// Number of image-generation calls.
    pub fn image_call_count(&self) -> usize {
        self.count("generate_image")
    }

    fn count(&self, operation: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    fn respond(&self, operation: &str, input: String) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall {
            operation: operation.to_string(),
            input: input.clone(),
        });

        if state.fail {
            return Err(Error::Inference("mock failure".to_string()));
        }

        for (needle, response) in &state.rules {
            if input.contains(needle.as_str()) {
                return Ok(response.clone());
            }
        }
        Ok(state.default_response.clone())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let input = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.state.lock().unwrap().chat_requests.push(request.clone());
        self.respond("complete", input)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[async_trait]
impl VisionBackend for MockBackend {
    async fn describe_image(&self, request: VisionRequest) -> Result<String> {
        let input = format!("{}\n{}", request.system, request.prompt);
        self.respond("vision", input)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[async_trait]
impl ImageGenerationBackend for MockBackend {
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        self.respond("generate_image", prompt.to_string())
            .map(|_| "https://mock.example/generated.png".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orpaille_core::models::PromptMessage;

    #[tokio::test]
    async fn test_fixed_response_and_call_log() {
        let backend = MockBackend::new().with_fixed_response("ok");

        let reply = backend
            .complete(ChatRequest::new(vec![PromptMessage::user("hello")]))
            .await
            .unwrap();
        assert_eq!(reply, "ok");
        assert_eq!(backend.complete_call_count(), 1);
        assert_eq!(backend.calls()[0].input, "hello");
    }

    #[tokio::test]
    async fn test_response_rules_match_by_substring() {
        let backend = MockBackend::new()
            .with_response_rule("Tuchan", "[{\"river\": \"Caudies\"}]")
            .with_fixed_response("fallback");

        let hit = backend
            .complete(ChatRequest::new(vec![PromptMessage::user(
                "Recherchez les cours d'eau aurifères autour de Tuchan",
            )]))
            .await
            .unwrap();
        assert_eq!(hit, "[{\"river\": \"Caudies\"}]");

        let miss = backend
            .complete(ChatRequest::new(vec![PromptMessage::user("ailleurs")]))
            .await
            .unwrap();
        assert_eq!(miss, "fallback");
    }

    #[tokio::test]
    async fn test_forced_failure() {
        let backend = MockBackend::new().with_failure();
        let err = backend
            .complete(ChatRequest::new(vec![PromptMessage::user("x")]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
        // The failed call is still logged
        assert_eq!(backend.complete_call_count(), 1);
    }

    #[tokio::test]
    async fn test_vision_and_image_counts_are_separate() {
        let backend = MockBackend::new();

        backend
            .describe_image(VisionRequest {
                system: "s".to_string(),
                prompt: "p".to_string(),
                image_url: "data:image/jpeg;base64,AAAA".to_string(),
                temperature: None,
                max_tokens: None,
                json_reply: false,
            })
            .await
            .unwrap();
        backend.generate_image("a river").await.unwrap();

        assert_eq!(backend.vision_call_count(), 1);
        assert_eq!(backend.image_call_count(), 1);
        assert_eq!(backend.complete_call_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_requests_capture_sampling() {
        let backend = MockBackend::new();
        let mut request = ChatRequest::new(vec![PromptMessage::user("x")]);
        request.temperature = Some(0.1);
        backend.complete(request).await.unwrap();

        let seen = backend.chat_requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].temperature, Some(0.1));
    }
}
