//! OpenAI-compatible remote-model backend implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use orpaille_core::defaults::{
    CHAT_MODEL, ENV_API_KEY, ENV_BASE_URL, IMAGE_MODEL, MODEL_TIMEOUT_SECS, OPENAI_URL,
    VISION_MODEL,
};
use orpaille_core::models::{ChatRequest, MessageRole};
use orpaille_core::traits::{
    GenerationBackend, ImageGenerationBackend, VisionBackend, VisionRequest,
};
use orpaille_core::{Error, Result};

use super::types::*;

/// Configuration for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct RemoteModelConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication (optional for local endpoints).
    pub api_key: Option<String>,
    /// Model used for chat and search completions.
    pub chat_model: String,
    /// Model used for image analysis.
    pub vision_model: String,
    /// Model used for image generation.
    pub image_model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for RemoteModelConfig {
    fn default() -> Self {
        Self {
            base_url: OPENAI_URL.to_string(),
            api_key: None,
            chat_model: CHAT_MODEL.to_string(),
            vision_model: VISION_MODEL.to_string(),
            image_model: IMAGE_MODEL.to_string(),
            timeout_seconds: MODEL_TIMEOUT_SECS,
        }
    }
}

/// OpenAI-compatible remote-model backend.
pub struct OpenAiBackend {
    client: Client,
    config: RemoteModelConfig,
}

impl OpenAiBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: RemoteModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        debug!(
            base_url = %config.base_url,
            chat_model = %config.chat_model,
            "initializing remote-model backend"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables, loading `.env` first.
    ///
    /// `ORPAILLE_API_KEY` is the single externally supplied credential;
    /// `ORPAILLE_BASE_URL` optionally overrides the endpoint.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = RemoteModelConfig {
            base_url: std::env::var(ENV_BASE_URL).unwrap_or_else(|_| OPENAI_URL.to_string()),
            api_key: std::env::var(ENV_API_KEY).ok(),
            ..RemoteModelConfig::default()
        };

        Self::new(config)
    }

    /// Get the current configuration.
    pub fn config(&self) -> &RemoteModelConfig {
        &self.config
    }

    /// Build a POST request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req.header("Content-Type", "application/json")
    }

    async fn post_chat(&self, request: ChatCompletionRequest) -> Result<String> {
        let response = self
            .build_request("/chat/completions")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ApiErrorResponse>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%status, "remote model returned an error");
            return Err(Error::Inference(format!(
                "Remote model returned {}: {}",
                status, message
            )));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        debug!(response_len = content.len(), "completion received");
        Ok(content)
    }
}

fn role_tag(role: MessageRole) -> &'static str {
    match role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let messages = request
            .messages
            .into_iter()
            .map(|m| WireMessage {
                role: role_tag(m.role).to_string(),
                content: WireContent::Text(m.content),
            })
            .collect();

        self.post_chat(ChatCompletionRequest {
            model: self.config.chat_model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            presence_penalty: request.presence_penalty,
            frequency_penalty: request.frequency_penalty,
            response_format: request.json_reply.then(ResponseFormat::json_object),
        })
        .await
    }

    fn model_name(&self) -> &str {
        &self.config.chat_model
    }
}

#[async_trait]
impl VisionBackend for OpenAiBackend {
    async fn describe_image(&self, request: VisionRequest) -> Result<String> {
        let messages = vec![
            WireMessage {
                role: "system".to_string(),
                content: WireContent::Text(request.system),
            },
            WireMessage {
                role: "user".to_string(),
                content: WireContent::Parts(vec![
                    ContentPart::Text { text: request.prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: request.image_url },
                    },
                ]),
            },
        ];

        self.post_chat(ChatCompletionRequest {
            model: self.config.vision_model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            presence_penalty: None,
            frequency_penalty: None,
            response_format: request.json_reply.then(ResponseFormat::json_object),
        })
        .await
    }

    fn model_name(&self) -> &str {
        &self.config.vision_model
    }
}

#[async_trait]
impl ImageGenerationBackend for OpenAiBackend {
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let request = ImageGenerationRequest {
            model: self.config.image_model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: "1024x1024".to_string(),
            quality: "hd".to_string(),
            style: "natural".to_string(),
        };

        let response = self
            .build_request("/images/generations")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ApiErrorResponse>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Inference(format!(
                "Image generation returned {}: {}",
                status, message
            )));
        }

        let result: ImageGenerationResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        result
            .data
            .first()
            .and_then(|d| d.url.clone())
            .ok_or_else(|| Error::Inference("Image generation returned no URL".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RemoteModelConfig::default();
        assert_eq!(config.base_url, OPENAI_URL);
        assert_eq!(config.chat_model, CHAT_MODEL);
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout_seconds, MODEL_TIMEOUT_SECS);
    }

    #[test]
    fn test_backend_exposes_model_names() {
        let backend = OpenAiBackend::new(RemoteModelConfig {
            chat_model: "chat-x".to_string(),
            vision_model: "vision-y".to_string(),
            ..RemoteModelConfig::default()
        })
        .unwrap();

        assert_eq!(GenerationBackend::model_name(&backend), "chat-x");
        assert_eq!(VisionBackend::model_name(&backend), "vision-y");
    }

    #[test]
    fn test_role_tags() {
        assert_eq!(role_tag(MessageRole::System), "system");
        assert_eq!(role_tag(MessageRole::User), "user");
        assert_eq!(role_tag(MessageRole::Assistant), "assistant");
    }
}
