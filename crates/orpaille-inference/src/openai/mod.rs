//! OpenAI-compatible backend: chat completion, image analysis, and image
//! generation against one configurable endpoint.

mod backend;
mod types;

pub use backend::{OpenAiBackend, RemoteModelConfig};
pub use types::{
    ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse, ContentPart, ImageUrl,
    ResponseFormat, WireContent, WireMessage,
};
