//! # orpaille-inference
//!
//! Remote generative-model backend abstraction for orpaille.
//!
//! This crate provides:
//! - An OpenAI-compatible backend implementing the three seams defined in
//!   orpaille-core: chat completion, image analysis, image generation
//! - A call-logged mock backend for deterministic tests (feature `mock`)
//!
//! The remote model is treated as an untrusted producer: callers request
//! JSON via the prompt and `response_format`, but every reply is still
//! validated before any field is trusted.

pub mod openai;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core seams so consumers need only this crate for backends
pub use orpaille_core::traits::{
    GenerationBackend, ImageGenerationBackend, VisionBackend, VisionRequest,
};

pub use openai::{OpenAiBackend, RemoteModelConfig};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockBackend;
