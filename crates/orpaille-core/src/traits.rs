//! Core traits for orpaille abstractions.
//!
//! These traits define the seams between the pipeline and its three
//! upstream services, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AreaScan, ChatRequest, CityLocation, Coordinates};

// =============================================================================
// GEO LOOKUP TRAITS
// =============================================================================

/// Provider of geocoding and map-data lookups.
///
/// The first two operations fail soft: any transport or parse failure
/// yields an empty result, never an error. Only the secondary river
/// resolver reports failure, because its caller must distinguish "no
/// coordinate" from "pick this coordinate".
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Resolve a free-text place query to up to five city candidates.
    async fn city_suggestions(&self, query: &str) -> Vec<CityLocation>;

    /// Enumerate named waterways and settlement nodes within `radius_km`
    /// of a point.
    async fn waterways_and_places(&self, lat: f64, lon: f64, radius_km: f64) -> AreaScan;

    /// Resolve a coordinate on the named river, preferring confluence and
    /// meander interest points.
    async fn river_coordinates(
        &self,
        river_name: &str,
        lat: f64,
        lon: f64,
        radius_km: f64,
    ) -> Result<Coordinates>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for chat completion against the remote generative model.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run one chat completion and return the assistant's text.
    async fn complete(&self, request: ChatRequest) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// One image-analysis request against the remote model.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// System instruction framing the analysis.
    pub system: String,
    /// User text accompanying the image.
    pub prompt: String,
    /// `data:image/...;base64,` payload or https URL.
    pub image_url: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ask the endpoint to constrain output to a JSON object.
    pub json_reply: bool,
}

/// Backend for describing images with a vision-capable model.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Analyze one image and return the model's text.
    async fn describe_image(&self, request: VisionRequest) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Backend for generating an image from a text prompt.
#[async_trait]
pub trait ImageGenerationBackend: Send + Sync {
    /// Generate one image and return its URL.
    async fn generate_image(&self, prompt: &str) -> Result<String>;
}
