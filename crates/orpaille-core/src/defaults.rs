//! Centralized default constants for the orpaille system.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// CACHE
// =============================================================================

/// Result-cache freshness window in seconds (one hour).
pub const CACHE_TTL_SECS: i64 = 60 * 60;

// =============================================================================
// GEOCODING
// =============================================================================

/// Default geocoding (Nominatim) endpoint.
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Minimum query length before the geocoder is consulted.
pub const MIN_CITY_QUERY_LEN: usize = 3;

/// Maximum number of city suggestions returned.
pub const MAX_CITY_SUGGESTIONS: usize = 5;

/// Country filter for geocoding queries.
pub const GEOCODING_COUNTRY: &str = "fr";

// =============================================================================
// MAP DATA
// =============================================================================

/// Default map-data (Overpass) endpoint.
pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Radius in meters for the neighbor-waterway scan of the river resolver.
pub const RIVER_NEIGHBOR_RADIUS_M: u32 = 1000;

/// Minimum bearing change (radians) for an interior node to count as a
/// meander interest point. 45 degrees.
pub const MEANDER_MIN_ANGLE_RAD: f64 = std::f64::consts::FRAC_PI_4;

/// Timeout for geocoding and map-data requests, in seconds.
pub const GEO_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// REMOTE MODEL
// =============================================================================

/// Default OpenAI-compatible API endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default chat/search model.
pub const CHAT_MODEL: &str = "gpt-4o";

/// Default vision model.
pub const VISION_MODEL: &str = "gpt-4o";

/// Default image-generation model.
pub const IMAGE_MODEL: &str = "dall-e-3";

/// Timeout for remote-model requests, in seconds.
pub const MODEL_TIMEOUT_SECS: u64 = 300;

/// Environment variable holding the remote-model credential.
pub const ENV_API_KEY: &str = "ORPAILLE_API_KEY";

/// Environment variable overriding the remote-model endpoint.
pub const ENV_BASE_URL: &str = "ORPAILLE_BASE_URL";

// =============================================================================
// SEARCH SAMPLING
// =============================================================================

/// Low temperature for the search pipeline (favor determinism).
pub const SEARCH_TEMPERATURE: f32 = 0.1;

/// Output-length budget for search replies.
pub const SEARCH_MAX_TOKENS: u32 = 4096;

/// Presence and frequency penalty for search replies.
pub const SEARCH_PENALTY: f32 = 0.3;

// =============================================================================
// CHAT SAMPLING
// =============================================================================

/// Moderate temperature for the conversational assistant.
pub const CHAT_TEMPERATURE: f32 = 0.7;

/// Output-length budget for chat replies.
pub const CHAT_MAX_TOKENS: u32 = 1000;

/// Presence penalty for chat replies.
pub const CHAT_PRESENCE_PENALTY: f32 = 0.6;

/// Frequency penalty for chat replies.
pub const CHAT_FREQUENCY_PENALTY: f32 = 0.3;

// =============================================================================
// RATINGS & PAGINATION
// =============================================================================

/// Lower bound of every rating and sub-score.
pub const RATING_MIN: u8 = 1;

/// Upper bound of every rating and sub-score.
pub const RATING_MAX: u8 = 5;

/// Rating assigned to the synthetic fallback result.
pub const FALLBACK_RATING: u8 = 3;

/// Default number of sites per page.
pub const PAGE_SIZE: usize = 1;
