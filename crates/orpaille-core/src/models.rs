//! Core data models for orpaille.
//!
//! These types are shared across all orpaille crates and represent the
//! domain entities: geocoded cities, waterway candidates from the map-data
//! service, validated gold locations, and chat transcripts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// GEOGRAPHIC TYPES
// =============================================================================

/// A latitude/longitude pair.
///
/// Serialized as a two-element `[lat, lon]` array for wire compatibility
/// with the model reply format and the map-data service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from(v: [f64; 2]) -> Self {
        Self { lat: v[0], lon: v[1] }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lat, c.lon]
    }
}

/// A city resolved from a free-text location query.
///
/// Immutable once created; only used to seed a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityLocation {
    /// City display name.
    pub name: String,
    /// Administrative region (département) label.
    pub region: String,
    /// Composite display string, `"{name} ({region})"`.
    pub full_name: String,
    pub lat: f64,
    pub lon: f64,
}

/// A named waterway discovered by the area scan, with one representative
/// coordinate (the middle node of its point sequence).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterwayCandidate {
    pub name: String,
    /// Waterway tag value: river, stream, ...
    pub kind: String,
    pub coordinates: Coordinates,
}

/// A named settlement node (hamlet, village, locality) from the area scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceNode {
    pub name: String,
    /// Place tag value: hamlet, village, locality.
    pub kind: String,
    pub coordinates: Coordinates,
}

/// Result of one area scan: waterways and settlement nodes within a radius.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AreaScan {
    pub waterways: Vec<WaterwayCandidate>,
    pub places: Vec<PlaceNode>,
}

// =============================================================================
// GOLD LOCATION TYPES
// =============================================================================

/// Sub-scores backing a location's overall rating.
///
/// `geological_score` and `accessibility` are always clamped to `1..=5`
/// during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingDetails {
    /// Forum/community references backing the rating.
    pub forum_mentions: Vec<String>,
    /// Free-text historical record.
    pub historical_data: String,
    /// Geological favorability, 1-5.
    pub geological_score: u8,
    /// Access difficulty, 1-5.
    pub accessibility: u8,
}

/// A named point of interest within a gold location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub name: String,
    pub coordinates: Coordinates,
    /// Why this point is promising.
    pub rationale: String,
    /// Which source mentioned it.
    pub source: String,
}

/// A priority-ranked sub-location within a gold location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProspectionSpot {
    pub name: String,
    pub coordinates: Coordinates,
    /// 1 = try first.
    pub priority: u32,
    pub geological_features: Vec<String>,
}

/// A validated gold-bearing location on a waterway.
///
/// Constructed fresh per search response and never mutated after
/// validation. The overall `rating` is always within `1..=5`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldLocation {
    /// Exact waterway name.
    pub river: String,
    /// Waterway kind: rivière, ruisseau, torrent.
    #[serde(rename = "type")]
    pub kind: String,
    /// A point on the waterway bed.
    pub coordinates: Coordinates,
    pub description: String,
    /// Geological context note.
    pub geology: String,
    /// Free-text distance from the searched city, e.g. "15 km".
    pub distance: String,
    /// Overall rating, 1-5.
    pub rating: u8,
    pub rating_details: RatingDetails,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hotspots: Vec<Hotspot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prospection_spots: Vec<ProspectionSpot>,
    /// Model-assigned tiering: top-ranked vs supplementary.
    #[serde(default)]
    pub is_main_spot: bool,
}

/// One page of search results: main and secondary spots plus the model's
/// self-reported "more results may exist" flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldSearchResult {
    pub main_spots: Vec<GoldLocation>,
    pub secondary_spots: Vec<GoldLocation>,
    pub has_more_results: bool,
}

// =============================================================================
// CHAT TYPES
// =============================================================================

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One entry in a conversation transcript. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ChatMessage {
    /// Create a user message stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            image_url: None,
        }
    }

    /// Create an assistant message stamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            sender: Sender::Assistant,
            timestamp: Utc::now(),
            image_url: None,
        }
    }
}

// =============================================================================
// MODEL REQUEST TYPES
// =============================================================================

/// Role tag for a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One role-tagged message in a model request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: MessageRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: MessageRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Assistant, content: content.into() }
    }
}

/// Sampling parameters and transcript for one chat-completion call.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<PromptMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,
    /// Ask the endpoint to constrain output to a JSON object.
    pub json_reply: bool,
}

impl ChatRequest {
    /// Request with no sampling overrides.
    pub fn new(messages: Vec<PromptMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
            presence_penalty: None,
            frequency_penalty: None,
            json_reply: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_roundtrip_as_array() {
        let c = Coordinates::new(43.213, 2.3491);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "[43.213,2.3491]");

        let back: Coordinates = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_gold_location_wire_format() {
        let loc = GoldLocation {
            river: "L'Aude".to_string(),
            kind: "rivière".to_string(),
            coordinates: Coordinates::new(43.213, 2.3491),
            description: "desc".to_string(),
            geology: "geo".to_string(),
            distance: "0 km".to_string(),
            rating: 4,
            rating_details: RatingDetails {
                forum_mentions: vec!["GuppyOr".to_string()],
                historical_data: "hist".to_string(),
                geological_score: 4,
                accessibility: 5,
            },
            hotspots: vec![],
            prospection_spots: vec![],
            is_main_spot: true,
        };

        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["type"], "rivière");
        assert_eq!(json["ratingDetails"]["geologicalScore"], 4);
        assert_eq!(json["coordinates"][0], 43.213);
        // Empty optional collections stay off the wire
        assert!(json.get("hotspots").is_none());
    }

    #[test]
    fn test_gold_location_accepts_missing_optional_collections() {
        let json = r#"{
            "river": "L'Orbiel",
            "type": "rivière",
            "coordinates": [43.3119, 2.2275],
            "description": "d",
            "geology": "g",
            "distance": "15 km",
            "rating": 5,
            "ratingDetails": {
                "forumMentions": [],
                "historicalData": "h",
                "geologicalScore": 5,
                "accessibility": 4
            }
        }"#;

        let loc: GoldLocation = serde_json::from_str(json).unwrap();
        assert!(loc.hotspots.is_empty());
        assert!(loc.prospection_spots.is_empty());
        assert!(!loc.is_main_spot);
    }

    #[test]
    fn test_search_result_default_is_empty() {
        let result = GoldSearchResult::default();
        assert!(result.main_spots.is_empty());
        assert!(result.secondary_spots.is_empty());
        assert!(!result.has_more_results);
    }

    #[test]
    fn test_chat_message_constructors() {
        let user = ChatMessage::user("bonjour");
        assert_eq!(user.sender, Sender::User);
        assert!(user.image_url.is_none());

        let reply = ChatMessage::assistant("salut");
        assert_eq!(reply.sender, Sender::Assistant);
        assert_ne!(user.id, reply.id);
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&MessageRole::System).unwrap(),
            "\"system\""
        );
    }

    #[test]
    fn test_chat_request_new_has_no_overrides() {
        let req = ChatRequest::new(vec![PromptMessage::user("hi")]);
        assert!(req.temperature.is_none());
        assert!(req.max_tokens.is_none());
        assert!(!req.json_reply);
    }
}
