//! Response validation and normalization.
//!
//! The remote model is an untrusted producer: the JSON contract lives in
//! prompt wording only, so every reply is parsed defensively, every
//! numeric score clamped, every missing field replaced with a fixed
//! placeholder, and every claimed river name reconciled against the
//! waterway candidates actually observed on the map.

use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use orpaille_core::defaults::{RATING_MAX, RATING_MIN};
use orpaille_core::models::{
    CityLocation, Coordinates, GoldLocation, GoldSearchResult, Hotspot, ProspectionSpot,
    RatingDetails, WaterwayCandidate,
};
use orpaille_core::traits::GeoProvider;
use orpaille_core::{Error, Result};

/// Placeholder for an absent description.
pub const DESCRIPTION_PLACEHOLDER: &str = "Description non disponible";
/// Placeholder for an absent river name.
pub const RIVER_PLACEHOLDER: &str = "Cours d'eau inconnu";
/// Placeholder for absent geological data.
pub const GEOLOGY_PLACEHOLDER: &str = "Données géologiques non disponibles";
/// Placeholder for an absent distance.
pub const DISTANCE_PLACEHOLDER: &str = "Distance inconnue";
/// Placeholder for absent historical data.
pub const HISTORY_PLACEHOLDER: &str = "Données historiques non disponibles";
/// Default waterway kind.
pub const DEFAULT_KIND: &str = "rivière";

/// Requested result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Ascending parsed numeric distance.
    #[default]
    Distance,
    /// Descending rating.
    Rating,
}

/// Pagination window, 0-based.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

/// Everything the validator needs to reconcile one reply.
pub struct ValidationContext<'a> {
    pub geo: &'a dyn GeoProvider,
    pub candidates: &'a [WaterwayCandidate],
    pub city: &'a CityLocation,
    pub radius_km: f64,
    /// `isMainSpot` assigned to sites that omit it.
    pub default_main: bool,
}

// =============================================================================
// RAW REPLY SHAPES
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSite {
    #[serde(default)]
    river: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    geology: Option<String>,
    #[serde(default)]
    distance: Option<String>,
    #[serde(default)]
    rating: Option<JsonValue>,
    #[serde(default)]
    rating_details: Option<RawRatingDetails>,
    #[serde(default)]
    hotspots: Option<Vec<RawHotspot>>,
    #[serde(default)]
    prospection_spots: Option<Vec<RawProspectionSpot>>,
    #[serde(default)]
    is_main_spot: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRatingDetails {
    #[serde(default)]
    forum_mentions: Option<JsonValue>,
    #[serde(default)]
    historical_data: Option<String>,
    #[serde(default)]
    geological_score: Option<JsonValue>,
    #[serde(default)]
    accessibility: Option<JsonValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHotspot {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    coordinates: Option<[f64; 2]>,
    #[serde(default)]
    rationale: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProspectionSpot {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    coordinates: Option<[f64; 2]>,
    #[serde(default)]
    priority: Option<JsonValue>,
    #[serde(default)]
    geological_features: Option<Vec<String>>,
}

/// Top-level reply contract: a bare array of sites, or the tiered object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ModelReply {
    Sites(Vec<RawSite>),
    Tiered(RawTiered),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTiered {
    #[serde(default)]
    main_spots: Vec<RawSite>,
    #[serde(default)]
    secondary_spots: Vec<RawSite>,
    #[serde(default)]
    has_more_results: bool,
}

// =============================================================================
// SCORE CLAMPING
// =============================================================================

/// Clamp a raw score to the closed rating range: `min(5, max(1, round(x)))`.
/// Non-finite input (NaN, infinities) collapses to the minimum.
pub fn clamp_score(x: f64) -> u8 {
    if !x.is_finite() {
        return RATING_MIN;
    }
    (x.round() as i64).clamp(RATING_MIN as i64, RATING_MAX as i64) as u8
}

/// Clamp a score taken from loosely typed JSON; absent or non-numeric
/// values default to the minimum before clamping.
fn score_from_json(value: Option<&JsonValue>) -> u8 {
    clamp_score(
        value
            .and_then(JsonValue::as_f64)
            .unwrap_or(RATING_MIN as f64),
    )
}

/// Numeric value of a free-text distance: the concatenated ASCII digits,
/// or 0 when there are none ("unknown" sorts first).
pub fn distance_value(distance: &str) -> u64 {
    let digits: String = distance.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Slice out one 0-based page, clamped to the sequence bounds.
pub fn paginate<T: Clone>(items: &[T], page: &PageRequest) -> Vec<T> {
    let start = page.page.saturating_mul(page.page_size).min(items.len());
    let end = start.saturating_add(page.page_size).min(items.len());
    items[start..end].to_vec()
}

/// Sort sites in place by the requested order.
pub fn sort_sites(sites: &mut [GoldLocation], sort_by: SortBy) {
    match sort_by {
        SortBy::Distance => sites.sort_by_key(|s| distance_value(&s.distance)),
        SortBy::Rating => sites.sort_by_key(|s| std::cmp::Reverse(s.rating)),
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Parse, reconcile, normalize, sort, and paginate one raw model reply.
///
/// The whole batch fails if any site's river can be matched neither to a
/// gathered candidate nor by the secondary resolver.
pub async fn validate_reply(
    raw: &str,
    ctx: &ValidationContext<'_>,
    sort_by: SortBy,
    page: &PageRequest,
) -> Result<GoldSearchResult> {
    let reply: ModelReply = serde_json::from_str(raw)
        .map_err(|e| Error::InvalidModelReply(format!("unexpected reply shape: {}", e)))?;

    let (raw_main, raw_secondary, has_more) = match reply {
        ModelReply::Sites(sites) => {
            // Legacy bare-array shape: tier each site by its own flag,
            // defaulting to the caller's context. No self-reported
            // "more results" flag exists in this shape.
            let mut main = Vec::new();
            let mut secondary = Vec::new();
            for site in sites {
                if site.is_main_spot.unwrap_or(ctx.default_main) {
                    main.push(site);
                } else {
                    secondary.push(site);
                }
            }
            (main, secondary, false)
        }
        ModelReply::Tiered(tiered) => (
            tiered.main_spots,
            tiered.secondary_spots,
            // Taken verbatim from the model's self-report, not recomputed
            // from slice bounds.
            tiered.has_more_results,
        ),
    };

    let mut main_spots = Vec::with_capacity(raw_main.len());
    for site in raw_main {
        main_spots.push(validate_site(site, ctx, true).await?);
    }
    let mut secondary_spots = Vec::with_capacity(raw_secondary.len());
    for site in raw_secondary {
        secondary_spots.push(validate_site(site, ctx, false).await?);
    }

    sort_sites(&mut main_spots, sort_by);
    sort_sites(&mut secondary_spots, sort_by);

    debug!(
        main = main_spots.len(),
        secondary = secondary_spots.len(),
        has_more,
        "reply validated"
    );

    Ok(GoldSearchResult {
        main_spots: paginate(&main_spots, page),
        secondary_spots: paginate(&secondary_spots, page),
        has_more_results: has_more,
    })
}

async fn validate_site(
    raw: RawSite,
    ctx: &ValidationContext<'_>,
    is_main: bool,
) -> Result<GoldLocation> {
    let river = raw
        .river
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| RIVER_PLACEHOLDER.to_string());

    // The model's own coordinates are never trusted. An exact
    // (case-insensitive) candidate match wins; otherwise the secondary
    // resolver must find the river, and its failure aborts the batch.
    let coordinates = match ctx
        .candidates
        .iter()
        .find(|c| c.name.to_lowercase() == river.to_lowercase())
    {
        Some(candidate) => candidate.coordinates,
        None => {
            warn!(river = %river, "river not among candidates, using secondary resolver");
            ctx.geo
                .river_coordinates(&river, ctx.city.lat, ctx.city.lon, ctx.radius_km)
                .await?
        }
    };

    let details = raw.rating_details.unwrap_or_default();
    let forum_mentions = match details.forum_mentions {
        Some(JsonValue::Array(values)) => values
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    Ok(GoldLocation {
        river,
        kind: raw.kind.unwrap_or_else(|| DEFAULT_KIND.to_string()),
        coordinates,
        description: raw
            .description
            .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string()),
        geology: raw
            .geology
            .unwrap_or_else(|| GEOLOGY_PLACEHOLDER.to_string()),
        distance: raw
            .distance
            .unwrap_or_else(|| DISTANCE_PLACEHOLDER.to_string()),
        rating: score_from_json(raw.rating.as_ref()),
        rating_details: RatingDetails {
            forum_mentions,
            historical_data: details
                .historical_data
                .unwrap_or_else(|| HISTORY_PLACEHOLDER.to_string()),
            geological_score: score_from_json(details.geological_score.as_ref()),
            accessibility: score_from_json(details.accessibility.as_ref()),
        },
        hotspots: raw
            .hotspots
            .unwrap_or_default()
            .into_iter()
            .filter_map(hotspot_from_raw)
            .collect(),
        prospection_spots: raw
            .prospection_spots
            .unwrap_or_default()
            .into_iter()
            .filter_map(prospection_from_raw)
            .collect(),
        is_main_spot: raw.is_main_spot.unwrap_or(is_main),
    })
}

fn hotspot_from_raw(raw: RawHotspot) -> Option<Hotspot> {
    Some(Hotspot {
        name: raw.name.filter(|n| !n.is_empty())?,
        coordinates: Coordinates::from(raw.coordinates?),
        rationale: raw.rationale.unwrap_or_else(|| "Non renseigné".to_string()),
        source: raw.source.unwrap_or_else(|| "Source inconnue".to_string()),
    })
}

fn prospection_from_raw(raw: RawProspectionSpot) -> Option<ProspectionSpot> {
    Some(ProspectionSpot {
        name: raw.name.filter(|n| !n.is_empty())?,
        coordinates: Coordinates::from(raw.coordinates?),
        priority: raw
            .priority
            .as_ref()
            .and_then(JsonValue::as_u64)
            .unwrap_or(1) as u32,
        geological_features: raw.geological_features.unwrap_or_default(),
    })
}
