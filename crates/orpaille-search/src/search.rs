//! The location-enrichment pipeline.
//!
//! Orchestrates fixture lookup, cache, geocoding, the area scan, prompt
//! composition, the remote-model call, and validation into one search
//! operation. Upstream failures degrade to a synthetic default result;
//! only input rejection (an unresolvable location) surfaces as an error.

use std::sync::Arc;

use tracing::{debug, info, warn};

use orpaille_core::cache::{CacheKey, TtlCache};
use orpaille_core::defaults::{
    FALLBACK_RATING, PAGE_SIZE, SEARCH_MAX_TOKENS, SEARCH_PENALTY, SEARCH_TEMPERATURE,
};
use orpaille_core::models::{
    AreaScan, ChatRequest, CityLocation, Coordinates, GoldLocation, GoldSearchResult,
    PromptMessage, RatingDetails,
};
use orpaille_core::traits::{GenerationBackend, GeoProvider};
use orpaille_core::{Error, Result};

use crate::fixtures;
use crate::prompt;
use crate::sources::combined_sources;
use crate::validate::{
    validate_reply, PageRequest, SortBy, ValidationContext, DEFAULT_KIND,
};

/// Options for one gold-location search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Search radius in kilometers.
    pub radius_km: f64,
    pub sort_by: SortBy,
    /// 0-based page index.
    pub page: usize,
    pub page_size: usize,
    /// Ask the model for top-ranked spots.
    pub include_main: bool,
    /// Ask the model for supplementary spots.
    pub include_secondary: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            radius_km: 50.0,
            sort_by: SortBy::default(),
            page: 0,
            page_size: PAGE_SIZE,
            include_main: true,
            include_secondary: true,
        }
    }
}

/// Strip any parenthetical suffix from a location string and trim it:
/// `"Tuchan (Aude)"` becomes `"Tuchan"`.
pub fn normalize_location(location: &str) -> String {
    location
        .split('(')
        .next()
        .unwrap_or(location)
        .trim()
        .to_string()
}

/// The enrichment pipeline service.
pub struct GoldSearchService {
    geo: Arc<dyn GeoProvider>,
    model: Arc<dyn GenerationBackend>,
    cache: Arc<TtlCache<GoldSearchResult>>,
}

impl GoldSearchService {
    pub fn new(
        geo: Arc<dyn GeoProvider>,
        model: Arc<dyn GenerationBackend>,
        cache: Arc<TtlCache<GoldSearchResult>>,
    ) -> Self {
        Self { geo, model, cache }
    }

    /// Search for gold-bearing waterways around a location.
    ///
    /// The seeded fixture table bypasses everything else; a cached page is
    /// returned as-is within the freshness window; any model or
    /// validation failure degrades to the synthetic default result.
    pub async fn search_gold_locations(
        &self,
        location: &str,
        options: &SearchOptions,
    ) -> Result<GoldSearchResult> {
        let city_name = normalize_location(location);
        info!(location = %city_name, radius_km = options.radius_km, "gold search");

        if let Some(sites) = fixtures::known_rivers_for(&city_name) {
            debug!(location = %city_name, "serving seeded fixture entries");
            return Ok(GoldSearchResult {
                main_spots: sites,
                secondary_spots: Vec::new(),
                has_more_results: false,
            });
        }

        let key = CacheKey::new(&city_name, options.radius_km as u32, &cache_kind(options));
        if let Some(cached) = self.cache.get(&key) {
            debug!(location = %city_name, "cache hit");
            return Ok(cached);
        }

        let city = self
            .geo
            .city_suggestions(&city_name)
            .await
            .into_iter()
            .next()
            .ok_or_else(|| Error::LocationNotFound(city_name.clone()))?;

        let scan = self
            .geo
            .waterways_and_places(city.lat, city.lon, options.radius_km)
            .await;

        match self.query_model(&city_name, &city, &scan, options).await {
            Ok(result) => {
                self.cache.set(key, result.clone());
                Ok(result)
            }
            Err(e) => {
                warn!(location = %city_name, error = %e, "search degraded to synthetic default");
                Ok(fallback_result(&city_name, &city))
            }
        }
    }

    /// Search for undocumented but geologically plausible spots.
    ///
    /// Same skeleton as the main search with its own prompt and cache
    /// kind; results are flat and untiered.
    pub async fn search_unexplored(
        &self,
        location: &str,
        radius_km: f64,
    ) -> Result<Vec<GoldLocation>> {
        let city_name = normalize_location(location);
        info!(location = %city_name, radius_km, "unexplored search");

        let key = CacheKey::new(&city_name, radius_km as u32, "unknown_spots");
        if let Some(cached) = self.cache.get(&key) {
            return Ok(flatten(cached));
        }

        let city = self
            .geo
            .city_suggestions(&city_name)
            .await
            .into_iter()
            .next()
            .ok_or_else(|| Error::LocationNotFound(city_name.clone()))?;

        let scan = self
            .geo
            .waterways_and_places(city.lat, city.lon, radius_km)
            .await;

        let mut request = ChatRequest::new(vec![
            PromptMessage::system(prompt::unexplored_system_prompt(&city, radius_km)),
            PromptMessage::user(prompt::unexplored_user_prompt(
                &city_name,
                radius_km,
                &scan.waterways,
            )),
        ]);
        request.temperature = Some(SEARCH_TEMPERATURE);
        request.max_tokens = Some(SEARCH_MAX_TOKENS);
        request.presence_penalty = Some(SEARCH_PENALTY);
        request.frequency_penalty = Some(SEARCH_PENALTY);

        let validated = match self.model.complete(request).await {
            Ok(raw) => {
                let ctx = ValidationContext {
                    geo: self.geo.as_ref(),
                    candidates: &scan.waterways,
                    city: &city,
                    radius_km,
                    default_main: false,
                };
                // Untiered: no pagination window
                let everything = PageRequest { page: 0, page_size: usize::MAX };
                validate_reply(&raw, &ctx, SortBy::default(), &everything).await
            }
            Err(e) => Err(e),
        };

        match validated {
            Ok(result) => {
                self.cache.set(key, result.clone());
                Ok(flatten(result))
            }
            Err(e) => {
                warn!(location = %city_name, error = %e, "unexplored search degraded");
                Ok(vec![fallback_site(&city_name, &city, false)])
            }
        }
    }

    async fn query_model(
        &self,
        city_name: &str,
        city: &CityLocation,
        scan: &AreaScan,
        options: &SearchOptions,
    ) -> Result<GoldSearchResult> {
        let sources = combined_sources(&scan.waterways);
        let mut request = ChatRequest::new(vec![
            PromptMessage::system(prompt::search_system_prompt(
                &sources,
                city,
                options.radius_km,
            )),
            PromptMessage::user(prompt::search_user_prompt(
                city_name,
                city,
                options.radius_km,
                &scan.waterways,
                options.include_main,
                options.include_secondary,
            )),
        ]);
        request.temperature = Some(SEARCH_TEMPERATURE);
        request.max_tokens = Some(SEARCH_MAX_TOKENS);
        request.presence_penalty = Some(SEARCH_PENALTY);
        request.frequency_penalty = Some(SEARCH_PENALTY);

        let raw = self.model.complete(request).await?;

        let ctx = ValidationContext {
            geo: self.geo.as_ref(),
            candidates: &scan.waterways,
            city,
            radius_km: options.radius_km,
            default_main: true,
        };
        let page = PageRequest {
            page: options.page,
            page_size: options.page_size,
        };
        validate_reply(&raw, &ctx, options.sort_by, &page).await
    }
}

fn cache_kind(options: &SearchOptions) -> String {
    let sort = match options.sort_by {
        SortBy::Distance => "distance",
        SortBy::Rating => "rating",
    };
    format!(
        "gold_search:{}:{}:{}",
        sort, options.page, options.page_size
    )
}

fn flatten(result: GoldSearchResult) -> Vec<GoldLocation> {
    let mut all = result.main_spots;
    all.extend(result.secondary_spots);
    all
}

/// The synthetic default result presented when the model or the
/// validation of its reply fails.
fn fallback_result(city_name: &str, city: &CityLocation) -> GoldSearchResult {
    GoldSearchResult {
        main_spots: vec![fallback_site(city_name, city, true)],
        secondary_spots: Vec::new(),
        has_more_results: false,
    }
}

fn fallback_site(city_name: &str, city: &CityLocation, is_main: bool) -> GoldLocation {
    GoldLocation {
        river: format!("Cours d'eau près de {}", city_name),
        kind: DEFAULT_KIND.to_string(),
        coordinates: Coordinates::new(city.lat, city.lon),
        description: format!(
            "Les données n'ont pas pu être récupérées pour {}. Essayez d'élargir le \
             rayon de recherche ou réessayez plus tard.",
            city_name
        ),
        geology: "Données géologiques non disponibles".to_string(),
        distance: "0 km".to_string(),
        rating: FALLBACK_RATING,
        rating_details: RatingDetails {
            forum_mentions: Vec::new(),
            historical_data: "Données historiques non disponibles".to_string(),
            geological_score: FALLBACK_RATING,
            accessibility: FALLBACK_RATING,
        },
        hotspots: Vec::new(),
        prospection_spots: Vec::new(),
        is_main_spot: is_main,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_location_strips_parenthetical() {
        assert_eq!(normalize_location("Tuchan (Aude)"), "Tuchan");
        assert_eq!(normalize_location("  Carcassonne  "), "Carcassonne");
        assert_eq!(normalize_location("Lyon"), "Lyon");
    }

    #[test]
    fn test_default_options() {
        let options = SearchOptions::default();
        assert_eq!(options.radius_km, 50.0);
        assert_eq!(options.page, 0);
        assert_eq!(options.page_size, PAGE_SIZE);
        assert!(options.include_main);
        assert!(options.include_secondary);
    }

    #[test]
    fn test_cache_kind_distinguishes_pages_and_sort() {
        let mut options = SearchOptions::default();
        let page0 = cache_kind(&options);
        options.page = 1;
        let page1 = cache_kind(&options);
        options.sort_by = SortBy::Rating;
        let rated = cache_kind(&options);

        assert_ne!(page0, page1);
        assert_ne!(page1, rated);
    }

    #[test]
    fn test_fallback_result_shape() {
        let city = CityLocation {
            name: "Tuchan".to_string(),
            region: "Aude".to_string(),
            full_name: "Tuchan (Aude)".to_string(),
            lat: 42.8886,
            lon: 2.7196,
        };

        let result = fallback_result("Tuchan", &city);
        assert_eq!(result.main_spots.len(), 1);
        assert!(result.secondary_spots.is_empty());
        assert!(!result.has_more_results);

        let site = &result.main_spots[0];
        assert_eq!(site.rating, FALLBACK_RATING);
        assert!(site.river.contains("Tuchan"));
        assert_eq!(site.coordinates, Coordinates::new(42.8886, 2.7196));
        assert!(site.is_main_spot);
    }
}
