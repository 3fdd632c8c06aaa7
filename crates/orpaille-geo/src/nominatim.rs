//! Geocoding client: free-text place query to city candidates.
//!
//! Wraps a Nominatim-compatible search endpoint. This lookup fails soft:
//! a short query, a transport failure, or an unparsable body all yield an
//! empty suggestion list, never an error.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use orpaille_core::defaults::{
    GEOCODING_COUNTRY, GEO_TIMEOUT_SECS, MAX_CITY_SUGGESTIONS, MIN_CITY_QUERY_LEN, NOMINATIM_URL,
};
use orpaille_core::models::CityLocation;

/// One entry of the geocoder's JSON reply.
#[derive(Debug, Deserialize)]
struct NominatimEntry {
    #[serde(default)]
    name: Option<String>,
    lat: String,
    lon: String,
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    county: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

/// Client for the geocoding service.
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    /// Create a client against the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(NOMINATIM_URL.to_string())
    }

    /// Create a client against an explicit endpoint (tests, mirrors).
    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(GEO_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self { client, base_url }
    }

    /// Resolve a free-text query to up to five city candidates.
    ///
    /// Entries lacking either a city name or an administrative region are
    /// dropped.
    pub async fn city_suggestions(&self, query: &str) -> Vec<CityLocation> {
        if query.chars().count() < MIN_CITY_QUERY_LEN {
            return Vec::new();
        }

        match self.fetch_suggestions(query).await {
            Ok(cities) => {
                debug!(
                    query,
                    result_count = cities.len(),
                    "resolved city suggestions"
                );
                cities
            }
            Err(e) => {
                warn!(query, error = %e, "city suggestion lookup failed, returning empty");
                Vec::new()
            }
        }
    }

    async fn fetch_suggestions(&self, query: &str) -> reqwest::Result<Vec<CityLocation>> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let entries: Vec<NominatimEntry> = self
            .client
            .get(&url)
            .query(&[
                ("format", "json"),
                ("q", query),
                ("limit", &MAX_CITY_SUGGESTIONS.to_string()),
                ("addressdetails", "1"),
                ("countrycodes", GEOCODING_COUNTRY),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(entries
            .into_iter()
            .filter_map(city_from_entry)
            .take(MAX_CITY_SUGGESTIONS)
            .collect())
    }
}

impl Default for NominatimClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a [`CityLocation`] from one geocoder entry, preferring
/// city over town over village over the entry's bare name, and county
/// over state for the region label.
fn city_from_entry(entry: NominatimEntry) -> Option<CityLocation> {
    let name = entry
        .address
        .city
        .or(entry.address.town)
        .or(entry.address.village)
        .or(entry.name)
        .filter(|n| !n.is_empty())?;
    let region = entry
        .address
        .county
        .or(entry.address.state)
        .filter(|r| !r.is_empty())?;

    let lat = entry.lat.parse::<f64>().ok()?;
    let lon = entry.lon.parse::<f64>().ok()?;

    let full_name = format!("{} ({})", name, region);
    Some(CityLocation {
        name,
        region,
        full_name,
        lat,
        lon,
    })
}
