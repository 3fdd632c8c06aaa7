//! # orpaille-geo
//!
//! Geocoding and map-data clients for orpaille.
//!
//! This crate provides:
//! - [`NominatimClient`] — free-text place query to city candidates
//! - [`OverpassClient`] — waterway/settlement area scans and the
//!   secondary river-coordinate resolver
//! - [`GeoClient`] — both behind the [`GeoProvider`] seam
//!
//! All lookups except the river resolver fail soft, returning empty
//! results instead of errors.

pub mod nominatim;
pub mod overpass;

use async_trait::async_trait;

use orpaille_core::models::{AreaScan, CityLocation, Coordinates};
use orpaille_core::{GeoProvider, Result};

pub use nominatim::NominatimClient;
pub use overpass::OverpassClient;

/// Combined geocoding + map-data client.
pub struct GeoClient {
    nominatim: NominatimClient,
    overpass: OverpassClient,
}

impl GeoClient {
    /// Create a client against the public endpoints.
    pub fn new() -> Self {
        Self {
            nominatim: NominatimClient::new(),
            overpass: OverpassClient::new(),
        }
    }

    /// Create from explicit sub-clients (tests, mirrors).
    pub fn from_parts(nominatim: NominatimClient, overpass: OverpassClient) -> Self {
        Self { nominatim, overpass }
    }
}

impl Default for GeoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeoProvider for GeoClient {
    async fn city_suggestions(&self, query: &str) -> Vec<CityLocation> {
        self.nominatim.city_suggestions(query).await
    }

    async fn waterways_and_places(&self, lat: f64, lon: f64, radius_km: f64) -> AreaScan {
        self.overpass.waterways_and_places(lat, lon, radius_km).await
    }

    async fn river_coordinates(
        &self,
        river_name: &str,
        lat: f64,
        lon: f64,
        radius_km: f64,
    ) -> Result<Coordinates> {
        self.overpass
            .river_coordinates(river_name, lat, lon, radius_km)
            .await
    }
}
