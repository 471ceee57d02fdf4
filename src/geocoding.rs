//! Location Resolution Module
//!
//! Turns free-text place names into coordinates through a Nominatim-compatible
//! search API. Every failure (no match, unreachable service, unparsable
//! answer) surfaces as [`FareError::LocationNotFound`]; the cause is logged.

use crate::config::GeocodingConfig;
use crate::models::{Coordinate, Place};
use crate::{FareError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Resolves a place name to a single best coordinate
#[allow(async_fn_in_trait)]
pub trait Geocoder {
    async fn resolve(&self, name: &str) -> Result<Place>;
}

/// Nominatim search client
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FareError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self, name), fields(location = name))]
    async fn resolve(&self, name: &str) -> Result<Place> {
        let query = name.trim();
        if query.is_empty() {
            return Err(FareError::validation("Location cannot be empty"));
        }

        info!("Geocoding location: '{}'", query);
        let start_time = Instant::now();

        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| {
                warn!("Geocoding request for '{}' failed: {}", query, e);
                FareError::location_not_found(query)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Geocoding service answered {} for '{}'", status, query);
            return Err(FareError::location_not_found(query));
        }

        let results: Vec<NominatimResult> = response.json().await.map_err(|e| {
            warn!("Failed to parse geocoding response for '{}': {}", query, e);
            FareError::location_not_found(query)
        })?;

        let place = best_match(query, results).ok_or_else(|| {
            warn!("No results found for location '{}'", query);
            FareError::location_not_found(query)
        })?;

        debug!(
            "Resolved '{}' to {} in {:.3}s",
            query,
            place.coordinate,
            start_time.elapsed().as_secs_f64()
        );

        Ok(place)
    }
}

/// One entry of a Nominatim `jsonv2` search response. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
pub struct NominatimResult {
    pub lat: String,
    pub lon: String,
    pub display_name: Option<String>,
}

/// Pick the first (best) result, skipping nothing: an unparsable first hit is a miss.
pub fn best_match(query: &str, results: Vec<NominatimResult>) -> Option<Place> {
    let first = results.into_iter().next()?;
    let latitude: f64 = first.lat.trim().parse().ok()?;
    let longitude: f64 = first.lon.trim().parse().ok()?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }

    Some(Place {
        query: query.to_string(),
        display_name: first.display_name,
        coordinate: Coordinate::new(latitude, longitude),
    })
}
