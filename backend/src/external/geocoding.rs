//! Geocoding client for place-name search
//!
//! Integrates with a Nominatim-compatible search API. Used only to re-center
//! the map view; lookup failures are reported upward and swallowed at the
//! handler boundary.

use reqwest::Client;
use serde::Deserialize;

use shared::GpsCoordinates;

use crate::config::GeocodingConfig;
use crate::error::{AppError, AppResult};

/// Geocoding API client
#[derive(Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
    user_agent: String,
}

/// One search hit from the API
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl GeocodingClient {
    pub fn new(config: &GeocodingConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_endpoint.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// Resolve a free-text place query to coordinates.
    ///
    /// Returns `None` when the query matched nothing; network or decode
    /// failures surface as `GeocodingUnavailable`.
    pub async fn search(&self, query: &str) -> AppResult<Option<GpsCoordinates>> {
        let response = self
            .client
            .get(&self.base_url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Geocoding request failed: {}", e);
                AppError::GeocodingUnavailable
            })?;

        if !response.status().is_success() {
            tracing::warn!("Geocoding returned status {}", response.status());
            return Err(AppError::GeocodingUnavailable);
        }

        let places: Vec<NominatimPlace> = response.json().await.map_err(|e| {
            tracing::warn!("Geocoding response could not be decoded: {}", e);
            AppError::GeocodingUnavailable
        })?;

        let coordinates = places.first().and_then(|place| {
            let latitude = place.lat.parse::<f64>().ok()?;
            let longitude = place.lon.parse::<f64>().ok()?;
            Some(GpsCoordinates::new(latitude, longitude))
        });

        Ok(coordinates)
    }
}
