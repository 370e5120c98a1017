//! Geocoding client for the Google Geocoding API
//!
//! Resolves a free-text address to candidate locations. An empty candidate
//! list is a normal outcome; transport failures, non-success HTTP statuses
//! and error statuses reported by the API are errors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::GeocodingConfig;
use crate::models::Location;
use crate::{ForageError, Result};

/// Turns a free-text address into candidate locations, best match first.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Vec<Location>>;
}

/// Google Geocoding API client
pub struct GoogleGeocoder {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Geocoding response from Google
#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodingResult>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResult {
    #[serde(default)]
    pub formatted_address: String,
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<GeocodingResult> for Location {
    fn from(result: GeocodingResult) -> Self {
        Location::new(
            result.formatted_address,
            result.geometry.location.lat,
            result.geometry.location.lng,
        )
    }
}

impl GeocodingResponse {
    /// Convert the API envelope into candidate locations.
    ///
    /// `ZERO_RESULTS` is an empty list, any other non-`OK` status is an error.
    pub fn into_locations(self) -> Result<Vec<Location>> {
        match self.status.as_str() {
            "OK" => Ok(self.results.into_iter().map(Location::from).collect()),
            "ZERO_RESULTS" => Ok(Vec::new()),
            status => Err(ForageError::geocoding(format!(
                "geocoder returned status {status}: {}",
                self.error_message.unwrap_or_default()
            ))),
        }
    }
}

impl GoogleGeocoder {
    /// Create a new geocoding client
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ForageError::config("Geocoding API key is not configured"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("ForageGuide/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ForageError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Vec<Location>> {
        let url = format!(
            "{}/geocode/json?address={}&key={}",
            self.base_url,
            urlencoding::encode(address),
            self.api_key
        );
        debug!("Calling the geocoding API");

        let response = self
            .client
            .get(url)
            .send()
            .await
            // the URL carries the API key
            .map_err(|e| ForageError::geocoding(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ForageError::geocoding(format!(
                "geocoding API error {status}: {error_text}"
            )));
        }

        let body: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| {
                ForageError::geocoding(format!("failed to parse response: {}", e.without_url()))
            })?;

        let locations = body.into_locations()?;
        debug!(candidates = locations.len(), "Geocoding finished");
        Ok(locations)
    }
}
