//! Forward geocoding: convert a place name to coordinates.
//! Uses Nominatim (OpenStreetMap) - free, no API key, but a User-Agent is required.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pogoda_types::GeoResult;

use crate::error::{Error, Result};
use crate::http::{self, DEFAULT_TIMEOUT_SECS};
use crate::traits::Geocoder;

/// Public Nominatim instance.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
/// Identifying User-Agent sent with every search.
pub const DEFAULT_USER_AGENT: &str = "WeatherApp/1.0";
/// Language for place names in results.
pub const DEFAULT_LANGUAGE: &str = "ru";

/// Geocoding client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Provider base URL, without the `/search` path.
    pub base_url: String,
    /// User-Agent header; the provider's usage policy requires one.
    pub user_agent: String,
    /// Value for `accept-language`.
    pub language: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

/// Nominatim search client.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
    language: String,
}

impl NominatimClient {
    /// Create a client from configuration.
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let base_url = http::normalize_base_url(&config.base_url)?;
        let client = http::build_client(
            Some(&config.user_agent),
            Duration::from_secs(config.timeout_secs),
        )?;

        Ok(Self {
            client,
            base_url,
            language: config.language.clone(),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search for places matching `query`, in provider relevance order.
    ///
    /// An empty vector means the provider knows no such place.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<GeoResult>> {
        let url = format!("{}/search", self.base_url);
        let params = [
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
            ("accept-language", self.language.clone()),
            ("limit", limit.to_string()),
        ];

        let places: Vec<NominatimPlace> = http::get_json(&self.client, &url, &params).await?;
        debug!("Nominatim returned {} places for {:?}", places.len(), query);

        places
            .into_iter()
            .map(|p| GeoResult::from_provider(&p.lat, &p.lon, p.display_name).map_err(Error::from))
            .collect()
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn geocode(&self, query: &str, limit: u32) -> Result<Vec<GeoResult>> {
        self.search(query, limit).await
    }
}
