//! Trait abstractions for the outbound providers.
//!
//! The web service only talks to [`Geocoder`] and [`Forecaster`], so the
//! real HTTP clients and the mocks in [`crate::mock`] are interchangeable.

use async_trait::async_trait;

use pogoda_types::{GeoResult, WeatherSnapshot};

use crate::error::Result;

/// Resolves a free-text place name to coordinates.
///
/// # Example
///
/// ```ignore
/// use pogoda_core::{Geocoder, Result};
///
/// async fn first_match<G: Geocoder>(geocoder: &G, name: &str) -> Result<Option<(f64, f64)>> {
///     let places = geocoder.geocode(name, 1).await?;
///     Ok(places.first().map(|p| (p.latitude, p.longitude)))
/// }
/// ```
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Up to `limit` matches in the provider's relevance order.
    ///
    /// An empty vector is a valid "no match" answer, not an error.
    async fn geocode(&self, query: &str, limit: u32) -> Result<Vec<GeoResult>>;
}

/// Fetches current conditions and an hourly forecast for coordinates.
#[async_trait]
pub trait Forecaster: Send + Sync {
    async fn forecast(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot>;
}
