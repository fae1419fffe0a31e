//! HTTP clients for the geocoding and forecast providers behind pogoda.
//!
//! This crate turns a place name into coordinates via Nominatim and fetches
//! current conditions plus an hourly forecast from Open-Meteo.
//!
//! # Features
//!
//! - **Geocoding**: free-text search with a configurable User-Agent and language
//! - **Forecast**: current weather and an hourly series in metric units
//! - **Bounded requests**: every call carries a timeout and is never retried
//! - **Mocks**: [`MockGeocoder`] and [`MockForecaster`] for testing without a network
//!
//! # Quick Start
//!
//! ```no_run
//! use pogoda_core::{ForecastConfig, GeocodingConfig, NominatimClient, OpenMeteoClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let geocoder = NominatimClient::new(&GeocodingConfig::default())?;
//!     let forecaster = OpenMeteoClient::new(&ForecastConfig::default())?;
//!
//!     let places = geocoder.search("Москва", 1).await?;
//!     if let Some(place) = places.first() {
//!         let snapshot = forecaster.fetch(place.latitude, place.longitude).await?;
//!         println!("{}: {}", place.display_name, snapshot.category().description());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod forecast;
pub mod geocode;
mod http;
pub mod mock;
pub mod traits;

pub use error::{Error, Result};
pub use forecast::{DEFAULT_OPEN_METEO_URL, ForecastConfig, OpenMeteoClient};
pub use geocode::{
    DEFAULT_LANGUAGE, DEFAULT_NOMINATIM_URL, DEFAULT_USER_AGENT, GeocodingConfig, NominatimClient,
};
pub use http::DEFAULT_TIMEOUT_SECS;
pub use mock::{MockFailure, MockForecaster, MockGeocoder};
pub use traits::{Forecaster, Geocoder};

// Re-export the shared domain types so callers need only this crate.
pub use pogoda_types::{
    CurrentConditions, GeoResult, HourlyPoint, WeatherCategory, WeatherSnapshot, describe,
};
