//! Platform-agnostic types for the pogoda weather service.
//!
//! This crate provides the shared domain types used by the HTTP clients
//! (pogoda-core), the history store and the web service.
//!
//! # Features
//!
//! - Geocoding results and forecast snapshots
//! - The weather code table and display categories
//! - Error types for provider data parsing
//!
//! # Example
//!
//! ```
//! use pogoda_types::{WeatherCategory, describe};
//!
//! let category = WeatherCategory::from_code(95);
//! assert_eq!(category.theme(), "storm");
//! assert_eq!(describe(95), "Гроза");
//! ```

pub mod category;
pub mod error;
pub mod types;

pub use category::{CODE_TABLE, WeatherCategory, describe};
pub use error::{ParseError, ParseResult};
pub use types::{
    CurrentConditions, GeoResult, HourlyPoint, WeatherSnapshot, parse_forecast_time,
};
