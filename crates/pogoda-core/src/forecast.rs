//! Open-Meteo forecast client.
//!
//! Requests current conditions plus an hourly series of temperature,
//! humidity, wind and weather code, in Celsius, km/h and mm.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use pogoda_types::{CurrentConditions, HourlyPoint, WeatherSnapshot, parse_forecast_time};

use crate::error::Result;
use crate::http::{self, DEFAULT_TIMEOUT_SECS};
use crate::traits::Forecaster;

/// Public Open-Meteo instance.
pub const DEFAULT_OPEN_METEO_URL: &str = "https://api.open-meteo.com";

/// Hourly variables requested from the provider.
pub const HOURLY_VARIABLES: &str =
    "temperature_2m,relative_humidity_2m,wind_speed_10m,weather_code";

/// Forecast client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Provider base URL, without the `/v1/forecast` path.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPEN_METEO_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<RawCurrentWeather>,
    hourly: Option<RawHourly>,
}

#[derive(Debug, Deserialize)]
struct RawCurrentWeather {
    temperature: Option<f64>,
    windspeed: Option<f64>,
    weathercode: Option<i32>,
    time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    relative_humidity_2m: Vec<Option<f64>>,
    wind_speed_10m: Vec<Option<f64>>,
    weather_code: Vec<Option<i32>>,
}

impl RawCurrentWeather {
    /// `None` when any field the page needs is missing.
    fn into_conditions(self) -> Option<CurrentConditions> {
        Some(CurrentConditions {
            temperature: self.temperature?,
            wind_speed: self.windspeed?,
            weather_code: self.weathercode?,
            time: self.time.as_deref().and_then(|t| parse_forecast_time(t).ok()),
        })
    }
}

impl RawHourly {
    /// Zip the parallel arrays, dropping rows with gaps or bad timestamps.
    fn into_points(self) -> Vec<HourlyPoint> {
        let mut points = Vec::with_capacity(self.time.len());

        for (i, raw_time) in self.time.iter().enumerate() {
            let row = (
                parse_forecast_time(raw_time).ok(),
                self.temperature_2m.get(i).copied().flatten(),
                self.relative_humidity_2m.get(i).copied().flatten(),
                self.wind_speed_10m.get(i).copied().flatten(),
                self.weather_code.get(i).copied().flatten(),
            );

            match row {
                (Some(time), Some(temperature), Some(humidity), Some(wind_speed), Some(code)) => {
                    points.push(HourlyPoint {
                        time,
                        temperature,
                        humidity: humidity.round().clamp(0.0, 100.0) as u8,
                        wind_speed,
                        code,
                    });
                }
                _ => debug!("Skipping incomplete hourly row {} ({})", i, raw_time),
            }
        }

        points
    }
}

/// Open-Meteo forecast client.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    /// Create a client from configuration.
    pub fn new(config: &ForecastConfig) -> Result<Self> {
        let base_url = http::normalize_base_url(&config.base_url)?;
        let client = http::build_client(None, Duration::from_secs(config.timeout_secs))?;
        Ok(Self { client, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch current conditions and the hourly series for a location.
    ///
    /// Coordinates are passed through unchecked; the provider validates them.
    pub async fn fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot> {
        let url = format!("{}/v1/forecast", self.base_url);
        let params = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current_weather", "true".to_string()),
            ("hourly", HOURLY_VARIABLES.to_string()),
            ("temperature_unit", "celsius".to_string()),
            ("windspeed_unit", "kmh".to_string()),
            ("precipitation_unit", "mm".to_string()),
        ];

        let response: ForecastResponse = http::get_json(&self.client, &url, &params).await?;

        let current = response
            .current_weather
            .and_then(RawCurrentWeather::into_conditions);
        let hourly = response
            .hourly
            .map(RawHourly::into_points)
            .unwrap_or_default();

        debug!(
            "Open-Meteo: current={:?}, {} hourly points",
            current.as_ref().map(|c| c.weather_code),
            hourly.len()
        );

        Ok(WeatherSnapshot {
            current,
            hourly,
            fetched_at: OffsetDateTime::now_utc(),
        })
    }
}

#[async_trait]
impl Forecaster for OpenMeteoClient {
    async fn forecast(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot> {
        self.fetch(latitude, longitude).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_client_creation() {
        let client = OpenMeteoClient::new(&ForecastConfig::default()).unwrap();
        assert_eq!(client.base_url(), DEFAULT_OPEN_METEO_URL);
    }

    #[test]
    fn test_current_weather_requires_code() {
        let raw: RawCurrentWeather =
            serde_json::from_str(r#"{"temperature": 12.3, "windspeed": 7.0}"#).unwrap();
        assert!(raw.into_conditions().is_none());

        let raw: RawCurrentWeather = serde_json::from_str(
            r#"{"temperature": 12.3, "windspeed": 7.0, "weathercode": 61, "time": "2024-05-01T14:00"}"#,
        )
        .unwrap();
        let current = raw.into_conditions().unwrap();
        assert_eq!(current.weather_code, 61);
        assert_eq!(current.time, Some(datetime!(2024-05-01 14:00)));
    }

    #[test]
    fn test_hourly_rows_are_zipped() {
        let raw: RawHourly = serde_json::from_str(
            r#"{
                "time": ["2024-05-01T00:00", "2024-05-01T01:00", "2024-05-01T02:00"],
                "temperature_2m": [10.5, null, 9.8],
                "relative_humidity_2m": [80, 81, 82.4],
                "wind_speed_10m": [3.2, 3.4, 3.1],
                "weather_code": [3, 3, 61]
            }"#,
        )
        .unwrap();

        let points = raw.into_points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].time, datetime!(2024-05-01 00:00));
        assert_eq!(points[0].humidity, 80);
        assert_eq!(points[1].code, 61);
        assert_eq!(points[1].humidity, 82);
    }

    #[test]
    fn test_hourly_short_arrays_are_truncated() {
        let raw: RawHourly = serde_json::from_str(
            r#"{
                "time": ["2024-05-01T00:00", "2024-05-01T01:00"],
                "temperature_2m": [10.5],
                "relative_humidity_2m": [80],
                "wind_speed_10m": [3.2],
                "weather_code": [0]
            }"#,
        )
        .unwrap();

        assert_eq!(raw.into_points().len(), 1);
    }

    #[test]
    fn test_missing_sections_decode() {
        let response: ForecastResponse = serde_json::from_str(r#"{"latitude": 1.0}"#).unwrap();
        assert!(response.current_weather.is_none());
        assert!(response.hourly.is_none());
    }
}
