//! Core types for geocoding and forecast data.

use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::category::WeatherCategory;
use crate::error::{ParseError, ParseResult};

/// A single place returned by the geocoding provider.
///
/// Results are kept in the provider's relevance order; nothing in this
/// crate re-ranks them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoResult {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Full human-readable place name (e.g. "Москва, Центральный федеральный округ, Россия").
    pub display_name: String,
}

impl GeoResult {
    /// Build a result from the string-encoded coordinates the provider returns.
    ///
    /// # Examples
    ///
    /// ```
    /// use pogoda_types::GeoResult;
    ///
    /// let place = GeoResult::from_provider("55.7505", "37.6175", "Москва").unwrap();
    /// assert!((place.latitude - 55.7505).abs() < 1e-9);
    /// assert!(GeoResult::from_provider("north", "37.6", "Москва").is_err());
    /// ```
    pub fn from_provider(lat: &str, lon: &str, display_name: impl Into<String>) -> ParseResult<Self> {
        Ok(Self {
            latitude: parse_coordinate(lat)?,
            longitude: parse_coordinate(lon)?,
            display_name: display_name.into(),
        })
    }
}

fn parse_coordinate(value: &str) -> ParseResult<f64> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| ParseError::InvalidCoordinate {
            value: value.to_string(),
            reason: e.to_string(),
        })?;

    if !parsed.is_finite() {
        return Err(ParseError::InvalidCoordinate {
            value: value.to_string(),
            reason: "not a finite number".to_string(),
        });
    }

    Ok(parsed)
}

/// Parse a forecast provider timestamp such as `2024-05-01T14:00`.
pub fn parse_forecast_time(value: &str) -> ParseResult<PrimitiveDateTime> {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    PrimitiveDateTime::parse(value, format)
        .map_err(|_| ParseError::InvalidTimestamp(value.to_string()))
}

/// Current conditions section of a forecast.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurrentConditions {
    /// Air temperature in Celsius.
    pub temperature: f64,
    /// Wind speed in km/h.
    pub wind_speed: f64,
    /// Provider weather condition code.
    pub weather_code: i32,
    /// Observation time in the provider's timezone, if reported.
    pub time: Option<PrimitiveDateTime>,
}

/// One row of the hourly forecast series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HourlyPoint {
    pub time: PrimitiveDateTime,
    /// Temperature at 2 m in Celsius.
    pub temperature: f64,
    /// Relative humidity at 2 m in percent.
    pub humidity: u8,
    /// Wind speed at 10 m in km/h.
    pub wind_speed: f64,
    /// Provider weather condition code.
    pub code: i32,
}

impl HourlyPoint {
    /// Category of this hour's weather code.
    pub fn category(&self) -> WeatherCategory {
        WeatherCategory::from_code(self.code)
    }
}

/// Forecast data for one location, as fetched for a single request.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeatherSnapshot {
    /// Current conditions; `None` when the provider omitted the section.
    pub current: Option<CurrentConditions>,
    /// Hourly series in provider order.
    pub hourly: Vec<HourlyPoint>,
    /// When the snapshot was fetched.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub fetched_at: OffsetDateTime,
}

impl WeatherSnapshot {
    /// The current condition code, if the current section is present.
    pub fn condition_code(&self) -> Option<i32> {
        self.current.as_ref().map(|c| c.weather_code)
    }

    /// Category of the current conditions.
    ///
    /// Returns [`WeatherCategory::Unknown`] when there is no current section.
    pub fn category(&self) -> WeatherCategory {
        self.condition_code()
            .map(WeatherCategory::from_code)
            .unwrap_or_default()
    }

    /// Hourly points at or after `from`, at most `limit` of them.
    pub fn hourly_from(
        &self,
        from: PrimitiveDateTime,
        limit: usize,
    ) -> impl Iterator<Item = &HourlyPoint> {
        self.hourly
            .iter()
            .filter(move |p| p.time >= from)
            .take(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn point(time: PrimitiveDateTime, code: i32) -> HourlyPoint {
        HourlyPoint {
            time,
            temperature: 10.0,
            humidity: 50,
            wind_speed: 5.0,
            code,
        }
    }

    #[test]
    fn test_parse_coordinates() {
        let place = GeoResult::from_provider(" 48.8588897 ", "2.3200410", "Paris").unwrap();
        assert!((place.latitude - 48.8588897).abs() < 1e-9);
        assert!((place.longitude - 2.3200410).abs() < 1e-9);
        assert_eq!(place.display_name, "Paris");
    }

    #[test]
    fn test_parse_coordinates_rejects_garbage() {
        let err = GeoResult::from_provider("", "2.3", "Paris").unwrap_err();
        assert!(err.to_string().contains("Invalid coordinate"));

        assert!(GeoResult::from_provider("NaN", "2.3", "Paris").is_err());
        assert!(GeoResult::from_provider("inf", "2.3", "Paris").is_err());
    }

    #[test]
    fn test_parse_forecast_time() {
        let parsed = parse_forecast_time("2024-05-01T14:00").unwrap();
        assert_eq!(parsed, datetime!(2024-05-01 14:00));

        assert!(parse_forecast_time("2024-05-01 14:00").is_err());
        assert!(parse_forecast_time("yesterday").is_err());
    }

    #[test]
    fn test_snapshot_category_without_current() {
        let snapshot = WeatherSnapshot {
            current: None,
            hourly: Vec::new(),
            fetched_at: OffsetDateTime::UNIX_EPOCH,
        };
        assert_eq!(snapshot.condition_code(), None);
        assert_eq!(snapshot.category(), WeatherCategory::Unknown);
    }

    #[test]
    fn test_snapshot_category_from_current() {
        let snapshot = WeatherSnapshot {
            current: Some(CurrentConditions {
                temperature: 3.5,
                wind_speed: 12.0,
                weather_code: 73,
                time: None,
            }),
            hourly: Vec::new(),
            fetched_at: OffsetDateTime::UNIX_EPOCH,
        };
        assert_eq!(snapshot.condition_code(), Some(73));
        assert_eq!(snapshot.category(), WeatherCategory::Snow);
    }

    #[test]
    fn test_hourly_from_skips_past_and_caps() {
        let snapshot = WeatherSnapshot {
            current: None,
            hourly: vec![
                point(datetime!(2024-05-01 10:00), 0),
                point(datetime!(2024-05-01 11:00), 1),
                point(datetime!(2024-05-01 12:00), 2),
                point(datetime!(2024-05-01 13:00), 3),
            ],
            fetched_at: OffsetDateTime::UNIX_EPOCH,
        };

        let codes: Vec<i32> = snapshot
            .hourly_from(datetime!(2024-05-01 11:00), 2)
            .map(|p| p.code)
            .collect();
        assert_eq!(codes, vec![1, 2]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_geo_result_serde() {
        let place = GeoResult {
            latitude: 59.93,
            longitude: 30.31,
            display_name: "Санкт-Петербург, Россия".to_string(),
        };
        let json = serde_json::to_string(&place).unwrap();
        let back: GeoResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, place);
    }
}
