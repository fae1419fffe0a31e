//! Mock providers for testing.
//!
//! [`MockGeocoder`] and [`MockForecaster`] implement the provider traits
//! without touching the network, so the lookup logic can be tested in
//! isolation.
//!
//! # Features
//!
//! - **Failure injection**: make the next calls fail with a transport error,
//!   an HTTP status, or a decode error
//! - **Call recording**: inspect which queries and coordinates were requested
//! - **Latency simulation**: add artificial delays

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use time::macros::datetime;
use tokio::sync::RwLock;

use pogoda_types::{CurrentConditions, GeoResult, HourlyPoint, WeatherSnapshot};

use crate::error::{Error, Result};
use crate::traits::{Forecaster, Geocoder};

/// Kind of failure a mock should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Connection refused before any response.
    Transport,
    /// Provider answered with this status code.
    HttpStatus(u16),
    /// Provider answered with an undecodable body.
    Decode,
}

impl MockFailure {
    fn to_error(self, url: &str) -> Error {
        match self {
            MockFailure::Transport => Error::Transport {
                url: url.to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "mock connection refused",
                )),
            },
            MockFailure::HttpStatus(status) => Error::HttpStatus {
                url: url.to_string(),
                status,
            },
            MockFailure::Decode => Error::Decode {
                url: url.to_string(),
                message: "mock decode failure".to_string(),
            },
        }
    }
}

async fn simulate_latency(latency_ms: &AtomicU64) {
    let latency = latency_ms.load(Ordering::Relaxed);
    if latency > 0 {
        tokio::time::sleep(Duration::from_millis(latency)).await;
    }
}

/// A mock geocoder for testing.
///
/// # Example
///
/// ```
/// use pogoda_core::{Geocoder, MockGeocoder};
///
/// #[tokio::main]
/// async fn main() {
///     let geocoder = MockGeocoder::with_place("Paris", 48.85, 2.35);
///     let places = geocoder.geocode("Paris", 1).await.unwrap();
///     assert_eq!(places.len(), 1);
///     assert_eq!(geocoder.queries().await, vec!["Paris".to_string()]);
/// }
/// ```
#[derive(Debug, Default)]
pub struct MockGeocoder {
    results: RwLock<Vec<GeoResult>>,
    failure: RwLock<Option<MockFailure>>,
    calls: RwLock<Vec<(String, u32)>>,
    latency_ms: AtomicU64,
}

impl MockGeocoder {
    /// A geocoder that knows no places.
    pub fn new() -> Self {
        Self::default()
    }

    /// A geocoder that answers every query with `results`.
    pub fn with_results(results: Vec<GeoResult>) -> Self {
        Self {
            results: RwLock::new(results),
            ..Self::default()
        }
    }

    /// A geocoder that answers every query with a single place.
    pub fn with_place(display_name: &str, latitude: f64, longitude: f64) -> Self {
        Self::with_results(vec![GeoResult {
            latitude,
            longitude,
            display_name: display_name.to_string(),
        }])
    }

    /// Replace the canned results.
    pub async fn set_results(&self, results: Vec<GeoResult>) {
        *self.results.write().await = results;
    }

    /// Fail every following call.
    pub async fn fail_with(&self, failure: MockFailure) {
        *self.failure.write().await = Some(failure);
    }

    /// Stop failing.
    pub async fn clear_failure(&self) {
        *self.failure.write().await = None;
    }

    /// Add an artificial delay to every call.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Queries received so far, in order.
    pub async fn queries(&self) -> Vec<String> {
        self.calls.read().await.iter().map(|(q, _)| q.clone()).collect()
    }

    /// `(query, limit)` pairs received so far, in order.
    pub async fn calls(&self) -> Vec<(String, u32)> {
        self.calls.read().await.clone()
    }

    /// Number of calls received.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, query: &str, limit: u32) -> Result<Vec<GeoResult>> {
        self.calls.write().await.push((query.to_string(), limit));
        simulate_latency(&self.latency_ms).await;

        if let Some(failure) = *self.failure.read().await {
            return Err(failure.to_error("mock://geocoder/search"));
        }

        let results = self.results.read().await;
        Ok(results.iter().take(limit as usize).cloned().collect())
    }
}

/// A mock forecaster for testing.
///
/// By default returns clear-sky (code 0) current conditions and three
/// hourly points.
#[derive(Debug)]
pub struct MockForecaster {
    snapshot: RwLock<WeatherSnapshot>,
    failure: RwLock<Option<MockFailure>>,
    calls: RwLock<Vec<(f64, f64)>>,
    latency_ms: AtomicU64,
}

impl Default for MockForecaster {
    fn default() -> Self {
        Self::new()
    }
}

impl MockForecaster {
    /// A forecaster returning [`MockForecaster::default_snapshot`].
    pub fn new() -> Self {
        Self::with_snapshot(Self::default_snapshot(0))
    }

    /// A forecaster whose current conditions carry `code`.
    pub fn with_code(code: i32) -> Self {
        Self::with_snapshot(Self::default_snapshot(code))
    }

    /// A forecaster whose payload has no current-conditions section.
    pub fn without_current() -> Self {
        let mut snapshot = Self::default_snapshot(0);
        snapshot.current = None;
        Self::with_snapshot(snapshot)
    }

    /// A forecaster returning `snapshot` for every location.
    pub fn with_snapshot(snapshot: WeatherSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            failure: RwLock::new(None),
            calls: RwLock::new(Vec::new()),
            latency_ms: AtomicU64::new(0),
        }
    }

    /// Canned snapshot with the given current code.
    pub fn default_snapshot(code: i32) -> WeatherSnapshot {
        let hourly = [
            (datetime!(2024-05-01 12:00), 14.2, 60, 9.0, 2),
            (datetime!(2024-05-01 13:00), 15.0, 58, 10.5, 3),
            (datetime!(2024-05-01 14:00), 15.4, 57, 11.0, 61),
        ]
        .into_iter()
        .map(|(time, temperature, humidity, wind_speed, code)| HourlyPoint {
            time,
            temperature,
            humidity,
            wind_speed,
            code,
        })
        .collect();

        WeatherSnapshot {
            current: Some(CurrentConditions {
                temperature: 14.8,
                wind_speed: 10.1,
                weather_code: code,
                time: Some(datetime!(2024-05-01 12:45)),
            }),
            hourly,
            fetched_at: OffsetDateTime::now_utc(),
        }
    }

    /// Replace the canned snapshot.
    pub async fn set_snapshot(&self, snapshot: WeatherSnapshot) {
        *self.snapshot.write().await = snapshot;
    }

    /// Fail every following call.
    pub async fn fail_with(&self, failure: MockFailure) {
        *self.failure.write().await = Some(failure);
    }

    /// Stop failing.
    pub async fn clear_failure(&self) {
        *self.failure.write().await = None;
    }

    /// Add an artificial delay to every call.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Coordinates received so far, in order.
    pub async fn calls(&self) -> Vec<(f64, f64)> {
        self.calls.read().await.clone()
    }

    /// Number of calls received.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl Forecaster for MockForecaster {
    async fn forecast(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot> {
        self.calls.write().await.push((latitude, longitude));
        simulate_latency(&self.latency_ms).await;

        if let Some(failure) = *self.failure.read().await {
            return Err(failure.to_error("mock://forecaster/v1/forecast"));
        }

        Ok(self.snapshot.read().await.clone())
    }
}
