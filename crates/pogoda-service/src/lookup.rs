//! Weather lookup: geocode a city, fetch its forecast, record the search.
//!
//! [`WeatherLookup::resolve`] never fails. Every provider problem is turned
//! into a [`LookupError`] carried in the [`LookupOutcome`], so the page can
//! always render.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use pogoda_core::{Forecaster, GeoResult, Geocoder, WeatherCategory, WeatherSnapshot};
use pogoda_store::Store;

/// How many suggestions autocomplete asks for.
pub const SUGGESTION_LIMIT: u32 = 5;

/// Which outbound call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Geocoding,
    Forecast,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Geocoding => write!(f, "geocoding"),
            Stage::Forecast => write!(f, "forecast"),
        }
    }
}

/// Why a lookup produced no weather.
///
/// The `Display` output is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The geocoder knows no such place.
    #[error("city not found")]
    NotFound,
    /// A provider could not be reached or timed out.
    #[error("{stage} service is unavailable, try again later")]
    Transport { stage: Stage },
    /// A provider answered with a non-success status.
    #[error("{stage} service returned HTTP {status}")]
    HttpStatus { stage: Stage, status: u16 },
    /// A provider answered with something we could not use.
    #[error("unexpected response from {stage} service")]
    Unexpected { stage: Stage },
}

impl LookupError {
    fn from_provider(stage: Stage, err: pogoda_core::Error) -> Self {
        error!("{} request failed: {}", stage, err);

        if err.is_transport() {
            LookupError::Transport { stage }
        } else if let Some(status) = err.status() {
            LookupError::HttpStatus { stage, status }
        } else {
            LookupError::Unexpected { stage }
        }
    }
}

/// Result of [`WeatherLookup::resolve`].
#[derive(Debug, Clone, Default)]
pub struct LookupOutcome {
    /// The city exactly as requested, if any.
    pub city: Option<String>,
    /// Best geocoding match.
    pub place: Option<GeoResult>,
    /// Forecast for the matched place.
    pub weather: Option<WeatherSnapshot>,
    /// Category used to theme the page.
    pub category: WeatherCategory,
    pub error: Option<LookupError>,
}

impl LookupOutcome {
    /// Reset the category unless there is a complete, error-free result.
    ///
    /// Must run after every other assignment to `category`.
    fn settle_category(&mut self) {
        let complete = self.city.is_some() && self.weather.is_some() && self.error.is_none();
        if !complete {
            self.category = WeatherCategory::default();
        }
    }

    /// The theme name for the page.
    pub fn theme(&self) -> &'static str {
        self.category.theme()
    }
}

/// The part of a city string sent to the geocoder.
///
/// Anything after the first comma (region, country) is dropped.
pub fn geocoding_query(city: &str) -> &str {
    city.split_once(',')
        .map_or(city, |(head, _)| head)
        .trim()
}

/// Ties the geocoder, the forecaster and the history store together.
#[derive(Clone)]
pub struct WeatherLookup {
    geocoder: Arc<dyn Geocoder>,
    forecaster: Arc<dyn Forecaster>,
    store: Arc<Mutex<Store>>,
}

impl WeatherLookup {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        forecaster: Arc<dyn Forecaster>,
        store: Arc<Mutex<Store>>,
    ) -> Self {
        Self {
            geocoder,
            forecaster,
            store,
        }
    }

    /// Resolve the weather for `city`.
    ///
    /// A missing or empty city returns an empty outcome without any
    /// outbound call. A successful lookup with current conditions is
    /// recorded in history exactly once, under the city as given.
    pub async fn resolve(&self, city: Option<&str>) -> LookupOutcome {
        let mut outcome = LookupOutcome::default();

        if let Some(city) = city.filter(|c| !c.is_empty()) {
            outcome.city = Some(city.to_string());

            match self.lookup(city).await {
                Ok((place, snapshot, category)) => {
                    outcome.place = Some(place);
                    outcome.weather = Some(snapshot);
                    if let Some(category) = category {
                        outcome.category = category;
                    }
                }
                Err(e) => outcome.error = Some(e),
            }
        }

        outcome.settle_category();
        outcome
    }

    async fn lookup(
        &self,
        city: &str,
    ) -> Result<(GeoResult, WeatherSnapshot, Option<WeatherCategory>), LookupError> {
        let query = geocoding_query(city);
        debug!("Looking up {:?} as {:?}", city, query);

        if query.is_empty() {
            return Err(LookupError::NotFound);
        }

        let place = self
            .geocoder
            .geocode(query, 1)
            .await
            .map_err(|e| LookupError::from_provider(Stage::Geocoding, e))?
            .into_iter()
            .next()
            .ok_or(LookupError::NotFound)?;

        debug!(
            "Resolved {:?} to {} ({}, {})",
            query, place.display_name, place.latitude, place.longitude
        );

        let snapshot = self
            .forecaster
            .forecast(place.latitude, place.longitude)
            .await
            .map_err(|e| LookupError::from_provider(Stage::Forecast, e))?;

        let category = match snapshot.condition_code() {
            Some(code) => {
                let category = WeatherCategory::from_code(code);
                debug!("Weather code {} is {}", code, category);
                self.record(city).await;
                Some(category)
            }
            None => {
                warn!("Forecast for {:?} has no current conditions", city);
                None
            }
        };

        Ok((place, snapshot, category))
    }

    async fn record(&self, city: &str) {
        let store = self.store.lock().await;
        if let Err(e) = store.record(city) {
            error!("Failed to record lookup of {:?}: {}", city, e);
        }
    }

    /// Up to five place names matching `partial`.
    ///
    /// Empty input and provider failures both give an empty list.
    pub async fn suggest(&self, partial: &str) -> Vec<String> {
        let partial = partial.trim();
        if partial.is_empty() {
            return Vec::new();
        }

        match self.geocoder.geocode(partial, SUGGESTION_LIMIT).await {
            Ok(places) => places.into_iter().map(|p| p.display_name).collect(),
            Err(e) => {
                warn!("Autocomplete for {:?} failed: {}", partial, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pogoda_core::{MockFailure, MockForecaster, MockGeocoder};
    use proptest::prelude::*;

    struct Fixture {
        geocoder: Arc<MockGeocoder>,
        forecaster: Arc<MockForecaster>,
        store: Arc<Mutex<Store>>,
        lookup: WeatherLookup,
    }

    fn fixture(geocoder: MockGeocoder, forecaster: MockForecaster) -> Fixture {
        let geocoder = Arc::new(geocoder);
        let forecaster = Arc::new(forecaster);
        let store = Arc::new(Mutex::new(Store::open_in_memory().unwrap()));
        let lookup = WeatherLookup::new(geocoder.clone(), forecaster.clone(), store.clone());
        Fixture {
            geocoder,
            forecaster,
            store,
            lookup,
        }
    }

    async fn history(store: &Arc<Mutex<Store>>) -> Vec<String> {
        store
            .lock()
            .await
            .query_recent(100)
            .unwrap()
            .into_iter()
            .map(|e| e.city)
            .collect()
    }

    #[tokio::test]
    async fn test_resolve_without_city() {
        let f = fixture(MockGeocoder::with_place("Paris", 48.85, 2.35), MockForecaster::new());

        for city in [None, Some("")] {
            let outcome = f.lookup.resolve(city).await;
            assert!(outcome.weather.is_none());
            assert!(outcome.error.is_none());
            assert_eq!(outcome.theme(), "main");
        }

        assert_eq!(f.geocoder.call_count().await, 0);
        assert!(history(&f.store).await.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_rain() {
        let f = fixture(
            MockGeocoder::with_place("Москва, Россия", 55.75, 37.62),
            MockForecaster::with_code(61),
        );

        let outcome = f.lookup.resolve(Some("Москва")).await;

        assert!(outcome.error.is_none());
        assert!(outcome.weather.is_some());
        assert_eq!(outcome.category, WeatherCategory::Rain);
        assert_eq!(outcome.theme(), "rain");
        assert_eq!(f.forecaster.calls().await, vec![(55.75, 37.62)]);
        assert_eq!(history(&f.store).await, vec!["Москва"]);
    }

    #[tokio::test]
    async fn test_resolve_splits_on_first_comma() {
        let f = fixture(
            MockGeocoder::with_place("Подольск", 55.43, 37.54),
            MockForecaster::with_code(0),
        );

        let city = "Подольск, Московская область, Россия";
        let outcome = f.lookup.resolve(Some(city)).await;

        assert!(outcome.error.is_none());
        assert_eq!(f.geocoder.calls().await, vec![("Подольск".to_string(), 1)]);
        assert_eq!(history(&f.store).await, vec![city]);
        assert_eq!(outcome.city.as_deref(), Some(city));
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let f = fixture(MockGeocoder::new(), MockForecaster::new());

        let outcome = f.lookup.resolve(Some("Paris")).await;

        assert_eq!(outcome.error, Some(LookupError::NotFound));
        assert_eq!(outcome.error.unwrap().to_string(), "city not found");
        assert!(outcome.weather.is_none());
        assert_eq!(outcome.category, WeatherCategory::Unknown);
        assert_eq!(f.forecaster.call_count().await, 0);
        assert!(history(&f.store).await.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_after_place_becomes_known() {
        let f = fixture(MockGeocoder::new(), MockForecaster::with_code(45));

        let outcome = f.lookup.resolve(Some("Мурманск")).await;
        assert_eq!(outcome.error, Some(LookupError::NotFound));

        f.geocoder
            .set_results(vec![GeoResult {
                latitude: 68.97,
                longitude: 33.07,
                display_name: "Мурманск, Россия".to_string(),
            }])
            .await;

        let outcome = f.lookup.resolve(Some("Мурманск")).await;
        assert!(outcome.error.is_none());
        assert_eq!(outcome.category, WeatherCategory::Cloud);
        assert_eq!(f.forecaster.calls().await, vec![(68.97, 33.07)]);
        assert_eq!(history(&f.store).await, vec!["Мурманск"]);
    }

    #[tokio::test]
    async fn test_resolve_blank_query_is_not_found() {
        let f = fixture(MockGeocoder::with_place("X", 0.0, 0.0), MockForecaster::new());

        let outcome = f.lookup.resolve(Some(" , Россия")).await;

        assert_eq!(outcome.error, Some(LookupError::NotFound));
        assert_eq!(f.geocoder.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_resolve_forecast_http_error() {
        let f = fixture(
            MockGeocoder::with_place("Paris", 48.85, 2.35),
            MockForecaster::with_code(95),
        );
        f.forecaster.fail_with(MockFailure::HttpStatus(500)).await;

        let outcome = f.lookup.resolve(Some("Paris")).await;

        assert_eq!(
            outcome.error,
            Some(LookupError::HttpStatus {
                stage: Stage::Forecast,
                status: 500
            })
        );
        assert!(!outcome.error.as_ref().unwrap().to_string().is_empty());
        assert!(outcome.weather.is_none());
        assert_eq!(outcome.theme(), "main");
        assert!(history(&f.store).await.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_geocoder_unreachable() {
        let f = fixture(MockGeocoder::with_place("Paris", 48.85, 2.35), MockForecaster::new());
        f.geocoder.fail_with(MockFailure::Transport).await;

        let outcome = f.lookup.resolve(Some("Paris")).await;

        assert_eq!(
            outcome.error,
            Some(LookupError::Transport {
                stage: Stage::Geocoding
            })
        );
        assert_eq!(f.forecaster.call_count().await, 0);
        assert!(history(&f.store).await.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_decode_failure() {
        let f = fixture(MockGeocoder::with_place("Paris", 48.85, 2.35), MockForecaster::new());
        f.forecaster.fail_with(MockFailure::Decode).await;

        let outcome = f.lookup.resolve(Some("Paris")).await;

        assert_eq!(
            outcome.error,
            Some(LookupError::Unexpected {
                stage: Stage::Forecast
            })
        );
        assert!(outcome.weather.is_none());
    }

    #[tokio::test]
    async fn test_resolve_without_current_conditions() {
        let f = fixture(
            MockGeocoder::with_place("Paris", 48.85, 2.35),
            MockForecaster::without_current(),
        );

        let outcome = f.lookup.resolve(Some("Paris")).await;

        assert!(outcome.error.is_none());
        assert!(outcome.weather.is_some());
        assert_eq!(outcome.category, WeatherCategory::Unknown);
        assert!(history(&f.store).await.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_records_once_per_success() {
        let f = fixture(
            MockGeocoder::with_place("Oslo", 59.91, 10.75),
            MockForecaster::with_code(71),
        );

        f.lookup.resolve(Some("Oslo")).await;
        f.lookup.resolve(Some("Oslo")).await;
        f.forecaster.fail_with(MockFailure::Transport).await;
        f.lookup.resolve(Some("Oslo")).await;

        assert_eq!(history(&f.store).await, vec!["Oslo", "Oslo"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_lookups_keep_ids_unique() {
        let f = fixture(
            MockGeocoder::with_place("Oslo", 59.91, 10.75),
            MockForecaster::with_code(0),
        );

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let lookup = f.lookup.clone();
                tokio::spawn(async move {
                    let city = format!("City {}", i);
                    lookup.resolve(Some(&city)).await
                })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap().error.is_none());
        }

        let store = f.store.lock().await;
        assert_eq!(store.count().unwrap(), 16);

        // Newest first, so ids must strictly decrease down the list.
        let entries = store.query_recent(100).unwrap();
        assert_eq!(entries.len(), 16);
        assert!(entries.windows(2).all(|w| w[0].id > w[1].id));

        let mut cities: Vec<_> = entries.iter().map(|e| e.city.clone()).collect();
        cities.sort();
        cities.dedup();
        assert_eq!(cities.len(), 16);
    }

    #[tokio::test]
    async fn test_resolve_survives_history_failure() {
        let f = fixture(
            MockGeocoder::with_place("Oslo", 59.91, 10.75),
            MockForecaster::with_code(3),
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");
        *f.store.lock().await = Store::open(&path).unwrap();
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch("DROP TABLE search_history")
            .unwrap();

        let outcome = f.lookup.resolve(Some("Oslo")).await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.category, WeatherCategory::Cloud);
        assert!(f.store.lock().await.recent(5).is_empty());
    }

    #[tokio::test]
    async fn test_suggest() {
        let f = fixture(
            MockGeocoder::with_results(
                ["Казань", "Казанское", "Казанская", "Казантип", "Казаново", "Казанка"]
                    .iter()
                    .map(|name| GeoResult {
                        latitude: 0.0,
                        longitude: 0.0,
                        display_name: name.to_string(),
                    })
                    .collect(),
            ),
            MockForecaster::new(),
        );

        let names = f.lookup.suggest("Каз").await;

        assert_eq!(names.len(), 5);
        assert_eq!(names[0], "Казань");
        assert_eq!(f.geocoder.calls().await, vec![("Каз".to_string(), 5)]);
    }

    #[tokio::test]
    async fn test_suggest_empty_input_makes_no_call() {
        let f = fixture(MockGeocoder::with_place("Paris", 0.0, 0.0), MockForecaster::new());

        assert!(f.lookup.suggest("").await.is_empty());
        assert!(f.lookup.suggest("   ").await.is_empty());
        assert_eq!(f.geocoder.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_suggest_failure_is_empty() {
        let f = fixture(MockGeocoder::with_place("Paris", 0.0, 0.0), MockForecaster::new());
        f.geocoder.fail_with(MockFailure::Transport).await;

        assert!(f.lookup.suggest("Par").await.is_empty());
    }

    #[test]
    fn test_settle_category_on_error() {
        let mut outcome = LookupOutcome {
            city: Some("Paris".to_string()),
            weather: Some(MockForecaster::default_snapshot(95)),
            category: WeatherCategory::Storm,
            error: Some(LookupError::NotFound),
            ..Default::default()
        };
        outcome.settle_category();
        assert_eq!(outcome.category, WeatherCategory::Unknown);
    }

    #[test]
    fn test_geocoding_query() {
        assert_eq!(geocoding_query("Paris"), "Paris");
        assert_eq!(geocoding_query(" Paris , France"), "Paris");
        assert_eq!(geocoding_query("a,b,c"), "a");
        assert_eq!(geocoding_query(",b"), "");
    }

    proptest! {
        #[test]
        fn prop_query_is_text_before_first_comma(head in "[^,]*", tail in ".*") {
            let city = format!("{},{}", head, tail);
            prop_assert_eq!(geocoding_query(&city), head.trim());
        }

        #[test]
        fn prop_query_without_comma_is_trimmed(city in "[^,]*") {
            prop_assert_eq!(geocoding_query(&city), city.trim());
        }
    }
}
