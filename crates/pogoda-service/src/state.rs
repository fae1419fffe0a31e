//! Application state shared across handlers.
//!
//! The history store is shared between the handlers (reads) and the
//! [`WeatherLookup`] (writes), so it lives behind an `Arc<Mutex<_>>`.
//! SQLite work is short; never hold the lock across an outbound request.

use std::sync::Arc;

use tokio::sync::Mutex;

use pogoda_core::{Forecaster, Geocoder, NominatimClient, OpenMeteoClient};
use pogoda_store::Store;

use crate::config::Config;
use crate::lookup::WeatherLookup;

/// Shared application state.
pub struct AppState {
    /// The history store.
    pub store: Arc<Mutex<Store>>,
    /// Geocode, forecast and record.
    pub lookup: WeatherLookup,
}

impl AppState {
    /// Create state around explicit provider implementations.
    pub fn new(
        store: Store,
        geocoder: Arc<dyn Geocoder>,
        forecaster: Arc<dyn Forecaster>,
    ) -> Arc<Self> {
        let store = Arc::new(Mutex::new(store));
        let lookup = WeatherLookup::new(geocoder, forecaster, Arc::clone(&store));

        Arc::new(Self {
            store,
            lookup,
        })
    }

    /// Create state with the real HTTP providers described by `config`.
    pub fn with_http_providers(store: Store, config: &Config) -> pogoda_core::Result<Arc<Self>> {
        let geocoder = NominatimClient::new(&config.geocoding)?;
        let forecaster = OpenMeteoClient::new(&config.forecast)?;

        Ok(Self::new(
            store,
            Arc::new(geocoder),
            Arc::new(forecaster),
        ))
    }
}
