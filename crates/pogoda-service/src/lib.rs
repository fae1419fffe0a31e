//! Server-rendered weather lookup service.
//!
//! This crate provides a small web application that:
//! - Resolves a city name to coordinates and fetches its forecast
//! - Renders current conditions and an hourly table, themed by weather
//! - Suggests place names while typing
//! - Keeps a history of successful lookups and shows the most popular cities
//!
//! # Routes
//!
//! - `GET /?city=<name>` - Search page (sets the `last_city` cookie)
//! - `GET /autocomplete?city=<partial>` - Suggestion fragment
//! - `GET /stats` - Most looked-up cities
//! - `GET /api/health` - Service health check
//! - `GET /api/history?limit=N` - Recent lookups as JSON
//! - `GET /api/stats?limit=N` - Lookup counts as JSON
//! - `GET /static/*` - Files from `server.static_dir`, when configured
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/pogoda/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8000"
//! static_dir = "/srv/pogoda/static"
//!
//! [storage]
//! path = "~/.local/share/pogoda/history.db"
//!
//! [geocoding]
//! user_agent = "WeatherApp/1.0"
//! language = "ru"
//! timeout_secs = 5
//!
//! [forecast]
//! timeout_secs = 5
//! ```

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod lookup;
pub mod pages;
pub mod state;

pub use config::{Config, ConfigError, ServerConfig, StorageConfig, ValidationError};
pub use lookup::{LookupError, LookupOutcome, WeatherLookup};
pub use state::AppState;

/// Build the full application: routes, optional static files, tracing.
pub fn app(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new().merge(api::router());

    if let Some(dir) = static_dir {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
