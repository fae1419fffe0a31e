//! HTTP routes for the pogoda service.
//!
//! # Routes
//!
//! - `GET /` - search page; `?city=` runs a lookup
//! - `GET /autocomplete` - suggestion fragment for the search box
//! - `GET /stats` - most looked-up cities
//! - `GET /api/health` - service health check
//! - `GET /api/history` - recent lookups as JSON
//! - `GET /api/stats` - lookup counts as JSON
//!
//! ## Error Handling
//!
//! The HTML routes always render: lookup problems become an inline message
//! and history read failures become empty lists. The JSON routes return
//! structured errors via [`AppError`], so a store failure is an HTTP 500.
//!
//! # Example
//!
//! ```ignore
//! use pogoda_service::api;
//!
//! let app = api::router().with_state(state);
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime, Time};
use tracing::warn;

use pogoda_store::{CityCount, HistoryEntry};

use crate::pages::{self, IndexPage};
use crate::state::AppState;

/// Name of the cookie remembering the last searched city.
pub const LAST_CITY_COOKIE: &str = "last_city";
/// Recent lookups shown on the page.
pub const RECENT_ON_PAGE: usize = 5;
/// Cities shown on the stats page.
pub const STATS_ON_PAGE: usize = 10;
/// Upper bound for `?limit=` on the JSON routes.
pub const MAX_API_LIMIT: usize = 100;

/// Create the router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        // Pages
        .route("/", get(index))
        .route("/autocomplete", get(autocomplete))
        .route("/stats", get(stats_page))
        // JSON
        .route("/api/health", get(health))
        .route("/api/history", get(api_history))
        .route("/api/stats", get(api_stats))
}

/// `?city=` query parameters.
#[derive(Debug, Default)]
pub struct CityParams {
    pub city: Option<String>,
}

impl CityParams {
    /// Pick `city` out of raw query pairs; a repeated key keeps its last value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let city = pairs
            .into_iter()
            .rev()
            .find(|(name, _)| name == "city")
            .map(|(_, value)| value);
        Self { city }
    }
}

/// `?limit=` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

impl LimitParams {
    /// The requested limit, capped at [`MAX_API_LIMIT`].
    fn resolve(&self, default: usize) -> Result<usize, AppError> {
        match self.limit {
            Some(0) => Err(AppError::BadRequest("limit must be at least 1".to_string())),
            Some(limit) => Ok(limit.min(MAX_API_LIMIT)),
            None => Ok(default),
        }
    }
}

/// Read the remembered city from the request cookies.
pub fn last_city(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == LAST_CITY_COOKIE)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|city| city.into_owned())
}

/// `Set-Cookie` value remembering `city`.
pub fn last_city_cookie(city: &str) -> String {
    format!(
        "{}={}; Path=/",
        LAST_CITY_COOKIE,
        urlencoding::encode(city)
    )
}

/// Start of the current hour in UTC, the timezone of the hourly series.
fn current_hour() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    let hour = Time::from_hms(now.hour(), 0, 0).unwrap_or(Time::MIDNIGHT);
    PrimitiveDateTime::new(now.date(), hour)
}

/// Search page.
///
/// With `?city=` the city is looked up and remembered in a cookie. Without
/// it, the search box is prefilled from that cookie; no lookup is made.
async fn index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let city = CityParams::from_pairs(pairs).city.filter(|c| !c.is_empty());
    let outcome = state.lookup.resolve(city.as_deref()).await;

    let search_value = city.clone().or_else(|| last_city(&headers)).unwrap_or_default();
    let recent = state.store.lock().await.recent(RECENT_ON_PAGE);

    let html = pages::render_index(&IndexPage {
        outcome: &outcome,
        search_value: &search_value,
        recent: &recent,
        hours_from: current_hour(),
    });

    let mut response = Html(html).into_response();
    if let Some(city) = &city {
        match HeaderValue::from_str(&last_city_cookie(city)) {
            Ok(value) => {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            Err(e) => warn!("Cannot set {} cookie: {}", LAST_CITY_COOKIE, e),
        }
    }
    response
}

/// Suggestion fragment for the search box.
async fn autocomplete(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Html<String> {
    let partial = CityParams::from_pairs(pairs).city.unwrap_or_default();
    let names = state.lookup.suggest(&partial).await;
    Html(pages::render_suggestions(&names))
}

/// Most looked-up cities.
pub async fn stats_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let counts = state.store.lock().await.frequencies(STATS_ON_PAGE);
    Html(pages::render_stats(&counts))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
    })
}

/// Recent lookups, newest first.
///
/// # Errors
///
/// Returns [`AppError::Store`] if the database query fails.
async fn api_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let store = state.store.lock().await;
    let entries = store.query_recent(params.resolve(RECENT_ON_PAGE)?)?;
    Ok(Json(entries))
}

/// Lookup counts per city, most frequent first.
///
/// # Errors
///
/// Returns [`AppError::Store`] if the database query fails.
async fn api_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<CityCount>>, AppError> {
    let store = state.store.lock().await;
    let counts = store.query_frequencies(params.resolve(STATS_ON_PAGE)?)?;
    Ok(Json(counts))
}

/// Application error type for the JSON routes.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Store(pogoda_store::Error),
}

impl From<pogoda_store::Error> for AppError {
    fn from(e: pogoda_store::Error) -> Self {
        AppError::Store(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Store(e) => {
                warn!("History query failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}
