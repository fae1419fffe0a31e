//! Lookup history persistence for the pogoda weather service.
//!
//! Every successful weather lookup is appended to a single SQLite table of
//! `(city, timestamp)` rows. The service reads it back as "recent lookups"
//! and as per-city lookup counts.
//!
//! # Example
//!
//! ```no_run
//! use pogoda_store::Store;
//!
//! let store = Store::open_default()?;
//! store.record("Москва")?;
//!
//! for entry in store.recent(5) {
//!     println!("{} at {}", entry.city, entry.timestamp);
//! }
//! # Ok::<(), pogoda_store::Error>(())
//! ```

mod error;
mod models;
mod schema;
mod store;

pub use error::{Error, Result};
pub use models::{CityCount, HistoryEntry, TIMESTAMP_FORMAT};
pub use schema::SCHEMA_VERSION;
pub use store::{Store, format_timestamp, local_now};

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/pogoda/history.db`
/// - macOS: `~/Library/Application Support/pogoda/history.db`
/// - Windows: `C:\Users\<user>\AppData\Local\pogoda\history.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("pogoda")
        .join("history.db")
}
