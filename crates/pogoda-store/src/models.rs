//! Data models for stored lookups.

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Storage format of [`HistoryEntry::timestamp`].
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// One successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Database row ID.
    pub id: i64,
    /// The city exactly as the user typed it.
    pub city: String,
    /// Local wall-clock time of the lookup, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
}

impl HistoryEntry {
    /// Parse [`HistoryEntry::timestamp`].
    ///
    /// `None` for rows written by something other than this crate.
    pub fn recorded_at(&self) -> Option<PrimitiveDateTime> {
        PrimitiveDateTime::parse(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }
}

/// How often a city was looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityCount {
    pub city: String,
    pub count: u64,
}
