//! Error types for data parsing in pogoda-types.

use thiserror::Error;

/// Errors that can occur when converting provider data into domain types.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A latitude or longitude value could not be parsed as a number.
    #[error("Invalid coordinate '{value}': {reason}")]
    InvalidCoordinate { value: String, reason: String },

    /// A provider timestamp did not match the expected format.
    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

/// Result type alias using pogoda-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
