//! Error types for pogoda-core.
//!
//! Every outbound call fails in one of a few ways, and callers treat them
//! differently:
//!
//! | Error | Meaning | Typical handling |
//! |-------|---------|------------------|
//! | [`Error::Transport`] | Provider unreachable, connection reset, timeout | Report, do not retry |
//! | [`Error::HttpStatus`] | Provider answered with a non-2xx status | Report, do not retry |
//! | [`Error::Decode`] | Body was not the JSON shape we expect | Report |
//! | [`Error::Parse`] | A field had an unusable value (e.g. coordinates) | Report |
//! | [`Error::InvalidUrl`] / [`Error::ClientBuild`] | Misconfiguration at startup | Fix config |
//!
//! An empty geocoding result is not an error; clients return `Ok(vec![])`.

use pogoda_types::ParseError;

/// Boxed error source for transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when talking to the geocoding or forecast provider.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The configured base URL is unusable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The request never produced a response (DNS, connect, timeout, reset).
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The provider answered with a non-success status code.
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The response body could not be decoded.
    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// A decoded field carried an unusable value.
    #[error("Malformed provider data: {0}")]
    Parse(#[from] ParseError),
}

impl Error {
    /// Whether the request failed before any response arrived.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }

    /// The HTTP status code, for [`Error::HttpStatus`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for pogoda-core operations.
pub type Result<T> = std::result::Result<T, Error>;
