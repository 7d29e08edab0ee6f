//! Error types for fetching and decoding articles.
//!
//! Every failure of a fetch attempt ends up as a [`FetchError`].  Decoding
//! failures keep their own [`DecodeError`] so callers can tell a missing key
//! apart from a type mismatch without parsing message strings.

use thiserror::Error;

/// Why a single fetch attempt failed.
///
/// All variants are terminal for the attempt: nothing retries, and the
/// previously displayed article list stays in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request URL could not be built.  No network call was made.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// DNS, connect, timeout or body-read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The API answered with its own error body (bad key, rate limit, ...).
    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    /// The body did not decode as a response envelope.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// A classified JSON decoding failure.
///
/// `key` / `field` name the offending location, e.g. `status` or
/// `articles[2].source`.  `detail` is the decoder's own message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("missing field `{key}`: {detail}")]
    MissingField { key: String, detail: String },

    #[error("missing value for `{field}`: {detail}")]
    MissingValue { field: String, detail: String },

    #[error("type mismatch at `{field}`: {detail}")]
    TypeMismatch { field: String, detail: String },

    #[error("corrupted data: {detail}")]
    Corrupted { detail: String },

    #[error("{detail}")]
    Other { detail: String },
}

impl DecodeError {
    /// The key or field path this error points at, if it has one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { key, .. } => Some(key.as_str()),
            Self::MissingValue { field, .. } | Self::TypeMismatch { field, .. } => Some(field.as_str()),
            Self::Corrupted { .. } | Self::Other { .. } => None,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::MissingField { detail, .. }
            | Self::MissingValue { detail, .. }
            | Self::TypeMismatch { detail, .. }
            | Self::Corrupted { detail }
            | Self::Other { detail } => detail.as_str(),
        }
    }
}
