//! Error types for the network client.
//!
//! # Design
//! `NetworkError` is the only error a caller of `NetworkClient` ever sees. Its
//! variants follow the pipeline stage that failed: building the request
//! (`InvalidUrl`, `Unknown`), the transport round trip (`Unknown`, `NoData`),
//! the status check (`HttpError`) and decoding (`DecodingError`). Variants
//! carry no detail beyond the status code so callers can match on them
//! exhaustively; the underlying cause is logged where the failure happens.

use thiserror::Error;

/// Errors returned by request building and by every execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum NetworkError {
    /// The URL text is not a valid absolute URL.
    #[error("invalid URL")]
    InvalidUrl,

    /// The server answered with a status outside 200..=299.
    #[error("HTTP error: status {0}")]
    HttpError(u16),

    /// The response body does not match the requested type.
    #[error("response could not be decoded")]
    DecodingError,

    /// The transport completed without delivering any data.
    #[error("no data received")]
    NoData,

    /// Parameter serialization failed, the transport failed, or the
    /// background task died before producing a result.
    #[error("unknown network error")]
    Unknown,
}

/// Failure reported by a `Transport` implementation.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct TransportError(Box<dyn std::error::Error + Send + Sync>);

impl TransportError {
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self(err.into())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err)
    }
}

impl From<TransportError> for NetworkError {
    fn from(_: TransportError) -> Self {
        NetworkError::Unknown
    }
}

/// Errors that can occur while building a `NetworkClient`.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The default reqwest transport could not be constructed.
    #[error("failed to build the HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
