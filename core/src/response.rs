//! Response validation and typed decoding.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::NetworkError;

/// Accept any status in 200..=299; everything else is `HttpError` with the
/// status unchanged.
pub fn check_status(status: u16) -> Result<(), NetworkError> {
    if (200..=299).contains(&status) {
        return Ok(());
    }
    Err(NetworkError::HttpError(status))
}

/// Decode a JSON body into `T`. Parse failures and shape mismatches are both
/// `DecodingError`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, NetworkError> {
    serde_json::from_slice(bytes).map_err(|e| {
        warn!(error = %e, "response body does not match the requested type");
        NetworkError::DecodingError
    })
}
