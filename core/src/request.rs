//! Request builder for JSON calls.
//!
//! Turns `(url, method, parameters, headers)` into an `HttpRequest` without any
//! I/O. Failures here are reported before the transport is ever touched.

use tracing::debug;
use url::Url;

use crate::error::NetworkError;
use crate::http::{Headers, HttpMethod, HttpRequest};
use crate::params::Parameters;

pub(crate) const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";

/// Build a request descriptor.
///
/// Caller headers are copied verbatim. When `parameters` is present it is
/// serialized as the JSON body and `Content-Type: application/json` replaces
/// any caller-supplied content type.
pub fn build_request(
    url: &str,
    method: HttpMethod,
    parameters: Option<&Parameters>,
    headers: Option<&Headers>,
) -> Result<HttpRequest, NetworkError> {
    let url = parse_url(url)?;
    let mut headers = headers.cloned().unwrap_or_default();

    let body = match parameters {
        Some(parameters) => {
            let body = serde_json::to_vec(parameters).map_err(|e| {
                debug!(error = %e, "request parameters are not representable as JSON");
                NetworkError::Unknown
            })?;
            set_content_type(&mut headers, APPLICATION_JSON);
            Some(body)
        }
        None => None,
    };

    Ok(HttpRequest {
        method,
        url,
        headers,
        body,
    })
}

/// Parse an absolute URL.
pub(crate) fn parse_url(text: &str) -> Result<Url, NetworkError> {
    Url::parse(text).map_err(|e| {
        debug!(url = text, error = %e, "rejecting invalid URL");
        NetworkError::InvalidUrl
    })
}

/// Replace any existing content type, whatever the key's casing.
pub(crate) fn set_content_type(headers: &mut Headers, value: &str) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(CONTENT_TYPE));
    headers.insert(CONTENT_TYPE.to_string(), value.to_string());
}
