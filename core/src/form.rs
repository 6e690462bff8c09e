//! multipart/form-data encoding.
//!
//! # Design
//! Field names and values are written verbatim. Nothing is escaped and the
//! boundary is not checked against field content, so a value containing `"`,
//! CRLF or the boundary itself yields a malformed body rather than an error.
//! A fresh random boundary per call makes collisions unlikely in practice.

use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

use crate::error::NetworkError;
use crate::http::{Headers, HttpMethod, HttpRequest};
use crate::request::{parse_url, set_content_type};

/// Form field name to value. Encoded in name order.
pub type FormFields = BTreeMap<String, String>;

/// Token delimiting multipart sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary(String);

impl Boundary {
    /// A new random boundary, `Boundary-<UUID>`.
    pub fn generate() -> Self {
        Self(format!("Boundary-{}", Uuid::new_v4().to_string().to_uppercase()))
    }

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.0)
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode `fields` as a multipart/form-data body delimited by `boundary`.
pub fn encode_form_body(fields: &FormFields, boundary: &Boundary) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

/// Build a POST request carrying `fields` as multipart/form-data.
///
/// Caller headers are copied first; the multipart content type then replaces
/// any caller-supplied one.
pub fn build_form_request(
    url: &str,
    fields: &FormFields,
    boundary: &Boundary,
    headers: Option<&Headers>,
) -> Result<HttpRequest, NetworkError> {
    let url = parse_url(url)?;
    let mut headers = headers.cloned().unwrap_or_default();
    set_content_type(&mut headers, &boundary.content_type());

    Ok(HttpRequest {
        method: HttpMethod::Post,
        url,
        headers,
        body: Some(encode_form_body(fields, boundary)),
    })
}
