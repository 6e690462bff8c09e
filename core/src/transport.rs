//! The transport seam: whatever actually performs the HTTP round trip.
//!
//! # Design
//! `NetworkClient` only ever talks to `dyn Transport`, so tests inject a fake
//! that records requests and returns canned responses. `ReqwestTransport` is
//! the production implementation and applies no policy of its own: timeouts,
//! redirects and connection reuse are whatever reqwest does by default.

use async_trait::async_trait;

use crate::error::{BuildError, TransportError};
use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse};

const DEFAULT_USER_AGENT: &str = concat!("netcall/", env!("CARGO_PKG_VERSION"));

/// Executes one HTTP round trip.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the status, headers and body. Non-2xx
    /// statuses are responses, not errors.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, BuildError> {
        let inner = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { inner })
    }

    /// Wrap an already configured client.
    pub fn with_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .inner
            .request(to_reqwest_method(request.method), request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body: Some(body.to_vec()),
        })
    }
}
