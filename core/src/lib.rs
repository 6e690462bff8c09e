//! Typed HTTP calls over an injectable transport.
//!
//! # Overview
//! Given a URL, a method, optional JSON parameters and headers, `NetworkClient`
//! builds the request, sends it through a `Transport`, checks that the status
//! is in 200..=299 and decodes the body into the caller's type. A second path
//! posts string fields as multipart/form-data.
//!
//! # Design
//! - Each stage is a plain function over plain data: `build_request`,
//!   `build_form_request`, `check_status`, `decode`. Only `NetworkClient`
//!   performs I/O, and only through the `Transport` trait.
//! - Calls either suspend the caller (`execute`), run as a detached task
//!   (`execute_detached`), or report through a completion callback invoked
//!   exactly once (`execute_with_callback`).
//! - Every failure is one of the five `NetworkError` variants.
//! - Bodies are logged only when `ClientConfig::log_bodies` is set.

pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod params;
pub mod request;
pub mod response;
pub mod transport;

pub use client::{NetworkClient, NetworkClientBuilder, PendingCall};
pub use config::ClientConfig;
pub use error::{BuildError, NetworkError, TransportError};
pub use form::{build_form_request, encode_form_body, Boundary, FormFields};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse, UnknownMethod};
pub use params::{ParameterValue, Parameters};
pub use request::build_request;
pub use response::{check_status, decode};
pub use transport::{ReqwestTransport, Transport};
