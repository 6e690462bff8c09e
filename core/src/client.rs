//! Executes requests against a `Transport` and decodes typed results.
//!
//! # Design
//! `NetworkClient` holds a shared transport, a `ClientConfig` and an optional
//! runtime handle; it carries no per-call state, so clones are cheap and calls
//! are independent. Every call runs the same pipeline: build the request,
//! one transport round trip, status check, decode.
//!
//! Three shapes are offered over that pipeline:
//! - `execute` / `upload_form` suspend the caller until the result is ready.
//! - `execute_detached` runs the call as a Tokio task and returns a future for
//!   its single result.
//! - `execute_with_callback` / `upload_form_with_callback` return immediately
//!   and invoke the completion exactly once, possibly on another thread.
//!
//! Nothing is retried and no timeout is imposed beyond the transport's own.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::error::{BuildError, NetworkError};
use crate::form::{build_form_request, Boundary, FormFields};
use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse};
use crate::params::Parameters;
use crate::request::build_request;
use crate::response::{check_status, decode};
use crate::transport::{ReqwestTransport, Transport};

/// Typed HTTP client over an injected `Transport`.
#[derive(Clone)]
pub struct NetworkClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    runtime: Option<Handle>,
}

impl fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkClient")
            .field("config", &self.config)
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}

impl NetworkClient {
    /// Client over `transport` with the default configuration.
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            config: ClientConfig::default(),
            runtime: None,
        }
    }

    /// Builder seeded with `ClientConfig::from_env()`.
    pub fn builder() -> NetworkClientBuilder {
        NetworkClientBuilder {
            config: ClientConfig::from_env(),
            ..NetworkClientBuilder::default()
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a JSON request, send it and decode the response body as `T`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        url: &str,
        method: HttpMethod,
        parameters: Option<&Parameters>,
        headers: Option<&Headers>,
    ) -> Result<T, NetworkError> {
        let request = build_request(url, method, parameters, headers)?;
        self.round_trip(request).await
    }

    /// POST `fields` as multipart/form-data under a fresh boundary and decode
    /// the response body as `T`.
    pub async fn upload_form<T: DeserializeOwned>(
        &self,
        url: &str,
        fields: &FormFields,
        headers: Option<&Headers>,
    ) -> Result<T, NetworkError> {
        let request = build_form_request(url, fields, &Boundary::generate(), headers)?;
        self.round_trip(request).await
    }

    /// Run `execute` as a background task.
    ///
    /// The returned future resolves to the call's result. Build errors are
    /// available immediately; a task that dies before producing a result
    /// resolves to `Unknown`. Without a runtime the call runs on a fallback
    /// thread.
    pub fn execute_detached<T>(
        &self,
        url: &str,
        method: HttpMethod,
        parameters: Option<&Parameters>,
        headers: Option<&Headers>,
    ) -> PendingCall<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        match build_request(url, method, parameters, headers) {
            Ok(request) => {
                let client = self.clone();
                self.spawn(async move {
                    let result = client.round_trip(request).await;
                    // receiver dropped: nobody is waiting
                    let _ = tx.send(result);
                });
            }
            Err(err) => {
                let _ = tx.send(Err(err));
            }
        }

        PendingCall { rx }
    }

    /// Run `execute` in the background and hand the result to `on_complete`.
    ///
    /// Returns immediately. `on_complete` runs exactly once: on the caller's
    /// thread for build errors, otherwise on whichever thread finishes the
    /// call. Callers must provide their own ordering across callbacks.
    pub fn execute_with_callback<T, F>(
        &self,
        url: &str,
        method: HttpMethod,
        parameters: Option<&Parameters>,
        headers: Option<&Headers>,
        on_complete: F,
    ) where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, NetworkError>) + Send + 'static,
    {
        let request = build_request(url, method, parameters, headers);
        self.dispatch(request, on_complete);
    }

    /// Callback form of `upload_form`.
    pub fn upload_form_with_callback<T, F>(
        &self,
        url: &str,
        fields: &FormFields,
        headers: Option<&Headers>,
        on_complete: F,
    ) where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, NetworkError>) + Send + 'static,
    {
        let request = build_form_request(url, fields, &Boundary::generate(), headers);
        self.dispatch(request, on_complete);
    }

    fn dispatch<T, F>(&self, request: Result<HttpRequest, NetworkError>, on_complete: F)
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, NetworkError>) + Send + 'static,
    {
        let completion = Completion::new(on_complete);
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                completion.complete(Err(err));
                return;
            }
        };

        let client = self.clone();
        self.spawn(async move {
            // The call runs in its own task so a panic inside the transport
            // surfaces as a JoinError instead of losing the completion.
            let call = tokio::spawn(async move { client.round_trip::<T>(request).await });
            let result = call.await.unwrap_or_else(|e| {
                error!(error = %e, "request task did not finish");
                Err(NetworkError::Unknown)
            });
            completion.complete(result);
        });
    }

    /// Spawn on the configured or ambient runtime, or on a fallback thread.
    fn spawn<Fut>(&self, future: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        match self.runtime_handle() {
            Some(runtime) => {
                runtime.spawn(future);
            }
            None => {
                debug!("no Tokio runtime available, using a fallback thread");
                spawn_fallback(future);
            }
        }
    }

    fn runtime_handle(&self) -> Option<Handle> {
        self.runtime.clone().or_else(|| Handle::try_current().ok())
    }

    async fn round_trip<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, NetworkError> {
        let method = request.method;
        let url = request.url.clone();
        self.log_request(&request);

        let HttpResponse { status, body, .. } =
            self.transport.send(request).await.map_err(|e| {
                error!(%method, %url, error = %e, "transport failed");
                NetworkError::from(e)
            })?;

        let Some(body) = body else {
            warn!(%method, %url, status, "transport returned no data");
            return Err(NetworkError::NoData);
        };
        self.log_response(method, &url, status, &body);

        check_status(status).inspect_err(|_| {
            warn!(%method, %url, status, "unsuccessful status");
        })?;
        decode(&body)
    }

    fn log_request(&self, request: &HttpRequest) {
        let body = request.body.as_deref().unwrap_or_default();
        if self.config.log_bodies {
            debug!(
                method = %request.method,
                url = %request.url,
                body = %String::from_utf8_lossy(body),
                "sending request"
            );
        } else {
            debug!(
                method = %request.method,
                url = %request.url,
                body_len = body.len(),
                "sending request"
            );
        }
    }

    fn log_response(&self, method: HttpMethod, url: &url::Url, status: u16, body: &[u8]) {
        if self.config.log_bodies {
            debug!(%method, %url, status, body = %String::from_utf8_lossy(body), "received response");
        } else {
            debug!(%method, %url, status, body_len = body.len(), "received response");
        }
    }
}

/// Run `future` on a new thread with its own current-thread runtime.
///
/// If the thread or the runtime cannot start, `future` is dropped without
/// being polled; callers rely on their drop guards to report `Unknown`.
fn spawn_fallback<Fut>(future: Fut)
where
    Fut: Future<Output = ()> + Send + 'static,
{
    let spawned = std::thread::Builder::new()
        .name("netcall-fallback".to_string())
        .spawn(move || {
            match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime.block_on(future),
                Err(e) => error!(error = %e, "failed to start fallback runtime"),
            }
        });
    if let Err(e) = spawned {
        error!(error = %e, "failed to spawn fallback thread");
    }
}

/// Configures a `NetworkClient` before construction.
///
/// # Defaults
/// - Transport: `ReqwestTransport` with reqwest's default settings.
/// - Config: `ClientConfig::default()`, or the environment when obtained
///   through `NetworkClient::builder()`.
/// - Runtime: the Tokio runtime current at call time, else a fallback thread
///   per call running its own current-thread runtime.
#[derive(Default)]
pub struct NetworkClientBuilder {
    transport: Option<Arc<dyn Transport>>,
    config: ClientConfig,
    runtime: Option<Handle>,
}

impl fmt::Debug for NetworkClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkClientBuilder")
            .field("custom_transport", &self.transport.is_some())
            .field("config", &self.config)
            .field("runtime", &self.runtime)
            .finish()
    }
}

impl NetworkClientBuilder {
    pub fn transport<T: Transport + 'static>(&mut self, transport: T) -> &mut Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn config(&mut self, config: ClientConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn log_bodies(&mut self, enabled: bool) -> &mut Self {
        self.config.log_bodies = enabled;
        self
    }

    /// Runtime used for detached and callback calls.
    pub fn runtime(&mut self, handle: Handle) -> &mut Self {
        self.runtime = Some(handle);
        self
    }

    pub fn build(&self) -> Result<NetworkClient, BuildError> {
        let transport = match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => Arc::new(ReqwestTransport::new()?) as Arc<dyn Transport>,
        };
        Ok(NetworkClient {
            transport,
            config: self.config.clone(),
            runtime: self.runtime.clone(),
        })
    }
}

/// Result of `NetworkClient::execute_detached`.
#[derive(Debug)]
#[must_use = "the call runs regardless, but its result is lost unless awaited"]
pub struct PendingCall<T> {
    rx: oneshot::Receiver<Result<T, NetworkError>>,
}

impl<T> Future for PendingCall<T> {
    type Output = Result<T, NetworkError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(NetworkError::Unknown)))
    }
}

/// Owns a completion callback until it has run.
///
/// Dropped without `complete` (for example when the runtime shuts down with
/// the task still queued, or the fallback thread cannot start), it delivers
/// `Unknown`.
struct Completion<T, F>
where
    F: FnOnce(Result<T, NetworkError>),
{
    on_complete: Option<F>,
    _result: PhantomData<fn(T)>,
}

impl<T, F> Completion<T, F>
where
    F: FnOnce(Result<T, NetworkError>),
{
    fn new(on_complete: F) -> Self {
        Self {
            on_complete: Some(on_complete),
            _result: PhantomData,
        }
    }

    fn complete(mut self, result: Result<T, NetworkError>) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(result);
        }
    }
}

impl<T, F> Drop for Completion<T, F>
where
    F: FnOnce(Result<T, NetworkError>),
{
    fn drop(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(Err(NetworkError::Unknown));
        }
    }
}
