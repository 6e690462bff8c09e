use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::debug;

/// What `/echo` saw: the verb, the content type and the raw body as text.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub content_type: Option<String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", get(echo).post(echo).put(echo).delete(echo))
        .route("/status/{code}", get(status))
        .route("/empty", get(empty))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    debug!(%method, body_len = body.len(), "echo");
    Json(Echo {
        method: method.to_string(),
        content_type,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Answers with the requested status and `{"status": code}`; codes outside
/// 100..=999 are a 400.
async fn status(Path(code): Path<u16>) -> (StatusCode, Json<serde_json::Value>) {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, Json(serde_json::json!({ "status": code }))),
        Err(_) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "unsupported status" })),
        ),
    }
}

async fn empty() -> StatusCode {
    StatusCode::OK
}
