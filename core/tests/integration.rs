//! Round trips against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every execution mode
//! over real HTTP through `ReqwestTransport`. Validates that request building,
//! status checking and decoding agree with an actual server.

use mock_server::Echo;
use netcall_core::{
    FormFields, Headers, HttpMethod, NetworkClient, NetworkError, ParameterValue, Parameters,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

async fn start_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}")
}

fn client() -> NetworkClient {
    NetworkClient::builder().build().unwrap()
}

fn params(pairs: &[(&str, ParameterValue)]) -> Parameters {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[tokio::test]
async fn every_method_reaches_the_server() {
    let base = start_server().await;
    let client = client();
    let url = format!("{base}/echo");

    // Step 1: each verb without parameters — no body, no content type.
    for method in [HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete] {
        let echo: Echo = client.execute(&url, method, None, None).await.unwrap();
        assert_eq!(echo.method, method.as_str());
        assert!(echo.content_type.is_none(), "{method}");
        assert!(echo.body.is_empty(), "{method}");
    }

    // Step 2: each verb with parameters — JSON body and content type.
    let parameters = params(&[("pinned", true.into()), ("text", "Integration test".into())]);
    for method in [HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete] {
        let echo: Echo = client
            .execute(&url, method, Some(&parameters), None)
            .await
            .unwrap();
        assert_eq!(echo.method, method.as_str());
        assert_eq!(echo.content_type.as_deref(), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(&echo.body).unwrap();
        assert_eq!(body, serde_json::json!({"pinned": true, "text": "Integration test"}));
    }

    // Step 3: the same server answering outside the success range.
    let err = client
        .execute::<Echo>(&format!("{base}/status/404"), HttpMethod::Get, None, None)
        .await
        .unwrap_err();
    assert_eq!(err, NetworkError::HttpError(404));

    // Step 4: in range, but the body is not an `Echo`.
    let err = client
        .execute::<Echo>(&format!("{base}/status/200"), HttpMethod::Get, None, None)
        .await
        .unwrap_err();
    assert_eq!(err, NetworkError::DecodingError);
}

#[tokio::test]
async fn json_parameters_reach_the_server() {
    let base = start_server().await;
    let mut headers = Headers::new();
    headers.insert("content-type".to_string(), "text/plain".to_string());
    let parameters = params(&[
        ("key", "value".into()),
        ("nested", ParameterValue::map([("n", 1)])),
    ]);

    let echo: Echo = client()
        .execute(
            &format!("{base}/echo"),
            HttpMethod::Post,
            Some(&parameters),
            Some(&headers),
        )
        .await
        .unwrap();

    assert_eq!(echo.method, "POST");
    assert_eq!(echo.content_type.as_deref(), Some("application/json"));
    let body: serde_json::Value = serde_json::from_str(&echo.body).unwrap();
    assert_eq!(body, serde_json::json!({"key": "value", "nested": {"n": 1}}));
}

#[tokio::test]
async fn form_upload_reaches_the_server() {
    let base = start_server().await;
    let mut fields = FormFields::new();
    fields.insert("a".to_string(), "1".to_string());
    fields.insert("b".to_string(), "two".to_string());

    let echo: Echo = client()
        .upload_form(&format!("{base}/echo"), &fields, None)
        .await
        .unwrap();

    assert_eq!(echo.method, "POST");
    let content_type = echo.content_type.unwrap();
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap();
    assert_eq!(
        echo.body,
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n1\r\n\
             --{boundary}\r\nContent-Disposition: form-data; name=\"b\"\r\n\r\ntwo\r\n\
             --{boundary}--\r\n"
        )
    );
}

#[tokio::test]
async fn status_codes_are_validated() {
    let base = start_server().await;
    let client = client();

    let ok: serde_json::Value = client
        .execute(&format!("{base}/status/299"), HttpMethod::Get, None, None)
        .await
        .unwrap();
    assert_eq!(ok["status"], 299);

    for code in [300u16, 404, 500] {
        let err = client
            .execute::<serde_json::Value>(&format!("{base}/status/{code}"), HttpMethod::Get, None, None)
            .await
            .unwrap_err();
        assert_eq!(err, NetworkError::HttpError(code));
    }
}

#[tokio::test]
async fn empty_body_is_decoding_error() {
    let base = start_server().await;
    let err = client()
        .execute::<serde_json::Value>(&format!("{base}/empty"), HttpMethod::Get, None, None)
        .await
        .unwrap_err();
    assert_eq!(err, NetworkError::DecodingError);
}

#[tokio::test]
async fn connection_refused_is_unknown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client()
        .execute::<serde_json::Value>(&format!("http://{addr}/echo"), HttpMethod::Get, None, None)
        .await
        .unwrap_err();
    assert_eq!(err, NetworkError::Unknown);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn callback_and_detached_modes() {
    let base = start_server().await;
    let client = client();

    let (tx, rx) = oneshot::channel();
    client.execute_with_callback(
        &format!("{base}/echo"),
        HttpMethod::Put,
        None,
        None,
        move |result: Result<Echo, NetworkError>| {
            let _ = tx.send(result);
        },
    );
    assert_eq!(rx.await.unwrap().unwrap().method, "PUT");

    let echo = client
        .execute_detached::<Echo>(&format!("{base}/echo"), HttpMethod::Delete, None, None)
        .await
        .unwrap();
    assert_eq!(echo.method, "DELETE");

    let (tx, rx) = oneshot::channel();
    client.upload_form_with_callback(
        &format!("{base}/status/418"),
        &FormFields::new(),
        None,
        move |result: Result<serde_json::Value, NetworkError>| {
            let _ = tx.send(result);
        },
    );
    // /status only routes GET
    assert_eq!(rx.await.unwrap().unwrap_err(), NetworkError::HttpError(405));
}
