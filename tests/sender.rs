//! Integration tests for the HTTP request sender, against a wiremock server.

use std::collections::HashMap;

use oauth2_provider_client::{
    CookieMode, Error, HttpRequestSender, Params, DEFAULT_USER_AGENT,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_ok(server: &MockServer, request_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(request_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn query_map(request: &wiremock::Request) -> HashMap<String, String> {
    request
        .url
        .query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

#[tokio::test]
async fn get_query_is_union_of_existing_and_supplied_params() {
    let server = MockServer::start().await;
    mock_ok(&server, "/get", "ok").await;

    let sender = HttpRequestSender::new().unwrap();
    let url = format!("{}/get?test=1", server.uri());
    sender
        .get(&url, Params::pairs([("x", "1"), ("y", "2")]), Vec::new())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let query = query_map(&requests[0]);
    assert_eq!(query.get("test").map(String::as_str), Some("1"));
    assert_eq!(query.get("x").map(String::as_str), Some("1"));
    assert_eq!(query.get("y").map(String::as_str), Some("2"));
    assert_eq!(query.len(), 3);
}

#[tokio::test]
async fn get_with_raw_query_string_appends_verbatim() {
    let server = MockServer::start().await;
    mock_ok(&server, "/get", "ok").await;

    let sender = HttpRequestSender::new().unwrap();
    let url = format!("{}/get", server.uri());
    sender
        .get(&url, Params::Raw("x=1&y=2".to_string()), Vec::new())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let query = query_map(&requests[0]);
    assert_eq!(query.get("x").map(String::as_str), Some("1"));
    assert_eq!(query.get("y").map(String::as_str), Some("2"));
}

#[tokio::test]
async fn post_pairs_are_sent_as_multipart_form_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/post"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let sender = HttpRequestSender::new().unwrap();
    let url = format!("{}/post", server.uri());
    sender
        .post(&url, Params::pairs([("x", "1"), ("y", "2")]), Vec::new())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    let content_type = request
        .headers
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"x\""));
    assert!(body.contains("name=\"y\""));
}

#[tokio::test]
async fn post_raw_string_is_sent_as_body_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/post"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let sender = HttpRequestSender::new().unwrap();
    let url = format!("{}/post", server.uri());
    sender
        .post(&url, Params::Raw("x=1&y=2".to_string()), Vec::new())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].body, b"x=1&y=2");
}

#[tokio::test]
async fn custom_and_default_headers_reach_the_server() {
    let server = MockServer::start().await;
    mock_ok(&server, "/headers", "ok").await;

    let sender = HttpRequestSender::new().unwrap();
    let url = format!("{}/headers", server.uri());
    sender
        .get(
            &url,
            Params::None,
            vec![("Custom-Header".to_string(), "custom value".to_string())],
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let headers = &requests[0].headers;
    assert_eq!(
        headers
            .get("custom-header")
            .and_then(|value| value.to_str().ok()),
        Some("custom value")
    );
    assert_eq!(
        headers
            .get("user-agent")
            .and_then(|value| value.to_str().ok()),
        Some(DEFAULT_USER_AGENT)
    );
    assert!(headers.get("accept-language").is_some());
}

#[tokio::test]
async fn cookies_round_trip_across_requests_on_one_sender() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/set-x"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "x=1; Path=/"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/set-y"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "y=2; Path=/"),
        )
        .mount(&server)
        .await;
    mock_ok(&server, "/echo", "ok").await;

    let mut sender = HttpRequestSender::new().unwrap();
    sender.use_cookie(CookieMode::TempFile).unwrap();

    sender
        .get(&format!("{}/set-x", server.uri()), Params::None, Vec::new())
        .await
        .unwrap();
    sender
        .get(&format!("{}/set-y", server.uri()), Params::None, Vec::new())
        .await
        .unwrap();
    sender
        .get(&format!("{}/echo", server.uri()), Params::None, Vec::new())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let cookie = requests[2]
        .headers
        .get("cookie")
        .and_then(|value| value.to_str().ok())
        .unwrap();
    assert!(cookie.contains("x=1"));
    assert!(cookie.contains("y=2"));
}

#[tokio::test]
async fn cookie_jar_file_persists_across_sender_instances() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/set"))
        .respond_with(
            // Max-Age makes the cookie persistent, so it is written to the jar.
            ResponseTemplate::new(200).insert_header("set-cookie", "x=1; Path=/; Max-Age=3600"),
        )
        .mount(&server)
        .await;
    mock_ok(&server, "/echo", "ok").await;

    let dir = tempfile::tempdir().unwrap();
    let jar_path = dir.path().join("jar.cookies");

    {
        let mut sender = HttpRequestSender::new().unwrap();
        sender.use_cookie(CookieMode::File(jar_path.clone())).unwrap();
        sender
            .get(&format!("{}/set", server.uri()), Params::None, Vec::new())
            .await
            .unwrap();
    }
    assert!(jar_path.exists());

    let mut sender = HttpRequestSender::new().unwrap();
    sender.use_cookie(CookieMode::File(jar_path)).unwrap();
    sender
        .get(&format!("{}/echo", server.uri()), Params::None, Vec::new())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let cookie = requests[1]
        .headers
        .get("cookie")
        .and_then(|value| value.to_str().ok())
        .unwrap();
    assert!(cookie.contains("x=1"));
}

#[tokio::test]
async fn http_error_statuses_are_returned_as_ordinary_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad code"))
        .mount(&server)
        .await;

    let sender = HttpRequestSender::new().unwrap();
    let body = sender
        .get(&format!("{}/bad", server.uri()), Params::None, Vec::new())
        .await
        .unwrap();

    assert_eq!(body, "bad code");
    assert_eq!(sender.last_status(), 400);
    assert_eq!(sender.last_error_code(), 0);
    assert_eq!(sender.last_error_message(), "");
}

#[tokio::test]
async fn transport_failure_populates_error_state() {
    let sender = HttpRequestSender::new().unwrap();
    // Nothing listens on port 9.
    let result = sender
        .get("http://127.0.0.1:9/", Params::None, Vec::new())
        .await;

    assert!(matches!(result, Err(Error::Transport(_))));
    assert_ne!(sender.last_error_code(), 0);
    assert!(!sender.last_error_message().is_empty());
    assert_eq!(sender.last_response_body(), "");
    assert_eq!(sender.last_response_headers(), "");
}

#[tokio::test]
async fn accessors_reflect_only_the_most_recent_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-marker", "one")
                .set_body_string("first body"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(ResponseTemplate::new(404).set_body_string("second body"))
        .mount(&server)
        .await;

    let sender = HttpRequestSender::new().unwrap();
    sender
        .get(
            &format!("{}/first", server.uri()),
            Params::None,
            vec![("Custom-Header".to_string(), "value".to_string())],
        )
        .await
        .unwrap();

    assert!(sender.last_response_headers().starts_with("HTTP/1.1 200"));
    assert!(sender.last_response_headers().contains("x-marker"));
    assert_eq!(sender.last_response_body(), "first body");
    assert!(sender.last_request_headers().contains("custom-header"));

    sender
        .get(&format!("{}/second", server.uri()), Params::None, Vec::new())
        .await
        .unwrap();

    assert!(sender.last_response_headers().starts_with("HTTP/1.1 404"));
    assert_eq!(sender.last_response_body(), "second body");
    assert_eq!(sender.last_status(), 404);
    assert!(!sender.last_request_headers().contains("custom-header"));
}
