//! Integration tests for dispatching through the reqwest-backed client.

use std::time::Duration;

use api_dispatch::http::HttpClientBuilder;
use api_dispatch::{EndpointDescriptor, RequestDispatcher, SendOptions};
use serde_json::json;
use wiremock::matchers::{
    body_json, body_string_contains, header, header_regex, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn library(server: &MockServer) -> RequestDispatcher {
    RequestDispatcher::builder(server.uri())
        .token("Bearer shelf-token")
        .api(
            "listBooks",
            EndpointDescriptor::get("/accounts/:accountId/books").with_auth(),
        )
        .api(
            "createBook",
            EndpointDescriptor::post("/accounts/:accountId/books")
                .error_message(409, "book already exists"),
        )
        .api(
            "getBook",
            EndpointDescriptor::get("/books/:bookId").error_message(404, "no such book"),
        )
        .http_client_builder(HttpClientBuilder::new().timeout(Duration::from_secs(5)))
        .build()
        .expect("Failed to build dispatcher")
}

#[tokio::test]
async fn test_get_with_query_and_auth() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/a1/books"))
        .and(query_param("limit", "10"))
        .and(header("authorization", "Bearer shelf-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"title": "Dune"}])))
        .expect(1)
        .mount(&server)
        .await;

    let result = library(&server)
        .send(
            SendOptions::new("listBooks")
                .path_param("accountId", "a1")
                .query("limit", 10),
        )
        .await;

    assert_eq!(result.status, 200);
    assert!(result.ok);
    assert_eq!(result.err_msg, "");
    assert_eq!(result.data.unwrap()[0]["title"], "Dune");
}

#[tokio::test]
async fn test_post_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts/a1/books"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"title": "Dune", "pages": 412})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let result = library(&server)
        .send(
            SendOptions::new("createBook")
                .path_param("accountId", "a1")
                .data(json!({"title": "Dune", "pages": 412})),
        )
        .await;

    assert_eq!(result.status, 201);
    assert!(result.ok);
    assert_eq!(result.data, Some(json!({"id": 7})));
}

#[tokio::test]
async fn test_post_without_auth_has_no_authorization_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts/a1/books"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .mount(&server)
        .await;

    let result = library(&server)
        .send(SendOptions::new("createBook").path_param("accountId", "a1"))
        .await;
    assert!(result.ok);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_error_status_with_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/books/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "missing"})))
        .mount(&server)
        .await;

    let result = library(&server)
        .send(SendOptions::new("getBook").path_param("bookId", 404))
        .await;

    assert_eq!(result.status, 404);
    assert!(!result.ok);
    assert_eq!(result.err_msg, "no such book");
    assert_eq!(result.data.unwrap()["error"], "missing");
}

#[tokio::test]
async fn test_multipart_form_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts/a1/books"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"title\""))
        .and(body_string_contains("Dune"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 8})))
        .expect(1)
        .mount(&server)
        .await;

    let result = library(&server)
        .send(
            SendOptions::new("createBook")
                .path_param("accountId", "a1")
                .data(json!({"title": "Dune", "tags": ["scifi"]}))
                .form_data(),
        )
        .await;

    assert_eq!(result.status, 201);
    assert!(result.ok);

    let requests = server.received_requests().await.unwrap();
    let content_types: Vec<_> = requests[0].headers.get_all("content-type").iter().collect();
    assert_eq!(content_types.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("[\"scifi\"]"));
}

#[tokio::test]
async fn test_connection_refused_is_transport_failure() {
    let dispatcher = RequestDispatcher::builder("http://127.0.0.1:1")
        .api("ping", EndpointDescriptor::get("/ping"))
        .http_client_builder(HttpClientBuilder::new().timeout(Duration::from_secs(5)))
        .build()
        .expect("Failed to build dispatcher");

    let result = dispatcher.send(SendOptions::new("ping")).await;

    assert_eq!(result.status, -1);
    assert!(!result.ok);
    assert!(!result.err_msg.is_empty());
    assert!(result.data.is_none());
}

#[tokio::test]
async fn test_non_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/books/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>shelf</html>"))
        .mount(&server)
        .await;

    let result = library(&server)
        .send(SendOptions::new("getBook").path_param("bookId", 1))
        .await;

    assert_eq!(result.status, 0);
    assert!(!result.ok);
    assert!(result.err_msg.starts_with("JSON error"));
    assert!(result.data.is_none());
}

#[tokio::test]
async fn test_user_agent_and_default_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(header("user-agent", "shelf/1.0"))
        .and(header("x-client", "bookshelf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pong": true})))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = RequestDispatcher::builder(server.uri())
        .api("ping", EndpointDescriptor::get("/ping"))
        .default_header("X-Client", "bookshelf")
        .http_client_builder(HttpClientBuilder::new().user_agent("shelf/1.0"))
        .build()
        .expect("Failed to build dispatcher");

    let result = dispatcher.send(SendOptions::new("ping")).await;
    assert!(result.ok);
    assert_eq!(result.data, Some(json!({"pong": true})));
}
