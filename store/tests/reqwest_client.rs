//! Tests for the reqwest-backed transport against a local mock server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use formdeck_core::Problem;
use formdeck_store::{HttpClient, HttpError, ReqwestClient};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn a_2xx_response_carries_the_parsed_body_and_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/projects"))
        .and(header("Authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1, "name": "Crops" }])))
        .mount(&server)
        .await;

    let client = ReqwestClient::new(server.uri());
    let response = client
        .get(
            "/v1/projects",
            &[("Authorization".to_string(), "Bearer tok123".to_string())],
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.url, format!("{}/v1/projects", server.uri()));
    assert_eq!(response.body[0]["name"], "Crops");
}

#[tokio::test]
async fn a_non_2xx_response_is_a_status_error_with_the_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/config/backups"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "code": 404.1, "message": "Not found." })),
        )
        .mount(&server)
        .await;

    let client = ReqwestClient::new(server.uri());
    let error = client.get("/v1/config/backups", &[]).await.unwrap_err();

    match error {
        HttpError::Status { response } => {
            assert_eq!(response.status, 404);
            let problem = Problem::from_value(&response.body).unwrap();
            assert!(problem.is_code(404.1));
        },
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn a_non_json_body_is_carried_as_null() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/whatever"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = ReqwestClient::new(server.uri());
    let response = client.get("/v1/whatever", &[]).await.unwrap();

    assert_eq!(response.body, serde_json::Value::Null);
}

#[tokio::test]
async fn a_connection_failure_is_a_transport_error() {
    // Port 1 is never listening.
    let client = ReqwestClient::new("http://127.0.0.1:1");
    let error = client.get("/v1/users", &[]).await.unwrap_err();
    assert!(matches!(error, HttpError::Transport(_)));
}
