//! End-to-end tests for the pipelines contract through the gateway.
//!
//! The mock API server stands in for the real one; what matters here is
//! that the client's bytes arrive at the right path unchanged, and that
//! responses map back into the typed contract.

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use url::Url;

use web_gateway::api::{ApiClient, ApiError, StartPipelineRequest};
use web_gateway::Shutdown;

async fn gateway_with_api(api: &MockUpstream) -> (ApiClient, Shutdown) {
    let webroot = temp_webroot();
    write_file(&webroot, "version.json", r#"{"version":"1.16.0"}"#);
    let files = MockUpstream::fixed(StatusCode::OK, json!({})).await;
    let (addr, shutdown) =
        spawn_gateway(gateway_config(&webroot, &api.address(), &files.address())).await;

    let base = Url::parse(&format!("http://{addr}")).unwrap();
    (ApiClient::new(base), shutdown)
}

#[tokio::test]
async fn test_start_pipeline_roundtrip() {
    let api = MockUpstream::fixed(
        StatusCode::OK,
        json!({"pipeline": "d7f0e3a2b1", "enqueued": true}),
    )
    .await;
    let (client, _shutdown) = gateway_with_api(&api).await;

    let response = client
        .start_pipeline(&StartPipelineRequest::new("abc123"))
        .await
        .unwrap();

    assert_eq!(response.pipeline, "d7f0e3a2b1");
    assert!(response.enqueued);

    let seen = api.last();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.uri, "/v2.17/pipelines.start_pipeline");
    assert_eq!(seen.body_json(), json!({"task": "abc123"}));
}

#[tokio::test]
async fn test_start_pipeline_full_payload_shape() {
    let api = MockUpstream::fixed(
        StatusCode::OK,
        json!({"pipeline": "p-1", "enqueued": false}),
    )
    .await;
    let (client, _shutdown) = gateway_with_api(&api).await;

    let request = StartPipelineRequest::new("abc123")
        .with_queue("gpu")
        .with_arg("learning_rate", Some("0.1".to_string()))
        .with_arg("resume", None);
    let response = client.start_pipeline(&request).await.unwrap();

    assert!(!response.enqueued);
    assert_eq!(
        api.last().body_json(),
        json!({
            "task": "abc123",
            "queue": "gpu",
            "args": [
                {"name": "learning_rate", "value": "0.1"},
                {"name": "resume", "value": null},
            ],
        })
    );
}

#[tokio::test]
async fn test_api_error_status_surfaces() {
    let api = MockUpstream::fixed(
        StatusCode::BAD_REQUEST,
        json!({"error": "queue not found"}),
    )
    .await;
    let (client, _shutdown) = gateway_with_api(&api).await;

    let error = client
        .start_pipeline(&StartPipelineRequest::new("abc123"))
        .await
        .unwrap_err();

    match error {
        ApiError::Status { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("queue not found"), "{body}");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_request_is_rejected_before_sending() {
    let api = MockUpstream::fixed(StatusCode::OK, json!({})).await;
    let (client, _shutdown) = gateway_with_api(&api).await;

    let error = client
        .start_pipeline(&StartPipelineRequest::new(""))
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Schema(_)));
    assert_eq!(api.request_count(), 0);
}

#[tokio::test]
async fn test_site_version_through_client() {
    let api = MockUpstream::fixed(StatusCode::OK, json!({})).await;
    let (client, _shutdown) = gateway_with_api(&api).await;

    let manifest = client.site_version().await.unwrap();

    assert_eq!(manifest, json!({"version": "1.16.0"}));
}
