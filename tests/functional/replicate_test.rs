//! Functional tests for the Replicate provider against a mock API

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use inpaint_studio::config::{ProviderConfig, Settings};
use inpaint_studio::error::AppError;
use inpaint_studio::provider::{InpaintProvider, InpaintRequest, ReplicateProvider};

const PREDICTIONS: &str = "/models/ideogram-ai/ideogram-v2-turbo/predictions";
const OUTPUT: &[u8] = b"\x89PNG\r\n\x1a\nfake model output";

fn provider_for(server: &MockServer) -> ReplicateProvider {
    let config = ProviderConfig {
        api_base: server.uri(),
        api_token: "r8_test".to_string(),
        poll_interval_ms: 10,
        poll_timeout_secs: 5,
        ..Settings::default().provider
    };
    ReplicateProvider::new(&config).unwrap()
}

fn request() -> InpaintRequest {
    InpaintRequest {
        image: b"image-bytes".to_vec(),
        mask: b"mask-bytes".to_vec(),
        prompt: "a lighthouse at dusk".to_string(),
    }
}

async fn mount_output(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/files/out.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(OUTPUT.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_successful_prediction_downloads_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREDICTIONS))
        .and(header("authorization", "Bearer r8_test"))
        .and(header("prefer", "wait"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "p1",
            "status": "succeeded",
            "output": format!("{}/files/out.png", server.uri()),
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_output(&server).await;

    let bytes = provider_for(&server).inpaint(request()).await.unwrap();
    assert_eq!(bytes, OUTPUT);
}

#[tokio::test]
async fn test_request_carries_inline_images_and_fixed_options() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREDICTIONS))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "p1",
            "status": "succeeded",
            "output": [format!("{}/files/out.png", server.uri())],
        })))
        .mount(&server)
        .await;
    mount_output(&server).await;

    provider_for(&server).inpaint(request()).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let create = received
        .iter()
        .find(|r| r.url.path() == PREDICTIONS)
        .unwrap();
    let body: Value = serde_json::from_slice(&create.body).unwrap();
    let input = &body["input"];

    assert_eq!(input["prompt"], "a lighthouse at dusk");
    assert_eq!(input["aspect_ratio"], "1:1");
    assert_eq!(input["magic_prompt_option"], "Auto");
    assert_eq!(input["image"], "data:image/png;base64,aW1hZ2UtYnl0ZXM=");
    assert_eq!(input["mask"], "data:image/png;base64,bWFzay1ieXRlcw==");
    assert!(input.get("resolution").is_none());
    assert!(input.get("style_type").is_none());
}

#[tokio::test]
async fn test_pending_prediction_is_polled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREDICTIONS))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "p2",
            "status": "starting",
            "urls": { "get": format!("{}/predictions/p2", server.uri()) },
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/predictions/p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p2",
            "status": "succeeded",
            "output": format!("{}/files/out.png", server.uri()),
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_output(&server).await;

    let bytes = provider_for(&server).inpaint(request()).await.unwrap();
    assert_eq!(bytes, OUTPUT);
}

#[tokio::test]
async fn test_data_url_output_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREDICTIONS))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "status": "succeeded",
            "output": "data:image/png;base64,SGVsbG8sIFdvcmxkIQ==",
        })))
        .mount(&server)
        .await;

    let bytes = provider_for(&server).inpaint(request()).await.unwrap();
    assert_eq!(bytes, b"Hello, World!");
}

#[tokio::test]
async fn test_auth_failure_is_call_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREDICTIONS))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Invalid token."
        })))
        .mount(&server)
        .await;

    let err = provider_for(&server).inpaint(request()).await.unwrap_err();
    assert!(matches!(err, AppError::ProviderCall(_)));
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_failed_prediction_is_call_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREDICTIONS))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "status": "failed",
            "error": "NSFW content detected",
        })))
        .mount(&server)
        .await;

    let err = provider_for(&server).inpaint(request()).await.unwrap_err();
    assert!(matches!(err, AppError::ProviderCall(_)));
    assert!(err.to_string().contains("NSFW content detected"));
}

#[tokio::test]
async fn test_missing_output_is_output_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREDICTIONS))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "status": "succeeded",
            "output": null,
        })))
        .mount(&server)
        .await;

    let err = provider_for(&server).inpaint(request()).await.unwrap_err();
    assert!(matches!(err, AppError::ProviderOutput(_)));
}

#[tokio::test]
async fn test_empty_download_is_output_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREDICTIONS))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "status": "succeeded",
            "output": format!("{}/files/empty.png", server.uri()),
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/empty.png"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = provider_for(&server).inpaint(request()).await.unwrap_err();
    assert!(matches!(err, AppError::ProviderOutput(_)));
}

#[tokio::test]
async fn test_unreachable_api_is_call_error() {
    let config = ProviderConfig {
        api_base: "http://127.0.0.1:9".to_string(),
        api_token: "r8_test".to_string(),
        ..Settings::default().provider
    };
    let provider = ReplicateProvider::new(&config).unwrap();

    let err = provider.inpaint(request()).await.unwrap_err();
    assert!(matches!(err, AppError::ProviderCall(_)));
}
