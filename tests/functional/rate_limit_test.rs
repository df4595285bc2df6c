//! Functional tests for rate limiting

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use tower::ServiceExt;
use inpaint_studio::middleware::rate_limit::RateLimitLayer;

fn create_test_app(rps: u32, burst: u32) -> Router {
    Router::new()
        .route("/", get(|| async { "index" }))
        .route(
            "/process_image",
            post(|| async { "OK" }).layer(RateLimitLayer::new(rps, burst)),
        )
}

fn process() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process_image")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_rate_limit_allows_within_limit() {
    let app = create_test_app(100, 100);

    let response = app.oneshot(process()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_exceeded() {
    let app = create_test_app(1, 1);

    let response = app.clone().oneshot(process()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(process()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["error"].as_str().unwrap().contains("Rate limit"));
}

#[tokio::test]
async fn test_other_routes_not_limited() {
    let app = create_test_app(1, 1);

    app.clone().oneshot(process()).await.unwrap();

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
