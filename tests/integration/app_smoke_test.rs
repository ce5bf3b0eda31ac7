//! Smoke test for the composed application

use axum::{body::Body, http::Request};
use spacegate_common::Config;
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        nonce_secret: "smoke-test-secret".to_string(),
        base_url: "http://localhost:3000".to_string(),
        log_level: "info".to_string(),
        rust_log: "spacegate=debug".to_string(),
        port: 3000,
    }
}

#[tokio::test]
async fn health_check_responds() {
    let app = spacegate_app::create_app(&test_config());

    let response = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn root_reports_version() {
    let app = spacegate_app::create_app(&test_config());

    let response = app
        .router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::OK);
}
