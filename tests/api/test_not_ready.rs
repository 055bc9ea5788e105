// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Router behavior before a model is loaded

use super::support::*;
use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::util::ServiceExt;

async fn assert_not_ready(request: axum::http::Request<axum::body::Body>) {
    let uri = request.uri().to_string();
    let response = unready_app().oneshot(request).await.unwrap();
    assert_eq!(
        response.status(),
        StatusCode::SERVICE_UNAVAILABLE,
        "{} should be unavailable",
        uri
    );

    let json = body_json(response).await;
    assert_eq!(json["detail"], "Model not loaded");
    assert_eq!(json["error_type"], "service_unavailable");
}

#[tokio::test]
async fn test_health_still_answers() {
    let response = unready_app()
        .oneshot(empty_request(Method::GET, "/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["model_loaded"], false);
}

#[tokio::test]
async fn test_model_info_unavailable() {
    assert_not_ready(empty_request(Method::GET, "/model/info")).await;
}

#[tokio::test]
async fn test_embed_endpoints_unavailable() {
    assert_not_ready(multipart_request("file", "a.png", "image/png", &png_bytes(8, 8))).await;
    assert_not_ready(json_request("/embed/image-base64", json!({ "image_b64": "AAAA" }))).await;
    assert_not_ready(json_request("/embed/text", json!({ "text": "hello" }))).await;
}

#[tokio::test]
async fn test_readiness_checked_before_payload() {
    // Requests that would otherwise be 400s
    assert_not_ready(multipart_request("file", "a.txt", "text/plain", b"hello")).await;
    assert_not_ready(empty_request(Method::POST, "/embed/image-base64")).await;
    assert_not_ready(empty_request(
        Method::POST,
        "/embed/image-base64?image_b64=AAAA&image_b64=BBBB",
    ))
    .await;
    assert_not_ready(json_request("/embed/text", json!({}))).await;
}
