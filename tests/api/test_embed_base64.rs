// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed/image-base64

use super::support::*;
use axum::http::{Method, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use tower::util::ServiceExt;

fn png_b64() -> String {
    STANDARD.encode(png_bytes(120, 90))
}

#[tokio::test]
async fn test_query_parameter() {
    let (app, stub) = ready_app();
    let uri = format!("/embed/image-base64?image_b64={}", query_escape(&png_b64()));

    let response = app.oneshot(empty_request(Method::POST, &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_embedding_body(&body_json(response).await);
    assert_eq!(stub.image_calls(), 1);
}

#[tokio::test]
async fn test_json_body() {
    let (app, _) = ready_app();
    let request = json_request("/embed/image-base64", json!({ "image_b64": png_b64() }));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_embedding_body(&body_json(response).await);
}

#[tokio::test]
async fn test_data_url_matches_plain_payload() {
    let (app, _) = ready_app();
    let plain = png_b64();
    let data_url = format!("data:image/png;base64,{}", plain);

    let first = app
        .clone()
        .oneshot(json_request("/embed/image-base64", json!({ "image_b64": plain })))
        .await
        .unwrap();
    let second = app
        .oneshot(json_request("/embed/image-base64", json!({ "image_b64": data_url })))
        .await
        .unwrap();

    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(
        embeddings(&body_json(first).await),
        embeddings(&body_json(second).await)
    );
}

#[tokio::test]
async fn test_invalid_base64_mentions_decoding() {
    let (app, stub) = ready_app();
    let request = json_request("/embed/image-base64", json!({ "image_b64": "%%%not-base64%%%" }));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let detail = body_json(response).await["detail"].as_str().unwrap().to_string();
    assert!(detail.starts_with("Error processing image:"), "got: {}", detail);
    assert!(detail.contains("base64"), "got: {}", detail);
    assert_eq!(stub.image_calls(), 0);
}

#[tokio::test]
async fn test_valid_base64_of_non_image() {
    let (app, stub) = ready_app();
    let payload = STANDARD.encode(b"plain text, not pixels");
    let request = json_request("/embed/image-base64", json!({ "image_b64": payload }));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(stub.image_calls(), 0);
}

#[tokio::test]
async fn test_missing_payload() {
    let (app, _) = ready_app();

    let response = app
        .oneshot(empty_request(Method::POST, "/embed/image-base64"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["detail"], "image_b64 is required");
}

#[tokio::test]
async fn test_line_wrapped_payload() {
    let (app, stub) = ready_app();
    let plain = png_b64();
    let wrapped = plain
        .as_bytes()
        .chunks(76)
        .map(|line| std::str::from_utf8(line).unwrap())
        .collect::<Vec<_>>()
        .join("\r\n");
    assert!(wrapped.contains("\r\n"));

    let response = app
        .oneshot(json_request("/embed/image-base64", json!({ "image_b64": wrapped })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_embedding_body(&body_json(response).await);
    assert_eq!(stub.image_calls(), 1);
}

#[tokio::test]
async fn test_duplicate_query_parameter() {
    let (app, stub) = ready_app();

    let response = app
        .oneshot(empty_request(
            Method::POST,
            "/embed/image-base64?image_b64=AAAA&image_b64=BBBB",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error_type"], "bad_request");
    assert_eq!(stub.image_calls(), 0);
}
