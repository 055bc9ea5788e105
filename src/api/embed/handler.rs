// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Handlers for POST /embed/image, /embed/image-base64 and /embed/text
//!
//! Readiness is checked before the request payload is inspected, so an
//! unloaded service answers 503 regardless of what was sent. Decoding and
//! inference run on the blocking pool.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use axum_extra::extract::{
    multipart::{MultipartError, MultipartRejection},
    Multipart,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::{Base64ImageRequest, EmbeddingResponse, TextEmbeddingRequest};
use crate::api::http_server::AppState;
use crate::api::ApiError;
use crate::vision::{decode_base64_image, decode_image_bytes, is_image_content_type};

/// Multipart field carrying the uploaded image
pub const IMAGE_FIELD: &str = "file";

/// Characters of input text echoed into the log
const LOG_TEXT_PREVIEW: usize = 50;

/// POST /embed/image
///
/// Expects `multipart/form-data` with the image in the `file` field. The
/// field's declared content type must be `image/*`; anything else is
/// rejected with 400 before any decoding or inference.
///
/// # Errors
/// - 503: model not loaded
/// - 400: missing `file` field or non-image content type
/// - 500: unreadable body, undecodable image or inference failure
pub async fn embed_image_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<EmbeddingResponse>, ApiError> {
    let embedder = state.embedder()?;
    let mut multipart = multipart.map_err(|e| {
        warn!("Rejected image upload: {}", e);
        ApiError::BadInput(format!("Invalid multipart request: {}", e))
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_failure)?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("<unnamed>").to_string();
        if !is_image_content_type(field.content_type()) {
            warn!(
                "Rejected upload {}: content type {:?}",
                filename,
                field.content_type()
            );
            return Err(ApiError::BadInput("File must be an image".to_string()));
        }

        info!("Processing image upload: {}", filename);

        let bytes = field.bytes().await.map_err(multipart_failure)?;
        let embeddings = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<f32>> {
            let (image, image_info) = decode_image_bytes(&bytes)?;
            debug!(
                "Decoded image: {}x{} {:?}, {} bytes",
                image_info.width, image_info.height, image_info.format, image_info.size_bytes
            );
            embedder.embed_image(&image)
        })
        .await
        .map_err(ApiError::image_failure)?
        .map_err(|e| {
            error!("Image embedding failed for {}: {:#}", filename, e);
            ApiError::image_failure(e)
        })?;

        return Ok(Json(EmbeddingResponse::from(embeddings)));
    }

    Err(ApiError::BadInput(format!(
        "Missing multipart field '{}'",
        IMAGE_FIELD
    )))
}

/// POST /embed/image-base64
///
/// `image_b64` comes from the query string or a JSON body. No content-type
/// check applies here; a payload that does not decode to an image is a 500.
pub async fn embed_image_base64_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Base64ImageRequest>, QueryRejection>,
    body: Result<Json<Base64ImageRequest>, JsonRejection>,
) -> Result<Json<EmbeddingResponse>, ApiError> {
    let embedder = state.embedder()?;
    let Query(query) = query.map_err(|e| {
        warn!("Rejected base64 query: {}", e);
        ApiError::BadInput(e.body_text())
    })?;
    let body = match body {
        Ok(Json(body)) => Some(body),
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => return Err(e.into()),
        // Query-only requests carry no JSON body
        Err(_) => None,
    };
    let image_b64 = Base64ImageRequest::resolve(query, body)?;

    info!("Processing base64 image ({} chars)", image_b64.len());

    let embeddings = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<f32>> {
        let (image, image_info) = decode_base64_image(&image_b64)?;
        debug!(
            "Decoded image: {}x{} {:?}, {} bytes",
            image_info.width, image_info.height, image_info.format, image_info.size_bytes
        );
        embedder.embed_image(&image)
    })
    .await
    .map_err(ApiError::image_failure)?
    .map_err(|e| {
        error!("Base64 image embedding failed: {:#}", e);
        ApiError::image_failure(e)
    })?;

    Ok(Json(EmbeddingResponse::from(embeddings)))
}

/// POST /embed/text
///
/// Text longer than the model's context is an error, never truncated.
pub async fn embed_text_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TextEmbeddingRequest>, JsonRejection>,
) -> Result<Json<EmbeddingResponse>, ApiError> {
    let embedder = state.embedder()?;
    let Json(request) = payload?;

    info!("Processing text: {}", preview(&request.text));

    let text = request.text;
    let embeddings = tokio::task::spawn_blocking(move || embedder.embed_text(&text))
        .await
        .map_err(ApiError::text_failure)?
        .map_err(|e| {
            error!("Text embedding failed: {:#}", e);
            ApiError::text_failure(e)
        })?;

    Ok(Json(EmbeddingResponse::from(embeddings)))
}

/// Oversized bodies keep their 413; anything else is a failed read
fn multipart_failure(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::image_failure(err)
    }
}

fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(LOG_TEXT_PREVIEW).collect();
    if text.chars().count() > LOG_TEXT_PREVIEW {
        preview.push_str("...");
    }
    preview
}
