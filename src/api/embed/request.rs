// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Request types for the embedding endpoints

use crate::api::ApiError;
use serde::{Deserialize, Serialize};

/// Request body for POST /embed/text
///
/// # Example
/// ```json
/// { "text": "grilled chicken salad" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextEmbeddingRequest {
    pub text: String,
}

/// `image_b64` for POST /embed/image-base64.
///
/// Accepted as a query parameter (`?image_b64=...`) or as a JSON body
/// `{ "image_b64": "..." }`. The query parameter wins when both are given.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Base64ImageRequest {
    #[serde(default)]
    pub image_b64: Option<String>,
}

impl Base64ImageRequest {
    /// Pick the payload from query or body
    pub fn resolve(
        query: Base64ImageRequest,
        body: Option<Base64ImageRequest>,
    ) -> Result<String, ApiError> {
        query
            .image_b64
            .or_else(|| body.and_then(|b| b.image_b64))
            .ok_or_else(|| ApiError::BadInput("image_b64 is required".to_string()))
    }
}
