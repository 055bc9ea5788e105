// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::http_server::AppState;
use super::ApiError;
use crate::clip::{EMBEDDING_DIMENSIONS, MODEL_DESCRIPTION, MODEL_NAME};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelInfoResponse {
    pub model: String,
    pub device: String,
    pub embedding_dimensions: usize,
    pub description: String,
}

/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: state.is_ready(),
    })
}

/// GET /model/info - 503 until the model is loaded
pub async fn model_info_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModelInfoResponse>, ApiError> {
    let embedder = state.embedder()?;

    Ok(Json(ModelInfoResponse {
        model: MODEL_NAME.to_string(),
        device: embedder.device().to_string(),
        embedding_dimensions: EMBEDDING_DIMENSIONS,
        description: MODEL_DESCRIPTION.to_string(),
    }))
}
