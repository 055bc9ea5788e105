// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod embed;
pub mod errors;
pub mod handlers;
pub mod http_server;

pub use embed::{
    embed_image_base64_handler, embed_image_handler, embed_text_handler, Base64ImageRequest,
    EmbeddingResponse, TextEmbeddingRequest,
};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::{health_handler, model_info_handler, HealthResponse, ModelInfoResponse};
pub use http_server::{create_app, start_server, AppState};
