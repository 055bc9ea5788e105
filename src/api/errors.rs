// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body of every failed request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
    pub error_type: String,
}

/// Every way a request can fail. Each handler returns one of these and the
/// status code is decided only in `status_code`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Model state has not been populated
    #[error("Model not loaded")]
    NotReady,

    /// The request itself is unusable (wrong content type, missing field)
    #[error("{0}")]
    BadInput(String),

    /// Decoding, preprocessing, tokenization or inference failed
    #[error("{0}")]
    ProcessingFailure(String),

    /// Request body exceeded the configured limit
    #[error("{0}")]
    PayloadTooLarge(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadInput(_) => StatusCode::BAD_REQUEST,
            ApiError::ProcessingFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotReady => "service_unavailable",
            ApiError::BadInput(_) => "bad_request",
            ApiError::ProcessingFailure(_) => "processing_error",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            detail: self.to_string(),
            error_type: self.error_type().to_string(),
        }
    }

    /// Image pipeline failure, message prefixed the way clients expect
    pub fn image_failure(err: impl std::fmt::Display) -> Self {
        ApiError::ProcessingFailure(format!("Error processing image: {}", err))
    }

    /// Text pipeline failure
    pub fn text_failure(err: impl std::fmt::Display) -> Self {
        ApiError::ProcessingFailure(format!("Error processing text: {}", err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::BadInput(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
