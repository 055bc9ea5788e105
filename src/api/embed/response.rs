// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbeddingResponse returned by all three embedding endpoints

use crate::clip::MODEL_NAME;
use serde::{Deserialize, Serialize};

/// # Example
/// ```json
/// {
///   "embeddings": [0.012, -0.034, ...],
///   "model": "ViT-B/32",
///   "dimensions": 512
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingResponse {
    /// Unit-length embedding vector
    pub embeddings: Vec<f32>,

    /// Model identifier
    pub model: String,

    /// Always equal to `embeddings.len()`
    pub dimensions: usize,
}

impl From<Vec<f32>> for EmbeddingResponse {
    fn from(embeddings: Vec<f32>) -> Self {
        EmbeddingResponse {
            dimensions: embeddings.len(),
            embeddings,
            model: MODEL_NAME.to_string(),
        }
    }
}
