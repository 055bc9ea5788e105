// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! CLIP vision-language model
//!
//! This module provides:
//! - The `ClipEncoder` trait the service runs inference through
//! - An ONNX Runtime implementation of CLIP ViT-B/32
//! - Image preprocessing and text tokenization matching the reference CLIP

pub mod device;
pub mod onnx_model;
pub mod preprocessing;
pub mod tokenizer;

use anyhow::Result;
use ndarray::Array4;

pub use device::{ComputeDevice, DevicePreference};
pub use onnx_model::{ClipModelConfig, OnnxClipModel};
pub use preprocessing::{ClipPreprocessor, CLIP_INPUT_SIZE};
pub use tokenizer::{ClipTokenizer, TokenizeError, TokenizedText, CONTEXT_LENGTH};

/// Model identifier reported in every embedding response
pub const MODEL_NAME: &str = "ViT-B/32";

/// Length of the vectors produced by both encoders
pub const EMBEDDING_DIMENSIONS: usize = 512;

/// Free-text description reported by `/model/info`
pub const MODEL_DESCRIPTION: &str = "OpenAI CLIP Vision Transformer B/32";

/// Inference entry points of a loaded CLIP model.
///
/// Implementations are shared read-only across request tasks and called
/// from blocking worker threads. Outputs are raw (not yet normalized).
#[cfg_attr(test, mockall::automock)]
pub trait ClipEncoder: Send + Sync {
    /// Encode a preprocessed `[1, 3, H, W]` pixel tensor
    fn encode_image(&self, pixels: Array4<f32>) -> Result<Vec<f32>>;

    /// Tokenize and encode one text
    fn encode_text(&self, text: &str) -> Result<Vec<f32>>;

    /// Device the model runs on
    fn device(&self) -> ComputeDevice;

    /// Output vector length
    fn dimension(&self) -> usize;
}
