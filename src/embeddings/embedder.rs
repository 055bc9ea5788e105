// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! CLIP embedding pipeline
//!
//! `ClipEmbedder` is the process-wide model state: the loaded encoder, the
//! preprocessing transform, and the device they run on. It is built once at
//! startup and shared read-only by every request.

use std::sync::Arc;

use anyhow::{Context, Result};
use image::DynamicImage;
use tracing::info;

use super::l2_normalize;
use crate::clip::{ClipEncoder, ClipModelConfig, ClipPreprocessor, ComputeDevice, OnnxClipModel};

#[derive(Clone)]
pub struct ClipEmbedder {
    encoder: Arc<dyn ClipEncoder>,
    preprocessor: ClipPreprocessor,
}

impl std::fmt::Debug for ClipEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipEmbedder")
            .field("device", &self.encoder.device())
            .field("dimension", &self.encoder.dimension())
            .field("preprocessor", &self.preprocessor)
            .finish()
    }
}

impl ClipEmbedder {
    /// Wrap an encoder with the default ViT-B/32 preprocessing
    pub fn new(encoder: Arc<dyn ClipEncoder>) -> Self {
        Self {
            encoder,
            preprocessor: ClipPreprocessor::default(),
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: ClipPreprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Load the ONNX model described by `config`.
    ///
    /// Loading is CPU and disk heavy, so it runs on a blocking worker thread.
    pub async fn load(config: ClipModelConfig) -> Result<Self> {
        info!("Loading CLIP model...");

        let model = tokio::task::spawn_blocking(move || OnnxClipModel::load(&config))
            .await
            .context("CLIP model loading task failed")??;

        info!("CLIP model loaded successfully on {}", model.device());

        Ok(Self::new(Arc::new(model)))
    }

    /// Preprocess, encode and normalize one image
    pub fn embed_image(&self, image: &DynamicImage) -> Result<Vec<f32>> {
        let pixels = self.preprocessor.apply(image);
        let raw = self.encoder.encode_image(pixels)?;
        self.finish(raw)
    }

    /// Tokenize, encode and normalize one text
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let raw = self.encoder.encode_text(text)?;
        self.finish(raw)
    }

    pub fn device(&self) -> ComputeDevice {
        self.encoder.device()
    }

    pub fn dimension(&self) -> usize {
        self.encoder.dimension()
    }

    fn finish(&self, raw: Vec<f32>) -> Result<Vec<f32>> {
        if raw.len() != self.encoder.dimension() {
            anyhow::bail!(
                "Unexpected embedding dimension: {} (expected {})",
                raw.len(),
                self.encoder.dimension()
            );
        }
        l2_normalize(raw)
    }
}
