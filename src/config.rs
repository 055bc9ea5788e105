// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration from command-line flags and environment variables

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::clip::{ClipModelConfig, DevicePreference};

/// Default request body cap (uploads and base64 payloads)
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// CLIP embedding service
#[derive(Parser, Debug, Clone)]
#[command(name = "clip-embedding-service")]
#[command(version)]
#[command(about = "Generate CLIP ViT-B/32 embeddings for images and text over HTTP", long_about = None)]
pub struct ServiceConfig {
    /// Interface to bind
    #[arg(long, env = "CLIP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "CLIP_PORT", default_value_t = 8001)]
    pub port: u16,

    /// Directory holding visual.onnx, textual.onnx and tokenizer.json
    #[arg(long, env = "CLIP_MODEL_DIR", default_value = "./models/clip-vit-b32-onnx")]
    pub model_dir: PathBuf,

    /// Image encoder graph (overrides <model_dir>/visual.onnx)
    #[arg(long, env = "CLIP_VISUAL_MODEL")]
    pub visual_model: Option<PathBuf>,

    /// Text encoder graph (overrides <model_dir>/textual.onnx)
    #[arg(long, env = "CLIP_TEXTUAL_MODEL")]
    pub textual_model: Option<PathBuf>,

    /// Tokenizer file (overrides <model_dir>/tokenizer.json)
    #[arg(long, env = "CLIP_TOKENIZER")]
    pub tokenizer: Option<PathBuf>,

    /// Compute device preference: auto, cuda or cpu
    #[arg(long, env = "CLIP_DEVICE", default_value = "auto")]
    pub device: DevicePreference,

    /// ONNX Runtime intra-op threads per session
    #[arg(long, env = "CLIP_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    /// Maximum accepted request body size in bytes
    #[arg(long, env = "CLIP_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

impl ServiceConfig {
    /// Socket address the HTTP server binds to
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context(format!("Invalid listen address {}:{}", self.host, self.port))
    }

    /// Model file locations and runtime options, with per-file overrides applied
    pub fn model_config(&self) -> ClipModelConfig {
        let mut config = ClipModelConfig::from_model_dir(&self.model_dir);
        if let Some(path) = &self.visual_model {
            config.visual_model_path = path.clone();
        }
        if let Some(path) = &self.textual_model {
            config.textual_model_path = path.clone();
        }
        if let Some(path) = &self.tokenizer {
            config.tokenizer_path = path.clone();
        }
        config.device = self.device;
        config.intra_threads = self.intra_threads.max(1);
        config
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
            model_dir: PathBuf::from("./models/clip-vit-b32-onnx"),
            visual_model: None,
            textual_model: None,
            tokenizer: None,
            device: DevicePreference::Auto,
            intra_threads: 4,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}
