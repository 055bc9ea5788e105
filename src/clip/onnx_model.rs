// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX CLIP Model Wrapper
//!
//! Runs the two towers of CLIP ViT-B/32 exported as separate ONNX graphs:
//! - `visual.onnx`: `[1, 3, 224, 224]` pixel tensor -> `[1, 512]`
//! - `textual.onnx`: `[1, 77]` token ids (+ optional attention mask) -> `[1, 512]`
//!
//! Features:
//! - Device selection from an ordered preference list (CUDA, then CPU)
//! - Output dimension validation at load time
//! - Output selection by name (`*_embeds`) with positional fallback

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use ndarray::{Array2, Array4};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use tracing::{info, warn};

use super::device::{ComputeDevice, DevicePreference};
use super::preprocessing::CLIP_INPUT_SIZE;
use super::tokenizer::{ClipTokenizer, TokenizedText};
use super::{ClipEncoder, EMBEDDING_DIMENSIONS};

/// Files and runtime options needed to load the model
#[derive(Debug, Clone)]
pub struct ClipModelConfig {
    /// Path to the image encoder graph
    pub visual_model_path: PathBuf,
    /// Path to the text encoder graph
    pub textual_model_path: PathBuf,
    /// Path to the CLIP `tokenizer.json`
    pub tokenizer_path: PathBuf,
    /// Devices to try, in order
    pub device: DevicePreference,
    /// Intra-op threads per session
    pub intra_threads: usize,
}

impl ClipModelConfig {
    /// Standard file layout inside a model directory
    pub fn from_model_dir<P: AsRef<Path>>(model_dir: P) -> Self {
        let dir = model_dir.as_ref();
        Self {
            visual_model_path: dir.join("visual.onnx"),
            textual_model_path: dir.join("textual.onnx"),
            tokenizer_path: dir.join("tokenizer.json"),
            device: DevicePreference::Auto,
            intra_threads: 4,
        }
    }
}

/// One loaded ONNX graph with the tensor names it was exported with
struct EncoderSession {
    session: Mutex<Session>,
    input_names: Vec<String>,
    output_name: String,
}

impl EncoderSession {
    fn load(path: &Path, device: ComputeDevice, intra_threads: usize) -> Result<Self> {
        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([device.execution_provider()])
            .context(format!("Failed to set {} execution provider", device))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(path)
            .context(format!("Failed to load ONNX model from {}", path.display()))?;

        let input_names: Vec<String> = session.inputs.iter().map(|i| i.name.clone()).collect();
        if input_names.is_empty() {
            anyhow::bail!("ONNX model {} declares no inputs", path.display());
        }

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.ends_with("embeds"))
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .context(format!("ONNX model {} declares no outputs", path.display()))?;

        Ok(Self {
            session: Mutex::new(session),
            input_names,
            output_name,
        })
    }

    fn has_input(&self, name: &str) -> bool {
        self.input_names.iter().any(|n| n == name)
    }
}

/// CLIP ViT-B/32 running on ONNX Runtime
pub struct OnnxClipModel {
    visual: EncoderSession,
    textual: EncoderSession,
    tokenizer: ClipTokenizer,
    device: ComputeDevice,
    dimension: usize,
}

impl std::fmt::Debug for OnnxClipModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClipModel")
            .field("device", &self.device)
            .field("dimension", &self.dimension)
            .field("visual_output", &self.visual.output_name)
            .field("textual_output", &self.textual.output_name)
            .finish_non_exhaustive()
    }
}

impl OnnxClipModel {
    /// Loads both encoders and the tokenizer, then validates the output size.
    ///
    /// Devices from `config.device` are tried in order; the first one on
    /// which both graphs load is kept.
    ///
    /// # Errors
    /// Returns error if:
    /// - Any model or tokenizer file is missing or invalid
    /// - No candidate device can host both sessions
    /// - Either encoder does not output `EMBEDDING_DIMENSIONS` values
    pub fn load(config: &ClipModelConfig) -> Result<Self> {
        for path in [&config.visual_model_path, &config.textual_model_path] {
            if !path.exists() {
                anyhow::bail!("ONNX model file not found: {}", path.display());
            }
        }

        let tokenizer = ClipTokenizer::from_file(&config.tokenizer_path)?;
        info!("✓ Tokenizer loaded from {}", config.tokenizer_path.display());

        let mut last_error = None;
        for device in config.device.candidates() {
            info!("Attempting {} execution provider...", device);
            match Self::load_sessions(config, device) {
                Ok((visual, textual)) => {
                    info!("✅ CLIP encoders loaded on {}", device);
                    let model = Self {
                        visual,
                        textual,
                        tokenizer,
                        device,
                        dimension: EMBEDDING_DIMENSIONS,
                    };
                    model.validate()?;
                    return Ok(model);
                }
                Err(e) => {
                    warn!("⚠️  {} execution provider failed: {:#}", device, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("No compute device available")))
    }

    fn load_sessions(
        config: &ClipModelConfig,
        device: ComputeDevice,
    ) -> Result<(EncoderSession, EncoderSession)> {
        let visual = EncoderSession::load(&config.visual_model_path, device, config.intra_threads)?;
        let textual =
            EncoderSession::load(&config.textual_model_path, device, config.intra_threads)?;
        Ok((visual, textual))
    }

    /// Run one dummy image and one dummy text and check the output size
    fn validate(&self) -> Result<()> {
        let size = CLIP_INPUT_SIZE as usize;
        let image_out = self
            .run_visual(Array4::zeros((1, 3, size, size)))
            .context("Image encoder validation failed")?;
        if image_out.len() != self.dimension {
            anyhow::bail!(
                "Image encoder outputs {} dimensions (expected {})",
                image_out.len(),
                self.dimension
            );
        }

        let tokens = self
            .tokenizer
            .tokenize("validation test")
            .map_err(|e| anyhow::anyhow!("Tokenizer validation failed: {}", e))?;
        let text_out = self
            .run_textual(&tokens)
            .context("Text encoder validation failed")?;
        if text_out.len() != self.dimension {
            anyhow::bail!(
                "Text encoder outputs {} dimensions (expected {})",
                text_out.len(),
                self.dimension
            );
        }

        Ok(())
    }

    fn run_visual(&self, pixels: Array4<f32>) -> Result<Vec<f32>> {
        let input_name = self.visual.input_names[0].as_str();

        let mut session = self
            .visual
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Image encoder session lock poisoned"))?;
        let outputs = session.run(ort::inputs![
            input_name => Value::from_array(pixels)?
        ])?;

        let output = outputs[self.visual.output_name.as_str()]
            .try_extract_array::<f32>()
            .context("Failed to extract image embedding tensor")?;

        Ok(output.iter().copied().collect())
    }

    fn run_textual(&self, tokens: &TokenizedText) -> Result<Vec<f32>> {
        let len = tokens.input_ids.len();
        let input_ids = Array2::from_shape_vec((1, len), tokens.input_ids.clone())
            .context("Failed to create input_ids array")?;
        let id_input = self.textual.input_names[0].as_str();

        let mut session = self
            .textual
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Text encoder session lock poisoned"))?;

        let outputs = if self.textual.has_input("attention_mask") {
            let attention_mask = Array2::from_shape_vec((1, len), tokens.attention_mask.clone())
                .context("Failed to create attention_mask array")?;
            session.run(ort::inputs![
                id_input => Value::from_array(input_ids)?,
                "attention_mask" => Value::from_array(attention_mask)?
            ])?
        } else {
            session.run(ort::inputs![
                id_input => Value::from_array(input_ids)?
            ])?
        };

        let output = outputs[self.textual.output_name.as_str()]
            .try_extract_array::<f32>()
            .context("Failed to extract text embedding tensor")?;

        Ok(output.iter().copied().collect())
    }
}

impl ClipEncoder for OnnxClipModel {
    fn encode_image(&self, pixels: Array4<f32>) -> Result<Vec<f32>> {
        self.run_visual(pixels)
    }

    fn encode_text(&self, text: &str) -> Result<Vec<f32>> {
        let tokens = self.tokenizer.tokenize(text)?;
        self.run_textual(&tokens)
    }

    fn device(&self) -> ComputeDevice {
        self.device
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
