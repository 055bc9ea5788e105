// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding generation
//!
//! Turns decoded images and raw text into unit-length CLIP vectors.

pub mod embedder;

pub use embedder::ClipEmbedder;

use anyhow::{anyhow, Result};

/// Scale a vector to Euclidean length 1.
///
/// A zero or non-finite norm is an error.
pub fn l2_normalize(mut embedding: Vec<f32>) -> Result<Vec<f32>> {
    let norm = l2_norm(&embedding);
    if !norm.is_finite() || norm == 0.0 {
        return Err(anyhow!("Cannot normalize embedding with norm {}", norm));
    }

    for value in &mut embedding {
        *value /= norm;
    }

    Ok(embedding)
}

/// Euclidean length of a vector
pub fn l2_norm(embedding: &[f32]) -> f32 {
    embedding.iter().map(|x| x * x).sum::<f32>().sqrt()
}
