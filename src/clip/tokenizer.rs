// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! CLIP text tokenization
//!
//! Wraps a HuggingFace `tokenizer.json` for the CLIP BPE vocabulary and
//! produces the fixed-length input the text encoder expects:
//! `<|startoftext|> tokens... <|endoftext|>` zero-padded to 77 positions.

use std::path::Path;

use anyhow::Result;
use thiserror::Error;
use tokenizers::Tokenizer;

/// Fixed CLIP text context length
pub const CONTEXT_LENGTH: usize = 77;

/// Start-of-text special token
pub const START_OF_TEXT: &str = "<|startoftext|>";

/// End-of-text special token
pub const END_OF_TEXT: &str = "<|endoftext|>";

#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("Tokenization failed: {0}")]
    Encode(String),

    #[error("Input is too long for context length {context_length} ({token_count} tokens)")]
    TooLong {
        token_count: usize,
        context_length: usize,
    },
}

/// Token ids and attention mask for one text, both `CONTEXT_LENGTH` long
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedText {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
}

impl TokenizedText {
    /// Number of non-padding tokens (including the special tokens)
    pub fn token_count(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m == 1).count()
    }
}

#[derive(Clone)]
pub struct ClipTokenizer {
    tokenizer: Tokenizer,
    start_id: u32,
    end_id: u32,
    context_length: usize,
}

impl std::fmt::Debug for ClipTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipTokenizer")
            .field("start_id", &self.start_id)
            .field("end_id", &self.end_id)
            .field("context_length", &self.context_length)
            .finish_non_exhaustive()
    }
}

impl ClipTokenizer {
    /// Load a tokenizer JSON file from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", path.display());
        }

        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        Self::new(tokenizer)
    }

    /// Wrap an already constructed tokenizer. Both CLIP special tokens must
    /// be present in its vocabulary.
    pub fn new(tokenizer: Tokenizer) -> Result<Self> {
        let start_id = tokenizer
            .token_to_id(START_OF_TEXT)
            .ok_or_else(|| anyhow::anyhow!("Tokenizer has no {} token", START_OF_TEXT))?;
        let end_id = tokenizer
            .token_to_id(END_OF_TEXT)
            .ok_or_else(|| anyhow::anyhow!("Tokenizer has no {} token", END_OF_TEXT))?;

        Ok(Self {
            tokenizer,
            start_id,
            end_id,
            context_length: CONTEXT_LENGTH,
        })
    }

    pub fn context_length(&self) -> usize {
        self.context_length
    }

    /// Tokenize one text into the fixed-length model input.
    ///
    /// Texts that do not fit the context (after adding both special tokens)
    /// are rejected rather than truncated.
    pub fn tokenize(&self, text: &str) -> Result<TokenizedText, TokenizeError> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| TokenizeError::Encode(e.to_string()))?;

        let ids = encoding.get_ids();
        let token_count = ids.len() + 2;
        if token_count > self.context_length {
            return Err(TokenizeError::TooLong {
                token_count,
                context_length: self.context_length,
            });
        }

        let mut input_ids = Vec::with_capacity(self.context_length);
        input_ids.push(self.start_id as i64);
        input_ids.extend(ids.iter().map(|&id| id as i64));
        input_ids.push(self.end_id as i64);

        let mut attention_mask = vec![1i64; input_ids.len()];

        input_ids.resize(self.context_length, 0);
        attention_mask.resize(self.context_length, 0);

        Ok(TokenizedText {
            input_ids,
            attention_mask,
        })
    }
}
