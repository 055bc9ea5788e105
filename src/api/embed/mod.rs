// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding endpoints
//!
//! Image and text inputs are mapped into the shared 512-dimensional CLIP
//! space. Every vector returned has unit L2 norm.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{embed_image_base64_handler, embed_image_handler, embed_text_handler};
pub use request::{Base64ImageRequest, TextEmbeddingRequest};
pub use response::EmbeddingResponse;
