// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the CLIP embedding service

/// Full version string with feature description
pub const VERSION: &str = "v1.0.0-clip-vit-b32-onnx-2025-10-16";

/// Build date
pub const BUILD_DATE: &str = "2025-10-16";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "image-embeddings",
    "image-base64-embeddings",
    "text-embeddings",
    "cuda-fallback-cpu",
    "cors-credentials",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("CLIP Embedding Service {} ({})", VERSION, BUILD_DATE)
}
