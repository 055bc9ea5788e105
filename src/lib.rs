// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod clip;
pub mod config;
pub mod embeddings;
pub mod version;
pub mod vision;

pub use api::{create_app, start_server, ApiError, AppState};
pub use clip::{ClipEncoder, ComputeDevice, DevicePreference, EMBEDDING_DIMENSIONS, MODEL_NAME};
pub use config::ServiceConfig;
pub use embeddings::ClipEmbedder;
