// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use clip_embedding_service::{
    api::{start_server, AppState},
    config::ServiceConfig,
    embeddings::ClipEmbedder,
    version,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServiceConfig::parse();
    let addr = config.listen_addr()?;

    println!("🚀 Starting CLIP embedding service...\n");
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!();
    info!("{}", version::get_version_string());
    info!("Features: {}", version::FEATURES.join(", "));

    let model_config = config.model_config();
    info!(
        "Loading CLIP model: visual={}, textual={}, device={}",
        model_config.visual_model_path.display(),
        model_config.textual_model_path.display(),
        model_config.device
    );

    let embedder = ClipEmbedder::load(model_config)
        .await
        .context("Failed to load CLIP model")?;

    let state = AppState::new(embedder).with_max_body_bytes(config.max_body_bytes);
    start_server(state, addr).await
}
