// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::embed::{embed_image_base64_handler, embed_image_handler, embed_text_handler};
use super::handlers::{health_handler, model_info_handler};
use super::ApiError;
use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::embeddings::ClipEmbedder;

/// Service context shared by every handler.
///
/// Built once before the listener is bound and never mutated. `embedder`
/// is `None` only when the router is run without a model (Uninitialized);
/// every inference endpoint then answers 503.
#[derive(Clone, Debug)]
pub struct AppState {
    embedder: Option<Arc<ClipEmbedder>>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(embedder: ClipEmbedder) -> Self {
        Self {
            embedder: Some(Arc::new(embedder)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// State with no model loaded
    pub fn uninitialized() -> Self {
        Self {
            embedder: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn is_ready(&self) -> bool {
        self.embedder.is_some()
    }

    /// The loaded model, or `NotReady`
    pub fn embedder(&self) -> Result<Arc<ClipEmbedder>, ApiError> {
        self.embedder.clone().ok_or(ApiError::NotReady)
    }
}

/// Cross-origin policy: any origin, method and header, with credentials.
///
/// Wildcards cannot be combined with credentials, so the request's own
/// origin, method and headers are echoed back instead.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn create_app(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.max_body_bytes;

    Router::new()
        .route("/health", get(health_handler))
        .route("/model/info", get(model_info_handler))
        .route("/embed/image", post(embed_image_handler))
        .route("/embed/image-base64", post(embed_image_base64_handler))
        .route("/embed/text", post(embed_text_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

pub async fn start_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
