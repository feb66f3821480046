//! Application wiring and lifecycle.

use crate::config::DiagnosticConfig;
use crate::handlers;
use crate::services::providers::ChatProvider;
use crate::services::providers::openai::{OpenAiChatProvider, OpenAiConfig};
use crate::services::{ImageStore, LocalImageStore};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state. The provider and the image store are injected
/// so tests can substitute doubles for the external API and the filesystem.
#[derive(Clone)]
pub struct AppState {
    pub config: DiagnosticConfig,
    pub provider: Arc<dyn ChatProvider>,
    pub images: Arc<dyn ImageStore>,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the real OpenAI provider and local store.
    pub async fn build(config: DiagnosticConfig) -> Result<Self, AppError> {
        let provider: Arc<dyn ChatProvider> = Arc::new(
            OpenAiChatProvider::new(OpenAiConfig {
                api_key: config.openai.api_key.clone(),
                api_base: config.openai.api_base.clone(),
                text_model: config.models.text_model.clone(),
                vision_model: config.models.vision_model.clone(),
            })
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e.to_string())))?,
        );

        tracing::info!(
            text_model = %config.models.text_model,
            vision_model = %config.models.vision_model,
            "Initialized chat provider"
        );

        let images: Arc<dyn ImageStore> = Arc::new(
            LocalImageStore::new(
                &config.storage.local_path,
                config.storage.retention_hours,
            )
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to initialize image store at {}: {}",
                    config.storage.local_path,
                    e
                );
                e
            })?,
        );

        Self::with_components(config, provider, images).await
    }

    /// Build with injected collaborators; tests use this with mock providers
    /// and a temporary store.
    pub async fn with_components(
        config: DiagnosticConfig,
        provider: Arc<dyn ChatProvider>,
        images: Arc<dyn ImageStore>,
    ) -> Result<Self, AppError> {
        let state = AppState {
            config: config.clone(),
            provider,
            images,
        };

        let router = Router::new()
            .route("/", get(handlers::liveness))
            .route("/health", get(handlers::health_check))
            .route("/static/:filename", get(handlers::serve_upload))
            .route("/analyze-job", post(handlers::analyze_job))
            .route("/analyze-image", post(handlers::analyze_image))
            // Axum's 2MB default would reject large uploads before the
            // handler's own size check runs; allow headroom for the
            // multipart framing around a max-size image.
            .layer(DefaultBodyLimit::max(
                handlers::diagnose::MAX_IMAGE_BYTES + 1024 * 1024,
            ))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
