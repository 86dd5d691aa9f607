//! Application startup and lifecycle management.

use crate::config::GatewayConfig;
use crate::handlers;
use crate::services::{CloudinaryStore, LumaClient, ObjectStore};
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state. Everything in here is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub store: Arc<dyn ObjectStore>,
    pub luma: LumaClient,
}

impl AppState {
    pub fn new(config: GatewayConfig, store: Arc<dyn ObjectStore>) -> Self {
        let luma = LumaClient::new(config.luma.clone());
        Self {
            config: Arc::new(config),
            store,
            luma,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.upload.max_upload_bytes;

    Router::new()
        .route(
            "/",
            get(handlers::health_check).post(handlers::submit_generation),
        )
        .route(
            "/upload",
            post(handlers::upload_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/status/:id", get(handlers::check_generation_status))
        .route("/metrics", get(handlers::metrics))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the production Cloudinary store.
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        let store: Arc<dyn ObjectStore> =
            Arc::new(CloudinaryStore::new(config.cloudinary.clone()));

        tracing::info!(
            cloud_name = %config.cloudinary.cloud_name,
            luma_api_url = %config.luma.api_url,
            "Initialized upstream clients"
        );

        Self::build_with_store(config, store).await
    }

    /// Build the application around a caller-supplied object store.
    pub async fn build_with_store(
        config: GatewayConfig,
        store: Arc<dyn ObjectStore>,
    ) -> Result<Self, AppError> {
        // Port 0 picks a random port (tests).
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Gateway listening on port {}", port);

        let router = build_router(AppState::new(config, store));

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
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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

    tracing::info!("Shutdown signal received");
}
