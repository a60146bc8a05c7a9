//! Application startup and lifecycle management.

use crate::config::BiographyConfig;
use crate::handlers::{
    biography::generate_biography,
    health::{health_check, not_found, readiness_check},
    metrics::metrics,
};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::TextProvider;
use crate::services::BiographyRelay;
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, origin_guard_middleware, request_id_middleware,
    security_headers_middleware, OriginAllowList, REQUEST_ID_HEADER,
};
use service_core::observability::init_metrics;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub relay: BiographyRelay,
    pub metrics: PrometheusHandle,
    pub allow_list: OriginAllowList,
}

impl AppState {
    pub fn new(config: &BiographyConfig, provider: Arc<dyn TextProvider>) -> Self {
        Self {
            relay: BiographyRelay::new(provider),
            metrics: init_metrics(),
            allow_list: OriginAllowList::new(&config.cors.allowed_origins),
        }
    }
}

/// Build the HTTP router.
///
/// Layers run outside-in: CORS, security headers, request id, tracing,
/// metrics, then the origin guard right before routing.
pub fn build_router(state: AppState) -> Router {
    let allow_list = state.allow_list.clone();

    Router::new()
        .route("/generate-biography", post(generate_biography))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .fallback(not_found)
        .with_state(state)
        .layer(from_fn_with_state(allow_list.clone(), origin_guard_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(allow_list.cors_layer())
}

fn log_cors_policy(config: &BiographyConfig) {
    if config.is_production() {
        tracing::info!("CORS configured for the production origins");
    } else {
        tracing::info!(
            origins = ?config.cors.allowed_origins,
            "CORS configured for origins"
        );
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the Gemini provider described by `config`.
    pub async fn build(config: BiographyConfig) -> Result<Self, AppError> {
        if config.gemini.api_key.is_empty() {
            tracing::warn!("GEMINI_API_KEY is not set; generation requests will fail");
        }

        let provider = GeminiTextProvider::new(GeminiConfig::from(&config.gemini))
            .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;

        tracing::info!(
            model = %provider.model(),
            "Initialized Gemini text provider"
        );

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build the application around an already constructed provider.
    pub async fn build_with_provider(
        config: BiographyConfig,
        provider: Arc<dyn TextProvider>,
    ) -> Result<Self, AppError> {
        log_cors_policy(&config);

        let state = AppState::new(&config, provider);

        // Port 0 binds a random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Biography service listening on http://localhost:{}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until the process is killed.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Run the application until `signal` resolves, then drain in-flight requests.
    pub async fn run_with_shutdown<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}
