//! Application startup and lifecycle management.

use crate::config::AdvisoryConfig;
use crate::handlers;
use crate::services::{AdvisoryDispatcher, GeminiConfig, GeminiTextProvider, TextProvider};
use axum::{
    http::HeaderValue,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state. Immutable for the life of the process.
#[derive(Clone)]
pub struct AppState {
    pub config: AdvisoryConfig,
    pub dispatcher: AdvisoryDispatcher,
}

/// Build the dispatcher from configuration: Gemini when a key is present,
/// fallback templates otherwise.
pub fn build_dispatcher(config: &AdvisoryConfig) -> Result<AdvisoryDispatcher, AppError> {
    let Some(api_key) = config.gemini.api_key.clone() else {
        tracing::info!("GEMINI_API_KEY not set, serving fallback templates");
        return Ok(AdvisoryDispatcher::fallback_only());
    };

    let provider = GeminiTextProvider::new(GeminiConfig {
        api_key,
        api_base: config.gemini.api_base.clone(),
        model: config.gemini.text_model.clone(),
        request_timeout: Duration::from_secs(config.gemini.request_timeout_secs),
    })
    .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

    tracing::info!(
        model = %config.gemini.text_model,
        timeout_secs = config.gemini.request_timeout_secs,
        "Initialized Gemini text provider"
    );

    let provider: Arc<dyn TextProvider> = Arc::new(provider);
    Ok(AdvisoryDispatcher::new(Some(provider)))
}

fn cors_layer(config: &AdvisoryConfig) -> CorsLayer {
    let allowed = &config.cors.allowed_origins;
    let origins = if allowed.is_empty() || allowed.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(allowed.iter().filter_map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e))
                .ok()
        }))
    };

    // Credentials rule out wildcards, so methods and headers are mirrored.
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Assemble the HTTP router with its middleware stack.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/api/analyze-health", post(handlers::analyze_health))
        .route("/api/generate-treatment", post(handlers::generate_treatment))
        .route("/api/report-case", post(handlers::report_case))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
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
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: AdvisoryConfig) -> Result<Self, AppError> {
        let dispatcher = build_dispatcher(&config)?;
        Self::build_with_dispatcher(config, dispatcher).await
    }

    /// Build the application around an already constructed dispatcher.
    pub async fn build_with_dispatcher(
        config: AdvisoryConfig,
        dispatcher: AdvisoryDispatcher,
    ) -> Result<Self, AppError> {
        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            generation = dispatcher.source().as_str(),
            "Animal health service listening"
        );

        let state = AppState { config, dispatcher };

        Ok(Self {
            port,
            listener,
            router: router(state),
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }

    /// Run until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_with_graceful_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
