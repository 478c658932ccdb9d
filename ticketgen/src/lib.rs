//! # ticketgen: JIRA ticket generation from plain-text requirements
//!
//! `ticketgen` is a small HTTP service that turns requirement documents and architecture diagrams
//! into a JIRA-style hierarchy of epics, stories and subtasks. Clients upload `.txt` files and
//! images in a single multipart request; the service lays them out as one prompt for a hosted
//! generative model (Gemini) and returns whatever JSON object it can recover from the answer.
//!
//! ## Request flow
//!
//! ```text
//! POST /api/generate-tickets (multipart)
//!        │
//!        ▼
//!  api::handlers::tickets      classify uploads, pick the prompt
//!        │
//!        ▼
//!  extraction::TicketExtractor content parts → model::GenerativeModel
//!        │
//!        ▼
//!  extraction::recover         fences → brace span → pattern scan
//!        │
//!        ▼
//!  200 {message, stats, aiOutput} | 400/500 {detail}
//! ```
//!
//! Nothing is persisted and nothing is retried: every request is one model call.
//!
//! ## Modules
//!
//! - [`config`]: YAML + environment configuration
//! - [`api`]: HTTP handlers and response models
//! - [`extraction`]: upload classification, prompt layout and JSON recovery
//! - [`model`]: the generative model abstraction and its Gemini client
//! - [`errors`]: error type and its mapping to HTTP responses
//! - [`telemetry`]: tracing and optional OTLP export
//! - [`metrics`]: Prometheus counters for generation outcomes
//!
//! ## Running
//!
//! ```bash
//! GOOGLE_API_KEY=... ticketgen -f config.yaml
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod metrics;
pub mod model;
mod openapi;
pub mod telemetry;

#[cfg(test)]
mod test_utils;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, header},
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
use config::CorsOrigin;
use extraction::TicketExtractor;
use model::{GeminiClient, GenerativeModel};
use openapi::ApiDoc;

/// Shared state handed to every handler.
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub extractor: Arc<TicketExtractor>,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let has_wildcard = config
        .cors
        .allowed_origins
        .iter()
        .any(|origin| matches!(origin, CorsOrigin::Wildcard));

    // `*` cannot be mixed into an origin list; it replaces it
    let allow_origin = if has_wildcard {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Browsers send the bare origin, without the trailing slash `Url` adds
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    // Credentials rule out `Any` for methods and headers, so echo the request instead
    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(config.cors.allow_credentials)
        .expose_headers(vec![header::CONTENT_TYPE]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// - `/` and `/healthz` for status
/// - `/api/generate-tickets` with its own body limit
/// - `/docs` and `/api-docs/openapi.json` for the API reference
/// - `/internal/metrics` when metrics are enabled
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let upload_limit = state.config.limits.max_upload_size;
    let cors_layer = create_cors_layer(&state.config)?;
    let enable_metrics = state.config.enable_metrics;

    let router = Router::new()
        .route("/", get(api::handlers::health::root))
        .route("/healthz", get(api::handlers::health::healthz))
        .route(
            "/api/generate-tickets",
            post(api::handlers::tickets::generate_tickets).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let mut router = router.layer(cors_layer);

    if enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

        // HTTP metrics from axum-prometheus followed by the generation counters
        router = router
            .route(
                "/internal/metrics",
                get(|| async move {
                    let mut body = metric_handle.render();
                    body.push_str(&metrics::render());
                    body
                }),
            )
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The HTTP service, ready to serve.
///
/// ```no_run
/// # async fn run(config: ticketgen::Config) -> anyhow::Result<()> {
/// let app = ticketgen::Application::new(config)?;
/// app.serve(async { tokio::signal::ctrl_c().await.ok(); }).await
/// # }
/// ```
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create the application backed by the configured Gemini model
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let model = GeminiClient::from_config(&config.ai)?;
        Self::with_model(config, Arc::new(model))
    }

    /// Create the application around any [`GenerativeModel`]
    pub fn with_model(config: Config, model: Arc<dyn GenerativeModel>) -> anyhow::Result<Self> {
        debug!("Starting ticket generator with configuration: {:#?}", config);

        if config.ai.api_key.is_none() {
            warn!("No AI API key configured (set GOOGLE_API_KEY); ticket generation requests will fail");
        }

        let extractor = TicketExtractor::with_prompt_override(model, config.ai.system_prompt.as_deref());
        info!(model = extractor.model_name(), "AI model configured");

        let state = AppState::builder()
            .config(config.clone())
            .extractor(Arc::new(extractor))
            .build();
        let router = build_router(state)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Ticket generator listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
