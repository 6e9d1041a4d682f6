//! HTTP API for lectern.
//!
//! Serves lessons, model metadata, context previews, chat completions and
//! artifacts as JSON over Axum. Every handle the handlers need is built once
//! by [`bootstrap`] and shared read-only through [`AppState`].

pub mod api;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use lectern_artifacts::ArtifactStore;
use lectern_config::{AppConfig, ServerConfig};
use lectern_core::PromptAssembler;
use lectern_lessons::LessonStore;
use lectern_providers::{CompletionGateway, OpenAiCompatProvider};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Shared application state. Read-only once serving starts.
pub struct AppState {
    pub config: AppConfig,
    pub lessons: LessonStore,
    pub completions: CompletionGateway,
    pub artifacts: ArtifactStore,
}

pub type SharedState = Arc<AppState>;

/// Run the startup sequence and build the application state.
///
/// Order: API key check, lesson load, prompt template check, artifact
/// directories, provider. Any failure here means the process must not
/// accept traffic.
pub fn bootstrap(config: AppConfig) -> Result<AppState, lectern_core::Error> {
    config.require_api_key()?;

    info!(dir = %config.paths.lessons_dir.display(), "Loading lessons");
    let lessons = LessonStore::load(&config.paths.lessons_dir);

    let prompts = Arc::new(PromptAssembler::new(&config.paths.prompts_dir));
    prompts.check()?;
    info!(dir = %prompts.dir().display(), "Prompt templates ready");

    let artifacts = ArtifactStore::new(&config.paths.artifacts_dir);
    artifacts.ensure_dirs()?;
    info!(dir = %artifacts.dir().display(), "Artifacts directory ready");

    let provider = OpenAiCompatProvider::openrouter(&config)?;
    let completions = CompletionGateway::from_config(Arc::new(provider), prompts, &config);
    info!(
        default_model = %config.default_model,
        fallback_model = %config.fallback_model,
        "Completion gateway initialized"
    );

    Ok(AppState {
        config,
        lessons,
        completions,
        artifacts,
    })
}

/// Build the router with CORS, body limit and request tracing applied.
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.server);
    let body_limit = state.config.server.body_limit_bytes;

    api::router(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins()
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Serve until Ctrl-C.
pub async fn start(state: SharedState) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let lessons = state.lessons.total();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, lessons, "lectern API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
