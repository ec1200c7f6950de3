//! catbot - chat backend with a cat lookup tool
//!
//! Proxies user turns to the `OpenAI` Responses API, lets the model call
//! `get_random_cat` once per turn and keeps a per-room transcript in `SQLite`.

mod api;
mod config;
mod db;
mod llm;
mod runtime;
mod session;
mod state_machine;
mod tools;

use api::{create_router, AppState};
use axum::http::HeaderValue;
use config::AppConfig;
use db::Database;
use llm::{LlmService, LoggingService, OpenAIService};
use runtime::{ToolExecutor, TurnRunner};
use std::net::SocketAddr;
use std::sync::Arc;
use tools::{CatApiClient, ToolRegistry};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catbot=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "Loaded environment file");
    }

    let config = AppConfig::from_env()?;

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;

    // Completion provider
    let openai = OpenAIService::new(config.openai.clone())?;
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(openai)));
    tracing::info!(
        model = %llm.model_id(),
        followup_model = ?config.followup_model,
        "Completion provider initialized"
    );

    // Tools
    if config.cat_api.api_key.is_none() {
        tracing::warn!("CAT_API_KEY not set; TheCatAPI requests will be unauthenticated");
    }
    let cats = CatApiClient::new(config.cat_api.clone())?;
    let tools: Arc<dyn ToolExecutor> = Arc::new(ToolRegistry::standard(cats));

    let runner = TurnRunner::new(db.clone(), llm, tools)
        .with_followup_model(config.followup_model.clone());
    let state = AppState::new(db, runner, config.turn_timeout);

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("catbot server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
