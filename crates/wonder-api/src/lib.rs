//! WonderBot API: HTTP surface for explanations, auth, quizzes and sessions
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod orchestrator;
pub mod state;

use anyhow::Context;
use axum::Router;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use wonder_media::ASSET_URL_PREFIX;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use state::{AppState, SharedState};

pub fn create_app(state: SharedState) -> Router {
    let assets = ServeDir::new(state.uploads().path());

    Router::new()
        .merge(handlers::generate_routes())
        .merge(handlers::auth_routes())
        .merge(handlers::quiz_routes())
        .merge(handlers::learning_routes())
        .merge(handlers::admin_routes())
        .nest_service(ASSET_URL_PREFIX, assets)
        .with_state(state)
        .layer(middleware::body_limit())
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
}

pub async fn run(config: ServiceConfig) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("creating upload dir {}", config.upload_dir.display()))?;

    let state = Arc::new(AppState::from_config(&config)?);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    info!("WonderBot API listening on {}", config.addr);

    axum::serve(listener, app).await?;
    Ok(())
}
