mod config;
mod dictionary;
mod game;
mod models;
mod routes;
mod websocket;

use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use config::Config;
use dashmap::DashMap;
use dictionary::WordBank;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use websocket::SessionSummary;

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub word_bank: Arc<WordBank>,
    /// Connected sessions, refreshed after every processed event
    pub sessions: DashMap<Uuid, SessionSummary>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "word_match_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting word match backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Load word catalog
    let word_bank = match WordBank::load(&config.assets.words_path).await {
        Ok(bank) => bank,
        Err(e) => {
            tracing::warn!("Failed to load word catalog: {:#}. Using empty word bank.", e);
            tracing::warn!(
                "Games cannot start until a catalog exists at {}",
                config.assets.words_path
            );
            WordBank::empty()
        }
    };

    let state = Arc::new(AppState {
        config: config.clone(),
        word_bank: Arc::new(word_bank),
        sessions: DashMap::new(),
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Serve frontend and the audio/image assets it references
    let frontend_service = ServeDir::new(&config.assets.frontend_dir);
    let assets_service = ServeDir::new(&config.assets.assets_dir);

    // Build router
    let app = Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket::handle_websocket))
        // API routes
        .merge(routes::create_routes())
        .nest_service("/assets", assets_service)
        .fallback_service(frontend_service)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Game frontend: http://{}/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
