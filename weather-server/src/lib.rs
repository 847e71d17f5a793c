//! HTTP lookup and search-log endpoints.
//!
//! - `GET /api/weather?city=` proxies the provider and normalizes its errors
//! - `POST /api/log` and `GET /api/log` maintain the in-memory search log

pub mod api_error;
mod handlers;
pub mod log_store;

use anyhow::Context;
use axum::{Router, routing::get};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::RwLock};

use weather_core::{Config, WeatherProvider, provider::provider_from_config};

pub use log_store::SearchLogStore;

/// Shared state for all handlers.
pub struct AppState {
    pub provider: Box<dyn WeatherProvider>,
    pub logs: RwLock<SearchLogStore>,
}

impl AppState {
    pub fn new(provider: Box<dyn WeatherProvider>, log_capacity: usize) -> Self {
        Self { provider, logs: RwLock::new(SearchLogStore::new(log_capacity)) }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/weather", get(handlers::get_weather))
        .route("/api/log", get(handlers::get_logs).post(handlers::post_log))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Serve on an already bound listener until the task is dropped or fails.
pub async fn serve_on(listener: TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = listener.local_addr().context("Failed to read listener address")?;
    tracing::info!(%addr, "weather server listening");

    axum::serve(listener, create_router(state)).await.context("HTTP server failed")
}

/// Build the provider from config, bind `addr` and serve.
pub async fn serve(config: &Config, addr: &str) -> anyhow::Result<()> {
    let provider = provider_from_config(config)?;
    let state = Arc::new(AppState::new(provider, config.log_capacity));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    serve_on(listener, state).await
}
