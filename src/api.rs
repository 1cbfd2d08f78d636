//! Keep-alive HTTP surface for the hosting platform, plus a small status view.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use tower_http::cors::CorsLayer;

use crate::config::Settings;
use crate::dedup::DedupCache;

pub const RUNNING_BANNER: &str = "Crypto News Sentinel is running.";

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub cache: Arc<DedupCache>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { RUNNING_BANNER }))
        .route("/health", get(|| async { "ok" }))
        .route("/status", get(status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct StatusOut {
    running: bool,
    dedup_entries: usize,
    symbols: Vec<String>,
    threshold: i32,
    max_per_batch: usize,
    recency_minutes: i64,
}

async fn status(State(state): State<AppState>) -> Json<StatusOut> {
    Json(StatusOut {
        running: true,
        dedup_entries: state.cache.len().await,
        symbols: state.settings.symbols.clone(),
        threshold: state.settings.scoring.threshold,
        max_per_batch: state.settings.notify.max_per_batch,
        recency_minutes: state.settings.recency.max_age_minutes,
    })
}
