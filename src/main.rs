//! Crypto News Sentinel: binary entrypoint.
//! Starts both polling monitors in the background and serves the keep-alive
//! router the hosting platform health-checks.

use std::sync::Arc;

use crypto_news_sentinel::{
    api::{create_router, AppState},
    build_sentinel, init_tracing,
    monitor::spawn_monitors,
    telemetry::Metrics,
    Settings,
};
use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let settings = Arc::new(Settings::load()?);
    tracing::info!(
        symbols = settings.symbols.len(),
        threshold = settings.scoring.threshold,
        recency_minutes = settings.recency.max_age_minutes,
        dedup_path = %settings.dedup.path.display(),
        active_hours = ?settings.schedule.active_hours,
        "settings loaded"
    );

    let metrics = match Metrics::init() {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "metrics disabled");
            None
        }
    };

    let sentinel = build_sentinel(settings.clone()).await?;
    let handles = spawn_monitors(sentinel.clone());
    tracing::info!(monitors = handles.len(), "monitors running");

    let mut router = create_router(AppState {
        settings,
        cache: sentinel.cache().clone(),
    });
    if let Some(m) = &metrics {
        router = router.merge(m.router());
    }

    Ok(router.into())
}
