// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod analyze;
pub mod api;
pub mod config;
pub mod dedup;
pub mod ingest;
pub mod monitor;
pub mod notify;
pub mod pipeline;
pub mod recency;
pub mod sentiment;
pub mod telemetry;

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ---- Re-exports for stable public API ----
pub use crate::analyze::{ScoreBreakdown, ScoredArticle, ScoringProfile};
pub use crate::api::{create_router, AppState};
pub use crate::config::Settings;
pub use crate::dedup::DedupCache;
pub use crate::ingest::{Article, ArticleSource, NewsApiClient};
pub use crate::notify::{BatchLabel, BatchNotifier, Delivery, Notifier};
pub use crate::pipeline::Sentinel;

/// Install the global subscriber. `RUST_LOG` overrides the default filter,
/// `SENTINEL_LOG_JSON=1` switches to JSON lines. No-op if one is already installed.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crypto_news_sentinel=info,warn"));

    let json = std::env::var("SENTINEL_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

/// Wire the long-lived pieces from settings: news client, dedup cache, notifier, sentinel.
pub async fn build_sentinel(settings: Arc<Settings>) -> Result<Arc<Sentinel>> {
    if settings.credentials.news_api_key.is_none() {
        tracing::warn!("NEWS_API_KEY missing, every news query will come back empty");
    }
    let source = Arc::new(NewsApiClient::new(
        &settings.news,
        settings.credentials.news_api_key.clone(),
    ));
    let cache = Arc::new(DedupCache::load(&settings.dedup.path).await);
    let notifier = BatchNotifier::from_settings(&settings);
    let sentinel = Sentinel::new(settings, source, cache, notifier)?;
    Ok(Arc::new(sentinel))
}
