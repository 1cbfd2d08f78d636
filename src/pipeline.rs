// src/pipeline.rs
//! Per-query pipeline: source → recency → score → dedup claim → notify.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use std::sync::Arc;

use crate::analyze::{score_article, ScoredArticle, ScoringProfile};
use crate::config::Settings;
use crate::dedup::DedupCache;
use crate::ingest::{Article, ArticleSource};
use crate::notify::{BatchLabel, BatchNotifier, Delivery};
use crate::recency::is_fresh;
use crate::sentiment::SentimentAnalyzer;

/// Everything a monitor needs, shared by both monitors via `Arc`.
/// The dedup cache is the only mutable piece.
pub struct Sentinel {
    settings: Arc<Settings>,
    profile: ScoringProfile,
    analyzer: SentimentAnalyzer,
    source: Arc<dyn ArticleSource>,
    cache: Arc<DedupCache>,
    notifier: BatchNotifier,
}

impl Sentinel {
    pub fn new(
        settings: Arc<Settings>,
        source: Arc<dyn ArticleSource>,
        cache: Arc<DedupCache>,
        notifier: BatchNotifier,
    ) -> Result<Self> {
        let profile = ScoringProfile::from_settings(&settings.scoring)?;
        Ok(Self {
            settings,
            profile,
            analyzer: SentimentAnalyzer::new(),
            source,
            cache,
            notifier,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<DedupCache> {
        &self.cache
    }

    fn max_age(&self) -> Duration {
        self.settings.recency_window()
    }

    /// Fetch `query` and run the full pipeline. Returns the number of articles delivered.
    pub async fn process_query(&self, query: &str, symbol: Option<&str>) -> usize {
        let articles = self.source.search(query).await;
        if articles.is_empty() {
            tracing::debug!(target: "pipeline", query, "no articles");
            return 0;
        }
        self.analyze_and_send(articles, symbol, Utc::now()).await
    }

    /// Articles that are unseen, fresh, and at or above threshold, best first.
    /// Does not touch the cache beyond reading it.
    pub async fn select(
        &self,
        articles: Vec<Article>,
        symbol: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<ScoredArticle> {
        let max_age = self.max_age();
        let mut qualifying = Vec::new();

        for article in articles {
            let Some(id) = article.dedup_id() else {
                tracing::debug!(target: "pipeline", "article without url or title, skipping");
                continue;
            };
            if self.cache.contains(id).await {
                counter!("sentinel_duplicates_total").increment(1);
                continue;
            }
            if !is_fresh(&article.published_at, now, max_age) {
                counter!("sentinel_stale_total").increment(1);
                continue;
            }

            let scored = score_article(&self.profile, &self.analyzer, article, symbol);
            tracing::debug!(
                target: "pipeline",
                symbol = symbol.unwrap_or("global"),
                title = %scored.article.title,
                breakdown = %scored.breakdown.summary(),
                "scored"
            );
            if self.profile.qualifies(&scored.breakdown) {
                counter!("sentinel_qualified_total").increment(1);
                qualifying.push(scored);
            }
        }

        // stable: equal scores keep fetch order (newest first)
        qualifying.sort_by(|a, b| b.score.cmp(&a.score));
        qualifying
    }

    /// Score `articles`, claim the best unseen ones in the cache, and notify them as
    /// one batch. Flushes the cache after a successful delivery.
    pub async fn analyze_and_send(
        &self,
        articles: Vec<Article>,
        symbol: Option<&str>,
        now: DateTime<Utc>,
    ) -> usize {
        let candidates = self.select(articles, symbol, now).await;
        if candidates.is_empty() {
            return 0;
        }

        let cap = self.notifier.max_per_batch();
        let mut batch = Vec::with_capacity(cap);
        for scored in candidates {
            if batch.len() >= cap {
                break;
            }
            let Some(id) = scored.article.dedup_id() else {
                continue;
            };
            // the other monitor may have claimed it since `select`
            if self.cache.claim(id).await {
                batch.push(scored);
            } else {
                counter!("sentinel_duplicates_total").increment(1);
            }
        }
        if batch.is_empty() {
            return 0;
        }

        let label = BatchLabel::from_symbol(symbol);
        let sent = match self.notifier.deliver(&batch, &label).await {
            Delivery::Sent(n) => {
                // entries cut by the message length cap were never sent
                for scored in &batch[n..] {
                    if let Some(id) = scored.article.dedup_id() {
                        self.cache.release(id).await;
                    }
                }
                n
            }
            // failed batch stays claimed: never re-sent by this process
            Delivery::Failed => 0,
        };
        if sent > 0 {
            if let Err(e) = self.cache.flush().await {
                tracing::error!(target: "pipeline", error = %format!("{e:#}"), "dedup flush failed");
            }
        }
        sent
    }
}
