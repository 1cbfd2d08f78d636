// src/analyze/mod.rs
//! Analysis step: sentiment + additive scoring for a single article.

pub mod scoring;

use serde::Serialize;

use crate::ingest::Article;
use crate::sentiment::SentimentAnalyzer;

pub use crate::analyze::scoring::{ScoreBreakdown, ScoreInput, ScoringProfile};

/// Article plus everything the scorer derived from it. Not persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredArticle {
    pub article: Article,
    pub score: i32,
    /// Critical entities mentioned, in configuration order.
    pub tags: Vec<String>,
    pub sentiment: f32,
    pub breakdown: ScoreBreakdown,
}

/// Run sentiment over title + description, then score against `profile`.
pub fn score_article(
    profile: &ScoringProfile,
    analyzer: &SentimentAnalyzer,
    article: Article,
    symbol: Option<&str>,
) -> ScoredArticle {
    let sentiment = analyzer.compound(&article.combined_text());
    let breakdown = profile.score(&ScoreInput {
        title: &article.title,
        description: &article.description,
        source: &article.source_name,
        sentiment,
        symbol,
    });
    ScoredArticle {
        score: breakdown.total,
        tags: breakdown.tags.clone(),
        sentiment,
        breakdown,
        article,
    }
}
