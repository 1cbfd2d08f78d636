//! Dry run: fetch one query, filter and score it, print the breakdown.
//! Sends nothing and never writes the dedup file.
//!
//! Usage: sentinel_once <query> [symbol]

use std::sync::Arc;

use chrono::Utc;
use crypto_news_sentinel::{
    analyze::score_article, init_tracing, recency::is_fresh, sentiment::SentimentAnalyzer,
    ArticleSource, NewsApiClient, ScoringProfile, Settings,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let mut args = std::env::args().skip(1);
    let Some(query) = args.next() else {
        anyhow::bail!("usage: sentinel_once <query> [symbol]");
    };
    let symbol = args.next();

    let settings = Arc::new(Settings::load()?);
    let profile = ScoringProfile::from_settings(&settings.scoring)?;
    let analyzer = SentimentAnalyzer::new();
    let client = NewsApiClient::new(&settings.news, settings.credentials.news_api_key.clone());

    let now = Utc::now();
    let articles = client.search(&query).await;
    println!("{} articles for {query:?}", articles.len());

    for article in articles {
        if !is_fresh(&article.published_at, now, settings.recency_window()) {
            println!("  stale  {}", article.title);
            continue;
        }
        let scored = score_article(&profile, &analyzer, article, symbol.as_deref());
        let mark = if profile.qualifies(&scored.breakdown) {
            "SEND"
        } else {
            "skip"
        };
        println!(
            "  {mark}   [{:>2}] {} ({})\n         {} sentiment={:+.2} tags={:?}",
            scored.score,
            scored.article.title,
            scored.article.source_name,
            scored.breakdown.summary(),
            scored.sentiment,
            scored.tags
        );
    }

    println!("threshold = {}", profile.threshold());
    Ok(())
}
