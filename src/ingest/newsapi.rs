// src/ingest/newsapi.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::NewsSettings;
use crate::ingest::types::{Article, ArticleSource};
use crate::ingest::{is_removed, normalize_text};

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Option<Vec<RawArticle>>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    source: Option<RawSource>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSource {
    name: Option<String>,
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        Article {
            title: normalize_text(raw.title.as_deref().unwrap_or_default()),
            description: normalize_text(raw.description.as_deref().unwrap_or_default()),
            url: raw.url.unwrap_or_default().trim().to_string(),
            source_name: raw
                .source
                .and_then(|s| s.name)
                .unwrap_or_default()
                .trim()
                .to_string(),
            published_at: raw.published_at.unwrap_or_default().trim().to_string(),
        }
    }
}

/// NewsAPI `/v2/everything` client. One GET per query, no retries:
/// the next poll cycle is the retry.
#[derive(Clone)]
pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    language: Option<String>,
    sort_by_recency: bool,
    page_size: u32,
    timeout: Duration,
}

impl NewsApiClient {
    pub fn new(settings: &NewsSettings, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.base_url.clone(),
            api_key,
            language: settings.language.clone(),
            sort_by_recency: settings.sort_by_recency,
            page_size: settings.page_size,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn query_params(&self, query: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", query.to_string())];
        if self.sort_by_recency {
            params.push(("sortBy", "publishedAt".to_string()));
        }
        if let Some(lang) = &self.language {
            params.push(("language", lang.clone()));
        }
        params.push(("pageSize", self.page_size.to_string()));
        params
    }

    /// Fallible fetch; `search` wraps this and never surfaces the error.
    pub async fn try_search(&self, query: &str) -> Result<Vec<Article>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("NEWS_API_KEY is not set"))?;

        let t0 = std::time::Instant::now();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&self.query_params(query))
            .header("X-Api-Key", api_key)
            .timeout(self.timeout)
            .send()
            .await
            .context("newsapi request")?;

        let status = resp.status();
        let body = resp.text().await.context("read newsapi body")?;
        histogram!("sentinel_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .map(|e| {
                    format!(
                        "{}: {}",
                        e.code.unwrap_or_else(|| "unknown".into()),
                        e.message.unwrap_or_else(|| "Unknown error".into())
                    )
                })
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(anyhow!("newsapi returned {status}: {detail}"));
        }

        let parsed: EverythingResponse =
            serde_json::from_str(&body).context("parse newsapi JSON")?;
        let raw = parsed
            .articles
            .ok_or_else(|| anyhow!("newsapi payload has no `articles` field"))?;

        let out: Vec<Article> = raw
            .into_iter()
            .map(Article::from)
            .filter(|a| !is_removed(a))
            .collect();

        counter!("sentinel_articles_fetched_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl ArticleSource for NewsApiClient {
    async fn search(&self, query: &str) -> Vec<Article> {
        match self.try_search(query).await {
            Ok(v) => {
                tracing::debug!(target: "ingest", query, count = v.len(), "fetched articles");
                v
            }
            Err(e) => {
                tracing::warn!(target: "ingest", query, error = %format!("{e:#}"), "news fetch failed");
                counter!("sentinel_source_errors_total").increment(1);
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "NewsAPI"
    }
}
