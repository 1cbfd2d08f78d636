// src/ingest/types.rs
use serde::{Deserialize, Serialize};

/// One news item as returned by the search API, already normalized.
/// Missing upstream fields are empty strings, never absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source_name: String,
    /// Raw ISO-8601 timestamp as sent upstream; parsed by the recency filter.
    pub published_at: String,
}

impl Article {
    /// Uniqueness key: url, or title when the url is blank. `None` if both are blank.
    pub fn dedup_id(&self) -> Option<&str> {
        let url = self.url.trim();
        if !url.is_empty() {
            return Some(url);
        }
        let title = self.title.trim();
        (!title.is_empty()).then_some(title)
    }

    /// Title and description joined for sentiment / keyword scans.
    pub fn combined_text(&self) -> String {
        match (self.title.is_empty(), self.description.is_empty()) {
            (false, false) => format!("{}. {}", self.title, self.description),
            (false, true) => self.title.clone(),
            (true, false) => self.description.clone(),
            (true, true) => String::new(),
        }
    }
}

/// Anything that can answer a free-text news query.
/// Implementations swallow transport/parse failures and return an empty list.
#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    async fn search(&self, query: &str) -> Vec<Article>;
    fn name(&self) -> &'static str;
}
