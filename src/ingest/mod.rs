// src/ingest/mod.rs
pub mod newsapi;
pub mod types;

use once_cell::sync::OnceCell;
use regex::Regex;

pub use newsapi::NewsApiClient;
pub use types::{Article, ArticleSource};

/// Placeholder title NewsAPI uses for articles pulled by the publisher.
pub const REMOVED_PLACEHOLDER: &str = "[Removed]";

/// Normalize upstream text: decode entities, strip tags, unify quotes, collapse whitespace.
/// Punctuation is kept because `?` in a headline is a scoring signal.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// True for items the publisher has withdrawn; they carry no usable content.
pub fn is_removed(article: &Article) -> bool {
    article.title.trim() == REMOVED_PLACEHOLDER
}
