// src/config/defaults.rs
//! Built-in seed used when no config file is present, and per-field fallback
//! for partial TOML files.

use std::path::PathBuf;

use super::{
    Credentials, DedupSettings, NewsSettings, NotifySettings, RecencySettings, ScheduleSettings,
    ScoringSettings, Settings,
};

pub const SCORE_THRESHOLD: i32 = 6;
pub const STRONG_SENTIMENT: f32 = 0.7;
pub const MAX_PER_BATCH: usize = 2;
pub const HTTP_TIMEOUT_SECS: u64 = 10;
pub const RECENCY_MINUTES: i64 = 120;

pub const NEWS_API_BASE: &str = "https://newsapi.org/v2/everything";
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const MARKET_QUERY: &str = "cryptocurrency OR bitcoin OR crypto";
pub const DEDUP_PATH: &str = "state/sent_news.json";

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            threshold: SCORE_THRESHOLD,
            strong_sentiment: STRONG_SENTIMENT,
            sensitive_keywords: owned(&[
                "pump",
                "surge",
                "spike",
                "skyrocketing",
                "dump",
                "fall",
                "crash",
                "drop",
            ]),
            trusted_sources: owned(&[
                "CoinDesk",
                "Cointelegraph",
                "Bloomberg",
                "Forbes",
                "Yahoo",
                "Reuters",
            ]),
            critical_entities: owned(&[
                "SEC",
                "CFTC",
                "Federal Reserve",
                "Gensler",
                "Powell",
                "Elon Musk",
                "Trump",
                "BlackRock",
                "Binance",
                "Coinbase",
                "ETF",
                "lawsuit",
                "ban",
                "hack",
            ]),
            hedge_words: owned(&["might", "could", "may"]),
            major_symbols: owned(&["Bitcoin", "Ethereum"]),
        }
    }
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            base_url: NEWS_API_BASE.to_string(),
            language: Some("en".to_string()),
            sort_by_recency: true,
            page_size: 20,
            timeout_secs: HTTP_TIMEOUT_SECS,
            market_query: MARKET_QUERY.to_string(),
        }
    }
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            symbol_pause_secs: 3,
            sweep_interval_secs: 15 * 60,
            market_interval_secs: 10 * 60,
            active_hours: None,
        }
    }
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            max_per_batch: MAX_PER_BATCH,
            failure_pause_secs: 5,
            telegram_api_base: TELEGRAM_API_BASE.to_string(),
            timeout_secs: HTTP_TIMEOUT_SECS,
        }
    }
}

impl Default for RecencySettings {
    fn default() -> Self {
        Self {
            max_age_minutes: RECENCY_MINUTES,
        }
    }
}

impl Default for DedupSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEDUP_PATH),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            symbols: owned(&[
                "Bitcoin",
                "Ethereum",
                "Dogecoin",
                "XRP",
                "Litecoin",
                "Cardano",
                "Solana",
                "Polkadot",
                "BinanceCoin",
                "Shiba Inu",
                "Avalanche",
                "Polygon",
                "Chainlink",
                "Uniswap",
                "Terra",
                "Ethereum Classic",
                "VeChain",
            ]),
            scoring: ScoringSettings::default(),
            news: NewsSettings::default(),
            schedule: ScheduleSettings::default(),
            notify: NotifySettings::default(),
            recency: RecencySettings::default(),
            dedup: DedupSettings::default(),
        }
    }
}
