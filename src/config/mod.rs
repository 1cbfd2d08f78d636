// src/config/mod.rs
//! Process-wide settings, read once at startup.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults (`defaults.rs`)
//! 2. TOML file: `$SENTINEL_CONFIG_PATH`, else `config/sentinel.toml` if present
//! 3. env overrides: `SENTINEL_SCORE_THRESHOLD`, `SENTINEL_DEDUP_PATH`
//!
//! Credentials (`TELEGRAM_TOKEN`, `CHAT_ID`, `NEWS_API_KEY`) only ever come from env.

pub mod defaults;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/sentinel.toml";

pub const ENV_CONFIG_PATH: &str = "SENTINEL_CONFIG_PATH";
pub const ENV_SCORE_THRESHOLD: &str = "SENTINEL_SCORE_THRESHOLD";
pub const ENV_DEDUP_PATH: &str = "SENTINEL_DEDUP_PATH";
pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const ENV_CHAT_ID: &str = "CHAT_ID";
pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";

/// Secrets. Never serialized, never logged.
#[derive(Clone, Default)]
pub struct Credentials {
    pub telegram_token: Option<String>,
    pub chat_id: Option<String>,
    pub news_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("telegram_token", &self.telegram_token.as_ref().map(|_| "***"))
            .field("chat_id", &self.chat_id)
            .field("news_api_key", &self.news_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            telegram_token: non_empty_env(ENV_TELEGRAM_TOKEN),
            chat_id: non_empty_env(ENV_CHAT_ID),
            news_api_key: non_empty_env(ENV_NEWS_API_KEY),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    /// Minimum total score for an article to be notified.
    pub threshold: i32,
    /// |compound| at or above this earns the strong-sentiment bonus.
    pub strong_sentiment: f32,
    pub sensitive_keywords: Vec<String>,
    pub trusted_sources: Vec<String>,
    pub critical_entities: Vec<String>,
    pub hedge_words: Vec<String>,
    pub major_symbols: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsSettings {
    pub base_url: String,
    pub language: Option<String>,
    pub sort_by_recency: bool,
    pub page_size: u32,
    pub timeout_secs: u64,
    pub market_query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ActiveHours {
    /// Inclusive local hour, 0..=23.
    pub start: u32,
    /// Exclusive local hour, 1..=24.
    pub end: u32,
}

impl ActiveHours {
    pub fn contains(&self, hour: u32) -> bool {
        if self.start <= self.end {
            hour >= self.start && hour < self.end
        } else {
            // window wraps midnight, e.g. 22..6
            hour >= self.start || hour < self.end
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    pub symbol_pause_secs: u64,
    pub sweep_interval_secs: u64,
    pub market_interval_secs: u64,
    pub active_hours: Option<ActiveHours>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    pub max_per_batch: usize,
    pub failure_pause_secs: u64,
    pub telegram_api_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecencySettings {
    pub max_age_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DedupSettings {
    pub path: PathBuf,
}

/// Immutable run configuration, shared as `Arc<Settings>`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip)]
    pub credentials: Credentials,
    pub symbols: Vec<String>,
    pub scoring: ScoringSettings,
    pub news: NewsSettings,
    pub schedule: ScheduleSettings,
    pub notify: NotifySettings,
    pub recency: RecencySettings,
    pub dedup: DedupSettings,
}

impl Settings {
    /// Full startup load: TOML (if any) + env overrides + env credentials.
    pub fn load() -> Result<Self> {
        let mut settings = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    return Err(anyhow!(
                        "{ENV_CONFIG_PATH} points to non-existent path {}",
                        pb.display()
                    ));
                }
                Self::from_toml_file(&pb)?
            }
            Err(_) => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_toml_file(&default_path)?
                } else {
                    tracing::info!(target: "config", "no config file found, using built-in defaults");
                    Self::default()
                }
            }
        };

        settings.apply_env_overrides()?;
        settings.credentials = Credentials::from_env();
        Ok(settings)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut settings: Settings = toml::from_str(s)?;
        settings.sanitize();
        settings.validate()?;
        Ok(settings)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(raw) = non_empty_env(ENV_SCORE_THRESHOLD) {
            self.scoring.threshold = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_SCORE_THRESHOLD} must be an integer, got {raw:?}"))?;
        }
        if let Some(p) = non_empty_env(ENV_DEDUP_PATH) {
            self.dedup.path = PathBuf::from(p);
        }
        Ok(())
    }

    /// Trim and dedup every list; clamp numeric knobs into sane ranges.
    fn sanitize(&mut self) {
        self.symbols = clean_list(std::mem::take(&mut self.symbols));
        let sc = &mut self.scoring;
        sc.sensitive_keywords = clean_list(std::mem::take(&mut sc.sensitive_keywords));
        sc.trusted_sources = clean_list(std::mem::take(&mut sc.trusted_sources));
        sc.critical_entities = clean_list(std::mem::take(&mut sc.critical_entities));
        sc.hedge_words = clean_list(std::mem::take(&mut sc.hedge_words));
        sc.major_symbols = clean_list(std::mem::take(&mut sc.major_symbols));
        sc.strong_sentiment = sc.strong_sentiment.clamp(0.0, 1.0);

        if self.notify.max_per_batch == 0 {
            self.notify.max_per_batch = defaults::MAX_PER_BATCH;
        }
        if self.news.timeout_secs == 0 {
            self.news.timeout_secs = defaults::HTTP_TIMEOUT_SECS;
        }
        if self.notify.timeout_secs == 0 {
            self.notify.timeout_secs = defaults::HTTP_TIMEOUT_SECS;
        }
        self.news.page_size = self.news.page_size.clamp(1, 100);
        if self.news.language.as_deref().is_some_and(|l| l.trim().is_empty()) {
            self.news.language = None;
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(h) = self.schedule.active_hours {
            if h.start > 23 || h.end > 24 || h.start == h.end {
                return Err(anyhow!(
                    "invalid active_hours {{ start = {}, end = {} }}",
                    h.start,
                    h.end
                ));
            }
        }
        if self.recency.max_age_minutes <= 0 {
            return Err(anyhow!("recency.max_age_minutes must be positive"));
        }
        if chrono::Duration::try_minutes(self.recency.max_age_minutes).is_none() {
            return Err(anyhow!(
                "recency.max_age_minutes = {} is out of range",
                self.recency.max_age_minutes
            ));
        }
        if self.schedule.sweep_interval_secs == 0 || self.schedule.market_interval_secs == 0 {
            return Err(anyhow!(
                "schedule.sweep_interval_secs and schedule.market_interval_secs must be positive"
            ));
        }
        if self.news.market_query.trim().is_empty() {
            return Err(anyhow!("news.market_query must not be empty"));
        }
        Ok(())
    }

    /// Saturates instead of panicking when built without `validate`.
    pub fn recency_window(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.recency.max_age_minutes).unwrap_or(chrono::Duration::MAX)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Trim, drop empties, drop repeats (first occurrence wins, order kept).
pub fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && seen.insert(t.to_ascii_lowercase()) {
            out.push(t.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_list_keeps_order_and_drops_repeats() {
        let raw = vec![
            " Bitcoin ".to_string(),
            "".into(),
            "Dogecoin".into(),
            "bitcoin".into(),
            "XRP".into(),
            "Dogecoin".into(),
        ];
        assert_eq!(clean_list(raw), vec!["Bitcoin", "Dogecoin", "XRP"]);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let s = Settings::from_toml_str(
            r#"
symbols = ["Bitcoin", "Solana"]

[scoring]
threshold = 4
"#,
        )
        .unwrap();
        assert_eq!(s.symbols, vec!["Bitcoin", "Solana"]);
        assert_eq!(s.scoring.threshold, 4);
        assert_eq!(s.notify.max_per_batch, 2);
        assert_eq!(s.recency.max_age_minutes, 120);
        assert!(s.scoring.trusted_sources.iter().any(|t| t == "CoinDesk"));
    }

    #[test]
    fn bad_active_hours_rejected() {
        let err = Settings::from_toml_str(
            r#"
[schedule]
active_hours = { start = 8, end = 8 }
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("active_hours"));
    }

    #[test]
    fn huge_recency_window_rejected() {
        let err = Settings::from_toml_str("[recency]\nmax_age_minutes = 9000000000000000\n")
            .unwrap_err();
        assert!(err.to_string().contains("max_age_minutes"), "{err}");
    }

    #[test]
    fn recency_window_saturates_without_validation() {
        let mut s = Settings::default();
        s.recency.max_age_minutes = i64::MAX;
        assert_eq!(s.recency_window(), chrono::Duration::MAX);
        s.recency.max_age_minutes = 90;
        assert_eq!(s.recency_window(), chrono::Duration::minutes(90));
    }

    #[test]
    fn zero_poll_intervals_rejected() {
        for body in [
            "[schedule]\nsweep_interval_secs = 0\n",
            "[schedule]\nmarket_interval_secs = 0\n",
        ] {
            let err = Settings::from_toml_str(body).unwrap_err();
            assert!(err.to_string().contains("interval"), "{body}: {err}");
        }
    }

    #[test]
    fn active_hours_wraps_midnight() {
        let day = ActiveHours { start: 8, end: 24 };
        assert!(day.contains(8));
        assert!(day.contains(23));
        assert!(!day.contains(3));

        let night = ActiveHours { start: 22, end: 6 };
        assert!(night.contains(23));
        assert!(night.contains(2));
        assert!(!night.contains(12));
    }

    #[test]
    fn credentials_debug_redacts_secrets() {
        let c = Credentials {
            telegram_token: Some("123:secret".into()),
            chat_id: Some("42".into()),
            news_api_key: Some("key".into()),
        };
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret"));
        assert!(!dbg.contains("\"key\""));
        assert!(dbg.contains("42"));
    }
}
