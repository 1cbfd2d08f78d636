// src/notify/mod.rs
//! Batch notifications: one chat message per batch, never one per article.

pub mod telegram;

use anyhow::Result;
use html_escape::{encode_double_quoted_attribute, encode_text};
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;

use crate::analyze::ScoredArticle;
use crate::config::Settings;

pub use telegram::TelegramNotifier;

/// Telegram rejects messages above this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;
pub const MAX_DESCRIPTION_CHARS: usize = 300;

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one pre-formatted (HTML) message.
    async fn send(&self, text: &str) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Fallback when chat credentials are absent: the message goes to the log only.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        tracing::info!(target: "notify", chars = text.chars().count(), "chat disabled, would send:\n{text}");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Pick the delivery channel from credentials.
pub fn notifier_from_settings(settings: &Settings) -> Arc<dyn Notifier> {
    let creds = &settings.credentials;
    match (&creds.telegram_token, &creds.chat_id) {
        (Some(token), Some(chat)) => Arc::new(TelegramNotifier::from_settings(
            &settings.notify,
            token.clone(),
            chat.clone(),
        )),
        _ => {
            tracing::warn!(target: "notify", "TELEGRAM_TOKEN or CHAT_ID missing, notifications go to the log only");
            Arc::new(LogNotifier)
        }
    }
}

/// What a batch is about: one tracked symbol, or the whole market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchLabel {
    Symbol(String),
    Global,
}

impl BatchLabel {
    pub fn from_symbol(symbol: Option<&str>) -> Self {
        match symbol {
            Some(s) => BatchLabel::Symbol(s.to_string()),
            None => BatchLabel::Global,
        }
    }

    fn heading(&self) -> String {
        match self {
            BatchLabel::Symbol(s) => format!("🚨 <b>Important news about {}</b>", encode_text(s)),
            BatchLabel::Global => "🌐 <b>Important crypto market news</b>".to_string(),
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn format_entry(idx: usize, item: &ScoredArticle) -> String {
    let a = &item.article;
    let mut out = format!("<b>{}. {}</b>\n", idx, encode_text(&a.title));
    if !a.description.is_empty() {
        out.push_str(&encode_text(&truncate_chars(&a.description, MAX_DESCRIPTION_CHARS)));
        out.push('\n');
    }
    let source = if a.source_name.is_empty() {
        "unknown"
    } else {
        a.source_name.as_str()
    };
    out.push_str(&format!(
        "Source: {} | Score: {} | Sentiment: {:+.2}\n",
        encode_text(source),
        item.score,
        item.sentiment
    ));
    if !item.tags.is_empty() {
        out.push_str(&format!("Tags: {}\n", encode_text(&item.tags.join(", "))));
    }
    if !a.url.is_empty() {
        out.push_str(&format!(
            "<a href=\"{}\">Read more</a>\n",
            encode_double_quoted_attribute(&a.url)
        ));
    }
    out
}

/// Compose the HTML message for a batch. Entries that would push the message
/// past Telegram's limit are left out, along with everything after them.
/// Returns the message and how many leading entries it carries.
pub fn format_batch(items: &[ScoredArticle], label: &BatchLabel) -> (String, usize) {
    let mut msg = label.heading();
    msg.push('\n');
    let mut included = 0;
    for (i, item) in items.iter().enumerate() {
        let entry = format_entry(i + 1, item);
        if msg.chars().count() + 1 + entry.chars().count() > MAX_MESSAGE_CHARS {
            tracing::warn!(target: "notify", dropped = items.len() - i, "message length cap reached");
            break;
        }
        msg.push('\n');
        msg.push_str(&entry);
        included += 1;
    }
    (msg.trim_end().to_string(), included)
}

/// Result of one batch delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The first `n` items of the batch went out in one message.
    Sent(usize),
    /// The channel failed; nothing went out.
    Failed,
}

impl Delivery {
    pub fn sent(&self) -> usize {
        match self {
            Delivery::Sent(n) => *n,
            Delivery::Failed => 0,
        }
    }
}

/// Caps, formats and delivers batches; on failure logs, pauses, and drops the batch.
#[derive(Clone)]
pub struct BatchNotifier {
    inner: Arc<dyn Notifier>,
    max_per_batch: usize,
    failure_pause: Duration,
}

impl BatchNotifier {
    pub fn new(inner: Arc<dyn Notifier>, max_per_batch: usize, failure_pause: Duration) -> Self {
        Self {
            inner,
            max_per_batch: max_per_batch.max(1),
            failure_pause,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            notifier_from_settings(settings),
            settings.notify.max_per_batch,
            Duration::from_secs(settings.notify.failure_pause_secs),
        )
    }

    pub fn max_per_batch(&self) -> usize {
        self.max_per_batch
    }

    pub fn channel(&self) -> &'static str {
        self.inner.name()
    }

    /// Send up to `max_per_batch` items as one message. Items that do not fit the
    /// message length cap are not sent and not counted. Never retries.
    pub async fn deliver(&self, items: &[ScoredArticle], label: &BatchLabel) -> Delivery {
        let batch = &items[..items.len().min(self.max_per_batch)];
        let (text, included) = format_batch(batch, label);
        if included == 0 {
            if !batch.is_empty() {
                tracing::warn!(target: "notify", label = ?label, "first entry exceeds message cap, nothing sent");
            }
            return Delivery::Sent(0);
        }

        match self.inner.send(&text).await {
            Ok(()) => {
                counter!("sentinel_batches_sent_total").increment(1);
                tracing::info!(
                    target: "notify",
                    channel = self.inner.name(),
                    label = ?label,
                    articles = included,
                    "batch delivered"
                );
                Delivery::Sent(included)
            }
            Err(e) => {
                counter!("sentinel_delivery_errors_total").increment(1);
                tracing::error!(
                    target: "notify",
                    channel = self.inner.name(),
                    label = ?label,
                    error = %format!("{e:#}"),
                    "batch delivery failed, dropping batch"
                );
                if !self.failure_pause.is_zero() {
                    tokio::time::sleep(self.failure_pause).await;
                }
                Delivery::Failed
            }
        }
    }
}
