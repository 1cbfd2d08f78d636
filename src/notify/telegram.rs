use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Notifier;
use crate::config::NotifySettings;

/// Telegram Bot API `sendMessage` client for one chat.
#[derive(Clone)]
pub struct TelegramNotifier {
    api_base: String,
    token: String,
    chat_id: String,
    client: Client,
    timeout: Duration,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct TelegramReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

impl TelegramNotifier {
    pub fn new(token: String, chat_id: String) -> Self {
        Self {
            api_base: crate::config::defaults::TELEGRAM_API_BASE.to_string(),
            token,
            chat_id,
            client: Client::new(),
            timeout: Duration::from_secs(crate::config::defaults::HTTP_TIMEOUT_SECS),
        }
    }

    pub fn from_settings(settings: &NotifySettings, token: String, chat_id: String) -> Self {
        Self::new(token, chat_id)
            .with_api_base(&settings.telegram_api_base)
            .with_timeout(settings.timeout_secs)
    }

    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }

    /// Error text with the bot token scrubbed out.
    fn redact(&self, s: &str) -> String {
        if self.token.is_empty() {
            s.to_string()
        } else {
            s.replace(&self.token, "***")
        }
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let rsp = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| anyhow!("telegram request failed: {}", self.redact(&e.to_string())))?;

        let status = rsp.status();
        let body = rsp.text().await.context("read telegram reply")?;

        // Bot API answers JSON even on 4xx; prefer its description.
        match serde_json::from_str::<TelegramReply>(&body) {
            Ok(reply) if reply.ok && status.is_success() => Ok(()),
            Ok(reply) => Err(anyhow!(
                "telegram rejected message ({}): {}",
                reply.error_code.map(|c| c.to_string()).unwrap_or_else(|| status.to_string()),
                reply.description.unwrap_or_else(|| "no description".into())
            )),
            Err(_) => Err(anyhow!("telegram returned {status} with unexpected body")),
        }
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}
