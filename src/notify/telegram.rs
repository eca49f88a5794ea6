//! Telegram Bot API sender.
//!
//! `POST https://api.telegram.org/bot{token}/sendMessage` with a JSON body
//! `{chat_id, text, parse_mode: "HTML"}`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use super::Notifier;
use crate::config::TelegramCredentials;
use crate::types::PulseError;

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

pub struct TelegramNotifier {
    http: Client,
    bot_token: SecretString,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(credentials: TelegramCredentials, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build Telegram HTTP client")?;
        Ok(Self {
            http,
            bot_token: credentials.bot_token,
            chat_id: credentials.chat_id,
        })
    }

    fn send_url(&self) -> String {
        format!("{API_BASE}/bot{}/sendMessage", self.bot_token.expose_secret())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
        };

        // Errors from reqwest embed the URL, which carries the token.
        let response = self
            .http
            .post(self.send_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| PulseError::Notifier(format!("send failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_else(|_| "unknown".into());
            warn!(%status, body = %detail, "Telegram API rejected message");
            return Err(PulseError::Notifier(format!("Telegram API responded {status}")).into());
        }

        info!(%status, "Telegram message sent");
        Ok(())
    }
}
