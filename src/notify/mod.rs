//! Outbound notifications.
//!
//! Defines the `Notifier` trait. The Telegram implementation posts
//! HTML-formatted messages to a bot chat; `DisabledNotifier` stands in
//! when no credentials are configured.

pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

pub use telegram::TelegramNotifier;

/// Abstraction over a messaging webhook.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one HTML-formatted message.
    async fn send(&self, text: &str) -> Result<()>;

    /// Whether messages actually leave the process.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Swallows messages when Telegram credentials are not configured.
#[derive(Debug, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        warn!(chars = text.chars().count(), "Telegram credentials not configured, message dropped");
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Send every message, logging failures instead of aborting.
/// Returns how many were delivered; always 0 for a disabled notifier.
pub async fn send_all<N: Notifier + ?Sized>(notifier: &N, messages: &[String]) -> usize {
    let enabled = notifier.is_enabled();
    let mut delivered = 0;
    for message in messages {
        match notifier.send(message).await {
            Ok(()) if enabled => delivered += 1,
            Ok(()) => {}
            Err(e) => warn!(error = %e, "Notification failed, continuing"),
        }
    }
    delivered
}
