//! Weekly macro risk review.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use tracing::info;

use crate::data::MacroSource;
use crate::notify::Notifier;
use crate::report::WeeklyReview;
use crate::risk::{calculate_risk_score, Regime};
use crate::types::PulseError;

/// Fetch the dashboard, score it, and send the review. Returns the
/// message that was sent.
pub async fn run_weekly<S, N>(source: &S, notifier: &N, now: DateTime<FixedOffset>) -> Result<String>
where
    S: MacroSource + ?Sized,
    N: Notifier + ?Sized,
{
    info!(at = %now, "Generating weekly summary");

    let snapshot = source
        .fetch_snapshot()
        .await
        .context("Failed to fetch dashboard data")?;

    let indicators = snapshot.fred.latest();
    let score = calculate_risk_score(&indicators).ok_or_else(|| {
        PulseError::MissingIndicator(indicators.first_missing().unwrap_or("unknown"))
    })?;
    let regime = Regime::from_score(score);
    let dashboard_url = source.dashboard_url();

    let message = WeeklyReview {
        score,
        regime,
        indicators,
        crypto: snapshot.fear_greed.crypto.as_ref(),
        stock: snapshot.fear_greed.stock.as_ref(),
        dashboard_url: &dashboard_url,
        now,
    }
    .render();

    notifier
        .send(&message)
        .await
        .context("Failed to send weekly summary")?;

    info!(score, regime = %regime, "Weekly summary sent");
    Ok(message)
}
