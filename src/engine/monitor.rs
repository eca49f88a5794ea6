//! Daily monitor: detect Fear & Greed regime changes, composite regime
//! moves, indicator threshold crossings and sentiment divergence.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use tracing::info;

use crate::alerts::collect_alerts;
use crate::data::MacroSource;
use crate::notify::{send_all, Notifier};
use crate::risk::{calculate_risk_score, Regime};
use crate::storage;
use crate::types::MonitorState;

/// Outcome of one monitor run.
#[derive(Debug, Clone)]
pub struct MonitorReport {
    pub risk_score: Option<f64>,
    pub regime: Option<Regime>,
    pub alerts: Vec<String>,
    pub delivered: usize,
}

/// Fetch, compare against the state at `state_path`, alert, and
/// overwrite the state.
pub async fn run_monitor<S, N>(
    source: &S,
    notifier: &N,
    state_path: &str,
    now: DateTime<FixedOffset>,
) -> Result<MonitorReport>
where
    S: MacroSource + ?Sized,
    N: Notifier + ?Sized,
{
    info!(at = %now, "Starting monitor run");

    let previous = storage::load_state(state_path)?.unwrap_or_default();

    let snapshot = source
        .fetch_snapshot()
        .await
        .context("Failed to fetch dashboard data")?;

    let indicators = snapshot.fred.latest();
    let risk_score = calculate_risk_score(&indicators);
    let current = MonitorState::from_snapshot(&snapshot, risk_score);

    info!(
        crypto_fg = ?current.crypto_fg_value,
        crypto_label = ?current.crypto_fg_label,
        stock_fg = ?current.stock_fg_value,
        stock_label = ?current.stock_fg_label,
        risk_score = ?risk_score,
        regime = ?current.regime,
        "Snapshot evaluated"
    );

    let alerts = collect_alerts(&snapshot, &current, &previous, &now);
    let delivered = send_all(notifier, &alerts).await;

    storage::save_state(&current, state_path)?;

    info!(
        alerts = alerts.len(),
        delivered,
        "Monitoring complete"
    );

    Ok(MonitorReport {
        risk_score,
        regime: current.regime,
        alerts,
        delivered,
    })
}
