//! Alert predicates.
//!
//! Each check compares the current snapshot with the previous persisted
//! state and returns ready-to-send message text. All checks are
//! edge-triggered: they fire on the run where a condition starts, not on
//! every run while it holds.

use chrono::{DateTime, FixedOffset};
use std::fmt;
use std::fmt::Write as _;

use crate::report::{escape_html, fg_emoji, format_fg_value, format_timestamp, normalize_fg_label};
use crate::risk::Regime;
use crate::types::{DashboardSnapshot, FearGreed, Indicators, MonitorState, SentimentMarket};

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Curve is inverted at or below this 10y-2y spread.
pub const T10Y2Y_INVERSION: f64 = 0.0;
/// High-yield spread at or above this signals credit stress.
pub const HY_OAS_STRESS: f64 = 6.0;
/// PMI below this means manufacturing contraction.
pub const ISM_PMI_CONTRACTION: f64 = 50.0;
/// Unemployment at or above this is flagged.
pub const UNRATE_WARNING: f64 = 4.5;
/// Crypto vs. stock Fear & Greed gap that counts as divergence.
pub const SENTIMENT_DIVERGENCE_GAP: f64 = 30.0;

// Assumed previous values when the state has none; each sits on the
// non-alarming side of its threshold.
const DEFAULT_PREV_T10Y2Y: f64 = 1.0;
const DEFAULT_PREV_HY_OAS: f64 = 0.0;
const DEFAULT_PREV_ISM_PMI: f64 = 100.0;
const DEFAULT_PREV_UNRATE: f64 = 0.0;

// ---------------------------------------------------------------------------
// Tier 1: Fear & Greed label changes
// ---------------------------------------------------------------------------

/// A Fear & Greed label that changed since the previous run.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentChange {
    pub market: SentimentMarket,
    pub previous_label: String,
    pub current_label: String,
    pub value: f64,
}

impl SentimentChange {
    fn transition(&self) -> String {
        format!(
            "{} {} → {} {}",
            fg_emoji(&self.previous_label),
            escape_html(&normalize_fg_label(&self.previous_label)),
            fg_emoji(&self.current_label),
            escape_html(&normalize_fg_label(&self.current_label)),
        )
    }
}

/// Label changes for crypto and stock, compared case-insensitively.
/// No previous label means no change.
pub fn detect_sentiment_changes(fg: &FearGreed, prev: &MonitorState) -> Vec<SentimentChange> {
    let pairs = [
        (SentimentMarket::Crypto, fg.crypto.as_ref(), prev.crypto_fg_label.as_deref()),
        (SentimentMarket::Stock, fg.stock.as_ref(), prev.stock_fg_label.as_deref()),
    ];

    pairs
        .into_iter()
        .filter_map(|(market, current, previous)| {
            let current = current?;
            let previous = previous?;
            if current.label.to_lowercase() == previous.to_lowercase() {
                return None;
            }
            Some(SentimentChange {
                market,
                previous_label: previous.to_string(),
                current_label: current.label.clone(),
                value: current.value,
            })
        })
        .collect()
}

/// One message for all Fear & Greed changes of this run.
pub fn check_sentiment_changes(
    fg: &FearGreed,
    prev: &MonitorState,
    now: &DateTime<FixedOffset>,
) -> Option<String> {
    let changes = detect_sentiment_changes(fg, prev);
    let when = format_timestamp(now);

    match changes.as_slice() {
        [] => None,
        [change] => Some(format!(
            "{} <b>{} Fear &amp; Greed changed</b>\n\n{}\n\nCurrent value: {}\nChanged at: {}\n\nSource: {}",
            change.market.emoji(),
            change.market,
            change.transition(),
            format_fg_value(change.value),
            when,
            change.market.source(),
        )),
        many => {
            let mut msg = format!("🚨 <b>Multiple F&amp;G changes</b>\n\nChanged at: {when}\n");
            for change in many {
                let _ = write!(
                    msg,
                    "\n<b>{} {} F&amp;G</b>\n{}\nValue: {}\n(Source: {})\n",
                    change.market.emoji(),
                    change.market,
                    change.transition(),
                    format_fg_value(change.value),
                    change.market.source(),
                );
            }
            Some(msg.trim_end().to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Tier 2: indicator threshold crossings
// ---------------------------------------------------------------------------

/// An indicator that crossed into its alarm zone, with the current value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorAlert {
    CurveInversion(f64),
    CreditStress(f64),
    PmiContraction(f64),
    UnemploymentRise(f64),
}

impl fmt::Display for IndicatorAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorAlert::CurveInversion(v) => write!(
                f,
                "⚠️ <b>T10Y2Y yield curve inverted</b>\n\nCurrent value: {v:.2}%\nHistorically a recession signal within 12-18 months"
            ),
            IndicatorAlert::CreditStress(v) => write!(
                f,
                "📊 <b>HY OAS entered the danger zone</b>\n\nCurrent value: {v:.2}%\nCredit risk is rising"
            ),
            IndicatorAlert::PmiContraction(v) => write!(
                f,
                "📉 <b>ISM PMI in contraction</b>\n\nCurrent value: {v:.1}\nManufacturing is shrinking"
            ),
            IndicatorAlert::UnemploymentRise(v) => write!(
                f,
                "📈 <b>Unemployment rising</b>\n\nCurrent value: {v:.1}%\nPossible economic slowdown"
            ),
        }
    }
}

/// Indicators that crossed their threshold since the previous run.
/// A missing current value skips that indicator.
pub fn detect_indicator_crossings(curr: &Indicators, prev: &Indicators) -> Vec<IndicatorAlert> {
    let mut alerts = Vec::new();

    if let Some(v) = curr.t10y2y {
        if v <= T10Y2Y_INVERSION && prev.t10y2y.unwrap_or(DEFAULT_PREV_T10Y2Y) > T10Y2Y_INVERSION {
            alerts.push(IndicatorAlert::CurveInversion(v));
        }
    }
    if let Some(v) = curr.hy_oas {
        if v >= HY_OAS_STRESS && prev.hy_oas.unwrap_or(DEFAULT_PREV_HY_OAS) < HY_OAS_STRESS {
            alerts.push(IndicatorAlert::CreditStress(v));
        }
    }
    if let Some(v) = curr.ism_pmi {
        if v < ISM_PMI_CONTRACTION
            && prev.ism_pmi.unwrap_or(DEFAULT_PREV_ISM_PMI) >= ISM_PMI_CONTRACTION
        {
            alerts.push(IndicatorAlert::PmiContraction(v));
        }
    }
    if let Some(v) = curr.unrate {
        if v >= UNRATE_WARNING && prev.unrate.unwrap_or(DEFAULT_PREV_UNRATE) < UNRATE_WARNING {
            alerts.push(IndicatorAlert::UnemploymentRise(v));
        }
    }

    alerts
}

pub fn check_indicator_crossings(curr: &Indicators, prev: &Indicators) -> Vec<String> {
    detect_indicator_crossings(curr, prev)
        .iter()
        .map(ToString::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Composite regime change
// ---------------------------------------------------------------------------

/// Message when the composite regime moved. Needs both a previous and a
/// current regime.
pub fn check_regime_change(
    previous: Option<Regime>,
    current: Option<Regime>,
    score: Option<f64>,
    now: &DateTime<FixedOffset>,
) -> Option<String> {
    let (previous, current, score) = (previous?, current?, score?);
    if previous == current {
        return None;
    }
    let (icon, direction) = if current > previous {
        ("⬆️", "escalated")
    } else {
        ("⬇️", "eased")
    };
    Some(format!(
        "{icon} <b>Macro risk regime {direction}</b>\n\n{} {} → {} {}\n\nRisk Score: {score:.3}\nChanged at: {}",
        previous.emoji(),
        previous.label(),
        current.emoji(),
        current.label(),
        format_timestamp(now),
    ))
}

// ---------------------------------------------------------------------------
// Sentiment divergence
// ---------------------------------------------------------------------------

fn gap(crypto: Option<f64>, stock: Option<f64>) -> Option<f64> {
    Some((crypto? - stock?).abs())
}

/// Message when crypto and stock Fear & Greed drift at least
/// `SENTIMENT_DIVERGENCE_GAP` points apart. An unknown previous gap
/// counts as below the threshold.
pub fn check_sentiment_divergence(fg: &FearGreed, prev: &MonitorState) -> Option<String> {
    let crypto = fg.crypto.as_ref()?;
    let stock = fg.stock.as_ref()?;
    let current_gap = (crypto.value - stock.value).abs();
    if current_gap < SENTIMENT_DIVERGENCE_GAP {
        return None;
    }
    let previous_gap = gap(prev.crypto_fg_value, prev.stock_fg_value).unwrap_or(0.0);
    if previous_gap >= SENTIMENT_DIVERGENCE_GAP {
        return None;
    }
    let (hot, cold) = if crypto.value > stock.value {
        ("Crypto", "stocks")
    } else {
        ("Stock", "crypto")
    };
    Some(format!(
        "🔀 <b>Sentiment divergence</b>\n\n🪙 Crypto F&amp;G: {} ({})\n📈 Stock F&amp;G: {} ({})\n\nGap: {:.0} points. {hot} sentiment is far more optimistic than {cold}.",
        format_fg_value(crypto.value),
        escape_html(&crypto.label),
        format_fg_value(stock.value),
        escape_html(&stock.label),
        current_gap,
    ))
}

// ---------------------------------------------------------------------------
// All checks
// ---------------------------------------------------------------------------

/// Run every check against `prev` and return the messages in send order:
/// sentiment changes, regime change, indicator crossings, divergence.
pub fn collect_alerts(
    snapshot: &DashboardSnapshot,
    current: &MonitorState,
    prev: &MonitorState,
    now: &DateTime<FixedOffset>,
) -> Vec<String> {
    let mut alerts = Vec::new();
    alerts.extend(check_sentiment_changes(&snapshot.fear_greed, prev, now));
    alerts.extend(check_regime_change(prev.regime, current.regime, current.risk_score, now));
    alerts.extend(check_indicator_crossings(&current.indicators, &prev.indicators));
    alerts.extend(check_sentiment_divergence(&snapshot.fear_greed, prev));
    alerts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
