//! Telegram message formatting (HTML parse mode).

use chrono::{DateTime, FixedOffset, NaiveDate};
use std::fmt::Write as _;

use crate::alerts::{HY_OAS_STRESS, ISM_PMI_CONTRACTION, T10Y2Y_INVERSION, UNRATE_WARNING};
use crate::risk::Regime;
use crate::types::{FearGreedReading, Indicators};

pub const RULE: &str = "━━━━━━━━━━━━━━━━━━━━";

const KRW_PER_TRILLION: f64 = 1_000_000_000_000.0;

/// Escape text for Telegram's HTML parse mode. Quotes are escaped too so
/// the result is safe inside attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Fear & Greed labels
// ---------------------------------------------------------------------------

/// Title-case a Fear & Greed label for display ("extreme fear" → "Extreme Fear").
pub fn normalize_fg_label(label: &str) -> String {
    label
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Emoji for an upstream Fear & Greed label, case-insensitive.
pub fn fg_emoji(label: &str) -> &'static str {
    match label.trim().to_lowercase().as_str() {
        "extreme fear" => "🔴",
        "fear" => "🟠",
        "neutral" => "🟡",
        "greed" => "🟢",
        "extreme greed" => "🟢🟢",
        _ => "❓",
    }
}

/// Fear & Greed values are integers upstream for crypto and fractional
/// for stocks; print whole numbers without a decimal point.
pub fn format_fg_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn reading_line(reading: Option<&FearGreedReading>) -> String {
    match reading {
        Some(r) => format!("{} ({})", format_fg_value(r.value), escape_html(&r.label)),
        None => "N/A (N/A)".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

fn mark(alarm: bool) -> &'static str {
    if alarm {
        "⚠️"
    } else {
        "✅"
    }
}

fn fmt_opt(value: Option<f64>, decimals: usize, suffix: &str) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}{suffix}"),
        None => "N/A".to_string(),
    }
}

/// One status line per indicator: mark, name, latest value.
pub fn indicator_lines(ind: &Indicators) -> Vec<String> {
    let inverted = ind.t10y2y.is_some_and(|v| v <= T10Y2Y_INVERSION);
    vec![
        format!(
            "{} T10Y2Y: {}{}",
            mark(inverted),
            fmt_opt(ind.t10y2y, 2, "%"),
            if inverted { " (inverted!)" } else { "" }
        ),
        format!(
            "{} HY OAS: {}",
            mark(ind.hy_oas.is_some_and(|v| v >= HY_OAS_STRESS)),
            fmt_opt(ind.hy_oas, 2, "%")
        ),
        format!(
            "{} ISM PMI: {}",
            mark(ind.ism_pmi.is_some_and(|v| v < ISM_PMI_CONTRACTION)),
            fmt_opt(ind.ism_pmi, 1, "")
        ),
        format!(
            "{} Unemployment: {}",
            mark(ind.unrate.is_some_and(|v| v >= UNRATE_WARNING)),
            fmt_opt(ind.unrate, 1, "%")
        ),
    ]
}

pub fn format_timestamp(now: &DateTime<FixedOffset>) -> String {
    now.format("%Y-%m-%d %H:%M KST").to_string()
}

// ---------------------------------------------------------------------------
// Weekly review
// ---------------------------------------------------------------------------

/// Inputs of the weekly review message.
#[derive(Debug, Clone)]
pub struct WeeklyReview<'a> {
    pub score: f64,
    pub regime: Regime,
    pub indicators: Indicators,
    pub crypto: Option<&'a FearGreedReading>,
    pub stock: Option<&'a FearGreedReading>,
    pub dashboard_url: &'a str,
    pub now: DateTime<FixedOffset>,
}

impl WeeklyReview<'_> {
    pub fn render(&self) -> String {
        let mut msg = String::new();
        let _ = writeln!(msg, "📊 <b>Weekly Macro Risk Review</b>\n");
        let _ = writeln!(msg, "{RULE}");
        let _ = writeln!(msg, "<b>🎯 Current state</b>");
        let _ = writeln!(
            msg,
            "{} Regime: <b>{}</b>",
            self.regime.emoji(),
            self.regime.label()
        );
        let _ = writeln!(msg, "Risk Score: <b>{:.3}</b>\n", self.score);

        let _ = writeln!(msg, "<b>📈 Macro indicators</b>");
        for line in indicator_lines(&self.indicators) {
            let _ = writeln!(msg, "{line}");
        }

        let _ = writeln!(msg, "\n<b>💹 Sentiment</b>");
        let _ = writeln!(msg, "🪙 Crypto F&amp;G: {}", reading_line(self.crypto));
        let _ = writeln!(msg, "📈 Stock F&amp;G: {}", reading_line(self.stock));

        let _ = writeln!(msg, "\n{RULE}");
        let _ = writeln!(msg, "<b>💡 Recommended actions</b>");
        for action in self.regime.actions() {
            let _ = writeln!(msg, "{action}");
        }

        let _ = writeln!(msg, "\n{RULE}");
        let _ = writeln!(msg, "⏰ {}", format_timestamp(&self.now));
        let _ = write!(
            msg,
            "📊 <a href=\"{}\">Open dashboard</a>",
            escape_html(self.dashboard_url)
        );
        msg
    }
}

// ---------------------------------------------------------------------------
// Volume
// ---------------------------------------------------------------------------

/// KRW → trillions of KRW.
pub fn trillions(krw: u64) -> f64 {
    krw as f64 / KRW_PER_TRILLION
}

/// Day-over-day change in percent, `None` without a non-zero previous day.
pub fn pct_change(previous: u64, current: u64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    Some((current as f64 - previous as f64) / previous as f64 * 100.0)
}

/// Exchange volume summary for the last few days, oldest first.
pub fn volume_summary(day: NaiveDate, total: u64, recent: &[(NaiveDate, u64)]) -> String {
    let mut msg = String::new();
    let _ = writeln!(msg, "💰 <b>Upbit KRW volume</b>\n");
    let _ = writeln!(msg, "{day}: <b>{:.2}T KRW</b>", trillions(total));

    let previous = recent
        .iter()
        .rev()
        .find(|(d, _)| *d < day)
        .map(|(_, v)| *v);
    if let Some(change) = previous.and_then(|p| pct_change(p, total)) {
        let _ = writeln!(msg, "vs previous day: {change:+.1}%");
    }

    let _ = writeln!(msg, "\n<b>Last {} days</b>", recent.len());
    for (d, v) in recent {
        let _ = writeln!(msg, "{d}: {:>6.2}T", trillions(*v));
    }
    msg.trim_end().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
