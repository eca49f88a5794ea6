//! Shared types for macro-pulse.
//!
//! Wire shapes returned by the dashboard, the persisted monitor state,
//! and the domain error enum. Exchange wire types live next to the
//! exchange client since nothing else touches them.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::risk::Regime;

/// Korea Standard Time offset in seconds (UTC+9).
pub const KST_OFFSET_SECS: i32 = 9 * 3600;

/// The fixed KST offset.
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).expect("UTC+9 is a valid offset")
}

/// Current calendar day in KST.
pub fn kst_today() -> NaiveDate {
    Utc::now().with_timezone(&kst()).date_naive()
}

// ---------------------------------------------------------------------------
// Dashboard: macro indicators
// ---------------------------------------------------------------------------

/// One observation in an indicator series. `value` is `null` when the
/// source has not published a number for that date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: String,
    #[serde(default)]
    pub value: Option<f64>,
}

/// `/api/fred` response: four series, oldest observation first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FredSeries {
    #[serde(default)]
    pub t10y2y: Vec<Observation>,
    #[serde(default)]
    pub hy_oas: Vec<Observation>,
    #[serde(default)]
    pub ism_pmi: Vec<Observation>,
    #[serde(default)]
    pub unrate: Vec<Observation>,
}

impl FredSeries {
    /// Latest value of each series. Empty series and `null` values both
    /// come back as `None`.
    pub fn latest(&self) -> Indicators {
        fn last(series: &[Observation]) -> Option<f64> {
            series.last().and_then(|o| o.value).filter(|v| v.is_finite())
        }
        Indicators {
            t10y2y: last(&self.t10y2y),
            hy_oas: last(&self.hy_oas),
            ism_pmi: last(&self.ism_pmi),
            unrate: last(&self.unrate),
        }
    }
}

/// Latest value of each macro indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicators {
    /// 10-year minus 2-year Treasury spread, percent.
    pub t10y2y: Option<f64>,
    /// High-yield option-adjusted spread, percent.
    pub hy_oas: Option<f64>,
    /// ISM manufacturing PMI.
    pub ism_pmi: Option<f64>,
    /// Unemployment rate, percent.
    pub unrate: Option<f64>,
}

impl Indicators {
    /// Wire name of the first indicator without a value, if any.
    pub fn first_missing(&self) -> Option<&'static str> {
        [
            ("t10y2y", self.t10y2y),
            ("hyOas", self.hy_oas),
            ("ismPmi", self.ism_pmi),
            ("unrate", self.unrate),
        ]
        .into_iter()
        .find(|(_, v)| v.is_none())
        .map(|(name, _)| name)
    }
}

// ---------------------------------------------------------------------------
// Dashboard: Fear & Greed
// ---------------------------------------------------------------------------

/// A single Fear & Greed reading as reported upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FearGreedReading {
    pub value: f64,
    pub label: String,
}

/// `/api/fear-greed` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FearGreed {
    #[serde(default)]
    pub crypto: Option<FearGreedReading>,
    #[serde(default)]
    pub stock: Option<FearGreedReading>,
}

/// Which Fear & Greed index a reading belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentMarket {
    Crypto,
    Stock,
}

impl SentimentMarket {
    pub fn source(&self) -> &'static str {
        match self {
            SentimentMarket::Crypto => "Alternative.me",
            SentimentMarket::Stock => "CNN",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            SentimentMarket::Crypto => "🪙",
            SentimentMarket::Stock => "📈",
        }
    }
}

impl fmt::Display for SentimentMarket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentMarket::Crypto => write!(f, "Crypto"),
            SentimentMarket::Stock => write!(f, "Stock"),
        }
    }
}

/// Everything one dashboard poll returns.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub fred: FredSeries,
    pub fear_greed: FearGreed,
    pub fetched_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Persisted state
// ---------------------------------------------------------------------------

/// What the monitor remembers between runs. Overwritten every run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorState {
    #[serde(default)]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub regime: Option<Regime>,
    #[serde(default)]
    pub crypto_fg_label: Option<String>,
    #[serde(default)]
    pub stock_fg_label: Option<String>,
    #[serde(default)]
    pub crypto_fg_value: Option<f64>,
    #[serde(default)]
    pub stock_fg_value: Option<f64>,
    #[serde(default)]
    pub indicators: Indicators,
    /// Snapshot time. Offset-less timestamps in older state files are
    /// read as UTC.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    if let Ok(ts) = raw.parse::<DateTime<Utc>>() {
        return Ok(Some(ts));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| Some(naive.and_utc()))
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
}

impl MonitorState {
    /// Build the state to persist from a fresh snapshot.
    pub fn from_snapshot(snapshot: &DashboardSnapshot, risk_score: Option<f64>) -> Self {
        let crypto = snapshot.fear_greed.crypto.as_ref();
        let stock = snapshot.fear_greed.stock.as_ref();
        Self {
            risk_score,
            regime: risk_score.map(Regime::from_score),
            crypto_fg_label: crypto.map(|r| r.label.clone()),
            stock_fg_label: stock.map(|r| r.label.clone()),
            crypto_fg_value: crypto.map(|r| r.value),
            stock_fg_value: stock.map(|r| r.value),
            indicators: snapshot.fred.latest(),
            timestamp: Some(snapshot.fetched_at),
        }
    }
}

/// Daily aggregated KRW trade value, keyed by KST calendar day.
/// Serialises as a JSON object in ascending date order.
pub type VolumeHistory = BTreeMap<NaiveDate, u64>;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for macro-pulse.
#[derive(Debug, thiserror::Error)]
pub enum PulseError {
    #[error("Data source error ({source_name}): {message}")]
    DataSource { source_name: String, message: String },

    #[error("Exchange error ({endpoint}): {message}")]
    Exchange { endpoint: String, message: String },

    #[error("Notifier error: {0}")]
    Notifier(String),

    #[error("Missing indicator value: {0}")]
    MissingIndicator(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
