//! Test doubles for the pipeline seams.
//!
//! `MockDashboard` is generated with mockall. The exchange and notifier
//! doubles are hand-written so tests can inspect what was requested and
//! sent.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use mockall::mock;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use macro_pulse::data::upbit::{DailyCandle, Ticker};
use macro_pulse::data::{ExchangeSource, MacroSource};
use macro_pulse::notify::Notifier;
use macro_pulse::types::{
    kst, DashboardSnapshot, FearGreed, FearGreedReading, FredSeries, Observation,
};

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

mock! {
    pub Dashboard {}

    #[async_trait]
    impl MacroSource for Dashboard {
        async fn fetch_snapshot(&self) -> Result<DashboardSnapshot>;
        fn dashboard_url(&self) -> String;
    }
}

/// A dashboard mock that returns `snapshot` once per expected call.
pub fn dashboard_returning(snapshot: DashboardSnapshot, calls: usize) -> MockDashboard {
    let mut mock = MockDashboard::new();
    mock.expect_fetch_snapshot()
        .times(calls)
        .returning(move || Ok(snapshot.clone()));
    mock.expect_dashboard_url()
        .return_const("https://dash.test".to_string());
    mock
}

fn series(values: &[Option<f64>]) -> Vec<Observation> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Observation {
            date: format!("2025-01-{:02}", i + 1),
            value: *v,
        })
        .collect()
}

/// Snapshot with a single latest observation per indicator.
pub fn snapshot(
    t10y2y: Option<f64>,
    hy_oas: Option<f64>,
    ism_pmi: Option<f64>,
    unrate: Option<f64>,
    crypto: Option<(f64, &str)>,
    stock: Option<(f64, &str)>,
) -> DashboardSnapshot {
    fn reading(r: Option<(f64, &str)>) -> Option<FearGreedReading> {
        r.map(|(value, label)| FearGreedReading {
            value,
            label: label.to_string(),
        })
    }
    DashboardSnapshot {
        fred: FredSeries {
            // An older observation first, to check the latest one is used.
            t10y2y: series(&[Some(9.9), t10y2y]),
            hy_oas: series(&[Some(9.9), hy_oas]),
            ism_pmi: series(&[Some(9.9), ism_pmi]),
            unrate: series(&[Some(9.9), unrate]),
        },
        fear_greed: FearGreed {
            crypto: reading(crypto),
            stock: reading(stock),
        },
        fetched_at: Utc::now(),
    }
}

/// A calm macro backdrop (score 0, Risk-On) with neutral sentiment.
pub fn calm_snapshot() -> DashboardSnapshot {
    snapshot(
        Some(2.0),
        Some(2.8),
        Some(56.0),
        Some(3.4),
        Some((50.0, "Neutral")),
        Some((52.0, "Neutral")),
    )
}

pub fn kst_time(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
    kst().with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Exchange
// ---------------------------------------------------------------------------

/// In-memory exchange. Each market has a fixed 24h value and a list of
/// daily candles `(kst date, value)`, newest first.
#[derive(Default)]
pub struct MockExchange {
    markets: Vec<String>,
    tickers: HashMap<String, f64>,
    candles: HashMap<String, Vec<(String, f64)>>,
    failing: HashSet<String>,
    pub ticker_requests: Mutex<Vec<Vec<String>>>,
    pub candle_requests: Mutex<Vec<(String, u32, Option<String>)>>,
}

impl MockExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_market(mut self, code: &str, volume_24h: f64) -> Self {
        self.markets.push(code.to_string());
        self.tickers.insert(code.to_string(), volume_24h);
        self
    }

    pub fn with_candles(mut self, code: &str, candles: &[(&str, f64)]) -> Self {
        self.candles.insert(
            code.to_string(),
            candles.iter().map(|(d, v)| (d.to_string(), *v)).collect(),
        );
        self
    }

    /// Candle requests for `code` fail.
    pub fn failing(mut self, code: &str) -> Self {
        self.failing.insert(code.to_string());
        self
    }
}

#[async_trait]
impl ExchangeSource for MockExchange {
    async fn fetch_krw_markets(&self) -> Result<Vec<String>> {
        Ok(self
            .markets
            .iter()
            .filter(|m| m.starts_with("KRW-"))
            .cloned()
            .collect())
    }

    async fn fetch_tickers(&self, markets: &[String]) -> Result<Vec<Ticker>> {
        self.ticker_requests.lock().unwrap().push(markets.to_vec());
        Ok(markets
            .iter()
            .map(|m| Ticker {
                market: m.clone(),
                acc_trade_price_24h: self.tickers.get(m).copied().unwrap_or(0.0),
            })
            .collect())
    }

    async fn fetch_daily_candles(
        &self,
        market: &str,
        count: u32,
        to: Option<&str>,
    ) -> Result<Vec<DailyCandle>> {
        self.candle_requests
            .lock()
            .unwrap()
            .push((market.to_string(), count, to.map(String::from)));

        if self.failing.contains(market) {
            return Err(anyhow!("simulated 429 for {market}"));
        }

        Ok(self
            .candles
            .get(market)
            .map(|cs| {
                cs.iter()
                    .take(count as usize)
                    .map(|(date, value)| DailyCandle {
                        market: market.to_string(),
                        candle_date_time_kst: format!("{date}T09:00:00"),
                        candle_acc_trade_price: *value,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Records every message. Optionally fails every send.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        if self.fail {
            return Err(anyhow!("simulated Telegram outage"));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

pub fn temp_path(name: &str) -> String {
    let mut p = std::env::temp_dir();
    p.push(format!("macro_pulse_it_{name}_{}.json", uuid::Uuid::new_v4()));
    p.to_string_lossy().to_string()
}
