//! Upstream data sources.
//!
//! Defines the `MacroSource` and `ExchangeSource` traits and the HTTP
//! clients behind them: the macro risk dashboard and the Upbit exchange.

pub mod dashboard;
pub mod upbit;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::DashboardSnapshot;
use upbit::{DailyCandle, Ticker};

/// Abstraction over the macro risk dashboard.
#[async_trait]
pub trait MacroSource: Send + Sync {
    /// Fetch indicator series and Fear & Greed readings in one snapshot.
    async fn fetch_snapshot(&self) -> Result<DashboardSnapshot>;

    /// Public URL of the dashboard, used for links in messages.
    fn dashboard_url(&self) -> String;
}

/// Abstraction over the exchange's public quotation API.
#[async_trait]
pub trait ExchangeSource: Send + Sync {
    /// All market codes quoted in KRW (`KRW-BTC`, `KRW-ETH`, ...).
    async fn fetch_krw_markets(&self) -> Result<Vec<String>>;

    /// Ticker snapshots for the given market codes (one request).
    async fn fetch_tickers(&self, markets: &[String]) -> Result<Vec<Ticker>>;

    /// Up to `count` daily candles for `market`, newest first, ending at
    /// `to` (`YYYY-MM-DD HH:MM:SS`, KST) or now when `to` is `None`.
    async fn fetch_daily_candles(
        &self,
        market: &str,
        count: u32,
        to: Option<&str>,
    ) -> Result<Vec<DailyCandle>>;
}
