//! Upbit public quotation API.
//!
//! API docs: https://docs.upbit.com/reference
//! Base URL: https://api.upbit.com/v1
//! Rate limit: ~10 requests/second per IP for quotation endpoints.
//! Auth: not required.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::ExchangeSource;
use crate::types::PulseError;

/// Market code prefix for KRW-quoted markets.
pub const KRW_PREFIX: &str = "KRW-";

/// Maximum candles the exchange returns per request.
pub const MAX_CANDLES_PER_REQUEST: u32 = 200;

// ---------------------------------------------------------------------------
// API response types (Upbit JSON → Rust)
// ---------------------------------------------------------------------------

/// Entry of `/v1/market/all`.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketInfo {
    pub market: String,
}

/// Entry of `/v1/ticker`. Only the fields we aggregate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ticker {
    pub market: String,
    /// Rolling 24h accumulated trade value in KRW.
    #[serde(default)]
    pub acc_trade_price_24h: f64,
}

/// Entry of `/v1/candles/days`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyCandle {
    pub market: String,
    /// Candle open time in KST, `YYYY-MM-DDTHH:MM:SS`.
    pub candle_date_time_kst: String,
    /// Accumulated trade value for the day in KRW.
    #[serde(default)]
    pub candle_acc_trade_price: f64,
}

impl DailyCandle {
    /// KST calendar day of the candle (`YYYY-MM-DD`).
    pub fn kst_date(&self) -> &str {
        self.candle_date_time_kst
            .get(..10)
            .unwrap_or(&self.candle_date_time_kst)
    }
}

/// Keep only KRW-quoted market codes, preserving order.
pub fn krw_markets(markets: &[MarketInfo]) -> Vec<String> {
    markets
        .iter()
        .filter(|m| m.market.starts_with(KRW_PREFIX))
        .map(|m| m.market.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct UpbitClient {
    http: Client,
    base_url: String,
}

impl UpbitClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("macro-pulse/0.1.0")
            .build()
            .context("Failed to build HTTP client for Upbit")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn ticker_url(&self, markets: &[String]) -> String {
        format!(
            "{}/v1/ticker?markets={}",
            self.base_url,
            urlencoding::encode(&markets.join(","))
        )
    }

    fn candles_url(&self, market: &str, count: u32, to: Option<&str>) -> String {
        let count = count.min(MAX_CANDLES_PER_REQUEST);
        let mut url = format!(
            "{}/v1/candles/days?market={}&count={count}",
            self.base_url,
            urlencoding::encode(market)
        );
        if let Some(to) = to {
            url.push_str("&to=");
            url.push_str(&urlencoding::encode(to));
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, url: &str) -> Result<T> {
        debug!(url = %url, "Fetching Upbit endpoint");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Upbit request failed: {endpoint}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(PulseError::Exchange {
                endpoint: endpoint.to_string(),
                message: format!("{status}: {body}"),
            }
            .into());
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse Upbit response: {endpoint}"))
    }
}

#[async_trait]
impl ExchangeSource for UpbitClient {
    async fn fetch_krw_markets(&self) -> Result<Vec<String>> {
        let url = format!("{}/v1/market/all", self.base_url);
        let markets: Vec<MarketInfo> = self.get_json("market/all", &url).await?;
        Ok(krw_markets(&markets))
    }

    async fn fetch_tickers(&self, markets: &[String]) -> Result<Vec<Ticker>> {
        if markets.is_empty() {
            return Ok(Vec::new());
        }
        self.get_json("ticker", &self.ticker_url(markets)).await
    }

    async fn fetch_daily_candles(
        &self,
        market: &str,
        count: u32,
        to: Option<&str>,
    ) -> Result<Vec<DailyCandle>> {
        self.get_json("candles/days", &self.candles_url(market, count, to))
            .await
    }
}
