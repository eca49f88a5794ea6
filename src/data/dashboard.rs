//! Macro risk dashboard client.
//!
//! The dashboard re-publishes FRED series and the crypto/stock Fear &
//! Greed indices as plain JSON.
//!
//! Endpoints: `{base}/api/fred`, `{base}/api/fear-greed`. No auth.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

use super::MacroSource;
use crate::types::{DashboardSnapshot, FearGreed, FredSeries, PulseError};

const SOURCE_NAME: &str = "dashboard";

pub struct DashboardClient {
    http: Client,
    base_url: String,
}

impl DashboardClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("macro-pulse/0.1.0")
            .build()
            .context("Failed to build dashboard HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        debug!(url = %url, "Fetching dashboard endpoint");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Dashboard request failed: {url}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(PulseError::DataSource {
                source_name: SOURCE_NAME.to_string(),
                message: format!("{path} returned {status}: {body}"),
            }
            .into());
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse dashboard response: {path}"))
    }
}

#[async_trait]
impl MacroSource for DashboardClient {
    async fn fetch_snapshot(&self) -> Result<DashboardSnapshot> {
        let fred: FredSeries = self.get_json("fred").await?;
        let fear_greed: FearGreed = self.get_json("fear-greed").await?;

        info!(
            t10y2y_points = fred.t10y2y.len(),
            hy_oas_points = fred.hy_oas.len(),
            crypto_fg = ?fear_greed.crypto.as_ref().map(|r| r.value),
            stock_fg = ?fear_greed.stock.as_ref().map(|r| r.value),
            "Dashboard snapshot fetched"
        );

        Ok(DashboardSnapshot {
            fred,
            fear_greed,
            fetched_at: Utc::now(),
        })
    }

    fn dashboard_url(&self) -> String {
        self.base_url.clone()
    }
}
