//! Exchange volume jobs: the daily 24h collector and the historical
//! backfill from daily candles.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveDate};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::data::upbit::MAX_CANDLES_PER_REQUEST;
use crate::data::ExchangeSource;
use crate::notify::Notifier;
use crate::report::{trillions, volume_summary};
use crate::storage::{self, volume::recent};
use crate::types::{PulseError, VolumeHistory};

/// Days shown in the "recent" log lines and summary message.
pub const RECENT_DAYS: usize = 7;

/// Log progress every this many markets during backfill.
const PROGRESS_EVERY: usize = 50;

/// Request pacing shared by both jobs.
#[derive(Debug, Clone)]
pub struct VolumeSettings {
    pub ticker_batch_size: usize,
    pub request_interval: Duration,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            ticker_batch_size: 100,
            request_interval: Duration::from_millis(120),
        }
    }
}

async fn krw_markets<E: ExchangeSource + ?Sized>(exchange: &E) -> Result<Vec<String>> {
    let markets = exchange
        .fetch_krw_markets()
        .await
        .context("Failed to list exchange markets")?;
    if markets.is_empty() {
        return Err(PulseError::Exchange {
            endpoint: "market/all".into(),
            message: "no KRW markets listed".into(),
        }
        .into());
    }
    info!(count = markets.len(), "KRW markets listed");
    Ok(markets)
}

fn log_recent(history: &VolumeHistory) {
    for (day, volume) in recent(history, RECENT_DAYS) {
        info!(%day, trillion_krw = format!("{:.2}", trillions(volume)), "Recent volume");
    }
}

// ---------------------------------------------------------------------------
// Daily collector
// ---------------------------------------------------------------------------

/// Sum of 24h accumulated trade value across `markets`, fetched in
/// batches of `batch_size`. Truncated to whole KRW.
pub async fn total_24h_volume<E: ExchangeSource + ?Sized>(
    exchange: &E,
    markets: &[String],
    batch_size: usize,
) -> Result<u64> {
    let mut total = 0.0_f64;
    for batch in markets.chunks(batch_size.max(1)) {
        let tickers = exchange
            .fetch_tickers(batch)
            .await
            .context("Failed to fetch tickers")?;
        total += tickers.iter().map(|t| t.acc_trade_price_24h).sum::<f64>();
    }
    Ok(total.max(0.0) as u64)
}

/// Outcome of one collector run.
#[derive(Debug, Clone)]
pub struct CollectReport {
    pub date: NaiveDate,
    pub total: u64,
    pub replaced: Option<u64>,
    pub records: usize,
}

/// Record today's total 24h KRW volume in the history at `path`.
/// Sends a summary through `notifier` when `notify` is set.
pub async fn collect<E, N>(
    exchange: &E,
    notifier: &N,
    path: &str,
    settings: &VolumeSettings,
    notify: bool,
    today: NaiveDate,
) -> Result<CollectReport>
where
    E: ExchangeSource + ?Sized,
    N: Notifier + ?Sized,
{
    info!(%today, "Starting exchange volume collection");

    let markets = krw_markets(exchange).await?;
    let total = total_24h_volume(exchange, &markets, settings.ticker_batch_size).await?;
    info!(
        total_krw = total,
        trillion_krw = format!("{:.2}", trillions(total)),
        "24h volume summed"
    );

    let mut history = storage::load_history(path)?;
    let replaced = storage::record_day(&mut history, today, total);
    storage::save_history(&history, path)?;
    log_recent(&history);

    if notify {
        let message = volume_summary(today, total, &recent(&history, RECENT_DAYS));
        if let Err(e) = notifier.send(&message).await {
            warn!(error = %e, "Volume summary notification failed");
        }
    }

    Ok(CollectReport {
        date: today,
        total,
        replaced,
        records: history.len(),
    })
}

// ---------------------------------------------------------------------------
// Backfill
// ---------------------------------------------------------------------------

/// One round of candle requests: `count` candles per market ending at `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleBatch {
    pub count: u32,
    /// `YYYY-MM-DD HH:MM:SS` in KST; `None` means "up to now".
    pub to: Option<String>,
}

/// Split `days` into request rounds of at most 200 candles, newest first.
pub fn backfill_plan(days: u32, now: DateTime<FixedOffset>) -> Vec<CandleBatch> {
    let per = MAX_CANDLES_PER_REQUEST;
    let batches = days.div_ceil(per);
    (0..batches)
        .map(|i| {
            let count = per.min(days - i * per);
            let to = (i > 0).then(|| {
                (now - ChronoDuration::days(i64::from(i * per)))
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            });
            CandleBatch { count, to }
        })
        .collect()
}

/// Daily KRW trade value summed across `markets` for every batch in
/// `plan`. A market whose request fails is skipped.
pub async fn fetch_daily_totals<E: ExchangeSource + ?Sized>(
    exchange: &E,
    markets: &[String],
    plan: &[CandleBatch],
    interval: Duration,
) -> VolumeHistory {
    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut skipped = 0usize;

    for (batch_idx, batch) in plan.iter().enumerate() {
        info!(
            batch = batch_idx + 1,
            of = plan.len(),
            days = batch.count,
            to = batch.to.as_deref().unwrap_or("now"),
            "Backfill batch started"
        );

        for (market_idx, market) in markets.iter().enumerate() {
            match exchange
                .fetch_daily_candles(market, batch.count, batch.to.as_deref())
                .await
            {
                Ok(candles) => {
                    for candle in candles {
                        match NaiveDate::parse_from_str(candle.kst_date(), "%Y-%m-%d") {
                            Ok(day) => *sums.entry(day).or_insert(0.0) += candle.candle_acc_trade_price,
                            Err(_) => debug!(
                                market = %market,
                                raw = %candle.candle_date_time_kst,
                                "Unparseable candle date, skipped"
                            ),
                        }
                    }
                }
                Err(e) => {
                    skipped += 1;
                    warn!(market = %market, error = %e, "Candle request failed, skipping market");
                }
            }

            if !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }

            if (market_idx + 1) % PROGRESS_EVERY == 0 {
                info!(done = market_idx + 1, total = markets.len(), "Backfill progress");
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, "Some candle requests failed");
    }

    sums.into_iter()
        .map(|(day, value)| (day, value.max(0.0) as u64))
        .collect()
}

/// Outcome of one backfill run.
#[derive(Debug, Clone)]
pub struct BackfillReport {
    pub days_fetched: usize,
    pub added: usize,
    pub records: usize,
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
}

/// Fill the history at `path` with up to `days` past days of volume.
/// Dates already present are left untouched.
pub async fn backfill<E: ExchangeSource + ?Sized>(
    exchange: &E,
    path: &str,
    days: u32,
    settings: &VolumeSettings,
    now: DateTime<FixedOffset>,
) -> Result<BackfillReport> {
    let markets = krw_markets(exchange).await?;
    let plan = backfill_plan(days, now);

    let requests = plan.len() * markets.len();
    info!(
        days,
        batches = plan.len(),
        markets = markets.len(),
        requests,
        est_minutes = format!(
            "{:.1}",
            requests as f64 * settings.request_interval.as_secs_f64() / 60.0
        ),
        "Backfill plan"
    );

    let fetched = fetch_daily_totals(exchange, &markets, &plan, settings.request_interval).await;

    let mut history = storage::load_history(path)?;
    let added = storage::merge_missing(&mut history, &fetched);
    storage::save_history(&history, path)?;

    let report = BackfillReport {
        days_fetched: fetched.len(),
        added,
        records: history.len(),
        first: history.keys().next().copied(),
        last: history.keys().next_back().copied(),
    };
    info!(
        fetched = report.days_fetched,
        added,
        records = report.records,
        first = ?report.first,
        last = ?report.last,
        "Backfill merged"
    );
    log_recent(&history);

    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
