//! macro-pulse: scheduled macro risk and exchange volume monitor.
//!
//! Entry point. Loads `.env` and configuration (path from
//! `MACRO_PULSE_CONFIG`, default `config.toml`), initialises structured
//! logging, and runs one job to completion. Meant to be invoked by cron
//! or a CI schedule; a failing job exits nonzero.

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::{info, warn};

use macro_pulse::config::{AppConfig, CONFIG_PATH_ENV};
use macro_pulse::data::dashboard::DashboardClient;
use macro_pulse::data::upbit::UpbitClient;
use macro_pulse::engine::{monitor, volume, weekly};
use macro_pulse::notify::{DisabledNotifier, Notifier, TelegramNotifier};
use macro_pulse::types::{kst, kst_today};

#[derive(Parser, Debug)]
#[command(author, version, about = "Macro risk alerts and exchange volume collection")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check Fear & Greed and macro indicators, alert on changes
    Monitor,
    /// Send the weekly macro risk review
    Weekly,
    /// Record today's total 24h KRW trade value
    CollectVolume,
    /// Backfill daily KRW trade value from candles
    Backfill {
        /// Number of past days to collect
        #[arg(long, default_value_t = 365, value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    init_logging();

    let config_path = AppConfig::path_from_env(CONFIG_PATH_ENV);
    let cfg = AppConfig::load_or_default(&config_path)?;

    info!(command = ?cli.command, config = %config_path, "macro-pulse starting");

    let notifier = build_notifier(&cfg)?;
    let now = Utc::now().with_timezone(&kst());

    match cli.command {
        Command::Monitor => {
            let source = DashboardClient::new(cfg.dashboard_url(), cfg.dashboard.timeout_secs)?;
            let report =
                monitor::run_monitor(&source, notifier.as_ref(), &cfg.storage.state_file, now).await?;
            info!(
                alerts = report.alerts.len(),
                delivered = report.delivered,
                regime = ?report.regime,
                "Monitor finished"
            );
        }
        Command::Weekly => {
            let source = DashboardClient::new(cfg.dashboard_url(), cfg.dashboard.timeout_secs)?;
            weekly::run_weekly(&source, notifier.as_ref(), now).await?;
        }
        Command::CollectVolume => {
            let exchange = UpbitClient::new(&cfg.exchange.base_url, cfg.exchange.timeout_secs)?;
            let report = volume::collect(
                &exchange,
                notifier.as_ref(),
                &cfg.storage.volume_file,
                &volume_settings(&cfg),
                cfg.telegram.notify_volume,
                kst_today(),
            )
            .await?;
            info!(
                date = %report.date,
                total_krw = report.total,
                replaced = ?report.replaced,
                records = report.records,
                "Collection finished"
            );
        }
        Command::Backfill { days } => {
            let exchange = UpbitClient::new(&cfg.exchange.base_url, cfg.exchange.timeout_secs)?;
            let report = volume::backfill(
                &exchange,
                &cfg.storage.volume_file,
                days,
                &volume_settings(&cfg),
                now,
            )
            .await?;
            info!(added = report.added, records = report.records, "Backfill finished");
        }
    }

    Ok(())
}

fn volume_settings(cfg: &AppConfig) -> volume::VolumeSettings {
    volume::VolumeSettings {
        ticker_batch_size: cfg.exchange.ticker_batch_size,
        request_interval: Duration::from_millis(cfg.exchange.request_interval_ms),
    }
}

/// Telegram when credentials are present, otherwise a no-op notifier.
fn build_notifier(cfg: &AppConfig) -> Result<Box<dyn Notifier>> {
    match cfg.telegram_credentials() {
        Some(creds) => Ok(Box::new(TelegramNotifier::new(creds, cfg.telegram.timeout_secs)?)),
        None => {
            warn!(
                token_env = %cfg.telegram.bot_token_env,
                chat_env = %cfg.telegram.chat_id_env,
                "Telegram credentials not configured, notifications disabled"
            );
            Ok(Box::new(DisabledNotifier))
        }
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("macro_pulse=info"));

    if std::env::var("MACRO_PULSE_LOG_JSON").is_ok() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
