//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` into strongly-typed structs. Every field has a
//! default, so a missing file is not an error. Secrets (the Telegram bot
//! token) are referenced by env-var name and resolved at runtime.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::types::PulseError;

/// Env var naming the config file.
pub const CONFIG_PATH_ENV: &str = "MACRO_PULSE_CONFIG";
/// Config file used when `CONFIG_PATH_ENV` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub dashboard: DashboardConfig,
    pub exchange: ExchangeConfig,
    pub telegram: TelegramConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub url: String,
    /// Env var that overrides `url` when set.
    pub url_env: String,
    pub timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            url: "https://macro-risk-dashboard-psi.vercel.app".to_string(),
            url_env: "DASHBOARD_URL".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExchangeConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Markets per ticker request.
    pub ticker_batch_size: usize,
    /// Pause between per-market candle requests during backfill.
    pub request_interval_ms: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.upbit.com".to_string(),
            timeout_secs: 10,
            ticker_batch_size: 100,
            request_interval_ms: 120,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token_env: String,
    pub chat_id_env: String,
    pub timeout_secs: u64,
    /// Send the volume summary after `collect-volume`.
    pub notify_volume: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token_env: "TELEGRAM_BOT_TOKEN".to_string(),
            chat_id_env: "TELEGRAM_CHAT_ID".to_string(),
            timeout_secs: 10,
            notify_volume: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub state_file: String,
    pub volume_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: "state.json".to_string(),
            volume_file: "data/upbit_volume_history.json".to_string(),
        }
    }
}

/// Telegram credentials resolved from the environment.
#[derive(Debug)]
pub struct TelegramCredentials {
    pub bot_token: SecretString,
    pub chat_id: String,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Config file path from `env_name`, or `DEFAULT_CONFIG_PATH`.
    pub fn path_from_env(env_name: &str) -> String {
        Self::resolve_env(env_name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            info!(path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), PulseError> {
        if self.exchange.ticker_batch_size == 0 {
            return Err(PulseError::Config("exchange.ticker_batch_size must be > 0".into()));
        }
        if self.dashboard.url.trim().is_empty() {
            return Err(PulseError::Config("dashboard.url must not be empty".into()));
        }
        Ok(())
    }

    /// Dashboard base URL, env override first, without a trailing slash.
    pub fn dashboard_url(&self) -> String {
        let url = Self::resolve_env(&self.dashboard.url_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.dashboard.url.clone());
        url.trim_end_matches('/').to_string()
    }

    /// Telegram credentials, or `None` when either env var is unset.
    pub fn telegram_credentials(&self) -> Option<TelegramCredentials> {
        let token = Self::resolve_env(&self.telegram.bot_token_env).ok()?;
        let chat_id = Self::resolve_env(&self.telegram.chat_id_env).ok()?;
        if token.is_empty() || chat_id.is_empty() {
            return None;
        }
        Some(TelegramCredentials {
            bot_token: SecretString::new(token),
            chat_id,
        })
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
