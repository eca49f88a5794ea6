//! Persistence layer.
//!
//! Two flat JSON documents: the monitor's last-seen snapshot and the
//! daily exchange volume history. No locking and no schema versioning;
//! each is rewritten whole by a single scheduled run.

pub mod volume;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::types::MonitorState;

pub use volume::{load_history, merge_missing, record_day, save_history};

/// Load monitor state. Returns `None` if the file doesn't exist (first run).
pub fn load_state(path: &str) -> Result<Option<MonitorState>> {
    let state: Option<MonitorState> = read_json(path)?;
    match &state {
        Some(s) => info!(
            path,
            regime = ?s.regime,
            crypto_fg = ?s.crypto_fg_label,
            stock_fg = ?s.stock_fg_label,
            "Previous state loaded"
        ),
        None => info!(path, "No saved state found, starting fresh"),
    }
    Ok(state)
}

/// Overwrite monitor state.
pub fn save_state(state: &MonitorState, path: &str) -> Result<()> {
    write_json(state, path)?;
    debug!(path, "State saved");
    Ok(())
}

/// Read and parse a JSON file, `None` if it doesn't exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &str) -> Result<Option<T>> {
    if !Path::new(path).exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path).context(format!("Failed to read {path}"))?;
    let value = serde_json::from_str(&json).context(format!("Failed to parse {path}"))?;
    Ok(Some(value))
}

/// Pretty-print `value` to `path`, creating parent directories.
pub(crate) fn write_json<T: Serialize>(value: &T, path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory for {path}"))?;
        }
    }
    let json = serde_json::to_string_pretty(value).context("Failed to serialise JSON")?;
    std::fs::write(path, json).context(format!("Failed to write {path}"))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
