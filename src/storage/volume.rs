//! Daily exchange volume history (`{ "YYYY-MM-DD": krw, ... }`).

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{info, warn};

use super::{read_json, write_json};
use crate::types::VolumeHistory;

/// Load the history file. A missing file is an empty history.
pub fn load_history(path: &str) -> Result<VolumeHistory> {
    match read_json::<VolumeHistory>(path)? {
        Some(history) => {
            info!(path, records = history.len(), "Volume history loaded");
            Ok(history)
        }
        None => {
            info!(path, "No volume history yet, starting empty");
            Ok(VolumeHistory::new())
        }
    }
}

/// Write the history, ascending by date.
pub fn save_history(history: &VolumeHistory, path: &str) -> Result<()> {
    write_json(history, path)?;
    info!(path, records = history.len(), "Volume history saved");
    Ok(())
}

/// Add dates from `incoming` that `existing` doesn't have yet.
/// Existing values are never touched. Returns the number of dates added.
pub fn merge_missing(existing: &mut VolumeHistory, incoming: &VolumeHistory) -> usize {
    let mut added = 0;
    for (date, volume) in incoming {
        if !existing.contains_key(date) {
            existing.insert(*date, *volume);
            added += 1;
        }
    }
    added
}

/// Record the collector's figure for `day`, returning the value it replaced.
///
/// Only the current KST day is still accumulating, so only it may be
/// rewritten; callers pass today's date.
pub fn record_day(history: &mut VolumeHistory, day: NaiveDate, volume: u64) -> Option<u64> {
    let previous = history.insert(day, volume);
    if let Some(prev) = previous {
        warn!(%day, previous = prev, current = volume, "Today's volume already recorded, updating");
    }
    previous
}

/// The last `n` entries, oldest first.
pub fn recent(history: &VolumeHistory, n: usize) -> Vec<(NaiveDate, u64)> {
    let skip = history.len().saturating_sub(n);
    history.iter().skip(skip).map(|(d, v)| (*d, *v)).collect()
}
