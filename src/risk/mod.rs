//! Composite macro risk.
//!
//! `score` turns the four macro indicators into a single number in
//! [0, 1]; `regime` buckets that number into an ordered risk regime.

pub mod regime;
pub mod score;

pub use regime::Regime;
pub use score::{calculate_risk_score, IndicatorScores, Ramp};
