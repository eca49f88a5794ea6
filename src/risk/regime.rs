//! Risk regime bands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound (exclusive) of the Risk-On band.
pub const RISK_ON_MAX: f64 = 0.30;
/// Upper bound (exclusive) of the Neutral band.
pub const NEUTRAL_MAX: f64 = 0.55;
/// Upper bound (exclusive) of the Risk-Off band. Anything above is Crisis.
pub const RISK_OFF_MAX: f64 = 0.75;

/// Discrete risk level derived from the composite score.
///
/// Variants are declared in escalating order so `Ord` compares severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Regime {
    RiskOn,
    Neutral,
    RiskOff,
    Crisis,
}

impl Regime {
    pub const ALL: [Regime; 4] = [Regime::RiskOn, Regime::Neutral, Regime::RiskOff, Regime::Crisis];

    /// Bucket a composite score. NaN falls through to Crisis.
    pub fn from_score(score: f64) -> Self {
        if score < RISK_ON_MAX {
            Regime::RiskOn
        } else if score < NEUTRAL_MAX {
            Regime::Neutral
        } else if score < RISK_OFF_MAX {
            Regime::RiskOff
        } else {
            Regime::Crisis
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Regime::RiskOn => "Risk-On",
            Regime::Neutral => "Neutral",
            Regime::RiskOff => "Risk-Off",
            Regime::Crisis => "Crisis",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Regime::RiskOn => "🟢",
            Regime::Neutral => "🟡",
            Regime::RiskOff => "🟠",
            Regime::Crisis => "🔴",
        }
    }

    /// Recommended portfolio actions shown in the weekly review.
    pub fn actions(&self) -> &'static [&'static str] {
        match self {
            Regime::RiskOn => &[
                "✅ Keep the normal allocation",
                "✅ Continue dollar-cost averaging",
                "✅ Hold growth exposure",
            ],
            Regime::Neutral => &[
                "⚠️ Consider pausing DCA",
                "⚠️ Review cash allocation",
                "⚠️ Look at defensive names",
            ],
            Regime::RiskOff => &[
                "🔴 Raise cash above 30%",
                "🔴 Consider 20% in defensive assets",
                "🔴 Reduce leveraged positions",
            ],
            Regime::Crisis => &[
                "🚨 Evaluate a full hedge",
                "🚨 Hold cash above 50%",
                "🚨 Stop opening new positions",
            ],
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
