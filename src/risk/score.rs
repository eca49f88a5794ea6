//! Composite risk score.
//!
//! Each indicator is mapped to [0, 1] by a clamped linear ramp between a
//! "calm" anchor (score 0) and a "stressed" anchor (score 1). The four
//! scores are combined with fixed weights and the result is clamped.

use tracing::debug;

use crate::types::Indicators;

// ---------------------------------------------------------------------------
// Weights and anchors
// ---------------------------------------------------------------------------

pub const WEIGHT_T10Y2Y: f64 = 0.35;
pub const WEIGHT_HY_OAS: f64 = 0.30;
pub const WEIGHT_ISM_PMI: f64 = 0.20;
pub const WEIGHT_UNRATE: f64 = 0.15;

/// Yield curve: a steep curve is calm, a deep inversion is stressed.
pub const T10Y2Y_RAMP: Ramp = Ramp::new(1.5, -1.0);
/// Credit spreads: tight is calm, wide is stressed.
pub const HY_OAS_RAMP: Ramp = Ramp::new(3.0, 8.0);
/// Manufacturing: expansion is calm, contraction is stressed.
pub const ISM_PMI_RAMP: Ramp = Ramp::new(55.0, 45.0);
/// Labour market: low unemployment is calm.
pub const UNRATE_RAMP: Ramp = Ramp::new(3.5, 6.0);

// ---------------------------------------------------------------------------
// Ramp
// ---------------------------------------------------------------------------

/// Piecewise-linear clamped scoring function.
///
/// Returns 0 at or beyond `calm`, 1 at or beyond `stressed`, and a linear
/// interpolation in between. Works in either direction: `stressed` may be
/// above or below `calm`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    pub calm: f64,
    pub stressed: f64,
}

impl Ramp {
    pub const fn new(calm: f64, stressed: f64) -> Self {
        Self { calm, stressed }
    }

    pub fn score(&self, x: f64) -> f64 {
        let span = self.stressed - self.calm;
        if span == 0.0 {
            return if x >= self.stressed { 1.0 } else { 0.0 };
        }
        ((x - self.calm) / span).clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Composite
// ---------------------------------------------------------------------------

/// Per-indicator normalised scores, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorScores {
    pub t10y2y: f64,
    pub hy_oas: f64,
    pub ism_pmi: f64,
    pub unrate: f64,
}

impl IndicatorScores {
    /// Normalise all four indicators. `None` if any is missing.
    pub fn from_indicators(ind: &Indicators) -> Option<Self> {
        Some(Self {
            t10y2y: T10Y2Y_RAMP.score(ind.t10y2y?),
            hy_oas: HY_OAS_RAMP.score(ind.hy_oas?),
            ism_pmi: ISM_PMI_RAMP.score(ind.ism_pmi?),
            unrate: UNRATE_RAMP.score(ind.unrate?),
        })
    }

    /// Weighted sum, clamped to [0, 1].
    pub fn composite(&self) -> f64 {
        let raw = WEIGHT_T10Y2Y * self.t10y2y
            + WEIGHT_HY_OAS * self.hy_oas
            + WEIGHT_ISM_PMI * self.ism_pmi
            + WEIGHT_UNRATE * self.unrate;
        raw.clamp(0.0, 1.0)
    }
}

/// Composite macro risk score in [0, 1], or `None` when any of the four
/// indicators is missing or not finite.
pub fn calculate_risk_score(ind: &Indicators) -> Option<f64> {
    let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
    let ind = Indicators {
        t10y2y: finite(ind.t10y2y),
        hy_oas: finite(ind.hy_oas),
        ism_pmi: finite(ind.ism_pmi),
        unrate: finite(ind.unrate),
    };
    let scores = IndicatorScores::from_indicators(&ind)?;
    let score = scores.composite();
    debug!(
        t10y2y = scores.t10y2y,
        hy_oas = scores.hy_oas,
        ism_pmi = scores.ism_pmi,
        unrate = scores.unrate,
        score,
        "Risk score computed"
    );
    Some(score)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
