//! Deterministic risk and stability scoring.
//!
//! These are the two core normalizations over the raw fundamentals. They are
//! total over their input: every missing or unparseable field falls back to
//! the default documented on the function, so identical snapshots always
//! yield identical scores regardless of upstream generative variability.

use report_core::{LooseNum, RawMetrics};
use serde::{Deserialize, Serialize};

fn num(field: &Option<LooseNum>) -> Option<f64> {
    field.as_ref().and_then(LooseNum::as_f64)
}

/// Four risk sub-scores, each 0-100, rounded to integers after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScores {
    /// Lower current ratio = higher risk. Ratio 1.5 scores 0, ratio 0 scores 100.
    pub liquidity: u8,
    /// Higher beta = higher risk. Beta 1 scores 50, beta 2 scores 100.
    pub market: u8,
    /// Higher debt/equity = higher risk. D/E 3 scores 100.
    pub credit: u8,
    /// Lower insider ownership = higher risk. 20% ownership scores 0.
    pub governance: u8,
}

impl RiskScores {
    /// Defaults for missing/unparseable inputs: current_ratio 0 (full risk),
    /// beta 1 (market risk 50), debt_equity 0 (no credit risk), ownership 0
    /// (full governance risk). A negative current ratio clamps to 100.
    pub fn from_raw(metrics: &RawMetrics) -> Self {
        let cr = num(&metrics.current_ratio).unwrap_or(0.0);
        let beta = num(&metrics.beta).unwrap_or(1.0);
        let de = num(&metrics.debt_equity).unwrap_or(0.0);
        let own = num(&metrics.ownership).unwrap_or(0.0);

        let liquidity = (100.0 - (cr / 1.5) * 100.0).clamp(0.0, 100.0);
        let market = (beta * 50.0).clamp(0.0, 100.0);
        let credit = ((de / 3.0) * 100.0).clamp(0.0, 100.0);
        let governance = (100.0 - (own / 20.0) * 100.0).clamp(0.0, 100.0);

        // Round only after clamping
        Self {
            liquidity: liquidity.round() as u8,
            market: market.round() as u8,
            credit: credit.round() as u8,
            governance: governance.round() as u8,
        }
    }

    /// Unweighted mean across the four dimensions, for the headline gauge.
    pub fn overall(&self) -> f64 {
        f64::from(
            u16::from(self.liquidity)
                + u16::from(self.market)
                + u16::from(self.credit)
                + u16::from(self.governance),
        ) / 4.0
    }

    /// Values in label order, for radar-style charting.
    pub fn to_values(&self) -> Vec<f64> {
        vec![
            f64::from(self.liquidity),
            f64::from(self.market),
            f64::from(self.credit),
            f64::from(self.governance),
        ]
    }

    pub fn dimension_labels() -> Vec<&'static str> {
        vec!["Liquidity", "Market", "Credit", "Governance"]
    }
}

/// Per-factor stability sub-scores, each normalized so the factor's healthy
/// target lands at 60. Linear factors clamp to [5,100]; the two-slope
/// factors (solvency, beta) floor at 5 only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityScores {
    /// current_ratio / 1.2 * 60
    pub liquidity: f64,
    /// debt_equity against a 2.0 target, steeper slope above it
    pub solvency: f64,
    /// beta against a 1.3 target, steeper slope above it
    pub beta: f64,
    /// ownership / 10 * 60
    pub ownership: f64,
}

impl StabilityScores {
    /// Missing or unparseable inputs all default to 0 here. The risk side
    /// defaults beta to 1; the two default tables are intentionally
    /// different and must not be merged.
    pub fn from_raw(metrics: &RawMetrics) -> Self {
        let cr = num(&metrics.current_ratio).unwrap_or(0.0);
        let de = num(&metrics.debt_equity).unwrap_or(0.0);
        let beta = num(&metrics.beta).unwrap_or(0.0);
        let own = num(&metrics.ownership).unwrap_or(0.0);

        Self {
            liquidity: ((cr / 1.2) * 60.0).clamp(5.0, 100.0),
            solvency: two_slope(de, 2.0),
            beta: two_slope(beta, 1.3),
            ownership: ((own / 10.0) * 60.0).clamp(5.0, 100.0),
        }
    }

    pub fn to_values(&self) -> Vec<f64> {
        vec![self.liquidity, self.solvency, self.beta, self.ownership]
    }

    pub fn factor_labels() -> Vec<&'static str> {
        vec!["Liquidity", "Solvency", "Beta", "Insider Ownership"]
    }
}

/// Two-slope normalization: at the healthy target the score is exactly 60;
/// below it the score rises toward 100, above it falls toward the floor of 5.
fn two_slope(value: f64, target: f64) -> f64 {
    if value <= target {
        60.0 + ((target - value) / target) * 40.0
    } else {
        (60.0 - ((value - target) / target) * 60.0).max(5.0)
    }
}
