//! Derives a scalar confidence score for a forecast from its (possibly calibrated)
//! market set and the calibration coverage achieved over it.

use serde::Serialize;

use crate::calibrate::apply::CalibratedMarkets;
use crate::domain::{MarketKey, TripleOutcome};
use crate::probs::clip;

const CONFIDENCE_RANGE: (f64, f64) = (0.3, 0.95);
const HIGH_COVERAGE: f64 = 0.7;
const LOW_COVERAGE: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLabel {
    High,
    Medium,
    Low,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ConfidenceScore {
    pub value: f64,
    pub label: ConfidenceLabel,
}

/// Core confidence blends the strength of the favourite with its margin over the
/// runner-up; calibration coverage then nudges it up or down. The result is always
/// within [0.3, 0.95], rounded to two decimals.
pub fn estimate(calibrated: &CalibratedMarkets) -> ConfidenceScore {
    let core = core_confidence(calibrated);

    let total = calibrated.markets.scalar_len();
    let coverage = if total == 0 {
        0.0
    } else {
        calibrated.calibrated.len() as f64 / total as f64
    };
    let factor = if coverage >= HIGH_COVERAGE {
        1.05
    } else if coverage < LOW_COVERAGE {
        0.95
    } else {
        1.0
    };

    let value = clip(core * factor, CONFIDENCE_RANGE.0, CONFIDENCE_RANGE.1);
    let value = (value * 100.0).round() / 100.0;
    let label = if value >= 0.7 {
        ConfidenceLabel::High
    } else if value >= 0.5 {
        ConfidenceLabel::Medium
    } else {
        ConfidenceLabel::Low
    };
    ConfidenceScore { value, label }
}

fn core_confidence(calibrated: &CalibratedMarkets) -> f64 {
    let triple = [
        calibrated.markets.get(&MarketKey::Result(TripleOutcome::Home)),
        calibrated.markets.get(&MarketKey::Result(TripleOutcome::Draw)),
        calibrated.markets.get(&MarketKey::Result(TripleOutcome::Away)),
    ];
    let Some(mut probs) = triple
        .into_iter()
        .collect::<Option<Vec<f64>>>()
    else {
        return 0.5;
    };
    probs.sort_by(|a, b| b.total_cmp(a));
    let margin = probs[0] - probs[1];
    clip(
        0.5 * probs[0] + 0.5 * margin,
        CONFIDENCE_RANGE.0,
        CONFIDENCE_RANGE.1,
    )
}
