//! Applies stored calibration models to raw market probabilities.

use rustc_hash::FxHashSet;

use super::{bucket_for, store::CalibrationStore, CalibrationMethod};
use crate::domain::{MarketKey, MarketSet};
use crate::probs::clip_unit;

/// A market set after the calibration pass, with the keys that actually had an active
/// model applied. Everything else passed through raw, which is normal operation.
#[derive(Debug)]
pub struct CalibratedMarkets {
    pub markets: MarketSet,
    pub calibrated: FxHashSet<MarketKey>,
}

/// Applies a fitted method to one raw probability.
pub fn apply(method: &CalibrationMethod, prob: f64) -> f64 {
    match method {
        CalibrationMethod::Platt { a, b } => apply_platt(prob, *a, *b),
        CalibrationMethod::Isotonic { points } => apply_isotonic(prob, points),
    }
}

fn apply_platt(prob: f64, a: f64, b: f64) -> f64 {
    clip_unit(1.0 / (1.0 + (-(a * prob + b)).exp()))
}

/// Linear interpolation between the two bracketing curve points; clamps to the first y
/// below the curve and the last y above it.
fn apply_isotonic(prob: f64, points: &[(f64, f64)]) -> f64 {
    let Some(&(first_x, first_y)) = points.first() else {
        return prob;
    };
    if prob <= first_x {
        return first_y;
    }
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        if prob <= x1 {
            if x1 == x0 {
                return y1;
            }
            let t = (prob - x0) / (x1 - x0);
            return y0 + t * (y1 - y0);
        }
    }
    points[points.len() - 1].1
}

/// Runs every scalar market through its active calibration model, where one exists
/// for `model_version`. Unmapped buckets and absent models pass the raw probability
/// through unchanged. The nested top-_K_ entry is never calibrated.
pub fn calibrate_markets(
    raw: &MarketSet,
    store: &CalibrationStore,
    model_version: &str,
) -> CalibratedMarkets {
    let mut markets = MarketSet::default();
    markets.set_top_scores(raw.top_scores().to_vec());
    let mut calibrated = FxHashSet::default();

    for (&key, &prob) in raw.scalars() {
        let adjusted = bucket_for(&key)
            .and_then(|bucket| store.get_active(model_version, &bucket))
            .map(|model| {
                calibrated.insert(key);
                apply(&model.method, prob)
            })
            .unwrap_or(prob);
        markets.insert(key, adjusted);
    }

    CalibratedMarkets { markets, calibrated }
}
