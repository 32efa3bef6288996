//! Fits calibration models from historical (predicted probability, outcome) pairs.
//!
//! Both fitters are bounded: Platt runs a fixed step count and isotonic is a single
//! sort-and-pool pass, so a fit always terminates and never needs cancellation.

use tracing::debug;

use super::CalibrationMethod;

/// Fixed-iteration gradient descent configuration for Platt scaling. The step count is
/// part of the model's reproducibility contract; refitting the same data with the same
/// config yields bit-identical parameters.
#[derive(Clone, Debug)]
pub struct PlattConfig {
    pub learn_rate: f64,
    pub steps: u32,
}
impl Default for PlattConfig {
    fn default() -> Self {
        Self {
            learn_rate: 0.1,
            steps: 200,
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Fits a two-parameter logistic recalibration `sigmoid(a·p + b)` by gradient descent
/// on logistic loss. Runs exactly `config.steps` iterations; per iteration both
/// gradients are accumulated over the whole sample before `a` then `b` are updated.
/// Degenerate inputs (all labels equal) stay finite: the loss surface is flat in `a`
/// near 0 and pushes `b` towards the constant label.
pub fn fit_platt(probs: &[f64], labels: &[bool], config: &PlattConfig) -> CalibrationMethod {
    assert_eq!(probs.len(), labels.len());
    let (mut a, mut b) = (0.0, 0.0);
    if probs.is_empty() {
        return CalibrationMethod::Platt { a, b };
    }

    let n = probs.len() as f64;
    for _ in 0..config.steps {
        let (mut grad_a, mut grad_b) = (0.0, 0.0);
        for (&p, &label) in probs.iter().zip(labels) {
            let y = if label { 1.0 } else { 0.0 };
            let residual = sigmoid(a * p + b) - y;
            grad_a += residual * p;
            grad_b += residual;
        }
        a -= config.learn_rate * grad_a / n;
        b -= config.learn_rate * grad_b / n;
    }
    debug!("fitted Platt model over {} samples: a={a:.4}, b={b:.4}", probs.len());
    CalibrationMethod::Platt { a, b }
}

/// Fits a monotone piecewise-linear curve by binned pooling: pairs are sorted
/// ascending by probability, partitioned into `bins` chunks of ⌈n/bins⌉ (the last may
/// be smaller), and each chunk contributes a `(mean prob, mean label)` point with its
/// y clamped to at least the previous point's. Boundary points at x=0 and x=1 reuse
/// the nearest chunk's y. Empty input yields the identity curve.
pub fn fit_isotonic(probs: &[f64], labels: &[bool], bins: usize) -> CalibrationMethod {
    assert_eq!(probs.len(), labels.len());
    assert!(bins > 0);
    if probs.is_empty() {
        return CalibrationMethod::Isotonic {
            points: vec![(0.0, 0.0), (1.0, 1.0)],
        };
    }

    let mut pairs: Vec<(f64, f64)> = probs
        .iter()
        .zip(labels)
        .map(|(&p, &label)| (p, if label { 1.0 } else { 0.0 }))
        .collect();
    pairs.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    let chunk_size = pairs.len().div_ceil(bins);
    let mut points = Vec::with_capacity(bins + 2);
    let mut floor = 0.0;
    for chunk in pairs.chunks(chunk_size) {
        let count = chunk.len() as f64;
        let mean_prob = chunk.iter().map(|(p, _)| p).sum::<f64>() / count;
        let mean_label = chunk.iter().map(|(_, y)| y).sum::<f64>() / count;
        let y = f64::max(mean_label, floor);
        floor = y;
        points.push((mean_prob, y));
    }

    let first_y = points[0].1;
    let last_y = points[points.len() - 1].1;
    points.insert(0, (0.0, first_y));
    points.push((1.0, last_y));
    debug!(
        "fitted isotonic model over {} samples into {} points",
        probs.len(),
        points.len()
    );
    CalibrationMethod::Isotonic { points }
}
