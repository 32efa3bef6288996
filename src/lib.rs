//! Derives a standard set of secondary football match markets (totals, team totals,
//! both-teams-to-score, double chance, correct-score top-_K_ and friends) from a baseline
//! 1X2 + scoreline forecast, then recalibrates them against recorded outcomes using
//! Platt scaling and isotonic regression. Also tracks calibration quality (Brier,
//! log-loss, ECE) and derives a scalar confidence score per forecast.

pub mod calibrate;
pub mod confidence;
pub mod derive;
pub mod domain;
pub mod print;
pub mod probs;
pub mod quality;
pub mod scoredist;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
