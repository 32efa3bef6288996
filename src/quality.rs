//! Tracks calibration quality from a log of predicted-probability/actual-outcome
//! pairs: Brier score, log-loss and Expected Calibration Error, recomputed on demand.

use std::ops::RangeInclusive;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::domain::error::InvalidEvent;
use crate::domain::TripleOutcome;

const LOGLOSS_FLOOR: f64 = 1e-9;

/// One resolved prediction. Append-only; created when ground truth becomes known and
/// never mutated afterwards.
#[derive(Clone, Debug, Serialize)]
pub struct CalibrationEvent {
    /// Predicted (home, draw, away) probabilities, normalised at creation.
    pub predicted: [f64; 3],
    pub actual: TripleOutcome,
    pub model_version: String,
    pub at: DateTime<Utc>,
}
impl CalibrationEvent {
    /// Validates and normalises the predicted triple. A non-positive probability mass
    /// is a submission error; the event must not be recorded.
    pub fn new(
        predicted: [f64; 3],
        actual: TripleOutcome,
        model_version: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<Self, InvalidEvent> {
        if predicted.iter().any(|p| !p.is_finite()) {
            return Err(InvalidEvent::NonFinite);
        }
        let sum: f64 = predicted.iter().sum();
        if sum <= 0.0 {
            return Err(InvalidEvent::NonPositiveMass { sum });
        }
        Ok(Self {
            predicted: predicted.map(|p| p / sum),
            actual,
            model_version: model_version.into(),
            at,
        })
    }

    fn predicted_class(&self) -> usize {
        let mut best = 0;
        for index in 1..3 {
            if self.predicted[index] > self.predicted[best] {
                best = index;
            }
        }
        best
    }
}

/// The append-only calibration event log. Writers serialize through a mutex; summary
/// readers copy the relevant events out before aggregating, so they always observe a
/// consistent snapshot.
#[derive(Debug, Default)]
pub struct EventLog {
    inner: Mutex<Vec<CalibrationEvent>>,
}
impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<CalibrationEvent>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn ingest(&self, event: CalibrationEvent) {
        self.guard().push(event);
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    pub fn snapshot(&self) -> Vec<CalibrationEvent> {
        self.guard().clone()
    }

    /// Recomputes the quality summary over the (filtered) event log. Deterministic for
    /// the same events and parameters; nothing is cached or persisted.
    pub fn summary(
        &self,
        bins: usize,
        model_version: Option<&str>,
        window: Option<RangeInclusive<DateTime<Utc>>>,
    ) -> QualitySummary {
        let events: Vec<CalibrationEvent> = self
            .snapshot()
            .into_iter()
            .filter(|event| {
                model_version.map_or(true, |version| event.model_version == version)
                    && window.as_ref().map_or(true, |window| window.contains(&event.at))
            })
            .collect();
        summarise(&events, bins)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct QualityBin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
    pub avg_confidence: Option<f64>,
    pub avg_accuracy: Option<f64>,
    pub gap: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct QualitySummary {
    pub count: usize,
    pub brier: Option<f64>,
    pub logloss: Option<f64>,
    pub ece: Option<f64>,
    pub bins: Vec<QualityBin>,
}
impl QualitySummary {
    fn empty() -> Self {
        Self {
            count: 0,
            brier: None,
            logloss: None,
            ece: None,
            bins: vec![],
        }
    }
}

fn summarise(events: &[CalibrationEvent], bins: usize) -> QualitySummary {
    if events.is_empty() || bins == 0 {
        return QualitySummary::empty();
    }
    let n = events.len() as f64;

    // Brier over the full one-hot outcome vector, not just the predicted class
    let brier = events
        .iter()
        .map(|event| {
            let mut sum = 0.0;
            for index in 0..3 {
                let y = if event.actual.index() == index { 1.0 } else { 0.0 };
                sum += (event.predicted[index] - y).powi(2);
            }
            sum
        })
        .sum::<f64>()
        / n;

    let logloss = events
        .iter()
        .map(|event| {
            let p_actual = event.predicted[event.actual.index()];
            -f64::max(p_actual, LOGLOSS_FLOOR).ln()
        })
        .sum::<f64>()
        / n;

    // ECE: bucket by the confidence of the predicted class into equal-width bins
    let width = 1.0 / bins as f64;
    let mut bucket_events: Vec<Vec<&CalibrationEvent>> = vec![vec![]; bins];
    for event in events {
        let confidence = event.predicted[event.predicted_class()];
        let index = usize::min((confidence / width) as usize, bins - 1);
        bucket_events[index].push(event);
    }

    let mut ece = 0.0;
    let mut out_bins = Vec::with_capacity(bins);
    for (index, bucket) in bucket_events.iter().enumerate() {
        let lo = index as f64 * width;
        let hi = lo + width;
        if bucket.is_empty() {
            out_bins.push(QualityBin {
                lo,
                hi,
                count: 0,
                avg_confidence: None,
                avg_accuracy: None,
                gap: 0.0,
            });
            continue;
        }
        let count = bucket.len();
        let avg_confidence = bucket
            .iter()
            .map(|event| event.predicted[event.predicted_class()])
            .sum::<f64>()
            / count as f64;
        let avg_accuracy = bucket
            .iter()
            .filter(|event| event.predicted_class() == event.actual.index())
            .count() as f64
            / count as f64;
        let gap = (avg_accuracy - avg_confidence).abs();
        ece += count as f64 / n * gap;
        out_bins.push(QualityBin {
            lo,
            hi,
            count,
            avg_confidence: Some(avg_confidence),
            avg_accuracy: Some(avg_accuracy),
            gap,
        });
    }

    debug!(
        "summarised {} events: brier={brier:.4}, logloss={logloss:.4}, ece={ece:.4}",
        events.len()
    );
    QualitySummary {
        count: events.len(),
        brier: Some(brier),
        logloss: Some(logloss),
        ece: Some(ece),
        bins: out_bins,
    }
}
