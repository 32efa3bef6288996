//! Calibration models: fitting, application, storage and the bucket-key taxonomy that
//! links derived markets to their calibration models.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{DoubleChance, MarketKey, OverUnder, Side, TripleOutcome, YesNo};

pub mod apply;
pub mod fit;
pub mod store;

/// A fitted recalibration transform.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum CalibrationMethod {
    /// Two-parameter logistic rescaling: `sigmoid(a·p + b)`.
    Platt { a: f64, b: f64 },
    /// Piecewise-linear monotone curve through `(x, y)` points spanning [0, 1].
    Isotonic { points: Vec<(f64, f64)> },
}

/// Lifecycle of a calibration model. A model is born `Fitted`, becomes `Active` on
/// promotion and `Superseded` when a later model for the same (version, bucket) is
/// promoted. Superseded models are retained for audit, never deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ModelState {
    Fitted,
    Active,
    Superseded,
}

#[derive(Clone, Debug, Serialize)]
pub struct CalibrationModel {
    pub model_version: String,
    pub bucket: BucketKey,
    pub method: CalibrationMethod,
    pub state: ModelState,
    pub created_at: DateTime<Utc>,
}
impl CalibrationModel {
    pub fn fitted(
        model_version: impl Into<String>,
        bucket: BucketKey,
        method: CalibrationMethod,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            model_version: model_version.into(),
            bucket,
            method,
            state: ModelState::Fitted,
            created_at,
        }
    }
}

/// Calibration bucket: the granularity at which bias is corrected. Several market keys
/// may share a bucket (they never do in the current mapping, but the type permits it).
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum BucketKey {
    Result(TripleOutcome),
    Total(OverUnder, u8),
    TeamTotal(Side, OverUnder, u8),
    TeamToScore(Side),
    BttsYes,
    BttsNo,
    DoubleHomeOrDraw,
    DoubleHomeOrAway,
    DoubleDrawOrAway,
    HalfTimeResult(TripleOutcome),
    HalfTimeTotal(OverUnder),
    CornersTotal(OverUnder),
    CardsTotal(OverUnder),
}

impl Display for BucketKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fn ou(ou: &OverUnder) -> &'static str {
            match ou {
                OverUnder::Over => "over",
                OverUnder::Under => "under",
            }
        }
        fn side(side: &Side) -> &'static str {
            match side {
                Side::Home => "home",
                Side::Away => "away",
            }
        }
        fn outcome(outcome: &TripleOutcome) -> &'static str {
            match outcome {
                TripleOutcome::Home => "h",
                TripleOutcome::Draw => "d",
                TripleOutcome::Away => "a",
            }
        }
        match self {
            BucketKey::Result(o) => write!(f, "1x2_{}", outcome(o)),
            BucketKey::Total(o, line) => write!(f, "{}{line}_5", ou(o)),
            BucketKey::TeamTotal(s, o, line) => {
                write!(f, "tt_{}_{}{line}_5", side(s), ou(o))
            }
            BucketKey::TeamToScore(s) => write!(f, "team_{}_scores", side(s)),
            BucketKey::BttsYes => write!(f, "btts_yes"),
            BucketKey::BttsNo => write!(f, "btts_no"),
            BucketKey::DoubleHomeOrDraw => write!(f, "dc_1x"),
            BucketKey::DoubleHomeOrAway => write!(f, "dc_12"),
            BucketKey::DoubleDrawOrAway => write!(f, "dc_x2"),
            BucketKey::HalfTimeResult(o) => write!(f, "ht_1x2_{}", outcome(o)),
            BucketKey::HalfTimeTotal(o) => write!(f, "ht_{}0_5", ou(o)),
            BucketKey::CornersTotal(o) => write!(f, "corners_{}9_5", ou(o)),
            BucketKey::CardsTotal(o) => write!(f, "cards_{}4_5", ou(o)),
        }
    }
}

/// Total mapping from the closed market taxonomy to calibration buckets. `None` marks
/// a market that passes through uncalibrated: the nested correct-score entry, the
/// handicap lines and the draw-no-bet proxies (whose contract is to equal the raw win
/// probabilities exactly).
pub fn bucket_for(key: &MarketKey) -> Option<BucketKey> {
    match key {
        MarketKey::Result(outcome) => Some(BucketKey::Result(*outcome)),
        MarketKey::TotalGoals(ou, line) => Some(BucketKey::Total(*ou, *line)),
        MarketKey::TeamTotal(side, ou, line) => Some(BucketKey::TeamTotal(*side, *ou, *line)),
        MarketKey::TeamToScore(side) => Some(BucketKey::TeamToScore(*side)),
        MarketKey::Btts(yes_no) => match yes_no {
            YesNo::Yes => Some(BucketKey::BttsYes),
            YesNo::No => Some(BucketKey::BttsNo),
        },
        MarketKey::DoubleChance(dc) => match dc {
            DoubleChance::HomeOrDraw => Some(BucketKey::DoubleHomeOrDraw),
            DoubleChance::HomeOrAway => Some(BucketKey::DoubleHomeOrAway),
            DoubleChance::DrawOrAway => Some(BucketKey::DoubleDrawOrAway),
        },
        MarketKey::DrawNoBet(_) => None,
        MarketKey::CorrectScoreTopK => None,
        MarketKey::AsianHandicap(_) => None,
        MarketKey::HalfTimeResult(outcome) => Some(BucketKey::HalfTimeResult(*outcome)),
        MarketKey::HalfTimeTotal(ou) => Some(BucketKey::HalfTimeTotal(*ou)),
        MarketKey::CornersTotal(ou) => Some(BucketKey::CornersTotal(*ou)),
        MarketKey::CardsTotal(ou) => Some(BucketKey::CardsTotal(*ou)),
    }
}

#[cfg(test)]
mod tests;
