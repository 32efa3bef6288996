use rustc_hash::FxHashMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use strum::IntoEnumIterator;
use strum_macros::{EnumCount, EnumIter};

use crate::probs::clip_unit;

pub mod error;

use error::InvalidForecast;

/// A full-time scoreline.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Score {
    pub home: u8,
    pub away: u8,
}
impl Score {
    pub fn new(home: u8, away: u8) -> Self {
        Self { home, away }
    }

    pub fn nil_all() -> Self {
        Self { home: 0, away: 0 }
    }

    pub fn total(&self) -> u16 {
        self.home as u16 + self.away as u16
    }

    pub fn side_goals(&self, side: &Side) -> u8 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    pub fn wire_name(&self) -> String {
        format!("{}-{}", self.home, self.away)
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, EnumCount, EnumIter)]
pub enum Side {
    Home,
    Away,
}
impl Side {
    fn wire_name(&self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }
}

/// Three-way match result, indexable in (home, draw, away) order.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, EnumCount, EnumIter)]
pub enum TripleOutcome {
    Home,
    Draw,
    Away,
}
impl TripleOutcome {
    pub fn index(&self) -> usize {
        match self {
            TripleOutcome::Home => 0,
            TripleOutcome::Draw => 1,
            TripleOutcome::Away => 2,
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index {
            0 => TripleOutcome::Home,
            1 => TripleOutcome::Draw,
            2 => TripleOutcome::Away,
            _ => panic!("unsupported outcome index {index}"),
        }
    }

    fn wire_name(&self) -> &'static str {
        match self {
            TripleOutcome::Home => "H",
            TripleOutcome::Draw => "D",
            TripleOutcome::Away => "A",
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, EnumCount, EnumIter, Serialize)]
pub enum OverUnder {
    Over,
    Under,
}
impl OverUnder {
    fn wire_name(&self) -> &'static str {
        match self {
            OverUnder::Over => "over",
            OverUnder::Under => "under",
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, EnumCount, EnumIter)]
pub enum YesNo {
    Yes,
    No,
}
impl YesNo {
    fn wire_name(&self) -> &'static str {
        match self {
            YesNo::Yes => "yes",
            YesNo::No => "no",
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, EnumCount, EnumIter)]
pub enum DoubleChance {
    HomeOrDraw,
    HomeOrAway,
    DrawOrAway,
}
impl DoubleChance {
    fn wire_name(&self) -> &'static str {
        match self {
            DoubleChance::HomeOrDraw => "1X",
            DoubleChance::HomeOrAway => "12",
            DoubleChance::DrawOrAway => "X2",
        }
    }
}

/// The closed market taxonomy. Every key the engine can produce is a variant of this
/// enum; the wire names rendered by [`MarketKey::wire_name`] are a compatibility
/// contract and must not drift. Goal lines are encoded by their integral part: a
/// `TotalGoals(Over, 2)` is the over-2.5 market.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum MarketKey {
    Result(TripleOutcome),
    TotalGoals(OverUnder, u8),
    TeamTotal(Side, OverUnder, u8),
    TeamToScore(Side),
    Btts(YesNo),
    DoubleChance(DoubleChance),
    DrawNoBet(Side),
    CorrectScoreTopK,
    AsianHandicap(Side),
    HalfTimeResult(TripleOutcome),
    HalfTimeTotal(OverUnder),
    CornersTotal(OverUnder),
    CardsTotal(OverUnder),
}

pub const TOTAL_GOALS_LINES: [u8; 5] = [0, 1, 2, 3, 4];
pub const TEAM_TOTAL_LINES: [u8; 3] = [0, 1, 2];

impl MarketKey {
    pub fn wire_name(&self) -> String {
        match self {
            MarketKey::Result(outcome) => format!("mkt.1x2.{}", outcome.wire_name()),
            MarketKey::TotalGoals(ou, line) => {
                format!("mkt.tg.{}.{line}_5", ou.wire_name())
            }
            MarketKey::TeamTotal(side, ou, line) => {
                format!("mkt.tt.{}.{}.{line}_5", side.wire_name(), ou.wire_name())
            }
            MarketKey::TeamToScore(side) => {
                format!("mkt.team.{}.scorers.any", side.wire_name())
            }
            MarketKey::Btts(yes_no) => format!("mkt.btts.{}", yes_no.wire_name()),
            MarketKey::DoubleChance(dc) => format!("mkt.double.{}", dc.wire_name()),
            MarketKey::DrawNoBet(side) => match side {
                Side::Home => "mkt.dnb.H".into(),
                Side::Away => "mkt.dnb.A".into(),
            },
            MarketKey::CorrectScoreTopK => "mkt.cs.topk".into(),
            MarketKey::AsianHandicap(side) => match side {
                Side::Home => "mkt.ah.home.-0_5".into(),
                Side::Away => "mkt.ah.away.+0_5".into(),
            },
            MarketKey::HalfTimeResult(outcome) => {
                format!("mkt.ht.1x2.{}", outcome.wire_name())
            }
            MarketKey::HalfTimeTotal(ou) => format!("mkt.ht.tg.{}.0_5", ou.wire_name()),
            MarketKey::CornersTotal(ou) => format!("mkt.corners.tg.{}.9_5", ou.wire_name()),
            MarketKey::CardsTotal(ou) => format!("mkt.cards.tg.{}.4_5", ou.wire_name()),
        }
    }

    /// Enumerates the full taxonomy in wire order.
    pub fn all() -> Vec<MarketKey> {
        let mut keys = Vec::with_capacity(46);
        keys.extend(TripleOutcome::iter().map(MarketKey::Result));
        for ou in OverUnder::iter() {
            keys.extend(TOTAL_GOALS_LINES.map(|line| MarketKey::TotalGoals(ou, line)));
        }
        for side in Side::iter() {
            for ou in OverUnder::iter() {
                keys.extend(TEAM_TOTAL_LINES.map(|line| MarketKey::TeamTotal(side, ou, line)));
            }
        }
        keys.extend(Side::iter().map(MarketKey::TeamToScore));
        keys.extend(YesNo::iter().map(MarketKey::Btts));
        keys.extend(DoubleChance::iter().map(MarketKey::DoubleChance));
        keys.extend(Side::iter().map(MarketKey::DrawNoBet));
        keys.push(MarketKey::CorrectScoreTopK);
        keys.extend(Side::iter().map(MarketKey::AsianHandicap));
        keys.extend(TripleOutcome::iter().map(MarketKey::HalfTimeResult));
        keys.extend(OverUnder::iter().map(MarketKey::HalfTimeTotal));
        keys.extend(OverUnder::iter().map(MarketKey::CornersTotal));
        keys.extend(OverUnder::iter().map(MarketKey::CardsTotal));
        keys
    }
}

/// A baseline forecast: the three-way 1X2 distribution plus a discrete full-time
/// scoreline distribution. Scoreline entries keep the provider's iteration order,
/// which breaks ties in the correct-score top-_K_ selection.
#[derive(Clone, Debug)]
pub struct ForecastDistribution {
    pub p_home: f64,
    pub p_draw: f64,
    pub p_away: f64,
    pub scores: Vec<(String, f64)>,
}
impl ForecastDistribution {
    const BOOKSUM_TOLERANCE: f64 = 0.01;

    pub fn triple(&self) -> [f64; 3] {
        [self.p_home, self.p_draw, self.p_away]
    }

    pub fn validate(&self) -> Result<(), InvalidForecast> {
        for (field, value) in [
            ("pHome", self.p_home),
            ("pDraw", self.p_draw),
            ("pAway", self.p_away),
        ] {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(InvalidForecast::ProbabilityOutOfRange { field, value });
            }
        }
        let sum = self.p_home + self.p_draw + self.p_away;
        if (sum - 1.0).abs() > Self::BOOKSUM_TOLERANCE {
            return Err(InvalidForecast::WrongBooksum { sum });
        }
        Ok(())
    }
}

/// Auxiliary strength features enabling the corner/card heuristics.
#[derive(Clone, Copy, Debug)]
pub struct AuxStrength {
    /// ELO-like rating differential, home minus away.
    pub elo_diff: f64,
}

/// A derived market set: scalar probabilities keyed by the closed taxonomy, plus the
/// nested correct-score top-_K_ entry. Serializes to the flat `mkt.*` wire map with
/// `mkt.cs.topk` as a nested scoreline object.
#[derive(Clone, Debug, Default)]
pub struct MarketSet {
    scalars: FxHashMap<MarketKey, f64>,
    top_scores: Vec<(Score, f64)>,
}
impl MarketSet {
    /// Writes a scalar market, clipping the probability into [0, 1].
    pub fn insert(&mut self, key: MarketKey, prob: f64) {
        debug_assert!(!matches!(key, MarketKey::CorrectScoreTopK));
        self.scalars.insert(key, clip_unit(prob));
    }

    pub fn get(&self, key: &MarketKey) -> Option<f64> {
        self.scalars.get(key).copied()
    }

    pub fn set_top_scores(&mut self, top_scores: Vec<(Score, f64)>) {
        self.top_scores = top_scores;
    }

    pub fn top_scores(&self) -> &[(Score, f64)] {
        &self.top_scores
    }

    /// Number of scalar markets; the nested top-_K_ entry is not counted.
    pub fn scalar_len(&self) -> usize {
        self.scalars.len()
    }

    pub fn scalars(&self) -> &FxHashMap<MarketKey, f64> {
        &self.scalars
    }
}

impl Serialize for MarketSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for key in MarketKey::all() {
            if let MarketKey::CorrectScoreTopK = key {
                let nested: FxHashMap<String, f64> = self
                    .top_scores
                    .iter()
                    .map(|(score, prob)| (score.wire_name(), *prob))
                    .collect();
                map.serialize_entry(&key.wire_name(), &nested)?;
            } else if let Some(prob) = self.scalars.get(&key) {
                map.serialize_entry(&key.wire_name(), prob)?;
            }
        }
        map.end()
    }
}
