//! Validates and repairs a raw scoreline distribution ahead of market derivation.

use tracing::debug;

use crate::domain::{Score, Side};
use crate::probs::SliceExt;

/// Substituted when the supplied distribution carries no usable mass: a neutral,
/// low-scoring grid.
const FALLBACK: [(u8, u8, f64); 15] = [
    (0, 0, 0.08),
    (1, 0, 0.10),
    (0, 1, 0.10),
    (1, 1, 0.12),
    (2, 0, 0.07),
    (0, 2, 0.07),
    (2, 1, 0.10),
    (1, 2, 0.10),
    (2, 2, 0.08),
    (3, 0, 0.03),
    (0, 3, 0.03),
    (3, 1, 0.04),
    (1, 3, 0.04),
    (3, 2, 0.02),
    (2, 3, 0.02),
];

/// A repaired scoreline distribution: entries parse cleanly, probabilities sum to 1,
/// and the provider's iteration order is preserved.
#[derive(Clone, Debug)]
pub struct ScoreDistribution {
    entries: Vec<(Score, f64)>,
}
impl ScoreDistribution {
    /// Repairs a raw `"a-b"` keyed distribution. Unparseable keys and negative or
    /// non-finite probabilities are skipped silently; duplicate scorelines accumulate
    /// into their first occurrence. Zero remaining mass substitutes the fallback grid.
    /// The surviving entries are rescaled to sum to 1.
    pub fn normalise(raw: &[(String, f64)]) -> Self {
        let mut entries: Vec<(Score, f64)> = Vec::with_capacity(raw.len());
        for (key, prob) in raw {
            let Some(score) = parse_score(key) else {
                debug!("skipping unparseable scoreline key {key:?}");
                continue;
            };
            if !prob.is_finite() || *prob < 0.0 {
                debug!("skipping scoreline {key:?} with probability {prob}");
                continue;
            }
            match entries.iter_mut().find(|(existing, _)| *existing == score) {
                Some((_, existing_prob)) => *existing_prob += prob,
                None => entries.push((score, *prob)),
            }
        }

        let mass: f64 = entries.iter().map(|(_, prob)| prob).sum();
        if mass <= 0.0 {
            debug!("no usable scoreline mass; substituting fallback distribution");
            entries = FALLBACK
                .iter()
                .map(|&(home, away, prob)| (Score::new(home, away), prob))
                .collect();
        }

        let mut probs: Vec<f64> = entries.iter().map(|(_, prob)| *prob).collect();
        probs.normalise(1.0);
        for (entry, prob) in entries.iter_mut().zip(probs) {
            entry.1 = prob;
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[(Score, f64)] {
        &self.entries
    }

    /// Total probability mass over scorelines matching `filter`.
    pub fn mass(&self, mut filter: impl FnMut(&Score) -> bool) -> f64 {
        self.entries
            .iter()
            .filter(|(score, _)| filter(score))
            .map(|(_, prob)| prob)
            .sum()
    }

    /// Goal-total probability mass function, grouping entries by `home + away`.
    pub fn total_goals_pmf(&self) -> Vec<f64> {
        let max_total = self
            .entries
            .iter()
            .map(|(score, _)| score.total())
            .max()
            .unwrap_or(0);
        let mut pmf = vec![0.0; max_total as usize + 1];
        for (score, prob) in &self.entries {
            pmf[score.total() as usize] += prob;
        }
        pmf
    }

    /// Mass of scorelines where `side` scored strictly more than `line`.5 goals;
    /// i.e. at least `line + 1`.
    pub fn side_over(&self, side: &Side, line: u8) -> f64 {
        self.mass(|score| score.side_goals(side) > line)
    }
}

fn parse_score(key: &str) -> Option<Score> {
    let (home, away) = key.split_once('-')?;
    let home = home.trim().parse::<u8>().ok()?;
    let away = away.trim().parse::<u8>().ok()?;
    Some(Score::new(home, away))
}

#[cfg(test)]
mod tests;
