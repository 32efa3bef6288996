//! The Market Derivation Engine: a pure, deterministic mapping from a baseline
//! forecast to the full secondary market set.

use crate::domain::{
    AuxStrength, DoubleChance, ForecastDistribution, MarketKey, MarketSet, OverUnder, Score, Side,
    TripleOutcome, YesNo, TEAM_TOTAL_LINES, TOTAL_GOALS_LINES,
};
use crate::probs::{clip, clip_unit};
use crate::scoredist::ScoreDistribution;

/// Number of correct-score entries exposed through `mkt.cs.topk`.
pub const TOP_K: usize = 5;

const HT_RESULT_PRIMARY_WEIGHT: f64 = 0.6;
const HT_RESULT_SECONDARY_WEIGHT: f64 = 0.2;
const HT_TOTAL_DISCOUNT: f64 = 0.15;
const CORNERS_BASELINE: f64 = 0.5;
const CARDS_BASELINE: f64 = 0.45;
const STRENGTH_SHIFT_DIVISOR: f64 = 300.0;

/// Derives the full market set from a forecast. Free of side effects; identical inputs
/// always produce identical outputs. Corner/card heuristics are emitted only when
/// auxiliary strength features are supplied.
pub fn derive_markets(forecast: &ForecastDistribution, aux: Option<&AuxStrength>) -> MarketSet {
    let dist = ScoreDistribution::normalise(&forecast.scores);
    let mut markets = MarketSet::default();

    let (p_home, p_draw, p_away) = (forecast.p_home, forecast.p_draw, forecast.p_away);
    markets.insert(MarketKey::Result(TripleOutcome::Home), p_home);
    markets.insert(MarketKey::Result(TripleOutcome::Draw), p_draw);
    markets.insert(MarketKey::Result(TripleOutcome::Away), p_away);

    derive_totals(&dist, &mut markets);
    derive_team_totals(&dist, &mut markets);
    derive_btts(&dist, &mut markets);
    derive_double_chance(p_home, p_draw, p_away, &mut markets);

    // Draw-no-bet is a deliberate proxy: the raw win probabilities, NOT renormalized
    // to exclude the draw. Downstream consumers rely on H + A < 1; leave as is.
    markets.insert(MarketKey::DrawNoBet(Side::Home), p_home);
    markets.insert(MarketKey::DrawNoBet(Side::Away), p_away);

    markets.set_top_scores(top_scores(&dist));

    markets.insert(
        MarketKey::AsianHandicap(Side::Home),
        p_home + 0.25 * p_draw,
    );
    markets.insert(
        MarketKey::AsianHandicap(Side::Away),
        p_away + 0.25 * p_draw,
    );

    derive_half_time(p_home, p_draw, p_away, &mut markets);

    if let Some(aux) = aux {
        derive_aux_heuristics(aux, &mut markets);
    }

    markets
}

fn derive_totals(dist: &ScoreDistribution, markets: &mut MarketSet) {
    let pmf = dist.total_goals_pmf();
    for line in TOTAL_GOALS_LINES {
        let over: f64 = pmf.iter().skip(line as usize + 1).sum();
        markets.insert(MarketKey::TotalGoals(OverUnder::Over, line), over);
        markets.insert(MarketKey::TotalGoals(OverUnder::Under, line), 1.0 - over);
    }
}

fn derive_team_totals(dist: &ScoreDistribution, markets: &mut MarketSet) {
    for side in [Side::Home, Side::Away] {
        for line in TEAM_TOTAL_LINES {
            let over = dist.side_over(&side, line);
            markets.insert(MarketKey::TeamTotal(side, OverUnder::Over, line), over);
            markets.insert(
                MarketKey::TeamTotal(side, OverUnder::Under, line),
                1.0 - over,
            );
        }
        markets.insert(MarketKey::TeamToScore(side), dist.side_over(&side, 0));
    }
}

fn derive_btts(dist: &ScoreDistribution, markets: &mut MarketSet) {
    let yes = dist.mass(|score| score.home >= 1 && score.away >= 1);
    markets.insert(MarketKey::Btts(YesNo::Yes), yes);
    markets.insert(MarketKey::Btts(YesNo::No), 1.0 - yes);
}

fn derive_double_chance(p_home: f64, p_draw: f64, p_away: f64, markets: &mut MarketSet) {
    // each leg clipped independently; the three are not forced to be mutually consistent
    markets.insert(
        MarketKey::DoubleChance(DoubleChance::HomeOrDraw),
        clip_unit(p_home + p_draw),
    );
    markets.insert(
        MarketKey::DoubleChance(DoubleChance::HomeOrAway),
        clip_unit(p_home + p_away),
    );
    markets.insert(
        MarketKey::DoubleChance(DoubleChance::DrawOrAway),
        clip_unit(p_draw + p_away),
    );
}

/// The `TOP_K` highest-probability scorelines, descending, with ties broken by the
/// provider's original iteration order.
fn top_scores(dist: &ScoreDistribution) -> Vec<(Score, f64)> {
    let mut entries: Vec<(Score, f64)> = dist.entries().to_vec();
    entries.sort_by(|(_, a), (_, b)| b.total_cmp(a));
    entries.truncate(TOP_K);
    entries
}

/// Half-time projections are fixed linear blends of the full-time distribution, not a
/// true half-time model.
fn derive_half_time(p_home: f64, p_draw: f64, p_away: f64, markets: &mut MarketSet) {
    markets.insert(
        MarketKey::HalfTimeResult(TripleOutcome::Home),
        clip_unit(HT_RESULT_PRIMARY_WEIGHT * p_home + HT_RESULT_SECONDARY_WEIGHT * p_draw),
    );
    markets.insert(
        MarketKey::HalfTimeResult(TripleOutcome::Draw),
        clip_unit(
            HT_RESULT_PRIMARY_WEIGHT * p_draw + HT_RESULT_SECONDARY_WEIGHT * (p_home + p_away),
        ),
    );
    markets.insert(
        MarketKey::HalfTimeResult(TripleOutcome::Away),
        clip_unit(HT_RESULT_PRIMARY_WEIGHT * p_away + HT_RESULT_SECONDARY_WEIGHT * p_draw),
    );

    let ft_over_2_5 = markets
        .get(&MarketKey::TotalGoals(OverUnder::Over, 2))
        .unwrap_or(0.0);
    let ht_over = clip(ft_over_2_5 - HT_TOTAL_DISCOUNT, 0.05, 0.95);
    markets.insert(MarketKey::HalfTimeTotal(OverUnder::Over), ht_over);
    markets.insert(MarketKey::HalfTimeTotal(OverUnder::Under), 1.0 - ht_over);
}

/// Corner/card projections have no scoreline basis; they shift a fixed baseline by the
/// strength differential. A larger mismatch leans towards more corners (sustained
/// pressure from the stronger side) and fewer cards (less contested play).
fn derive_aux_heuristics(aux: &AuxStrength, markets: &mut MarketSet) {
    let shift = aux.elo_diff.abs() / STRENGTH_SHIFT_DIVISOR;

    let corners_over = clip(CORNERS_BASELINE + shift, 0.1, 0.9);
    markets.insert(MarketKey::CornersTotal(OverUnder::Over), corners_over);
    markets.insert(
        MarketKey::CornersTotal(OverUnder::Under),
        1.0 - corners_over,
    );

    let cards_over = clip(CARDS_BASELINE - shift, 0.1, 0.9);
    markets.insert(MarketKey::CardsTotal(OverUnder::Over), cards_over);
    markets.insert(MarketKey::CardsTotal(OverUnder::Under), 1.0 - cards_over);
}
