use super::*;
use assert_float_eq::*;

fn raw(entries: &[(&str, f64)]) -> Vec<(String, f64)> {
    entries
        .iter()
        .map(|(key, prob)| (key.to_string(), *prob))
        .collect()
}

#[test]
fn normalises_to_unit_mass() {
    let dist = ScoreDistribution::normalise(&raw(&[("0-0", 0.2), ("1-0", 0.2), ("1-1", 0.1)]));
    let sum: f64 = dist.entries().iter().map(|(_, prob)| prob).sum();
    assert_float_absolute_eq!(1.0, sum, 1e-9);
    assert_eq!(3, dist.entries().len());
    assert_float_absolute_eq!(0.4, dist.entries()[0].1, 1e-9);
}

#[test]
fn preserves_input_order() {
    let dist = ScoreDistribution::normalise(&raw(&[("2-1", 0.3), ("0-0", 0.3), ("1-1", 0.4)]));
    let scores: Vec<Score> = dist.entries().iter().map(|(score, _)| *score).collect();
    assert_eq!(
        vec![Score::new(2, 1), Score::new(0, 0), Score::new(1, 1)],
        scores
    );
}

#[test]
fn skips_malformed_keys_silently() {
    let dist = ScoreDistribution::normalise(&raw(&[
        ("0-0", 0.5),
        ("garbage", 0.2),
        ("1:1", 0.2),
        ("-1-0", 0.2),
        ("1-1", 0.5),
    ]));
    assert_eq!(2, dist.entries().len());
    assert_float_absolute_eq!(0.5, dist.entries()[0].1, 1e-9);
}

#[test]
fn skips_negative_and_non_finite_probabilities() {
    let dist = ScoreDistribution::normalise(&raw(&[
        ("0-0", 0.5),
        ("1-0", -0.5),
        ("1-1", f64::NAN),
        ("2-0", 0.5),
    ]));
    assert_eq!(2, dist.entries().len());
}

#[test]
fn accumulates_duplicates_into_first_occurrence() {
    let dist = ScoreDistribution::normalise(&raw(&[("1-0", 0.25), ("0-0", 0.5), ("1-0", 0.25)]));
    assert_eq!(2, dist.entries().len());
    assert_eq!(Score::new(1, 0), dist.entries()[0].0);
    assert_float_absolute_eq!(0.5, dist.entries()[0].1, 1e-9);
}

#[test]
fn zero_mass_substitutes_fallback() {
    let dist = ScoreDistribution::normalise(&raw(&[("junk", 0.5), ("1-0", -1.0)]));
    let sum: f64 = dist.entries().iter().map(|(_, prob)| prob).sum();
    assert_float_absolute_eq!(1.0, sum, 1e-9);
    assert!(dist.entries().len() > 10);
}

#[test]
fn empty_input_substitutes_fallback() {
    let dist = ScoreDistribution::normalise(&[]);
    let sum: f64 = dist.entries().iter().map(|(_, prob)| prob).sum();
    assert_float_absolute_eq!(1.0, sum, 1e-9);
}

#[test]
fn total_goals_pmf_groups_by_total() {
    let dist = ScoreDistribution::normalise(&raw(&[
        ("0-0", 0.1),
        ("1-0", 0.2),
        ("0-1", 0.2),
        ("2-1", 0.5),
    ]));
    let pmf = dist.total_goals_pmf();
    assert_eq!(4, pmf.len());
    assert_float_absolute_eq!(0.1, pmf[0], 1e-9);
    assert_float_absolute_eq!(0.4, pmf[1], 1e-9);
    assert_float_absolute_eq!(0.0, pmf[2], 1e-9);
    assert_float_absolute_eq!(0.5, pmf[3], 1e-9);
}

#[test]
fn side_over_counts_strictly_above_line() {
    let dist = ScoreDistribution::normalise(&raw(&[("0-0", 0.25), ("1-0", 0.25), ("2-1", 0.5)]));
    assert_float_absolute_eq!(0.75, dist.side_over(&Side::Home, 0), 1e-9);
    assert_float_absolute_eq!(0.5, dist.side_over(&Side::Home, 1), 1e-9);
    assert_float_absolute_eq!(0.0, dist.side_over(&Side::Home, 2), 1e-9);
    assert_float_absolute_eq!(0.5, dist.side_over(&Side::Away, 0), 1e-9);
}
