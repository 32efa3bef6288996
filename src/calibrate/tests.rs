use assert_float_eq::*;
use chrono::Utc;
use tinyrand::{Rand, Seeded, StdRand};

use super::apply::{apply, calibrate_markets};
use super::fit::{fit_isotonic, fit_platt, PlattConfig};
use super::store::CalibrationStore;
use super::*;
use crate::derive::derive_markets;
use crate::domain::ForecastDistribution;

fn fitted(bucket: BucketKey, method: CalibrationMethod) -> CalibrationModel {
    CalibrationModel::fitted("v1", bucket, method, Utc::now())
}

#[test]
fn bucket_map_is_total_over_taxonomy() {
    let uncalibratable = [
        MarketKey::DrawNoBet(Side::Home),
        MarketKey::DrawNoBet(Side::Away),
        MarketKey::CorrectScoreTopK,
        MarketKey::AsianHandicap(Side::Home),
        MarketKey::AsianHandicap(Side::Away),
    ];
    for key in MarketKey::all() {
        match bucket_for(&key) {
            Some(_) => assert!(!uncalibratable.contains(&key), "{key:?}"),
            None => assert!(uncalibratable.contains(&key), "{key:?}"),
        }
    }
}

#[test]
fn bucket_names_stable_and_unique() {
    assert_eq!(
        "over2_5",
        bucket_for(&MarketKey::TotalGoals(OverUnder::Over, 2))
            .unwrap()
            .to_string()
    );
    assert_eq!(
        "1x2_h",
        bucket_for(&MarketKey::Result(TripleOutcome::Home))
            .unwrap()
            .to_string()
    );
    assert_eq!(
        "tt_away_under1_5",
        bucket_for(&MarketKey::TeamTotal(Side::Away, OverUnder::Under, 1))
            .unwrap()
            .to_string()
    );

    let names: Vec<String> = MarketKey::all()
        .iter()
        .filter_map(bucket_for)
        .map(|bucket| bucket.to_string())
        .collect();
    let unique: std::collections::HashSet<&String> = names.iter().collect();
    assert_eq!(names.len(), unique.len());
}

#[test]
fn platt_all_positive_labels_pulls_up() {
    let probs: Vec<f64> = (0..20).map(|i| i as f64 / 19.0).collect();
    let labels = vec![true; probs.len()];
    let method = fit_platt(&probs, &labels, &PlattConfig::default());
    for i in 0..=10 {
        let p = i as f64 / 10.0;
        assert!(apply(&method, p) > 0.5, "p={p}");
    }
}

#[test]
fn platt_degenerate_inputs_stay_finite() {
    // constant probabilities and constant labels must not diverge
    let probs = vec![0.5; 50];
    let labels = vec![false; 50];
    let CalibrationMethod::Platt { a, b } = fit_platt(&probs, &labels, &PlattConfig::default())
    else {
        panic!("expected a Platt model")
    };
    assert!(a.is_finite() && b.is_finite());
    assert!(b < 0.0, "constant-false labels should bias b downward, got {b}");
}

#[test]
fn platt_fit_is_reproducible() {
    let probs: Vec<f64> = (0..30).map(|i| (i as f64 * 0.7).sin().abs()).collect();
    let labels: Vec<bool> = (0..30).map(|i| i % 3 != 0).collect();
    let first = fit_platt(&probs, &labels, &PlattConfig::default());
    let second = fit_platt(&probs, &labels, &PlattConfig::default());
    assert_eq!(first, second);
}

#[test]
fn platt_empty_input_is_identity_logistic() {
    let method = fit_platt(&[], &[], &PlattConfig::default());
    assert_eq!(CalibrationMethod::Platt { a: 0.0, b: 0.0 }, method);
    assert_float_absolute_eq!(0.5, apply(&method, 0.2), 1e-9);
}

#[test]
fn isotonic_points_are_monotone() {
    let probs = [0.9, 0.1, 0.4, 0.8, 0.2, 0.6, 0.3, 0.7, 0.5, 0.95];
    let labels = [true, false, false, true, true, false, false, true, true, true];
    let CalibrationMethod::Isotonic { points } = fit_isotonic(&probs, &labels, 4) else {
        panic!("expected an isotonic model")
    };
    for pair in points.windows(2) {
        assert!(pair[0].0 <= pair[1].0);
        assert!(pair[0].1 <= pair[1].1);
    }
    assert_eq!(0.0, points[0].0);
    assert_eq!(1.0, points[points.len() - 1].0);
}

#[test]
fn isotonic_random_fits_stay_monotone() {
    let mut rand = StdRand::seed(17);
    for _ in 0..50 {
        let n = 5 + (rand.next_u64() % 60) as usize;
        let probs: Vec<f64> = (0..n)
            .map(|_| (rand.next_u64() % 1000) as f64 / 999.0)
            .collect();
        let labels: Vec<bool> = (0..n).map(|_| rand.next_u64() % 2 == 0).collect();
        let bins = 1 + (rand.next_u64() % 10) as usize;
        let CalibrationMethod::Isotonic { points } = fit_isotonic(&probs, &labels, bins) else {
            panic!("expected an isotonic model")
        };
        for pair in points.windows(2) {
            assert!(pair[0].1 <= pair[1].1, "points not monotone: {points:?}");
        }
    }
}

#[test]
fn isotonic_interpolates_and_clamps() {
    let method = CalibrationMethod::Isotonic {
        points: vec![(0.0, 0.1), (0.4, 0.3), (0.8, 0.7), (1.0, 0.7)],
    };
    assert_float_absolute_eq!(0.1, apply(&method, 0.0), 1e-9);
    assert_float_absolute_eq!(0.2, apply(&method, 0.2), 1e-9);
    assert_float_absolute_eq!(0.5, apply(&method, 0.6), 1e-9);
    assert_float_absolute_eq!(0.7, apply(&method, 0.9), 1e-9);
    assert_float_absolute_eq!(0.7, apply(&method, 1.0), 1e-9);
}

#[test]
fn isotonic_clamps_outside_fitted_range() {
    let method = CalibrationMethod::Isotonic {
        points: vec![(0.3, 0.25), (0.7, 0.75)],
    };
    assert_float_absolute_eq!(0.25, apply(&method, 0.1), 1e-9);
    assert_float_absolute_eq!(0.75, apply(&method, 0.9), 1e-9);
}

#[test]
fn promote_supersedes_previous_active() {
    let store = CalibrationStore::new();
    let bucket = BucketKey::BttsYes;
    store.promote(fitted(bucket, CalibrationMethod::Platt { a: 1.0, b: 0.0 }));
    store.promote(fitted(bucket, CalibrationMethod::Platt { a: 2.0, b: 0.1 }));

    let active = store.get_active("v1", &bucket).unwrap();
    assert_eq!(CalibrationMethod::Platt { a: 2.0, b: 0.1 }, active.method);

    let all = store.list_all(&bucket);
    assert_eq!(2, all.len());
    assert_eq!(ModelState::Superseded, all[0].state);
    assert_eq!(ModelState::Active, all[1].state);
}

#[test]
fn activation_scoped_per_model_version() {
    let store = CalibrationStore::new();
    let bucket = BucketKey::Total(OverUnder::Over, 2);
    store.promote(CalibrationModel::fitted(
        "v1",
        bucket,
        CalibrationMethod::Platt { a: 1.0, b: 0.0 },
        Utc::now(),
    ));
    store.promote(CalibrationModel::fitted(
        "v2",
        bucket,
        CalibrationMethod::Platt { a: -1.0, b: 0.0 },
        Utc::now(),
    ));

    assert_eq!(
        CalibrationMethod::Platt { a: 1.0, b: 0.0 },
        store.get_active("v1", &bucket).unwrap().method
    );
    assert_eq!(
        CalibrationMethod::Platt { a: -1.0, b: 0.0 },
        store.get_active("v2", &bucket).unwrap().method
    );
    assert!(store.get_active("v3", &bucket).is_none());
}

fn sample_forecast() -> ForecastDistribution {
    ForecastDistribution {
        p_home: 0.42,
        p_draw: 0.30,
        p_away: 0.28,
        scores: [
            ("0-0", 0.10),
            ("1-0", 0.18),
            ("1-1", 0.20),
            ("0-1", 0.17),
            ("2-1", 0.12),
            ("1-2", 0.11),
            ("2-0", 0.12),
        ]
        .iter()
        .map(|(key, prob)| (key.to_string(), *prob))
        .collect(),
    }
}

#[test]
fn empty_store_passes_markets_through_raw() {
    let raw = derive_markets(&sample_forecast(), None);
    let store = CalibrationStore::new();
    let calibrated = calibrate_markets(&raw, &store, "v1");

    assert!(calibrated.calibrated.is_empty());
    for (key, prob) in raw.scalars() {
        assert_eq!(*prob, calibrated.markets.get(key).unwrap());
    }
    assert_eq!(raw.top_scores(), calibrated.markets.top_scores());
}

#[test]
fn active_model_applied_to_its_market_only() {
    let raw = derive_markets(&sample_forecast(), None);
    let store = CalibrationStore::new();
    store.promote(fitted(
        BucketKey::BttsYes,
        CalibrationMethod::Isotonic {
            points: vec![(0.0, 0.0), (0.5, 0.6), (1.0, 1.0)],
        },
    ));

    let calibrated = calibrate_markets(&raw, &store, "v1");
    assert_eq!(1, calibrated.calibrated.len());
    assert!(calibrated.calibrated.contains(&MarketKey::Btts(YesNo::Yes)));

    // raw btts.yes = 0.43 → interpolated on [0, 0.5] → 0.43/0.5 * 0.6
    assert_float_absolute_eq!(
        0.516,
        calibrated.markets.get(&MarketKey::Btts(YesNo::Yes)).unwrap(),
        1e-9
    );
    // everything else passes through
    assert_eq!(
        raw.get(&MarketKey::Btts(YesNo::No)).unwrap(),
        calibrated.markets.get(&MarketKey::Btts(YesNo::No)).unwrap()
    );
}

#[test]
fn model_for_other_version_not_applied() {
    let raw = derive_markets(&sample_forecast(), None);
    let store = CalibrationStore::new();
    store.promote(CalibrationModel::fitted(
        "v2",
        BucketKey::BttsYes,
        CalibrationMethod::Platt { a: 3.0, b: -1.0 },
        Utc::now(),
    ));

    let calibrated = calibrate_markets(&raw, &store, "v1");
    assert!(calibrated.calibrated.is_empty());
}
