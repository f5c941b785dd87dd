//! Property tests for confidence smoothing

use cropwise_core::Candidate;
use cropwise_engine::{smooth, total_percentage, SmoothingParams};
use proptest::prelude::*;

fn ranked(mut probs: Vec<f64>) -> Vec<Candidate> {
    probs.sort_by(|a, b| b.partial_cmp(a).unwrap());
    probs
        .into_iter()
        .enumerate()
        .map(|(i, p)| Candidate::new(format!("crop{}", i), p))
        .collect()
}

proptest! {
    #[test]
    fn prop_total_is_exactly_100(
        probs in prop::collection::vec(0.0f64..=1.0, 1..=5),
        temperature in 0.5f64..8.0,
        floor_tenths in 0u32..=400,
    ) {
        let params = SmoothingParams::new(temperature, floor_tenths as f64 / 10.0);
        let out = smooth(&ranked(probs), &params);

        let tenths: i64 = out.iter().map(|m| (m.match_pct * 10.0).round() as i64).sum();
        prop_assert_eq!(tenths, 1000);
        prop_assert_eq!(total_percentage(&out), 100.0);
        prop_assert!(out.iter().all(|m| m.match_pct >= 0.0));
    }

    #[test]
    fn prop_floor_holds_when_feasible(
        probs in prop::collection::vec(0.0f64..=1.0, 1..=5),
        temperature in 0.5f64..8.0,
        floor_tenths in 0u32..=200,
    ) {
        let floor = floor_tenths as f64 / 10.0;
        let n = probs.len();
        prop_assume!(floor * n as f64 <= 100.0);

        let out = smooth(&ranked(probs), &SmoothingParams::new(temperature, floor));
        for m in &out {
            prop_assert!(m.match_pct >= floor - 1e-9, "{} below floor {}", m.match_pct, floor);
        }
    }

    #[test]
    fn prop_rank_order_is_preserved(
        probs in prop::collection::vec(0.0f64..=1.0, 1..=5),
        temperature in 0.5f64..8.0,
        floor_tenths in 0u32..=400,
    ) {
        let out = smooth(&ranked(probs), &SmoothingParams::new(temperature, floor_tenths as f64 / 10.0));

        for (i, m) in out.iter().enumerate() {
            prop_assert_eq!(m.rank, i + 1);
        }
        for pair in out.windows(2) {
            prop_assert!(pair[0].match_pct >= pair[1].match_pct);
        }
    }
}

#[test]
fn test_overconfident_temperature_flattens_more() {
    let candidates = ranked(vec![0.97, 0.02, 0.01]);
    let hot = smooth(&candidates, &SmoothingParams::new(4.0, 0.0));
    let warm = smooth(&candidates, &SmoothingParams::new(2.5, 0.0));
    assert!(hot[0].match_pct < warm[0].match_pct);
}
