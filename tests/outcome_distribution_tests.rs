// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Statistical behavior of the weighted outcome resolver over a seeded RNG.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use stridecoin::services::outcome::{draw_outcome, success_roll, WeightedOutcome};

const DRAWS: usize = 100_000;

#[test]
fn weighted_frequencies_match_weights_within_tolerance() {
    let table = [
        WeightedOutcome {
            label: "common",
            weight: 70,
            effect: 0usize,
        },
        WeightedOutcome {
            label: "uncommon",
            weight: 20,
            effect: 1usize,
        },
        WeightedOutcome {
            label: "rare",
            weight: 10,
            effect: 2usize,
        },
    ];

    let mut rng = ChaCha20Rng::from_seed([42u8; 32]);
    let mut counts = [0usize; 3];
    for _ in 0..DRAWS {
        let outcome = draw_outcome(&table, &mut rng).unwrap();
        counts[outcome.effect] += 1;
    }

    let expected = [0.70, 0.20, 0.10];
    for (i, expected_share) in expected.iter().enumerate() {
        let share = counts[i] as f64 / DRAWS as f64;
        assert!(
            (share - expected_share).abs() < 0.03,
            "outcome {i}: got {share:.4}, expected {expected_share:.2} ±0.03"
        );
    }
}

#[test]
fn success_roll_matches_probability_within_tolerance() {
    let mut rng = ChaCha20Rng::from_seed([24u8; 32]);
    let probability = 0.35;

    let successes = (0..DRAWS)
        .filter(|_| success_roll(probability, &mut rng))
        .count();
    let share = successes as f64 / DRAWS as f64;
    assert!(
        (share - probability).abs() < 0.01,
        "got {share:.4}, expected {probability:.2} ±0.01"
    );
}
