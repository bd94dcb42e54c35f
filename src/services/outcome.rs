// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weighted random outcome resolution.
//!
//! The single randomness primitive behind the roulette mini-game and
//! enhancement gambles. Every draw takes an injected `Rng` so callers (and
//! tests) control the sequence; nothing in this module touches a global RNG.

use rand::Rng;

use crate::error::AppError;

/// One entry of a weight table.
#[derive(Debug, Clone)]
pub struct WeightedOutcome<T> {
    pub label: &'static str,
    pub weight: u32,
    pub effect: T,
}

/// Draw one outcome from a non-empty weight table.
///
/// Uniform draw in `[0, total_weight)`, then a cumulative walk. Tables with
/// zero total weight are a configuration error, not a losable gamble.
pub fn draw_outcome<'a, T, R: Rng>(
    table: &'a [WeightedOutcome<T>],
    rng: &mut R,
) -> Result<&'a WeightedOutcome<T>, AppError> {
    let total_weight: u32 = table.iter().map(|o| o.weight).sum();
    if total_weight == 0 {
        return Err(AppError::InvalidWeightTable(format!(
            "table of {} outcomes has zero total weight",
            table.len()
        )));
    }

    let roll = rng.gen_range(0..total_weight);
    let mut current = 0;
    for outcome in table {
        current += outcome.weight;
        if roll < current {
            return Ok(outcome);
        }
    }

    // Unreachable with total_weight > 0; keep the walk total-safe anyway.
    table
        .last()
        .ok_or_else(|| AppError::InvalidWeightTable("empty table".to_string()))
}

/// Binary success/fail gamble: one uniform draw against `probability`.
pub fn success_roll<R: Rng>(probability: f64, rng: &mut R) -> bool {
    rng.gen::<f64>() < probability
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn table(weights: &[u32]) -> Vec<WeightedOutcome<usize>> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| WeightedOutcome {
                label: "entry",
                weight: *w,
                effect: i,
            })
            .collect()
    }

    #[test]
    fn zero_total_weight_is_rejected() {
        let mut rng = ChaCha20Rng::from_seed([7u8; 32]);
        let err = draw_outcome(&table(&[0, 0, 0]), &mut rng).unwrap_err();
        assert_eq!(err.kind(), "invalid_weight_table");

        let empty: Vec<WeightedOutcome<usize>> = vec![];
        assert!(draw_outcome(&empty, &mut rng).is_err());
    }

    #[test]
    fn zero_weight_entries_are_never_drawn() {
        let mut rng = ChaCha20Rng::from_seed([2u8; 32]);
        let t = table(&[0, 10, 0]);
        for _ in 0..200 {
            let outcome = draw_outcome(&t, &mut rng).unwrap();
            assert_eq!(outcome.effect, 1);
        }
    }

    #[test]
    fn heavier_weight_dominates_seeded_draw() {
        let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
        let t = table(&[1, 50]);
        let outcome = draw_outcome(&t, &mut rng).unwrap();
        assert_eq!(outcome.effect, 1);
    }

    #[test]
    fn success_roll_extremes() {
        let mut rng = ChaCha20Rng::from_seed([9u8; 32]);
        for _ in 0..100 {
            assert!(success_roll(1.0, &mut rng));
            assert!(!success_roll(0.0, &mut rng));
        }
    }
}
