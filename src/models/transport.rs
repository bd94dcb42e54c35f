// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transport modes and their reward classification.
//!
//! Each declared mode carries a plausible speed band, a reward class, and a
//! base SC rate per 100 m. Average speed outside the band never rejects a
//! segment; consumer GPS is noisy and legitimate movement fluctuates, so
//! mismatches only feed a diagnostic plausibility count.

use serde::{Deserialize, Serialize};

/// Declared mode of transport for a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Walking,
    Running,
    Cycling,
    EScooter,
    Bus,
    Subway,
}

/// How a mode earns: under the user's own power, assisted, or transit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardClass {
    BodyPowered,
    VehicleAssisted,
    PublicTransit,
}

/// Multiplicative bonus applied once when a movement mixes ≥2 distinct modes.
pub const MULTI_TRANSPORT_MULTIPLIER: f64 = 1.1;

impl TransportMode {
    pub const ALL: [TransportMode; 6] = [
        TransportMode::Walking,
        TransportMode::Running,
        TransportMode::Cycling,
        TransportMode::EScooter,
        TransportMode::Bus,
        TransportMode::Subway,
    ];

    /// Plausible average-speed band, km/h.
    pub fn speed_band_kmh(self) -> (f64, f64) {
        match self {
            TransportMode::Walking => (0.0, 7.0),
            TransportMode::Running => (6.0, 16.0),
            TransportMode::Cycling => (8.0, 35.0),
            TransportMode::EScooter => (8.0, 30.0),
            TransportMode::Bus => (10.0, 60.0),
            TransportMode::Subway => (20.0, 80.0),
        }
    }

    pub fn reward_class(self) -> RewardClass {
        match self {
            TransportMode::Walking | TransportMode::Running | TransportMode::Cycling => {
                RewardClass::BodyPowered
            }
            TransportMode::EScooter => RewardClass::VehicleAssisted,
            TransportMode::Bus | TransportMode::Subway => RewardClass::PublicTransit,
        }
    }

    /// Base SC earned per 100 m of validated distance.
    pub fn base_rate_per_100m(self) -> f64 {
        match self {
            TransportMode::Walking => 1.0,
            TransportMode::Running => 1.2,
            TransportMode::Cycling => 0.8,
            TransportMode::EScooter => 0.5,
            TransportMode::Bus => 0.3,
            TransportMode::Subway => 0.3,
        }
    }

    /// Whether an observed average speed sits inside the mode's band.
    pub fn speed_plausible(self, avg_speed_kmh: f64) -> bool {
        let (min, max) = self.speed_band_kmh();
        avg_speed_kmh >= min && avg_speed_kmh <= max
    }
}

impl RewardClass {
    /// Class-level multiplier in the reward formula.
    pub fn multiplier(self) -> f64 {
        match self {
            RewardClass::BodyPowered => 1.0,
            RewardClass::VehicleAssisted => 0.8,
            RewardClass::PublicTransit => 0.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_bands_cover_plausible_movement() {
        assert!(TransportMode::Walking.speed_plausible(4.5));
        assert!(!TransportMode::Walking.speed_plausible(12.0));
        assert!(TransportMode::Subway.speed_plausible(45.0));
        assert!(!TransportMode::Subway.speed_plausible(5.0));
    }

    #[test]
    fn body_powered_modes_earn_most() {
        for mode in TransportMode::ALL {
            let class_mult = mode.reward_class().multiplier();
            match mode.reward_class() {
                RewardClass::BodyPowered => assert_eq!(class_mult, 1.0),
                _ => assert!(class_mult < 1.0),
            }
        }
    }

    #[test]
    fn mode_names_serialize_snake_case() {
        let json = serde_json::to_string(&TransportMode::EScooter).unwrap();
        assert_eq!(json, "\"e_scooter\"");
        let parsed: TransportMode = serde_json::from_str("\"walking\"").unwrap();
        assert_eq!(parsed, TransportMode::Walking);
    }
}
