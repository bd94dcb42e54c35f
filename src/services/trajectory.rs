// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trajectory validation: accuracy filtering, haversine distance, and
//! teleportation-jump exclusion over raw GPS samples.

use serde::{Deserialize, Serialize};

use crate::models::GpsPoint;

/// Mean Earth radius used for great-circle distances (meters).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A consecutive-point pair whose distance exceeded the jump threshold.
///
/// The increment is excluded from the validated distance but both points are
/// kept for audit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JumpAnomaly {
    /// Indices into the accepted-point sequence
    pub from_index: usize,
    pub to_index: usize,
    pub distance_m: f64,
}

/// Result of validating one segment's point sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatedTrack {
    /// Sum of plausible consecutive-point distances (meters)
    pub distance_m: f64,
    /// Max accepted timestamp minus min accepted timestamp (seconds)
    pub duration_s: f64,
    /// Points surviving the accuracy filter
    pub accepted_points: usize,
    /// Points discarded for bad reported accuracy
    pub discarded_points: usize,
    pub anomalies: Vec<JumpAnomaly>,
}

impl ValidatedTrack {
    /// Average speed over the validated distance, km/h. Zero when the
    /// duration is zero.
    pub fn avg_speed_kmh(&self) -> f64 {
        if self.duration_s <= 0.0 {
            0.0
        } else {
            self.distance_m / self.duration_s * 3.6
        }
    }
}

/// Great-circle distance between two points, meters.
pub fn haversine_m(a: &GpsPoint, b: &GpsPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Validate an ordered point sequence for one in-progress segment.
///
/// Points whose reported accuracy exceeds `min_accuracy_m` are discarded up
/// front. Between consecutive accepted points, a distance above `max_jump_m`
/// is flagged as an anomaly and excluded from the total; a zero-duration gap
/// contributes zero distance and is never an anomaly (speed is undefined
/// there, not implausible).
pub fn validate_track(points: &[GpsPoint], max_jump_m: f64, min_accuracy_m: f64) -> ValidatedTrack {
    let accepted: Vec<&GpsPoint> = points
        .iter()
        .filter(|p| p.accuracy_m.is_none_or(|acc| acc <= min_accuracy_m))
        .collect();
    let discarded = points.len() - accepted.len();

    if accepted.len() < 2 {
        return ValidatedTrack {
            accepted_points: accepted.len(),
            discarded_points: discarded,
            ..ValidatedTrack::default()
        };
    }

    let mut distance_m = 0.0;
    let mut anomalies = Vec::new();

    for (i, pair) in accepted.windows(2).enumerate() {
        let (prev, next) = (pair[0], pair[1]);
        let elapsed_ms = next.timestamp_ms - prev.timestamp_ms;
        if elapsed_ms <= 0 {
            continue;
        }

        let d = haversine_m(prev, next);
        if d > max_jump_m {
            anomalies.push(JumpAnomaly {
                from_index: i,
                to_index: i + 1,
                distance_m: d,
            });
            continue;
        }
        distance_m += d;
    }

    let min_ts = accepted.iter().map(|p| p.timestamp_ms).min().unwrap_or(0);
    let max_ts = accepted.iter().map(|p| p.timestamp_ms).max().unwrap_or(0);

    ValidatedTrack {
        distance_m,
        duration_s: (max_ts - min_ts) as f64 / 1000.0,
        accepted_points: accepted.len(),
        discarded_points: discarded,
        anomalies,
    }
}
