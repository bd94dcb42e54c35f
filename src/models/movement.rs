// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Movement aggregate: raw GPS input shapes and the stored movement record.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::transport::TransportMode;
use crate::services::reward::RewardBreakdown;

/// A raw GPS sample uploaded by the client.
///
/// Points are ephemeral: they are folded into segment aggregates during
/// completion and never persisted individually.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct GpsPoint {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
    /// Sample time, Unix milliseconds
    pub timestamp_ms: i64,
    /// Reported horizontal accuracy (meters), if the device provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
    /// Device-reported speed (m/s), if available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_mps: Option<f64>,
}

/// One contiguous stretch of a single transport mode within a movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementSegment {
    pub transport_mode: TransportMode,
    pub distance_m: f64,
    pub duration_s: f64,
    pub avg_speed_kmh: f64,
}

/// Movement lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementStatus {
    Active,
    Completed,
    Cancelled,
}

/// Stored movement record.
///
/// At most one `Active` movement exists per user; starting a new one cancels
/// the previous. Once `Completed` or `Cancelled` the record never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    pub id: u64,
    pub user_id: u64,
    pub status: MovementStatus,
    pub declared_mode: TransportMode,
    /// Start time (ISO 8601)
    pub started_at: String,
    /// Completion or cancellation time (ISO 8601)
    pub completed_at: Option<String>,
    /// Validated segments, ordered as travelled
    pub segments: Vec<MovementSegment>,
    pub total_distance_m: f64,
    pub total_duration_s: f64,
    /// Full per-factor reward breakdown, persisted for later inspection
    pub reward_breakdown: Option<RewardBreakdown>,
}

impl Movement {
    /// Whether the movement has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            MovementStatus::Completed | MovementStatus::Cancelled
        )
    }
}
