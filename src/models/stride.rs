// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stride: the streak-based leveling system.
//!
//! The tier of a streak is a pure function of consecutive active days; the
//! daily update runs at most once per user-local day, on the first movement
//! that covers the qualifying distance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One tier of the Stride ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrideTier {
    pub level: u32,
    pub title: &'static str,
    /// Multiplier applied in the reward pipeline
    pub multiplier: f64,
    /// Maximum SC creditable from movement per local day
    pub daily_cap: i64,
}

/// Ascending day thresholds; a streak of N days maps to the last tier whose
/// threshold is ≤ N.
const TIERS: [(u32, StrideTier); 5] = [
    (
        0,
        StrideTier {
            level: 1,
            title: "Starter",
            multiplier: 1.0,
            daily_cap: 500,
        },
    ),
    (
        7,
        StrideTier {
            level: 2,
            title: "Regular",
            multiplier: 1.1,
            daily_cap: 800,
        },
    ),
    (
        30,
        StrideTier {
            level: 3,
            title: "Committed",
            multiplier: 1.25,
            daily_cap: 1200,
        },
    ),
    (
        90,
        StrideTier {
            level: 4,
            title: "Veteran",
            multiplier: 1.5,
            daily_cap: 2000,
        },
    ),
    (
        180,
        StrideTier {
            level: 5,
            title: "Legend",
            multiplier: 2.0,
            daily_cap: 3000,
        },
    ),
];

/// The tier for a given consecutive-active-day count.
pub fn level_of(streak_days: u32) -> StrideTier {
    let mut current = TIERS[0].1;
    for (threshold, tier) in TIERS {
        if streak_days >= threshold {
            current = tier;
        } else {
            break;
        }
    }
    current
}

/// Days remaining until the next tier, or `None` at the top.
pub fn days_until_next(streak_days: u32) -> Option<u32> {
    TIERS
        .iter()
        .map(|(threshold, _)| *threshold)
        .find(|threshold| *threshold > streak_days)
        .map(|threshold| threshold - streak_days)
}

/// Outcome of a daily streak update, for logging and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakUpdate {
    /// Already counted an active day today
    AlreadyCounted,
    /// Consecutive day, streak incremented
    Extended,
    /// One missed day bridged by consuming a shield
    ShieldConsumed,
    /// Gap too large (or no shield), streak restarted at 1
    Reset,
    /// First active day ever
    Started,
}

/// Per-user streak state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrideState {
    pub user_id: u64,
    pub current_streak_days: u32,
    pub longest_streak_days: u32,
    /// Stride level, kept in sync with `level_of(current_streak_days)`
    pub level: u32,
    /// Banked shields; each one bridges a single missed day
    pub shield_count: u32,
    pub last_active_date: Option<NaiveDate>,
    /// Lifetime validated distance (meters)
    pub total_distance_m: f64,
}

impl StrideState {
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id,
            current_streak_days: 0,
            longest_streak_days: 0,
            level: 1,
            shield_count: 0,
            last_active_date: None,
            total_distance_m: 0.0,
        }
    }

    /// Current tier.
    pub fn tier(&self) -> StrideTier {
        level_of(self.current_streak_days)
    }

    /// Register the first qualifying movement of `today`.
    ///
    /// Applies the streak rule: consecutive day extends, a single missed day
    /// is bridged by a shield, anything longer resets to 1. Longest streak
    /// never decreases.
    pub fn register_active_day(&mut self, today: NaiveDate) -> StreakUpdate {
        let update = match self.last_active_date {
            Some(last) if last == today => return StreakUpdate::AlreadyCounted,
            Some(last) => {
                let gap = (today - last).num_days();
                if gap == 1 {
                    self.current_streak_days += 1;
                    StreakUpdate::Extended
                } else if gap == 2 && self.shield_count > 0 {
                    self.shield_count -= 1;
                    self.current_streak_days += 1;
                    StreakUpdate::ShieldConsumed
                } else {
                    self.current_streak_days = 1;
                    StreakUpdate::Reset
                }
            }
            None => {
                self.current_streak_days = 1;
                StreakUpdate::Started
            }
        };

        self.last_active_date = Some(today);
        self.longest_streak_days = self.longest_streak_days.max(self.current_streak_days);
        self.level = level_of(self.current_streak_days).level;
        update
    }
}
