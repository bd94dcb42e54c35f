// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reward computation pipeline.
//!
//! A pure, deterministic fold of validated distance and context multipliers
//! into one SC amount plus a full per-factor breakdown. The breakdown is a
//! contract: support and the user must be able to reconstruct exactly how an
//! amount was derived, so every factor that entered the product is recorded,
//! including the uncapped value when the daily cap clips the credit.

use serde::{Deserialize, Serialize};

use crate::models::transport::{TransportMode, MULTI_TRANSPORT_MULTIPLIER};

/// Fixed segments of the local day, each with its own multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaySegment {
    Dawn,
    MorningCommute,
    Morning,
    Lunch,
    Afternoon,
    EveningCommute,
    Evening,
    Night,
}

impl DaySegment {
    /// Segment for a local hour (0-23).
    pub fn from_local_hour(hour: u32) -> Self {
        match hour {
            5..=6 => DaySegment::Dawn,
            7..=8 => DaySegment::MorningCommute,
            9..=10 => DaySegment::Morning,
            11..=13 => DaySegment::Lunch,
            14..=16 => DaySegment::Afternoon,
            17..=18 => DaySegment::EveningCommute,
            19..=22 => DaySegment::Evening,
            _ => DaySegment::Night,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            DaySegment::Dawn => 1.15,
            DaySegment::MorningCommute => 1.2,
            DaySegment::Morning => 1.0,
            DaySegment::Lunch => 1.1,
            DaySegment::Afternoon => 1.0,
            DaySegment::EveningCommute => 1.2,
            DaySegment::Evening => 1.05,
            DaySegment::Night => 0.9,
        }
    }
}

/// Weather condition declared for a movement. Extreme states are penalties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Clear,
    Clouds,
    Rain,
    Snow,
    ExtremeHeat,
    ExtremeCold,
}

impl Weather {
    pub fn multiplier(self) -> f64 {
        match self {
            Weather::Clear => 1.0,
            Weather::Clouds => 1.0,
            Weather::Rain => 0.85,
            Weather::Snow => 0.8,
            Weather::ExtremeHeat => 0.75,
            Weather::ExtremeCold => 0.75,
        }
    }
}

/// Per-segment distance entering the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct SegmentInput {
    pub mode: TransportMode,
    pub distance_m: f64,
}

/// Everything the formula consumes. No hidden inputs, no randomness.
#[derive(Debug, Clone)]
pub struct RewardInputs {
    pub segments: Vec<SegmentInput>,
    pub stride_multiplier: f64,
    pub day_segment: DaySegment,
    pub weather: Weather,
    pub equipment_bonus_percent: f64,
    pub condition_multiplier: f64,
    /// Flat SC added after the multiplier product (first movement of the day)
    pub flat_bonus_sc: i64,
    /// External booster scalar; 1.0 when no booster is active
    pub booster_multiplier: f64,
    /// The Stride tier's SC cap for the user's local day
    pub daily_cap: i64,
    /// Movement SC already credited today
    pub sc_earned_today: i64,
}

/// Per-segment slice of the breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentReward {
    pub mode: TransportMode,
    pub distance_m: f64,
    pub base_rate_per_100m: f64,
    pub class_multiplier: f64,
    /// `distance/100 × rate × class multiplier`
    pub sc: f64,
}

/// Full factor-by-factor account of one reward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardBreakdown {
    pub segments: Vec<SegmentReward>,
    /// Σ distance/100 × rate, before any multiplier
    pub base_sc: f64,
    /// Σ per-segment sc (base with class multipliers applied)
    pub transport_sc: f64,
    pub stride_multiplier: f64,
    pub day_segment: DaySegment,
    pub time_multiplier: f64,
    pub weather: Weather,
    pub weather_multiplier: f64,
    pub multi_transport_multiplier: f64,
    pub equipment_bonus_percent: f64,
    pub condition_multiplier: f64,
    pub flat_bonus_sc: i64,
    pub booster_multiplier: f64,
    /// Computed value before the daily cap, including flat bonus and booster
    pub uncapped_sc: i64,
    pub daily_cap: i64,
    pub sc_earned_today_before: i64,
    /// What the ledger actually credits
    pub credited_sc: i64,
}

/// Run the deterministic reward formula.
///
/// ```text
/// total = floor(Σ(dist/100 × rate × class) × stride × time × weather
///               × multi × (1 + equip/100) × condition) + flat
/// credited = min(floor(total × booster), remaining daily cap)
/// ```
pub fn compute_reward(inputs: &RewardInputs) -> RewardBreakdown {
    let segments: Vec<SegmentReward> = inputs
        .segments
        .iter()
        .map(|s| {
            let rate = s.mode.base_rate_per_100m();
            let class_multiplier = s.mode.reward_class().multiplier();
            SegmentReward {
                mode: s.mode,
                distance_m: s.distance_m,
                base_rate_per_100m: rate,
                class_multiplier,
                sc: s.distance_m / 100.0 * rate * class_multiplier,
            }
        })
        .collect();

    let base_sc: f64 = segments
        .iter()
        .map(|s| s.distance_m / 100.0 * s.base_rate_per_100m)
        .sum();
    let transport_sc: f64 = segments.iter().map(|s| s.sc).sum();

    let distinct_modes = {
        let mut modes: Vec<TransportMode> = inputs.segments.iter().map(|s| s.mode).collect();
        modes.sort_by_key(|m| *m as u8);
        modes.dedup();
        modes.len()
    };
    let multi_transport_multiplier = if distinct_modes >= 2 {
        MULTI_TRANSPORT_MULTIPLIER
    } else {
        1.0
    };

    let time_multiplier = inputs.day_segment.multiplier();
    let weather_multiplier = inputs.weather.multiplier();

    let product = transport_sc
        * inputs.stride_multiplier
        * time_multiplier
        * weather_multiplier
        * multi_transport_multiplier
        * (1.0 + inputs.equipment_bonus_percent / 100.0)
        * inputs.condition_multiplier;

    let total_sc = product.floor() as i64 + inputs.flat_bonus_sc;
    let uncapped_sc = ((total_sc as f64) * inputs.booster_multiplier).floor() as i64;

    let remaining_cap = (inputs.daily_cap - inputs.sc_earned_today).max(0);
    let credited_sc = uncapped_sc.clamp(0, remaining_cap);

    RewardBreakdown {
        segments,
        base_sc,
        transport_sc,
        stride_multiplier: inputs.stride_multiplier,
        day_segment: inputs.day_segment,
        time_multiplier,
        weather: inputs.weather,
        weather_multiplier,
        multi_transport_multiplier,
        equipment_bonus_percent: inputs.equipment_bonus_percent,
        condition_multiplier: inputs.condition_multiplier,
        flat_bonus_sc: inputs.flat_bonus_sc,
        booster_multiplier: inputs.booster_multiplier,
        uncapped_sc,
        daily_cap: inputs.daily_cap,
        sc_earned_today_before: inputs.sc_earned_today,
        credited_sc,
    }
}
