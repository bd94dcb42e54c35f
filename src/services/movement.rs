// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Movement lifecycle service.
//!
//! Handles the core workflow:
//! 1. Start a movement (cancelling any prior active one)
//! 2. On completion, validate raw GPS per segment
//! 3. Classify transport plausibility (diagnostic only)
//! 4. Update streak, resolve modifiers, run the reward pipeline
//! 5. Credit the capped amount through the ledger
//!
//! All completion writes happen inside one user scope; every fallible step
//! runs before the first write, so a failed completion changes nothing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::movement::{Movement, MovementSegment, MovementStatus};
use crate::models::stride::StreakUpdate;
use crate::models::{CoinType, GpsPoint, SourceType, TransportMode};
use crate::services::ledger::EconomyLedger;
use crate::services::modifier;
use crate::services::reward::{
    compute_reward, DaySegment, RewardBreakdown, RewardInputs, SegmentInput, Weather,
};
use crate::services::trajectory::validate_track;
use crate::time_utils::{format_utc_rfc3339, local_day, local_hour};

/// One segment of raw telemetry submitted at completion.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentUpload {
    pub transport_mode: TransportMode,
    pub points: Vec<GpsPoint>,
}

/// Completion outcome returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionResult {
    pub movement_id: u64,
    /// SC actually credited (after the daily cap)
    pub total_sc: i64,
    pub new_sc_balance: i64,
    pub reward_breakdown: RewardBreakdown,
    pub streak_update: Option<StreakUpdate>,
    pub current_streak_days: u32,
    /// Segments whose average speed fell outside the declared mode's band
    pub out_of_band_segments: u32,
    /// Consecutive-point jumps excluded from the distance
    pub anomaly_count: u32,
    pub exp_granted: i64,
}

pub struct MovementService {
    store: Arc<Store>,
    ledger: Arc<EconomyLedger>,
    config: Config,
}

impl MovementService {
    pub fn new(store: Arc<Store>, ledger: Arc<EconomyLedger>, config: Config) -> Self {
        Self {
            store,
            ledger,
            config,
        }
    }

    /// Start a movement for a user, atomically cancelling any prior active
    /// one. Returns the new movement id.
    pub async fn start_movement(
        &self,
        user_id: u64,
        transport_mode: TransportMode,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let scope = self.store.user_scope(user_id).await?;
        let now_iso = format_utc_rfc3339(now);

        if let Some(prior_id) = self.store.active_movement_id(user_id) {
            if let Some(mut prior) = self.store.get_movement(prior_id) {
                if prior.status == MovementStatus::Active {
                    prior.status = MovementStatus::Cancelled;
                    prior.completed_at = Some(now_iso.clone());
                    self.store.put_movement(&scope, prior);
                    tracing::info!(user_id, prior_id, "Cancelled prior active movement");
                }
            }
        }

        let movement = Movement {
            id: self.store.next_movement_id(),
            user_id,
            status: MovementStatus::Active,
            declared_mode: transport_mode,
            started_at: now_iso,
            completed_at: None,
            segments: Vec::new(),
            total_distance_m: 0.0,
            total_duration_s: 0.0,
            reward_breakdown: None,
        };
        let movement_id = movement.id;
        self.store.put_movement(&scope, movement);
        self.store.set_active_movement(&scope, movement_id);

        tracing::info!(user_id, movement_id, mode = ?transport_mode, "Movement started");
        Ok(movement_id)
    }

    /// Complete a movement: validator → classifier → stride → modifiers →
    /// reward pipeline → ledger, in one user scope.
    pub async fn complete_movement(
        &self,
        user_id: u64,
        movement_id: u64,
        uploads: &[SegmentUpload],
        weather: Weather,
        now: DateTime<Utc>,
    ) -> Result<CompletionResult> {
        let scope = self.store.user_scope(user_id).await?;

        let mut movement = self
            .store
            .get_movement(movement_id)
            .filter(|m| m.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("movement {movement_id}")))?;
        if movement.is_terminal() {
            return Err(AppError::AlreadyCompleted(format!(
                "movement {movement_id} is no longer active"
            )));
        }

        let profile = self
            .store
            .get_profile(user_id)
            .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;
        let mut character = self
            .store
            .get_character(user_id)
            .ok_or_else(|| AppError::NotFound(format!("character for user {user_id}")))?;
        let mut stride = self
            .store
            .get_stride(user_id)
            .ok_or_else(|| AppError::NotFound(format!("stride state for user {user_id}")))?;

        // 1. Validate raw telemetry per segment
        let mut segments = Vec::with_capacity(uploads.len());
        let mut anomaly_count = 0u32;
        let mut out_of_band = 0u32;
        for upload in uploads {
            let track = validate_track(
                &upload.points,
                self.config.max_jump_m,
                self.config.min_accuracy_m,
            );
            anomaly_count += track.anomalies.len() as u32;

            let avg_speed_kmh = track.avg_speed_kmh();
            if track.distance_m > 0.0 && !upload.transport_mode.speed_plausible(avg_speed_kmh) {
                out_of_band += 1;
            }

            segments.push(MovementSegment {
                transport_mode: upload.transport_mode,
                distance_m: track.distance_m,
                duration_s: track.duration_s,
                avg_speed_kmh,
            });
        }

        let total_distance_m: f64 = segments.iter().map(|s| s.distance_m).sum();
        let total_duration_s: f64 = segments.iter().map(|s| s.duration_s).sum();

        if out_of_band > 0 {
            // Tolerated: consumer GPS is noisy. Surfaced, never rejected.
            tracing::warn!(
                user_id,
                movement_id,
                out_of_band,
                "Segment speed outside declared mode band"
            );
        }

        // 2. Streak update on the first qualifying movement of the local day
        let today = local_day(now, profile.tz_offset_minutes);
        let qualifying = total_distance_m >= self.config.qualifying_distance_m;
        let streak_update = if qualifying {
            Some(stride.register_active_day(today))
        } else {
            None
        };
        stride.total_distance_m += total_distance_m;

        let first_move_today =
            matches!(streak_update, Some(update) if update != StreakUpdate::AlreadyCounted);
        let tier = stride.tier();

        // 3. Modifiers and context
        let equipped = self.store.equipped_with_templates(user_id);
        let equipped_refs: Vec<_> = equipped.iter().map(|(i, t)| (i, t)).collect();
        let modifiers = modifier::resolve(&character, &equipped_refs);

        let booster_multiplier = self
            .store
            .get_booster(user_id)
            .filter(|b| b.expires_at > format_utc_rfc3339(now))
            .map_or(1.0, |b| b.multiplier);

        // 4. Deterministic reward computation
        let inputs = RewardInputs {
            segments: segments
                .iter()
                .map(|s| SegmentInput {
                    mode: s.transport_mode,
                    distance_m: s.distance_m,
                })
                .collect(),
            stride_multiplier: tier.multiplier,
            day_segment: DaySegment::from_local_hour(local_hour(now, profile.tz_offset_minutes)),
            weather,
            equipment_bonus_percent: modifiers.equipment_bonus_percent,
            condition_multiplier: modifiers.condition_multiplier,
            flat_bonus_sc: if first_move_today {
                self.config.daily_first_move_bonus_sc
            } else {
                0
            },
            booster_multiplier,
            daily_cap: tier.daily_cap,
            sc_earned_today: self.store.sc_earned_on(user_id, today),
        };
        let breakdown = compute_reward(&inputs);

        // 5. Credit through the ledger, then persist everything.
        //    The ledger call is the last fallible step.
        let new_sc_balance = if breakdown.credited_sc > 0 {
            self.ledger.apply(
                &scope,
                CoinType::Sc,
                breakdown.credited_sc,
                SourceType::MovementReward,
                Some(movement_id.to_string()),
                "Movement reward",
            )?
        } else {
            self.store
                .get_balance(user_id)
                .map(|b| b.sc_balance)
                .unwrap_or(0)
        };
        self.store.add_sc_earned(&scope, today, breakdown.credited_sc);

        let exp_granted = (total_distance_m / 100.0).floor() as i64 * self.config.exp_per_100m;
        character.grant_exp(exp_granted);
        let drain = (total_distance_m / 1000.0).ceil() as i32 * self.config.condition_drain_per_km;
        character.drain_condition(drain);
        self.store.put_character(&scope, character);

        let current_streak_days = stride.current_streak_days;
        self.store.put_stride(&scope, stride);

        movement.status = MovementStatus::Completed;
        movement.completed_at = Some(format_utc_rfc3339(now));
        movement.segments = segments;
        movement.total_distance_m = total_distance_m;
        movement.total_duration_s = total_duration_s;
        movement.reward_breakdown = Some(breakdown.clone());
        self.store.put_movement(&scope, movement);
        self.store.clear_active_movement(&scope);

        tracing::info!(
            user_id,
            movement_id,
            distance_m = total_distance_m,
            credited_sc = breakdown.credited_sc,
            uncapped_sc = breakdown.uncapped_sc,
            anomaly_count,
            "Movement completed"
        );

        Ok(CompletionResult {
            movement_id,
            total_sc: breakdown.credited_sc,
            new_sc_balance,
            reward_breakdown: breakdown,
            streak_update,
            current_streak_days,
            out_of_band_segments: out_of_band,
            anomaly_count,
            exp_granted,
        })
    }
}
