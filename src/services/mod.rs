// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod economy;
pub mod ledger;
pub mod modifier;
pub mod movement;
pub mod outcome;
pub mod reward;
pub mod trajectory;

pub use economy::{EconomyService, GameKind};
pub use ledger::EconomyLedger;
pub use movement::{CompletionResult, MovementService, SegmentUpload};
pub use outcome::{draw_outcome, success_roll, WeightedOutcome};
pub use reward::{compute_reward, DaySegment, RewardBreakdown, Weather};
pub use trajectory::{haversine_m, validate_track, ValidatedTrack};
