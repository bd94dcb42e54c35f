// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod character;
pub mod coin;
pub mod cosmetic;
pub mod movement;
pub mod stride;
pub mod transport;
pub mod user;

pub use character::{CharacterState, StatKind};
pub use coin::{CoinBalance, CoinTransaction, CoinType, SourceType};
pub use cosmetic::{CosmeticCategory, CosmeticInstance, CosmeticTemplate};
pub use movement::{GpsPoint, Movement, MovementSegment, MovementStatus};
pub use stride::{StrideState, StrideTier};
pub use transport::{RewardClass, TransportMode};
pub use user::{Booster, StoreItem, UserProfile};
