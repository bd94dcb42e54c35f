// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Condition and equipment modifier resolution.
//!
//! Read-only inputs to the reward pipeline: the character's stamina scales
//! rewards linearly down to a floor, and equipped cosmetics add a bonus
//! percent (per-item bonuses plus the category set bonus).

use crate::models::cosmetic::equipment_bonus_percent;
use crate::models::{CharacterState, CosmeticInstance, CosmeticTemplate};

/// Rewards never drop below half even at zero condition.
pub const MIN_CONDITION_MULTIPLIER: f64 = 0.5;

/// The pipeline's view of character and equipment state.
#[derive(Debug, Clone, Copy)]
pub struct ModifierBundle {
    pub condition_multiplier: f64,
    pub equipment_bonus_percent: f64,
}

/// Linear condition scaling, floored at [`MIN_CONDITION_MULTIPLIER`].
pub fn condition_multiplier(character: &CharacterState) -> f64 {
    if character.max_condition <= 0 {
        return MIN_CONDITION_MULTIPLIER;
    }
    let ratio = f64::from(character.condition) / f64::from(character.max_condition);
    ratio.clamp(MIN_CONDITION_MULTIPLIER, 1.0)
}

/// Resolve both modifiers for a user's current state.
pub fn resolve(
    character: &CharacterState,
    equipped: &[(&CosmeticInstance, &CosmeticTemplate)],
) -> ModifierBundle {
    ModifierBundle {
        condition_multiplier: condition_multiplier(character),
        equipment_bonus_percent: equipment_bonus_percent(equipped),
    }
}
