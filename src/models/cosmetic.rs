// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cosmetic templates, minted instances, and the equipment bonus.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Slot category a cosmetic occupies when equipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CosmeticCategory {
    Headwear,
    Outfit,
    Footwear,
    Accessory,
}

/// Maximum enhancement level an instance can reach.
pub const MAX_ENHANCE_LEVEL: u8 = 5;

/// Set bonus (percent) for equipping 2 distinct categories.
const SET_BONUS_TIER1_PERCENT: f64 = 5.0;
/// Set bonus (percent) for equipping 3 or more distinct categories.
const SET_BONUS_TIER2_PERCENT: f64 = 12.0;

/// A mintable cosmetic design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosmeticTemplate {
    pub id: u32,
    pub name: String,
    pub category: CosmeticCategory,
    /// `None` means unlimited supply
    pub max_supply: Option<u32>,
    pub minted_count: u32,
    pub price_mc: i64,
    /// Bonus percent at enhancement level 0
    pub base_bonus_percent: f64,
    /// Additional bonus percent per enhancement level
    pub per_level_bonus_percent: f64,
}

impl CosmeticTemplate {
    /// Whether another mint would exceed the supply ceiling.
    pub fn sold_out(&self) -> bool {
        match self.max_supply {
            Some(max) => self.minted_count >= max,
            None => false,
        }
    }
}

/// A minted, owned cosmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosmeticInstance {
    pub id: u64,
    pub template_id: u32,
    pub owner_id: u64,
    /// Assigned as the template's minted count after increment; unique per template
    pub mint_number: u32,
    pub enhance_level: u8,
    pub is_equipped: bool,
    pub equipped_slot: Option<CosmeticCategory>,
}

impl CosmeticInstance {
    /// Bonus percent contributed by this instance when equipped.
    pub fn bonus_percent(&self, template: &CosmeticTemplate) -> f64 {
        template.base_bonus_percent
            + f64::from(self.enhance_level) * template.per_level_bonus_percent
    }
}

/// Total equipment bonus percent for a set of equipped instances.
///
/// Sum of each instance's own bonus, plus a discrete set bonus keyed by the
/// number of distinct equipped categories. Only the highest set tier applies.
pub fn equipment_bonus_percent(equipped: &[(&CosmeticInstance, &CosmeticTemplate)]) -> f64 {
    let item_bonus: f64 = equipped
        .iter()
        .map(|(instance, template)| instance.bonus_percent(template))
        .sum();

    let distinct_categories: HashSet<CosmeticCategory> = equipped
        .iter()
        .map(|(_, template)| template.category)
        .collect();

    let set_bonus = match distinct_categories.len() {
        0 | 1 => 0.0,
        2 => SET_BONUS_TIER1_PERCENT,
        _ => SET_BONUS_TIER2_PERCENT,
    };

    item_bonus + set_bonus
}

/// Catalog seeded at startup; admins can add more at runtime.
pub fn default_templates() -> Vec<CosmeticTemplate> {
    vec![
        CosmeticTemplate {
            id: 1,
            name: "Canvas Cap".to_string(),
            category: CosmeticCategory::Headwear,
            max_supply: None,
            minted_count: 0,
            price_mc: 50,
            base_bonus_percent: 2.0,
            per_level_bonus_percent: 1.0,
        },
        CosmeticTemplate {
            id: 2,
            name: "Trail Windbreaker".to_string(),
            category: CosmeticCategory::Outfit,
            max_supply: None,
            minted_count: 0,
            price_mc: 80,
            base_bonus_percent: 3.0,
            per_level_bonus_percent: 1.5,
        },
        CosmeticTemplate {
            id: 3,
            name: "Featherlight Runners".to_string(),
            category: CosmeticCategory::Footwear,
            max_supply: None,
            minted_count: 0,
            price_mc: 80,
            base_bonus_percent: 3.0,
            per_level_bonus_percent: 1.5,
        },
        CosmeticTemplate {
            id: 4,
            name: "Golden Pedometer".to_string(),
            category: CosmeticCategory::Accessory,
            max_supply: Some(100),
            minted_count: 0,
            price_mc: 500,
            base_bonus_percent: 8.0,
            per_level_bonus_percent: 2.0,
        },
    ]
}
