// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Economy actions: minting, enhancement gambles, weighted games, store
//! purchases, achievement claims, boosters, and equipment management.
//!
//! Every action runs inside one user scope (plus a supply scope where a
//! shared counter is touched), with all fallible checks and draws ordered
//! before the first write. Coin movement goes through [`EconomyLedger`]
//! exclusively.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::cosmetic::MAX_ENHANCE_LEVEL;
use crate::models::user::StoreEffect;
use crate::models::{
    Booster, CharacterState, CoinType, CosmeticInstance, SourceType, StatKind,
};
use crate::services::ledger::EconomyLedger;
use crate::services::outcome::{draw_outcome, success_roll, WeightedOutcome};
use crate::time_utils::format_utc_rfc3339;

/// MC cost to attempt an enhancement from level N to N+1.
const ENHANCE_COST_MC: [i64; MAX_ENHANCE_LEVEL as usize] = [10, 20, 40, 80, 160];
/// Success probability for an enhancement attempt from level N to N+1.
const ENHANCE_SUCCESS_PROBABILITY: [f64; MAX_ENHANCE_LEVEL as usize] =
    [0.9, 0.75, 0.55, 0.35, 0.2];

/// Stake bounds for weighted games.
const MIN_STAKE_SC: i64 = 1;
const MAX_STAKE_SC: i64 = 1_000;

/// Which weighted mini-game a spin plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Roulette,
    Slots,
}

impl GameKind {
    /// Payout table: effect is the stake multiplier.
    fn payout_table(self) -> &'static [WeightedOutcome<f64>] {
        match self {
            GameKind::Roulette => &[
                WeightedOutcome {
                    label: "miss",
                    weight: 40,
                    effect: 0.0,
                },
                WeightedOutcome {
                    label: "push",
                    weight: 25,
                    effect: 1.0,
                },
                WeightedOutcome {
                    label: "double",
                    weight: 20,
                    effect: 2.0,
                },
                WeightedOutcome {
                    label: "triple",
                    weight: 10,
                    effect: 3.0,
                },
                WeightedOutcome {
                    label: "jackpot",
                    weight: 5,
                    effect: 10.0,
                },
            ],
            GameKind::Slots => &[
                WeightedOutcome {
                    label: "blank",
                    weight: 55,
                    effect: 0.0,
                },
                WeightedOutcome {
                    label: "cherry",
                    weight: 25,
                    effect: 1.5,
                },
                WeightedOutcome {
                    label: "bar",
                    weight: 15,
                    effect: 3.0,
                },
                WeightedOutcome {
                    label: "seven",
                    weight: 5,
                    effect: 8.0,
                },
            ],
        }
    }
}

/// A claimable achievement and its requirement.
pub struct AchievementDef {
    pub code: &'static str,
    pub title: &'static str,
    pub reward_mc: i64,
    pub requirement: Requirement,
}

#[derive(Clone, Copy)]
pub enum Requirement {
    /// Lifetime validated distance (meters)
    LifetimeDistanceM(f64),
    /// Current streak at least this many days
    StreakDays(u32),
    /// At least this many cosmetics minted (owned)
    OwnedCosmetics(usize),
}

pub const ACHIEVEMENTS: [AchievementDef; 5] = [
    AchievementDef {
        code: "first_steps",
        title: "First Steps",
        reward_mc: 50,
        requirement: Requirement::LifetimeDistanceM(1_000.0),
    },
    AchievementDef {
        code: "ten_k_club",
        title: "10K Club",
        reward_mc: 100,
        requirement: Requirement::LifetimeDistanceM(10_000.0),
    },
    AchievementDef {
        code: "lifetime_marathon",
        title: "Lifetime Marathon",
        reward_mc: 300,
        requirement: Requirement::LifetimeDistanceM(42_195.0),
    },
    AchievementDef {
        code: "streak_7",
        title: "One Week Strong",
        reward_mc: 150,
        requirement: Requirement::StreakDays(7),
    },
    AchievementDef {
        code: "collector",
        title: "Collector",
        reward_mc: 120,
        requirement: Requirement::OwnedCosmetics(3),
    },
];

/// Result of a mint.
#[derive(Debug, Clone, Serialize)]
pub struct MintResult {
    pub instance: CosmeticInstance,
    pub new_mc_balance: i64,
}

/// Result of an enhancement attempt.
#[derive(Debug, Clone, Serialize)]
pub struct EnhancementResult {
    pub success: bool,
    pub new_enhance_level: u8,
    pub new_mc_balance: i64,
}

/// Result of one weighted-game spin.
#[derive(Debug, Clone, Serialize)]
pub struct SpinResult {
    pub outcome: String,
    pub stake_sc: i64,
    pub payout_sc: i64,
    pub new_sc_balance: i64,
}

/// Read-only booster view.
#[derive(Debug, Clone, Serialize)]
pub struct BoosterView {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

pub struct EconomyService {
    store: Arc<Store>,
    ledger: Arc<EconomyLedger>,
    config: Config,
}

impl EconomyService {
    pub fn new(store: Arc<Store>, ledger: Arc<EconomyLedger>, config: Config) -> Self {
        Self {
            store,
            ledger,
            config,
        }
    }

    // ─── Minting ─────────────────────────────────────────────────

    /// Mint one instance of a template for the user.
    ///
    /// The supply check and counter increment happen under the template's
    /// supply scope, so two concurrent mints against the last unit cannot
    /// both pass the ceiling.
    pub async fn mint_cosmetic(&self, user_id: u64, template_id: u32) -> Result<MintResult> {
        let user = self.store.user_scope(user_id).await?;
        if self.store.get_template(template_id).is_none() {
            return Err(AppError::NotFound(format!("template {template_id}")));
        }
        let supply = self.store.template_scope(template_id).await?;

        // Re-read under the supply scope; another mint may have just landed
        let mut template = self
            .store
            .get_template(template_id)
            .ok_or_else(|| AppError::NotFound(format!("template {template_id}")))?;
        if template.sold_out() {
            return Err(AppError::OutOfStock(format!(
                "template {} is minted out ({}/{})",
                template_id,
                template.minted_count,
                template.max_supply.unwrap_or(0)
            )));
        }

        let new_mc_balance = self.ledger.apply(
            &user,
            CoinType::Mc,
            -template.price_mc,
            SourceType::CosmeticMint,
            Some(template_id.to_string()),
            &format!("Mint: {}", template.name),
        )?;

        // Past the debit nothing can fail
        template.minted_count += 1;
        let instance = CosmeticInstance {
            id: self.store.next_instance_id(),
            template_id,
            owner_id: user_id,
            mint_number: template.minted_count,
            enhance_level: 0,
            is_equipped: false,
            equipped_slot: None,
        };
        self.store.put_template(&supply, template);
        self.store.put_instance(&user, instance.clone());

        tracing::info!(
            user_id,
            template_id,
            mint_number = instance.mint_number,
            "Cosmetic minted"
        );
        Ok(MintResult {
            instance,
            new_mc_balance,
        })
    }

    // ─── Enhancement gamble ──────────────────────────────────────

    /// Attempt to enhance an owned cosmetic one level.
    ///
    /// The cost is consumed whether or not the roll succeeds; a failed roll
    /// leaves the level unchanged. Debit and roll share one scope, so no
    /// partial charge can survive and a duplicate request cannot
    /// double-settle.
    pub async fn attempt_enhancement<R: Rng>(
        &self,
        user_id: u64,
        instance_id: u64,
        rng: &mut R,
    ) -> Result<EnhancementResult> {
        let scope = self.store.user_scope(user_id).await?;

        let mut instance = self
            .store
            .get_instance(instance_id)
            .filter(|i| i.owner_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("cosmetic instance {instance_id}")))?;
        if instance.enhance_level >= MAX_ENHANCE_LEVEL {
            return Err(AppError::AlreadyCompleted(format!(
                "instance {instance_id} is already at maximum enhancement"
            )));
        }

        let level = instance.enhance_level as usize;
        let cost = ENHANCE_COST_MC[level];
        let probability = ENHANCE_SUCCESS_PROBABILITY[level];

        // Draw before the debit; both precede any write
        let success = success_roll(probability, rng);

        let new_mc_balance = self.ledger.apply(
            &scope,
            CoinType::Mc,
            -cost,
            SourceType::EnhancementCost,
            Some(instance_id.to_string()),
            &format!("Enhancement attempt L{} → L{}", level, level + 1),
        )?;

        if success {
            instance.enhance_level += 1;
            self.store.put_instance(&scope, instance.clone());
        }

        tracing::info!(
            user_id,
            instance_id,
            success,
            new_level = instance.enhance_level,
            "Enhancement attempt settled"
        );
        Ok(EnhancementResult {
            success,
            new_enhance_level: instance.enhance_level,
            new_mc_balance,
        })
    }

    // ─── Weighted games ──────────────────────────────────────────

    /// Play one spin: stake debited, outcome drawn, payout credited, all in
    /// one scope.
    pub async fn spin<R: Rng>(
        &self,
        user_id: u64,
        game: GameKind,
        stake_sc: i64,
        rng: &mut R,
    ) -> Result<SpinResult> {
        if !(MIN_STAKE_SC..=MAX_STAKE_SC).contains(&stake_sc) {
            return Err(AppError::Validation(format!(
                "stake must be between {MIN_STAKE_SC} and {MAX_STAKE_SC} SC"
            )));
        }

        let scope = self.store.user_scope(user_id).await?;

        // Draw first: the only failure past this point would be the debit,
        // which settles the whole gamble as not-happened.
        let outcome = draw_outcome(game.payout_table(), rng)?;
        let payout_sc = ((stake_sc as f64) * outcome.effect).floor() as i64;

        let after_stake = self.ledger.apply(
            &scope,
            CoinType::Sc,
            -stake_sc,
            SourceType::GameStake,
            None,
            &format!("{game:?} stake"),
        )?;

        let new_sc_balance = if payout_sc > 0 {
            self.ledger.apply(
                &scope,
                CoinType::Sc,
                payout_sc,
                SourceType::GamePayout,
                None,
                &format!("{game:?} payout: {}", outcome.label),
            )?
        } else {
            after_stake
        };

        tracing::info!(
            user_id,
            game = ?game,
            stake_sc,
            payout_sc,
            outcome = outcome.label,
            "Spin settled"
        );
        Ok(SpinResult {
            outcome: outcome.label.to_string(),
            stake_sc,
            payout_sc,
            new_sc_balance,
        })
    }

    // ─── Store ───────────────────────────────────────────────────

    /// Purchase a store item; its effect lands atomically with the debit.
    pub async fn purchase_store_item(&self, user_id: u64, item_id: u32) -> Result<i64> {
        let user = self.store.user_scope(user_id).await?;
        if self.store.get_store_item(item_id).is_none() {
            return Err(AppError::NotFound(format!("store item {item_id}")));
        }
        let supply = self.store.store_item_scope(item_id).await?;

        let mut item = self
            .store
            .get_store_item(item_id)
            .ok_or_else(|| AppError::NotFound(format!("store item {item_id}")))?;
        if item.sold_out() {
            return Err(AppError::OutOfStock(format!(
                "store item {} is sold out",
                item.name
            )));
        }

        let new_mc_balance = self.ledger.apply(
            &user,
            CoinType::Mc,
            -item.price_mc,
            SourceType::StorePurchase,
            Some(item_id.to_string()),
            &format!("Store: {}", item.name),
        )?;

        item.sold_count += 1;
        let effect = item.effect;
        self.store.put_store_item(&supply, item);

        match effect {
            StoreEffect::StreakShield(count) => {
                let mut stride = self
                    .store
                    .get_stride(user_id)
                    .ok_or_else(|| AppError::NotFound(format!("stride state for user {user_id}")))?;
                stride.shield_count += count;
                self.store.put_stride(&user, stride);
            }
            StoreEffect::ConditionFeed(amount) => {
                let mut character = self.store.get_character(user_id).ok_or_else(|| {
                    AppError::NotFound(format!("character for user {user_id}"))
                })?;
                character.restore_condition(amount);
                self.store.put_character(&user, character);
            }
        }

        tracing::info!(user_id, item_id, "Store purchase settled");
        Ok(new_mc_balance)
    }

    // ─── Achievements ────────────────────────────────────────────

    /// Claim an achievement: must exist, be completed, and not be claimed yet.
    pub async fn claim_achievement(&self, user_id: u64, code: &str) -> Result<i64> {
        let def = ACHIEVEMENTS
            .iter()
            .find(|a| a.code == code)
            .ok_or_else(|| AppError::NotFound(format!("achievement {code}")))?;

        let scope = self.store.user_scope(user_id).await?;
        if self.store.has_claimed_achievement(user_id, code) {
            return Err(AppError::AlreadyClaimed(format!(
                "achievement {code} was already claimed"
            )));
        }

        let completed = match def.requirement {
            Requirement::LifetimeDistanceM(required) => self
                .store
                .get_stride(user_id)
                .is_some_and(|s| s.total_distance_m >= required),
            Requirement::StreakDays(required) => self
                .store
                .get_stride(user_id)
                .is_some_and(|s| s.current_streak_days >= required),
            Requirement::OwnedCosmetics(required) => {
                self.store.instances_of(user_id).len() >= required
            }
        };
        if !completed {
            return Err(AppError::Validation(format!(
                "achievement {code} is not completed yet"
            )));
        }

        let new_mc_balance = self.ledger.apply(
            &scope,
            CoinType::Mc,
            def.reward_mc,
            SourceType::AchievementReward,
            Some(code.to_string()),
            &format!("Achievement: {}", def.title),
        )?;
        self.store.record_achievement_claim(&scope, code);

        tracing::info!(user_id, code, reward_mc = def.reward_mc, "Achievement claimed");
        Ok(new_mc_balance)
    }

    // ─── Boosters ────────────────────────────────────────────────

    /// Redeem a booster code for a time-boxed final-scalar multiplier.
    pub async fn redeem_booster(
        &self,
        user_id: u64,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Booster> {
        let def = self
            .config
            .booster_code(code)
            .ok_or_else(|| AppError::NotFound(format!("booster code {code}")))?
            .clone();

        let scope = self.store.user_scope(user_id).await?;
        if self.store.has_redeemed_code(user_id, &def.code) {
            return Err(AppError::AlreadyClaimed(format!(
                "booster code {} was already redeemed",
                def.code
            )));
        }
        let now_iso = format_utc_rfc3339(now);
        if self
            .store
            .get_booster(user_id)
            .is_some_and(|b| b.expires_at > now_iso)
        {
            return Err(AppError::ConflictingActiveResource(
                "a booster is already active".to_string(),
            ));
        }

        let booster = Booster {
            user_id,
            code: def.code.clone(),
            multiplier: def.multiplier,
            expires_at: format_utc_rfc3339(now + Duration::minutes(def.duration_minutes)),
        };
        self.store.put_booster(&scope, booster.clone());
        self.store.record_code_redemption(&scope, &def.code);

        tracing::info!(user_id, code = %def.code, "Booster redeemed");
        Ok(booster)
    }

    /// Read-only view of the user's booster, if one is active.
    pub fn get_active_booster(&self, user_id: u64, now: DateTime<Utc>) -> BoosterView {
        let now_iso = format_utc_rfc3339(now);
        match self.store.get_booster(user_id) {
            Some(b) if b.expires_at > now_iso => BoosterView {
                active: true,
                multiplier: Some(b.multiplier),
                expires_at: Some(b.expires_at),
            },
            _ => BoosterView {
                active: false,
                multiplier: None,
                expires_at: None,
            },
        }
    }

    // ─── Equipment ───────────────────────────────────────────────

    /// Equip an owned cosmetic into its category slot, swapping out whatever
    /// currently occupies that slot.
    pub async fn equip_cosmetic(&self, user_id: u64, instance_id: u64) -> Result<CosmeticInstance> {
        let scope = self.store.user_scope(user_id).await?;

        let mut instance = self
            .store
            .get_instance(instance_id)
            .filter(|i| i.owner_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("cosmetic instance {instance_id}")))?;
        let template = self
            .store
            .get_template(instance.template_id)
            .ok_or_else(|| AppError::NotFound(format!("template {}", instance.template_id)))?;

        for (mut other, other_template) in self.store.equipped_with_templates(user_id) {
            if other.id != instance_id && other_template.category == template.category {
                other.is_equipped = false;
                other.equipped_slot = None;
                self.store.put_instance(&scope, other);
            }
        }

        instance.is_equipped = true;
        instance.equipped_slot = Some(template.category);
        self.store.put_instance(&scope, instance.clone());
        Ok(instance)
    }

    pub async fn unequip_cosmetic(
        &self,
        user_id: u64,
        instance_id: u64,
    ) -> Result<CosmeticInstance> {
        let scope = self.store.user_scope(user_id).await?;

        let mut instance = self
            .store
            .get_instance(instance_id)
            .filter(|i| i.owner_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("cosmetic instance {instance_id}")))?;
        instance.is_equipped = false;
        instance.equipped_slot = None;
        self.store.put_instance(&scope, instance.clone());
        Ok(instance)
    }

    // ─── Character actions ───────────────────────────────────────

    /// Spend banked exp on one level and one stat point.
    pub async fn level_up(&self, user_id: u64, stat: StatKind) -> Result<CharacterState> {
        let scope = self.store.user_scope(user_id).await?;
        let mut character = self
            .store
            .get_character(user_id)
            .ok_or_else(|| AppError::NotFound(format!("character for user {user_id}")))?;

        if !character.level_up(stat) {
            return Err(AppError::Validation(format!(
                "not enough exp: {}/{} banked",
                character.exp, character.exp_to_next
            )));
        }
        self.store.put_character(&scope, character.clone());
        Ok(character)
    }

    /// Feed the character (QR decoding happens client-side; the core only
    /// applies the restoration).
    pub async fn feed_character(&self, user_id: u64) -> Result<CharacterState> {
        let scope = self.store.user_scope(user_id).await?;
        let mut character = self
            .store
            .get_character(user_id)
            .ok_or_else(|| AppError::NotFound(format!("character for user {user_id}")))?;
        character.restore_condition(self.config.feed_restore_amount);
        self.store.put_character(&scope, character.clone());
        Ok(character)
    }
}
