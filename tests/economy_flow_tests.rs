// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Economy action flows: enhancement settlement, spins, store purchases,
//! achievement claims, and booster redemption.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use stridecoin::config::{BoosterCode, Config};
use stridecoin::models::{CoinType, StatKind};
use stridecoin::services::economy::GameKind;
use stridecoin::AppState;

mod common;

/// RNG that repeats one fixed word, pinning `success_roll` outcomes:
/// 0 ⇒ certain success, `u64::MAX` ⇒ certain failure.
struct FixedRng(u64);

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        self.0 as u32
    }
    fn next_u64(&mut self) -> u64 {
        self.0
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.0.to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

async fn minted_instance(state: &Arc<AppState>, user_id: u64) -> u64 {
    common::fund_user(state, user_id, 0, 10_000).await;
    state
        .economy_service
        .mint_cosmetic(user_id, 1)
        .await
        .unwrap()
        .instance
        .id
}

#[tokio::test]
async fn successful_enhancement_charges_and_levels() {
    let state = common::test_state();
    let instance_id = minted_instance(&state, 1).await;
    let mc_before = state.store.get_balance(1).unwrap().mc_balance;

    let mut rng = FixedRng(0); // certain success
    let result = state
        .economy_service
        .attempt_enhancement(1, instance_id, &mut rng)
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.new_enhance_level, 1);
    // Level 0 → 1 costs 10 MC
    assert_eq!(result.new_mc_balance, mc_before - 10);
    assert_eq!(
        state.store.get_instance(instance_id).unwrap().enhance_level,
        1
    );
}

#[tokio::test]
async fn failed_enhancement_charges_but_keeps_the_level() {
    let state = common::test_state();
    let instance_id = minted_instance(&state, 1).await;
    let mc_before = state.store.get_balance(1).unwrap().mc_balance;

    let mut rng = FixedRng(u64::MAX); // certain failure
    let result = state
        .economy_service
        .attempt_enhancement(1, instance_id, &mut rng)
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.new_enhance_level, 0);
    assert_eq!(result.new_mc_balance, mc_before - 10);
    assert_eq!(
        state.store.get_instance(instance_id).unwrap().enhance_level,
        0
    );
}

#[tokio::test]
async fn broke_user_cannot_be_partially_charged_for_enhancement() {
    let state = common::test_state();
    let instance_id = minted_instance(&state, 1).await;

    // Drain MC to zero through the ledger
    let balance = state.store.get_balance(1).unwrap().mc_balance;
    state
        .ledger
        .apply_entry(
            1,
            CoinType::Mc,
            -balance,
            stridecoin::models::SourceType::StorePurchase,
            None,
            "drain for test",
        )
        .await
        .unwrap();

    let transactions_before = state.store.all_transactions(1).len();
    let mut rng = FixedRng(0);
    let err = state
        .economy_service
        .attempt_enhancement(1, instance_id, &mut rng)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "insufficient_funds");
    assert_eq!(state.store.all_transactions(1).len(), transactions_before);
    assert_eq!(
        state.store.get_instance(instance_id).unwrap().enhance_level,
        0
    );
}

#[tokio::test]
async fn maxed_instance_cannot_be_enhanced() {
    let state = common::test_state();
    let instance_id = minted_instance(&state, 1).await;

    // Push to the cap with guaranteed successes
    let mut rng = FixedRng(0);
    for _ in 0..5 {
        state
            .economy_service
            .attempt_enhancement(1, instance_id, &mut rng)
            .await
            .unwrap();
    }

    let err = state
        .economy_service
        .attempt_enhancement(1, instance_id, &mut rng)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "already_completed");
}

#[tokio::test]
async fn spin_settles_stake_and_payout_atomically() {
    let state = common::test_state();
    common::fund_user(&state, 1, 1_000, 0).await;
    let mut rng = ChaCha20Rng::from_seed([5u8; 32]);

    for _ in 0..20 {
        let before = state.store.get_balance(1).unwrap().sc_balance;
        let result = state
            .economy_service
            .spin(1, GameKind::Roulette, 50, &mut rng)
            .await
            .unwrap();

        assert_eq!(result.new_sc_balance, before - 50 + result.payout_sc);
        assert_eq!(
            state.ledger.replayed_balance(1, CoinType::Sc),
            result.new_sc_balance
        );
    }
}

#[tokio::test]
async fn spin_with_insufficient_funds_changes_nothing() {
    let state = common::test_state();
    common::fund_user(&state, 1, 10, 0).await;
    let mut rng = ChaCha20Rng::from_seed([5u8; 32]);

    let err = state
        .economy_service
        .spin(1, GameKind::Slots, 50, &mut rng)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "insufficient_funds");
    assert_eq!(state.store.get_balance(1).unwrap().sc_balance, 10);
}

#[tokio::test]
async fn store_purchase_applies_effects_with_the_debit() {
    let state = common::test_state();
    common::fund_user(&state, 1, 0, 1_000).await;

    // Item 1: one streak shield
    state
        .economy_service
        .purchase_store_item(1, 1)
        .await
        .unwrap();
    assert_eq!(state.store.get_stride(1).unwrap().shield_count, 1);

    // Item 2: condition feed; drain first so the restore is visible
    {
        let scope = state.store.user_scope(1).await.unwrap();
        let mut character = state.store.get_character(1).unwrap();
        character.drain_condition(50);
        state.store.put_character(&scope, character);
    }
    state
        .economy_service
        .purchase_store_item(1, 2)
        .await
        .unwrap();
    assert_eq!(state.store.get_character(1).unwrap().condition, 80);

    assert_eq!(
        state.store.get_balance(1).unwrap().mc_balance,
        1_000 - 100 - 20
    );
}

#[tokio::test]
async fn stock_limited_item_sells_out() {
    let state = common::test_state();
    common::fund_user(&state, 1, 0, 10_000).await;

    // Item 3 ships with stock 500; pin it to 1 for the test
    {
        let scope = state.store.store_item_scope(3).await.unwrap();
        let mut item = state.store.get_store_item(3).unwrap();
        item.stock = Some(1);
        state.store.put_store_item(&scope, item);
    }

    state
        .economy_service
        .purchase_store_item(1, 3)
        .await
        .unwrap();
    let err = state
        .economy_service
        .purchase_store_item(1, 3)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "out_of_stock");
}

#[tokio::test]
async fn achievement_claim_lifecycle() {
    let state = common::test_state();
    common::fund_user(&state, 1, 0, 0).await;

    // Unknown code
    let err = state
        .economy_service
        .claim_achievement(1, "no_such_badge")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");

    // Known but not completed yet
    let err = state
        .economy_service
        .claim_achievement(1, "first_steps")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation_error");

    // Complete the requirement (1 km lifetime distance)
    {
        let scope = state.store.user_scope(1).await.unwrap();
        let mut stride = state.store.get_stride(1).unwrap();
        stride.total_distance_m = 1_500.0;
        state.store.put_stride(&scope, stride);
    }

    let new_balance = state
        .economy_service
        .claim_achievement(1, "first_steps")
        .await
        .unwrap();
    assert_eq!(new_balance, 50);

    // Double claim
    let err = state
        .economy_service
        .claim_achievement(1, "first_steps")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "already_claimed");
}

#[tokio::test]
async fn booster_redemption_guards() {
    let mut config = Config::test_default();
    config.booster_codes.push(BoosterCode {
        code: "SECOND15".to_string(),
        multiplier: 1.5,
        duration_minutes: 30,
    });
    let state = Arc::new(AppState::new(config));
    common::fund_user(&state, 1, 0, 0).await;

    let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let booster = state
        .economy_service
        .redeem_booster(1, "KICKOFF2X", now)
        .await
        .unwrap();
    assert_eq!(booster.multiplier, 2.0);
    assert!(state.economy_service.get_active_booster(1, now).active);

    // A second code while one is active
    let err = state
        .economy_service
        .redeem_booster(1, "SECOND15", now)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "conflicting_active_resource");

    // After expiry the same code cannot be redeemed again
    let later = now + Duration::hours(2);
    assert!(!state.economy_service.get_active_booster(1, later).active);
    let err = state
        .economy_service
        .redeem_booster(1, "KICKOFF2X", later)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "already_claimed");

    // But a fresh code works
    let booster = state
        .economy_service
        .redeem_booster(1, "SECOND15", later)
        .await
        .unwrap();
    assert_eq!(booster.multiplier, 1.5);
}

#[tokio::test]
async fn level_up_spends_banked_exp() {
    let state = common::test_state();
    common::fund_user(&state, 1, 0, 0).await;

    // Not enough exp yet
    let err = state
        .economy_service
        .level_up(1, StatKind::Endurance)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation_error");

    {
        let scope = state.store.user_scope(1).await.unwrap();
        let mut character = state.store.get_character(1).unwrap();
        character.grant_exp(150);
        state.store.put_character(&scope, character);
    }

    let character = state
        .economy_service
        .level_up(1, StatKind::Endurance)
        .await
        .unwrap();
    assert_eq!(character.level, 2);
    assert_eq!(character.stats.endurance, 1);
    assert_eq!(character.exp, 50);
}

#[tokio::test]
async fn equipping_swaps_within_a_slot() {
    let state = common::test_state();
    common::fund_user(&state, 1, 0, 10_000).await;

    // Two headwear instances (template 1), one footwear (template 3)
    let first_hat = state
        .economy_service
        .mint_cosmetic(1, 1)
        .await
        .unwrap()
        .instance
        .id;
    let second_hat = state
        .economy_service
        .mint_cosmetic(1, 1)
        .await
        .unwrap()
        .instance
        .id;
    let shoes = state
        .economy_service
        .mint_cosmetic(1, 3)
        .await
        .unwrap()
        .instance
        .id;

    state.economy_service.equip_cosmetic(1, first_hat).await.unwrap();
    state.economy_service.equip_cosmetic(1, shoes).await.unwrap();
    state
        .economy_service
        .equip_cosmetic(1, second_hat)
        .await
        .unwrap();

    // The first hat was swapped out; two items remain equipped
    assert!(!state.store.get_instance(first_hat).unwrap().is_equipped);
    assert!(state.store.get_instance(second_hat).unwrap().is_equipped);
    assert!(state.store.get_instance(shoes).unwrap().is_equipped);
    assert_eq!(state.store.equipped_with_templates(1).len(), 2);
}
