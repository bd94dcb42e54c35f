// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supply-ceiling race: concurrent mints of the last unit must produce
//! exactly one success.

use stridecoin::models::cosmetic::CosmeticCategory;
use stridecoin::models::CosmeticTemplate;

mod common;

const LIMITED_TEMPLATE_ID: u32 = 900;

#[tokio::test]
async fn concurrent_mints_cannot_exceed_max_supply_one() {
    let state = common::test_state();
    state.store.insert_template(CosmeticTemplate {
        id: LIMITED_TEMPLATE_ID,
        name: "One of One".to_string(),
        category: CosmeticCategory::Accessory,
        max_supply: Some(1),
        minted_count: 0,
        price_mc: 10,
        base_bonus_percent: 5.0,
        per_level_bonus_percent: 1.0,
    });

    // Two different users, both funded, racing for the single unit
    common::fund_user(&state, 1, 0, 100).await;
    common::fund_user(&state, 2, 0, 100).await;

    let a = {
        let state = state.clone();
        tokio::spawn(async move {
            state
                .economy_service
                .mint_cosmetic(1, LIMITED_TEMPLATE_ID)
                .await
        })
    };
    let b = {
        let state = state.clone();
        tokio::spawn(async move {
            state
                .economy_service
                .mint_cosmetic(2, LIMITED_TEMPLATE_ID)
                .await
        })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let out_of_stock = results
        .iter()
        .filter(|r| {
            r.as_ref()
                .err()
                .is_some_and(|e| e.kind() == "out_of_stock")
        })
        .count();

    assert_eq!(successes, 1, "exactly one mint must win the last unit");
    assert_eq!(out_of_stock, 1, "the loser must see out_of_stock");

    let template = state.store.get_template(LIMITED_TEMPLATE_ID).unwrap();
    assert_eq!(template.minted_count, 1);

    // The losing user was not charged
    let winner = results.iter().flatten().next().unwrap();
    let loser_id = if winner.instance.owner_id == 1 { 2 } else { 1 };
    assert_eq!(state.store.get_balance(loser_id).unwrap().mc_balance, 100);
    assert_eq!(
        state
            .store
            .get_balance(winner.instance.owner_id)
            .unwrap()
            .mc_balance,
        90
    );
}

#[tokio::test]
async fn sequential_mints_assign_unique_ascending_mint_numbers() {
    let state = common::test_state();
    state.store.insert_template(CosmeticTemplate {
        id: LIMITED_TEMPLATE_ID,
        name: "Short Run".to_string(),
        category: CosmeticCategory::Accessory,
        max_supply: Some(3),
        minted_count: 0,
        price_mc: 10,
        base_bonus_percent: 5.0,
        per_level_bonus_percent: 1.0,
    });
    common::fund_user(&state, 1, 0, 100).await;

    for expected_number in 1..=3u32 {
        let result = state
            .economy_service
            .mint_cosmetic(1, LIMITED_TEMPLATE_ID)
            .await
            .unwrap();
        assert_eq!(result.instance.mint_number, expected_number);
    }

    let err = state
        .economy_service
        .mint_cosmetic(1, LIMITED_TEMPLATE_ID)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "out_of_stock");
}
