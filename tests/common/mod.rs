// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::Arc;

use stridecoin::config::Config;
use stridecoin::middleware::auth::create_jwt;
use stridecoin::routes::create_router;
use stridecoin::AppState;

/// Create a test app with an in-process store and seeded catalogs.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = test_state();
    (create_router(state.clone()), state)
}

/// Shared state only, for tests that drive the services directly.
#[allow(dead_code)]
pub fn test_state() -> Arc<AppState> {
    Arc::new(AppState::new(Config::test_default()))
}

/// Create a test JWT signed with the test config's key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: u64, signing_key: &[u8]) -> String {
    create_jwt(user_id, None, signing_key).expect("Failed to sign test JWT")
}

/// Create a test JWT carrying an email claim (admin tests).
#[allow(dead_code)]
pub fn create_test_jwt_with_email(user_id: u64, email: &str, signing_key: &[u8]) -> String {
    create_jwt(user_id, Some(email), signing_key).expect("Failed to sign test JWT")
}

/// Register a user and fund both balances directly through the ledger.
#[allow(dead_code)]
pub async fn fund_user(state: &Arc<AppState>, user_id: u64, sc: i64, mc: i64) {
    use stridecoin::models::{CoinType, SourceType};

    let scope = state.store.user_scope(user_id).await.unwrap();
    state
        .store
        .ensure_user(&scope, None, 0, "2024-01-01T00:00:00Z");
    if sc > 0 {
        state
            .ledger
            .apply(
                &scope,
                CoinType::Sc,
                sc,
                SourceType::MovementReward,
                None,
                "test funding",
            )
            .unwrap();
    }
    if mc > 0 {
        state
            .ledger
            .apply(
                &scope,
                CoinType::Mc,
                mc,
                SourceType::AchievementReward,
                None,
                "test funding",
            )
            .unwrap();
    }
}
