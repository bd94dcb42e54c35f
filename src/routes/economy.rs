// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Economy routes: cosmetics, store, games, achievements, boosters, and
//! character actions.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::cosmetic::equipment_bonus_percent;
use crate::models::{Booster, CharacterState, CosmeticInstance, CosmeticTemplate, StatKind, StoreItem};
use crate::services::economy::{
    EnhancementResult, GameKind, MintResult, SpinResult, ACHIEVEMENTS,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/cosmetics", get(get_cosmetics))
        .route("/api/cosmetics/{id}/mint", post(mint_cosmetic))
        .route("/api/cosmetics/{id}/enhance", post(enhance_cosmetic))
        .route("/api/cosmetics/{id}/equip", post(equip_cosmetic))
        .route("/api/cosmetics/{id}/unequip", post(unequip_cosmetic))
        .route("/api/games/spin", post(spin_game))
        .route("/api/store", get(get_store))
        .route("/api/store/{item_id}/purchase", post(purchase_item))
        .route("/api/achievements", get(get_achievements))
        .route("/api/achievements/{code}/claim", post(claim_achievement))
        .route("/api/booster/redeem", post(redeem_booster))
        .route("/api/character/level-up", post(level_up))
        .route("/api/character/feed", post(feed_character))
}

// ─── Cosmetics ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct CosmeticsResponse {
    pub templates: Vec<CosmeticTemplate>,
    pub owned: Vec<CosmeticInstance>,
    /// Bonus percent currently applied by the equipped set
    pub equipment_bonus_percent: f64,
}

/// Catalog, owned instances, and the live equipment bonus.
async fn get_cosmetics(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CosmeticsResponse>> {
    state.ensure_user(&user).await?;

    let equipped = state.store.equipped_with_templates(user.user_id);
    let equipped_refs: Vec<_> = equipped.iter().map(|(i, t)| (i, t)).collect();

    Ok(Json(CosmeticsResponse {
        templates: state.store.list_templates(),
        owned: state.store.instances_of(user.user_id),
        equipment_bonus_percent: equipment_bonus_percent(&equipped_refs),
    }))
}

/// Mint one instance of a template. Fails with `out_of_stock` or
/// `insufficient_funds`.
async fn mint_cosmetic(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(template_id): Path<u32>,
) -> Result<Json<MintResult>> {
    state.ensure_user(&user).await?;
    let result = state
        .economy_service
        .mint_cosmetic(user.user_id, template_id)
        .await?;
    Ok(Json(result))
}

/// Attempt a one-level enhancement. The cost is consumed either way.
async fn enhance_cosmetic(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(instance_id): Path<u64>,
) -> Result<Json<EnhancementResult>> {
    state.ensure_user(&user).await?;
    let mut rng = state.rng.lock().await;
    let result = state
        .economy_service
        .attempt_enhancement(user.user_id, instance_id, &mut *rng)
        .await?;
    Ok(Json(result))
}

async fn equip_cosmetic(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(instance_id): Path<u64>,
) -> Result<Json<CosmeticInstance>> {
    state.ensure_user(&user).await?;
    let instance = state
        .economy_service
        .equip_cosmetic(user.user_id, instance_id)
        .await?;
    Ok(Json(instance))
}

async fn unequip_cosmetic(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(instance_id): Path<u64>,
) -> Result<Json<CosmeticInstance>> {
    state.ensure_user(&user).await?;
    let instance = state
        .economy_service
        .unequip_cosmetic(user.user_id, instance_id)
        .await?;
    Ok(Json(instance))
}

// ─── Games ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct SpinRequest {
    game_kind: GameKind,
    stake: i64,
}

/// One weighted-game spin: stake, draw, and payout settle atomically.
async fn spin_game(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SpinRequest>,
) -> Result<Json<SpinResult>> {
    state.ensure_user(&user).await?;
    let mut rng = state.rng.lock().await;
    let result = state
        .economy_service
        .spin(user.user_id, body.game_kind, body.stake, &mut *rng)
        .await?;
    Ok(Json(result))
}

// ─── Store ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StoreResponse {
    pub items: Vec<StoreItem>,
}

async fn get_store(State(state): State<Arc<AppState>>) -> Json<StoreResponse> {
    Json(StoreResponse {
        items: state.store.list_store_items(),
    })
}

#[derive(Serialize)]
pub struct PurchaseResponse {
    pub new_mc_balance: i64,
}

async fn purchase_item(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(item_id): Path<u32>,
) -> Result<Json<PurchaseResponse>> {
    state.ensure_user(&user).await?;
    let new_mc_balance = state
        .economy_service
        .purchase_store_item(user.user_id, item_id)
        .await?;
    Ok(Json(PurchaseResponse { new_mc_balance }))
}

// ─── Achievements ────────────────────────────────────────────

#[derive(Serialize)]
pub struct AchievementSummary {
    pub code: String,
    pub title: String,
    pub reward_mc: i64,
    pub claimed: bool,
}

#[derive(Serialize)]
pub struct AchievementsResponse {
    pub achievements: Vec<AchievementSummary>,
}

async fn get_achievements(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<AchievementsResponse>> {
    state.ensure_user(&user).await?;
    let achievements = ACHIEVEMENTS
        .iter()
        .map(|def| AchievementSummary {
            code: def.code.to_string(),
            title: def.title.to_string(),
            reward_mc: def.reward_mc,
            claimed: state.store.has_claimed_achievement(user.user_id, def.code),
        })
        .collect();
    Ok(Json(AchievementsResponse { achievements }))
}

#[derive(Serialize)]
pub struct ClaimResponse {
    pub new_mc_balance: i64,
}

/// Claim a completed achievement. Fails if not completed or already claimed.
async fn claim_achievement(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(code): Path<String>,
) -> Result<Json<ClaimResponse>> {
    state.ensure_user(&user).await?;
    let new_mc_balance = state
        .economy_service
        .claim_achievement(user.user_id, &code)
        .await?;
    Ok(Json(ClaimResponse { new_mc_balance }))
}

// ─── Boosters ────────────────────────────────────────────────

#[derive(Deserialize)]
struct RedeemRequest {
    code: String,
}

async fn redeem_booster(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<RedeemRequest>,
) -> Result<Json<Booster>> {
    state.ensure_user(&user).await?;
    if body.code.trim().is_empty() || body.code.len() > 64 {
        return Err(AppError::Validation("invalid booster code".to_string()));
    }
    let booster = state
        .economy_service
        .redeem_booster(user.user_id, body.code.trim(), chrono::Utc::now())
        .await?;
    Ok(Json(booster))
}

// ─── Character ───────────────────────────────────────────────

#[derive(Deserialize)]
struct LevelUpRequest {
    stat: StatKind,
}

/// Spend banked exp on one level, allocating one stat point.
async fn level_up(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<LevelUpRequest>,
) -> Result<Json<CharacterState>> {
    state.ensure_user(&user).await?;
    let character = state.economy_service.level_up(user.user_id, body.stat).await?;
    Ok(Json(character))
}

/// Restore condition after a feeding action.
async fn feed_character(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CharacterState>> {
    state.ensure_user(&user).await?;
    let character = state.economy_service.feed_character(user.user_id).await?;
    Ok(Json(character))
}
