// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users: profile, movements, stride, booster,
//! and the ledger history.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::stride::days_until_next;
use crate::models::{GpsPoint, Movement, TransportMode};
use crate::services::movement::SegmentUpload;
use crate::services::reward::Weather;
use crate::time_utils::local_day;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const MAX_SEGMENTS_PER_MOVEMENT: usize = 20;
const MAX_POINTS_PER_SEGMENT: usize = 10_000;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/movements", post(start_movement))
        .route("/api/movements/{id}", get(get_movement))
        .route("/api/movements/{id}/complete", post(complete_movement))
        .route("/api/stride", get(get_stride))
        .route("/api/booster", get(get_booster))
        .route("/api/transactions", get(get_transactions))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub user_id: u64,
    pub display_name: String,
    pub email: Option<String>,
    pub sc_balance: i64,
    pub mc_balance: i64,
    pub sc_lifetime: i64,
    pub mc_lifetime: i64,
    pub character_level: u32,
    pub exp: i64,
    pub exp_to_next: i64,
    pub condition: i32,
    pub max_condition: i32,
    pub current_streak_days: u32,
    pub stride_level: u32,
}

/// Get current user profile, balances, and progression snapshot.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state.ensure_user(&user).await?;
    let balance = state
        .store
        .get_balance(user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("balance for user {}", user.user_id)))?;
    let character = state
        .store
        .get_character(user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("character for user {}", user.user_id)))?;
    let stride = state
        .store
        .get_stride(user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("stride state for user {}", user.user_id)))?;

    Ok(Json(UserResponse {
        user_id: profile.user_id,
        display_name: profile.display_name,
        email: profile.email,
        sc_balance: balance.sc_balance,
        mc_balance: balance.mc_balance,
        sc_lifetime: balance.sc_lifetime,
        mc_lifetime: balance.mc_lifetime,
        character_level: character.level,
        exp: character.exp,
        exp_to_next: character.exp_to_next,
        condition: character.condition,
        max_condition: character.max_condition,
        current_streak_days: stride.current_streak_days,
        stride_level: stride.level,
    }))
}

// ─── Movements ───────────────────────────────────────────────

#[derive(Deserialize)]
struct StartMovementRequest {
    transport_mode: TransportMode,
    /// Optional start hint; validated but not persisted
    start_location: Option<GpsPoint>,
}

#[derive(Serialize)]
pub struct StartMovementResponse {
    pub movement_id: u64,
}

/// Start a movement. Any prior active movement for the user is cancelled.
async fn start_movement(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<StartMovementRequest>,
) -> Result<Json<StartMovementResponse>> {
    state.ensure_user(&user).await?;

    if let Some(location) = &body.start_location {
        location
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        tracing::debug!(
            user_id = user.user_id,
            lat = location.lat,
            lng = location.lng,
            "Movement start location"
        );
    }

    let movement_id = state
        .movement_service
        .start_movement(user.user_id, body.transport_mode, chrono::Utc::now())
        .await?;

    Ok(Json(StartMovementResponse { movement_id }))
}

#[derive(Deserialize)]
struct CompleteMovementRequest {
    segments: Vec<SegmentUpload>,
    #[serde(default)]
    weather: Weather,
}

/// Complete a movement: runs validation, classification, the reward
/// pipeline, and the ledger credit.
async fn complete_movement(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(movement_id): Path<u64>,
    Json(body): Json<CompleteMovementRequest>,
) -> Result<Json<crate::services::CompletionResult>> {
    state.ensure_user(&user).await?;

    if body.segments.len() > MAX_SEGMENTS_PER_MOVEMENT {
        return Err(AppError::Validation(format!(
            "at most {MAX_SEGMENTS_PER_MOVEMENT} segments per movement"
        )));
    }
    for segment in &body.segments {
        if segment.points.len() > MAX_POINTS_PER_SEGMENT {
            return Err(AppError::Validation(format!(
                "at most {MAX_POINTS_PER_SEGMENT} points per segment"
            )));
        }
        for point in &segment.points {
            point
                .validate()
                .map_err(|e| AppError::Validation(e.to_string()))?;
        }
    }

    let result = state
        .movement_service
        .complete_movement(
            user.user_id,
            movement_id,
            &body.segments,
            body.weather,
            chrono::Utc::now(),
        )
        .await?;

    Ok(Json(result))
}

/// Fetch one movement, including its persisted reward breakdown.
async fn get_movement(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(movement_id): Path<u64>,
) -> Result<Json<Movement>> {
    let movement = state
        .store
        .get_movement(movement_id)
        .filter(|m| m.user_id == user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("movement {movement_id}")))?;
    Ok(Json(movement))
}

// ─── Stride ──────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StrideResponse {
    pub current_streak_days: u32,
    pub longest_streak_days: u32,
    pub level: u32,
    pub title: String,
    pub multiplier: f64,
    pub daily_cap: i64,
    pub shield_count: u32,
    pub days_until_next_level: Option<u32>,
    pub sc_earned_today: i64,
    pub total_distance_m: f64,
}

/// Stride tier snapshot for the dashboard.
async fn get_stride(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StrideResponse>> {
    let profile = state.ensure_user(&user).await?;
    let stride = state
        .store
        .get_stride(user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("stride state for user {}", user.user_id)))?;

    let tier = stride.tier();
    let today = local_day(chrono::Utc::now(), profile.tz_offset_minutes);

    Ok(Json(StrideResponse {
        current_streak_days: stride.current_streak_days,
        longest_streak_days: stride.longest_streak_days,
        level: tier.level,
        title: tier.title.to_string(),
        multiplier: tier.multiplier,
        daily_cap: tier.daily_cap,
        shield_count: stride.shield_count,
        days_until_next_level: days_until_next(stride.current_streak_days),
        sc_earned_today: state.store.sc_earned_on(user.user_id, today),
        total_distance_m: stride.total_distance_m,
    }))
}

// ─── Booster ─────────────────────────────────────────────────

/// Read-only view of the active booster, if any.
async fn get_booster(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<crate::services::economy::BoosterView>> {
    state.ensure_user(&user).await?;
    Ok(Json(
        state
            .economy_service
            .get_active_booster(user.user_id, chrono::Utc::now()),
    ))
}

// ─── Ledger history ──────────────────────────────────────────

#[derive(Deserialize)]
struct TransactionsQuery {
    /// Cursor for forward pagination (opaque token).
    cursor: Option<String>,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    50
}

const MAX_PER_PAGE: u32 = 100;

fn parse_cursor(cursor: Option<&str>) -> Result<usize> {
    let Some(raw) = cursor else { return Ok(0) };
    let invalid_cursor = || AppError::Validation("Invalid 'cursor' parameter".to_string());

    let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
    let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;
    decoded_str.parse::<usize>().map_err(|_| invalid_cursor())
}

fn encode_cursor(offset: usize) -> String {
    URL_SAFE_NO_PAD.encode(offset.to_string())
}

#[derive(Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<crate::models::CoinTransaction>,
    pub per_page: u32,
    pub next_cursor: Option<String>,
}

/// Ledger history, newest first, cursor-paginated.
async fn get_transactions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<TransactionsQuery>,
) -> Result<Json<TransactionsResponse>> {
    let limit = params.per_page.min(MAX_PER_PAGE) as usize;
    let offset = parse_cursor(params.cursor.as_deref())?;

    let (transactions, total) = state.store.transactions_page(user.user_id, offset, limit);

    let consumed = offset + transactions.len();
    let next_cursor = (consumed < total).then(|| encode_cursor(consumed));

    Ok(Json(TransactionsResponse {
        transactions,
        per_page: limit as u32,
        next_cursor,
    }))
}
