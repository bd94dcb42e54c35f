// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes, gated by the config-injected email allowlist.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{CosmeticCategory, CosmeticTemplate};
use crate::AppState;
use axum::{extract::State, routing::post, Extension, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/admin/cosmetic-templates", post(create_template))
}

/// Reject callers whose session email is not on the allowlist.
fn require_admin(state: &AppState, user: &AuthUser) -> Result<()> {
    let allowed = user
        .email
        .as_deref()
        .map(str::to_ascii_lowercase)
        .is_some_and(|email| state.config.admin_emails.contains(&email));
    if !allowed {
        tracing::warn!(user_id = user.user_id, "Rejected non-admin request");
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

#[derive(Deserialize, Validate)]
struct CreateTemplateRequest {
    #[validate(length(min = 1, max = 80))]
    name: String,
    category: CosmeticCategory,
    /// Omit for unlimited supply
    max_supply: Option<u32>,
    #[validate(range(min = 1))]
    price_mc: i64,
    #[validate(range(min = 0.0, max = 100.0))]
    base_bonus_percent: f64,
    #[validate(range(min = 0.0, max = 50.0))]
    per_level_bonus_percent: f64,
}

/// Add a cosmetic template to the catalog.
async fn create_template(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateTemplateRequest>,
) -> Result<Json<CosmeticTemplate>> {
    require_admin(&state, &user)?;
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let template = CosmeticTemplate {
        id: state.store.next_template_id(),
        name: body.name,
        category: body.category,
        max_supply: body.max_supply,
        minted_count: 0,
        price_mc: body.price_mc,
        base_bonus_percent: body.base_bonus_percent,
        per_level_bonus_percent: body.per_level_bonus_percent,
    };
    state.store.insert_template(template.clone());

    tracing::info!(template_id = template.id, name = %template.name, "Template created");
    Ok(Json(template))
}
