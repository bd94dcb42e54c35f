// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Stridecoin: a move-to-earn rewards backend.
//!
//! This crate provides the API for turning validated GPS movement into SC,
//! and for every other action that touches the coin economy: store
//! purchases, cosmetic minting and enhancement, achievement claims, and
//! weighted mini-games. All balance changes flow through one transactional
//! ledger.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::sync::Mutex;

use config::Config;
use db::Store;
use error::Result;
use middleware::auth::AuthUser;
use models::UserProfile;
use services::{EconomyLedger, EconomyService, MovementService};
use time_utils::format_utc_rfc3339;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<Store>,
    pub ledger: Arc<EconomyLedger>,
    pub movement_service: MovementService,
    pub economy_service: EconomyService,
    /// Runtime RNG for gambles; tests inject seeded RNGs at the service layer
    pub rng: Mutex<SmallRng>,
}

impl AppState {
    /// Wire up the store, ledger, and services, and seed the catalogs.
    pub fn new(config: Config) -> Self {
        let store = Arc::new(Store::new(std::time::Duration::from_millis(
            config.scope_timeout_ms,
        )));
        store.seed_catalog(
            models::cosmetic::default_templates(),
            models::user::default_store_items(),
        );

        let ledger = Arc::new(EconomyLedger::new(store.clone()));
        let movement_service =
            MovementService::new(store.clone(), ledger.clone(), config.clone());
        let economy_service = EconomyService::new(store.clone(), ledger.clone(), config.clone());

        Self {
            config,
            store,
            ledger,
            movement_service,
            economy_service,
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    /// Create the user's rows on first contact and refresh `last_active`.
    pub async fn ensure_user(&self, auth: &AuthUser) -> Result<UserProfile> {
        let scope = self.store.user_scope(auth.user_id).await?;
        Ok(self.store.ensure_user(
            &scope,
            auth.email.as_deref(),
            self.config.default_tz_offset_minutes,
            &format_utc_rfc3339(chrono::Utc::now()),
        ))
    }
}
