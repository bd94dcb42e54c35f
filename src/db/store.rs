// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process transactional store.
//!
//! A single logical data store with serializable per-user transactions:
//! every entity collection is a [`DashMap`], and mutations go through typed
//! scope values ([`UserScope`], [`SupplyScope`]) backed by per-key
//! `tokio::sync::Mutex` locks. Holding a scope is the unit of work: acquire
//! (bounded by a timeout), read, validate, write, drop. Mutating methods
//! take the scope as a witness parameter so no code path can touch per-user
//! state without serializing behind the lock.
//!
//! Lock order is always user → supply (template/store item); nothing
//! acquires a user lock while holding a supply lock.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::AppError;
use crate::models::{
    Booster, CharacterState, CoinBalance, CoinTransaction, CosmeticInstance, CosmeticTemplate,
    Movement, StoreItem, StrideState, UserProfile,
};

/// Exclusive access to one user's rows.
#[derive(Debug)]
pub struct UserScope {
    pub user_id: u64,
    _guard: OwnedMutexGuard<()>,
}

/// Exclusive access to one shared supply counter (template or store item).
pub struct SupplyScope {
    _guard: OwnedMutexGuard<()>,
}

/// Which shared supply counter a [`SupplyScope`] covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SupplyKey {
    Template(u32),
    StoreItem(u32),
}

/// The application's single data store.
pub struct Store {
    scope_timeout: Duration,

    profiles: DashMap<u64, UserProfile>,
    balances: DashMap<u64, CoinBalance>,
    /// Append-only per-user transaction log
    transactions: DashMap<u64, Vec<CoinTransaction>>,
    movements: DashMap<u64, Movement>,
    /// user -> currently ACTIVE movement id
    active_movements: DashMap<u64, u64>,
    stride: DashMap<u64, StrideState>,
    characters: DashMap<u64, CharacterState>,
    templates: DashMap<u32, CosmeticTemplate>,
    instances: DashMap<u64, CosmeticInstance>,
    store_items: DashMap<u32, StoreItem>,
    claimed_achievements: DashMap<u64, HashSet<String>>,
    redeemed_booster_codes: DashMap<u64, HashSet<String>>,
    boosters: DashMap<u64, Booster>,
    /// Movement SC credited per (user, local day), for the daily cap
    daily_sc_earned: DashMap<(u64, NaiveDate), i64>,

    user_locks: DashMap<u64, Arc<Mutex<()>>>,
    supply_locks: DashMap<SupplyKey, Arc<Mutex<()>>>,

    next_movement_id: AtomicU64,
    next_instance_id: AtomicU64,
    next_template_id: AtomicU64,
}

impl Store {
    pub fn new(scope_timeout: Duration) -> Self {
        Self {
            scope_timeout,
            profiles: DashMap::new(),
            balances: DashMap::new(),
            transactions: DashMap::new(),
            movements: DashMap::new(),
            active_movements: DashMap::new(),
            stride: DashMap::new(),
            characters: DashMap::new(),
            templates: DashMap::new(),
            instances: DashMap::new(),
            store_items: DashMap::new(),
            claimed_achievements: DashMap::new(),
            redeemed_booster_codes: DashMap::new(),
            boosters: DashMap::new(),
            daily_sc_earned: DashMap::new(),
            user_locks: DashMap::new(),
            supply_locks: DashMap::new(),
            next_movement_id: AtomicU64::new(1),
            next_instance_id: AtomicU64::new(1),
            next_template_id: AtomicU64::new(1),
        }
    }

    /// Seed the cosmetic and store catalogs. Existing entries are kept, so
    /// restarts do not reset supply counters.
    pub fn seed_catalog(&self, templates: Vec<CosmeticTemplate>, items: Vec<StoreItem>) {
        for template in templates {
            self.bump_template_id_floor(template.id);
            self.templates.entry(template.id).or_insert(template);
        }
        for item in items {
            self.store_items.entry(item.id).or_insert(item);
        }
    }

    fn bump_template_id_floor(&self, seen_id: u32) {
        let floor = u64::from(seen_id) + 1;
        self.next_template_id.fetch_max(floor, Ordering::Relaxed);
    }

    // ─── Scopes ──────────────────────────────────────────────────

    /// Acquire exclusive access to a user's rows, bounded by the scope
    /// timeout. A timeout is fatal to the request, never retried here.
    pub async fn user_scope(&self, user_id: u64) -> Result<UserScope, AppError> {
        let lock = self
            .user_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = tokio::time::timeout(self.scope_timeout, lock.lock_owned())
            .await
            .map_err(|_| AppError::Timeout)?;

        Ok(UserScope {
            user_id,
            _guard: guard,
        })
    }

    pub async fn template_scope(&self, template_id: u32) -> Result<SupplyScope, AppError> {
        self.supply_scope(SupplyKey::Template(template_id)).await
    }

    pub async fn store_item_scope(&self, item_id: u32) -> Result<SupplyScope, AppError> {
        self.supply_scope(SupplyKey::StoreItem(item_id)).await
    }

    async fn supply_scope(&self, key: SupplyKey) -> Result<SupplyScope, AppError> {
        let lock = self
            .supply_locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = tokio::time::timeout(self.scope_timeout, lock.lock_owned())
            .await
            .map_err(|_| AppError::Timeout)?;

        Ok(SupplyScope { _guard: guard })
    }

    // ─── User bootstrap ──────────────────────────────────────────

    /// Fetch the profile, creating profile, balance, stride, and character
    /// rows on a user's first appearance.
    pub fn ensure_user(
        &self,
        scope: &UserScope,
        email: Option<&str>,
        tz_offset_minutes: i32,
        now_iso: &str,
    ) -> UserProfile {
        let user_id = scope.user_id;
        let mut profile = self
            .profiles
            .get(&user_id)
            .map(|p| p.clone())
            .unwrap_or_else(|| UserProfile {
                user_id,
                email: email.map(str::to_string),
                display_name: format!("runner-{user_id}"),
                tz_offset_minutes,
                created_at: now_iso.to_string(),
                last_active: now_iso.to_string(),
            });
        profile.last_active = now_iso.to_string();
        if profile.email.is_none() {
            profile.email = email.map(str::to_string);
        }
        self.profiles.insert(user_id, profile.clone());

        self.balances
            .entry(user_id)
            .or_insert_with(|| CoinBalance::new(user_id));
        self.stride
            .entry(user_id)
            .or_insert_with(|| StrideState::new(user_id));
        self.characters
            .entry(user_id)
            .or_insert_with(|| CharacterState::new(user_id));

        profile
    }

    pub fn get_profile(&self, user_id: u64) -> Option<UserProfile> {
        self.profiles.get(&user_id).map(|p| p.clone())
    }

    // ─── Balances & transactions ─────────────────────────────────

    pub fn get_balance(&self, user_id: u64) -> Option<CoinBalance> {
        self.balances.get(&user_id).map(|b| b.clone())
    }

    pub fn put_balance(&self, scope: &UserScope, balance: CoinBalance) {
        debug_assert_eq!(scope.user_id, balance.user_id);
        self.balances.insert(balance.user_id, balance);
    }

    pub fn push_transaction(&self, scope: &UserScope, transaction: CoinTransaction) {
        debug_assert_eq!(scope.user_id, transaction.user_id);
        self.transactions
            .entry(transaction.user_id)
            .or_default()
            .push(transaction);
    }

    /// Transactions newest-first, starting at `offset`.
    pub fn transactions_page(
        &self,
        user_id: u64,
        offset: usize,
        limit: usize,
    ) -> (Vec<CoinTransaction>, usize) {
        match self.transactions.get(&user_id) {
            Some(log) => {
                let total = log.len();
                let page = log
                    .iter()
                    .rev()
                    .skip(offset)
                    .take(limit)
                    .cloned()
                    .collect();
                (page, total)
            }
            None => (Vec::new(), 0),
        }
    }

    /// Full log in creation order (ledger audits and tests).
    pub fn all_transactions(&self, user_id: u64) -> Vec<CoinTransaction> {
        self.transactions
            .get(&user_id)
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    // ─── Movements ───────────────────────────────────────────────

    pub fn next_movement_id(&self) -> u64 {
        self.next_movement_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn get_movement(&self, movement_id: u64) -> Option<Movement> {
        self.movements.get(&movement_id).map(|m| m.clone())
    }

    pub fn put_movement(&self, scope: &UserScope, movement: Movement) {
        debug_assert_eq!(scope.user_id, movement.user_id);
        self.movements.insert(movement.id, movement);
    }

    pub fn active_movement_id(&self, user_id: u64) -> Option<u64> {
        self.active_movements.get(&user_id).map(|id| *id)
    }

    pub fn set_active_movement(&self, scope: &UserScope, movement_id: u64) {
        self.active_movements.insert(scope.user_id, movement_id);
    }

    pub fn clear_active_movement(&self, scope: &UserScope) {
        self.active_movements.remove(&scope.user_id);
    }

    // ─── Stride & daily earnings ─────────────────────────────────

    pub fn get_stride(&self, user_id: u64) -> Option<StrideState> {
        self.stride.get(&user_id).map(|s| s.clone())
    }

    pub fn put_stride(&self, scope: &UserScope, state: StrideState) {
        debug_assert_eq!(scope.user_id, state.user_id);
        self.stride.insert(state.user_id, state);
    }

    pub fn sc_earned_on(&self, user_id: u64, day: NaiveDate) -> i64 {
        self.daily_sc_earned
            .get(&(user_id, day))
            .map(|v| *v)
            .unwrap_or(0)
    }

    pub fn add_sc_earned(&self, scope: &UserScope, day: NaiveDate, amount: i64) {
        *self
            .daily_sc_earned
            .entry((scope.user_id, day))
            .or_insert(0) += amount;
    }

    // ─── Characters ──────────────────────────────────────────────

    pub fn get_character(&self, user_id: u64) -> Option<CharacterState> {
        self.characters.get(&user_id).map(|c| c.clone())
    }

    pub fn put_character(&self, scope: &UserScope, character: CharacterState) {
        debug_assert_eq!(scope.user_id, character.user_id);
        self.characters.insert(character.user_id, character);
    }

    // ─── Cosmetics ───────────────────────────────────────────────

    pub fn next_template_id(&self) -> u32 {
        self.next_template_id.fetch_add(1, Ordering::Relaxed) as u32
    }

    pub fn get_template(&self, template_id: u32) -> Option<CosmeticTemplate> {
        self.templates.get(&template_id).map(|t| t.clone())
    }

    pub fn list_templates(&self) -> Vec<CosmeticTemplate> {
        let mut all: Vec<CosmeticTemplate> =
            self.templates.iter().map(|t| t.value().clone()).collect();
        all.sort_by_key(|t| t.id);
        all
    }

    /// Insert a new template (admin path).
    pub fn insert_template(&self, template: CosmeticTemplate) {
        self.bump_template_id_floor(template.id);
        self.templates.insert(template.id, template);
    }

    /// Update a template's supply counter; requires the supply scope.
    pub fn put_template(&self, _scope: &SupplyScope, template: CosmeticTemplate) {
        self.templates.insert(template.id, template);
    }

    pub fn next_instance_id(&self) -> u64 {
        self.next_instance_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn get_instance(&self, instance_id: u64) -> Option<CosmeticInstance> {
        self.instances.get(&instance_id).map(|i| i.clone())
    }

    pub fn put_instance(&self, scope: &UserScope, instance: CosmeticInstance) {
        debug_assert_eq!(scope.user_id, instance.owner_id);
        self.instances.insert(instance.id, instance);
    }

    pub fn instances_of(&self, user_id: u64) -> Vec<CosmeticInstance> {
        let mut owned: Vec<CosmeticInstance> = self
            .instances
            .iter()
            .filter(|i| i.owner_id == user_id)
            .map(|i| i.value().clone())
            .collect();
        owned.sort_by_key(|i| i.id);
        owned
    }

    /// Currently equipped instances paired with their templates.
    pub fn equipped_with_templates(
        &self,
        user_id: u64,
    ) -> Vec<(CosmeticInstance, CosmeticTemplate)> {
        self.instances_of(user_id)
            .into_iter()
            .filter(|i| i.is_equipped)
            .filter_map(|i| self.get_template(i.template_id).map(|t| (i, t)))
            .collect()
    }

    // ─── Store items ─────────────────────────────────────────────

    pub fn get_store_item(&self, item_id: u32) -> Option<StoreItem> {
        self.store_items.get(&item_id).map(|i| i.clone())
    }

    pub fn list_store_items(&self) -> Vec<StoreItem> {
        let mut all: Vec<StoreItem> = self.store_items.iter().map(|i| i.value().clone()).collect();
        all.sort_by_key(|i| i.id);
        all
    }

    pub fn put_store_item(&self, _scope: &SupplyScope, item: StoreItem) {
        self.store_items.insert(item.id, item);
    }

    // ─── Achievements & boosters ─────────────────────────────────

    pub fn has_claimed_achievement(&self, user_id: u64, code: &str) -> bool {
        self.claimed_achievements
            .get(&user_id)
            .is_some_and(|claimed| claimed.contains(code))
    }

    pub fn record_achievement_claim(&self, scope: &UserScope, code: &str) {
        self.claimed_achievements
            .entry(scope.user_id)
            .or_default()
            .insert(code.to_string());
    }

    pub fn get_booster(&self, user_id: u64) -> Option<Booster> {
        self.boosters.get(&user_id).map(|b| b.clone())
    }

    pub fn put_booster(&self, scope: &UserScope, booster: Booster) {
        debug_assert_eq!(scope.user_id, booster.user_id);
        self.boosters.insert(booster.user_id, booster);
    }

    pub fn has_redeemed_code(&self, user_id: u64, code: &str) -> bool {
        self.redeemed_booster_codes
            .get(&user_id)
            .is_some_and(|codes| codes.contains(code))
    }

    pub fn record_code_redemption(&self, scope: &UserScope, code: &str) {
        self.redeemed_booster_codes
            .entry(scope.user_id)
            .or_default()
            .insert(code.to_string());
    }
}
