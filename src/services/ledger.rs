// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Economy ledger: the only code path that mutates coin balances.
//!
//! Every economy-affecting action (movement completion, purchase, mint,
//! enhancement roll, achievement claim, gamble settlement) funnels its
//! balance change through [`EconomyLedger::apply`], inside a [`UserScope`].
//! The balance write and the immutable transaction append happen together
//! under that exclusive scope; a rejected entry changes nothing.

use std::sync::Arc;

use crate::db::{Store, UserScope};
use crate::error::{AppError, Result};
use crate::models::{CoinTransaction, CoinType, SourceType};
use crate::time_utils::format_utc_rfc3339;

pub struct EconomyLedger {
    store: Arc<Store>,
}

impl EconomyLedger {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Apply one signed amount to a user's balance inside an existing scope.
    ///
    /// Fails with `InsufficientFunds` (and applies nothing) when a debit
    /// would drive the balance negative. Returns the new balance. Lifetime
    /// counters advance on credits only.
    pub fn apply(
        &self,
        scope: &UserScope,
        coin_type: CoinType,
        amount: i64,
        source_type: SourceType,
        source_id: Option<String>,
        description: &str,
    ) -> Result<i64> {
        let mut balance = self
            .store
            .get_balance(scope.user_id)
            .ok_or_else(|| AppError::NotFound(format!("balance for user {}", scope.user_id)))?;

        let current = balance.of(coin_type);
        let new_balance = current + amount;
        if new_balance < 0 {
            return Err(AppError::InsufficientFunds(format!(
                "{:?} balance {} cannot cover {}",
                coin_type, current, -amount
            )));
        }

        match coin_type {
            CoinType::Sc => {
                balance.sc_balance = new_balance;
                if amount > 0 {
                    balance.sc_lifetime += amount;
                }
            }
            CoinType::Mc => {
                balance.mc_balance = new_balance;
                if amount > 0 {
                    balance.mc_lifetime += amount;
                }
            }
        }

        let transaction = CoinTransaction {
            user_id: scope.user_id,
            coin_type,
            amount,
            balance_after: new_balance,
            source_type,
            source_id,
            description: description.to_string(),
            created_at: format_utc_rfc3339(chrono::Utc::now()),
        };

        self.store.put_balance(scope, balance);
        self.store.push_transaction(scope, transaction);

        tracing::info!(
            user_id = scope.user_id,
            coin = ?coin_type,
            amount,
            new_balance,
            source = ?source_type,
            "Ledger entry applied"
        );

        Ok(new_balance)
    }

    /// Apply one entry under a freshly acquired scope (single-entry actions).
    pub async fn apply_entry(
        &self,
        user_id: u64,
        coin_type: CoinType,
        amount: i64,
        source_type: SourceType,
        source_id: Option<String>,
        description: &str,
    ) -> Result<i64> {
        let scope = self.store.user_scope(user_id).await?;
        self.apply(&scope, coin_type, amount, source_type, source_id, description)
    }

    /// Replay the transaction log and recompute a balance from zero.
    ///
    /// The ledger invariant: this always equals the stored balance.
    pub fn replayed_balance(&self, user_id: u64, coin_type: CoinType) -> i64 {
        self.store
            .all_transactions(user_id)
            .iter()
            .filter(|t| t.coin_type == coin_type)
            .map(|t| t.amount)
            .sum()
    }
}
