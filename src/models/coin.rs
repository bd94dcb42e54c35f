// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Currency balances and the append-only transaction ledger records.

use serde::{Deserialize, Serialize};

/// The two in-app currencies.
///
/// SC is earned chiefly by validated movement and spent on games and store
/// cosmetics; MC is earned by side activities and spent on minting and
/// enhancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoinType {
    Sc,
    Mc,
}

/// What triggered a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    MovementReward,
    AchievementReward,
    StorePurchase,
    CosmeticMint,
    EnhancementCost,
    GameStake,
    GamePayout,
}

/// Per-user balances and monotone lifetime earnings counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinBalance {
    pub user_id: u64,
    pub sc_balance: i64,
    pub mc_balance: i64,
    /// Total SC ever credited; never decreases
    pub sc_lifetime: i64,
    /// Total MC ever credited; never decreases
    pub mc_lifetime: i64,
}

impl CoinBalance {
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id,
            sc_balance: 0,
            mc_balance: 0,
            sc_lifetime: 0,
            mc_lifetime: 0,
        }
    }

    pub fn of(&self, coin: CoinType) -> i64 {
        match coin {
            CoinType::Sc => self.sc_balance,
            CoinType::Mc => self.mc_balance,
        }
    }
}

/// One immutable ledger row.
///
/// For a user's Nth transaction in a currency, `balance_after` equals the
/// (N-1)th row's `balance_after` plus `amount` — the ledger is a verifiable
/// running total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinTransaction {
    pub user_id: u64,
    pub coin_type: CoinType,
    /// Signed amount; positive credits, negative debits
    pub amount: i64,
    pub balance_after: i64,
    pub source_type: SourceType,
    pub source_id: Option<String>,
    pub description: String,
    /// ISO 8601
    pub created_at: String,
}
