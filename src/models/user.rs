//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile, created lazily on first authenticated request.
///
/// Identity and sessions come from an external provider; the profile only
/// carries what the reward engine needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: u64,
    /// Email from the session claims (used for the admin allowlist)
    pub email: Option<String>,
    pub display_name: String,
    /// Minutes from UTC defining the user's local day boundary
    pub tz_offset_minutes: i32,
    /// When the user first appeared (ISO 8601)
    pub created_at: String,
    /// Last request timestamp (ISO 8601)
    pub last_active: String,
}

/// A time-boxed reward multiplier granted by redeeming a code.
///
/// Lives outside the core multiplier stack; applied as a final scalar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booster {
    pub user_id: u64,
    pub code: String,
    pub multiplier: f64,
    /// ISO 8601
    pub expires_at: String,
}

/// Effect applied when a store item is purchased.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "amount")]
pub enum StoreEffect {
    /// Bank N streak shields
    StreakShield(u32),
    /// Restore N condition immediately
    ConditionFeed(i32),
}

/// A purchasable store item, optionally stock-limited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreItem {
    pub id: u32,
    pub name: String,
    pub price_mc: i64,
    /// `None` means unlimited stock
    pub stock: Option<u32>,
    pub sold_count: u32,
    pub effect: StoreEffect,
}

impl StoreItem {
    /// Whether another purchase would exceed the stock ceiling.
    pub fn sold_out(&self) -> bool {
        match self.stock {
            Some(stock) => self.sold_count >= stock,
            None => false,
        }
    }
}

/// Store catalog seeded at startup.
pub fn default_store_items() -> Vec<StoreItem> {
    vec![
        StoreItem {
            id: 1,
            name: "Streak Shield".to_string(),
            price_mc: 100,
            stock: None,
            sold_count: 0,
            effect: StoreEffect::StreakShield(1),
        },
        StoreItem {
            id: 2,
            name: "Energy Bar".to_string(),
            price_mc: 20,
            stock: None,
            sold_count: 0,
            effect: StoreEffect::ConditionFeed(30),
        },
        StoreItem {
            id: 3,
            name: "Launch Shield 3-Pack".to_string(),
            price_mc: 250,
            stock: Some(500),
            sold_count: 0,
            effect: StoreEffect::StreakShield(3),
        },
    ]
}
