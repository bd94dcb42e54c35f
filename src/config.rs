// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; nothing is re-read at request time.
//! The admin allowlist and booster code table are injected here rather than
//! compiled into the handlers that consume them.

use std::collections::HashSet;
use std::env;

/// A redeemable booster code: a time-boxed final-scalar reward multiplier.
#[derive(Debug, Clone)]
pub struct BoosterCode {
    pub code: String,
    pub multiplier: f64,
    pub duration_minutes: i64,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// JWT verification key for session tokens (raw bytes).
    /// Sessions are issued by the external identity provider with the same key.
    pub jwt_signing_key: Vec<u8>,
    /// Emails allowed to call admin endpoints
    pub admin_emails: HashSet<String>,

    // --- Movement validation thresholds ---
    /// GPS points with worse reported accuracy than this are discarded (meters)
    pub min_accuracy_m: f64,
    /// Consecutive-point distances above this are anomalies (meters)
    pub max_jump_m: f64,
    /// Minimum validated distance for a movement to count toward the streak (meters)
    pub qualifying_distance_m: f64,

    // --- Economy policy ---
    /// Flat SC bonus on the first completed movement of a local day
    pub daily_first_move_bonus_sc: i64,
    /// Character exp granted per 100 m of validated distance
    pub exp_per_100m: i64,
    /// Condition drained per started kilometer of movement
    pub condition_drain_per_km: i32,
    /// Condition restored by one feed action
    pub feed_restore_amount: i32,

    // --- Concurrency ---
    /// Bound on acquiring a transactional scope (milliseconds)
    pub scope_timeout_ms: u64,
    /// Local-day offset applied to users who have not set one (minutes from UTC)
    pub default_tz_offset_minutes: i32,

    /// Redeemable booster codes
    pub booster_codes: Vec<BoosterCode>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            admin_emails: parse_admin_emails(&env::var("ADMIN_EMAILS").unwrap_or_default()),

            min_accuracy_m: parse_env_or("MIN_ACCURACY_M", 50.0)?,
            max_jump_m: parse_env_or("MAX_JUMP_M", 500.0)?,
            qualifying_distance_m: parse_env_or("QUALIFYING_DISTANCE_M", 100.0)?,

            daily_first_move_bonus_sc: parse_env_or("DAILY_FIRST_MOVE_BONUS_SC", 10)?,
            exp_per_100m: parse_env_or("EXP_PER_100M", 1)?,
            condition_drain_per_km: parse_env_or("CONDITION_DRAIN_PER_KM", 2)?,
            feed_restore_amount: parse_env_or("FEED_RESTORE_AMOUNT", 30)?,

            scope_timeout_ms: parse_env_or("SCOPE_TIMEOUT_MS", 5000)?,
            default_tz_offset_minutes: parse_env_or("DEFAULT_TZ_OFFSET_MINUTES", 0)?,

            booster_codes: parse_booster_codes(
                &env::var("BOOSTER_CODES")
                    .unwrap_or_else(|_| "KICKOFF2X:2.0:60,WEEKEND15:1.5:120".to_string()),
            )?,
        })
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            admin_emails: ["admin@example.com".to_string()].into_iter().collect(),
            min_accuracy_m: 50.0,
            max_jump_m: 500.0,
            qualifying_distance_m: 100.0,
            daily_first_move_bonus_sc: 10,
            exp_per_100m: 1,
            condition_drain_per_km: 2,
            feed_restore_amount: 30,
            scope_timeout_ms: 1000,
            default_tz_offset_minutes: 0,
            booster_codes: vec![BoosterCode {
                code: "KICKOFF2X".to_string(),
                multiplier: 2.0,
                duration_minutes: 60,
            }],
        }
    }

    /// Look up a booster code, case-insensitively.
    pub fn booster_code(&self, code: &str) -> Option<&BoosterCode> {
        self.booster_codes
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
    }
}

fn parse_admin_emails(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse `CODE:multiplier:minutes` entries separated by commas.
fn parse_booster_codes(raw: &str) -> Result<Vec<BoosterCode>, ConfigError> {
    let mut codes = Vec::new();
    for entry in raw.split(',').filter(|e| !e.trim().is_empty()) {
        let mut parts = entry.trim().splitn(3, ':');
        let (code, mult, minutes) = match (parts.next(), parts.next(), parts.next()) {
            (Some(c), Some(m), Some(d)) => (c, m, d),
            _ => return Err(ConfigError::Invalid("BOOSTER_CODES", entry.to_string())),
        };
        codes.push(BoosterCode {
            code: code.to_string(),
            multiplier: mult
                .parse()
                .map_err(|_| ConfigError::Invalid("BOOSTER_CODES", entry.to_string()))?,
            duration_minutes: minutes
                .parse()
                .map_err(|_| ConfigError::Invalid("BOOSTER_CODES", entry.to_string()))?,
        });
    }
    Ok(codes)
}

fn parse_env_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_booster_codes() {
        let codes = parse_booster_codes("KICKOFF2X:2.0:60, WEEKEND15:1.5:120").unwrap();
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0].code, "KICKOFF2X");
        assert_eq!(codes[0].multiplier, 2.0);
        assert_eq!(codes[1].duration_minutes, 120);

        assert!(parse_booster_codes("BROKEN:2.0").is_err());
    }

    #[test]
    fn test_admin_emails_normalized() {
        let emails = parse_admin_emails("Admin@Example.com, ops@example.com,,");
        assert!(emails.contains("admin@example.com"));
        assert!(emails.contains("ops@example.com"));
        assert_eq!(emails.len(), 2);
    }

    #[test]
    fn test_booster_lookup_case_insensitive() {
        let config = Config::test_default();
        assert!(config.booster_code("kickoff2x").is_some());
        assert!(config.booster_code("NOPE").is_none());
    }
}
