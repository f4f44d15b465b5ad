// src/config.rs
//! Desert mode configuration
//!
//! Loaded from JSON with `serde_json`. Every field has a default so a partial
//! document only overrides what it names.

use crate::clock::ChainTime;
use crate::error_handling::{DesertError, DesertResult};
use crate::{AccountId, AssetId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default expiry window for priority requests, in blocks
pub const DEFAULT_PRIORITY_EXPIRATION_BLOCKS: u64 = 40_320;

/// Largest account index that may exit
pub const DEFAULT_MAX_ACCOUNT_INDEX: AccountId = u32::MAX - 1;

/// How the age of a priority request is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryPolicy {
    /// Age counted in blocks
    Blocks(u64),

    /// Age counted in seconds of block time
    Seconds(u64),
}

impl ExpiryPolicy {
    /// The configured threshold, in the policy's unit
    pub fn threshold(&self) -> u64 {
        match self {
            ExpiryPolicy::Blocks(n) | ExpiryPolicy::Seconds(n) => *n,
        }
    }

    /// Age of something submitted at `submitted`, seen at `now`
    pub fn age(&self, submitted: ChainTime, now: ChainTime) -> u64 {
        match self {
            ExpiryPolicy::Blocks(_) => now.block_number.saturating_sub(submitted.block_number),
            ExpiryPolicy::Seconds(_) => now.timestamp.saturating_sub(submitted.timestamp),
        }
    }

    /// True once the age strictly exceeds the threshold
    pub fn is_expired(&self, submitted: ChainTime, now: ChainTime) -> bool {
        self.age(submitted, now) > self.threshold()
    }

    /// Units left before [`ExpiryPolicy::is_expired`] turns true
    pub fn remaining(&self, submitted: ChainTime, now: ChainTime) -> u64 {
        self.threshold().saturating_add(1).saturating_sub(self.age(submitted, now))
    }

    fn unit(&self) -> &'static str {
        match self {
            ExpiryPolicy::Blocks(_) => "blocks",
            ExpiryPolicy::Seconds(_) => "seconds",
        }
    }
}

impl std::fmt::Display for ExpiryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.threshold(), self.unit())
    }
}

/// Desert mode configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesertConfig {
    /// Expiry window after which an unprocessed priority request unlocks desert mode
    pub expiry: ExpiryPolicy,

    /// Largest account index accepted in an exit claim
    pub max_account_index: AccountId,

    /// Reserved account that can never exit
    pub special_account_id: AccountId,

    /// Largest asset id accepted for deposits
    pub max_asset_id: AssetId,

    /// Largest single deposit
    pub max_deposit_amount: u128,
}

impl Default for DesertConfig {
    fn default() -> Self {
        Self {
            expiry: ExpiryPolicy::Blocks(DEFAULT_PRIORITY_EXPIRATION_BLOCKS),
            max_account_index: DEFAULT_MAX_ACCOUNT_INDEX,
            special_account_id: 0,
            max_asset_id: AssetId::MAX,
            max_deposit_amount: u128::MAX,
        }
    }
}

impl DesertConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> DesertResult<Self> {
        let config: DesertConfig =
            serde_json::from_str(json).map_err(|e| DesertError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> DesertResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| DesertError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Check internal consistency
    pub fn validate(&self) -> DesertResult<()> {
        if self.expiry.threshold() == 0 {
            return Err(DesertError::Config("expiry threshold must be non-zero".to_string()));
        }

        if self.max_deposit_amount == 0 {
            return Err(DesertError::Config("max_deposit_amount must be non-zero".to_string()));
        }

        if self.special_account_id > self.max_account_index {
            return Err(DesertError::Config(format!(
                "special account {} is above max account index {}",
                self.special_account_id, self.max_account_index
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DesertConfig::from_json_str(r#"{ "expiry": { "seconds": 86400 } }"#).unwrap();

        assert_eq!(config.expiry, ExpiryPolicy::Seconds(86_400));
        assert_eq!(config.max_account_index, DEFAULT_MAX_ACCOUNT_INDEX);
        assert_eq!(config.special_account_id, 0);
    }

    #[test]
    fn test_expiry_is_written_as_tagged_json() {
        let json = serde_json::to_string(&ExpiryPolicy::Blocks(5)).unwrap();
        assert_eq!(json, r#"{"blocks":5}"#);

        let config = DesertConfig {
            expiry: ExpiryPolicy::Seconds(30),
            ..DesertConfig::default()
        };
        let written = serde_json::to_string(&config).unwrap();
        assert_eq!(DesertConfig::from_json_str(&written).unwrap(), config);
    }

    #[test]
    fn test_zero_expiry_rejected() {
        let result = DesertConfig::from_json_str(r#"{ "expiry": { "blocks": 0 } }"#);
        assert!(matches!(result, Err(DesertError::Config(_))));
    }

    #[test]
    fn test_expiry_is_strict() {
        let policy = ExpiryPolicy::Blocks(10);
        let submitted = ChainTime::new(100, 0);

        assert!(!policy.is_expired(submitted, ChainTime::new(110, 0)));
        assert_eq!(policy.remaining(submitted, ChainTime::new(110, 0)), 1);
        assert!(policy.is_expired(submitted, ChainTime::new(111, 0)));
        assert_eq!(policy.remaining(submitted, ChainTime::new(111, 0)), 0);
    }

    #[test]
    fn test_seconds_policy_ignores_blocks() {
        let policy = ExpiryPolicy::Seconds(60);
        let submitted = ChainTime::new(1, 1_000);

        assert!(!policy.is_expired(submitted, ChainTime::new(1_000_000, 1_060)));
        assert!(policy.is_expired(submitted, ChainTime::new(2, 1_061)));
    }
}
