// src/desert/exit_ledger.rs
//! Exit ledger: the set of exit keys already consumed

use super::exit_data::ExitKey;
use crate::error_handling::{DesertError, DesertResult};
use borsh::{BorshDeserialize, BorshSerialize};
use std::collections::BTreeSet;

/// Record of finalized exits
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ExitLedger {
    /// Consumed exit keys
    consumed: BTreeSet<ExitKey>,
}

impl ExitLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` has already been exited
    pub fn is_consumed(&self, key: &ExitKey) -> bool {
        self.consumed.contains(key)
    }

    /// Fail with a replay violation if `key` was already exited
    pub fn ensure_unconsumed(&self, key: &ExitKey) -> DesertResult<()> {
        if self.is_consumed(key) {
            return Err(DesertError::ReplayViolation(format!(
                "exit {} already performed",
                key
            )));
        }
        Ok(())
    }

    /// Check a batch: none consumed and no key repeated within the batch
    pub fn ensure_batch_unconsumed(&self, keys: &[ExitKey]) -> DesertResult<()> {
        let mut seen = BTreeSet::new();
        for key in keys {
            self.ensure_unconsumed(key)?;
            if !seen.insert(*key) {
                return Err(DesertError::ReplayViolation(format!(
                    "exit {} appears twice in the same claim",
                    key
                )));
            }
        }
        Ok(())
    }

    /// Check-and-set a single key
    pub fn mark(&mut self, key: ExitKey) -> DesertResult<()> {
        if !self.consumed.insert(key) {
            return Err(DesertError::ReplayViolation(format!(
                "exit {} already performed",
                key
            )));
        }
        Ok(())
    }

    /// Mark a batch atomically: either every key is marked or none is
    pub fn mark_all(&mut self, keys: &[ExitKey]) -> DesertResult<()> {
        self.ensure_batch_unconsumed(keys)?;
        self.consumed.extend(keys.iter().copied());
        Ok(())
    }

    /// Number of finalized exits
    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    /// True if no exit was performed yet
    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }

    /// Iterate over consumed keys in order
    pub fn iter(&self) -> impl Iterator<Item = &ExitKey> {
        self.consumed.iter()
    }
}
