// src/clock.rs
//! Chain clock supplied by the execution environment
//!
//! Expiry is measured against block height or block timestamp. Callers never
//! provide the time themselves; the controller reads it from a [`ChainClock`].

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A point on the chain clock
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct ChainTime {
    /// Block height
    pub block_number: u64,

    /// Block timestamp in seconds
    pub timestamp: u64,
}

impl ChainTime {
    /// Create a new chain time
    pub fn new(block_number: u64, timestamp: u64) -> Self {
        Self {
            block_number,
            timestamp,
        }
    }
}

/// Source of the current chain time. Must never go backwards.
pub trait ChainClock {
    /// Current block height and timestamp
    fn now(&self) -> ChainTime;
}

/// Clock driven by the host environment.
///
/// Cloning yields another handle to the same clock, so the host can keep one
/// handle to advance time after moving the other into a controller.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    block_number: Arc<AtomicU64>,
    timestamp: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock starting at `start`
    pub fn new(start: ChainTime) -> Self {
        Self {
            block_number: Arc::new(AtomicU64::new(start.block_number)),
            timestamp: Arc::new(AtomicU64::new(start.timestamp)),
        }
    }

    /// Mine `blocks` blocks without moving the timestamp
    pub fn advance_blocks(&self, blocks: u64) {
        self.block_number.fetch_add(blocks, Ordering::SeqCst);
    }

    /// Move the timestamp forward by `seconds`
    pub fn advance_seconds(&self, seconds: u64) {
        self.timestamp.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Mine `blocks` blocks spanning `seconds` seconds
    pub fn advance(&self, blocks: u64, seconds: u64) {
        self.advance_blocks(blocks);
        self.advance_seconds(seconds);
    }
}

impl ChainClock for ManualClock {
    fn now(&self) -> ChainTime {
        ChainTime {
            block_number: self.block_number.load(Ordering::SeqCst),
            timestamp: self.timestamp.load(Ordering::SeqCst),
        }
    }
}
