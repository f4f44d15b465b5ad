// src/lib.rs
//! Desert mode for a Layer-2 rollup bridge
//!
//! When the operator stops processing priority requests, anyone can switch the
//! bridge into desert mode. From then on:
//! - no further blocks are accepted
//! - users exit balances and NFTs by proving them against the frozen state root
//! - still-queued deposits are refunded
//! - everything credited is paid out through the pending balance ledger
//!
//! [`DesertController`] owns the state; the chain clock, the Merkle verifier
//! and the outbound transfer are supplied through [`ChainClock`],
//! [`LeafVerifier`] and [`ValueTransfer`].

pub mod bridge;
pub mod clock;
pub mod config;
pub mod desert;
pub mod error_handling;
pub mod events;
pub mod finalization;
pub mod merkle;

/// 32-byte root or hash
pub type Hash = [u8; 32];

/// L1 address
pub type L1Address = [u8; 20];

/// Account index in the state tree
pub type AccountId = u32;

/// Asset id
pub type AssetId = u16;

/// NFT index in the NFT tree
pub type NftIndex = u64;

pub use bridge::{PriorityOpType, PriorityOperation, RecordingTransfer, ValueTransfer};
pub use clock::{ChainClock, ChainTime, ManualClock};
pub use config::{DesertConfig, ExpiryPolicy};
pub use desert::{
    AccountExitData, ActivationOutcome, AssetExitClaim, AssetExitData, DesertController, ExitKey,
    Mode, NftExitClaim, NftExitData,
};
pub use error_handling::{DesertError, DesertResult};
pub use events::DesertEvent;
pub use finalization::{OnchainWithdrawal, StoredBlockInfo};
pub use merkle::{LeafVerifier, Sha256MerkleVerifier, StateTreeBuilder};

/// Initialise `env_logger` from `RUST_LOG`. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(cfg!(test))
        .format_timestamp_millis()
        .try_init();
}
