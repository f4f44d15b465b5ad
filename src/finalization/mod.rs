// src/finalization/mod.rs
//! Finalization module
//!
//! Tracks which rollup blocks have been verified on L1. Desert mode freezes the
//! state root of the last verified block; exit claims must reference it.

mod block_commitment;

pub use block_commitment::{CommitmentCheck, CommittedBlocks, OnchainWithdrawal, StoredBlockInfo};
