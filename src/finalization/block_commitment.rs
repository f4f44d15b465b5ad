// src/finalization/block_commitment.rs
//! Block commitment tracking
//!
//! Keeps the hash of every verified block and the full info of the last one.
//! A caller-supplied [`StoredBlockInfo`] is trusted only when its hash matches
//! the hash recorded for the last verified block.

use crate::error_handling::{DesertError, DesertResult};
use crate::{AssetId, Hash, L1Address};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_program::keccak;
use std::collections::BTreeMap;

/// The last block the operator is credited with
#[derive(
    Debug, Clone, PartialEq, Eq, Default, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct StoredBlockInfo {
    /// Number of transactions the block was sized for
    pub block_size: u16,

    /// Block number
    pub block_number: u32,

    /// Priority operations included in the block
    pub priority_operations: u64,

    /// Hash of the onchain operations pending execution
    pub pending_onchain_operations_hash: Hash,

    /// Block timestamp
    pub timestamp: u64,

    /// State root after the block
    pub state_root: Hash,

    /// Commitment over the block data
    pub commitment: Hash,
}

impl StoredBlockInfo {
    /// Genesis block carrying the initial state root
    pub fn genesis(state_root: Hash) -> Self {
        Self {
            state_root,
            ..Self::default()
        }
    }

    /// Binding hash over every field
    pub fn hash(&self) -> Hash {
        keccak::hashv(&[
            &self.block_size.to_be_bytes(),
            &self.block_number.to_be_bytes(),
            &self.priority_operations.to_be_bytes(),
            &self.pending_onchain_operations_hash,
            &self.timestamp.to_be_bytes(),
            &self.state_root,
            &self.commitment,
        ])
        .to_bytes()
    }
}

/// An ordinary withdrawal executed by a verified block
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct OnchainWithdrawal {
    /// Recipient
    pub owner: L1Address,

    /// Asset id
    pub asset_id: AssetId,

    /// Amount credited to the pending balance
    pub amount: u128,
}

/// Confirms a block info was accepted as the canonical last block
pub trait CommitmentCheck {
    /// True if `block` is the last accepted block
    fn is_accepted(&self, block: &StoredBlockInfo) -> bool;
}

/// Verified blocks, by number
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CommittedBlocks {
    /// Hash of every verified block
    stored_block_hashes: BTreeMap<u32, Hash>,

    /// Last verified block
    last_block: StoredBlockInfo,
}

impl CommittedBlocks {
    /// Start from the genesis block
    pub fn new(genesis_state_root: Hash) -> Self {
        let genesis = StoredBlockInfo::genesis(genesis_state_root);
        let mut stored_block_hashes = BTreeMap::new();
        stored_block_hashes.insert(genesis.block_number, genesis.hash());

        Self {
            stored_block_hashes,
            last_block: genesis,
        }
    }

    /// Last verified block
    pub fn last_block(&self) -> &StoredBlockInfo {
        &self.last_block
    }

    /// Number of the last verified block
    pub fn last_block_number(&self) -> u32 {
        self.last_block.block_number
    }

    /// Hash recorded for `block_number`
    pub fn block_hash(&self, block_number: u32) -> Option<&Hash> {
        self.stored_block_hashes.get(&block_number)
    }

    /// Check that `block` may follow the last verified block
    pub fn ensure_next(&self, block: &StoredBlockInfo) -> DesertResult<()> {
        let expected = self.last_block.block_number.checked_add(1).ok_or_else(|| {
            DesertError::PreconditionViolation("block number space exhausted".to_string())
        })?;

        if block.block_number != expected {
            return Err(DesertError::PreconditionViolation(format!(
                "expected block {}, got block {}",
                expected, block.block_number
            )));
        }

        Ok(())
    }

    /// Record `block` as the last verified block
    pub fn accept(&mut self, block: StoredBlockInfo) -> DesertResult<()> {
        self.ensure_next(&block)?;
        self.stored_block_hashes.insert(block.block_number, block.hash());
        self.last_block = block;
        Ok(())
    }
}

impl CommitmentCheck for CommittedBlocks {
    fn is_accepted(&self, block: &StoredBlockInfo) -> bool {
        block.block_number == self.last_block.block_number
            && self.stored_block_hashes.get(&block.block_number) == Some(&block.hash())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(block_number: u32, state_root: Hash) -> StoredBlockInfo {
        StoredBlockInfo {
            block_size: 8,
            block_number,
            priority_operations: 0,
            pending_onchain_operations_hash: [0; 32],
            timestamp: 1_000 + block_number as u64,
            state_root,
            commitment: [block_number as u8; 32],
        }
    }

    #[test]
    fn test_hash_binds_every_field() {
        let original = block(1, [1; 32]);
        let mut tampered = original.clone();
        tampered.state_root = [2; 32];

        assert_ne!(original.hash(), tampered.hash());
    }

    #[test]
    fn test_only_last_block_is_accepted() {
        let mut blocks = CommittedBlocks::new([9; 32]);
        assert!(blocks.is_accepted(&StoredBlockInfo::genesis([9; 32])));

        let first = block(1, [1; 32]);
        blocks.accept(first.clone()).unwrap();
        assert!(blocks.is_accepted(&first));
        assert!(!blocks.is_accepted(&StoredBlockInfo::genesis([9; 32])));

        let mut forged = first.clone();
        forged.state_root = [7; 32];
        assert!(!blocks.is_accepted(&forged));
    }

    #[test]
    fn test_blocks_must_be_sequential() {
        let mut blocks = CommittedBlocks::new([0; 32]);

        assert!(matches!(
            blocks.accept(block(2, [2; 32])),
            Err(DesertError::PreconditionViolation(_))
        ));
        blocks.accept(block(1, [1; 32])).unwrap();
        assert_eq!(blocks.last_block_number(), 1);
        assert!(blocks.block_hash(0).is_some());
    }
}
