// src/events.rs
//! Observable events
//!
//! Buffered by the controller and only pushed after the state change they
//! describe has been committed.

use crate::bridge::PriorityOpType;
use crate::clock::ChainTime;
use crate::desert::ExitKey;
use crate::{AssetId, Hash, L1Address, NftIndex};

/// Event emitted by the desert controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesertEvent {
    /// Desert mode was entered
    DesertModeActivated {
        /// Frozen state root
        frozen_state_root: Hash,
        /// Last verified block at activation
        block_number: u32,
        /// Chain time of activation
        at: ChainTime,
    },

    /// A block was verified in normal mode
    BlockVerified {
        /// Block number
        block_number: u32,
        /// New state root
        state_root: Hash,
        /// Priority requests the block consumed
        priority_operations: u64,
    },

    /// A priority request was enqueued
    PriorityRequestEnqueued {
        /// Sequence number
        sequence_number: u64,
        /// Operation kind
        op_type: PriorityOpType,
        /// Pubdata to keep for a possible refund
        pubdata: Vec<u8>,
        /// Keccak digest of the pubdata, truncated to 20 bytes
        hashed_pubdata: [u8; 20],
    },

    /// An outstanding priority request was cancelled in desert mode
    DepositCancelled {
        /// Sequence number
        sequence_number: u64,
    },

    /// An asset exit was finalized
    ExitFinalized {
        /// Consumed key
        key: ExitKey,
        /// Credited owner
        owner: L1Address,
        /// Credited amount
        amount: u128,
    },

    /// An NFT exit was finalized
    NftExitFinalized {
        /// Consumed key
        key: ExitKey,
        /// New owner
        owner: L1Address,
    },

    /// A pending balance was paid out
    Withdrawal {
        /// Recipient
        owner: L1Address,
        /// Asset id
        asset_id: AssetId,
        /// Amount
        amount: u128,
    },

    /// A pending NFT was paid out
    NftWithdrawn {
        /// Recipient
        owner: L1Address,
        /// NFT index
        nft_index: NftIndex,
    },
}
