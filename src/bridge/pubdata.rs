// src/bridge/pubdata.rs
//! Priority operation pubdata
//!
//! Pubdata is the borsh encoding of a [`PriorityOperation`]. The same bytes
//! are published when the request is enqueued and must be presented back,
//! byte for byte, to refund the request in desert mode.

use crate::desert::NftExitData;
use crate::error_handling::{DesertError, DesertResult};
use crate::{AccountId, AssetId, L1Address};
use borsh::{BorshDeserialize, BorshSerialize};
use std::fmt;

/// Kind of a priority operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum PriorityOpType {
    /// Fungible deposit
    Deposit,

    /// NFT deposit
    DepositNft,

    /// Forced exit requested on L1
    FullExit,
}

impl PriorityOpType {
    /// True for operations that locked value on L1 and owe a refund if cancelled
    pub fn is_deposit(&self) -> bool {
        matches!(self, PriorityOpType::Deposit | PriorityOpType::DepositNft)
    }
}

impl fmt::Display for PriorityOpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityOpType::Deposit => write!(f, "Deposit"),
            PriorityOpType::DepositNft => write!(f, "DepositNft"),
            PriorityOpType::FullExit => write!(f, "FullExit"),
        }
    }
}

/// Deposit pubdata
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct DepositPubdata {
    /// Depositor, refunded on cancellation
    pub owner: L1Address,

    /// Asset id
    pub asset_id: AssetId,

    /// Amount locked on L1
    pub amount: u128,
}

/// NFT deposit pubdata
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct DepositNftPubdata {
    /// Depositor, refunded on cancellation
    pub owner: L1Address,

    /// NFT being deposited; `owner_account_index` is the target L2 account
    pub nft: NftExitData,
}

/// Full exit pubdata
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct FullExitPubdata {
    /// Account to exit
    pub account_id: AccountId,

    /// Requesting L1 address
    pub owner: L1Address,

    /// Asset to exit
    pub asset_id: AssetId,
}

/// An L1 originated operation awaiting inclusion
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum PriorityOperation {
    /// Fungible deposit
    Deposit(DepositPubdata),

    /// NFT deposit
    DepositNft(DepositNftPubdata),

    /// Forced exit
    FullExit(FullExitPubdata),
}

impl PriorityOperation {
    /// Kind of this operation
    pub fn op_type(&self) -> PriorityOpType {
        match self {
            PriorityOperation::Deposit(_) => PriorityOpType::Deposit,
            PriorityOperation::DepositNft(_) => PriorityOpType::DepositNft,
            PriorityOperation::FullExit(_) => PriorityOpType::FullExit,
        }
    }

    /// Encode as pubdata
    pub fn encode(&self) -> DesertResult<Vec<u8>> {
        Ok(self.try_to_vec()?)
    }

    /// Decode pubdata
    pub fn decode(pubdata: &[u8]) -> DesertResult<Self> {
        Self::try_from_slice(pubdata).map_err(|e| {
            DesertError::PreconditionViolation(format!("malformed pubdata: {}", e))
        })
    }
}
