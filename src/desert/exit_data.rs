// src/desert/exit_data.rs
//! Leaves an exit claim proves against the frozen state
//!
//! Each leaf has a canonical byte encoding starting with a one-byte tag, so an
//! account leaf can never be presented as an asset leaf or the other way round.

use crate::{AccountId, AssetId, Hash, L1Address, NftIndex};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag of an account leaf encoding
pub const ACCOUNT_LEAF_TAG: u8 = 0x0a;

/// Tag of an asset balance leaf encoding
pub const ASSET_LEAF_TAG: u8 = 0x0b;

/// Tag of an NFT leaf encoding
pub const NFT_LEAF_TAG: u8 = 0x0c;

/// Asset balance held by an account at the frozen root
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct AssetExitData {
    /// Asset id
    pub asset_id: AssetId,

    /// Balance at the frozen root
    pub amount: u128,

    /// Offer bookkeeping carried in the leaf
    pub offer_canceled_or_finalized: u128,
}

impl AssetExitData {
    /// Leaf encoding; bound to the owning account
    pub fn leaf_bytes(&self, account_id: AccountId) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + 4 + 2 + 16 + 16);
        bytes.push(ASSET_LEAF_TAG);
        bytes.extend_from_slice(&account_id.to_be_bytes());
        bytes.extend_from_slice(&self.asset_id.to_be_bytes());
        bytes.extend_from_slice(&self.amount.to_be_bytes());
        bytes.extend_from_slice(&self.offer_canceled_or_finalized.to_be_bytes());
        bytes
    }
}

/// Account leaf at the frozen root
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct AccountExitData {
    /// Account index in the state tree
    pub account_id: AccountId,

    /// L1 address that receives the exited funds
    pub l1_address: L1Address,

    /// Public key X coordinate
    pub pub_key_x: Hash,

    /// Public key Y coordinate
    pub pub_key_y: Hash,

    /// Account nonce
    pub nonce: u64,

    /// Collection nonce
    pub collection_nonce: u64,
}

impl AccountExitData {
    /// Leaf encoding
    pub fn leaf_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + 4 + 20 + 32 + 32 + 8 + 8);
        bytes.push(ACCOUNT_LEAF_TAG);
        bytes.extend_from_slice(&self.account_id.to_be_bytes());
        bytes.extend_from_slice(&self.l1_address);
        bytes.extend_from_slice(&self.pub_key_x);
        bytes.extend_from_slice(&self.pub_key_y);
        bytes.extend_from_slice(&self.nonce.to_be_bytes());
        bytes.extend_from_slice(&self.collection_nonce.to_be_bytes());
        bytes
    }
}

/// NFT leaf at the frozen NFT root
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct NftExitData {
    /// NFT index in the NFT tree
    pub nft_index: NftIndex,

    /// Current owner account
    pub owner_account_index: AccountId,

    /// Creator account
    pub creator_account_index: AccountId,

    /// Creator royalty rate in basis points
    pub creator_treasury_rate: u16,

    /// Collection id
    pub collection_id: u64,

    /// Content hash, split in two 32-byte halves
    pub content_hash: [Hash; 2],

    /// Content type
    pub content_type: u8,
}

impl NftExitData {
    /// Leaf encoding
    pub fn leaf_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + 8 + 4 + 4 + 2 + 8 + 64 + 1);
        bytes.push(NFT_LEAF_TAG);
        bytes.extend_from_slice(&self.nft_index.to_be_bytes());
        bytes.extend_from_slice(&self.owner_account_index.to_be_bytes());
        bytes.extend_from_slice(&self.creator_account_index.to_be_bytes());
        bytes.extend_from_slice(&self.creator_treasury_rate.to_be_bytes());
        bytes.extend_from_slice(&self.collection_id.to_be_bytes());
        bytes.extend_from_slice(&self.content_hash[0]);
        bytes.extend_from_slice(&self.content_hash[1]);
        bytes.push(self.content_type);
        bytes
    }
}

/// What an exit releases
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize,
)]
pub enum ExitSubject {
    /// A fungible asset balance
    Asset(AssetId),

    /// A single NFT
    Nft(NftIndex),
}

/// Anti-replay key: at most one successful exit per key
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize,
)]
pub struct ExitKey {
    /// Frozen root the exit was proven against
    pub root: Hash,

    /// Exiting account
    pub account_id: AccountId,

    /// Asset or NFT released
    pub subject: ExitSubject,
}

impl ExitKey {
    /// Key of an asset exit under the frozen state root
    pub fn asset(state_root: Hash, account_id: AccountId, asset_id: AssetId) -> Self {
        Self {
            root: state_root,
            account_id,
            subject: ExitSubject::Asset(asset_id),
        }
    }

    /// Key of an NFT exit under the frozen NFT root
    pub fn nft(nft_root: Hash, account_id: AccountId, nft_index: NftIndex) -> Self {
        Self {
            root: nft_root,
            account_id,
            subject: ExitSubject::Nft(nft_index),
        }
    }
}

impl fmt::Display for ExitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = hex::encode(&self.root[..4]);
        match self.subject {
            ExitSubject::Asset(asset_id) => {
                write!(f, "0x{}../account/{}/asset/{}", root, self.account_id, asset_id)
            }
            ExitSubject::Nft(nft_index) => {
                write!(f, "0x{}../account/{}/nft/{}", root, self.account_id, nft_index)
            }
        }
    }
}
