// src/bridge/transfer.rs
//! Outbound value transfer
//!
//! The only way value leaves the system. Called strictly after the pending
//! ledger has been debited, so a transfer that re-enters sees the debit.

use crate::desert::NftExitData;
use crate::{AssetId, L1Address, NftIndex};

/// Moves value out to an L1 address
pub trait ValueTransfer {
    /// Pay `amount` of `asset_id` to `to`
    fn transfer(&mut self, to: &L1Address, asset_id: AssetId, amount: u128) -> Result<(), String>;

    /// Hand `nft` over to `to`
    fn transfer_nft(&mut self, to: &L1Address, nft: &NftExitData) -> Result<(), String>;
}

/// A completed payout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payout {
    /// Fungible payout
    Asset {
        /// Recipient
        to: L1Address,
        /// Asset id
        asset_id: AssetId,
        /// Amount
        amount: u128,
    },

    /// NFT payout
    Nft {
        /// Recipient
        to: L1Address,
        /// NFT index
        nft_index: NftIndex,
    },
}

/// Transfer that records payouts in memory and can be told to refuse them
#[derive(Debug, Clone, Default)]
pub struct RecordingTransfer {
    payouts: Vec<Payout>,
    failing: bool,
}

impl RecordingTransfer {
    /// Create a transfer that accepts every payout
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent payouts fail (or succeed again)
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Payouts made so far
    pub fn payouts(&self) -> &[Payout] {
        &self.payouts
    }

    /// Total paid to `to` in `asset_id`
    pub fn paid_to(&self, to: &L1Address, asset_id: AssetId) -> u128 {
        self.payouts
            .iter()
            .filter_map(|payout| match payout {
                Payout::Asset {
                    to: recipient,
                    asset_id: asset,
                    amount,
                } if recipient == to && *asset == asset_id => Some(*amount),
                _ => None,
            })
            .sum()
    }
}

impl ValueTransfer for RecordingTransfer {
    fn transfer(&mut self, to: &L1Address, asset_id: AssetId, amount: u128) -> Result<(), String> {
        if self.failing {
            return Err(format!("payout of {} (asset {}) refused", amount, asset_id));
        }
        self.payouts.push(Payout::Asset {
            to: *to,
            asset_id,
            amount,
        });
        Ok(())
    }

    fn transfer_nft(&mut self, to: &L1Address, nft: &NftExitData) -> Result<(), String> {
        if self.failing {
            return Err(format!("payout of nft {} refused", nft.nft_index));
        }
        self.payouts.push(Payout::Nft {
            to: *to,
            nft_index: nft.nft_index,
        });
        Ok(())
    }
}
