// src/bridge/pending_balance.rs
//! Pending balance ledger
//!
//! Every credited value (executed withdrawals, desert exits, deposit refunds)
//! lands here first, and the only way out is [`PendingBalanceLedger::withdraw`]
//! or [`PendingBalanceLedger::withdraw_nft`].

use super::transfer::ValueTransfer;
use crate::desert::NftExitData;
use crate::error_handling::{DesertError, DesertResult};
use crate::{AssetId, L1Address, NftIndex};
use borsh::{BorshDeserialize, BorshSerialize};
use log::warn;
use std::collections::BTreeMap;

/// Withdrawable balances and NFTs
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct PendingBalanceLedger {
    /// Balance per (owner, asset)
    balances: BTreeMap<(L1Address, AssetId), u128>,

    /// NFTs per (owner, index), oldest credit first
    nfts: BTreeMap<(L1Address, NftIndex), Vec<NftExitData>>,
}

impl PendingBalanceLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Withdrawable amount of `asset_id` for `owner`
    pub fn balance_of(&self, owner: &L1Address, asset_id: AssetId) -> u128 {
        self.balances.get(&(*owner, asset_id)).copied().unwrap_or(0)
    }

    /// Sum of all pending balances of `asset_id`
    pub fn total_pending(&self, asset_id: AssetId) -> u128 {
        self.balances
            .iter()
            .filter(|((_, asset), _)| *asset == asset_id)
            .fold(0u128, |total, (_, amount)| total.saturating_add(*amount))
    }

    /// Next pending NFT `nft_index` for `owner`
    pub fn pending_nft(&self, owner: &L1Address, nft_index: NftIndex) -> Option<&NftExitData> {
        self.nfts.get(&(*owner, nft_index)).and_then(|queue| queue.first())
    }

    /// Number of pending credits of NFT `nft_index` for `owner`
    pub fn pending_nft_count(&self, owner: &L1Address, nft_index: NftIndex) -> usize {
        self.nfts.get(&(*owner, nft_index)).map_or(0, Vec::len)
    }

    /// Check that `amount` can be credited without overflow
    pub fn ensure_can_credit(&self, owner: &L1Address, asset_id: AssetId, amount: u128) -> DesertResult<()> {
        self.balance_of(owner, asset_id)
            .checked_add(amount)
            .map(|_| ())
            .ok_or_else(|| {
                DesertError::PreconditionViolation(format!(
                    "pending balance of 0x{} for asset {} would overflow",
                    hex::encode(owner),
                    asset_id
                ))
            })
    }

    /// Credit `amount` of `asset_id` to `owner`
    pub(crate) fn credit(&mut self, owner: &L1Address, asset_id: AssetId, amount: u128) -> DesertResult<()> {
        self.ensure_can_credit(owner, asset_id, amount)?;
        if amount == 0 {
            return Ok(());
        }
        *self.balances.entry((*owner, asset_id)).or_insert(0) += amount;
        Ok(())
    }

    /// Credit an NFT to `owner`.
    ///
    /// Credits never collide: an exit and a deposit refund of the same index
    /// queue up side by side. Exit replay is guarded by the exit ledger.
    pub(crate) fn credit_nft(&mut self, owner: &L1Address, nft: NftExitData) {
        self.nfts.entry((*owner, nft.nft_index)).or_default().push(nft);
    }

    /// Pay out `amount` of `asset_id` to `owner`.
    ///
    /// The ledger is debited before `transfer` runs. If the transfer fails the
    /// debit is rolled back and the call reports the failure.
    pub fn withdraw<T: ValueTransfer + ?Sized>(
        &mut self,
        owner: &L1Address,
        asset_id: AssetId,
        amount: u128,
        transfer: &mut T,
    ) -> DesertResult<()> {
        if amount == 0 {
            return Err(DesertError::PreconditionViolation(
                "withdrawal amount must be non-zero".to_string(),
            ));
        }

        let balance = self.balance_of(owner, asset_id);
        if amount > balance {
            return Err(DesertError::PreconditionViolation(format!(
                "insufficient pending balance: requested {}, available {}",
                amount, balance
            )));
        }

        self.set_balance(owner, asset_id, balance - amount);

        if let Err(reason) = transfer.transfer(owner, asset_id, amount) {
            warn!(
                "payout to 0x{} failed, restoring pending balance: {}",
                hex::encode(owner),
                reason
            );
            self.set_balance(owner, asset_id, balance);
            return Err(DesertError::TransferFailed(reason));
        }

        Ok(())
    }

    /// Pay out the oldest pending credit of NFT `nft_index` to `owner`
    pub fn withdraw_nft<T: ValueTransfer + ?Sized>(
        &mut self,
        owner: &L1Address,
        nft_index: NftIndex,
        transfer: &mut T,
    ) -> DesertResult<NftExitData> {
        let key = (*owner, nft_index);
        let nft = match self.nfts.get_mut(&key) {
            Some(queue) if !queue.is_empty() => queue.remove(0),
            _ => {
                return Err(DesertError::PreconditionViolation(format!(
                    "nft {} is not pending withdrawal for 0x{}",
                    nft_index,
                    hex::encode(owner)
                )))
            }
        };

        if let Err(reason) = transfer.transfer_nft(owner, &nft) {
            warn!("payout of nft {} failed, restoring it: {}", nft_index, reason);
            self.nfts.entry(key).or_default().insert(0, nft);
            return Err(DesertError::TransferFailed(reason));
        }

        if self.nfts.get(&key).map_or(false, Vec::is_empty) {
            self.nfts.remove(&key);
        }
        Ok(nft)
    }

    fn set_balance(&mut self, owner: &L1Address, asset_id: AssetId, amount: u128) {
        if amount == 0 {
            self.balances.remove(&(*owner, asset_id));
        } else {
            self.balances.insert((*owner, asset_id), amount);
        }
    }
}
