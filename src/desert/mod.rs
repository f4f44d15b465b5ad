// src/desert/mod.rs
//! Desert mode
//!
//! Exit data, the replay-protection ledger, JSON exit claims and the
//! controller tying them to the bridge.

mod claim;
mod controller;
mod exit_data;
mod exit_ledger;

pub use claim::{AssetExitClaim, NftExitClaim};
pub use controller::{ActivationOutcome, DesertController, DesertState, Mode};
pub use exit_data::{
    AccountExitData, AssetExitData, ExitKey, ExitSubject, NftExitData, ACCOUNT_LEAF_TAG,
    ASSET_LEAF_TAG, NFT_LEAF_TAG,
};
pub use exit_ledger::ExitLedger;
