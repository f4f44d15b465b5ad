// src/bridge/mod.rs
//! Bridge module
//!
//! The L1 side of the bridge as seen by desert mode: the priority request
//! queue fed by deposits, the pending balance ledger every payout goes through,
//! and the narrow transfer interface that actually moves value out.

mod pending_balance;
mod priority_queue;
mod pubdata;
mod transfer;

pub use pending_balance::PendingBalanceLedger;
pub use priority_queue::{CancelledRequest, PriorityQueue, PriorityRequest, Refund};
pub use pubdata::{
    DepositNftPubdata, DepositPubdata, FullExitPubdata, PriorityOpType, PriorityOperation,
};
pub use transfer::{Payout, RecordingTransfer, ValueTransfer};
