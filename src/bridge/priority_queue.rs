// src/bridge/priority_queue.rs
//! Priority request queue
//!
//! Append-only FIFO of L1 originated operations. A request leaves the open set
//! in exactly one of two ways: it is included by a verified block, or it is
//! cancelled and refunded in desert mode. Both remove from the front.

use super::pubdata::{PriorityOpType, PriorityOperation};
use crate::clock::ChainTime;
use crate::desert::NftExitData;
use crate::error_handling::{DesertError, DesertResult};
use crate::{AssetId, L1Address};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::keccak;
use std::collections::BTreeMap;

/// A pending L1 operation
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct PriorityRequest {
    /// Monotonic sequence number
    pub sequence_number: u64,

    /// Chain time of submission
    pub submitted_at: ChainTime,

    /// Operation kind
    pub op_type: PriorityOpType,

    /// Encoded operation
    pub pubdata: Vec<u8>,
}

impl PriorityRequest {
    /// Truncated keccak of the pubdata, as published in events
    pub fn hashed_pubdata(&self) -> [u8; 20] {
        let digest = keccak::hash(&self.pubdata).to_bytes();
        let mut hashed = [0u8; 20];
        hashed.copy_from_slice(&digest[12..]);
        hashed
    }
}

/// What a cancelled request gives back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refund {
    /// Fungible amount back to the depositor's pending balance
    Balance {
        /// Depositor
        owner: L1Address,
        /// Asset id
        asset_id: AssetId,
        /// Amount
        amount: u128,
    },

    /// NFT back to the depositor
    Nft {
        /// Depositor
        owner: L1Address,
        /// The deposited NFT
        nft: NftExitData,
    },

    /// Nothing was locked (forced exit requests)
    Nothing,
}

/// A request selected for cancellation together with its refund
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelledRequest {
    /// Sequence number of the cancelled request
    pub sequence_number: u64,

    /// Refund owed
    pub refund: Refund,
}

/// Priority request queue
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct PriorityQueue {
    /// Open requests by sequence number
    requests: BTreeMap<u64, PriorityRequest>,

    /// Sequence number of the next request
    next_sequence: u64,
}

impl PriorityQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `operation`; returns the stored request
    pub fn enqueue(
        &mut self,
        operation: &PriorityOperation,
        now: ChainTime,
    ) -> DesertResult<&PriorityRequest> {
        let sequence_number = self.next_sequence;
        let next_sequence = sequence_number.checked_add(1).ok_or_else(|| {
            DesertError::PreconditionViolation("priority sequence exhausted".to_string())
        })?;

        let request = PriorityRequest {
            sequence_number,
            submitted_at: now,
            op_type: operation.op_type(),
            pubdata: operation.encode()?,
        };

        self.next_sequence = next_sequence;
        Ok(&*self.requests.entry(sequence_number).or_insert(request))
    }

    /// Number of open requests
    pub fn open_count(&self) -> u64 {
        self.requests.len() as u64
    }

    /// Sequence number the next request will get
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Oldest open request
    pub fn oldest_open(&self) -> Option<&PriorityRequest> {
        self.requests.values().next()
    }

    /// Open request by sequence number
    pub fn get(&self, sequence_number: u64) -> Option<&PriorityRequest> {
        self.requests.get(&sequence_number)
    }

    /// Open requests, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &PriorityRequest> {
        self.requests.values()
    }

    /// Remove the first `count` requests, included by a verified block
    pub fn remove_included(&mut self, count: u64) -> DesertResult<Vec<PriorityRequest>> {
        if count > self.open_count() {
            return Err(DesertError::PreconditionViolation(format!(
                "block includes {} priority operations but only {} are open",
                count,
                self.open_count()
            )));
        }

        Ok(self.pop_front(count as usize))
    }

    /// Match the oldest open requests against caller-supplied pubdata.
    ///
    /// Pure: nothing is removed. Up to `up_to_count` requests are considered,
    /// oldest first. Each deposit consumes the next pubdata entry, which must
    /// equal the stored pubdata exactly; forced exits consume none. Any
    /// mismatch, a missing entry or a leftover entry fails the whole plan.
    pub fn plan_cancellation(
        &self,
        up_to_count: u64,
        pubdata_list: &[Vec<u8>],
    ) -> DesertResult<Vec<CancelledRequest>> {
        let to_process = up_to_count.min(self.open_count());
        if to_process == 0 {
            return Err(DesertError::PreconditionViolation(
                "no outstanding priority requests to cancel".to_string(),
            ));
        }

        let mut supplied = pubdata_list.iter();
        let mut plan = Vec::with_capacity(to_process as usize);

        for request in self.requests.values().take(to_process as usize) {
            let refund = if request.op_type.is_deposit() {
                let pubdata = supplied.next().ok_or_else(|| {
                    DesertError::PreconditionViolation(format!(
                        "missing pubdata for priority request #{}",
                        request.sequence_number
                    ))
                })?;

                if *pubdata != request.pubdata {
                    return Err(DesertError::PreconditionViolation(format!(
                        "pubdata mismatch for priority request #{}",
                        request.sequence_number
                    )));
                }

                match PriorityOperation::decode(pubdata)? {
                    PriorityOperation::Deposit(deposit) => Refund::Balance {
                        owner: deposit.owner,
                        asset_id: deposit.asset_id,
                        amount: deposit.amount,
                    },
                    PriorityOperation::DepositNft(deposit) => Refund::Nft {
                        owner: deposit.owner,
                        nft: deposit.nft,
                    },
                    PriorityOperation::FullExit(_) => {
                        return Err(DesertError::PreconditionViolation(format!(
                            "priority request #{} is tagged as a deposit but carries a full exit",
                            request.sequence_number
                        )))
                    }
                }
            } else {
                Refund::Nothing
            };

            plan.push(CancelledRequest {
                sequence_number: request.sequence_number,
                refund,
            });
        }

        if supplied.next().is_some() {
            return Err(DesertError::PreconditionViolation(format!(
                "more pubdata supplied than deposits among the first {} requests",
                to_process
            )));
        }

        Ok(plan)
    }

    /// Remove the requests of a plan built by [`PriorityQueue::plan_cancellation`]
    pub fn remove_cancelled(&mut self, plan: &[CancelledRequest]) -> DesertResult<()> {
        for (expected, request) in plan.iter().zip(self.requests.keys()) {
            if expected.sequence_number != *request {
                return Err(DesertError::ReplayViolation(format!(
                    "priority request #{} is no longer at the front of the queue",
                    expected.sequence_number
                )));
            }
        }
        if plan.len() > self.requests.len() {
            return Err(DesertError::ReplayViolation(
                "cancellation plan covers requests that are no longer open".to_string(),
            ));
        }

        self.pop_front(plan.len());
        Ok(())
    }

    fn pop_front(&mut self, count: usize) -> Vec<PriorityRequest> {
        let mut removed = Vec::with_capacity(count);
        for _ in 0..count {
            match self.requests.pop_first() {
                Some((_, request)) => removed.push(request),
                None => break,
            }
        }
        removed
    }
}
