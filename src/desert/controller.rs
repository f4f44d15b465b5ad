// src/desert/controller.rs
//! Desert Mode Controller
//!
//! Owns the whole persisted state and is the only place it changes. Every
//! public operation validates first and commits last, so a rejected call leaves
//! no trace. Events are pushed after the commit.

use super::claim::{AssetExitClaim, NftExitClaim};
use super::exit_data::{AccountExitData, AssetExitData, ExitKey, NftExitData};
use super::exit_ledger::ExitLedger;
use crate::bridge::{
    DepositNftPubdata, DepositPubdata, FullExitPubdata, PendingBalanceLedger,
    PriorityOperation, PriorityQueue, PriorityRequest, Refund, ValueTransfer,
};
use crate::clock::{ChainClock, ChainTime};
use crate::config::DesertConfig;
use crate::error_handling::{DesertError, DesertResult};
use crate::events::DesertEvent;
use crate::finalization::{CommitmentCheck, CommittedBlocks, OnchainWithdrawal, StoredBlockInfo};
use crate::merkle::LeafVerifier;
use crate::{AccountId, AssetId, Hash, L1Address, NftIndex};
use borsh::{BorshDeserialize, BorshSerialize};
use log::{debug, info, warn};

/// Operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Mode {
    /// Operator is live, blocks are verified
    Normal,

    /// Operator failed; exits against the frozen root are open. Terminal.
    Desert,
}

/// Result of an [`DesertController::activate`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// This call switched the controller to desert mode
    Activated,

    /// Desert mode was already active; nothing changed
    AlreadyActive,

    /// The oldest open request has not expired; nothing changed
    NotYetEligible,
}

/// Everything that must survive across calls
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct DesertState {
    /// Current mode
    pub mode: Mode,

    /// State root frozen at activation
    pub frozen_state_root: Option<Hash>,

    /// NFT root, pinned by the first authenticated exit claim
    pub frozen_nft_root: Option<Hash>,

    /// Chain time of activation
    pub activated_at: Option<ChainTime>,

    /// Verified blocks
    pub blocks: CommittedBlocks,

    /// Open priority requests
    pub priority_queue: PriorityQueue,

    /// Consumed exit keys
    pub exit_ledger: ExitLedger,

    /// Withdrawable balances and NFTs
    pub pending: PendingBalanceLedger,
}

impl DesertState {
    /// Fresh state at genesis
    pub fn new(genesis_state_root: Hash) -> Self {
        Self {
            mode: Mode::Normal,
            frozen_state_root: None,
            frozen_nft_root: None,
            activated_at: None,
            blocks: CommittedBlocks::new(genesis_state_root),
            priority_queue: PriorityQueue::new(),
            exit_ledger: ExitLedger::new(),
            pending: PendingBalanceLedger::new(),
        }
    }
}

/// Desert mode controller
pub struct DesertController<V, T, C> {
    config: DesertConfig,
    state: DesertState,
    verifier: V,
    transfer: T,
    clock: C,
    events: Vec<DesertEvent>,
}

fn log_rejection(operation: &str, err: DesertError) -> DesertError {
    warn!("{} rejected ({}): {}", operation, err.kind(), err);
    err
}

impl<V: LeafVerifier, T: ValueTransfer, C: ChainClock> DesertController<V, T, C> {
    /// Create a controller at genesis
    pub fn new(
        config: DesertConfig,
        genesis_state_root: Hash,
        verifier: V,
        transfer: T,
        clock: C,
    ) -> DesertResult<Self> {
        config.validate()?;
        info!(
            "desert controller initialised: genesis root 0x{}, expiry {}",
            hex::encode(genesis_state_root),
            config.expiry
        );

        Ok(Self {
            config,
            state: DesertState::new(genesis_state_root),
            verifier,
            transfer,
            clock,
            events: Vec::new(),
        })
    }

    /// Rebuild a controller from a [`DesertController::snapshot`]
    pub fn restore(
        config: DesertConfig,
        snapshot: &[u8],
        verifier: V,
        transfer: T,
        clock: C,
    ) -> DesertResult<Self> {
        config.validate()?;
        let state = DesertState::try_from_slice(snapshot)
            .map_err(|e| DesertError::Serialization(format!("corrupt snapshot: {}", e)))?;
        info!(
            "desert controller restored: mode {:?}, {} open requests, {} exits",
            state.mode,
            state.priority_queue.open_count(),
            state.exit_ledger.len()
        );

        Ok(Self {
            config,
            state,
            verifier,
            transfer,
            clock,
            events: Vec::new(),
        })
    }

    /// Encode the persisted state
    pub fn snapshot(&self) -> DesertResult<Vec<u8>> {
        Ok(self.state.try_to_vec()?)
    }

    // ----------------------------------------------------------------------
    // Read access
    // ----------------------------------------------------------------------

    /// Configuration in use
    pub fn config(&self) -> &DesertConfig {
        &self.config
    }

    /// Persisted state
    pub fn state(&self) -> &DesertState {
        &self.state
    }

    /// Current mode
    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// True once desert mode is active
    pub fn is_desert(&self) -> bool {
        self.state.mode == Mode::Desert
    }

    /// State root frozen at activation
    pub fn frozen_state_root(&self) -> Option<Hash> {
        self.state.frozen_state_root
    }

    /// NFT root pinned by the first exit claim
    pub fn frozen_nft_root(&self) -> Option<Hash> {
        self.state.frozen_nft_root
    }

    /// Number of open priority requests
    pub fn open_request_count(&self) -> u64 {
        self.state.priority_queue.open_count()
    }

    /// Oldest open priority request
    pub fn oldest_open_request(&self) -> Option<&PriorityRequest> {
        self.state.priority_queue.oldest_open()
    }

    /// Open priority request by sequence number
    pub fn priority_request(&self, sequence_number: u64) -> Option<&PriorityRequest> {
        self.state.priority_queue.get(sequence_number)
    }

    /// Withdrawable balance
    pub fn pending_balance(&self, owner: &L1Address, asset_id: AssetId) -> u128 {
        self.state.pending.balance_of(owner, asset_id)
    }

    /// Next pending credit of NFT `nft_index` for `owner`
    pub fn pending_nft(&self, owner: &L1Address, nft_index: NftIndex) -> Option<&NftExitData> {
        self.state.pending.pending_nft(owner, nft_index)
    }

    /// Number of pending credits of NFT `nft_index` for `owner`
    pub fn pending_nft_count(&self, owner: &L1Address, nft_index: NftIndex) -> usize {
        self.state.pending.pending_nft_count(owner, nft_index)
    }

    /// Whether `key` has been exited
    pub fn is_exited(&self, key: &ExitKey) -> bool {
        self.state.exit_ledger.is_consumed(key)
    }

    /// Last verified block
    pub fn last_verified_block(&self) -> &StoredBlockInfo {
        self.state.blocks.last_block()
    }

    /// Outbound transfer
    pub fn transfer(&self) -> &T {
        &self.transfer
    }

    /// Outbound transfer, mutably
    pub fn transfer_mut(&mut self) -> &mut T {
        &mut self.transfer
    }

    /// Events emitted since the last drain
    pub fn events(&self) -> &[DesertEvent] {
        &self.events
    }

    /// Take the buffered events
    pub fn drain_events(&mut self) -> Vec<DesertEvent> {
        std::mem::take(&mut self.events)
    }

    // ----------------------------------------------------------------------
    // Normal operation
    // ----------------------------------------------------------------------

    /// Enqueue a deposit of `amount` of `asset_id` for `owner`. Open in both modes.
    pub fn deposit(&mut self, owner: L1Address, asset_id: AssetId, amount: u128) -> DesertResult<u64> {
        self.deposit_inner(owner, asset_id, amount)
            .map_err(|e| log_rejection("deposit", e))
    }

    fn deposit_inner(&mut self, owner: L1Address, asset_id: AssetId, amount: u128) -> DesertResult<u64> {
        if amount == 0 {
            return Err(DesertError::PreconditionViolation(
                "deposit amount must be non-zero".to_string(),
            ));
        }
        if amount > self.config.max_deposit_amount {
            return Err(DesertError::PreconditionViolation(format!(
                "deposit amount {} exceeds maximum {}",
                amount, self.config.max_deposit_amount
            )));
        }
        if asset_id > self.config.max_asset_id {
            return Err(DesertError::PreconditionViolation(format!(
                "asset {} is above max asset id {}",
                asset_id, self.config.max_asset_id
            )));
        }

        self.enqueue(PriorityOperation::Deposit(DepositPubdata {
            owner,
            asset_id,
            amount,
        }))
    }

    /// Enqueue an NFT deposit. Open in both modes.
    pub fn deposit_nft(&mut self, owner: L1Address, nft: NftExitData) -> DesertResult<u64> {
        self.enqueue(PriorityOperation::DepositNft(DepositNftPubdata { owner, nft }))
            .map_err(|e| log_rejection("deposit_nft", e))
    }

    /// Enqueue a forced exit of `asset_id` from `account_id`
    pub fn request_full_exit(
        &mut self,
        account_id: AccountId,
        owner: L1Address,
        asset_id: AssetId,
    ) -> DesertResult<u64> {
        self.request_full_exit_inner(account_id, owner, asset_id)
            .map_err(|e| log_rejection("request_full_exit", e))
    }

    fn request_full_exit_inner(
        &mut self,
        account_id: AccountId,
        owner: L1Address,
        asset_id: AssetId,
    ) -> DesertResult<u64> {
        self.require_normal("request_full_exit")?;
        self.check_account_id(account_id)?;

        self.enqueue(PriorityOperation::FullExit(FullExitPubdata {
            account_id,
            owner,
            asset_id,
        }))
    }

    fn enqueue(&mut self, operation: PriorityOperation) -> DesertResult<u64> {
        let now = self.clock.now();
        let request = self.state.priority_queue.enqueue(&operation, now)?;
        let event = DesertEvent::PriorityRequestEnqueued {
            sequence_number: request.sequence_number,
            op_type: request.op_type,
            pubdata: request.pubdata.clone(),
            hashed_pubdata: request.hashed_pubdata(),
        };
        let sequence_number = request.sequence_number;

        info!(
            "priority request #{} enqueued: {} at block {}",
            sequence_number,
            operation.op_type(),
            now.block_number
        );
        self.events.push(event);
        Ok(sequence_number)
    }

    /// Record a verified block: consume the priority requests it included and
    /// credit the withdrawals it executed. Normal mode only.
    pub fn verify_block(
        &mut self,
        block: StoredBlockInfo,
        withdrawals: &[OnchainWithdrawal],
    ) -> DesertResult<()> {
        self.verify_block_inner(block, withdrawals)
            .map_err(|e| log_rejection("verify_block", e))
    }

    fn verify_block_inner(
        &mut self,
        block: StoredBlockInfo,
        withdrawals: &[OnchainWithdrawal],
    ) -> DesertResult<()> {
        self.require_normal("verify_block")?;
        self.state.blocks.ensure_next(&block)?;

        let open = self.state.priority_queue.open_count();
        if block.priority_operations > open {
            return Err(DesertError::PreconditionViolation(format!(
                "block {} includes {} priority operations but only {} are open",
                block.block_number, block.priority_operations, open
            )));
        }

        let mut pending = self.state.pending.clone();
        for withdrawal in withdrawals {
            pending.credit(&withdrawal.owner, withdrawal.asset_id, withdrawal.amount)?;
        }

        self.state.priority_queue.remove_included(block.priority_operations)?;
        self.state.pending = pending;
        let event = DesertEvent::BlockVerified {
            block_number: block.block_number,
            state_root: block.state_root,
            priority_operations: block.priority_operations,
        };
        self.state.blocks.accept(block)?;

        info!(
            "block {} verified, {} priority requests still open",
            self.state.blocks.last_block_number(),
            self.state.priority_queue.open_count()
        );
        self.events.push(event);
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Desert mode
    // ----------------------------------------------------------------------

    /// Enter desert mode if the oldest open request has expired.
    ///
    /// Callable by anyone. When not eligible, or already active, nothing
    /// changes and no event is emitted.
    pub fn activate(&mut self) -> ActivationOutcome {
        if self.state.mode == Mode::Desert {
            debug!("activate: desert mode already active");
            return ActivationOutcome::AlreadyActive;
        }

        let now = self.clock.now();
        let expired = match self.state.priority_queue.oldest_open() {
            Some(oldest) => {
                let expired = self.config.expiry.is_expired(oldest.submitted_at, now);
                if !expired {
                    debug!(
                        "activate: request #{} expires in {} more",
                        oldest.sequence_number,
                        self.config.expiry.remaining(oldest.submitted_at, now)
                    );
                }
                expired
            }
            None => {
                debug!("activate: no open priority requests");
                false
            }
        };

        if !expired {
            return ActivationOutcome::NotYetEligible;
        }

        let last_block = self.state.blocks.last_block();
        let frozen_state_root = last_block.state_root;
        let block_number = last_block.block_number;

        self.state.mode = Mode::Desert;
        self.state.frozen_state_root = Some(frozen_state_root);
        self.state.activated_at = Some(now);

        info!(
            "desert mode activated at block {}: frozen root 0x{} (last verified block {})",
            now.block_number,
            hex::encode(frozen_state_root),
            block_number
        );
        self.events.push(DesertEvent::DesertModeActivated {
            frozen_state_root,
            block_number,
            at: now,
        });
        ActivationOutcome::Activated
    }

    /// Like [`DesertController::activate`], but reports ineligibility as an error
    pub fn try_activate(&mut self) -> DesertResult<ActivationOutcome> {
        match self.activate() {
            ActivationOutcome::NotYetEligible => {
                Err(log_rejection("activate", DesertError::NotYetEligible(self.eligibility_reason())))
            }
            outcome => Ok(outcome),
        }
    }

    fn eligibility_reason(&self) -> String {
        match self.state.priority_queue.oldest_open() {
            Some(oldest) => {
                let now = self.clock.now();
                format!(
                    "oldest priority request #{} is {} old, threshold is {}",
                    oldest.sequence_number,
                    self.config.expiry.age(oldest.submitted_at, now),
                    self.config.expiry
                )
            }
            None => "no open priority requests".to_string(),
        }
    }

    /// Exit an asset balance proven against the frozen state root
    pub fn perform_exit(
        &mut self,
        block_info: &StoredBlockInfo,
        nft_root: Hash,
        asset_exit: &AssetExitData,
        account_exit: &AccountExitData,
        asset_proof: &[Hash],
        account_proof: &[Hash],
    ) -> DesertResult<ExitKey> {
        self.perform_exit_inner(
            block_info,
            nft_root,
            asset_exit,
            account_exit,
            asset_proof,
            account_proof,
        )
        .map_err(|e| log_rejection("perform_exit", e))
    }

    fn perform_exit_inner(
        &mut self,
        block_info: &StoredBlockInfo,
        nft_root: Hash,
        asset_exit: &AssetExitData,
        account_exit: &AccountExitData,
        asset_proof: &[Hash],
        account_proof: &[Hash],
    ) -> DesertResult<ExitKey> {
        let frozen_root = self.frozen_root("perform_exit")?;
        self.check_block_info(block_info, &frozen_root)?;
        self.check_account_id(account_exit.account_id)?;

        let key = ExitKey::asset(frozen_root, account_exit.account_id, asset_exit.asset_id);
        self.state.exit_ledger.ensure_unconsumed(&key)?;

        self.check_nft_root(&nft_root, &[account_proof, asset_proof])?;
        if !self
            .verifier
            .verify(&frozen_root, &account_exit.leaf_bytes(), account_proof)
        {
            return Err(DesertError::ProofRejected(format!(
                "account {} is not included under the frozen root",
                account_exit.account_id
            )));
        }
        if !self.verifier.verify(
            &frozen_root,
            &asset_exit.leaf_bytes(account_exit.account_id),
            asset_proof,
        ) {
            return Err(DesertError::ProofRejected(format!(
                "asset {} of account {} is not included under the frozen root",
                asset_exit.asset_id, account_exit.account_id
            )));
        }

        let owner = account_exit.l1_address;
        self.state
            .pending
            .ensure_can_credit(&owner, asset_exit.asset_id, asset_exit.amount)?;

        self.state.exit_ledger.mark(key)?;
        self.state
            .pending
            .credit(&owner, asset_exit.asset_id, asset_exit.amount)?;
        self.state.frozen_nft_root.get_or_insert(nft_root);

        info!(
            "exit {} finalized: {} credited to 0x{}",
            key,
            asset_exit.amount,
            hex::encode(owner)
        );
        self.events.push(DesertEvent::ExitFinalized {
            key,
            owner,
            amount: asset_exit.amount,
        });
        Ok(key)
    }

    /// Exit NFTs proven against the frozen NFT root. All or nothing.
    pub fn perform_exit_nft(
        &mut self,
        block_info: &StoredBlockInfo,
        nft_root: Hash,
        account_exit: &AccountExitData,
        nft_exits: &[NftExitData],
        account_proof: &[Hash],
        nft_proofs: &[Vec<Hash>],
    ) -> DesertResult<Vec<ExitKey>> {
        self.perform_exit_nft_inner(
            block_info,
            nft_root,
            account_exit,
            nft_exits,
            account_proof,
            nft_proofs,
        )
        .map_err(|e| log_rejection("perform_exit_nft", e))
    }

    fn perform_exit_nft_inner(
        &mut self,
        block_info: &StoredBlockInfo,
        nft_root: Hash,
        account_exit: &AccountExitData,
        nft_exits: &[NftExitData],
        account_proof: &[Hash],
        nft_proofs: &[Vec<Hash>],
    ) -> DesertResult<Vec<ExitKey>> {
        let frozen_root = self.frozen_root("perform_exit_nft")?;
        self.check_block_info(block_info, &frozen_root)?;
        self.check_account_id(account_exit.account_id)?;

        if nft_exits.is_empty() {
            return Err(DesertError::PreconditionViolation(
                "no nfts to exit".to_string(),
            ));
        }
        if nft_proofs.len() != nft_exits.len() {
            return Err(DesertError::PreconditionViolation(format!(
                "{} nfts but {} nft proofs",
                nft_exits.len(),
                nft_proofs.len()
            )));
        }
        for nft in nft_exits {
            if nft.owner_account_index != account_exit.account_id {
                return Err(DesertError::PreconditionViolation(format!(
                    "nft {} is owned by account {}, not {}",
                    nft.nft_index, nft.owner_account_index, account_exit.account_id
                )));
            }
        }

        let keys: Vec<ExitKey> = nft_exits
            .iter()
            .map(|nft| ExitKey::nft(nft_root, account_exit.account_id, nft.nft_index))
            .collect();
        self.state.exit_ledger.ensure_batch_unconsumed(&keys)?;

        self.check_nft_root(&nft_root, &[account_proof])?;
        if !self
            .verifier
            .verify(&frozen_root, &account_exit.leaf_bytes(), account_proof)
        {
            return Err(DesertError::ProofRejected(format!(
                "account {} is not included under the frozen root",
                account_exit.account_id
            )));
        }
        for (nft, proof) in nft_exits.iter().zip(nft_proofs) {
            if !self.verifier.verify(&nft_root, &nft.leaf_bytes(), proof) {
                return Err(DesertError::ProofRejected(format!(
                    "nft {} is not included under the nft root",
                    nft.nft_index
                )));
            }
        }

        let owner = account_exit.l1_address;
        self.state.exit_ledger.mark_all(&keys)?;
        for nft in nft_exits {
            self.state.pending.credit_nft(&owner, nft.clone());
        }
        self.state.frozen_nft_root.get_or_insert(nft_root);

        for key in &keys {
            info!("nft exit {} finalized for 0x{}", key, hex::encode(owner));
            self.events.push(DesertEvent::NftExitFinalized { key: *key, owner });
        }
        Ok(keys)
    }

    /// Exit using a parsed JSON claim
    pub fn perform_exit_claim(&mut self, claim: &AssetExitClaim) -> DesertResult<ExitKey> {
        self.perform_exit(
            &claim.block_info,
            claim.nft_root,
            &claim.asset_exit,
            &claim.account_exit,
            &claim.asset_proof,
            &claim.account_proof,
        )
    }

    /// NFT exit using a parsed JSON claim
    pub fn perform_exit_nft_claim(&mut self, claim: &NftExitClaim) -> DesertResult<Vec<ExitKey>> {
        self.perform_exit_nft(
            &claim.block_info,
            claim.nft_root,
            &claim.account_exit,
            &claim.nfts,
            &claim.account_proof,
            &claim.nft_proofs,
        )
    }

    /// Refund up to `up_to_count` outstanding priority requests, oldest first.
    ///
    /// `pubdata_list` holds the pubdata of each deposit among them, in order.
    /// Returns the cancelled sequence numbers.
    pub fn cancel_outstanding(
        &mut self,
        up_to_count: u64,
        pubdata_list: &[Vec<u8>],
    ) -> DesertResult<Vec<u64>> {
        self.cancel_outstanding_inner(up_to_count, pubdata_list)
            .map_err(|e| log_rejection("cancel_outstanding", e))
    }

    fn cancel_outstanding_inner(
        &mut self,
        up_to_count: u64,
        pubdata_list: &[Vec<u8>],
    ) -> DesertResult<Vec<u64>> {
        self.frozen_root("cancel_outstanding")?;

        let plan = self
            .state
            .priority_queue
            .plan_cancellation(up_to_count, pubdata_list)?;

        let mut pending = self.state.pending.clone();
        for cancelled in &plan {
            match &cancelled.refund {
                Refund::Balance {
                    owner,
                    asset_id,
                    amount,
                } => pending.credit(owner, *asset_id, *amount)?,
                Refund::Nft { owner, nft } => pending.credit_nft(owner, nft.clone()),
                Refund::Nothing => {}
            }
        }

        self.state.priority_queue.remove_cancelled(&plan)?;
        self.state.pending = pending;

        let sequence_numbers: Vec<u64> = plan.iter().map(|c| c.sequence_number).collect();
        info!(
            "cancelled {} outstanding priority requests, {} still open",
            sequence_numbers.len(),
            self.state.priority_queue.open_count()
        );
        for sequence_number in &sequence_numbers {
            self.events.push(DesertEvent::DepositCancelled {
                sequence_number: *sequence_number,
            });
        }
        Ok(sequence_numbers)
    }

    // ----------------------------------------------------------------------
    // Withdrawals, both modes
    // ----------------------------------------------------------------------

    /// Pay out `amount` of the pending balance of `owner` to `owner`
    pub fn withdraw(&mut self, owner: L1Address, asset_id: AssetId, amount: u128) -> DesertResult<()> {
        self.state
            .pending
            .withdraw(&owner, asset_id, amount, &mut self.transfer)
            .map_err(|e| log_rejection("withdraw", e))?;

        info!(
            "withdrawal of {} (asset {}) paid to 0x{}",
            amount,
            asset_id,
            hex::encode(owner)
        );
        self.events.push(DesertEvent::Withdrawal {
            owner,
            asset_id,
            amount,
        });
        Ok(())
    }

    /// Pay out the oldest pending credit of NFT `nft_index` to `owner`
    pub fn withdraw_pending_nft(&mut self, owner: L1Address, nft_index: NftIndex) -> DesertResult<()> {
        self.state
            .pending
            .withdraw_nft(&owner, nft_index, &mut self.transfer)
            .map_err(|e| log_rejection("withdraw_pending_nft", e))?;

        info!("nft {} paid to 0x{}", nft_index, hex::encode(owner));
        self.events.push(DesertEvent::NftWithdrawn { owner, nft_index });
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Guards
    // ----------------------------------------------------------------------

    fn require_normal(&self, operation: &str) -> DesertResult<()> {
        if self.state.mode != Mode::Normal {
            return Err(DesertError::PreconditionViolation(format!(
                "{} is not available in desert mode",
                operation
            )));
        }
        Ok(())
    }

    fn frozen_root(&self, operation: &str) -> DesertResult<Hash> {
        match (self.state.mode, self.state.frozen_state_root) {
            (Mode::Desert, Some(root)) => Ok(root),
            _ => Err(DesertError::PreconditionViolation(format!(
                "{} is only available in desert mode",
                operation
            ))),
        }
    }

    fn check_block_info(&self, block_info: &StoredBlockInfo, frozen_root: &Hash) -> DesertResult<()> {
        if !self.state.blocks.is_accepted(block_info) {
            return Err(DesertError::PreconditionViolation(format!(
                "block info {} does not match the last verified block {}",
                block_info.block_number,
                self.state.blocks.last_block_number()
            )));
        }
        if block_info.state_root != *frozen_root {
            return Err(DesertError::PreconditionViolation(
                "block info state root differs from the frozen root".to_string(),
            ));
        }
        Ok(())
    }

    fn check_account_id(&self, account_id: AccountId) -> DesertResult<()> {
        if account_id > self.config.max_account_index {
            return Err(DesertError::PreconditionViolation(format!(
                "account {} is above max account index {}",
                account_id, self.config.max_account_index
            )));
        }
        if account_id == self.config.special_account_id {
            return Err(DesertError::PreconditionViolation(format!(
                "account {} is reserved",
                account_id
            )));
        }
        Ok(())
    }

    /// The state root is the parent of the account side and the NFT root, so
    /// every account-side proof must end with the NFT root.
    fn check_nft_root(&self, nft_root: &Hash, account_side_proofs: &[&[Hash]]) -> DesertResult<()> {
        for proof in account_side_proofs {
            if proof.last() != Some(nft_root) {
                return Err(DesertError::ProofRejected(
                    "proof does not end at the supplied nft root".to_string(),
                ));
            }
        }
        if let Some(frozen_nft_root) = self.state.frozen_nft_root {
            if frozen_nft_root != *nft_root {
                return Err(DesertError::PreconditionViolation(format!(
                    "nft root 0x{} differs from frozen nft root 0x{}",
                    hex::encode(nft_root),
                    hex::encode(frozen_nft_root)
                )));
            }
        }
        Ok(())
    }
}
