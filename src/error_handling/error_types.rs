// src/error_handling/error_types.rs
//! Error types for the desert exit subsystem
//!
//! The four recovery classes (precondition, proof, replay, eligibility) map one
//! to one onto the failure modes a caller can act on. The remaining variants
//! cover the ambient concerns: payouts, encoding and configuration.

use solana_program::program_error::ProgramError;
use thiserror::Error;

/// Result alias used across the crate
pub type DesertResult<T> = Result<T, DesertError>;

/// Base error type for desert mode operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DesertError {
    /// Wrong mode, malformed or mismatched pubdata, insufficient balance
    #[error("Precondition violation: {0}")]
    PreconditionViolation(String),

    /// Leaf verification against the frozen root failed
    #[error("Proof rejected: {0}")]
    ProofRejected(String),

    /// Exit key or priority request already consumed
    #[error("Replay violation: {0}")]
    ReplayViolation(String),

    /// Expiry threshold not reached yet
    #[error("Not yet eligible: {0}")]
    NotYetEligible(String),

    /// The external value transfer refused the payout
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    /// Encoding or decoding error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DesertError {
    /// Convert to error code
    pub fn to_error_code(&self) -> u32 {
        match self {
            DesertError::PreconditionViolation(_) => 3000,
            DesertError::ProofRejected(_) => 3001,
            DesertError::ReplayViolation(_) => 3002,
            DesertError::NotYetEligible(_) => 3003,
            DesertError::TransferFailed(_) => 3004,
            DesertError::Serialization(_) => 3005,
            DesertError::Config(_) => 3006,
        }
    }

    /// Short machine-readable class name, used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            DesertError::PreconditionViolation(_) => "precondition_violation",
            DesertError::ProofRejected(_) => "proof_rejected",
            DesertError::ReplayViolation(_) => "replay_violation",
            DesertError::NotYetEligible(_) => "not_yet_eligible",
            DesertError::TransferFailed(_) => "transfer_failed",
            DesertError::Serialization(_) => "serialization",
            DesertError::Config(_) => "config",
        }
    }
}

impl From<DesertError> for ProgramError {
    fn from(e: DesertError) -> Self {
        ProgramError::Custom(e.to_error_code())
    }
}

impl From<std::io::Error> for DesertError {
    fn from(e: std::io::Error) -> Self {
        DesertError::Serialization(e.to_string())
    }
}
