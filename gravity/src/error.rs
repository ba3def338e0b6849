//! Error types for the Gravity bridge contract
//!
//! Every variant maps to one of the failure kinds of the bridge core: malformed
//! input, ordering violation, duplicate vote, unauthorized, empty selection and
//! re-binding. A failing message never commits any state.

use cosmwasm_std::{StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    // ========================================================================
    // Authorization Errors
    // ========================================================================

    #[error("Unauthorized: only admin can perform this action")]
    Unauthorized,

    #[error("Unauthorized: only pending admin can accept")]
    UnauthorizedPendingAdmin,

    #[error("Unauthorized: {address} is not a static validator")]
    NotStaticValidator { address: String },

    #[error("Unauthorized: {address} has no bonded power")]
    NotBondedValidator { address: String },

    #[error("Unauthorized: orchestrator {orchestrator} is not bound to a validator")]
    UnknownOrchestrator { orchestrator: String },

    #[error("Unauthorized: only the sender can cancel transfer {id}")]
    NotTransferSender { id: u64 },

    // ========================================================================
    // Admin Errors
    // ========================================================================

    #[error("No pending admin change")]
    NoPendingAdmin,

    #[error("Timelock not expired: {remaining_seconds} seconds remaining")]
    TimelockNotExpired { remaining_seconds: u64 },

    #[error("Bridge is paused")]
    BridgePaused,

    // ========================================================================
    // Validator Directory Errors
    // ========================================================================

    #[error("Ethereum address already set for validator {validator}")]
    EthAddressAlreadySet { validator: String },

    #[error("Orchestrator {orchestrator} already bound to a validator")]
    OrchestratorAlreadyBound { orchestrator: String },

    #[error("Ethereum address {eth_address} already bound to a validator")]
    EthAddressInUse { eth_address: String },

    #[error("Ethereum address not set for validator {validator}")]
    EthAddressNotSet { validator: String },

    // ========================================================================
    // Input Validation Errors
    // ========================================================================

    #[error("Invalid Ethereum address: {reason}")]
    InvalidEthAddress { reason: String },

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Invalid claim: {reason}")]
    InvalidClaim { reason: String },

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    // ========================================================================
    // Attestation Errors
    // ========================================================================

    #[error("Non contiguous event nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: u64, got: u64 },

    #[error("Claim at nonce {nonce} conflicts with the observed attestation")]
    ConflictsWithObserved { nonce: u64 },

    #[error("Conflicting claim at pending nonce {nonce}")]
    ConflictingClaim { nonce: u64 },

    #[error("Duplicate vote from validator {validator} at nonce {nonce}")]
    DuplicateVote { validator: String, nonce: u64 },

    // ========================================================================
    // Valset & Confirmation Errors
    // ========================================================================

    #[error("Valset not found: nonce {nonce}")]
    ValsetNotFound { nonce: u64 },

    #[error("No validators with bound Ethereum addresses and power")]
    EmptyValset,

    #[error("Confirmation already submitted by {orchestrator}")]
    DuplicateConfirmation { orchestrator: String },

    #[error("Signer mismatch: expected {expected}, got {got}")]
    SignerMismatch { expected: String, got: String },

    // ========================================================================
    // Outgoing Pool & Batch Errors
    // ========================================================================

    #[error("Token not supported: {token}")]
    TokenNotSupported { token: String },

    #[error("Amount {amount} below minimum transfer {minimum}")]
    BelowMinimumTransfer { amount: Uint128, minimum: Uint128 },

    #[error("Fee {fee} below minimum fee {minimum}")]
    BelowMinimumFee { fee: Uint128, minimum: Uint128 },

    #[error("No Ethereum height observed yet; batches cannot be timed")]
    NoObservedEthereumHeight,

    #[error("No unbatched transfers for token contract {token_contract}")]
    EmptyBatch { token_contract: String },

    #[error("Batch not found: {token_contract} nonce {nonce}")]
    BatchNotFound { token_contract: String, nonce: u64 },

    #[error("Outgoing transfer not found: {id}")]
    TransferNotFound { id: u64 },

    #[error("Outgoing transfer {id} is already in a batch")]
    TransferAlreadyBatched { id: u64 },
}
