//! Message types for the Gravity bridge contract
//!
//! This module defines all messages for instantiation, execution, and queries.
//! Ethereum addresses are accepted as hex strings and validated by the handlers.

use common::Asset;
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Decimal, Timestamp, Uint128};
use cw20::Cw20ReceiveMsg;

use crate::claims::Claim;
use crate::eth_address::EthAddress;
use crate::state::{
    Attestation, BatchConfirm, ConflictPolicy, OutgoingBatch, OutgoingTransfer, PendingDeposit,
    ValsetConfirm,
};
use crate::valset::Valset;

// ============================================================================
// Instantiate & Migrate
// ============================================================================

/// Migrate message
#[cw_serde]
pub struct MigrateMsg {}

/// Bonded power reported for one validator
#[cw_serde]
pub struct ValidatorPower {
    pub validator: String,
    pub power: u64,
}

/// Instantiate message
#[cw_serde]
pub struct InstantiateMsg {
    /// Admin address for contract management
    pub admin: String,
    /// Bridge instance identifier (1-32 bytes)
    pub gravity_id: String,
    /// Validators allowed to bind delegate keys
    pub static_validators: Vec<String>,
    /// Initial bonded power snapshot
    pub validator_powers: Vec<ValidatorPower>,
    /// Defaults to 5%
    pub valset_drift_threshold: Option<Decimal>,
    pub minimum_transfer: Option<Uint128>,
    pub minimum_fee: Option<Uint128>,
    pub max_batch_size: Option<u32>,
    pub batch_timeout_blocks: Option<u64>,
    pub conflict_policy: Option<ConflictPolicy>,
    pub valset_reward: Option<Asset>,
}

// ============================================================================
// Execute Messages
// ============================================================================

/// Execute messages
#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Validator Directory
    // ========================================================================
    /// Bind an orchestrator and Ethereum signing address to the sending validator
    SetOrchestratorAddress {
        orchestrator: String,
        eth_address: String,
    },

    /// Add a validator to the static allow-list (admin only)
    AddStaticValidator { address: String },

    /// Update the bonded power snapshot (admin only). Zero power removes.
    UpdateValidatorPowers { powers: Vec<ValidatorPower> },

    // ========================================================================
    // Attestation
    // ========================================================================
    /// Vote for an Ethereum event (orchestrator only)
    SubmitClaim { claim: Claim },

    /// Re-run observation over pending attestations
    ProcessAttestations {},

    // ========================================================================
    // Valsets
    // ========================================================================
    /// Force a new valset request (admin or static validator)
    RequestValset {},

    /// Sign a valset checkpoint (orchestrator only)
    ValsetConfirm {
        nonce: u64,
        eth_signer: String,
        signature: Binary,
    },

    /// Periodic housekeeping: observation, batch timeouts, valset drift
    EndBlock {},

    // ========================================================================
    // Outgoing Transfers & Batches
    // ========================================================================
    /// Withdraw native tokens to Ethereum; exactly one coin must be attached
    /// and it covers amount plus fee
    SendToEth { eth_dest: String, bridge_fee: Uint128 },

    /// Withdraw cw20 tokens to Ethereum via cw20 send
    Receive(Cw20ReceiveMsg),

    /// Cancel an unbatched withdrawal and refund it (sender only)
    CancelSendToEth { transaction_id: u64 },

    /// Build a batch from the highest-fee pooled withdrawals of a token contract
    RequestBatch {
        token_contract: String,
        max_elements: Option<u32>,
    },

    /// Sign a batch checkpoint (orchestrator only)
    ConfirmBatch {
        nonce: u64,
        token_contract: String,
        eth_signer: String,
        signature: Binary,
    },

    // ========================================================================
    // Configuration
    // ========================================================================
    /// Map an Ethereum-originated ERC20 to a cw20 this contract mints (admin only)
    RegisterEthereumToken { token_contract: String, cw20: String },

    /// Update configuration (admin only)
    UpdateConfig {
        valset_drift_threshold: Option<Decimal>,
        minimum_transfer: Option<Uint128>,
        max_batch_size: Option<u32>,
        batch_timeout_blocks: Option<u64>,
        conflict_policy: Option<ConflictPolicy>,
        valset_reward: Option<Asset>,
    },

    /// Change the minimum bridge fee (static validator only)
    SetMinimumFee { fee: Uint128 },

    // ========================================================================
    // Admin Operations
    // ========================================================================
    /// Pause withdrawals and batch creation (admin only)
    Pause {},

    /// Unpause (admin only)
    Unpause {},

    /// Propose new admin (7-day timelock)
    ProposeAdmin { new_admin: String },

    /// Accept admin role (pending admin only, after timelock)
    AcceptAdmin {},

    /// Cancel pending admin proposal (admin only)
    CancelAdminProposal {},
}

/// CW20 receive hook messages
#[cw_serde]
pub enum ReceiveMsg {
    /// Withdraw the received cw20 amount (amount plus fee) to Ethereum
    SendToEth { eth_dest: String, bridge_fee: Uint128 },
}

// ============================================================================
// Query Messages
// ============================================================================

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    // ========================================================================
    // Core Queries
    // ========================================================================
    #[returns(ConfigResponse)]
    Config {},

    #[returns(Option<PendingAdminResponse>)]
    PendingAdmin {},

    // ========================================================================
    // Validator Directory
    // ========================================================================
    #[returns(DelegateKeysResponse)]
    DelegateKeysByValidator { validator: String },

    #[returns(DelegateKeysResponse)]
    DelegateKeysByOrchestrator { orchestrator: String },

    #[returns(DelegateKeysResponse)]
    DelegateKeysByEthAddress { eth_address: String },

    #[returns(StaticValidatorsResponse)]
    StaticValidators {},

    #[returns(bool)]
    IsStaticValidator { address: String },

    #[returns(ValidatorPowersResponse)]
    ValidatorPowers {},

    // ========================================================================
    // Attestations
    // ========================================================================
    #[returns(Option<Attestation>)]
    Attestation { event_nonce: u64, fingerprint: Binary },

    #[returns(AttestationsResponse)]
    AttestationsByNonce { event_nonce: u64 },

    /// Fingerprint a claim the way `SubmitClaim` does
    #[returns(Binary)]
    ClaimFingerprint { claim: Claim },

    #[returns(LastObservedResponse)]
    LastObservedEventNonce {},

    /// Last event nonce the orchestrator's validator voted on
    #[returns(u64)]
    LastEventNonceByAddr { orchestrator: String },

    #[returns(Option<u64>)]
    LogicCallExecution {
        invalidation_id: Binary,
        invalidation_nonce: u64,
    },

    // ========================================================================
    // Valsets
    // ========================================================================
    #[returns(Valset)]
    CurrentValset {},

    #[returns(Option<Valset>)]
    ValsetRequest { nonce: u64 },

    /// Most recent valset requests, newest first (default 5)
    #[returns(Vec<Valset>)]
    LastValsetRequests { limit: Option<u32> },

    /// Recent valsets the orchestrator has not confirmed, newest first
    #[returns(Vec<Valset>)]
    LastPendingValsetRequestByAddr { orchestrator: String },

    #[returns(Option<ValsetConfirm>)]
    ValsetConfirm { nonce: u64, orchestrator: String },

    #[returns(Vec<ValsetConfirm>)]
    ValsetConfirmsByNonce { nonce: u64 },

    #[returns(Binary)]
    ValsetCheckpoint { nonce: u64 },

    #[returns(Option<Valset>)]
    LastObservedValset {},

    // ========================================================================
    // Outgoing Transfers & Batches
    // ========================================================================
    #[returns(Option<OutgoingBatch>)]
    Batch { token_contract: String, nonce: u64 },

    /// Most recent batches over all token contracts, newest first (default 5)
    #[returns(Vec<OutgoingBatch>)]
    LastBatches { limit: Option<u32> },

    /// Recent batches the orchestrator has not confirmed, newest first
    #[returns(Vec<OutgoingBatch>)]
    LastPendingBatchRequestByAddr { orchestrator: String },

    #[returns(Vec<BatchConfirm>)]
    BatchConfirms { token_contract: String, nonce: u64 },

    #[returns(Binary)]
    BatchCheckpoint { token_contract: String, nonce: u64 },

    #[returns(PendingSendToEthResponse)]
    PendingSendToEth { sender: String },

    #[returns(Vec<BatchFee>)]
    BatchFees {},

    // ========================================================================
    // Token Registry
    // ========================================================================
    #[returns(Option<TokenMappingResponse>)]
    Erc20ToDenom { erc20: String },

    #[returns(Option<TokenMappingResponse>)]
    DenomToErc20 { denom: String },

    #[returns(Uint128)]
    LockedBalance { denom: String },

    /// Deposits observed for an ERC20 that is not registered yet
    #[returns(Vec<PendingDeposit>)]
    PendingDeposits { token_contract: String },
}

// ============================================================================
// Query Responses
// ============================================================================

#[cw_serde]
pub struct ConfigResponse {
    pub admin: Addr,
    pub paused: bool,
    pub gravity_id: String,
    pub valset_drift_threshold: Decimal,
    pub minimum_transfer: Uint128,
    pub minimum_fee: Uint128,
    pub max_batch_size: u32,
    pub batch_timeout_blocks: u64,
    pub conflict_policy: ConflictPolicy,
    pub valset_reward: Option<Asset>,
}

/// Pending admin response
#[cw_serde]
pub struct PendingAdminResponse {
    pub new_address: Addr,
    pub execute_after: Timestamp,
}

#[cw_serde]
pub struct DelegateKeysResponse {
    pub validator: Addr,
    pub orchestrator: Addr,
    pub eth_address: EthAddress,
}

#[cw_serde]
pub struct StaticValidatorsResponse {
    pub validators: Vec<Addr>,
}

#[cw_serde]
pub struct ValidatorPowersResponse {
    pub total_power: u64,
    pub powers: Vec<(Addr, u64)>,
}

#[cw_serde]
pub struct AttestationEntry {
    pub fingerprint: Binary,
    pub attestation: Attestation,
}

#[cw_serde]
pub struct AttestationsResponse {
    pub attestations: Vec<AttestationEntry>,
}

#[cw_serde]
pub struct LastObservedResponse {
    pub event_nonce: u64,
    pub ethereum_height: u64,
}

#[cw_serde]
pub struct PendingSendToEthResponse {
    pub transfers_in_batches: Vec<OutgoingTransfer>,
    pub unbatched_transfers: Vec<OutgoingTransfer>,
}

/// Fees waiting in the pool for one token contract
#[cw_serde]
pub struct BatchFee {
    pub token_contract: EthAddress,
    pub total_fees: Uint128,
    pub tx_count: u64,
}

#[cw_serde]
pub struct TokenMappingResponse {
    pub erc20: EthAddress,
    /// Native denom or cw20 contract address
    pub asset: String,
    pub cosmos_originated: bool,
}
