//! State definitions for the Gravity bridge contract
//!
//! Each component owns a disjoint set of storage namespaces:
//! - validator directory (delegate keys, static validators, validator power)
//! - attestation engine (attestations, nonce cursors)
//! - valset manager (valset requests, confirmations)
//! - outgoing batch builder (transfer pool, batches, confirmations)

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Decimal, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};

use common::{Asset, AssetInfo};

use crate::claims::Claim;
use crate::eth_address::EthAddress;
use crate::valset::Valset;

// ============================================================================
// Core Configuration
// ============================================================================

/// How a second claim fingerprint at an already pending nonce is handled
#[cw_serde]
#[derive(Copy, Default)]
pub enum ConflictPolicy {
    /// Reject it with `ConflictingClaim`; one fingerprint per pending nonce
    #[default]
    Reject,
    /// Track it as its own attestation; the first to reach the threshold wins
    TrackConcurrent,
}

/// Contract configuration
#[cw_serde]
pub struct Config {
    /// Admin address for contract management
    pub admin: Addr,
    /// Whether new withdrawals and batches are blocked
    pub paused: bool,
    /// Bridge instance identifier, hashed into every checkpoint (max 32 bytes)
    pub gravity_id: String,
    /// Power drift (fraction of total normalized power) that triggers a new valset
    pub valset_drift_threshold: Decimal,
    /// Minimum amount for a withdrawal to Ethereum
    pub minimum_transfer: Uint128,
    /// Minimum bridge fee for a withdrawal to Ethereum
    pub minimum_fee: Uint128,
    /// Upper bound on transactions per batch
    pub max_batch_size: u32,
    /// Batch lifetime in Ethereum blocks past the last observed height
    pub batch_timeout_blocks: u64,
    pub conflict_policy: ConflictPolicy,
    /// Reward paid to the relayer submitting a valset update
    pub valset_reward: Option<Asset>,
}

/// Pending admin change proposal
#[cw_serde]
pub struct PendingAdmin {
    /// Proposed new admin address
    pub new_address: Addr,
    /// Block time when the change can be executed
    pub execute_after: Timestamp,
}

// ============================================================================
// Attestation Engine
// ============================================================================

/// Aggregated votes for one (event nonce, claim fingerprint) pair
#[cw_serde]
pub struct Attestation {
    /// The claim body as first submitted
    pub claim: Claim,
    /// Validators that voted for this claim, in vote order
    pub votes: Vec<Addr>,
    /// Set once the claim reached the power threshold and its effect was applied
    pub observed: bool,
    /// Cosmos block height of the first vote
    pub height: u64,
}

/// Deposit observed for an ERC20 that had no local representation yet
#[cw_serde]
pub struct PendingDeposit {
    pub event_nonce: u64,
    pub receiver: Addr,
    pub amount: Uint128,
}

// ============================================================================
// Confirmations
// ============================================================================

/// Orchestrator signature over a valset checkpoint
#[cw_serde]
pub struct ValsetConfirm {
    pub nonce: u64,
    pub orchestrator: Addr,
    pub eth_signer: EthAddress,
    pub signature: Binary,
}

/// Orchestrator signature over a batch checkpoint
#[cw_serde]
pub struct BatchConfirm {
    pub nonce: u64,
    pub token_contract: EthAddress,
    pub orchestrator: Addr,
    pub eth_signer: EthAddress,
    pub signature: Binary,
}

// ============================================================================
// Outgoing Pool & Batches
// ============================================================================

/// A withdrawal waiting in the pool or carried by a batch
#[cw_serde]
pub struct OutgoingTransfer {
    pub id: u64,
    pub sender: Addr,
    pub dest_address: EthAddress,
    /// ERC20 contract the transfer is paid out of on Ethereum
    pub token_contract: EthAddress,
    pub amount: Uint128,
    pub fee: Uint128,
    /// Local token escrowed for this transfer
    pub asset: AssetInfo,
}

impl OutgoingTransfer {
    /// Amount plus fee, the escrowed total
    pub fn total(&self) -> Uint128 {
        self.amount + self.fee
    }
}

/// A batch of withdrawals for one token contract
#[cw_serde]
pub struct OutgoingBatch {
    pub batch_nonce: u64,
    /// Ethereum height after which the batch can no longer execute
    pub batch_timeout: u64,
    pub transactions: Vec<OutgoingTransfer>,
    pub token_contract: EthAddress,
    /// Cosmos block height the batch was built at
    pub block: u64,
}

// ============================================================================
// Token Registry
// ============================================================================

/// Link between an ERC20 contract and its local representation
#[cw_serde]
pub struct TokenMapping {
    pub erc20: EthAddress,
    pub asset: AssetInfo,
    /// Cosmos-originated tokens are locked and unlocked; Ethereum-originated
    /// tokens are minted on deposit and burned once their batch executes
    pub cosmos_originated: bool,
}

// ============================================================================
// Constants
// ============================================================================

/// Contract name for cw2 migration info
pub const CONTRACT_NAME: &str = "crates.io:gravity";

/// Contract version for cw2 migration info
pub const CONTRACT_VERSION: &str = "1.0.0";

/// 7 days in seconds for admin change timelock
pub const ADMIN_TIMELOCK_DURATION: u64 = 604_800;

/// Default page size for history queries
pub const DEFAULT_QUERY_LIMIT: u32 = 5;

/// Hard cap on page size for history queries
pub const MAX_QUERY_LIMIT: u32 = 50;

/// Default upper bound on transactions per batch
pub const DEFAULT_MAX_BATCH_SIZE: u32 = 100;

/// Default batch lifetime in Ethereum blocks (~12 hours)
pub const DEFAULT_BATCH_TIMEOUT_BLOCKS: u64 = 3_600;

/// Default valset drift threshold in percent
pub const DEFAULT_VALSET_DRIFT_PERCENT: u64 = 5;

// ============================================================================
// Core State Storage
// ============================================================================

/// Primary config storage
pub const CONFIG: Item<Config> = Item::new("config");

/// Pending admin proposal (if any)
pub const PENDING_ADMIN: Item<PendingAdmin> = Item::new("pending_admin");

// ============================================================================
// Validator Directory
// ============================================================================

/// Key: validator, Value: delegated Ethereum signing address
pub const ETH_ADDRESS_BY_VALIDATOR: Map<&Addr, EthAddress> = Map::new("eth_addr_by_val");

/// Key: raw Ethereum address, Value: validator
pub const VALIDATOR_BY_ETH_ADDRESS: Map<&[u8], Addr> = Map::new("val_by_eth_addr");

/// Key: orchestrator, Value: validator
pub const VALIDATOR_BY_ORCHESTRATOR: Map<&Addr, Addr> = Map::new("val_by_orch");

/// Key: validator, Value: orchestrator
pub const ORCHESTRATOR_BY_VALIDATOR: Map<&Addr, Addr> = Map::new("orch_by_val");

/// Static validator allow-list
/// Key: validator account address, Value: true
pub const STATIC_VALIDATORS: Map<&Addr, bool> = Map::new("static_validators");

/// Bonded power per validator as last reported by the staking source
pub const VALIDATOR_POWERS: Map<&Addr, u64> = Map::new("validator_powers");

/// Sum of VALIDATOR_POWERS
pub const TOTAL_POWER: Item<u64> = Item::new("total_power");

// ============================================================================
// Attestation Engine
// ============================================================================

/// Key: (event nonce, claim fingerprint), Value: Attestation
pub const ATTESTATIONS: Map<(u64, &[u8]), Attestation> = Map::new("attestations");

/// Highest event nonce whose attestation has been observed
pub const LAST_OBSERVED_EVENT_NONCE: Item<u64> = Item::new("last_observed_nonce");

/// Ethereum block height carried by the last observed claim
pub const LAST_OBSERVED_ETH_HEIGHT: Item<u64> = Item::new("last_observed_eth_height");

/// Last event nonce each validator voted on
pub const LAST_EVENT_NONCE_BY_VALIDATOR: Map<&Addr, u64> = Map::new("last_nonce_by_val");

/// Executed logic calls
/// Key: (invalidation id, invalidation nonce), Value: Ethereum height
pub const LOGIC_CALL_EXECUTIONS: Map<(&[u8], u64), u64> = Map::new("logic_call_executions");

/// Deposits waiting for their ERC20 to be registered
/// Key: (raw ERC20 address, event nonce), Value: PendingDeposit
pub const PENDING_DEPOSITS: Map<(&[u8], u64), PendingDeposit> = Map::new("pending_deposits");

// ============================================================================
// Valset Manager
// ============================================================================

/// Key: valset nonce, Value: Valset
pub const VALSETS: Map<u64, Valset> = Map::new("valsets");

/// Nonce of the most recently stored valset request
pub const LATEST_VALSET_NONCE: Item<u64> = Item::new("latest_valset_nonce");

/// Key: (valset nonce, orchestrator), Value: ValsetConfirm
pub const VALSET_CONFIRMS: Map<(u64, &Addr), ValsetConfirm> = Map::new("valset_confirms");

/// Valset most recently reported as installed on Ethereum
pub const LAST_OBSERVED_VALSET: Item<Valset> = Item::new("last_observed_valset");

// ============================================================================
// Outgoing Pool & Batches
// ============================================================================

/// Last assigned outgoing transfer id
pub const LAST_TX_ID: Item<u64> = Item::new("last_tx_id");

/// Unbatched transfers by id
pub const UNBATCHED_TXS: Map<u64, OutgoingTransfer> = Map::new("unbatched_txs");

/// Fee-ordered pool index
/// Key: (token contract, u128::MAX - fee, id). Ascending iteration within a
/// token contract yields highest fee first, lowest id first on equal fees.
pub const UNBATCHED_BY_FEE: Map<(&[u8], u128, u64), bool> = Map::new("unbatched_by_fee");

/// Key: (token contract, batch nonce), Value: OutgoingBatch
pub const OUTGOING_BATCHES: Map<(&[u8], u64), OutgoingBatch> = Map::new("outgoing_batches");

/// Last batch nonce per token contract
pub const LAST_BATCH_NONCE: Map<&[u8], u64> = Map::new("last_batch_nonce");

/// Key: (token contract, batch nonce, orchestrator), Value: BatchConfirm
pub const BATCH_CONFIRMS: Map<(&[u8], u64, &Addr), BatchConfirm> = Map::new("batch_confirms");

/// Escrowed Cosmos-originated balances backing ERC20s on Ethereum
/// Key: asset key (denom), Value: locked amount
pub const LOCKED_BALANCES: Map<&str, Uint128> = Map::new("locked_balances");

// ============================================================================
// Token Registry
// ============================================================================

/// Key: raw ERC20 address, Value: TokenMapping
pub const ERC20_TO_ASSET: Map<&[u8], TokenMapping> = Map::new("erc20_to_asset");

/// Key: asset key (denom or cw20 address), Value: ERC20 address
pub const ASSET_TO_ERC20: Map<&str, EthAddress> = Map::new("asset_to_erc20");
