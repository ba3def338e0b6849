//! Gravity Bridge Contract - Cosmos Side of the Gravity Bridge
//!
//! Validators run an orchestrator that relays Ethereum events into this
//! contract and signs the checkpoints the Ethereum contract verifies.
//!
//! # Incoming Flow (Attestation)
//! 1. Orchestrators submit `SubmitClaim` for each Ethereum event, in event-nonce order
//! 2. Votes accumulate per (event nonce, claim fingerprint)
//! 3. Once at least 2/3 of normalized power agrees, the claim is observed
//!    and its side effect applied (mint, unlock, batch executed, valset updated)
//!
//! # Outgoing Flow (Batching)
//! 1. Users lock tokens with `SendToEth` (amount plus bridge fee)
//! 2. `RequestBatch` gathers the highest-fee withdrawals of one ERC20
//! 3. Orchestrators sign the batch checkpoint with `ConfirmBatch`
//! 4. A relayer submits the batch on Ethereum; the `BatchSendToEthExecuted`
//!    observation finalizes it
//!
//! # Validator Sets
//! - Valset requests snapshot normalized power whenever it drifts past the
//!   configured threshold, or on demand
//! - Checkpoints use the Ethereum contract's ABI layout and keccak256

pub mod claims;
pub mod contract;
pub mod error;
pub mod eth_address;
mod execute;
pub mod hash;
pub mod msg;
pub mod power;
mod query;
pub mod state;
pub mod valset;

pub use crate::claims::Claim;
pub use crate::error::ContractError;
pub use crate::eth_address::EthAddress;
pub use crate::hash::{batch_checkpoint, keccak256, valset_checkpoint};
pub use crate::valset::{BridgeValidator, Valset};
