//! Hash computation for Ethereum-side verification
//!
//! Checkpoints are byte-identical to what the Gravity Solidity contract
//! computes with `abi.encode`, so signatures collected here verify there.
//!
//! # Valset checkpoint
//! ```solidity
//! keccak256(abi.encode(
//!     bytes32 gravityId, bytes32 "checkpoint", uint256 valsetNonce,
//!     address[] validators, uint256[] powers,
//!     uint256 rewardAmount, address rewardToken
//! ))
//! ```
//! Head is 7 words; the two dynamic arrays follow at offsets 224 and
//! 224 + 32 * (n + 1).
//!
//! # Batch checkpoint
//! ```solidity
//! keccak256(abi.encode(
//!     bytes32 gravityId, bytes32 "transactionBatch",
//!     uint256[] amounts, address[] destinations, uint256[] fees,
//!     uint256 batchNonce, address tokenContract, uint256 batchTimeout
//! ))
//! ```
//! Head is 8 words; the three dynamic arrays follow at offsets 256,
//! 256 + 32 * (n + 1) and 256 + 64 * (n + 1).

use tiny_keccak::{Hasher, Keccak};

use crate::error::ContractError;
use crate::eth_address::EthAddress;
use crate::state::OutgoingBatch;
use crate::valset::BridgeValidator;

/// Method name word of the valset checkpoint
const VALSET_METHOD: &str = "checkpoint";

/// Method name word of the batch checkpoint
const BATCH_METHOD: &str = "transactionBatch";

/// Compute keccak256 hash of arbitrary data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Convert bytes32 to 0x-prefixed hex string
pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Encode a gravity id as a right-padded bytes32
pub fn gravity_id_word(gravity_id: &str) -> Result<[u8; 32], ContractError> {
    let raw = gravity_id.as_bytes();
    if raw.is_empty() || raw.len() > 32 {
        return Err(ContractError::InvalidConfig {
            reason: format!("gravity_id must be 1-32 bytes, got {}", raw.len()),
        });
    }
    Ok(right_padded(raw))
}

fn right_padded(raw: &[u8]) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[..raw.len()].copy_from_slice(raw);
    word
}

fn uint_word(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Compute the valset checkpoint. `members` must already be in canonical order.
pub fn valset_checkpoint(
    gravity_id: &[u8; 32],
    nonce: u64,
    members: &[BridgeValidator],
    reward_amount: u128,
    reward_token: &EthAddress,
) -> [u8; 32] {
    let n = members.len();
    let mut data = Vec::with_capacity(32 * (7 + 2 * (n + 1)));

    data.extend_from_slice(gravity_id);
    data.extend_from_slice(&right_padded(VALSET_METHOD.as_bytes()));
    data.extend_from_slice(&uint_word(nonce as u128));
    data.extend_from_slice(&uint_word(224));
    data.extend_from_slice(&uint_word(224 + 32 * (n as u128 + 1)));
    data.extend_from_slice(&uint_word(reward_amount));
    data.extend_from_slice(&reward_token.to_word());

    data.extend_from_slice(&uint_word(n as u128));
    for member in members {
        data.extend_from_slice(&member.ethereum_address.to_word());
    }
    data.extend_from_slice(&uint_word(n as u128));
    for member in members {
        data.extend_from_slice(&uint_word(member.power as u128));
    }

    keccak256(&data)
}

/// Compute the batch checkpoint
pub fn batch_checkpoint(gravity_id: &[u8; 32], batch: &OutgoingBatch) -> [u8; 32] {
    let n = batch.transactions.len();
    let array_len = 32 * (n as u128 + 1);
    let mut data = Vec::with_capacity(32 * (8 + 3 * (n + 1)));

    data.extend_from_slice(gravity_id);
    data.extend_from_slice(&right_padded(BATCH_METHOD.as_bytes()));
    data.extend_from_slice(&uint_word(256));
    data.extend_from_slice(&uint_word(256 + array_len));
    data.extend_from_slice(&uint_word(256 + 2 * array_len));
    data.extend_from_slice(&uint_word(batch.batch_nonce as u128));
    data.extend_from_slice(&batch.token_contract.to_word());
    data.extend_from_slice(&uint_word(batch.batch_timeout as u128));

    data.extend_from_slice(&uint_word(n as u128));
    for tx in &batch.transactions {
        data.extend_from_slice(&uint_word(tx.amount.u128()));
    }
    data.extend_from_slice(&uint_word(n as u128));
    for tx in &batch.transactions {
        data.extend_from_slice(&tx.dest_address.to_word());
    }
    data.extend_from_slice(&uint_word(n as u128));
    for tx in &batch.transactions {
        data.extend_from_slice(&uint_word(tx.fee.u128()));
    }

    keccak256(&data)
}

/// Canonical word encoder used for claim fingerprints.
///
/// Integers and addresses take one word each; strings and byte arrays are a
/// length word followed by the raw bytes padded to a word boundary.
pub struct FieldEncoder {
    buf: Vec<u8>,
}

impl FieldEncoder {
    pub fn new(tag: &str) -> Self {
        let mut encoder = FieldEncoder { buf: Vec::new() };
        encoder.bytes(tag.as_bytes());
        encoder
    }

    pub fn uint(&mut self, value: u128) -> &mut Self {
        self.buf.extend_from_slice(&uint_word(value));
        self
    }

    pub fn address(&mut self, address: &EthAddress) -> &mut Self {
        self.buf.extend_from_slice(&address.to_word());
        self
    }

    pub fn bytes(&mut self, raw: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(&uint_word(raw.len() as u128));
        for chunk in raw.chunks(32) {
            self.buf.extend_from_slice(&right_padded(chunk));
        }
        self
    }

    pub fn string(&mut self, value: &str) -> &mut Self {
        self.bytes(value.as_bytes())
    }

    pub fn finish(&self) -> [u8; 32] {
        keccak256(&self.buf)
    }
}
