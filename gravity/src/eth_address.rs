//! Ethereum address handling
//!
//! Addresses are kept as their raw 20 bytes. Input accepts mixed-case hex with
//! or without the `0x` prefix; output is always lowercase `0x` hex. Ordering is
//! lexicographic on the raw bytes, which is the tie-break used by the
//! canonical valset order.

use std::fmt;
use std::str::FromStr;

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ContractError;

/// A 20-byte Ethereum address
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EthAddress([u8; 20]);

impl EthAddress {
    /// The zero address, used when a valset carries no reward token
    pub const ZERO: EthAddress = EthAddress([0u8; 20]);

    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        EthAddress(bytes)
    }

    /// Parse a hex address (with or without 0x prefix)
    pub fn parse(addr: &str) -> Result<Self, ContractError> {
        let hex_str = addr
            .strip_prefix("0x")
            .or_else(|| addr.strip_prefix("0X"))
            .unwrap_or(addr);

        if hex_str.len() != 40 {
            return Err(ContractError::InvalidEthAddress {
                reason: format!("expected 40 hex chars, got {}", hex_str.len()),
            });
        }

        let bytes = hex::decode(hex_str).map_err(|e| ContractError::InvalidEthAddress {
            reason: format!("invalid hex: {}", e),
        })?;

        let mut raw = [0u8; 20];
        raw.copy_from_slice(&bytes);
        Ok(EthAddress(raw))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// ABI encoding as a 32-byte word (left-padded)
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for EthAddress {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EthAddress::parse(s)
    }
}

impl Serialize for EthAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EthAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        EthAddress::parse(&s).map_err(de::Error::custom)
    }
}

impl JsonSchema for EthAddress {
    fn schema_name() -> String {
        "EthAddress".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}
