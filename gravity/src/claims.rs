//! Ethereum event claims submitted by orchestrators

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Binary, Uint128};

use crate::error::ContractError;
use crate::eth_address::EthAddress;
use crate::hash::FieldEncoder;
use crate::valset::BridgeValidator;

/// An Ethereum event as reported by one orchestrator.
///
/// Every variant carries the Gravity contract's `event_nonce` and the Ethereum
/// `block_height` the event was emitted at. The submitting orchestrator is not
/// part of the body, so identical reports fingerprint identically.
#[cw_serde]
pub enum Claim {
    /// Tokens locked on Ethereum for a Cosmos receiver
    SendToCosmos {
        event_nonce: u64,
        block_height: u64,
        token_contract: EthAddress,
        amount: Uint128,
        ethereum_sender: EthAddress,
        cosmos_receiver: String,
    },
    /// An outgoing batch was executed on Ethereum
    BatchSendToEthExecuted {
        event_nonce: u64,
        block_height: u64,
        batch_nonce: u64,
        token_contract: EthAddress,
    },
    /// An arbitrary logic call was executed on Ethereum
    ContractCallExecuted {
        event_nonce: u64,
        block_height: u64,
        invalidation_id: Binary,
        invalidation_nonce: u64,
    },
    /// An ERC20 representing a Cosmos denom was deployed
    Erc20Deployed {
        event_nonce: u64,
        block_height: u64,
        cosmos_denom: String,
        token_contract: EthAddress,
        name: String,
        symbol: String,
        decimals: u8,
    },
    /// A new valset was installed on Ethereum
    ValsetUpdated {
        event_nonce: u64,
        block_height: u64,
        valset_nonce: u64,
        members: Vec<BridgeValidator>,
        reward_amount: Uint128,
        reward_token: EthAddress,
    },
}

impl Claim {
    pub fn event_nonce(&self) -> u64 {
        match self {
            Claim::SendToCosmos { event_nonce, .. }
            | Claim::BatchSendToEthExecuted { event_nonce, .. }
            | Claim::ContractCallExecuted { event_nonce, .. }
            | Claim::Erc20Deployed { event_nonce, .. }
            | Claim::ValsetUpdated { event_nonce, .. } => *event_nonce,
        }
    }

    /// Ethereum block height of the event
    pub fn block_height(&self) -> u64 {
        match self {
            Claim::SendToCosmos { block_height, .. }
            | Claim::BatchSendToEthExecuted { block_height, .. }
            | Claim::ContractCallExecuted { block_height, .. }
            | Claim::Erc20Deployed { block_height, .. }
            | Claim::ValsetUpdated { block_height, .. } => *block_height,
        }
    }

    pub fn claim_type(&self) -> &'static str {
        match self {
            Claim::SendToCosmos { .. } => "send_to_cosmos",
            Claim::BatchSendToEthExecuted { .. } => "batch_send_to_eth_executed",
            Claim::ContractCallExecuted { .. } => "contract_call_executed",
            Claim::Erc20Deployed { .. } => "erc20_deployed",
            Claim::ValsetUpdated { .. } => "valset_updated",
        }
    }

    /// Structural checks that need no state
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.event_nonce() == 0 {
            return Err(ContractError::InvalidClaim {
                reason: "event nonce must be positive".to_string(),
            });
        }

        match self {
            Claim::SendToCosmos { amount, .. } if amount.is_zero() => {
                Err(ContractError::InvalidClaim {
                    reason: "deposit amount must be positive".to_string(),
                })
            }
            Claim::Erc20Deployed { cosmos_denom, .. } if cosmos_denom.is_empty() => {
                Err(ContractError::InvalidClaim {
                    reason: "empty cosmos denom".to_string(),
                })
            }
            Claim::ValsetUpdated { members, .. } if members.is_empty() => {
                Err(ContractError::InvalidClaim {
                    reason: "valset without members".to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Content hash identifying this claim among claims at the same nonce
    pub fn fingerprint(&self) -> [u8; 32] {
        match self {
            Claim::SendToCosmos {
                event_nonce,
                block_height,
                token_contract,
                amount,
                ethereum_sender,
                cosmos_receiver,
            } => FieldEncoder::new("SendToCosmos")
                .uint(*event_nonce as u128)
                .uint(*block_height as u128)
                .address(token_contract)
                .uint(amount.u128())
                .address(ethereum_sender)
                .string(cosmos_receiver)
                .finish(),
            Claim::BatchSendToEthExecuted {
                event_nonce,
                block_height,
                batch_nonce,
                token_contract,
            } => FieldEncoder::new("BatchSendToEthExecuted")
                .uint(*event_nonce as u128)
                .uint(*block_height as u128)
                .uint(*batch_nonce as u128)
                .address(token_contract)
                .finish(),
            Claim::ContractCallExecuted {
                event_nonce,
                block_height,
                invalidation_id,
                invalidation_nonce,
            } => FieldEncoder::new("ContractCallExecuted")
                .uint(*event_nonce as u128)
                .uint(*block_height as u128)
                .bytes(invalidation_id.as_slice())
                .uint(*invalidation_nonce as u128)
                .finish(),
            Claim::Erc20Deployed {
                event_nonce,
                block_height,
                cosmos_denom,
                token_contract,
                name,
                symbol,
                decimals,
            } => FieldEncoder::new("Erc20Deployed")
                .uint(*event_nonce as u128)
                .uint(*block_height as u128)
                .string(cosmos_denom)
                .address(token_contract)
                .string(name)
                .string(symbol)
                .uint(*decimals as u128)
                .finish(),
            Claim::ValsetUpdated {
                event_nonce,
                block_height,
                valset_nonce,
                members,
                reward_amount,
                reward_token,
            } => {
                let mut encoder = FieldEncoder::new("ValsetUpdated");
                encoder
                    .uint(*event_nonce as u128)
                    .uint(*block_height as u128)
                    .uint(*valset_nonce as u128)
                    .uint(members.len() as u128);
                for member in members {
                    encoder
                        .address(&member.ethereum_address)
                        .uint(member.power as u128);
                }
                encoder
                    .uint(reward_amount.u128())
                    .address(reward_token)
                    .finish()
            }
        }
    }
}
