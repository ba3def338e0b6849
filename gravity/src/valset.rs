//! Validator sets as seen by the Ethereum contract

use std::collections::BTreeMap;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Decimal, Storage, Uint128};

use crate::error::ContractError;
use crate::eth_address::EthAddress;
use crate::hash::valset_checkpoint;
use crate::power::{normalize_power, PowerSource, MAX_POWER};
use crate::state::ETH_ADDRESS_BY_VALIDATOR;

/// One signer of a valset
#[cw_serde]
pub struct BridgeValidator {
    /// Normalized power on the `0..=u32::MAX` scale
    pub power: u64,
    pub ethereum_address: EthAddress,
}

/// A snapshot of bridge signers at a valset nonce
#[cw_serde]
pub struct Valset {
    pub nonce: u64,
    /// Cosmos block height the snapshot was taken at
    pub height: u64,
    pub members: Vec<BridgeValidator>,
    pub reward_amount: Uint128,
    pub reward_token: EthAddress,
}

/// Sort members by power descending, then by Ethereum address ascending
pub fn sort_members(members: &mut [BridgeValidator]) {
    members.sort_by(|a, b| {
        b.power
            .cmp(&a.power)
            .then_with(|| a.ethereum_address.cmp(&b.ethereum_address))
    });
}

impl Valset {
    /// Build a valset, putting members into canonical order
    pub fn new(
        nonce: u64,
        height: u64,
        mut members: Vec<BridgeValidator>,
        reward_amount: Uint128,
        reward_token: EthAddress,
    ) -> Self {
        sort_members(&mut members);
        Valset {
            nonce,
            height,
            members,
            reward_amount,
            reward_token,
        }
    }

    /// Checkpoint signed by orchestrators and verified on Ethereum
    pub fn checkpoint(&self, gravity_id: &[u8; 32]) -> [u8; 32] {
        let mut members = self.members.clone();
        sort_members(&mut members);
        valset_checkpoint(
            gravity_id,
            self.nonce,
            &members,
            self.reward_amount.u128(),
            &self.reward_token,
        )
    }

    /// Fraction of total normalized power that moved between `self` and
    /// `other`: the summed absolute change per address over `u32::MAX`.
    /// Addresses present on one side only count their full power.
    pub fn power_diff(&self, other: &Valset) -> Decimal {
        let mut powers: BTreeMap<EthAddress, u64> = self
            .members
            .iter()
            .map(|m| (m.ethereum_address, m.power))
            .collect();

        let mut delta: u128 = 0;
        for member in &other.members {
            let before = powers.remove(&member.ethereum_address).unwrap_or_default();
            delta += before.abs_diff(member.power) as u128;
        }
        delta += powers.values().map(|p| *p as u128).sum::<u128>();

        Decimal::from_ratio(delta, MAX_POWER as u128)
    }
}

/// Every validator with a bound Ethereum address and non-zero power, in
/// canonical order. Powers are normalized against the members' own stake, so
/// a full valset always sums to `u32::MAX` up to rounding.
pub fn current_members(
    storage: &dyn Storage,
    power: &dyn PowerSource,
) -> Result<Vec<BridgeValidator>, ContractError> {
    let mut bound = Vec::new();
    let mut total = 0u64;
    for (validator, stake) in power.validators(storage)? {
        if stake == 0 {
            continue;
        }
        if let Some(ethereum_address) = ETH_ADDRESS_BY_VALIDATOR.may_load(storage, &validator)? {
            total = total.saturating_add(stake);
            bound.push((ethereum_address, stake));
        }
    }

    let mut members: Vec<BridgeValidator> = bound
        .into_iter()
        .map(|(ethereum_address, stake)| BridgeValidator {
            power: normalize_power(stake, total),
            ethereum_address,
        })
        .collect();
    sort_members(&mut members);
    Ok(members)
}
