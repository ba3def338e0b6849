//! Valset manager handlers.
//!
//! This module handles:
//! - Building the current valset from bound validators and their power
//! - Valset requests (forced, or on power drift from `EndBlock`)
//! - Valset confirmations
//! - Recording valsets observed on Ethereum

use cosmwasm_std::{Binary, DepsMut, Env, MessageInfo, Response, Storage, Uint128};

use crate::error::ContractError;
use crate::eth_address::EthAddress;
use crate::execute::{
    eth_address_by_validator, is_static_validator, validator_by_orchestrator, ClaimOutcome,
};
use crate::power::{PowerSource, StoredPower};
use crate::state::{
    Config, ValsetConfirm, ASSET_TO_ERC20, CONFIG, LAST_OBSERVED_VALSET, LATEST_VALSET_NONCE,
    VALSETS, VALSET_CONFIRMS,
};
use crate::valset::{current_members, BridgeValidator, Valset};

// ============================================================================
// Current Valset
// ============================================================================

/// Reward carried by new valsets, translated to its ERC20. Zero when unset or
/// when the reward token has no ERC20 mapping.
fn valset_reward(storage: &dyn Storage, config: &Config) -> Result<(Uint128, EthAddress), ContractError> {
    match &config.valset_reward {
        Some(reward) => match ASSET_TO_ERC20.may_load(storage, &reward.info.key())? {
            Some(erc20) => Ok((reward.amount, erc20)),
            None => Ok((Uint128::zero(), EthAddress::ZERO)),
        },
        None => Ok((Uint128::zero(), EthAddress::ZERO)),
    }
}

/// The valset that would be stored next: bound validators with power,
/// normalized and sorted, at nonce latest + 1.
pub fn current_valset(
    storage: &dyn Storage,
    power: &dyn PowerSource,
    height: u64,
) -> Result<Valset, ContractError> {
    let config = CONFIG.load(storage)?;
    let nonce = LATEST_VALSET_NONCE.may_load(storage)?.unwrap_or_default() + 1;
    let members = current_members(storage, power)?;
    let (reward_amount, reward_token) = valset_reward(storage, &config)?;
    Ok(Valset::new(nonce, height, members, reward_amount, reward_token))
}

/// Latest stored valset request, if any
pub fn latest_valset(storage: &dyn Storage) -> Result<Option<Valset>, ContractError> {
    match LATEST_VALSET_NONCE.may_load(storage)? {
        Some(nonce) if nonce > 0 => Ok(VALSETS.may_load(storage, nonce)?),
        _ => Ok(None),
    }
}

/// Persist the current valset under the next nonce.
pub fn store_valset_request(
    storage: &mut dyn Storage,
    power: &dyn PowerSource,
    height: u64,
) -> Result<Valset, ContractError> {
    let valset = current_valset(storage, power, height)?;
    if valset.members.is_empty() {
        return Err(ContractError::EmptyValset);
    }
    VALSETS.save(storage, valset.nonce, &valset)?;
    LATEST_VALSET_NONCE.save(storage, &valset.nonce)?;
    Ok(valset)
}

/// Store a new valset when none exists yet or power drifted past the
/// configured threshold. Returns the stored valset, if any.
pub fn maybe_store_valset(
    storage: &mut dyn Storage,
    power: &dyn PowerSource,
    height: u64,
) -> Result<Option<Valset>, ContractError> {
    let config = CONFIG.load(storage)?;
    let current = current_valset(storage, power, height)?;
    if current.members.is_empty() {
        return Ok(None);
    }

    let needed = match latest_valset(storage)? {
        None => true,
        Some(latest) => latest.power_diff(&current) >= config.valset_drift_threshold,
    };
    if !needed {
        return Ok(None);
    }

    VALSETS.save(storage, current.nonce, &current)?;
    LATEST_VALSET_NONCE.save(storage, &current.nonce)?;
    Ok(Some(current))
}

// ============================================================================
// Request & Confirm
// ============================================================================

/// Force a new valset request (admin or static validator).
pub fn execute_request_valset(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin && !is_static_validator(deps.storage, &info.sender)? {
        return Err(ContractError::Unauthorized);
    }

    let valset = store_valset_request(deps.storage, &StoredPower, env.block.height)?;

    Ok(Response::new()
        .add_attribute("method", "request_valset")
        .add_attribute("valset_nonce", valset.nonce.to_string())
        .add_attribute("members", valset.members.len().to_string()))
}

/// Record an orchestrator's signature over a valset checkpoint.
pub fn execute_valset_confirm(
    deps: DepsMut,
    info: MessageInfo,
    nonce: u64,
    eth_signer: String,
    signature: Binary,
) -> Result<Response, ContractError> {
    let validator = validator_by_orchestrator(deps.storage, &info.sender)?;
    let eth_signer = EthAddress::parse(&eth_signer)?;

    if !VALSETS.has(deps.storage, nonce) {
        return Err(ContractError::ValsetNotFound { nonce });
    }

    let expected = eth_address_by_validator(deps.storage, &validator)?;
    if expected != eth_signer {
        return Err(ContractError::SignerMismatch {
            expected: expected.to_string(),
            got: eth_signer.to_string(),
        });
    }

    if VALSET_CONFIRMS.has(deps.storage, (nonce, &info.sender)) {
        return Err(ContractError::DuplicateConfirmation {
            orchestrator: info.sender.to_string(),
        });
    }

    let confirm = ValsetConfirm {
        nonce,
        orchestrator: info.sender.clone(),
        eth_signer,
        signature,
    };
    VALSET_CONFIRMS.save(deps.storage, (nonce, &info.sender), &confirm)?;

    Ok(Response::new()
        .add_attribute("method", "valset_confirm")
        .add_attribute("orchestrator", info.sender)
        .add_attribute("valset_nonce", nonce.to_string()))
}

// ============================================================================
// Observed Valsets
// ============================================================================

/// Side effect of an observed `ValsetUpdated` claim
pub fn on_valset_updated(
    storage: &mut dyn Storage,
    env: &Env,
    valset_nonce: u64,
    members: Vec<BridgeValidator>,
    reward_amount: Uint128,
    reward_token: EthAddress,
) -> Result<ClaimOutcome, ContractError> {
    let valset = Valset::new(
        valset_nonce,
        env.block.height,
        members,
        reward_amount,
        reward_token,
    );
    LAST_OBSERVED_VALSET.save(storage, &valset)?;
    Ok(ClaimOutcome::Applied(vec![]))
}
