//! Validator directory handlers.
//!
//! This module handles:
//! - Orchestrator and Ethereum address binding
//! - Static validator allow-list
//! - Bonded power snapshot updates

use cosmwasm_std::{Addr, DepsMut, MessageInfo, Response, StdResult, Storage};

use crate::error::ContractError;
use crate::eth_address::EthAddress;
use crate::msg::ValidatorPower;
use crate::power::{set_validator_power, PowerSource, StoredPower};
use crate::state::{
    CONFIG, ETH_ADDRESS_BY_VALIDATOR, ORCHESTRATOR_BY_VALIDATOR, STATIC_VALIDATORS,
    VALIDATOR_BY_ETH_ADDRESS, VALIDATOR_BY_ORCHESTRATOR,
};

// ============================================================================
// Delegate Keys
// ============================================================================

/// Bind an orchestrator and Ethereum signing address to the sending validator.
///
/// Only static validators with bonded power may bind, and only once.
pub fn execute_set_orchestrator_address(
    deps: DepsMut,
    info: MessageInfo,
    orchestrator: String,
    eth_address: String,
) -> Result<Response, ContractError> {
    let validator = info.sender;
    let orchestrator = deps.api.addr_validate(&orchestrator)?;
    let eth_address = EthAddress::parse(&eth_address)?;

    if !is_static_validator(deps.storage, &validator)? {
        return Err(ContractError::NotStaticValidator {
            address: validator.to_string(),
        });
    }
    if StoredPower.power_of(deps.storage, &validator)? == 0 {
        return Err(ContractError::NotBondedValidator {
            address: validator.to_string(),
        });
    }

    bind_ethereum_address(deps.storage, &validator, &orchestrator, &eth_address)?;

    Ok(Response::new()
        .add_attribute("method", "set_orchestrator_address")
        .add_attribute("validator", validator)
        .add_attribute("orchestrator", orchestrator)
        .add_attribute("eth_address", eth_address.to_string()))
}

/// Persist all four directory mappings, or none of them.
pub fn bind_ethereum_address(
    storage: &mut dyn Storage,
    validator: &Addr,
    orchestrator: &Addr,
    eth_address: &EthAddress,
) -> Result<(), ContractError> {
    if ETH_ADDRESS_BY_VALIDATOR.has(storage, validator) {
        return Err(ContractError::EthAddressAlreadySet {
            validator: validator.to_string(),
        });
    }
    if VALIDATOR_BY_ORCHESTRATOR.has(storage, orchestrator) {
        return Err(ContractError::OrchestratorAlreadyBound {
            orchestrator: orchestrator.to_string(),
        });
    }
    if VALIDATOR_BY_ETH_ADDRESS.has(storage, eth_address.as_bytes()) {
        return Err(ContractError::EthAddressInUse {
            eth_address: eth_address.to_string(),
        });
    }

    ETH_ADDRESS_BY_VALIDATOR.save(storage, validator, eth_address)?;
    VALIDATOR_BY_ETH_ADDRESS.save(storage, eth_address.as_bytes(), validator)?;
    VALIDATOR_BY_ORCHESTRATOR.save(storage, orchestrator, validator)?;
    ORCHESTRATOR_BY_VALIDATOR.save(storage, validator, orchestrator)?;
    Ok(())
}

/// Validator an orchestrator acts for
pub fn validator_by_orchestrator(
    storage: &dyn Storage,
    orchestrator: &Addr,
) -> Result<Addr, ContractError> {
    VALIDATOR_BY_ORCHESTRATOR
        .may_load(storage, orchestrator)?
        .ok_or_else(|| ContractError::UnknownOrchestrator {
            orchestrator: orchestrator.to_string(),
        })
}

/// Ethereum signing address bound to a validator
pub fn eth_address_by_validator(
    storage: &dyn Storage,
    validator: &Addr,
) -> Result<EthAddress, ContractError> {
    ETH_ADDRESS_BY_VALIDATOR
        .may_load(storage, validator)?
        .ok_or_else(|| ContractError::EthAddressNotSet {
            validator: validator.to_string(),
        })
}

// ============================================================================
// Static Validators
// ============================================================================

pub fn is_static_validator(storage: &dyn Storage, address: &Addr) -> StdResult<bool> {
    Ok(STATIC_VALIDATORS
        .may_load(storage, address)?
        .unwrap_or(false))
}

/// Add a validator to the static allow-list (admin only).
pub fn execute_add_static_validator(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    let validator = deps.api.addr_validate(&address)?;
    STATIC_VALIDATORS.save(deps.storage, &validator, &true)?;

    Ok(Response::new()
        .add_attribute("method", "add_static_validator")
        .add_attribute("validator", validator))
}

// ============================================================================
// Power Feed
// ============================================================================

/// Replace reported bonded power for the listed validators (admin only).
pub fn execute_update_validator_powers(
    deps: DepsMut,
    info: MessageInfo,
    powers: Vec<ValidatorPower>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    let count = powers.len();
    for entry in powers {
        let validator = deps.api.addr_validate(&entry.validator)?;
        set_validator_power(deps.storage, &validator, entry.power)?;
    }

    Ok(Response::new()
        .add_attribute("method", "update_validator_powers")
        .add_attribute("updated", count.to_string())
        .add_attribute(
            "total_power",
            StoredPower.total_power(deps.storage)?.to_string(),
        ))
}
