//! Admin operations handlers.
//!
//! This module handles:
//! - Configuration updates and the validator-set minimum fee
//! - Token registry (admin registration, `Erc20Deployed` observations)
//! - Pause/unpause contract
//! - Admin transfer (propose/accept/cancel)

use common::{Asset, AssetInfo};
use cosmwasm_std::{
    Decimal, DepsMut, Env, MessageInfo, Order, Response, StdResult, Storage, Uint128,
};

use crate::error::ContractError;
use crate::eth_address::EthAddress;
use crate::execute::{is_static_validator, mint_msg, ClaimOutcome};
use crate::state::{
    ConflictPolicy, PendingAdmin, PendingDeposit, TokenMapping, ADMIN_TIMELOCK_DURATION,
    ASSET_TO_ERC20, CONFIG, ERC20_TO_ASSET, PENDING_ADMIN, PENDING_DEPOSITS,
};

// ============================================================================
// Configuration
// ============================================================================

/// Update configuration (admin only). Unset fields keep their value.
#[allow(clippy::too_many_arguments)]
pub fn execute_update_config(
    deps: DepsMut,
    info: MessageInfo,
    valset_drift_threshold: Option<Decimal>,
    minimum_transfer: Option<Uint128>,
    max_batch_size: Option<u32>,
    batch_timeout_blocks: Option<u64>,
    conflict_policy: Option<ConflictPolicy>,
    valset_reward: Option<Asset>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    if let Some(threshold) = valset_drift_threshold {
        validate_drift_threshold(threshold)?;
        config.valset_drift_threshold = threshold;
    }
    if let Some(minimum) = minimum_transfer {
        config.minimum_transfer = minimum;
    }
    if let Some(size) = max_batch_size {
        validate_max_batch_size(size)?;
        config.max_batch_size = size;
    }
    if let Some(blocks) = batch_timeout_blocks {
        config.batch_timeout_blocks = blocks;
    }
    if let Some(policy) = conflict_policy {
        config.conflict_policy = policy;
    }
    if let Some(reward) = valset_reward {
        config.valset_reward = Some(reward);
    }
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "update_config")
        .add_attribute("valset_drift_threshold", config.valset_drift_threshold.to_string())
        .add_attribute("minimum_transfer", config.minimum_transfer)
        .add_attribute("max_batch_size", config.max_batch_size.to_string())
        .add_attribute("batch_timeout_blocks", config.batch_timeout_blocks.to_string()))
}

pub fn validate_drift_threshold(threshold: Decimal) -> Result<(), ContractError> {
    if threshold.is_zero() || threshold > Decimal::one() {
        return Err(ContractError::InvalidConfig {
            reason: format!("valset drift threshold {} outside (0, 1]", threshold),
        });
    }
    Ok(())
}

pub fn validate_max_batch_size(size: u32) -> Result<(), ContractError> {
    if size == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "max batch size must be positive".to_string(),
        });
    }
    Ok(())
}

/// Change the minimum bridge fee (static validators only).
pub fn execute_set_minimum_fee(
    deps: DepsMut,
    info: MessageInfo,
    fee: Uint128,
) -> Result<Response, ContractError> {
    if !is_static_validator(deps.storage, &info.sender)? {
        return Err(ContractError::NotStaticValidator {
            address: info.sender.to_string(),
        });
    }

    let mut config = CONFIG.load(deps.storage)?;
    if config.minimum_fee == fee {
        return Err(ContractError::InvalidAmount {
            reason: format!("minimum fee is already {}", fee),
        });
    }
    let previous = config.minimum_fee;
    config.minimum_fee = fee;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "set_minimum_fee")
        .add_attribute("previous", previous)
        .add_attribute("minimum_fee", fee))
}

// ============================================================================
// Token Registry
// ============================================================================

fn register_token(
    storage: &mut dyn Storage,
    erc20: EthAddress,
    asset: AssetInfo,
    cosmos_originated: bool,
) -> Result<Option<String>, ContractError> {
    if ERC20_TO_ASSET.has(storage, erc20.as_bytes()) {
        return Ok(Some(format!("erc20 {} already registered", erc20)));
    }
    let key = asset.key();
    if ASSET_TO_ERC20.has(storage, &key) {
        return Ok(Some(format!("{} already mapped to an erc20", key)));
    }

    ERC20_TO_ASSET.save(
        storage,
        erc20.as_bytes(),
        &TokenMapping {
            erc20,
            asset,
            cosmos_originated,
        },
    )?;
    ASSET_TO_ERC20.save(storage, &key, &erc20)?;
    Ok(None)
}

/// Map an Ethereum-originated ERC20 to a cw20 this contract is minter of
/// (admin only).
pub fn execute_register_ethereum_token(
    deps: DepsMut,
    info: MessageInfo,
    token_contract: String,
    cw20: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    let erc20 = EthAddress::parse(&token_contract)?;
    let cw20 = deps.api.addr_validate(&cw20)?;
    let asset = AssetInfo::Cw20 {
        contract_addr: cw20.clone(),
    };

    if let Some(reason) = register_token(deps.storage, erc20, asset, false)? {
        return Err(ContractError::InvalidConfig { reason });
    }

    // credit deposits observed before the mapping existed
    let key = erc20.as_bytes().as_slice();
    let parked: Vec<PendingDeposit> = PENDING_DEPOSITS
        .prefix(key)
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, deposit)| deposit))
        .collect::<StdResult<_>>()?;
    let mut messages = Vec::with_capacity(parked.len());
    for deposit in &parked {
        PENDING_DEPOSITS.remove(deps.storage, (key, deposit.event_nonce));
        messages.push(mint_msg(&cw20, &deposit.receiver, deposit.amount)?);
    }

    Ok(Response::new()
        .add_messages(messages)
        .add_attribute("method", "register_ethereum_token")
        .add_attribute("token_contract", erc20.to_string())
        .add_attribute("cw20", cw20)
        .add_attribute("replayed_deposits", parked.len().to_string()))
}

/// Side effect of an observed `Erc20Deployed` claim: map the Cosmos denom to
/// the new ERC20 unless either side is already mapped.
pub fn on_erc20_deployed(
    storage: &mut dyn Storage,
    cosmos_denom: &str,
    token_contract: &EthAddress,
) -> Result<ClaimOutcome, ContractError> {
    let asset = AssetInfo::Native {
        denom: cosmos_denom.to_string(),
    };
    match register_token(storage, *token_contract, asset, true)? {
        Some(reason) => Ok(ClaimOutcome::Failed(reason)),
        None => Ok(ClaimOutcome::Applied(vec![])),
    }
}

// ============================================================================
// Pause/Unpause
// ============================================================================

/// Pause the contract (stops withdrawals and batch creation).
pub fn execute_pause(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    config.paused = true;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("method", "pause"))
}

/// Unpause the contract.
pub fn execute_unpause(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    config.paused = false;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("method", "unpause"))
}

// ============================================================================
// Admin Transfer
// ============================================================================

/// Propose a new admin (starts timelock).
pub fn execute_propose_admin(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    new_admin: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    let new_address = deps.api.addr_validate(&new_admin)?;
    let pending = PendingAdmin {
        new_address,
        execute_after: env.block.time.plus_seconds(ADMIN_TIMELOCK_DURATION),
    };
    PENDING_ADMIN.save(deps.storage, &pending)?;

    Ok(Response::new()
        .add_attribute("method", "propose_admin")
        .add_attribute("new_admin", pending.new_address)
        .add_attribute("execute_after", pending.execute_after.seconds().to_string()))
}

/// Accept pending admin role (after timelock).
pub fn execute_accept_admin(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let pending = PENDING_ADMIN
        .may_load(deps.storage)?
        .ok_or(ContractError::NoPendingAdmin)?;

    if info.sender != pending.new_address {
        return Err(ContractError::UnauthorizedPendingAdmin);
    }

    if env.block.time < pending.execute_after {
        let remaining = pending.execute_after.seconds() - env.block.time.seconds();
        return Err(ContractError::TimelockNotExpired {
            remaining_seconds: remaining,
        });
    }

    let mut config = CONFIG.load(deps.storage)?;
    config.admin = pending.new_address.clone();
    CONFIG.save(deps.storage, &config)?;
    PENDING_ADMIN.remove(deps.storage);

    Ok(Response::new()
        .add_attribute("method", "accept_admin")
        .add_attribute("new_admin", pending.new_address))
}

/// Cancel pending admin proposal.
pub fn execute_cancel_admin_proposal(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    PENDING_ADMIN.remove(deps.storage);

    Ok(Response::new().add_attribute("method", "cancel_admin_proposal"))
}
