//! Gravity Bridge Contract - Entry Points
//!
//! The Cosmos half of the Gravity bridge: validators attest to Ethereum events,
//! maintain the signer set mirrored on Ethereum, and batch withdrawals.
//! The implementation is modularized into:
//! - `execute/` - Execute message handlers
//! - `query` - Query message handlers

use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Decimal, Deps, DepsMut, Env, MessageInfo, Response,
    StdResult, Uint128,
};
use cw2::set_contract_version;

use crate::error::ContractError;
use crate::execute::{
    execute_accept_admin, execute_add_static_validator, execute_cancel_admin_proposal,
    execute_cancel_send_to_eth, execute_confirm_batch, execute_end_block, execute_pause,
    execute_process_attestations, execute_propose_admin, execute_receive,
    execute_register_ethereum_token, execute_request_batch, execute_request_valset,
    execute_send_to_eth, execute_set_minimum_fee, execute_set_orchestrator_address,
    execute_submit_claim, execute_unpause, execute_update_config,
    execute_update_validator_powers, execute_valset_confirm, validate_drift_threshold,
    validate_max_batch_size,
};
use crate::hash::gravity_id_word;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::power::set_validator_power;
use crate::query::{
    query_attestation, query_attestations_by_nonce, query_batch, query_batch_checkpoint,
    query_batch_confirms, query_batch_fees, query_claim_fingerprint, query_config,
    query_current_valset, query_delegate_keys_by_eth_address,
    query_delegate_keys_by_orchestrator, query_delegate_keys_by_validator,
    query_denom_to_erc20, query_erc20_to_denom, query_is_static_validator, query_last_batches,
    query_last_event_nonce_by_addr, query_last_observed_event_nonce, query_last_observed_valset,
    query_last_pending_batch_requests, query_last_pending_valset_requests,
    query_last_valset_requests, query_locked_balance, query_logic_call_execution,
    query_pending_admin, query_pending_deposits, query_pending_send_to_eth,
    query_static_validators, query_validator_powers, query_valset_checkpoint, query_valset_confirm,
    query_valset_confirms_by_nonce, query_valset_request,
};
use crate::state::{
    Config, CONFIG, CONTRACT_NAME, CONTRACT_VERSION, DEFAULT_BATCH_TIMEOUT_BLOCKS,
    DEFAULT_MAX_BATCH_SIZE, DEFAULT_VALSET_DRIFT_PERCENT, LAST_OBSERVED_ETH_HEIGHT,
    LAST_OBSERVED_EVENT_NONCE, LAST_TX_ID, LATEST_VALSET_NONCE, STATIC_VALIDATORS,
};

// ============================================================================
// Instantiate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let admin = deps.api.addr_validate(&msg.admin)?;
    gravity_id_word(&msg.gravity_id)?;

    let valset_drift_threshold = msg
        .valset_drift_threshold
        .unwrap_or_else(|| Decimal::percent(DEFAULT_VALSET_DRIFT_PERCENT));
    validate_drift_threshold(valset_drift_threshold)?;
    let max_batch_size = msg.max_batch_size.unwrap_or(DEFAULT_MAX_BATCH_SIZE);
    validate_max_batch_size(max_batch_size)?;

    let config = Config {
        admin,
        paused: false,
        gravity_id: msg.gravity_id,
        valset_drift_threshold,
        minimum_transfer: msg.minimum_transfer.unwrap_or_else(Uint128::zero),
        minimum_fee: msg.minimum_fee.unwrap_or_else(Uint128::zero),
        max_batch_size,
        batch_timeout_blocks: msg
            .batch_timeout_blocks
            .unwrap_or(DEFAULT_BATCH_TIMEOUT_BLOCKS),
        conflict_policy: msg.conflict_policy.unwrap_or_default(),
        valset_reward: msg.valset_reward,
    };
    CONFIG.save(deps.storage, &config)?;

    // Static allow-list and initial power snapshot
    for address in &msg.static_validators {
        let validator = deps.api.addr_validate(address)?;
        STATIC_VALIDATORS.save(deps.storage, &validator, &true)?;
    }
    for entry in &msg.validator_powers {
        let validator = deps.api.addr_validate(&entry.validator)?;
        set_validator_power(deps.storage, &validator, entry.power)?;
    }

    // Cursors start at zero
    LAST_OBSERVED_EVENT_NONCE.save(deps.storage, &0u64)?;
    LAST_OBSERVED_ETH_HEIGHT.save(deps.storage, &0u64)?;
    LATEST_VALSET_NONCE.save(deps.storage, &0u64)?;
    LAST_TX_ID.save(deps.storage, &0u64)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("admin", config.admin)
        .add_attribute("gravity_id", config.gravity_id)
        .add_attribute("static_validators", msg.static_validators.len().to_string())
        .add_attribute(
            "valset_drift_threshold",
            config.valset_drift_threshold.to_string(),
        ))
}

// ============================================================================
// Execute
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        // Validator directory
        ExecuteMsg::SetOrchestratorAddress {
            orchestrator,
            eth_address,
        } => execute_set_orchestrator_address(deps, info, orchestrator, eth_address),
        ExecuteMsg::AddStaticValidator { address } => {
            execute_add_static_validator(deps, info, address)
        }
        ExecuteMsg::UpdateValidatorPowers { powers } => {
            execute_update_validator_powers(deps, info, powers)
        }

        // Attestation
        ExecuteMsg::SubmitClaim { claim } => execute_submit_claim(deps, env, info, claim),
        ExecuteMsg::ProcessAttestations {} => execute_process_attestations(deps, env),

        // Valsets
        ExecuteMsg::RequestValset {} => execute_request_valset(deps, env, info),
        ExecuteMsg::ValsetConfirm {
            nonce,
            eth_signer,
            signature,
        } => execute_valset_confirm(deps, info, nonce, eth_signer, signature),
        ExecuteMsg::EndBlock {} => execute_end_block(deps, env),

        // Outgoing transfers & batches
        ExecuteMsg::SendToEth {
            eth_dest,
            bridge_fee,
        } => execute_send_to_eth(deps, info, eth_dest, bridge_fee),
        ExecuteMsg::Receive(cw20_msg) => execute_receive(deps, info, cw20_msg),
        ExecuteMsg::CancelSendToEth { transaction_id } => {
            execute_cancel_send_to_eth(deps, info, transaction_id)
        }
        ExecuteMsg::RequestBatch {
            token_contract,
            max_elements,
        } => execute_request_batch(deps, env, token_contract, max_elements),
        ExecuteMsg::ConfirmBatch {
            nonce,
            token_contract,
            eth_signer,
            signature,
        } => execute_confirm_batch(deps, info, nonce, token_contract, eth_signer, signature),

        // Configuration
        ExecuteMsg::RegisterEthereumToken {
            token_contract,
            cw20,
        } => execute_register_ethereum_token(deps, info, token_contract, cw20),
        ExecuteMsg::UpdateConfig {
            valset_drift_threshold,
            minimum_transfer,
            max_batch_size,
            batch_timeout_blocks,
            conflict_policy,
            valset_reward,
        } => execute_update_config(
            deps,
            info,
            valset_drift_threshold,
            minimum_transfer,
            max_batch_size,
            batch_timeout_blocks,
            conflict_policy,
            valset_reward,
        ),
        ExecuteMsg::SetMinimumFee { fee } => execute_set_minimum_fee(deps, info, fee),

        // Admin
        ExecuteMsg::Pause {} => execute_pause(deps, info),
        ExecuteMsg::Unpause {} => execute_unpause(deps, info),
        ExecuteMsg::ProposeAdmin { new_admin } => execute_propose_admin(deps, env, info, new_admin),
        ExecuteMsg::AcceptAdmin {} => execute_accept_admin(deps, env, info),
        ExecuteMsg::CancelAdminProposal {} => execute_cancel_admin_proposal(deps, info),
    }
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        // Core
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::PendingAdmin {} => to_json_binary(&query_pending_admin(deps)?),

        // Validator directory
        QueryMsg::DelegateKeysByValidator { validator } => {
            to_json_binary(&query_delegate_keys_by_validator(deps, validator)?)
        }
        QueryMsg::DelegateKeysByOrchestrator { orchestrator } => {
            to_json_binary(&query_delegate_keys_by_orchestrator(deps, orchestrator)?)
        }
        QueryMsg::DelegateKeysByEthAddress { eth_address } => {
            to_json_binary(&query_delegate_keys_by_eth_address(deps, eth_address)?)
        }
        QueryMsg::StaticValidators {} => to_json_binary(&query_static_validators(deps)?),
        QueryMsg::IsStaticValidator { address } => {
            to_json_binary(&query_is_static_validator(deps, address)?)
        }
        QueryMsg::ValidatorPowers {} => to_json_binary(&query_validator_powers(deps)?),

        // Attestations
        QueryMsg::Attestation {
            event_nonce,
            fingerprint,
        } => to_json_binary(&query_attestation(deps, event_nonce, fingerprint)?),
        QueryMsg::AttestationsByNonce { event_nonce } => {
            to_json_binary(&query_attestations_by_nonce(deps, event_nonce)?)
        }
        QueryMsg::ClaimFingerprint { claim } => to_json_binary(&query_claim_fingerprint(claim)?),
        QueryMsg::LastObservedEventNonce {} => {
            to_json_binary(&query_last_observed_event_nonce(deps)?)
        }
        QueryMsg::LastEventNonceByAddr { orchestrator } => {
            to_json_binary(&query_last_event_nonce_by_addr(deps, orchestrator)?)
        }
        QueryMsg::LogicCallExecution {
            invalidation_id,
            invalidation_nonce,
        } => to_json_binary(&query_logic_call_execution(
            deps,
            invalidation_id,
            invalidation_nonce,
        )?),

        // Valsets
        QueryMsg::CurrentValset {} => to_json_binary(&query_current_valset(deps, env)?),
        QueryMsg::ValsetRequest { nonce } => to_json_binary(&query_valset_request(deps, nonce)?),
        QueryMsg::LastValsetRequests { limit } => {
            to_json_binary(&query_last_valset_requests(deps, limit)?)
        }
        QueryMsg::LastPendingValsetRequestByAddr { orchestrator } => {
            to_json_binary(&query_last_pending_valset_requests(deps, orchestrator)?)
        }
        QueryMsg::ValsetConfirm {
            nonce,
            orchestrator,
        } => to_json_binary(&query_valset_confirm(deps, nonce, orchestrator)?),
        QueryMsg::ValsetConfirmsByNonce { nonce } => {
            to_json_binary(&query_valset_confirms_by_nonce(deps, nonce)?)
        }
        QueryMsg::ValsetCheckpoint { nonce } => {
            to_json_binary(&query_valset_checkpoint(deps, nonce)?)
        }
        QueryMsg::LastObservedValset {} => to_json_binary(&query_last_observed_valset(deps)?),

        // Outgoing transfers & batches
        QueryMsg::Batch {
            token_contract,
            nonce,
        } => to_json_binary(&query_batch(deps, token_contract, nonce)?),
        QueryMsg::LastBatches { limit } => to_json_binary(&query_last_batches(deps, limit)?),
        QueryMsg::LastPendingBatchRequestByAddr { orchestrator } => {
            to_json_binary(&query_last_pending_batch_requests(deps, orchestrator)?)
        }
        QueryMsg::BatchConfirms {
            token_contract,
            nonce,
        } => to_json_binary(&query_batch_confirms(deps, token_contract, nonce)?),
        QueryMsg::BatchCheckpoint {
            token_contract,
            nonce,
        } => to_json_binary(&query_batch_checkpoint(deps, token_contract, nonce)?),
        QueryMsg::PendingSendToEth { sender } => {
            to_json_binary(&query_pending_send_to_eth(deps, sender)?)
        }
        QueryMsg::BatchFees {} => to_json_binary(&query_batch_fees(deps)?),

        // Token registry
        QueryMsg::Erc20ToDenom { erc20 } => to_json_binary(&query_erc20_to_denom(deps, erc20)?),
        QueryMsg::DenomToErc20 { denom } => to_json_binary(&query_denom_to_erc20(deps, denom)?),
        QueryMsg::LockedBalance { denom } => to_json_binary(&query_locked_balance(deps, denom)?),
        QueryMsg::PendingDeposits { token_contract } => {
            to_json_binary(&query_pending_deposits(deps, token_contract)?)
        }
    }
}

// ============================================================================
// Migrate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::new()
        .add_attribute("method", "migrate")
        .add_attribute("version", CONTRACT_VERSION))
}
