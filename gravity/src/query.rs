//! Query handlers for the Gravity bridge contract.
//!
//! This module contains all query message handlers for retrieving contract state.

use std::collections::BTreeMap;

use cosmwasm_std::{Addr, Binary, Deps, Env, Order, StdError, StdResult, Uint128};

use crate::claims::Claim;
use crate::eth_address::EthAddress;
use crate::execute::{current_valset, last_event_nonce_by_validator};
use crate::hash::{batch_checkpoint, gravity_id_word};
use crate::msg::{
    AttestationEntry, AttestationsResponse, BatchFee, ConfigResponse, DelegateKeysResponse,
    LastObservedResponse, PendingAdminResponse, PendingSendToEthResponse,
    StaticValidatorsResponse, TokenMappingResponse, ValidatorPowersResponse,
};
use crate::power::{PowerSource, StoredPower};
use crate::state::{
    Attestation, BatchConfirm, OutgoingBatch, PendingDeposit, TokenMapping, ValsetConfirm,
    ASSET_TO_ERC20, ATTESTATIONS, BATCH_CONFIRMS, CONFIG, DEFAULT_QUERY_LIMIT, ERC20_TO_ASSET,
    ETH_ADDRESS_BY_VALIDATOR, LAST_OBSERVED_ETH_HEIGHT, LAST_OBSERVED_EVENT_NONCE,
    LAST_OBSERVED_VALSET, LOCKED_BALANCES, LOGIC_CALL_EXECUTIONS, MAX_QUERY_LIMIT,
    ORCHESTRATOR_BY_VALIDATOR, OUTGOING_BATCHES, PENDING_ADMIN, PENDING_DEPOSITS,
    STATIC_VALIDATORS, UNBATCHED_TXS, VALIDATOR_BY_ETH_ADDRESS, VALIDATOR_BY_ORCHESTRATOR, VALSETS,
    VALSET_CONFIRMS,
};
use crate::valset::Valset;

fn page_limit(limit: Option<u32>) -> usize {
    limit.unwrap_or(DEFAULT_QUERY_LIMIT).min(MAX_QUERY_LIMIT) as usize
}

fn parse_eth_address(addr: &str) -> StdResult<EthAddress> {
    EthAddress::parse(addr).map_err(|e| StdError::generic_err(e.to_string()))
}

// ============================================================================
// Core Queries
// ============================================================================

/// Query contract configuration.
pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        admin: config.admin,
        paused: config.paused,
        gravity_id: config.gravity_id,
        valset_drift_threshold: config.valset_drift_threshold,
        minimum_transfer: config.minimum_transfer,
        minimum_fee: config.minimum_fee,
        max_batch_size: config.max_batch_size,
        batch_timeout_blocks: config.batch_timeout_blocks,
        conflict_policy: config.conflict_policy,
        valset_reward: config.valset_reward,
    })
}

/// Query pending admin proposal.
pub fn query_pending_admin(deps: Deps) -> StdResult<Option<PendingAdminResponse>> {
    let pending = PENDING_ADMIN.may_load(deps.storage)?;
    Ok(pending.map(|p| PendingAdminResponse {
        new_address: p.new_address,
        execute_after: p.execute_after,
    }))
}

// ============================================================================
// Validator Directory
// ============================================================================

fn delegate_keys(deps: Deps, validator: Addr) -> StdResult<DelegateKeysResponse> {
    let eth_address = ETH_ADDRESS_BY_VALIDATOR
        .may_load(deps.storage, &validator)?
        .ok_or_else(|| StdError::not_found("eth address"))?;
    let orchestrator = ORCHESTRATOR_BY_VALIDATOR
        .may_load(deps.storage, &validator)?
        .ok_or_else(|| StdError::not_found("orchestrator"))?;
    Ok(DelegateKeysResponse {
        validator,
        orchestrator,
        eth_address,
    })
}

pub fn query_delegate_keys_by_validator(
    deps: Deps,
    validator: String,
) -> StdResult<DelegateKeysResponse> {
    let validator = deps.api.addr_validate(&validator)?;
    delegate_keys(deps, validator)
}

pub fn query_delegate_keys_by_orchestrator(
    deps: Deps,
    orchestrator: String,
) -> StdResult<DelegateKeysResponse> {
    let orchestrator = deps.api.addr_validate(&orchestrator)?;
    let validator = VALIDATOR_BY_ORCHESTRATOR
        .may_load(deps.storage, &orchestrator)?
        .ok_or_else(|| StdError::not_found("validator"))?;
    delegate_keys(deps, validator)
}

pub fn query_delegate_keys_by_eth_address(
    deps: Deps,
    eth_address: String,
) -> StdResult<DelegateKeysResponse> {
    let eth_address = parse_eth_address(&eth_address)?;
    let validator = VALIDATOR_BY_ETH_ADDRESS
        .may_load(deps.storage, eth_address.as_bytes())?
        .ok_or_else(|| StdError::not_found("validator"))?;
    delegate_keys(deps, validator)
}

/// Static validators in ascending address order.
pub fn query_static_validators(deps: Deps) -> StdResult<StaticValidatorsResponse> {
    let validators = STATIC_VALIDATORS
        .keys(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;
    Ok(StaticValidatorsResponse { validators })
}

pub fn query_is_static_validator(deps: Deps, address: String) -> StdResult<bool> {
    let address = deps.api.addr_validate(&address)?;
    Ok(STATIC_VALIDATORS
        .may_load(deps.storage, &address)?
        .unwrap_or(false))
}

pub fn query_validator_powers(deps: Deps) -> StdResult<ValidatorPowersResponse> {
    Ok(ValidatorPowersResponse {
        total_power: StoredPower.total_power(deps.storage)?,
        powers: StoredPower.validators(deps.storage)?,
    })
}

// ============================================================================
// Attestations
// ============================================================================

pub fn query_attestation(
    deps: Deps,
    event_nonce: u64,
    fingerprint: Binary,
) -> StdResult<Option<Attestation>> {
    ATTESTATIONS.may_load(deps.storage, (event_nonce, fingerprint.as_slice()))
}

pub fn query_attestations_by_nonce(deps: Deps, event_nonce: u64) -> StdResult<AttestationsResponse> {
    let attestations = ATTESTATIONS
        .prefix(event_nonce)
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| {
            item.map(|(fingerprint, attestation)| AttestationEntry {
                fingerprint: Binary::from(fingerprint),
                attestation,
            })
        })
        .collect::<StdResult<Vec<_>>>()?;
    Ok(AttestationsResponse { attestations })
}

pub fn query_claim_fingerprint(claim: Claim) -> StdResult<Binary> {
    Ok(Binary::from(claim.fingerprint().as_slice()))
}

pub fn query_last_observed_event_nonce(deps: Deps) -> StdResult<LastObservedResponse> {
    Ok(LastObservedResponse {
        event_nonce: LAST_OBSERVED_EVENT_NONCE
            .may_load(deps.storage)?
            .unwrap_or_default(),
        ethereum_height: LAST_OBSERVED_ETH_HEIGHT
            .may_load(deps.storage)?
            .unwrap_or_default(),
    })
}

/// Last event nonce voted on by the orchestrator's validator, so a restarted
/// orchestrator knows where to resume.
pub fn query_last_event_nonce_by_addr(deps: Deps, orchestrator: String) -> StdResult<u64> {
    let orchestrator = deps.api.addr_validate(&orchestrator)?;
    let validator = VALIDATOR_BY_ORCHESTRATOR
        .may_load(deps.storage, &orchestrator)?
        .ok_or_else(|| StdError::not_found("validator"))?;
    last_event_nonce_by_validator(deps.storage, &validator)
}

pub fn query_logic_call_execution(
    deps: Deps,
    invalidation_id: Binary,
    invalidation_nonce: u64,
) -> StdResult<Option<u64>> {
    LOGIC_CALL_EXECUTIONS.may_load(
        deps.storage,
        (invalidation_id.as_slice(), invalidation_nonce),
    )
}

// ============================================================================
// Valsets
// ============================================================================

pub fn query_current_valset(deps: Deps, env: Env) -> StdResult<Valset> {
    current_valset(deps.storage, &StoredPower, env.block.height)
        .map_err(|e| StdError::generic_err(e.to_string()))
}

pub fn query_valset_request(deps: Deps, nonce: u64) -> StdResult<Option<Valset>> {
    VALSETS.may_load(deps.storage, nonce)
}

/// Most recent valset requests, newest first.
pub fn query_last_valset_requests(deps: Deps, limit: Option<u32>) -> StdResult<Vec<Valset>> {
    VALSETS
        .range(deps.storage, None, None, Order::Descending)
        .take(page_limit(limit))
        .map(|item| item.map(|(_, valset)| valset))
        .collect()
}

/// Recent valsets without a confirmation from `orchestrator`, newest first.
pub fn query_last_pending_valset_requests(
    deps: Deps,
    orchestrator: String,
) -> StdResult<Vec<Valset>> {
    let orchestrator = deps.api.addr_validate(&orchestrator)?;
    let mut pending = Vec::new();
    for item in VALSETS.range(deps.storage, None, None, Order::Descending) {
        let (nonce, valset) = item?;
        if !VALSET_CONFIRMS.has(deps.storage, (nonce, &orchestrator)) {
            pending.push(valset);
            if pending.len() >= MAX_QUERY_LIMIT as usize {
                break;
            }
        }
    }
    Ok(pending)
}

pub fn query_valset_confirm(
    deps: Deps,
    nonce: u64,
    orchestrator: String,
) -> StdResult<Option<ValsetConfirm>> {
    let orchestrator = deps.api.addr_validate(&orchestrator)?;
    VALSET_CONFIRMS.may_load(deps.storage, (nonce, &orchestrator))
}

pub fn query_valset_confirms_by_nonce(deps: Deps, nonce: u64) -> StdResult<Vec<ValsetConfirm>> {
    VALSET_CONFIRMS
        .prefix(nonce)
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, confirm)| confirm))
        .collect()
}

pub fn query_valset_checkpoint(deps: Deps, nonce: u64) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let gravity_id =
        gravity_id_word(&config.gravity_id).map_err(|e| StdError::generic_err(e.to_string()))?;
    let valset = VALSETS.load(deps.storage, nonce)?;
    Ok(Binary::from(valset.checkpoint(&gravity_id).as_slice()))
}

pub fn query_last_observed_valset(deps: Deps) -> StdResult<Option<Valset>> {
    LAST_OBSERVED_VALSET.may_load(deps.storage)
}

// ============================================================================
// Outgoing Transfers & Batches
// ============================================================================

pub fn query_batch(deps: Deps, token_contract: String, nonce: u64) -> StdResult<Option<OutgoingBatch>> {
    let token_contract = parse_eth_address(&token_contract)?;
    OUTGOING_BATCHES.may_load(deps.storage, (token_contract.as_bytes().as_slice(), nonce))
}

fn batches_newest_first(deps: Deps) -> StdResult<Vec<OutgoingBatch>> {
    let mut batches = OUTGOING_BATCHES
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, batch)| batch))
        .collect::<StdResult<Vec<_>>>()?;
    batches.sort_by(|a, b| {
        b.block
            .cmp(&a.block)
            .then_with(|| b.batch_nonce.cmp(&a.batch_nonce))
    });
    Ok(batches)
}

/// Most recent batches over all token contracts, newest first.
pub fn query_last_batches(deps: Deps, limit: Option<u32>) -> StdResult<Vec<OutgoingBatch>> {
    let mut batches = batches_newest_first(deps)?;
    batches.truncate(page_limit(limit));
    Ok(batches)
}

/// Recent batches without a confirmation from `orchestrator`, newest first.
pub fn query_last_pending_batch_requests(
    deps: Deps,
    orchestrator: String,
) -> StdResult<Vec<OutgoingBatch>> {
    let orchestrator = deps.api.addr_validate(&orchestrator)?;
    let pending = batches_newest_first(deps)?
        .into_iter()
        .filter(|batch| {
            !BATCH_CONFIRMS.has(
                deps.storage,
                (
                    batch.token_contract.as_bytes().as_slice(),
                    batch.batch_nonce,
                    &orchestrator,
                ),
            )
        })
        .take(MAX_QUERY_LIMIT as usize)
        .collect();
    Ok(pending)
}

pub fn query_batch_confirms(
    deps: Deps,
    token_contract: String,
    nonce: u64,
) -> StdResult<Vec<BatchConfirm>> {
    let token_contract = parse_eth_address(&token_contract)?;
    BATCH_CONFIRMS
        .prefix((token_contract.as_bytes().as_slice(), nonce))
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, confirm)| confirm))
        .collect()
}

pub fn query_batch_checkpoint(deps: Deps, token_contract: String, nonce: u64) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let gravity_id =
        gravity_id_word(&config.gravity_id).map_err(|e| StdError::generic_err(e.to_string()))?;
    let token_contract = parse_eth_address(&token_contract)?;
    let batch = OUTGOING_BATCHES.load(deps.storage, (token_contract.as_bytes().as_slice(), nonce))?;
    Ok(Binary::from(batch_checkpoint(&gravity_id, &batch).as_slice()))
}

/// Every transfer of `sender`, batched or still pooled.
pub fn query_pending_send_to_eth(deps: Deps, sender: String) -> StdResult<PendingSendToEthResponse> {
    let sender = deps.api.addr_validate(&sender)?;

    let mut transfers_in_batches = Vec::new();
    for item in OUTGOING_BATCHES.range(deps.storage, None, None, Order::Ascending) {
        let (_, batch) = item?;
        transfers_in_batches.extend(batch.transactions.into_iter().filter(|tx| tx.sender == sender));
    }

    let mut unbatched_transfers = Vec::new();
    for item in UNBATCHED_TXS.range(deps.storage, None, None, Order::Ascending) {
        let (_, tx) = item?;
        if tx.sender == sender {
            unbatched_transfers.push(tx);
        }
    }

    Ok(PendingSendToEthResponse {
        transfers_in_batches,
        unbatched_transfers,
    })
}

/// Pooled fee totals per token contract.
pub fn query_batch_fees(deps: Deps) -> StdResult<Vec<BatchFee>> {
    let mut fees: BTreeMap<EthAddress, BatchFee> = BTreeMap::new();
    for item in UNBATCHED_TXS.range(deps.storage, None, None, Order::Ascending) {
        let (_, tx) = item?;
        let entry = fees.entry(tx.token_contract).or_insert(BatchFee {
            token_contract: tx.token_contract,
            total_fees: Uint128::zero(),
            tx_count: 0,
        });
        entry.total_fees += tx.fee;
        entry.tx_count += 1;
    }
    Ok(fees.into_values().collect())
}

// ============================================================================
// Token Registry
// ============================================================================

fn mapping_response(mapping: TokenMapping) -> TokenMappingResponse {
    TokenMappingResponse {
        erc20: mapping.erc20,
        asset: mapping.asset.key(),
        cosmos_originated: mapping.cosmos_originated,
    }
}

pub fn query_erc20_to_denom(deps: Deps, erc20: String) -> StdResult<Option<TokenMappingResponse>> {
    let erc20 = parse_eth_address(&erc20)?;
    Ok(ERC20_TO_ASSET
        .may_load(deps.storage, erc20.as_bytes())?
        .map(mapping_response))
}

pub fn query_denom_to_erc20(deps: Deps, denom: String) -> StdResult<Option<TokenMappingResponse>> {
    match ASSET_TO_ERC20.may_load(deps.storage, &denom)? {
        Some(erc20) => Ok(ERC20_TO_ASSET
            .may_load(deps.storage, erc20.as_bytes())?
            .map(mapping_response)),
        None => Ok(None),
    }
}

pub fn query_locked_balance(deps: Deps, denom: String) -> StdResult<Uint128> {
    Ok(LOCKED_BALANCES
        .may_load(deps.storage, &denom)?
        .unwrap_or_default())
}

/// Parked deposits for `token_contract`, oldest event first
pub fn query_pending_deposits(
    deps: Deps,
    token_contract: String,
) -> StdResult<Vec<PendingDeposit>> {
    let erc20 = parse_eth_address(&token_contract)?;
    PENDING_DEPOSITS
        .prefix(erc20.as_bytes().as_slice())
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, deposit)| deposit))
        .collect()
}
