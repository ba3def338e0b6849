//! Attestation engine handlers.
//!
//! Orchestrators vote on Ethereum events by submitting claims. Votes for the
//! same content at the same event nonce are aggregated into one attestation.
//! Event nonces are observed strictly in order: once the attestation at
//! `cursor + 1` holds two thirds of the current normalized power it is marked
//! observed, its side effect runs exactly once, and the cursor advances.

use cosmwasm_std::{
    to_json_binary, Addr, CosmosMsg, DepsMut, Env, Event, MessageInfo, Order, Response,
    StdResult, Storage, Uint128, WasmMsg,
};
use cw20::Cw20ExecuteMsg;

use common::AssetInfo;

use crate::claims::Claim;
use crate::error::ContractError;
use crate::eth_address::EthAddress;
use crate::execute::{
    on_batch_executed, on_erc20_deployed, on_valset_updated, validator_by_orchestrator,
};
use crate::hash::bytes32_to_hex;
use crate::power::{normalize_power, PowerSource, StoredPower, POWER_THRESHOLD};
use crate::state::{
    Attestation, ConflictPolicy, PendingDeposit, ATTESTATIONS, CONFIG, ERC20_TO_ASSET,
    LAST_EVENT_NONCE_BY_VALIDATOR, LAST_OBSERVED_ETH_HEIGHT, LAST_OBSERVED_EVENT_NONCE,
    LOCKED_BALANCES, LOGIC_CALL_EXECUTIONS, PENDING_DEPOSITS,
};

// ============================================================================
// Observation Results
// ============================================================================

/// Result of applying an observed claim
pub enum ClaimOutcome {
    /// Side effect applied; messages move funds on the ledger
    Applied(Vec<CosmosMsg>),
    /// The effect waits on local state, e.g. a deposit of an unregistered ERC20
    Deferred(String),
    /// The claim is observed but its effect could not be applied
    Failed(String),
}

/// Everything produced by one observation pass
#[derive(Default)]
pub struct Observations {
    pub messages: Vec<CosmosMsg>,
    pub events: Vec<Event>,
    /// Event nonces observed during the pass, in order
    pub nonces: Vec<u64>,
}

// ============================================================================
// Submit Claim
// ============================================================================

/// Record the sender's vote for a claim, then run observation.
pub fn execute_submit_claim(
    mut deps: DepsMut,
    env: Env,
    info: MessageInfo,
    claim: Claim,
) -> Result<Response, ContractError> {
    claim.validate()?;
    let validator = validator_by_orchestrator(deps.storage, &info.sender)?;
    let config = CONFIG.load(deps.storage)?;
    let fingerprint = claim.fingerprint();

    let attestation = attest(
        deps.storage,
        config.conflict_policy,
        &validator,
        &claim,
        &fingerprint,
        env.block.height,
    )?;

    let observations = process_attestations(deps.branch(), &env, &StoredPower)?;

    Ok(Response::new()
        .add_attribute("method", "submit_claim")
        .add_attribute("orchestrator", info.sender)
        .add_attribute("validator", validator)
        .add_attribute("claim_type", claim.claim_type())
        .add_attribute("event_nonce", claim.event_nonce().to_string())
        .add_attribute("fingerprint", bytes32_to_hex(&fingerprint))
        .add_attribute("votes", attestation.votes.len().to_string())
        .add_attribute("observed_count", observations.nonces.len().to_string())
        .add_messages(observations.messages)
        .add_events(observations.events))
}

/// Re-run observation; picks up attestations pushed over the threshold by
/// power changes rather than new votes.
pub fn execute_process_attestations(
    deps: DepsMut,
    env: Env,
) -> Result<Response, ContractError> {
    let observations = process_attestations(deps, &env, &StoredPower)?;

    Ok(Response::new()
        .add_attribute("method", "process_attestations")
        .add_attribute("observed_count", observations.nonces.len().to_string())
        .add_messages(observations.messages)
        .add_events(observations.events))
}

/// Last event nonce a validator voted on. A validator that never voted is
/// treated as one behind the cursor so it may still add a late vote at it.
pub fn last_event_nonce_by_validator(storage: &dyn Storage, validator: &Addr) -> StdResult<u64> {
    match LAST_EVENT_NONCE_BY_VALIDATOR.may_load(storage, validator)? {
        Some(nonce) => Ok(nonce),
        None => Ok(LAST_OBSERVED_EVENT_NONCE
            .may_load(storage)?
            .unwrap_or_default()
            .saturating_sub(1)),
    }
}

/// Add `validator`'s vote for `claim`. Fails without writing anything when the
/// vote is a duplicate, out of order, or conflicts with what was observed.
pub fn attest(
    storage: &mut dyn Storage,
    policy: ConflictPolicy,
    validator: &Addr,
    claim: &Claim,
    fingerprint: &[u8; 32],
    height: u64,
) -> Result<Attestation, ContractError> {
    let nonce = claim.event_nonce();
    let cursor = LAST_OBSERVED_EVENT_NONCE.may_load(storage)?.unwrap_or_default();
    let existing = ATTESTATIONS.may_load(storage, (nonce, fingerprint.as_slice()))?;

    if let Some(attestation) = &existing {
        if attestation.votes.contains(validator) {
            return Err(ContractError::DuplicateVote {
                validator: validator.to_string(),
                nonce,
            });
        }
    }

    let expected = last_event_nonce_by_validator(storage, validator)? + 1;
    if nonce != expected {
        return Err(ContractError::InvalidNonce {
            expected,
            got: nonce,
        });
    }

    if nonce <= cursor {
        // late vote: only the observed content is accepted
        if !matches!(&existing, Some(attestation) if attestation.observed) {
            return Err(ContractError::ConflictsWithObserved { nonce });
        }
    } else if existing.is_none()
        && policy == ConflictPolicy::Reject
        && ATTESTATIONS
            .prefix(nonce)
            .keys(storage, None, None, Order::Ascending)
            .next()
            .is_some()
    {
        return Err(ContractError::ConflictingClaim { nonce });
    }

    let mut attestation = existing.unwrap_or_else(|| Attestation {
        claim: claim.clone(),
        votes: vec![],
        observed: false,
        height,
    });
    attestation.votes.push(validator.clone());

    ATTESTATIONS.save(storage, (nonce, fingerprint.as_slice()), &attestation)?;
    LAST_EVENT_NONCE_BY_VALIDATOR.save(storage, validator, &nonce)?;

    Ok(attestation)
}

// ============================================================================
// Observation
// ============================================================================

/// Voters' combined current stake, normalized once against `total`
pub fn voting_power(
    storage: &dyn Storage,
    power: &dyn PowerSource,
    votes: &[Addr],
    total: u64,
) -> StdResult<u64> {
    let mut stake = 0u64;
    for voter in votes {
        stake = stake.saturating_add(power.power_of(storage, voter)?);
    }
    Ok(normalize_power(stake.min(total), total))
}

/// Observe every attestation that has reached the threshold, in nonce order,
/// stopping at the first nonce that has not.
pub fn process_attestations(
    mut deps: DepsMut,
    env: &Env,
    power: &dyn PowerSource,
) -> Result<Observations, ContractError> {
    let mut observations = Observations::default();

    loop {
        let total = power.total_power(deps.storage)?;
        if total == 0 {
            break;
        }

        let next = LAST_OBSERVED_EVENT_NONCE
            .may_load(deps.storage)?
            .unwrap_or_default()
            + 1;
        let candidates: Vec<(Vec<u8>, Attestation)> = ATTESTATIONS
            .prefix(next)
            .range(deps.storage, None, None, Order::Ascending)
            .collect::<StdResult<_>>()?;

        let mut winner = None;
        for (fingerprint, attestation) in candidates {
            if attestation.observed {
                continue;
            }
            if voting_power(deps.storage, power, &attestation.votes, total)? >= POWER_THRESHOLD {
                winner = Some((fingerprint, attestation));
                break;
            }
        }
        let Some((fingerprint, mut attestation)) = winner else {
            break;
        };

        attestation.observed = true;
        ATTESTATIONS.save(deps.storage, (next, fingerprint.as_slice()), &attestation)?;
        LAST_OBSERVED_EVENT_NONCE.save(deps.storage, &next)?;
        let eth_height = LAST_OBSERVED_ETH_HEIGHT
            .may_load(deps.storage)?
            .unwrap_or_default()
            .max(attestation.claim.block_height());
        LAST_OBSERVED_ETH_HEIGHT.save(deps.storage, &eth_height)?;

        let mut event = Event::new("gravity_observation")
            .add_attribute("claim_type", attestation.claim.claim_type())
            .add_attribute("event_nonce", next.to_string())
            .add_attribute("fingerprint", format!("0x{}", hex::encode(&fingerprint)))
            .add_attribute("votes", attestation.votes.len().to_string())
            .add_attribute("eth_height", eth_height.to_string());

        match apply_claim(deps.branch(), env, &attestation.claim)? {
            ClaimOutcome::Applied(messages) => observations.messages.extend(messages),
            ClaimOutcome::Deferred(reason) => {
                event = event.add_attribute("claim_deferred", reason)
            }
            ClaimOutcome::Failed(reason) => event = event.add_attribute("claim_error", reason),
        }

        observations.events.push(event);
        observations.nonces.push(next);
    }

    Ok(observations)
}

// ============================================================================
// Side Effects
// ============================================================================

fn apply_claim(deps: DepsMut, env: &Env, claim: &Claim) -> Result<ClaimOutcome, ContractError> {
    match claim {
        Claim::SendToCosmos {
            event_nonce,
            token_contract,
            amount,
            cosmos_receiver,
            ..
        } => handle_send_to_cosmos(deps, *event_nonce, token_contract, *amount, cosmos_receiver),
        Claim::BatchSendToEthExecuted {
            batch_nonce,
            token_contract,
            ..
        } => on_batch_executed(deps.storage, token_contract, *batch_nonce),
        Claim::ContractCallExecuted {
            block_height,
            invalidation_id,
            invalidation_nonce,
            ..
        } => {
            LOGIC_CALL_EXECUTIONS.save(
                deps.storage,
                (invalidation_id.as_slice(), *invalidation_nonce),
                block_height,
            )?;
            Ok(ClaimOutcome::Applied(vec![]))
        }
        Claim::Erc20Deployed {
            cosmos_denom,
            token_contract,
            ..
        } => on_erc20_deployed(deps.storage, cosmos_denom, token_contract),
        Claim::ValsetUpdated {
            valset_nonce,
            members,
            reward_amount,
            reward_token,
            ..
        } => on_valset_updated(
            deps.storage,
            env,
            *valset_nonce,
            members.clone(),
            *reward_amount,
            *reward_token,
        ),
    }
}

/// Mint `amount` of a bridge-minted cw20 to `recipient`
pub fn mint_msg(cw20: &Addr, recipient: &Addr, amount: Uint128) -> StdResult<CosmosMsg> {
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: cw20.to_string(),
        msg: to_json_binary(&Cw20ExecuteMsg::Mint {
            recipient: recipient.to_string(),
            amount,
        })?,
        funds: vec![],
    }))
}

/// Release a deposit: unlock Cosmos-originated coins or mint the cw20
/// representing an Ethereum-originated token. Deposits of an ERC20 with no
/// mapping are parked until `RegisterEthereumToken` maps it.
fn handle_send_to_cosmos(
    deps: DepsMut,
    event_nonce: u64,
    token_contract: &EthAddress,
    amount: Uint128,
    cosmos_receiver: &str,
) -> Result<ClaimOutcome, ContractError> {
    let receiver = match deps.api.addr_validate(cosmos_receiver) {
        Ok(receiver) => receiver,
        Err(_) => {
            return Ok(ClaimOutcome::Failed(format!(
                "invalid cosmos receiver {}",
                cosmos_receiver
            )))
        }
    };
    let mapping = match ERC20_TO_ASSET.may_load(deps.storage, token_contract.as_bytes())? {
        Some(mapping) => mapping,
        None => {
            PENDING_DEPOSITS.save(
                deps.storage,
                (token_contract.as_bytes().as_slice(), event_nonce),
                &PendingDeposit {
                    event_nonce,
                    receiver,
                    amount,
                },
            )?;
            return Ok(ClaimOutcome::Deferred(format!(
                "token contract {} not registered",
                token_contract
            )));
        }
    };

    if mapping.cosmos_originated {
        let key = mapping.asset.key();
        let locked = LOCKED_BALANCES
            .may_load(deps.storage, &key)?
            .unwrap_or_default();
        if locked < amount {
            return Ok(ClaimOutcome::Failed(format!(
                "locked balance {} of {} below deposit {}",
                locked, key, amount
            )));
        }
        LOCKED_BALANCES.save(deps.storage, &key, &(locked - amount))?;
        return Ok(ClaimOutcome::Applied(vec![
            mapping.asset.transfer_msg(&receiver, amount)?
        ]));
    }

    match mapping.asset {
        AssetInfo::Cw20 { contract_addr } => Ok(ClaimOutcome::Applied(vec![mint_msg(
            &contract_addr,
            &receiver,
            amount,
        )?])),
        AssetInfo::Native { denom } => Ok(ClaimOutcome::Failed(format!(
            "native denom {} cannot be minted",
            denom
        ))),
    }
}
