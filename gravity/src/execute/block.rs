//! Periodic housekeeping.
//!
//! `EndBlock` is permissionless and idempotent; a keeper or relayer calls it
//! once per block. It re-runs observation, cancels timed-out batches and
//! stores a new valset when power has drifted.

use cosmwasm_std::{DepsMut, Env, Response};

use crate::error::ContractError;
use crate::execute::{cancel_timed_out_batches, maybe_store_valset, process_attestations};
use crate::power::StoredPower;

pub fn execute_end_block(mut deps: DepsMut, env: Env) -> Result<Response, ContractError> {
    let observations = process_attestations(deps.branch(), &env, &StoredPower)?;
    let expired = cancel_timed_out_batches(deps.storage)?;
    let valset = maybe_store_valset(deps.storage, &StoredPower, env.block.height)?;

    let mut response = Response::new()
        .add_attribute("method", "end_block")
        .add_attribute("observed_count", observations.nonces.len().to_string())
        .add_attribute("timed_out_batches", expired.len().to_string());
    if let Some(valset) = valset {
        response = response.add_attribute("valset_nonce", valset.nonce.to_string());
    }

    Ok(response
        .add_messages(observations.messages)
        .add_events(observations.events))
}
