//! Outgoing pool and batch handlers.
//!
//! Withdrawals wait in a per-token-contract pool ordered by fee. A batch takes
//! the highest-fee entries (lowest id first on equal fees), gets the next
//! nonce for its token contract and is signed by orchestrators. Batches leave
//! storage when executed on Ethereum, when a newer batch of the same contract
//! executes, or when they time out; the last two return their transfers to
//! the pool.

use cosmwasm_std::{
    from_json, to_json_binary, Addr, Binary, CosmosMsg, DepsMut, Env, MessageInfo, Order,
    Response, StdResult, Storage, Uint128, WasmMsg,
};
use cw20::{Cw20ExecuteMsg, Cw20ReceiveMsg};
use cw_storage_plus::Bound;

use common::AssetInfo;

use crate::error::ContractError;
use crate::eth_address::EthAddress;
use crate::execute::{eth_address_by_validator, validator_by_orchestrator, ClaimOutcome};
use crate::msg::ReceiveMsg;
use crate::state::{
    BatchConfirm, OutgoingBatch, OutgoingTransfer, ASSET_TO_ERC20, BATCH_CONFIRMS, CONFIG,
    ERC20_TO_ASSET, LAST_BATCH_NONCE, LAST_OBSERVED_ETH_HEIGHT, LAST_TX_ID, LOCKED_BALANCES,
    OUTGOING_BATCHES, UNBATCHED_BY_FEE, UNBATCHED_TXS,
};

// ============================================================================
// Enqueue
// ============================================================================

/// Withdraw native coins to Ethereum. The single attached coin covers the
/// transfer amount plus the bridge fee.
pub fn execute_send_to_eth(
    deps: DepsMut,
    info: MessageInfo,
    eth_dest: String,
    bridge_fee: Uint128,
) -> Result<Response, ContractError> {
    if info.funds.len() != 1 {
        return Err(ContractError::InvalidAmount {
            reason: "exactly one coin must be sent".to_string(),
        });
    }
    let coin = &info.funds[0];
    let asset = AssetInfo::Native {
        denom: coin.denom.clone(),
    };

    let tx = enqueue_transfer(
        deps.storage,
        info.sender,
        asset,
        coin.amount,
        &eth_dest,
        bridge_fee,
    )?;

    Ok(transfer_response("send_to_eth", &tx))
}

/// Withdraw cw20 tokens to Ethereum (cw20 receive hook).
pub fn execute_receive(
    deps: DepsMut,
    info: MessageInfo,
    cw20_msg: Cw20ReceiveMsg,
) -> Result<Response, ContractError> {
    let sender = deps.api.addr_validate(&cw20_msg.sender)?;
    let asset = AssetInfo::Cw20 {
        contract_addr: info.sender,
    };

    let receive_msg: ReceiveMsg = from_json(&cw20_msg.msg)?;
    match receive_msg {
        ReceiveMsg::SendToEth {
            eth_dest,
            bridge_fee,
        } => {
            let tx = enqueue_transfer(
                deps.storage,
                sender,
                asset,
                cw20_msg.amount,
                &eth_dest,
                bridge_fee,
            )?;
            Ok(transfer_response("send_to_eth_cw20", &tx))
        }
    }
}

fn transfer_response(method: &str, tx: &OutgoingTransfer) -> Response {
    Response::new()
        .add_attribute("method", method)
        .add_attribute("transaction_id", tx.id.to_string())
        .add_attribute("sender", tx.sender.to_string())
        .add_attribute("dest_address", tx.dest_address.to_string())
        .add_attribute("token_contract", tx.token_contract.to_string())
        .add_attribute("amount", tx.amount)
        .add_attribute("fee", tx.fee)
}

/// Validate a withdrawal and add it to the pool under a fresh id.
pub fn enqueue_transfer(
    storage: &mut dyn Storage,
    sender: Addr,
    asset: AssetInfo,
    total: Uint128,
    eth_dest: &str,
    bridge_fee: Uint128,
) -> Result<OutgoingTransfer, ContractError> {
    let config = CONFIG.load(storage)?;
    if config.paused {
        return Err(ContractError::BridgePaused);
    }

    let dest_address = EthAddress::parse(eth_dest)?;
    let token_contract = ASSET_TO_ERC20
        .may_load(storage, &asset.key())?
        .ok_or_else(|| ContractError::TokenNotSupported { token: asset.key() })?;

    let amount = total
        .checked_sub(bridge_fee)
        .map_err(|_| ContractError::InvalidAmount {
            reason: format!("fee {} exceeds sent amount {}", bridge_fee, total),
        })?;
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "transfer amount must be positive".to_string(),
        });
    }
    if amount < config.minimum_transfer {
        return Err(ContractError::BelowMinimumTransfer {
            amount,
            minimum: config.minimum_transfer,
        });
    }
    if bridge_fee < config.minimum_fee {
        return Err(ContractError::BelowMinimumFee {
            fee: bridge_fee,
            minimum: config.minimum_fee,
        });
    }

    let id = LAST_TX_ID.may_load(storage)?.unwrap_or_default() + 1;
    LAST_TX_ID.save(storage, &id)?;

    let tx = OutgoingTransfer {
        id,
        sender,
        dest_address,
        token_contract,
        amount,
        fee: bridge_fee,
        asset,
    };
    add_to_pool(storage, &tx)?;
    Ok(tx)
}

fn pool_key(tx: &OutgoingTransfer) -> (&[u8], u128, u64) {
    (
        tx.token_contract.as_bytes().as_slice(),
        u128::MAX - tx.fee.u128(),
        tx.id,
    )
}

fn add_to_pool(storage: &mut dyn Storage, tx: &OutgoingTransfer) -> StdResult<()> {
    UNBATCHED_TXS.save(storage, tx.id, tx)?;
    UNBATCHED_BY_FEE.save(storage, pool_key(tx), &true)
}

fn remove_from_pool(storage: &mut dyn Storage, tx: &OutgoingTransfer) {
    UNBATCHED_TXS.remove(storage, tx.id);
    UNBATCHED_BY_FEE.remove(storage, pool_key(tx));
}

// ============================================================================
// Cancel
// ============================================================================

/// Cancel an unbatched withdrawal and refund amount plus fee to its sender.
pub fn execute_cancel_send_to_eth(
    deps: DepsMut,
    info: MessageInfo,
    transaction_id: u64,
) -> Result<Response, ContractError> {
    let tx = match UNBATCHED_TXS.may_load(deps.storage, transaction_id)? {
        Some(tx) => tx,
        None if is_batched(deps.storage, transaction_id)? => {
            return Err(ContractError::TransferAlreadyBatched { id: transaction_id })
        }
        None => return Err(ContractError::TransferNotFound { id: transaction_id }),
    };

    if tx.sender != info.sender {
        return Err(ContractError::NotTransferSender { id: transaction_id });
    }

    remove_from_pool(deps.storage, &tx);
    let refund = tx.asset.transfer_msg(&tx.sender, tx.total())?;

    Ok(Response::new()
        .add_message(refund)
        .add_attribute("method", "cancel_send_to_eth")
        .add_attribute("transaction_id", transaction_id.to_string())
        .add_attribute("refund", tx.total())
        .add_attribute("asset", tx.asset.to_string()))
}

fn is_batched(storage: &dyn Storage, id: u64) -> StdResult<bool> {
    for item in OUTGOING_BATCHES.range(storage, None, None, Order::Ascending) {
        let (_, batch) = item?;
        if batch.transactions.iter().any(|tx| tx.id == id) {
            return Ok(true);
        }
    }
    Ok(false)
}

// ============================================================================
// Build Batch
// ============================================================================

/// Build a batch for a token contract (anyone may request).
pub fn execute_request_batch(
    deps: DepsMut,
    env: Env,
    token_contract: String,
    max_elements: Option<u32>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.paused {
        return Err(ContractError::BridgePaused);
    }

    let token_contract = EthAddress::parse(&token_contract)?;
    let limit = max_elements
        .unwrap_or(config.max_batch_size)
        .min(config.max_batch_size);
    if limit == 0 {
        return Err(ContractError::InvalidAmount {
            reason: "max_elements must be positive".to_string(),
        });
    }

    // batch timeouts count from the last observed Ethereum height
    let eth_height = LAST_OBSERVED_ETH_HEIGHT
        .may_load(deps.storage)?
        .unwrap_or_default();
    if eth_height == 0 {
        return Err(ContractError::NoObservedEthereumHeight);
    }
    let batch = build_batch(
        deps.storage,
        &token_contract,
        limit,
        env.block.height,
        eth_height.saturating_add(config.batch_timeout_blocks),
    )?;

    let ids: Vec<String> = batch.transactions.iter().map(|tx| tx.id.to_string()).collect();
    Ok(Response::new()
        .add_attribute("method", "request_batch")
        .add_attribute("token_contract", token_contract.to_string())
        .add_attribute("batch_nonce", batch.batch_nonce.to_string())
        .add_attribute("batch_timeout", batch.batch_timeout.to_string())
        .add_attribute("transaction_ids", ids.join(",")))
}

/// Move up to `max_elements` of the best-paying pooled transfers into a new
/// batch. Fails when the pool holds nothing for the contract.
pub fn build_batch(
    storage: &mut dyn Storage,
    token_contract: &EthAddress,
    max_elements: u32,
    block: u64,
    batch_timeout: u64,
) -> Result<OutgoingBatch, ContractError> {
    let keys: Vec<(u128, u64)> = UNBATCHED_BY_FEE
        .sub_prefix(token_contract.as_bytes().as_slice())
        .keys(storage, None, None, Order::Ascending)
        .take(max_elements as usize)
        .collect::<StdResult<_>>()?;
    if keys.is_empty() {
        return Err(ContractError::EmptyBatch {
            token_contract: token_contract.to_string(),
        });
    }

    let transactions = keys
        .into_iter()
        .map(|(_, id)| UNBATCHED_TXS.load(storage, id))
        .collect::<StdResult<Vec<_>>>()?;
    for tx in &transactions {
        remove_from_pool(storage, tx);
    }

    let contract_key = token_contract.as_bytes().as_slice();
    let batch_nonce = LAST_BATCH_NONCE
        .may_load(storage, contract_key)?
        .unwrap_or_default()
        + 1;
    LAST_BATCH_NONCE.save(storage, contract_key, &batch_nonce)?;

    let batch = OutgoingBatch {
        batch_nonce,
        batch_timeout,
        transactions,
        token_contract: *token_contract,
        block,
    };
    OUTGOING_BATCHES.save(storage, (contract_key, batch_nonce), &batch)?;
    Ok(batch)
}

// ============================================================================
// Confirm Batch
// ============================================================================

/// Record an orchestrator's signature over a batch checkpoint.
pub fn execute_confirm_batch(
    deps: DepsMut,
    info: MessageInfo,
    nonce: u64,
    token_contract: String,
    eth_signer: String,
    signature: Binary,
) -> Result<Response, ContractError> {
    let validator = validator_by_orchestrator(deps.storage, &info.sender)?;
    let token_contract = EthAddress::parse(&token_contract)?;
    let eth_signer = EthAddress::parse(&eth_signer)?;
    let contract_key = token_contract.as_bytes().as_slice();

    if !OUTGOING_BATCHES.has(deps.storage, (contract_key, nonce)) {
        return Err(ContractError::BatchNotFound {
            token_contract: token_contract.to_string(),
            nonce,
        });
    }

    let expected = eth_address_by_validator(deps.storage, &validator)?;
    if expected != eth_signer {
        return Err(ContractError::SignerMismatch {
            expected: expected.to_string(),
            got: eth_signer.to_string(),
        });
    }

    if BATCH_CONFIRMS.has(deps.storage, (contract_key, nonce, &info.sender)) {
        return Err(ContractError::DuplicateConfirmation {
            orchestrator: info.sender.to_string(),
        });
    }

    let confirm = BatchConfirm {
        nonce,
        token_contract,
        orchestrator: info.sender.clone(),
        eth_signer,
        signature,
    };
    BATCH_CONFIRMS.save(deps.storage, (contract_key, nonce, &info.sender), &confirm)?;

    Ok(Response::new()
        .add_attribute("method", "confirm_batch")
        .add_attribute("orchestrator", info.sender)
        .add_attribute("token_contract", token_contract.to_string())
        .add_attribute("batch_nonce", nonce.to_string()))
}

// ============================================================================
// Batch Lifecycle
// ============================================================================

fn remove_batch(storage: &mut dyn Storage, token_contract: &EthAddress, nonce: u64) -> StdResult<()> {
    let contract_key = token_contract.as_bytes().as_slice();
    let signers: Vec<Addr> = BATCH_CONFIRMS
        .prefix((contract_key, nonce))
        .keys(storage, None, None, Order::Ascending)
        .collect::<StdResult<_>>()?;
    for signer in signers {
        BATCH_CONFIRMS.remove(storage, (contract_key, nonce, &signer));
    }
    OUTGOING_BATCHES.remove(storage, (contract_key, nonce));
    Ok(())
}

/// Delete a batch and return its transfers to the pool
pub fn cancel_batch(storage: &mut dyn Storage, token_contract: &EthAddress, nonce: u64) -> StdResult<()> {
    let batch = OUTGOING_BATCHES.load(storage, (token_contract.as_bytes().as_slice(), nonce))?;
    for tx in &batch.transactions {
        add_to_pool(storage, tx)?;
    }
    remove_batch(storage, token_contract, nonce)
}

/// Cancel every batch whose timeout is below the last observed Ethereum height
pub fn cancel_timed_out_batches(storage: &mut dyn Storage) -> StdResult<Vec<OutgoingBatch>> {
    let eth_height = LAST_OBSERVED_ETH_HEIGHT
        .may_load(storage)?
        .unwrap_or_default();
    let expired: Vec<OutgoingBatch> = OUTGOING_BATCHES
        .range(storage, None, None, Order::Ascending)
        .filter_map(|item| match item {
            Ok((_, batch)) if batch.batch_timeout < eth_height => Some(Ok(batch)),
            Ok(_) => None,
            Err(err) => Some(Err(err)),
        })
        .collect::<StdResult<_>>()?;

    for batch in &expired {
        cancel_batch(storage, &batch.token_contract, batch.batch_nonce)?;
    }
    Ok(expired)
}

/// Side effect of an observed `BatchSendToEthExecuted` claim.
///
/// Older batches of the same contract can no longer execute on Ethereum and go
/// back to the pool. The executed batch's escrow is burned for
/// Ethereum-originated tokens and moved to the locked balance for
/// Cosmos-originated ones.
pub fn on_batch_executed(
    storage: &mut dyn Storage,
    token_contract: &EthAddress,
    nonce: u64,
) -> Result<ClaimOutcome, ContractError> {
    let contract_key = token_contract.as_bytes().as_slice();
    let batch = match OUTGOING_BATCHES.may_load(storage, (contract_key, nonce))? {
        Some(batch) => batch,
        None => {
            return Ok(ClaimOutcome::Failed(format!(
                "batch {} nonce {} not found",
                token_contract, nonce
            )))
        }
    };

    let older: Vec<u64> = OUTGOING_BATCHES
        .prefix(contract_key)
        .keys(storage, None, Some(Bound::exclusive(nonce)), Order::Ascending)
        .collect::<StdResult<_>>()?;
    for older_nonce in older {
        cancel_batch(storage, token_contract, older_nonce)?;
    }
    remove_batch(storage, token_contract, nonce)?;

    let total: Uint128 = batch.transactions.iter().map(|tx| tx.total()).sum();
    let mapping = match ERC20_TO_ASSET.may_load(storage, contract_key)? {
        Some(mapping) => mapping,
        None => {
            return Ok(ClaimOutcome::Failed(format!(
                "token contract {} not registered",
                token_contract
            )))
        }
    };

    if mapping.cosmos_originated {
        let key = mapping.asset.key();
        let locked = LOCKED_BALANCES.may_load(storage, &key)?.unwrap_or_default();
        LOCKED_BALANCES.save(storage, &key, &(locked + total))?;
        return Ok(ClaimOutcome::Applied(vec![]));
    }

    match mapping.asset {
        AssetInfo::Cw20 { contract_addr } if !total.is_zero() => {
            Ok(ClaimOutcome::Applied(vec![CosmosMsg::Wasm(WasmMsg::Execute {
                contract_addr: contract_addr.to_string(),
                msg: to_json_binary(&Cw20ExecuteMsg::Burn { amount: total })?,
                funds: vec![],
            })]))
        }
        _ => Ok(ClaimOutcome::Applied(vec![])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Config, ConflictPolicy, TokenMapping};
    use cosmwasm_std::testing::{mock_dependencies, mock_env, MockStorage};
    use cosmwasm_std::Decimal;

    fn token() -> EthAddress {
        EthAddress::parse("0x0bc529c00c6401aef6d220be8c6ea1667f6ad93e").unwrap()
    }

    fn setup(storage: &mut dyn Storage) {
        CONFIG
            .save(
                storage,
                &Config {
                    admin: Addr::unchecked("terra1admin"),
                    paused: false,
                    gravity_id: "foo".to_string(),
                    valset_drift_threshold: Decimal::percent(5),
                    minimum_transfer: Uint128::new(1),
                    minimum_fee: Uint128::new(1),
                    max_batch_size: 100,
                    batch_timeout_blocks: 100,
                    conflict_policy: ConflictPolicy::Reject,
                    valset_reward: None,
                },
            )
            .unwrap();
        let asset = AssetInfo::Native {
            denom: "uatom".to_string(),
        };
        ASSET_TO_ERC20.save(storage, &asset.key(), &token()).unwrap();
        ERC20_TO_ASSET
            .save(
                storage,
                token().as_bytes(),
                &TokenMapping {
                    erc20: token(),
                    asset,
                    cosmos_originated: true,
                },
            )
            .unwrap();
    }

    fn enqueue(storage: &mut dyn Storage, amount: u128, fee: u128) -> OutgoingTransfer {
        enqueue_transfer(
            storage,
            Addr::unchecked("terra1sender"),
            AssetInfo::Native {
                denom: "uatom".to_string(),
            },
            Uint128::new(amount + fee),
            "0x320915bd0f1bad11cbf06e85d5199dbcac4e9934",
            Uint128::new(fee),
        )
        .unwrap()
    }

    fn ids(batch: &OutgoingBatch) -> Vec<u64> {
        batch.transactions.iter().map(|tx| tx.id).collect()
    }

    #[test]
    fn test_fee_priority_lower_id_wins_ties() {
        let mut storage = MockStorage::new();
        setup(&mut storage);
        for fee in [2, 3, 2, 1] {
            enqueue(&mut storage, 100, fee);
        }

        let batch = build_batch(&mut storage, &token(), 2, 10, 110).unwrap();
        assert_eq!(ids(&batch), vec![2, 1]);
        assert_eq!(batch.batch_nonce, 1);

        let pooled: Vec<u64> = UNBATCHED_TXS
            .keys(&storage, None, None, Order::Ascending)
            .collect::<StdResult<_>>()
            .unwrap();
        assert_eq!(pooled, vec![3, 4]);

        let next = build_batch(&mut storage, &token(), 10, 11, 111).unwrap();
        assert_eq!(ids(&next), vec![3, 4]);
        assert_eq!(next.batch_nonce, 2);

        let err = build_batch(&mut storage, &token(), 10, 12, 112).unwrap_err();
        assert!(matches!(err, ContractError::EmptyBatch { .. }));
    }

    #[test]
    fn test_enqueue_rejects() {
        let mut storage = MockStorage::new();
        setup(&mut storage);
        let sender = Addr::unchecked("terra1sender");
        let native = AssetInfo::Native {
            denom: "uatom".to_string(),
        };
        let dest = "0x320915bd0f1bad11cbf06e85d5199dbcac4e9934";

        let err = enqueue_transfer(
            &mut storage,
            sender.clone(),
            AssetInfo::Native {
                denom: "unknown".to_string(),
            },
            Uint128::new(10),
            dest,
            Uint128::new(1),
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::TokenNotSupported { .. }));

        let err = enqueue_transfer(
            &mut storage,
            sender.clone(),
            native.clone(),
            Uint128::new(10),
            dest,
            Uint128::zero(),
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::BelowMinimumFee { .. }));

        let err = enqueue_transfer(
            &mut storage,
            sender.clone(),
            native.clone(),
            Uint128::new(1),
            dest,
            Uint128::new(1),
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::InvalidAmount { .. }));

        let err = enqueue_transfer(&mut storage, sender, native, Uint128::new(10), "0x12", Uint128::new(1))
            .unwrap_err();
        assert!(matches!(err, ContractError::InvalidEthAddress { .. }));

        assert_eq!(LAST_TX_ID.may_load(&storage).unwrap(), None);
    }

    #[test]
    fn test_executed_batch_supersedes_older() {
        let mut storage = MockStorage::new();
        setup(&mut storage);
        enqueue(&mut storage, 100, 5);
        enqueue(&mut storage, 100, 4);

        let first = build_batch(&mut storage, &token(), 1, 10, 110).unwrap();
        let second = build_batch(&mut storage, &token(), 1, 11, 111).unwrap();
        assert_eq!(ids(&first), vec![1]);
        assert_eq!(ids(&second), vec![2]);

        let outcome = on_batch_executed(&mut storage, &token(), second.batch_nonce).unwrap();
        assert!(matches!(outcome, ClaimOutcome::Applied(msgs) if msgs.is_empty()));

        // both batches are gone, the older one's transfer is back in the pool
        let erc20 = token();
        let contract_key = erc20.as_bytes().as_slice();
        assert!(!OUTGOING_BATCHES.has(&storage, (contract_key, 1)));
        assert!(!OUTGOING_BATCHES.has(&storage, (contract_key, 2)));
        assert!(UNBATCHED_TXS.has(&storage, 1));
        assert!(!UNBATCHED_TXS.has(&storage, 2));

        // the executed batch's escrow now backs the ERC20
        assert_eq!(
            LOCKED_BALANCES.load(&storage, "uatom").unwrap(),
            Uint128::new(104)
        );

        let outcome = on_batch_executed(&mut storage, &erc20, 7).unwrap();
        assert!(matches!(outcome, ClaimOutcome::Failed(_)));
    }

    #[test]
    fn test_request_batch_waits_for_ethereum_height() {
        let mut deps = mock_dependencies();
        setup(&mut deps.storage);
        enqueue(&mut deps.storage, 100, 5);
        let erc20 = token();

        let err = execute_request_batch(deps.as_mut(), mock_env(), erc20.to_string(), None)
            .unwrap_err();
        assert_eq!(err, ContractError::NoObservedEthereumHeight);
        assert!(UNBATCHED_TXS.has(&deps.storage, 1));

        LAST_OBSERVED_ETH_HEIGHT.save(&mut deps.storage, &500).unwrap();
        execute_request_batch(deps.as_mut(), mock_env(), erc20.to_string(), None).unwrap();
        let batch = OUTGOING_BATCHES
            .load(&deps.storage, (erc20.as_bytes().as_slice(), 1))
            .unwrap();
        assert_eq!(batch.batch_timeout, 600);
    }

    #[test]
    fn test_batch_timeout_saturates() {
        let mut deps = mock_dependencies();
        setup(&mut deps.storage);
        let mut config = CONFIG.load(&deps.storage).unwrap();
        config.batch_timeout_blocks = u64::MAX;
        CONFIG.save(&mut deps.storage, &config).unwrap();
        LAST_OBSERVED_ETH_HEIGHT.save(&mut deps.storage, &500).unwrap();
        enqueue(&mut deps.storage, 100, 5);
        let erc20 = token();

        execute_request_batch(deps.as_mut(), mock_env(), erc20.to_string(), None).unwrap();
        let batch = OUTGOING_BATCHES
            .load(&deps.storage, (erc20.as_bytes().as_slice(), 1))
            .unwrap();
        assert_eq!(batch.batch_timeout, u64::MAX);
    }

    #[test]
    fn test_timed_out_batches_return_to_pool() {
        let mut storage = MockStorage::new();
        setup(&mut storage);
        enqueue(&mut storage, 100, 5);
        build_batch(&mut storage, &token(), 10, 10, 110).unwrap();

        LAST_OBSERVED_ETH_HEIGHT.save(&mut storage, &110).unwrap();
        assert!(cancel_timed_out_batches(&mut storage).unwrap().is_empty());

        LAST_OBSERVED_ETH_HEIGHT.save(&mut storage, &111).unwrap();
        let expired = cancel_timed_out_batches(&mut storage).unwrap();
        assert_eq!(expired.len(), 1);
        assert!(UNBATCHED_TXS.has(&storage, 1));

        // the next batch for the contract still gets a fresh nonce
        let batch = build_batch(&mut storage, &token(), 10, 12, 300).unwrap();
        assert_eq!(batch.batch_nonce, 2);
        assert_eq!(ids(&batch), vec![1]);
    }
}
