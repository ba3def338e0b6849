//! Gravity Contract Integration Tests.
//!
//! Covers the contract surface outside the bridge flows:
//! - Instantiation defaults and validation
//! - Validator directory (delegate keys, static validators, power feed)
//! - Configuration, minimum fee and token registry
//! - Pause and the timelocked admin transfer

use cosmwasm_std::{Addr, Decimal, Empty, Uint128};
use cw_multi_test::{App, ContractWrapper, Executor};

use gravity::msg::{
    ConfigResponse, DelegateKeysResponse, ExecuteMsg, InstantiateMsg, PendingAdminResponse,
    QueryMsg, StaticValidatorsResponse, TokenMappingResponse, ValidatorPower,
    ValidatorPowersResponse,
};
use gravity::state::ConflictPolicy;
use gravity::EthAddress;

// ============================================================================
// Test Setup
// ============================================================================

const ETH_ONE: &str = "0x1111111111111111111111111111111111111111";
const ETH_TWO: &str = "0x2222222222222222222222222222222222222222";

fn contract_gravity() -> Box<dyn cw_multi_test::Contract<Empty>> {
    let contract = ContractWrapper::new(
        gravity::contract::execute,
        gravity::contract::instantiate,
        gravity::contract::query,
    );
    Box::new(contract)
}

fn default_instantiate_msg(admin: &Addr) -> InstantiateMsg {
    InstantiateMsg {
        admin: admin.to_string(),
        gravity_id: "gravity-test".to_string(),
        static_validators: vec!["terra1valone".to_string(), "terra1valtwo".to_string()],
        validator_powers: vec![ValidatorPower {
            validator: "terra1valone".to_string(),
            power: 100,
        }],
        valset_drift_threshold: None,
        minimum_transfer: None,
        minimum_fee: None,
        max_batch_size: None,
        batch_timeout_blocks: None,
        conflict_policy: None,
        valset_reward: None,
    }
}

fn setup() -> (App, Addr, Addr) {
    let mut app = App::default();
    let admin = Addr::unchecked("terra1admin");

    let code_id = app.store_code(contract_gravity());
    let contract_addr = app
        .instantiate_contract(
            code_id,
            admin.clone(),
            &default_instantiate_msg(&admin),
            &[],
            "gravity",
            Some(admin.to_string()),
        )
        .unwrap();

    (app, contract_addr, admin)
}

fn query_config(app: &App, contract_addr: &Addr) -> ConfigResponse {
    app.wrap()
        .query_wasm_smart(contract_addr, &QueryMsg::Config {})
        .unwrap()
}

fn bind(
    app: &mut App,
    contract_addr: &Addr,
    validator: &str,
    orchestrator: &str,
    eth_address: &str,
) -> Result<(), String> {
    app.execute_contract(
        Addr::unchecked(validator),
        contract_addr.clone(),
        &ExecuteMsg::SetOrchestratorAddress {
            orchestrator: orchestrator.to_string(),
            eth_address: eth_address.to_string(),
        },
        &[],
    )
    .map(|_| ())
    .map_err(|err| err.root_cause().to_string())
}

// ============================================================================
// Instantiation
// ============================================================================

#[test]
fn test_instantiate_defaults() {
    let (app, contract_addr, admin) = setup();
    let config = query_config(&app, &contract_addr);

    assert_eq!(config.admin, admin);
    assert!(!config.paused);
    assert_eq!(config.gravity_id, "gravity-test");
    assert_eq!(config.valset_drift_threshold, Decimal::percent(5));
    assert_eq!(config.minimum_transfer, Uint128::zero());
    assert_eq!(config.minimum_fee, Uint128::zero());
    assert_eq!(config.max_batch_size, 100);
    assert_eq!(config.batch_timeout_blocks, 3600);
    assert_eq!(config.conflict_policy, ConflictPolicy::Reject);
    assert_eq!(config.valset_reward, None);

    let powers: ValidatorPowersResponse = app
        .wrap()
        .query_wasm_smart(&contract_addr, &QueryMsg::ValidatorPowers {})
        .unwrap();
    assert_eq!(powers.total_power, 100);
    assert_eq!(
        powers.powers,
        vec![(Addr::unchecked("terra1valone"), 100)]
    );
}

#[test]
fn test_instantiate_rejects_bad_gravity_id() {
    let mut app = App::default();
    let admin = Addr::unchecked("terra1admin");
    let code_id = app.store_code(contract_gravity());

    for gravity_id in ["".to_string(), "x".repeat(33)] {
        let mut msg = default_instantiate_msg(&admin);
        msg.gravity_id = gravity_id;
        let res = app.instantiate_contract(code_id, admin.clone(), &msg, &[], "gravity", None);
        assert!(res.is_err());
    }
}

#[test]
fn test_instantiate_rejects_bad_drift_threshold() {
    let mut app = App::default();
    let admin = Addr::unchecked("terra1admin");
    let code_id = app.store_code(contract_gravity());

    let mut msg = default_instantiate_msg(&admin);
    msg.valset_drift_threshold = Some(Decimal::zero());
    let res = app.instantiate_contract(code_id, admin.clone(), &msg, &[], "gravity", None);
    let err_str = res.unwrap_err().root_cause().to_string();
    assert!(err_str.contains("Invalid config"), "got: {}", err_str);
}

// ============================================================================
// Validator Directory
// ============================================================================

#[test]
fn test_set_orchestrator_address() {
    let (mut app, contract_addr, _admin) = setup();

    bind(&mut app, &contract_addr, "terra1valone", "terra1orchone", ETH_ONE).unwrap();

    let expected = DelegateKeysResponse {
        validator: Addr::unchecked("terra1valone"),
        orchestrator: Addr::unchecked("terra1orchone"),
        eth_address: EthAddress::parse(ETH_ONE).unwrap(),
    };
    let by_validator: DelegateKeysResponse = app
        .wrap()
        .query_wasm_smart(
            &contract_addr,
            &QueryMsg::DelegateKeysByValidator {
                validator: "terra1valone".to_string(),
            },
        )
        .unwrap();
    let by_orchestrator: DelegateKeysResponse = app
        .wrap()
        .query_wasm_smart(
            &contract_addr,
            &QueryMsg::DelegateKeysByOrchestrator {
                orchestrator: "terra1orchone".to_string(),
            },
        )
        .unwrap();
    // unprefixed input resolves to the same binding
    let by_eth: DelegateKeysResponse = app
        .wrap()
        .query_wasm_smart(
            &contract_addr,
            &QueryMsg::DelegateKeysByEthAddress {
                eth_address: ETH_ONE.trim_start_matches("0x").to_string(),
            },
        )
        .unwrap();
    assert_eq!(by_validator, expected);
    assert_eq!(by_orchestrator, expected);
    assert_eq!(by_eth, expected);
}

#[test]
fn test_rebinding_rejected() {
    let (mut app, contract_addr, admin) = setup();
    app.execute_contract(
        admin.clone(),
        contract_addr.clone(),
        &ExecuteMsg::UpdateValidatorPowers {
            powers: vec![ValidatorPower {
                validator: "terra1valtwo".to_string(),
                power: 50,
            }],
        },
        &[],
    )
    .unwrap();

    bind(&mut app, &contract_addr, "terra1valone", "terra1orchone", ETH_ONE).unwrap();

    let err = bind(&mut app, &contract_addr, "terra1valone", "terra1orchnew", ETH_TWO).unwrap_err();
    assert!(err.contains("Ethereum address already set"), "got: {}", err);

    let err = bind(&mut app, &contract_addr, "terra1valtwo", "terra1orchone", ETH_TWO).unwrap_err();
    assert!(err.contains("Orchestrator"), "got: {}", err);

    let err = bind(&mut app, &contract_addr, "terra1valtwo", "terra1orchtwo", ETH_ONE).unwrap_err();
    assert!(err.contains("already bound to a validator"), "got: {}", err);

    // nothing partial was written by the failed attempts
    let res: Result<DelegateKeysResponse, _> = app.wrap().query_wasm_smart(
        &contract_addr,
        &QueryMsg::DelegateKeysByValidator {
            validator: "terra1valtwo".to_string(),
        },
    );
    assert!(res.is_err());

    bind(&mut app, &contract_addr, "terra1valtwo", "terra1orchtwo", ETH_TWO).unwrap();
}

#[test]
fn test_binding_requires_static_bonded_validator() {
    let (mut app, contract_addr, admin) = setup();

    let err = bind(&mut app, &contract_addr, "terra1outsider", "terra1orchx", ETH_ONE).unwrap_err();
    assert!(err.contains("not a static validator"), "got: {}", err);

    // static but without power
    let err = bind(&mut app, &contract_addr, "terra1valtwo", "terra1orchtwo", ETH_TWO).unwrap_err();
    assert!(err.contains("no bonded power"), "got: {}", err);

    app.execute_contract(
        admin.clone(),
        contract_addr.clone(),
        &ExecuteMsg::AddStaticValidator {
            address: "terra1outsider".to_string(),
        },
        &[],
    )
    .unwrap();
    app.execute_contract(
        admin.clone(),
        contract_addr.clone(),
        &ExecuteMsg::UpdateValidatorPowers {
            powers: vec![ValidatorPower {
                validator: "terra1outsider".to_string(),
                power: 10,
            }],
        },
        &[],
    )
    .unwrap();
    bind(&mut app, &contract_addr, "terra1outsider", "terra1orchx", ETH_ONE).unwrap();

    let statics: StaticValidatorsResponse = app
        .wrap()
        .query_wasm_smart(&contract_addr, &QueryMsg::StaticValidators {})
        .unwrap();
    assert_eq!(statics.validators.len(), 3);

    let is_static: bool = app
        .wrap()
        .query_wasm_smart(
            &contract_addr,
            &QueryMsg::IsStaticValidator {
                address: "terra1outsider".to_string(),
            },
        )
        .unwrap();
    assert!(is_static);
}

#[test]
fn test_directory_updates_admin_only() {
    let (mut app, contract_addr, _admin) = setup();
    let outsider = Addr::unchecked("terra1outsider");

    let res = app.execute_contract(
        outsider.clone(),
        contract_addr.clone(),
        &ExecuteMsg::AddStaticValidator {
            address: outsider.to_string(),
        },
        &[],
    );
    assert!(res.unwrap_err().root_cause().to_string().contains("Unauthorized"));

    let res = app.execute_contract(
        outsider.clone(),
        contract_addr.clone(),
        &ExecuteMsg::UpdateValidatorPowers {
            powers: vec![ValidatorPower {
                validator: outsider.to_string(),
                power: 1_000,
            }],
        },
        &[],
    );
    assert!(res.unwrap_err().root_cause().to_string().contains("Unauthorized"));
}

#[test]
fn test_zero_power_removes_validator() {
    let (mut app, contract_addr, admin) = setup();

    app.execute_contract(
        admin.clone(),
        contract_addr.clone(),
        &ExecuteMsg::UpdateValidatorPowers {
            powers: vec![
                ValidatorPower {
                    validator: "terra1valone".to_string(),
                    power: 0,
                },
                ValidatorPower {
                    validator: "terra1valtwo".to_string(),
                    power: 7,
                },
            ],
        },
        &[],
    )
    .unwrap();

    let powers: ValidatorPowersResponse = app
        .wrap()
        .query_wasm_smart(&contract_addr, &QueryMsg::ValidatorPowers {})
        .unwrap();
    assert_eq!(powers.total_power, 7);
    assert_eq!(powers.powers, vec![(Addr::unchecked("terra1valtwo"), 7)]);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_update_config() {
    let (mut app, contract_addr, admin) = setup();

    let res = app.execute_contract(
        Addr::unchecked("terra1outsider"),
        contract_addr.clone(),
        &ExecuteMsg::UpdateConfig {
            valset_drift_threshold: None,
            minimum_transfer: Some(Uint128::new(10)),
            max_batch_size: None,
            batch_timeout_blocks: None,
            conflict_policy: None,
            valset_reward: None,
        },
        &[],
    );
    assert!(res.unwrap_err().root_cause().to_string().contains("Unauthorized"));

    let res = app.execute_contract(
        admin.clone(),
        contract_addr.clone(),
        &ExecuteMsg::UpdateConfig {
            valset_drift_threshold: None,
            minimum_transfer: None,
            max_batch_size: Some(0),
            batch_timeout_blocks: None,
            conflict_policy: None,
            valset_reward: None,
        },
        &[],
    );
    assert!(res.unwrap_err().root_cause().to_string().contains("Invalid config"));

    app.execute_contract(
        admin.clone(),
        contract_addr.clone(),
        &ExecuteMsg::UpdateConfig {
            valset_drift_threshold: Some(Decimal::percent(10)),
            minimum_transfer: Some(Uint128::new(10)),
            max_batch_size: Some(25),
            batch_timeout_blocks: Some(600),
            conflict_policy: Some(ConflictPolicy::TrackConcurrent),
            valset_reward: None,
        },
        &[],
    )
    .unwrap();

    let config = query_config(&app, &contract_addr);
    assert_eq!(config.valset_drift_threshold, Decimal::percent(10));
    assert_eq!(config.minimum_transfer, Uint128::new(10));
    assert_eq!(config.max_batch_size, 25);
    assert_eq!(config.batch_timeout_blocks, 600);
    assert_eq!(config.conflict_policy, ConflictPolicy::TrackConcurrent);
}

#[test]
fn test_set_minimum_fee_static_validators_only() {
    let (mut app, contract_addr, admin) = setup();

    // the admin is not a static validator
    let res = app.execute_contract(
        admin.clone(),
        contract_addr.clone(),
        &ExecuteMsg::SetMinimumFee {
            fee: Uint128::new(3),
        },
        &[],
    );
    let err_str = res.unwrap_err().root_cause().to_string();
    assert!(err_str.contains("not a static validator"), "got: {}", err_str);

    let validator = Addr::unchecked("terra1valtwo");
    app.execute_contract(
        validator.clone(),
        contract_addr.clone(),
        &ExecuteMsg::SetMinimumFee {
            fee: Uint128::new(3),
        },
        &[],
    )
    .unwrap();
    assert_eq!(
        query_config(&app, &contract_addr).minimum_fee,
        Uint128::new(3)
    );

    let res = app.execute_contract(
        validator,
        contract_addr.clone(),
        &ExecuteMsg::SetMinimumFee {
            fee: Uint128::new(3),
        },
        &[],
    );
    let err_str = res.unwrap_err().root_cause().to_string();
    assert!(err_str.contains("already 3"), "got: {}", err_str);
}

#[test]
fn test_register_ethereum_token() {
    let (mut app, contract_addr, admin) = setup();
    let erc20 = "0x0bc529c00c6401aef6d220be8c6ea1667f6ad93e";

    app.execute_contract(
        admin.clone(),
        contract_addr.clone(),
        &ExecuteMsg::RegisterEthereumToken {
            token_contract: erc20.to_string(),
            cw20: "terra1wrappedtoken".to_string(),
        },
        &[],
    )
    .unwrap();

    let mapping: Option<TokenMappingResponse> = app
        .wrap()
        .query_wasm_smart(
            &contract_addr,
            &QueryMsg::Erc20ToDenom {
                erc20: erc20.to_string(),
            },
        )
        .unwrap();
    assert_eq!(
        mapping,
        Some(TokenMappingResponse {
            erc20: EthAddress::parse(erc20).unwrap(),
            asset: "terra1wrappedtoken".to_string(),
            cosmos_originated: false,
        })
    );

    let res = app.execute_contract(
        admin.clone(),
        contract_addr.clone(),
        &ExecuteMsg::RegisterEthereumToken {
            token_contract: erc20.to_string(),
            cw20: "terra1othertoken".to_string(),
        },
        &[],
    );
    let err_str = res.unwrap_err().root_cause().to_string();
    assert!(err_str.contains("already registered"), "got: {}", err_str);
}

// ============================================================================
// Admin Operations
// ============================================================================

#[test]
fn test_pause_admin_only() {
    let (mut app, contract_addr, admin) = setup();

    let res = app.execute_contract(
        Addr::unchecked("terra1outsider"),
        contract_addr.clone(),
        &ExecuteMsg::Pause {},
        &[],
    );
    assert!(res.unwrap_err().root_cause().to_string().contains("Unauthorized"));

    app.execute_contract(admin.clone(), contract_addr.clone(), &ExecuteMsg::Pause {}, &[])
        .unwrap();
    assert!(query_config(&app, &contract_addr).paused);

    app.execute_contract(admin, contract_addr.clone(), &ExecuteMsg::Unpause {}, &[])
        .unwrap();
    assert!(!query_config(&app, &contract_addr).paused);
}

#[test]
fn test_admin_transfer_timelock() {
    let (mut app, contract_addr, admin) = setup();
    let new_admin = Addr::unchecked("terra1newadmin");

    app.execute_contract(
        admin.clone(),
        contract_addr.clone(),
        &ExecuteMsg::ProposeAdmin {
            new_admin: new_admin.to_string(),
        },
        &[],
    )
    .unwrap();

    let pending: Option<PendingAdminResponse> = app
        .wrap()
        .query_wasm_smart(&contract_addr, &QueryMsg::PendingAdmin {})
        .unwrap();
    assert_eq!(pending.unwrap().new_address, new_admin);

    let res = app.execute_contract(
        new_admin.clone(),
        contract_addr.clone(),
        &ExecuteMsg::AcceptAdmin {},
        &[],
    );
    let err_str = res.unwrap_err().root_cause().to_string();
    assert!(err_str.contains("Timelock not expired"), "got: {}", err_str);

    app.update_block(|block| {
        block.time = block.time.plus_seconds(604_800);
    });

    let res = app.execute_contract(
        Addr::unchecked("terra1outsider"),
        contract_addr.clone(),
        &ExecuteMsg::AcceptAdmin {},
        &[],
    );
    let err_str = res.unwrap_err().root_cause().to_string();
    assert!(err_str.contains("only pending admin"), "got: {}", err_str);

    app.execute_contract(
        new_admin.clone(),
        contract_addr.clone(),
        &ExecuteMsg::AcceptAdmin {},
        &[],
    )
    .unwrap();
    assert_eq!(query_config(&app, &contract_addr).admin, new_admin);

    let pending: Option<PendingAdminResponse> = app
        .wrap()
        .query_wasm_smart(&contract_addr, &QueryMsg::PendingAdmin {})
        .unwrap();
    assert!(pending.is_none());
}

#[test]
fn test_cancel_admin_proposal() {
    let (mut app, contract_addr, admin) = setup();

    app.execute_contract(
        admin.clone(),
        contract_addr.clone(),
        &ExecuteMsg::ProposeAdmin {
            new_admin: "terra1newadmin".to_string(),
        },
        &[],
    )
    .unwrap();
    app.execute_contract(
        admin.clone(),
        contract_addr.clone(),
        &ExecuteMsg::CancelAdminProposal {},
        &[],
    )
    .unwrap();

    let res = app.execute_contract(
        Addr::unchecked("terra1newadmin"),
        contract_addr.clone(),
        &ExecuteMsg::AcceptAdmin {},
        &[],
    );
    let err_str = res.unwrap_err().root_cause().to_string();
    assert!(err_str.contains("No pending admin"), "got: {}", err_str);
}
