//! # In-Memory Keeper
//!
//! Reference execution backend. Owns code and contract storage, account
//! balances for transferred funds, and the id sequences. A production
//! backend would persist the same records in the state store.

use crate::config::ComputeConfig;
use crate::domain::context::Context;
use crate::domain::events::{
    attribute_keys, Event, EVENT_TYPE_EXECUTE, EVENT_TYPE_INSTANTIATE, EVENT_TYPE_STORE_CODE,
    EVENT_TYPE_WASM,
};
use crate::domain::outcome::{ContractResult, InstantiateResult, Outcome};
use crate::domain::value_objects::{AccAddress, Binary, CodeHash, CodeId, Coins, U256};
use crate::errors::KeeperError;
use crate::ports::outbound::{
    ContractEngine, EngineResponse, Env, Keeper, MessageInfo, Transactional,
};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// WASM binary magic and version 1.
const WASM_HEADER: [u8; 8] = [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];

/// Domain separator for contract address derivation.
const CONTRACT_ADDRESS_DOMAIN: &[u8] = b"compute/contract";

/// A stored bytecode artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeInfo {
    /// Raw bytecode.
    pub code: Binary,
    /// SHA-256 of the bytecode.
    pub code_hash: CodeHash,
    /// Uploader.
    pub creator: AccAddress,
    /// Source URL.
    pub source: String,
    /// Builder tag.
    pub builder: String,
}

/// An instantiated contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractInfo {
    /// Code the contract runs.
    pub code_id: CodeId,
    /// Instantiator.
    pub creator: AccAddress,
    /// Unique label.
    pub label: String,
    /// Block height of instantiation.
    pub created_at: u64,
}

/// Everything the keeper persists. Cloned for snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeeperState {
    last_code_id: u64,
    last_instance_id: u64,
    codes: BTreeMap<CodeId, CodeInfo>,
    contracts: BTreeMap<AccAddress, ContractInfo>,
    labels: BTreeMap<String, AccAddress>,
    balances: BTreeMap<(AccAddress, String), U256>,
}

/// Keeper backed by in-memory ordered maps.
#[derive(Debug)]
pub struct InMemoryKeeper<E> {
    state: KeeperState,
    engine: E,
    max_wasm_size: usize,
}

impl<E: ContractEngine> InMemoryKeeper<E> {
    /// Create an empty keeper with default limits.
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, &ComputeConfig::default())
    }

    /// Create an empty keeper with the given limits.
    pub fn with_config(engine: E, config: &ComputeConfig) -> Self {
        Self {
            state: KeeperState::default(),
            engine,
            max_wasm_size: config.max_wasm_size,
        }
    }

    /// Credit an account (genesis / test funding).
    pub fn set_balance(&mut self, owner: &AccAddress, denom: &str, amount: U256) {
        self.state
            .balances
            .insert((owner.clone(), denom.to_string()), amount);
    }

    /// Balance of `owner` in `denom`.
    #[must_use]
    pub fn balance(&self, owner: &AccAddress, denom: &str) -> U256 {
        self.state
            .balances
            .get(&(owner.clone(), denom.to_string()))
            .copied()
            .unwrap_or_else(U256::zero)
    }

    /// Stored code, if any.
    #[must_use]
    pub fn code_info(&self, code_id: CodeId) -> Option<&CodeInfo> {
        self.state.codes.get(&code_id)
    }

    /// Instantiated contract, if any.
    #[must_use]
    pub fn contract_info(&self, address: &AccAddress) -> Option<&ContractInfo> {
        self.state.contracts.get(address)
    }

    /// Contract registered under `label`, if any.
    #[must_use]
    pub fn contract_by_label(&self, label: &str) -> Option<&AccAddress> {
        self.state.labels.get(label)
    }

    /// Number of stored code artifacts.
    #[must_use]
    pub fn code_count(&self) -> usize {
        self.state.codes.len()
    }

    /// Number of instantiated contracts.
    #[must_use]
    pub fn contract_count(&self) -> usize {
        self.state.contracts.len()
    }

    /// Rejects funds the owner cannot cover, summing repeated denoms.
    fn check_funds(&self, owner: &AccAddress, funds: &Coins) -> Result<(), KeeperError> {
        let mut totals: BTreeMap<&str, U256> = BTreeMap::new();
        for coin in funds.iter() {
            let total = totals.entry(coin.denom.as_str()).or_insert_with(U256::zero);
            *total = total
                .checked_add(coin.amount)
                .ok_or_else(|| KeeperError::Funds(format!("amount overflow for {}", coin.denom)))?;
        }
        for (denom, required) in totals {
            let available = self.balance(owner, denom);
            if available < required {
                return Err(KeeperError::Funds(format!(
                    "{available}{denom} is smaller than {required}{denom}"
                )));
            }
        }
        Ok(())
    }

    /// Moves funds. Balances are only written once every coin has been
    /// debited and credited successfully.
    fn transfer(
        &mut self,
        from: &AccAddress,
        to: &AccAddress,
        funds: &Coins,
    ) -> Result<(), KeeperError> {
        if from == to || funds.is_empty() {
            return Ok(());
        }

        let mut updates: BTreeMap<(AccAddress, String), U256> = BTreeMap::new();
        for coin in funds.iter() {
            let from_key = (from.clone(), coin.denom.clone());
            let from_balance = updates
                .get(&from_key)
                .copied()
                .unwrap_or_else(|| self.balance(from, &coin.denom));
            let debited = from_balance.checked_sub(coin.amount).ok_or_else(|| {
                KeeperError::Funds(format!("{from_balance}{} is smaller than {coin}", coin.denom))
            })?;
            updates.insert(from_key, debited);

            let to_key = (to.clone(), coin.denom.clone());
            let to_balance = updates
                .get(&to_key)
                .copied()
                .unwrap_or_else(|| self.balance(to, &coin.denom));
            let credited = to_balance.checked_add(coin.amount).ok_or_else(|| {
                KeeperError::Funds(format!("balance overflow for {to} in {}", coin.denom))
            })?;
            updates.insert(to_key, credited);
        }

        self.state.balances.extend(updates);
        Ok(())
    }
}

/// `sha256("compute/contract" || code_id_be || instance_id_be)[..20]`
#[must_use]
pub fn derive_contract_address(code_id: CodeId, instance_id: u64) -> AccAddress {
    let mut hasher = Sha256::new();
    hasher.update(CONTRACT_ADDRESS_DOMAIN);
    hasher.update(code_id.to_be_bytes());
    hasher.update(instance_id.to_be_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; AccAddress::LEN];
    bytes.copy_from_slice(&digest[..AccAddress::LEN]);
    AccAddress::new(bytes)
}

fn is_wasm(code: &[u8]) -> bool {
    code.len() >= WASM_HEADER.len() && code[..WASM_HEADER.len()] == WASM_HEADER
}

fn contract_events(
    ty: &str,
    contract: &AccAddress,
    code_id: Option<CodeId>,
    response: &EngineResponse,
) -> Vec<Event> {
    let mut action = Event::new(ty);
    if let Some(code_id) = code_id {
        action = action.add_attribute(attribute_keys::CODE_ID, code_id.to_string());
    }
    action = action.add_attribute(attribute_keys::CONTRACT_ADDRESS, contract.to_string());

    let mut events = vec![action];
    if !response.attributes.is_empty() {
        let wasm = response.attributes.iter().fold(
            Event::new(EVENT_TYPE_WASM)
                .add_attribute(attribute_keys::CONTRACT_ADDRESS, contract.to_string()),
            |event, (key, value)| event.add_attribute(key.as_str(), value.as_str()),
        );
        events.push(wasm);
    }
    events
}

impl<E: ContractEngine> Keeper for InMemoryKeeper<E> {
    fn create_code(
        &mut self,
        ctx: &mut Context,
        creator: &AccAddress,
        wasm_code: &[u8],
        source: &str,
        builder: &str,
    ) -> Outcome<CodeId> {
        if wasm_code.len() > self.max_wasm_size {
            return Outcome::failed(
                CodeId::NONE,
                KeeperError::Validation(format!(
                    "code size {} exceeds {}",
                    wasm_code.len(),
                    self.max_wasm_size
                )),
            );
        }
        if !is_wasm(wasm_code) {
            return Outcome::failed(
                CodeId::NONE,
                KeeperError::Validation("bytecode is not a wasm v1 module".to_string()),
            );
        }
        let Some(next) = self.state.last_code_id.checked_add(1) else {
            return Outcome::failed(
                CodeId::NONE,
                KeeperError::Storage("code id sequence exhausted".to_string()),
            );
        };

        let code_id = CodeId::new(next);
        let info = CodeInfo {
            code: Binary::from_slice(wasm_code),
            code_hash: CodeHash::of(wasm_code),
            creator: creator.clone(),
            source: source.to_string(),
            builder: builder.to_string(),
        };
        info!(%code_id, code_hash = %info.code_hash, size = wasm_code.len(), "code stored");

        self.state.last_code_id = next;
        self.state.codes.insert(code_id, info);
        ctx.emit_event(
            Event::new(EVENT_TYPE_STORE_CODE)
                .add_attribute(attribute_keys::CODE_ID, code_id.to_string()),
        );

        Outcome::ok(code_id)
    }

    fn instantiate(
        &mut self,
        ctx: &mut Context,
        code_id: CodeId,
        creator: &AccAddress,
        init_msg: &[u8],
        label: &str,
        funds: &Coins,
        callback_sig: Option<&[u8]>,
    ) -> Outcome<InstantiateResult> {
        let Some(code) = self.state.codes.get(&code_id) else {
            return Outcome::empty_failure(KeeperError::CodeNotFound(code_id));
        };
        if self.state.labels.contains_key(label) {
            return Outcome::empty_failure(KeeperError::Validation(format!(
                "label already exists: {label}"
            )));
        }
        if let Err(err) = self.check_funds(creator, funds) {
            return Outcome::empty_failure(err);
        }
        let Some(instance_id) = self.state.last_instance_id.checked_add(1) else {
            return Outcome::empty_failure(KeeperError::Storage(
                "contract instance sequence exhausted".to_string(),
            ));
        };

        let address = derive_contract_address(code_id, instance_id);
        let env = Env {
            block: ctx.block().clone(),
            contract: address.clone(),
            code_id,
        };
        let info = MessageInfo {
            sender: creator.clone(),
            funds: funds.clone(),
            callback_sig: callback_sig.map(Binary::from_slice),
        };

        let response = match self.engine.instantiate(code.code.as_slice(), &env, &info, init_msg) {
            Ok(response) => response,
            Err(failure) => {
                debug!(%code_id, error = %failure.error, "contract init failed");
                return Outcome::failed(
                    InstantiateResult {
                        address: None,
                        data: failure.data,
                    },
                    KeeperError::Execution(failure.error),
                );
            }
        };

        if let Err(err) = self.transfer(creator, &address, funds) {
            return Outcome::empty_failure(err);
        }
        self.state.last_instance_id = instance_id;
        self.state.contracts.insert(
            address.clone(),
            ContractInfo {
                code_id,
                creator: creator.clone(),
                label: label.to_string(),
                created_at: ctx.block().height,
            },
        );
        self.state.labels.insert(label.to_string(), address.clone());

        for event in contract_events(EVENT_TYPE_INSTANTIATE, &address, Some(code_id), &response) {
            ctx.emit_event(event);
        }

        Outcome::ok(InstantiateResult {
            address: Some(address),
            data: response.data,
        })
    }

    fn execute(
        &mut self,
        ctx: &mut Context,
        contract: &AccAddress,
        caller: &AccAddress,
        msg: &[u8],
        funds: &Coins,
        callback_sig: Option<&[u8]>,
    ) -> Outcome<ContractResult> {
        let Some(contract_info) = self.state.contracts.get(contract) else {
            return Outcome::empty_failure(KeeperError::ContractNotFound(contract.clone()));
        };
        let code_id = contract_info.code_id;
        let Some(code) = self.state.codes.get(&code_id) else {
            return Outcome::empty_failure(KeeperError::Storage(format!(
                "code {code_id} missing for contract {contract}"
            )));
        };
        if let Err(err) = self.check_funds(caller, funds) {
            return Outcome::empty_failure(err);
        }

        let env = Env {
            block: ctx.block().clone(),
            contract: contract.clone(),
            code_id,
        };
        let info = MessageInfo {
            sender: caller.clone(),
            funds: funds.clone(),
            callback_sig: callback_sig.map(Binary::from_slice),
        };

        let response = match self.engine.execute(code.code.as_slice(), &env, &info, msg) {
            Ok(response) => response,
            Err(failure) => {
                debug!(%contract, error = %failure.error, "contract call failed");
                return Outcome::failed(
                    ContractResult { data: failure.data },
                    KeeperError::Execution(failure.error),
                );
            }
        };

        if let Err(err) = self.transfer(caller, contract, funds) {
            return Outcome::empty_failure(err);
        }
        for event in contract_events(EVENT_TYPE_EXECUTE, contract, None, &response) {
            ctx.emit_event(event);
        }

        Outcome::ok(ContractResult {
            data: response.data,
        })
    }
}

impl<E> Transactional for InMemoryKeeper<E> {
    type Snapshot = KeeperState;

    fn snapshot(&self) -> KeeperState {
        self.state.clone()
    }

    fn revert(&mut self, snapshot: KeeperState) {
        self.state = snapshot;
    }
}

// =============================================================================
// TESTS
// =============================================================================
