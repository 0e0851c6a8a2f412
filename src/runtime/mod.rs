//! Contract runtime adapter.
//!
//! The interpreter itself is a collaborator behind [`ContractRuntime`]:
//! the engine hands it the contract body, the in-flight account overlay,
//! and the execution budget, and folds the returned `(new_states,
//! new_storage)` pair back into the block's working state. Implementations
//! must be deterministic, must not write to the stores they are given, and
//! must stop cleanly once their cumulative cost exceeds the budget.

use crate::core::account::Account;
use crate::core::block::Block;
use crate::core::transaction::Transaction;
use crate::storage::kv::{KeyValueStore, StoreError};
use crate::storage::state_db::StateDb;
use crate::types::address::Address;
use crate::utils::log::Logger;
use async_trait::async_trait;
use num_bigint::BigUint;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors surfaced by a contract runtime.
///
/// Store faults are fatal and abort the whole block; execution failures
/// reject the block without touching the stores.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("contract execution failed: {0}")]
    Execution(String),
}

/// The invoked contract's identity and pre-invocation account view.
#[derive(Clone, Debug)]
pub struct ContractInfo {
    pub address: Address,
    pub account: Account,
}

/// Everything a runtime may observe for one invocation.
pub struct RuntimeInvocation<'a, K: KeyValueStore> {
    /// Source text of the invoked contract.
    pub code: &'a str,
    /// The block's working account overlay, read-only.
    pub states: &'a BTreeMap<Address, Account>,
    /// Execution budget (the transaction's `contractGas`).
    pub gas_budget: BigUint,
    /// Committed pre-block state, read-only.
    pub state_db: &'a StateDb<K>,
    /// The block being applied.
    pub block: &'a Block,
    /// The transaction triggering this invocation.
    pub tx: &'a Transaction,
    /// The invoked contract.
    pub contract: ContractInfo,
    pub logger: &'a Logger,
}

/// Result of one contract invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeOutcome {
    /// Updated accounts, at minimum the entries the contract modified.
    /// Merged into the block overlay, overriding existing entries.
    pub states: BTreeMap<Address, Account>,
    /// The contract's full post-invocation storage map; replaces the
    /// previous storage view wholesale.
    pub storage: BTreeMap<String, String>,
}

/// Deterministic contract interpreter facade.
#[async_trait]
pub trait ContractRuntime: Send + Sync {
    async fn run<K: KeyValueStore>(
        &self,
        call: RuntimeInvocation<'_, K>,
    ) -> Result<RuntimeOutcome, RuntimeError>;
}

/// Runtime that executes nothing.
///
/// Every invocation returns empty maps, so contract calls degrade to plain
/// value transfers. Suitable for validators that do not execute contract
/// code and as a base for test doubles.
pub struct NullRuntime;

#[async_trait]
impl ContractRuntime for NullRuntime {
    async fn run<K: KeyValueStore>(
        &self,
        _call: RuntimeInvocation<'_, K>,
    ) -> Result<RuntimeOutcome, RuntimeError> {
        Ok(RuntimeOutcome::default())
    }
}
