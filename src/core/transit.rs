//! The state-transition engine.
//!
//! [`TransitionEngine::verify_and_transit`] decides whether a candidate
//! block is admissible against the committed stores and, if so, applies
//! it. The run is all-or-nothing: every mutation is staged in working maps
//! and flushed only after the whole block has replayed cleanly, so a
//! rejected block leaves the stores untouched. Store faults are fatal and
//! propagate as errors; invalid blocks are ordinary `false` returns with
//! the cause logged.

use crate::config::ChainConfig;
use crate::core::account::Account;
use crate::core::block::Block;
use crate::runtime::{ContractInfo, ContractRuntime, RuntimeError, RuntimeInvocation};
use crate::storage::account_store::AccountStoreProvider;
use crate::storage::kv::{KeyValueStore, StoreError};
use crate::storage::state_db::{CodeDb, StateDb};
use crate::types::address::Address;
use crate::types::hash::{sha256_hex, Digest, EMPTY_HASH};
use crate::types::merkle_tree::MerkleTree;
use crate::utils::log::Logger;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Why a block (or one of its transactions) was turned away.
///
/// Rejections are not errors: they surface to callers as a `false` return
/// and to operators through the log line carrying one of these tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reject {
    InvalidSignature,
    InsufficientBalance,
    UnknownSender,
    ContractCannotSend,
    BadNonce,
    GasLimitExceeded,
    GasBelowMinimum,
    MalformedBlock,
    RuntimeError,
}

impl fmt::Display for Reject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Reject::InvalidSignature => "INVALID_SIGNATURE",
            Reject::InsufficientBalance => "INSUFFICIENT_BALANCE",
            Reject::UnknownSender => "UNKNOWN_SENDER",
            Reject::ContractCannotSend => "CONTRACT_CANNOT_SEND",
            Reject::BadNonce => "BAD_NONCE",
            Reject::GasLimitExceeded => "GAS_LIMIT_EXCEEDED",
            Reject::GasBelowMinimum => "GAS_BELOW_MINIMUM",
            Reject::MalformedBlock => "MALFORMED_BLOCK",
            Reject::RuntimeError => "RUNTIME_ERROR",
        };
        f.write_str(token)
    }
}

/// Working copy of one account inside the block overlay.
///
/// The balance is signed: a sender is debited before the cover check, so
/// it may transiently dip below zero, which then rejects the block.
#[derive(Clone, Debug)]
struct PendingAccount {
    balance: BigInt,
    nonce: u64,
    code_hash: Digest,
    storage_root: Digest,
}

impl PendingAccount {
    fn from_account(account: &Account) -> Self {
        Self {
            balance: BigInt::from(account.balance().clone()),
            nonce: account.nonce(),
            code_hash: account.code_hash(),
            storage_root: account.storage_root(),
        }
    }

    /// Fresh EOA materialized on first receipt of value.
    fn fresh() -> Self {
        Self {
            balance: BigInt::zero(),
            nonce: 0,
            code_hash: EMPTY_HASH,
            storage_root: EMPTY_HASH,
        }
    }

    fn is_negative(&self) -> bool {
        self.balance.sign() == Sign::Minus
    }

    /// Converts back to a persistable account; `None` if the balance is
    /// negative.
    fn into_account(self) -> Option<Account> {
        let balance = self.balance.to_biguint()?;
        Some(Account::from_parts(
            balance,
            self.nonce,
            self.code_hash,
            self.storage_root,
        ))
    }
}

fn reject(logger: &Logger, block: &Block, cause: Reject) {
    logger.warn(&format!("block {} rejected: {cause}", block.hash));
}

/// Block-validating state-transition engine.
///
/// Holds the chain parameters, the contract runtime, and the provider of
/// per-account storage databases. Processing is single-threaded and
/// strictly sequential per block; callers must not run two validations
/// against the same stores concurrently.
pub struct TransitionEngine<R: ContractRuntime, P: AccountStoreProvider> {
    config: ChainConfig,
    runtime: R,
    account_stores: P,
}

impl<R: ContractRuntime, P: AccountStoreProvider> TransitionEngine<R, P> {
    pub fn new(config: ChainConfig, runtime: R, account_stores: P) -> Self {
        Self {
            config,
            runtime,
            account_stores,
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn account_stores(&self) -> &P {
        &self.account_stores
    }

    /// Checks the shape of a received wire record before any cryptography.
    pub fn has_valid_prop_types(&self, raw: &serde_json::Value, logger: &Logger) -> bool {
        if !Block::has_valid_prop_types(raw) {
            logger.warn(&format!("incoming block: {}", Reject::MalformedBlock));
            return false;
        }
        true
    }

    /// Checks that the summed contract execution budget of the block stays
    /// within the chain's gas limit. Base `gas` is not counted; it buys
    /// inclusion, not execution.
    pub fn has_valid_gas_limit(&self, block: &Block, logger: &Logger) -> bool {
        let total = block
            .transactions
            .iter()
            .fold(BigUint::zero(), |acc, tx| acc + tx.contract_gas());
        if total > self.config.block_gas_limit {
            reject(logger, block, Reject::GasLimitExceeded);
            return false;
        }
        true
    }

    /// Checks that each sender's nonces replay as `preNonce+1, preNonce+2,
    /// …` in block order, with no gaps and no reordering.
    pub async fn has_valid_tx_order<K: KeyValueStore>(
        &self,
        block: &Block,
        state_db: &StateDb<K>,
        logger: &Logger,
    ) -> Result<bool, StoreError> {
        let mut replayed: BTreeMap<Address, u64> = BTreeMap::new();

        for tx in &block.transactions {
            let sender = match tx.sender_address() {
                Ok(sender) => sender,
                Err(_) => {
                    reject(logger, block, Reject::InvalidSignature);
                    return Ok(false);
                }
            };

            let expected = match replayed.get(&sender) {
                Some(nonce) => nonce + 1,
                None => match state_db.get(&sender).await? {
                    Some(account) => account.nonce() + 1,
                    None => {
                        reject(logger, block, Reject::UnknownSender);
                        return Ok(false);
                    }
                },
            };

            if tx.nonce != expected {
                reject(logger, block, Reject::BadNonce);
                return Ok(false);
            }
            replayed.insert(sender, expected);
        }

        Ok(true)
    }

    /// Validates a block and, if admissible, commits the successor state.
    ///
    /// Returns `Ok(true)` after the stores have been updated, `Ok(false)`
    /// with the stores untouched when the block is invalid, and `Err` on a
    /// store fault.
    pub async fn verify_and_transit<K: KeyValueStore>(
        &self,
        block: &Block,
        state_db: &StateDb<K>,
        code_db: &CodeDb<K>,
        logger: &Logger,
    ) -> Result<bool, StoreError> {
        // Step 1: every transaction must stand on its own against the
        // committed pre-state.
        for tx in &block.transactions {
            if !tx.is_valid(state_db, &self.config, logger).await? {
                return Ok(false);
            }
        }

        // Step 2: every sender must already exist. Contracts never sign,
        // so senders are funded EOAs credited in some earlier block.
        let mut senders = Vec::with_capacity(block.transactions.len());
        for tx in &block.transactions {
            match tx.sender_address() {
                Ok(sender) => senders.push(sender),
                Err(_) => {
                    reject(logger, block, Reject::InvalidSignature);
                    return Ok(false);
                }
            }
        }
        for sender in senders.iter().collect::<BTreeSet<_>>() {
            if state_db.get(sender).await?.is_none() {
                reject(logger, block, Reject::UnknownSender);
                return Ok(false);
            }
        }

        // Step 3: working maps. All mutations land here until commit.
        let mut states: BTreeMap<Address, PendingAccount> = BTreeMap::new();
        let mut code: BTreeMap<Digest, String> = BTreeMap::new();
        let mut storage: BTreeMap<Address, BTreeMap<String, String>> = BTreeMap::new();

        // Step 4: ordered replay.
        for (tx, sender) in block.transactions.iter().zip(&senders) {
            // 4a: resolve the sender, pulling account and code into the
            // overlay on first touch.
            if !states.contains_key(sender) {
                let Some(account) = state_db.get(sender).await? else {
                    reject(logger, block, Reject::UnknownSender);
                    return Ok(false);
                };
                let body = code_db.get(&account.code_hash()).await?.unwrap_or_default();
                code.insert(account.code_hash(), body);
                states.insert(*sender, PendingAccount::from_account(&account));
            }
            let Some(sender_state) = states.get_mut(sender) else {
                unreachable!("sender state populated above")
            };

            // Contract accounts cannot originate transactions; checked on
            // every touch, not just the first load, so a sender that
            // became a contract earlier in this block is caught too.
            if sender_state.code_hash != EMPTY_HASH {
                reject(logger, block, Reject::ContractCannotSend);
                return Ok(false);
            }

            // 4b: debit the full cost.
            sender_state.balance -= BigInt::from(tx.total_cost());

            // 4c: a carried source body deploys a contract bound to the
            // sender's own address.
            if let Some(body) = &tx.additional_data.sc_body {
                let code_hash = sha256_hex(body.as_bytes());
                code.insert(code_hash, body.clone());
                sender_state.code_hash = code_hash;
            }

            // 4d
            sender_state.nonce += 1;

            // 4e
            if sender_state.is_negative() {
                reject(logger, block, Reject::InsufficientBalance);
                return Ok(false);
            }

            // 4f: resolve the recipient, materializing a fresh EOA on
            // first receipt.
            let recipient = tx.recipient;
            self.load_or_create(&recipient, &mut states, &mut code, state_db, code_db)
                .await?;
            let Some(recipient_state) = states.get_mut(&recipient) else {
                unreachable!("recipient state populated above")
            };

            // 4g
            recipient_state.balance += BigInt::from(tx.amount.clone());

            // 4h: a contract recipient triggers the runtime; its returned
            // accounts override the overlay and its storage map replaces
            // the contract's storage view wholesale.
            let recipient_code_hash = recipient_state.code_hash;
            let recipient_view = recipient_state.clone();
            if recipient_code_hash != EMPTY_HASH {
                let Some(contract_account) = recipient_view.into_account() else {
                    reject(logger, block, Reject::InsufficientBalance);
                    return Ok(false);
                };
                let Some(snapshot) = overlay_snapshot(&states) else {
                    reject(logger, block, Reject::InsufficientBalance);
                    return Ok(false);
                };
                let body = code.get(&recipient_code_hash).cloned().unwrap_or_default();

                let outcome = self
                    .runtime
                    .run(RuntimeInvocation {
                        code: &body,
                        states: &snapshot,
                        gas_budget: tx.contract_gas(),
                        state_db,
                        block,
                        tx,
                        contract: ContractInfo {
                            address: recipient,
                            account: contract_account,
                        },
                        logger,
                    })
                    .await;
                let outcome = match outcome {
                    Ok(outcome) => outcome,
                    Err(RuntimeError::Store(e)) => return Err(e),
                    Err(RuntimeError::Execution(cause)) => {
                        logger.warn(&format!(
                            "block {} rejected: {} ({cause})",
                            block.hash,
                            Reject::RuntimeError
                        ));
                        return Ok(false);
                    }
                };

                for (address, account) in outcome.states {
                    if account.code_hash() != EMPTY_HASH && !code.contains_key(&account.code_hash())
                    {
                        let body = code_db
                            .get(&account.code_hash())
                            .await?
                            .unwrap_or_default();
                        code.insert(account.code_hash(), body);
                    }
                    states.insert(address, PendingAccount::from_account(&account));
                }
                storage.insert(recipient, outcome.storage);
            }
        }

        // Step 5: the coinbase collects the subsidy plus every fee.
        self.load_or_create(&block.coinbase, &mut states, &mut code, state_db, code_db)
            .await?;
        let fees = block
            .transactions
            .iter()
            .fold(BigUint::zero(), |acc, tx| acc + &tx.gas + tx.contract_gas());
        let Some(coinbase_state) = states.get_mut(&block.coinbase) else {
            unreachable!("coinbase state populated above")
        };
        coinbase_state.balance += BigInt::from(&self.config.block_reward + fees);

        // Step 6: commit. Seal storage roots and convert the overlay
        // first; the stores see no writes until the block is fully
        // admissible.
        for (address, map) in &storage {
            let root = MerkleTree::storage_root(map);
            if let Some(state) = states.get_mut(address) {
                state.storage_root = root;
            }
        }

        let mut committed = Vec::with_capacity(states.len());
        for (address, state) in states {
            let Some(account) = state.into_account() else {
                reject(logger, block, Reject::InsufficientBalance);
                return Ok(false);
            };
            committed.push((address, account));
        }

        for (address, map) in &storage {
            let store = self.account_stores.open(address).await?;
            for (key, value) in map {
                store.put(key, value.as_bytes().to_vec()).await?;
            }
            store.close().await?;
        }

        for (address, account) in &committed {
            if account.code_hash() != EMPTY_HASH {
                if let Some(body) = code.get(&account.code_hash()) {
                    code_db.put(&account.code_hash(), body).await?;
                }
            }
            state_db.put(address, account).await?;
        }

        logger.info(&format!(
            "block {} applied: {} transaction(s), {} account(s) updated",
            block.hash,
            block.transactions.len(),
            committed.len()
        ));
        Ok(true)
    }

    /// Loads an account into the overlay, creating a fresh EOA when it is
    /// absent from both the overlay and the committed state.
    async fn load_or_create<K: KeyValueStore>(
        &self,
        address: &Address,
        states: &mut BTreeMap<Address, PendingAccount>,
        code: &mut BTreeMap<Digest, String>,
        state_db: &StateDb<K>,
        code_db: &CodeDb<K>,
    ) -> Result<(), StoreError> {
        if states.contains_key(address) {
            return Ok(());
        }
        match state_db.get(address).await? {
            Some(account) => {
                let body = code_db.get(&account.code_hash()).await?.unwrap_or_default();
                code.insert(account.code_hash(), body);
                states.insert(*address, PendingAccount::from_account(&account));
            }
            None => {
                states.insert(*address, PendingAccount::fresh());
            }
        }
        Ok(())
    }
}

/// Snapshots the overlay as persistable accounts for the runtime; `None`
/// if any balance is negative (ruled out by the per-transaction checks).
fn overlay_snapshot(states: &BTreeMap<Address, PendingAccount>) -> Option<BTreeMap<Address, Account>> {
    let mut snapshot = BTreeMap::new();
    for (address, state) in states {
        snapshot.insert(*address, state.clone().into_account()?);
    }
    Some(snapshot)
}
