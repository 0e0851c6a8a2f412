//! Typed wrappers over the raw key/value stores.

use crate::core::account::Account;
use crate::storage::kv::{KeyValueStore, StoreError};
use crate::types::address::Address;
use crate::types::hash::{Digest, EMPTY_HASH};

/// Account state store: `Address → Account`, records encoded as JSON.
pub struct StateDb<K: KeyValueStore> {
    store: K,
}

impl<K: KeyValueStore> StateDb<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    /// Fetches the account state for an address.
    pub async fn get(&self, address: &Address) -> Result<Option<Account>, StoreError> {
        let key = address.store_key();
        match self.store.get(&key).await? {
            Some(bytes) => {
                let account =
                    serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                        key,
                        reason: e.to_string(),
                    })?;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    /// Writes or overwrites the account state for an address.
    pub async fn put(&self, address: &Address, account: &Account) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(account).map_err(|e| StoreError::Corrupt {
            key: address.store_key(),
            reason: e.to_string(),
        })?;
        self.store.put(&address.store_key(), bytes).await
    }

    /// Enumerates every account address present in the store.
    pub async fn addresses(&self) -> Result<Vec<Address>, StoreError> {
        let mut addresses = Vec::new();
        for key in self.store.keys().await? {
            match Address::from_hex(&key) {
                Some(address) => addresses.push(address),
                None => {
                    return Err(StoreError::Corrupt {
                        key,
                        reason: "key is not a 64-hex address".into(),
                    })
                }
            }
        }
        Ok(addresses)
    }
}

/// Contract code store: `CodeHash → ContractBody`.
///
/// The empty body is never persisted: reads of [`EMPTY_HASH`] resolve to
/// `""` without touching the backend, reserving one convention for the
/// sentinel.
pub struct CodeDb<K: KeyValueStore> {
    store: K,
}

impl<K: KeyValueStore> CodeDb<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    /// Fetches the contract body stored under a code hash.
    pub async fn get(&self, code_hash: &Digest) -> Result<Option<String>, StoreError> {
        if *code_hash == EMPTY_HASH {
            return Ok(Some(String::new()));
        }
        let key = code_hash.to_string();
        match self.store.get(&key).await? {
            Some(bytes) => {
                let body = String::from_utf8(bytes).map_err(|e| StoreError::Corrupt {
                    key,
                    reason: e.to_string(),
                })?;
                Ok(Some(body))
            }
            None => Ok(None),
        }
    }

    /// Stores a contract body under its code hash.
    pub async fn put(&self, code_hash: &Digest, body: &str) -> Result<(), StoreError> {
        if *code_hash == EMPTY_HASH {
            return Ok(());
        }
        self.store
            .put(&code_hash.to_string(), body.as_bytes().to_vec())
            .await
    }
}
