//! In-memory store for testing and development.

use crate::storage::account_store::AccountStoreProvider;
use crate::storage::kv::{KeyValueStore, StoreError};
use crate::types::address::Address;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

type Shared = Arc<RwLock<BTreeMap<String, Vec<u8>>>>;

/// In-memory ordered store backed by a `BTreeMap`.
///
/// Cloning produces a fresh open handle over the same underlying map, so a
/// test can keep one handle for inspection while the engine closes
/// another. Not suitable for production; nothing survives the process.
pub struct MemoryStore {
    data: Shared,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_shared(Arc::new(RwLock::new(BTreeMap::new())))
    }

    fn from_shared(data: Shared) -> Self {
        Self {
            data,
            closed: AtomicBool::new(false),
        }
    }

    fn guard_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    /// Returns a copy of the full contents, bypassing the closed flag.
    ///
    /// Test helper for asserting that rejected blocks left nothing behind.
    pub fn dump(&self) -> BTreeMap<String, Vec<u8>> {
        self.data.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self::from_shared(Arc::clone(&self.data))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.guard_open()?;
        let data = self.data.read().unwrap_or_else(|e| e.into_inner());
        Ok(data.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.guard_open()?;
        let mut data = self.data.write().unwrap_or_else(|e| e.into_inner());
        data.insert(key.to_string(), value);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.guard_open()?;
        let data = self.data.read().unwrap_or_else(|e| e.into_inner());
        Ok(data.keys().cloned().collect())
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.guard_open()?;
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

/// In-memory provider of per-account storage databases.
///
/// Each address maps to its own ordered namespace; opening hands out a
/// fresh [`MemoryStore`] handle over that namespace.
pub struct MemoryAccountStores {
    stores: RwLock<BTreeMap<Address, Shared>>,
}

impl MemoryAccountStores {
    pub fn new() -> Self {
        Self {
            stores: RwLock::new(BTreeMap::new()),
        }
    }

    /// Returns a copy of every account namespace, for test assertions.
    pub fn dump_all(&self) -> BTreeMap<Address, BTreeMap<String, Vec<u8>>> {
        let stores = self.stores.read().unwrap_or_else(|e| e.into_inner());
        stores
            .iter()
            .map(|(addr, shared)| {
                let data = shared.read().unwrap_or_else(|e| e.into_inner()).clone();
                (*addr, data)
            })
            .collect()
    }
}

impl Default for MemoryAccountStores {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStoreProvider for MemoryAccountStores {
    type Store = MemoryStore;

    async fn open(&self, address: &Address) -> Result<MemoryStore, StoreError> {
        let mut stores = self.stores.write().unwrap_or_else(|e| e.into_inner());
        let shared = stores
            .entry(*address)
            .or_insert_with(|| Arc::new(RwLock::new(BTreeMap::new())));
        Ok(MemoryStore::from_shared(Arc::clone(shared)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_round_trip() {
        let store = MemoryStore::new();
        store.put("key", b"value".to_vec()).await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), Some(b"value".to_vec()));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn keys_are_sorted_ascending() {
        let store = MemoryStore::new();
        store.put("b", vec![2]).await.unwrap();
        store.put("a", vec![1]).await.unwrap();
        store.put("c", vec![3]).await.unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn closed_store_rejects_operations() {
        let store = MemoryStore::new();
        store.close().await.unwrap();

        assert!(matches!(store.get("k").await, Err(StoreError::Closed)));
        assert!(matches!(
            store.put("k", vec![]).await,
            Err(StoreError::Closed)
        ));
        assert!(matches!(store.keys().await, Err(StoreError::Closed)));
        assert!(matches!(store.close().await, Err(StoreError::Closed)));
    }

    #[tokio::test]
    async fn clone_survives_close_of_other_handle() {
        let store = MemoryStore::new();
        store.put("k", vec![9]).await.unwrap();
        let inspector = store.clone();
        store.close().await.unwrap();

        assert_eq!(inspector.get("k").await.unwrap(), Some(vec![9]));
    }

    #[tokio::test]
    async fn provider_reopen_preserves_data() {
        let provider = MemoryAccountStores::new();
        let address = Address::of_public_key_hex("04aa");

        let first = provider.open(&address).await.unwrap();
        first.put("slot", b"1".to_vec()).await.unwrap();
        first.close().await.unwrap();

        let second = provider.open(&address).await.unwrap();
        assert_eq!(second.get("slot").await.unwrap(), Some(b"1".to_vec()));
    }

    #[tokio::test]
    async fn provider_isolates_accounts() {
        let provider = MemoryAccountStores::new();
        let a = Address::of_public_key_hex("04aa");
        let b = Address::of_public_key_hex("04bb");

        let store_a = provider.open(&a).await.unwrap();
        store_a.put("slot", b"a".to_vec()).await.unwrap();

        let store_b = provider.open(&b).await.unwrap();
        assert_eq!(store_b.get("slot").await.unwrap(), None);
    }
}
