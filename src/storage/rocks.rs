//! RocksDB-backed stores.
//!
//! Production implementation of the key/value contract. Each store owns
//! one RocksDB instance; per-account storage databases live under
//! `<data_root>/accountStore/<address>`, one instance per address,
//! created lazily on first open. RocksDB's directory lock provides the
//! exclusive-open guarantee the engine relies on.

use crate::info;
use crate::storage::account_store::AccountStoreProvider;
use crate::storage::kv::{KeyValueStore, StoreError};
use crate::types::address::Address;
use async_trait::async_trait;
use rocksdb::{IteratorMode, Options, DB};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

impl From<rocksdb::Error> for StoreError {
    fn from(value: rocksdb::Error) -> Self {
        StoreError::Backend(value.to_string())
    }
}

/// RocksDB-backed ordered key/value store.
///
/// Closing drops the database handle, releasing the directory lock so the
/// same path can be reopened.
pub struct RocksStore {
    db: Mutex<Option<DB>>,
}

impl RocksStore {
    /// Opens (creating if absent) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path.as_ref())?;
        Ok(Self {
            db: Mutex::new(Some(db)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<DB>> {
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for RocksStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let guard = self.lock();
        let db = guard.as_ref().ok_or(StoreError::Closed)?;
        Ok(db.get(key.as_bytes())?)
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let guard = self.lock();
        let db = guard.as_ref().ok_or(StoreError::Closed)?;
        Ok(db.put(key.as_bytes(), value)?)
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let guard = self.lock();
        let db = guard.as_ref().ok_or(StoreError::Closed)?;

        let mut keys = Vec::new();
        for item in db.iterator(IteratorMode::Start) {
            let (key, _) = item?;
            keys.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(keys)
    }

    async fn close(&self) -> Result<(), StoreError> {
        let mut guard = self.lock();
        if guard.take().is_none() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

/// RocksDB-backed provider of per-account storage databases.
pub struct RocksAccountStores {
    root: PathBuf,
}

impl RocksAccountStores {
    /// Creates a provider rooted at `<data_root>/accountStore`.
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            root: data_root.into().join("accountStore"),
        }
    }

    /// Returns the on-disk path of an account's storage database.
    pub fn path_for(&self, address: &Address) -> PathBuf {
        self.root.join(address.to_string())
    }
}

#[async_trait]
impl AccountStoreProvider for RocksAccountStores {
    type Store = RocksStore;

    async fn open(&self, address: &Address) -> Result<RocksStore, StoreError> {
        let path = self.path_for(address);
        if !path.exists() {
            std::fs::create_dir_all(&self.root)?;
            info!("creating storage database for account {address}");
        }
        RocksStore::open(path)
    }
}
