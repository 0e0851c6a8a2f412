//! Per-account storage database provisioning.

use crate::storage::kv::{KeyValueStore, StoreError};
use crate::types::address::Address;
use async_trait::async_trait;

/// Provider of per-account storage databases.
///
/// Each contract account owns a private ordered key/value namespace. The
/// engine opens the namespace during commit, rewrites the contract's
/// storage map, and closes it before returning; opening is exclusive per
/// address for the duration of the handle.
#[async_trait]
pub trait AccountStoreProvider: Send + Sync {
    type Store: KeyValueStore;

    /// Opens (creating if absent) the storage database of `address`.
    async fn open(&self, address: &Address) -> Result<Self::Store, StoreError>;
}
