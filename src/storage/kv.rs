//! Ordered key/value store abstraction.
//!
//! Every persistent collaborator of the engine (the account state store,
//! the code store, and the per-account storage databases) speaks this
//! contract: string keys, opaque byte values, ascending key enumeration,
//! and an explicit close. All operations may suspend; the engine awaits
//! each one before proceeding.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by storage backends.
///
/// These are fatal: block validation aborts and the error propagates to
/// the caller. Invalid blocks are not errors and never produce one.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("store backend failure: {0}")]
    Backend(String),
    #[error("store is closed")]
    Closed,
    #[error("corrupt record under key {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Ordered key/value store.
///
/// Implementations must be thread-safe; keys enumerate in ascending
/// lexicographic order. A closed store fails every subsequent operation
/// with [`StoreError::Closed`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieves the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stores `value` under `key`, overwriting any existing value.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Returns all keys in ascending lexicographic order.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Closes the store, releasing its exclusive handle.
    async fn close(&self) -> Result<(), StoreError>;
}
