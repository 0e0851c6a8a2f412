//! Persistence subsystem.
//!
//! This module provides the storage abstractions and implementations the
//! engine runs against:
//!
//! - [`kv`]: the ordered key/value contract ([`KeyValueStore`](kv::KeyValueStore))
//!   and the fatal [`StoreError`](kv::StoreError)
//! - [`state_db`]: typed [`StateDb`](state_db::StateDb) / [`CodeDb`](state_db::CodeDb)
//!   wrappers encoding account records and contract bodies
//! - [`account_store`]: provisioning of per-account storage databases
//! - [`rocks`]: production RocksDB-backed implementation
//! - [`memory`]: in-memory implementation for testing

pub mod account_store;
pub mod kv;
pub mod memory;
pub mod rocks;
pub mod state_db;
