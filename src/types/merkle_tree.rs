//! Merkle tree helpers producing deterministic commitment roots.
//!
//! Behavior:
//! - An empty list of leaves yields [`EMPTY_HASH`].
//! - Each leaf string is wrapped into a node whose value is its SHA-256
//!   digest; parent values hash the concatenation of the two children's
//!   64-hex values.
//! - When a level has an odd number of nodes the trailing node is carried
//!   up unchanged.
//! - Reduction is performed in-place to minimize allocations.

use crate::core::transaction::Transaction;
use crate::types::hash::{sha256_hex, Digest, EMPTY_HASH};
use std::collections::BTreeMap;

/// Utility functions to build Merkle roots from leaves, transactions, or
/// storage maps.
pub struct MerkleTree;

impl MerkleTree {
    fn hash_pair(left: Digest, right: Digest) -> Digest {
        let mut h = Digest::sha256();
        h.update(left.to_string().as_bytes());
        h.update(right.to_string().as_bytes());
        h.finalize()
    }

    /// Computes a Merkle root from the provided leaf strings.
    ///
    /// A singleton list reduces to the leaf's own digest. Returns
    /// [`EMPTY_HASH`] when `leaves` is empty.
    pub fn from_leaves<I, S>(leaves: I) -> Digest
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut nodes: Vec<Digest> = leaves
            .into_iter()
            .map(|leaf| sha256_hex(leaf.as_ref().as_bytes()))
            .collect();
        if nodes.is_empty() {
            return EMPTY_HASH;
        }

        let mut len = nodes.len();
        while len > 1 {
            let mut write = 0;
            let mut read = 0;

            while read < len {
                nodes[write] = if read + 1 < len {
                    Self::hash_pair(nodes[read], nodes[read + 1])
                } else {
                    // odd trailing node carries up unchanged
                    nodes[read]
                };

                write += 1;
                read += 2;
            }

            len = write;
        }

        nodes[0]
    }

    /// Computes the transaction root of a block body.
    ///
    /// Every transaction is paired with its ordinal index before hashing,
    /// so reordering the body changes the root.
    pub fn from_transactions(txs: &[Transaction]) -> Digest {
        Self::from_leaves(
            txs.iter()
                .enumerate()
                .map(|(index, tx)| format!("{index}{}", tx.canonical_string())),
        )
    }

    /// Computes an account's storage root over `key + " " + value` leaves
    /// in ascending key order.
    pub fn storage_root(storage: &BTreeMap<String, String>) -> Digest {
        Self::from_leaves(storage.iter().map(|(key, value)| format!("{key} {value}")))
    }
}
