//! Account addresses derived from sender public keys.

use crate::types::hash::{sha256_hex, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account address: the SHA-256 digest of the owner's uncompressed public
/// key in hex form.
///
/// Contract accounts and the coinbase use the same 64-hex shape, so the
/// address doubles as the key of the account record in the state store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub Digest);

impl Address {
    /// Derives the address owning the given uncompressed public key.
    pub fn of_public_key_hex(pub_key_hex: &str) -> Address {
        Address(sha256_hex(pub_key_hex.as_bytes()))
    }

    /// Parses an address from its 64-character lowercase hex form.
    pub fn from_hex(text: &str) -> Option<Address> {
        Digest::from_hex(text).map(Address)
    }

    /// Returns the address as the string key used by the persistent stores.
    pub fn store_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Digest> for Address {
    fn from(digest: Digest) -> Self {
        Address(digest)
    }
}
