//! 32-byte SHA-256 digest type with incremental hashing.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};
use std::fmt;

/// Digest length in bytes.
pub const DIGEST_LEN: usize = 32;

/// Sentinel digest equal to `sha256_hex("")`.
///
/// Marks empty contract code and empty storage throughout the chain.
pub const EMPTY_HASH: Digest = Digest([
    0xe3, 0xb0, 0xc4, 0x42, 0x98, 0xfc, 0x1c, 0x14, 0x9a, 0xfb, 0xf4, 0xc8, 0x99, 0x6f, 0xb9,
    0x24, 0x27, 0xae, 0x41, 0xe4, 0x64, 0x9b, 0x93, 0x4c, 0xa4, 0x95, 0x99, 0x1b, 0x78, 0x52,
    0xb8, 0x55,
]);

/// Fixed-size 32-byte SHA-256 digest.
///
/// This type is `Copy` - digests are passed frequently during block
/// validation and should live on the stack. The canonical textual form is
/// 64 lowercase hex characters, which is also the serde representation and
/// the form fed back into parent-node hashing by the Merkle builder.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash, Ord, PartialOrd)]
pub struct Digest(pub [u8; DIGEST_LEN]);

impl Digest {
    /// Returns the digest as a byte slice.
    pub const fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Parses a digest from its 64-character lowercase hex form.
    ///
    /// Returns `None` on wrong length, non-hex characters, or uppercase
    /// input (the canonical form is lowercase only, so mixed-case aliases
    /// of the same digest are rejected).
    pub fn from_hex(text: &str) -> Option<Digest> {
        if text.len() != DIGEST_LEN * 2 || text.bytes().any(|b| b.is_ascii_uppercase()) {
            return None;
        }
        let bytes = hex::decode(text).ok()?;
        let mut out = [0u8; DIGEST_LEN];
        out.copy_from_slice(&bytes);
        Some(Digest(out))
    }

    /// Creates a new SHA-256 builder for incremental hashing.
    pub fn sha256() -> DigestBuilder {
        DigestBuilder::new()
    }
}

/// Computes the SHA-256 digest of `data` in one call.
pub fn sha256_hex(data: &[u8]) -> Digest {
    Digest::sha256().chain(data).finalize()
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Digest::from_hex(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid digest literal: {text:?}")))
    }
}

/// Incremental SHA-256 builder.
///
/// Allows feeding data in chunks and finalizing to produce a [`Digest`]
/// without intermediate buffers.
pub struct DigestBuilder {
    hasher: Sha256,
}

impl DigestBuilder {
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    /// Feeds data into the hash computation.
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    pub fn chain(mut self, data: &[u8]) -> Self {
        self.hasher.update(data);
        self
    }

    /// Consumes the builder and returns the final digest.
    pub fn finalize(self) -> Digest {
        Digest(self.hasher.finalize().into())
    }
}

impl Default for DigestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
