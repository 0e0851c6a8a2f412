//! Recoverable ECDSA signatures with a compact hex wire form.

use k256::ecdsa::{RecoveryId, Signature};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// ECDSA signature over secp256k1 together with its recovery id.
///
/// The recovery id lets verifiers reconstruct the signer's public key from
/// the signed message alone, so transactions carry no explicit sender
/// field. Wire form: 130 lowercase hex characters, the 64-byte compact
/// `r ‖ s` encoding followed by the recovery byte.
#[derive(Clone)]
pub struct RecoverableSignature {
    pub signature: Signature,
    pub recovery_id: RecoveryId,
}

impl PartialEq for RecoverableSignature {
    fn eq(&self, other: &Self) -> bool {
        self.signature.to_bytes() == other.signature.to_bytes()
            && self.recovery_id == other.recovery_id
    }
}

impl Eq for RecoverableSignature {}

impl RecoverableSignature {
    pub fn new(signature: Signature, recovery_id: RecoveryId) -> Self {
        Self {
            signature,
            recovery_id,
        }
    }

    /// Encodes the signature into its canonical hex wire form.
    pub fn to_hex(&self) -> String {
        let mut text = hex::encode(self.signature.to_bytes());
        text.push_str(&format!("{:02x}", self.recovery_id.to_byte()));
        text
    }

    /// Parses the canonical hex wire form.
    pub fn from_hex(text: &str) -> Option<Self> {
        if text.len() != 130 {
            return None;
        }
        let bytes = hex::decode(text).ok()?;
        let signature = Signature::from_slice(&bytes[..64]).ok()?;
        let recovery_id = RecoveryId::from_byte(bytes[64])?;
        Some(Self {
            signature,
            recovery_id,
        })
    }
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoverableSignature({})", self.to_hex())
    }
}

impl Serialize for RecoverableSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RecoverableSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        RecoverableSignature::from_hex(&text)
            .ok_or_else(|| D::Error::custom("invalid recoverable signature encoding"))
    }
}
