//! ECDSA key pairs on secp256k1 with public-key recovery.

use crate::types::address::Address;
use crate::types::signature::RecoverableSignature;
use k256::ecdsa::{SigningKey, VerifyingKey};
use rand_core::OsRng;
use thiserror::Error;

/// Errors raised while handling keys and signatures.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("public key recovery failed: {0}")]
    Recovery(String),
    #[error("malformed public key encoding")]
    MalformedKey,
}

/// Private key for signing transactions.
///
/// Generated using cryptographically secure randomness from the OS.
/// Never serialized or transmitted.
#[derive(Clone)]
pub struct PrivateKey {
    key: SigningKey,
}

/// Public key for address derivation and signature recovery checks.
///
/// The chain identifies key owners by the SHA-256 digest of the
/// uncompressed SEC1 encoding in hex, so the hex form is the canonical one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    key: VerifyingKey,
    address: Address,
}

impl PrivateKey {
    /// Generates a new random private key using OS-provided entropy.
    pub fn generate() -> Self {
        Self {
            key: SigningKey::random(&mut OsRng),
        }
    }

    /// Creates a private key from raw bytes.
    ///
    /// Returns `None` if the bytes do not represent a valid scalar for
    /// secp256k1.
    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        SigningKey::from_slice(bytes).ok().map(|key| Self { key })
    }

    /// Derives the corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(*self.key.verifying_key())
    }

    /// Signs a message, producing a recoverable ECDSA signature.
    ///
    /// The message is digested with SHA-256 before signing, matching the
    /// recovery path in [`PublicKey::recover`].
    pub fn sign(&self, message: &[u8]) -> Result<RecoverableSignature, CryptoError> {
        let (signature, recovery_id) = self
            .key
            .sign_recoverable(message)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        Ok(RecoverableSignature::new(signature, recovery_id))
    }
}

impl PublicKey {
    fn from_verifying_key(key: VerifyingKey) -> Self {
        let address = Address::of_public_key_hex(&encode_uncompressed_hex(&key));
        PublicKey { key, address }
    }

    /// Recovers the signer's public key from a message and its signature.
    pub fn recover(
        message: &[u8],
        signature: &RecoverableSignature,
    ) -> Result<PublicKey, CryptoError> {
        let key =
            VerifyingKey::recover_from_msg(message, &signature.signature, signature.recovery_id)
                .map_err(|e| CryptoError::Recovery(e.to_string()))?;
        Ok(Self::from_verifying_key(key))
    }

    /// Parses a public key from its uncompressed hex encoding.
    pub fn from_uncompressed_hex(text: &str) -> Result<PublicKey, CryptoError> {
        let bytes = hex::decode(text).map_err(|_| CryptoError::MalformedKey)?;
        let key = VerifyingKey::from_sec1_bytes(&bytes).map_err(|_| CryptoError::MalformedKey)?;
        Ok(Self::from_verifying_key(key))
    }

    /// Returns the uncompressed SEC1 encoding as lowercase hex.
    pub fn uncompressed_hex(&self) -> String {
        encode_uncompressed_hex(&self.key)
    }

    /// Returns the address owning this key.
    pub fn address(&self) -> Address {
        self.address
    }
}

fn encode_uncompressed_hex(key: &VerifyingKey) -> String {
    hex::encode(key.to_encoded_point(false).as_bytes())
}
