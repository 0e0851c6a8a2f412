//! Canonical representation of account state persisted in the state store.

use crate::types::decimal;
use crate::types::hash::{Digest, EMPTY_HASH};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Account state as persisted under its address.
///
/// The record serializes as a JSON document with the balance rendered as a
/// base-10 string of unbounded precision. Accounts are created on first
/// receipt of value and never destroyed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Spendable balance denominated in the native currency.
    #[serde(with = "decimal")]
    balance: BigUint,
    /// Monotonic counter of transactions sent from this account.
    nonce: u64,
    /// Digest of the deployed contract body, or [`EMPTY_HASH`] for EOAs.
    code_hash: Digest,
    /// Merkle root of the account's storage map; [`EMPTY_HASH`] when empty.
    storage_root: Digest,
}

impl Account {
    /// Creates a fresh externally owned account with zero balance.
    pub fn new() -> Self {
        Self::with_balance(BigUint::default())
    }

    /// Creates a new externally owned account with the given balance.
    pub fn with_balance(balance: BigUint) -> Self {
        Self {
            balance,
            nonce: 0,
            code_hash: EMPTY_HASH,
            storage_root: EMPTY_HASH,
        }
    }

    /// Reassembles an account from its four persisted fields.
    pub fn from_parts(balance: BigUint, nonce: u64, code_hash: Digest, storage_root: Digest) -> Self {
        Self {
            balance,
            nonce,
            code_hash,
            storage_root,
        }
    }

    /// Returns the account's current balance.
    pub fn balance(&self) -> &BigUint {
        &self.balance
    }

    /// Returns the account's current nonce.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Returns the digest of the account's contract body.
    pub fn code_hash(&self) -> Digest {
        self.code_hash
    }

    /// Returns the Merkle root of the account's storage map.
    pub fn storage_root(&self) -> Digest {
        self.storage_root
    }

    /// Returns true if this account holds contract code.
    pub fn is_contract(&self) -> bool {
        self.code_hash != EMPTY_HASH
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::hash::sha256_hex;

    #[test]
    fn new_creates_zeroed_eoa() {
        let account = Account::new();
        assert_eq!(account.balance(), &BigUint::default());
        assert_eq!(account.nonce(), 0);
        assert_eq!(account.code_hash(), EMPTY_HASH);
        assert_eq!(account.storage_root(), EMPTY_HASH);
        assert!(!account.is_contract());
    }

    #[test]
    fn with_balance_keeps_eoa_shape() {
        let account = Account::with_balance(BigUint::from(1_000_000u32));
        assert_eq!(account.balance(), &BigUint::from(1_000_000u32));
        assert!(!account.is_contract());
    }

    #[test]
    fn contract_accounts_have_nonempty_code_hash() {
        let account = Account::from_parts(
            BigUint::default(),
            0,
            sha256_hex(b"contract body"),
            EMPTY_HASH,
        );
        assert!(account.is_contract());
    }

    #[test]
    fn serde_record_shape() {
        let account = Account::from_parts(
            BigUint::from(42u8),
            7,
            EMPTY_HASH,
            EMPTY_HASH,
        );
        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(value["balance"], "42");
        assert_eq!(value["nonce"], 7);
        assert_eq!(value["codeHash"], EMPTY_HASH.to_string());
        assert_eq!(value["storageRoot"], EMPTY_HASH.to_string());
    }

    #[test]
    fn serde_round_trip_beyond_u64() {
        let huge = BigUint::from(u128::MAX) * 3u8;
        let account = Account::with_balance(huge.clone());
        let json = serde_json::to_string(&account).unwrap();
        let back: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(back.balance(), &huge);
    }

    #[test]
    fn serde_rejects_negative_balance() {
        let json = r#"{"balance":"-5","nonce":0,"codeHash":"e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855","storageRoot":"e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"}"#;
        assert!(serde_json::from_str::<Account>(json).is_err());
    }
}
