//! Signed transactions, their canonical encoding, and per-transaction
//! validation.

use crate::config::ChainConfig;
use crate::core::transit::Reject;
use crate::crypto::key_pair::{CryptoError, PrivateKey, PublicKey};
use crate::storage::kv::{KeyValueStore, StoreError};
use crate::storage::state_db::StateDb;
use crate::types::address::Address;
use crate::types::decimal;
use crate::types::signature::RecoverableSignature;
use crate::utils::log::Logger;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Optional transaction payload extensions.
///
/// `contract_gas` budgets contract execution when the recipient is a
/// contract; `sc_body` carries the source text of a contract being
/// deployed to the sender's own address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalData {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "decimal::opt")]
    pub contract_gas: Option<BigUint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sc_body: Option<String>,
}

impl AdditionalData {
    /// Renders the canonical separator-free form: `contractGas ‖ scBody`,
    /// absent fields contributing nothing.
    fn canonical_string(&self) -> String {
        let mut out = String::new();
        if let Some(gas) = &self.contract_gas {
            out.push_str(&gas.to_str_radix(10));
        }
        if let Some(body) = &self.sc_body {
            out.push_str(body);
        }
        out
    }
}

/// A signed value transfer, optionally deploying or invoking a contract.
///
/// The sender is not an explicit field: every consumer recovers the
/// signer's public key from the signature over the canonical string, and
/// the sender address is the digest of that key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Receiving account (EOA or contract).
    pub recipient: Address,
    /// Native amount transferred to the recipient.
    #[serde(with = "decimal")]
    pub amount: BigUint,
    /// Base fee offered for inclusion; credited to the coinbase.
    #[serde(with = "decimal")]
    pub gas: BigUint,
    /// Optional contract payload.
    #[serde(default)]
    pub additional_data: AdditionalData,
    /// Sender nonce; must extend the sender's account nonce by one.
    pub nonce: u64,
    /// Recoverable signature over the canonical string.
    pub signature: RecoverableSignature,
}

impl Transaction {
    /// Creates a new transaction signed with the given key.
    pub fn signed(
        recipient: Address,
        amount: BigUint,
        gas: BigUint,
        additional_data: AdditionalData,
        nonce: u64,
        key: &PrivateKey,
    ) -> Result<Self, CryptoError> {
        let message =
            Self::canonical_from_parts(&recipient, &amount, &gas, &additional_data, nonce);
        let signature = key.sign(message.as_bytes())?;
        Ok(Self {
            recipient,
            amount,
            gas,
            additional_data,
            nonce,
            signature,
        })
    }

    /// Returns the canonical separator-free concatenation all signers and
    /// validators agree on: `recipient ‖ amount ‖ gas ‖ additionalData ‖
    /// nonce`.
    pub fn canonical_string(&self) -> String {
        Self::canonical_from_parts(
            &self.recipient,
            &self.amount,
            &self.gas,
            &self.additional_data,
            self.nonce,
        )
    }

    fn canonical_from_parts(
        recipient: &Address,
        amount: &BigUint,
        gas: &BigUint,
        additional_data: &AdditionalData,
        nonce: u64,
    ) -> String {
        format!(
            "{recipient}{}{}{}{nonce}",
            amount.to_str_radix(10),
            gas.to_str_radix(10),
            additional_data.canonical_string(),
        )
    }

    /// Recovers the sender's public key from the signature.
    pub fn sender_public_key(&self) -> Result<PublicKey, CryptoError> {
        PublicKey::recover(self.canonical_string().as_bytes(), &self.signature)
    }

    /// Recovers the sender's address from the signature.
    pub fn sender_address(&self) -> Result<Address, CryptoError> {
        Ok(self.sender_public_key()?.address())
    }

    /// Returns the contract execution budget, zero when absent.
    pub fn contract_gas(&self) -> BigUint {
        self.additional_data
            .contract_gas
            .clone()
            .unwrap_or_default()
    }

    /// Returns the total debit charged to the sender:
    /// `amount + gas + contractGas`.
    pub fn total_cost(&self) -> BigUint {
        &self.amount + &self.gas + self.contract_gas()
    }

    /// Validates this transaction against a read-only state snapshot.
    ///
    /// Accepts iff the signature recovers a sender, the offered gas meets
    /// the chain minimum, the sender exists, and the sender's balance
    /// covers the total cost. The rejection cause is logged.
    pub async fn is_valid<K: KeyValueStore>(
        &self,
        state_db: &StateDb<K>,
        config: &ChainConfig,
        logger: &Logger,
    ) -> Result<bool, StoreError> {
        let sender = match self.sender_address() {
            Ok(sender) => sender,
            Err(_) => {
                logger.warn(&format!(
                    "tx to {}: {}",
                    self.recipient,
                    Reject::InvalidSignature
                ));
                return Ok(false);
            }
        };

        if self.gas < config.min_tx_gas {
            logger.warn(&format!("tx from {sender}: {}", Reject::GasBelowMinimum));
            return Ok(false);
        }

        let account = match state_db.get(&sender).await? {
            Some(account) => account,
            None => {
                logger.warn(&format!("tx from {sender}: {}", Reject::UnknownSender));
                return Ok(false);
            }
        };

        if *account.balance() < self.total_cost() {
            logger.warn(&format!(
                "tx from {sender}: {}",
                Reject::InsufficientBalance
            ));
            return Ok(false);
        }

        Ok(true)
    }
}
