//! Block structure, hash derivation, and wire-shape validation.

use crate::core::transaction::Transaction;
use crate::types::address::Address;
use crate::types::decimal;
use crate::types::hash::{sha256_hex, Digest};
use crate::types::merkle_tree::MerkleTree;
use crate::types::signature::RecoverableSignature;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A block: header fields plus the ordered transaction body.
///
/// `tx_root` and `hash` are recomputable from the other fields; receivers
/// must verify them against the carried values before applying the block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub block_number: u64,
    pub timestamp: u64,
    pub difficulty: u64,
    pub parent_hash: Digest,
    pub nonce: u64,
    /// Merkle root over the indexed transaction body.
    pub tx_root: Digest,
    /// Address credited with the block reward and all gas fees.
    pub coinbase: Address,
    /// Header hash; see [`Block::compute_hash`].
    pub hash: Digest,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Assembles a block, sealing in the computed `tx_root` and `hash`.
    pub fn sealed(
        block_number: u64,
        timestamp: u64,
        difficulty: u64,
        parent_hash: Digest,
        nonce: u64,
        coinbase: Address,
        transactions: Vec<Transaction>,
    ) -> Self {
        let tx_root = MerkleTree::from_transactions(&transactions);
        let mut block = Self {
            block_number,
            timestamp,
            difficulty,
            parent_hash,
            nonce,
            tx_root,
            coinbase,
            hash: Digest::default(),
            transactions,
        };
        block.hash = block.compute_hash();
        block
    }

    /// Derives the header hash: SHA-256 over the concatenation of
    /// `blockNumber ‖ timestamp ‖ txRoot ‖ difficulty ‖ parentHash ‖
    /// nonce`, integers in base-10 and digests in their 64-hex form.
    pub fn compute_hash(&self) -> Digest {
        let preimage = format!(
            "{}{}{}{}{}{}",
            self.block_number,
            self.timestamp,
            self.tx_root,
            self.difficulty,
            self.parent_hash,
            self.nonce
        );
        sha256_hex(preimage.as_bytes())
    }

    /// Recomputes the Merkle root over the indexed transaction body.
    pub fn compute_tx_root(&self) -> Digest {
        MerkleTree::from_transactions(&self.transactions)
    }

    /// Checks the shape of a received wire record before any cryptography.
    ///
    /// Verifies field presence and primitive types only: numeric header
    /// fields are unsigned integers, digest fields are 64-hex strings,
    /// amounts are base-10 strings, signatures decode, and the body is a
    /// sequence. A record passing this check deserializes into [`Block`]
    /// without error.
    pub fn has_valid_prop_types(raw: &Value) -> bool {
        let Some(block) = raw.as_object() else {
            return false;
        };

        let uints = ["blockNumber", "timestamp", "difficulty", "nonce"];
        if !uints.iter().all(|f| block.get(*f).is_some_and(Value::is_u64)) {
            return false;
        }

        let digests = ["parentHash", "txRoot", "coinbase", "hash"];
        if !digests.iter().all(|f| is_digest_str(block.get(*f))) {
            return false;
        }

        let Some(transactions) = block.get("transactions").and_then(Value::as_array) else {
            return false;
        };
        transactions.iter().all(tx_has_valid_prop_types)
    }
}

fn is_digest_str(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| Digest::from_hex(s).is_some())
}

fn is_decimal_str(value: &Value) -> bool {
    value.as_str().is_some_and(|s| decimal::parse(s).is_some())
}

fn tx_has_valid_prop_types(raw: &Value) -> bool {
    let Some(tx) = raw.as_object() else {
        return false;
    };

    if !is_digest_str(tx.get("recipient")) {
        return false;
    }
    if !tx.get("amount").is_some_and(is_decimal_str) || !tx.get("gas").is_some_and(is_decimal_str)
    {
        return false;
    }
    if !tx.get("nonce").is_some_and(Value::is_u64) {
        return false;
    }
    if !tx
        .get("signature")
        .and_then(Value::as_str)
        .is_some_and(|s| RecoverableSignature::from_hex(s).is_some())
    {
        return false;
    }

    match tx.get("additionalData") {
        None => true,
        Some(Value::Object(extra)) => {
            let gas_ok = match extra.get("contractGas") {
                None => true,
                Some(v) => is_decimal_str(v),
            };
            let body_ok = match extra.get("scBody") {
                None => true,
                Some(v) => v.is_string(),
            };
            gas_ok && body_ok
        }
        Some(_) => false,
    }
}
