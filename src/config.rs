//! Chain parameters consumed by the state-transition engine.

use num_bigint::BigUint;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Chain-wide constants.
///
/// All amounts are base-10 strings in the file form, matching the
/// persistence contract for balances and gas.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainConfig {
    /// Subsidy credited to the coinbase of every accepted block.
    #[serde(with = "crate::types::decimal")]
    pub block_reward: BigUint,
    /// Upper bound on the summed contract execution budget of one block.
    #[serde(with = "crate::types::decimal")]
    pub block_gas_limit: BigUint,
    /// Minimum base gas a transaction must offer to be considered at all.
    #[serde(with = "crate::types::decimal")]
    pub min_tx_gas: BigUint,
    /// Root directory holding the per-account storage databases.
    pub data_root: PathBuf,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            block_reward: BigUint::from(5_000_000_000u64),
            block_gas_limit: BigUint::from(30_000_000u64),
            min_tx_gas: BigUint::from(21_000u64),
            data_root: PathBuf::from("data"),
        }
    }
}

impl ChainConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// Missing fields fall back to the defaults, so a partial file tuning a
    /// single parameter is valid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn defaults_are_nonzero() {
        let config = ChainConfig::default();
        assert!(config.block_reward > BigUint::from(0u8));
        assert!(config.block_gas_limit > BigUint::from(0u8));
        assert!(config.min_tx_gas > BigUint::from(0u8));
    }

    #[test]
    fn from_file_parses_decimal_strings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"blockReward":"77","blockGasLimit":"1000","minTxGas":"5","dataRoot":"/tmp/chain"}}"#
        )
        .unwrap();

        let config = ChainConfig::from_file(file.path()).unwrap();
        assert_eq!(config.block_reward, BigUint::from(77u8));
        assert_eq!(config.block_gas_limit, BigUint::from(1000u16));
        assert_eq!(config.min_tx_gas, BigUint::from(5u8));
        assert_eq!(config.data_root, PathBuf::from("/tmp/chain"));
    }

    #[test]
    fn from_file_fills_missing_fields_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"blockReward":"9"}}"#).unwrap();

        let config = ChainConfig::from_file(file.path()).unwrap();
        assert_eq!(config.block_reward, BigUint::from(9u8));
        assert_eq!(config.block_gas_limit, ChainConfig::default().block_gas_limit);
    }

    #[test]
    fn from_file_rejects_negative_amounts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"blockReward":"-3"}}"#).unwrap();
        assert!(ChainConfig::from_file(file.path()).is_err());
    }
}
