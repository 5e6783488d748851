//! TOML-driven store configuration.
//!
//! A `StoreConfig` sets the two operator-tunable values of the repair log:
//! the ceiling on total entries and the per-entry logging fee. Both default
//! to the on-chain contract's initial values when omitted.
//!
//! Example:
//! ```toml
//! max_logs = 100000
//! logging_fee = 100
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use fixchain_contracts::error::{FixchainError, FixchainResult};

fn default_max_logs() -> u64 {
    100_000
}

fn default_logging_fee() -> u64 {
    100
}

/// Operator-tunable store parameters, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Ceiling on the total number of entries the store will ever accept.
    #[serde(default = "default_max_logs")]
    pub max_logs: u64,

    /// Fee charged per successful entry, transferred from the caller to the
    /// authority contract. May be changed at runtime via `set_logging_fee`.
    #[serde(default = "default_logging_fee")]
    pub logging_fee: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_logs: default_max_logs(),
            logging_fee: default_logging_fee(),
        }
    }
}

impl StoreConfig {
    /// Parse `s` as TOML store configuration.
    ///
    /// Returns `FixchainError::Config` if the TOML is malformed or does not
    /// match the expected schema.
    pub fn from_toml_str(s: &str) -> FixchainResult<Self> {
        toml::from_str(s).map_err(|e| FixchainError::Config {
            reason: format!("failed to parse store config TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as TOML store configuration.
    ///
    /// Returns `FixchainError::Config` if the file cannot be read or its
    /// contents are not valid TOML matching `StoreConfig`.
    pub fn from_file(path: &Path) -> FixchainResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| FixchainError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Omitted keys fall back to the contract's initial values.
    #[test]
    fn empty_toml_yields_defaults() {
        let config = StoreConfig::from_toml_str("").unwrap();
        assert_eq!(config.max_logs, 100_000);
        assert_eq!(config.logging_fee, 100);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = StoreConfig::from_toml_str("max_logs = 5\nlogging_fee = 0\n").unwrap();
        assert_eq!(config.max_logs, 5);
        assert_eq!(config.logging_fee, 0);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = StoreConfig::from_toml_str("max_logs = \"lots\"").unwrap_err();
        match err {
            FixchainError::Config { reason } => {
                assert!(reason.contains("store config"), "unexpected reason: {}", reason)
            }
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = StoreConfig::from_file(Path::new("/nonexistent/fixchain.toml")).unwrap_err();
        assert!(matches!(err, FixchainError::Config { .. }));
    }
}
