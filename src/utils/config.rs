//! Core Configuration
//!
//! Settings shared by key generation, signing and the CLI:
//! - Address network (mainnet or legacy testnet prefix)
//! - Default derivation path and mnemonic length
//! - Signature canonicalization and nonce strategy
//! - Debug logging switch

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::ecdsa::{NonceStrategy, SignOptions};
use crate::error::{TronError, TronResult};
use crate::log_info;
use crate::types::Network;
use crate::wallet::derivation_path::{
    require_valid_path, validate_derivation_path, DerivationPath, TRON_DEFAULT_PATH,
};
use crate::wallet::mnemonic::entropy_len_for;

use super::logging;

/// Core settings, loadable from JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Address prefix used for generated addresses
    pub network: Network,
    /// BIP-44 path for mnemonic-derived accounts
    pub derivation_path: String,
    /// Normalize signatures to low-S
    pub canonical_signatures: bool,
    /// How signing nonces are chosen
    pub nonce: NonceStrategy,
    /// Words in generated mnemonics
    pub mnemonic_words: usize,
    /// Emit debug-level log lines
    pub debug_logging: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            derivation_path: TRON_DEFAULT_PATH.to_string(),
            canonical_signatures: true,
            nonce: NonceStrategy::Deterministic,
            mnemonic_words: 12,
            debug_logging: false,
        }
    }
}

impl CoreConfig {
    /// Parse and validate a JSON document; missing fields take defaults
    pub fn from_json(json: &str) -> TronResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> TronResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            TronError::invalid_input(format!("Cannot read config file: {}", e))
                .with_details(path.display().to_string())
        })?;
        let config = Self::from_json(&contents)?;
        log_info!(
            "config",
            "Configuration loaded",
            network = config.network,
            derivation_path = config.derivation_path,
        );
        Ok(config)
    }

    /// Reject settings no operation can honor
    pub fn validate(&self) -> TronResult<()> {
        require_valid_path(&self.derivation_path)?;
        entropy_len_for(self.mnemonic_words)?;
        Ok(())
    }

    /// Legal but unusual settings
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !self.canonical_signatures {
            warnings.push(
                "Warning: High-S signatures are rejected by TRON nodes".to_string()
            );
        }

        if self.nonce == NonceStrategy::Random {
            warnings.push(
                "Warning: Random nonces make signatures depend on the OS entropy source".to_string()
            );
        }

        warnings.extend(validate_derivation_path(&self.derivation_path).warnings);

        warnings
    }

    pub fn path(&self) -> TronResult<DerivationPath> {
        require_valid_path(&self.derivation_path)
    }

    pub fn sign_options(&self) -> SignOptions {
        SignOptions {
            canonical: self.canonical_signatures,
            nonce: self.nonce,
        }
    }

    /// Apply the logging switch process-wide
    pub fn apply_logging(&self) {
        if self.debug_logging {
            logging::enable_debug();
        } else {
            logging::disable_debug();
        }
    }
}
