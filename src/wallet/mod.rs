//! Wallet Module
//!
//! BIP-39 mnemonics, BIP-32 key trees, BIP-44 path handling, and TRON
//! account generation on top of them.

pub mod derivation_path;
pub mod hd;
pub mod keygen;
pub mod mnemonic;

pub use derivation_path::{
    parse_path, validate_derivation_path, DerivationComponent, DerivationPath, PathValidation,
    HARDENED, TRON_DEFAULT_PATH,
};
pub use hd::HdNode;
pub use keygen::{create_wallet, generate_account, import_private_key, restore_wallet};
pub use mnemonic::{generate_mnemonic, mnemonic_to_seed, validate_mnemonic, Mnemonic};

use crate::error::TronResult;
use crate::types::WalletResponse;
use crate::utils::config::CoreConfig;

/// Create a new wallet with default settings
pub fn create_new_wallet() -> TronResult<WalletResponse> {
    keygen::create_wallet(&CoreConfig::default())
}

/// Restore a wallet from a mnemonic with default settings
pub fn restore_from_mnemonic(phrase: &str) -> TronResult<WalletResponse> {
    keygen::restore_wallet(phrase, "", &CoreConfig::default())
}
