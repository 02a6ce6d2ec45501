//! Key Generation
//!
//! Creates TRON accounts from fresh entropy, a mnemonic phrase, or a raw
//! private key.
//!
//! SECURITY: All sensitive data (entropy, seeds) is zeroized on drop.

use crate::address::Address;
use crate::crypto::keys::PrivateKey;
use crate::error::{TronError, TronResult};
use crate::log_info;
use crate::types::{Network, TronKeys, WalletResponse};
use crate::utils::config::CoreConfig;

use super::derivation_path::DerivationPath;
use super::hd::HdNode;
use super::mnemonic::Mnemonic;

/// Export a key pair and its address
pub fn keys_from_private_key(
    key: &PrivateKey,
    network: Network,
    derivation_path: Option<&DerivationPath>,
) -> TronKeys {
    let public_key = key.public_key();
    let address = Address::from_public_key(&public_key, network);

    log_info!("keygen", "Account derived", address = address.to_base58(), network = network);

    TronKeys {
        private_hex: key.to_hex(),
        public_hex: public_key.to_hex(),
        public_compressed_hex: public_key.to_compressed_hex(),
        address: address.to_base58(),
        address_hex: address.to_hex(),
        derivation_path: derivation_path.map(|p| p.to_string()),
    }
}

fn keys_from_mnemonic(
    mnemonic: &Mnemonic,
    passphrase: &str,
    path: &DerivationPath,
    network: Network,
) -> TronResult<TronKeys> {
    // Seed is 64 bytes - wrapped in Zeroizing for automatic cleanup
    let seed = mnemonic.to_seed(passphrase);
    let node = HdNode::from_seed(&seed[..])?.derive_path(path)?;
    let key = node
        .private_key()
        .ok_or_else(|| TronError::internal("Derived node has no private key"))?;
    Ok(keys_from_private_key(key, network, Some(path)))
}

/// Create a new wallet with a fresh mnemonic
///
/// Word count, path and network come from `config`.
pub fn create_wallet(config: &CoreConfig) -> TronResult<WalletResponse> {
    config.validate()?;
    let mnemonic = Mnemonic::generate(config.mnemonic_words)?;
    let keys = keys_from_mnemonic(&mnemonic, "", &config.path()?, config.network)?;

    Ok(WalletResponse {
        mnemonic: Some(mnemonic.phrase().to_string()),
        network: config.network,
        keys,
    })
}

/// Restore wallet from mnemonic phrase with optional passphrase (BIP-39)
pub fn restore_wallet(
    phrase: &str,
    passphrase: &str,
    config: &CoreConfig,
) -> TronResult<WalletResponse> {
    let mnemonic = Mnemonic::parse(phrase)?;
    let keys = keys_from_mnemonic(&mnemonic, passphrase, &config.path()?, config.network)?;

    Ok(WalletResponse {
        mnemonic: Some(mnemonic.phrase().to_string()),
        network: config.network,
        keys,
    })
}

/// Standalone account from a random private key, no mnemonic
pub fn generate_account(network: Network) -> TronResult<TronKeys> {
    let key = PrivateKey::random()?;
    Ok(keys_from_private_key(&key, network, None))
}

/// Account for an existing hex private key
pub fn import_private_key(private_hex: &str, network: Network) -> TronResult<TronKeys> {
    let key = PrivateKey::from_hex(private_hex)?;
    Ok(keys_from_private_key(&key, network, None))
}
