//! TRON Core Library
//!
//! Offline cryptographic core for TRON accounts and contract calls.
//!
//! # Architecture
//!
//! This crate provides:
//! - **crypto**: secp256k1 point arithmetic, ECDSA with recovery, Keccak/SHA-3
//! - **encoding**: Base58 and Base58Check
//! - **address**: TRON address derivation and conversion
//! - **wallet**: BIP-39 mnemonics, BIP-32 derivation, account generation
//! - **abi**: contract call encoding and decoding
//! - **message**: TRON message and transaction-id signatures
//!
//! # Security
//!
//! Private keys, seeds, chain codes and entropy are zeroized on drop, and
//! their `Debug` output is redacted.
//!
//! # Example
//!
//! ```rust,ignore
//! use tron_core::wallet;
//!
//! let response = wallet::create_new_wallet()?;
//! println!("Mnemonic: {}", response.mnemonic.unwrap_or_default());
//! println!("Address: {}", response.keys.address);
//! ```

pub mod abi;
pub mod address;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod message;
pub mod types;
pub mod utils;
pub mod wallet;

// Re-export key types for convenience
pub use address::{eth_to_tron_address, tron_to_eth_address, Address};
pub use error::{ErrorCode, TronError, TronResult};
pub use types::*;

pub use crypto::ecdsa::{recover, sign, verify, Signature};
pub use crypto::keccak::keccak256;
pub use crypto::keys::{PrivateKey, PublicKey};
pub use message::{hash_message, sign_message, sign_transaction_id, transaction_id, verify_message};
pub use utils::config::CoreConfig;
pub use wallet::{
    create_new_wallet, restore_from_mnemonic, validate_mnemonic, HdNode, Mnemonic,
};
