//! Cryptographic primitives for the TRON core
//!
//! - secp256k1 point arithmetic and ECDSA with recovery
//! - Keccak/SHA-3 sponge
//! - SHA-256, RIPEMD-160 and HMAC helpers

pub mod curves;
pub mod ecdsa;
pub mod hash;
pub mod keccak;
pub mod keys;

pub use curves::{Point, PublicKeyFormat, Secp256k1Curve, SignatureBackend};
pub use ecdsa::{NonceStrategy, SignOptions, Signature};
pub use keccak::keccak256;
pub use keys::{PrivateKey, PublicKey};
