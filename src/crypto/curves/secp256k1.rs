//! Built-in secp256k1 signer
//!
//! Pure Rust backend over the big-integer point engine in this module.
//! Nonce and low-S behaviour come from [`SignOptions`].

use super::traits::SignatureBackend;
use crate::crypto::ecdsa::{self, SignOptions, Signature};
use crate::crypto::keys::{PrivateKey, PublicKey};
use crate::error::TronResult;
use crate::utils::config::CoreConfig;

/// secp256k1 signer backed by the in-crate curve arithmetic
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Curve {
    options: SignOptions,
}

impl Secp256k1Curve {
    pub fn new(options: SignOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(SignOptions {
            canonical: config.canonical_signatures,
            nonce: config.nonce,
        })
    }

    pub fn options(&self) -> SignOptions {
        self.options
    }
}

impl SignatureBackend for Secp256k1Curve {
    fn name(&self) -> &'static str {
        "secp256k1-builtin"
    }

    fn public_key(&self, private_key: &PrivateKey) -> TronResult<PublicKey> {
        Ok(private_key.public_key())
    }

    fn sign_digest(&self, digest: &[u8; 32], private_key: &PrivateKey) -> TronResult<Signature> {
        ecdsa::sign_with(digest, private_key, self.options)
    }

    fn verify_digest(
        &self,
        digest: &[u8; 32],
        signature: &Signature,
        public_key: &PublicKey,
    ) -> TronResult<bool> {
        ecdsa::verify(digest, signature, public_key)
    }

    fn recover_public_key(&self, digest: &[u8; 32], signature: &Signature) -> TronResult<PublicKey> {
        ecdsa::recover(digest, signature)
    }
}
