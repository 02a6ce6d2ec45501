//! Signature backend trait
//!
//! Message signing and key derivation are written against this trait so a
//! different secp256k1 implementation (hardware signer, native library)
//! can stand in for the built-in engine.

use crate::crypto::ecdsa::Signature;
use crate::crypto::keys::{PrivateKey, PublicKey};
use crate::error::TronResult;

/// Core operations of a recoverable secp256k1 signer
pub trait SignatureBackend {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Derive the public key of `private_key`
    fn public_key(&self, private_key: &PrivateKey) -> TronResult<PublicKey>;

    /// Sign a 32-byte digest, returning a signature with recovery id
    fn sign_digest(&self, digest: &[u8; 32], private_key: &PrivateKey) -> TronResult<Signature>;

    /// Verify a signature over a 32-byte digest
    fn verify_digest(
        &self,
        digest: &[u8; 32],
        signature: &Signature,
        public_key: &PublicKey,
    ) -> TronResult<bool>;

    /// Recover the signer from a digest and signature
    fn recover_public_key(&self, digest: &[u8; 32], signature: &Signature) -> TronResult<PublicKey>;
}

/// Public key encoding formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicKeyFormat {
    /// 33 bytes, 0x02/0x03 prefix
    Compressed,
    /// 65 bytes, 0x04 prefix
    Uncompressed,
}

impl PublicKeyFormat {
    pub fn encode(&self, key: &PublicKey) -> Vec<u8> {
        match self {
            Self::Compressed => key.to_compressed().to_vec(),
            Self::Uncompressed => key.to_uncompressed().to_vec(),
        }
    }
}
