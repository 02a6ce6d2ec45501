//! TRON Message and Transaction-ID Signing
//!
//! Message format: `"\x19TRON Signed Message:\n" + len(message) + message`,
//! hashed with Keccak256. Transaction ids are SHA-256 over the raw
//! transaction bytes. Both produce 65-byte `r || s || v` signatures, hex
//! encoded, with `v` in {27, 28}.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::crypto::curves::secp256k1::Secp256k1Curve;
use crate::crypto::curves::traits::SignatureBackend;
use crate::crypto::ecdsa::Signature;
use crate::crypto::hash::sha256;
use crate::crypto::keccak::keccak256;
use crate::crypto::keys::PrivateKey;
use crate::error::{ErrorCode, TronError, TronResult};
use crate::log_debug;
use crate::types::Network;

/// TRON message prefix
const TRON_MESSAGE_PREFIX: &str = "\x19TRON Signed Message:\n";

/// Keccak256 of the prefixed message
pub fn hash_message(message: &[u8]) -> [u8; 32] {
    let prefix = format!("{}{}", TRON_MESSAGE_PREFIX, message.len());
    let mut data = Vec::with_capacity(prefix.len() + message.len());
    data.extend_from_slice(prefix.as_bytes());
    data.extend_from_slice(message);
    keccak256(&data)
}

/// Transaction id: SHA-256 of the serialized `raw_data`
pub fn transaction_id(raw_data: &[u8]) -> [u8; 32] {
    sha256(raw_data)
}

/// Signature split into its parts for callers that need them separately
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSignature {
    /// 65 bytes `r || s || v`, hex without `0x`
    pub signature: String,
    pub r: String,
    pub s: String,
    /// Recovery id + 27
    pub v: u8,
}

impl From<&Signature> for MessageSignature {
    fn from(sig: &Signature) -> Self {
        let bytes = sig.to_bytes();
        Self {
            signature: hex::encode(bytes),
            r: hex::encode(sig.r()),
            s: hex::encode(sig.s()),
            v: bytes[64],
        }
    }
}

/// Signs and verifies through any [`SignatureBackend`]
pub struct MessageSigner<B: SignatureBackend> {
    backend: B,
}

/// Signer over the built-in secp256k1 engine
pub type DefaultMessageSigner = MessageSigner<Secp256k1Curve>;

impl Default for DefaultMessageSigner {
    fn default() -> Self {
        Self::new(Secp256k1Curve::default())
    }
}

impl<B: SignatureBackend> MessageSigner<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Sign a message with the TRON prefix
    pub fn sign_message(&self, message: &[u8], key: &PrivateKey) -> TronResult<MessageSignature> {
        let digest = hash_message(message);
        let signature = self.backend.sign_digest(&digest, key)?;
        log_debug!(
            "message",
            "Message signed",
            backend = self.backend.name(),
            digest = hex::encode(digest),
        );
        Ok(MessageSignature::from(&signature))
    }

    /// Address that produced `signature_hex` over `message`
    pub fn recover_message_signer(
        &self,
        message: &[u8],
        signature_hex: &str,
        network: Network,
    ) -> TronResult<Address> {
        let signature = Signature::from_hex(signature_hex)?;
        let public_key = self.backend.recover_public_key(&hash_message(message), &signature)?;
        Ok(Address::from_public_key(&public_key, network))
    }

    /// True when `signature_hex` over `message` recovers to `address`
    ///
    /// Malformed signatures or addresses are errors; a well-formed signature
    /// from someone else is `Ok(false)`.
    pub fn verify_message(&self, message: &[u8], signature_hex: &str, address: &str) -> TronResult<bool> {
        self.verify_digest_signer(&hash_message(message), signature_hex, address)
    }

    /// Sign a 32-byte transaction id given as hex
    pub fn sign_transaction_id(&self, txid_hex: &str, key: &PrivateKey) -> TronResult<MessageSignature> {
        let txid = parse_txid(txid_hex)?;
        let signature = self.backend.sign_digest(&txid, key)?;
        log_debug!("message", "Transaction id signed", txid = hex::encode(txid));
        Ok(MessageSignature::from(&signature))
    }

    /// True when `signature_hex` over the transaction id recovers to `address`
    pub fn verify_transaction_id(&self, txid_hex: &str, signature_hex: &str, address: &str) -> TronResult<bool> {
        self.verify_digest_signer(&parse_txid(txid_hex)?, signature_hex, address)
    }

    fn verify_digest_signer(&self, digest: &[u8; 32], signature_hex: &str, address: &str) -> TronResult<bool> {
        let expected = Address::parse(address)?;
        let signature = Signature::from_hex(signature_hex)?;
        match self.backend.recover_public_key(digest, &signature) {
            Ok(public_key) => {
                let recovered = Address::from_public_key(&public_key, expected.network());
                Ok(recovered == expected)
            }
            Err(e) if e.code == ErrorCode::InvalidSignature => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn parse_txid(txid_hex: &str) -> TronResult<[u8; 32]> {
    let trimmed = txid_hex.trim();
    let clean = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(clean)?;
    bytes.as_slice().try_into().map_err(|_| {
        TronError::invalid_input(format!("Transaction id must be 32 bytes, got {}", bytes.len()))
    })
}

/// Sign a message with the built-in backend, returning 65-byte hex
pub fn sign_message(message: &[u8], key: &PrivateKey) -> TronResult<String> {
    Ok(DefaultMessageSigner::default().sign_message(message, key)?.signature)
}

/// Verify a message signature against a TRON address
pub fn verify_message(message: &[u8], signature_hex: &str, address: &str) -> TronResult<bool> {
    DefaultMessageSigner::default().verify_message(message, signature_hex, address)
}

/// Sign a transaction id with the built-in backend, returning 65-byte hex
pub fn sign_transaction_id(txid_hex: &str, key: &PrivateKey) -> TronResult<String> {
    Ok(DefaultMessageSigner::default().sign_transaction_id(txid_hex, key)?.signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ecdsa::{NonceStrategy, SignOptions};

    const KEY_HEX: &str = "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35";

    fn key() -> PrivateKey {
        PrivateKey::from_hex(KEY_HEX).unwrap()
    }

    fn address() -> String {
        Address::from_private_key(&key(), Network::Mainnet).to_base58()
    }

    #[test]
    fn test_hash_message_prefix() {
        let expected = keccak256(b"\x19TRON Signed Message:\n5hello");
        assert_eq!(hash_message(b"hello"), expected);
        assert_ne!(hash_message(b"hello"), keccak256(b"\x19Ethereum Signed Message:\n5hello"));
    }

    #[test]
    fn test_sign_and_verify_message() {
        let signature = sign_message(b"hello tron", &key()).unwrap();
        assert_eq!(signature.len(), 130);
        let v = u8::from_str_radix(&signature[128..], 16).unwrap();
        assert!(v == 27 || v == 28);

        assert!(verify_message(b"hello tron", &signature, &address()).unwrap());
        assert!(!verify_message(b"hello tron!", &signature, &address()).unwrap());

        let other = Address::from_private_key(&PrivateKey::from_hex(&"11".repeat(32)).unwrap(), Network::Mainnet);
        assert!(!verify_message(b"hello tron", &signature, &other.to_base58()).unwrap());
    }

    #[test]
    fn test_signing_is_deterministic() {
        assert_eq!(
            sign_message(b"same", &key()).unwrap(),
            sign_message(b"same", &key()).unwrap()
        );
    }

    #[test]
    fn test_recover_signer() {
        let signer = DefaultMessageSigner::default();
        let signature = signer.sign_message(b"recover me", &key()).unwrap();
        let recovered = signer
            .recover_message_signer(b"recover me", &signature.signature, Network::Mainnet)
            .unwrap();
        assert_eq!(recovered.to_base58(), address());
        assert_eq!(signature.r.len(), 64);
        assert_eq!(signature.v - 27, Signature::from_hex(&signature.signature).unwrap().recovery_id());
    }

    #[test]
    fn test_hex_address_accepted() {
        let signature = sign_message(b"hex form", &key()).unwrap();
        let hex_address = Address::from_private_key(&key(), Network::Mainnet).to_hex();
        assert!(verify_message(b"hex form", &signature, &hex_address).unwrap());
    }

    #[test]
    fn test_legacy_testnet_base58_address_verifies() {
        let testnet = Address::from_private_key(&key(), Network::LegacyTestnet).to_base58();
        assert!(testnet.starts_with("27"));

        let signature = sign_message(b"testnet", &key()).unwrap();
        assert!(verify_message(b"testnet", &signature, &testnet).unwrap());
        assert!(!verify_message(b"mainnet", &signature, &testnet).unwrap());

        let txid = hex::encode(transaction_id(b"testnet tx"));
        let tx_signature = sign_transaction_id(&txid, &key()).unwrap();
        let signer = DefaultMessageSigner::default();
        assert!(signer.verify_transaction_id(&txid, &tx_signature, &testnet).unwrap());
    }

    #[test]
    fn test_malformed_inputs_are_errors() {
        let signature = sign_message(b"x", &key()).unwrap();
        assert!(verify_message(b"x", &signature[..128], &address()).is_err());
        assert!(verify_message(b"x", &signature, "not-an-address").is_err());

        let zero_r = format!("{}{}", "00".repeat(32), &signature[64..]);
        let err = verify_message(b"x", &zero_r, &address()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidScalarRange);
    }

    #[test]
    fn test_transaction_id_signing() {
        let txid = hex::encode(transaction_id(b"raw transaction bytes"));
        let signature = sign_transaction_id(&txid, &key()).unwrap();

        let signer = DefaultMessageSigner::default();
        assert!(signer.verify_transaction_id(&txid, &signature, &address()).unwrap());

        let other_txid = hex::encode(transaction_id(b"other bytes"));
        assert!(!signer.verify_transaction_id(&other_txid, &signature, &address()).unwrap());

        let err = sign_transaction_id("abcd", &key()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_random_nonce_backend() {
        let backend = Secp256k1Curve::new(SignOptions {
            canonical: true,
            nonce: NonceStrategy::Random,
        });
        let signer = MessageSigner::new(backend);
        let signature = signer.sign_message(b"random k", &key()).unwrap();
        assert!(signer.verify_message(b"random k", &signature.signature, &address()).unwrap());
        assert!(Signature::from_hex(&signature.signature).unwrap().is_low_s());
    }
}
