//! BIP-32 hierarchical deterministic keys
//!
//! A node is a key plus a 32-byte chain code. Children are derived with
//! HMAC-SHA512 keyed by the parent chain code; the left half tweaks the
//! parent key and the right half becomes the child chain code. Nodes are
//! immutable: derivation always returns a new node.

use std::fmt;

use num_bigint::BigUint;
use zeroize::Zeroizing;

use crate::address::Address;
use crate::crypto::curves::field::add_mod;
use crate::crypto::curves::params::CURVE;
use crate::crypto::curves::point::Point;
use crate::crypto::hash::{hash160, hmac_sha512};
use crate::crypto::keys::{PrivateKey, PublicKey};
use crate::encoding::base58;
use crate::error::{TronError, TronResult};
use crate::log_warn;
use crate::types::Network;

use super::derivation_path::{parse_path, DerivationPath, HARDENED};

/// HMAC key for master node generation
pub const MASTER_SEED_KEY: &[u8] = b"Bitcoin seed";

/// Version bytes of mainnet `xprv` strings
pub const XPRV_VERSION: [u8; 4] = [0x04, 0x88, 0xad, 0xe4];
/// Version bytes of mainnet `xpub` strings
pub const XPUB_VERSION: [u8; 4] = [0x04, 0x88, 0xb2, 0x1e];

const EXTENDED_KEY_LEN: usize = 78;

#[derive(Clone)]
enum NodeKey {
    Private(PrivateKey),
    Public(PublicKey),
}

#[derive(Clone)]
pub struct HdNode {
    key: NodeKey,
    public_key: PublicKey,
    chain_code: Zeroizing<[u8; 32]>,
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
}

impl HdNode {
    /// Master node from a BIP-39 (or raw) seed of 16 to 64 bytes
    pub fn from_seed(seed: &[u8]) -> TronResult<Self> {
        if !(16..=64).contains(&seed.len()) {
            return Err(TronError::invalid_input(format!(
                "Seed must be 16 to 64 bytes, got {}",
                seed.len()
            )));
        }

        let i = Zeroizing::new(hmac_sha512(MASTER_SEED_KEY, &[seed])?);
        let key = PrivateKey::from_bytes(&i[..32])
            .map_err(|_| TronError::invalid_scalar("Seed produced an invalid master key"))?;
        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&i[32..]);

        Ok(Self::private_node(key, chain_code, 0, [0u8; 4], 0))
    }

    fn private_node(
        key: PrivateKey,
        chain_code: Zeroizing<[u8; 32]>,
        depth: u8,
        parent_fingerprint: [u8; 4],
        child_number: u32,
    ) -> Self {
        let public_key = key.public_key();
        Self {
            key: NodeKey::Private(key),
            public_key,
            chain_code,
            depth,
            parent_fingerprint,
            child_number,
        }
    }

    /// Derive one child; `index >= 2^31` is hardened
    pub fn derive_child(&self, index: u32) -> TronResult<Self> {
        let depth = self.depth.checked_add(1).ok_or_else(|| {
            TronError::invalid_path("Derivation depth exceeds 255")
        })?;
        let hardened = index >= HARDENED;
        let index_be = index.to_be_bytes();

        let i = match (&self.key, hardened) {
            (NodeKey::Private(key), true) => {
                let secret = Zeroizing::new(key.to_bytes());
                hmac_sha512(&self.chain_code[..], &[&[0x00u8][..], &secret[..], &index_be[..]])?
            }
            (_, false) => hmac_sha512(
                &self.chain_code[..],
                &[&self.public_key.to_compressed()[..], &index_be[..]],
            )?,
            (NodeKey::Public(_), true) => {
                return Err(TronError::invalid_path(
                    "Hardened derivation requires a private key",
                ))
            }
        };
        let i = Zeroizing::new(i);

        let tweak = BigUint::from_bytes_be(&i[..32]);
        if tweak >= CURVE.n {
            log_warn!("hd", "Derived tweak is not below the curve order", index = index);
            return Err(TronError::invalid_scalar("Child key tweak is not below n")
                .with_details(format!("index {}", index)));
        }
        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&i[32..]);
        let parent_fingerprint = self.fingerprint();

        match &self.key {
            NodeKey::Private(key) => {
                let child_scalar = add_mod(&tweak, &key.scalar(), &CURVE.n);
                let child = PrivateKey::from_scalar(&child_scalar).map_err(|e| {
                    log_warn!("hd", "Derived child key is zero", index = index);
                    e.with_details(format!("index {}", index))
                })?;
                Ok(Self::private_node(child, chain_code, depth, parent_fingerprint, index))
            }
            NodeKey::Public(parent) => {
                let point = Point::mul_base(&tweak).add(parent.point());
                let public_key = PublicKey::from_point(point).map_err(|_| {
                    log_warn!("hd", "Derived child point is the identity", index = index);
                    TronError::invalid_scalar("Derived child public key is the identity")
                        .with_details(format!("index {}", index))
                })?;
                Ok(Self {
                    key: NodeKey::Public(public_key.clone()),
                    public_key,
                    chain_code,
                    depth,
                    parent_fingerprint,
                    child_number: index,
                })
            }
        }
    }

    /// Fold `derive_child` over every component of `path`
    pub fn derive_path(&self, path: &DerivationPath) -> TronResult<Self> {
        path.indices()
            .try_fold(self.clone(), |node, index| node.derive_child(index))
    }

    /// Parse `path` (e.g. `m/44'/195'/0'/0/0`) and derive it
    pub fn derive_path_str(&self, path: &str) -> TronResult<Self> {
        self.derive_path(&parse_path(path)?)
    }

    /// Drop the private key, keeping only public derivation ability
    pub fn neuter(&self) -> Self {
        Self {
            key: NodeKey::Public(self.public_key.clone()),
            public_key: self.public_key.clone(),
            chain_code: self.chain_code.clone(),
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number,
        }
    }

    pub fn is_neutered(&self) -> bool {
        matches!(self.key, NodeKey::Public(_))
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        match &self.key {
            NodeKey::Private(key) => Some(key),
            NodeKey::Public(_) => None,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    /// First four bytes of HASH160 of the compressed public key
    pub fn fingerprint(&self) -> [u8; 4] {
        let id = hash160(&self.public_key.to_compressed());
        [id[0], id[1], id[2], id[3]]
    }

    pub fn address(&self, network: Network) -> Address {
        Address::from_public_key(&self.public_key, network)
    }

    /// Base58Check `xprv...` (or `xpub...` for neutered nodes)
    pub fn to_extended_key(&self) -> String {
        let mut data = Zeroizing::new(Vec::with_capacity(EXTENDED_KEY_LEN));
        let version = if self.is_neutered() { XPUB_VERSION } else { XPRV_VERSION };
        data.extend_from_slice(&version);
        data.push(self.depth);
        data.extend_from_slice(&self.parent_fingerprint);
        data.extend_from_slice(&self.child_number.to_be_bytes());
        data.extend_from_slice(&self.chain_code[..]);
        match &self.key {
            NodeKey::Private(key) => {
                data.push(0x00);
                data.extend_from_slice(&key.to_bytes());
            }
            NodeKey::Public(key) => data.extend_from_slice(&key.to_compressed()),
        }
        base58::check_encode(&data)
    }

    /// Parse an `xprv` or `xpub` string
    pub fn from_extended_key(encoded: &str) -> TronResult<Self> {
        let data = Zeroizing::new(base58::check_decode(encoded.trim())?);
        if data.len() != EXTENDED_KEY_LEN {
            return Err(TronError::invalid_input(format!(
                "Extended key must be {} bytes, got {}",
                EXTENDED_KEY_LEN,
                data.len()
            )));
        }

        let depth = data[4];
        let parent_fingerprint = [data[5], data[6], data[7], data[8]];
        let child_number = u32::from_be_bytes([data[9], data[10], data[11], data[12]]);
        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&data[13..45]);
        let key_data = &data[45..];

        if data[..4] == XPRV_VERSION {
            if key_data[0] != 0x00 {
                return Err(TronError::invalid_input("Extended private key must start with 0x00"));
            }
            let key = PrivateKey::from_bytes(&key_data[1..])?;
            Ok(Self::private_node(key, chain_code, depth, parent_fingerprint, child_number))
        } else if data[..4] == XPUB_VERSION {
            let public_key = PublicKey::from_bytes(key_data)?;
            Ok(Self {
                key: NodeKey::Public(public_key.clone()),
                public_key,
                chain_code,
                depth,
                parent_fingerprint,
                child_number,
            })
        } else {
            Err(TronError::invalid_input("Unknown extended key version"))
        }
    }
}

impl fmt::Debug for HdNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HdNode")
            .field("depth", &self.depth)
            .field("child_number", &self.child_number)
            .field("public_key", &self.public_key.to_compressed_hex())
            .field("private", &!self.is_neutered())
            .finish_non_exhaustive()
    }
}

/// Master node from a seed, then derive `path`
pub fn derive_from_seed(seed: &[u8], path: &DerivationPath) -> TronResult<HdNode> {
    HdNode::from_seed(seed)?.derive_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::wallet::mnemonic::mnemonic_to_seed;

    const SEED_1: &str = "000102030405060708090a0b0c0d0e0f";

    fn master() -> HdNode {
        HdNode::from_seed(&hex::decode(SEED_1).unwrap()).unwrap()
    }

    #[test]
    fn test_vector_1_master() {
        let node = master();
        assert_eq!(
            hex::encode(node.chain_code()),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
        assert_eq!(
            node.private_key().unwrap().to_hex(),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            node.public_key().to_compressed_hex(),
            "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2"
        );
        assert_eq!(
            node.to_extended_key(),
            "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi"
        );
        assert_eq!(
            node.neuter().to_extended_key(),
            "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8"
        );
    }

    #[test]
    fn test_vector_1_children() {
        let hardened = master().derive_path_str("m/0'").unwrap();
        assert_eq!(
            hex::encode(hardened.chain_code()),
            "47fdacbd0f1097043b78c63c20c34ef4ed9a111d980047ad16282c7ae6236141"
        );
        assert_eq!(
            hardened.private_key().unwrap().to_hex(),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
        assert_eq!(
            hardened.public_key().to_compressed_hex(),
            "035a784662a4a20a65bf6aab9ae98a6c068a81c52e4b032c0fb5400c706cfccc56"
        );
        assert_eq!(hardened.parent_fingerprint(), master().fingerprint());

        let normal = hardened.derive_child(1).unwrap();
        assert_eq!(
            hex::encode(normal.chain_code()),
            "2a7857631386ba23dacac34180dd1983734e444fdbf774041578e9b6adb37c19"
        );
        assert_eq!(
            normal.private_key().unwrap().to_hex(),
            "3c6cb8d0f6a264c91ea8b5030fadaa8e538b020f0a387421a12de9319dc93368"
        );
        assert_eq!(
            normal.public_key().to_compressed_hex(),
            "03501e454bf00751f24b1b489aa925215d66af2234e3891c3b21a52bedb3cd711c"
        );
        assert_eq!(normal.depth(), 2);
        assert_eq!(normal.child_number(), 1);
    }

    #[test]
    fn test_master_fingerprint() {
        assert_eq!(hex::encode(master().fingerprint()), "3442193e");
    }

    #[test]
    fn test_public_derivation_matches_private() {
        let parent = master().derive_path_str("m/0'").unwrap();
        let from_private = parent.derive_child(1).unwrap();
        let from_public = parent.neuter().derive_child(1).unwrap();

        assert!(from_public.is_neutered());
        assert!(from_public.private_key().is_none());
        assert_eq!(from_public.public_key(), from_private.public_key());
        assert_eq!(from_public.chain_code(), from_private.chain_code());
        assert_eq!(from_public.to_extended_key(), from_private.neuter().to_extended_key());
    }

    #[test]
    fn test_hardened_from_neutered_fails() {
        let err = master().neuter().derive_child(HARDENED).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDerivationPath);
    }

    #[test]
    fn test_tron_paths_differ() {
        let seed = mnemonic_to_seed(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
            "",
        )
        .unwrap();
        let root = HdNode::from_seed(&seed[..]).unwrap();
        let first = root.derive_path(&DerivationPath::tron(0, 0)).unwrap();
        let again = root.derive_path_str("m/44'/195'/0'/0/0").unwrap();
        let second = root.derive_path(&DerivationPath::tron(0, 1)).unwrap();

        assert_eq!(first.private_key(), again.private_key());
        assert_ne!(first.private_key(), second.private_key());
        assert_eq!(first.depth(), 5);
        assert!(first.address(Network::Mainnet).to_base58().starts_with('T'));
    }

    #[test]
    fn test_extended_key_roundtrip() {
        let node = master().derive_path_str("m/0'/1").unwrap();
        let parsed = HdNode::from_extended_key(&node.to_extended_key()).unwrap();
        assert_eq!(parsed.private_key(), node.private_key());
        assert_eq!(parsed.chain_code(), node.chain_code());
        assert_eq!(parsed.depth(), 2);

        let public = HdNode::from_extended_key(&node.neuter().to_extended_key()).unwrap();
        assert!(public.is_neutered());
        assert_eq!(public.public_key(), node.public_key());
    }

    #[test]
    fn test_seed_length_checked() {
        assert_eq!(HdNode::from_seed(&[1u8; 15]).unwrap_err().code, ErrorCode::InvalidInput);
        assert_eq!(HdNode::from_seed(&[1u8; 65]).unwrap_err().code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_master_path_is_identity() {
        let node = master().derive_path_str("m").unwrap();
        assert_eq!(node.private_key(), master().private_key());
    }

    #[test]
    fn test_debug_hides_private_key() {
        let node = master();
        let debug = format!("{:?}", node);
        assert!(!debug.contains("e8f32e72"));
    }
}
