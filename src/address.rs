//! TRON addresses
//!
//! An address is the network prefix byte followed by the last 20 bytes of
//! Keccak256 over the 64-byte uncompressed public key (without its 0x04
//! tag). It is shown either as 42 hex characters (`41...`) or as
//! Base58Check (`T...`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::keccak::keccak256;
use crate::crypto::keys::{PrivateKey, PublicKey};
use crate::encoding::base58;
use crate::error::{TronError, TronResult};
use crate::types::Network;

/// Prefix byte plus 20-byte account hash
pub const ADDRESS_LEN: usize = 21;
/// Length of a Base58Check address string
pub const BASE58_ADDRESS_LEN: usize = 34;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub fn from_public_key(public_key: &PublicKey, network: Network) -> Self {
        let uncompressed = public_key.to_uncompressed();
        let hash = keccak256(&uncompressed[1..]);
        let mut body = [0u8; 20];
        body.copy_from_slice(&hash[12..]);
        Self::from_evm_bytes(body, network)
    }

    pub fn from_private_key(private_key: &PrivateKey, network: Network) -> Self {
        Self::from_public_key(&private_key.public_key(), network)
    }

    /// Attach a network prefix to a 20-byte EVM-style account hash
    pub fn from_evm_bytes(body: [u8; 20], network: Network) -> Self {
        let mut raw = [0u8; ADDRESS_LEN];
        raw[0] = network.prefix();
        raw[1..].copy_from_slice(&body);
        Self(raw)
    }

    /// Parse a `0x`-prefixed or bare 40-hex EVM address
    pub fn from_evm_hex(evm: &str, network: Network) -> TronResult<Self> {
        let clean = evm.trim().strip_prefix("0x").unwrap_or(evm.trim());
        let bytes = hex::decode(clean)?;
        let body: [u8; 20] = bytes.as_slice().try_into().map_err(|_| {
            TronError::invalid_address(format!("EVM address must be 20 bytes, got {}", bytes.len()))
        })?;
        Ok(Self::from_evm_bytes(body, network))
    }

    /// Validate raw bytes: 21 bytes with a known prefix
    pub fn from_bytes(bytes: &[u8]) -> TronResult<Self> {
        let raw: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            TronError::invalid_address(format!(
                "Address must be {} bytes, got {}",
                ADDRESS_LEN,
                bytes.len()
            ))
        })?;
        if Network::from_prefix(raw[0]).is_none() {
            return Err(TronError::invalid_address(format!(
                "Unknown address prefix 0x{:02x}",
                raw[0]
            )));
        }
        Ok(Self(raw))
    }

    /// Parse the 42-character hex form, `0x` optional
    pub fn from_hex(hex_str: &str) -> TronResult<Self> {
        let trimmed = hex_str.trim();
        let clean = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(clean)
            .map_err(|e| TronError::invalid_address(format!("Invalid address hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Parse the Base58Check form
    pub fn from_base58(s: &str) -> TronResult<Self> {
        let payload = base58::check_decode(s.trim())?;
        Self::from_bytes(&payload)
    }

    /// Accept either textual form
    ///
    /// 42 hex characters (optionally `0x`-prefixed) are read as hex;
    /// anything else goes through Base58Check, whose length differs by
    /// prefix (`T...` is 34 characters, `27...` is 35).
    pub fn parse(s: &str) -> TronResult<Self> {
        let trimmed = s.trim();
        let unprefixed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if unprefixed.len() == ADDRESS_LEN * 2 && unprefixed.bytes().all(|b| b.is_ascii_hexdigit()) {
            Self::from_hex(unprefixed)
        } else {
            Self::from_base58(trimmed)
        }
    }

    /// True when `s` parses as an address in either form
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    pub fn network(&self) -> Network {
        // Constructors only admit known prefixes
        Network::from_prefix(self.0[0]).unwrap_or_default()
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// The 20-byte account hash without the prefix
    pub fn evm_bytes(&self) -> [u8; 20] {
        let mut body = [0u8; 20];
        body.copy_from_slice(&self.0[1..]);
        body
    }

    /// `0x`-prefixed EVM form of the account hash
    pub fn to_evm_hex(&self) -> String {
        format!("0x{}", hex::encode(self.evm_bytes()))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_base58(&self) -> String {
        base58::check_encode(&self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl FromStr for Address {
    type Err = TronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Convert an EVM hex address to a mainnet Base58 TRON address
pub fn eth_to_tron_address(eth_address: &str) -> TronResult<String> {
    Ok(Address::from_evm_hex(eth_address, Network::Mainnet)?.to_base58())
}

/// Convert any TRON address form to its `0x` EVM hex
pub fn tron_to_eth_address(tron_address: &str) -> TronResult<String> {
    Ok(Address::parse(tron_address)?.to_evm_hex())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_known_contract_address() {
        // USDT TRC-20 contract
        let addr = Address::from_hex("41a614f803b6fd780986a42c78ec9c7f77e6ded13c").unwrap();
        assert_eq!(addr.to_base58(), "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t");
        assert_eq!(Address::from_base58("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t").unwrap(), addr);
    }

    #[test]
    fn test_zero_address() {
        let addr = Address::from_evm_bytes([0u8; 20], Network::Mainnet);
        assert_eq!(addr.to_base58(), "T9yD14Nj9j7xAB4dbGeiX9h8unkKHxuWwb");
        assert_eq!(
            eth_to_tron_address("0x0000000000000000000000000000000000000000").unwrap(),
            "T9yD14Nj9j7xAB4dbGeiX9h8unkKHxuWwb"
        );
    }

    #[test]
    fn test_known_private_key_addresses() {
        // Secret 1: the account hash equals Ethereum's 0x7e5f...5bdf
        let one = PrivateKey::from_hex(&format!("{}01", "00".repeat(31))).unwrap();
        let addr = Address::from_private_key(&one, Network::Mainnet);
        assert_eq!(addr.to_hex(), "417e5f4552091a69125d5dfcb7b8c2659029395bdf");
        assert_eq!(addr.to_base58(), "TMVQGm1qAQYVdetCeGRRkTWYYrLXuHK2HC");
        assert_eq!(addr.to_evm_hex(), "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");

        let key = PrivateKey::from_hex("e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35").unwrap();
        let addr = Address::from_private_key(&key, Network::Mainnet);
        assert_eq!(addr.to_hex(), "41056db290f8ba3250ca64a45d16284d04bc6f5fbf");
        assert_eq!(addr.to_base58(), "TATunwEDpE8mCD9Dih5BWyUfShkgVgoH25");
        assert_eq!(addr.to_base58().len(), BASE58_ADDRESS_LEN);
    }

    #[test]
    fn test_legacy_testnet_prefix() {
        let key = PrivateKey::from_hex("e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35").unwrap();
        let addr = Address::from_private_key(&key, Network::LegacyTestnet);
        assert_eq!(addr.to_hex(), "a0056db290f8ba3250ca64a45d16284d04bc6f5fbf");
        assert_eq!(addr.to_base58(), "27PaDLFYbGN9ztPPT3YiTatLQEdEJ2xsfWM");
        assert_eq!(addr.to_base58().len(), 35);
        assert_eq!(addr.network(), Network::LegacyTestnet);

        assert_eq!(Address::parse(&addr.to_base58()).unwrap(), addr);
        assert_eq!(Address::parse(&addr.to_hex()).unwrap(), addr);
        assert_eq!(addr.to_base58().parse::<Address>().unwrap(), addr);
        assert!(Address::is_valid("27PaDLFYbGN9ztPPT3YiTatLQEdEJ2xsfWM"));
        assert_eq!(
            tron_to_eth_address("27PaDLFYbGN9ztPPT3YiTatLQEdEJ2xsfWM").unwrap(),
            "0x056db290f8ba3250ca64a45d16284d04bc6f5fbf"
        );

        let json = serde_json::to_string(&addr).unwrap();
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_parse_picks_form_by_content() {
        let addr = Address::from_hex("41a614f803b6fd780986a42c78ec9c7f77e6ded13c").unwrap();
        assert_eq!(Address::parse("0x41a614f803b6fd780986a42c78ec9c7f77e6ded13c").unwrap(), addr);
        assert_eq!(Address::parse("  TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t ").unwrap(), addr);
        // Wrong length hex falls through to Base58 and fails there
        assert!(Address::parse("41a614f803b6fd780986a42c78ec9c7f77e6ded1").is_err());
        assert!(Address::parse("0xzz").is_err());
    }

    #[test]
    fn test_evm_roundtrip() {
        let evm = "0xa614f803b6fd780986a42c78ec9c7f77e6ded13c";
        let tron = eth_to_tron_address(evm).unwrap();
        assert_eq!(tron_to_eth_address(&tron).unwrap(), evm);
    }

    #[test]
    fn test_validation() {
        assert!(Address::is_valid("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"));
        assert!(Address::is_valid("0x41a614f803b6fd780986a42c78ec9c7f77e6ded13c"));
        assert!(!Address::is_valid("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6u"));
        assert!(!Address::is_valid("42a614f803b6fd780986a42c78ec9c7f77e6ded13c"));
        assert!(!Address::is_valid(""));

        let err = Address::from_base58("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6u").unwrap_err();
        assert_eq!(err.code, ErrorCode::ChecksumMismatch);
    }

    #[test]
    fn test_serde_as_base58() {
        let addr = Address::from_hex("41a614f803b6fd780986a42c78ec9c7f77e6ded13c").unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
