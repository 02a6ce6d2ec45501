//! Function Selector and Event Topic Computation
//!
//! Selector = first 4 bytes of Keccak256 of the canonical signature.

use super::types::{split_top_level, AbiError, AbiType};
use crate::crypto::keccak::keccak256;

/// Split `name(type1,type2)` into the name and resolved types
///
/// Parameter names and data-location keywords are ignored, so
/// `transfer(address to, uint amount)` parses like `transfer(address,uint256)`.
pub fn parse_signature(signature: &str) -> Result<(String, Vec<AbiType>), AbiError> {
    let signature = signature.trim();
    let open = signature
        .find('(')
        .ok_or_else(|| AbiError::InvalidType(format!("Missing '(' in signature: {}", signature)))?;
    let params = signature[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| AbiError::InvalidType(format!("Missing ')' in signature: {}", signature)))?;

    let name = signature[..open].trim();
    let name = name.strip_prefix("function ").unwrap_or(name).trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
        return Err(AbiError::InvalidType(format!("Invalid function name: {:?}", name)));
    }

    if params.trim().is_empty() {
        return Ok((name.to_string(), Vec::new()));
    }

    let types = split_top_level(params)?
        .into_iter()
        .map(|param| AbiType::parse(strip_param_name(param)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((name.to_string(), types))
}

fn strip_param_name(param: &str) -> &str {
    if param.starts_with('(') || param.starts_with("tuple(") {
        return param;
    }
    param.split_whitespace().next().unwrap_or(param)
}

/// Canonical signature with normalized types, e.g. `uint` -> `uint256`
pub fn normalize_signature(signature: &str) -> Result<String, AbiError> {
    let (name, types) = parse_signature(signature)?;
    let params = types
        .iter()
        .map(|t| t.canonical_type())
        .collect::<Vec<_>>()
        .join(",");
    Ok(format!("{}({})", name, params))
}

/// 4-byte function selector
pub fn function_selector(signature: &str) -> Result<[u8; 4], AbiError> {
    let canonical = normalize_signature(signature)?;
    let hash = keccak256(canonical.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    Ok(selector)
}

/// Selector as lowercase hex without `0x`
pub fn function_selector_hex(signature: &str) -> Result<String, AbiError> {
    Ok(hex::encode(function_selector(signature)?))
}

/// Event topic (full 32-byte hash of the canonical signature)
pub fn event_topic(signature: &str) -> Result<[u8; 32], AbiError> {
    let canonical = normalize_signature(signature)?;
    Ok(keccak256(canonical.as_bytes()))
}

/// Well-known TRC-20 function selectors
pub struct KnownSelectors;

impl KnownSelectors {
    pub const TRANSFER: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];
    pub const APPROVE: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];
    pub const TRANSFER_FROM: [u8; 4] = [0x23, 0xb8, 0x72, 0xdd];
    pub const BALANCE_OF: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];
    pub const ALLOWANCE: [u8; 4] = [0xdd, 0x62, 0xed, 0x3e];
    pub const TOTAL_SUPPLY: [u8; 4] = [0x18, 0x16, 0x0d, 0xdd];
    pub const NAME: [u8; 4] = [0x06, 0xfd, 0xde, 0x03];
    pub const SYMBOL: [u8; 4] = [0x95, 0xd8, 0x9b, 0x41];
    pub const DECIMALS: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67];

    /// Name of a known selector, if any
    pub fn lookup(selector: &[u8]) -> Option<&'static str> {
        let table: [(&[u8; 4], &'static str); 9] = [
            (&Self::TRANSFER, "transfer(address,uint256)"),
            (&Self::APPROVE, "approve(address,uint256)"),
            (&Self::TRANSFER_FROM, "transferFrom(address,address,uint256)"),
            (&Self::BALANCE_OF, "balanceOf(address)"),
            (&Self::ALLOWANCE, "allowance(address,address)"),
            (&Self::TOTAL_SUPPLY, "totalSupply()"),
            (&Self::NAME, "name()"),
            (&Self::SYMBOL, "symbol()"),
            (&Self::DECIMALS, "decimals()"),
        ];
        table
            .iter()
            .find(|(known, _)| known.as_slice() == selector)
            .map(|(_, name)| *name)
    }
}

/// Well-known TRC-20 event topics
pub struct KnownTopics;

impl KnownTopics {
    /// Transfer(address,address,uint256)
    pub const TRANSFER: [u8; 32] = [
        0xdd, 0xf2, 0x52, 0xad, 0x1b, 0xe2, 0xc8, 0x9b, 0x69, 0xc2, 0xb0, 0x68, 0xfc, 0x37, 0x8d, 0xaa,
        0x95, 0x2b, 0xa7, 0xf1, 0x63, 0xc4, 0xa1, 0x16, 0x28, 0xf5, 0x5a, 0x4d, 0xf5, 0x23, 0xb3, 0xef,
    ];

    /// Approval(address,address,uint256)
    pub const APPROVAL: [u8; 32] = [
        0x8c, 0x5b, 0xe1, 0xe5, 0xeb, 0xec, 0x7d, 0x5b, 0xd1, 0x4f, 0x71, 0x42, 0x7d, 0x1e, 0x84, 0xf3,
        0xdd, 0x03, 0x14, 0xc0, 0xf7, 0xb2, 0x29, 0x1e, 0x5b, 0x20, 0x0a, 0xc8, 0xc7, 0xc3, 0xb9, 0x25,
    ];
}
