//! ABI type definitions for TRON (TVM) contracts

use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, BigUint};
use num_traits::Num;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;
use crate::types::Network;

/// Solidity types, resolved once from their textual form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// `uintN`, N in 8..=256 step 8
    Uint(usize),
    /// `intN`, N in 8..=256 step 8
    Int(usize),
    Address,
    Bool,
    /// `bytesN`, N in 1..=32
    FixedBytes(usize),
    Bytes,
    String,
    /// `T[]`
    Array(Box<AbiType>),
    /// `T[N]`
    FixedArray(Box<AbiType>, usize),
    /// `(T1,T2,...)`
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// Check if the type is dynamic (requires offset encoding)
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(inner, _) => inner.is_dynamic(),
            AbiType::Tuple(components) => components.iter().any(|t| t.is_dynamic()),
            _ => false,
        }
    }

    /// Bytes this type occupies in the head of an enclosing tuple
    ///
    /// Fails with `InvalidType` when a fixed-array size overflows `usize`.
    pub fn head_size(&self) -> Result<usize, AbiError> {
        let overflow = || AbiError::InvalidType(format!("Type too large: {}", self.canonical_type()));
        match self {
            AbiType::Tuple(components) if !self.is_dynamic() => {
                components.iter().try_fold(0usize, |total, t| {
                    total.checked_add(t.head_size()?).ok_or_else(overflow)
                })
            }
            AbiType::FixedArray(inner, size) if !self.is_dynamic() => {
                inner.head_size()?.checked_mul(*size).ok_or_else(overflow)
            }
            _ => Ok(32),
        }
    }

    /// Head bytes of a tuple of `types`
    pub(crate) fn tuple_head_size(types: &[AbiType]) -> Result<usize, AbiError> {
        types.iter().try_fold(0usize, |total, t| {
            total
                .checked_add(t.head_size()?)
                .ok_or_else(|| AbiError::InvalidType("Tuple head too large".to_string()))
        })
    }

    /// Canonical spelling used in function signatures (`uint` -> `uint256`)
    pub fn canonical_type(&self) -> String {
        match self {
            AbiType::Uint(bits) => format!("uint{}", bits),
            AbiType::Int(bits) => format!("int{}", bits),
            AbiType::Address => "address".to_string(),
            AbiType::Bool => "bool".to_string(),
            AbiType::FixedBytes(size) => format!("bytes{}", size),
            AbiType::Bytes => "bytes".to_string(),
            AbiType::String => "string".to_string(),
            AbiType::Array(inner) => format!("{}[]", inner.canonical_type()),
            AbiType::FixedArray(inner, size) => format!("{}[{}]", inner.canonical_type(), size),
            AbiType::Tuple(components) => {
                let inner = components
                    .iter()
                    .map(|t| t.canonical_type())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("({})", inner)
            }
        }
    }

    /// Parse type from string representation
    pub fn parse(s: &str) -> Result<Self, AbiError> {
        let s = s.trim();

        // Arrays bind loosest: `(uint256,bool)[2][]` is an array of arrays of tuples
        if let Some(inner) = s.strip_suffix("[]") {
            return Ok(AbiType::Array(Box::new(Self::parse(inner)?)));
        }
        if s.ends_with(']') {
            let idx = s
                .rfind('[')
                .ok_or_else(|| AbiError::InvalidType(format!("Unbalanced brackets: {}", s)))?;
            let size_str = &s[idx + 1..s.len() - 1];
            let size: usize = size_str
                .parse()
                .map_err(|_| AbiError::InvalidType(format!("Invalid array size: {}", size_str)))?;
            if size == 0 {
                return Err(AbiError::InvalidType("Fixed array size must be positive".to_string()));
            }
            let inner = Self::parse(&s[..idx])?;
            return Ok(AbiType::FixedArray(Box::new(inner), size));
        }

        let tuple_body = s
            .strip_prefix("tuple(")
            .or_else(|| s.strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'));
        if let Some(inner) = tuple_body {
            return Ok(AbiType::Tuple(Self::parse_tuple_components(inner)?));
        }

        match s {
            "address" => Ok(AbiType::Address),
            "bool" => Ok(AbiType::Bool),
            "bytes" => Ok(AbiType::Bytes),
            "string" => Ok(AbiType::String),
            // TVM token id
            "trcToken" => Ok(AbiType::Uint(256)),
            "uint" => Ok(AbiType::Uint(256)),
            "int" => Ok(AbiType::Int(256)),
            _ => {
                if let Some(bits) = s.strip_prefix("uint") {
                    Ok(AbiType::Uint(Self::parse_bits(bits, s)?))
                } else if let Some(bits) = s.strip_prefix("int") {
                    Ok(AbiType::Int(Self::parse_bits(bits, s)?))
                } else if let Some(size) = s.strip_prefix("bytes") {
                    let size: usize = size
                        .parse()
                        .map_err(|_| AbiError::InvalidType(format!("Unknown type: {}", s)))?;
                    if size == 0 || size > 32 {
                        return Err(AbiError::InvalidType(format!("bytes size must be 1-32: {}", size)));
                    }
                    Ok(AbiType::FixedBytes(size))
                } else {
                    Err(AbiError::InvalidType(format!("Unknown type: {}", s)))
                }
            }
        }
    }

    fn parse_bits(bits: &str, full: &str) -> Result<usize, AbiError> {
        let bits: usize = bits
            .parse()
            .map_err(|_| AbiError::InvalidType(format!("Unknown type: {}", full)))?;
        if bits == 0 || bits > 256 || bits % 8 != 0 {
            return Err(AbiError::InvalidType(format!(
                "Integer width must be a multiple of 8 in 8-256: {}",
                full
            )));
        }
        Ok(bits)
    }

    /// Split on top-level commas, handling nested parentheses
    pub(crate) fn parse_tuple_components(s: &str) -> Result<Vec<AbiType>, AbiError> {
        if s.trim().is_empty() {
            return Ok(Vec::new());
        }
        split_top_level(s)?
            .into_iter()
            .map(Self::parse)
            .collect()
    }
}

/// Split `a,(b,c),d` into `["a", "(b,c)", "d"]`
pub(crate) fn split_top_level(s: &str) -> Result<Vec<&str>, AbiError> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(AbiError::InvalidType(format!("Unbalanced parentheses: {}", s)));
                }
            }
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(AbiError::InvalidType(format!("Unbalanced parentheses: {}", s)));
    }
    parts.push(s[start..].trim());

    if parts.iter().any(|p| p.is_empty()) {
        return Err(AbiError::InvalidType(format!("Empty type in list: {}", s)));
    }
    Ok(parts)
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_type())
    }
}

impl FromStr for AbiType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AbiType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical_type())
    }
}

impl<'de> Deserialize<'de> for AbiType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// ABI value - runtime representation of Solidity values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(BigUint),
    Int(BigInt),
    /// 20-byte account hash, without the TRON prefix byte
    Address([u8; 20]),
    Bool(bool),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    /// Dynamic or fixed-size array
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    pub fn uint(value: u64) -> Self {
        AbiValue::Uint(BigUint::from(value))
    }

    pub fn int(value: i64) -> Self {
        AbiValue::Int(BigInt::from(value))
    }

    /// Unsigned integer from decimal or `0x` hex text
    pub fn uint_from_str(s: &str) -> Result<Self, AbiError> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex_digits) => BigUint::from_str_radix(hex_digits, 16),
            None => BigUint::from_str_radix(s, 10),
        };
        parsed
            .map(AbiValue::Uint)
            .map_err(|_| AbiError::InvalidValue(format!("Invalid unsigned integer: {}", s)))
    }

    /// Signed decimal integer, optionally negative
    pub fn int_from_str(s: &str) -> Result<Self, AbiError> {
        BigInt::from_str_radix(s.trim(), 10)
            .map(AbiValue::Int)
            .map_err(|_| AbiError::InvalidValue(format!("Invalid signed integer: {}", s)))
    }

    /// Address from TRON Base58 (`T...`), TRON hex (`41...`) or 20-byte hex
    pub fn address(s: &str) -> Result<Self, AbiError> {
        let trimmed = s.trim();
        let clean = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if clean.len() == 40 {
            let bytes = hex::decode(clean)
                .map_err(|_| AbiError::InvalidValue(format!("Invalid address hex: {}", s)))?;
            let mut body = [0u8; 20];
            body.copy_from_slice(&bytes);
            return Ok(AbiValue::Address(body));
        }
        let address = Address::parse(trimmed)
            .map_err(|e| AbiError::InvalidValue(format!("Invalid address {}: {}", s, e.message)))?;
        Ok(AbiValue::Address(address.evm_bytes()))
    }

    pub fn from_address(address: &Address) -> Self {
        AbiValue::Address(address.evm_bytes())
    }

    /// Dynamic bytes from hex, `0x` optional
    pub fn bytes_from_hex(s: &str) -> Result<Self, AbiError> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(s).map_err(|_| AbiError::InvalidValue(format!("Invalid hex: {}", s)))?;
        Ok(AbiValue::Bytes(bytes))
    }

    /// Decoded address as a TRON address on `network`
    pub fn to_tron_address(&self, network: Network) -> Option<Address> {
        match self {
            AbiValue::Address(body) => Some(Address::from_evm_bytes(*body, network)),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<&BigUint> {
        match self {
            AbiValue::Uint(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short description for mismatch errors
    pub fn kind(&self) -> String {
        match self {
            AbiValue::Uint(_) => "uint".to_string(),
            AbiValue::Int(_) => "int".to_string(),
            AbiValue::Address(_) => "address".to_string(),
            AbiValue::Bool(_) => "bool".to_string(),
            AbiValue::FixedBytes(b) => format!("bytes{}", b.len()),
            AbiValue::Bytes(_) => "bytes".to_string(),
            AbiValue::String(_) => "string".to_string(),
            AbiValue::Array(values) => format!("array of {}", values.len()),
            AbiValue::Tuple(values) => format!("tuple of {}", values.len()),
        }
    }
}

/// ABI function definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiFunction {
    pub name: String,
    pub inputs: Vec<AbiParam>,
    pub outputs: Vec<AbiParam>,
    #[serde(default)]
    pub state_mutability: StateMutability,
    #[serde(default, rename = "type")]
    pub function_type: FunctionType,
}

impl AbiFunction {
    /// Get the function signature for selector calculation
    pub fn signature(&self) -> String {
        let params = self
            .inputs
            .iter()
            .map(|p| p.param_type.canonical_type())
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({})", self.name, params)
    }

    pub fn input_types(&self) -> Vec<AbiType> {
        self.inputs.iter().map(|p| p.param_type.clone()).collect()
    }

    pub fn output_types(&self) -> Vec<AbiType> {
        self.outputs.iter().map(|p| p.param_type.clone()).collect()
    }
}

/// ABI event definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiEvent {
    pub name: String,
    pub inputs: Vec<AbiEventParam>,
    #[serde(default)]
    pub anonymous: bool,
}

impl AbiEvent {
    /// Get the event signature for topic calculation
    pub fn signature(&self) -> String {
        let params = self
            .inputs
            .iter()
            .map(|p| p.param.param_type.canonical_type())
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({})", self.name, params)
    }
}

/// ABI parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: AbiType,
}

/// ABI event parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiEventParam {
    #[serde(flatten)]
    pub param: AbiParam,
    #[serde(default)]
    pub indexed: bool,
}

/// State mutability; TRON nodes capitalize these (`Nonpayable`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    #[default]
    #[serde(alias = "Nonpayable")]
    Nonpayable,
    #[serde(alias = "Payable")]
    Payable,
    #[serde(alias = "View")]
    View,
    #[serde(alias = "Pure")]
    Pure,
}

/// Function type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionType {
    #[default]
    Function,
    Constructor,
    Fallback,
    Receive,
}

/// ABI errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("Invalid type: {0}")]
    InvalidType(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
    #[error("Value does not fit {0}")]
    Overflow(String),
    #[error("Decoding error: {0}")]
    DecodingError(String),
    #[error("Invalid ABI: {0}")]
    InvalidAbi(String),
    #[error("Function not found: {0}")]
    FunctionNotFound(String),
    #[error("Event not found: {0}")]
    EventNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abi_type_parse() {
        assert_eq!(AbiType::parse("uint256").unwrap(), AbiType::Uint(256));
        assert_eq!(AbiType::parse("uint").unwrap(), AbiType::Uint(256));
        assert_eq!(AbiType::parse("int").unwrap(), AbiType::Int(256));
        assert_eq!(AbiType::parse("uint24").unwrap(), AbiType::Uint(24));
        assert_eq!(AbiType::parse("address").unwrap(), AbiType::Address);
        assert_eq!(AbiType::parse("bytes7").unwrap(), AbiType::FixedBytes(7));
        assert_eq!(AbiType::parse("bytes").unwrap(), AbiType::Bytes);
        assert_eq!(AbiType::parse("trcToken").unwrap(), AbiType::Uint(256));
    }

    #[test]
    fn test_abi_type_rejects() {
        for bad in ["uint7", "uint264", "int0", "bytes0", "bytes33", "foo", "uint256[0]", "(uint256", "(,bool)", "uint[x]"] {
            assert!(AbiType::parse(bad).is_err(), "input {:?}", bad);
        }
    }

    #[test]
    fn test_abi_type_arrays() {
        assert_eq!(
            AbiType::parse("uint256[]").unwrap(),
            AbiType::Array(Box::new(AbiType::Uint(256)))
        );
        assert_eq!(
            AbiType::parse("address[5]").unwrap(),
            AbiType::FixedArray(Box::new(AbiType::Address), 5)
        );
        assert_eq!(
            AbiType::parse("uint8[2][]").unwrap(),
            AbiType::Array(Box::new(AbiType::FixedArray(Box::new(AbiType::Uint(8)), 2)))
        );
    }

    #[test]
    fn test_abi_type_tuple() {
        let tuple = AbiType::parse("(uint256,(address,bool[]),string)").unwrap();
        assert_eq!(
            tuple,
            AbiType::Tuple(vec![
                AbiType::Uint(256),
                AbiType::Tuple(vec![AbiType::Address, AbiType::Array(Box::new(AbiType::Bool))]),
                AbiType::String,
            ])
        );
        assert!(tuple.is_dynamic());
        assert_eq!(AbiType::parse("tuple(uint,int)").unwrap().canonical_type(), "(uint256,int256)");
    }

    #[test]
    fn test_abi_type_is_dynamic() {
        assert!(!AbiType::Uint(256).is_dynamic());
        assert!(!AbiType::FixedBytes(32).is_dynamic());
        assert!(AbiType::Bytes.is_dynamic());
        assert!(AbiType::String.is_dynamic());
        assert!(AbiType::Array(Box::new(AbiType::Uint(256))).is_dynamic());
        assert!(!AbiType::FixedArray(Box::new(AbiType::Uint(256)), 5).is_dynamic());
        assert!(AbiType::FixedArray(Box::new(AbiType::String), 5).is_dynamic());
    }

    #[test]
    fn test_head_size() {
        assert_eq!(AbiType::FixedArray(Box::new(AbiType::Uint(256)), 3).head_size().unwrap(), 96);
        assert_eq!(AbiType::parse("(uint8,bool)").unwrap().head_size().unwrap(), 64);
        assert_eq!(AbiType::parse("(uint8,string)").unwrap().head_size().unwrap(), 32);
        assert_eq!(AbiType::parse("string[3]").unwrap().head_size().unwrap(), 32);

        let huge = AbiType::parse("uint256[576460752303423488]").unwrap();
        assert!(matches!(huge.head_size(), Err(AbiError::InvalidType(_))));
        let nested = AbiType::parse("(bool,uint8[4294967296][4294967296])").unwrap();
        assert!(matches!(nested.head_size(), Err(AbiError::InvalidType(_))));
    }

    #[test]
    fn test_value_parsing() {
        assert_eq!(AbiValue::uint_from_str("0xff").unwrap(), AbiValue::uint(255));
        assert_eq!(AbiValue::uint_from_str("1000").unwrap(), AbiValue::uint(1000));
        assert!(AbiValue::uint_from_str("-1").is_err());
        assert_eq!(AbiValue::int_from_str("-42").unwrap(), AbiValue::int(-42));
    }

    #[test]
    fn test_address_value_forms() {
        let expected = AbiValue::Address(
            hex::decode("a614f803b6fd780986a42c78ec9c7f77e6ded13c").unwrap().try_into().unwrap(),
        );
        assert_eq!(AbiValue::address("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t").unwrap(), expected);
        assert_eq!(AbiValue::address("41a614f803b6fd780986a42c78ec9c7f77e6ded13c").unwrap(), expected);
        assert_eq!(AbiValue::address("0xa614f803b6fd780986a42c78ec9c7f77e6ded13c").unwrap(), expected);
        assert!(AbiValue::address("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6u").is_err());

        let tron = expected.to_tron_address(Network::Mainnet).unwrap();
        assert_eq!(tron.to_base58(), "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t");
    }

    #[test]
    fn test_serde_type_string() {
        let json = serde_json::to_string(&AbiType::Array(Box::new(AbiType::Address))).unwrap();
        assert_eq!(json, "\"address[]\"");
        let back: AbiType = serde_json::from_str("\"uint\"").unwrap();
        assert_eq!(back, AbiType::Uint(256));
    }
}
