//! ABI Encoder
//!
//! Head/tail layout: static values inline in declaration order, dynamic
//! values replaced by an offset into the trailing tail region.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use super::selector::{function_selector, parse_signature};
use super::types::{AbiError, AbiType, AbiValue};
use crate::address::Address;

/// ABI encoder
pub struct AbiEncoder;

impl AbiEncoder {
    /// Encode a single value against its declared type
    pub fn encode_value(value: &AbiValue, abi_type: &AbiType) -> Result<Vec<u8>, AbiError> {
        match (abi_type, value) {
            (AbiType::Uint(bits), AbiValue::Uint(v)) => Self::encode_uint(v, *bits),
            (AbiType::Uint(bits), AbiValue::Int(v)) => {
                let unsigned = v.to_biguint().ok_or_else(|| {
                    AbiError::Overflow(format!("negative value {} for uint{}", v, bits))
                })?;
                Self::encode_uint(&unsigned, *bits)
            }
            (AbiType::Int(bits), AbiValue::Int(v)) => Self::encode_int(v, *bits),
            (AbiType::Int(bits), AbiValue::Uint(v)) => {
                Self::encode_int(&BigInt::from_biguint(Sign::Plus, v.clone()), *bits)
            }
            (AbiType::Address, AbiValue::Address(body)) => {
                let mut word = [0u8; 32];
                word[12..].copy_from_slice(body);
                Ok(word.to_vec())
            }
            (AbiType::Bool, AbiValue::Bool(b)) => {
                let mut word = [0u8; 32];
                word[31] = u8::from(*b);
                Ok(word.to_vec())
            }
            (AbiType::FixedBytes(size), AbiValue::FixedBytes(bytes))
            | (AbiType::FixedBytes(size), AbiValue::Bytes(bytes)) => {
                if bytes.len() != *size {
                    return Err(AbiError::TypeMismatch {
                        expected: format!("bytes{}", size),
                        got: format!("{} bytes", bytes.len()),
                    });
                }
                let mut word = [0u8; 32];
                word[..*size].copy_from_slice(bytes);
                Ok(word.to_vec())
            }
            (AbiType::Bytes, AbiValue::Bytes(bytes)) => Ok(Self::encode_dynamic_bytes(bytes)),
            (AbiType::String, AbiValue::String(s)) => Ok(Self::encode_dynamic_bytes(s.as_bytes())),
            (AbiType::Array(inner), AbiValue::Array(values)) => {
                let mut result = Self::encode_length(values.len());
                let types = vec![inner.as_ref().clone(); values.len()];
                result.extend(Self::encode_tuple(values, &types)?);
                Ok(result)
            }
            (AbiType::FixedArray(inner, size), AbiValue::Array(values)) => {
                if values.len() != *size {
                    return Err(AbiError::TypeMismatch {
                        expected: format!("{} elements", size),
                        got: format!("{} elements", values.len()),
                    });
                }
                let types = vec![inner.as_ref().clone(); *size];
                Self::encode_tuple(values, &types)
            }
            (AbiType::Tuple(types), AbiValue::Tuple(values)) => Self::encode_tuple(values, types),
            _ => Err(AbiError::TypeMismatch {
                expected: abi_type.canonical_type(),
                got: value.kind(),
            }),
        }
    }

    /// Encode values as the argument list of a call
    pub fn encode(values: &[AbiValue], types: &[AbiType]) -> Result<Vec<u8>, AbiError> {
        Self::encode_tuple(values, types)
    }

    fn encode_tuple(values: &[AbiValue], types: &[AbiType]) -> Result<Vec<u8>, AbiError> {
        if values.len() != types.len() {
            return Err(AbiError::TypeMismatch {
                expected: format!("{} values", types.len()),
                got: format!("{} values", values.len()),
            });
        }

        let head_size = AbiType::tuple_head_size(types)?;
        let mut head = Vec::new();
        let mut tail = Vec::new();

        for (value, abi_type) in values.iter().zip(types) {
            let encoded = Self::encode_value(value, abi_type)?;
            if abi_type.is_dynamic() {
                let offset = head_size
                    .checked_add(tail.len())
                    .ok_or_else(|| AbiError::Overflow("Encoded data too large".to_string()))?;
                head.extend(Self::encode_length(offset));
                tail.extend(encoded);
            } else {
                head.extend(encoded);
            }
        }

        head.extend(tail);
        Ok(head)
    }

    fn encode_uint(value: &BigUint, bits: usize) -> Result<Vec<u8>, AbiError> {
        if value.bits() > bits as u64 {
            return Err(AbiError::Overflow(format!("{} does not fit uint{}", value, bits)));
        }
        Ok(Self::word(value).to_vec())
    }

    fn encode_int(value: &BigInt, bits: usize) -> Result<Vec<u8>, AbiError> {
        let bound = BigInt::one() << (bits - 1);
        if *value >= bound || *value < -bound {
            return Err(AbiError::Overflow(format!("{} does not fit int{}", value, bits)));
        }
        // Two's complement over the full 256-bit word
        let unsigned = if value.sign() == Sign::Minus {
            let wrapped: BigInt = (BigInt::one() << 256) + value;
            wrapped.to_biguint().unwrap_or_else(BigUint::zero)
        } else {
            value.magnitude().clone()
        };
        Ok(Self::word(&unsigned).to_vec())
    }

    /// Left-pad to a 32-byte big-endian word; callers bound the width
    fn word(value: &BigUint) -> [u8; 32] {
        let bytes = value.to_bytes_be();
        let mut word = [0u8; 32];
        if !value.is_zero() {
            word[32 - bytes.len()..].copy_from_slice(&bytes);
        }
        word
    }

    fn encode_length(len: usize) -> Vec<u8> {
        Self::word(&BigUint::from(len)).to_vec()
    }

    /// Length word followed by the data right-padded to 32 bytes
    fn encode_dynamic_bytes(data: &[u8]) -> Vec<u8> {
        let mut result = Self::encode_length(data.len());
        result.extend_from_slice(data);
        let padding = (32 - data.len() % 32) % 32;
        result.extend(std::iter::repeat(0u8).take(padding));
        result
    }
}

/// Encode `values` according to `types`
pub fn encode_parameters(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    AbiEncoder::encode(values, types)
}

/// Selector of `signature` followed by the encoded arguments
///
/// `signature` is a human-readable form such as `transfer(address,uint)`;
/// types are normalized before hashing.
pub fn encode_function_call(signature: &str, values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    let (_, types) = parse_signature(signature)?;
    let mut data = function_selector(signature)?.to_vec();
    data.extend(AbiEncoder::encode(values, &types)?);
    Ok(data)
}

/// Call data builders for TRC-20 tokens
pub struct Trc20Call;

impl Trc20Call {
    pub fn transfer(to: &Address, amount: BigUint) -> Result<Vec<u8>, AbiError> {
        encode_function_call(
            "transfer(address,uint256)",
            &[AbiValue::from_address(to), AbiValue::Uint(amount)],
        )
    }

    pub fn approve(spender: &Address, amount: BigUint) -> Result<Vec<u8>, AbiError> {
        encode_function_call(
            "approve(address,uint256)",
            &[AbiValue::from_address(spender), AbiValue::Uint(amount)],
        )
    }

    pub fn transfer_from(from: &Address, to: &Address, amount: BigUint) -> Result<Vec<u8>, AbiError> {
        encode_function_call(
            "transferFrom(address,address,uint256)",
            &[
                AbiValue::from_address(from),
                AbiValue::from_address(to),
                AbiValue::Uint(amount),
            ],
        )
    }

    pub fn balance_of(owner: &Address) -> Result<Vec<u8>, AbiError> {
        encode_function_call("balanceOf(address)", &[AbiValue::from_address(owner)])
    }

    pub fn allowance(owner: &Address, spender: &Address) -> Result<Vec<u8>, AbiError> {
        encode_function_call(
            "allowance(address,address)",
            &[AbiValue::from_address(owner), AbiValue::from_address(spender)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_hex(encoded: &[u8], index: usize) -> String {
        hex::encode(&encoded[index * 32..(index + 1) * 32])
    }

    #[test]
    fn test_encode_uint256() {
        let encoded = AbiEncoder::encode_value(&AbiValue::uint(1000), &AbiType::Uint(256)).unwrap();
        assert_eq!(encoded.len(), 32);
        assert_eq!(
            hex::encode(&encoded),
            "00000000000000000000000000000000000000000000000000000000000003e8"
        );
    }

    #[test]
    fn test_uint_range_checks() {
        assert!(AbiEncoder::encode_value(&AbiValue::uint(255), &AbiType::Uint(8)).is_ok());
        let err = AbiEncoder::encode_value(&AbiValue::uint(256), &AbiType::Uint(8)).unwrap_err();
        assert!(matches!(err, AbiError::Overflow(_)));
        let negative = AbiEncoder::encode_value(&AbiValue::int(-1), &AbiType::Uint(256));
        assert!(matches!(negative, Err(AbiError::Overflow(_))));
    }

    #[test]
    fn test_encode_negative_int() {
        let encoded = AbiEncoder::encode_value(&AbiValue::int(-1), &AbiType::Int(256)).unwrap();
        assert_eq!(hex::encode(&encoded), "ff".repeat(32));

        let encoded = AbiEncoder::encode_value(&AbiValue::int(-128), &AbiType::Int(8)).unwrap();
        assert_eq!(hex::encode(&encoded), format!("{}80", "ff".repeat(31)));

        assert!(AbiEncoder::encode_value(&AbiValue::int(-129), &AbiType::Int(8)).is_err());
        assert!(AbiEncoder::encode_value(&AbiValue::int(128), &AbiType::Int(8)).is_err());
    }

    #[test]
    fn test_encode_address_from_tron() {
        let value = AbiValue::address("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t").unwrap();
        let encoded = AbiEncoder::encode_value(&value, &AbiType::Address).unwrap();
        assert_eq!(
            hex::encode(&encoded),
            "000000000000000000000000a614f803b6fd780986a42c78ec9c7f77e6ded13c"
        );
    }

    #[test]
    fn test_encode_bool_and_fixed_bytes() {
        let encoded = AbiEncoder::encode_value(&AbiValue::Bool(true), &AbiType::Bool).unwrap();
        assert_eq!(encoded[31], 1);

        let encoded = AbiEncoder::encode_value(
            &AbiValue::FixedBytes(vec![0xde, 0xad]),
            &AbiType::FixedBytes(2),
        )
        .unwrap();
        assert_eq!(&encoded[..2], &[0xde, 0xad]);
        assert!(encoded[2..].iter().all(|b| *b == 0));

        let short = AbiEncoder::encode_value(&AbiValue::FixedBytes(vec![1]), &AbiType::FixedBytes(2));
        assert!(matches!(short, Err(AbiError::TypeMismatch { .. })));
    }

    #[test]
    fn test_encode_string() {
        let encoded =
            AbiEncoder::encode_value(&AbiValue::String("Hello".to_string()), &AbiType::String).unwrap();
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 5);
        assert_eq!(&encoded[32..37], b"Hello");
    }

    #[test]
    fn test_type_mismatch() {
        let err = AbiEncoder::encode_value(&AbiValue::Bool(true), &AbiType::Address).unwrap_err();
        assert_eq!(
            err,
            AbiError::TypeMismatch {
                expected: "address".to_string(),
                got: "bool".to_string()
            }
        );
        let err = encode_parameters(&[AbiType::Bool], &[]).unwrap_err();
        assert!(matches!(err, AbiError::TypeMismatch { .. }));
    }

    #[test]
    fn test_dynamic_head_tail_layout() {
        // f(uint256,uint32[],bytes10,bytes) from the Solidity ABI documentation
        let types = [
            AbiType::Uint(256),
            AbiType::parse("uint32[]").unwrap(),
            AbiType::FixedBytes(10),
            AbiType::Bytes,
        ];
        let values = [
            AbiValue::uint(0x123),
            AbiValue::Array(vec![AbiValue::uint(0x456), AbiValue::uint(0x789)]),
            AbiValue::FixedBytes(b"1234567890".to_vec()),
            AbiValue::Bytes(b"Hello, world!".to_vec()),
        ];
        let encoded = encode_parameters(&types, &values).unwrap();
        assert_eq!(encoded.len(), 9 * 32);
        assert_eq!(word_hex(&encoded, 0), format!("{}0123", "0".repeat(60)));
        assert_eq!(word_hex(&encoded, 1), format!("{}80", "0".repeat(62)));
        assert_eq!(word_hex(&encoded, 2), format!("3132333435363738393000{}", "0".repeat(42)));
        assert_eq!(word_hex(&encoded, 3), format!("{}e0", "0".repeat(62)));
        assert_eq!(word_hex(&encoded, 4), format!("{}02", "0".repeat(62)));
        assert_eq!(word_hex(&encoded, 5), format!("{}0456", "0".repeat(60)));
        assert_eq!(word_hex(&encoded, 6), format!("{}0789", "0".repeat(60)));
        assert_eq!(word_hex(&encoded, 7), format!("{}0d", "0".repeat(62)));
        assert_eq!(
            word_hex(&encoded, 8),
            format!("48656c6c6f2c20776f726c6421{}", "0".repeat(38))
        );
    }

    #[test]
    fn test_static_tuple_inline() {
        let tuple = AbiType::parse("(uint256,bool)").unwrap();
        let encoded = encode_parameters(
            &[tuple, AbiType::Uint(8)],
            &[
                AbiValue::Tuple(vec![AbiValue::uint(7), AbiValue::Bool(true)]),
                AbiValue::uint(9),
            ],
        )
        .unwrap();
        assert_eq!(encoded.len(), 96);
        assert_eq!(encoded[31], 7);
        assert_eq!(encoded[63], 1);
        assert_eq!(encoded[95], 9);
    }

    #[test]
    fn test_oversized_fixed_array_type() {
        let huge = AbiType::parse("uint256[576460752303423488]").unwrap();
        let err = encode_parameters(&[huge.clone()], &[AbiValue::Array(vec![])]).unwrap_err();
        assert!(matches!(err, AbiError::InvalidType(_)));

        let nested = AbiType::Tuple(vec![huge]);
        let err = encode_parameters(&[nested], &[AbiValue::Tuple(vec![AbiValue::Array(vec![])])]).unwrap_err();
        assert!(matches!(err, AbiError::InvalidType(_)));

        // Large but representable: rejected on the value count, nothing reserved
        let big = AbiType::parse("uint8[100000000]").unwrap();
        let err = encode_parameters(&[big], &[AbiValue::Array(vec![AbiValue::uint(1)])]).unwrap_err();
        assert!(matches!(err, AbiError::TypeMismatch { .. }));
    }

    #[test]
    fn test_encode_function_call_transfer() {
        let data = encode_function_call(
            "transfer(address,uint)",
            &[
                AbiValue::address("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t").unwrap(),
                AbiValue::uint(1_000_000),
            ],
        )
        .unwrap();
        assert_eq!(hex::encode(&data[..4]), "a9059cbb");
        assert_eq!(data.len(), 4 + 64);

        let to = Address::parse("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t").unwrap();
        assert_eq!(Trc20Call::transfer(&to, BigUint::from(1_000_000u32)).unwrap(), data);
    }

    #[test]
    fn test_trc20_selectors() {
        let owner = Address::parse("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t").unwrap();
        assert_eq!(hex::encode(&Trc20Call::balance_of(&owner).unwrap()[..4]), "70a08231");
        assert_eq!(
            hex::encode(&Trc20Call::approve(&owner, BigUint::from(1u8)).unwrap()[..4]),
            "095ea7b3"
        );
        assert_eq!(
            hex::encode(&Trc20Call::transfer_from(&owner, &owner, BigUint::from(1u8)).unwrap()[..4]),
            "23b872dd"
        );
        assert_eq!(hex::encode(&Trc20Call::allowance(&owner, &owner).unwrap()[..4]), "dd62ed3e");
    }
}
