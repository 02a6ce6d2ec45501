//! ABI Decoder
//!
//! Every offset and length read from the input is bounds-checked before
//! use; malformed data yields `AbiError::DecodingError`, never a panic.
//! Dynamic offsets must point past the head they sit in, and a decode
//! produces at most one value per input byte.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, ToPrimitive};

use super::types::{AbiError, AbiEvent, AbiFunction, AbiType, AbiValue};

/// ABI decoder
pub struct AbiDecoder;

impl AbiDecoder {
    /// Decode a list of values laid out as a tuple starting at offset 0
    pub fn decode(data: &[u8], types: &[AbiType]) -> Result<Vec<AbiValue>, AbiError> {
        let mut budget = data.len();
        Self::decode_tuple(data, 0, types, &mut budget)
    }

    /// Decode the value of `abi_type` whose head starts at `offset`
    ///
    /// Dynamic values are decoded from `offset` as their own start.
    fn decode_value(
        data: &[u8],
        offset: usize,
        abi_type: &AbiType,
        budget: &mut usize,
    ) -> Result<AbiValue, AbiError> {
        *budget = budget
            .checked_sub(1)
            .ok_or_else(|| AbiError::DecodingError("Decoded values exceed input size".to_string()))?;
        match abi_type {
            AbiType::Uint(bits) => {
                let value = BigUint::from_bytes_be(Self::read_word(data, offset)?);
                if value.bits() > *bits as u64 {
                    return Err(AbiError::DecodingError(format!(
                        "Value exceeds uint{} at offset {}",
                        bits, offset
                    )));
                }
                Ok(AbiValue::Uint(value))
            }
            AbiType::Int(bits) => {
                let word = Self::read_word(data, offset)?;
                let unsigned = BigUint::from_bytes_be(word);
                let value = if word[0] & 0x80 != 0 {
                    BigInt::from(unsigned) - (BigInt::one() << 256)
                } else {
                    BigInt::from(unsigned)
                };
                let bound = BigInt::one() << (bits - 1);
                if value >= bound || value < -bound {
                    return Err(AbiError::DecodingError(format!(
                        "Value exceeds int{} at offset {}",
                        bits, offset
                    )));
                }
                Ok(AbiValue::Int(value))
            }
            AbiType::Address => {
                let word = Self::read_word(data, offset)?;
                // TVM may leave the 0x41 prefix in byte 11
                let padding_ok = word[..11].iter().all(|b| *b == 0) && (word[11] == 0 || word[11] == 0x41);
                if !padding_ok {
                    return Err(AbiError::DecodingError(format!(
                        "Dirty address padding at offset {}",
                        offset
                    )));
                }
                let mut body = [0u8; 20];
                body.copy_from_slice(&word[12..]);
                Ok(AbiValue::Address(body))
            }
            AbiType::Bool => {
                let word = Self::read_word(data, offset)?;
                if word[..31].iter().any(|b| *b != 0) || word[31] > 1 {
                    return Err(AbiError::DecodingError(format!(
                        "Invalid bool at offset {}",
                        offset
                    )));
                }
                Ok(AbiValue::Bool(word[31] == 1))
            }
            AbiType::FixedBytes(size) => {
                let word = Self::read_word(data, offset)?;
                Ok(AbiValue::FixedBytes(word[..*size].to_vec()))
            }
            AbiType::Bytes => Ok(AbiValue::Bytes(Self::decode_dynamic_bytes(data, offset)?)),
            AbiType::String => {
                let bytes = Self::decode_dynamic_bytes(data, offset)?;
                String::from_utf8(bytes)
                    .map(AbiValue::String)
                    .map_err(|_| AbiError::DecodingError("Invalid UTF-8 in string".to_string()))
            }
            AbiType::Array(inner) => {
                let length = Self::read_usize(data, offset)?;
                let start = offset + 32;
                Self::check_element_count(data, start, length, inner, *budget)?;
                let types = vec![inner.as_ref().clone(); length];
                Ok(AbiValue::Array(Self::decode_tuple(data, start, &types, budget)?))
            }
            AbiType::FixedArray(inner, size) => {
                Self::check_element_count(data, offset, *size, inner, *budget)?;
                let types = vec![inner.as_ref().clone(); *size];
                Ok(AbiValue::Array(Self::decode_tuple(data, offset, &types, budget)?))
            }
            AbiType::Tuple(types) => Ok(AbiValue::Tuple(Self::decode_tuple(data, offset, types, budget)?)),
        }
    }

    /// Reject `count` elements of `inner` that cannot fit in the data after `start`
    fn check_element_count(
        data: &[u8],
        start: usize,
        count: usize,
        inner: &AbiType,
        budget: usize,
    ) -> Result<(), AbiError> {
        let min_element = if inner.is_dynamic() { 32 } else { inner.head_size()?.max(1) };
        let available = data.len().saturating_sub(start);
        if count > available / min_element || count > budget {
            return Err(AbiError::DecodingError(format!(
                "{} elements of {} exceed data at offset {}",
                count,
                inner.canonical_type(),
                start
            )));
        }
        Ok(())
    }

    /// Decode a tuple whose head starts at `base`; dynamic offsets are relative to `base`
    fn decode_tuple(
        data: &[u8],
        base: usize,
        types: &[AbiType],
        budget: &mut usize,
    ) -> Result<Vec<AbiValue>, AbiError> {
        let head_len = AbiType::tuple_head_size(types)?;
        let out_of_bounds = || AbiError::DecodingError(format!("Tuple head at {} exceeds data", base));
        let head_end = base.checked_add(head_len).ok_or_else(out_of_bounds)?;
        if head_end > data.len() {
            return Err(out_of_bounds());
        }

        let mut values = Vec::with_capacity(types.len());
        let mut head = base;

        for abi_type in types {
            if abi_type.is_dynamic() {
                let relative = Self::read_usize(data, head)?;
                if relative < head_len {
                    return Err(AbiError::DecodingError(format!(
                        "Offset {} at {} points into the head",
                        relative, head
                    )));
                }
                let target = base
                    .checked_add(relative)
                    .filter(|t| *t <= data.len())
                    .ok_or_else(|| {
                        AbiError::DecodingError(format!("Offset {} out of bounds at {}", relative, head))
                    })?;
                values.push(Self::decode_value(data, target, abi_type, budget)?);
            } else {
                values.push(Self::decode_value(data, head, abi_type, budget)?);
            }
            // Bounded by head_end
            head += abi_type.head_size()?;
        }

        Ok(values)
    }

    fn decode_dynamic_bytes(data: &[u8], offset: usize) -> Result<Vec<u8>, AbiError> {
        let length = Self::read_usize(data, offset)?;
        let start = offset + 32;
        let end = start
            .checked_add(length)
            .filter(|end| *end <= data.len())
            .ok_or_else(|| {
                AbiError::DecodingError(format!("Byte length {} exceeds data at offset {}", length, offset))
            })?;
        Ok(data[start..end].to_vec())
    }

    fn read_word(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
        offset
            .checked_add(32)
            .filter(|end| *end <= data.len())
            .map(|end| &data[offset..end])
            .ok_or_else(|| {
                AbiError::DecodingError(format!(
                    "Data too short: need 32 bytes at offset {}, have {}",
                    offset,
                    data.len()
                ))
            })
    }

    /// Read a word holding an offset or length
    fn read_usize(data: &[u8], offset: usize) -> Result<usize, AbiError> {
        let word = Self::read_word(data, offset)?;
        BigUint::from_bytes_be(word)
            .to_usize()
            .ok_or_else(|| AbiError::DecodingError(format!("Offset or length too large at {}", offset)))
    }

    /// Decode the return data of `function`
    pub fn decode_function_result(data: &[u8], function: &AbiFunction) -> Result<Vec<AbiValue>, AbiError> {
        Self::decode(data, &function.output_types())
    }

    /// Decode call data (selector + arguments) of `function`
    pub fn decode_function_input(data: &[u8], function: &AbiFunction) -> Result<Vec<AbiValue>, AbiError> {
        if data.len() < 4 {
            return Err(AbiError::DecodingError("Call data shorter than a selector".to_string()));
        }
        Self::decode(&data[4..], &function.input_types())
    }

    /// Decode an event log from its topics and data
    ///
    /// Indexed static parameters come from topics; indexed dynamic ones are
    /// hashes and come back as 32-byte `FixedBytes`.
    pub fn decode_event(
        topics: &[[u8; 32]],
        data: &[u8],
        event: &AbiEvent,
    ) -> Result<Vec<(String, AbiValue)>, AbiError> {
        let topic_start = if event.anonymous { 0 } else { 1 };
        let indexed_count = event.inputs.iter().filter(|p| p.indexed).count();
        if topics.len() < topic_start + indexed_count {
            return Err(AbiError::DecodingError(format!(
                "Event {} needs {} topics, got {}",
                event.name,
                topic_start + indexed_count,
                topics.len()
            )));
        }

        let data_types: Vec<AbiType> = event
            .inputs
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.param.param_type.clone())
            .collect();
        let mut data_values = Self::decode(data, &data_types)?.into_iter();

        let mut topic_index = topic_start;
        let mut result = Vec::with_capacity(event.inputs.len());
        for input in &event.inputs {
            let value = if input.indexed {
                let topic = &topics[topic_index];
                topic_index += 1;
                if input.param.param_type.is_dynamic() {
                    AbiValue::FixedBytes(topic.to_vec())
                } else {
                    let mut budget = topic.len();
                    Self::decode_value(topic, 0, &input.param.param_type, &mut budget)?
                }
            } else {
                data_values
                    .next()
                    .ok_or_else(|| AbiError::DecodingError("Missing event data value".to_string()))?
            };
            result.push((input.param.name.clone(), value));
        }

        Ok(result)
    }
}

/// Decode `data` according to `types`
pub fn decode_parameters(types: &[AbiType], data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    AbiDecoder::decode(data, types)
}

/// Typed accessors for single-value TRC-20 call results
pub struct Trc20Result;

impl Trc20Result {
    /// `balanceOf` / `totalSupply` / `allowance`
    pub fn uint(data: &[u8]) -> Result<BigUint, AbiError> {
        match Self::single(data, AbiType::Uint(256))? {
            AbiValue::Uint(v) => Ok(v),
            other => Err(AbiError::TypeMismatch { expected: "uint256".to_string(), got: other.kind() }),
        }
    }

    /// `transfer` / `approve`; empty return data counts as success
    pub fn bool(data: &[u8]) -> Result<bool, AbiError> {
        if data.is_empty() {
            return Ok(true);
        }
        match Self::single(data, AbiType::Bool)? {
            AbiValue::Bool(b) => Ok(b),
            other => Err(AbiError::TypeMismatch { expected: "bool".to_string(), got: other.kind() }),
        }
    }

    /// `name` / `symbol`
    pub fn string(data: &[u8]) -> Result<String, AbiError> {
        match Self::single(data, AbiType::String)? {
            AbiValue::String(s) => Ok(s),
            other => Err(AbiError::TypeMismatch { expected: "string".to_string(), got: other.kind() }),
        }
    }

    /// `decimals`
    pub fn decimals(data: &[u8]) -> Result<u8, AbiError> {
        match Self::single(data, AbiType::Uint(8))? {
            AbiValue::Uint(v) => v
                .to_u8()
                .ok_or_else(|| AbiError::DecodingError("decimals out of range".to_string())),
            other => Err(AbiError::TypeMismatch { expected: "uint8".to_string(), got: other.kind() }),
        }
    }

    fn single(data: &[u8], abi_type: AbiType) -> Result<AbiValue, AbiError> {
        AbiDecoder::decode(data, &[abi_type])?
            .pop()
            .ok_or_else(|| AbiError::DecodingError("Empty result".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::encoder::encode_parameters;

    fn word(value: u64) -> Vec<u8> {
        let mut w = vec![0u8; 32];
        w[24..].copy_from_slice(&value.to_be_bytes());
        w
    }

    #[test]
    fn test_decode_uint256() {
        let values = decode_parameters(&[AbiType::Uint(256)], &word(1000)).unwrap();
        assert_eq!(values, vec![AbiValue::uint(1000)]);
    }

    #[test]
    fn test_decode_negative_int() {
        let data = vec![0xffu8; 32];
        let values = decode_parameters(&[AbiType::Int(256)], &data).unwrap();
        assert_eq!(values, vec![AbiValue::int(-1)]);
        let values = decode_parameters(&[AbiType::Int(8)], &data).unwrap();
        assert_eq!(values, vec![AbiValue::int(-1)]);
    }

    #[test]
    fn test_decode_rejects_out_of_range() {
        assert!(decode_parameters(&[AbiType::Uint(8)], &word(256)).is_err());
        assert!(decode_parameters(&[AbiType::Bool], &word(2)).is_err());
        assert!(decode_parameters(&[AbiType::Int(8)], &word(128)).is_err());
    }

    #[test]
    fn test_decode_address_padding() {
        let mut data = vec![0u8; 32];
        data[12..].copy_from_slice(&hex::decode("a614f803b6fd780986a42c78ec9c7f77e6ded13c").unwrap());
        let plain = decode_parameters(&[AbiType::Address], &data).unwrap();

        data[11] = 0x41;
        let prefixed = decode_parameters(&[AbiType::Address], &data).unwrap();
        assert_eq!(plain, prefixed);

        data[0] = 1;
        assert!(decode_parameters(&[AbiType::Address], &data).is_err());
    }

    #[test]
    fn test_decode_string() {
        let data = encode_parameters(&[AbiType::String], &[AbiValue::String("Tether USD".to_string())]).unwrap();
        assert_eq!(Trc20Result::string(&data).unwrap(), "Tether USD");
    }

    #[test]
    fn test_truncated_data() {
        assert!(matches!(
            decode_parameters(&[AbiType::Uint(256)], &[0u8; 31]),
            Err(AbiError::DecodingError(_))
        ));

        let mut data = encode_parameters(&[AbiType::Bytes], &[AbiValue::Bytes(vec![7u8; 40])]).unwrap();
        data.truncate(80);
        assert!(decode_parameters(&[AbiType::Bytes], &data).is_err());
    }

    #[test]
    fn test_hostile_offsets() {
        // Offset pointing far past the end
        let mut data = vec![0xffu8; 32];
        data.extend(word(1));
        assert!(decode_parameters(&[AbiType::String], &data).is_err());

        // Array claiming a huge length
        let mut data = word(32);
        data.extend(vec![0x7fu8; 32]);
        assert!(decode_parameters(&[AbiType::parse("uint256[]").unwrap()], &data).is_err());
    }

    #[test]
    fn test_fixed_array_larger_than_data() {
        let mut data = word(1);
        data.extend(word(2));

        let huge = AbiType::parse("uint256[576460752303423488]").unwrap();
        assert!(decode_parameters(&[huge], &data).is_err());

        let big = AbiType::parse("uint8[100000000]").unwrap();
        assert!(matches!(decode_parameters(&[big], &data), Err(AbiError::DecodingError(_))));

        let strings = AbiType::parse("string[100000000]").unwrap();
        let mut dynamic = word(32);
        dynamic.extend(word(32));
        assert!(matches!(decode_parameters(&[strings], &dynamic), Err(AbiError::DecodingError(_))));

        let fits = AbiType::parse("uint8[2]").unwrap();
        assert_eq!(
            decode_parameters(&[fits], &data).unwrap(),
            vec![AbiValue::Array(vec![AbiValue::uint(1), AbiValue::uint(2)])]
        );
    }

    #[test]
    fn test_offset_into_head_rejected() {
        // (uint256, string) with the string offset pointing at word 0
        let mut data = word(5);
        data.extend(word(0));
        data.extend(word(0));
        let result = decode_parameters(&[AbiType::Uint(256), AbiType::String], &data);
        assert!(matches!(result, Err(AbiError::DecodingError(_))));

        // Nested: uint256[][] whose inner offset points back at its own head
        let mut data = word(32);
        data.extend(word(1));
        data.extend(word(0));
        let nested = AbiType::parse("uint256[][]").unwrap();
        assert!(matches!(decode_parameters(&[nested], &data), Err(AbiError::DecodingError(_))));
    }

    #[test]
    fn test_aliased_offsets_bounded() {
        // uint256[][] of 128 elements all pointing at one 128-element inner array
        let n = 128u64;
        let mut data = word(32);
        data.extend(word(n));
        for _ in 0..n {
            data.extend(word(n * 32));
        }
        data.extend(word(n));
        for i in 0..n {
            data.extend(word(i));
        }
        let nested = AbiType::parse("uint256[][]").unwrap();
        let result = decode_parameters(&[nested], &data);
        assert!(matches!(result, Err(AbiError::DecodingError(_))));
    }

    #[test]
    fn test_nested_dynamic_round_trip() {
        let types = [
            AbiType::parse("(string,uint256[])[]").unwrap(),
            AbiType::Address,
            AbiType::parse("bytes3[2]").unwrap(),
        ];
        let values = vec![
            AbiValue::Array(vec![
                AbiValue::Tuple(vec![
                    AbiValue::String("one".to_string()),
                    AbiValue::Array(vec![AbiValue::uint(1), AbiValue::uint(2)]),
                ]),
                AbiValue::Tuple(vec![AbiValue::String(String::new()), AbiValue::Array(vec![])]),
            ]),
            AbiValue::address("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t").unwrap(),
            AbiValue::Array(vec![
                AbiValue::FixedBytes(b"abc".to_vec()),
                AbiValue::FixedBytes(b"xyz".to_vec()),
            ]),
        ];
        let encoded = encode_parameters(&types, &values).unwrap();
        assert_eq!(decode_parameters(&types, &encoded).unwrap(), values);
    }

    #[test]
    fn test_trc20_results() {
        assert_eq!(Trc20Result::uint(&word(42)).unwrap(), BigUint::from(42u8));
        assert!(Trc20Result::bool(&word(1)).unwrap());
        assert!(Trc20Result::bool(&[]).unwrap());
        assert_eq!(Trc20Result::decimals(&word(6)).unwrap(), 6);
    }
}
