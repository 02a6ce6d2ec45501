//! Base58 and Base58Check over the Bitcoin alphabet
//!
//! The payload is read as one big-endian integer and repeatedly divided
//! by 58. Each leading zero byte maps to a leading `'1'` and back.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;
use subtle::ConstantTimeEq;

use crate::crypto::hash::sha256d;
use crate::error::{TronError, TronResult};

/// Bitcoin's Base58 alphabet (no 0, O, I, l)
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of the Base58Check checksum suffix
pub const CHECKSUM_LEN: usize = 4;

const INVALID: u8 = 0xff;

const fn build_index() -> [u8; 128] {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

const INDEX: [u8; 128] = build_index();

pub fn encode(data: &[u8]) -> String {
    let zeros = data.iter().take_while(|b| **b == 0).count();
    let base = BigUint::from(58u32);
    let mut num = BigUint::from_bytes_be(&data[zeros..]);

    let mut digits = Vec::new();
    while !num.is_zero() {
        let (quotient, remainder) = num.div_rem(&base);
        let digit = remainder.to_u32_digits().first().copied().unwrap_or(0) as usize;
        digits.push(ALPHABET[digit]);
        num = quotient;
    }
    digits.extend(std::iter::repeat(ALPHABET[0]).take(zeros));
    digits.reverse();

    // Every byte comes from ALPHABET
    digits.into_iter().map(char::from).collect()
}

pub fn decode(s: &str) -> TronResult<Vec<u8>> {
    let mut num = BigUint::zero();
    let mut zeros = 0usize;
    let mut leading = true;

    for (pos, c) in s.chars().enumerate() {
        let value = if c.is_ascii() { INDEX[c as usize] } else { INVALID };
        if value == INVALID {
            return Err(TronError::invalid_base58(format!(
                "Invalid Base58 character {:?} at position {}",
                c, pos
            )));
        }
        if leading && value == 0 {
            zeros += 1;
            continue;
        }
        leading = false;
        num = num * 58u32 + u32::from(value);
    }

    let mut out = vec![0u8; zeros];
    if !num.is_zero() {
        out.extend_from_slice(&num.to_bytes_be());
    }
    Ok(out)
}

/// Append the first four bytes of sha256d(payload), then Base58-encode
pub fn check_encode(payload: &[u8]) -> String {
    let checksum = sha256d(payload);
    let mut data = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    encode(&data)
}

/// Decode and strip a verified Base58Check checksum
pub fn check_decode(s: &str) -> TronResult<Vec<u8>> {
    let mut decoded = decode(s)?;
    if decoded.len() < CHECKSUM_LEN {
        return Err(TronError::invalid_base58(
            "Base58Check data is shorter than its checksum",
        ));
    }
    let split = decoded.len() - CHECKSUM_LEN;
    let expected = sha256d(&decoded[..split]);
    let matches: bool = decoded[split..].ct_eq(&expected[..CHECKSUM_LEN]).into();
    if !matches {
        return Err(TronError::checksum_mismatch("Base58Check checksum does not match"));
    }
    decoded.truncate(split);
    Ok(decoded)
}
