//! Modular arithmetic over the base field and the scalar group
//!
//! Operands are expected to be reduced already; results always are.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use super::params::CURVE;

pub fn add_mod(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    (a + b) % m
}

pub fn sub_mod(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    if a >= b {
        (a - b) % m
    } else {
        neg_mod(&(b - a), m)
    }
}

pub fn mul_mod(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    (a * b) % m
}

pub fn neg_mod(a: &BigUint, m: &BigUint) -> BigUint {
    let a = a % m;
    if a.is_zero() {
        a
    } else {
        m - a
    }
}

/// Multiplicative inverse by the extended Euclidean algorithm.
/// Returns `None` when `a` shares a factor with `m` (including `a = 0`).
pub fn inv_mod(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    let a = a % m;
    if a.is_zero() {
        return None;
    }

    let modulus = BigInt::from_biguint(Sign::Plus, m.clone());
    let (mut old_r, mut r) = (BigInt::from_biguint(Sign::Plus, a), modulus.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());

    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    if !old_r.is_one() {
        return None;
    }
    let inv = ((old_s % &modulus) + &modulus) % &modulus;
    inv.to_biguint()
}

/// Inverse modulo the field prime
pub fn inv_p(a: &BigUint) -> Option<BigUint> {
    inv_mod(a, &CURVE.p)
}

/// Inverse modulo the group order
pub fn inv_n(a: &BigUint) -> Option<BigUint> {
    inv_mod(a, &CURVE.n)
}

/// Square root modulo p via a^((p+1)/4); `None` for non-residues
pub fn sqrt_p(a: &BigUint) -> Option<BigUint> {
    let p = &CURVE.p;
    let root = a.modpow(&CURVE.sqrt_exp, p);
    if mul_mod(&root, &root, p) == a % p {
        Some(root)
    } else {
        None
    }
}

/// Right-hand side of the curve equation, x^3 + 7 mod p
pub fn curve_rhs(x: &BigUint) -> BigUint {
    let p = &CURVE.p;
    let x3 = mul_mod(&mul_mod(x, x, p), x, p);
    add_mod(&x3, &CURVE.b, p)
}

/// Big-endian 32-byte encoding, left padded. Values must be below 2^256.
pub fn to_bytes32(value: &BigUint) -> [u8; 32] {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; 32];
    if bytes.len() >= 32 {
        out.copy_from_slice(&bytes[bytes.len() - 32..]);
    } else {
        out[32 - bytes.len()..].copy_from_slice(&bytes);
    }
    out
}

pub fn is_even(value: &BigUint) -> bool {
    value.to_bytes_le().first().map_or(true, |b| b & 1 == 0)
}
