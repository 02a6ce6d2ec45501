//! ECDSA over secp256k1 with public key recovery
//!
//! Signing takes a 32-byte digest, never a message. Nonces come from
//! RFC 6979 (HMAC-SHA256) unless random nonces are requested. Signatures
//! are low-S by default and always carry a recovery id:
//!
//! - bit 0: parity of R.y
//! - bit 1: set when R.x overflowed the group order

use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::curves::field::{inv_n, is_even, mul_mod, neg_mod, to_bytes32};
use super::curves::params::CURVE;
use super::curves::point::Point;
use super::hash::hmac_sha256;
use super::keys::{PrivateKey, PublicKey};
use crate::error::{TronError, TronResult};
use crate::log_debug;

/// Offset added to the recovery id in 65-byte `r || s || v` signatures
pub const V_OFFSET: u8 = 27;

const MAX_NONCE_ATTEMPTS: usize = 64;

/// How the per-signature nonce is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonceStrategy {
    /// RFC 6979, reproducible for a given key and digest
    #[default]
    Deterministic,
    /// Fresh CSPRNG nonce per attempt
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignOptions {
    /// Normalize s into the lower half of the group order
    pub canonical: bool,
    pub nonce: NonceStrategy,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            canonical: true,
            nonce: NonceStrategy::Deterministic,
        }
    }
}

/// A recoverable ECDSA signature; r and s are always in [1, n-1]
#[derive(Clone, PartialEq, Eq)]
pub struct Signature {
    r: BigUint,
    s: BigUint,
    recovery_id: u8,
}

impl Signature {
    pub fn new(r: [u8; 32], s: [u8; 32], recovery_id: u8) -> TronResult<Self> {
        let r = BigUint::from_bytes_be(&r);
        let s = BigUint::from_bytes_be(&s);
        check_scalar(&r, "r")?;
        check_scalar(&s, "s")?;
        if recovery_id > 3 {
            return Err(TronError::invalid_signature(format!(
                "Recovery id {} is not in 0..=3",
                recovery_id
            )));
        }
        Ok(Self { r, s, recovery_id })
    }

    pub fn r(&self) -> [u8; 32] {
        to_bytes32(&self.r)
    }

    pub fn s(&self) -> [u8; 32] {
        to_bytes32(&self.s)
    }

    pub fn recovery_id(&self) -> u8 {
        self.recovery_id
    }

    /// s <= n/2
    pub fn is_low_s(&self) -> bool {
        self.s <= CURVE.half_n
    }

    /// Replace s by n - s when high, flipping the y-parity bit to match
    pub fn normalize_s(self) -> Self {
        if self.is_low_s() {
            return self;
        }
        Self {
            s: neg_mod(&self.s, &CURVE.n),
            recovery_id: self.recovery_id ^ 1,
            r: self.r,
        }
    }

    /// 65 bytes `r || s || v` with v = recovery id + 27
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r());
        out[32..64].copy_from_slice(&self.s());
        out[64] = self.recovery_id + V_OFFSET;
        out
    }

    /// Parse 65 bytes `r || s || v`; v may be 0..=3 or 27..=30
    pub fn from_bytes(bytes: &[u8]) -> TronResult<Self> {
        if bytes.len() != 65 {
            return Err(TronError::invalid_signature(format!(
                "Signature must be 65 bytes, got {}",
                bytes.len()
            )));
        }
        let v = bytes[64];
        let recovery_id = if v >= V_OFFSET { v - V_OFFSET } else { v };
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Self::new(r, s, recovery_id)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(hex_str: &str) -> TronResult<Self> {
        let trimmed = hex_str.trim();
        let clean = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        Self::from_bytes(&hex::decode(clean)?)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("r", &hex::encode(self.r()))
            .field("s", &hex::encode(self.s()))
            .field("recovery_id", &self.recovery_id)
            .finish()
    }
}

fn check_scalar(value: &BigUint, name: &str) -> TronResult<()> {
    if value.is_zero() || value >= &CURVE.n {
        return Err(TronError::invalid_scalar(format!("Signature {} is outside [1, n-1]", name)));
    }
    Ok(())
}

/// Digest as an integer mod n
fn digest_scalar(hash: &[u8; 32]) -> BigUint {
    BigUint::from_bytes_be(hash) % &CURVE.n
}

/// RFC 6979 section 3.2 candidate generator, HMAC-SHA256 instantiation
struct Rfc6979 {
    k: Zeroizing<[u8; 32]>,
    v: Zeroizing<[u8; 32]>,
}

impl Rfc6979 {
    fn new(key: &PrivateKey, hash: &[u8; 32]) -> TronResult<Self> {
        let x = Zeroizing::new(key.to_bytes());
        let h1 = to_bytes32(&digest_scalar(hash));

        let mut k = Zeroizing::new([0u8; 32]);
        let mut v = Zeroizing::new([1u8; 32]);

        *k = hmac_sha256(&k[..], &[&v[..], &[0x00u8][..], &x[..], &h1[..]])?;
        *v = hmac_sha256(&k[..], &[&v[..]])?;
        *k = hmac_sha256(&k[..], &[&v[..], &[0x01u8][..], &x[..], &h1[..]])?;
        *v = hmac_sha256(&k[..], &[&v[..]])?;

        Ok(Self { k, v })
    }

    /// Next candidate in [1, n-1]
    fn next_nonce(&mut self) -> TronResult<BigUint> {
        loop {
            *self.v = hmac_sha256(&self.k[..], &[&self.v[..]])?;
            let candidate = BigUint::from_bytes_be(&self.v[..]);
            self.reseed()?;
            if !candidate.is_zero() && candidate < CURVE.n {
                return Ok(candidate);
            }
        }
    }

    // Step h.3: advance the state so a later call yields a fresh candidate
    fn reseed(&mut self) -> TronResult<()> {
        *self.k = hmac_sha256(&self.k[..], &[&self.v[..], &[0x00u8][..]])?;
        *self.v = hmac_sha256(&self.k[..], &[&self.v[..]])?;
        Ok(())
    }
}

fn random_nonce() -> TronResult<BigUint> {
    let mut buf = Zeroizing::new([0u8; 32]);
    loop {
        OsRng.try_fill_bytes(&mut buf[..])?;
        let candidate = BigUint::from_bytes_be(&buf[..]);
        if !candidate.is_zero() && candidate < CURVE.n {
            return Ok(candidate);
        }
    }
}

/// Sign a 32-byte digest with low-S and RFC 6979 nonces
pub fn sign(hash: &[u8; 32], key: &PrivateKey) -> TronResult<Signature> {
    sign_with(hash, key, SignOptions::default())
}

pub fn sign_with(hash: &[u8; 32], key: &PrivateKey, options: SignOptions) -> TronResult<Signature> {
    let n = &CURVE.n;
    let d = key.scalar();
    let e = digest_scalar(hash);
    let mut rfc6979 = match options.nonce {
        NonceStrategy::Deterministic => Some(Rfc6979::new(key, hash)?),
        NonceStrategy::Random => None,
    };

    for attempt in 0..MAX_NONCE_ATTEMPTS {
        let k = match rfc6979.as_mut() {
            Some(generator) => generator.next_nonce()?,
            None => random_nonce()?,
        };

        let big_r = Point::mul_base(&k);
        let (rx, ry) = match (big_r.x(), big_r.y()) {
            (Some(x), Some(y)) => (x, y),
            _ => continue,
        };

        let r = rx % n;
        if r.is_zero() {
            log_debug!("ecdsa", "Nonce produced r = 0, retrying", attempt = attempt);
            continue;
        }

        let k_inv = match inv_n(&k) {
            Some(inv) => inv,
            None => continue,
        };
        let s = mul_mod(&k_inv, &((&e + mul_mod(&r, &d, n)) % n), n);
        if s.is_zero() {
            log_debug!("ecdsa", "Nonce produced s = 0, retrying", attempt = attempt);
            continue;
        }

        let mut recovery_id = if is_even(ry) { 0 } else { 1 };
        if rx >= n {
            recovery_id |= 2;
        }

        let signature = Signature { r, s, recovery_id };
        return Ok(if options.canonical {
            signature.normalize_s()
        } else {
            signature
        });
    }

    Err(TronError::internal("Failed to find a usable nonce"))
}

/// Check a signature against a public key. A well-formed signature that
/// does not match yields `Ok(false)`.
pub fn verify(hash: &[u8; 32], signature: &Signature, public_key: &PublicKey) -> TronResult<bool> {
    let n = &CURVE.n;
    let e = digest_scalar(hash);
    let w = inv_n(&signature.s)
        .ok_or_else(|| TronError::invalid_scalar("Signature s has no inverse"))?;
    let u1 = mul_mod(&e, &w, n);
    let u2 = mul_mod(&signature.r, &w, n);

    let point = Point::mul_add(&u1, &u2, public_key.point());
    Ok(match point.x() {
        Some(x) => (x % n) == signature.r,
        None => false,
    })
}

/// Verify raw `r`/`s` bytes; out-of-range scalars are an error, not `false`
pub fn verify_raw(
    hash: &[u8; 32],
    r: &[u8; 32],
    s: &[u8; 32],
    public_key: &PublicKey,
) -> TronResult<bool> {
    let signature = Signature::new(*r, *s, 0)?;
    verify(hash, &signature, public_key)
}

/// Recover the signer's public key from a digest and signature
pub fn recover(hash: &[u8; 32], signature: &Signature) -> TronResult<PublicKey> {
    let n = &CURVE.n;
    let p = &CURVE.p;

    let mut x = signature.r.clone();
    if signature.recovery_id & 2 != 0 {
        x += n;
        if &x >= p {
            return Err(TronError::invalid_signature("Recovered R.x exceeds the field"));
        }
    }
    let big_r = Point::lift_x(&x, signature.recovery_id & 1 == 1)
        .map_err(|_| TronError::invalid_signature("No curve point for signature r"))?;

    let r_inv = inv_n(&signature.r)
        .ok_or_else(|| TronError::invalid_signature("Signature r has no inverse"))?;
    let e = digest_scalar(hash);

    // Q = r^-1 (s R - e G)
    let u1 = mul_mod(&neg_mod(&e, n), &r_inv, n);
    let u2 = mul_mod(&signature.s, &r_inv, n);
    let q = Point::mul_add(&u1, &u2, &big_r);

    PublicKey::from_point(q).map_err(|_| TronError::invalid_signature("Recovered the point at infinity"))
}

/// Find which recovery id reproduces `public_key`, for signatures that
/// arrive without one
pub fn find_recovery_id(
    hash: &[u8; 32],
    r: &[u8; 32],
    s: &[u8; 32],
    public_key: &PublicKey,
) -> TronResult<u8> {
    for recovery_id in 0..4u8 {
        let candidate = Signature::new(*r, *s, recovery_id)?;
        if let Ok(recovered) = recover(hash, &candidate) {
            if &recovered == public_key {
                return Ok(recovery_id);
            }
        }
    }
    Err(TronError::invalid_signature("No recovery id reproduces the public key"))
}
