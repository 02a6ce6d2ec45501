//! secp256k1 key types
//!
//! `PrivateKey` holds a scalar in [1, n-1] and zeroizes on drop. Its
//! `Debug` output is redacted; raw bytes only leave through the explicit
//! `to_bytes`/`to_hex` exports.

use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::curves::field::to_bytes32;
use super::curves::params::CURVE;
use super::curves::point::Point;
use crate::error::{TronError, TronResult};

// A uniform 32-byte draw falls outside [1, n-1] with probability < 2^-127
const MAX_KEYGEN_ATTEMPTS: usize = 8;

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Accept exactly 32 big-endian bytes encoding a scalar in [1, n-1]
    pub fn from_bytes(bytes: &[u8]) -> TronResult<Self> {
        let raw: [u8; 32] = bytes.try_into().map_err(|_| {
            TronError::invalid_input(format!("Private key must be 32 bytes, got {}", bytes.len()))
        })?;
        let k = BigUint::from_bytes_be(&raw);
        if k.is_zero() || k >= CURVE.n {
            return Err(TronError::invalid_scalar("Private key is outside [1, n-1]"));
        }
        Ok(Self(raw))
    }

    /// Parse a 64-character hex string, with or without `0x`
    pub fn from_hex(hex_str: &str) -> TronResult<Self> {
        let trimmed = hex_str.trim();
        let clean = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = Zeroizing::new(hex::decode(clean)?);
        Self::from_bytes(&bytes)
    }

    /// Fresh key from the operating system CSPRNG
    pub fn random() -> TronResult<Self> {
        let mut buf = Zeroizing::new([0u8; 32]);
        for _ in 0..MAX_KEYGEN_ATTEMPTS {
            OsRng.try_fill_bytes(&mut buf[..])?;
            if let Ok(key) = Self::from_bytes(&buf[..]) {
                return Ok(key);
            }
        }
        Err(TronError::insufficient_entropy(
            "Random source kept producing out-of-range scalars",
        ))
    }

    pub(crate) fn from_scalar(k: &BigUint) -> TronResult<Self> {
        if k.is_zero() || k >= &CURVE.n {
            return Err(TronError::invalid_scalar("Derived scalar is outside [1, n-1]"));
        }
        Ok(Self(to_bytes32(k)))
    }

    pub(crate) fn scalar(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    /// Export the raw scalar
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Export the raw scalar as lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            point: Point::mul_base(&self.scalar()),
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for PrivateKey {}

/// A validated affine point, never the identity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    point: Point,
}

impl PublicKey {
    pub fn from_point(point: Point) -> TronResult<Self> {
        if point.is_infinity() {
            return Err(TronError::not_on_curve("Public key cannot be the point at infinity"));
        }
        if !point.is_on_curve() {
            return Err(TronError::not_on_curve("Public key is not on secp256k1"));
        }
        Ok(Self { point })
    }

    /// Parse SEC1 (33 or 65 bytes) or a raw 64-byte `x || y`
    pub fn from_bytes(bytes: &[u8]) -> TronResult<Self> {
        let point = if bytes.len() == 64 {
            let mut sec1 = [0u8; 65];
            sec1[0] = super::curves::point::TAG_UNCOMPRESSED;
            sec1[1..].copy_from_slice(bytes);
            Point::from_sec1(&sec1)?
        } else {
            Point::from_sec1(bytes)?
        };
        Self::from_point(point)
    }

    pub fn from_hex(hex_str: &str) -> TronResult<Self> {
        let trimmed = hex_str.trim();
        let clean = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        Self::from_bytes(&hex::decode(clean)?)
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn to_compressed(&self) -> [u8; 33] {
        // from_point guarantees an affine point
        self.point.to_compressed().unwrap_or([0u8; 33])
    }

    pub fn to_uncompressed(&self) -> [u8; 65] {
        self.point.to_uncompressed().unwrap_or([0u8; 65])
    }

    /// Uncompressed SEC1 hex, the form TRON tooling prints
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_uncompressed())
    }

    pub fn to_compressed_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }
}
