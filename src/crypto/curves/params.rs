//! secp256k1 domain parameters (SEC 2, section 2.4.1)

use lazy_static::lazy_static;
use num_bigint::BigUint;

/// Field modulus p = 2^256 - 2^32 - 977
pub const P_BYTES: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFE, 0xFF, 0xFF, 0xFC, 0x2F,
];

/// Group order n
pub const N_BYTES: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B,
    0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

pub const GX_BYTES: [u8; 32] = [
    0x79, 0xBE, 0x66, 0x7E, 0xF9, 0xDC, 0xBB, 0xAC,
    0x55, 0xA0, 0x62, 0x95, 0xCE, 0x87, 0x0B, 0x07,
    0x02, 0x9B, 0xFC, 0xDB, 0x2D, 0xCE, 0x28, 0xD9,
    0x59, 0xF2, 0x81, 0x5B, 0x16, 0xF8, 0x17, 0x98,
];

pub const GY_BYTES: [u8; 32] = [
    0x48, 0x3A, 0xDA, 0x77, 0x26, 0xA3, 0xC4, 0x65,
    0x5D, 0xA4, 0xFB, 0xFC, 0x0E, 0x11, 0x08, 0xA8,
    0xFD, 0x17, 0xB4, 0x48, 0xA6, 0x85, 0x54, 0x19,
    0x9C, 0x47, 0xD0, 0x8F, 0xFB, 0x10, 0xD4, 0xB8,
];

/// Curve coefficient b in y^2 = x^3 + b (a is zero)
pub const B: u32 = 7;

/// Domain parameters as big integers, built once
pub struct CurveParams {
    pub p: BigUint,
    pub n: BigUint,
    pub b: BigUint,
    pub gx: BigUint,
    pub gy: BigUint,
    /// floor(n / 2), the low-S bound
    pub half_n: BigUint,
    /// (p + 1) / 4, square root exponent since p = 3 mod 4
    pub sqrt_exp: BigUint,
}

lazy_static! {
    pub static ref CURVE: CurveParams = {
        let p = BigUint::from_bytes_be(&P_BYTES);
        let n = BigUint::from_bytes_be(&N_BYTES);
        let sqrt_exp = (&p + 1u32) >> 2;
        let half_n = &n >> 1;
        CurveParams {
            b: BigUint::from(B),
            gx: BigUint::from_bytes_be(&GX_BYTES),
            gy: BigUint::from_bytes_be(&GY_BYTES),
            p,
            n,
            half_n,
            sqrt_exp,
        }
    };
}
