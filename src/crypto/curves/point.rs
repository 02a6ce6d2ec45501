//! secp256k1 group elements
//!
//! Public operations work on affine points with an explicit identity.
//! Scalar multiplication runs in Jacobian coordinates and normalizes once
//! at the end, which keeps it to a single field inversion.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::field::{
    add_mod, curve_rhs, inv_p, is_even, mul_mod, neg_mod, sqrt_p, sub_mod, to_bytes32,
};
use super::params::CURVE;
use crate::error::{TronError, TronResult};

/// SEC1 tag of an uncompressed encoding
pub const TAG_UNCOMPRESSED: u8 = 0x04;
/// SEC1 tag of a compressed encoding with even y
pub const TAG_EVEN: u8 = 0x02;
/// SEC1 tag of a compressed encoding with odd y
pub const TAG_ODD: u8 = 0x03;

/// A point on secp256k1, or the point at infinity
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Point {
    Infinity,
    Affine { x: BigUint, y: BigUint },
}

impl Point {
    pub fn generator() -> Self {
        Point::Affine {
            x: CURVE.gx.clone(),
            y: CURVE.gy.clone(),
        }
    }

    /// Build an affine point, rejecting coordinates off the curve
    pub fn new(x: BigUint, y: BigUint) -> TronResult<Self> {
        if x >= CURVE.p || y >= CURVE.p {
            return Err(TronError::not_on_curve("Coordinate is not a field element"));
        }
        let point = Point::Affine { x, y };
        if !point.is_on_curve() {
            return Err(TronError::not_on_curve("Coordinates do not satisfy y^2 = x^3 + 7"));
        }
        Ok(point)
    }

    /// Point with abscissa `x` and the requested y parity
    pub fn lift_x(x: &BigUint, odd: bool) -> TronResult<Self> {
        if x >= &CURVE.p {
            return Err(TronError::not_on_curve("x is not a field element"));
        }
        let y = sqrt_p(&curve_rhs(x))
            .ok_or_else(|| TronError::not_on_curve("x^3 + 7 has no square root"))?;
        let y = if is_even(&y) == odd { neg_mod(&y, &CURVE.p) } else { y };
        Ok(Point::Affine { x: x.clone(), y })
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, Point::Infinity)
    }

    pub fn x(&self) -> Option<&BigUint> {
        match self {
            Point::Infinity => None,
            Point::Affine { x, .. } => Some(x),
        }
    }

    pub fn y(&self) -> Option<&BigUint> {
        match self {
            Point::Infinity => None,
            Point::Affine { y, .. } => Some(y),
        }
    }

    /// Whether the point satisfies the curve equation. The identity counts
    /// as a group member.
    pub fn is_on_curve(&self) -> bool {
        match self {
            Point::Infinity => true,
            Point::Affine { x, y } => mul_mod(y, y, &CURVE.p) == curve_rhs(x),
        }
    }

    pub fn negate(&self) -> Self {
        match self {
            Point::Infinity => Point::Infinity,
            Point::Affine { x, y } => Point::Affine {
                x: x.clone(),
                y: neg_mod(y, &CURVE.p),
            },
        }
    }

    /// Affine addition with the doubling and inverse-pair special cases
    pub fn add(&self, other: &Point) -> Self {
        let (x1, y1, x2, y2) = match (self, other) {
            (Point::Infinity, _) => return other.clone(),
            (_, Point::Infinity) => return self.clone(),
            (Point::Affine { x: x1, y: y1 }, Point::Affine { x: x2, y: y2 }) => (x1, y1, x2, y2),
        };
        let p = &CURVE.p;

        if x1 == x2 {
            return if y1 == y2 { self.double() } else { Point::Infinity };
        }

        let num = sub_mod(y2, y1, p);
        let den = sub_mod(x2, x1, p);
        let lambda = match inv_p(&den) {
            Some(inv) => mul_mod(&num, &inv, p),
            None => return Point::Infinity,
        };
        let x3 = sub_mod(&sub_mod(&mul_mod(&lambda, &lambda, p), x1, p), x2, p);
        let y3 = sub_mod(&mul_mod(&lambda, &sub_mod(x1, &x3, p), p), y1, p);
        Point::Affine { x: x3, y: y3 }
    }

    pub fn double(&self) -> Self {
        let (x, y) = match self {
            Point::Infinity => return Point::Infinity,
            Point::Affine { x, y } => (x, y),
        };
        if y.is_zero() {
            return Point::Infinity;
        }
        let p = &CURVE.p;

        let three_x2 = mul_mod(&BigUint::from(3u32), &mul_mod(x, x, p), p);
        let two_y = add_mod(y, y, p);
        let lambda = match inv_p(&two_y) {
            Some(inv) => mul_mod(&three_x2, &inv, p),
            None => return Point::Infinity,
        };
        let x3 = sub_mod(&mul_mod(&lambda, &lambda, p), &add_mod(x, x, p), p);
        let y3 = sub_mod(&mul_mod(&lambda, &sub_mod(x, &x3, p), p), y, p);
        Point::Affine { x: x3, y: y3 }
    }

    /// k * self by left-to-right double-and-add. `k = 0` gives infinity.
    pub fn mul(&self, k: &BigUint) -> Self {
        if self.is_infinity() || k.is_zero() {
            return Point::Infinity;
        }
        let mut acc = Jacobian::infinity();
        for byte in k.to_bytes_be() {
            for bit in (0..8).rev() {
                acc = acc.double();
                if (byte >> bit) & 1 == 1 {
                    acc = acc.add_affine(self);
                }
            }
        }
        acc.to_affine()
    }

    /// k * G
    pub fn mul_base(k: &BigUint) -> Self {
        Point::generator().mul(k)
    }

    /// a * G + b * Q, the shape shared by verification and recovery
    pub fn mul_add(a: &BigUint, b: &BigUint, q: &Point) -> Self {
        Point::mul_base(a).add(&q.mul(b))
    }

    /// 33-byte SEC1 compressed encoding
    pub fn to_compressed(&self) -> TronResult<[u8; 33]> {
        let (x, y) = self.coords()?;
        let mut out = [0u8; 33];
        out[0] = if is_even(y) { TAG_EVEN } else { TAG_ODD };
        out[1..].copy_from_slice(&to_bytes32(x));
        Ok(out)
    }

    /// 65-byte SEC1 uncompressed encoding
    pub fn to_uncompressed(&self) -> TronResult<[u8; 65]> {
        let (x, y) = self.coords()?;
        let mut out = [0u8; 65];
        out[0] = TAG_UNCOMPRESSED;
        out[1..33].copy_from_slice(&to_bytes32(x));
        out[33..].copy_from_slice(&to_bytes32(y));
        Ok(out)
    }

    /// Parse a SEC1 encoding (33 or 65 bytes)
    pub fn from_sec1(bytes: &[u8]) -> TronResult<Self> {
        match (bytes.len(), bytes.first()) {
            (33, Some(&tag)) if tag == TAG_EVEN || tag == TAG_ODD => {
                let x = BigUint::from_bytes_be(&bytes[1..]);
                Point::lift_x(&x, tag == TAG_ODD)
            }
            (65, Some(&TAG_UNCOMPRESSED)) => Point::new(
                BigUint::from_bytes_be(&bytes[1..33]),
                BigUint::from_bytes_be(&bytes[33..]),
            ),
            _ => Err(TronError::invalid_input(format!(
                "Unsupported public key encoding ({} bytes)",
                bytes.len()
            ))),
        }
    }

    fn coords(&self) -> TronResult<(&BigUint, &BigUint)> {
        match self {
            Point::Infinity => Err(TronError::not_on_curve("The point at infinity has no encoding")),
            Point::Affine { x, y } => Ok((x, y)),
        }
    }
}

/// Jacobian representation (X/Z^2, Y/Z^3); Z = 0 is the identity
struct Jacobian {
    x: BigUint,
    y: BigUint,
    z: BigUint,
}

impl Jacobian {
    fn infinity() -> Self {
        Self {
            x: BigUint::one(),
            y: BigUint::one(),
            z: BigUint::zero(),
        }
    }

    fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }

    fn double(&self) -> Self {
        if self.is_infinity() || self.y.is_zero() {
            return Self::infinity();
        }
        let p = &CURVE.p;
        let y2 = mul_mod(&self.y, &self.y, p);
        // S = 4 X Y^2, M = 3 X^2
        let s = mul_mod(&BigUint::from(4u32), &mul_mod(&self.x, &y2, p), p);
        let m = mul_mod(&BigUint::from(3u32), &mul_mod(&self.x, &self.x, p), p);
        let x3 = sub_mod(&mul_mod(&m, &m, p), &add_mod(&s, &s, p), p);
        let y4_8 = mul_mod(&BigUint::from(8u32), &mul_mod(&y2, &y2, p), p);
        let y3 = sub_mod(&mul_mod(&m, &sub_mod(&s, &x3, p), p), &y4_8, p);
        let z3 = mul_mod(&add_mod(&self.y, &self.y, p), &self.z, p);
        Self { x: x3, y: y3, z: z3 }
    }

    /// Mixed addition with an affine operand (Z2 = 1)
    fn add_affine(&self, other: &Point) -> Self {
        let (x2, y2) = match other {
            Point::Infinity => return self.clone_point(),
            Point::Affine { x, y } => (x, y),
        };
        if self.is_infinity() {
            return Self {
                x: x2.clone(),
                y: y2.clone(),
                z: BigUint::one(),
            };
        }
        let p = &CURVE.p;
        let z1z1 = mul_mod(&self.z, &self.z, p);
        let u2 = mul_mod(x2, &z1z1, p);
        let s2 = mul_mod(y2, &mul_mod(&self.z, &z1z1, p), p);

        if u2 == self.x {
            return if s2 == self.y { self.double() } else { Self::infinity() };
        }

        let h = sub_mod(&u2, &self.x, p);
        let r = sub_mod(&s2, &self.y, p);
        let h2 = mul_mod(&h, &h, p);
        let h3 = mul_mod(&h2, &h, p);
        let u1h2 = mul_mod(&self.x, &h2, p);
        let x3 = sub_mod(
            &sub_mod(&mul_mod(&r, &r, p), &h3, p),
            &add_mod(&u1h2, &u1h2, p),
            p,
        );
        let y3 = sub_mod(
            &mul_mod(&r, &sub_mod(&u1h2, &x3, p), p),
            &mul_mod(&self.y, &h3, p),
            p,
        );
        let z3 = mul_mod(&h, &self.z, p);
        Self { x: x3, y: y3, z: z3 }
    }

    fn clone_point(&self) -> Self {
        Self {
            x: self.x.clone(),
            y: self.y.clone(),
            z: self.z.clone(),
        }
    }

    fn to_affine(&self) -> Point {
        if self.is_infinity() {
            return Point::Infinity;
        }
        let p = &CURVE.p;
        let zinv = match inv_p(&self.z) {
            Some(inv) => inv,
            None => return Point::Infinity,
        };
        let zinv2 = mul_mod(&zinv, &zinv, p);
        let zinv3 = mul_mod(&zinv2, &zinv, p);
        Point::Affine {
            x: mul_mod(&self.x, &zinv2, p),
            y: mul_mod(&self.y, &zinv3, p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(hex_str: &str) -> BigUint {
        BigUint::parse_bytes(hex_str.as_bytes(), 16).unwrap()
    }

    #[test]
    fn test_generator_on_curve() {
        assert!(Point::generator().is_on_curve());
    }

    #[test]
    fn test_two_g() {
        let two_g = Point::generator().double();
        assert_eq!(
            two_g.x().unwrap(),
            &scalar("c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5")
        );
        assert_eq!(
            two_g.y().unwrap(),
            &scalar("1ae168fea63dc339a3c58419466ceaeef7f632653266d0e1236431a950cfe52a")
        );
        assert_eq!(Point::mul_base(&BigUint::from(2u32)), two_g);
    }

    #[test]
    fn test_three_g() {
        let g = Point::generator();
        let three_g = g.double().add(&g);
        assert_eq!(
            three_g.x().unwrap(),
            &scalar("f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9")
        );
        assert_eq!(Point::mul_base(&BigUint::from(3u32)), three_g);
    }

    #[test]
    fn test_jacobian_matches_affine_chain() {
        let g = Point::generator();
        let mut expected = Point::Infinity;
        for k in 1u32..=20 {
            expected = expected.add(&g);
            assert_eq!(Point::mul_base(&BigUint::from(k)), expected, "k = {}", k);
        }
    }

    #[test]
    fn test_order_annihilates_generator() {
        assert!(Point::mul_base(&CURVE.n).is_infinity());
        let n_minus_1 = &CURVE.n - 1u32;
        assert_eq!(Point::mul_base(&n_minus_1), Point::generator().negate());
    }

    #[test]
    fn test_zero_scalar_and_identity() {
        assert!(Point::mul_base(&BigUint::zero()).is_infinity());
        assert!(Point::Infinity.mul(&BigUint::from(5u32)).is_infinity());
        let g = Point::generator();
        assert!(g.add(&g.negate()).is_infinity());
        assert_eq!(Point::Infinity.add(&g), g);
        assert_eq!(g.add(&Point::Infinity), g);
    }

    #[test]
    fn test_sec1_roundtrip() {
        let point = Point::mul_base(&BigUint::from(0xdeadbeefu32));
        let compressed = point.to_compressed().unwrap();
        let uncompressed = point.to_uncompressed().unwrap();
        assert_eq!(Point::from_sec1(&compressed).unwrap(), point);
        assert_eq!(Point::from_sec1(&uncompressed).unwrap(), point);
    }

    #[test]
    fn test_generator_compressed_encoding() {
        assert_eq!(
            hex::encode(Point::generator().to_compressed().unwrap()),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }

    #[test]
    fn test_rejects_off_curve() {
        let err = Point::new(CURVE.gx.clone(), &CURVE.gy + 1u32).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::PointNotOnCurve);

        let mut bad = Point::generator().to_uncompressed().unwrap();
        bad[64] ^= 1;
        assert!(Point::from_sec1(&bad).is_err());
        assert!(Point::from_sec1(&[0x05; 33]).is_err());
        assert!(Point::Infinity.to_compressed().is_err());
    }
}
