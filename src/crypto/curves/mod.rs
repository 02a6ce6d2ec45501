//! secp256k1 curve engine
//!
//! - `params`: domain constants
//! - `field`: modular arithmetic mod p and mod n
//! - `point`: affine group law, scalar multiplication, SEC1 encodings
//! - `traits` / `secp256k1`: the signer seam and its built-in backend

pub mod field;
pub mod params;
pub mod point;
pub mod secp256k1;
pub mod traits;

pub use point::Point;
pub use secp256k1::Secp256k1Curve;
pub use traits::*;
