//! Text encodings for keys and addresses

pub mod base58;

pub use base58::{check_decode, check_encode};
