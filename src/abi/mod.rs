//! ABI (Application Binary Interface) module for TRON (TVM) contracts
//!
//! - Solidity type grammar (`uintN`, `intN`, `bytesN`, `T[]`, `T[N]`, tuples)
//! - Parameter encoding and bounds-checked decoding
//! - Function selectors and event topics
//! - JSON ABI parsing, including the TRON node format
//!
//! Addresses are 20-byte values on the wire; TRON Base58 and `41...` hex
//! inputs are accepted wherever an address value is built.

pub mod types;
pub mod encoder;
pub mod decoder;
pub mod parser;
pub mod selector;


pub use types::*;
pub use encoder::*;
pub use decoder::*;
pub use parser::*;
pub use selector::*;
