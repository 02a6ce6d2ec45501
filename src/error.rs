//! Unified error types for the TRON crypto core
//!
//! Every fallible operation returns [`TronResult`]. Callers branch on
//! [`ErrorCode`] instead of parsing messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all core operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TronError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl TronError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn invalid_scalar(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidScalarRange, msg)
    }

    pub fn not_on_curve(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::PointNotOnCurve, msg)
    }

    pub fn invalid_signature(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidSignature, msg)
    }

    pub fn checksum_mismatch(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ChecksumMismatch, msg)
    }

    pub fn invalid_mnemonic_length(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidMnemonicLength, msg)
    }

    pub fn invalid_mnemonic(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidMnemonic, msg)
    }

    pub fn insufficient_entropy(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InsufficientEntropy, msg)
    }

    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidDerivationPath, msg)
    }

    pub fn abi_type_mismatch(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::AbiTypeMismatch, msg)
    }

    pub fn abi_decode(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::AbiDecodeError, msg)
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAddress, msg)
    }

    pub fn invalid_base58(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidBase58, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }

    /// Error code accessor, handy in `matches!` assertions
    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl fmt::Display for TronError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for TronError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Curve and signature errors
    InvalidScalarRange,
    PointNotOnCurve,
    InvalidSignature,

    // Encoding errors
    ChecksumMismatch,
    InvalidBase58,
    InvalidAddress,

    // Mnemonic and derivation errors
    InvalidMnemonicLength,
    InvalidMnemonic,
    InsufficientEntropy,
    InvalidDerivationPath,

    // ABI errors
    AbiTypeMismatch,
    AbiDecodeError,

    // Input errors
    InvalidInput,
    JsonError,
    HexError,

    // Internal
    Internal,
}

/// Result type alias for core operations
pub type TronResult<T> = Result<T, TronError>;

// Conversions from common error types

impl From<serde_json::Error> for TronError {
    fn from(e: serde_json::Error) -> Self {
        TronError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for TronError {
    fn from(e: hex::FromHexError) -> Self {
        TronError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<std::io::Error> for TronError {
    fn from(e: std::io::Error) -> Self {
        TronError::new(ErrorCode::Internal, e.to_string())
    }
}

impl From<rand::Error> for TronError {
    fn from(e: rand::Error) -> Self {
        TronError::new(ErrorCode::InsufficientEntropy, "System randomness unavailable")
            .with_details(e.to_string())
    }
}

impl From<crate::abi::AbiError> for TronError {
    fn from(e: crate::abi::AbiError) -> Self {
        use crate::abi::AbiError;
        let code = match &e {
            AbiError::TypeMismatch { .. } | AbiError::InvalidValue(_) | AbiError::Overflow(_) => {
                ErrorCode::AbiTypeMismatch
            }
            AbiError::DecodingError(_) => ErrorCode::AbiDecodeError,
            _ => ErrorCode::InvalidInput,
        };
        TronError::new(code, e.to_string())
    }
}
