//! Key Derivation Path Parsing and Validation
//!
//! Parses BIP-32 paths such as `m/44'/195'/0'/0/0` and checks them
//! against the BIP-44 layout TRON wallets use:
//! - Correct format and syntax
//! - TRON coin type (195)
//! - Warnings for unusual but legal paths

use std::fmt;
use std::str::FromStr;

use crate::error::{TronError, TronResult};

/// Standard BIP purposes
pub mod bip_purposes {
    pub const BIP44: u32 = 44;
}

/// Coin types from SLIP-0044
pub mod coin_types {
    pub const TRON: u32 = 195;
    pub const TESTNET: u32 = 1;
}

/// Hardened offset for BIP-32 derivation
pub const HARDENED: u32 = 0x8000_0000;

/// BIP-32 serializes depth in one byte
pub const MAX_DEPTH: usize = 255;

/// Default TRON account path
pub const TRON_DEFAULT_PATH: &str = "m/44'/195'/0'/0/0";

/// Parsed derivation path
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DerivationPath {
    pub components: Vec<DerivationComponent>,
}

/// Single component of a derivation path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationComponent {
    pub index: u32,
    pub hardened: bool,
}

impl DerivationComponent {
    pub fn new(index: u32, hardened: bool) -> Self {
        Self { index, hardened }
    }

    pub fn normal(index: u32) -> Self {
        Self::new(index, false)
    }

    pub fn hardened(index: u32) -> Self {
        Self::new(index, true)
    }

    /// Get the full index including hardened bit
    pub fn full_index(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED
        } else {
            self.index
        }
    }
}

impl fmt::Display for DerivationComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

impl DerivationPath {
    /// The master node itself, `m`
    pub fn master() -> Self {
        Self::default()
    }

    /// `m/44'/195'/account'/0/index`
    pub fn tron(account: u32, index: u32) -> Self {
        Self {
            components: vec![
                DerivationComponent::hardened(bip_purposes::BIP44),
                DerivationComponent::hardened(coin_types::TRON),
                DerivationComponent::hardened(account),
                DerivationComponent::normal(0),
                DerivationComponent::normal(index),
            ],
        }
    }

    pub fn depth(&self) -> usize {
        self.components.len()
    }

    /// Child indices with the hardened bit applied
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.components.iter().map(DerivationComponent::full_index)
    }

    pub fn purpose(&self) -> Option<u32> {
        self.components.first().map(|c| c.index)
    }

    pub fn coin_type(&self) -> Option<u32> {
        self.components.get(1).map(|c| c.index)
    }

    pub fn account(&self) -> Option<u32> {
        self.components.get(2).map(|c| c.index)
    }

    pub fn change(&self) -> Option<u32> {
        self.components.get(3).map(|c| c.index)
    }

    pub fn address_index(&self) -> Option<u32> {
        self.components.get(4).map(|c| c.index)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for component in &self.components {
            write!(f, "/{}", component)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = TronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s)
    }
}

/// Parse a derivation path string
pub fn parse_path(path: &str) -> TronResult<DerivationPath> {
    let trimmed = path.trim();

    let rest = match trimmed.strip_prefix('m').or_else(|| trimmed.strip_prefix('M')) {
        Some(rest) => rest,
        None => {
            return Err(TronError::invalid_path("Derivation path must start with 'm'")
                .with_details(trimmed.to_string()))
        }
    };
    if rest.is_empty() {
        return Ok(DerivationPath::master());
    }
    let body = rest.strip_prefix('/').ok_or_else(|| {
        TronError::invalid_path("Expected '/' after 'm'").with_details(trimmed.to_string())
    })?;

    let components = body
        .split('/')
        .map(parse_component)
        .collect::<TronResult<Vec<_>>>()?;

    if components.len() > MAX_DEPTH {
        return Err(TronError::invalid_path(format!(
            "Path depth {} exceeds {}",
            components.len(),
            MAX_DEPTH
        )));
    }

    Ok(DerivationPath { components })
}

/// Parse a single path component
fn parse_component(s: &str) -> TronResult<DerivationComponent> {
    if s.is_empty() {
        return Err(TronError::invalid_path("Empty path component"));
    }

    // Check for hardened indicator
    let (number_str, hardened) = match s.strip_suffix(['\'', 'h', 'H']) {
        Some(number) => (number, true),
        None => (s, false),
    };

    if number_str.is_empty() || !number_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TronError::invalid_path(format!("Invalid path component '{}'", s)));
    }
    let index: u32 = number_str
        .parse()
        .map_err(|_| TronError::invalid_path(format!("Path component '{}' is out of range", s)))?;

    // Check for overflow (excluding hardened bit)
    if index >= HARDENED {
        return Err(TronError::invalid_path(format!(
            "Path component {} exceeds maximum value",
            index
        )));
    }

    Ok(DerivationComponent::new(index, hardened))
}

/// Derivation path validation result
#[derive(Debug, Clone)]
pub struct PathValidation {
    pub is_valid: bool,
    pub path: Option<DerivationPath>,
    pub normalized: Option<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Parse a path and report deviations from the TRON BIP-44 layout
pub fn validate_derivation_path(path: &str) -> PathValidation {
    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    let parsed = match parse_path(path) {
        Ok(p) => p,
        Err(e) => {
            return PathValidation {
                is_valid: false,
                path: None,
                normalized: None,
                warnings: vec![],
                errors: vec![e.message],
            };
        }
    };

    if let Some(purpose) = parsed.purpose() {
        if purpose != bip_purposes::BIP44 {
            warnings.push(format!(
                "Non-standard purpose: {}. TRON wallets use 44",
                purpose
            ));
        }
    }

    if let Some(coin_type) = parsed.coin_type() {
        if coin_type == coin_types::TESTNET {
            errors.push("Using testnet coin type for TRON - keys will not match wallets".to_string());
        } else if coin_type != coin_types::TRON {
            warnings.push(format!(
                "Coin type {} is not standard for TRX (expected {})",
                coin_type,
                coin_types::TRON
            ));
        }
    }

    if let Some(account) = parsed.account() {
        if account > 100 {
            warnings.push(format!("Unusual account number: {}. Most wallets use 0", account));
        }
    }

    if let Some(change) = parsed.change() {
        if change > 1 {
            warnings.push(format!(
                "Non-standard change value: {}. Should be 0 (external) or 1 (internal/change)",
                change
            ));
        }
    }

    if let Some(index) = parsed.address_index() {
        if index > 10000 {
            warnings.push(format!("Very high address index: {}. This may indicate a problem", index));
        }
    }

    let has_unhardened_before_account =
        parsed.depth() >= 3 && parsed.components.iter().take(3).any(|c| !c.hardened);
    if has_unhardened_before_account {
        warnings.push("Purpose, coin type, and account should be hardened (')".to_string());
    }

    let normalized = parsed.to_string();

    PathValidation {
        is_valid: errors.is_empty(),
        path: Some(parsed),
        normalized: Some(normalized),
        warnings,
        errors,
    }
}

/// Require a path without validation errors
pub fn require_valid_path(path: &str) -> TronResult<DerivationPath> {
    let validation = validate_derivation_path(path);

    if !validation.is_valid {
        return Err(TronError::invalid_path(format!(
            "Invalid derivation path '{}': {}",
            path,
            validation.errors.join("; ")
        )));
    }

    validation
        .path
        .ok_or_else(|| TronError::internal("Path validation succeeded but path is None"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_parse_tron_path() {
        let path: DerivationPath = TRON_DEFAULT_PATH.parse().unwrap();
        assert_eq!(path, DerivationPath::tron(0, 0));
        assert_eq!(path.purpose(), Some(44));
        assert_eq!(path.coin_type(), Some(195));
        assert_eq!(path.address_index(), Some(0));
        assert_eq!(
            path.indices().collect::<Vec<_>>(),
            vec![44 | HARDENED, 195 | HARDENED, HARDENED, 0, 0]
        );
    }

    #[test]
    fn test_hardened_markers() {
        let path = parse_path("m/0h/1H/2'").unwrap();
        assert!(path.components.iter().all(|c| c.hardened));
        assert_eq!(path.to_string(), "m/0'/1'/2'");
    }

    #[test]
    fn test_master_only() {
        assert_eq!(parse_path("m").unwrap().depth(), 0);
    }

    #[test]
    fn test_invalid_paths() {
        for bad in ["", "44'/195'", "m/", "m//0", "m/abc", "m/-1", "m/1''", "m/2147483648", "m0/1", "m/'"] {
            let err = parse_path(bad).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidDerivationPath, "input {:?}", bad);
        }
    }

    #[test]
    fn test_max_index_accepted() {
        let path = parse_path("m/2147483647'").unwrap();
        assert_eq!(path.components[0].full_index(), u32::MAX);
    }

    #[test]
    fn test_wrong_coin_type_warning() {
        let result = validate_derivation_path("m/44'/60'/0'/0/0");
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("not standard")));
    }

    #[test]
    fn test_testnet_coin_type_is_error() {
        let result = validate_derivation_path("m/44'/1'/0'/0/0");
        assert!(!result.is_valid);
        assert!(require_valid_path("m/44'/1'/0'/0/0").is_err());
    }

    #[test]
    fn test_unhardened_warning() {
        let result = validate_derivation_path("m/44/195'/0'/0/0");
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("hardened")));
    }

    #[test]
    fn test_path_display() {
        let result = validate_derivation_path("m/44h/195h/0h/0/7");
        assert_eq!(result.normalized, Some("m/44'/195'/0'/0/7".to_string()));
        assert!(result.warnings.is_empty());
    }
}
