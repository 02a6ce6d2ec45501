//! Shared types for the TRON core
//!
//! Data structures that cross module boundaries live here so the CLI and
//! library callers serialize them the same way.

use serde::{Deserialize, Serialize};

// =============================================================================
// Network Types
// =============================================================================

/// Address version byte of the TRON network in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    /// Prefix 0x41, Base58 addresses start with `T`
    #[default]
    Mainnet,
    /// Prefix 0xa0, Base58 addresses start with `27`
    LegacyTestnet,
}

impl Network {
    pub fn prefix(&self) -> u8 {
        match self {
            Network::Mainnet => 0x41,
            Network::LegacyTestnet => 0xa0,
        }
    }

    pub fn from_prefix(prefix: u8) -> Option<Self> {
        match prefix {
            0x41 => Some(Network::Mainnet),
            0xa0 => Some(Network::LegacyTestnet),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::LegacyTestnet => "legacy-testnet",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "legacy-testnet" | "testnet" => Ok(Network::LegacyTestnet),
            _ => Err(format!("Unknown network: {}", s)),
        }
    }
}

// =============================================================================
// Wallet Types
// =============================================================================

/// Keys and address of one TRON account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TronKeys {
    pub private_hex: String,
    /// Uncompressed SEC1 public key
    pub public_hex: String,
    pub public_compressed_hex: String,
    /// Base58Check form (`T...`)
    pub address: String,
    /// 21-byte hex form (`41...`)
    pub address_hex: String,
    pub derivation_path: Option<String>,
}

/// Wallet creation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletResponse {
    pub mnemonic: Option<String>,
    pub network: Network,
    pub keys: TronKeys,
}
