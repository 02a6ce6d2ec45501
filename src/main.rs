//! `tron-keygen`: offline TRON account generation
//!
//! ```bash
//! # Fresh 12-word wallet on mainnet
//! tron-keygen
//!
//! # Restore, second address, JSON output
//! tron-keygen --mnemonic "abandon ... about" --path "m/44'/195'/0'/0/1" --json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use tron_core::crypto::keys::PrivateKey;
use tron_core::log_warn;
use tron_core::message::sign_message;
use tron_core::utils::config::CoreConfig;
use tron_core::wallet::{generate_mnemonic, import_private_key, restore_wallet};
use tron_core::{Network, WalletResponse};

/// Generate or restore TRON keys without touching the network
#[derive(Debug, Parser)]
#[command(name = "tron-keygen")]
#[command(author, version, about = "Offline TRON key generator")]
struct Cli {
    /// Restore from this BIP-39 phrase instead of generating one
    #[arg(long, value_name = "PHRASE", conflicts_with = "private_key")]
    mnemonic: Option<String>,

    /// BIP-39 passphrase
    #[arg(long, default_value = "")]
    passphrase: String,

    /// Use an existing hex private key
    #[arg(long, value_name = "HEX")]
    private_key: Option<String>,

    /// BIP-44 derivation path
    #[arg(long, value_name = "PATH")]
    path: Option<String>,

    /// Words in a generated mnemonic (12, 15, 18, 21 or 24)
    #[arg(long)]
    words: Option<usize>,

    /// mainnet or legacy-testnet
    #[arg(long)]
    network: Option<Network>,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also sign this message with the resulting key
    #[arg(long, value_name = "TEXT")]
    sign_message: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Output {
    #[serde(flatten)]
    wallet: WalletResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_signature: Option<String>,
}

fn load_config(cli: &Cli) -> Result<CoreConfig> {
    let mut config = match &cli.config {
        Some(path) => CoreConfig::from_file(path)?,
        None => CoreConfig::default(),
    };
    if let Some(network) = cli.network {
        config.network = network;
    }
    if let Some(path) = &cli.path {
        config.derivation_path = path.clone();
    }
    if let Some(words) = cli.words {
        config.mnemonic_words = words;
    }
    if cli.verbose {
        config.debug_logging = true;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    config.apply_logging();
    for warning in config.warnings() {
        log_warn!("cli", warning);
    }

    let wallet = match (&cli.private_key, &cli.mnemonic) {
        (Some(key), _) => WalletResponse {
            mnemonic: None,
            network: config.network,
            keys: import_private_key(key, config.network)?,
        },
        (None, Some(phrase)) => restore_wallet(phrase, &cli.passphrase, &config)?,
        (None, None) => {
            let phrase = generate_mnemonic(config.mnemonic_words)?;
            restore_wallet(&phrase, &cli.passphrase, &config)?
        }
    };

    let message_signature = match &cli.sign_message {
        Some(message) => {
            let key = PrivateKey::from_hex(&wallet.keys.private_hex)?;
            Some(sign_message(message.as_bytes(), &key).context("signing message")?)
        }
        None => None,
    };

    let output = Output {
        wallet,
        message_signature,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text(&output);
    }

    Ok(())
}

fn print_text(output: &Output) {
    let keys = &output.wallet.keys;
    if let Some(mnemonic) = &output.wallet.mnemonic {
        println!("Mnemonic: {}", mnemonic);
    }
    if let Some(path) = &keys.derivation_path {
        println!("Derivation path: {}", path);
    }
    println!("Network: {}", output.wallet.network);
    println!("Private key (hex): {}", keys.private_hex);
    println!("Public key (hex): {}", keys.public_hex);
    println!("Public key (compressed hex): {}", keys.public_compressed_hex);
    println!("Address (hex): {}", keys.address_hex);
    println!("Address (base58): {}", keys.address);
    if let Some(signature) = &output.message_signature {
        println!("Message signature: {}", signature);
    }
}
