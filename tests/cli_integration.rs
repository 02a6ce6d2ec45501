use serde_json::Value;
use std::process::{Command, Output};
use tron_core::{restore_from_mnemonic, verify_message, Address, Network, PrivateKey, TronKeys};

const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

fn run_cli(args: &[&str]) -> Output {
    let binary_path = assert_cmd::cargo::cargo_bin!("tron-keygen");
    Command::new(binary_path)
        .args(args)
        .output()
        .expect("cli runs")
}

fn json_from_cli(args: &[&str]) -> Value {
    let output = run_cli(args);
    assert!(
        output.status.success(),
        "cli exited unsuccessfully: {:?}",
        output
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout is utf8");
    serde_json::from_str(&stdout).expect("stdout is valid json")
}

fn keys_of(value: &Value) -> TronKeys {
    serde_json::from_value(value["keys"].clone()).expect("json matches TronKeys schema")
}

#[test]
fn cli_emits_consistent_key_material() {
    let value = json_from_cli(&["--json"]);
    let keys = keys_of(&value);

    let phrase = value["mnemonic"].as_str().expect("mnemonic present");
    assert_eq!(phrase.split_whitespace().count(), 12);
    assert_eq!(value["network"], "mainnet");

    let private_key = PrivateKey::from_hex(&keys.private_hex).expect("private hex");
    let public_key = private_key.public_key();
    assert_eq!(public_key.to_hex(), keys.public_hex, "public key matches private key");
    assert_eq!(public_key.to_compressed_hex(), keys.public_compressed_hex);

    let address = Address::from_public_key(&public_key, Network::Mainnet);
    assert_eq!(address.to_base58(), keys.address, "base58 address matches");
    assert_eq!(address.to_hex(), keys.address_hex, "hex address matches");
    assert_eq!(keys.derivation_path.as_deref(), Some("m/44'/195'/0'/0/0"));
}

#[test]
fn cli_restores_known_mnemonic() {
    let value = json_from_cli(&["--mnemonic", ABANDON_ABOUT, "--json"]);
    let expected = restore_from_mnemonic(ABANDON_ABOUT).expect("library restore");
    assert_eq!(keys_of(&value), expected.keys);
    assert_eq!(value["keys"]["address"], "TUEZSdKsoDHQMeZwihtdoBiN46zxhGWYdH");
}

#[test]
fn cli_honours_path_words_and_network() {
    let value = json_from_cli(&[
        "--mnemonic",
        ABANDON_ABOUT,
        "--path",
        "m/44'/195'/0'/0/1",
        "--network",
        "legacy-testnet",
        "--json",
    ]);
    let keys = keys_of(&value);
    assert!(keys.address.starts_with("27"));
    assert!(keys.address_hex.starts_with("a0"));
    assert_eq!(keys.derivation_path.as_deref(), Some("m/44'/195'/0'/0/1"));

    let long = json_from_cli(&["--words", "24", "--json"]);
    let phrase = long["mnemonic"].as_str().expect("mnemonic present");
    assert_eq!(phrase.split_whitespace().count(), 24);
}

#[test]
fn cli_signs_message_with_imported_key() {
    let value = json_from_cli(&[
        "--private-key",
        "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35",
        "--sign-message",
        "hello tron",
        "--json",
    ]);
    assert!(value["mnemonic"].is_null());
    let keys = keys_of(&value);
    let signature = value["message_signature"].as_str().expect("signature present");
    assert!(verify_message(b"hello tron", signature, &keys.address).expect("verify"));
}

#[test]
fn cli_text_output() {
    let output = run_cli(&["--mnemonic", ABANDON_ABOUT]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout is utf8");
    assert!(stdout.contains("Mnemonic: abandon"));
    assert!(stdout.contains("Address (base58): T"));
    assert!(stdout.contains("Address (hex): 41"));
}

#[test]
fn cli_rejects_bad_input() {
    let bad_phrase = run_cli(&["--mnemonic", "abandon abandon abandon", "--json"]);
    assert!(!bad_phrase.status.success());

    let bad_words = run_cli(&["--words", "13"]);
    assert!(!bad_words.status.success());

    let bad_path = run_cli(&["--path", "44'/195'"]);
    assert!(!bad_path.status.success());

    let bad_key = run_cli(&["--private-key", "00"]);
    assert!(!bad_key.status.success());
}
