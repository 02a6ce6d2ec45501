//! BIP-39 mnemonics
//!
//! Entropy of 128-256 bits plus `ENT/32` checksum bits from SHA-256 is cut
//! into 11-bit groups, each selecting a word from the English list. Seeds
//! are stretched with PBKDF2-HMAC-SHA512 over the NFKD-normalized phrase.
//!
//! SECURITY: entropy, phrase and seed buffers are zeroized on drop.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha512;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use crate::crypto::hash::sha256;
use crate::error::{TronError, TronResult};

const ENGLISH: &str = include_str!("wordlist/english.txt");

/// Words in a BIP-39 list
pub const WORDLIST_SIZE: usize = 2048;
/// PBKDF2 iteration count for seed stretching
pub const PBKDF2_ROUNDS: u32 = 2048;
/// Seed length in bytes
pub const SEED_LEN: usize = 64;
/// Accepted phrase lengths
pub const WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

const BITS_PER_WORD: usize = 11;

lazy_static! {
    static ref WORDLIST: Vec<&'static str> = ENGLISH.lines().map(str::trim).collect();
    static ref WORD_INDEX: HashMap<&'static str, u16> = WORDLIST
        .iter()
        .enumerate()
        .map(|(i, w)| (*w, i as u16))
        .collect();
}

/// The English wordlist, in index order
pub fn wordlist() -> &'static [&'static str] {
    &WORDLIST
}

/// Entropy length in bytes for a phrase of `word_count` words
pub fn entropy_len_for(word_count: usize) -> TronResult<usize> {
    if !WORD_COUNTS.contains(&word_count) {
        return Err(TronError::invalid_mnemonic_length(format!(
            "Mnemonic must have 12, 15, 18, 21 or 24 words, got {}",
            word_count
        )));
    }
    // 11 bits per word, of which 1 in 33 is checksum
    Ok(word_count * BITS_PER_WORD * 32 / 33 / 8)
}

/// Bit `i` of `entropy ‖ sha256(entropy)`, most significant first
fn bit_at(entropy: &[u8], checksum: &[u8; 32], i: usize) -> u16 {
    let byte_index = i / 8;
    let byte = if byte_index < entropy.len() {
        entropy[byte_index]
    } else {
        checksum[byte_index - entropy.len()]
    };
    u16::from((byte >> (7 - i % 8)) & 1)
}

#[derive(Clone)]
pub struct Mnemonic {
    entropy: Zeroizing<Vec<u8>>,
    phrase: Zeroizing<String>,
}

impl Mnemonic {
    /// Draw fresh entropy from the OS for a `word_count`-word phrase
    pub fn generate(word_count: usize) -> TronResult<Self> {
        let len = entropy_len_for(word_count)?;
        let mut entropy = Zeroizing::new(vec![0u8; len]);
        OsRng.try_fill_bytes(&mut entropy[..])?;
        Self::from_entropy(&entropy)
    }

    pub fn from_entropy(entropy: &[u8]) -> TronResult<Self> {
        let word_count = match entropy.len() {
            16 | 20 | 24 | 28 | 32 => entropy.len() * 8 * 33 / 32 / BITS_PER_WORD,
            other => {
                return Err(TronError::invalid_mnemonic_length(format!(
                    "Entropy must be 16, 20, 24, 28 or 32 bytes, got {}",
                    other
                )))
            }
        };

        let checksum = sha256(entropy);
        let mut phrase = Zeroizing::new(String::new());
        for w in 0..word_count {
            let index = (0..BITS_PER_WORD).fold(0u16, |acc, j| {
                (acc << 1) | bit_at(entropy, &checksum, w * BITS_PER_WORD + j)
            });
            if w > 0 {
                phrase.push(' ');
            }
            phrase.push_str(WORDLIST[usize::from(index)]);
        }

        Ok(Self {
            entropy: Zeroizing::new(entropy.to_vec()),
            phrase,
        })
    }

    /// Parse and verify a phrase
    ///
    /// Words are matched after NFKD normalization and lowercasing, with any
    /// run of whitespace as separator.
    pub fn parse(phrase: &str) -> TronResult<Self> {
        let normalized = Zeroizing::new(phrase.nfkd().collect::<String>().to_lowercase());
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let entropy_len = entropy_len_for(words.len())?;

        let mut indices = Vec::with_capacity(words.len());
        for (pos, word) in words.iter().enumerate() {
            let index = WORD_INDEX.get(*word).ok_or_else(|| {
                TronError::invalid_mnemonic("Word is not in the BIP-39 English list")
                    .with_details(format!("position {}", pos + 1))
            })?;
            indices.push(*index);
        }

        let total_bits = words.len() * BITS_PER_WORD;
        let mut bits = Zeroizing::new(vec![0u8; (total_bits + 7) / 8]);
        for (w, index) in indices.iter().enumerate() {
            for j in 0..BITS_PER_WORD {
                if (index >> (BITS_PER_WORD - 1 - j)) & 1 == 1 {
                    let i = w * BITS_PER_WORD + j;
                    bits[i / 8] |= 0x80 >> (i % 8);
                }
            }
        }

        let entropy = &bits[..entropy_len];
        let checksum_bits = entropy_len * 8 / 32;
        let expected = sha256(entropy)[0] >> (8 - checksum_bits);
        let actual = bits[entropy_len] >> (8 - checksum_bits);
        if expected != actual {
            return Err(TronError::checksum_mismatch("Mnemonic checksum does not match"));
        }

        Self::from_entropy(entropy)
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn entropy(&self) -> &[u8] {
        &self.entropy
    }

    pub fn word_count(&self) -> usize {
        self.phrase.split(' ').count()
    }

    /// PBKDF2-HMAC-SHA512, 2048 rounds, salt `"mnemonic" + passphrase`
    pub fn to_seed(&self, passphrase: &str) -> Zeroizing<[u8; SEED_LEN]> {
        seed_from_phrase(&self.phrase, passphrase)
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mnemonic([REDACTED; {} words])", self.word_count())
    }
}

fn seed_from_phrase(phrase: &str, passphrase: &str) -> Zeroizing<[u8; SEED_LEN]> {
    let password = Zeroizing::new(phrase.nfkd().collect::<String>());
    let salt = Zeroizing::new(format!("mnemonic{}", passphrase.nfkd().collect::<String>()));
    let mut seed = Zeroizing::new([0u8; SEED_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha512>(password.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS, &mut seed[..]);
    seed
}

/// True when the phrase has a valid length, known words and checksum
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse(phrase).is_ok()
}

/// Verify a phrase and stretch it into a 64-byte seed
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> TronResult<Zeroizing<[u8; SEED_LEN]>> {
    Ok(Mnemonic::parse(phrase)?.to_seed(passphrase))
}

/// Generate a new phrase of `word_count` words
pub fn generate_mnemonic(word_count: usize) -> TronResult<String> {
    Ok(Mnemonic::generate(word_count)?.phrase().to_string())
}
