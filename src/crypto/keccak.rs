//! Keccak permutation and sponge
//!
//! The permutation is generic over the lane word so the same round code
//! drives Keccak-f[1600] (`u64`, 24 rounds), Keccak-f[800] (`u32`, 22
//! rounds) and Keccak-f[400] (`u16`, 20 rounds). The sponge on top of it
//! covers legacy Keccak (domain suffix `0x01`), FIPS-202 SHA-3 (`0x06`)
//! and SHAKE (`0x1f`).
//!
//! Lanes are loaded little-endian byte by byte, so output does not depend
//! on host byte order.

use std::ops::{BitAnd, BitXor, Not};

use crate::error::{TronError, TronResult};

/// Domain suffix of the original Keccak submission (Ethereum/TRON hashing)
pub const KECCAK_SUFFIX: u8 = 0x01;
/// Domain suffix of FIPS-202 SHA3-*
pub const SHA3_SUFFIX: u8 = 0x06;
/// Domain suffix of FIPS-202 SHAKE*
pub const SHAKE_SUFFIX: u8 = 0x1f;

const ROUND_CONSTANTS: [u64; 24] = [
    0x0000000000000001,
    0x0000000000008082,
    0x800000000000808A,
    0x8000000080008000,
    0x000000000000808B,
    0x0000000080000001,
    0x8000000080008081,
    0x8000000000008009,
    0x000000000000008A,
    0x0000000000000088,
    0x0000000080008009,
    0x000000008000000A,
    0x000000008000808B,
    0x800000000000008B,
    0x8000000000008089,
    0x8000000000008003,
    0x8000000000008002,
    0x8000000000000080,
    0x000000000000800A,
    0x800000008000000A,
    0x8000000080008081,
    0x8000000000008080,
    0x0000000080000001,
    0x8000000080008008,
];

// Combined rho offsets and pi lane order, walked from lane 1
const RHO: [u32; 24] = [
    1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 2, 14, 27, 41, 56, 8, 25, 43, 62, 18, 39, 61, 20, 44,
];
const PI: [usize; 24] = [
    10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4, 15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1,
];

/// Lane word of a Keccak-f state
pub trait Lane:
    Copy + Default + PartialEq + BitXor<Output = Self> + BitAnd<Output = Self> + Not<Output = Self>
{
    /// Lane width in bits
    const BITS: u32;
    /// Number of rounds, 12 + 2*log2(BITS)
    const ROUNDS: usize;

    fn rotl(self, n: u32) -> Self;
    /// Round constant truncated to the lane width
    fn round_constant(rc: u64) -> Self;
    /// `byte` placed at little-endian byte position `pos`
    fn from_byte(byte: u8, pos: usize) -> Self;
    /// Byte at little-endian position `pos`
    fn byte(self, pos: usize) -> u8;
}

macro_rules! impl_lane {
    ($t:ty, $rounds:expr) => {
        impl Lane for $t {
            const BITS: u32 = <$t>::BITS;
            const ROUNDS: usize = $rounds;

            #[inline]
            fn rotl(self, n: u32) -> Self {
                self.rotate_left(n % Self::BITS)
            }

            #[inline]
            fn round_constant(rc: u64) -> Self {
                rc as $t
            }

            #[inline]
            fn from_byte(byte: u8, pos: usize) -> Self {
                (byte as $t) << (8 * pos)
            }

            #[inline]
            fn byte(self, pos: usize) -> u8 {
                (self >> (8 * pos)) as u8
            }
        }
    };
}

impl_lane!(u64, 24);
impl_lane!(u32, 22);
impl_lane!(u16, 20);

/// Apply Keccak-f[25 * L::BITS] to `state` in place
pub fn keccak_f<L: Lane>(state: &mut [L; 25]) {
    let mut c = [L::default(); 5];

    for rc in ROUND_CONSTANTS.iter().take(L::ROUNDS) {
        // theta
        for x in 0..5 {
            c[x] = state[x] ^ state[x + 5] ^ state[x + 10] ^ state[x + 15] ^ state[x + 20];
        }
        for x in 0..5 {
            let d = c[(x + 4) % 5] ^ c[(x + 1) % 5].rotl(1);
            for y in (0..25).step_by(5) {
                state[y + x] = state[y + x] ^ d;
            }
        }

        // rho and pi
        let mut last = state[1];
        for i in 0..24 {
            let j = PI[i];
            let tmp = state[j];
            state[j] = last.rotl(RHO[i]);
            last = tmp;
        }

        // chi
        for y in (0..25).step_by(5) {
            let row = [state[y], state[y + 1], state[y + 2], state[y + 3], state[y + 4]];
            for x in 0..5 {
                state[y + x] = row[x] ^ (!row[(x + 1) % 5] & row[(x + 2) % 5]);
            }
        }

        // iota
        state[0] = state[0] ^ L::round_constant(*rc);
    }
}

/// Incremental sponge over Keccak-f with a fixed rate and domain suffix
#[derive(Clone)]
pub struct KeccakSponge<L: Lane = u64> {
    state: [L; 25],
    rate: usize,
    suffix: u8,
    offset: usize,
}

impl<L: Lane> KeccakSponge<L> {
    /// Width of the permutation in bits
    pub const WIDTH: usize = 25 * L::BITS as usize;

    /// Create a sponge whose rate is `(width - 2 * security_bits) / 8` bytes
    pub fn new(security_bits: usize, suffix: u8) -> TronResult<Self> {
        if security_bits == 0 || security_bits % 8 != 0 {
            return Err(TronError::invalid_input(format!(
                "Sponge security level must be a positive multiple of 8, got {}",
                security_bits
            )));
        }
        if 2 * security_bits >= Self::WIDTH {
            return Err(TronError::invalid_input(format!(
                "Security level {} leaves no rate in a {}-bit permutation",
                security_bits,
                Self::WIDTH
            )));
        }
        if suffix == 0 || suffix >= 0x80 {
            return Err(TronError::invalid_input(format!(
                "Domain suffix 0x{:02x} must be in 0x01..=0x7f",
                suffix
            )));
        }
        Ok(Self::with_rate((Self::WIDTH - 2 * security_bits) / 8, suffix))
    }

    fn with_rate(rate: usize, suffix: u8) -> Self {
        Self {
            state: [L::default(); 25],
            rate,
            suffix,
            offset: 0,
        }
    }

    /// Rate in bytes
    pub fn rate(&self) -> usize {
        self.rate
    }

    fn xor_byte(&mut self, index: usize, byte: u8) {
        let lane_bytes = (L::BITS / 8) as usize;
        let lane = index / lane_bytes;
        self.state[lane] = self.state[lane] ^ L::from_byte(byte, index % lane_bytes);
    }

    fn state_byte(&self, index: usize) -> u8 {
        let lane_bytes = (L::BITS / 8) as usize;
        self.state[index / lane_bytes].byte(index % lane_bytes)
    }

    /// Absorb more input; may be called repeatedly
    pub fn absorb(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let take = (self.rate - self.offset).min(data.len());
            for (i, byte) in data[..take].iter().enumerate() {
                self.xor_byte(self.offset + i, *byte);
            }
            self.offset += take;
            data = &data[take..];
            if self.offset == self.rate {
                keccak_f(&mut self.state);
                self.offset = 0;
            }
        }
    }

    /// Pad, then squeeze `output_len` bytes
    pub fn squeeze(mut self, output_len: usize) -> Vec<u8> {
        // pad10*1: suffix bits at the cursor, final bit at the last rate byte
        self.xor_byte(self.offset, self.suffix);
        self.xor_byte(self.rate - 1, 0x80);
        keccak_f(&mut self.state);

        let mut out = Vec::with_capacity(output_len);
        loop {
            let take = (output_len - out.len()).min(self.rate);
            out.extend((0..take).map(|i| self.state_byte(i)));
            if out.len() == output_len {
                break;
            }
            keccak_f(&mut self.state);
        }
        out
    }
}

fn digest_bits(output_bits: usize) -> TronResult<usize> {
    if output_bits == 0 || output_bits % 8 != 0 {
        return Err(TronError::invalid_input(format!(
            "Output length must be a positive multiple of 8 bits, got {}",
            output_bits
        )));
    }
    Ok(output_bits / 8)
}

/// Hash `input` over any supported permutation width
pub fn sponge_hash<L: Lane>(
    input: &[u8],
    security_bits: usize,
    suffix: u8,
    output_len: usize,
) -> TronResult<Vec<u8>> {
    let mut sponge = KeccakSponge::<L>::new(security_bits, suffix)?;
    sponge.absorb(input);
    Ok(sponge.squeeze(output_len))
}

/// Legacy Keccak over f[1600] with capacity twice the output length
pub fn keccak(input: &[u8], output_bits: usize) -> TronResult<Vec<u8>> {
    let len = digest_bits(output_bits)?;
    sponge_hash::<u64>(input, output_bits, KECCAK_SUFFIX, len)
}

/// FIPS-202 SHA3-224/256/384/512
pub fn sha3(input: &[u8], output_bits: usize) -> TronResult<Vec<u8>> {
    let len = digest_bits(output_bits)?;
    sponge_hash::<u64>(input, output_bits, SHA3_SUFFIX, len)
}

/// FIPS-202 SHAKE128/SHAKE256 with arbitrary output length in bytes
pub fn shake(input: &[u8], security_bits: usize, output_len: usize) -> TronResult<Vec<u8>> {
    if security_bits != 128 && security_bits != 256 {
        return Err(TronError::invalid_input(format!(
            "SHAKE security level must be 128 or 256, got {}",
            security_bits
        )));
    }
    sponge_hash::<u64>(input, security_bits, SHAKE_SUFFIX, output_len)
}

/// Keccak-256, the digest behind TRON addresses and ABI selectors
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut sponge = KeccakSponge::<u64>::with_rate(136, KECCAK_SUFFIX);
    sponge.absorb(input);
    let mut out = [0u8; 32];
    out.copy_from_slice(&sponge.squeeze(32));
    out
}
