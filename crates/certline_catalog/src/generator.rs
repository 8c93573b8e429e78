//! # Record Generator
//!
//! Turns a [`RandomSource`] into fully populated [`Certificate`]s.
//!
//! ## Draw Order
//!
//! ```text
//! model   ← below(3)
//! serial  ← 5 × below(36) over 0-9A-Z
//! color   ← below(3)
//! code    ← by model:
//!             M1: "0000"                      (no draws)
//!             M2: 4 × below(26)               (repeats allowed)
//!             M3: 8 distinct letters          (partial Fisher-Yates)
//!                 → sum of positions A=1..Z=26
//!                 → 4 digits, least-significant first
//! warranty← floor, then up to two coins while below the ceiling
//! ```
//!
//! The order is fixed so a seeded source always yields the same records.

use crate::certificate::{Certificate, Code, Serial, CODE_LEN, SERIAL_LEN};
use crate::error::{CatalogError, CatalogResult};
use crate::model::{CodeRule, Color, Model};
use crate::random::RandomSource;

/// Serial alphabet: digits then uppercase letters.
const ALPHANUMERIC: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Code alphabet.
const LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Maximum warranty in years, for every model.
pub const WARRANTY_CEILING: u8 = 3;

/// Number of distinct letters behind an M3 checksum code.
pub const M3_LETTER_COUNT: usize = 8;

/// Number of coin flips that may extend a warranty.
const WARRANTY_EXTENSION_FLIPS: usize = 2;

/// Picks one byte of `alphabet` with a single uniform draw.
fn pick<R, const N: usize>(rng: &mut R, alphabet: &[u8; N]) -> CatalogResult<u8>
where
    R: RandomSource + ?Sized,
{
    let bound = u32::try_from(N).unwrap_or(u32::MAX);
    let drawn = rng.below(bound);
    usize::try_from(drawn)
        .ok()
        .and_then(|index| alphabet.get(index).copied())
        .ok_or(CatalogError::RandomOutOfRange { drawn, bound })
}

/// Derives an M3 code from 8 letters.
///
/// Each letter maps to its alphabet position (A=1 .. Z=26). The positions
/// are summed and the sum's decimal digits are written least-significant
/// first, padded with zeros to 4 digits: a sum of 100 gives `"0010"`.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidLetter`] if any byte is not `A-Z`.
pub fn m3_checksum_code(letters: &[u8; M3_LETTER_COUNT]) -> CatalogResult<Code> {
    let mut sum = 0u32;
    for &letter in letters {
        if !letter.is_ascii_uppercase() {
            return Err(CatalogError::InvalidLetter(letter));
        }
        sum += u32::from(letter - b'A') + 1;
    }

    let mut digits = [b'0'; CODE_LEN];
    for digit in &mut digits {
        // sum % 10 < 10, always a single ASCII digit
        *digit = b'0' + u8::try_from(sum % 10).unwrap_or(0);
        sum /= 10;
    }
    Code::from_bytes(digits)
}

/// Stateless certificate generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordGenerator;

impl RecordGenerator {
    /// Creates a generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Generates one certificate.
    ///
    /// # Errors
    ///
    /// A misbehaving source surfaces here instead of panicking:
    /// - [`CatalogError::UnknownModel`] if the model draw has no table entry
    /// - [`CatalogError::UnknownColor`] if the color draw has no table entry
    /// - [`CatalogError::RandomOutOfRange`] if a character draw misses its alphabet
    pub fn generate<R: RandomSource + ?Sized>(&self, rng: &mut R) -> CatalogResult<Certificate> {
        let model = Model::from_index(rng.below(Model::COUNT))?;

        let mut serial = [0u8; SERIAL_LEN];
        for slot in &mut serial {
            *slot = pick(rng, ALPHANUMERIC)?;
        }
        let serial = Serial::from_bytes(serial)?;

        let color = Color::from_index(rng.below(Color::COUNT))?;
        let code = Self::code_for(model, rng)?;
        let warranty = Self::warranty_for(model, rng);

        let certificate = Certificate::new(model, serial, color, code, warranty)?;
        tracing::trace!(%certificate, "certificate generated");
        Ok(certificate)
    }

    fn code_for<R: RandomSource + ?Sized>(model: Model, rng: &mut R) -> CatalogResult<Code> {
        match model.code_rule() {
            CodeRule::Fixed => Code::from_bytes([b'0'; CODE_LEN]),
            CodeRule::RandomLetters => {
                let mut code = [0u8; CODE_LEN];
                for slot in &mut code {
                    *slot = pick(rng, LETTERS)?;
                }
                Code::from_bytes(code)
            }
            CodeRule::LetterChecksum => {
                let letters = Self::distinct_letters(rng)?;
                m3_checksum_code(&letters)
            }
        }
    }

    /// Samples 8 letters without replacement.
    ///
    /// Partial Fisher-Yates over the alphabet: position `i` swaps with a
    /// uniform position in `[i, 26)`. Exactly 8 draws, never a retry.
    fn distinct_letters<R: RandomSource + ?Sized>(
        rng: &mut R,
    ) -> CatalogResult<[u8; M3_LETTER_COUNT]> {
        let mut pool = *LETTERS;
        let pool_len = pool.len();
        for i in 0..M3_LETTER_COUNT {
            let remaining = u32::try_from(pool_len - i).unwrap_or(u32::MAX);
            let drawn = rng.below(remaining);
            let offset = usize::try_from(drawn)
                .ok()
                .filter(|&offset| offset < pool_len - i)
                .ok_or(CatalogError::RandomOutOfRange {
                    drawn,
                    bound: remaining,
                })?;
            pool.swap(i, i + offset);
        }

        let mut letters = [0u8; M3_LETTER_COUNT];
        letters.copy_from_slice(&pool[..M3_LETTER_COUNT]);
        Ok(letters)
    }

    /// Floor, then one increment per `true` coin while below the ceiling.
    fn warranty_for<R: RandomSource + ?Sized>(model: Model, rng: &mut R) -> u8 {
        let mut warranty = model.warranty_floor();
        for _ in 0..WARRANTY_EXTENSION_FLIPS {
            if warranty >= WARRANTY_CEILING {
                break;
            }
            if rng.coin() {
                warranty += 1;
            }
        }
        warranty
    }
}
