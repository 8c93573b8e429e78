//! # Certificate Records
//!
//! The unit of work handed from producer to consumer. A record is checked
//! once at construction and is immutable afterwards; fields are only
//! reachable through getters.

use std::fmt::{self, Write as _};

use crate::error::{CatalogError, CatalogResult};
use crate::generator::WARRANTY_CEILING;
use crate::model::{CodeRule, Color, Model};

/// Length of a serial number.
pub const SERIAL_LEN: usize = 5;

/// Length of a model code.
pub const CODE_LEN: usize = 4;

/// A fixed-length token over the uppercase alphanumeric alphabet.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token<const N: usize>([u8; N]);

/// Five-character serial number.
pub type Serial = Token<SERIAL_LEN>;

/// Four-character model code.
pub type Code = Token<CODE_LEN>;

impl<const N: usize> Token<N> {
    /// Wraps `bytes` after checking every byte is `0-9` or `A-Z`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidTokenByte`] for the first byte outside
    /// the alphabet.
    pub fn from_bytes(bytes: [u8; N]) -> CatalogResult<Self> {
        match bytes
            .iter()
            .find(|b| !(b.is_ascii_digit() || b.is_ascii_uppercase()))
        {
            Some(&bad) => Err(CatalogError::InvalidTokenByte(bad)),
            None => Ok(Self(bytes)),
        }
    }

    /// The raw ASCII bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    /// Returns true if every character is a digit.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.0.iter().all(u8::is_ascii_digit)
    }

    /// Returns true if every character is an uppercase letter.
    #[must_use]
    pub fn is_alphabetic(&self) -> bool {
        self.0.iter().all(u8::is_ascii_uppercase)
    }
}

impl<const N: usize> fmt::Display for Token<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            f.write_char(char::from(byte))?;
        }
        Ok(())
    }
}

impl<const N: usize> fmt::Debug for Token<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl<const N: usize> PartialEq<&str> for Token<N> {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_slice() == other.as_bytes()
    }
}

/// A manufactured-item certificate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Certificate {
    model: Model,
    serial: Serial,
    color: Color,
    code: Code,
    warranty: u8,
    manufacturer_price: u32,
}

impl Certificate {
    /// Builds a record, enforcing the per-model invariants.
    ///
    /// The manufacturer price is taken from the model table; it cannot be
    /// supplied.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::CodeMismatch`] if `code` does not follow the model's rule
    /// - [`CatalogError::WarrantyOutOfRange`] if `warranty` is below the
    ///   model's floor or above the ceiling
    pub fn new(
        model: Model,
        serial: Serial,
        color: Color,
        code: Code,
        warranty: u8,
    ) -> CatalogResult<Self> {
        let code_ok = match model.code_rule() {
            CodeRule::Fixed => code == "0000",
            CodeRule::RandomLetters => code.is_alphabetic(),
            CodeRule::LetterChecksum => code.is_numeric(),
        };
        if !code_ok {
            return Err(CatalogError::CodeMismatch {
                model,
                code: code.to_string(),
            });
        }

        let floor = model.warranty_floor();
        if warranty < floor || warranty > WARRANTY_CEILING {
            return Err(CatalogError::WarrantyOutOfRange {
                model,
                warranty,
                floor,
                ceiling: WARRANTY_CEILING,
            });
        }

        Ok(Self {
            model,
            serial,
            color,
            code,
            warranty,
            manufacturer_price: model.manufacturer_price(),
        })
    }

    /// Product model.
    #[inline]
    #[must_use]
    pub const fn model(&self) -> Model {
        self.model
    }

    /// Serial number.
    #[inline]
    #[must_use]
    pub const fn serial(&self) -> Serial {
        self.serial
    }

    /// Finish color.
    #[inline]
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Model code.
    #[inline]
    #[must_use]
    pub const fn code(&self) -> Code {
        self.code
    }

    /// Warranty in years.
    #[inline]
    #[must_use]
    pub const fn warranty(&self) -> u8 {
        self.warranty
    }

    /// Manufacturer price in whole currency units.
    #[inline]
    #[must_use]
    pub const fn manufacturer_price(&self) -> u32 {
        self.manufacturer_price
    }
}

/// `model serial color code warranty price`, as printed by the producer.
impl fmt::Display for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.model, self.serial, self.color, self.code, self.warranty, self.manufacturer_price
        )
    }
}
