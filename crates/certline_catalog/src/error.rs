//! # Catalog Error Types
//!
//! Every error here is a broken contract, not a runtime condition: the
//! generating task must stop rather than substitute a value.

use thiserror::Error;

use crate::model::Model;

/// Errors that can occur while building or validating a certificate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A model value with no entry in the model table.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// A color index with no entry in the color table.
    #[error("unknown color: index {0}")]
    UnknownColor(u32),

    /// The random source returned a value outside the requested range.
    #[error("random source returned {drawn}, expected a value in [0, {bound})")]
    RandomOutOfRange {
        /// The value returned.
        drawn: u32,
        /// The exclusive upper bound that was requested.
        bound: u32,
    },

    /// A token byte outside the uppercase alphanumeric alphabet.
    #[error("invalid token byte {0:#04x}: expected 0-9 or A-Z")]
    InvalidTokenByte(u8),

    /// A checksum input that is not an uppercase letter.
    #[error("invalid checksum letter {0:#04x}: expected A-Z")]
    InvalidLetter(u8),

    /// A code that does not follow its model's code rule.
    #[error("code {code} does not follow the {model} code rule")]
    CodeMismatch {
        /// The model whose rule was violated.
        model: Model,
        /// The offending code.
        code: String,
    },

    /// A warranty outside `[floor, ceiling]` for its model.
    #[error("warranty {warranty} outside [{floor}, {ceiling}] for {model}")]
    WarrantyOutOfRange {
        /// The model of the record.
        model: Model,
        /// The offending warranty.
        warranty: u8,
        /// The model's floor.
        floor: u8,
        /// The global ceiling.
        ceiling: u8,
    },
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
