//! # Product Models and Colors
//!
//! The closed set of product variants. Every per-model constant lives in a
//! single [`ModelSpec`] table row, so adding a variant is one match arm.
//!
//! | Model | Warranty floor | Manufacturer price | Code rule        |
//! |-------|----------------|--------------------|------------------|
//! | M1    | 1              | 850                | fixed `0000`     |
//! | M2    | 2              | 1325               | 4 random letters |
//! | M3    | 3              | 1950               | letter checksum  |

use std::fmt;
use std::str::FromStr;

use crate::error::{CatalogError, CatalogResult};

/// How a model's 4-character code is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CodeRule {
    /// The literal `0000`.
    Fixed,
    /// Four independent uniform letters A-Z.
    RandomLetters,
    /// Digits of the alphabet-position sum of 8 distinct letters,
    /// least-significant digit first.
    LetterChecksum,
}

/// Per-model constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelSpec {
    /// Minimum warranty in years.
    pub warranty_floor: u8,
    /// Manufacturer price in whole currency units.
    pub manufacturer_price: u32,
    /// Code derivation rule.
    pub code_rule: CodeRule,
}

/// Product model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Model {
    /// Entry model.
    M1 = 0,
    /// Mid-range model.
    M2 = 1,
    /// Top model.
    M3 = 2,
}

impl Model {
    /// Every model, in index order.
    pub const ALL: [Self; 3] = [Self::M1, Self::M2, Self::M3];

    /// Number of models (the bound for a uniform draw).
    pub const COUNT: u32 = 3;

    /// The constant table row for this model.
    #[inline]
    #[must_use]
    pub const fn spec(self) -> ModelSpec {
        match self {
            Self::M1 => ModelSpec {
                warranty_floor: 1,
                manufacturer_price: 850,
                code_rule: CodeRule::Fixed,
            },
            Self::M2 => ModelSpec {
                warranty_floor: 2,
                manufacturer_price: 1325,
                code_rule: CodeRule::RandomLetters,
            },
            Self::M3 => ModelSpec {
                warranty_floor: 3,
                manufacturer_price: 1950,
                code_rule: CodeRule::LetterChecksum,
            },
        }
    }

    /// Minimum warranty in years.
    #[inline]
    #[must_use]
    pub const fn warranty_floor(self) -> u8 {
        self.spec().warranty_floor
    }

    /// Manufacturer price in whole currency units.
    #[inline]
    #[must_use]
    pub const fn manufacturer_price(self) -> u32 {
        self.spec().manufacturer_price
    }

    /// Code derivation rule.
    #[inline]
    #[must_use]
    pub const fn code_rule(self) -> CodeRule {
        self.spec().code_rule
    }

    /// Display name (`M1`, `M2`, `M3`).
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::M1 => "M1",
            Self::M2 => "M2",
            Self::M3 => "M3",
        }
    }

    /// Converts a uniform draw in `[0, COUNT)` to a model.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownModel`] for any index outside the table.
    pub fn from_index(index: u32) -> CatalogResult<Self> {
        match index {
            0 => Ok(Self::M1),
            1 => Ok(Self::M2),
            2 => Ok(Self::M3),
            other => Err(CatalogError::UnknownModel(format!("index {other}"))),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Model {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.name() == s)
            .ok_or_else(|| CatalogError::UnknownModel(s.to_string()))
    }
}

/// Finish color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    /// Blue.
    Blue,
    /// Orange.
    Orange,
    /// Green.
    Green,
}

impl Color {
    /// Every color, in index order.
    pub const ALL: [Self; 3] = [Self::Blue, Self::Orange, Self::Green];

    /// Number of colors.
    pub const COUNT: u32 = 3;

    /// Display name.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blue => "Blue",
            Self::Orange => "Orange",
            Self::Green => "Green",
        }
    }

    /// Converts a uniform draw in `[0, COUNT)` to a color.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownColor`] for any index outside the table.
    pub fn from_index(index: u32) -> CatalogResult<Self> {
        match index {
            0 => Ok(Self::Blue),
            1 => Ok(Self::Orange),
            2 => Ok(Self::Green),
            other => Err(CatalogError::UnknownColor(other)),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_table() {
        assert_eq!(Model::M1.manufacturer_price(), 850);
        assert_eq!(Model::M2.manufacturer_price(), 1325);
        assert_eq!(Model::M3.manufacturer_price(), 1950);

        assert_eq!(Model::M1.warranty_floor(), 1);
        assert_eq!(Model::M2.warranty_floor(), 2);
        assert_eq!(Model::M3.warranty_floor(), 3);

        assert_eq!(Model::M1.code_rule(), CodeRule::Fixed);
        assert_eq!(Model::M3.code_rule(), CodeRule::LetterChecksum);
    }

    #[test]
    fn test_index_roundtrip_matches_all() {
        for (index, model) in (0u32..).zip(Model::ALL) {
            assert_eq!(Model::from_index(index), Ok(model));
        }
        for (index, color) in (0u32..).zip(Color::ALL) {
            assert_eq!(Color::from_index(index), Ok(color));
        }
    }

    #[test]
    fn test_unknown_model_names_offending_value() {
        let err = Model::from_index(3).unwrap_err();
        assert_eq!(err.to_string(), "unknown model: index 3");

        let err = "X1".parse::<Model>().unwrap_err();
        assert_eq!(err, CatalogError::UnknownModel("X1".to_string()));
        assert_eq!("M2".parse::<Model>(), Ok(Model::M2));
    }

    #[test]
    fn test_unknown_color() {
        assert_eq!(Color::from_index(7), Err(CatalogError::UnknownColor(7)));
    }
}
