//! # Retail Pricing
//!
//! `retail = manufacturer_price * (1 + markup)`, with the markup held in
//! basis points (10_000 = 100%). The markup is independent of model, color
//! and warranty.

use crate::certificate::Certificate;
use crate::fixed_point::Cents;

/// Baseline markup: 25%.
pub const DEFAULT_MARKUP_BP: u32 = 2_500;

/// Computes retail prices from certificates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceCalculator {
    markup_bp: u32,
}

impl PriceCalculator {
    /// Creates a calculator with the given markup in basis points.
    #[inline]
    #[must_use]
    pub const fn new(markup_bp: u32) -> Self {
        Self { markup_bp }
    }

    /// Markup in basis points.
    #[inline]
    #[must_use]
    pub const fn markup_bp(&self) -> u32 {
        self.markup_bp
    }

    /// Retail price for `certificate`, rounded down to whole cents.
    ///
    /// Total for every valid record: the largest manufacturer price times
    /// the largest markup fits comfortably in `u64` hundredths.
    #[must_use]
    pub fn retail_price(&self, certificate: &Certificate) -> Cents {
        let base = Cents::from_whole(u64::from(certificate.manufacturer_price()));
        // 1950 * 100 * (10_000 + u32::MAX) < u64::MAX
        base.checked_markup_bp(self.markup_bp).unwrap_or(Cents::from_raw(u64::MAX))
    }
}

impl Default for PriceCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_MARKUP_BP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::{Code, Serial};
    use crate::model::{Color, Model};

    fn record(model: Model, code: &[u8; 4], warranty: u8) -> Certificate {
        Certificate::new(
            model,
            Serial::from_bytes(*b"AB12C").unwrap(),
            Color::Orange,
            Code::from_bytes(*code).unwrap(),
            warranty,
        )
        .unwrap()
    }

    #[test]
    fn test_default_markup_per_model() {
        let calc = PriceCalculator::default();
        assert_eq!(calc.retail_price(&record(Model::M1, b"0000", 1)).to_string(), "1062.50");
        assert_eq!(calc.retail_price(&record(Model::M2, b"ZZZZ", 2)).to_string(), "1656.25");
        assert_eq!(calc.retail_price(&record(Model::M3, b"0010", 3)).to_string(), "2437.50");
    }

    #[test]
    fn test_markup_ignores_warranty_and_color() {
        let calc = PriceCalculator::default();
        let short = record(Model::M2, b"ABCD", 2);
        let long = record(Model::M2, b"WXYZ", 3);
        assert_eq!(calc.retail_price(&short), calc.retail_price(&long));
    }

    #[test]
    fn test_zero_markup_is_identity() {
        let calc = PriceCalculator::new(0);
        assert_eq!(calc.retail_price(&record(Model::M3, b"9999", 3)), Cents::from_whole(1950));
    }
}
