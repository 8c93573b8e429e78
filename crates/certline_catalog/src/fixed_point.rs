//! # Fixed-Point Money
//!
//! **NO FLOATING POINT IN PRICE CALCULATIONS**
//!
//! Prices are stored as a whole number of hundredths. `1656.25` is
//! `Cents(165_625)`.
//!
//! - Deterministic: same calculation, same result on all hardware
//! - No rounding drift: 1325 * 1.25 is exactly 1656.25

use std::fmt;
use std::ops::{Add, AddAssign};

/// Hundredths per whole unit.
const CENTS_PER_UNIT: u64 = 100;

/// A non-negative amount of money with two decimal places.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Cents(u64);

impl Cents {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Creates from a raw count of hundredths.
    #[inline]
    #[must_use]
    pub const fn from_raw(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates from a whole number of units.
    #[inline]
    #[must_use]
    pub const fn from_whole(whole: u64) -> Self {
        Self(whole * CENTS_PER_UNIT)
    }

    /// Raw count of hundredths.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whole-unit part.
    #[inline]
    #[must_use]
    pub const fn whole(self) -> u64 {
        self.0 / CENTS_PER_UNIT
    }

    /// Hundredths part (0-99).
    #[inline]
    #[must_use]
    pub const fn fraction(self) -> u64 {
        self.0 % CENTS_PER_UNIT
    }

    /// Checked addition.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Multiplies by `(10_000 + bp) / 10_000`, rounding down to whole cents.
    ///
    /// Returns `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_markup_bp(self, bp: u32) -> Option<Self> {
        let factor = 10_000 + bp as u64;
        match self.0.checked_mul(factor) {
            Some(v) => Some(Self(v / 10_000)),
            None => None,
        }
    }
}

impl Add for Cents {
    type Output = Self;

    /// Saturating add: a running total never wraps.
    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Cents {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl fmt::Debug for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cents({self})")
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.whole(), self.fraction())
    }
}
