//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1000 cents / 3 = 333 cents (×3 = 999 cents)                          │
//! │    We KNOW we lost 1 cent, and handle it explicitly                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The persisted line format writes prices as decimal text (`12.50`), so this
//! module also owns the canonical decimal encode/parse pair used by the codec.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::types::Percentage;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Totals and deltas stay in one type
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Canonical text form**: Always two fraction digits (`12.50`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use campus_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 99); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        Money(major * 100 + minor)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (whole currency) portion.
    #[inline]
    pub const fn major_units(&self) -> i64 {
        self.0 / 100
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies a unit price by a purchased quantity.
    #[inline]
    pub const fn times(&self, quantity: u32) -> Money {
        Money(self.0 * quantity as i64)
    }

    /// Applies a discount as **percentage off**: `15%` off `100.00` is `85.00`.
    ///
    /// Integer arithmetic rounds the discounted total down to a whole cent.
    pub fn percent_off(&self, percentage: Percentage) -> Money {
        let retained_bps = (Percentage::MAX_BPS - percentage.bps()) as i64;
        Money(self.0 * retained_bps / Percentage::MAX_BPS as i64)
    }

    /// Parses the canonical decimal text form.
    ///
    /// Accepts `12`, `12.5` and `12.50`; rejects signs, empty parts and more
    /// than two fraction digits.
    pub fn parse(text: &str) -> Option<Money> {
        let (major, minor) = match text.split_once('.') {
            // A dot with nothing after it is malformed, not a zero fraction.
            Some((_, "")) => return None,
            Some((major, minor)) => (major, minor),
            None => (text, ""),
        };

        if major.is_empty() || !major.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if minor.len() > 2 || !minor.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let major: i64 = major.parse().ok()?;
        let fraction: i64 = match minor.len() {
            0 => 0,
            1 => minor.parse::<i64>().ok()? * 10,
            _ => minor.parse().ok()?,
        };

        Some(Money(major.checked_mul(100)?.checked_add(fraction)?))
    }
}

/// Canonical display form, always two fraction digits: `12.50`.
///
/// Negative deltas carry an explicit sign (`-0.50`); the persisted format
/// only ever stores non-negative prices, which is what `parse` accepts.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
