//! Fixed-point prices.
//!
//! A [`Price`] counts ten-thousandths of a currency unit in an `i64`, so
//! adding and reverting the same change always lands on the starting value
//! and prices order totally, which lets them serve as tree keys.

use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use thiserror::Error;

/// Fractional digits carried by a [`Price`].
pub const DECIMALS: u32 = 4;

const SCALE: i64 = 10_i64.pow(DECIMALS);

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParsePriceError {
    #[error("empty price")]
    Empty,
    #[error("malformed price {0:?}")]
    Malformed(String),
    #[error("price {0:?} has more than 4 decimal places")]
    TooPrecise(String),
    #[error("price {0:?} is out of range")]
    OutOfRange(String),
}

impl Price {
    pub const ZERO: Price = Price(0);

    /// A price from its raw count of ten-thousandths.
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Price(raw)
    }

    /// A whole-unit price. Saturates at the representable bounds.
    #[inline]
    pub const fn from_whole(units: i64) -> Self {
        Price(units.saturating_mul(SCALE))
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Price) -> Option<Price> {
        self.0.checked_add(other.0).map(Price)
    }

    pub fn checked_sub(self, other: Price) -> Option<Price> {
        self.0.checked_sub(other.0).map(Price)
    }
}

// The operators saturate at the representable bounds. Use `checked_add` and
// `checked_sub` where an overflow must be reported.

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Price {
    type Output = Price;

    fn sub(self, rhs: Price) -> Price {
        Price(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Price {
    type Output = Price;

    fn neg(self) -> Price {
        Price(self.0.saturating_neg())
    }
}

impl FromStr for Price {
    type Err = ParsePriceError;

    /// Accepts an optional sign, whole digits and up to four fractional
    /// digits: `12`, `-3.5`, `+0.0001`, `.25`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(ParsePriceError::Empty);
        }
        let malformed = || ParsePriceError::Malformed(text.to_string());
        let out_of_range = || ParsePriceError::OutOfRange(text.to_string());

        let (negative, unsigned) = match text.as_bytes()[0] {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };
        let (whole, frac) = match unsigned.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (unsigned, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(malformed());
        }
        if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if frac.len() > DECIMALS as usize {
            return Err(ParsePriceError::TooPrecise(text.to_string()));
        }

        let mut raw: i64 = 0;
        for digit in whole.bytes().chain(frac.bytes()) {
            raw = raw
                .checked_mul(10)
                .and_then(|r| r.checked_add(i64::from(digit - b'0')))
                .ok_or_else(out_of_range)?;
        }
        for _ in frac.len()..DECIMALS as usize {
            raw = raw.checked_mul(10).ok_or_else(out_of_range)?;
        }
        Ok(Price(if negative { -raw } else { raw }))
    }
}

impl fmt::Display for Price {
    /// Trailing fractional zeros are dropped, keeping at least one digit:
    /// `12.5`, `10.0`, `-0.0001`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = SCALE as u64;
        let whole = abs / scale;
        let mut frac = abs % scale;
        let mut width = DECIMALS as usize;
        while width > 1 && frac % 10 == 0 {
            frac /= 10;
            width -= 1;
        }
        write!(f, "{sign}{whole}.{frac:0width$}")
    }
}

impl fmt::Debug for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
