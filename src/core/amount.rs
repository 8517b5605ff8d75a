//! Fixed-point amounts in the base asset.
//!
//! Stored as an integer count of the smallest unit and only ever formatted
//! with integer division, so summing many fees never accumulates rounding.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places of the base network asset (1 display unit = 10^6 base units).
pub const BASE_ASSET_DECIMALS: u32 = 6;

const SCALE: u64 = 10u64.pow(BASE_ASSET_DECIMALS);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);
    pub const MAX: Amount = Amount(u64::MAX);

    pub fn from_base_units(units: u64) -> Self { Self(units) }

    pub fn base_units(&self) -> u64 { self.0 }

    pub fn is_zero(&self) -> bool { self.0 == 0 }

    /// `None` when the sum does not fit in `u64` base units.
    pub fn checked_add(self, other: Amount) -> Option<Amount> { self.0.checked_add(other.0).map(Amount) }

    /// Caps at [`Amount::MAX`].
    pub fn saturating_add(self, other: Amount) -> Amount { Amount(self.0.saturating_add(other.0)) }

    /// Whole display units and the fractional remainder in base units.
    pub fn split(&self) -> (u64, u64) { (self.0 / SCALE, self.0 % SCALE) }

    /// Always shows every decimal place: `0.003000`.
    pub fn to_padded_string(&self) -> String {
        let (whole, frac) = self.split();
        format!("{}.{:0width$}", whole, frac, width = BASE_ASSET_DECIMALS as usize)
    }
}

/// Caps at [`Amount::MAX`]; use [`Amount::checked_add`] to detect overflow.
impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Amount::saturating_add)
    }
}

/// Display units without trailing zeros: `0.003`, `1`, `12.5`.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (whole, frac) = self.split();
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:0width$}", frac, width = BASE_ASSET_DECIMALS as usize);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}
