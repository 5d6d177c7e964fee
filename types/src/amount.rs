//! Token amount type in yoctoNEAR.
//!
//! Amounts are fixed-point integers (u128) to avoid floating-point errors.
//! The smallest unit is 1 yoctoNEAR; 1 NEAR = 10^24 yoctoNEAR. The chain
//! returns u128 values as JSON decimal strings, so this type serializes to
//! and from strings, never native numbers.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// yoctoNEAR per NEAR.
pub const YOCTO_PER_NEAR: u128 = 1_000_000_000_000_000_000_000_000;

/// A yoctoNEAR amount.
///
/// Internally stored as raw units (u128) for precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YoctoNear(u128);

impl YoctoNear {
    pub const ZERO: Self = Self(0);

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Whole NEAR converted to yocto units.
    pub fn from_near(near: u64) -> Self {
        Self(near as u128 * YOCTO_PER_NEAR)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Absolute difference between two amounts.
    pub fn abs_diff(self, other: Self) -> Self {
        Self(self.0.abs_diff(other.0))
    }
}

impl FromStr for YoctoNear {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>()
            .map(Self)
            .map_err(|e| TypeError::InvalidAmount(format!("{s:?}: {e}")))
    }
}

impl fmt::Display for YoctoNear {
    /// Render as NEAR with four decimal places (truncated, not rounded).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / YOCTO_PER_NEAR;
        let frac = (self.0 % YOCTO_PER_NEAR) / (YOCTO_PER_NEAR / 10_000);
        write!(f, "{whole}.{frac:04} NEAR")
    }
}

impl Serialize for YoctoNear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for YoctoNear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_strings() {
        let amount: YoctoNear = "1500000000000000000000000".parse().unwrap();
        assert_eq!(amount.raw(), 1_500_000_000_000_000_000_000_000);
        assert_eq!(YoctoNear::from_str("0").unwrap(), YoctoNear::ZERO);
    }

    #[test]
    fn rejects_non_numeric_strings() {
        assert!(YoctoNear::from_str("1.5").is_err());
        assert!(YoctoNear::from_str("").is_err());
        assert!(YoctoNear::from_str("-1").is_err());
    }

    #[test]
    fn serde_round_trips_as_string() {
        let amount = YoctoNear::new(u128::MAX);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, format!("\"{}\"", u128::MAX));
        let back: YoctoNear = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn displays_as_near_with_four_decimals() {
        assert_eq!(YoctoNear::from_near(5).to_string(), "5.0000 NEAR");
        // 0.0001 NEAR = 10^20 yocto
        assert_eq!(
            YoctoNear::new(100_000_000_000_000_000_000).to_string(),
            "0.0001 NEAR"
        );
        assert_eq!(YoctoNear::new(1).to_string(), "0.0000 NEAR");
    }

    #[test]
    fn checked_sub_underflow_is_none() {
        assert!(YoctoNear::new(1).checked_sub(YoctoNear::new(2)).is_none());
        assert_eq!(
            YoctoNear::new(1).saturating_sub(YoctoNear::new(2)),
            YoctoNear::ZERO
        );
    }

    #[test]
    fn arithmetic_is_checked_or_saturating_only() {
        assert_eq!(
            YoctoNear::new(u128::MAX).saturating_add(YoctoNear::new(1)),
            YoctoNear::new(u128::MAX)
        );
        assert!(YoctoNear::new(u128::MAX)
            .checked_add(YoctoNear::new(1))
            .is_none());
    }
}
