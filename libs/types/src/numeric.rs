//! Fixed-point decimal types for prices and quantities
//!
//! Thin newtypes over rust_decimal for deterministic arithmetic
//! (no floating-point errors). `Price` is strictly positive,
//! `Quantity` is non-negative; both are validated at construction so the
//! matching and settlement paths never re-check.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A strictly positive execution or limit price
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Wrap a decimal, None unless value > 0
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Construct from an integer price
    ///
    /// # Panics
    /// Panics on zero
    pub fn from_u64(value: u64) -> Self {
        Self::try_new(Decimal::from(value)).expect("price must be positive")
    }

    /// Parse from a decimal string, e.g. "100.00"
    pub fn from_str(value: &str) -> Result<Self, rust_decimal::Error> {
        let d = Decimal::from_str_exact(value)?;
        Self::try_new(d).ok_or_else(|| {
            rust_decimal::Error::ErrorString("price must be positive".to_string())
        })
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative order or trade quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Wrap a decimal, None if negative
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value >= Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Construct from an integer quantity
    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    /// Parse from a decimal string, e.g. "1.5"
    pub fn from_str(value: &str) -> Result<Self, rust_decimal::Error> {
        let d = Decimal::from_str_exact(value)?;
        Self::try_new(d).ok_or_else(|| {
            rust_decimal::Error::ErrorString("quantity must be non-negative".to_string())
        })
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtract, saturating at zero
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::zero()
        } else {
            Self(self.0 - other.0)
        }
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    /// # Panics
    /// Panics if the result would be negative
    fn sub(self, rhs: Self) -> Self::Output {
        assert!(rhs.0 <= self.0, "quantity subtraction would go negative");
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
