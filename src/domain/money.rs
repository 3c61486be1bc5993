use crate::error::AppError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// A non-negative monetary value in the store currency (INR).
///
/// Wrapper around `rust_decimal::Decimal` so that order totals can never go
/// negative through ordinary arithmetic. Subtraction is only available in
/// checked form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Money(Decimal);

/// A strictly positive monetary value, used for payment-intent amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, AppError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(AppError::Validation(
                "monetary value must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Multiplies by a line-item quantity.
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Subtraction that refuses to go below zero.
    pub fn checked_sub(&self, rhs: Self) -> Option<Self> {
        if self.0 >= rhs.0 {
            Some(Self(self.0 - rhs.0))
        } else {
            None
        }
    }

    /// Converts to the gateway's minor unit (paise), rounding to the nearest
    /// whole unit.
    pub fn to_minor_units(&self) -> Result<i64, AppError> {
        (self.0 * Decimal::from(100))
            .round()
            .to_i64()
            .ok_or_else(|| AppError::Validation("amount too large for minor units".to_string()))
    }
}

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, AppError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(AppError::Validation(
                "amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn to_minor_units(&self) -> Result<i64, AppError> {
        Money(self.0).to_minor_units()
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AppError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<Money> for Amount {
    type Error = AppError;

    fn try_from(value: Money) -> Result<Self, Self::Error> {
        Self::new(value.0)
    }
}

impl From<Amount> for Money {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.round_dp(2))
    }
}
