//! Currency-bound decimal amounts
//!
//! [`Money`] pairs an exact [`Decimal`] with an asset code. Values are only
//! ever built from decimal strings or existing decimals, never from floats,
//! and arithmetic between two amounts requires both to carry the same code.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::ops::Mul;
use std::str::FromStr;

/// Highest scale `rust_decimal` can represent.
pub const MAX_DECIMAL_PLACES: u32 = 28;

/// An exact decimal amount of a single currency or asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

/// Money construction and arithmetic errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },
    #[error("invalid decimal amount: {input:?}")]
    InvalidAmount { input: String },
    #[error("decimal places {0} exceed the supported maximum of 28")]
    PrecisionOutOfRange(u32),
    #[error("arithmetic overflow")]
    Overflow,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Zero of the given currency
    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Parse an amount from its exact decimal text, e.g. `"0.00100000"`.
    pub fn from_str_exact(amount: &str, currency: impl Into<String>) -> Result<Self, MoneyError> {
        let amount = Decimal::from_str_exact(amount.trim()).map_err(|_| MoneyError::InvalidAmount {
            input: amount.to_string(),
        })?;
        Ok(Self::new(amount, currency))
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// The bare amount as it is put on the wire, keeping its scale.
    pub fn amount_string(&self) -> String {
        self.amount.to_string()
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    pub fn same_currency(&self, other: &Money) -> bool {
        self.currency == other.currency
    }

    /// Round half away from zero to `dp` fractional digits.
    ///
    /// The result always carries exactly `dp` digits, so `0.004` at six
    /// places renders as `0.004000`.
    pub fn round_to_decimal_places(&self, dp: u32) -> Result<Money, MoneyError> {
        if dp > MAX_DECIMAL_PLACES {
            return Err(MoneyError::PrecisionOutOfRange(dp));
        }
        let mut amount = self
            .amount
            .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(dp);
        Ok(Money::new(amount, self.currency.clone()))
    }

    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, self.currency.clone()))
    }

    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, self.currency.clone()))
    }

    /// Scale by a unit-less factor, failing instead of panicking on overflow.
    pub fn checked_mul(&self, factor: Decimal) -> Result<Money, MoneyError> {
        let amount = self.amount.checked_mul(factor).ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, self.currency.clone()))
    }

    /// Compare two amounts, failing if they are in different currencies.
    pub fn try_cmp(&self, other: &Money) -> Result<Ordering, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.same_currency(other) {
            Ok(())
        } else {
            Err(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            })
        }
    }
}

// Amounts in different currencies are unordered.
impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

/// Scaling by a unit-less factor keeps the currency.
impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Money {
            amount: self.amount * rhs,
            currency: self.currency,
        }
    }
}

impl Mul<Decimal> for &Money {
    type Output = Money;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Money {
            amount: self.amount * rhs,
            currency: self.currency.clone(),
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// Parses the `Display` form, `"<amount> <CURRENCY>"`.
impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(amount), Some(currency), None) => Money::from_str_exact(amount, currency),
            _ => Err(MoneyError::InvalidAmount {
                input: s.to_string(),
            }),
        }
    }
}

/// Convenience macro for literal amounts in tests and examples
#[macro_export]
macro_rules! money {
    ($amount:expr, $currency:expr) => {
        $crate::money::Money::from_str_exact(stringify!($amount), $currency).unwrap()
    };
}
