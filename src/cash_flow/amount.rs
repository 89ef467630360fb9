//! Money amounts with exactly two decimal places, stored as integer cents.

use std::{fmt::Display, str::FromStr};

use rust_decimal::{Decimal, prelude::ToPrimitive};

/// The smallest amount that has too many digits before the decimal point.
const AMOUNT_LIMIT: i64 = 10_000_000_000;

/// The reasons a value is not a valid [Amount].
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum AmountError {
    /// The text could not be parsed as a decimal number.
    #[error("amount must be a number.")]
    NotANumber,

    /// The amount was zero or negative.
    #[error("amount must be greater than zero.")]
    NotPositive,

    /// The amount had non-zero digits past the cents.
    #[error("amount must have at most 2 decimal places.")]
    TooManyFractionDigits,

    /// The amount had more than 10 digits before the decimal point.
    #[error("amount must have at most 10 digits before the decimal point.")]
    TooLarge,
}

/// A strictly positive amount of money with at most two fraction digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    cents: i64,
}

impl Amount {
    /// Create an amount from a decimal value.
    ///
    /// Trailing zeros are ignored, so `10.500` is the same as `10.50`.
    ///
    /// # Errors
    /// Returns an [AmountError] if the value is not positive, has more than
    /// two significant fraction digits or is too large.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        let value = value.normalize();

        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive);
        }

        if value.scale() > 2 {
            return Err(AmountError::TooManyFractionDigits);
        }

        if value >= Decimal::from(AMOUNT_LIMIT) {
            return Err(AmountError::TooLarge);
        }

        let cents = (value * Decimal::ONE_HUNDRED)
            .to_i64()
            .ok_or(AmountError::TooLarge)?;

        Ok(Self { cents })
    }

    /// Create an amount from a number of cents that is already known to be valid,
    /// e.g. a value read back from the database.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// The amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// The amount as a decimal with a scale of two, e.g. `10.50`.
    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(self.cents, 2)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parse a decimal number without rounding.
    ///
    /// Digits past what a [Decimal] can hold are reported as too many
    /// fraction digits rather than rounded away.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str_exact(s.trim()).map_err(|error| match error {
            rust_decimal::Error::Underflow => AmountError::TooManyFractionDigits,
            _ => AmountError::NotANumber,
        })?;

        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.as_decimal())
    }
}
