//! Monetary amount helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` values stored as `decimal(15,2)`.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Number of fractional digits kept for every stored amount.
pub const MONEY_SCALE: u32 = 2;

/// Largest integer part a `decimal(15,2)` column can hold, in digits.
pub const MAX_INTEGER_DIGITS: usize = 13;

/// Why a raw amount was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Input was blank.
    #[error("amount is required")]
    Missing,
    /// Input did not parse as a decimal number.
    #[error("amount is not a valid number")]
    NotANumber,
    /// Input was below zero.
    #[error("amount must not be negative")]
    Negative,
    /// Input does not fit in `decimal(15,2)`.
    #[error("amount exceeds the storable range")]
    TooLarge,
}

/// Rounds to two decimal places, halves away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses user input into a non-negative, two-decimal amount.
///
/// Accepts plain (`1500.25`) and scientific (`1.5e3`) notation.
pub fn parse_amount(raw: &str) -> Result<Decimal, AmountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Missing);
    }

    let value = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| AmountError::NotANumber)?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(AmountError::Negative);
    }

    let rounded = round_money(value);
    let integer_digits = rounded.trunc().abs().to_string().len();
    if integer_digits > MAX_INTEGER_DIGITS {
        return Err(AmountError::TooLarge);
    }
    Ok(rounded)
}
