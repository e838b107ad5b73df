//! Fixed-point token amounts.
//!
//! Amounts are carried as `u128` counts of base units with
//! [`TOKEN_DECIMALS`] fractional digits.  Parsing is exact and never touches
//! floating point.

use {
    crate::constants::{ONE_TOKEN, TOKEN_DECIMALS},
    thiserror::Error,
};

/// A token amount in base units.
pub type Amount = u128;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid character {0:?} in amount")]
    InvalidCharacter(char),

    #[error("amount has more than {TOKEN_DECIMALS} fractional digits")]
    TooManyDecimals,

    #[error("amount does not fit in 128 bits")]
    Overflow,
}

/// Parse a decimal token string such as `"12.5"` into base units.
pub fn parse_token_amount(input: &str) -> Result<Amount, AmountError> {
    let input = input.trim();
    let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(AmountError::Empty);
    }
    if fraction.len() > TOKEN_DECIMALS as usize {
        return Err(AmountError::TooManyDecimals);
    }

    let whole_units = parse_digits(whole)?
        .checked_mul(ONE_TOKEN)
        .ok_or(AmountError::Overflow)?;

    // fraction.len() <= TOKEN_DECIMALS, so the exponent cannot underflow.
    let scale = 10u128.pow(TOKEN_DECIMALS - fraction.len() as u32);
    let fraction_units = parse_digits(fraction)?
        .checked_mul(scale)
        .ok_or(AmountError::Overflow)?;

    whole_units
        .checked_add(fraction_units)
        .ok_or(AmountError::Overflow)
}

/// Render base units as a decimal token string, trimming trailing zeros.
pub fn format_token_amount(amount: Amount) -> String {
    let whole = amount / ONE_TOKEN;
    let fraction = amount % ONE_TOKEN;
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{fraction:0width$}", width = TOKEN_DECIMALS as usize);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

fn parse_digits(digits: &str) -> Result<u128, AmountError> {
    digits.chars().try_fold(0u128, |acc, c| {
        let digit = c.to_digit(10).ok_or(AmountError::InvalidCharacter(c))?;
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(u128::from(digit)))
            .ok_or(AmountError::Overflow)
    })
}
