//! Decimal amount conversion between display units and smallest on-chain units
//!
//! Amounts are handled as strings end to end so that values beyond the range
//! of `f64` (and `u128`) convert without precision loss.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::constants::MAX_TOKEN_DECIMALS;
use crate::{InvalidAmount, SmallestUnitAmount, TokenDecimals};

fn check_decimals(input: &str, decimals: TokenDecimals) -> Result<(), InvalidAmount> {
    if decimals > MAX_TOKEN_DECIMALS {
        return Err(InvalidAmount::new(
            input,
            format!("token decimals {} exceed {}", decimals, MAX_TOKEN_DECIMALS),
        ));
    }
    Ok(())
}

/// Convert a user-entered decimal amount to the token's smallest unit.
///
/// `"0.1"` with 18 decimals becomes `"100000000000000000"`. Fraction digits
/// beyond `decimals` are dropped (truncation, not rounding). `decimals` above
/// [`MAX_TOKEN_DECIMALS`] is rejected before any digits are built.
pub fn to_smallest_unit(
    amount: &str,
    decimals: TokenDecimals,
) -> Result<SmallestUnitAmount, InvalidAmount> {
    check_decimals(amount, decimals)?;
    let trimmed = amount.trim();
    let invalid = |reason: &str| InvalidAmount::new(amount, reason);

    if trimmed.is_empty() {
        return Err(invalid("amount is empty"));
    }
    if trimmed.starts_with('-') {
        return Err(invalid("amount must not be negative"));
    }

    let (int_part, frac_part) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    if frac_part.contains('.') {
        return Err(invalid("more than one decimal separator"));
    }
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid("amount has no digits"));
    }
    if !is_digits(int_part) || !is_digits(frac_part) {
        return Err(invalid("amount is not a decimal number"));
    }

    let scale = decimals as usize;
    let mut fraction: String = frac_part.chars().take(scale).collect();
    while fraction.len() < scale {
        fraction.push('0');
    }

    let integer = parse_digits(int_part);
    let fraction = parse_digits(&fraction);
    let value = integer * BigUint::from(10u32).pow(decimals) + fraction;

    Ok(SmallestUnitAmount::from(value))
}

/// Render a smallest-unit integer string as a decimal in display units.
///
/// Trailing fractional zeros are trimmed: `"1500000"` with 6 decimals is `"1.5"`.
pub fn from_smallest_unit(raw: &str, decimals: TokenDecimals) -> Result<String, InvalidAmount> {
    check_decimals(raw, decimals)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() || !is_digits(trimmed) {
        return Err(InvalidAmount::new(raw, "raw amount is not an unsigned integer"));
    }

    let digits = trimmed.trim_start_matches('0');
    let scale = decimals as usize;
    let padded = format!("{:0>width$}", digits, width = scale + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        Ok(int_part.to_string())
    } else {
        Ok(format!("{}.{}", int_part, frac_part))
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a validated digit string; empty means zero
fn parse_digits(digits: &str) -> BigUint {
    if digits.is_empty() {
        return BigUint::zero();
    }
    BigUint::parse_bytes(digits.as_bytes(), 10).unwrap_or_else(BigUint::zero)
}
