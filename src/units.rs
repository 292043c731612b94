//! Conversion between human readable token amounts and base units

use crate::error::{AirdropError, Result};

/// Number of fractional digits of one whole token
pub const NOMINATION_EXP: usize = 24;

/// Base units in one whole token (10^24)
pub const ONE_TOKEN: u128 = 1_000_000_000_000_000_000_000_000;

/// Minimal attachable deposit, required by NEP-141 `ft_transfer`
pub const ONE_YOCTO: u128 = 1;

/// Convert a decimal amount of whole tokens into base units.
///
/// Commas and surrounding whitespace are ignored, so `"1,000.5"` is accepted.
/// At most [`NOMINATION_EXP`] fractional digits are allowed.
pub fn parse_token_amount(amount: &str) -> Result<u128> {
    let invalid = |reason: &str| AirdropError::InvalidAmount {
        amount: amount.to_string(),
        reason: reason.to_string(),
    };

    let cleaned: String = amount.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(invalid("empty amount"));
    }

    let mut parts = cleaned.split('.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();
    if parts.next().is_some() {
        return Err(invalid("more than one decimal point"));
    }
    if fraction.len() > NOMINATION_EXP {
        return Err(invalid("too many fractional digits"));
    }
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("no digits"));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid("not a decimal number"));
    }

    let digits = format!("{whole}{fraction:0<width$}", width = NOMINATION_EXP);
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        return Ok(0);
    }

    trimmed
        .parse::<u128>()
        .map_err(|_| invalid("amount does not fit into 128 bits"))
}

/// Render base units as a decimal amount of whole tokens, trailing zeros removed
pub fn format_token_amount(base_units: u128) -> String {
    let whole = base_units / ONE_TOKEN;
    let fraction = base_units % ONE_TOKEN;
    if fraction == 0 {
        return whole.to_string();
    }

    let fraction = format!("{fraction:0>width$}", width = NOMINATION_EXP);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Parse an integer amount already expressed in base units
pub fn parse_base_units(value: &str) -> Result<u128> {
    value.trim().parse::<u128>().map_err(|e| AirdropError::InvalidAmount {
        amount: value.to_string(),
        reason: e.to_string(),
    })
}
