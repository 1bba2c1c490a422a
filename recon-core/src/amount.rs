//! Locale-formatted amount parsing.
//!
//! Statements print amounts as `2 800,00` (space thousands separator, comma
//! decimal marker). OCR occasionally turns separators into periods, so
//! `1.234.56` is read as `1234.56`: only the last marker is the decimal one.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{ReconError, Result};

/// Largest integer part a statement amount may carry. Longer digit runs are
/// OCR noise (adjacent columns glued together), and admitting them would let
/// balance sums overflow.
pub const MAX_INTEGER_DIGITS: u32 = 15;

/// Clean a raw amount token into a canonical `[-]digits[.digits]` string.
pub fn clean_amount(token: &str) -> String {
    let cleaned: String = token
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    match cleaned.rsplit_once('.') {
        Some((int_part, frac)) if int_part.contains('.') => {
            format!("{}.{}", int_part.replace('.', ""), frac)
        }
        _ => cleaned,
    }
}

fn is_signed_decimal(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    let (int_part, frac) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());

    match frac {
        Some(f) => {
            (!int_part.is_empty() || !f.is_empty()) && all_digits(int_part) && all_digits(f)
        }
        None => !int_part.is_empty() && all_digits(int_part),
    }
}

/// Parse a locale-formatted token into an exact decimal.
pub fn parse_amount(token: &str) -> Result<Decimal> {
    let cleaned = clean_amount(token);
    if !is_signed_decimal(&cleaned) {
        return Err(ReconError::InvalidAmount {
            token: token.to_string(),
        });
    }
    let value = Decimal::from_str(&cleaned).map_err(|_| ReconError::InvalidAmount {
        token: token.to_string(),
    })?;
    check_range(value, token)
}

/// Reject values whose integer part exceeds [`MAX_INTEGER_DIGITS`].
pub fn check_range(value: Decimal, token: &str) -> Result<Decimal> {
    let integer = value.abs().trunc();
    if !integer.is_zero() && integer.to_string().len() > MAX_INTEGER_DIGITS as usize {
        return Err(ReconError::InvalidAmount {
            token: token.to_string(),
        });
    }
    Ok(value)
}

/// Format a decimal the way statements print it: `-1 234,50`.
///
/// The scale of `value` is preserved, so `parse_amount(&format_amount(x)) == x`.
pub fn format_amount(value: Decimal) -> String {
    let plain = value.abs().to_string();
    let (int_part, frac) = match plain.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (plain.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    let mut out = String::new();
    if value.is_sign_negative() && !value.is_zero() {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac {
        out.push(',');
        out.push_str(f);
    }
    out
}
