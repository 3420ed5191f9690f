use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, ResultEngine};

/// Signed amount in minor units tagged with its currency.
///
/// Use this type when an amount leaves the engine for humans (reports, CLI
/// output). Storage and arithmetic use plain `i64` minor units.
///
/// # Examples
///
/// ```rust
/// use engine::{Currency, Money};
///
/// let amount = Money::new(123_456, Currency::Pkr);
/// assert_eq!(amount.to_string(), "1,234.56 PKR");
/// assert_eq!(Money::new(-5, Currency::Usd).to_string(), "-0.05 USD");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    pub minor: i64,
    pub currency: Currency,
}

impl Money {
    #[must_use]
    pub const fn new(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    /// Amount without the currency code, e.g. `1,234.56`.
    #[must_use]
    pub fn amount(&self) -> String {
        format_minor(self.minor, self.currency.minor_units())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount(), self.currency)
    }
}

fn format_minor(minor: i64, digits: u8) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    let scale = 10u64.pow(u32::from(digits));
    let major = (abs / scale).to_string();
    let fraction = abs % scale;

    let mut grouped = String::with_capacity(major.len() + major.len() / 3);
    for (idx, ch) in major.chars().enumerate() {
        if idx > 0 && (major.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if digits == 0 {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction:0width$}", width = usize::from(digits))
    }
}

/// Parses a decimal string into minor units (2 fraction digits).
///
/// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
///
/// Validation rules:
/// - max 2 fractional digits (rejects `12.345`)
/// - rejects empty/invalid strings
///
/// ```rust
/// use engine::parse_minor;
///
/// assert_eq!(parse_minor("10").unwrap(), 1000);
/// assert_eq!(parse_minor("10,5").unwrap(), 1050);
/// assert!(parse_minor("12.345").is_err());
/// ```
pub fn parse_minor(input: &str) -> ResultEngine<i64> {
    let invalid = || EngineError::InvalidAmount(format!("invalid amount: {input}"));
    let overflow = || EngineError::InvalidAmount("amount too large".to_string());

    let trimmed = input.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(stripped) => (true, stripped),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(EngineError::InvalidAmount("empty amount".to_string()));
    }

    let rest = rest.replace(',', ".");
    let (major_str, fraction_str) = match rest.split_once('.') {
        Some((major, fraction)) => (major, fraction),
        None => (rest.as_str(), ""),
    };

    if major_str.is_empty()
        || !major_str.chars().all(|c| c.is_ascii_digit())
        || !fraction_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let fraction: i64 = match fraction_str.len() {
        0 => 0,
        1 => fraction_str.parse::<i64>().map_err(|_| invalid())? * 10,
        2 => fraction_str.parse::<i64>().map_err(|_| invalid())?,
        _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
    };

    let major: i64 = major_str.parse().map_err(|_| overflow())?;
    let total = major
        .checked_mul(100)
        .and_then(|v| v.checked_add(fraction))
        .ok_or_else(overflow)?;

    if negative {
        total.checked_neg().ok_or_else(overflow)
    } else {
        Ok(total)
    }
}
