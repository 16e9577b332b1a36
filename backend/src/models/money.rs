//! Money parsing and formatting.
//!
//! CRITICAL: All money values are i64 (cents). Decimal strings from the
//! commission source or the CLI are converted digit-wise; floating point is
//! never involved, so sums and the one-third eligibility split stay exact.

use thiserror::Error;

/// Errors from parsing a decimal money string
#[derive(Debug, Error, PartialEq)]
pub enum MoneyParseError {
    #[error("Not a decimal amount: {0:?}")]
    Malformed(String),

    #[error("Amount has more than two decimal places: {0:?}")]
    TooPrecise(String),

    #[error("Amount out of range: {0:?}")]
    OutOfRange(String),
}

/// Parse a decimal amount ("30000", "30000.5", "30000.50") into cents
///
/// # Example
/// ```
/// use advance_portal_core_rs::models::money::parse_cents;
///
/// assert_eq!(parse_cents("30000").unwrap(), 3_000_000);
/// assert_eq!(parse_cents("30000.50").unwrap(), 3_000_050);
/// ```
pub fn parse_cents(input: &str) -> Result<i64, MoneyParseError> {
    let s = input.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(MoneyParseError::Malformed(input.to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(MoneyParseError::Malformed(input.to_string()));
    }
    if frac.len() > 2 {
        return Err(MoneyParseError::TooPrecise(input.to_string()));
    }

    let whole_units: i64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| MoneyParseError::OutOfRange(input.to_string()))?
    };

    // "5" after the point means 50 cents, "05" means 5 cents
    let frac_digits: i64 = if frac.is_empty() {
        0
    } else {
        frac.parse()
            .map_err(|_| MoneyParseError::Malformed(input.to_string()))?
    };
    let frac_cents = if frac.len() == 1 {
        frac_digits * 10
    } else {
        frac_digits
    };

    let cents = whole_units
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac_cents))
        .ok_or_else(|| MoneyParseError::OutOfRange(input.to_string()))?;

    Ok(if negative { -cents } else { cents })
}

/// Format cents as a plain decimal string ("3000050" cents -> "30000.50")
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
