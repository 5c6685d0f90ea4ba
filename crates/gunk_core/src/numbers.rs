//! Numeric literal decoding.
//!
//! Integer literals accept decimal, `0x`/`0X` hex, `0o`/`0O` and legacy leading-zero octal, and
//! `0b`/`0B` binary forms, with `_` digit separators between digits. Float literals accept the
//! decimal forms (`1.5`, `.5`, `1e9`, `1_000.5`).
//!
//! ## Notes
//! - Values are decoded into `u128`/`f64`. Whether a value is representable by a concrete type is decided by the
//!   type checker, not here.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error("invalid digit {digit:?} in {base_name} literal")]
    InvalidDigit { digit: char, base_name: &'static str },
    #[error("'_' must separate successive digits")]
    MisplacedSeparator,
    #[error("{0} literal has no digits")]
    NoDigits(&'static str),
    #[error("integer constant overflows")]
    Overflow,
    #[error("malformed floating-point constant")]
    MalformedFloat,
}

/// Decode an integer literal as written in source.
///
/// ## Examples
/// ```rust
/// use gunk_core::numbers::parse_int_literal;
///
/// assert_eq!(parse_int_literal("0x_FF").unwrap(), 255);
/// assert_eq!(parse_int_literal("0755").unwrap(), 0o755);
/// assert_eq!(parse_int_literal("1_000").unwrap(), 1000);
/// ```
pub fn parse_int_literal(raw: &str) -> Result<u128, NumberError> {
    let lower = raw.get(..2).map(str::to_ascii_lowercase);
    let (digits, radix, base_name, prefixed) = match lower.as_deref() {
        Some("0x") => (&raw[2..], 16, "hexadecimal", true),
        Some("0o") => (&raw[2..], 8, "octal", true),
        Some("0b") => (&raw[2..], 2, "binary", true),
        _ if raw.len() > 1 && raw.starts_with('0') => (&raw[1..], 8, "octal", true),
        _ => (raw, 10, "decimal", false),
    };
    check_separators(digits, prefixed)?;
    let mut value: u128 = 0;
    let mut seen = false;
    for c in digits.chars().filter(|c| *c != '_') {
        let digit = c.to_digit(radix).ok_or(NumberError::InvalidDigit { digit: c, base_name })?;
        value = value
            .checked_mul(u128::from(radix))
            .and_then(|v| v.checked_add(u128::from(digit)))
            .ok_or(NumberError::Overflow)?;
        seen = true;
    }
    if !seen {
        return Err(NumberError::NoDigits(base_name));
    }
    Ok(value)
}

/// Decode a decimal floating-point literal.
pub fn parse_float_literal(raw: &str) -> Result<f64, NumberError> {
    if raw.starts_with('_') || raw.ends_with('_') || raw.contains("__") {
        return Err(NumberError::MisplacedSeparator);
    }
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    cleaned.parse::<f64>().map_err(|_| NumberError::MalformedFloat)
}

// A prefixed literal may start with `_` directly after its prefix (`0x_1`).
fn check_separators(digits: &str, prefixed: bool) -> Result<(), NumberError> {
    if digits.ends_with('_') || digits.contains("__") || (!prefixed && digits.starts_with('_')) {
        return Err(NumberError::MisplacedSeparator);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_bases() {
        assert_eq!(parse_int_literal("42").unwrap(), 42);
        assert_eq!(parse_int_literal("0").unwrap(), 0);
        assert_eq!(parse_int_literal("0b1010").unwrap(), 10);
        assert_eq!(parse_int_literal("0O17").unwrap(), 15);
        assert_eq!(parse_int_literal("0XfF").unwrap(), 255);
    }

    #[test]
    fn integer_errors() {
        assert_eq!(
            parse_int_literal("09"),
            Err(NumberError::InvalidDigit {
                digit: '9',
                base_name: "octal"
            })
        );
        assert_eq!(parse_int_literal("1__0"), Err(NumberError::MisplacedSeparator));
        assert_eq!(parse_int_literal("0x"), Err(NumberError::NoDigits("hexadecimal")));
        assert_eq!(
            parse_int_literal("999999999999999999999999999999999999999999"),
            Err(NumberError::Overflow)
        );
    }

    #[test]
    fn floats() {
        assert_eq!(parse_float_literal("1.5").unwrap(), 1.5);
        assert_eq!(parse_float_literal(".25").unwrap(), 0.25);
        assert_eq!(parse_float_literal("1_000.5e1").unwrap(), 10005.0);
        assert!(parse_float_literal("1.5_").is_err());
    }
}
