//! Define shared literal and identifier helpers (pure, no IO).
//!
//! The lexer keeps literal tokens as raw source text. Everything that needs the *value* of a
//! literal (constant folding, struct-tag validation, dynamic value construction) goes through the
//! helpers here, so the escape rules are implemented exactly once.
//!
//! ## Notes
//! - **Interpreted strings** (`"..."`) support the escapes `\a \b \f \n \r \t \v \\ \"`, octal `\ooo`, hex `\xHH`,
//!   and Unicode `\uHHHH` / `\UHHHHHHHH`.
//! - **Raw strings** (`` `...` ``) take their content verbatim, minus carriage returns.
//! - **Rune literals** (`'x'`) decode to exactly one scalar; `\'` is valid there and `\"` is not.
//!
//! ## Examples
//! ```rust
//! use gunk_core::strings::{unquote, names_match};
//!
//! assert_eq!(unquote(r#""a\tb""#).unwrap(), "a\tb");
//! assert_eq!(unquote("`raw\\n`").unwrap(), "raw\\n");
//! assert!(names_match("DisplayName", "display_name"));
//! ```

use thiserror::Error;

/// Literal decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnquoteError {
    #[error("invalid syntax")]
    InvalidSyntax,
    #[error("invalid escape sequence `\\{0}`")]
    InvalidEscape(char),
    #[error("rune literal must hold exactly one character")]
    RuneLength,
}

/// Decode a quoted literal (interpreted string, raw string, or rune) to its value.
///
/// ## Parameters
/// - `raw`: The literal exactly as written in source, including its delimiters.
///
/// ## Returns
/// - The decoded text. A rune literal decodes to a one-character string.
///
/// ## Errors
/// - [`UnquoteError`] when the delimiters, escapes, or rune length are invalid.
pub fn unquote(raw: &str) -> Result<String, UnquoteError> {
    let mut chars = raw.chars();
    let (Some(open), Some(close)) = (chars.next(), chars.next_back()) else {
        return Err(UnquoteError::InvalidSyntax);
    };
    if open != close || raw.len() < 2 {
        return Err(UnquoteError::InvalidSyntax);
    }
    let body = &raw[1..raw.len() - 1];
    match open {
        '`' => {
            if body.contains('`') {
                return Err(UnquoteError::InvalidSyntax);
            }
            Ok(body.chars().filter(|c| *c != '\r').collect())
        }
        '"' => decode_escapes(body, '"'),
        '\'' => {
            let value = decode_escapes(body, '\'')?;
            if value.chars().count() != 1 {
                return Err(UnquoteError::RuneLength);
            }
            Ok(value)
        }
        _ => Err(UnquoteError::InvalidSyntax),
    }
}

/// Decode a rune literal to its scalar value.
pub fn unquote_rune(raw: &str) -> Result<char, UnquoteError> {
    if !raw.starts_with('\'') {
        return Err(UnquoteError::InvalidSyntax);
    }
    unquote(raw)?.chars().next().ok_or(UnquoteError::RuneLength)
}

/// Quote `text` as an interpreted string literal.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn decode_escapes(body: &str, quote: char) -> Result<String, UnquoteError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\n' || c == quote {
            return Err(UnquoteError::InvalidSyntax);
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            return Err(UnquoteError::InvalidSyntax);
        };
        let decoded = match esc {
            'a' => '\u{7}',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{b}',
            '\\' => '\\',
            '"' | '\'' if esc == quote => esc,
            'x' => read_hex(&mut chars, 2)?,
            'u' => read_hex(&mut chars, 4)?,
            'U' => read_hex(&mut chars, 8)?,
            '0'..='7' => {
                let mut value = esc.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    let digit = chars
                        .next()
                        .and_then(|d| d.to_digit(8))
                        .ok_or(UnquoteError::InvalidSyntax)?;
                    value = value * 8 + digit;
                }
                if value > 255 {
                    return Err(UnquoteError::InvalidSyntax);
                }
                char::from_u32(value).ok_or(UnquoteError::InvalidSyntax)?
            }
            other => return Err(UnquoteError::InvalidEscape(other)),
        };
        out.push(decoded);
    }
    Ok(out)
}

fn read_hex(chars: &mut impl Iterator<Item = char>, digits: usize) -> Result<char, UnquoteError> {
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|d| d.to_digit(16))
            .ok_or(UnquoteError::InvalidSyntax)?;
        value = value * 16 + digit;
    }
    char::from_u32(value).ok_or(UnquoteError::InvalidSyntax)
}

/// Compare a declared field name with a literal key, ignoring ASCII case and underscores.
///
/// Generated record names and external literal keys frequently disagree on casing and
/// separators (`DisplayName` vs `display_name`), so both sides are folded.
pub fn names_match(declared: &str, key: &str) -> bool {
    let fold = |s: &str| -> Vec<char> {
        s.chars()
            .filter(|c| *c != '_')
            .flat_map(char::to_lowercase)
            .collect()
    };
    fold(declared) == fold(key)
}

/// Return `true` if `name` is visible from other packages (starts with an uppercase letter).
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Return `true` if `c` may start an identifier.
pub fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// Return `true` if `c` may continue an identifier.
pub fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquote_interpreted_escapes() {
        assert_eq!(unquote(r#""\x41\101é\n""#).unwrap(), "AAé\n");
        assert_eq!(unquote(r#""say \"hi\"""#).unwrap(), "say \"hi\"");
    }

    #[test]
    fn unquote_rejects_bad_input() {
        assert_eq!(unquote(r#""unterminated"#), Err(UnquoteError::InvalidSyntax));
        assert_eq!(unquote(r#""\q""#), Err(UnquoteError::InvalidEscape('q')));
        assert_eq!(unquote(r#""\'""#), Err(UnquoteError::InvalidEscape('\'')));
        assert_eq!(unquote("'ab'"), Err(UnquoteError::RuneLength));
        assert_eq!(unquote("x"), Err(UnquoteError::InvalidSyntax));
    }

    #[test]
    fn unquote_raw_strips_carriage_returns() {
        assert_eq!(unquote("`a\r\nb`").unwrap(), "a\nb");
    }

    #[test]
    fn rune_literals() {
        assert_eq!(unquote_rune("'a'").unwrap(), 'a');
        assert_eq!(unquote_rune(r"'\''").unwrap(), '\'');
        assert!(unquote_rune("\"a\"").is_err());
    }

    #[test]
    fn quote_then_unquote_preserves_text() {
        let text = "tab\tquote\" back\\slash";
        assert_eq!(unquote(&quote(text)).unwrap(), text);
    }

    #[test]
    fn names_match_folds_case_and_underscores() {
        assert!(names_match("Tags", "tags"));
        assert!(names_match("HTTPRule", "http_rule"));
        assert!(!names_match("Name", "names"));
    }

    #[test]
    fn exported_names() {
        assert!(is_exported("Message"));
        assert!(!is_exported("message"));
        assert!(!is_exported("_Message"));
        assert!(!is_exported(""));
    }
}
