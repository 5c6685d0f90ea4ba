//! Struct-tag grammar: space-separated `key:"value"` pairs.
//!
//! A struct field may carry a raw string payload after its type:
//!
//! ```text
//! Name string `pb:"1" json:"name"`
//! ```
//!
//! [`StructTag::parse`] validates the payload strictly (the same rules `go vet` applies) and
//! keeps the pairs in source order; [`StructTag::lookup`] returns the first value for a key.
//!
//! ## Notes
//! - Keys are non-empty runs of bytes above `' '` other than `:`, `"` and DEL.
//! - Values are interpreted string literals and are unquoted with [`crate::strings::unquote`].
//! - Pairs must be separated by at least one space; `a:"1",b:"2"` is rejected.
//!
//! ## Examples
//! ```rust
//! use gunk_core::structtag::StructTag;
//!
//! let tag = StructTag::parse(r#"pb:"1" json:"display_name""#).unwrap();
//! assert_eq!(tag.lookup("pb"), Some("1"));
//! assert_eq!(tag.lookup("json"), Some("display_name"));
//! assert_eq!(tag.lookup("xml"), None);
//! ```

use thiserror::Error;

use crate::strings::unquote;

/// Malformed struct-tag payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StructTagError {
    #[error("bad syntax for struct tag pair")]
    PairSyntax,
    #[error("bad syntax for struct tag key")]
    KeySyntax,
    #[error("bad syntax for struct tag value")]
    ValueSyntax,
    #[error("key:\"value\" pairs not separated by spaces")]
    MissingSpace,
}

/// A validated struct tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructTag {
    pairs: Vec<(String, String)>,
}

impl StructTag {
    /// Parse an (already unquoted) struct-tag payload.
    ///
    /// ## Errors
    /// - [`StructTagError`] describing the first syntax problem found.
    pub fn parse(mut tag: &str) -> Result<Self, StructTagError> {
        let mut pairs = Vec::new();
        while !tag.is_empty() {
            if !pairs.is_empty() && !tag.starts_with(' ') {
                return Err(StructTagError::MissingSpace);
            }
            tag = tag.trim_start_matches(' ');
            if tag.is_empty() {
                break;
            }

            let bytes = tag.as_bytes();
            let key_len = bytes
                .iter()
                .take_while(|&&b| b > b' ' && b != b':' && b != b'"' && b != 0x7f)
                .count();
            if key_len == 0 {
                return Err(StructTagError::KeySyntax);
            }
            if key_len + 1 >= bytes.len() || bytes[key_len] != b':' {
                return Err(StructTagError::PairSyntax);
            }
            if bytes[key_len + 1] != b'"' {
                return Err(StructTagError::ValueSyntax);
            }
            let key = &tag[..key_len];
            let rest = &tag[key_len + 1..];

            let rest_bytes = rest.as_bytes();
            let mut i = 1;
            while i < rest_bytes.len() && rest_bytes[i] != b'"' {
                if rest_bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            if i >= rest_bytes.len() {
                return Err(StructTagError::ValueSyntax);
            }
            let value = unquote(&rest[..=i]).map_err(|_| StructTagError::ValueSyntax)?;
            pairs.push((key.to_string(), value));
            tag = &rest[i + 1..];
        }
        Ok(Self { pairs })
    }

    /// First value stored under `key`, if any.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// All pairs in source order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tag_is_valid() {
        assert_eq!(StructTag::parse("").unwrap(), StructTag::default());
        assert_eq!(StructTag::parse("   ").unwrap(), StructTag::default());
    }

    #[test]
    fn escaped_quotes_inside_values() {
        let tag = StructTag::parse(r#"doc:"say \"hi\"" pb:"2""#).unwrap();
        assert_eq!(tag.lookup("doc"), Some("say \"hi\""));
        assert_eq!(tag.lookup("pb"), Some("2"));
    }

    #[test]
    fn first_value_wins() {
        let tag = StructTag::parse(r#"pb:"1" pb:"2""#).unwrap();
        assert_eq!(tag.lookup("pb"), Some("1"));
        assert_eq!(tag.pairs().count(), 2);
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(StructTag::parse(r#"pb"1""#), Err(StructTagError::PairSyntax));
        assert_eq!(StructTag::parse(r#":"1""#), Err(StructTagError::KeySyntax));
        assert_eq!(StructTag::parse("pb:1"), Err(StructTagError::ValueSyntax));
        assert_eq!(StructTag::parse(r#"pb:"1"#), Err(StructTagError::ValueSyntax));
        assert_eq!(StructTag::parse(r#"pb:"1",json:"a""#), Err(StructTagError::MissingSpace));
        assert_eq!(StructTag::parse("pb"), Err(StructTagError::PairSyntax));
    }
}
