//! Small helper APIs for working with `Token` / `TokenKind`.
//!
//! These helpers exist to reduce repetitive `matches!(...)` at call sites and to make it easy
//! to work with ID-based tokens.

use std::fmt;

use crate::lexer::{Token, TokenKind};
use gunk_core::lang::keywords::{self, KeywordId};
use gunk_core::lang::operators::{self, OperatorId};
use gunk_core::lang::punctuation::{self, PunctuationId};

impl TokenKind {
    /// Return the keyword id, if this is a keyword token.
    pub fn keyword_id(&self) -> Option<KeywordId> {
        match self {
            TokenKind::Keyword(id) => Some(*id),
            _ => None,
        }
    }

    /// Return `true` if this is the given keyword.
    pub fn is_keyword(&self, id: KeywordId) -> bool {
        matches!(self, TokenKind::Keyword(k) if *k == id)
    }

    /// Return the operator id, if this is an operator token.
    pub fn operator_id(&self) -> Option<OperatorId> {
        match self {
            TokenKind::Operator(id) => Some(*id),
            _ => None,
        }
    }

    /// Return `true` if this is the given operator.
    pub fn is_operator(&self, id: OperatorId) -> bool {
        matches!(self, TokenKind::Operator(o) if *o == id)
    }

    /// Return `true` if this is the given punctuation.
    pub fn is_punctuation(&self, id: PunctuationId) -> bool {
        matches!(self, TokenKind::Punctuation(p) if *p == id)
    }

    /// Return `true` for comment tokens.
    pub fn is_comment(&self) -> bool {
        matches!(self, TokenKind::Comment(_))
    }
}

impl Token {
    /// Convenience wrapper for `self.kind.keyword_id()`.
    pub fn keyword_id(&self) -> Option<KeywordId> {
        self.kind.keyword_id()
    }

    /// Convenience wrapper for `self.kind.operator_id()`.
    pub fn operator_id(&self) -> Option<OperatorId> {
        self.kind.operator_id()
    }

    /// Return `true` for a semicolon the lexer inserted at a line end.
    pub fn is_inserted_semicolon(&self) -> bool {
        self.kind.is_punctuation(PunctuationId::Semicolon) && self.span.is_empty()
    }

    /// Describe the token for "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        if self.is_inserted_semicolon() {
            return "newline".to_string();
        }
        self.kind.to_string()
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(id) => write!(f, "keyword {}", keywords::as_str(*id)),
            TokenKind::Operator(id) => write!(f, "'{}'", operators::as_str(*id)),
            TokenKind::Punctuation(id) => write!(f, "'{}'", punctuation::as_str(*id)),
            TokenKind::Ident(name) => write!(f, "name {name}"),
            TokenKind::Int(raw) | TokenKind::Float(raw) | TokenKind::Char(raw) | TokenKind::String(raw) => {
                write!(f, "literal {raw}")
            }
            TokenKind::Comment(_) => write!(f, "comment"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}
