//! Token types for the Gunk lexer.
//!
//! The lexer uses **registry-backed IDs** for language vocabulary:
//! - `Keyword(KeywordId)` for reserved words
//! - `Operator(OperatorId)` for operators
//! - `Punctuation(PunctuationId)` for punctuation tokens
//!
//! ## Notes
//! - Literal tokens carry their **raw** source text (quotes, prefixes and separators included). Decoding happens in
//!   `gunk_core::strings` / `gunk_core::numbers` when a value is needed.
//! - Semicolons inserted at line ends are ordinary `Punctuation(Semicolon)` tokens with an empty span.
//! - Comments are tokens too; the parser folds them into comment groups and never sees them as syntax.

use crate::ast::Span;
use gunk_core::lang::keywords::{self, KeywordId};
use gunk_core::lang::operators::OperatorId;
use gunk_core::lang::punctuation::PunctuationId;

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// Kind of token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ========== Keyword / operator / punctuation (ID-based) ==========
    Keyword(KeywordId),
    Operator(OperatorId),
    Punctuation(PunctuationId),

    // ========== Identifiers and Literals (raw text) ==========
    Ident(String),
    Int(String),
    Float(String),
    Char(String),
    String(String),

    // ========== Trivia ==========
    Comment(String),

    // ========== Special ==========
    Eof,
}

/// A token with its kind and source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Construct a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Resolve an identifier spelling to a keyword id, if reserved.
pub fn keyword_id(name: &str) -> Option<KeywordId> {
    keywords::from_str(name)
}
