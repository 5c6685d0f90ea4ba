//! Gunk language vocabulary registries.
//!
//! This module is the “front door” for language-level vocabulary: reserved keywords, operators,
//! punctuation, predeclared types and the well-known conventions of the dialect.
//!
//! The design goal is to avoid stringly-typed checks scattered across the front end.
//! Callers work with **stable IDs** (e.g. `KeywordId`, `OperatorId`) and look up
//! spellings/metadata via registry tables.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no AST types, no IO, no side effects.
//! - The lexer/parser enforce syntax; registries provide spellings and metadata for shared use.
//!
//! ## Examples
//! ```rust
//! use gunk_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("struct"), Some(KeywordId::Struct));
//! assert_eq!(keywords::as_str(KeywordId::Struct), "struct");
//! ```

pub mod conventions;
pub mod keywords;
pub mod operators;
pub mod punctuation;
pub mod types;
