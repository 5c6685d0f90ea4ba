//! Provide the canonical language vocabulary and pure helpers shared by the Gunk syntax crate and the front end.
//!
//! This crate is intentionally small and dependency-light. It contains deterministic helpers that the lexer, the
//! parser, the type checker and the struct-field validator all agree on.
//!
//! ## Notes
//!
//! - This is a “semantic core” crate: **no IO**, no global state, and no AST types.
//! - Current scope: reserved vocabulary (keywords, operators, punctuation, predeclared types), well-known conventions
//!   (tag marker, struct-tag keys, package directive), literal decoding, and struct-tag parsing.

pub mod lang;
pub mod numbers;
pub mod strings;
pub mod structtag;
