//! Gunk front end
//!
//! This module contains all frontend components:
//! - `lexer`, `parser`, `ast`, `comments`, `position`, `diagnostics`: syntax (from `gunk_syntax`)
//! - `loader`: package discovery, parsing, import resolution and caching
//! - `package`: loaded packages and their diagnostics
//! - `typechecker`: declaration checking and tag evaluation
//! - `tags`: `+gunk` annotation splitting
//! - `validate`: struct-field sequence and wire-name checks
//! - `materialize`: building concrete values for checked tags

// Syntax components are provided by the shared gunk_syntax crate.
pub use gunk_syntax::{ast, comments, diagnostics, lexer, parser, position};

pub mod loader;
pub mod materialize;
pub mod package;
pub mod tags;
pub mod typechecker;
pub mod validate;
