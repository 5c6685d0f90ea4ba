//! Syntax front end for Gunk IDL files: lexer, parser, AST, comment groups, positions, diagnostics.
//!
//! This crate turns one source file into a [`ast::File`]. It knows nothing about packages, imports
//! or types; the `gunk` crate builds those on top.
//!
//! ## Notes
//! - This crate is intentionally “syntax-only”: it does not resolve names or check types.
//! - Vocabulary identity (keywords/operators/punctuation) comes from `gunk_core::lang` registries.
//! - All spans are global offsets handed out by a [`position::FileSet`].
//!
//! ## Examples
//! ```rust
//! use gunk_syntax::{parser, position::FileSet};
//!
//! let mut fset = FileSet::new();
//! let source = "package p\n\n// Doc.\ntype T int\n";
//! let base = fset.add_file("p.gunk", source);
//! let file = parser::parse_file(source, base).unwrap();
//! let pos = fset.position(file.name.span.start).unwrap();
//! assert_eq!(pos.to_string(), "p.gunk:1:9");
//! ```
//!
//! ## See also
//! - `gunk_core::lang` for registry-backed language vocabulary.

pub mod ast;
pub mod comments;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod token_helpers;
