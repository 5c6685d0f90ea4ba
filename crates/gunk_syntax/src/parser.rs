//! Parser for Gunk source files
//!
//! Converts a token stream into an AST [`File`], and parses standalone expressions (the payload
//! of `+gunk` tags) with [`parse_expr`].
//!
//! ## Examples
//!
//! ```rust
//! use gunk_syntax::parser;
//!
//! let source = "package echo\n\ntype Message struct {\n\tText string `pb:\"1\"`\n}\n";
//! let file = parser::parse_file(source, 1).unwrap();
//! assert_eq!(file.name.node, "echo");
//! assert_eq!(file.decls.len(), 1);
//! ```

use crate::ast::*;
use crate::comments::{Comment, CommentGroup};
use crate::diagnostics::{CompileError, errors};
use crate::lexer::{self, Token, TokenKind};
use crate::position::LineIndex;
use gunk_core::lang::keywords::KeywordId;
use gunk_core::lang::operators::{self, OperatorId};
use gunk_core::lang::punctuation::PunctuationId;

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/decl.rs");
include!("parser/types.rs");
include!("parser/expr.rs");
include!("parser/util.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
