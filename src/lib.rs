#![forbid(unsafe_code)]
//! Gunk interface definition front end
//!
//! Gunk describes services and messages in a Go-like syntax, with `+gunk` annotations in doc
//! comments. This crate loads Gunk packages (module-aware, with cycle detection and caching),
//! type-checks their declarations and annotations, validates struct-field tags and turns
//! annotation values into concrete, schema-described values. External descriptor files are
//! loaded through `protoc`.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module
//!   enforces `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **User input never panics**: malformed sources, tags and literals become diagnostics or errors.

pub mod cli;
pub mod descriptors;
pub mod frontend;
pub mod reflect;

pub use frontend::ast;
pub use frontend::diagnostics;
pub use frontend::lexer;
pub use frontend::parser;
pub use frontend::typechecker;

pub use descriptors::ProtoLoader;
pub use frontend::loader::{LoadError, Loader, LoaderConfig};
pub use frontend::package::{Diagnostic, DiagnosticKind, Package, Tag};
