//! Diagnostics produced while lexing, parsing and checking Gunk source.
//!
//! [`CompileError`] is the one error shape shared by the syntax crate and the type checker. It
//! carries a global [`Span`]; the loader turns that into a `file:line:column` position through
//! its [`crate::position::FileSet`] when it records the error on a package.

use crate::ast::Span;

/// A compile-time error with location information
#[derive(Debug, Clone, PartialEq, thiserror::Error, miette::Diagnostic)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
    pub span: Span,
    pub kind: ErrorKind,
    pub notes: Vec<String>,
    #[help]
    pub help: Option<String>,
}

impl CompileError {
    pub fn new(message: String, span: Span) -> Self {
        Self {
            message,
            span,
            kind: ErrorKind::Error,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn syntax(message: String, span: Span) -> Self {
        Self {
            kind: ErrorKind::Syntax,
            ..Self::new(message, span)
        }
    }

    pub fn type_error(message: String, span: Span) -> Self {
        Self {
            kind: ErrorKind::Type,
            ..Self::new(message, span)
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.help = Some(hint.into());
        self
    }

    /// Shift the span by `delta` bytes (used when a snippet was parsed out of its file).
    pub fn offset_by(mut self, delta: usize) -> Self {
        self.span = Span::new(self.span.start + delta, self.span.end + delta);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Error,
    Syntax,
    Type,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Error => write!(f, "error"),
            ErrorKind::Syntax => write!(f, "syntax error"),
            ErrorKind::Type => write!(f, "type error"),
        }
    }
}

// ============================================================================
// Error catalog
// ============================================================================

/// Common errors shared between the parser and the type checker.
pub mod errors {
    use super::*;

    pub fn undeclared(name: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("undeclared name: {name}"), span)
    }

    pub fn redeclared(name: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("{name} redeclared in this block"), span)
    }

    pub fn unsupported(what: &str, span: Span) -> CompileError {
        CompileError::syntax(format!("{what} are not supported in Gunk files"), span)
            .with_hint("Gunk files may only declare imports, types and constants")
    }
}
