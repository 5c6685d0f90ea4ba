//! Abstract Syntax Tree definitions for Gunk files.
//!
//! A Gunk file is a package clause, import declarations, and `type`/`const` declarations.
//! Type expressions and value expressions share the single [`Expr`] enum, as in the host syntax:
//! `[]string` and `Foo{Bar: 1}` are both expressions, and only the type checker decides which
//! role an expression plays.
//!
//! ## Notes
//! - Every [`Span`] is a **global** offset into the owning [`crate::position::FileSet`], so spans from different
//!   files never collide and can be used as node keys.
//! - Documentation comments are owned by the node they document (`doc` fields). The file additionally keeps every
//!   comment group in source order in [`File::comments`].

use std::fmt;

use gunk_core::lang::operators::OperatorId;

use crate::comments::CommentGroup;

/// Source location span (global byte offsets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Return `true` for zero-width spans (inserted tokens, synthesized nodes).
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}

/// A node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

pub type Ident = String;

// ============================================================================
// Files and declarations
// ============================================================================

/// One parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// Package documentation (the comment group directly above `package`).
    pub doc: Option<CommentGroup>,
    /// Span of the `package` keyword.
    pub package: Span,
    pub name: Spanned<Ident>,
    pub decls: Vec<GenDecl>,
    /// Every comment group of the file, in source order.
    pub comments: Vec<CommentGroup>,
    pub span: Span,
}

impl File {
    /// All import specs of the file, in source order.
    pub fn imports(&self) -> impl Iterator<Item = &ImportSpec> {
        self.decls.iter().flat_map(|d| d.specs.iter()).filter_map(|s| match s {
            Spec::Import(spec) => Some(spec),
            _ => None,
        })
    }
}

/// Keyword that introduced a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Import,
    Type,
    Const,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclKind::Import => write!(f, "import"),
            DeclKind::Type => write!(f, "type"),
            DeclKind::Const => write!(f, "const"),
        }
    }
}

/// `import ...`, `type ...` or `const ...`, with or without a parenthesized group.
#[derive(Debug, Clone, PartialEq)]
pub struct GenDecl {
    pub doc: Option<CommentGroup>,
    pub kind: DeclKind,
    /// `true` for `kind ( ... )` groups.
    pub grouped: bool,
    pub specs: Vec<Spec>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Spec {
    Import(ImportSpec),
    Type(TypeSpec),
    Const(ConstSpec),
}

impl Spec {
    pub fn span(&self) -> Span {
        match self {
            Spec::Import(s) => s.span,
            Spec::Type(s) => s.span,
            Spec::Const(s) => s.span,
        }
    }

    pub fn doc_mut(&mut self) -> &mut Option<CommentGroup> {
        match self {
            Spec::Import(s) => &mut s.doc,
            Spec::Type(s) => &mut s.doc,
            Spec::Const(s) => &mut s.doc,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    pub doc: Option<CommentGroup>,
    /// Local name override (`import foo "x/y"`).
    pub name: Option<Spanned<Ident>>,
    /// Import path literal, raw (quotes included).
    pub path: Spanned<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub doc: Option<CommentGroup>,
    pub name: Spanned<Ident>,
    /// `type A = B` declares an alias.
    pub alias: bool,
    pub ty: Spanned<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstSpec {
    pub doc: Option<CommentGroup>,
    pub names: Vec<Spanned<Ident>>,
    pub ty: Option<Spanned<Expr>>,
    pub values: Vec<Spanned<Expr>>,
    /// Index of this spec within its declaration group (the value of `iota`).
    pub iota: usize,
    pub span: Span,
}

// ============================================================================
// Expressions
// ============================================================================

/// Kind of a basic literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Char,
    String,
}

/// A literal as written in source (raw text, delimiters included).
#[derive(Debug, Clone, PartialEq)]
pub struct BasicLit {
    pub kind: LitKind,
    pub raw: String,
}

/// Expressions, including type expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(Ident),
    BasicLit(BasicLit),
    /// `T{...}`, or `{...}` with an elided type inside another composite literal.
    CompositeLit {
        ty: Option<Box<Spanned<Expr>>>,
        elts: Vec<Spanned<Expr>>,
    },
    /// `key: value` inside a composite literal.
    KeyValue {
        key: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
    },
    Paren(Box<Spanned<Expr>>),
    Selector {
        base: Box<Spanned<Expr>>,
        sel: Spanned<Ident>,
    },
    Index {
        base: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },
    Call {
        func: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
    },
    /// `*x`: pointer type or dereference.
    Star(Box<Spanned<Expr>>),
    Unary {
        op: OperatorId,
        operand: Box<Spanned<Expr>>,
    },
    Binary {
        op: OperatorId,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
    /// `[]T`
    SliceType(Box<Spanned<Expr>>),
    /// `map[K]V`
    MapType {
        key: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
    },
    StructType(StructType),
    InterfaceType(InterfaceType),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub fields: Vec<Field>,
}

/// One struct field line: `A, B string \`pb:"1"\` // comment`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub doc: Option<CommentGroup>,
    /// Empty for embedded (anonymous) fields.
    pub names: Vec<Spanned<Ident>>,
    pub ty: Spanned<Expr>,
    /// Struct-tag literal, raw (quotes included).
    pub tag: Option<Spanned<String>>,
    /// Trailing comment on the same line.
    pub comment: Option<CommentGroup>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceType {
    pub methods: Vec<Method>,
    /// Embedded interfaces.
    pub embeds: Vec<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub doc: Option<CommentGroup>,
    pub name: Spanned<Ident>,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Option<Spanned<Ident>>,
    pub ty: Spanned<Expr>,
}

impl Spanned<Expr> {
    /// Rewrite every span in this expression tree, including nested struct and interface types.
    pub fn map_spans(&mut self, f: &impl Fn(Span) -> Span) {
        self.span = f(self.span);
        match &mut self.node {
            Expr::Ident(_) | Expr::BasicLit(_) => {}
            Expr::CompositeLit { ty, elts } => {
                if let Some(ty) = ty {
                    ty.map_spans(f);
                }
                for elt in elts {
                    elt.map_spans(f);
                }
            }
            Expr::KeyValue { key, value } => {
                key.map_spans(f);
                value.map_spans(f);
            }
            Expr::Paren(inner) | Expr::Star(inner) | Expr::SliceType(inner) => inner.map_spans(f),
            Expr::Selector { base, sel } => {
                base.map_spans(f);
                sel.span = f(sel.span);
            }
            Expr::Index { base, index } => {
                base.map_spans(f);
                index.map_spans(f);
            }
            Expr::Call { func, args } => {
                func.map_spans(f);
                for arg in args {
                    arg.map_spans(f);
                }
            }
            Expr::Unary { operand, .. } => operand.map_spans(f),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.map_spans(f);
                rhs.map_spans(f);
            }
            Expr::MapType { key, value } => {
                key.map_spans(f);
                value.map_spans(f);
            }
            Expr::StructType(st) => {
                for field in &mut st.fields {
                    field.span = f(field.span);
                    for name in &mut field.names {
                        name.span = f(name.span);
                    }
                    field.ty.map_spans(f);
                    if let Some(tag) = &mut field.tag {
                        tag.span = f(tag.span);
                    }
                }
            }
            Expr::InterfaceType(it) => {
                for method in &mut it.methods {
                    method.span = f(method.span);
                    method.name.span = f(method.name.span);
                    for param in method.params.iter_mut().chain(method.results.iter_mut()) {
                        if let Some(name) = &mut param.name {
                            name.span = f(name.span);
                        }
                        param.ty.map_spans(f);
                    }
                }
                for embed in &mut it.embeds {
                    embed.map_spans(f);
                }
            }
        }
    }
}

// ============================================================================
// Display (source-like rendering, used in diagnostics)
// ============================================================================

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => write!(f, "{name}"),
            Expr::BasicLit(lit) => write!(f, "{}", lit.raw),
            Expr::CompositeLit { ty, elts } => {
                if let Some(ty) = ty {
                    write!(f, "{}", ty.node)?;
                }
                write!(f, "{{")?;
                for (i, elt) in elts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elt.node)?;
                }
                write!(f, "}}")
            }
            Expr::KeyValue { key, value } => write!(f, "{}: {}", key.node, value.node),
            Expr::Paren(inner) => write!(f, "({})", inner.node),
            Expr::Selector { base, sel } => write!(f, "{}.{}", base.node, sel.node),
            Expr::Index { base, index } => write!(f, "{}[{}]", base.node, index.node),
            Expr::Call { func, args } => {
                write!(f, "{}(", func.node)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg.node)?;
                }
                write!(f, ")")
            }
            Expr::Star(inner) => write!(f, "*{}", inner.node),
            Expr::Unary { op, operand } => {
                write!(f, "{}{}", gunk_core::lang::operators::as_str(*op), operand.node)
            }
            Expr::Binary { op, lhs, rhs } => write!(
                f,
                "{} {} {}",
                lhs.node,
                gunk_core::lang::operators::as_str(*op),
                rhs.node
            ),
            Expr::SliceType(elem) => write!(f, "[]{}", elem.node),
            Expr::MapType { key, value } => write!(f, "map[{}]{}", key.node, value.node),
            Expr::StructType(_) => write!(f, "struct{{...}}"),
            Expr::InterfaceType(_) => write!(f, "interface{{...}}"),
        }
    }
}
