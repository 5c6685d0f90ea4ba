//! Check expressions and compute their types and constant values.
//!
//! This module owns the expression-checking entrypoint (`check_expr`) and delegates to themed
//! submodules. Expression checking is error-accumulating: on invalid input it returns
//! [`Type::Invalid`] so enclosing expressions do not report follow-up errors.
//!
//! ## See also
//! - [`super::TypeEnv`]: evaluates tag expressions through this entrypoint.

use gunk_core::lang::types as basic_types;

use crate::frontend::ast::*;

use super::types::{Type, TypeAndValue, Untyped};
use super::{Checker, Object, PendingDecl};

mod access;
mod assign;
mod basics;
mod composite;
mod ops;

impl<'a> Checker<'a> {
    // ========================================================================
    // Expressions
    // ========================================================================

    /// Check an expression and return its type and constant value.
    ///
    /// `hint` is the type implied by the enclosing composite literal; it gives elided literals
    /// (`{...}` inside `[]T{...}`) their type.
    pub(crate) fn check_expr(&mut self, expr: &Spanned<Expr>, hint: Option<&Type>) -> TypeAndValue {
        match &expr.node {
            Expr::Ident(name) => self.check_ident(name, expr.span),
            Expr::BasicLit(lit) => self.check_basic_lit(lit, expr.span),
            Expr::Paren(inner) => self.check_expr(inner, hint),
            Expr::CompositeLit { ty, elts } => self.check_composite(ty.as_deref(), elts, expr.span, hint),
            Expr::Selector { base, sel } => self.check_selector(base, sel, expr.span),
            Expr::Index { base, index } => self.check_index(base, index, expr.span),
            Expr::Call { func, args } => self.check_call(func, args, expr.span),
            Expr::Star(inner) => {
                if self.denotes_type(inner) {
                    self.not_an_expression(expr)
                } else {
                    self.check_deref(inner, expr.span)
                }
            }
            Expr::Unary { op, operand } => self.check_unary(*op, operand, expr.span),
            Expr::Binary { op, lhs, rhs } => self.check_binary(*op, lhs, rhs, expr.span),
            Expr::SliceType(_) | Expr::MapType { .. } | Expr::StructType(_) | Expr::InterfaceType(_) => {
                self.not_an_expression(expr)
            }
            Expr::KeyValue { .. } => {
                self.error(format!("unexpected key:value expression {}", expr.node), expr.span);
                TypeAndValue::invalid()
            }
        }
    }

    fn not_an_expression(&mut self, expr: &Spanned<Expr>) -> TypeAndValue {
        self.error(format!("{} (type) is not an expression", expr.node), expr.span);
        TypeAndValue::invalid()
    }

    /// Whether `expr` names a type. Never reports errors.
    pub(crate) fn denotes_type(&self, expr: &Spanned<Expr>) -> bool {
        match &expr.node {
            Expr::Ident(name) => {
                if let Some(decl) = self.decls.get(name) {
                    return matches!(decl, PendingDecl::Type { .. });
                }
                match self.pkg.lookup(name) {
                    Some(Object::TypeName { .. }) => true,
                    Some(Object::Const { .. }) => false,
                    None => basic_types::from_str(name).is_some(),
                }
            }
            Expr::Selector { base, sel } => match &base.node {
                Expr::Ident(pkg_name) => self
                    .import_path(pkg_name)
                    .and_then(|path| self.pkg.imports.get(&path))
                    .is_some_and(|pkg| matches!(pkg.lookup(&sel.node), Some(Object::TypeName { .. }))),
                _ => false,
            },
            Expr::Paren(inner) | Expr::Star(inner) => self.denotes_type(inner),
            Expr::SliceType(_) | Expr::MapType { .. } | Expr::StructType(_) | Expr::InterfaceType(_) => true,
            _ => false,
        }
    }

    /// `T(x)` is a conversion; Gunk has no functions to call.
    fn check_call(&mut self, func: &Spanned<Expr>, args: &[Spanned<Expr>], span: Span) -> TypeAndValue {
        if self.denotes_type(func) {
            let target = self.resolve_type(func);
            return self.check_conversion(target, func, args, span);
        }
        let tv = self.check_expr(func, None);
        if !tv.ty.is_invalid() {
            let desc = describe(&tv);
            self.error(
                format!("invalid operation: cannot call non-function {} ({desc})", func.node),
                span,
            );
        }
        TypeAndValue::invalid()
    }
}

/// Operand description used in messages: `untyped int constant`, `constant 3 of type Kind`,
/// `value of type T`.
pub(crate) fn describe(tv: &TypeAndValue) -> String {
    match (&tv.ty, &tv.value) {
        (Type::Untyped(Untyped::Nil), _) => "untyped nil".to_string(),
        (Type::Untyped(_), Some(_)) => format!("{} constant", tv.ty),
        (ty, Some(value)) => format!("constant {value} of type {ty}"),
        (ty, None) => format!("value of type {ty}"),
    }
}
