//! Identifiers and literals.

use gunk_core::lang::types::{self as basic_types, PredeclaredValueId};
use gunk_core::numbers::{parse_float_literal, parse_int_literal};
use gunk_core::strings::{unquote, unquote_rune};

use crate::frontend::ast::*;
use crate::frontend::diagnostics::errors;
use crate::frontend::typechecker::const_eval::ConstValue;
use crate::frontend::typechecker::types::{Type, TypeAndValue, Untyped};
use crate::frontend::typechecker::{Checker, Object};

impl<'a> Checker<'a> {
    pub(super) fn check_ident(&mut self, name: &str, span: Span) -> TypeAndValue {
        if name == "_" {
            self.error("cannot use _ as value".to_string(), span);
            return TypeAndValue::invalid();
        }
        if self.decls.contains_key(name) {
            self.resolve_decl(name);
        }
        match self.pkg.lookup(name) {
            Some(Object::Const { ty, value, .. }) => return TypeAndValue::new(ty.clone(), Some(value.clone())),
            Some(Object::TypeName { .. }) => {
                self.error(format!("{name} (type) is not an expression"), span);
                return TypeAndValue::invalid();
            }
            // Declared but unresolvable: the declaration already reported why.
            None if self.decls.contains_key(name) => return TypeAndValue::invalid(),
            None => {}
        }

        match basic_types::predeclared_value(name) {
            Some(PredeclaredValueId::True) => {
                return TypeAndValue::new(Type::Untyped(Untyped::Bool), Some(ConstValue::Bool(true)));
            }
            Some(PredeclaredValueId::False) => {
                return TypeAndValue::new(Type::Untyped(Untyped::Bool), Some(ConstValue::Bool(false)));
            }
            Some(PredeclaredValueId::Nil) => return TypeAndValue::new(Type::Untyped(Untyped::Nil), None),
            Some(PredeclaredValueId::Iota) => {
                return match self.iota {
                    Some(iota) => TypeAndValue::new(Type::Untyped(Untyped::Int), Some(ConstValue::Int(iota))),
                    None => {
                        self.error("cannot use iota outside constant declaration".to_string(), span);
                        TypeAndValue::invalid()
                    }
                };
            }
            None => {}
        }

        if basic_types::from_str(name).is_some() {
            self.error(format!("{name} (type) is not an expression"), span);
        } else if self.import_path(name).is_some() {
            self.error(format!("use of package {name} without selector"), span);
        } else {
            self.errors.push(errors::undeclared(name, span));
        }
        TypeAndValue::invalid()
    }

    pub(super) fn check_basic_lit(&mut self, lit: &BasicLit, span: Span) -> TypeAndValue {
        let result = match lit.kind {
            LitKind::Int => parse_int_literal(&lit.raw)
                .map_err(|e| e.to_string())
                .and_then(|v| i128::try_from(v).map_err(|_| "integer constant overflows".to_string()))
                .map(|v| (Untyped::Int, ConstValue::Int(v))),
            LitKind::Float => parse_float_literal(&lit.raw)
                .map_err(|e| e.to_string())
                .map(|v| (Untyped::Float, ConstValue::Float(v))),
            LitKind::Char => unquote_rune(&lit.raw)
                .map_err(|e| e.to_string())
                .map(|c| (Untyped::Rune, ConstValue::Int(c as i128))),
            LitKind::String => unquote(&lit.raw)
                .map_err(|e| e.to_string())
                .map(|s| (Untyped::String, ConstValue::String(s))),
        };
        match result {
            Ok((kind, value)) => TypeAndValue::new(Type::Untyped(kind), Some(value)),
            Err(msg) => {
                self.error(format!("invalid literal {}: {msg}", lit.raw), span);
                TypeAndValue::invalid()
            }
        }
    }
}
