//! Qualified identifiers, field selection, indexing and pointer indirection.

use gunk_core::lang::types::BasicTypeId;

use crate::frontend::ast::*;
use crate::frontend::typechecker::types::{StructDef, Type, TypeAndValue, Untyped};
use crate::frontend::typechecker::{Checker, Object};

use super::describe;

impl<'a> Checker<'a> {
    pub(super) fn check_selector(&mut self, base: &Spanned<Expr>, sel: &Spanned<Ident>, span: Span) -> TypeAndValue {
        if let Expr::Ident(pkg_name) = &base.node {
            if !self.decls.contains_key(pkg_name) && self.import_path(pkg_name).is_some() {
                return match self.qualified_object(pkg_name, sel) {
                    Some((_, Object::Const { ty, value, .. })) => TypeAndValue::new(ty, Some(value)),
                    Some((_, Object::TypeName { .. })) => {
                        self.error(format!("{pkg_name}.{} (type) is not an expression", sel.node), span);
                        TypeAndValue::invalid()
                    }
                    None => TypeAndValue::invalid(),
                };
            }
        }

        let tv = self.check_expr(base, None);
        if tv.ty.is_invalid() {
            return TypeAndValue::invalid();
        }
        let mut under = self.underlying(&tv.ty);
        if let Type::Pointer(elem) = &under {
            under = self.underlying(elem);
        }
        if let Type::Struct(def) = &under {
            if let Some(ty) = self.lookup_field(def, &sel.node) {
                return TypeAndValue::new(ty, None);
            }
        }
        self.error(
            format!(
                "{}.{} undefined (type {} has no field or method {})",
                base.node, sel.node, tv.ty, sel.node
            ),
            sel.span,
        );
        TypeAndValue::invalid()
    }

    /// Direct fields first, then fields promoted through embedded structs.
    fn lookup_field(&mut self, def: &StructDef, name: &str) -> Option<Type> {
        if let Some(field) = def.field(name) {
            return Some(field.ty.clone());
        }
        for field in def.fields.iter().filter(|f| f.embedded) {
            let mut under = self.underlying(&field.ty);
            if let Type::Pointer(elem) = &under {
                under = self.underlying(elem);
            }
            if let Type::Struct(inner) = &under {
                if let Some(ty) = self.lookup_field(inner, name) {
                    return Some(ty);
                }
            }
        }
        None
    }

    pub(super) fn check_index(&mut self, base: &Spanned<Expr>, index: &Spanned<Expr>, span: Span) -> TypeAndValue {
        let tv = self.check_expr(base, None);
        if tv.ty.is_invalid() {
            self.check_expr(index, None);
            return TypeAndValue::invalid();
        }
        match self.underlying(&tv.ty) {
            Type::Slice(elem) => {
                self.check_int_index(index);
                TypeAndValue::new(*elem, None)
            }
            Type::Basic(BasicTypeId::String) | Type::Untyped(Untyped::String) => {
                self.check_int_index(index);
                TypeAndValue::new(Type::Basic(BasicTypeId::Uint8), None)
            }
            Type::Map(key, value) => {
                let key_tv = self.check_expr(index, Some(&*key));
                self.assign(&key_tv, &index.node, &key, "map index", index.span);
                TypeAndValue::new(*value, None)
            }
            _ => {
                let desc = describe(&tv);
                self.error(format!("invalid operation: cannot index {} ({desc})", base.node), span);
                TypeAndValue::invalid()
            }
        }
    }

    fn check_int_index(&mut self, index: &Spanned<Expr>) {
        let tv = self.check_expr(index, None);
        if tv.ty.is_invalid() {
            return;
        }
        let is_integer = match &tv.ty {
            Type::Untyped(_) => tv.value.as_ref().and_then(|v| v.as_i128()).is_some(),
            ty => self
                .underlying(ty)
                .basic_category()
                .is_some_and(|c| c.is_integer()),
        };
        if !is_integer {
            let desc = describe(&tv);
            self.error(format!("invalid argument: index {} ({desc}) must be integer", index.node), index.span);
            return;
        }
        if let Some(v) = tv.value.as_ref().and_then(|v| v.as_i128()) {
            if v < 0 {
                let desc = describe(&tv);
                self.error(
                    format!("invalid argument: index {} ({desc}) must not be negative", index.node),
                    index.span,
                );
            }
        }
    }

    pub(super) fn check_deref(&mut self, inner: &Spanned<Expr>, span: Span) -> TypeAndValue {
        let tv = self.check_expr(inner, None);
        if tv.ty.is_invalid() {
            return TypeAndValue::invalid();
        }
        match self.underlying(&tv.ty) {
            Type::Pointer(elem) => TypeAndValue::new(*elem, None),
            _ => {
                let desc = describe(&tv);
                self.error(format!("invalid operation: cannot indirect {} ({desc})", inner.node), span);
                TypeAndValue::invalid()
            }
        }
    }
}
