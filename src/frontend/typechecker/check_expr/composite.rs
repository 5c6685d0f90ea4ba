//! Composite literals and conversions.

use std::collections::HashSet;

use gunk_core::strings::is_exported;

use crate::frontend::ast::*;
use crate::frontend::typechecker::const_eval::{ConstValue, Misfit, representable};
use crate::frontend::typechecker::types::{StructDef, Type, TypeAndValue, Untyped};
use crate::frontend::typechecker::Checker;

use super::describe;

impl<'a> Checker<'a> {
    /// `T{...}`, or `{...}` whose type comes from the enclosing literal.
    pub(super) fn check_composite(
        &mut self,
        ty: Option<&Spanned<Expr>>,
        elts: &[Spanned<Expr>],
        span: Span,
        hint: Option<&Type>,
    ) -> TypeAndValue {
        // An elided `{...}` for a `*T` element means `&T{...}`.
        let (lit_ty, pointer) = match (ty, hint) {
            (Some(ty), _) => (self.resolve_type(ty), false),
            (None, Some(Type::Pointer(elem))) => ((**elem).clone(), true),
            (None, Some(hint)) => (hint.clone(), false),
            (None, None) => {
                self.error("invalid composite literal type: missing type".to_string(), span);
                return TypeAndValue::invalid();
            }
        };

        match self.underlying(&lit_ty) {
            Type::Struct(def) => self.check_struct_literal(&lit_ty, &def, elts, span),
            Type::Slice(elem) => {
                for elt in elts {
                    let value = match &elt.node {
                        Expr::KeyValue { key, value } => {
                            self.check_literal_index(key);
                            value.as_ref()
                        }
                        _ => elt,
                    };
                    let tv = self.check_expr(value, Some(&elem));
                    self.assign(&tv, &value.node, &elem, "slice literal", value.span);
                }
            }
            Type::Map(key_ty, value_ty) => {
                let mut seen: Vec<ConstValue> = Vec::new();
                for elt in elts {
                    let Expr::KeyValue { key, value } = &elt.node else {
                        self.error("missing key in map literal".to_string(), elt.span);
                        self.check_expr(elt, Some(&value_ty));
                        continue;
                    };
                    let key_tv = self.check_expr(key, Some(&key_ty));
                    if let Some(Some(k)) = self.assign(&key_tv, &key.node, &key_ty, "map literal", key.span) {
                        if seen.contains(&k) {
                            self.error(format!("duplicate key {} in map literal", key.node), key.span);
                        } else {
                            seen.push(k);
                        }
                    }
                    let value_tv = self.check_expr(value, Some(&value_ty));
                    self.assign(&value_tv, &value.node, &value_ty, "map literal", value.span);
                }
            }
            Type::Invalid => {
                for elt in elts {
                    self.check_expr(elt, None);
                }
                return TypeAndValue::invalid();
            }
            _ => {
                self.error(format!("invalid composite literal type {lit_ty}"), span);
                return TypeAndValue::invalid();
            }
        }

        let ty = if pointer { Type::Pointer(Box::new(lit_ty)) } else { lit_ty };
        TypeAndValue::new(ty, None)
    }

    fn check_struct_literal(&mut self, lit_ty: &Type, def: &StructDef, elts: &[Spanned<Expr>], span: Span) {
        let Some(first) = elts.first() else {
            return;
        };
        let foreign = matches!(lit_ty, Type::Named(name) if name.package != self.pkg.path);

        if matches!(first.node, Expr::KeyValue { .. }) {
            let mut seen = HashSet::new();
            for elt in elts {
                let Expr::KeyValue { key, value } = &elt.node else {
                    self.error(
                        "mixture of field:value and value elements in struct literal".to_string(),
                        elt.span,
                    );
                    continue;
                };
                let Expr::Ident(name) = &key.node else {
                    self.error(format!("invalid field name {} in struct literal", key.node), key.span);
                    continue;
                };
                let Some(field) = def.field(name) else {
                    self.error(format!("unknown field {name} in struct literal of type {lit_ty}"), key.span);
                    self.check_expr(value, None);
                    continue;
                };
                if foreign && !is_exported(name) {
                    self.error(
                        format!("cannot refer to unexported field {name} in struct literal of type {lit_ty}"),
                        key.span,
                    );
                    continue;
                }
                if !seen.insert(name.clone()) {
                    self.error(format!("duplicate field name {name} in struct literal"), key.span);
                    continue;
                }
                let field_ty = field.ty.clone();
                let tv = self.check_expr(value, Some(&field_ty));
                self.assign(&tv, &value.node, &field_ty, "struct literal", value.span);
            }
            return;
        }

        for (i, elt) in elts.iter().enumerate() {
            if matches!(elt.node, Expr::KeyValue { .. }) {
                self.error(
                    "mixture of field:value and value elements in struct literal".to_string(),
                    elt.span,
                );
                continue;
            }
            let Some(field) = def.fields.get(i) else {
                self.error(format!("too many values in struct literal of type {lit_ty}"), elt.span);
                return;
            };
            let field_ty = field.ty.clone();
            let tv = self.check_expr(elt, Some(&field_ty));
            self.assign(&tv, &elt.node, &field_ty, "struct literal", elt.span);
        }
        if elts.len() < def.fields.len() {
            self.error(format!("too few values in struct literal of type {lit_ty}"), span);
        }
    }

    /// `[]T{2: x}`: the key must be a non-negative integer constant.
    fn check_literal_index(&mut self, key: &Spanned<Expr>) {
        let tv = self.check_expr(key, None);
        if tv.ty.is_invalid() {
            return;
        }
        match tv.value.as_ref().and_then(ConstValue::as_i128) {
            Some(index) if index >= 0 => {}
            Some(_) => self.error(
                format!("index {} must be non-negative integer constant", key.node),
                key.span,
            ),
            None => self.error(format!("index {} must be integer constant", key.node), key.span),
        }
    }

    /// `T(x)`.
    pub(super) fn check_conversion(
        &mut self,
        target: Type,
        func: &Spanned<Expr>,
        args: &[Spanned<Expr>],
        span: Span,
    ) -> TypeAndValue {
        let arg = match args {
            [arg] => arg,
            [] => {
                self.error(format!("missing argument in conversion to {}", func.node), span);
                return TypeAndValue::new(target, None);
            }
            _ => {
                self.error(format!("too many arguments in conversion to {}", func.node), args[1].span);
                return TypeAndValue::new(target, None);
            }
        };
        let tv = self.check_expr(arg, None);
        if tv.ty.is_invalid() || target.is_invalid() {
            return TypeAndValue::new(target, None);
        }

        let under = self.underlying(&target);
        if let (Some(value), Type::Basic(id)) = (&tv.value, &under) {
            return match representable(value, *id) {
                Ok(converted) => TypeAndValue::new(target, Some(converted)),
                Err(Misfit::Overflows) => {
                    self.error(format!("constant {value} overflows {target}"), arg.span);
                    TypeAndValue::invalid()
                }
                Err(misfit) => {
                    let suffix = if misfit == Misfit::Truncated { " (truncated)" } else { "" };
                    let desc = describe(&tv);
                    self.error(format!("cannot convert {} ({desc}) to type {target}{suffix}", arg.node), arg.span);
                    TypeAndValue::invalid()
                }
            };
        }

        let source_under = self.underlying(&tv.ty);
        let numeric = |t: &Type| t.basic_category().is_some_and(|c| c.is_numeric());
        let convertible = source_under == under
            || (numeric(&source_under) && numeric(&under))
            || matches!(tv.ty, Type::Untyped(Untyped::Nil)) && under.is_nillable()
            || self.assign_quiet(&tv, &target);
        if !convertible {
            let desc = describe(&tv);
            self.error(format!("cannot convert {} ({desc}) to type {target}", arg.node), arg.span);
            return TypeAndValue::invalid();
        }
        TypeAndValue::new(target, None)
    }

    /// [`Checker::assign`] without reporting.
    fn assign_quiet(&mut self, tv: &TypeAndValue, target: &Type) -> bool {
        let before = self.errors.len();
        let ok = self.assign(tv, &Expr::Ident(String::new()), target, "", Span::default()).is_some();
        self.errors.truncate(before);
        ok
    }
}
