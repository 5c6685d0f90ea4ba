//! Assignability: may a checked value be used where a given type is required?

use gunk_core::lang::types as basic_types;

use crate::frontend::ast::{Expr, Span};
use crate::frontend::typechecker::const_eval::{ConstValue, Misfit, representable, untyped_fits};
use crate::frontend::typechecker::types::{InterfaceDef, Type, TypeAndValue, Untyped};
use crate::frontend::typechecker::Checker;

use super::describe;

impl<'a> Checker<'a> {
    /// Check that `tv` (the result of `expr`) may be used as a value of type `target`.
    ///
    /// ## Returns
    /// - `Some(value)`: assignable; `value` is the constant converted to `target`, if constant.
    /// - `None`: not assignable; an error mentioning `ctx` was reported.
    pub(crate) fn assign(
        &mut self,
        tv: &TypeAndValue,
        expr: &Expr,
        target: &Type,
        ctx: &str,
        span: Span,
    ) -> Option<Option<ConstValue>> {
        if tv.ty.is_invalid() || target.is_invalid() || tv.ty == *target {
            return Some(tv.value.clone());
        }
        let under = self.underlying(target);

        let misfit = match &tv.ty {
            Type::Untyped(Untyped::Nil) => {
                if under.is_nillable() {
                    return Some(None);
                }
                Misfit::Mismatch
            }
            Type::Untyped(kind) => match &under {
                Type::Basic(id) if untyped_fits(*kind, basic_types::category(*id)) => {
                    let Some(value) = &tv.value else {
                        return Some(None);
                    };
                    match representable(value, *id) {
                        Ok(converted) => return Some(Some(converted)),
                        Err(misfit) => misfit,
                    }
                }
                Type::Interface(def) if def.methods.is_empty() => return Some(tv.value.clone()),
                _ => Misfit::Mismatch,
            },
            source => {
                if let Type::Interface(def) = &under {
                    match self.missing_method(source, def) {
                        None => return Some(None),
                        Some(method) => {
                            let desc = describe(tv);
                            self.error(
                                format!(
                                    "cannot use {expr} ({desc}) as {target} value in {ctx}: {source} does not implement {target} (missing method {method})"
                                ),
                                span,
                            );
                            return None;
                        }
                    }
                }
                let source_under = self.underlying(source);
                let either_unnamed = !matches!(source, Type::Named(_)) || !matches!(target, Type::Named(_));
                if either_unnamed && source_under == under {
                    return Some(tv.value.clone());
                }
                Misfit::Mismatch
            }
        };

        let suffix = match misfit {
            Misfit::Mismatch => "",
            Misfit::Overflows => " (overflows)",
            Misfit::Truncated => " (truncated)",
        };
        let desc = describe(tv);
        self.error(format!("cannot use {expr} ({desc}) as {target} value in {ctx}{suffix}"), span);
        None
    }

    /// First method of interface `def` that `source` lacks. Only interfaces have methods in Gunk.
    fn missing_method(&mut self, source: &Type, def: &InterfaceDef) -> Option<String> {
        let provided = match self.underlying(source) {
            Type::Interface(src) => src.methods,
            _ => Vec::new(),
        };
        def.methods
            .iter()
            .find(|m| !provided.iter().any(|p| p == *m))
            .map(|m| m.name.clone())
    }
}
