//! Unary and binary operators, with constant folding.

use gunk_core::lang::operators::{self, OperatorId};
use gunk_core::lang::types::BasicTypeCategory;

use crate::frontend::ast::*;
use crate::frontend::typechecker::const_eval::{ConstValue, Misfit, fold_binary, representable, untyped_fits};
use crate::frontend::typechecker::types::{Type, TypeAndValue, Untyped};
use crate::frontend::typechecker::Checker;

use super::describe;

impl<'a> Checker<'a> {
    // ========================================================================
    // Unary operators
    // ========================================================================

    pub(super) fn check_unary(&mut self, op: OperatorId, operand: &Spanned<Expr>, span: Span) -> TypeAndValue {
        if op == OperatorId::Amp {
            return self.check_address_of(operand, span);
        }
        let tv = self.check_expr(operand, None);
        if tv.ty.is_invalid() {
            return TypeAndValue::invalid();
        }
        let category = self.operand_category(&tv.ty);
        let defined = match op {
            OperatorId::Plus | OperatorId::Minus => category.is_some_and(|c| c.is_numeric()),
            OperatorId::Bang => category == Some(BasicTypeCategory::Boolean),
            OperatorId::Caret => category.is_some_and(|c| c.is_integer()),
            _ => false,
        };
        if !defined {
            return self.undefined_operator(op, &operand.node, &tv, span);
        }

        let Some(value) = &tv.value else {
            return TypeAndValue::new(tv.ty, None);
        };
        let folded = match (op, value) {
            (OperatorId::Plus, v) => Some(v.clone()),
            (OperatorId::Minus, ConstValue::Int(v)) => v.checked_neg().map(ConstValue::Int),
            (OperatorId::Minus, ConstValue::Float(v)) => Some(ConstValue::Float(-v)),
            (OperatorId::Bang, ConstValue::Bool(v)) => Some(ConstValue::Bool(!v)),
            (OperatorId::Caret, ConstValue::Int(v)) => {
                let bits = self.unsigned_bits(&tv.ty);
                Some(ConstValue::Int(match bits {
                    Some(bits) => !v & ((1i128 << bits) - 1),
                    None => !v,
                }))
            }
            _ => None,
        };
        let Some(folded) = folded else {
            self.error(format!("constant {}{} overflows", operators::as_str(op), value), span);
            return TypeAndValue::invalid();
        };
        self.typed_constant(tv.ty, folded, span)
    }

    /// `&T{...}` is the only addressable operand in Gunk.
    fn check_address_of(&mut self, operand: &Spanned<Expr>, span: Span) -> TypeAndValue {
        let mut inner = operand;
        while let Expr::Paren(paren) = &inner.node {
            inner = paren;
        }
        if !matches!(inner.node, Expr::CompositeLit { .. }) {
            self.check_expr(operand, None);
            self.error(format!("invalid operation: cannot take address of {}", operand.node), span);
            return TypeAndValue::invalid();
        }
        let tv = self.check_expr(inner, None);
        if tv.ty.is_invalid() {
            return TypeAndValue::invalid();
        }
        TypeAndValue::new(Type::Pointer(Box::new(tv.ty)), None)
    }

    // ========================================================================
    // Binary operators
    // ========================================================================

    pub(super) fn check_binary(
        &mut self,
        op: OperatorId,
        lhs: &Spanned<Expr>,
        rhs: &Spanned<Expr>,
        span: Span,
    ) -> TypeAndValue {
        let left = self.check_expr(lhs, None);
        let right = self.check_expr(rhs, None);
        if left.ty.is_invalid() || right.ty.is_invalid() {
            return TypeAndValue::invalid();
        }
        match op {
            OperatorId::Shl | OperatorId::Shr => self.check_shift(op, lhs, left, rhs, right, span),
            OperatorId::EqEq
            | OperatorId::NotEq
            | OperatorId::Lt
            | OperatorId::LtEq
            | OperatorId::Gt
            | OperatorId::GtEq => self.check_comparison(op, lhs, left, rhs, right, span),
            _ => self.check_arithmetic(op, lhs, left, rhs, right, span),
        }
    }

    fn check_arithmetic(
        &mut self,
        op: OperatorId,
        lhs: &Spanned<Expr>,
        left: TypeAndValue,
        rhs: &Spanned<Expr>,
        right: TypeAndValue,
        span: Span,
    ) -> TypeAndValue {
        let Some(ty) = self.unify(lhs, &left, rhs, &right, op, span) else {
            return TypeAndValue::invalid();
        };
        let category = self.operand_category(&ty);
        let defined = match op {
            OperatorId::Plus => category.is_some_and(|c| c.is_numeric() || c == BasicTypeCategory::Text),
            OperatorId::Minus | OperatorId::Star | OperatorId::Slash => category.is_some_and(|c| c.is_numeric()),
            OperatorId::Percent | OperatorId::Amp | OperatorId::Pipe | OperatorId::Caret | OperatorId::AndNot => {
                category.is_some_and(|c| c.is_integer())
            }
            OperatorId::AndAnd | OperatorId::OrOr => category == Some(BasicTypeCategory::Boolean),
            _ => false,
        };
        if !defined {
            return self.undefined_operator(op, &lhs.node, &TypeAndValue::new(ty, left.value), span);
        }

        let (Some(a), Some(b)) = (&left.value, &right.value) else {
            return TypeAndValue::new(ty, None);
        };
        let integer = category.is_some_and(|c| c.is_integer());
        match fold_binary(op, a, b, integer) {
            Ok(value) => self.typed_constant(ty, value, span),
            Err(msg) => {
                self.error(msg, span);
                TypeAndValue::invalid()
            }
        }
    }

    fn check_comparison(
        &mut self,
        op: OperatorId,
        lhs: &Spanned<Expr>,
        left: TypeAndValue,
        rhs: &Spanned<Expr>,
        right: TypeAndValue,
        span: Span,
    ) -> TypeAndValue {
        let result = Type::Untyped(Untyped::Bool);
        let nil_left = left.ty == Type::Untyped(Untyped::Nil);
        let nil_right = right.ty == Type::Untyped(Untyped::Nil);
        if nil_left || nil_right {
            let other = if nil_left { &right.ty } else { &left.ty };
            let other_under = self.underlying(other);
            let equality = matches!(op, OperatorId::EqEq | OperatorId::NotEq);
            if !equality || !(other_under.is_nillable() || *other == Type::Untyped(Untyped::Nil)) {
                return self.undefined_operator(op, &lhs.node, &left, span);
            }
            return TypeAndValue::new(result, None);
        }

        let Some(ty) = self.unify(lhs, &left, rhs, &right, op, span) else {
            return TypeAndValue::invalid();
        };
        let defined = match op {
            OperatorId::EqEq | OperatorId::NotEq => self.comparable(&ty),
            _ => self
                .operand_category(&ty)
                .is_some_and(|c| c.is_numeric() || c == BasicTypeCategory::Text),
        };
        if !defined {
            return self.undefined_operator(op, &lhs.node, &TypeAndValue::new(ty, left.value), span);
        }
        match (&left.value, &right.value) {
            (Some(a), Some(b)) => match fold_binary(op, a, b, false) {
                Ok(value) => TypeAndValue::new(result, Some(value)),
                Err(msg) => {
                    self.error(msg, span);
                    TypeAndValue::invalid()
                }
            },
            _ => TypeAndValue::new(result, None),
        }
    }

    fn check_shift(
        &mut self,
        op: OperatorId,
        lhs: &Spanned<Expr>,
        left: TypeAndValue,
        rhs: &Spanned<Expr>,
        right: TypeAndValue,
        span: Span,
    ) -> TypeAndValue {
        // An untyped float operand with an integral value shifts as an untyped int.
        let (left_ty, left_value) = match (&left.ty, &left.value) {
            (Type::Untyped(Untyped::Float), Some(ConstValue::Float(f))) if f.fract() == 0.0 && f.is_finite() => {
                (Type::Untyped(Untyped::Int), Some(ConstValue::Int(*f as i128)))
            }
            _ => (left.ty.clone(), left.value.clone()),
        };
        if !self.operand_category(&left_ty).is_some_and(|c| c.is_integer()) {
            let desc = describe(&left);
            self.error(format!("invalid operation: shifted operand {} ({desc}) must be integer", lhs.node), span);
            return TypeAndValue::invalid();
        }

        let count = match &right.value {
            Some(ConstValue::Float(f)) if f.fract() == 0.0 => Some(*f as i128),
            Some(v) => v.as_i128(),
            None => None,
        };
        let count_is_integer = match &right.ty {
            Type::Untyped(_) => count.is_some(),
            ty => self.operand_category(ty).is_some_and(|c| c.is_integer()),
        };
        if !count_is_integer {
            let desc = describe(&right);
            self.error(format!("invalid operation: shift count {} ({desc}) must be integer", rhs.node), rhs.span);
            return TypeAndValue::invalid();
        }
        if let Some(n) = count {
            if n < 0 {
                self.error(format!("invalid shift count {} (negative)", rhs.node), rhs.span);
                return TypeAndValue::invalid();
            }
        }

        let (Some(a), Some(n)) = (left_value, count) else {
            return TypeAndValue::new(left_ty, None);
        };
        match fold_binary(op, &a, &ConstValue::Int(n), true) {
            Ok(value) => self.typed_constant(left_ty, value, span),
            Err(msg) => {
                self.error(msg, span);
                TypeAndValue::invalid()
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// The common operand type of a binary operation, converting an untyped side to the other.
    fn unify(
        &mut self,
        lhs: &Spanned<Expr>,
        left: &TypeAndValue,
        rhs: &Spanned<Expr>,
        right: &TypeAndValue,
        op: OperatorId,
        span: Span,
    ) -> Option<Type> {
        let unified = match (&left.ty, &right.ty) {
            (Type::Untyped(a), Type::Untyped(b)) => {
                if a == b {
                    Some(left.ty.clone())
                } else if a.is_numeric() && b.is_numeric() {
                    Some(Type::Untyped(untyped_rank(*a).max(untyped_rank(*b)).1))
                } else {
                    None
                }
            }
            (Type::Untyped(kind), typed) => self.convert_untyped(*kind, &left.value, typed, span)?,
            (typed, Type::Untyped(kind)) => self.convert_untyped(*kind, &right.value, typed, span)?,
            (a, b) if a == b => Some(a.clone()),
            _ => None,
        };
        if unified.is_none() {
            self.error(
                format!(
                    "invalid operation: {} {} {} (mismatched types {} and {})",
                    lhs.node,
                    operators::as_str(op),
                    rhs.node,
                    left.ty,
                    right.ty
                ),
                span,
            );
        }
        unified
    }

    /// `Some(Some(target))` if an untyped operand converts to `target`, `Some(None)` on a type
    /// mismatch, `None` if a constant does not fit (already reported).
    fn convert_untyped(
        &mut self,
        kind: Untyped,
        value: &Option<ConstValue>,
        target: &Type,
        span: Span,
    ) -> Option<Option<Type>> {
        let under = self.underlying(target);
        let fits = match &under {
            Type::Basic(id) => untyped_fits(kind, gunk_core::lang::types::category(*id)),
            Type::Interface(def) => def.methods.is_empty(),
            _ => false,
        };
        if !fits {
            return Some(None);
        }
        if let (Some(value), Type::Basic(id)) = (value, &under) {
            match representable(value, *id) {
                Ok(_) => {}
                Err(Misfit::Truncated) => {
                    self.error(format!("constant {value} truncated to {target}"), span);
                    return None;
                }
                Err(_) => {
                    self.error(format!("constant {value} overflows {target}"), span);
                    return None;
                }
            }
        }
        Some(Some(target.clone()))
    }

    /// Wrap a folded constant, checking that it fits a typed result.
    fn typed_constant(&mut self, ty: Type, value: ConstValue, span: Span) -> TypeAndValue {
        if let Type::Basic(id) = self.underlying(&ty) {
            return match representable(&value, id) {
                Ok(converted) => TypeAndValue::new(ty, Some(converted)),
                Err(_) => {
                    self.error(format!("constant {value} overflows {ty}"), span);
                    TypeAndValue::invalid()
                }
            };
        }
        TypeAndValue::new(ty, Some(value))
    }

    /// Basic category of an operand type; untyped kinds map onto the matching category.
    fn operand_category(&mut self, ty: &Type) -> Option<BasicTypeCategory> {
        match ty {
            Type::Untyped(Untyped::Bool) => Some(BasicTypeCategory::Boolean),
            Type::Untyped(Untyped::String) => Some(BasicTypeCategory::Text),
            Type::Untyped(Untyped::Int | Untyped::Rune) => Some(BasicTypeCategory::SignedInteger),
            Type::Untyped(Untyped::Float) => Some(BasicTypeCategory::Float),
            Type::Untyped(Untyped::Nil) => None,
            ty => self.underlying(ty).basic_category(),
        }
    }

    fn unsigned_bits(&mut self, ty: &Type) -> Option<u32> {
        match self.underlying(ty) {
            Type::Basic(id) if gunk_core::lang::types::category(id) == BasicTypeCategory::UnsignedInteger => {
                Some(gunk_core::lang::types::info_for(id).bits)
            }
            _ => None,
        }
    }

    fn undefined_operator(&mut self, op: OperatorId, operand: &Expr, tv: &TypeAndValue, span: Span) -> TypeAndValue {
        let desc = describe(tv);
        self.error(
            format!(
                "invalid operation: operator {} not defined on {operand} ({desc})",
                operators::as_str(op)
            ),
            span,
        );
        TypeAndValue::invalid()
    }
}

/// Untyped numeric kinds order as int < rune < float when mixed.
fn untyped_rank(kind: Untyped) -> (u8, Untyped) {
    let rank = match kind {
        Untyped::Int => 0,
        Untyped::Rune => 1,
        _ => 2,
    };
    (rank, kind)
}
