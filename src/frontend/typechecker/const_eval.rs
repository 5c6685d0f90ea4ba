//! Constant values, constant folding and constant declarations.
//!
//! Constants are evaluated lazily through [`Checker::resolve_decl`]; a constant that refers back
//! to itself (directly or through other constants) is an initialization cycle. Untyped constants
//! keep their untyped kind until they are used where a typed value is required, at which point
//! [`representable`] decides whether the value fits.

use std::fmt;

use gunk_core::lang::operators::OperatorId;
use gunk_core::lang::types::{self as basic_types, BasicTypeCategory, BasicTypeId};
use gunk_core::strings::quote;

use crate::frontend::ast::{Expr, Span, Spanned};

use super::types::{Type, Untyped};
use super::{Checker, Object};

/// Value of a constant expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Bool(bool),
    String(String),
    Int(i128),
    Float(f64),
}

impl ConstValue {
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            ConstValue::Int(v) => Some(*v),
            ConstValue::Float(f) if f.fract() == 0.0 && f.abs() < 1e38 => Some(*f as i128),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConstValue::Int(v) => Some(*v as f64),
            ConstValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Bool(b) => write!(f, "{b}"),
            ConstValue::String(s) => write!(f, "{}", quote(s)),
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Why a constant does not fit a basic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Misfit {
    /// Wrong kind of value altogether (a string for an int).
    Mismatch,
    Overflows,
    /// A non-integral float for an integer type.
    Truncated,
}

/// Convert `value` to a value of basic type `id`, if it is representable.
pub(crate) fn representable(value: &ConstValue, id: BasicTypeId) -> Result<ConstValue, Misfit> {
    let info = basic_types::info_for(id);
    match (info.category, value) {
        (BasicTypeCategory::Boolean, ConstValue::Bool(_)) | (BasicTypeCategory::Text, ConstValue::String(_)) => {
            Ok(value.clone())
        }
        (BasicTypeCategory::SignedInteger | BasicTypeCategory::UnsignedInteger, ConstValue::Float(f)) => {
            if f.fract() != 0.0 || !f.is_finite() {
                return Err(Misfit::Truncated);
            }
            if f.abs() >= 1e38 {
                return Err(Misfit::Overflows);
            }
            representable(&ConstValue::Int(*f as i128), id)
        }
        (BasicTypeCategory::SignedInteger, ConstValue::Int(v)) => {
            let max = (1i128 << (info.bits - 1)) - 1;
            let min = -(1i128 << (info.bits - 1));
            if *v < min || *v > max {
                return Err(Misfit::Overflows);
            }
            Ok(value.clone())
        }
        (BasicTypeCategory::UnsignedInteger, ConstValue::Int(v)) => {
            let max = (1i128 << info.bits) - 1;
            if *v < 0 || *v > max {
                return Err(Misfit::Overflows);
            }
            Ok(value.clone())
        }
        (BasicTypeCategory::Float, ConstValue::Int(_) | ConstValue::Float(_)) => {
            let f = value.as_f64().unwrap_or_default();
            let limit = if info.bits == 32 { f32::MAX as f64 } else { f64::MAX };
            if !f.is_finite() || f.abs() > limit {
                return Err(Misfit::Overflows);
            }
            Ok(ConstValue::Float(f))
        }
        _ => Err(Misfit::Mismatch),
    }
}

/// Untyped kind matching a basic category, used when checking untyped operands against typed ones.
pub(crate) fn untyped_fits(kind: Untyped, category: BasicTypeCategory) -> bool {
    match kind {
        Untyped::Bool => category == BasicTypeCategory::Boolean,
        Untyped::String => category == BasicTypeCategory::Text,
        Untyped::Int | Untyped::Rune | Untyped::Float => category.is_numeric(),
        Untyped::Nil => false,
    }
}

/// Fold a binary operation on two constants.
///
/// `integer` selects truncating division for integer operands.
pub(crate) fn fold_binary(op: OperatorId, lhs: &ConstValue, rhs: &ConstValue, integer: bool) -> Result<ConstValue, String> {
    use ConstValue::*;
    let overflow = || "constant overflow".to_string();
    match (op, lhs, rhs) {
        (OperatorId::AndAnd, Bool(a), Bool(b)) => Ok(Bool(*a && *b)),
        (OperatorId::OrOr, Bool(a), Bool(b)) => Ok(Bool(*a || *b)),
        (OperatorId::Plus, String(a), String(b)) => Ok(String(format!("{a}{b}"))),
        (OperatorId::EqEq | OperatorId::NotEq | OperatorId::Lt | OperatorId::LtEq | OperatorId::Gt | OperatorId::GtEq, ..) => {
            let ordering = match (lhs, rhs) {
                (Bool(a), Bool(b)) => {
                    if !matches!(op, OperatorId::EqEq | OperatorId::NotEq) {
                        return Err("operator not defined on untyped bool".to_string());
                    }
                    a.partial_cmp(b)
                }
                (String(a), String(b)) => a.partial_cmp(b),
                (Int(a), Int(b)) => a.partial_cmp(b),
                _ => match (lhs.as_f64(), rhs.as_f64()) {
                    (Some(a), Some(b)) => a.partial_cmp(&b),
                    _ => None,
                },
            };
            let Some(ordering) = ordering else {
                return Err("mismatched constant types".to_string());
            };
            Ok(Bool(match op {
                OperatorId::EqEq => ordering.is_eq(),
                OperatorId::NotEq => ordering.is_ne(),
                OperatorId::Lt => ordering.is_lt(),
                OperatorId::LtEq => ordering.is_le(),
                OperatorId::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            }))
        }
        (_, Int(a), Int(b)) => {
            let (a, b) = (*a, *b);
            let value = match op {
                OperatorId::Plus => a.checked_add(b),
                OperatorId::Minus => a.checked_sub(b),
                OperatorId::Star => a.checked_mul(b),
                OperatorId::Slash | OperatorId::Percent if b == 0 => {
                    return Err("invalid operation: division by zero".to_string());
                }
                OperatorId::Slash if integer => a.checked_div(b),
                OperatorId::Slash => return Ok(Float(a as f64 / b as f64)),
                OperatorId::Percent => a.checked_rem(b),
                OperatorId::Amp => Some(a & b),
                OperatorId::Pipe => Some(a | b),
                OperatorId::Caret => Some(a ^ b),
                OperatorId::AndNot => Some(a & !b),
                OperatorId::Shl => u32::try_from(b).ok().and_then(|s| a.checked_shl(s)).filter(|v| (v >> b) == a),
                OperatorId::Shr => u32::try_from(b).ok().map(|s| if s >= 128 { a >> 127 } else { a >> s }),
                _ => return Err(format!("operator {} not defined on constants", basic_op(op))),
            };
            value.map(Int).ok_or_else(overflow)
        }
        (OperatorId::Plus | OperatorId::Minus | OperatorId::Star | OperatorId::Slash, _, _) => {
            let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) else {
                return Err("mismatched constant types".to_string());
            };
            let value = match op {
                OperatorId::Plus => a + b,
                OperatorId::Minus => a - b,
                OperatorId::Star => a * b,
                _ if b == 0.0 => return Err("invalid operation: division by zero".to_string()),
                _ => a / b,
            };
            if value.is_finite() { Ok(Float(value)) } else { Err(overflow()) }
        }
        _ => Err(format!("operator {} not defined on constants", basic_op(op))),
    }
}

fn basic_op(op: OperatorId) -> &'static str {
    gunk_core::lang::operators::as_str(op)
}

impl<'a> Checker<'a> {
    /// Evaluate one constant of a const spec.
    pub(super) fn eval_const_decl(
        &mut self,
        name: &str,
        name_span: Span,
        ty: Option<&'a Spanned<Expr>>,
        init: Option<&'a Spanned<Expr>>,
    ) -> Option<Object> {
        let declared = ty.map(|t| self.resolve_type(t));
        if let Some(declared) = &declared {
            match self.underlying(declared) {
                Type::Basic(_) | Type::Invalid => {}
                _ => {
                    let span = ty.map_or(name_span, |t| t.span);
                    self.error(format!("invalid constant type {declared}"), span);
                    return None;
                }
            }
        }

        // Missing initializers were reported when the spec was collected.
        let init = init?;
        let tv = self.check_expr(init, declared.as_ref());
        if tv.ty.is_invalid() {
            return None;
        }
        let Some(value) = tv.value.clone() else {
            self.error(format!("{} (value of type {}) is not constant", init.node, tv.ty), init.span);
            return None;
        };

        let (ty, value) = match declared {
            Some(declared) => match self.assign(&tv, &init.node, &declared, "constant declaration", init.span) {
                Some(converted) => (declared, converted.unwrap_or(value)),
                None => return None,
            },
            None => (tv.ty, value),
        };
        tracing::trace!(constant = name, %value, "evaluated constant");
        Some(Object::Const {
            ty,
            value,
            span: name_span,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn representable_checks_ranges() {
        assert_eq!(representable(&ConstValue::Int(127), BasicTypeId::Int8), Ok(ConstValue::Int(127)));
        assert_eq!(representable(&ConstValue::Int(128), BasicTypeId::Int8), Err(Misfit::Overflows));
        assert_eq!(representable(&ConstValue::Int(-1), BasicTypeId::Uint), Err(Misfit::Overflows));
        assert_eq!(representable(&ConstValue::Float(2.0), BasicTypeId::Uint8), Ok(ConstValue::Int(2)));
        assert_eq!(representable(&ConstValue::Float(2.5), BasicTypeId::Int), Err(Misfit::Truncated));
        assert_eq!(representable(&ConstValue::Int(3), BasicTypeId::Float32), Ok(ConstValue::Float(3.0)));
        assert_eq!(
            representable(&ConstValue::String("x".into()), BasicTypeId::Int),
            Err(Misfit::Mismatch)
        );
    }

    #[test]
    fn fold_integer_and_float_division() {
        let seven = ConstValue::Int(7);
        let two = ConstValue::Int(2);
        assert_eq!(fold_binary(OperatorId::Slash, &seven, &two, true), Ok(ConstValue::Int(3)));
        assert_eq!(fold_binary(OperatorId::Slash, &seven, &two, false), Ok(ConstValue::Float(3.5)));
        assert_eq!(fold_binary(OperatorId::Shl, &ConstValue::Int(1), &ConstValue::Int(10), true), Ok(ConstValue::Int(1024)));
        assert!(fold_binary(OperatorId::Percent, &seven, &ConstValue::Int(0), true).is_err());
    }

    #[test]
    fn fold_comparisons_and_strings() {
        let a = ConstValue::String("a".into());
        let b = ConstValue::String("b".into());
        assert_eq!(fold_binary(OperatorId::Lt, &a, &b, false), Ok(ConstValue::Bool(true)));
        assert_eq!(
            fold_binary(OperatorId::Plus, &a, &b, false),
            Ok(ConstValue::String("ab".into()))
        );
        assert_eq!(
            fold_binary(OperatorId::EqEq, &ConstValue::Int(1), &ConstValue::Float(1.0), false),
            Ok(ConstValue::Bool(true))
        );
    }
}
