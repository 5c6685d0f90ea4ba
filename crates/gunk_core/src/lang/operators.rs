//! Operator vocabulary.
//!
//! This module defines the canonical operator set used in constant expressions and tag
//! expressions, along with binary precedence and fixity.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - Precedence follows the host syntax: `||` (1) < `&&` (2) < comparisons (3) < additive (4) < multiplicative (5).
//!   Prefix-only operators have precedence `0`.
//!
//! ## Examples
//! ```rust
//! use gunk_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::from_str("&^"), Some(OperatorId::AndNot));
//! assert_eq!(operators::info_for(OperatorId::Star).precedence, 5);
//! ```

/// Define whether an operator may appear as infix (binary), prefix (unary), or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Infix,
    Prefix,
    Both,
}

/// Stable identifier for every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Bitwise
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    AndNot,

    // Logical
    AndAnd,
    OrOr,
    Bang,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Assignment (only used in declarations)
    Eq,
}

/// Metadata for an operator.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub spelling: &'static str,
    /// Binary precedence; higher binds tighter. `0` means “not a binary operator”.
    pub precedence: u8,
    pub fixity: Fixity,
}

/// Registry of all operators.
pub const OPERATORS: &[OperatorInfo] = &[
    op(OperatorId::Plus, "+", 4, Fixity::Both),
    op(OperatorId::Minus, "-", 4, Fixity::Both),
    op(OperatorId::Star, "*", 5, Fixity::Both),
    op(OperatorId::Slash, "/", 5, Fixity::Infix),
    op(OperatorId::Percent, "%", 5, Fixity::Infix),
    op(OperatorId::Amp, "&", 5, Fixity::Both),
    op(OperatorId::Pipe, "|", 4, Fixity::Infix),
    op(OperatorId::Caret, "^", 4, Fixity::Both),
    op(OperatorId::Shl, "<<", 5, Fixity::Infix),
    op(OperatorId::Shr, ">>", 5, Fixity::Infix),
    op(OperatorId::AndNot, "&^", 5, Fixity::Infix),
    op(OperatorId::AndAnd, "&&", 2, Fixity::Infix),
    op(OperatorId::OrOr, "||", 1, Fixity::Infix),
    op(OperatorId::Bang, "!", 0, Fixity::Prefix),
    op(OperatorId::EqEq, "==", 3, Fixity::Infix),
    op(OperatorId::NotEq, "!=", 3, Fixity::Infix),
    op(OperatorId::Lt, "<", 3, Fixity::Infix),
    op(OperatorId::LtEq, "<=", 3, Fixity::Infix),
    op(OperatorId::Gt, ">", 3, Fixity::Infix),
    op(OperatorId::GtEq, ">=", 3, Fixity::Infix),
    op(OperatorId::Eq, "=", 0, Fixity::Infix),
];

/// Return the full metadata entry for an operator.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    OPERATORS.iter().find(|o| o.id == id).expect("operator info missing")
}

/// Canonical spelling.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).spelling
}

/// Binary precedence of `id` (`0` for prefix-only operators and `=`).
pub fn precedence(id: OperatorId) -> u8 {
    info_for(id).precedence
}

/// Return `true` if `id` may start a unary expression.
pub fn is_prefix(id: OperatorId) -> bool {
    matches!(info_for(id).fixity, Fixity::Prefix | Fixity::Both)
}

/// Resolve an operator spelling to its identifier.
pub fn from_str(spelling: &str) -> Option<OperatorId> {
    OPERATORS.iter().find(|o| o.spelling == spelling).map(|o| o.id)
}

// --- helpers -----------------------------------------------------------------

const fn op(id: OperatorId, spelling: &'static str, precedence: u8, fixity: Fixity) -> OperatorInfo {
    OperatorInfo {
        id,
        spelling,
        precedence,
        fixity,
    }
}
