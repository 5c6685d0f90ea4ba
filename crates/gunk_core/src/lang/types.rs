//! Predeclared type and value vocabulary.
//!
//! The universe scope of a Gunk package contains the basic types below plus the predeclared
//! values `true`, `false`, `iota` and `nil`. Aliases (`byte`, `rune`) resolve to the same
//! [`BasicTypeId`] as their target.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - This module is vocabulary only (spellings + metadata). Constant representability lives in the type checker,
//!   which reads [`BasicTypeInfo::bits`] and [`BasicTypeCategory`] from here.
//!
//! ## Examples
//! ```rust
//! use gunk_core::lang::types::{self, BasicTypeId};
//!
//! assert_eq!(types::from_str("byte"), Some(BasicTypeId::Uint8));
//! assert_eq!(types::as_str(BasicTypeId::Int32), "int32");
//! assert_eq!(types::info_for(BasicTypeId::Uint16).bits, 16);
//! ```

/// Stable identifier for the predeclared basic types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicTypeId {
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

/// Broad kind of a basic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicTypeCategory {
    Boolean,
    Text,
    SignedInteger,
    UnsignedInteger,
    Float,
}

/// Metadata for a basic type.
#[derive(Debug, Clone, Copy)]
pub struct BasicTypeInfo {
    pub id: BasicTypeId,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub category: BasicTypeCategory,
    /// Width in bits; `0` for non-numeric types.
    pub bits: u32,
}

/// Registry of basic types.
pub const BASIC_TYPES: &[BasicTypeInfo] = &[
    info(BasicTypeId::Bool, "bool", &[], BasicTypeCategory::Boolean, 0),
    info(BasicTypeId::String, "string", &[], BasicTypeCategory::Text, 0),
    info(BasicTypeId::Int, "int", &[], BasicTypeCategory::SignedInteger, 64),
    info(BasicTypeId::Int8, "int8", &[], BasicTypeCategory::SignedInteger, 8),
    info(BasicTypeId::Int16, "int16", &[], BasicTypeCategory::SignedInteger, 16),
    info(BasicTypeId::Int32, "int32", &["rune"], BasicTypeCategory::SignedInteger, 32),
    info(BasicTypeId::Int64, "int64", &[], BasicTypeCategory::SignedInteger, 64),
    info(BasicTypeId::Uint, "uint", &[], BasicTypeCategory::UnsignedInteger, 64),
    info(BasicTypeId::Uint8, "uint8", &["byte"], BasicTypeCategory::UnsignedInteger, 8),
    info(BasicTypeId::Uint16, "uint16", &[], BasicTypeCategory::UnsignedInteger, 16),
    info(BasicTypeId::Uint32, "uint32", &[], BasicTypeCategory::UnsignedInteger, 32),
    info(BasicTypeId::Uint64, "uint64", &[], BasicTypeCategory::UnsignedInteger, 64),
    info(BasicTypeId::Float32, "float32", &[], BasicTypeCategory::Float, 32),
    info(BasicTypeId::Float64, "float64", &[], BasicTypeCategory::Float, 64),
];

/// Resolve a type name (canonical or alias) to a [`BasicTypeId`].
pub fn from_str(name: &str) -> Option<BasicTypeId> {
    BASIC_TYPES
        .iter()
        .find(|t| t.canonical == name || t.aliases.contains(&name))
        .map(|t| t.id)
}

/// Canonical spelling.
pub fn as_str(id: BasicTypeId) -> &'static str {
    info_for(id).canonical
}

/// Category.
pub fn category(id: BasicTypeId) -> BasicTypeCategory {
    info_for(id).category
}

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: BasicTypeId) -> &'static BasicTypeInfo {
    BASIC_TYPES.iter().find(|t| t.id == id).expect("basic type info missing")
}

impl BasicTypeCategory {
    pub fn is_integer(self) -> bool {
        matches!(self, BasicTypeCategory::SignedInteger | BasicTypeCategory::UnsignedInteger)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self == BasicTypeCategory::Float
    }
}

// ============================================================================
// Predeclared values
// ============================================================================

/// Stable identifier for predeclared (universe-scope) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredeclaredValueId {
    True,
    False,
    Iota,
    Nil,
}

/// Metadata for a predeclared value.
#[derive(Debug, Clone, Copy)]
pub struct PredeclaredValueInfo {
    pub id: PredeclaredValueId,
    pub canonical: &'static str,
    pub description: &'static str,
}

/// Registry of predeclared values.
pub const PREDECLARED_VALUES: &[PredeclaredValueInfo] = &[
    PredeclaredValueInfo {
        id: PredeclaredValueId::True,
        canonical: "true",
        description: "Untyped boolean constant true.",
    },
    PredeclaredValueInfo {
        id: PredeclaredValueId::False,
        canonical: "false",
        description: "Untyped boolean constant false.",
    },
    PredeclaredValueInfo {
        id: PredeclaredValueId::Iota,
        canonical: "iota",
        description: "Index of the current spec within a constant declaration group.",
    },
    PredeclaredValueInfo {
        id: PredeclaredValueId::Nil,
        canonical: "nil",
        description: "Zero value for pointer, slice, map and interface types.",
    },
];

/// Resolve a predeclared value name.
pub fn predeclared_value(name: &str) -> Option<PredeclaredValueId> {
    PREDECLARED_VALUES.iter().find(|v| v.canonical == name).map(|v| v.id)
}

// --- helpers -----------------------------------------------------------------

const fn info(
    id: BasicTypeId,
    canonical: &'static str,
    aliases: &'static [&'static str],
    category: BasicTypeCategory,
    bits: u32,
) -> BasicTypeInfo {
    BasicTypeInfo {
        id,
        canonical,
        aliases,
        category,
        bits,
    }
}
