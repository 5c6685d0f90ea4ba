//! Define the reserved keyword vocabulary for the Gunk dialect.
//!
//! This module is the single source of truth for reserved words: a stable identifier
//! ([`KeywordId`]) plus a const metadata table ([`KEYWORDS`]) that records canonical spellings
//! and categories.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - The dialect reserves the full keyword set of its host syntax even though the parser only accepts the
//!   declaration subset (`package`, `import`, `type`, `const`, `struct`, `interface`, `map`). The remaining words
//!   are rejected with a clear diagnostic instead of being silently accepted as identifiers.
//!
//! ## Examples
//! ```rust
//! use gunk_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("interface"), Some(KeywordId::Interface));
//! assert_eq!(keywords::as_str(KeywordId::Import), "import");
//! assert_eq!(keywords::from_str("Interface"), None);
//! ```

/// Stable identifier for every reserved keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordId {
    // Declarations
    Package,
    Import,
    Type,
    Const,
    Var,
    Func,

    // Type constructors
    Struct,
    Interface,
    Map,
    Chan,

    // Reserved (statements; never valid in a Gunk file)
    Break,
    Case,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Go,
    Goto,
    If,
    Range,
    Return,
    Select,
    Switch,
}

/// High-level grouping for documentation and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    /// Introduces a top-level declaration.
    Declaration,
    /// Introduces a composite type.
    TypeConstructor,
    /// Reserved but not part of the dialect.
    Reserved,
}

/// Metadata for a keyword.
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub canonical: &'static str,
    pub category: KeywordCategory,
}

/// Registry of all keywords.
///
/// ## Notes
/// - The ordering is not semantically meaningful, but is grouped for readability.
pub const KEYWORDS: &[KeywordInfo] = &[
    // Declarations
    info(KeywordId::Package, "package", KeywordCategory::Declaration),
    info(KeywordId::Import, "import", KeywordCategory::Declaration),
    info(KeywordId::Type, "type", KeywordCategory::Declaration),
    info(KeywordId::Const, "const", KeywordCategory::Declaration),
    info(KeywordId::Var, "var", KeywordCategory::Declaration),
    info(KeywordId::Func, "func", KeywordCategory::Declaration),
    // Type constructors
    info(KeywordId::Struct, "struct", KeywordCategory::TypeConstructor),
    info(KeywordId::Interface, "interface", KeywordCategory::TypeConstructor),
    info(KeywordId::Map, "map", KeywordCategory::TypeConstructor),
    info(KeywordId::Chan, "chan", KeywordCategory::TypeConstructor),
    // Reserved
    info(KeywordId::Break, "break", KeywordCategory::Reserved),
    info(KeywordId::Case, "case", KeywordCategory::Reserved),
    info(KeywordId::Continue, "continue", KeywordCategory::Reserved),
    info(KeywordId::Default, "default", KeywordCategory::Reserved),
    info(KeywordId::Defer, "defer", KeywordCategory::Reserved),
    info(KeywordId::Else, "else", KeywordCategory::Reserved),
    info(KeywordId::Fallthrough, "fallthrough", KeywordCategory::Reserved),
    info(KeywordId::For, "for", KeywordCategory::Reserved),
    info(KeywordId::Go, "go", KeywordCategory::Reserved),
    info(KeywordId::Goto, "goto", KeywordCategory::Reserved),
    info(KeywordId::If, "if", KeywordCategory::Reserved),
    info(KeywordId::Range, "range", KeywordCategory::Reserved),
    info(KeywordId::Return, "return", KeywordCategory::Reserved),
    info(KeywordId::Select, "select", KeywordCategory::Reserved),
    info(KeywordId::Switch, "switch", KeywordCategory::Reserved),
];

/// Canonical spelling.
///
/// ## Parameters
/// - `id`: Keyword identifier.
///
/// ## Returns
/// - The canonical spelling for `id`.
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Category.
pub fn category(id: KeywordId) -> KeywordCategory {
    info_for(id).category
}

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    KEYWORDS.iter().find(|k| k.id == id).expect("keyword info missing")
}

/// Lookup by spelling.
///
/// ## Returns
/// - `Some(KeywordId)` if the spelling is reserved.
/// - `None` otherwise.
pub fn from_str(s: &str) -> Option<KeywordId> {
    KEYWORDS.iter().find(|k| k.canonical == s).map(|k| k.id)
}

// --- helpers -----------------------------------------------------------------

const fn info(id: KeywordId, canonical: &'static str, category: KeywordCategory) -> KeywordInfo {
    KeywordInfo { id, canonical, category }
}
