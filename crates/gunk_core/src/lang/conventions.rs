//! Well-known spellings shared by the loader, the tag splitter and the validator.
//!
//! These are not keywords: they live inside comments, struct tags, file names and manifests.
//! Keeping them in one place means every consumer agrees on the exact bytes.

/// Marker that starts an annotation line inside a doc comment.
pub const TAG_MARKER: &str = "+gunk";

/// Marker plus its mandatory trailing space; only lines starting with this open a tag.
pub const TAG_MARKER_PREFIX: &str = "+gunk ";

/// File extension (without the dot) of Gunk source files.
pub const SOURCE_EXTENSION: &str = "gunk";

/// Comment prefix on the package line that overrides the schema package name.
///
/// ## Examples
/// ```text
/// package util // proto "util.v1"
/// ```
pub const SCHEMA_PACKAGE_DIRECTIVE: &str = "// proto ";

/// Placeholder import path for packages built from an explicit file list.
pub const COMMAND_LINE_PACKAGE: &str = "command-line-arguments";

/// Struct-tag key holding a field's sequence (wire) number.
pub const SEQUENCE_KEY: &str = "pb";

/// Struct-tag key holding a field's wire-name override.
pub const WIRE_NAME_KEY: &str = "json";

/// Optional module manifest read from the loader directory.
pub const MANIFEST_FILE: &str = "gunk.mod";

/// Name of the temporary import file handed to the external schema compiler.
pub const GENERATED_IMPORTS_FILE: &str = "gunk-proto";

/// Directory name skipped by wildcard package discovery.
pub const TESTDATA_DIR: &str = "testdata";

/// Wildcard suffix on an import pattern.
pub const WILDCARD_SUFFIX: &str = "/...";

/// Return `true` if a file or directory name is hidden from discovery (`.x` or `_x`).
pub fn is_ignored_name(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_')
}

/// Return `true` if `name` ends in the source extension.
pub fn is_source_file(name: &str) -> bool {
    name.strip_suffix(SOURCE_EXTENSION)
        .is_some_and(|stem| stem.ends_with('.') && stem.len() > 1)
}
