//! Loaded packages, their tags and their diagnostics.
//!
//! A [`Package`] is everything the loader learned about one import path: the parsed files, the
//! checked type information, the `+gunk` tags found in doc comments and every problem reported
//! along the way. Packages are shared as `Rc<Package>` and never change once cached.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use serde::{Serialize, Serializer};

use crate::frontend::ast::{Expr, File, Span, Spanned};
use crate::frontend::position::Position;
use crate::frontend::typechecker::{ConstValue, PackageTypes, Type};

/// Category of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// Package or directory enumeration failed.
    ListResolution,
    /// Source or tag syntax is malformed.
    Parse,
    /// A declaration or tag failed type checking, or an import could not be resolved.
    Type,
    /// A struct-tag, numbering, naming or package-name rule was violated.
    Validation,
    Unknown,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::ListResolution => write!(f, "list error"),
            DiagnosticKind::Parse => write!(f, "parse error"),
            DiagnosticKind::Type => write!(f, "type error"),
            DiagnosticKind::Validation => write!(f, "validation error"),
            DiagnosticKind::Unknown => write!(f, "error"),
        }
    }
}

/// One problem recorded on a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(serialize_with = "serialize_position")]
    pub position: Option<Position>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, position: Option<Position>, message: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.position {
            Some(pos) => write!(f, "{pos}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

fn serialize_position<S: Serializer>(position: &Option<Position>, serializer: S) -> Result<S::Ok, S::Error> {
    match position {
        Some(pos) => serializer.serialize_str(&pos.to_string()),
        None => serializer.serialize_str(""),
    }
}

/// One `+gunk` annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    /// Parsed expression; spans are absolute file offsets.
    pub expr: Spanned<Expr>,
    /// Source text of the tag, marker blanked, continuation lines joined with `\n`.
    pub text: String,
    /// Static type; `None` when the loader runs without types.
    pub ty: Option<Type>,
    /// Constant value, if the expression is constant.
    pub value: Option<ConstValue>,
}

/// A loaded Gunk package.
#[derive(Debug, Clone, Default)]
pub struct Package {
    /// Unique key of the package within a loader session.
    pub import_path: String,
    pub dir: PathBuf,
    /// Source file paths, sorted.
    pub files: Vec<PathBuf>,
    /// Display names of the parsed files (`<import path>/<base name>`), parallel to `syntax`.
    pub names: Vec<String>,
    pub syntax: Vec<File>,
    /// Declared package name.
    pub name: String,
    /// Schema package name: the `// proto "..."` directive, or the package name.
    pub proto_name: String,
    /// Type information; `None` unless type checking ran and succeeded.
    pub types: Option<Rc<PackageTypes>>,
    /// Tags keyed by the span of the node they are attached to.
    pub tags: HashMap<Span, Vec<Tag>>,
    /// Loaded dialect imports, keyed by import path.
    pub imports: BTreeMap<String, Rc<Package>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Package {
    pub fn new(import_path: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            import_path: import_path.into(),
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Tags attached to the node spanning `span`, in source order.
    pub fn tags_for(&self, span: Span) -> &[Tag] {
        self.tags.get(&span).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, position: Option<Position>, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(kind, position, message));
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Count the diagnostics of `packages` and of everything they import, visiting each path once.
pub fn count_diagnostics(packages: &[Rc<Package>]) -> usize {
    let mut seen = HashSet::new();
    let mut count = 0;
    let mut queue: Vec<&Rc<Package>> = packages.iter().collect();
    while let Some(pkg) = queue.pop() {
        if !seen.insert(pkg.import_path.as_str()) {
            continue;
        }
        count += pkg.diagnostics.len();
        queue.extend(pkg.imports.values());
    }
    count
}

/// Every package reachable from `packages` (including them), each path once, roots first.
pub fn walk_packages(packages: &[Rc<Package>]) -> Vec<Rc<Package>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut queue: std::collections::VecDeque<Rc<Package>> = packages.iter().cloned().collect();
    while let Some(pkg) = queue.pop_front() {
        if !seen.insert(pkg.import_path.clone()) {
            continue;
        }
        queue.extend(pkg.imports.values().cloned());
        out.push(pkg);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(path: &str, diagnostics: usize) -> Package {
        let mut pkg = Package::new(path, path);
        for i in 0..diagnostics {
            pkg.push(DiagnosticKind::Validation, None, format!("problem {i}"));
        }
        pkg
    }

    #[test]
    fn count_visits_shared_imports_once() {
        let shared = Rc::new(pkg("shared", 2));
        let mut a = pkg("a", 1);
        a.imports.insert("shared".into(), Rc::clone(&shared));
        let mut b = pkg("b", 0);
        b.imports.insert("shared".into(), Rc::clone(&shared));

        let roots = vec![Rc::new(a), Rc::new(b)];
        assert_eq!(count_diagnostics(&roots), 3);
        let paths: Vec<String> = walk_packages(&roots).iter().map(|p| p.import_path.clone()).collect();
        assert_eq!(paths, vec!["a", "b", "shared"]);
    }

    #[test]
    fn diagnostic_serializes_position_as_string() {
        let diag = Diagnostic::new(
            DiagnosticKind::Parse,
            Some(Position {
                filename: "p/a.gunk".into(),
                line: 3,
                column: 7,
            }),
            "boom",
        );
        let json = serde_json::to_string(&diag).unwrap();
        assert_eq!(json, r#"{"kind":"Parse","position":"p/a.gunk:3:7","message":"boom"}"#);
        assert_eq!(diag.to_string(), "p/a.gunk:3:7: boom");

        let bare = Diagnostic::new(DiagnosticKind::Unknown, None, "x");
        assert!(serde_json::to_string(&bare).unwrap().contains(r#""position":"""#));
    }
}
