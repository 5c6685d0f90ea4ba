//! Type checker for Gunk packages.
//!
//! Resolves the imports, types and constants of a parsed package into a [`PackageTypes`], and
//! evaluates standalone expressions (tag payloads) against a checked package through [`TypeEnv`].
//!
//! ## Notes
//!
//! - **Lazy resolution**: package-level declarations are collected first and resolved on demand, in source order. A
//!   declaration that is reached again while it is being resolved is either an indirect self reference (through a
//!   pointer, slice, map or method signature) or an invalid cycle.
//! - **Imports**: every import path is resolved through an [`Importer`] before any declaration is checked. The loader
//!   is the importer in practice; [`host::HostImporter`] serves the built-in host packages on its own.
//! - **Error accumulation**: errors are collected so a single run reports as many issues as possible. Invalid
//!   expressions yield [`Type::Invalid`], which suppresses follow-up errors.
//!
//! ## What is validated
//!
//! - Import paths resolve, and imported names are exported
//! - No name is declared twice in the package, and no field or method twice in one struct or interface
//! - Named types are not recursive without an indirection
//! - Map keys are comparable
//! - Constants are constant, acyclic and representable in their types
//! - Composite literals, conversions and operators are well-typed
//!
//! ## Examples
//!
//! ```rust
//! use gunk::frontend::parser;
//! use gunk::frontend::typechecker::{self, host::HostImporter};
//!
//! let source = "package p\n\nimport \"time\"\n\nconst Timeout = 3 * time.Second\n";
//! let file = parser::parse_file(source, 1).unwrap();
//! let types = typechecker::check("example.com/p", "p", &[file], &mut HostImporter).unwrap();
//! assert!(types.lookup("Timeout").is_some());
//! ```

mod check_expr;
mod collect;
mod const_eval;
pub mod host;
mod types;


pub use const_eval::ConstValue;
pub use types::{
    FieldDef, FileScope, InterfaceDef, MethodSig, Object, PackageTypes, StructDef, Type, TypeAndValue, TypeName,
    Untyped,
};

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::frontend::ast::{ConstSpec, Expr, File, Span, Spanned, TypeSpec};
use crate::frontend::diagnostics::CompileError;
use crate::frontend::loader::LoadError;

/// Resolves import paths to checked packages.
pub trait Importer {
    fn import(&mut self, path: &str) -> Result<Rc<PackageTypes>, ImportError>;
}

/// Why an import could not be resolved.
#[derive(Debug)]
pub enum ImportError {
    /// The whole load must stop (an import cycle).
    Fatal(Box<LoadError>),
    /// The import failed; reported as a type error at the import spec.
    Failed(String),
}

/// Outcome of a failed [`check`].
#[derive(Debug)]
pub enum CheckFailure {
    Fatal(Box<LoadError>),
    Errors(Vec<CompileError>),
}

/// Resolution progress of a package-level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EvalState {
    NotStarted,
    InProgress,
    Done,
}

/// A package-level declaration waiting to be resolved.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PendingDecl<'a> {
    Type {
        file: usize,
        spec: &'a TypeSpec,
    },
    Const {
        file: usize,
        name_span: Span,
        /// Type and values in effect for this spec (repeated from an earlier spec when omitted).
        ty: Option<&'a Spanned<Expr>>,
        init: Option<&'a Spanned<Expr>>,
        iota: usize,
    },
}

/// Checker state for one package, or for evaluating expressions against a checked package.
pub(crate) struct Checker<'a> {
    pub(crate) pkg: Cow<'a, PackageTypes>,
    importer: Option<&'a mut dyn Importer>,
    /// Package-level declarations by name.
    pub(crate) decls: HashMap<String, PendingDecl<'a>>,
    pub(crate) states: HashMap<String, EvalState>,
    /// Declarations being resolved, innermost last, with the indirection depth at which they started.
    pub(crate) stack: Vec<(String, usize)>,
    /// Pointer/slice/map/signature nesting of the type expression being resolved.
    pub(crate) indirect: usize,
    /// File whose imports are in scope.
    pub(crate) file: usize,
    /// Value of `iota` while a constant spec is evaluated.
    pub(crate) iota: Option<i128>,
    /// Map key types, checked for comparability once all declarations are resolved.
    pub(crate) deferred_keys: Vec<(Type, Span)>,
    /// Recursive types already reported.
    pub(crate) reported_cycles: HashSet<String>,
    pub(crate) errors: Vec<CompileError>,
}

impl<'a> Checker<'a> {
    fn new(pkg: Cow<'a, PackageTypes>, importer: Option<&'a mut dyn Importer>) -> Self {
        Self {
            pkg,
            importer,
            decls: HashMap::new(),
            states: HashMap::new(),
            stack: Vec::new(),
            indirect: 0,
            file: 0,
            iota: None,
            deferred_keys: Vec::new(),
            reported_cycles: HashSet::new(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, message: String, span: Span) {
        self.errors.push(CompileError::type_error(message, span));
    }

    /// Follow named types to their structural type, resolving local declarations on demand.
    pub(crate) fn underlying(&mut self, ty: &Type) -> Type {
        let mut current = ty.clone();
        for _ in 0..64 {
            let Type::Named(name) = &current else {
                return current;
            };
            if name.package == self.pkg.path && self.decls.contains_key(&name.name) {
                let name = name.name.clone();
                self.resolve_decl(&name);
            }
            match self.pkg.type_object(name) {
                Some(Object::TypeName { ty, .. }) => current = ty.clone(),
                _ => return Type::Invalid,
            }
        }
        Type::Invalid
    }

    /// Resolve every declaration, then run the checks that need all of them.
    fn check_files(&mut self, files: &'a [File]) -> Result<(), Box<LoadError>> {
        for (idx, file) in files.iter().enumerate() {
            self.file = idx;
            self.collect_imports(file)?;
        }
        for (idx, file) in files.iter().enumerate() {
            self.collect_decls(idx, file);
        }

        for file in files {
            for decl in &file.decls {
                for spec in &decl.specs {
                    for name in collect::spec_names(spec) {
                        if self.decls.contains_key(name) {
                            self.resolve_decl(name);
                        }
                    }
                }
            }
        }

        for (key, span) in std::mem::take(&mut self.deferred_keys) {
            if !key.is_invalid() && !self.comparable(&key) {
                self.error(format!("invalid map key type {key}"), span);
            }
        }
        Ok(())
    }
}

/// Type-check the files of one package.
///
/// ## Parameters
/// - `path`: Import path of the package.
/// - `name`: Declared package name.
/// - `files`: Parsed files; their order fixes the file indices used by [`TypeEnv::eval`].
/// - `importer`: Resolves every imported path.
///
/// ## Errors
/// - [`CheckFailure::Fatal`] if the importer reported a fatal loader error.
/// - [`CheckFailure::Errors`] with every type error found.
#[tracing::instrument(skip_all, fields(path = path, files = files.len()))]
pub fn check(
    path: &str,
    name: &str,
    files: &[File],
    importer: &mut dyn Importer,
) -> Result<PackageTypes, CheckFailure> {
    let mut checker = Checker::new(Cow::Owned(PackageTypes::new(path, name)), Some(importer));
    checker.check_files(files).map_err(CheckFailure::Fatal)?;
    if !checker.errors.is_empty() {
        return Err(CheckFailure::Errors(checker.errors));
    }
    Ok(checker.pkg.into_owned())
}

/// A checked package, used to evaluate standalone expressions in its scope.
#[derive(Debug, Clone)]
pub struct TypeEnv {
    pkg: Rc<PackageTypes>,
}

impl TypeEnv {
    pub fn new(pkg: Rc<PackageTypes>) -> Self {
        Self { pkg }
    }

    pub fn package(&self) -> &Rc<PackageTypes> {
        &self.pkg
    }

    /// Type-check `expr` in the package scope plus the imports of file `file`.
    ///
    /// ## Errors
    /// - The first [`CompileError`] found; spans are those of `expr`.
    pub fn eval(&self, file: usize, expr: &Spanned<Expr>) -> Result<TypeAndValue, CompileError> {
        let mut checker = Checker::new(Cow::Borrowed(self.pkg.as_ref()), None);
        checker.file = file;
        let tv = checker.check_expr(expr, None);
        match checker.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(tv),
        }
    }
}
