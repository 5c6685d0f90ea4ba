//! Package graph loader
//!
//! Resolves patterns to Gunk packages, parses their files, type-checks them (loading every
//! imported package through the same loader), splits their `+gunk` tags and validates their
//! structs.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gunk::frontend::loader::{Loader, LoaderConfig};
//!
//! let mut loader = Loader::new(LoaderConfig::new("./protos"))?;
//! for pkg in loader.load(&["./..."])? {
//!     for diag in &pkg.diagnostics {
//!         eprintln!("{diag}");
//!     }
//! }
//! # Ok::<(), gunk::frontend::loader::LoadError>(())
//! ```
//!
//! ## Notes
//!
//! - **Memoization**: packages are cached by import path for the lifetime of the loader; loading a cached path returns
//!   the same `Rc<Package>`.
//! - **Import cycles**: the loader keeps a stack of the packages being loaded. Reaching a path already on the stack
//!   aborts the whole load with [`LoadError::ImportCycle`].
//! - **Problems within a package** (unreadable files, syntax, type and validation errors) are recorded as
//!   [`Diagnostic`]s on the package, never returned as errors.

mod config;
mod discover;

pub use config::{LoaderConfig, ModuleRoot, parse_manifest};
pub use discover::{ModuleRoots, find_package_dirs, gunk_files, normalize};

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use gunk_core::lang::conventions::{
    COMMAND_LINE_PACKAGE, MANIFEST_FILE, SCHEMA_PACKAGE_DIRECTIVE, WILDCARD_SUFFIX, is_source_file,
};
use gunk_core::strings::unquote;

use crate::frontend::ast::File;
use crate::frontend::package::{Diagnostic, DiagnosticKind, Package, count_diagnostics};
use crate::frontend::parser;
use crate::frontend::position::FileSet;
use crate::frontend::tags::{self, FileTags};
use crate::frontend::typechecker::{self, CheckFailure, ImportError, Importer, PackageTypes, TypeEnv, host};
use crate::frontend::validate;

/// A failure that stops a whole load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum LoadError {
    /// A package imports itself, directly or through other packages.
    #[error("import cycle not allowed:\n\t{}", .stack.join("\n\t\timports "))]
    #[diagnostic(code(gunk::load::import_cycle), help("remove one of the imports on the cycle"))]
    ImportCycle {
        /// Packages on the cycle, starting at the outermost load and ending with the repeated path.
        stack: Vec<String>,
    },

    /// Directory enumeration failed.
    #[error("{message}")]
    #[diagnostic(code(gunk::load::list))]
    List { message: String },

    #[error("invalid pattern {pattern:?}: {reason}")]
    #[diagnostic(code(gunk::load::invalid_pattern))]
    InvalidPattern { pattern: String, reason: String },

    #[error("{}:{line}: {message}", .path.display())]
    #[diagnostic(code(gunk::load::manifest))]
    Manifest { path: PathBuf, line: usize, message: String },
}

impl LoadError {
    fn list(path: &Path, err: impl std::fmt::Display) -> Self {
        LoadError::List {
            message: format!("{}: {err}", path.display()),
        }
    }
}

/// Loads and caches Gunk packages.
#[derive(Debug)]
pub struct Loader {
    config: LoaderConfig,
    /// Absolute, normalized form of `config.dir`.
    dir: PathBuf,
    roots: ModuleRoots,
    fset: FileSet,
    cache: HashMap<String, Rc<Package>>,
    /// Import paths being loaded, outermost first.
    stack: Vec<String>,
}

impl Loader {
    /// Create a loader, reading `gunk.mod` from the configured directory if present.
    ///
    /// ## Errors
    /// - [`LoadError::Manifest`] if the manifest is malformed.
    /// - [`LoadError::List`] if the directory or the manifest cannot be read.
    #[tracing::instrument(skip_all, fields(dir = %config.dir.display()))]
    pub fn new(config: LoaderConfig) -> Result<Self, LoadError> {
        let dir = std::path::absolute(&config.dir)
            .map(|dir| normalize(&dir))
            .map_err(|err| LoadError::list(&config.dir, err))?;

        let manifest = dir.join(MANIFEST_FILE);
        let mut roots = match fs::read_to_string(&manifest) {
            Ok(text) => parse_manifest(&text, &manifest, &dir)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(LoadError::list(&manifest, err)),
        };
        roots.extend(config.module_roots.iter().map(|root| ModuleRoot {
            prefix: root.prefix.clone(),
            dir: dir.join(&root.dir),
        }));
        if !roots.iter().any(|root| normalize(&root.dir) == dir) {
            roots.push(ModuleRoot::new("", dir.clone()));
        }
        let roots = ModuleRoots::new(roots);
        tracing::debug!(roots = ?roots.roots(), "module roots");

        Ok(Self {
            config,
            dir,
            roots,
            fset: FileSet::new(),
            cache: HashMap::new(),
            stack: Vec::new(),
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Source files of every package loaded so far, for resolving diagnostic spans.
    pub fn fset(&self) -> &FileSet {
        &self.fset
    }

    pub fn roots(&self) -> &ModuleRoots {
        &self.roots
    }

    /// A cached package, if `import_path` has been loaded.
    pub fn cached(&self, import_path: &str) -> Option<Rc<Package>> {
        self.cache.get(import_path).cloned()
    }

    /// Load the packages matched by `patterns`.
    ///
    /// Patterns are import paths, directory paths (`.`, `./api`, `../x`) or either followed by
    /// `/...`. If the first pattern names a `.gunk` file, every pattern is a file and they form
    /// one uncached package named `command-line-arguments`.
    ///
    /// ## Errors
    /// - [`LoadError::ImportCycle`] if a package imports itself.
    /// - [`LoadError::InvalidPattern`] or [`LoadError::List`] if a pattern cannot be resolved.
    #[tracing::instrument(skip_all, fields(patterns = ?patterns))]
    pub fn load(&mut self, patterns: &[&str]) -> Result<Vec<Rc<Package>>, LoadError> {
        if let [single] = patterns {
            if let Some(pkg) = self.cache.get(*single) {
                tracing::debug!(path = single, "package cache hit");
                return Ok(vec![Rc::clone(pkg)]);
            }
        }

        if patterns.first().is_some_and(|p| is_source_file(p)) {
            let files: Vec<PathBuf> = patterns.iter().map(|p| normalize(&self.dir.join(p))).collect();
            let dir = files
                .first()
                .and_then(|f| f.parent())
                .map_or_else(|| self.dir.clone(), Path::to_path_buf);
            let pkg = self.load_package(COMMAND_LINE_PACKAGE, &dir, Some(files))?;
            return Ok(vec![Rc::new(pkg)]);
        }

        let mut resolved: Vec<(String, PathBuf)> = Vec::new();
        for pattern in patterns {
            for (path, dir) in self.resolve(pattern)? {
                if !resolved.iter().any(|(seen, _)| *seen == path) {
                    resolved.push((path, dir));
                }
            }
        }
        resolved.into_iter().map(|(path, dir)| self.get_or_load(path, &dir)).collect()
    }

    // ========================================================================
    // Pattern resolution
    // ========================================================================

    fn resolve(&self, pattern: &str) -> Result<Vec<(String, PathBuf)>, LoadError> {
        let invalid = |reason: String| LoadError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };
        if pattern.is_empty() {
            return Err(invalid("empty pattern".to_string()));
        }
        let (base, wildcard) = match pattern.strip_suffix(WILDCARD_SUFFIX) {
            Some(base) => (base, true),
            None if pattern == "..." => (".", true),
            None => (pattern, false),
        };

        if is_directory_pattern(base) {
            let dir = normalize(&self.dir.join(base));
            let dirs = if wildcard { self.walk(&dir)? } else { vec![dir] };
            return dirs
                .into_iter()
                .map(|dir| match self.roots.import_path_for(&dir) {
                    Some(path) => Ok((path, dir)),
                    None => Err(invalid(format!("directory {} is outside every module root", dir.display()))),
                })
                .collect();
        }

        if !wildcard {
            // An unresolvable import path still yields a package, carrying the list error.
            let dir = self.roots.dir_for(base).unwrap_or_default();
            return Ok(vec![(base.to_string(), dir)]);
        }
        let Some(root) = self.roots.dir_for(base) else {
            return Err(invalid(format!("no module root provides {base}")));
        };
        Ok(self
            .walk(&root)?
            .into_iter()
            .map(|dir| {
                let rel: Vec<String> = dir
                    .strip_prefix(&root)
                    .map(|rest| rest.iter().map(|c| c.to_string_lossy().into_owned()).collect())
                    .unwrap_or_default();
                let path = if rel.is_empty() {
                    base.to_string()
                } else {
                    format!("{base}/{}", rel.join("/"))
                };
                (path, dir)
            })
            .collect())
    }

    fn walk(&self, dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "pattern matched no packages");
            return Ok(Vec::new());
        }
        find_package_dirs(dir).map_err(|err| LoadError::list(dir, err))
    }

    // ========================================================================
    // Package loading
    // ========================================================================

    fn get_or_load(&mut self, path: String, dir: &Path) -> Result<Rc<Package>, LoadError> {
        if let Some(pkg) = self.cache.get(&path) {
            tracing::debug!(path = %path, "package cache hit");
            return Ok(Rc::clone(pkg));
        }
        let pkg = Rc::new(self.load_package(&path, dir, None)?);
        Ok(Rc::clone(self.cache.entry(path).or_insert(pkg)))
    }

    /// Load one package while it sits on the resolution stack.
    #[tracing::instrument(skip_all, fields(path = import_path))]
    fn load_package(
        &mut self,
        import_path: &str,
        dir: &Path,
        files: Option<Vec<PathBuf>>,
    ) -> Result<Package, LoadError> {
        if self.stack.iter().any(|p| p == import_path) {
            let mut stack = self.stack.clone();
            stack.push(import_path.to_string());
            return Err(LoadError::ImportCycle { stack });
        }

        let depth = self.stack.len();
        self.stack.push(import_path.to_string());
        let result = self.build_package(import_path, dir, files);
        self.stack.truncate(depth);

        if let Ok(pkg) = &result {
            tracing::debug!(files = pkg.files.len(), diagnostics = pkg.diagnostics.len(), "loaded package");
        }
        result
    }

    fn build_package(
        &mut self,
        import_path: &str,
        dir: &Path,
        files: Option<Vec<PathBuf>>,
    ) -> Result<Package, LoadError> {
        let mut pkg = Package::new(import_path, dir);
        pkg.files = match files {
            Some(files) => files,
            None => match list_files(&mut pkg) {
                Some(files) => files,
                None => return Ok(pkg),
            },
        };

        self.parse_files(&mut pkg);
        self.check_package(&mut pkg)?;

        for file in &pkg.syntax {
            for err in validate::validate_file(file) {
                let position = self.fset.position(err.span.start);
                pkg.diagnostics.push(Diagnostic::new(DiagnosticKind::Validation, position, err.message));
            }
        }
        Ok(pkg)
    }

    fn parse_files(&mut self, pkg: &mut Package) {
        let types = self.config.types;
        for path in pkg.files.clone() {
            let base_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            let display = format!("{}/{base_name}", pkg.import_path);
            let source = match fs::read_to_string(&path) {
                Ok(source) => source,
                Err(err) => {
                    pkg.push(DiagnosticKind::Parse, None, format!("{}: {err}", path.display()));
                    continue;
                }
            };
            let base = self.fset.add_file(display.clone(), source.clone());
            let file = match parser::parse_file(&source, base) {
                Ok(file) => file,
                Err(errors) => {
                    for err in errors {
                        pkg.push(DiagnosticKind::Parse, self.fset.position(err.span.start), err.message);
                    }
                    continue;
                }
            };

            let name = file.name.node.clone();
            let schema_name = schema_package_name(&self.fset, &file);
            pkg.names.push(display);
            pkg.syntax.push(file);

            if pkg.name.is_empty() {
                pkg.name = name;
            } else if pkg.name != name && types {
                let message = format!("gunk package name mismatch: {:?} {name:?}", pkg.name);
                pkg.push(DiagnosticKind::Validation, None, message);
            }

            match schema_name {
                Ok(None) => {}
                Ok(Some(schema_name)) if pkg.proto_name.is_empty() => pkg.proto_name = schema_name,
                Ok(Some(schema_name)) => {
                    if schema_name != pkg.proto_name && types {
                        let message = format!("proto package name mismatch: {:?} {schema_name:?}", pkg.proto_name);
                        pkg.push(DiagnosticKind::Validation, None, message);
                    }
                }
                Err(diag) => pkg.diagnostics.push(diag),
            }
        }
        if pkg.proto_name.is_empty() {
            pkg.proto_name = pkg.name.clone();
        }
    }

    /// Type-check the package, split its tags and load its imports. Skipped if the files had
    /// problems.
    fn check_package(&mut self, pkg: &mut Package) -> Result<(), LoadError> {
        if pkg.has_errors() {
            return Ok(());
        }

        let env = if self.config.types {
            match typechecker::check(&pkg.import_path, &pkg.name, &pkg.syntax, self) {
                Ok(types) => {
                    let types = Rc::new(types);
                    pkg.types = Some(Rc::clone(&types));
                    Some(TypeEnv::new(types))
                }
                Err(CheckFailure::Fatal(err)) => return Err(*err),
                Err(CheckFailure::Errors(errors)) => {
                    for err in errors {
                        pkg.push(DiagnosticKind::Type, self.fset.position(err.span.start), err.message);
                    }
                    return Ok(());
                }
            }
        } else {
            None
        };

        for (idx, file) in pkg.syntax.iter_mut().enumerate() {
            let FileTags { tags, errors } = tags::split_file(file, idx, env.as_ref());
            pkg.tags.extend(tags);
            for err in errors {
                let position = self.fset.position(err.error.span.start);
                pkg.diagnostics.push(Diagnostic::new(err.kind, position, err.error.message));
            }
        }

        if self.config.types {
            let imports: Vec<String> = pkg
                .syntax
                .iter()
                .flat_map(File::imports)
                .filter_map(|spec| unquote(&spec.path.node).ok())
                .collect();
            for path in imports {
                if host::HOST_PACKAGES.contains(&path.as_str()) || pkg.imports.contains_key(&path) {
                    continue;
                }
                if let [dep] = self.load(&[path.as_str()])?.as_slice() {
                    pkg.imports.insert(path, Rc::clone(dep));
                }
            }
        }
        Ok(())
    }
}

impl Importer for Loader {
    fn import(&mut self, path: &str) -> Result<Rc<PackageTypes>, ImportError> {
        if let Some(types) = host::lookup(path) {
            return Ok(types);
        }
        let pkgs = match self.load(&[path]) {
            Ok(pkgs) => pkgs,
            Err(err @ LoadError::ImportCycle { .. }) => return Err(ImportError::Fatal(Box::new(err))),
            Err(err) => return Err(ImportError::Failed(err.to_string())),
        };
        let [pkg] = pkgs.as_slice() else {
            return Err(ImportError::Failed(format!("could not import {path}")));
        };
        if count_diagnostics(std::slice::from_ref(pkg)) > 0 {
            for diag in &pkg.diagnostics {
                tracing::warn!(package = path, "{diag}");
            }
            return Err(ImportError::Failed(format!("error importing package {path:?}")));
        }
        pkg.types
            .clone()
            .ok_or_else(|| ImportError::Failed(format!("could not import {path} (no type information)")))
    }
}

fn is_directory_pattern(pattern: &str) -> bool {
    pattern == "."
        || pattern == ".."
        || pattern.starts_with("./")
        || pattern.starts_with("../")
        || Path::new(pattern).is_absolute()
}

/// Gunk files of the package directory, or `None` after recording why there are none.
fn list_files(pkg: &mut Package) -> Option<Vec<PathBuf>> {
    if pkg.dir.as_os_str().is_empty() {
        let message = format!("cannot find package {:?}", pkg.import_path);
        pkg.push(DiagnosticKind::ListResolution, None, message);
        return None;
    }
    if !pkg.dir.is_dir() {
        let message = format!("cannot find package {:?} in {}", pkg.import_path, pkg.dir.display());
        pkg.push(DiagnosticKind::ListResolution, None, message);
        return None;
    }
    match gunk_files(&pkg.dir) {
        Ok(files) if files.is_empty() => {
            let message = format!("no Gunk files in {}", pkg.dir.display());
            pkg.push(DiagnosticKind::ListResolution, None, message);
            None
        }
        Ok(files) => Some(files),
        Err(err) => {
            let message = format!("{}: {err}", pkg.dir.display());
            pkg.push(DiagnosticKind::ListResolution, None, message);
            None
        }
    }
}

/// The `// proto "name"` directive on the package line, if any.
fn schema_package_name(fset: &FileSet, file: &File) -> Result<Option<String>, Diagnostic> {
    let line_of = |offset: usize| fset.position(offset).map(|p| p.line);
    let package_line = line_of(file.package.start);
    for comment in file.comments.iter().flat_map(|group| group.list.iter()) {
        let line = line_of(comment.span.start);
        if line < package_line {
            continue;
        }
        if line > package_line {
            break;
        }
        let Some(quoted) = comment.text.strip_prefix(SCHEMA_PACKAGE_DIRECTIVE) else {
            continue;
        };
        return unquote(quoted).map(Some).map_err(|err| {
            Diagnostic::new(
                DiagnosticKind::Parse,
                fset.position(comment.span.start),
                format!("invalid proto package directive {quoted}: {err}"),
            )
        });
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, source: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, source).unwrap();
    }

    fn loader(root: &Path) -> Loader {
        Loader::new(LoaderConfig::new(root)).unwrap()
    }

    #[test]
    fn cycle_error_message() {
        let err = LoadError::ImportCycle {
            stack: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "import cycle not allowed:\n\ta\n\t\timports b\n\t\timports a");
    }

    #[test]
    fn schema_name_defaults_to_package_name() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "a/a.gunk", "package a\n");
        write(tmp.path(), "b/b.gunk", "package b // proto \"b.v1\"\n");
        let pkgs = loader(tmp.path()).load(&["a", "b"]).unwrap();
        assert_eq!(pkgs[0].proto_name, "a");
        assert_eq!(pkgs[1].name, "b");
        assert_eq!(pkgs[1].proto_name, "b.v1");
    }

    #[test]
    fn missing_package_is_a_list_diagnostic() {
        let tmp = tempfile::tempdir().unwrap();
        let pkgs = loader(tmp.path()).load(&["nowhere"]).unwrap();
        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].diagnostics[0].kind, DiagnosticKind::ListResolution);
        assert!(pkgs[0].diagnostics[0].message.starts_with("cannot find package \"nowhere\""));
    }

    #[test]
    fn manifest_module_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), MANIFEST_FILE, "module example.com/proj\n");
        write(tmp.path(), "api/api.gunk", "package api\n");
        let mut loader = loader(tmp.path());
        let pkgs = loader.load(&["./..."]).unwrap();
        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].import_path, "example.com/proj/api");
        assert_eq!(pkgs[0].names, vec!["example.com/proj/api/api.gunk"]);
        assert!(Rc::ptr_eq(&pkgs[0], &loader.load(&["example.com/proj/api"]).unwrap()[0]));
    }

    #[test]
    fn empty_pattern_is_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        let err = loader(tmp.path()).load(&[""]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidPattern { .. }));
    }
}
