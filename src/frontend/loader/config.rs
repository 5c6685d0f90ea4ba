//! Loader configuration and the `gunk.mod` manifest.

use std::path::{Path, PathBuf};

use super::LoadError;

/// An import path prefix served from a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRoot {
    /// Import path prefix; empty matches every path.
    pub prefix: String,
    pub dir: PathBuf,
}

impl ModuleRoot {
    pub fn new(prefix: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            dir: dir.into(),
        }
    }
}

/// Loader configuration
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Directory patterns and file lists are resolved against; also where `gunk.mod` is read.
    pub dir: PathBuf,
    /// Type-check packages and their dependencies, and evaluate tags.
    pub types: bool,
    /// Module roots in addition to those of `gunk.mod`.
    pub module_roots: Vec<ModuleRoot>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            types: true,
            module_roots: Vec::new(),
        }
    }
}

impl LoaderConfig {
    /// Create a config loading from `dir`, with types enabled
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Enable or disable type checking
    pub fn with_types(mut self, types: bool) -> Self {
        self.types = types;
        self
    }

    /// Serve import paths under `prefix` from `dir`
    pub fn with_module_root(mut self, prefix: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.module_roots.push(ModuleRoot::new(prefix, dir));
        self
    }
}

/// Parse a `gunk.mod` manifest.
///
/// ```text
/// // comments and blank lines are ignored
/// module example.com/project
/// replace github.com/gunk/opt => ../opt
/// ```
///
/// `module` maps its prefix onto `base`; `replace` maps a prefix onto a directory relative to
/// `base`.
///
/// ## Errors
/// - [`LoadError::Manifest`] for a malformed line or a second `module` line.
pub fn parse_manifest(text: &str, path: &Path, base: &Path) -> Result<Vec<ModuleRoot>, LoadError> {
    let mut roots = Vec::new();
    let mut seen_module = false;
    let error = |line: usize, message: String| LoadError::Manifest {
        path: path.to_path_buf(),
        line,
        message,
    };

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.split("//").next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let (directive, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match directive {
            "module" => {
                if seen_module {
                    return Err(error(idx + 1, "repeated module directive".to_string()));
                }
                if rest.is_empty() || rest.contains(char::is_whitespace) {
                    return Err(error(idx + 1, "usage: module <path>".to_string()));
                }
                seen_module = true;
                roots.push(ModuleRoot::new(rest, base));
            }
            "replace" => {
                let Some((prefix, dir)) = rest.split_once("=>") else {
                    return Err(error(idx + 1, "usage: replace <path> => <dir>".to_string()));
                };
                let (prefix, dir) = (prefix.trim(), dir.trim());
                if prefix.is_empty() || dir.is_empty() {
                    return Err(error(idx + 1, "usage: replace <path> => <dir>".to_string()));
                }
                roots.push(ModuleRoot::new(prefix, base.join(dir)));
            }
            other => return Err(error(idx + 1, format!("unknown directive: {other}"))),
        }
    }
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoaderConfig::default();
        assert_eq!(config.dir, PathBuf::from("."));
        assert!(config.types);
        assert!(config.module_roots.is_empty());
    }

    #[test]
    fn test_builder_chain() {
        let config = LoaderConfig::new("/src")
            .with_types(false)
            .with_module_root("example.com/x", "/vendor/x");
        assert_eq!(config.dir, PathBuf::from("/src"));
        assert!(!config.types);
        assert_eq!(config.module_roots, vec![ModuleRoot::new("example.com/x", "/vendor/x")]);
    }

    #[test]
    fn test_parse_manifest() {
        let text = "// project\nmodule example.com/project\n\nreplace github.com/gunk/opt => ../opt // local\n";
        let roots = parse_manifest(text, Path::new("/p/gunk.mod"), Path::new("/p")).unwrap();
        assert_eq!(
            roots,
            vec![
                ModuleRoot::new("example.com/project", "/p"),
                ModuleRoot::new("github.com/gunk/opt", "/p/../opt"),
            ]
        );
    }

    #[test]
    fn test_parse_manifest_errors() {
        let err = parse_manifest("module a\nmodule b\n", Path::new("gunk.mod"), Path::new(".")).unwrap_err();
        assert_eq!(err.to_string(), "gunk.mod:2: repeated module directive");

        let err = parse_manifest("require x\n", Path::new("gunk.mod"), Path::new(".")).unwrap_err();
        assert_eq!(err.to_string(), "gunk.mod:1: unknown directive: require");
    }
}
