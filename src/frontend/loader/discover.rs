//! Mapping import paths to directories, and finding the Gunk files and packages in them.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use gunk_core::lang::conventions::{TESTDATA_DIR, is_ignored_name, is_source_file};
use walkdir::WalkDir;

use super::config::ModuleRoot;

/// Module roots, longest prefix first.
#[derive(Debug, Clone, Default)]
pub struct ModuleRoots {
    roots: Vec<ModuleRoot>,
}

impl ModuleRoots {
    pub fn new(mut roots: Vec<ModuleRoot>) -> Self {
        for root in &mut roots {
            root.dir = normalize(&root.dir);
        }
        roots.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self { roots }
    }

    pub fn roots(&self) -> &[ModuleRoot] {
        &self.roots
    }

    /// Directory holding the package `import_path`, by longest matching prefix.
    pub fn dir_for(&self, import_path: &str) -> Option<PathBuf> {
        self.roots.iter().find_map(|root| {
            let rest = if root.prefix.is_empty() {
                import_path
            } else if import_path == root.prefix {
                ""
            } else {
                import_path.strip_prefix(&root.prefix)?.strip_prefix('/')?
            };
            Some(normalize(&root.dir.join(rest)))
        })
    }

    /// Import path of the package in `dir`, through the root whose directory contains it most
    /// closely.
    pub fn import_path_for(&self, dir: &Path) -> Option<String> {
        let dir = normalize(dir);
        let (root, rest) = self
            .roots
            .iter()
            .filter_map(|root| dir.strip_prefix(&root.dir).ok().map(|rest| (root, rest)))
            .min_by_key(|(_, rest)| rest.components().count())?;

        let rest: Vec<String> = rest
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let rest = rest.join("/");
        Some(match (root.prefix.is_empty(), rest.is_empty()) {
            (true, true) => ".".to_string(),
            (true, false) => rest,
            (false, true) => root.prefix.clone(),
            (false, false) => format!("{}/{rest}", root.prefix),
        })
    }
}

/// Lexically clean a path: drop `.` components and fold `..` into their parent.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Gunk source files directly inside `dir`, sorted.
pub fn gunk_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if is_source_file(&name) && !is_ignored_name(&name) && entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Every directory at or below `root` holding at least one Gunk file, sorted.
///
/// Directories named `testdata` or starting with `.` or `_` are skipped with their contents.
pub fn find_package_dirs(root: &Path) -> io::Result<Vec<PathBuf>> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            e.depth() == 0 || !e.file_type().is_dir() || (name != TESTDATA_DIR && !is_ignored_name(&name))
        });

    let mut dirs = Vec::new();
    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_dir() && !gunk_files(entry.path())?.is_empty() {
            dirs.push(entry.path().to_path_buf());
        }
    }
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(normalize(Path::new("a/./b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize(Path::new("./")), PathBuf::from("."));
        assert_eq!(normalize(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn longest_prefix_wins() {
        let roots = ModuleRoots::new(vec![
            ModuleRoot::new("example.com/p", "/src/p"),
            ModuleRoot::new("example.com/p/vendored", "/vendor/v"),
        ]);
        assert_eq!(roots.dir_for("example.com/p/api"), Some(PathBuf::from("/src/p/api")));
        assert_eq!(roots.dir_for("example.com/p/vendored/x"), Some(PathBuf::from("/vendor/v/x")));
        assert_eq!(roots.dir_for("example.com/p"), Some(PathBuf::from("/src/p")));
        assert_eq!(roots.dir_for("example.com/pp"), None);
        assert_eq!(roots.dir_for("other.org/x"), None);
    }

    #[test]
    fn import_path_for_dir() {
        let roots = ModuleRoots::new(vec![ModuleRoot::new("example.com/p", "/src/p")]);
        assert_eq!(roots.import_path_for(Path::new("/src/p/./api/v1")).as_deref(), Some("example.com/p/api/v1"));
        assert_eq!(roots.import_path_for(Path::new("/src/p")).as_deref(), Some("example.com/p"));
        assert_eq!(roots.import_path_for(Path::new("/elsewhere")), None);

        let bare = ModuleRoots::new(vec![ModuleRoot::new("", "/src")]);
        assert_eq!(bare.import_path_for(Path::new("/src/a/b")).as_deref(), Some("a/b"));
        assert_eq!(bare.dir_for("a/b"), Some(PathBuf::from("/src/a/b")));
    }

    #[test]
    fn discovery_skips_hidden_and_testdata() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        for dir in ["a", "a/b", "testdata/t", ".hidden", "_skip", "empty"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        for file in ["a/x.gunk", "a/b/y.gunk", "testdata/t/z.gunk", ".hidden/h.gunk", "_skip/s.gunk", "empty/readme.md"] {
            fs::write(root.join(file), "package x\n").unwrap();
        }
        fs::write(root.join("a/_ignored.gunk"), "package x\n").unwrap();

        let dirs = find_package_dirs(root).unwrap();
        assert_eq!(dirs, vec![root.join("a"), root.join("a/b")]);
        assert_eq!(gunk_files(&root.join("a")).unwrap(), vec![root.join("a/x.gunk")]);
    }
}
