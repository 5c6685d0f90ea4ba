//! External descriptor loading
//!
//! Loads descriptor-language files as if they were dependencies. Bundled well-known files are
//! served in process; every other name is imported by a generated `gunk-proto` file and
//! resolved by running `protoc`, whose descriptor set output is decoded with `prost`.

pub mod bundled;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use gunk_core::lang::conventions::GENERATED_IMPORTS_FILE;
use prost::Message;
use prost_types::{FileDescriptorProto, FileDescriptorSet};

/// A failed descriptor load.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DescriptorError {
    #[error("writing {}: {source}", .path.display())]
    #[diagnostic(code(gunk::descriptors::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("running {protoc}: {source}")]
    #[diagnostic(code(gunk::descriptors::spawn), help("install protoc or pass its path with --protoc"))]
    Spawn {
        protoc: String,
        #[source]
        source: io::Error,
    },

    /// protoc ran and failed; carries its standard error.
    #[error("protoc {status}: {stderr}")]
    #[diagnostic(code(gunk::descriptors::protoc))]
    Protoc { status: ExitStatus, stderr: String },

    #[error("decoding protoc output: {0}")]
    #[diagnostic(code(gunk::descriptors::decode))]
    Decode(#[from] prost::DecodeError),
}

/// Loads descriptor files, through protoc when they are not bundled.
#[derive(Debug, Clone)]
pub struct ProtoLoader {
    /// Include directory; also where the generated imports file is written.
    pub dir: Option<PathBuf>,
    pub protoc: PathBuf,
}

impl Default for ProtoLoader {
    fn default() -> Self {
        Self {
            dir: None,
            protoc: PathBuf::from("protoc"),
        }
    }
}

impl ProtoLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn with_protoc(mut self, protoc: impl Into<PathBuf>) -> Self {
        self.protoc = protoc.into();
        self
    }

    /// Load `names` and everything they import.
    ///
    /// Files resolved by protoc come first, in protoc's dependency order, followed by the bundled
    /// files in request order.
    ///
    /// ## Errors
    /// - [`DescriptorError::Io`] if the imports file cannot be written.
    /// - [`DescriptorError::Spawn`] or [`DescriptorError::Protoc`] if protoc cannot run or fails.
    /// - [`DescriptorError::Decode`] if protoc's output is not a descriptor set.
    #[tracing::instrument(skip_all, fields(names = names.len()))]
    pub fn load_proto(&self, names: &[&str]) -> Result<Vec<FileDescriptorProto>, DescriptorError> {
        let (local, external): (Vec<&str>, Vec<&str>) = names.iter().copied().partition(|n| bundled::is_bundled(n));

        let mut files = if external.is_empty() {
            Vec::new()
        } else {
            self.run_protoc(&external)?
        };
        files.extend(local.into_iter().filter_map(bundled::file));
        Ok(files)
    }

    fn run_protoc(&self, names: &[&str]) -> Result<Vec<FileDescriptorProto>, DescriptorError> {
        let path = match &self.dir {
            Some(dir) => dir.join(GENERATED_IMPORTS_FILE),
            None => PathBuf::from(GENERATED_IMPORTS_FILE),
        };
        let _generated = GeneratedFile::write(&path, &imports_file(names))?;

        let mut cmd = Command::new(&self.protoc);
        cmd.arg("-o/dev/stdout").arg("--include_imports").arg(&path);
        if let Some(dir) = &self.dir {
            cmd.arg(format!("-I{}", dir.display()));
        }
        tracing::debug!(?cmd, "running protoc");

        let output = cmd.output().map_err(|source| DescriptorError::Spawn {
            protoc: self.protoc.display().to_string(),
            source,
        })?;
        if !output.status.success() {
            return Err(DescriptorError::Protoc {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        let set = FileDescriptorSet::decode(output.stdout.as_slice())?;
        Ok(set
            .file
            .into_iter()
            .filter(|file| file.name() != GENERATED_IMPORTS_FILE)
            .collect())
    }
}

/// Source of the generated file importing every name.
pub fn imports_file(names: &[&str]) -> String {
    let mut source = String::from("\nsyntax = \"proto3\";\n");
    for name in names {
        source.push_str(&format!("import \"{name}\";\n"));
    }
    source
}

/// The generated imports file; removed when dropped.
struct GeneratedFile<'p> {
    path: &'p Path,
}

impl<'p> GeneratedFile<'p> {
    fn write(path: &'p Path, contents: &str) -> Result<Self, DescriptorError> {
        fs::write(path, contents).map_err(|source| DescriptorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { path })
    }
}

impl Drop for GeneratedFile<'_> {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(self.path) {
            tracing::warn!(path = %self.path.display(), error = %err, "could not remove generated imports file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imports_file_lists_every_name() {
        assert_eq!(
            imports_file(&["a.proto", "b/c.proto"]),
            "\nsyntax = \"proto3\";\nimport \"a.proto\";\nimport \"b/c.proto\";\n"
        );
    }

    #[test]
    fn bundled_names_skip_protoc() {
        let loader = ProtoLoader::new().with_protoc("/nonexistent/protoc");
        let files = loader.load_proto(&[bundled::TIMESTAMP, bundled::EMPTY]).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec![bundled::TIMESTAMP, bundled::EMPTY]);
    }

    #[test]
    fn missing_protoc_is_a_spawn_error() {
        let tmp = tempfile::tempdir().unwrap();
        let loader = ProtoLoader::new()
            .with_dir(tmp.path())
            .with_protoc(tmp.path().join("no-such-protoc"));
        let err = loader.load_proto(&["foo/bar.proto"]).unwrap_err();
        assert!(matches!(err, DescriptorError::Spawn { .. }), "{err}");
        assert!(!tmp.path().join(GENERATED_IMPORTS_FILE).exists());
    }

    #[cfg(unix)]
    fn fake_protoc(dir: &Path, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("fake-protoc");
        fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn protoc_failure_carries_stderr() {
        let tmp = tempfile::tempdir().unwrap();
        let protoc = fake_protoc(tmp.path(), "echo 'foo/bar.proto: File not found.' >&2\nexit 1");
        let loader = ProtoLoader::new().with_dir(tmp.path()).with_protoc(protoc);
        let err = loader.load_proto(&["foo/bar.proto"]).unwrap_err();
        let DescriptorError::Protoc { stderr, .. } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(stderr, "foo/bar.proto: File not found.");
        assert!(err.to_string().starts_with("protoc "));
        assert!(!tmp.path().join(GENERATED_IMPORTS_FILE).exists());
    }

    #[cfg(unix)]
    #[test]
    fn protoc_output_drops_generated_file_and_merges_bundled() {
        let tmp = tempfile::tempdir().unwrap();
        let set = FileDescriptorSet {
            file: vec![
                FileDescriptorProto {
                    name: Some("foo/bar.proto".into()),
                    ..FileDescriptorProto::default()
                },
                FileDescriptorProto {
                    name: Some(GENERATED_IMPORTS_FILE.into()),
                    dependency: vec!["foo/bar.proto".into()],
                    ..FileDescriptorProto::default()
                },
            ],
        };
        let encoded = tmp.path().join("set.bin");
        fs::write(&encoded, set.encode_to_vec()).unwrap();
        let protoc = fake_protoc(tmp.path(), &format!("cat '{}'", encoded.display()));

        let loader = ProtoLoader::new().with_dir(tmp.path()).with_protoc(protoc);
        let files = loader.load_proto(&["foo/bar.proto", bundled::DURATION]).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["foo/bar.proto", bundled::DURATION]);
    }
}
