//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use prost::Message;
use prost_types::{FileDescriptorProto, FileDescriptorSet};
use serde::Serialize;

use crate::descriptors::ProtoLoader;
use crate::frontend::loader::{Loader, LoaderConfig};
use crate::frontend::materialize::{materialize, materialize_package};
use crate::frontend::package::{Diagnostic, DiagnosticKind, Package, walk_packages};
use crate::frontend::position::FileSet;

use super::{CliError, CliResult, ExitCode};

// ============================================================================
// Loading
// ============================================================================

fn load(dir: &Path, patterns: &[String], types: bool) -> CliResult<(Loader, Vec<Rc<Package>>)> {
    let config = LoaderConfig::new(dir).with_types(types);
    let mut loader = Loader::new(config).map_err(CliError::report)?;
    let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();
    let packages = loader.load(&patterns).map_err(CliError::report)?;
    Ok((loader, packages))
}

/// Diagnostic of one package, as printed by `check --json`.
#[derive(Debug, Serialize)]
pub struct PackageDiagnostic<'a> {
    pub package: &'a str,
    #[serde(flatten)]
    pub diagnostic: &'a Diagnostic,
}

/// Every diagnostic of `packages` and their imports, tag values included when types are known.
pub fn collect_diagnostics(packages: &[Rc<Package>], fset: &FileSet) -> Vec<(String, Diagnostic)> {
    let mut out = Vec::new();
    for pkg in walk_packages(packages) {
        let values = materialize_package(&pkg, fset);
        out.extend(
            pkg.diagnostics
                .iter()
                .chain(values.diagnostics.iter())
                .map(|d| (pkg.import_path.clone(), d.clone())),
        );
    }
    out
}

/// Render diagnostics one per line, `position: message`.
pub fn render_text(diagnostics: &[(String, Diagnostic)]) -> String {
    let mut out = String::new();
    for (_, diag) in diagnostics {
        out.push_str(&diag.to_string());
        out.push('\n');
    }
    out
}

/// Render diagnostics as a JSON array.
///
/// ## Errors
/// - `CliError` if serialization fails.
pub fn render_json(diagnostics: &[(String, Diagnostic)]) -> CliResult<String> {
    let entries: Vec<PackageDiagnostic<'_>> = diagnostics
        .iter()
        .map(|(package, diagnostic)| PackageDiagnostic { package, diagnostic })
        .collect();
    serde_json::to_string_pretty(&entries).map_err(|e| CliError::failure(format!("encoding diagnostics: {e}")))
}

// ============================================================================
// Commands
// ============================================================================

/// Load, check and validate the packages matching `patterns`.
///
/// Exits with failure if any diagnostic was recorded, on the roots or on anything they import.
pub fn check(dir: &Path, patterns: &[String], types: bool, json: bool) -> CliResult<ExitCode> {
    let (loader, packages) = load(dir, patterns, types)?;
    let diagnostics = collect_diagnostics(&packages, loader.fset());
    tracing::info!(packages = packages.len(), diagnostics = diagnostics.len(), "checked");

    if json {
        println!("{}", render_json(&diagnostics)?);
    } else {
        eprint!("{}", render_text(&diagnostics));
    }

    if diagnostics.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// List each tag of the matched packages: position, source, static type and value.
pub fn list_tags(dir: &Path, patterns: &[String]) -> CliResult<ExitCode> {
    let (loader, packages) = load(dir, patterns, true)?;
    let mut failed = false;
    for pkg in &packages {
        let listing = tag_listing(pkg, loader.fset());
        print!("{}", listing.text);
        for diag in &listing.diagnostics {
            eprintln!("{diag}");
        }
        failed |= !listing.diagnostics.is_empty();
    }
    if failed {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Output of [`tag_listing`].
#[derive(Debug, Default)]
pub struct TagListing {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Format the tags of one package, sorted by the position of the tagged node.
pub fn tag_listing(pkg: &Package, fset: &FileSet) -> TagListing {
    let mut listing = TagListing {
        diagnostics: pkg.diagnostics.clone(),
        ..TagListing::default()
    };

    let mut spans: Vec<_> = pkg.tags.keys().copied().collect();
    spans.sort();
    for span in spans {
        for tag in pkg.tags_for(span) {
            let position = fset.position(tag.expr.span.start);
            let mut line = format!(
                "{}: {}",
                position.as_ref().map_or_else(|| pkg.import_path.clone(), ToString::to_string),
                tag.text.trim().replace('\n', " ")
            );
            if let (Some(ty), Some(types)) = (&tag.ty, &pkg.types) {
                line.push_str(&format!(" : {ty}"));
                match materialize(types, tag) {
                    Ok(value) => line.push_str(&format!(" = {value}")),
                    Err(err) => listing.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::Validation,
                        position,
                        format!("invalid tag value: {err}"),
                    )),
                }
            }
            listing.text.push_str(&line);
            listing.text.push('\n');
        }
    }
    listing
}

/// Load descriptor files and list them, or write them out as an encoded set.
pub fn descriptors(
    names: &[String],
    protoc: PathBuf,
    include: Option<PathBuf>,
    output: Option<&Path>,
) -> CliResult<ExitCode> {
    let mut loader = ProtoLoader::new().with_protoc(protoc);
    if let Some(dir) = include {
        loader = loader.with_dir(dir);
    }
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let files = loader.load_proto(&names).map_err(CliError::report)?;

    match output {
        Some(path) => {
            let set = FileDescriptorSet { file: files };
            fs::write(path, set.encode_to_vec())
                .map_err(|e| CliError::failure(format!("writing {}: {e}", path.display())))?;
        }
        None => print!("{}", describe_files(&files)),
    }
    Ok(ExitCode::SUCCESS)
}

/// One line per file: name, package and top-level messages.
pub fn describe_files(files: &[FileDescriptorProto]) -> String {
    let mut out = String::new();
    for file in files {
        let messages: Vec<&str> = file.message_type.iter().map(|m| m.name()).collect();
        out.push_str(&format!("{}\t{}\t{}\n", file.name(), file.package(), messages.join(",")));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::descriptors::bundled;

    fn write(dir: &Path, rel: &str, source: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, source).unwrap();
    }

    #[test]
    fn json_diagnostics_carry_package() {
        let diags = vec![(
            "example.com/p".to_string(),
            Diagnostic::new(DiagnosticKind::Validation, None, "bad"),
        )];
        let json = render_json(&diags).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["package"], "example.com/p");
        assert_eq!(parsed[0]["kind"], "Validation");
        assert_eq!(parsed[0]["message"], "bad");
        assert_eq!(render_text(&diags), "bad\n");
    }

    #[test]
    fn clean_package_checks_successfully() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "gunk.mod", "module example.com\n");
        write(tmp.path(), "p/p.gunk", "package p\n\ntype Msg struct {\n\tName string `pb:\"1\" json:\"name\"`\n}\n");
        let code = check(tmp.path(), &["./p".to_string()], true, true).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn invalid_package_fails_check() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "gunk.mod", "module example.com\n");
        write(
            tmp.path(),
            "p/p.gunk",
            "package p\n\ntype Msg struct {\n\tA string `pb:\"1\"`\n\tB string `pb:\"1\"`\n}\n",
        );
        let code = check(tmp.path(), &["./p".to_string()], false, false).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[test]
    fn tag_listing_shows_type_and_value() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "gunk.mod", "module example.com\n");
        write(
            tmp.path(),
            "p/p.gunk",
            "package p\n\ntype Level int\n\nconst (\n\tLow Level = iota\n\tHigh\n)\n\n// +gunk High\ntype Msg struct{}\n",
        );
        let (loader, packages) = load(tmp.path(), &["./p".to_string()], true).unwrap();
        let listing = tag_listing(&packages[0], loader.fset());
        assert!(listing.diagnostics.is_empty(), "{:?}", listing.diagnostics);
        assert!(listing.text.contains("p/p.gunk:10:"), "{}", listing.text);
        assert!(listing.text.contains("High : example.com/p.Level"), "{}", listing.text);
    }

    #[test]
    fn describe_bundled_files() {
        let files: Vec<_> = [bundled::EMPTY, bundled::DURATION].into_iter().filter_map(bundled::file).collect();
        assert_eq!(
            describe_files(&files),
            "google/protobuf/empty.proto\tgoogle.protobuf\tEmpty\ngoogle/protobuf/duration.proto\tgoogle.protobuf\tDuration\n"
        );
    }

    #[test]
    fn descriptors_writes_encoded_set() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("set.bin");
        let code = descriptors(
            &[bundled::TIMESTAMP.to_string()],
            PathBuf::from("/nonexistent/protoc"),
            None,
            Some(out.as_path()),
        )
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        let set = FileDescriptorSet::decode(fs::read(&out).unwrap().as_slice()).unwrap();
        assert_eq!(set.file[0].name(), bundled::TIMESTAMP);
    }
}
