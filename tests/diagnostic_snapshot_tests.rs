//! Snapshot tests for rendered diagnostics
//!
//! These tests load small packages and compare the text and JSON output of
//! `gunk check` against inline snapshots.
//!
//! Review changes: `cargo insta review`

use std::fs;
use std::path::Path;

use gunk::cli::commands::{collect_diagnostics, describe_files, render_json, render_text};
use gunk::descriptors::bundled;
use gunk::{Loader, LoaderConfig};

fn write(root: &Path, rel: &str, source: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, source).expect("write source");
}

/// Load `patterns` from a module rooted at `root` and collect every diagnostic.
fn diagnostics(root: &Path, patterns: &[&str]) -> Vec<(String, gunk::Diagnostic)> {
    write(root, "gunk.mod", "module example.com\n");
    let mut loader = Loader::new(LoaderConfig::new(root)).expect("loader");
    let packages = loader.load(patterns).expect("load");
    collect_diagnostics(&packages, loader.fset())
}

const FIELDS: &str = "package p

type M struct {
\tA string `pb:\"1\" json:\"x\"`
\tB int    `pb:\"1\"`
\tC int    `pb:\"2\"`
\tD int    `pb:\"3\" json:\"x\"`
}
";

#[test]
fn test_field_diagnostics_text() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "p/p.gunk", FIELDS);
    let diags = diagnostics(tmp.path(), &["./p"]);
    insta::assert_snapshot!(render_text(&diags), @r#"
    example.com/p/p.gunk:5:2: sequence "1" on B has already been used in this struct
    example.com/p/p.gunk:7:2: error in struct tag on D: json tag "x" seen twice
    "#);
}

#[test]
fn test_field_diagnostics_json() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "p/p.gunk", FIELDS);
    let diags = diagnostics(tmp.path(), &["./p"]);
    insta::assert_snapshot!(render_json(&diags).unwrap(), @r#"
    [
      {
        "package": "example.com/p",
        "kind": "Validation",
        "position": "example.com/p/p.gunk:5:2",
        "message": "sequence \"1\" on B has already been used in this struct"
      },
      {
        "package": "example.com/p",
        "kind": "Validation",
        "position": "example.com/p/p.gunk:7:2",
        "message": "error in struct tag on D: json tag \"x\" seen twice"
      }
    ]
    "#);
}

#[test]
fn test_package_level_diagnostics() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "a/a.gunk", "package a\n");
    write(tmp.path(), "a/b.gunk", "package b\n");
    write(tmp.path(), "t/t.gunk", "package t\n\ntype T int // +gunk T(1)\n");
    let diags = diagnostics(tmp.path(), &["./a", "./t", "example.com/missing"]);
    let text = render_text(&diags).replace(&tmp.path().display().to_string(), "[MODULE]");
    insta::assert_snapshot!(text, @r#"
    gunk package name mismatch: "a" "b"
    example.com/t/t.gunk:3:12: gunk tag without declaration: // +gunk T(1)
    cannot find package "example.com/missing" in [MODULE]/missing
    "#);
}

#[test]
fn test_bundled_descriptor_listing() {
    let files: Vec<_> = bundled::BUNDLED.iter().filter_map(|name| bundled::file(name)).collect();
    insta::assert_snapshot!(describe_files(&files), @r"
    google/protobuf/empty.proto	google.protobuf	Empty
    google/protobuf/timestamp.proto	google.protobuf	Timestamp
    google/protobuf/duration.proto	google.protobuf	Duration
    ");
}
