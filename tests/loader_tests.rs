//! Integration tests for the package loader
//!
//! Each test lays out a small module tree in a temporary directory and loads it the way the
//! CLI does.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use gunk::frontend::materialize::materialize_package;
use gunk::frontend::package::{DiagnosticKind, Package, count_diagnostics, walk_packages};
use gunk::reflect::Value;
use gunk::{LoadError, Loader, LoaderConfig};

fn write(root: &Path, rel: &str, source: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("relative path has a parent")).expect("create dirs");
    fs::write(path, source).expect("write source");
}

fn module(root: &Path) {
    write(root, "gunk.mod", "module example.com\n");
}

fn loader(root: &Path) -> Loader {
    Loader::new(LoaderConfig::new(root)).expect("loader")
}

fn messages(pkg: &Package) -> Vec<&str> {
    pkg.diagnostics.iter().map(|d| d.message.as_str()).collect()
}

const OPT: &str = r#"package opt

type Method int

const (
	GET Method = iota
	POST
)

type Route struct {
	Path   string
	Method Method
}
"#;

// ============================================================================
// Resolution and caching
// ============================================================================

#[test]
fn test_packages_are_memoized() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(tmp.path(), "opt/opt.gunk", OPT);
    write(tmp.path(), "api/api.gunk", "package api\n\nimport \"example.com/opt\"\n\ntype T struct {\n\tR opt.Route `pb:\"1\"`\n}\n");

    let mut loader = loader(tmp.path());
    let api = loader.load(&["example.com/api"]).unwrap();
    assert!(api[0].diagnostics.is_empty(), "{:?}", api[0].diagnostics);

    let opt_via_import = Rc::clone(&api[0].imports["example.com/opt"]);
    let opt_direct = loader.load(&["./opt"]).unwrap();
    assert!(Rc::ptr_eq(&opt_via_import, &opt_direct[0]));
    assert!(Rc::ptr_eq(&opt_direct[0], &loader.cached("example.com/opt").unwrap()));
}

#[test]
fn test_wildcard_skips_testdata_and_dedupes() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(tmp.path(), "a/a.gunk", "package a\n");
    write(tmp.path(), "a/b/b.gunk", "package b\n");
    write(tmp.path(), "a/testdata/t.gunk", "package broken\n\ntype {\n");
    write(tmp.path(), "a/_hidden/h.gunk", "package hidden\n");
    write(tmp.path(), "a/notes.txt", "not gunk");

    let pkgs = loader(tmp.path()).load(&["./a/...", "example.com/a/b"]).unwrap();
    let paths: Vec<&str> = pkgs.iter().map(|p| p.import_path.as_str()).collect();
    assert_eq!(paths, vec!["example.com/a", "example.com/a/b"]);
    assert_eq!(count_diagnostics(&pkgs), 0);
}

#[test]
fn test_import_path_wildcard() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(tmp.path(), "x/x.gunk", "package x\n");
    write(tmp.path(), "x/y/y.gunk", "package y\n");

    let pkgs = loader(tmp.path()).load(&["example.com/x/..."]).unwrap();
    let paths: Vec<&str> = pkgs.iter().map(|p| p.import_path.as_str()).collect();
    assert_eq!(paths, vec!["example.com/x", "example.com/x/y"]);
}

#[test]
fn test_file_arguments_form_uncached_package() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "one.gunk", "package p\n\ntype A struct{}\n");
    write(tmp.path(), "two.gunk", "package p\n\ntype B struct{}\n");

    let mut loader = loader(tmp.path());
    let pkgs = loader.load(&["one.gunk", "two.gunk"]).unwrap();
    assert_eq!(pkgs.len(), 1);
    assert_eq!(pkgs[0].import_path, "command-line-arguments");
    assert_eq!(pkgs[0].syntax.len(), 2);
    assert!(loader.cached("command-line-arguments").is_none());
}

#[test]
fn test_module_root_from_config() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "vendor/dep/dep.gunk", "package dep\n");
    let config = LoaderConfig::new(tmp.path()).with_module_root("github.com/other/dep", "vendor/dep");
    let pkgs = Loader::new(config).unwrap().load(&["github.com/other/dep"]).unwrap();
    assert!(pkgs[0].diagnostics.is_empty(), "{:?}", pkgs[0].diagnostics);
    assert_eq!(pkgs[0].name, "dep");
}

#[test]
fn test_directory_without_gunk_files() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(tmp.path(), "empty/readme.md", "nothing here");
    let pkgs = loader(tmp.path()).load(&["./empty"]).unwrap();
    assert_eq!(pkgs[0].diagnostics[0].kind, DiagnosticKind::ListResolution);
    assert!(pkgs[0].diagnostics[0].message.starts_with("no Gunk files in "));
}

// ============================================================================
// Cycles and import failures
// ============================================================================

#[test]
fn test_import_cycle_aborts_load() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(tmp.path(), "a/a.gunk", "package a\n\nimport \"example.com/b\"\n");
    write(tmp.path(), "b/b.gunk", "package b\n\nimport \"example.com/a\"\n");

    let err = loader(tmp.path()).load(&["example.com/a"]).unwrap_err();
    let LoadError::ImportCycle { stack } = &err else {
        panic!("expected an import cycle, got {err}");
    };
    assert_eq!(stack, &["example.com/a", "example.com/b", "example.com/a"]);
    assert_eq!(
        err.to_string(),
        "import cycle not allowed:\n\texample.com/a\n\t\timports example.com/b\n\t\timports example.com/a"
    );
}

#[test]
fn test_self_import_is_a_cycle() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(tmp.path(), "a/a.gunk", "package a\n\nimport \"example.com/a\"\n");
    let err = loader(tmp.path()).load(&["./a"]).unwrap_err();
    assert!(matches!(err, LoadError::ImportCycle { ref stack } if stack.len() == 2));
}

#[test]
fn test_failed_dependency_is_reported_on_importer() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(
        tmp.path(),
        "dep/dep.gunk",
        "package dep\n\ntype M struct {\n\tA int `pb:\"1\"`\n\tB int `pb:\"1\"`\n}\n",
    );
    write(tmp.path(), "api/api.gunk", "package api\n\nimport \"example.com/dep\"\n");

    let mut loader = loader(tmp.path());
    let api = loader.load(&["./api"]).unwrap();
    assert_eq!(messages(&api[0]), vec!["error importing package \"example.com/dep\""]);
    assert_eq!(api[0].diagnostics[0].kind, DiagnosticKind::Type);
    let pos = api[0].diagnostics[0].position.as_ref().unwrap();
    assert_eq!((pos.filename.as_str(), pos.line), ("example.com/api/api.gunk", 3));

    // The dependency itself stays cached with its own diagnostic.
    let dep = loader.cached("example.com/dep").unwrap();
    assert_eq!(dep.diagnostics[0].kind, DiagnosticKind::Validation);
}

#[test]
fn test_host_package_import() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(tmp.path(), "api/api.gunk", "package api\n\nimport \"time\"\n\ntype T struct {\n\tAt time.Time `pb:\"1\"`\n}\n");
    let pkgs = loader(tmp.path()).load(&["./api"]).unwrap();
    assert!(pkgs[0].diagnostics.is_empty(), "{:?}", pkgs[0].diagnostics);
    assert!(pkgs[0].imports.is_empty());
}

// ============================================================================
// Package names
// ============================================================================

#[test]
fn test_package_name_mismatch() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(tmp.path(), "p/a.gunk", "package a\n");
    write(tmp.path(), "p/b.gunk", "package b\n");

    let pkgs = loader(tmp.path()).load(&["./p"]).unwrap();
    assert_eq!(messages(&pkgs[0]), vec!["gunk package name mismatch: \"a\" \"b\""]);

    let mut untyped = Loader::new(LoaderConfig::new(tmp.path()).with_types(false)).unwrap();
    assert!(untyped.load(&["./p"]).unwrap()[0].diagnostics.is_empty());
}

#[test]
fn test_proto_package_name_mismatch() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(tmp.path(), "p/a.gunk", "package p // proto \"p.v1\"\n");
    write(tmp.path(), "p/b.gunk", "package p // proto \"p.v2\"\n");
    write(tmp.path(), "q/a.gunk", "package q // proto \"q.v1\"\n");
    write(tmp.path(), "q/b.gunk", "package q\n");

    let pkgs = loader(tmp.path()).load(&["./p", "./q"]).unwrap();
    assert_eq!(messages(&pkgs[0]), vec!["proto package name mismatch: \"p.v1\" \"p.v2\""]);
    assert!(pkgs[1].diagnostics.is_empty());
    assert_eq!(pkgs[1].proto_name, "q.v1");
}

// ============================================================================
// Tags and validation
// ============================================================================

const TAGGED: &str = r#"package api

import "example.com/opt"

type Level int

const (
	Low Level = iota
	High
)

// Echo is routed.
//
// +gunk opt.Route{Path: "/echo", Method: opt.POST}
// +gunk High
type Echo struct {
	// +gunk Low
	Msg string `pb:"1" json:"msg"`
}
"#;

#[test]
fn test_tags_are_typed_and_positioned() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(tmp.path(), "opt/opt.gunk", OPT);
    write(tmp.path(), "api/api.gunk", TAGGED);

    let mut loader = loader(tmp.path());
    let pkgs = loader.load(&["./api"]).unwrap();
    let pkg = &pkgs[0];
    assert!(pkg.diagnostics.is_empty(), "{:?}", pkg.diagnostics);

    let mut spans: Vec<_> = pkg.tags.keys().copied().collect();
    spans.sort();
    assert_eq!(spans.len(), 2);
    let decl_tags = pkg.tags_for(spans[0]);
    assert_eq!(decl_tags.len(), 2);

    let route = &decl_tags[0];
    assert_eq!(route.ty.as_ref().unwrap().to_string(), "example.com/opt.Route");
    let pos = loader.fset().position(route.expr.span.start).unwrap();
    assert_eq!(pos.to_string(), "example.com/api/api.gunk:14:10");

    let high = &decl_tags[1];
    assert_eq!(high.ty.as_ref().unwrap().to_string(), "example.com/api.Level");
    assert_eq!(high.value.as_ref().and_then(|v| v.as_i128()), Some(1));

    // The doc comment keeps only its prose.
    let gunk::frontend::ast::Spec::Type(ts) = &pkg.syntax[0].decls[3].specs[0] else {
        panic!("expected a type spec");
    };
    assert_eq!(ts.doc.as_ref().unwrap().text(), "Echo is routed.");
}

#[test]
fn test_tag_values_materialize() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(tmp.path(), "opt/opt.gunk", OPT);
    write(tmp.path(), "api/api.gunk", TAGGED);

    let mut loader = loader(tmp.path());
    let pkgs = loader.load(&["./api"]).unwrap();
    let values = materialize_package(&pkgs[0], loader.fset());
    assert!(values.diagnostics.is_empty(), "{:?}", values.diagnostics);

    let first = values.values.values().next().unwrap();
    assert_eq!(first[0].field("Path"), Some(&Value::Text("/echo".into())));
    assert_eq!(
        first[0].field("Method"),
        Some(&Value::Enum {
            ty: "example.com/opt.Method".into(),
            number: 1
        })
    );
}

#[test]
fn test_tag_type_error() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(tmp.path(), "p/p.gunk", "package p\n\n// +gunk Missing\ntype T struct{}\n");

    let pkgs = loader(tmp.path()).load(&["./p"]).unwrap();
    assert_eq!(pkgs[0].diagnostics.len(), 1);
    assert_eq!(pkgs[0].diagnostics[0].kind, DiagnosticKind::Type);
    assert_eq!(pkgs[0].diagnostics[0].position.as_ref().unwrap().line, 3);

    // Without types the tag is only parsed.
    let mut untyped = Loader::new(LoaderConfig::new(tmp.path()).with_types(false)).unwrap();
    let pkgs = untyped.load(&["./p"]).unwrap();
    assert!(pkgs[0].diagnostics.is_empty(), "{:?}", pkgs[0].diagnostics);
    assert!(pkgs[0].tags.values().flatten().all(|t| t.ty.is_none()));
}

#[test]
fn test_tag_without_declaration() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(tmp.path(), "p/p.gunk", "package p\n\ntype T int // +gunk T(1)\n");

    let pkgs = loader(tmp.path()).load(&["./p"]).unwrap();
    assert_eq!(messages(&pkgs[0]), vec!["gunk tag without declaration: // +gunk T(1)"]);
    assert_eq!(pkgs[0].diagnostics[0].kind, DiagnosticKind::Parse);
}

#[test]
fn test_duplicate_json_name_is_positioned_at_field() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(
        tmp.path(),
        "p/p.gunk",
        "package p\n\ntype M struct {\n\tA string `pb:\"1\" json:\"x\"`\n\tB int `pb:\"2\" json:\"x\"`\n}\n",
    );

    let pkgs = loader(tmp.path()).load(&["./p"]).unwrap();
    let diag = &pkgs[0].diagnostics[0];
    assert_eq!(diag.kind, DiagnosticKind::Validation);
    assert_eq!(diag.message, "error in struct tag on B: json tag \"x\" seen twice");
    assert_eq!(diag.to_string(), "example.com/p/p.gunk:5:2: error in struct tag on B: json tag \"x\" seen twice");
}

#[test]
fn test_syntax_error_skips_checking() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(tmp.path(), "p/p.gunk", "package p\n\ntype T struct {\n");

    let pkgs = loader(tmp.path()).load(&["./p"]).unwrap();
    assert!(!pkgs[0].diagnostics.is_empty());
    assert!(pkgs[0].diagnostics.iter().all(|d| d.kind == DiagnosticKind::Parse));
    assert!(pkgs[0].types.is_none());
}

#[test]
fn test_walk_reaches_imports() {
    let tmp = tempfile::tempdir().unwrap();
    module(tmp.path());
    write(tmp.path(), "opt/opt.gunk", OPT);
    write(tmp.path(), "api/api.gunk", TAGGED);

    let pkgs = loader(tmp.path()).load(&["./api"]).unwrap();
    let paths: Vec<String> = walk_packages(&pkgs).iter().map(|p| p.import_path.clone()).collect();
    assert_eq!(paths, vec!["example.com/api", "example.com/opt"]);
}
