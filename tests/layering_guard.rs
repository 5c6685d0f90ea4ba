//! Layering guardrails for the workspace crates.
//!
//! `gunk_syntax` and `gunk_core` are the reusable bottom layers: they may not pull in the CLI,
//! the descriptor stack or the logging subscriber. This test scans their `Cargo.toml` files and
//! fails if one of those crates appears in `[dependencies]`.

const FORBIDDEN: &[&str] = &["gunk", "clap", "prost", "prost-types", "tracing-subscriber", "walkdir"];

fn dependencies(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut deps = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }
        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }
        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        deps.push(line_no_comment.to_string());
    }
    deps
}

fn assert_layered(name: &str, manifest: &str) {
    for dep in dependencies(manifest) {
        let key = dep.split('=').next().unwrap_or("").trim();
        if FORBIDDEN.contains(&key) {
            panic!("`{key}` must not appear in the [dependencies] of {name}");
        }
    }
}

#[test]
fn syntax_crate_stays_low_level() {
    assert_layered("gunk_syntax", include_str!("../crates/gunk_syntax/Cargo.toml"));
}

#[test]
fn core_crate_stays_low_level() {
    assert_layered("gunk_core", include_str!("../crates/gunk_core/Cargo.toml"));
}

#[test]
fn root_crate_declares_descriptor_stack() {
    let deps = dependencies(include_str!("../Cargo.toml"));
    for needed in ["prost", "prost-types", "walkdir"] {
        assert!(
            deps.iter().any(|d| d.split('=').next().unwrap_or("").trim() == needed),
            "root crate should depend on {needed}"
        );
    }
}
