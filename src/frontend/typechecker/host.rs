//! Host library packages built into the checker.
//!
//! Gunk files may import a small set of host packages (currently `time`) whose declarations
//! are constructed here instead of being read from `.gunk` sources.

use std::rc::Rc;

use gunk_core::lang::types::BasicTypeId;

use crate::frontend::ast::Span;

use super::{ConstValue, ImportError, Importer, Object, PackageTypes, StructDef, Type, TypeName};

/// Import paths served by [`lookup`].
pub const HOST_PACKAGES: &[&str] = &["time"];

/// The host package at `path`, if there is one.
pub fn lookup(path: &str) -> Option<Rc<PackageTypes>> {
    match path {
        "time" => Some(Rc::new(time_package())),
        _ => None,
    }
}

/// An [`Importer`] that knows only the host packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostImporter;

impl Importer for HostImporter {
    fn import(&mut self, path: &str) -> Result<Rc<PackageTypes>, ImportError> {
        lookup(path).ok_or_else(|| ImportError::Failed(format!("could not import {path} (unknown package)")))
    }
}

fn time_package() -> PackageTypes {
    let mut pkg = PackageTypes::new("time", "time");
    pkg.scope.insert(
        "Duration".to_string(),
        Object::TypeName {
            ty: Type::Basic(BasicTypeId::Int64),
            alias: false,
            span: Span::default(),
        },
    );
    pkg.scope.insert(
        "Time".to_string(),
        Object::TypeName {
            ty: Type::Struct(StructDef::default()),
            alias: false,
            span: Span::default(),
        },
    );

    let duration = Type::Named(TypeName::new("time", "Duration"));
    let units: [(&str, i128); 6] = [
        ("Nanosecond", 1),
        ("Microsecond", 1_000),
        ("Millisecond", 1_000_000),
        ("Second", 1_000_000_000),
        ("Minute", 60 * 1_000_000_000),
        ("Hour", 60 * 60 * 1_000_000_000),
    ];
    for (name, value) in units {
        pkg.scope.insert(
            name.to_string(),
            Object::Const {
                ty: duration.clone(),
                value: ConstValue::Int(value),
                span: Span::default(),
            },
        );
    }
    pkg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_exports_duration_units() {
        let pkg = lookup("time").unwrap();
        assert_eq!(
            pkg.lookup("Second"),
            Some(&Object::Const {
                ty: Type::Named(TypeName::new("time", "Duration")),
                value: ConstValue::Int(1_000_000_000),
                span: Span::default(),
            })
        );
        assert!(matches!(pkg.lookup("Time"), Some(Object::TypeName { .. })));
    }

    #[test]
    fn unknown_paths_fail() {
        assert!(lookup("example.com/x").is_none());
        assert!(matches!(HostImporter.import("net/http"), Err(ImportError::Failed(_))));
    }
}
