//! Struct-field validation.
//!
//! Every struct type in a package becomes a schema record, so its fields must be named and their
//! struct tags must give each field a unique sequence (`pb:"N"`) and, when overridden, a unique
//! wire name (`json:"name"`). Nested struct types are records of their own and are checked
//! independently.
//!
//! Checks on one field stop at the first problem; checks on a struct continue with the next field.

use std::collections::BTreeMap;

use gunk_core::lang::conventions::{SEQUENCE_KEY, WIRE_NAME_KEY};
use gunk_core::strings::unquote;
use gunk_core::structtag::StructTag;

use crate::frontend::ast::*;

/// A violated field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub span: Span,
    pub message: String,
}

/// Sequences and wire names claimed by the fields of one struct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTagInfo {
    /// Sequence number to field name.
    pub sequences: BTreeMap<i64, String>,
    /// Wire name to field name.
    pub wire_names: BTreeMap<String, String>,
}

/// Validate one struct type spanning `span`. Nested structs are not visited.
pub fn validate_struct(st: &StructType, span: Span) -> (FieldTagInfo, Vec<FieldError>) {
    let mut info = FieldTagInfo::default();
    let mut errors = Vec::new();

    if st.fields.iter().any(|f| f.names.is_empty()) {
        errors.push(FieldError {
            span,
            message: "anonymous struct fields are not supported".to_string(),
        });
        return (info, errors);
    }

    for field in &st.fields {
        let Some(tag) = &field.tag else {
            continue;
        };
        let name = field.names[0].node.as_str();
        let mut report = |message: String| {
            errors.push(FieldError {
                span: field.span,
                message,
            })
        };

        let raw = match unquote(&tag.node) {
            Ok(raw) => raw,
            Err(err) => {
                report(format!("error in struct tag on {name}: {err}"));
                continue;
            }
        };
        let tag = match StructTag::parse(&raw) {
            Ok(tag) => tag,
            Err(err) => {
                report(format!("error in struct tag on {name}: {err}"));
                continue;
            }
        };
        let Some(sequence) = tag.lookup(SEQUENCE_KEY).filter(|s| !s.is_empty()) else {
            continue;
        };

        if let Some(wire) = tag.lookup(WIRE_NAME_KEY).filter(|s| !s.is_empty()) {
            if info.wire_names.contains_key(wire) {
                report(format!("error in struct tag on {name}: json tag \"{wire}\" seen twice"));
                continue;
            }
            info.wire_names.insert(wire.to_string(), name.to_string());
        }

        let number = match sequence.parse::<i64>() {
            Ok(number) => number,
            Err(err) => {
                report(format!("unable to convert tag to number on {name}: parsing \"{sequence}\": {err}"));
                continue;
            }
        };
        if info.sequences.contains_key(&number) {
            report(format!("sequence \"{sequence}\" on {name} has already been used in this struct"));
            continue;
        }
        info.sequences.insert(number, name.to_string());
    }
    (info, errors)
}

/// Validate every struct type in `file`, including nested and anonymous ones.
#[tracing::instrument(skip_all, fields(package = file.name.node.as_str()))]
pub fn validate_file(file: &File) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for decl in &file.decls {
        for spec in &decl.specs {
            match spec {
                Spec::Import(_) => {}
                Spec::Type(ts) => walk(&ts.ty, &mut errors),
                Spec::Const(cs) => {
                    if let Some(ty) = &cs.ty {
                        walk(ty, &mut errors);
                    }
                    for value in &cs.values {
                        walk(value, &mut errors);
                    }
                }
            }
        }
    }
    errors
}

fn walk(expr: &Spanned<Expr>, errors: &mut Vec<FieldError>) {
    match &expr.node {
        Expr::StructType(st) => {
            let (_, found) = validate_struct(st, expr.span);
            let anonymous = st.fields.iter().any(|f| f.names.is_empty());
            errors.extend(found);
            if !anonymous {
                for field in &st.fields {
                    walk(&field.ty, errors);
                }
            }
        }
        Expr::InterfaceType(it) => {
            for method in &it.methods {
                for param in method.params.iter().chain(&method.results) {
                    walk(&param.ty, errors);
                }
            }
            for embed in &it.embeds {
                walk(embed, errors);
            }
        }
        Expr::CompositeLit { ty, elts } => {
            if let Some(ty) = ty {
                walk(ty, errors);
            }
            for elt in elts {
                walk(elt, errors);
            }
        }
        Expr::KeyValue { key, value } | Expr::MapType { key, value } => {
            walk(key, errors);
            walk(value, errors);
        }
        Expr::Binary { lhs, rhs, .. } => {
            walk(lhs, errors);
            walk(rhs, errors);
        }
        Expr::Index { base, index } => {
            walk(base, errors);
            walk(index, errors);
        }
        Expr::Call { func, args } => {
            walk(func, errors);
            for arg in args {
                walk(arg, errors);
            }
        }
        Expr::Paren(inner) | Expr::Star(inner) | Expr::SliceType(inner) => walk(inner, errors),
        Expr::Unary { operand, .. } => walk(operand, errors),
        Expr::Selector { base, .. } => walk(base, errors),
        Expr::Ident(_) | Expr::BasicLit(_) => {}
    }
}
