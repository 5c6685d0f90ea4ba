//! Concrete values for checked tags.
//!
//! Derives a [`Schema`] and [`TypeDesc`] from a tag's static type and builds the tag's value
//! with [`ValueBuilder`]. Structs become records, pointers become optionals, and named integer
//! types with constants of their own become enums.

use std::collections::BTreeMap;

use gunk_core::lang::types::BasicTypeCategory;

use crate::frontend::ast::Span;
use crate::frontend::package::{Diagnostic, DiagnosticKind, Package, Tag};
use crate::frontend::position::FileSet;
use crate::frontend::typechecker::{ConstValue, PackageTypes, StructDef, Type, Untyped};
use crate::reflect::{BuildError, EnumDesc, Literal, RecordDesc, ScalarKind, Schema, TypeDesc, Value, ValueBuilder};

/// Collects the record and enum descriptions reachable from a type.
pub struct SchemaBuilder<'p> {
    types: &'p PackageTypes,
    schema: Schema,
}

impl<'p> SchemaBuilder<'p> {
    pub fn new(types: &'p PackageTypes) -> Self {
        Self {
            types,
            schema: Schema::new(),
        }
    }

    pub fn finish(self) -> Schema {
        self.schema
    }

    /// Describe `ty`, registering every record and enum it refers to.
    ///
    /// ## Errors
    /// - [`BuildError::Unsupported`] for interfaces, `nil` and invalid types.
    pub fn describe(&mut self, ty: &Type) -> Result<TypeDesc, BuildError> {
        match ty {
            Type::Basic(_) => scalar_kind(ty).map(TypeDesc::Scalar),
            Type::Untyped(untyped) => match untyped {
                Untyped::Bool => Ok(TypeDesc::Scalar(ScalarKind::Bool)),
                Untyped::Int | Untyped::Rune => Ok(TypeDesc::Scalar(ScalarKind::Int)),
                Untyped::Float => Ok(TypeDesc::Scalar(ScalarKind::Float)),
                Untyped::String => Ok(TypeDesc::Scalar(ScalarKind::Text)),
                Untyped::Nil => Err(BuildError::Unsupported(ty.to_string())),
            },
            Type::Pointer(elem) => Ok(TypeDesc::Optional(Box::new(self.describe(elem)?))),
            Type::Slice(elem) => Ok(TypeDesc::List(Box::new(self.describe(elem)?))),
            Type::Map(key, value) => Ok(TypeDesc::Map(
                Box::new(self.describe(key)?),
                Box::new(self.describe(value)?),
            )),
            Type::Struct(def) => {
                let name = ty.to_string();
                self.record(name, def)
            }
            Type::Named(name) => {
                let key = ty.to_string();
                if self.schema.record(&key).is_some() {
                    return Ok(TypeDesc::Record(key));
                }
                if self.schema.enum_desc(&key).is_some() {
                    return Ok(TypeDesc::Enum(key));
                }
                let types = self.types;
                match types.underlying(ty) {
                    Type::Struct(def) => self.record(key, def),
                    under @ Type::Basic(_) => {
                        let kind = scalar_kind(under)?;
                        let constants = types.constants_of(name);
                        if !matches!(kind, ScalarKind::Int | ScalarKind::Uint) || constants.is_empty() {
                            return Ok(TypeDesc::Scalar(kind));
                        }
                        let mut desc = EnumDesc::new(key.clone(), kind);
                        for (const_name, value) in constants {
                            if let Some(number) = value.as_i128().and_then(|n| i64::try_from(n).ok()) {
                                desc = desc.value(const_name, number);
                            }
                        }
                        self.schema.add_enum(desc);
                        Ok(TypeDesc::Enum(key))
                    }
                    under => {
                        let under = under.clone();
                        self.describe(&under)
                    }
                }
            }
            Type::Interface(_) | Type::Invalid => Err(BuildError::Unsupported(ty.to_string())),
        }
    }

    fn record(&mut self, name: String, def: &StructDef) -> Result<TypeDesc, BuildError> {
        // Registered before the fields so self references resolve.
        self.schema.add_record(RecordDesc::new(name.clone()));
        let mut record = RecordDesc::new(name.clone());
        for field in def.fields.iter().filter(|f| !f.embedded) {
            record = record.field(field.name.clone(), self.describe(&field.ty)?);
        }
        self.schema.add_record(record);
        Ok(TypeDesc::Record(name))
    }
}

fn scalar_kind(ty: &Type) -> Result<ScalarKind, BuildError> {
    match ty.basic_category() {
        Some(BasicTypeCategory::Boolean) => Ok(ScalarKind::Bool),
        Some(BasicTypeCategory::Text) => Ok(ScalarKind::Text),
        Some(BasicTypeCategory::SignedInteger) => Ok(ScalarKind::Int),
        Some(BasicTypeCategory::UnsignedInteger) => Ok(ScalarKind::Uint),
        Some(BasicTypeCategory::Float) => Ok(ScalarKind::Float),
        None => Err(BuildError::Unsupported(ty.to_string())),
    }
}

/// Build the value of one tag.
///
/// Constant tags of scalar or enum type take their checked value; everything else is built from
/// the tag expression.
///
/// ## Errors
/// - [`BuildError::Unsupported`] if the tag has no static type.
/// - Any [`BuildError`] from describing the type or building the value.
pub fn materialize(types: &PackageTypes, tag: &Tag) -> Result<Value, BuildError> {
    let ty = tag
        .ty
        .as_ref()
        .ok_or_else(|| BuildError::Unsupported(format!("untyped tag {}", tag.text.trim())))?;
    let mut builder = SchemaBuilder::new(types);
    let target = builder.describe(ty)?;
    let schema = builder.finish();

    if let Some(value) = &tag.value {
        if let Some(built) = from_constant(&schema, &target, value) {
            return Ok(built);
        }
    }
    ValueBuilder::new(&schema).build(&target, Literal::Expr(&tag.expr))
}

fn from_constant(schema: &Schema, target: &TypeDesc, value: &ConstValue) -> Option<Value> {
    match (target, value) {
        (TypeDesc::Scalar(ScalarKind::Text), ConstValue::String(s)) => Some(Value::Text(s.clone())),
        (TypeDesc::Scalar(ScalarKind::Bool), ConstValue::Bool(b)) => Some(Value::Bool(*b)),
        (TypeDesc::Scalar(ScalarKind::Float), v) => v.as_f64().map(Value::Float),
        (TypeDesc::Scalar(ScalarKind::Int), v) => v.as_i128().and_then(|n| i64::try_from(n).ok()).map(Value::Int),
        (TypeDesc::Scalar(ScalarKind::Uint), v) => v.as_i128().and_then(|n| u64::try_from(n).ok()).map(Value::Uint),
        (TypeDesc::Enum(name), v) => {
            let number = v.as_i128().and_then(|n| i64::try_from(n).ok())?;
            let desc = schema.enum_desc(name)?;
            desc.values.values().any(|n| *n == number).then(|| Value::Enum {
                ty: name.clone(),
                number,
            })
        }
        _ => None,
    }
}

/// Values of every typed tag of a package, keyed by the span of the tagged node.
#[derive(Debug, Default)]
pub struct PackageValues {
    pub values: BTreeMap<Span, Vec<Value>>,
    /// One validation diagnostic per tag that could not be built.
    pub diagnostics: Vec<Diagnostic>,
}

/// Materialize every tag of `pkg`. Packages without type information yield nothing.
#[tracing::instrument(skip_all, fields(package = pkg.import_path.as_str()))]
pub fn materialize_package(pkg: &Package, fset: &FileSet) -> PackageValues {
    let mut out = PackageValues::default();
    let Some(types) = &pkg.types else {
        return out;
    };
    let mut spans: Vec<&Span> = pkg.tags.keys().collect();
    spans.sort();
    for span in spans {
        for tag in pkg.tags_for(*span) {
            match materialize(types, tag) {
                Ok(value) => out.values.entry(*span).or_default().push(value),
                Err(err) => out.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::Validation,
                    fset.position(tag.expr.span.start),
                    format!("invalid tag value: {err}"),
                )),
            }
        }
    }
    tracing::debug!(values = out.values.len(), failures = out.diagnostics.len(), "materialized tags");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser;
    use crate::frontend::typechecker::{self, TypeEnv, host::HostImporter};
    use std::rc::Rc;

    const OPT: &str = "package opt\n\ntype Method int\n\nconst (\n\tGET Method = iota\n\tPOST\n)\n\ntype Route struct {\n\tPath string\n\tMethod Method\n\tTags []string\n\tNext *Route\n}\n";

    fn env() -> TypeEnv {
        let file = parser::parse_file(OPT, 1).unwrap();
        let types = typechecker::check("example.com/opt", "opt", &[file], &mut HostImporter).unwrap();
        TypeEnv::new(Rc::new(types))
    }

    fn tag(env: &TypeEnv, source: &str) -> Tag {
        let expr = parser::parse_expr(source).unwrap();
        let tv = env.eval(0, &expr).unwrap();
        Tag {
            expr,
            text: source.to_string(),
            ty: Some(tv.ty),
            value: tv.value,
        }
    }

    #[test]
    fn struct_tag_materializes() {
        let env = env();
        let tag = tag(&env, r#"Route{Path: "/echo", Method: POST, Tags: []string{"a"}, Next: &Route{Path: "/next"}}"#);
        let value = materialize(env.package(), &tag).unwrap();
        assert_eq!(value.field("Path"), Some(&Value::Text("/echo".into())));
        assert_eq!(
            value.field("Method"),
            Some(&Value::Enum {
                ty: "example.com/opt.Method".into(),
                number: 1
            })
        );
        let next = value.field("Next").unwrap();
        assert_eq!(next.field("Path"), Some(&Value::Text("/next".into())));
        assert_eq!(next.field("Next"), Some(&Value::Optional(None)));
    }

    #[test]
    fn constant_tags_use_checked_value() {
        let env = env();
        let value = materialize(env.package(), &tag(&env, "Method(1)")).unwrap();
        assert_eq!(
            value,
            Value::Enum {
                ty: "example.com/opt.Method".into(),
                number: 1
            }
        );
        assert_eq!(materialize(env.package(), &tag(&env, "\"a\" + \"b\"")).unwrap(), Value::Text("ab".into()));
    }

    #[test]
    fn untyped_tag_is_unsupported() {
        let env = env();
        let mut tag = tag(&env, "GET");
        tag.ty = None;
        assert!(matches!(materialize(env.package(), &tag), Err(BuildError::Unsupported(_))));
    }

    #[test]
    fn schema_describes_recursive_records() {
        let env = env();
        let mut builder = SchemaBuilder::new(env.package());
        let ty = Type::Named(crate::frontend::typechecker::TypeName::new("example.com/opt", "Route"));
        let desc = builder.describe(&ty).unwrap();
        let schema = builder.finish();
        assert_eq!(desc, TypeDesc::Record("example.com/opt.Route".into()));
        let record = schema.record("example.com/opt.Route").unwrap();
        assert_eq!(record.fields.len(), 4);
        assert_eq!(
            record.fields[3].ty,
            TypeDesc::Optional(Box::new(TypeDesc::Record("example.com/opt.Route".into())))
        );
    }
}
