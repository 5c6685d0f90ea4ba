//! Dynamic value construction
//!
//! Builds typed [`Value`]s for annotation payloads from literal syntax. The target type is an
//! explicit [`TypeDesc`]; records and enums are looked up by name in a [`Schema`], so records
//! may refer to themselves through optional, list or map fields.
//!
//! ## Rules
//!
//! - **Optional**: build the inner value and wrap it.
//! - **Record**: start from the zero value; each literal entry names a field, matched ignoring ASCII case and
//!   underscores. List fields append and map fields insert, so repeated entries accumulate.
//! - **List**: one element per literal element. A descriptor-language literal that is not a list is a one-element
//!   list.
//! - **Map**: one pair per entry. A descriptor-language entry whose key is the string `"empty"` is skipped.
//! - **Enum**: the literal's token is looked up in the enum's name table.
//! - **Scalar**: the literal's token is parsed by kind; strings are unquoted first.
//!
//! Every failure aborts the whole build; no partial value is returned.
//!
//! ## Examples
//!
//! ```rust
//! use gunk::reflect::{Literal, ProtoLiteral, RecordDesc, ScalarKind, Schema, TypeDesc, Value, ValueBuilder};
//!
//! let mut schema = Schema::new();
//! schema.add_record(RecordDesc::new("HttpRule").field("Get", TypeDesc::Scalar(ScalarKind::Text)));
//! let literal = ProtoLiteral::parse(r#"{ get: "/v1/echo" }"#).unwrap();
//! let value = ValueBuilder::new(&schema)
//!     .build(&TypeDesc::Record("HttpRule".into()), Literal::Proto(&literal))
//!     .unwrap();
//! assert_eq!(value.field("Get"), Some(&Value::Text("/v1/echo".into())));
//! ```

mod literal;

pub use literal::{Literal, NamedLiteral, ProtoLiteral};

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use gunk_core::strings::{names_match, unquote};

use crate::frontend::ast::Expr;

/// Sentinel key the descriptor language produces for an explicitly empty map.
const EMPTY_MAP_KEY: &str = "empty";

/// Leaf value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Text,
    Float,
    Bool,
    Uint,
    Int,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Text => "string",
            ScalarKind::Float => "float64",
            ScalarKind::Bool => "bool",
            ScalarKind::Uint => "uint64",
            ScalarKind::Int => "int64",
        };
        write!(f, "{name}")
    }
}

/// Shape of a value to build.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    Optional(Box<TypeDesc>),
    /// A record, by name in the [`Schema`].
    Record(String),
    List(Box<TypeDesc>),
    Map(Box<TypeDesc>, Box<TypeDesc>),
    /// An enum, by name in the [`Schema`].
    Enum(String),
    Scalar(ScalarKind),
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Optional(inner) => write!(f, "*{inner}"),
            TypeDesc::Record(name) | TypeDesc::Enum(name) => write!(f, "{name}"),
            TypeDesc::List(elem) => write!(f, "[]{elem}"),
            TypeDesc::Map(key, value) => write!(f, "map[{key}]{value}"),
            TypeDesc::Scalar(kind) => write!(f, "{kind}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDesc {
    pub name: String,
    pub ty: TypeDesc,
}

/// Field layout of a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDesc {
    pub name: String,
    pub fields: Vec<FieldDesc>,
}

impl RecordDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, ty: TypeDesc) -> Self {
        self.fields.push(FieldDesc { name: name.into(), ty });
        self
    }
}

/// Name table of an enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDesc {
    pub name: String,
    /// Representation of the ordinals; [`ScalarKind::Int`] or [`ScalarKind::Uint`].
    pub repr: ScalarKind,
    pub values: BTreeMap<String, i64>,
}

impl EnumDesc {
    pub fn new(name: impl Into<String>, repr: ScalarKind) -> Self {
        Self {
            name: name.into(),
            repr,
            values: BTreeMap::new(),
        }
    }

    pub fn value(mut self, name: impl Into<String>, number: i64) -> Self {
        self.values.insert(name.into(), number);
        self
    }
}

/// Record layouts and enum tables referred to by name from [`TypeDesc`]s.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    records: HashMap<String, RecordDesc>,
    enums: HashMap<String, EnumDesc>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: RecordDesc) {
        self.records.insert(record.name.clone(), record);
    }

    pub fn add_enum(&mut self, desc: EnumDesc) {
        self.enums.insert(desc.name.clone(), desc);
    }

    pub fn record(&self, name: &str) -> Option<&RecordDesc> {
        self.records.get(name)
    }

    pub fn enum_desc(&self, name: &str) -> Option<&EnumDesc> {
        self.enums.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name) || self.enums.contains_key(name)
    }
}

/// A built value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Float(f64),
    Bool(bool),
    Uint(u64),
    Int(i64),
    Enum { ty: String, number: i64 },
    Optional(Option<Box<Value>>),
    List(Vec<Value>),
    /// Pairs in insertion order; keys are unique.
    Map(Vec<(Value, Value)>),
    Record(Record),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => write!(f, "{text:?}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Enum { ty, number } => write!(f, "{ty}({number})"),
            Value::Optional(None) => write!(f, "nil"),
            Value::Optional(Some(inner)) => write!(f, "&{inner}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Record(record) => {
                write!(f, "{}{{", record.ty)?;
                for (i, (name, value)) in record.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub ty: String,
    /// Every declared field, in declaration order.
    pub fields: Vec<(String, Value)>,
}

impl Value {
    /// Field of a record value, seen through optionals.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(record) => record.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            Value::Optional(Some(inner)) => inner.field(name),
            _ => None,
        }
    }

    fn insert_pair(pairs: &mut Vec<(Value, Value)>, key: Value, value: Value) {
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => pairs.push((key, value)),
        }
    }
}

/// A failed build.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("field not found: {field} in {record}")]
    FieldNotFound { record: String, field: String },

    #[error("{value:?} is not a valid enum value of {ty}")]
    InvalidEnum { ty: String, value: String },

    #[error("invalid {kind} value {text}: {reason}")]
    Scalar { kind: ScalarKind, text: String, reason: String },

    #[error("{found} is not a valid value for {target}")]
    Shape { found: String, target: String },

    #[error("unknown type {0}")]
    UnknownType(String),

    #[error("record {0} contains itself")]
    RecursiveRecord(String),

    #[error("type {0} has no value form")]
    Unsupported(String),

    #[error("invalid literal at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },
}

/// Builds [`Value`]s against a [`Schema`].
#[derive(Debug, Clone, Copy)]
pub struct ValueBuilder<'s> {
    schema: &'s Schema,
}

impl<'s> ValueBuilder<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    /// Build a value of type `target` from `literal`.
    ///
    /// ## Errors
    /// - [`BuildError`] on the first field, shape, enum or scalar problem.
    pub fn build(&self, target: &TypeDesc, literal: Literal<'_>) -> Result<Value, BuildError> {
        let literal = literal.unwrap();
        match target {
            TypeDesc::Optional(inner) => Ok(Value::Optional(Some(Box::new(self.build(inner, literal)?)))),
            TypeDesc::Record(name) => self.build_record(name, literal),
            TypeDesc::List(elem) => self.build_list(target, elem, literal),
            TypeDesc::Map(key, value) => self.build_map(target, key, value, literal),
            TypeDesc::Enum(name) => self.build_enum(name, literal),
            TypeDesc::Scalar(kind) => build_scalar(*kind, literal),
        }
    }

    /// Zero value of `target`: empty optionals and collections, records of zero fields.
    ///
    /// ## Errors
    /// - [`BuildError::UnknownType`] for a name missing from the schema.
    /// - [`BuildError::RecursiveRecord`] if a record contains itself without indirection.
    pub fn zero(&self, target: &TypeDesc) -> Result<Value, BuildError> {
        self.zero_in(target, &mut Vec::new())
    }

    fn zero_in(&self, target: &TypeDesc, visiting: &mut Vec<String>) -> Result<Value, BuildError> {
        Ok(match target {
            TypeDesc::Optional(_) => Value::Optional(None),
            TypeDesc::List(_) => Value::List(Vec::new()),
            TypeDesc::Map(..) => Value::Map(Vec::new()),
            TypeDesc::Scalar(ScalarKind::Text) => Value::Text(String::new()),
            TypeDesc::Scalar(ScalarKind::Float) => Value::Float(0.0),
            TypeDesc::Scalar(ScalarKind::Bool) => Value::Bool(false),
            TypeDesc::Scalar(ScalarKind::Uint) => Value::Uint(0),
            TypeDesc::Scalar(ScalarKind::Int) => Value::Int(0),
            TypeDesc::Enum(name) => {
                self.enum_for(name)?;
                Value::Enum {
                    ty: name.clone(),
                    number: 0,
                }
            }
            TypeDesc::Record(name) => {
                if visiting.contains(name) {
                    return Err(BuildError::RecursiveRecord(name.clone()));
                }
                let desc = self.record_for(name)?;
                visiting.push(name.clone());
                let fields = desc
                    .fields
                    .iter()
                    .map(|f| Ok((f.name.clone(), self.zero_in(&f.ty, visiting)?)))
                    .collect::<Result<Vec<_>, BuildError>>()?;
                visiting.pop();
                Value::Record(Record {
                    ty: name.clone(),
                    fields,
                })
            }
        })
    }

    fn record_for(&self, name: &str) -> Result<&'s RecordDesc, BuildError> {
        self.schema.record(name).ok_or_else(|| BuildError::UnknownType(name.to_string()))
    }

    fn enum_for(&self, name: &str) -> Result<&'s EnumDesc, BuildError> {
        self.schema.enum_desc(name).ok_or_else(|| BuildError::UnknownType(name.to_string()))
    }

    // ========================================================================
    // Records
    // ========================================================================

    fn build_record(&self, name: &str, literal: Literal<'_>) -> Result<Value, BuildError> {
        let desc = self.record_for(name)?;
        let Value::Record(mut record) = self.zero(&TypeDesc::Record(name.to_string()))? else {
            return Err(BuildError::UnknownType(name.to_string()));
        };

        match literal {
            Literal::Expr(expr) => {
                let Expr::CompositeLit { elts, .. } = &expr.node else {
                    return Err(shape(literal, name));
                };
                for elt in elts {
                    let Expr::KeyValue { key, value } = &elt.node else {
                        return Err(shape(Literal::Expr(elt), &format!("field of {name}")));
                    };
                    let Expr::Ident(key) = &key.node else {
                        return Err(shape(Literal::Expr(key), &format!("field name of {name}")));
                    };
                    self.set_field(desc, &mut record, key, Literal::Expr(value))?;
                }
            }
            Literal::Proto(lit) => {
                let Some(entries) = &lit.entries else {
                    return Err(shape(literal, name));
                };
                for entry in entries {
                    self.set_field(desc, &mut record, &entry.name, Literal::Named(entry))?;
                }
            }
            Literal::Named(_) => return Err(shape(literal, name)),
        }
        Ok(Value::Record(record))
    }

    fn set_field(
        &self,
        desc: &RecordDesc,
        record: &mut Record,
        key: &str,
        literal: Literal<'_>,
    ) -> Result<(), BuildError> {
        let Some(idx) = desc.fields.iter().position(|f| names_match(&f.name, key)) else {
            return Err(BuildError::FieldNotFound {
                record: desc.name.clone(),
                field: key.to_string(),
            });
        };
        let value = self.build(&desc.fields[idx].ty, literal)?;
        let slot = &mut record.fields[idx].1;
        match (slot, value) {
            (Value::List(existing), Value::List(more)) => existing.extend(more),
            (Value::Map(existing), Value::Map(more)) => {
                for (k, v) in more {
                    Value::insert_pair(existing, k, v);
                }
            }
            (slot, value) => *slot = value,
        }
        Ok(())
    }

    // ========================================================================
    // Collections
    // ========================================================================

    fn build_list(&self, target: &TypeDesc, elem: &TypeDesc, literal: Literal<'_>) -> Result<Value, BuildError> {
        let mut list = Vec::new();
        match literal {
            Literal::Expr(expr) => {
                let Expr::CompositeLit { elts, .. } = &expr.node else {
                    return Err(shape(literal, &target.to_string()));
                };
                for elt in elts {
                    list.push(self.build(elem, Literal::Expr(elt))?);
                }
            }
            Literal::Proto(lit) => match &lit.array {
                Some(array) => {
                    for elt in array {
                        list.push(self.build(elem, Literal::Proto(elt))?);
                    }
                }
                None => list.push(self.build(elem, literal)?),
            },
            Literal::Named(_) => return Err(shape(literal, &target.to_string())),
        }
        Ok(Value::List(list))
    }

    fn build_map(
        &self,
        target: &TypeDesc,
        key_ty: &TypeDesc,
        value_ty: &TypeDesc,
        literal: Literal<'_>,
    ) -> Result<Value, BuildError> {
        let mut pairs = Vec::new();
        match literal {
            Literal::Expr(expr) => {
                let Expr::CompositeLit { elts, .. } = &expr.node else {
                    return Err(shape(literal, &target.to_string()));
                };
                for elt in elts {
                    let Expr::KeyValue { key, value } = &elt.node else {
                        return Err(shape(Literal::Expr(elt), &format!("entry of {target}")));
                    };
                    let key = self.build(key_ty, Literal::Expr(key))?;
                    let value = self.build(value_ty, Literal::Expr(value))?;
                    Value::insert_pair(&mut pairs, key, value);
                }
            }
            Literal::Proto(lit) => {
                let Some([key, value]) = lit.entries.as_deref() else {
                    return Err(shape(literal, &target.to_string()));
                };
                let key = self.build(key_ty, Literal::Named(key))?;
                let value = self.build(value_ty, Literal::Named(value))?;
                if !matches!(&key, Value::Text(text) if text == EMPTY_MAP_KEY) {
                    Value::insert_pair(&mut pairs, key, value);
                }
            }
            Literal::Named(_) => return Err(shape(literal, &target.to_string())),
        }
        Ok(Value::Map(pairs))
    }

    // ========================================================================
    // Leaves
    // ========================================================================

    fn build_enum(&self, name: &str, literal: Literal<'_>) -> Result<Value, BuildError> {
        let desc = self.enum_for(name)?;
        let token = literal.token().ok_or_else(|| shape(literal, name))?;
        let number = desc.values.get(&token).copied().ok_or_else(|| BuildError::InvalidEnum {
            ty: name.to_string(),
            value: token.clone(),
        })?;
        if desc.repr == ScalarKind::Uint && number < 0 {
            return Err(BuildError::InvalidEnum {
                ty: name.to_string(),
                value: token,
            });
        }
        Ok(Value::Enum {
            ty: name.to_string(),
            number,
        })
    }
}

fn shape(literal: Literal<'_>, target: &str) -> BuildError {
    BuildError::Shape {
        found: literal.describe(),
        target: target.to_string(),
    }
}

fn build_scalar(kind: ScalarKind, literal: Literal<'_>) -> Result<Value, BuildError> {
    let text = literal.token().ok_or_else(|| shape(literal, &kind.to_string()))?;
    let fail = |reason: String| BuildError::Scalar {
        kind,
        text: text.clone(),
        reason,
    };
    Ok(match kind {
        ScalarKind::Text => Value::Text(unquote(&text).map_err(|e| fail(e.to_string()))?),
        ScalarKind::Float => Value::Float(text.parse().map_err(|e: std::num::ParseFloatError| fail(e.to_string()))?),
        ScalarKind::Bool => Value::Bool(parse_bool(&text).ok_or_else(|| fail("not a boolean".to_string()))?),
        ScalarKind::Uint => Value::Uint(text.parse().map_err(|e: std::num::ParseIntError| fail(e.to_string()))?),
        ScalarKind::Int => Value::Int(text.parse().map_err(|e: std::num::ParseIntError| fail(e.to_string()))?),
    })
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
