//! Types, objects and package scopes produced by the checker.
//!
//! A checked package is a [`PackageTypes`]: its package-level objects plus the checked packages it
//! imports. Named types refer to their declaring package by import path, so
//! [`PackageTypes::underlying`] can follow a name into any package reachable through the imports.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use gunk_core::lang::types::{self, BasicTypeCategory, BasicTypeId};

use crate::frontend::ast::Span;

use super::ConstValue;

/// Kind of an untyped constant (or of `nil`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Untyped {
    Bool,
    Int,
    Rune,
    Float,
    String,
    Nil,
}

impl Untyped {
    /// Default type of an untyped constant used where no other type is implied.
    pub fn default_type(self) -> Type {
        match self {
            Untyped::Bool => Type::Basic(BasicTypeId::Bool),
            Untyped::Int => Type::Basic(BasicTypeId::Int),
            Untyped::Rune => Type::Basic(BasicTypeId::Int32),
            Untyped::Float => Type::Basic(BasicTypeId::Float64),
            Untyped::String => Type::Basic(BasicTypeId::String),
            Untyped::Nil => Type::Untyped(Untyped::Nil),
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Untyped::Int | Untyped::Rune | Untyped::Float)
    }
}

/// A package-qualified type name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeName {
    /// Import path of the declaring package.
    pub package: String,
    pub name: String,
}

impl TypeName {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
    /// Unquoted struct tag.
    pub tag: Option<String>,
    pub embedded: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructDef {
    pub fields: Vec<FieldDef>,
}

impl StructDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<Type>,
    pub results: Vec<Type>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceDef {
    pub methods: Vec<MethodSig>,
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Basic(BasicTypeId),
    Untyped(Untyped),
    Named(TypeName),
    Pointer(Box<Type>),
    Slice(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Struct(StructDef),
    Interface(InterfaceDef),
    /// Result of an erroneous expression; never reported twice.
    Invalid,
}

impl Type {
    pub fn is_invalid(&self) -> bool {
        matches!(self, Type::Invalid)
    }

    pub fn is_untyped(&self) -> bool {
        matches!(self, Type::Untyped(_))
    }

    /// Category of a basic type; `None` for everything else.
    pub fn basic_category(&self) -> Option<BasicTypeCategory> {
        match self {
            Type::Basic(id) => Some(types::category(*id)),
            _ => None,
        }
    }

    /// `true` if values of this type may be `nil`.
    pub fn is_nillable(&self) -> bool {
        matches!(self, Type::Pointer(_) | Type::Slice(_) | Type::Map(..) | Type::Interface(_))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Basic(id) => write!(f, "{}", types::as_str(*id)),
            Type::Untyped(kind) => {
                let name = match kind {
                    Untyped::Bool => "bool",
                    Untyped::Int => "int",
                    Untyped::Rune => "rune",
                    Untyped::Float => "float",
                    Untyped::String => "string",
                    Untyped::Nil => "nil",
                };
                write!(f, "untyped {name}")
            }
            Type::Named(name) if name.package.is_empty() => write!(f, "{}", name.name),
            Type::Named(name) => write!(f, "{}.{}", name.package, name.name),
            Type::Pointer(elem) => write!(f, "*{elem}"),
            Type::Slice(elem) => write!(f, "[]{elem}"),
            Type::Map(key, value) => write!(f, "map[{key}]{value}"),
            Type::Struct(def) => {
                write!(f, "struct{{")?;
                for (i, field) in def.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    if field.embedded {
                        write!(f, "{}", field.ty)?;
                    } else {
                        write!(f, "{} {}", field.name, field.ty)?;
                    }
                }
                write!(f, "}}")
            }
            Type::Interface(def) => {
                write!(f, "interface{{")?;
                for (i, method) in def.methods.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}({})", method.name, join(&method.params))?;
                    match method.results.len() {
                        0 => {}
                        1 => write!(f, " {}", method.results[0])?,
                        _ => write!(f, " ({})", join(&method.results))?,
                    }
                }
                write!(f, "}}")
            }
            Type::Invalid => write!(f, "invalid type"),
        }
    }
}

fn join(types: &[Type]) -> String {
    types.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Type and, for constants, value of a checked expression.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAndValue {
    pub ty: Type,
    pub value: Option<ConstValue>,
}

impl TypeAndValue {
    pub fn new(ty: Type, value: Option<ConstValue>) -> Self {
        Self { ty, value }
    }

    pub fn invalid() -> Self {
        Self::new(Type::Invalid, None)
    }
}

/// A package-level object.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// A declared type. For named types `ty` is the underlying type; for aliases, the aliased type.
    TypeName { ty: Type, alias: bool, span: Span },
    Const { ty: Type, value: ConstValue, span: Span },
}

impl Object {
    pub fn span(&self) -> Span {
        match self {
            Object::TypeName { span, .. } | Object::Const { span, .. } => *span,
        }
    }
}

/// Imports visible in one file: local name to import path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileScope {
    pub imports: BTreeMap<String, String>,
}

/// Type information for one checked package.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageTypes {
    pub path: String,
    pub name: String,
    pub scope: BTreeMap<String, Object>,
    /// Directly imported packages, keyed by import path.
    pub imports: BTreeMap<String, Rc<PackageTypes>>,
    /// One entry per source file, in file order.
    pub files: Vec<FileScope>,
}

impl PackageTypes {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Object> {
        self.scope.get(name)
    }

    /// The package with import path `path`: this one or any package reachable through imports.
    pub fn package(&self, path: &str) -> Option<&PackageTypes> {
        if self.path == path {
            return Some(self);
        }
        let mut queue: VecDeque<&PackageTypes> = self.imports.values().map(|p| p.as_ref()).collect();
        let mut visited = Vec::new();
        while let Some(pkg) = queue.pop_front() {
            if pkg.path == path {
                return Some(pkg);
            }
            if visited.contains(&pkg.path.as_str()) {
                continue;
            }
            visited.push(pkg.path.as_str());
            queue.extend(pkg.imports.values().map(|p| p.as_ref()));
        }
        None
    }

    /// The declaration of a named type, wherever it lives.
    pub fn type_object(&self, name: &TypeName) -> Option<&Object> {
        self.package(&name.package)?.lookup(&name.name)
    }

    /// Follow named types (and aliases) to a structural type.
    pub fn underlying<'a>(&'a self, ty: &'a Type) -> &'a Type {
        let mut current = ty;
        // Named chains are acyclic once checked; the bound only guards corrupt input.
        for _ in 0..64 {
            let Type::Named(name) = current else {
                return current;
            };
            match self.type_object(name) {
                Some(Object::TypeName { ty, .. }) => current = ty,
                _ => return &Type::Invalid,
            }
        }
        &Type::Invalid
    }

    /// Constants of type `name`, in name order. Used to build enum tables.
    pub fn constants_of(&self, name: &TypeName) -> Vec<(String, ConstValue)> {
        let Some(pkg) = self.package(&name.package) else {
            return Vec::new();
        };
        let target = Type::Named(name.clone());
        pkg.scope
            .iter()
            .filter_map(|(const_name, obj)| match obj {
                Object::Const { ty, value, .. } if *ty == target => Some((const_name.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }
}
