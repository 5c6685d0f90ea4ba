//! First pass: imports and package-level declarations, plus type-expression resolution.

use std::collections::HashSet;

use gunk_core::lang::types as basic_types;
use gunk_core::strings::{is_exported, unquote};

use crate::frontend::ast::*;
use crate::frontend::diagnostics::{CompileError, errors};
use crate::frontend::loader::LoadError;

use super::{Checker, EvalState, ImportError, Object, PendingDecl};
use super::types::{FieldDef, InterfaceDef, MethodSig, StructDef, Type, TypeName};

/// Names declared by a spec, in source order. Imports declare no package-level names.
pub(super) fn spec_names(spec: &Spec) -> Vec<&str> {
    match spec {
        Spec::Import(_) => Vec::new(),
        Spec::Type(s) => vec![s.name.node.as_str()],
        Spec::Const(s) => s.names.iter().map(|n| n.node.as_str()).collect(),
    }
}

/// Last element of an import path, used when the imported package name is unknown.
fn path_base(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl<'a> Checker<'a> {
    // ========================================================================
    // Imports
    // ========================================================================

    pub(super) fn collect_imports(&mut self, file: &File) -> Result<(), Box<LoadError>> {
        let mut scope = super::FileScope::default();
        for spec in file.imports() {
            let Ok(path) = unquote(&spec.path.node) else {
                self.error(format!("invalid import path: {}", spec.path.node), spec.path.span);
                continue;
            };
            if path.is_empty() {
                self.error("invalid import path: (empty string)".to_string(), spec.path.span);
                continue;
            }

            let imported = match self.pkg.imports.get(&path) {
                Some(pkg) => Some(pkg.clone()),
                None => match self.importer.as_mut().map(|imp| imp.import(&path)) {
                    Some(Ok(pkg)) => {
                        self.pkg.to_mut().imports.insert(path.clone(), pkg.clone());
                        Some(pkg)
                    }
                    Some(Err(ImportError::Fatal(err))) => return Err(err),
                    Some(Err(ImportError::Failed(msg))) => {
                        self.error(msg, spec.path.span);
                        None
                    }
                    None => {
                        self.error(format!("could not import {path}"), spec.path.span);
                        None
                    }
                },
            };

            let local = match &spec.name {
                Some(name) => name.node.clone(),
                None => imported
                    .as_ref()
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| path_base(&path).to_string()),
            };
            match local.as_str() {
                "_" => continue,
                "." => {
                    let span = spec.name.as_ref().map_or(spec.span, |n| n.span);
                    self.error("dot imports are not supported".to_string(), span);
                    continue;
                }
                _ => {}
            }
            if scope.imports.contains_key(&local) {
                let span = spec.name.as_ref().map_or(spec.path.span, |n| n.span);
                self.errors.push(errors::redeclared(&local, span));
                continue;
            }
            scope.imports.insert(local, path);
        }
        let pkg = self.pkg.to_mut();
        if pkg.files.len() <= self.file {
            pkg.files.resize(self.file + 1, super::FileScope::default());
        }
        pkg.files[self.file] = scope;
        Ok(())
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    pub(super) fn collect_decls(&mut self, file_idx: usize, file: &'a File) {
        for decl in &file.decls {
            // Implicit repetition: a const spec without type and values reuses the previous ones.
            let mut previous: Option<(Option<&'a Spanned<Expr>>, &'a [Spanned<Expr>])> = None;
            for spec in &decl.specs {
                match spec {
                    Spec::Import(_) => {}
                    Spec::Type(ts) => {
                        self.declare(&ts.name, PendingDecl::Type { file: file_idx, spec: ts });
                    }
                    Spec::Const(cs) => {
                        let (ty, values) = if cs.ty.is_none() && cs.values.is_empty() {
                            previous.unwrap_or((None, &[][..]))
                        } else {
                            (cs.ty.as_ref(), cs.values.as_slice())
                        };
                        previous = Some((ty, values));
                        self.collect_const_spec(file_idx, cs, ty, values);
                    }
                }
            }
        }
    }

    fn collect_const_spec(
        &mut self,
        file_idx: usize,
        spec: &'a ConstSpec,
        ty: Option<&'a Spanned<Expr>>,
        values: &'a [Spanned<Expr>],
    ) {
        for (i, name) in spec.names.iter().enumerate() {
            let init = values.get(i);
            if init.is_none() {
                self.error(format!("missing init expr for {}", name.node), name.span);
            }
            self.declare(
                name,
                PendingDecl::Const {
                    file: file_idx,
                    name_span: name.span,
                    ty,
                    init,
                    iota: spec.iota,
                },
            );
        }
        if values.len() > spec.names.len() && !spec.values.is_empty() {
            let extra = &values[spec.names.len()];
            self.error("extra init expr".to_string(), extra.span);
        }
    }

    fn declare(&mut self, name: &Spanned<Ident>, decl: PendingDecl<'a>) {
        if name.node == "_" {
            return;
        }
        if self.decls.contains_key(&name.node) {
            self.errors.push(errors::redeclared(&name.node, name.span));
            return;
        }
        self.decls.insert(name.node.clone(), decl);
        self.states.insert(name.node.clone(), EvalState::NotStarted);
    }

    /// Resolve a package-level declaration and store its object in the package scope.
    pub(crate) fn resolve_decl(&mut self, name: &str) {
        let Some(decl) = self.decls.get(name).copied() else {
            return;
        };
        match self.states.get(name).copied().unwrap_or(EvalState::NotStarted) {
            EvalState::Done => return,
            EvalState::InProgress => {
                self.report_cycle(name, decl);
                return;
            }
            EvalState::NotStarted => {}
        }

        self.states.insert(name.to_string(), EvalState::InProgress);
        self.stack.push((name.to_string(), self.indirect));
        let saved = (self.file, self.iota, self.indirect);

        let object = match decl {
            PendingDecl::Type { file, spec } => {
                self.file = file;
                self.iota = None;
                self.resolve_type_spec(spec)
            }
            PendingDecl::Const {
                file,
                name_span,
                ty,
                init,
                iota,
            } => {
                self.file = file;
                self.iota = Some(iota as i128);
                self.eval_const_decl(name, name_span, ty, init)
            }
        };

        (self.file, self.iota, self.indirect) = saved;
        self.stack.pop();
        self.states.insert(name.to_string(), EvalState::Done);
        if let Some(object) = object {
            self.pkg.to_mut().scope.insert(name.to_string(), object);
        }
    }

    fn report_cycle(&mut self, name: &str, decl: PendingDecl<'a>) {
        if !self.reported_cycles.insert(name.to_string()) {
            return;
        }
        let start = self.stack.iter().position(|(n, _)| n == name).unwrap_or(0);
        let mut chain: Vec<&str> = self.stack[start..].iter().map(|(n, _)| n.as_str()).collect();
        chain.push(name);
        let chain = chain.join(" -> ");
        match decl {
            PendingDecl::Type { spec, .. } => {
                self.errors.push(
                    CompileError::type_error(format!("invalid recursive type {name}"), spec.name.span)
                        .with_note(format!("cycle: {chain}")),
                );
            }
            PendingDecl::Const { name_span, .. } => {
                self.error(format!("initialization cycle detected: {chain}"), name_span);
            }
        }
    }

    fn resolve_type_spec(&mut self, spec: &'a TypeSpec) -> Option<Object> {
        let ty = self.resolve_type(&spec.ty);
        let ty = if spec.alias {
            ty
        } else {
            // A named type takes the underlying type of its definition.
            match &ty {
                Type::Named(_) => self.underlying(&ty),
                _ => ty,
            }
        };
        Some(Object::TypeName {
            ty,
            alias: spec.alias,
            span: spec.name.span,
        })
    }

    // ========================================================================
    // Type expressions
    // ========================================================================

    /// Resolve a type expression. Reports an error and returns [`Type::Invalid`] if `expr` is not a type.
    pub(crate) fn resolve_type(&mut self, expr: &Spanned<Expr>) -> Type {
        match &expr.node {
            Expr::Ident(name) => self.resolve_type_name(name, expr.span),
            Expr::Selector { base, sel } => match &base.node {
                Expr::Ident(pkg_name) if self.import_path(pkg_name).is_some() => {
                    match self.qualified_object(pkg_name, sel) {
                        Some((path, Object::TypeName { ty, alias, .. })) => {
                            if alias {
                                ty
                            } else {
                                Type::Named(TypeName::new(path, sel.node.clone()))
                            }
                        }
                        Some((_, Object::Const { .. })) => {
                            self.error(format!("{pkg_name}.{} is not a type", sel.node), expr.span);
                            Type::Invalid
                        }
                        None => Type::Invalid,
                    }
                }
                _ => {
                    self.error(format!("{} is not a type", expr.node), expr.span);
                    Type::Invalid
                }
            },
            Expr::Paren(inner) => self.resolve_type(inner),
            Expr::Star(elem) => Type::Pointer(Box::new(self.indirect_type(elem))),
            Expr::SliceType(elem) => Type::Slice(Box::new(self.indirect_type(elem))),
            Expr::MapType { key, value } => {
                let key_ty = self.indirect_type(key);
                let value_ty = self.indirect_type(value);
                self.deferred_keys.push((key_ty.clone(), key.span));
                Type::Map(Box::new(key_ty), Box::new(value_ty))
            }
            Expr::StructType(st) => self.resolve_struct(st),
            Expr::InterfaceType(it) => self.resolve_interface(it),
            _ => {
                self.error(format!("{} is not a type", expr.node), expr.span);
                Type::Invalid
            }
        }
    }

    fn indirect_type(&mut self, expr: &Spanned<Expr>) -> Type {
        self.indirect += 1;
        let ty = self.resolve_type(expr);
        self.indirect -= 1;
        ty
    }

    fn resolve_type_name(&mut self, name: &str, span: Span) -> Type {
        if name == "_" {
            self.error("cannot use _ as value or type".to_string(), span);
            return Type::Invalid;
        }
        if let Some(decl) = self.decls.get(name).copied() {
            let PendingDecl::Type { spec, .. } = decl else {
                self.error(format!("{name} is not a type"), span);
                return Type::Invalid;
            };
            if self.states.get(name).copied() == Some(EvalState::InProgress) {
                let started = self
                    .stack
                    .iter()
                    .find(|(n, _)| n == name)
                    .map_or(0, |(_, depth)| *depth);
                if spec.alias || self.indirect <= started {
                    self.report_cycle(name, decl);
                    return Type::Invalid;
                }
                return Type::Named(TypeName::new(self.pkg.path.clone(), name));
            }
            self.resolve_decl(name);
            return match self.pkg.lookup(name) {
                Some(Object::TypeName { ty, alias: true, .. }) => ty.clone(),
                Some(Object::TypeName { .. }) => Type::Named(TypeName::new(self.pkg.path.clone(), name)),
                _ => Type::Invalid,
            };
        }
        match self.pkg.lookup(name) {
            Some(Object::TypeName { ty, alias: true, .. }) => return ty.clone(),
            Some(Object::TypeName { .. }) => return Type::Named(TypeName::new(self.pkg.path.clone(), name)),
            Some(Object::Const { .. }) => {
                self.error(format!("{name} is not a type"), span);
                return Type::Invalid;
            }
            None => {}
        }
        if let Some(id) = basic_types::from_str(name) {
            return Type::Basic(id);
        }
        if self.import_path(name).is_some() {
            self.error(format!("use of package {name} without selector"), span);
            return Type::Invalid;
        }
        self.errors.push(errors::undeclared(name, span));
        Type::Invalid
    }

    fn resolve_struct(&mut self, st: &StructType) -> Type {
        let mut def = StructDef::default();
        let mut seen = HashSet::new();
        for field in &st.fields {
            let ty = self.resolve_type(&field.ty);
            let tag = field.tag.as_ref().and_then(|t| unquote(&t.node).ok());
            if field.names.is_empty() {
                let Some(name) = embedded_name(&field.ty.node) else {
                    self.error(format!("invalid embedded field type {}", field.ty.node), field.ty.span);
                    continue;
                };
                if !seen.insert(name.clone()) {
                    self.error(format!("{name} redeclared"), field.ty.span);
                    continue;
                }
                def.fields.push(FieldDef {
                    name,
                    ty,
                    tag,
                    embedded: true,
                    span: field.span,
                });
                continue;
            }
            for name in &field.names {
                if name.node != "_" && !seen.insert(name.node.clone()) {
                    self.error(format!("{} redeclared", name.node), name.span);
                    continue;
                }
                def.fields.push(FieldDef {
                    name: name.node.clone(),
                    ty: ty.clone(),
                    tag: tag.clone(),
                    embedded: false,
                    span: name.span,
                });
            }
        }
        Type::Struct(def)
    }

    fn resolve_interface(&mut self, it: &InterfaceType) -> Type {
        let mut def = InterfaceDef::default();
        let mut seen = HashSet::new();
        for method in &it.methods {
            self.indirect += 1;
            let params = method.params.iter().map(|p| self.resolve_type(&p.ty)).collect();
            let results = method.results.iter().map(|p| self.resolve_type(&p.ty)).collect();
            self.indirect -= 1;
            if !seen.insert(method.name.node.clone()) {
                self.error(format!("duplicate method {}", method.name.node), method.name.span);
                continue;
            }
            def.methods.push(MethodSig {
                name: method.name.node.clone(),
                params,
                results,
            });
        }
        for embed in &it.embeds {
            let ty = self.resolve_type(embed);
            match self.underlying(&ty) {
                Type::Interface(inner) => {
                    for method in inner.methods {
                        if seen.insert(method.name.clone()) {
                            def.methods.push(method);
                        } else {
                            self.error(format!("duplicate method {}", method.name), embed.span);
                        }
                    }
                }
                Type::Invalid => {}
                _ => self.error(format!("{} is not an interface", embed.node), embed.span),
            }
        }
        Type::Interface(def)
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Import path bound to `name` in the current file.
    pub(crate) fn import_path(&self, name: &str) -> Option<String> {
        self.pkg.files.get(self.file)?.imports.get(name).cloned()
    }

    /// Look up `pkg_name.sel`, reporting missing and unexported names.
    ///
    /// Returns `None` without an error when the import itself failed (already reported).
    pub(crate) fn qualified_object(&mut self, pkg_name: &str, sel: &Spanned<Ident>) -> Option<(String, Object)> {
        let path = self.import_path(pkg_name)?;
        let Some(pkg) = self.pkg.imports.get(&path) else {
            return None;
        };
        let found = pkg.lookup(&sel.node).cloned();
        match found {
            Some(_) if !is_exported(&sel.node) => {
                self.error(format!("name {} not exported by package {}", sel.node, pkg_name), sel.span);
                None
            }
            Some(object) => Some((path, object)),
            None => {
                self.error(format!("undefined: {pkg_name}.{}", sel.node), sel.span);
                None
            }
        }
    }

    /// Whether values of `ty` may be compared with `==` (and used as map keys).
    pub(crate) fn comparable(&mut self, ty: &Type) -> bool {
        match self.underlying(ty) {
            Type::Basic(_) | Type::Pointer(_) | Type::Interface(_) | Type::Untyped(_) | Type::Invalid => true,
            Type::Struct(def) => def.fields.iter().all(|f| self.comparable(&f.ty)),
            Type::Slice(_) | Type::Map(..) | Type::Named(_) => false,
        }
    }
}

/// Field name of an embedded field: the type name, without package or pointer.
fn embedded_name(ty: &Expr) -> Option<String> {
    match ty {
        Expr::Ident(name) => Some(name.clone()),
        Expr::Selector { sel, .. } => Some(sel.node.clone()),
        Expr::Star(inner) => match &inner.node {
            Expr::Ident(_) | Expr::Selector { .. } => embedded_name(&inner.node),
            _ => None,
        },
        _ => None,
    }
}
