// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::pattern_type_mismatch)]

use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use tracing::debug;

use crate::decl::{ObjectDecl, TypeExpr, TypeSetDecl, ValueExpr};
use crate::meta;
use crate::types::{builtin_factory, Attribute, ObjectBody, ObjectType, Type, TypeSet};
use crate::{TypeError, Value};

type String = Arc<str>;

/// Maps type names to types.
pub trait Resolver {
    fn resolve_name(&self, name: &str) -> Option<Type>;
}

/// The built-in types, including the `Pcore::` meta types.
#[derive(Debug, Clone, Copy, Default)]
pub struct Builtins;

impl Resolver for Builtins {
    fn resolve_name(&self, name: &str) -> Option<Type> {
        if let Some(t) = Primitives.resolve_name(name) {
            return Some(t);
        }
        let simple = name.strip_prefix("Pcore::")?;
        meta::pcore().get(simple).cloned()
    }
}

/// The built-in types without the meta types. Used while the meta types are being built.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Primitives;

impl Resolver for Primitives {
    fn resolve_name(&self, name: &str) -> Option<Type> {
        builtin_factory(name).and_then(|factory| factory(&[]).ok())
    }
}

/// Resolves a type expression.
///
/// Parameterized names must be built-in types. Inline object types are created and resolved on
/// the spot, so they cannot refer to themselves.
pub fn resolve_expr(expr: &TypeExpr, resolver: &dyn Resolver) -> Result<Type, TypeError> {
    match expr {
        TypeExpr::Named { name, params } if params.is_empty() => resolver
            .resolve_name(name)
            .ok_or_else(|| TypeError::UnresolvedReference(name.clone())),
        TypeExpr::Named { name, params } => {
            let factory =
                builtin_factory(name).ok_or_else(|| TypeError::UnresolvedReference(name.clone()))?;
            let args = params
                .iter()
                .map(|p| resolve_expr(p, resolver).map(Value::Type))
                .collect::<Result<Vec<_>, _>>()?;
            factory(&args)
        }
        TypeExpr::Object(decl) => {
            let body = resolve_body(decl, resolver)?;
            Ok(Type::Object(ObjectType::with_body(decl.name.as_deref(), body)?))
        }
    }
}

fn resolve_body(decl: &ObjectDecl, resolver: &dyn Resolver) -> Result<ObjectBody, TypeError> {
    let mut body = ObjectBody::new();
    if let Some(parent) = &decl.parent {
        body = body.with_parent(resolve_expr(parent, resolver)?);
    }
    for (name, attr) in decl.attributes.iter() {
        let mut attribute = Attribute::new(name.clone(), resolve_expr(&attr.typ, resolver)?);
        match &attr.value {
            Some(ValueExpr::Literal(v)) => attribute = attribute.with_value(v.clone()),
            Some(ValueExpr::Type(t)) => {
                attribute = attribute.with_value(Value::Type(resolve_expr(t, resolver)?))
            }
            None => {}
        }
        body = body.with_attribute(attribute);
    }
    if let Some(constructor) = &decl.constructor {
        body = body.with_constructor(constructor.clone());
    }
    Ok(body)
}

/// Builds type sets from declarations.
///
/// Every member is allocated before any member is resolved, so members may refer to each other
/// in any order, and to themselves. Names that are not members go to the outer resolver.
pub struct TypeSetBuilder<'a> {
    resolver: &'a dyn Resolver,
}

struct Scope<'a> {
    name: &'a str,
    members: &'a IndexMap<String, Arc<ObjectType>>,
    outer: &'a dyn Resolver,
}

impl Resolver for Scope<'_> {
    fn resolve_name(&self, name: &str) -> Option<Type> {
        let member = match name.split_once("::") {
            Some((qualifier, simple)) if qualifier == self.name => self.members.get(simple),
            Some(_) => None,
            None => self.members.get(name),
        };
        match member {
            Some(t) => Some(Type::Object(t.clone())),
            None => self.outer.resolve_name(name),
        }
    }
}

impl<'a> TypeSetBuilder<'a> {
    pub fn new(resolver: &'a dyn Resolver) -> Self {
        TypeSetBuilder { resolver }
    }

    pub fn build(&self, decl: &TypeSetDecl) -> Result<Arc<TypeSet>, TypeError> {
        validate_name(&decl.name)?;
        let members: IndexMap<String, Arc<ObjectType>> = decl
            .types
            .keys()
            .map(|name| {
                let qualified = format!("{}::{name}", decl.name);
                (name.clone(), ObjectType::new(Some(&qualified)))
            })
            .collect();

        let scope = Scope {
            name: &decl.name,
            members: &members,
            outer: self.resolver,
        };
        for (name, object) in decl.types.iter() {
            let body = resolve_body(object, &scope)?;
            if let Some(t) = members.get(name) {
                t.resolve(body)?;
            }
        }

        debug!(
            "resolved type set {} with {} types",
            decl.name,
            members.len()
        );
        let types = members
            .into_iter()
            .map(|(name, t)| (name, Type::Object(t)))
            .collect();
        Ok(TypeSet::new(&decl.name, decl.version.as_deref(), types))
    }
}

fn validate_name(name: &str) -> Result<(), TypeError> {
    if name.trim().is_empty() {
        Err(TypeError::InvalidName(name.into()))
    } else {
        Ok(())
    }
}

/// Thread-safe registry of named types using DashMap.
///
/// Registered names shadow nothing: lookups that miss fall back to [`Builtins`].
#[derive(Debug, Default)]
pub struct TypeRegistry {
    inner: DashMap<String, Type>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type under a name. Returns Err if the name is blank or already taken.
    pub fn register(&self, name: &str, t: Type) -> Result<(), TypeError> {
        validate_name(name)?;
        if Builtins.resolve_name(name).is_some() {
            return Err(TypeError::AlreadyExists(name.into()));
        }

        use dashmap::mapref::entry::Entry;
        match self.inner.entry(name.into()) {
            Entry::Occupied(e) => Err(TypeError::AlreadyExists(e.key().clone())),
            Entry::Vacant(e) => {
                debug!("registered type {name}");
                e.insert(t);
                Ok(())
            }
        }
    }

    /// Builds a type set and registers it together with its qualified members.
    ///
    /// Names declared in the set may refer to types already in the registry.
    pub fn register_type_set(&self, decl: &TypeSetDecl) -> Result<Arc<TypeSet>, TypeError> {
        let set = TypeSetBuilder::new(self).build(decl)?;
        // Every name is checked before the first insert so a failure registers nothing.
        let qualified = set.types().map(|(name, _)| format!("{}::{name}", decl.name));
        for name in qualified.chain(std::iter::once(decl.name.to_string())) {
            if Builtins.resolve_name(&name).is_some() || self.contains(&name) {
                return Err(TypeError::AlreadyExists(name.as_str().into()));
            }
        }
        self.register(&decl.name, Type::TypeSet(set.clone()))?;
        for (name, t) in set.types() {
            self.register(&format!("{}::{name}", decl.name), t.clone())?;
        }
        Ok(set)
    }

    pub fn get(&self, name: &str) -> Option<Type> {
        self.inner.get(name).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, name: &str) -> Option<Type> {
        self.inner.remove(name).map(|(_, v)| v)
    }

    pub fn list_names(&self) -> Vec<String> {
        self.inner.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&self) {
        self.inner.clear();
    }
}

impl Resolver for TypeRegistry {
    fn resolve_name(&self, name: &str) -> Option<Type> {
        self.get(name).or_else(|| Builtins.resolve_name(name))
    }
}
