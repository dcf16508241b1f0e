// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use indexmap::IndexMap;
use lazy_static::lazy_static;

use crate::guard::Guard;
use crate::types::Type;

type String = Arc<str>;

/// A named, versioned collection of types.
///
/// Members are stored under their simple names. Qualified lookups of the form `Set::Name` are
/// accepted when the qualifier is the name of the set.
#[derive(Debug, Default)]
pub struct TypeSet {
    name: Option<String>,
    version: Option<String>,
    types: IndexMap<String, Type>,
}

lazy_static! {
    static ref DEFAULT: Arc<TypeSet> = Arc::new(TypeSet::default());
}

impl TypeSet {
    pub fn default_type() -> Type {
        Type::TypeSet(DEFAULT.clone())
    }

    pub fn new(name: &str, version: Option<&str>, types: IndexMap<String, Type>) -> Arc<TypeSet> {
        Arc::new(TypeSet {
            name: Some(name.into()),
            version: version.map(String::from),
            types,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn types(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.types.iter().map(|(k, v)| (k.as_ref(), v))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Looks up a member by simple or qualified name.
    pub fn get(&self, name: &str) -> Option<&Type> {
        let simple = match (name.split_once("::"), self.name()) {
            (Some((qualifier, simple)), Some(own)) if qualifier == own => simple,
            (Some(_), _) => return None,
            (None, _) => name,
        };
        self.types.get(simple)
    }

    pub(crate) fn equals(a: &Arc<TypeSet>, b: &Arc<TypeSet>, g: &mut Guard) -> bool {
        if Arc::ptr_eq(a, b) {
            return true;
        }
        a.name == b.name
            && a.version == b.version
            && a.types.len() == b.types.len()
            && a.types.iter().all(|(name, t)| match b.types.get(name) {
                Some(other) => t.equals_with(other, g),
                None => false,
            })
    }

    pub(crate) fn is_assignable(self: &Arc<Self>, other: &Type, g: &mut Guard) -> bool {
        match other {
            Type::TypeSet(o) => Arc::ptr_eq(self, &DEFAULT) || Self::equals(self, o, g),
            _ => false,
        }
    }
}
