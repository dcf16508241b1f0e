// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Unresolved type declarations.
//!
//! Declarations name other types by string and are turned into [`Type`](crate::types::Type)s by
//! the [`loader`](crate::loader). Type sets can be read from JSON, and from YAML with the `yaml`
//! feature:
//!
//! ```yaml
//! name: Graph
//! version: 1.0.0
//! types:
//!   Node:
//!     attributes:
//!       next: Optional[Node]
//!       weight: { type: Integer, value: 0 }
//! ```

use std::sync::Arc;

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use crate::parser::parse_type_expr;
use crate::types::Constructor;
use crate::{TypeError, Value};

type String = Arc<str>;

/// A type expression whose names are not yet resolved.
#[derive(Debug, Clone)]
pub enum TypeExpr {
    /// `Name` or `Name[P1, P2]`. Qualified names keep their `::` separators.
    Named { name: String, params: Vec<TypeExpr> },
    /// An inline object type, written `Object[{...}]`.
    Object(Box<ObjectDecl>),
}

impl TypeExpr {
    pub fn named(name: &str) -> Self {
        TypeExpr::Named {
            name: name.into(),
            params: vec![],
        }
    }

    pub fn parameterized(name: &str, params: Vec<TypeExpr>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            params,
        }
    }
}

/// The default value of an attribute.
#[derive(Debug, Clone)]
pub enum ValueExpr {
    Literal(Value),
    Type(TypeExpr),
}

#[derive(Debug, Clone)]
pub struct AttributeDecl {
    pub typ: TypeExpr,
    pub value: Option<ValueExpr>,
}

impl AttributeDecl {
    pub fn new(typ: TypeExpr) -> Self {
        AttributeDecl { typ, value: None }
    }

    pub fn with_value(mut self, value: ValueExpr) -> Self {
        self.value = Some(value);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectDecl {
    pub name: Option<String>,
    pub parent: Option<TypeExpr>,
    pub attributes: IndexMap<String, AttributeDecl>,
    pub constructor: Option<Constructor>,
}

impl ObjectDecl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: &str) -> Self {
        ObjectDecl {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent: TypeExpr) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_attribute(mut self, name: &str, attribute: AttributeDecl) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }
}

/// A named group of object types that may refer to each other.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawTypeSet")]
pub struct TypeSetDecl {
    pub name: String,
    pub version: Option<String>,
    pub types: IndexMap<String, ObjectDecl>,
}

impl TypeSetDecl {
    pub fn new(name: &str, version: Option<&str>) -> Self {
        TypeSetDecl {
            name: name.into(),
            version: version.map(String::from),
            types: IndexMap::new(),
        }
    }

    pub fn with_type(mut self, name: &str, decl: ObjectDecl) -> Self {
        self.types.insert(name.into(), decl);
        self
    }

    pub fn from_json_str(json: &str) -> Result<TypeSetDecl> {
        Ok(serde_json::from_str(json)?)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(yaml: &str) -> Result<TypeSetDecl> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTypeSet {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    types: IndexMap<String, RawObject>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawObject {
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    attributes: IndexMap<String, RawAttribute>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAttribute {
    Type(String),
    Full(RawFullAttribute),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFullAttribute {
    #[serde(rename = "type")]
    typ: String,
    #[serde(default, deserialize_with = "present_value")]
    value: Option<Value>,
}

// A present `null` is an explicit `undef` default, not a missing one.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl TryFrom<RawTypeSet> for TypeSetDecl {
    type Error = TypeError;

    fn try_from(raw: RawTypeSet) -> Result<Self, Self::Error> {
        let mut types = IndexMap::new();
        for (name, object) in raw.types {
            let mut decl = ObjectDecl::new();
            if let Some(parent) = &object.parent {
                decl = decl.with_parent(parse_type_expr(parent)?);
            }
            for (attr_name, attr) in object.attributes {
                let attr = match attr {
                    RawAttribute::Type(t) => AttributeDecl::new(parse_type_expr(&t)?),
                    RawAttribute::Full(full) => AttributeDecl {
                        typ: parse_type_expr(&full.typ)?,
                        value: full.value.map(ValueExpr::Literal),
                    },
                };
                decl = decl.with_attribute(&attr_name, attr);
            }
            types.insert(name, decl);
        }
        Ok(TypeSetDecl {
            name: raw.name,
            version: raw.version,
            types,
        })
    }
}
