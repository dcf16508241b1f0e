// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::pattern_type_mismatch)]

use core::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use lazy_static::lazy_static;

use crate::guard::Guard;
use crate::types::Type;
use crate::{ObjectValue, TypeError, Value};

type String = Arc<str>;

/// Constructor function of an object type, invoked by `new` and by direct construction.
#[derive(Clone)]
pub struct Constructor(Arc<dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync>);

impl Constructor {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Constructor(Arc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> anyhow::Result<Value> {
        (self.0)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Constructor")
    }
}

#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
    typ: Type,
    value: Option<Value>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, typ: Type) -> Self {
        Attribute {
            name: name.into(),
            typ,
            value: None,
        }
    }

    /// Gives the attribute a default value, which also makes it optional in `create`.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute_type(&self) -> &Type {
        &self.typ
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    fn equals(&self, other: &Attribute, g: &mut Guard) -> bool {
        self.name == other.name
            && self.typ.equals_with(&other.typ, g)
            && match (&self.value, &other.value) {
                (None, None) => true,
                (Some(a), Some(b)) => a.equals_with(b, g),
                _ => false,
            }
    }
}

/// Everything about an object type that may refer back to the type itself.
#[derive(Debug, Default)]
pub struct ObjectBody {
    parent: Option<Type>,
    attributes: IndexMap<String, Attribute>,
    constructor: Option<Constructor>,
}

impl ObjectBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(mut self, parent: Type) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.insert(attribute.name.clone(), attribute);
        self
    }

    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    fn is_empty(&self) -> bool {
        self.parent.is_none() && self.attributes.is_empty() && self.constructor.is_none()
    }
}

/// A type described by a schema of attributes, an optional parent and an optional constructor.
///
/// Object types are created unresolved and resolved exactly once. This two step life is what
/// lets a type mention itself, or a sibling that does not exist yet, in its attributes.
/// After resolution the type is immutable.
///
/// Named object types compare by name, parent and attributes. Assignability is nominal: a type
/// accepts itself, its equals, and the types that inherit from it.
pub struct ObjectType {
    name: Option<String>,
    body: OnceLock<ObjectBody>,
}

lazy_static! {
    static ref DEFAULT: Arc<ObjectType> = {
        let body = OnceLock::new();
        let _ = body.set(ObjectBody::default());
        Arc::new(ObjectType { name: None, body })
    };
}

impl ObjectType {
    /// The `Object` type, which every object type is assignable to.
    pub fn default_type() -> Type {
        Type::Object(DEFAULT.clone())
    }

    /// Creates an unresolved object type.
    pub fn new(name: Option<&str>) -> Arc<ObjectType> {
        Arc::new(ObjectType {
            name: name.map(String::from),
            body: OnceLock::new(),
        })
    }

    /// Creates and resolves an object type in one step. The body cannot refer to the type.
    ///
    /// A nameless empty body yields the `Object` singleton.
    pub fn with_body(name: Option<&str>, body: ObjectBody) -> Result<Arc<ObjectType>, TypeError> {
        if name.is_none() && body.is_empty() {
            return Ok(DEFAULT.clone());
        }
        let t = Self::new(name);
        t.resolve(body)?;
        Ok(t)
    }

    /// Attaches the body. Fails if the parent is not an object type, if the parent chain leads
    /// back to this type, or if the type was resolved before.
    pub fn resolve(&self, body: ObjectBody) -> Result<(), TypeError> {
        if let Some(parent) = &body.parent {
            let Type::Object(mut ancestor) = parent.clone() else {
                return Err(TypeError::InvalidParent {
                    name: self.label().into(),
                    parent: parent.to_string().into(),
                });
            };
            // Unresolved ancestors end the walk. The last member of a cycle to be resolved
            // sees the whole loop.
            loop {
                if ancestor.identity() == self.identity() {
                    return Err(TypeError::CircularInheritance(self.label().into()));
                }
                match ancestor.parent() {
                    Some(Type::Object(next)) => ancestor = next.clone(),
                    _ => break,
                }
            }
        }
        // Non-finite floats have no literal form.
        for attr in body.attributes.values() {
            if let Some(value) = attr.value.as_ref().filter(|v| !is_finite(v)) {
                return Err(TypeError::InvalidDefault {
                    name: self.label().into(),
                    attribute: attr.name.clone(),
                    value: value.to_string().into(),
                });
            }
        }
        self.body
            .set(body)
            .map_err(|_| TypeError::AlreadyResolved(self.label().into()))
    }

    pub fn is_resolved(&self) -> bool {
        self.body.get().is_some()
    }

    /// True for `Object` and for any resolved nameless type with an empty body, which is
    /// indistinguishable from it.
    pub fn is_default(&self) -> bool {
        self.identity() == DEFAULT.identity()
            || (self.name.is_none() && self.body.get().is_some_and(ObjectBody::is_empty))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn label(&self) -> &str {
        self.name().unwrap_or("Object")
    }

    pub(crate) fn identity(&self) -> usize {
        self as *const ObjectType as usize
    }

    pub fn parent(&self) -> Option<&Type> {
        self.body.get().and_then(|b| b.parent.as_ref())
    }

    fn parent_object(&self) -> Option<&Arc<ObjectType>> {
        match self.parent() {
            Some(Type::Object(p)) => Some(p),
            _ => None,
        }
    }

    /// Attributes declared by this type itself, in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.body.get().into_iter().flat_map(|b| b.attributes.values())
    }

    /// Looks up an attribute on this type or its ancestors.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        let mut current = self;
        loop {
            if let Some(attr) = current.body.get().and_then(|b| b.attributes.get(name)) {
                return Some(attr);
            }
            current = current.parent_object()?;
        }
    }

    /// All attributes, inherited ones first. An attribute redeclared by a descendant replaces
    /// the inherited one in place.
    pub fn all_attributes(&self) -> Vec<&Attribute> {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(parent) = current.parent_object() {
            chain.push(parent);
            current = parent;
        }
        let mut all: IndexMap<&str, &Attribute> = IndexMap::new();
        for t in chain.into_iter().rev() {
            for attr in t.attributes() {
                all.insert(attr.name(), attr);
            }
        }
        all.into_values().collect()
    }

    pub fn constructor(&self) -> Option<&Constructor> {
        self.body.get().and_then(|b| b.constructor.as_ref())
    }

    /// Creates an instance of this type.
    ///
    /// A declared constructor takes precedence. Otherwise the arguments initialize
    /// `all_attributes()` by position; missing trailing arguments fall back to the attribute
    /// defaults.
    pub fn create(self: &Arc<Self>, args: &[Value]) -> anyhow::Result<Value> {
        if let Some(constructor) = self.constructor() {
            return constructor.call(args);
        }

        let function = format!("{}.new", self.label());
        let attributes = self.all_attributes();
        let required = attributes
            .iter()
            .rposition(|a| a.value().is_none())
            .map_or(0, |i| i + 1);
        if args.len() < required || args.len() > attributes.len() {
            let expected = if required == attributes.len() {
                format!("{required}")
            } else {
                format!("{required} - {}", attributes.len())
            };
            return Err(TypeError::illegal_argument_count(&function, &expected, args.len()).into());
        }

        let mut values = IndexMap::new();
        for (idx, attr) in attributes.iter().enumerate() {
            let value = match (args.get(idx), attr.value()) {
                (Some(v), _) | (None, Some(v)) => v.clone(),
                (None, None) => Value::Undef,
            };
            if !attr.attribute_type().is_instance(&value) {
                return Err(TypeError::IllegalArgumentType {
                    function: function.as_str().into(),
                    index: idx,
                    expected: attr.attribute_type().to_string().into(),
                    actual: value.type_of().to_string().into(),
                }
                .into());
            }
            values.insert(attr.name.clone(), value);
        }
        Ok(Value::Object(ObjectValue::new(self.clone(), values)))
    }

    pub(crate) fn equals(a: &Arc<ObjectType>, b: &Arc<ObjectType>, g: &mut Guard) -> bool {
        if Arc::ptr_eq(a, b) {
            return true;
        }
        if a.name != b.name {
            return false;
        }
        g.guard(a.identity(), b.identity(), |g| {
            let parents_equal = match (a.parent(), b.parent()) {
                (None, None) => true,
                (Some(pa), Some(pb)) => pa.equals_with(pb, g),
                _ => false,
            };
            if !parents_equal {
                return false;
            }
            let (aa, ba): (Vec<_>, Vec<_>) = (a.attributes().collect(), b.attributes().collect());
            aa.len() == ba.len() && aa.iter().zip(ba.iter()).all(|(x, y)| x.equals(y, g))
        })
    }

    pub(crate) fn is_assignable(t: &Arc<ObjectType>, other: &Type, g: &mut Guard) -> bool {
        let Type::Object(mut candidate) = other.clone() else {
            return false;
        };
        if t.is_default() {
            return true;
        }
        loop {
            if ObjectType::equals(t, &candidate, g) {
                return true;
            }
            match candidate.parent_object() {
                Some(p) => candidate = p.clone(),
                None => return false,
            }
        }
    }

    /// Object values are instances of their type and its ancestors. A type value is an
    /// instance of the meta type describing its variant and of that meta type's ancestors,
    /// but never of `Object` itself.
    pub(crate) fn is_instance(t: &Arc<ObjectType>, value: &Value, g: &mut Guard) -> bool {
        match value {
            Value::Object(o) => Self::is_assignable(t, &Type::Object(o.object_type().clone()), g),
            Value::Type(_) if t.is_default() => false,
            Value::Type(v) => Self::is_assignable(t, &Type::Object(v.meta_type()), g),
            _ => false,
        }
    }
}

fn is_finite(value: &Value) -> bool {
    match value {
        Value::Float(f) => f.is_finite(),
        Value::Array(a) => a.iter().all(is_finite),
        _ => true,
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectType")
            .field("name", &self.label())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
