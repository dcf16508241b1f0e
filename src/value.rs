// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{Error as _, SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::guard::Guard;
use crate::iterator::IteratorValue;
use crate::types::{ArrayType, IteratorType, ObjectType, Type, TypeType};

/// A runtime value of the language.
///
/// Values are immutable and cheap to clone. Iterator values are the exception to immutability:
/// clones share a cursor.
#[derive(Debug, Clone)]
pub enum Value {
    Undef,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(Arc<str>),
    Array(Arc<Vec<Value>>),
    Type(Type),
    Iterator(IteratorValue),
    Object(ObjectValue),
}

/// An instance of a declared object type.
#[derive(Debug, Clone)]
pub struct ObjectValue(Arc<ObjectData>);

#[derive(Debug)]
struct ObjectData {
    ty: Arc<ObjectType>,
    attributes: IndexMap<Arc<str>, Value>,
}

impl ObjectValue {
    pub fn new(ty: Arc<ObjectType>, attributes: IndexMap<Arc<str>, Value>) -> Self {
        ObjectValue(Arc::new(ObjectData { ty, attributes }))
    }

    pub fn object_type(&self) -> &Arc<ObjectType> {
        &self.0.ty
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.attributes.iter().map(|(k, v)| (k.as_ref(), v))
    }

    fn equals(&self, other: &ObjectValue, g: &mut Guard) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        ObjectType::equals(&self.0.ty, &other.0.ty, g)
            && self.0.attributes.len() == other.0.attributes.len()
            && self
                .0
                .attributes
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| v.equals_with(o, g)))
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Undef => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s.as_ref()),
            Value::Array(a) => a.serialize(serializer),
            // types serialize as their type literal
            Value::Type(t) => serializer.serialize_str(&t.to_string()),
            Value::Object(o) => {
                let mut map = serializer.serialize_map(Some(o.0.attributes.len()))?;
                for (k, v) in o.attributes() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Iterator(_) => Err(S::Error::custom("iterator values cannot be serialized")),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a value")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Undef)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Undef)
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Bool(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        i64::try_from(v)
            .map(Value::Integer)
            .map_err(|_| E::custom(format!("integer {v} is out of range")))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Integer(v))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Float(v))
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::String(s.into()))
    }

    fn visit_string<E>(self, s: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::String(s.into()))
    }

    fn visit_seq<V>(self, mut visitor: V) -> Result<Self::Value, V::Error>
    where
        V: SeqAccess<'de>,
    {
        let mut arr = vec![];
        while let Some(v) = visitor.next_element()? {
            arr.push(v);
        }
        Ok(Value::from(arr))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Undef => f.write_str("undef"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::String(s) => write_quoted(f, s),
            Value::Array(a) => {
                f.write_str("[")?;
                for (idx, v) in a.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            Value::Type(t) => write!(f, "{t}"),
            Value::Iterator(it) => match it.element_type() {
                Type::Any => f.write_str("Iterator-Value"),
                t => write!(f, "Iterator[{t}]-Value"),
            },
            Value::Object(o) => {
                write!(f, "{}({{", o.object_type().name().unwrap_or("Object"))?;
                for (idx, (k, v)) in o.attributes().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write_quoted(f, k)?;
                    write!(f, " => {v}")?;
                }
                f.write_str("})")
            }
        }
    }
}

pub(crate) fn write_quoted(f: &mut fmt::Formatter, s: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\'' => f.write_str("\\'")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("'")
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals_with(other, &mut Guard::new())
    }
}

impl Value {
    pub fn from_json_str(json: &str) -> Result<Value> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_str(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(yaml: &str) -> Result<Value> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn is_undef(&self) -> bool {
        matches!(self, Value::Undef)
    }

    /// The most specific type of this value.
    ///
    /// An array gets the element type shared by all its elements, or `Any` when they differ.
    /// An iterator reports the element type it was created with.
    pub fn type_of(&self) -> Type {
        match self {
            Value::Undef => Type::Undef,
            Value::Bool(_) => Type::Boolean,
            Value::Integer(_) => Type::Integer,
            Value::Float(_) => Type::Float,
            Value::String(_) => Type::String,
            Value::Array(a) => {
                let mut elements = a.iter().map(Value::type_of);
                let common = match elements.next() {
                    Some(first) => {
                        if elements.all(|t| t.equals(&first)) {
                            first
                        } else {
                            Type::Any
                        }
                    }
                    None => Type::Any,
                };
                ArrayType::new(common)
            }
            Value::Type(t) => TypeType::new(t.clone()),
            Value::Iterator(it) => IteratorType::new(it.element_type().clone()),
            Value::Object(o) => Type::Object(o.object_type().clone()),
        }
    }

    pub fn equals_with(&self, other: &Value, g: &mut Guard) -> bool {
        match (self, other) {
            (Value::Undef, Value::Undef) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals_with(y, g))
            }
            (Value::Type(a), Value::Type(b)) => a.equals_with(b, g),
            (Value::Iterator(a), Value::Iterator(b)) => {
                a.ptr_eq(b) || a.element_type().equals_with(b.element_type(), g)
            }
            (Value::Object(a), Value::Object(b)) => a.equals(b, g),
            _ => false,
        }
    }

    /// An iterator over this value, if it is iterable.
    ///
    /// Arrays produce a fresh iterator over their elements. An iterator value returns a handle
    /// to itself, so the cursor is shared.
    pub fn iterator(&self) -> Option<IteratorValue> {
        match self {
            Value::Array(a) => {
                let element_type = match self.type_of() {
                    Type::Array(t) => t.element_type().clone(),
                    _ => Type::Any,
                };
                Some(IteratorValue::from_array(element_type, a.clone()))
            }
            Value::Iterator(it) => Some(it.clone()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(anyhow!("not a bool")),
        }
    }

    pub fn as_integer(&self) -> Result<i64> {
        match self {
            Value::Integer(i) => Ok(*i),
            _ => Err(anyhow!("not an integer")),
        }
    }

    /// Numeric value as a float. Integers are widened.
    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Integer(i) => Ok(*i as f64),
            _ => Err(anyhow!("not a number")),
        }
    }

    pub fn as_string(&self) -> Result<&Arc<str>> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(anyhow!("not a string")),
        }
    }

    pub fn as_array(&self) -> Result<&Vec<Value>> {
        match self {
            Value::Array(a) => Ok(a),
            _ => Err(anyhow!("not an array")),
        }
    }

    pub fn as_type(&self) -> Result<&Type> {
        match self {
            Value::Type(t) => Ok(t),
            _ => Err(anyhow!("not a type")),
        }
    }

    pub fn as_iterator(&self) -> Result<&IteratorValue> {
        match self {
            Value::Iterator(it) => Ok(it),
            _ => Err(anyhow!("not an iterator")),
        }
    }

    pub fn as_object(&self) -> Result<&ObjectValue> {
        match self {
            Value::Object(o) => Ok(o),
            _ => Err(anyhow!("not an object")),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(a: Vec<Value>) -> Self {
        Value::Array(Arc::new(a))
    }
}

impl From<Type> for Value {
    fn from(t: Type) -> Self {
        Value::Type(t)
    }
}

impl From<IteratorValue> for Value {
    fn from(it: IteratorValue) -> Self {
        Value::Iterator(it)
    }
}

impl From<ObjectValue> for Value {
    fn from(o: ObjectValue) -> Self {
        Value::Object(o)
    }
}
