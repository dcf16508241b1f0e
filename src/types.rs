// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::pattern_type_mismatch)]

//! The Pcore type lattice.
//!
//! Every runtime value has a most specific [`Type`], and types are related by three predicates:
//!
//! - `equals`: structural identity (nominal for named object types),
//! - `is_assignable`: the subtype partial order, with `Any` at the top,
//! - `is_instance`: whether a value belongs to the type.
//!
//! Unparameterized variants are unit variants of the enum or process-wide singletons created on
//! first use. Parameterized variants hold a reference counted node; constructing one with `Any`
//! as parameter returns the singleton, so `Iterator[Any]` and `Iterator` are the same node.
//!
//! Object types are the only nodes that can close a cycle in the type graph. Comparisons that
//! descend into them consult a [`Guard`], which makes comparing recursive types terminate.

use core::fmt;
use std::sync::Arc;

use crate::guard::Guard;
use crate::meta;
use crate::value::write_quoted;
use crate::{TypeError, Value};

mod array;
mod iterator_type;
mod object;
mod optional;
mod type_set;
mod type_type;

pub use array::ArrayType;
pub use iterator_type::IteratorType;
pub use object::{Attribute, Constructor, ObjectBody, ObjectType};
pub use optional::OptionalType;
pub use type_set::TypeSet;
pub use type_type::TypeType;

#[derive(Clone)]
pub enum Type {
    Any,
    Undef,
    Unit,
    Boolean,
    Numeric,
    Integer,
    Float,
    String,
    Optional(Arc<OptionalType>),
    Array(Arc<ArrayType>),
    Type(Arc<TypeType>),
    Iterator(Arc<IteratorType>),
    Object(Arc<ObjectType>),
    TypeSet(Arc<TypeSet>),
}

/// Factory for a built-in type, taking the arguments of its type literal.
pub(crate) type TypeFactory = fn(&[Value]) -> Result<Type, TypeError>;

/// Looks up the factory of a built-in type by its literal name.
pub(crate) fn builtin_factory(name: &str) -> Option<TypeFactory> {
    let factory: TypeFactory = match name {
        "Any" => |args| unparameterized("Any[]", args, Type::Any),
        "Undef" => |args| unparameterized("Undef[]", args, Type::Undef),
        "Unit" => |args| unparameterized("Unit[]", args, Type::Unit),
        "Boolean" => |args| unparameterized("Boolean[]", args, Type::Boolean),
        "Numeric" => |args| unparameterized("Numeric[]", args, Type::Numeric),
        "Integer" => |args| unparameterized("Integer[]", args, Type::Integer),
        "Float" => |args| unparameterized("Float[]", args, Type::Float),
        "String" => |args| unparameterized("String[]", args, Type::String),
        "Optional" => OptionalType::from_args,
        "Array" => ArrayType::from_args,
        "Type" => TypeType::from_args,
        "Iterator" => IteratorType::from_args,
        "Object" => |args| unparameterized("Object[]", args, ObjectType::default_type()),
        "TypeSet" => |args| unparameterized("TypeSet[]", args, TypeSet::default_type()),
        _ => return None,
    };
    Some(factory)
}

fn unparameterized(function: &str, args: &[Value], t: Type) -> Result<Type, TypeError> {
    if args.is_empty() {
        Ok(t)
    } else {
        Err(TypeError::illegal_argument_count(function, "0", args.len()))
    }
}

/// Applies the arity contract shared by the single-parameter types.
///
/// No arguments selects the default, one `Type` argument the parameter; anything else fails.
pub(crate) fn single_type_argument(
    function: &str,
    expected_count: &str,
    args: &[Value],
) -> Result<Option<Type>, TypeError> {
    match args {
        [] => Ok(None),
        [Value::Type(t)] => Ok(Some(t.clone())),
        [other] => Err(TypeError::illegal_argument_type(function, 0, "Type", other)),
        _ => Err(TypeError::illegal_argument_count(
            function,
            expected_count,
            args.len(),
        )),
    }
}

impl Type {
    pub fn name(&self) -> &str {
        match self {
            Type::Any => "Any",
            Type::Undef => "Undef",
            Type::Unit => "Unit",
            Type::Boolean => "Boolean",
            Type::Numeric => "Numeric",
            Type::Integer => "Integer",
            Type::Float => "Float",
            Type::String => "String",
            Type::Optional(_) => "Optional",
            Type::Array(_) => "Array",
            Type::Type(_) => "Type",
            Type::Iterator(_) => "Iterator",
            Type::Object(o) => o.name().unwrap_or("Object"),
            Type::TypeSet(s) => s.name().unwrap_or("TypeSet"),
        }
    }

    /// Identity comparison. Unit variants are their own singletons.
    pub fn ptr_eq(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Optional(a), Type::Optional(b)) => Arc::ptr_eq(a, b),
            (Type::Array(a), Type::Array(b)) => Arc::ptr_eq(a, b),
            (Type::Type(a), Type::Type(b)) => Arc::ptr_eq(a, b),
            (Type::Iterator(a), Type::Iterator(b)) => Arc::ptr_eq(a, b),
            (Type::Object(a), Type::Object(b)) => Arc::ptr_eq(a, b),
            (Type::TypeSet(a), Type::TypeSet(b)) => Arc::ptr_eq(a, b),
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }

    pub fn equals(&self, other: &Type) -> bool {
        self.equals_with(other, &mut Guard::new())
    }

    pub fn equals_with(&self, other: &Type, g: &mut Guard) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self, other) {
            (Type::Optional(a), Type::Optional(b)) => a.equals(b, g),
            (Type::Array(a), Type::Array(b)) => a.equals(b, g),
            (Type::Type(a), Type::Type(b)) => a.equals(b, g),
            (Type::Iterator(a), Type::Iterator(b)) => a.equals(b, g),
            (Type::Object(a), Type::Object(b)) => ObjectType::equals(a, b, g),
            (Type::TypeSet(a), Type::TypeSet(b)) => TypeSet::equals(a, b, g),
            _ => false,
        }
    }

    /// Returns true if every value of `other` is also a value of `self`.
    pub fn is_assignable(&self, other: &Type) -> bool {
        self.is_assignable_with(other, &mut Guard::new())
    }

    pub fn is_assignable_with(&self, other: &Type, g: &mut Guard) -> bool {
        match self {
            Type::Any | Type::Unit => true,
            Type::Undef => matches!(other, Type::Undef),
            Type::Boolean => matches!(other, Type::Boolean),
            Type::Numeric => matches!(other, Type::Numeric | Type::Integer | Type::Float),
            Type::Integer => matches!(other, Type::Integer),
            Type::Float => matches!(other, Type::Float),
            Type::String => matches!(other, Type::String),
            Type::Optional(t) => t.is_assignable(other, g),
            Type::Array(t) => t.is_assignable(other, g),
            Type::Type(t) => t.is_assignable(other, g),
            Type::Iterator(t) => t.is_assignable(other, g),
            Type::Object(t) => ObjectType::is_assignable(t, other, g),
            Type::TypeSet(t) => t.is_assignable(other, g),
        }
    }

    pub fn is_instance(&self, value: &Value) -> bool {
        self.is_instance_with(value, &mut Guard::new())
    }

    pub fn is_instance_with(&self, value: &Value, g: &mut Guard) -> bool {
        match self {
            Type::Any | Type::Unit => true,
            Type::Undef => value.is_undef(),
            Type::Boolean => matches!(value, Value::Bool(_)),
            Type::Numeric => matches!(value, Value::Integer(_) | Value::Float(_)),
            Type::Integer => matches!(value, Value::Integer(_)),
            Type::Float => matches!(value, Value::Float(_)),
            Type::String => matches!(value, Value::String(_)),
            Type::Optional(t) => t.is_instance(value, g),
            Type::Array(t) => t.is_instance(value, g),
            Type::Type(t) => t.is_instance(value, g),
            Type::Iterator(t) => t.is_instance(value, g),
            Type::Object(t) => ObjectType::is_instance(t, value, g),
            Type::TypeSet(_) => false,
        }
    }

    /// The canonical shape of this type with its parameters stripped, used when matching
    /// dispatch patterns. `Iterator[Integer]` becomes `Iterator`.
    pub fn generic(&self) -> Type {
        match self {
            Type::Optional(_) => OptionalType::default_type(),
            Type::Array(_) => ArrayType::default_type(),
            Type::Type(_) => TypeType::default_type(),
            Type::Iterator(_) => IteratorType::default_type(),
            _ => self.clone(),
        }
    }

    /// The unparameterized default of this variant.
    pub fn default_type(&self) -> Type {
        match self {
            Type::Object(_) => ObjectType::default_type(),
            Type::TypeSet(_) => TypeSet::default_type(),
            _ => self.generic(),
        }
    }

    /// Type parameters, empty when the type is the default of its variant.
    pub fn parameters(&self) -> Vec<Value> {
        match self {
            Type::Optional(t) => t.parameters(),
            Type::Array(t) => t.parameters(),
            Type::Type(t) => t.parameters(),
            Type::Iterator(t) => t.parameters(),
            _ => vec![],
        }
    }

    /// Reads an attribute described by the meta type of this variant.
    pub fn get(&self, key: &str) -> Option<Value> {
        match (self, key) {
            (Type::Optional(t), "type") => Some(Value::Type(t.contained_type().clone())),
            (Type::Array(t), "type") => Some(Value::Type(t.element_type().clone())),
            (Type::Type(t), "type") => Some(Value::Type(t.contained_type().clone())),
            (Type::Iterator(t), "type") => Some(Value::Type(t.element_type().clone())),
            (Type::Object(t), "name") => Some(t.name().map_or(Value::Undef, Value::from)),
            (Type::Object(t), "parent") => {
                Some(t.parent().map_or(Value::Undef, |p| Value::Type(p.clone())))
            }
            (Type::TypeSet(t), "name") => Some(t.name().map_or(Value::Undef, Value::from)),
            (Type::TypeSet(t), "version") => Some(t.version().map_or(Value::Undef, Value::from)),
            _ => None,
        }
    }

    /// The object type that describes this variant in the `Pcore` type set.
    pub fn meta_type(&self) -> Arc<ObjectType> {
        let name = match self {
            Type::Any => "AnyType",
            Type::Undef => "UndefType",
            Type::Unit => "UnitType",
            Type::Boolean => "BooleanType",
            Type::Numeric => "NumericType",
            Type::Integer => "IntegerType",
            Type::Float => "FloatType",
            Type::String => "StringType",
            Type::Optional(_) => "OptionalType",
            Type::Array(_) => "ArrayType",
            Type::Type(_) => "TypeType",
            Type::Iterator(_) => "IteratorType",
            Type::Object(_) => "ObjectType",
            Type::TypeSet(_) => "TypeSetType",
        };
        meta::meta_type(name)
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        TypeFormatter::default().write(f, self)
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({self})")
    }
}

/// Renders types in their canonical textual form.
///
/// Anonymous object types are written out in full; one that is reached again while it is
/// being written is shortened to `Object`.
#[derive(Default)]
pub(crate) struct TypeFormatter {
    in_progress: Vec<usize>,
}

impl TypeFormatter {
    pub(crate) fn write(&mut self, f: &mut fmt::Formatter<'_>, t: &Type) -> fmt::Result {
        match t {
            Type::Optional(o) => self.write_contained(f, "Optional", o.contained_type()),
            Type::Array(a) => self.write_contained(f, "Array", a.element_type()),
            Type::Type(tt) => self.write_contained(f, "Type", tt.contained_type()),
            Type::Iterator(it) => self.write_contained(f, "Iterator", it.element_type()),
            Type::Object(o) if o.name().is_none() && !o.is_default() => {
                if self.in_progress.contains(&o.identity()) {
                    return f.write_str("Object");
                }
                self.in_progress.push(o.identity());
                let result = self.write_object(f, o);
                self.in_progress.pop();
                result
            }
            _ => f.write_str(t.name()),
        }
    }

    fn write_contained(&mut self, f: &mut fmt::Formatter<'_>, name: &str, t: &Type) -> fmt::Result {
        f.write_str(name)?;
        if !matches!(t, Type::Any) {
            f.write_str("[")?;
            self.write(f, t)?;
            f.write_str("]")?;
        }
        Ok(())
    }

    fn write_object(&mut self, f: &mut fmt::Formatter<'_>, o: &ObjectType) -> fmt::Result {
        f.write_str("Object[{")?;
        let mut sep = "";
        if let Some(parent) = o.parent() {
            f.write_str("parent => ")?;
            self.write(f, parent)?;
            sep = ", ";
        }
        f.write_str(sep)?;
        f.write_str("attributes => {")?;
        for (idx, attr) in o.attributes().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write_quoted(f, attr.name())?;
            f.write_str(" => ")?;
            match attr.value() {
                Some(value) => {
                    f.write_str("{type => ")?;
                    self.write(f, attr.attribute_type())?;
                    write!(f, ", value => {value}}}")?;
                }
                None => self.write(f, attr.attribute_type())?,
            }
        }
        f.write_str("}}]")
    }
}
