// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::expect_used)] // the meta declarations are fixed

//! The `Pcore` type set: the object types describing the built-in types.
//!
//! The meta types are declared with the same [`ObjectDecl`]s as user types and built by the same
//! [`TypeSetBuilder`]. Each carries a constructor that forwards to the factory of its built-in
//! type, so `Pcore::IteratorType.create([Integer])` and `IteratorType::new(Integer)` produce equal
//! types.

use std::sync::Arc;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use tracing::debug;

use crate::decl::{AttributeDecl, ObjectDecl, TypeExpr, TypeSetDecl, ValueExpr};
use crate::loader::{Builtins, Primitives, TypeSetBuilder};
use crate::parser::parse_type;
use crate::types::{builtin_factory, Constructor, ObjectBody, ObjectType, Type, TypeSet, TypeType};
use crate::{TypeError, Value};

const PCORE: &str = "Pcore";
const PCORE_VERSION: &str = "1.0.0";

lazy_static! {
    static ref PCORE_TYPES: Arc<TypeSet> = {
        let set = TypeSetBuilder::new(&Primitives)
            .build(&declarations())
            .expect("Pcore declarations must resolve");
        debug!("bootstrapped {PCORE} {PCORE_VERSION} with {} meta types", set.len());
        set
    };
}

/// The `Pcore` type set.
pub fn pcore() -> &'static Arc<TypeSet> {
    &PCORE_TYPES
}

/// The meta type with the given simple name, e.g. `IteratorType`.
pub(crate) fn meta_type(name: &str) -> Arc<ObjectType> {
    match pcore().get(name) {
        Some(Type::Object(t)) => t.clone(),
        _ => panic!("{PCORE}::{name} is not a meta type"),
    }
}

fn declarations() -> TypeSetDecl {
    let any = || TypeExpr::named("AnyType");
    let contained = || {
        AttributeDecl::new(optional("Type")).with_value(ValueExpr::Type(TypeExpr::named("Any")))
    };
    let optional_string = || AttributeDecl::new(optional("String")).with_value(undef());

    TypeSetDecl::new(PCORE, Some(PCORE_VERSION))
        .with_type("AnyType", ObjectDecl::new().with_constructor(forward("Any")))
        .with_type("UndefType", scalar(any(), "Undef"))
        .with_type("UnitType", scalar(any(), "Unit"))
        .with_type("BooleanType", scalar(any(), "Boolean"))
        .with_type("NumericType", scalar(any(), "Numeric"))
        .with_type("IntegerType", scalar(TypeExpr::named("NumericType"), "Integer"))
        .with_type("FloatType", scalar(TypeExpr::named("NumericType"), "Float"))
        .with_type("StringType", scalar(any(), "String"))
        .with_type(
            "OptionalType",
            scalar(any(), "Optional").with_attribute("type", contained()),
        )
        .with_type(
            "ArrayType",
            scalar(any(), "Array").with_attribute("type", contained()),
        )
        .with_type(
            "TypeType",
            ObjectDecl::new()
                .with_parent(any())
                .with_attribute("type", contained())
                .with_constructor(Constructor::new(new_type_type)),
        )
        .with_type(
            "IteratorType",
            scalar(any(), "Iterator").with_attribute("type", contained()),
        )
        .with_type(
            "ObjectType",
            ObjectDecl::new()
                .with_parent(any())
                .with_constructor(Constructor::new(new_object_type))
                .with_attribute("name", optional_string())
                .with_attribute(
                    "parent",
                    AttributeDecl::new(optional("Type")).with_value(undef()),
                ),
        )
        .with_type(
            "TypeSetType",
            ObjectDecl::new()
                .with_parent(any())
                .with_constructor(Constructor::new(new_type_set_type))
                .with_attribute("name", optional_string())
                .with_attribute("version", optional_string()),
        )
}

fn optional(name: &str) -> TypeExpr {
    TypeExpr::parameterized("Optional", vec![TypeExpr::named(name)])
}

fn undef() -> ValueExpr {
    ValueExpr::Literal(Value::Undef)
}

fn scalar(parent: TypeExpr, builtin: &'static str) -> ObjectDecl {
    ObjectDecl::new()
        .with_parent(parent)
        .with_constructor(forward(builtin))
}

/// A constructor that forwards its arguments to a built-in type factory.
fn forward(builtin: &'static str) -> Constructor {
    Constructor::new(move |args| {
        let factory =
            builtin_factory(builtin).ok_or_else(|| TypeError::NotConstructible(builtin.into()))?;
        Ok(Value::Type(factory(args)?))
    })
}

// `Type` also accepts the text of a type expression.
fn new_type_type(args: &[Value]) -> anyhow::Result<Value> {
    match args {
        [Value::String(text)] => Ok(Value::Type(parse_type(text, &Builtins)?)),
        _ => Ok(Value::Type(TypeType::from_args(args)?)),
    }
}

/// Reads the optional string argument at `index`. Missing and undef arguments are `None`.
fn optional_str<'a>(
    function: &str,
    args: &'a [Value],
    index: usize,
) -> Result<Option<&'a str>, TypeError> {
    match args.get(index) {
        None | Some(Value::Undef) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_ref())),
        Some(other) => Err(TypeError::illegal_argument_type(
            function,
            index,
            "Optional[String]",
            other,
        )),
    }
}

// `Object` with an optional name and parent. Without both it is the default `Object`.
fn new_object_type(args: &[Value]) -> anyhow::Result<Value> {
    const FUNCTION: &str = "Pcore::ObjectType.new";
    if args.len() > 2 {
        return Err(TypeError::illegal_argument_count(FUNCTION, "0 - 2", args.len()).into());
    }
    let name = optional_str(FUNCTION, args, 0)?;
    let mut body = ObjectBody::new();
    match args.get(1) {
        None | Some(Value::Undef) => {}
        Some(Value::Type(parent)) => body = body.with_parent(parent.clone()),
        Some(other) => {
            return Err(
                TypeError::illegal_argument_type(FUNCTION, 1, "Optional[Type]", other).into(),
            )
        }
    }
    Ok(Value::Type(Type::Object(ObjectType::with_body(name, body)?)))
}

// An empty `TypeSet` with a name and an optional version. Without both it is the default.
fn new_type_set_type(args: &[Value]) -> anyhow::Result<Value> {
    const FUNCTION: &str = "Pcore::TypeSetType.new";
    if args.len() > 2 {
        return Err(TypeError::illegal_argument_count(FUNCTION, "0 - 2", args.len()).into());
    }
    let version = optional_str(FUNCTION, args, 1)?;
    match (optional_str(FUNCTION, args, 0)?, version) {
        (None, None) => Ok(Value::Type(TypeSet::default_type())),
        (Some(name), version) => Ok(Value::Type(Type::TypeSet(TypeSet::new(
            name,
            version,
            IndexMap::new(),
        )))),
        (None, Some(_)) => Err(TypeError::illegal_argument_type(
            FUNCTION,
            0,
            "String",
            &Value::Undef,
        )
        .into()),
    }
}
