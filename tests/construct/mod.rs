// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use pcore::loader::{Builtins, TypeRegistry};
use pcore::*;

fn parse(text: &str) -> Result<Type> {
    Ok(parse_type(text, &Builtins)?)
}

fn type_error(err: &anyhow::Error) -> Option<&TypeError> {
    err.downcast_ref::<TypeError>()
}

#[test]
fn scalars_convert_their_argument() -> Result<()> {
    for (target, arg, expected) in [
        ("Integer", Value::from("42"), Value::Integer(42)),
        ("Integer", Value::Float(3.9), Value::Integer(3)),
        ("Integer", Value::Bool(true), Value::Integer(1)),
        ("Float", Value::Integer(2), Value::Float(2.0)),
        ("Float", Value::from(" 0.5 "), Value::Float(0.5)),
        ("Numeric", Value::from("7"), Value::Integer(7)),
        ("Numeric", Value::from("7.25"), Value::Float(7.25)),
        ("String", Value::Integer(5), Value::from("5")),
        ("String", Value::from("same"), Value::from("same")),
        ("Boolean", Value::from("yes"), Value::Bool(true)),
        ("Boolean", Value::Integer(0), Value::Bool(false)),
        ("Optional[Integer]", Value::from("1"), Value::Integer(1)),
        ("Optional[Integer]", Value::Undef, Value::Undef),
    ] {
        assert_eq!(new_value(&parse(target)?, &[arg])?, expected, "{target}");
    }
    assert_eq!(new_value(&parse("Optional[Float]")?, &[])?, Value::Undef);
    Ok(())
}

#[test]
fn conversion_errors() -> Result<()> {
    let err = new_value(&Type::Integer, &[Value::from("x")]).unwrap_err();
    assert!(matches!(
        type_error(&err),
        Some(TypeError::IllegalArgumentType { index: 0, .. })
    ));

    let err = new_value(&Type::Integer, &[]).unwrap_err();
    assert_eq!(err.to_string(), "Integer.new: expects 1 arguments, got 0");

    let err = new_value(&Type::Undef, &[]).unwrap_err();
    assert_eq!(
        type_error(&err),
        Some(&TypeError::NotConstructible("Undef".into()))
    );

    let err = new_value(&Type::Boolean, &[Value::from("maybe")]).unwrap_err();
    assert!(type_error(&err).is_some());
    Ok(())
}

#[test]
fn arrays_and_iterators() -> Result<()> {
    let items = Value::from(vec![Value::Integer(1), Value::Integer(2)]);
    assert_eq!(new_value(&parse("Array[Integer]")?, &[items.clone()])?, items);
    assert_eq!(
        new_value(&parse("Array")?, &[Value::from("a")])?,
        Value::from(vec![Value::from("a")])
    );

    let it = new_value(&parse("Iterator[Integer]")?, &[items.clone()])?;
    assert_eq!(it.type_of().to_string(), "Iterator[Integer]");
    assert_eq!(
        new_value(&parse("Array[Integer]")?, &[it])?,
        items
    );

    let err = new_value(&parse("Iterator")?, &[Value::Integer(1)]).unwrap_err();
    assert!(matches!(
        type_error(&err),
        Some(TypeError::IllegalArgumentType { .. })
    ));

    let err = new_value(&parse("Array[String]")?, &[items]).unwrap_err();
    assert_eq!(
        type_error(&err),
        Some(&TypeError::TypeMismatch {
            expected: "Array[String]".into(),
            actual: "Array[Integer]".into(),
        })
    );
    Ok(())
}

#[test]
fn types_are_built_by_meta_types() -> Result<()> {
    let created = new_value(&parse("Type[Iterator]")?, &[Value::Type(Type::Integer)])?;
    assert_eq!(created.as_type()?.to_string(), "Iterator[Integer]");

    let created = new_value(&parse("Type")?, &[Value::from("Optional[String]")])?;
    assert_eq!(created.as_type()?.to_string(), "Optional[String]");

    let err = new_value(&parse("Type[Integer]")?, &[Value::from("String")]).unwrap_err();
    assert!(matches!(
        type_error(&err),
        Some(TypeError::IllegalArgumentCount { .. })
    ));

    let err = new_value(&parse("Type[Array[String]]")?, &[Value::Type(Type::Integer)]).unwrap_err();
    assert!(matches!(type_error(&err), Some(TypeError::TypeMismatch { .. })));
    Ok(())
}

#[test]
fn objects_are_created_positionally() -> Result<()> {
    let registry = TypeRegistry::new();
    registry.register_type_set(&decl::TypeSetDecl::from_json_str(
        r#"{"name": "Geo", "types": {"Point": {"attributes": {
            "x": "Integer",
            "y": {"type": "Integer", "value": 0}
        }}}}"#,
    )?)?;
    let point = parse_type("Geo::Point", &registry)?;
    let p = new_value(&point, &[Value::Integer(4)])?;
    assert_eq!(p.to_string(), "Geo::Point({'x' => 4, 'y' => 0})");

    let err = new_value(&types::ObjectType::default_type(), &[]).unwrap_err();
    assert_eq!(
        type_error(&err),
        Some(&TypeError::NotConstructible("Object".into()))
    );
    Ok(())
}
