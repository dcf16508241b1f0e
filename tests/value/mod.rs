// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use std::sync::Arc;

use anyhow::Result;
use pcore::loader::Builtins;
use pcore::*;

#[test]
fn display() -> Result<()> {
    for (value, text) in [
        (Value::Undef, "undef"),
        (Value::Bool(true), "true"),
        (Value::Integer(-3), "-3"),
        (Value::Float(1.0), "1.0"),
        (Value::from("it's"), "'it\\'s'"),
        (
            Value::from(vec![Value::Integer(1), Value::from("a"), Value::Undef]),
            "[1, 'a', undef]",
        ),
        (Value::Type(parse_type("Array[Integer]", &Builtins)?), "Array[Integer]"),
        (
            Value::Iterator(IteratorValue::from_array(Type::Any, Arc::new(vec![]))),
            "Iterator-Value",
        ),
    ] {
        assert_eq!(value.to_string(), text);
    }
    Ok(())
}

#[test]
fn type_of() -> Result<()> {
    for (value, text) in [
        (Value::Undef, "Undef"),
        (Value::Bool(false), "Boolean"),
        (Value::Integer(1), "Integer"),
        (Value::Float(1.5), "Float"),
        (Value::from("a"), "String"),
        (Value::from(vec![Value::Integer(1), Value::Integer(2)]), "Array[Integer]"),
        (Value::from(vec![Value::Integer(1), Value::Float(2.5)]), "Array"),
        (Value::from(Vec::<Value>::new()), "Array"),
        (
            Value::from(vec![Value::from(vec![Value::from("a")])]),
            "Array[Array[String]]",
        ),
        (Value::Type(Type::Integer), "Type[Integer]"),
    ] {
        assert_eq!(value.type_of().to_string(), text, "{value}");
        assert!(value.type_of().is_instance(&value), "{value}");
    }
    Ok(())
}

#[test]
fn equality() -> Result<()> {
    assert_ne!(Value::Integer(1), Value::Float(1.0));
    assert_eq!(
        Value::from(vec![Value::Integer(1), Value::Undef]),
        Value::from(vec![Value::Integer(1), Value::Undef])
    );
    assert_eq!(
        Value::Type(parse_type("Iterator[Integer]", &Builtins)?),
        Value::Type(parse_type("Iterator[Integer]", &Builtins)?)
    );

    let it = IteratorValue::from_array(Type::Integer, Arc::new(vec![Value::Integer(1)]));
    let other = IteratorValue::from_array(Type::Integer, Arc::new(vec![Value::Integer(2)]));
    let strings = IteratorValue::from_array(Type::String, Arc::new(vec![Value::from("a")]));
    assert_eq!(Value::Iterator(it.clone()), Value::Iterator(it.clone()));
    // Iterators compare by element type, not by what is left to produce.
    assert_eq!(Value::Iterator(it.clone()), Value::Iterator(other));
    assert_ne!(Value::Iterator(it), Value::Iterator(strings));
    Ok(())
}

#[test]
fn accessors() -> Result<()> {
    assert_eq!(Value::Integer(2).as_float()?, 2.0);
    assert!(Value::from("2").as_integer().is_err());
    assert!(Value::Bool(true).as_bool()?);
    assert_eq!(Value::from("s").as_string()?.as_ref(), "s");
    assert!(Value::Undef.is_undef());
    assert!(Value::Integer(0).as_array().is_err());
    assert!(Value::Integer(0).as_object().is_err());
    Ok(())
}

#[test]
fn json() -> Result<()> {
    let v = Value::from_json_str(r#"[1, 2.5, "x", null, true]"#)?;
    assert_eq!(
        v,
        Value::from(vec![
            Value::Integer(1),
            Value::Float(2.5),
            Value::from("x"),
            Value::Undef,
            Value::Bool(true),
        ])
    );
    assert_eq!(serde_json::to_string(&v)?, r#"[1,2.5,"x",null,true]"#);

    let t = Value::Type(parse_type("Optional[String]", &Builtins)?);
    assert_eq!(serde_json::to_string(&t)?, r#""Optional[String]""#);

    assert!(Value::from_json_str(r#"{"a": 1}"#).is_err());
    assert!(Value::from_json_str("18446744073709551615").is_err());

    let it = Value::Iterator(IteratorValue::from_array(Type::Any, Arc::new(vec![])));
    assert!(it.to_json_str().is_err());
    Ok(())
}

#[test]
fn objects_serialize_as_maps() -> Result<()> {
    let point = types::ObjectType::with_body(
        Some("Point"),
        types::ObjectBody::new()
            .with_attribute(types::Attribute::new("x", Type::Integer))
            .with_attribute(
                types::Attribute::new("y", Type::Integer).with_value(Value::Integer(0)),
            ),
    )?;
    let p = point.create(&[Value::Integer(3)])?;
    assert_eq!(serde_json::to_string(&p)?, r#"{"x":3,"y":0}"#);
    assert_eq!(p.as_object()?.get("y"), Some(&Value::Integer(0)));
    let names: Vec<&str> = p.as_object()?.attributes().map(|(k, _)| k).collect();
    assert_eq!(names, vec!["x", "y"]);
    Ok(())
}

#[cfg(feature = "yaml")]
#[test]
fn yaml() -> Result<()> {
    let v = Value::from_yaml_str("- 1\n- two\n- ~\n- [3.5]\n")?;
    assert_eq!(
        v,
        Value::from(vec![
            Value::Integer(1),
            Value::from("two"),
            Value::Undef,
            Value::from(vec![Value::Float(3.5)]),
        ])
    );
    Ok(())
}
