// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::pattern_type_mismatch)]

use std::sync::Arc;

use anyhow::Result;

use crate::meta::meta_type;
use crate::types::Type;
use crate::{TypeError, Value};

/// Creates a new instance of `target`, the `new` function of the language.
///
/// Declared object types use their constructor or the positional attribute initializer.
/// `Type[X]` values are built by the meta type of `X`. Scalars, arrays and iterators convert
/// their single argument. The result must be an instance of `target`.
pub fn new_value(target: &Type, args: &[Value]) -> Result<Value> {
    let value = match target {
        Type::Object(o) if !o.is_default() => o.create(args)?,
        Type::Type(t) => match t.contained_type() {
            Type::Any => meta_type("TypeType").create(args)?,
            contained => contained.meta_type().create(args)?,
        },
        Type::Optional(o) => match args {
            [] | [Value::Undef] => Value::Undef,
            _ => new_value(o.contained_type(), args)?,
        },
        Type::Integer => Value::Integer(to_integer(single("Integer", args)?)?),
        Type::Float => Value::Float(to_float(single("Float", args)?)?),
        Type::Numeric => to_numeric(single("Numeric", args)?)?,
        Type::String => to_string(single("String", args)?),
        Type::Boolean => Value::Bool(to_boolean(single("Boolean", args)?)?),
        Type::Array(_) => {
            let arg = single("Array", args)?;
            match arg.iterator() {
                Some(it) => Value::Array(it.as_array()?),
                None => Value::from(vec![arg.clone()]),
            }
        }
        Type::Iterator(_) => {
            let arg = single("Iterator", args)?;
            match arg.iterator() {
                Some(it) => Value::Iterator(it),
                None => {
                    return Err(
                        TypeError::illegal_argument_type("Iterator.new", 0, "Iterable", arg).into(),
                    )
                }
            }
        }
        _ => return Err(TypeError::NotConstructible(target.to_string().into()).into()),
    };

    if !target.is_instance(&value) {
        return Err(TypeError::TypeMismatch {
            expected: target.to_string().into(),
            actual: value.type_of().to_string().into(),
        }
        .into());
    }
    Ok(value)
}

fn single<'a>(name: &str, args: &'a [Value]) -> Result<&'a Value, TypeError> {
    match args {
        [arg] => Ok(arg),
        _ => Err(TypeError::illegal_argument_count(
            &format!("{name}.new"),
            "1",
            args.len(),
        )),
    }
}

fn to_integer(arg: &Value) -> Result<i64, TypeError> {
    match arg {
        Value::Integer(i) => Ok(*i),
        Value::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| {
            TypeError::illegal_argument_type("Integer.new", 0, "Integer string", arg)
        }),
        _ => Err(TypeError::illegal_argument_type(
            "Integer.new",
            0,
            "Convertible to Integer",
            arg,
        )),
    }
}

fn to_float(arg: &Value) -> Result<f64, TypeError> {
    match arg {
        Value::Float(f) => Ok(*f),
        Value::Integer(i) => Ok(*i as f64),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| TypeError::illegal_argument_type("Float.new", 0, "Float string", arg)),
        _ => Err(TypeError::illegal_argument_type(
            "Float.new",
            0,
            "Convertible to Float",
            arg,
        )),
    }
}

fn to_numeric(arg: &Value) -> Result<Value, TypeError> {
    match arg {
        Value::Integer(_) | Value::Float(_) => Ok(arg.clone()),
        Value::Bool(b) => Ok(Value::Integer(i64::from(*b))),
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => Ok(Value::Integer(i)),
            Err(_) => to_float(arg).map(Value::Float).map_err(|_| {
                TypeError::illegal_argument_type("Numeric.new", 0, "Numeric string", arg)
            }),
        },
        _ => Err(TypeError::illegal_argument_type(
            "Numeric.new",
            0,
            "Convertible to Numeric",
            arg,
        )),
    }
}

fn to_string(arg: &Value) -> Value {
    match arg {
        Value::String(_) => arg.clone(),
        _ => Value::String(Arc::from(arg.to_string())),
    }
}

fn to_boolean(arg: &Value) -> Result<bool, TypeError> {
    match arg {
        Value::Bool(b) => Ok(*b),
        Value::Integer(i) => Ok(*i != 0),
        Value::Float(f) => Ok(*f != 0.0),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" => Ok(true),
            "false" | "no" | "n" | "" => Ok(false),
            _ => Err(TypeError::illegal_argument_type(
                "Boolean.new",
                0,
                "Boolean string",
                arg,
            )),
        },
        _ => Err(TypeError::illegal_argument_type(
            "Boolean.new",
            0,
            "Convertible to Boolean",
            arg,
        )),
    }
}
