// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use pcore::decl::TypeExpr;
use pcore::loader::Builtins;
use pcore::*;

#[test]
fn canonical_text_round_trips() -> Result<()> {
    for text in [
        "Any",
        "Integer",
        "Optional[Integer]",
        "Array[Optional[String]]",
        "Iterator[Type[Numeric]]",
        "Object",
        "TypeSet",
        "Pcore::IteratorType",
        "Object[{attributes => {'x' => Integer}}]",
        "Object[{parent => Pcore::AnyType, attributes => {'a' => {type => Array[Integer], value => [1, 2]}}}]",
        "Object[{attributes => {'s' => {type => String, value => 'it\\'s'}, 'f' => {type => Float, value => 1.5}}}]",
        "Object[{attributes => {'it\\'s' => Integer, 'a\\\\b' => String}}]",
    ] {
        let t = parse_type(text, &Builtins)?;
        assert_eq!(t.to_string(), text);
        assert!(parse_type(&t.to_string(), &Builtins)?.equals(&t), "{text}");
    }
    Ok(())
}

#[test]
fn non_canonical_text() -> Result<()> {
    for (text, canonical) in [
        (" Array [ Integer ] ", "Array[Integer]"),
        ("Array[Integer,]", "Array[Integer]"),
        ("Array[Any]", "Array"),
        ("Iterator[]", "Iterator"),
        ("Integer[]", "Integer"),
        ("Object[]", "Object"),
        ("Type[Iterator[Any]]", "Type[Iterator]"),
        (
            "Object[{attributes => {x => {type => Integer, value => undef}}}]",
            "Object[{attributes => {'x' => {type => Integer, value => undef}}}]",
        ),
    ] {
        assert_eq!(parse_type(text, &Builtins)?.to_string(), canonical, "{text}");
    }
    Ok(())
}

#[test]
fn expressions_keep_names_unresolved() -> Result<()> {
    let expr = parse_type_expr("Array[Graph::Node]")?;
    let TypeExpr::Named { name, params } = expr else {
        anyhow::bail!("expected a named expression");
    };
    assert_eq!(name.as_ref(), "Array");
    assert!(matches!(
        params.as_slice(),
        [TypeExpr::Named { name, params }] if name.as_ref() == "Graph::Node" && params.is_empty()
    ));

    assert_eq!(
        parse_type("Array[Graph::Node]", &Builtins).unwrap_err(),
        TypeError::UnresolvedReference("Graph::Node".into())
    );
    Ok(())
}

#[test]
fn errors() -> Result<()> {
    for (text, message) in [
        ("", "syntax error at position 0: expecting a type name"),
        ("Array[", "syntax error at position 6: expecting a type name"),
        ("Integer Float", "syntax error at position 8: unexpected trailing input"),
        (
            "Object[{colour => Integer}]",
            "syntax error at position 8: unknown object type key 'colour'",
        ),
        (
            "Object[{attributes => {'x' => {type => Float, value => 1e999}}}]",
            "syntax error at position 55: number out of range",
        ),
        ("Whatever", "reference to unresolved type 'Whatever'"),
        ("Object[Integer]", "Object[]: expects 0 arguments, got 1"),
        (
            "Iterator[Integer, String]",
            "Iterator[]: expects 0 - 1 arguments, got 2",
        ),
    ] {
        let err = parse_type(text, &Builtins).unwrap_err();
        assert_eq!(err.to_string(), message, "{text}");
    }
    Ok(())
}
