// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use std::sync::Arc;

use anyhow::{bail, Result};
use pcore::decl::TypeSetDecl;
use pcore::loader::TypeRegistry;
use pcore::types::*;
use pcore::*;

const SHAPES: &str = r#"
name: Shapes
version: 1.0.0
types:
  Shape:
    attributes:
      name: { type: String, value: shape }
  Circle:
    parent: Shape
    attributes:
      radius: Numeric
"#;

const GRAPH: &str = r#"
name: Graph
types:
  Node:
    attributes:
      next: Optional[Node]
      edges: Array[Edge]
  Edge:
    attributes:
      from: Node
      to: Graph::Node
"#;

fn load(registry: &TypeRegistry, yaml: &str) -> Result<Arc<TypeSet>> {
    Ok(registry.register_type_set(&TypeSetDecl::from_yaml_str(yaml)?)?)
}

fn object(registry: &TypeRegistry, name: &str) -> Result<Arc<ObjectType>> {
    match registry.get(name) {
        Some(Type::Object(o)) => Ok(o),
        other => bail!("{name} is not an object type: {other:?}"),
    }
}

fn type_error(err: &anyhow::Error) -> Option<&TypeError> {
    err.downcast_ref::<TypeError>()
}

#[test]
fn recursive_sets_compare_structurally() -> Result<()> {
    crate::init_test_logging();
    let (a, b) = (TypeRegistry::new(), TypeRegistry::new());
    load(&a, GRAPH)?;
    load(&b, GRAPH)?;

    let (node_a, node_b) = (object(&a, "Graph::Node")?, object(&b, "Graph::Node")?);
    assert!(!Arc::ptr_eq(&node_a, &node_b));
    let (node_a, node_b) = (Type::Object(node_a), Type::Object(node_b));
    assert!(node_a.equals(&node_b));
    assert!(node_b.is_assignable(&node_a));

    let edge_a = Type::Object(object(&a, "Graph::Edge")?);
    assert!(!node_a.equals(&edge_a));
    assert!(!node_a.is_assignable(&edge_a));

    assert_eq!(node_a.get("parent"), Some(Value::Undef));
    assert_eq!(node_a.get("name"), Some(Value::from("Graph::Node")));
    Ok(())
}

#[test]
fn members_refer_to_each_other() -> Result<()> {
    let registry = TypeRegistry::new();
    let graph = load(&registry, GRAPH)?;
    assert_eq!(graph.len(), 2);
    assert!(graph.get("Node").is_some());
    assert!(graph.get("Graph::Edge").is_some());
    assert!(graph.get("Other::Edge").is_none());

    let node = object(&registry, "Graph::Node")?;
    let edge = object(&registry, "Graph::Edge")?;
    let next = node.attribute("next").map(|a| a.attribute_type().to_string());
    assert_eq!(next.as_deref(), Some("Optional[Graph::Node]"));
    let to = edge.attribute("to").map(|a| a.attribute_type().clone());
    assert!(matches!(to, Some(Type::Object(t)) if Arc::ptr_eq(&t, &node)));

    let leaf = node.create(&[Value::Undef, Value::from(Vec::<Value>::new())])?;
    let root = node.create(&[leaf.clone(), Value::from(Vec::<Value>::new())])?;
    assert!(Type::Object(node.clone()).is_instance(&root));
    assert_eq!(root.as_object()?.get("next"), Some(&leaf));

    let link = edge.create(&[root.clone(), leaf])?;
    assert!(Type::Object(edge).is_instance(&link));
    assert!(!Type::Object(node).is_instance(&link));
    Ok(())
}

#[test]
fn create_uses_attribute_defaults() -> Result<()> {
    let registry = TypeRegistry::new();
    load(&registry, SHAPES)?;
    let shape = object(&registry, "Shapes::Shape")?;
    let circle = object(&registry, "Shapes::Circle")?;

    let plain = shape.create(&[])?;
    assert_eq!(plain.to_string(), "Shapes::Shape({'name' => 'shape'})");

    let c = circle.create(&[Value::from("c"), Value::Integer(2)])?;
    assert_eq!(c.to_string(), "Shapes::Circle({'name' => 'c', 'radius' => 2})");
    assert!(Type::Object(shape.clone()).is_instance(&c));
    assert!(ObjectType::default_type().is_instance(&c));
    assert!(!Type::Object(circle.clone()).is_instance(&plain));
    assert_eq!(c.type_of().to_string(), "Shapes::Circle");
    Ok(())
}

#[test]
fn create_checks_arguments() -> Result<()> {
    let registry = TypeRegistry::new();
    load(&registry, SHAPES)?;
    let shape = object(&registry, "Shapes::Shape")?;
    let circle = object(&registry, "Shapes::Circle")?;

    let err = circle.create(&[]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Shapes::Circle.new: expects 2 arguments, got 0"
    );

    let err = shape
        .create(&[Value::from("a"), Value::from("b")])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Shapes::Shape.new: expects 0 - 1 arguments, got 2"
    );

    let err = circle
        .create(&[Value::from("c"), Value::from("big")])
        .unwrap_err();
    assert_eq!(
        type_error(&err),
        Some(&TypeError::IllegalArgumentType {
            function: "Shapes::Circle.new".into(),
            index: 1,
            expected: "Numeric".into(),
            actual: "String".into(),
        })
    );
    Ok(())
}

#[test]
fn attributes_are_inherited() -> Result<()> {
    let registry = TypeRegistry::new();
    load(&registry, SHAPES)?;
    let circle = object(&registry, "Shapes::Circle")?;

    assert_eq!(circle.attributes().count(), 1);
    let names: Vec<_> = circle.all_attributes().iter().map(|a| a.name().to_string()).collect();
    assert_eq!(names, vec!["name", "radius"]);
    let inherited = circle.attribute("name");
    assert_eq!(inherited.and_then(|a| a.value()), Some(&Value::from("shape")));
    assert!(circle.attribute("side").is_none());
    assert_eq!(
        Type::Object(circle).get("parent"),
        registry.get("Shapes::Shape").map(Value::Type)
    );
    Ok(())
}

#[test]
fn inheritance_cycles_are_rejected() -> Result<()> {
    let registry = TypeRegistry::new();
    let decl = TypeSetDecl::from_yaml_str(
        r#"
name: Cycle
types:
  A: { parent: B }
  B: { parent: A }
"#,
    )?;
    assert_eq!(
        registry.register_type_set(&decl).unwrap_err(),
        TypeError::CircularInheritance("Cycle::B".into())
    );
    assert!(registry.is_empty());

    let decl = TypeSetDecl::from_yaml_str("{name: Own, types: {A: {parent: A}}}")?;
    assert_eq!(
        registry.register_type_set(&decl).unwrap_err(),
        TypeError::CircularInheritance("Own::A".into())
    );

    let a = ObjectType::new(Some("A"));
    let b = ObjectType::with_body(
        Some("B"),
        ObjectBody::new().with_parent(Type::Object(a.clone())),
    )?;
    let err = a
        .resolve(ObjectBody::new().with_parent(Type::Object(b)))
        .unwrap_err();
    assert_eq!(err, TypeError::CircularInheritance("A".into()));
    assert!(!a.is_resolved());
    Ok(())
}

#[test]
fn types_resolve_once() -> Result<()> {
    let t = ObjectType::with_body(
        Some("Point"),
        ObjectBody::new().with_attribute(Attribute::new("x", Type::Integer)),
    )?;
    assert!(t.is_resolved());
    let err = t.resolve(ObjectBody::new()).unwrap_err();
    assert_eq!(err, TypeError::AlreadyResolved("Point".into()));
    assert_eq!(t.attributes().count(), 1);

    let err = ObjectType::with_body(None, ObjectBody::new().with_parent(Type::String)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "type 'Object' cannot have 'String' as parent, it is not an Object type"
    );
    Ok(())
}

#[test]
fn declared_constructors_take_precedence() -> Result<()> {
    let t = ObjectType::with_body(
        Some("Celsius"),
        ObjectBody::new()
            .with_attribute(Attribute::new("degrees", Type::Float))
            .with_constructor(Constructor::new(|args| match args {
                [Value::Integer(i)] => Ok(Value::Float(*i as f64)),
                _ => Ok(Value::Undef),
            })),
    )?;
    assert!(t.constructor().is_some());
    assert_eq!(t.create(&[Value::Integer(21)])?, Value::Float(21.0));
    Ok(())
}

#[test]
fn unresolved_names_are_reported() -> Result<()> {
    let registry = TypeRegistry::new();
    let decl = TypeSetDecl::from_yaml_str("{name: Broken, types: {A: {attributes: {b: Missing}}}}")?;
    assert_eq!(
        registry.register_type_set(&decl).unwrap_err(),
        TypeError::UnresolvedReference("Missing".into())
    );
    Ok(())
}

#[test]
fn registry_names() -> Result<()> {
    let registry = TypeRegistry::new();
    load(&registry, SHAPES)?;
    let mut names = registry.list_names();
    names.sort();
    let names: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
    assert_eq!(names, vec!["Shapes", "Shapes::Circle", "Shapes::Shape"]);

    assert_eq!(
        load(&registry, SHAPES).unwrap_err().downcast_ref::<TypeError>(),
        Some(&TypeError::AlreadyExists("Shapes::Shape".into()))
    );
    // A set that collides with a builtin leaves the registry untouched.
    let meta = TypeSetDecl::from_yaml_str("{name: Pcore, types: {IteratorType: {}}}")?;
    assert_eq!(
        registry.register_type_set(&meta).unwrap_err(),
        TypeError::AlreadyExists("Pcore::IteratorType".into())
    );
    assert!(!registry.contains("Pcore"));
    assert_eq!(registry.len(), 3);

    assert_eq!(
        registry.register("Integer", Type::Float),
        Err(TypeError::AlreadyExists("Integer".into()))
    );
    assert_eq!(
        registry.register("Pcore::AnyType", Type::Float),
        Err(TypeError::AlreadyExists("Pcore::AnyType".into()))
    );
    assert_eq!(
        registry.register("  ", Type::Float),
        Err(TypeError::InvalidName("  ".into()))
    );

    registry.register("Celsius", Type::Float)?;
    assert!(registry.contains("Celsius"));
    assert!(registry.remove("Celsius").is_some());
    assert!(!registry.contains("Celsius"));
    registry.clear();
    assert!(registry.is_empty());
    Ok(())
}

#[test]
fn inline_objects_inherit_from_registered_types() -> Result<()> {
    let registry = TypeRegistry::new();
    load(&registry, SHAPES)?;
    let shape = parse_type("Shapes::Shape", &registry)?;
    let labelled = parse_type(
        "Object[{parent => Shapes::Shape, attributes => {'label' => String}}]",
        &registry,
    )?;
    assert!(shape.is_assignable(&labelled));
    assert!(!labelled.is_assignable(&shape));
    assert!(ObjectType::default_type().is_assignable(&labelled));

    let Type::Object(inline) = &labelled else {
        bail!("expected an object type");
    };
    assert_eq!(inline.name(), None);
    let value = inline.create(&[Value::from("s"), Value::from("l")])?;
    assert_eq!(value.to_string(), "Object({'name' => 's', 'label' => 'l'})");
    assert!(shape.is_instance(&value));
    Ok(())
}

#[test]
fn defaults_must_be_finite() -> Result<()> {
    let body = ObjectBody::new()
        .with_attribute(Attribute::new("x", Type::Float).with_value(Value::Float(f64::INFINITY)));
    let err = ObjectType::with_body(Some("Point"), body).unwrap_err();
    assert_eq!(err.to_string(), "attribute 'x' of type 'Point' cannot default to inf");

    let nested = Value::from(vec![Value::Float(1.0), Value::Float(f64::NAN)]);
    let body = ObjectBody::new()
        .with_attribute(Attribute::new("xs", ArrayType::new(Type::Float)).with_value(nested));
    assert!(matches!(
        ObjectType::with_body(None, body),
        Err(TypeError::InvalidDefault { .. })
    ));
    Ok(())
}

#[test]
fn empty_anonymous_objects_are_the_default() -> Result<()> {
    let registry = TypeRegistry::new();
    load(&registry, SHAPES)?;
    let empty = parse_type("Object[{attributes => {}}]", &registry)?;
    assert!(empty.ptr_eq(&ObjectType::default_type()));
    assert_eq!(empty.to_string(), "Object");

    let Type::Object(direct) = ObjectType::default_type() else {
        bail!("expected an object type");
    };
    let unnamed = ObjectType::new(None);
    unnamed.resolve(ObjectBody::new())?;
    assert!(unnamed.is_default());
    assert!(direct.is_default());
    let shape = parse_type("Shapes::Shape", &registry)?;
    assert!(Type::Object(unnamed).is_assignable(&shape));

    let circle = object(&registry, "Shapes::Circle")?;
    let circle = circle.create(&[Value::from("c"), Value::Integer(1)])?;
    assert!(empty.is_instance(&circle));
    assert!(!empty.is_instance(&Value::Type(shape)));
    Ok(())
}
