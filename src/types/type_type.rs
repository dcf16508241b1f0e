// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::guard::Guard;
use crate::types::{single_type_argument, Type};
use crate::{TypeError, Value};

/// `Type[T]`: the type of type values that are assignable to `T`.
#[derive(Debug)]
pub struct TypeType {
    typ: Type,
}

lazy_static! {
    static ref DEFAULT: Arc<TypeType> = Arc::new(TypeType { typ: Type::Any });
}

impl TypeType {
    pub fn default_type() -> Type {
        Type::Type(DEFAULT.clone())
    }

    pub fn new(contained: Type) -> Type {
        if matches!(contained, Type::Any) {
            return Self::default_type();
        }
        Type::Type(Arc::new(TypeType { typ: contained }))
    }

    /// Builds `Type[...]` from the arguments of a type literal or constructor call.
    pub fn from_args(args: &[Value]) -> Result<Type, TypeError> {
        Ok(match single_type_argument("Type[]", "0 - 1", args)? {
            Some(t) => Self::new(t),
            None => Self::default_type(),
        })
    }

    pub fn contained_type(&self) -> &Type {
        &self.typ
    }

    pub(crate) fn equals(&self, other: &TypeType, g: &mut Guard) -> bool {
        self.typ.equals_with(&other.typ, g)
    }

    pub(crate) fn is_assignable(&self, other: &Type, g: &mut Guard) -> bool {
        match other {
            Type::Type(o) => self.typ.is_assignable_with(&o.typ, g),
            _ => false,
        }
    }

    pub(crate) fn is_instance(&self, value: &Value, g: &mut Guard) -> bool {
        match value {
            Value::Type(t) => self.typ.is_assignable_with(t, g),
            _ => false,
        }
    }

    pub(crate) fn parameters(&self) -> Vec<Value> {
        match self.typ {
            Type::Any => vec![],
            _ => vec![Value::Type(self.typ.clone())],
        }
    }
}
