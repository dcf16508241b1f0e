// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::guard::Guard;
use crate::types::{single_type_argument, Type};
use crate::{TypeError, Value};

/// `Array[T]`: arrays whose elements are all instances of `T`.
#[derive(Debug)]
pub struct ArrayType {
    typ: Type,
}

lazy_static! {
    static ref DEFAULT: Arc<ArrayType> = Arc::new(ArrayType { typ: Type::Any });
}

impl ArrayType {
    pub fn default_type() -> Type {
        Type::Array(DEFAULT.clone())
    }

    pub fn new(element_type: Type) -> Type {
        if matches!(element_type, Type::Any) {
            return Self::default_type();
        }
        Type::Array(Arc::new(ArrayType { typ: element_type }))
    }

    pub fn from_args(args: &[Value]) -> Result<Type, TypeError> {
        Ok(match single_type_argument("Array[]", "0 - 1", args)? {
            Some(t) => Self::new(t),
            None => Self::default_type(),
        })
    }

    pub fn element_type(&self) -> &Type {
        &self.typ
    }

    pub(crate) fn equals(&self, other: &ArrayType, g: &mut Guard) -> bool {
        self.typ.equals_with(&other.typ, g)
    }

    pub(crate) fn is_assignable(&self, other: &Type, g: &mut Guard) -> bool {
        match other {
            Type::Array(o) => self.typ.is_assignable_with(&o.typ, g),
            _ => false,
        }
    }

    pub(crate) fn is_instance(&self, value: &Value, g: &mut Guard) -> bool {
        match value {
            Value::Array(items) => items.iter().all(|v| self.typ.is_instance_with(v, g)),
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
