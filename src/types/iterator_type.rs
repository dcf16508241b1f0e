// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::guard::Guard;
use crate::types::{single_type_argument, Type};
use crate::{TypeError, Value};

/// `Iterator[T]`: iterator values whose declared element type is assignable to `T`.
#[derive(Debug)]
pub struct IteratorType {
    typ: Type,
}

lazy_static! {
    static ref DEFAULT: Arc<IteratorType> = Arc::new(IteratorType { typ: Type::Any });
}

impl IteratorType {
    pub fn default_type() -> Type {
        Type::Iterator(DEFAULT.clone())
    }

    pub fn new(element_type: Type) -> Type {
        if matches!(element_type, Type::Any) {
            return Self::default_type();
        }
        Type::Iterator(Arc::new(IteratorType { typ: element_type }))
    }

    pub fn from_args(args: &[Value]) -> Result<Type, TypeError> {
        Ok(match single_type_argument("Iterator[]", "0 - 1", args)? {
            Some(t) => Self::new(t),
            None => Self::default_type(),
        })
    }

    pub fn element_type(&self) -> &Type {
        &self.typ
    }

    pub(crate) fn equals(&self, other: &IteratorType, g: &mut Guard) -> bool {
        self.typ.equals_with(&other.typ, g)
    }

    pub(crate) fn is_assignable(&self, other: &Type, g: &mut Guard) -> bool {
        match other {
            Type::Iterator(o) => self.typ.is_assignable_with(&o.typ, g),
            _ => false,
        }
    }

    // The element type is the one declared when the iterator was made; produced values are
    // never inspected.
    pub(crate) fn is_instance(&self, value: &Value, g: &mut Guard) -> bool {
        match value {
            Value::Iterator(it) => self.typ.is_assignable_with(it.element_type(), g),
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
