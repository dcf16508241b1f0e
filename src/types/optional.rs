// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::guard::Guard;
use crate::types::{single_type_argument, Type};
use crate::{TypeError, Value};

/// `Optional[T]`: `undef` or a value of `T`.
#[derive(Debug)]
pub struct OptionalType {
    typ: Type,
}

lazy_static! {
    static ref DEFAULT: Arc<OptionalType> = Arc::new(OptionalType { typ: Type::Any });
}

impl OptionalType {
    pub fn default_type() -> Type {
        Type::Optional(DEFAULT.clone())
    }

    pub fn new(contained: Type) -> Type {
        if matches!(contained, Type::Any) {
            return Self::default_type();
        }
        Type::Optional(Arc::new(OptionalType { typ: contained }))
    }

    pub fn from_args(args: &[Value]) -> Result<Type, TypeError> {
        Ok(match single_type_argument("Optional[]", "0 - 1", args)? {
            Some(t) => Self::new(t),
            None => Self::default_type(),
        })
    }

    pub fn contained_type(&self) -> &Type {
        &self.typ
    }

    pub(crate) fn equals(&self, other: &OptionalType, g: &mut Guard) -> bool {
        self.typ.equals_with(&other.typ, g)
    }

    pub(crate) fn is_assignable(&self, other: &Type, g: &mut Guard) -> bool {
        match other {
            Type::Undef => true,
            Type::Optional(o) => self.typ.is_assignable_with(&o.typ, g),
            _ => self.typ.is_assignable_with(other, g),
        }
    }

    pub(crate) fn is_instance(&self, value: &Value, g: &mut Guard) -> bool {
        value.is_undef() || self.typ.is_instance_with(value, g)
    }

    pub(crate) fn parameters(&self) -> Vec<Value> {
        match self.typ {
            Type::Any => vec![],
            _ => vec![Value::Type(self.typ.clone())],
        }
    }
}
