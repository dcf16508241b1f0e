// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::Value;
use std::sync::Arc;
use thiserror::Error;

type String = Arc<str>;

/// Errors raised while constructing, resolving or registering types.
///
/// Comparisons (`equals`, `is_assignable`, `is_instance`) never produce these; they always
/// resolve to a boolean.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// A constructor received a value of the wrong kind.
    #[error("{function}: parameter {index} expects a {expected} value, got {actual}")]
    IllegalArgumentType {
        function: String,
        index: usize,
        expected: String,
        actual: String,
    },
    /// A constructor received the wrong number of arguments.
    #[error("{function}: expects {expected} arguments, got {actual}")]
    IllegalArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },
    #[error("syntax error at position {position}: {message}")]
    Parse { position: usize, message: String },
    #[error("reference to unresolved type '{0}'")]
    UnresolvedReference(String),
    #[error("type '{0}' has already been resolved")]
    AlreadyResolved(String),
    #[error("type '{name}' cannot have '{parent}' as parent, it is not an Object type")]
    InvalidParent { name: String, parent: String },
    #[error("type '{0}' inherits from itself")]
    CircularInheritance(String),
    #[error("attribute '{attribute}' of type '{name}' cannot default to {value}")]
    InvalidDefault {
        name: String,
        attribute: String,
        value: String,
    },
    #[error("creation of new instance of type '{0}' is not supported")]
    NotConstructible(String),
    #[error("expected a value of type {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
    #[error("a type named '{0}' is already registered")]
    AlreadyExists(String),
    #[error("the name '{0}' is invalid (empty or whitespace-only names are not allowed)")]
    InvalidName(String),
}

impl TypeError {
    pub(crate) fn illegal_argument_type(
        function: &str,
        index: usize,
        expected: &str,
        actual: &Value,
    ) -> Self {
        TypeError::IllegalArgumentType {
            function: function.into(),
            index,
            expected: expected.into(),
            actual: actual.type_of().to_string().into(),
        }
    }

    pub(crate) fn illegal_argument_count(function: &str, expected: &str, actual: usize) -> Self {
        TypeError::IllegalArgumentCount {
            function: function.into(),
            expected: expected.into(),
            actual,
        }
    }

    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        TypeError::Parse {
            position,
            message: message.into(),
        }
    }
}
