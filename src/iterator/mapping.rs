// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::Result;

use crate::iterator::{Flow, IteratorValue, Step, ValueIterator};
use crate::types::Type;
use crate::Value;

/// Transforms the elements of a base iterator as they are pulled.
pub struct MappingIterator<F> {
    base: IteratorValue,
    element_type: Type,
    transform: F,
}

impl<F> MappingIterator<F>
where
    F: FnMut(Value) -> Result<Flow<Value>> + Send,
{
    pub fn new(base: IteratorValue, element_type: Type, transform: F) -> Self {
        MappingIterator {
            base,
            element_type,
            transform,
        }
    }
}

impl<F> ValueIterator for MappingIterator<F>
where
    F: FnMut(Value) -> Result<Flow<Value>> + Send,
{
    fn next(&mut self) -> Result<Step> {
        Ok(match self.base.next()? {
            Step::Value(v) => match (self.transform)(v)? {
                Flow::Continue(mapped) => Step::Value(mapped),
                Flow::Stop => Step::Stop,
            },
            step => step,
        })
    }

    fn element_type(&self) -> Type {
        self.element_type.clone()
    }
}
