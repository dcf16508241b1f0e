// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::Result;

use crate::iterator::{Flow, IteratorValue, Step, ValueIterator};
use crate::types::Type;
use crate::Value;

/// Filters a base iterator, keeping the elements whose predicate outcome equals `keep`.
pub struct PredicateIterator<P> {
    base: IteratorValue,
    predicate: P,
    keep: bool,
}

impl<P> PredicateIterator<P>
where
    P: FnMut(&Value) -> Result<Flow<bool>> + Send,
{
    pub fn new(base: IteratorValue, predicate: P, keep: bool) -> Self {
        PredicateIterator {
            base,
            predicate,
            keep,
        }
    }
}

impl<P> ValueIterator for PredicateIterator<P>
where
    P: FnMut(&Value) -> Result<Flow<bool>> + Send,
{
    fn next(&mut self) -> Result<Step> {
        loop {
            match self.base.next()? {
                Step::Value(v) => match (self.predicate)(&v)? {
                    Flow::Continue(outcome) if outcome == self.keep => return Ok(Step::Value(v)),
                    Flow::Continue(_) => continue,
                    Flow::Stop => return Ok(Step::Stop),
                },
                step => return Ok(step),
            }
        }
    }

    fn element_type(&self) -> Type {
        self.base.element_type().clone()
    }
}
