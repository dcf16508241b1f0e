// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Lazy, pull-based sequences of values.
//!
//! An iterator is pulled one element at a time through [`ValueIterator::next`]. Combinators
//! (`map`, `select`, `reject`) wrap an iterator without consuming it; nothing is computed until a
//! driver in [`algorithms`] pulls.
//!
//! Callbacks may end an iteration early by returning [`Flow::Stop`]. The request travels up the
//! chain as [`Step::Stop`] and is resolved by the driver that started the pull. Errors raised by
//! callbacks propagate through `?` untouched.

use core::fmt;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;

use crate::types::Type;
use crate::Value;

pub mod algorithms;
mod indexed;
mod mapping;
mod predicate;

pub use indexed::IndexedIterator;
pub use mapping::MappingIterator;
pub use predicate::PredicateIterator;

/// Outcome of pulling one element.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Value(Value),
    /// The iterator is exhausted. Every later pull reports `Done` again.
    Done,
    /// A callback in the chain asked to end the iteration.
    Stop,
}

/// Outcome of a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow<T> {
    Continue(T),
    Stop,
}

pub trait ValueIterator: Send {
    fn next(&mut self) -> Result<Step>;

    /// The element type declared when the iterator was created.
    fn element_type(&self) -> Type;

    /// Collects the remaining elements.
    fn as_array(&mut self) -> Result<Arc<Vec<Value>>> {
        algorithms::as_array(self)
    }
}

/// An iterator as a first-class value.
///
/// Clones share the underlying cursor. The lock only makes the value `Send + Sync`; an iterator
/// must still be advanced by one consumer at a time.
#[derive(Clone)]
pub struct IteratorValue(Arc<IteratorCell>);

struct IteratorCell {
    element_type: Type,
    inner: Mutex<Box<dyn ValueIterator>>,
}

impl IteratorValue {
    pub fn new<I: ValueIterator + 'static>(iterator: I) -> Self {
        IteratorValue(Arc::new(IteratorCell {
            element_type: iterator.element_type(),
            inner: Mutex::new(Box::new(iterator)),
        }))
    }

    /// Iterates the elements of a shared array.
    pub fn from_array(element_type: Type, elements: Arc<Vec<Value>>) -> Self {
        Self::new(IndexedIterator::new(element_type, elements))
    }

    pub fn element_type(&self) -> &Type {
        &self.0.element_type
    }

    pub fn ptr_eq(&self, other: &IteratorValue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Applies `transform` to every element as it is pulled. The result is declared to produce
    /// elements of `element_type`.
    pub fn map<F>(&self, element_type: Type, transform: F) -> IteratorValue
    where
        F: FnMut(Value) -> Result<Flow<Value>> + Send + 'static,
    {
        Self::new(MappingIterator::new(self.clone(), element_type, transform))
    }

    /// Keeps the elements matching `predicate`.
    pub fn select<P>(&self, predicate: P) -> IteratorValue
    where
        P: FnMut(&Value) -> Result<Flow<bool>> + Send + 'static,
    {
        Self::new(PredicateIterator::new(self.clone(), predicate, true))
    }

    /// Keeps the elements not matching `predicate`.
    pub fn reject<P>(&self, predicate: P) -> IteratorValue
    where
        P: FnMut(&Value) -> Result<Flow<bool>> + Send + 'static,
    {
        Self::new(PredicateIterator::new(self.clone(), predicate, false))
    }

    pub fn each<F>(&self, consumer: F) -> Result<()>
    where
        F: FnMut(Value) -> Result<Flow<()>>,
    {
        algorithms::each(&mut self.clone(), consumer)
    }

    /// Like `each`, with the zero-based index passed first.
    pub fn each_with_index<F>(&self, consumer: F) -> Result<()>
    where
        F: FnMut(Value, Value) -> Result<Flow<()>>,
    {
        algorithms::each_with_index(&mut self.clone(), consumer)
    }

    pub fn find<P>(&self, predicate: P) -> Result<Value>
    where
        P: FnMut(&Value) -> Result<Flow<bool>>,
    {
        algorithms::find(&mut self.clone(), predicate)
    }

    pub fn find2<P>(&self, predicate: P, default: Value) -> Result<Value>
    where
        P: FnMut(&Value) -> Result<Flow<bool>>,
    {
        algorithms::find2(&mut self.clone(), predicate, default)
    }

    pub fn find3<P, D>(&self, predicate: P, default: D) -> Result<Value>
    where
        P: FnMut(&Value) -> Result<Flow<bool>>,
        D: FnOnce() -> Result<Value>,
    {
        algorithms::find3(&mut self.clone(), predicate, default)
    }

    pub fn reduce<F>(&self, reducer: F) -> Result<Value>
    where
        F: FnMut(Value, Value) -> Result<Flow<Value>>,
    {
        algorithms::reduce(&mut self.clone(), reducer)
    }

    pub fn reduce2<F>(&self, seed: Value, reducer: F) -> Result<Value>
    where
        F: FnMut(Value, Value) -> Result<Flow<Value>>,
    {
        algorithms::reduce2(&mut self.clone(), seed, reducer)
    }

    pub fn all<P>(&self, predicate: P) -> Result<bool>
    where
        P: FnMut(&Value) -> Result<Flow<bool>>,
    {
        algorithms::all(&mut self.clone(), predicate)
    }

    pub fn any<P>(&self, predicate: P) -> Result<bool>
    where
        P: FnMut(&Value) -> Result<Flow<bool>>,
    {
        algorithms::any(&mut self.clone(), predicate)
    }

    /// Collects the remaining elements, materializing nested iterators.
    pub fn as_array(&self) -> Result<Arc<Vec<Value>>> {
        self.0.inner.lock().as_array()
    }
}

impl ValueIterator for IteratorValue {
    fn next(&mut self) -> Result<Step> {
        self.0.inner.lock().next()
    }

    fn element_type(&self) -> Type {
        self.0.element_type.clone()
    }

    fn as_array(&mut self) -> Result<Arc<Vec<Value>>> {
        IteratorValue::as_array(self)
    }
}

impl fmt::Debug for IteratorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Iterator(self.clone()))
    }
}
