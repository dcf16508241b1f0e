// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Drivers that pull from an iterator until it is exhausted or asked to stop.
//!
//! These are the only places where [`Step::Stop`] and [`Flow::Stop`] are interpreted. A stop
//! ends the loop and the driver returns the result it has so far; errors are returned as is.

use std::sync::Arc;

use anyhow::Result;
use tracing::trace;

use crate::iterator::{Flow, Step, ValueIterator};
use crate::Value;

fn stopped(driver: &str) {
    trace!("{driver}: iteration stopped early");
}

pub fn each<I, F>(iter: &mut I, mut consumer: F) -> Result<()>
where
    I: ValueIterator + ?Sized,
    F: FnMut(Value) -> Result<Flow<()>>,
{
    loop {
        match iter.next()? {
            Step::Value(v) => {
                if let Flow::Stop = consumer(v)? {
                    stopped("each");
                    break;
                }
            }
            Step::Done => break,
            Step::Stop => {
                stopped("each");
                break;
            }
        }
    }
    Ok(())
}

pub fn each_with_index<I, F>(iter: &mut I, mut consumer: F) -> Result<()>
where
    I: ValueIterator + ?Sized,
    F: FnMut(Value, Value) -> Result<Flow<()>>,
{
    let mut idx: i64 = 0;
    each(iter, |v| {
        let flow = consumer(Value::Integer(idx), v);
        idx += 1;
        flow
    })
}

fn find_or<I, P, D>(iter: &mut I, mut predicate: P, default: D) -> Result<Value>
where
    I: ValueIterator + ?Sized,
    P: FnMut(&Value) -> Result<Flow<bool>>,
    D: FnOnce() -> Result<Value>,
{
    loop {
        match iter.next()? {
            Step::Value(v) => match predicate(&v)? {
                Flow::Continue(true) => return Ok(v),
                Flow::Continue(false) => {}
                Flow::Stop => {
                    stopped("find");
                    break;
                }
            },
            Step::Done => break,
            Step::Stop => {
                stopped("find");
                break;
            }
        }
    }
    default()
}

/// The first element matching `predicate`, or `undef`.
pub fn find<I, P>(iter: &mut I, predicate: P) -> Result<Value>
where
    I: ValueIterator + ?Sized,
    P: FnMut(&Value) -> Result<Flow<bool>>,
{
    find_or(iter, predicate, || Ok(Value::Undef))
}

pub fn find2<I, P>(iter: &mut I, predicate: P, default: Value) -> Result<Value>
where
    I: ValueIterator + ?Sized,
    P: FnMut(&Value) -> Result<Flow<bool>>,
{
    find_or(iter, predicate, || Ok(default))
}

/// Like `find2`, with the default produced only when nothing matched.
pub fn find3<I, P, D>(iter: &mut I, predicate: P, default: D) -> Result<Value>
where
    I: ValueIterator + ?Sized,
    P: FnMut(&Value) -> Result<Flow<bool>>,
    D: FnOnce() -> Result<Value>,
{
    find_or(iter, predicate, default)
}

pub fn all<I, P>(iter: &mut I, mut predicate: P) -> Result<bool>
where
    I: ValueIterator + ?Sized,
    P: FnMut(&Value) -> Result<Flow<bool>>,
{
    loop {
        match iter.next()? {
            Step::Value(v) => match predicate(&v)? {
                Flow::Continue(true) => {}
                Flow::Continue(false) => return Ok(false),
                Flow::Stop => {
                    stopped("all");
                    break;
                }
            },
            Step::Done => break,
            Step::Stop => {
                stopped("all");
                break;
            }
        }
    }
    Ok(true)
}

pub fn any<I, P>(iter: &mut I, mut predicate: P) -> Result<bool>
where
    I: ValueIterator + ?Sized,
    P: FnMut(&Value) -> Result<Flow<bool>>,
{
    loop {
        match iter.next()? {
            Step::Value(v) => match predicate(&v)? {
                Flow::Continue(true) => return Ok(true),
                Flow::Continue(false) => {}
                Flow::Stop => {
                    stopped("any");
                    break;
                }
            },
            Step::Done => break,
            Step::Stop => {
                stopped("any");
                break;
            }
        }
    }
    Ok(false)
}

/// Folds the elements into `seed`.
pub fn reduce2<I, F>(iter: &mut I, seed: Value, mut reducer: F) -> Result<Value>
where
    I: ValueIterator + ?Sized,
    F: FnMut(Value, Value) -> Result<Flow<Value>>,
{
    let mut acc = seed;
    loop {
        match iter.next()? {
            Step::Value(v) => match reducer(acc.clone(), v)? {
                Flow::Continue(next) => acc = next,
                Flow::Stop => {
                    stopped("reduce");
                    break;
                }
            },
            Step::Done => break,
            Step::Stop => {
                stopped("reduce");
                break;
            }
        }
    }
    Ok(acc)
}

/// Folds the elements using the first one as seed. An empty iterator reduces to `undef`.
pub fn reduce<I, F>(iter: &mut I, reducer: F) -> Result<Value>
where
    I: ValueIterator + ?Sized,
    F: FnMut(Value, Value) -> Result<Flow<Value>>,
{
    match iter.next()? {
        Step::Value(first) => reduce2(iter, first, reducer),
        Step::Done | Step::Stop => Ok(Value::Undef),
    }
}

/// Collects the elements in order. Elements that are iterators are collected too.
pub fn as_array<I>(iter: &mut I) -> Result<Arc<Vec<Value>>>
where
    I: ValueIterator + ?Sized,
{
    let mut elements = Vec::with_capacity(16);
    loop {
        match iter.next()? {
            Step::Value(Value::Iterator(nested)) => {
                elements.push(Value::Array(nested.as_array()?));
            }
            Step::Value(v) => elements.push(v),
            Step::Done => break,
            Step::Stop => {
                stopped("as_array");
                break;
            }
        }
    }
    Ok(Arc::new(elements))
}
