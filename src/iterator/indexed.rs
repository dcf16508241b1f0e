// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use anyhow::Result;

use crate::iterator::{Step, ValueIterator};
use crate::types::Type;
use crate::Value;

/// A cursor over a shared array.
///
/// Several indexed iterators may walk the same backing array independently.
pub struct IndexedIterator {
    element_type: Type,
    pos: usize,
    indexed: Arc<Vec<Value>>,
}

impl IndexedIterator {
    pub fn new(element_type: Type, indexed: Arc<Vec<Value>>) -> Self {
        IndexedIterator {
            element_type,
            pos: 0,
            indexed,
        }
    }
}

impl ValueIterator for IndexedIterator {
    fn next(&mut self) -> Result<Step> {
        match self.indexed.get(self.pos) {
            Some(v) => {
                self.pos += 1;
                Ok(Step::Value(v.clone()))
            }
            None => Ok(Step::Done),
        }
    }

    fn element_type(&self) -> Type {
        self.element_type.clone()
    }

    // An untouched cursor hands out the backing array itself.
    fn as_array(&mut self) -> Result<Arc<Vec<Value>>> {
        let rest = match self.pos {
            0 => self.indexed.clone(),
            pos => Arc::new(self.indexed.get(pos..).unwrap_or_default().to_vec()),
        };
        self.pos = self.indexed.len();
        Ok(rest)
    }
}
