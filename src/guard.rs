// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeSet;

use tracing::trace;

/// Cycle detection for one top-level type comparison.
///
/// Object types may refer to themselves, directly or through the siblings of a type set. Before a
/// comparison descends into such a pair it asks the guard; a pair that is already being compared
/// further up the stack is assumed to hold (co-inductive reading), which cuts the descent.
///
/// A guard lives on the stack of the call that created it and is threaded down as `&mut Guard`.
/// It is never stored, shared or reused across calls.
#[derive(Debug, Default)]
pub struct Guard {
    in_progress: BTreeSet<(usize, usize)>,
}

impl Guard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of comparisons currently in progress.
    pub fn depth(&self) -> usize {
        self.in_progress.len()
    }

    /// Runs `compare` with the pair `(a, b)` marked as in progress.
    ///
    /// Returns `true` without running `compare` if the pair is already marked.
    pub fn guard<F>(&mut self, a: usize, b: usize, compare: F) -> bool
    where
        F: FnOnce(&mut Guard) -> bool,
    {
        let key = (a, b);
        if !self.in_progress.insert(key) {
            trace!("comparison cycle cut at ({a:#x}, {b:#x})");
            return true;
        }
        let result = compare(self);
        self.in_progress.remove(&key);
        result
    }
}
