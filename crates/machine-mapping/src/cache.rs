// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Memoization of subproblem results.
//!
//! The same subtree is visited many times during a search: once per
//! boundary assignment of every enclosing series split and once per
//! resource split of every enclosing parallel split. The cache maps each
//! distinct `(tree, resources, constraints)` state to its result, so each is
//! solved at most once per top-level call.
//!
//! Trees compare structurally, so two identical subtrees in different
//! positions share entries.

use crate::{MachineMappingConstraints, MachineMappingResult};
use machine_spec::MachineSpecification;
use problem_tree::ProblemTree;
use std::collections::HashMap;

/// Cache key: one subproblem of the search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MachineMappingState {
    pub tree: ProblemTree,
    pub resources: MachineSpecification,
    pub constraints: MachineMappingConstraints,
}

impl MachineMappingState {
    pub fn new(
        tree: ProblemTree,
        resources: MachineSpecification,
        constraints: MachineMappingConstraints,
    ) -> Self {
        Self {
            tree,
            resources,
            constraints,
        }
    }
}

/// Counters describing how the cache was used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    /// Number of `load` calls.
    pub lookups: u64,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Results stored.
    pub insertions: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit, in `[0.0, 1.0]`. Zero before any lookup.
    pub fn hit_ratio(&self) -> f64 {
        if self.lookups == 0 {
            return 0.0;
        }
        self.hits as f64 / self.lookups as f64
    }

    pub fn summary(&self) -> String {
        format!(
            "Cache: {} lookups ({} hits, {} misses, {:.0}% hit rate), {} entries stored",
            self.lookups,
            self.hits,
            self.misses,
            self.hit_ratio() * 100.0,
            self.insertions,
        )
    }
}

/// Result cache scoped to one top-level search.
#[derive(Debug, Default)]
pub struct MachineMappingCache {
    entries: HashMap<MachineMappingState, MachineMappingResult>,
    stats: CacheStats,
}

impl MachineMappingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored result for `state`, if any.
    pub fn load(&mut self, state: &MachineMappingState) -> Option<MachineMappingResult> {
        self.stats.lookups += 1;
        match self.entries.get(state) {
            Some(result) => {
                self.stats.hits += 1;
                Some(result.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Stores the result for `state`.
    ///
    /// A state is only ever solved once, so an existing entry is kept and the
    /// new value discarded.
    pub fn save(&mut self, state: MachineMappingState, result: MachineMappingResult) {
        if self.entries.contains_key(&state) {
            tracing::warn!(
                leaves = state.tree.num_leaves(),
                resources = %state.resources,
                "result already cached for this state, keeping the existing entry"
            );
            return;
        }
        self.stats.insertions += 1;
        self.entries.insert(state, result);
    }

    pub fn contains(&self, state: &MachineMappingState) -> bool {
        self.entries.contains_key(state)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }
}
