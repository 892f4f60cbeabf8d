// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Result algebra: runtime/memory Pareto frontiers and how they compose.
//!
//! ```text
//!   memory
//!     │ ●                 ● kept (frontier)
//!     │   ○               ○ dominated
//!     │     ●
//!     │        ●   ○
//!     │             ●
//!     └──────────────────── total runtime
//! ```
//!
//! A result is the set of non-dominated `(cost, mapping)` points for a
//! subproblem. The empty set is the infeasible result; every combinator
//! absorbs it.
//!
//! | Combinator | runtime | memory |
//! |---|---|---|
//! | [`series_combine`] | `pre + comm + post` (fwd and bwd each) | sum |
//! | [`parallel_combine`] | max (fwd and bwd each) | sum |
//!
//! Points are compared on total runtime (forward + backward) and memory. When
//! two points tie on both, the one discovered first is kept. The frontier is
//! stored sorted by total runtime.

use crate::{Milliseconds, MappingError, OpCostMetrics};
use machine_spec::{MachineView, MemoryBudget};
use problem_tree::MachineMapping;
use std::fmt;

/// Evaluation order to record for a series composition that came from a
/// parallel split. Only the mapping prefixes depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ParallelSplitTransformation {
    LeftThenRight,
    RightThenLeft,
}

/// One frontier point: a full mapping for the subproblem and its cost.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MachineMappingPoint {
    pub cost: OpCostMetrics,
    pub mapping: MachineMapping,
}

impl MachineMappingPoint {
    pub fn new(cost: OpCostMetrics, mapping: MachineMapping) -> Self {
        Self { cost, mapping }
    }
}

impl fmt::Display for MachineMappingPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.cost, self.mapping)
    }
}

/// A Pareto frontier of mappings, or infeasible when empty.
///
/// Serialised as a plain list of points. Deserialising prunes and sorts the
/// list, so a decoded result is always a frontier.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "Vec<MachineMappingPoint>", into = "Vec<MachineMappingPoint>")]
pub struct MachineMappingResult {
    frontier: Vec<MachineMappingPoint>,
}

impl MachineMappingResult {
    /// The infeasible result.
    pub fn infeasible() -> Self {
        Self::default()
    }

    /// A one-point result for a single leaf placed on `view`.
    pub fn singleton(cost: OpCostMetrics, view: MachineView) -> Self {
        Self {
            frontier: vec![MachineMappingPoint::new(cost, MachineMapping::singleton_root(view))],
        }
    }

    /// Builds a frontier from candidate points given in discovery order.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = MachineMappingPoint>,
    {
        let mut kept: Vec<MachineMappingPoint> = Vec::new();
        for p in points {
            if kept.iter().any(|q| q.cost.weakly_dominates(&p.cost)) {
                continue;
            }
            kept.retain(|q| !p.cost.dominates(&q.cost));
            kept.push(p);
        }
        kept.sort_by(|a, b| {
            a.cost
                .total_runtime()
                .as_f64()
                .total_cmp(&b.cost.total_runtime().as_f64())
                .then(a.cost.memory_usage.cmp(&b.cost.memory_usage))
        });
        Self { frontier: kept }
    }

    pub fn is_infeasible(&self) -> bool {
        self.frontier.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Frontier points, fastest first.
    pub fn points(&self) -> &[MachineMappingPoint] {
        &self.frontier
    }

    pub fn iter(&self) -> impl Iterator<Item = &MachineMappingPoint> {
        self.frontier.iter()
    }

    pub fn into_points(self) -> Vec<MachineMappingPoint> {
        self.frontier
    }

    /// Fails with [`MappingError::Infeasible`] on the infeasible result.
    pub fn require_feasible(self) -> Result<FeasibleMachineMappingResult, MappingError> {
        if self.is_infeasible() {
            return Err(MappingError::Infeasible);
        }
        Ok(FeasibleMachineMappingResult {
            frontier: self.frontier,
        })
    }
}

impl fmt::Display for MachineMappingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infeasible() {
            return f.write_str("infeasible");
        }
        for (i, p) in self.frontier.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

impl From<Vec<MachineMappingPoint>> for MachineMappingResult {
    fn from(points: Vec<MachineMappingPoint>) -> Self {
        Self::from_points(points)
    }
}

impl From<MachineMappingResult> for Vec<MachineMappingPoint> {
    fn from(result: MachineMappingResult) -> Self {
        result.frontier
    }
}

/// Free-function form of [`MachineMappingResult::require_feasible`].
pub fn require_feasible(
    result: MachineMappingResult,
) -> Result<FeasibleMachineMappingResult, MappingError> {
    result.require_feasible()
}

/// A result known to have at least one point.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FeasibleMachineMappingResult {
    frontier: Vec<MachineMappingPoint>,
}

impl FeasibleMachineMappingResult {
    pub fn points(&self) -> &[MachineMappingPoint] {
        &self.frontier
    }

    pub fn len(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The point with the lowest total runtime.
    pub fn fastest(&self) -> &MachineMappingPoint {
        &self.frontier[0]
    }

    /// The point with the lowest memory usage.
    pub fn leanest(&self) -> &MachineMappingPoint {
        &self.frontier[self.frontier.len() - 1]
    }

    /// The fastest point whose memory fits within `budget`.
    pub fn fastest_within(&self, budget: MemoryBudget) -> Option<&MachineMappingPoint> {
        self.frontier
            .iter()
            .find(|p| budget.admits(p.cost.memory_usage))
    }
}

// ── Combinators ────────────────────────────────────────────────────

/// Composes two subresults run one after the other.
///
/// Every pair of points yields forward and backward runtimes of
/// `pre + comm + post` and memory `pre + post`. The mapping places `pre`
/// under the left child, unless the transformation is
/// [`ParallelSplitTransformation::RightThenLeft`].
pub fn series_combine(
    comm_cost: Milliseconds,
    pre: &MachineMappingResult,
    post: &MachineMappingResult,
    transformation: Option<ParallelSplitTransformation>,
) -> MachineMappingResult {
    if pre.is_infeasible() || post.is_infeasible() {
        return MachineMappingResult::infeasible();
    }
    let mut candidates = Vec::with_capacity(pre.len() * post.len());
    for a in pre.iter() {
        for b in post.iter() {
            let cost = OpCostMetrics {
                forward_runtime: a.cost.forward_runtime + comm_cost + b.cost.forward_runtime,
                backward_runtime: a.cost.backward_runtime + comm_cost + b.cost.backward_runtime,
                memory_usage: a.cost.memory_usage + b.cost.memory_usage,
            };
            let mapping = match transformation {
                Some(ParallelSplitTransformation::RightThenLeft) => {
                    MachineMapping::combine(&b.mapping, &a.mapping)
                }
                _ => MachineMapping::combine(&a.mapping, &b.mapping),
            };
            candidates.push(MachineMappingPoint::new(cost, mapping));
        }
    }
    MachineMappingResult::from_points(candidates)
}

/// Composes two subresults running concurrently on disjoint resources.
///
/// Runtimes are the slower branch (forward and backward separately) and
/// memory is the sum, since both branches are resident at once.
pub fn parallel_combine(
    lhs: &MachineMappingResult,
    rhs: &MachineMappingResult,
) -> MachineMappingResult {
    if lhs.is_infeasible() || rhs.is_infeasible() {
        return MachineMappingResult::infeasible();
    }
    let mut candidates = Vec::with_capacity(lhs.len() * rhs.len());
    for a in lhs.iter() {
        for b in rhs.iter() {
            let cost = OpCostMetrics {
                forward_runtime: a.cost.forward_runtime.max(b.cost.forward_runtime),
                backward_runtime: a.cost.backward_runtime.max(b.cost.backward_runtime),
                memory_usage: a.cost.memory_usage + b.cost.memory_usage,
            };
            candidates.push(MachineMappingPoint::new(
                cost,
                MachineMapping::combine(&a.mapping, &b.mapping),
            ));
        }
    }
    MachineMappingResult::from_points(candidates)
}

/// The frontier of the union of two results. Points of `a` win ties.
pub fn minimize_runtime(
    a: MachineMappingResult,
    b: MachineMappingResult,
) -> MachineMappingResult {
    if b.is_infeasible() {
        return a;
    }
    if a.is_infeasible() {
        return b;
    }
    MachineMappingResult::from_points(a.frontier.into_iter().chain(b.frontier))
}

/// The frontier of the union of many results, earlier results winning ties.
pub fn minimal_runtime_frontier<I>(results: I) -> MachineMappingResult
where
    I: IntoIterator<Item = MachineMappingResult>,
{
    MachineMappingResult::from_points(results.into_iter().flat_map(|r| r.frontier))
}
