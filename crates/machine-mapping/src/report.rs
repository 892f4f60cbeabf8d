// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Whole-problem optimisation with budget selection.

use crate::{
    get_optimal_machine_mapping, CacheStats, FeasibleMachineMappingResult, MachineMappingCache,
    MachineMappingConstraints, MachineMappingContext, MachineMappingPoint, MappingError,
};
use machine_spec::{MachineSpecification, MemoryBudget};
use problem_tree::{problem::Validated, MappingProblem};
use std::time::{Duration, Instant};

/// Outcome of [`optimize_machine_mapping`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct MappingReport {
    /// Name of the problem that was solved.
    pub problem: String,
    /// Every Pareto-optimal mapping, fastest first.
    pub frontier: FeasibleMachineMappingResult,
    /// The fastest mapping admitted by the budget.
    pub selected: MachineMappingPoint,
    pub budget: Option<MemoryBudget>,
    pub cache_stats: CacheStats,
    pub elapsed: Duration,
}

impl MappingReport {
    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        let budget = self
            .budget
            .map(|b| b.to_string())
            .unwrap_or_else(|| "unlimited".to_string());
        format!(
            "Problem '{}': {} Pareto point(s), selected {} under budget {} in {:.2?}. {}",
            self.problem,
            self.frontier.len(),
            self.selected.cost,
            budget,
            self.elapsed,
            self.cache_stats.summary(),
        )
    }
}

/// Solves a whole problem on `resources` and picks a mapping.
///
/// Runs the search with a fresh cache and no pinned leaves, then selects the
/// fastest frontier point whose memory fits `budget` (any point when no
/// budget is given).
///
/// # Errors
///
/// [`MappingError::Infeasible`] when no mapping exists at all,
/// [`MappingError::BudgetExceeded`] when every mapping is over budget, and
/// any error the search itself reports.
pub fn optimize_machine_mapping(
    problem: &MappingProblem<Validated>,
    resources: &MachineSpecification,
    context: &MachineMappingContext<'_>,
    budget: Option<MemoryBudget>,
) -> Result<MappingReport, MappingError> {
    resources.validate()?;
    tracing::info!(
        problem = %problem.name,
        leaves = problem.num_leaves(),
        machine = %resources,
        "starting machine-mapping search"
    );

    let start = Instant::now();
    let mut cache = MachineMappingCache::new();
    let tree = problem.tree();
    let constraints = MachineMappingConstraints::for_tree(tree);
    let result = get_optimal_machine_mapping(&mut cache, context, tree, resources, &constraints)?;
    let elapsed = start.elapsed();
    let cache_stats = cache.stats();

    let frontier = result.require_feasible()?;
    tracing::info!(
        points = frontier.len(),
        cache_entries = cache.len(),
        hit_ratio = cache_stats.hit_ratio(),
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "search complete"
    );

    let selected = match budget {
        Some(b) => frontier
            .fastest_within(b)
            .cloned()
            .ok_or(MappingError::BudgetExceeded {
                budget: b,
                min_required: frontier.leanest().cost.memory_usage,
            })?,
        None => frontier.fastest().clone(),
    };
    tracing::info!(
        runtime = %selected.cost.total_runtime(),
        memory = selected.cost.memory_usage,
        "selected mapping"
    );

    Ok(MappingReport {
        problem: problem.name.clone(),
        frontier,
        selected,
        budget,
        cache_stats,
        elapsed,
    })
}
