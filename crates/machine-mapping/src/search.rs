// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The memoized recursive search.
//!
//! ```text
//!            cache hit? ──yes──▶ return stored result
//!                │ no
//!     ┌──────────┼──────────────┐
//!   Leaf       Series        Parallel
//!     │          │              │
//!  price every  enumerate     (a) run as series on the same resources
//!  allowed     boundary       (b) every resource split, children in
//!  view        assignments        parallel
//!     │          │              │
//!     └──────────┴──────┬───────┘
//!                  store result
//! ```
//!
//! Constraints are always relative to the node being solved. Only boundary
//! leaves (endpoints of the tensors crossing a series split) get their views
//! enumerated at the split; interior placements are left to the recursive
//! calls, which the cache shares between assignments.

use crate::result::{
    minimal_runtime_frontier, minimize_runtime, parallel_combine, series_combine,
    ParallelSplitTransformation,
};
use crate::{
    MachineMappingCache, MachineMappingConstraints, MachineMappingContext, MachineMappingResult,
    MachineMappingState, MappingError,
};
use machine_spec::{enumerate::all_assignments, get_machine_resource_splits, MachineSpecification};
use problem_tree::{
    AbstractedTensorSetMovement, BinaryTreePath, MachineMapping, ParallelSplit, ProblemTree,
    SeriesSplit, UnmappedOpCostEstimateKey,
};
use std::collections::{BTreeMap, BTreeSet};

/// Finds the runtime/memory frontier of mappings for `tree` on `resources`.
///
/// `constraints` must cover exactly the leaves of `tree`. Infeasibility is
/// returned as an empty frontier; `Err` means bad input or a failing
/// estimator.
pub fn get_optimal_machine_mapping(
    cache: &mut MachineMappingCache,
    context: &MachineMappingContext<'_>,
    tree: &ProblemTree,
    resources: &MachineSpecification,
    constraints: &MachineMappingConstraints,
) -> Result<MachineMappingResult, MappingError> {
    let state = MachineMappingState::new(tree.clone(), resources.clone(), constraints.clone());
    if let Some(cached) = cache.load(&state) {
        tracing::trace!(kind = tree.kind(), resources = %resources, "cache hit");
        return Ok(cached);
    }

    let result = match tree {
        ProblemTree::Leaf(leaf) => solve_leaf(context, leaf, resources, constraints)?,
        ProblemTree::Series(split) => {
            solve_series(cache, context, split, resources, constraints, None)?
        }
        ProblemTree::Parallel(split) => {
            solve_parallel(cache, context, split, resources, constraints)?
        }
    };

    tracing::trace!(
        kind = tree.kind(),
        resources = %resources,
        frontier = result.len(),
        "solved subproblem"
    );
    cache.save(state, result.clone());
    Ok(result)
}

fn solve_leaf(
    context: &MachineMappingContext<'_>,
    leaf: &UnmappedOpCostEstimateKey,
    resources: &MachineSpecification,
    constraints: &MachineMappingConstraints,
) -> Result<MachineMappingResult, MappingError> {
    let candidates = match constraints.require_only_root()? {
        Some(view) => BTreeSet::from([view.clone()]),
        None => context
            .allowed_machine_views
            .allowed_machine_views(leaf, resources),
    };
    if candidates.is_empty() {
        tracing::debug!(op = %leaf, resources = %resources, "no placement for leaf");
        return Ok(MachineMappingResult::infeasible());
    }

    let mut singletons = Vec::with_capacity(candidates.len());
    for view in candidates {
        let key = leaf.with_placement(context.optimizer_attrs, view.clone());
        let cost = context.cost_estimator.estimate_op_cost(&key)?;
        singletons.push(MachineMappingResult::singleton(cost, view));
    }
    Ok(minimal_runtime_frontier(singletons))
}

fn solve_series(
    cache: &mut MachineMappingCache,
    context: &MachineMappingContext<'_>,
    split: &SeriesSplit,
    resources: &MachineSpecification,
    constraints: &MachineMappingConstraints,
    transformation: Option<ParallelSplitTransformation>,
) -> Result<MachineMappingResult, MappingError> {
    let movement = &split.tensor_movement;
    let left_constraints = constraints.restrict_to_left_child();
    let right_constraints = constraints.restrict_to_right_child();

    let pre_assignments = boundary_assignments(
        context,
        &split.left,
        &movement.src_layers(),
        &left_constraints,
        resources,
    )?;
    let post_assignments = boundary_assignments(
        context,
        &split.right,
        &movement.dst_layers(),
        &right_constraints,
        resources,
    )?;
    tracing::debug!(
        pre = pre_assignments.len(),
        post = post_assignments.len(),
        tensors = movement.movements.len(),
        "series split boundary assignments"
    );

    let mut pre_results = Vec::with_capacity(pre_assignments.len());
    for pre in pre_assignments {
        let c = left_constraints.with_additional_constraints(&pre)?;
        let r = get_optimal_machine_mapping(cache, context, &split.left, resources, &c)?;
        if !r.is_infeasible() {
            pre_results.push((pre, r));
        }
    }
    if pre_results.is_empty() {
        return Ok(MachineMappingResult::infeasible());
    }

    let mut post_results = Vec::with_capacity(post_assignments.len());
    for post in post_assignments {
        let c = right_constraints.with_additional_constraints(&post)?;
        let r = get_optimal_machine_mapping(cache, context, &split.right, resources, &c)?;
        if !r.is_infeasible() {
            post_results.push((post, r));
        }
    }

    let mut result = MachineMappingResult::infeasible();
    for (pre, pre_result) in &pre_results {
        for (post, post_result) in &post_results {
            let concrete = movement.concretize(pre, post)?;
            let comm_cost = context.cost_estimator.estimate_movement_cost(&concrete)?;
            result = minimize_runtime(
                result,
                series_combine(comm_cost, pre_result, post_result, transformation),
            );
        }
    }
    Ok(result)
}

/// Every consistent view assignment for the boundary leaves of one side.
///
/// A pinned leaf contributes only its pinned view. With no boundary leaves
/// there is exactly one (empty) assignment.
fn boundary_assignments(
    context: &MachineMappingContext<'_>,
    side: &ProblemTree,
    layers: &BTreeSet<BinaryTreePath>,
    constraints: &MachineMappingConstraints,
    resources: &MachineSpecification,
) -> Result<Vec<MachineMapping>, MappingError> {
    let mut options = BTreeMap::new();
    for path in layers {
        let leaf = side.leaf_at_path(path)?;
        let views = match constraints.pinned(path) {
            Some(view) => BTreeSet::from([view.clone()]),
            None => context
                .allowed_machine_views
                .allowed_machine_views(leaf, resources),
        };
        options.insert(path.clone(), views);
    }
    Ok(all_assignments(&options)
        .into_iter()
        .map(MachineMapping::new)
        .collect())
}

fn solve_parallel(
    cache: &mut MachineMappingCache,
    context: &MachineMappingContext<'_>,
    split: &ParallelSplit,
    resources: &MachineSpecification,
    constraints: &MachineMappingConstraints,
) -> Result<MachineMappingResult, MappingError> {
    let as_series = SeriesSplit {
        tensor_movement: AbstractedTensorSetMovement::empty(),
        left: split.left.clone(),
        right: split.right.clone(),
    };
    let series_result = solve_series(
        cache,
        context,
        &as_series,
        resources,
        constraints,
        Some(ParallelSplitTransformation::LeftThenRight),
    )?;

    let left_constraints = constraints.restrict_to_left_child();
    let right_constraints = constraints.restrict_to_right_child();
    let splits = get_machine_resource_splits(resources);
    tracing::debug!(
        resources = %resources,
        splits = splits.len(),
        "parallel split resource partitions"
    );

    let mut parallel_results = Vec::with_capacity(splits.len());
    for (left_resources, right_resources) in &splits {
        let left = get_optimal_machine_mapping(
            cache,
            context,
            &split.left,
            left_resources,
            &left_constraints,
        )?;
        if left.is_infeasible() {
            continue;
        }
        let right = get_optimal_machine_mapping(
            cache,
            context,
            &split.right,
            right_resources,
            &right_constraints,
        )?;
        parallel_results.push(parallel_combine(&left, &right));
    }

    Ok(minimize_runtime(
        series_result,
        minimal_runtime_frontier(parallel_results),
    ))
}
