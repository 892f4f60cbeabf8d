// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: end-to-end machine-mapping search.
//!
//! Two operators (`k1`, an input, and `k2`, an elementwise add) with two
//! candidate views each, priced from a lookup table, on a two-node machine.
//! On the full machine both views are allowed; on any smaller piece only
//! `mv2` is.

use machine_mapping::result::{minimal_runtime_frontier, minimize_runtime, parallel_combine};
use machine_mapping::{
    get_optimal_machine_mapping, optimize_machine_mapping, CountingCostEstimator,
    FnCostEstimator, MachineMappingCache, MachineMappingConstraints, MachineMappingContext,
    MachineMappingResult, MappingError, Milliseconds, OpCostMetrics, TableCostEstimator,
};
use machine_spec::{
    get_machine_resource_splits, DeviceType, MachineSpaceCoordinate, MachineSpecification,
    MachineView, MemoryBudget,
};
use problem_tree::{
    AbstractedSingleTensorMovement, AbstractedTensorSetMovement, BinaryTreePath, MachineMapping,
    MappingProblem, OpCostEstimateKey, OperatorAttrs, OperatorType, OptimizerAttrs, ProblemTree,
    TensorSetMovement, UnmappedOpCostEstimateKey,
};
use std::collections::BTreeSet;
use tensor_core::{DType, ParallelTensorShape, Shape};

// ── Helpers ────────────────────────────────────────────────────

fn view(stride: usize) -> MachineView {
    MachineView::intra_node(MachineSpaceCoordinate::new(0, 0, DeviceType::Gpu), stride)
}

fn mv1() -> MachineView {
    view(1)
}

fn mv2() -> MachineView {
    view(2)
}

fn full_machine() -> MachineSpecification {
    MachineSpecification::new(2, 1, 1, 1.0, 1.0)
}

fn k1() -> UnmappedOpCostEstimateKey {
    UnmappedOpCostEstimateKey::new(OperatorAttrs::new(OperatorType::Input))
}

fn k2() -> UnmappedOpCostEstimateKey {
    UnmappedOpCostEstimateKey::new(OperatorAttrs::new(OperatorType::EwAdd))
}

fn optimizer() -> OptimizerAttrs {
    OptimizerAttrs::sgd(0.1, 0.1, false, 0.1)
}

fn tensor_shape() -> ParallelTensorShape {
    ParallelTensorShape::lift(&Shape::matrix(12, 8), DType::F32)
}

/// One tensor whose endpoints are not tied to any leaf.
fn unanchored_movement() -> AbstractedTensorSetMovement {
    AbstractedTensorSetMovement::new(vec![AbstractedSingleTensorMovement {
        shape: tensor_shape(),
        src_paths: BTreeSet::new(),
        dst_paths: BTreeSet::new(),
    }])
}

/// One tensor from the left leaf to the right leaf.
fn anchored_movement() -> AbstractedTensorSetMovement {
    AbstractedTensorSetMovement::new(vec![AbstractedSingleTensorMovement {
        shape: tensor_shape(),
        src_paths: BTreeSet::from([BinaryTreePath::root()]),
        dst_paths: BTreeSet::from([BinaryTreePath::root()]),
    }])
}

fn allowed_views(_: &UnmappedOpCostEstimateKey, resources: &MachineSpecification) -> BTreeSet<MachineView> {
    if *resources == full_machine() {
        BTreeSet::from([mv1(), mv2()])
    } else {
        BTreeSet::from([mv2()])
    }
}

/// Operator costs plus per-pairing costs for `movement`.
///
/// Entries are added in the order mv1→mv1, mv2→mv2, mv1→mv2, mv2→mv1. When
/// the movement ignores the views every pairing concretizes to the same
/// movement and the first entry (0.1 ms) applies.
fn cost_table(movement: &AbstractedTensorSetMovement) -> TableCostEstimator {
    let mm = |v: MachineView| MachineMapping::singleton_root(v);
    let concrete = |pre: MachineView, post: MachineView| {
        movement.concretize(&mm(pre), &mm(post)).unwrap()
    };
    TableCostEstimator::new()
        .with_op(k1(), mv1(), OpCostMetrics::new(1.0, 1.0, 2))
        .with_op(k2(), mv1(), OpCostMetrics::new(2.0, 2.0, 3))
        .with_op(k1(), mv2(), OpCostMetrics::new(1.5, 1.5, 1))
        .with_op(k2(), mv2(), OpCostMetrics::new(2.5, 2.5, 2))
        .with_movement(TensorSetMovement::empty(), Milliseconds(0.0))
        .with_movement(concrete(mv1(), mv1()), Milliseconds(0.1))
        .with_movement(concrete(mv2(), mv2()), Milliseconds(0.2))
        .with_movement(concrete(mv1(), mv2()), Milliseconds(0.3))
        .with_movement(concrete(mv2(), mv1()), Milliseconds(0.4))
}

fn solve(
    estimator: &TableCostEstimator,
    tree: &ProblemTree,
) -> MachineMappingResult {
    let optimizer = optimizer();
    let views = allowed_views;
    let ctx = MachineMappingContext::new(estimator, &optimizer, &views);
    get_optimal_machine_mapping(
        &mut MachineMappingCache::new(),
        &ctx,
        tree,
        &full_machine(),
        &MachineMappingConstraints::for_tree(tree),
    )
    .unwrap()
}

fn approx(a: Milliseconds, b: f64) -> bool {
    (a.as_f64() - b).abs() < 1e-9
}

/// Asserts `(fwd, bwd, memory, left view, right view)` for each point in order.
fn assert_two_leaf_frontier(result: &MachineMappingResult, expected: &[(f64, f64, u64, MachineView, MachineView)]) {
    assert_eq!(result.len(), expected.len(), "frontier: {result}");
    for (p, (fwd, bwd, mem, l, r)) in result.iter().zip(expected) {
        assert!(approx(p.cost.forward_runtime, *fwd), "forward of {p}");
        assert!(approx(p.cost.backward_runtime, *bwd), "backward of {p}");
        assert_eq!(p.cost.memory_usage, *mem, "memory of {p}");
        assert_eq!(p.mapping.get(&BinaryTreePath::left()), Some(l));
        assert_eq!(p.mapping.get(&BinaryTreePath::right()), Some(r));
        assert_eq!(p.mapping.len(), 2);
    }
}

fn assert_antichain(result: &MachineMappingResult) {
    let points = result.points();
    for (i, p) in points.iter().enumerate() {
        for (j, q) in points.iter().enumerate() {
            if i != j {
                assert!(!p.cost.weakly_dominates(&q.cost), "{p} dominates {q}");
            }
        }
    }
}

// ── Leaf ───────────────────────────────────────────────────────

#[test]
fn test_single_leaf_keeps_both_tradeoffs() {
    let tree = ProblemTree::leaf(k1());
    let result = solve(&cost_table(&unanchored_movement()), &tree);

    assert_eq!(result.len(), 2);
    let fast = &result.points()[0];
    assert_eq!(fast.cost, OpCostMetrics::new(1.0, 1.0, 2));
    assert_eq!(fast.mapping, MachineMapping::singleton_root(mv1()));
    let lean = &result.points()[1];
    assert_eq!(lean.cost, OpCostMetrics::new(1.5, 1.5, 1));
    assert_eq!(lean.mapping, MachineMapping::singleton_root(mv2()));
    assert_antichain(&result);
}

// ── Series ─────────────────────────────────────────────────────

#[test]
fn test_series_with_unanchored_movement() {
    let movement = unanchored_movement();
    let tree = ProblemTree::series(movement.clone(), ProblemTree::leaf(k1()), ProblemTree::leaf(k2()));
    let result = solve(&cost_table(&movement), &tree);

    // Communication is 0.1 ms for every pairing; mv2→mv1 ties mv1→mv2 and
    // the earlier pairing is kept.
    assert_two_leaf_frontier(
        &result,
        &[
            (3.1, 3.1, 5, mv1(), mv1()),
            (3.6, 3.6, 4, mv1(), mv2()),
            (4.1, 4.1, 3, mv2(), mv2()),
        ],
    );
    assert_antichain(&result);
}

#[test]
fn test_series_with_view_dependent_movement() {
    let movement = anchored_movement();
    let tree = ProblemTree::series(movement.clone(), ProblemTree::leaf(k1()), ProblemTree::leaf(k2()));
    let result = solve(&cost_table(&movement), &tree);

    // Cheapest same-view pairing, cheapest cross-view pairing, leanest
    // pairing. mv2→mv1 (3.9 ms, 4 B) is dominated by mv1→mv2.
    assert_two_leaf_frontier(
        &result,
        &[
            (3.1, 3.1, 5, mv1(), mv1()),
            (3.8, 3.8, 4, mv1(), mv2()),
            (4.2, 4.2, 3, mv2(), mv2()),
        ],
    );
    assert_antichain(&result);
}

#[test]
fn test_series_respects_pinned_boundary() {
    let movement = anchored_movement();
    let tree = ProblemTree::series(movement.clone(), ProblemTree::leaf(k1()), ProblemTree::leaf(k2()));
    let optimizer = optimizer();
    let views = allowed_views;
    let estimator = cost_table(&movement);
    let ctx = MachineMappingContext::new(&estimator, &optimizer, &views);

    let pinned = MachineMappingConstraints::for_tree(&tree)
        .with_additional_constraints(&MachineMapping::new(
            [(BinaryTreePath::left(), mv2())].into_iter().collect(),
        ))
        .unwrap();
    let result = get_optimal_machine_mapping(
        &mut MachineMappingCache::new(),
        &ctx,
        &tree,
        &full_machine(),
        &pinned,
    )
    .unwrap();

    // mv2→mv1 is no longer dominated once mv1 on the left is ruled out.
    assert_two_leaf_frontier(
        &result,
        &[(3.9, 3.9, 4, mv2(), mv1()), (4.2, 4.2, 3, mv2(), mv2())],
    );
}

#[test]
fn test_series_boundary_leaf_inside_nested_series() {
    // ((a ; b) ; c): the tensor into `c` comes from `b`, which sits at `R`
    // inside the left subtree. Moving between different views costs 10 ms.
    let path = |s: &str| -> BinaryTreePath { s.parse().unwrap() };
    let movement = |src: BinaryTreePath| {
        AbstractedTensorSetMovement::new(vec![AbstractedSingleTensorMovement {
            shape: tensor_shape(),
            src_paths: BTreeSet::from([src]),
            dst_paths: BTreeSet::from([BinaryTreePath::root()]),
        }])
    };
    let c = UnmappedOpCostEstimateKey::new(OperatorAttrs::new(OperatorType::Relu));
    let tree = ProblemTree::series(
        movement(path("R")),
        ProblemTree::series(
            movement(BinaryTreePath::root()),
            ProblemTree::leaf(k1()),
            ProblemTree::leaf(k2()),
        ),
        ProblemTree::leaf(c),
    );
    let estimator = FnCostEstimator::new(
        |key: &OpCostEstimateKey| {
            let t = match (key.op_attrs.op_type, key.machine_view == mv1()) {
                (OperatorType::Relu, true) => 0.5,
                _ => 1.0,
            };
            Ok(OpCostMetrics::new(t, t, 1))
        },
        |m: &TensorSetMovement| {
            let crossing = m.movements.iter().any(|t| t.src_views != t.dst_views);
            Ok(Milliseconds(if crossing { 10.0 } else { 0.0 }))
        },
    );
    let optimizer = optimizer();
    let views = allowed_views;
    let ctx = MachineMappingContext::new(&estimator, &optimizer, &views);
    let result = get_optimal_machine_mapping(
        &mut MachineMappingCache::new(),
        &ctx,
        &tree,
        &full_machine(),
        &MachineMappingConstraints::for_tree(&tree),
    )
    .unwrap();

    assert_eq!(result.len(), 1, "frontier: {result}");
    let p = &result.points()[0];
    assert!(approx(p.cost.total_runtime(), 5.0), "{p}");
    assert_eq!(p.cost.memory_usage, 3);
    assert_eq!(p.mapping.len(), 3);
    assert_eq!(p.mapping.get(&path("LR")), p.mapping.get(&path("R")));
    assert_eq!(p.mapping.get(&path("LL")), Some(&mv1()));
    assert_eq!(p.mapping.get(&path("LR")), Some(&mv1()));
    assert_eq!(p.mapping.get(&path("R")), Some(&mv1()));
}

#[test]
fn test_unresolvable_movement_path_errors() {
    let bad = AbstractedTensorSetMovement::new(vec![AbstractedSingleTensorMovement {
        shape: tensor_shape(),
        src_paths: BTreeSet::from(["L".parse().unwrap()]),
        dst_paths: BTreeSet::new(),
    }]);
    let tree = ProblemTree::series(bad.clone(), ProblemTree::leaf(k1()), ProblemTree::leaf(k2()));
    let optimizer = optimizer();
    let views = allowed_views;
    let estimator = cost_table(&unanchored_movement());
    let ctx = MachineMappingContext::new(&estimator, &optimizer, &views);
    let err = get_optimal_machine_mapping(
        &mut MachineMappingCache::new(),
        &ctx,
        &tree,
        &full_machine(),
        &MachineMappingConstraints::for_tree(&tree),
    )
    .unwrap_err();
    assert!(matches!(err, MappingError::ProblemTree(_)), "{err}");
}

// ── Parallel ───────────────────────────────────────────────────

#[test]
fn test_parallel_prefers_resource_split() {
    let tree = ProblemTree::parallel(ProblemTree::leaf(k1()), ProblemTree::leaf(k2()));
    let result = solve(&cost_table(&unanchored_movement()), &tree);

    // Running the two leaves side by side on one node each (5 ms, 3 B) beats
    // every sequential schedule on the whole machine.
    assert_two_leaf_frontier(&result, &[(2.5, 2.5, 3, mv2(), mv2())]);
}

#[test]
fn test_parallel_uses_every_resource_split() {
    // Each leaf is only fast on one specific piece of a four-node machine:
    // `k1` on three nodes, `k2` on one. Only the (3, 1) split gets both.
    let machine = MachineSpecification::new(4, 1, 1, 1.0, 1.0);
    let views = |_: &UnmappedOpCostEstimateKey, r: &MachineSpecification| {
        BTreeSet::from([view(r.num_nodes)])
    };
    let estimator = FnCostEstimator::new(
        |key: &OpCostEstimateKey| {
            let nodes = key.machine_view.strides()[0];
            let fast = match key.op_attrs.op_type {
                OperatorType::Input => nodes == 3,
                _ => nodes == 1,
            };
            let t = if fast { 1.0 } else { 10.0 };
            Ok(OpCostMetrics::new(t, t, 1))
        },
        |_: &TensorSetMovement| Ok(Milliseconds(0.0)),
    );
    let optimizer = optimizer();
    let ctx = MachineMappingContext::new(&estimator, &optimizer, &views);
    let (left, right) = (ProblemTree::leaf(k1()), ProblemTree::leaf(k2()));
    let tree = ProblemTree::parallel(left.clone(), right.clone());

    let mut cache = MachineMappingCache::new();
    let result = get_optimal_machine_mapping(
        &mut cache,
        &ctx,
        &tree,
        &machine,
        &MachineMappingConstraints::for_tree(&tree),
    )
    .unwrap();
    assert_two_leaf_frontier(&result, &[(1.0, 1.0, 2, view(3), view(1))]);

    // Same frontier as the explicit union of the sequential strategy and
    // every split.
    let mut solve_on = |t: &ProblemTree, r: &MachineSpecification| {
        get_optimal_machine_mapping(&mut cache, &ctx, t, r, &MachineMappingConstraints::for_tree(t))
            .unwrap()
    };
    let sequential = solve_on(
        &ProblemTree::series(AbstractedTensorSetMovement::empty(), left.clone(), right.clone()),
        &machine,
    );
    let splits = get_machine_resource_splits(&machine);
    assert_eq!(splits.len(), 3);
    let per_split: Vec<MachineMappingResult> = splits
        .iter()
        .map(|(l, r)| parallel_combine(&solve_on(&left, l), &solve_on(&right, r)))
        .collect();
    let union = minimize_runtime(sequential, minimal_runtime_frontier(per_split.clone()));
    assert_eq!(union, result);

    // Dropping the (3, 1) split loses the optimum.
    let without: Vec<MachineMappingResult> = splits
        .iter()
        .zip(per_split)
        .filter(|((l, _), _)| l.num_nodes != 3)
        .map(|(_, r)| r)
        .collect();
    assert_ne!(minimal_runtime_frontier(without), result);
}

// ── Caching ────────────────────────────────────────────────────

#[test]
fn test_repeat_search_is_served_from_cache() {
    let movement = anchored_movement();
    let tree = ProblemTree::parallel(
        ProblemTree::series(movement.clone(), ProblemTree::leaf(k1()), ProblemTree::leaf(k2())),
        ProblemTree::leaf(k1()),
    );
    let counting = CountingCostEstimator::new(cost_table(&movement));
    let optimizer = optimizer();
    let views = allowed_views;
    let ctx = MachineMappingContext::new(&counting, &optimizer, &views);
    let constraints = MachineMappingConstraints::for_tree(&tree);
    let mut cache = MachineMappingCache::new();

    let first = get_optimal_machine_mapping(&mut cache, &ctx, &tree, &full_machine(), &constraints).unwrap();
    assert!(counting.total_calls() > 0);
    let entries = cache.len();

    counting.reset();
    let second = get_optimal_machine_mapping(&mut cache, &ctx, &tree, &full_machine(), &constraints).unwrap();
    assert_eq!(counting.total_calls(), 0);
    assert_eq!(first, second);
    assert_eq!(cache.len(), entries);
    assert!(cache.stats().hits >= 1);
    assert_antichain(&first);
}

#[test]
fn test_identical_subtrees_share_cache_entries() {
    let tree = ProblemTree::parallel(ProblemTree::leaf(k1()), ProblemTree::leaf(k1()));
    let counting = CountingCostEstimator::new(cost_table(&unanchored_movement()));
    let optimizer = optimizer();
    let views = allowed_views;
    let ctx = MachineMappingContext::new(&counting, &optimizer, &views);
    let mut cache = MachineMappingCache::new();
    get_optimal_machine_mapping(
        &mut cache,
        &ctx,
        &tree,
        &full_machine(),
        &MachineMappingConstraints::for_tree(&tree),
    )
    .unwrap();

    // k1 is priced twice on the full machine (mv1, mv2) and once on a
    // single node (mv2); the second branch reuses those results.
    assert_eq!(counting.op_calls(), 3);
}

// ── Whole-problem optimisation ─────────────────────────────────

fn anchored_problem() -> MappingProblem<problem_tree::problem::Validated> {
    let tree = ProblemTree::series(anchored_movement(), ProblemTree::leaf(k1()), ProblemTree::leaf(k2()));
    MappingProblem::new("two-layer", tree).validate().unwrap()
}

#[test]
fn test_optimize_picks_fastest_within_budget() {
    let estimator = cost_table(&anchored_movement());
    let optimizer = optimizer();
    let views = allowed_views;
    let ctx = MachineMappingContext::new(&estimator, &optimizer, &views);
    let problem = anchored_problem();

    let unlimited = optimize_machine_mapping(&problem, &full_machine(), &ctx, None).unwrap();
    assert_eq!(unlimited.frontier.len(), 3);
    assert_eq!(unlimited.selected.cost.memory_usage, 5);

    let tight = optimize_machine_mapping(&problem, &full_machine(), &ctx, Some(MemoryBudget::from_bytes(4))).unwrap();
    assert_eq!(tight.selected.cost.memory_usage, 4);
    assert!(approx(tight.selected.cost.total_runtime(), 7.6));
    assert!(tight.summary().contains("two-layer"));
    assert!(tight.cache_stats.insertions > 0);
}

#[test]
fn test_optimize_reports_budget_exceeded() {
    let estimator = cost_table(&anchored_movement());
    let optimizer = optimizer();
    let views = allowed_views;
    let ctx = MachineMappingContext::new(&estimator, &optimizer, &views);
    let err = optimize_machine_mapping(
        &anchored_problem(),
        &full_machine(),
        &ctx,
        Some(MemoryBudget::from_bytes(2)),
    )
    .unwrap_err();
    match err {
        MappingError::BudgetExceeded { min_required, .. } => assert_eq!(min_required, 3),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_optimize_reports_infeasible() {
    let estimator = cost_table(&anchored_movement());
    let optimizer = optimizer();
    let nothing = |_: &UnmappedOpCostEstimateKey, _: &MachineSpecification| BTreeSet::<MachineView>::new();
    let ctx = MachineMappingContext::new(&estimator, &optimizer, &nothing);
    let err = optimize_machine_mapping(&anchored_problem(), &full_machine(), &ctx, None).unwrap_err();
    assert!(matches!(err, MappingError::Infeasible));
}

#[test]
fn test_demo_problem_end_to_end() {
    let problem = problem_tree::ProblemLoader::from_json(include_str!("../../../demos/two-layer.json")).unwrap();
    let estimator = TableCostEstimator::from_json(include_str!("../../../demos/two-layer-costs.json")).unwrap();
    let config = machine_mapping::MapperConfig::from_toml(include_str!("../../../demos/mapper.toml")).unwrap();
    let machine = config.machine_spec().unwrap();
    let views = config.allowed_views();
    let ctx = MachineMappingContext::new(&estimator, &config.optimizer, &views);

    let report = optimize_machine_mapping(&problem, &machine, &ctx, config.parse_budget().unwrap()).unwrap();

    // gpu1→gpu0 ties gpu0→gpu1 at 7.6 ms / 4 B and is dropped.
    let costs: Vec<(u64, u64)> = report
        .frontier
        .points()
        .iter()
        .map(|p| ((p.cost.total_runtime().as_f64() * 10.0).round() as u64, p.cost.memory_usage))
        .collect();
    assert_eq!(costs, vec![(60, 5), (76, 4), (80, 3)]);
    assert_eq!(report.selected.cost.memory_usage, 4);
    let device = |path: BinaryTreePath| report.selected.mapping.get(&path).map(|v| v.start.device_idx);
    assert_eq!(device(BinaryTreePath::left()), Some(0));
    assert_eq!(device(BinaryTreePath::right()), Some(1));
}
