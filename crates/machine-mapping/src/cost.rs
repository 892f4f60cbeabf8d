// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Cost model interface.
//!
//! The search prices two things: a placed operator ([`OpCostEstimateKey`])
//! and the communication across a series split ([`TensorSetMovement`]).
//! How those prices are produced (kernel profiling, analytical models,
//! simulation) is up to the [`CostEstimator`] implementation.

use machine_spec::MachineView;
use problem_tree::{OpCostEstimateKey, TensorSetMovement, UnmappedOpCostEstimateKey};
use std::collections::HashMap;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Units ──────────────────────────────────────────────────────────

/// A duration in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Milliseconds(pub f64);

impl Milliseconds {
    pub const ZERO: Self = Self(0.0);

    pub fn as_f64(self) -> f64 {
        self.0
    }

    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }
}

impl Add for Milliseconds {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Milliseconds {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Milliseconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} ms", self.0)
    }
}

/// Estimated cost of running one placed operator (or a whole mapping).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OpCostMetrics {
    pub forward_runtime: Milliseconds,
    pub backward_runtime: Milliseconds,
    /// Resident memory in bytes.
    pub memory_usage: u64,
}

impl OpCostMetrics {
    pub fn new(forward_ms: f64, backward_ms: f64, memory_usage: u64) -> Self {
        Self {
            forward_runtime: Milliseconds(forward_ms),
            backward_runtime: Milliseconds(backward_ms),
            memory_usage,
        }
    }

    /// Forward plus backward runtime, the runtime axis of a frontier.
    pub fn total_runtime(&self) -> Milliseconds {
        self.forward_runtime + self.backward_runtime
    }

    /// `true` if `self` is no worse on both axes and better on at least one.
    pub fn dominates(&self, other: &OpCostMetrics) -> bool {
        let (r1, r2) = (self.total_runtime(), other.total_runtime());
        let (m1, m2) = (self.memory_usage, other.memory_usage);
        r1 <= r2 && m1 <= m2 && (r1 < r2 || m1 < m2)
    }

    /// `true` if `self` is no worse than `other` on both axes.
    pub fn weakly_dominates(&self, other: &OpCostMetrics) -> bool {
        self.total_runtime() <= other.total_runtime() && self.memory_usage <= other.memory_usage
    }
}

impl fmt::Display for OpCostMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fwd {} + bwd {} = {}, {} B",
            self.forward_runtime,
            self.backward_runtime,
            self.total_runtime(),
            self.memory_usage
        )
    }
}

// ── Estimator interface ────────────────────────────────────────────

/// Errors reported by a cost estimator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CostEstimateError {
    /// No estimate exists for this operator placement.
    #[error("no cost estimate for operator {op} on {view}")]
    UnknownOp { op: String, view: MachineView },

    /// No estimate exists for this tensor movement.
    #[error("no cost estimate for movement of {num_tensors} tensor(s)")]
    UnknownMovement { num_tensors: usize },

    /// The cost table could not be loaded.
    #[error("cost table error: {0}")]
    Table(String),

    /// The estimator failed for another reason.
    #[error("{0}")]
    Failed(String),
}

/// Prices operator placements and tensor movements.
///
/// Implementations must be pure for the duration of a search: the search
/// memoizes results and assumes repeated queries return the same value.
pub trait CostEstimator: Send + Sync {
    fn estimate_op_cost(&self, key: &OpCostEstimateKey) -> Result<OpCostMetrics, CostEstimateError>;

    fn estimate_movement_cost(
        &self,
        movement: &TensorSetMovement,
    ) -> Result<Milliseconds, CostEstimateError>;
}

impl<E: CostEstimator + ?Sized> CostEstimator for &E {
    fn estimate_op_cost(&self, key: &OpCostEstimateKey) -> Result<OpCostMetrics, CostEstimateError> {
        (**self).estimate_op_cost(key)
    }

    fn estimate_movement_cost(
        &self,
        movement: &TensorSetMovement,
    ) -> Result<Milliseconds, CostEstimateError> {
        (**self).estimate_movement_cost(movement)
    }
}

impl<E: CostEstimator + ?Sized> CostEstimator for Arc<E> {
    fn estimate_op_cost(&self, key: &OpCostEstimateKey) -> Result<OpCostMetrics, CostEstimateError> {
        (**self).estimate_op_cost(key)
    }

    fn estimate_movement_cost(
        &self,
        movement: &TensorSetMovement,
    ) -> Result<Milliseconds, CostEstimateError> {
        (**self).estimate_movement_cost(movement)
    }
}

// ── Closure-backed estimator ───────────────────────────────────────

/// A cost estimator built from two closures.
///
/// ```
/// use machine_mapping::{CostEstimator, FnCostEstimator, Milliseconds, OpCostMetrics};
///
/// let est = FnCostEstimator::new(
///     |_key| Ok(OpCostMetrics::new(1.0, 1.0, 64)),
///     |_movement| Ok(Milliseconds(0.5)),
/// );
/// # let _ = &est;
/// ```
pub struct FnCostEstimator<F, G> {
    op: F,
    movement: G,
}

impl<F, G> FnCostEstimator<F, G>
where
    F: Fn(&OpCostEstimateKey) -> Result<OpCostMetrics, CostEstimateError> + Send + Sync,
    G: Fn(&TensorSetMovement) -> Result<Milliseconds, CostEstimateError> + Send + Sync,
{
    pub fn new(op: F, movement: G) -> Self {
        Self { op, movement }
    }
}

impl<F, G> CostEstimator for FnCostEstimator<F, G>
where
    F: Fn(&OpCostEstimateKey) -> Result<OpCostMetrics, CostEstimateError> + Send + Sync,
    G: Fn(&TensorSetMovement) -> Result<Milliseconds, CostEstimateError> + Send + Sync,
{
    fn estimate_op_cost(&self, key: &OpCostEstimateKey) -> Result<OpCostMetrics, CostEstimateError> {
        (self.op)(key)
    }

    fn estimate_movement_cost(
        &self,
        movement: &TensorSetMovement,
    ) -> Result<Milliseconds, CostEstimateError> {
        (self.movement)(movement)
    }
}

// ── Lookup-table estimator ─────────────────────────────────────────

/// One priced operator placement in a cost table.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OpCostEntry {
    pub op: UnmappedOpCostEstimateKey,
    pub view: MachineView,
    pub cost: OpCostMetrics,
}

/// One priced tensor movement in a cost table.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MovementCostEntry {
    pub movement: TensorSetMovement,
    pub cost: Milliseconds,
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct CostTableFile {
    #[serde(default)]
    ops: Vec<OpCostEntry>,
    #[serde(default)]
    movements: Vec<MovementCostEntry>,
    #[serde(default)]
    default_movement_cost: Option<Milliseconds>,
}

/// A cost estimator backed by explicit lookup tables.
///
/// Operator entries are keyed by the unplaced operator and the view;
/// optimizer settings do not affect lookup. Movements not in the table fall
/// back to `default_movement_cost` when set, and are an error otherwise. The
/// empty movement always costs zero.
#[derive(Debug, Clone, Default)]
pub struct TableCostEstimator {
    ops: HashMap<(UnmappedOpCostEstimateKey, MachineView), OpCostMetrics>,
    movements: HashMap<TensorSetMovement, Milliseconds>,
    default_movement_cost: Option<Milliseconds>,
}

impl TableCostEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an operator entry.
    pub fn with_op(mut self, op: UnmappedOpCostEstimateKey, view: MachineView, cost: OpCostMetrics) -> Self {
        self.ops.insert((op, view), cost);
        self
    }

    /// Adds a movement entry. An earlier entry for the same movement wins.
    pub fn with_movement(mut self, movement: TensorSetMovement, cost: Milliseconds) -> Self {
        self.movements.entry(movement).or_insert(cost);
        self
    }

    pub fn with_default_movement_cost(mut self, cost: Milliseconds) -> Self {
        self.default_movement_cost = Some(cost);
        self
    }

    pub fn num_op_entries(&self) -> usize {
        self.ops.len()
    }

    pub fn num_movement_entries(&self) -> usize {
        self.movements.len()
    }

    /// Parses a cost table from JSON.
    pub fn from_json(json: &str) -> Result<Self, CostEstimateError> {
        let file: CostTableFile =
            serde_json::from_str(json).map_err(|e| CostEstimateError::Table(e.to_string()))?;
        let mut table = Self {
            default_movement_cost: file.default_movement_cost,
            ..Self::default()
        };
        for e in file.ops {
            if table.ops.insert((e.op.clone(), e.view.clone()), e.cost).is_some() {
                tracing::warn!(op = %e.op, view = %e.view, "duplicate cost table entry, keeping last");
            }
        }
        for e in file.movements {
            table = table.with_movement(e.movement, e.cost);
        }
        Ok(table)
    }

    /// Reads a cost table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CostEstimateError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CostEstimateError::Table(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }

    /// Serialises the table to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CostEstimateError> {
        let mut ops: Vec<OpCostEntry> = self
            .ops
            .iter()
            .map(|((op, view), cost)| OpCostEntry {
                op: op.clone(),
                view: view.clone(),
                cost: *cost,
            })
            .collect();
        ops.sort_by(|a, b| (&a.op, &a.view).cmp(&(&b.op, &b.view)));
        let mut movements: Vec<MovementCostEntry> = self
            .movements
            .iter()
            .map(|(m, c)| MovementCostEntry {
                movement: m.clone(),
                cost: *c,
            })
            .collect();
        movements.sort_by(|a, b| a.movement.cmp(&b.movement));
        let file = CostTableFile {
            ops,
            movements,
            default_movement_cost: self.default_movement_cost,
        };
        serde_json::to_string_pretty(&file).map_err(|e| CostEstimateError::Table(e.to_string()))
    }
}

impl CostEstimator for TableCostEstimator {
    fn estimate_op_cost(&self, key: &OpCostEstimateKey) -> Result<OpCostMetrics, CostEstimateError> {
        self.ops
            .get(&(key.unmapped(), key.machine_view.clone()))
            .copied()
            .ok_or_else(|| CostEstimateError::UnknownOp {
                op: key.op_attrs.to_string(),
                view: key.machine_view.clone(),
            })
    }

    fn estimate_movement_cost(
        &self,
        movement: &TensorSetMovement,
    ) -> Result<Milliseconds, CostEstimateError> {
        if let Some(cost) = self.movements.get(movement) {
            return Ok(*cost);
        }
        if movement.is_empty() {
            return Ok(Milliseconds::ZERO);
        }
        self.default_movement_cost
            .ok_or(CostEstimateError::UnknownMovement {
                num_tensors: movement.movements.len(),
            })
    }
}

// ── Call counting ──────────────────────────────────────────────────

/// Wraps an estimator and counts how often each query is made.
#[derive(Debug, Default)]
pub struct CountingCostEstimator<E> {
    inner: E,
    op_calls: AtomicUsize,
    movement_calls: AtomicUsize,
}

impl<E: CostEstimator> CountingCostEstimator<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            op_calls: AtomicUsize::new(0),
            movement_calls: AtomicUsize::new(0),
        }
    }

    pub fn op_calls(&self) -> usize {
        self.op_calls.load(Ordering::Relaxed)
    }

    pub fn movement_calls(&self) -> usize {
        self.movement_calls.load(Ordering::Relaxed)
    }

    pub fn total_calls(&self) -> usize {
        self.op_calls() + self.movement_calls()
    }

    pub fn reset(&self) {
        self.op_calls.store(0, Ordering::Relaxed);
        self.movement_calls.store(0, Ordering::Relaxed);
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: CostEstimator> CostEstimator for CountingCostEstimator<E> {
    fn estimate_op_cost(&self, key: &OpCostEstimateKey) -> Result<OpCostMetrics, CostEstimateError> {
        self.op_calls.fetch_add(1, Ordering::Relaxed);
        self.inner.estimate_op_cost(key)
    }

    fn estimate_movement_cost(
        &self,
        movement: &TensorSetMovement,
    ) -> Result<Milliseconds, CostEstimateError> {
        self.movement_calls.fetch_add(1, Ordering::Relaxed);
        self.inner.estimate_movement_cost(movement)
    }
}
