// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A named problem tree with compile-time validation state.
//!
//! # Type-State Pattern
//!
//! ```text
//! MappingProblem<Loaded>    : tree parsed, not yet checked.
//!       │  .validate()
//!       ▼
//! MappingProblem<Validated> : every movement endpoint resolves to a leaf,
//!                             every shape is non-empty; ready to search.
//! ```
//!
//! Whole-problem optimisation takes a `MappingProblem<Validated>`, so a
//! malformed tree fails here, before any cost is estimated.

use crate::{BinaryTreePathEntry, ProblemTree, ProblemTreeError};
use std::fmt;
use std::marker::PhantomData;

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: problem has been loaded but not validated.
#[derive(Debug, Clone)]
pub struct Loaded;

/// Marker: problem has been validated.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for problem states.
pub trait ProblemState: fmt::Debug + Clone {}
impl ProblemState for Loaded {}
impl ProblemState for Validated {}

// ── MappingProblem ─────────────────────────────────────────────────

/// A problem tree plus a human-readable name.
#[derive(Debug, Clone)]
pub struct MappingProblem<S: ProblemState = Loaded> {
    pub name: String,
    tree: ProblemTree,
    _state: PhantomData<S>,
}

impl<S: ProblemState> MappingProblem<S> {
    pub fn tree(&self) -> &ProblemTree {
        &self.tree
    }
}

// ── Loaded state ───────────────────────────────────────────────────

impl MappingProblem<Loaded> {
    pub fn new(name: impl Into<String>, tree: ProblemTree) -> Self {
        Self {
            name: name.into(),
            tree,
            _state: PhantomData,
        }
    }

    /// Validates the tree and transitions to the `Validated` state.
    ///
    /// # Checks
    /// - Every source path of a series movement names a leaf of the left
    ///   child, every destination path a leaf of the right child.
    /// - No leaf or moved tensor has a zero-sized dimension.
    pub fn validate(self) -> Result<MappingProblem<Validated>, ProblemTreeError> {
        check_node(&self.tree, "<root>")?;

        let empty_movements = count_empty_movements(&self.tree);
        if empty_movements > 0 {
            tracing::debug!(
                problem = %self.name,
                empty_movements,
                "series splits with no tensor movement"
            );
        }

        Ok(MappingProblem {
            name: self.name,
            tree: self.tree,
            _state: PhantomData,
        })
    }
}

fn check_node(node: &ProblemTree, at: &str) -> Result<(), ProblemTreeError> {
    match node {
        ProblemTree::Leaf(key) => {
            if key.all_shapes().any(|s| s.is_degenerate()) {
                return Err(ProblemTreeError::InvalidTree(format!(
                    "leaf {at} ({}) has a zero-sized tensor",
                    key.op_attrs
                )));
            }
            Ok(())
        }
        ProblemTree::Series(s) => {
            for (i, m) in s.tensor_movement.movements.iter().enumerate() {
                if m.shape.is_degenerate() {
                    return Err(ProblemTreeError::InvalidTree(format!(
                        "movement {i} of series node {at} has a zero-sized tensor"
                    )));
                }
                for p in &m.src_paths {
                    s.left.leaf_at_path(p).map_err(|e| {
                        ProblemTreeError::InvalidTree(format!(
                            "movement {i} of series node {at}: source {p}: {e}"
                        ))
                    })?;
                }
                for p in &m.dst_paths {
                    s.right.leaf_at_path(p).map_err(|e| {
                        ProblemTreeError::InvalidTree(format!(
                            "movement {i} of series node {at}: destination {p}: {e}"
                        ))
                    })?;
                }
            }
            check_children(&s.left, &s.right, at)
        }
        ProblemTree::Parallel(p) => check_children(&p.left, &p.right, at),
    }
}

fn check_children(left: &ProblemTree, right: &ProblemTree, at: &str) -> Result<(), ProblemTreeError> {
    let step = |e: BinaryTreePathEntry| {
        let c = if e == BinaryTreePathEntry::LeftChild { 'L' } else { 'R' };
        if at == "<root>" {
            c.to_string()
        } else {
            format!("{at}{c}")
        }
    };
    check_node(left, &step(BinaryTreePathEntry::LeftChild))?;
    check_node(right, &step(BinaryTreePathEntry::RightChild))
}

fn count_empty_movements(node: &ProblemTree) -> usize {
    match node {
        ProblemTree::Leaf(_) => 0,
        ProblemTree::Series(s) => {
            usize::from(s.tensor_movement.is_empty())
                + count_empty_movements(&s.left)
                + count_empty_movements(&s.right)
        }
        ProblemTree::Parallel(p) => count_empty_movements(&p.left) + count_empty_movements(&p.right),
    }
}

// ── Validated state ────────────────────────────────────────────────

impl MappingProblem<Validated> {
    pub fn into_tree(self) -> ProblemTree {
        self.tree
    }

    pub fn num_leaves(&self) -> usize {
        self.tree.num_leaves()
    }

    /// Returns a one-line summary of the problem.
    pub fn summary(&self) -> String {
        format!(
            "Problem '{}': {} leaves, depth {}",
            self.name,
            self.tree.num_leaves(),
            self.tree.depth(),
        )
    }
}

impl<S: ProblemState> fmt::Display for MappingProblem<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MappingProblem '{}':", self.name)?;
        write!(f, "{}", self.tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AbstractedSingleTensorMovement, AbstractedTensorSetMovement, BinaryTreePath,
        OperatorAttrs, OperatorType, UnmappedOpCostEstimateKey,
    };
    use std::collections::BTreeSet;
    use tensor_core::{DType, ParallelTensorShape, Shape};

    fn leaf() -> ProblemTree {
        ProblemTree::leaf(UnmappedOpCostEstimateKey::new(OperatorAttrs::new(
            OperatorType::Linear,
        )))
    }

    fn moving(dims: Vec<usize>, src: BinaryTreePath, dst: BinaryTreePath) -> AbstractedTensorSetMovement {
        AbstractedTensorSetMovement::new(vec![AbstractedSingleTensorMovement {
            shape: ParallelTensorShape::lift(&Shape::new(dims), DType::F32),
            src_paths: BTreeSet::from([src]),
            dst_paths: BTreeSet::from([dst]),
        }])
    }

    #[test]
    fn test_validate_ok() {
        let tree = ProblemTree::series(
            moving(vec![4, 4], BinaryTreePath::root(), BinaryTreePath::root()),
            leaf(),
            leaf(),
        );
        let p = MappingProblem::new("pair", tree).validate().unwrap();
        assert_eq!(p.num_leaves(), 2);
        assert!(p.summary().contains("2 leaves"));
    }

    #[test]
    fn test_validate_rejects_dangling_source() {
        let tree = ProblemTree::series(
            moving(vec![4], BinaryTreePath::left(), BinaryTreePath::root()),
            leaf(),
            leaf(),
        );
        let err = MappingProblem::new("bad", tree).validate().unwrap_err();
        assert!(matches!(err, ProblemTreeError::InvalidTree(_)));
    }

    #[test]
    fn test_validate_rejects_interior_destination() {
        let right = ProblemTree::parallel(leaf(), leaf());
        let tree = ProblemTree::series(
            moving(vec![4], BinaryTreePath::root(), BinaryTreePath::root()),
            leaf(),
            right,
        );
        let err = MappingProblem::new("bad", tree).validate().unwrap_err();
        assert!(err.to_string().contains("destination"));
    }

    #[test]
    fn test_validate_rejects_zero_sized_tensor() {
        let tree = ProblemTree::series(
            moving(vec![0, 4], BinaryTreePath::root(), BinaryTreePath::root()),
            leaf(),
            leaf(),
        );
        assert!(MappingProblem::new("zero", tree).validate().is_err());
    }

    #[test]
    fn test_validate_nested_paths_are_reported() {
        let inner = ProblemTree::series(
            moving(vec![4], BinaryTreePath::right(), BinaryTreePath::root()),
            leaf(),
            leaf(),
        );
        let tree = ProblemTree::parallel(leaf(), inner);
        let err = MappingProblem::new("nested", tree).validate().unwrap_err();
        assert!(err.to_string().contains("series node R"));
    }
}
