// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the machine-mapping search.
//!
//! Infeasibility is not an error: the search returns it as an empty
//! frontier. Everything here is a usage error or a failure of an external
//! collaborator.

use crate::CostEstimateError;
use machine_spec::{MachineSpecError, MachineView, MemoryBudget};
use problem_tree::{BinaryTreePath, ProblemTreeError};

/// Errors that can occur while searching for a machine mapping.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// A constraint names a path that is not a leaf of the subtree.
    #[error("constraint path {path} is not a leaf of the subproblem")]
    UnknownConstraintPath { path: BinaryTreePath },

    /// A constraint would replace an already pinned view.
    #[error("conflicting constraint at {path}: already pinned to {existing}, cannot pin to {requested}")]
    ConflictingConstraint {
        path: BinaryTreePath,
        existing: MachineView,
        requested: MachineView,
    },

    /// Constraints do not have the shape the operation requires.
    #[error("invalid constraints: {0}")]
    InvalidConstraints(String),

    /// A feasible result was required but none exists.
    #[error("no feasible machine mapping exists")]
    Infeasible,

    /// Every feasible mapping exceeds the memory budget.
    #[error("memory budget {budget} exceeded: leanest mapping needs {min_required} bytes")]
    BudgetExceeded {
        budget: MemoryBudget,
        min_required: u64,
    },

    /// The problem tree is malformed or a query on it failed.
    #[error("problem tree error: {0}")]
    ProblemTree(#[from] ProblemTreeError),

    /// The cost estimator could not price a key.
    #[error("cost estimation failed: {0}")]
    CostEstimate(#[from] CostEstimateError),

    /// The machine specification is invalid.
    #[error("machine specification error: {0}")]
    Machine(#[from] MachineSpecError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
