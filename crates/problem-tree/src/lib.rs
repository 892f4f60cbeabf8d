// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # problem-tree
//!
//! The input of the machine-mapping search: a computation graph already
//! decomposed into a binary series-parallel tree.
//!
//! - [`ProblemTree`]: `Leaf | Series | Parallel`, an immutable value type.
//!   Leaves are unplaced operators ([`UnmappedOpCostEstimateKey`]); series
//!   nodes carry the [`AbstractedTensorSetMovement`] crossing the split.
//! - [`BinaryTreePath`]: position-based node identity (`"LR"`, `<root>`).
//! - [`MachineMapping`]: the solution object: leaf path → machine view.
//! - [`MappingProblem`]: a named tree with a **type-state pattern**
//!   (`Loaded` → `Validated`).
//! - [`ProblemLoader`]: reads problems from JSON.
//!
//! # Example
//! ```
//! use problem_tree::{
//!     AbstractedTensorSetMovement, MappingProblem, OperatorAttrs, OperatorType, ProblemTree,
//!     UnmappedOpCostEstimateKey,
//! };
//!
//! let leaf = |op| ProblemTree::leaf(UnmappedOpCostEstimateKey::new(OperatorAttrs::new(op)));
//! let tree = ProblemTree::series(
//!     AbstractedTensorSetMovement::empty(),
//!     leaf(OperatorType::Input),
//!     leaf(OperatorType::Relu),
//! );
//! let problem = MappingProblem::new("demo", tree).validate().unwrap();
//! assert_eq!(problem.num_leaves(), 2);
//! ```

mod error;
mod loader;
mod mapping;
mod movement;
mod op;
mod path;
pub mod problem;
mod tree;

pub use error::ProblemTreeError;
pub use loader::ProblemLoader;
pub use mapping::MachineMapping;
pub use movement::{
    AbstractedSingleTensorMovement, AbstractedTensorSetMovement, SingleTensorMovement,
    TensorSetMovement,
};
pub use op::{
    OpCostEstimateKey, OperatorAttrs, OperatorType, OptimizerAttrs, UnmappedOpCostEstimateKey,
};
pub use path::{BinaryTreePath, BinaryTreePathEntry};
pub use problem::MappingProblem;
pub use tree::{Fingerprinted, ParallelSplit, ProblemTree, SeriesSplit};
