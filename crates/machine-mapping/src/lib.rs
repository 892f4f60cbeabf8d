// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # machine-mapping
//!
//! Memory-aware search for device placements of a series-parallel problem
//! tree. Instead of one best mapping, the search returns the Pareto frontier
//! of mappings trading total runtime against memory.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                  optimize_machine_mapping                     │
//! │   fresh cache → search → require_feasible → budget selection  │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼────────────────────────────────┐
//! │                get_optimal_machine_mapping                    │
//! │      (tree, resources, constraints) → MachineMappingResult    │
//! └───────┬──────────────────┬───────────────────┬────────────────┘
//!         │                  │                   │
//! ┌───────▼──────┐  ┌────────▼────────┐  ┌───────▼───────────────┐
//! │ Result cache │  │ Result algebra  │  │ MachineMappingContext │
//! │ (per call)   │  │ series/parallel │  │ cost estimator,       │
//! │              │  │ Pareto pruning  │  │ allowed views         │
//! └──────────────┘  └─────────────────┘  └───────────────────────┘
//! ```
//!
//! # Example
//! ```
//! use machine_mapping::{
//!     get_optimal_machine_mapping, FnCostEstimator, MachineMappingCache,
//!     MachineMappingConstraints, MachineMappingContext, Milliseconds, OpCostMetrics,
//!     TaskSpaceViews,
//! };
//! use machine_spec::MachineSpecification;
//! use problem_tree::{OperatorAttrs, OperatorType, OptimizerAttrs, ProblemTree, UnmappedOpCostEstimateKey};
//!
//! let tree = ProblemTree::leaf(UnmappedOpCostEstimateKey::new(OperatorAttrs::new(OperatorType::Relu)));
//! let estimator = FnCostEstimator::new(
//!     |_key| Ok(OpCostMetrics::new(1.0, 1.0, 64)),
//!     |_movement| Ok(Milliseconds(0.0)),
//! );
//! let optimizer = OptimizerAttrs::default();
//! let views = TaskSpaceViews::default();
//! let ctx = MachineMappingContext::new(&estimator, &optimizer, &views);
//!
//! let machine = MachineSpecification::new(1, 1, 2, 1.0, 1.0);
//! let result = get_optimal_machine_mapping(
//!     &mut MachineMappingCache::new(),
//!     &ctx,
//!     &tree,
//!     &machine,
//!     &MachineMappingConstraints::for_tree(&tree),
//! )
//! .unwrap();
//! assert_eq!(result.len(), 1);
//! ```

mod cache;
mod config;
mod constraints;
mod context;
mod cost;
mod error;
mod report;
pub mod result;
mod search;

pub use cache::{CacheStats, MachineMappingCache, MachineMappingState};
pub use config::MapperConfig;
pub use constraints::MachineMappingConstraints;
pub use context::{AllowedMachineViews, MachineMappingContext, TaskSpaceViews};
pub use cost::{
    CostEstimateError, CostEstimator, CountingCostEstimator, FnCostEstimator, Milliseconds,
    MovementCostEntry, OpCostEntry, OpCostMetrics, TableCostEstimator,
};
pub use error::MappingError;
pub use report::{optimize_machine_mapping, MappingReport};
pub use result::{
    require_feasible, FeasibleMachineMappingResult, MachineMappingPoint, MachineMappingResult,
    ParallelSplitTransformation,
};
pub use search::get_optimal_machine_mapping;
