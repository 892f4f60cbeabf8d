// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # machine-spec
//!
//! Describes the machine an operator graph is mapped onto, and the ways an
//! operator can be placed on it.
//!
//! # Key Components
//!
//! - [`MachineSpecification`]: nodes × devices per node, plus bandwidths.
//! - [`MachineView`]: a concrete placement: a start coordinate and one
//!   stride/projection per parallel dimension of the operator.
//! - [`OperatorTaskSpace`]: the parallel degrees an operator runs with.
//! - [`get_allowed_machine_views`]: every view that fits a task space on a
//!   machine.
//! - [`get_machine_resource_splits`]: every way to cut a machine into two
//!   complementary halves for parallel branches.
//! - [`MemoryBudget`]: a per-plan memory ceiling with human-readable parsing.
//! - [`enumerate`]: cartesian products and all-assignments enumeration.
//!
//! # Coordinate Model
//!
//! ```text
//!              device_idx →
//!            ┌────┬────┬────┐
//!  node 0    │ 0,0│ 0,1│ 0,2│   intra-node dimension: device_idx
//!            ├────┼────┼────┤
//!  node 1    │ 1,0│ 1,1│ 1,2│   inter-node dimension: node_idx
//!            └────┴────┴────┘
//! ```
//!
//! # Example
//! ```
//! use machine_spec::{get_allowed_machine_views, DeviceType, MachineSpecification, OperatorTaskSpace};
//!
//! let machine = MachineSpecification::new(1, 5, 5, 0.0, 0.0);
//! let views = get_allowed_machine_views(&machine, &OperatorTaskSpace::new(vec![3]), DeviceType::Gpu);
//! assert_eq!(views.len(), 4);
//! ```

mod allowed;
mod budget;
pub mod enumerate;
mod error;
mod spec;
mod splits;
mod task_space;
mod view;

pub use allowed::get_allowed_machine_views;
pub use budget::MemoryBudget;
pub use error::MachineSpecError;
pub use spec::{DeviceType, MachineSpecification};
pub use splits::get_machine_resource_splits;
pub use task_space::{get_machine_space_coordinate, OperatorTaskSpace};
pub use view::{
    MachineSpaceCoordinate, MachineSpecificationDimension, MachineView, MachineViewDimension,
};
