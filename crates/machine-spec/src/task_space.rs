// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operator task spaces and the task → device mapping.

use crate::{
    enumerate::cartesian_product, MachineSpaceCoordinate, MachineSpecification,
    MachineSpecificationDimension, MachineView,
};

/// The parallel degrees an operator executes with.
///
/// An operator with degrees `[2, 3]` runs as six tasks, addressed by
/// coordinates `(0..2, 0..3)`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct OperatorTaskSpace {
    pub degrees: Vec<usize>,
}

impl OperatorTaskSpace {
    pub fn new(degrees: Vec<usize>) -> Self {
        Self { degrees }
    }

    pub fn num_dims(&self) -> usize {
        self.degrees.len()
    }

    /// Number of tasks (product of degrees).
    pub fn num_tasks(&self) -> usize {
        self.degrees.iter().product()
    }

    /// The largest task coordinate, `degree - 1` in every dimension.
    pub fn max_coordinate(&self) -> Vec<usize> {
        self.degrees.iter().map(|d| d.saturating_sub(1)).collect()
    }

    /// Every task coordinate in row-major order.
    pub fn coordinates(&self) -> Vec<Vec<usize>> {
        let axes: Vec<Vec<usize>> = self.degrees.iter().map(|&d| (0..d).collect()).collect();
        cartesian_product(&axes)
    }
}

/// Maps a task coordinate to the device it runs on under `view`.
///
/// Dimensions projected onto the same machine axis are laid out in order:
/// the first has coefficient 1, each following one is scaled by the extent
/// (`degree × stride`) of those before it. Returns `None` if the task lands
/// outside `spec`, or if the coordinate's rank does not match the view.
pub fn get_machine_space_coordinate(
    task: &OperatorTaskSpace,
    view: &MachineView,
    coord: &[usize],
    spec: &MachineSpecification,
) -> Option<MachineSpaceCoordinate> {
    if coord.len() != task.num_dims() || view.num_dims() != task.num_dims() {
        return None;
    }

    let index_along = |axis: MachineSpecificationDimension| -> usize {
        let mut coeff = 1usize;
        let mut index = view.start.index_along(axis);
        for ((dim, &degree), &c) in view.dimensions.iter().zip(&task.degrees).zip(coord) {
            if dim.projection != axis {
                continue;
            }
            index += coeff * c * dim.stride;
            coeff *= degree * dim.stride;
        }
        index
    };

    let result = MachineSpaceCoordinate {
        node_idx: index_along(MachineSpecificationDimension::InterNode),
        device_idx: index_along(MachineSpecificationDimension::IntraNode),
        device_type: view.device_type(),
    };
    spec.is_valid_coordinate(&result).then_some(result)
}
