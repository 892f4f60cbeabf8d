// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Enumeration of the machine views a task space fits into.

use crate::{
    enumerate::cartesian_product, get_machine_space_coordinate, DeviceType,
    MachineSpaceCoordinate, MachineSpecification, MachineSpecificationDimension, MachineView,
    MachineViewDimension, OperatorTaskSpace,
};
use std::collections::BTreeSet;

/// Returns every view that places all tasks of `task` on `spec`.
///
/// Candidates are every combination of per-dimension stride (`1..=bound`),
/// start device and projection sequence. A candidate is kept when the
/// largest task coordinate still maps inside the machine.
pub fn get_allowed_machine_views(
    spec: &MachineSpecification,
    task: &OperatorTaskSpace,
    device_type: DeviceType,
) -> BTreeSet<MachineView> {
    let max_coord = task.max_coordinate();

    let mut views = BTreeSet::new();
    for view in candidate_views(spec, task, device_type) {
        if get_machine_space_coordinate(task, &view, &max_coord, spec).is_some() {
            views.insert(view);
        }
    }

    tracing::trace!(
        degrees = ?task.degrees,
        machine = %spec,
        count = views.len(),
        "enumerated allowed machine views"
    );
    views
}

/// Upper bound on any single stride: a larger one cannot fit even the
/// second task of that dimension.
fn max_stride(spec: &MachineSpecification, task: &OperatorTaskSpace, dt: DeviceType) -> usize {
    let total = spec.num_devices(dt);
    let spread: usize = task.degrees.iter().map(|d| d.saturating_sub(1)).product();
    if spread == 0 {
        total
    } else {
        total / spread
    }
}

fn candidate_views(
    spec: &MachineSpecification,
    task: &OperatorTaskSpace,
    device_type: DeviceType,
) -> Vec<MachineView> {
    let k = task.num_dims();
    let bound = max_stride(spec, task, device_type);

    let stride_choices = cartesian_product(&vec![(1..=bound).collect::<Vec<_>>(); k]);
    let projection_choices = cartesian_product(&vec![MachineSpecificationDimension::ALL.to_vec(); k]);
    let starts: Vec<MachineSpaceCoordinate> = (0..spec.num_nodes)
        .flat_map(|node| {
            (0..spec.num_devices_per_node(device_type))
                .map(move |device| MachineSpaceCoordinate::new(node, device, device_type))
        })
        .collect();

    let mut out = Vec::new();
    for strides in &stride_choices {
        for start in &starts {
            for projections in &projection_choices {
                let dimensions = strides
                    .iter()
                    .zip(projections)
                    .map(|(&s, &p)| MachineViewDimension::new(s, p))
                    .collect();
                out.push(MachineView::new(*start, dimensions));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use MachineSpecificationDimension::{InterNode, IntraNode};

    fn gpu(node: usize, device: usize) -> MachineSpaceCoordinate {
        MachineSpaceCoordinate::new(node, device, DeviceType::Gpu)
    }

    fn view_2d(
        node: usize,
        device: usize,
        s1: usize,
        s2: usize,
        p1: MachineSpecificationDimension,
        p2: MachineSpecificationDimension,
    ) -> MachineView {
        MachineView::new(
            gpu(node, device),
            vec![
                MachineViewDimension::new(s1, p1),
                MachineViewDimension::new(s2, p2),
            ],
        )
    }

    #[test]
    fn test_one_degree_of_parallelism() {
        let spec = MachineSpecification::new(1, 5, 5, 0.0, 0.0);
        let task = OperatorTaskSpace::new(vec![3]);
        let expected: BTreeSet<_> = [
            MachineView::intra_node(gpu(0, 0), 1),
            MachineView::intra_node(gpu(0, 1), 1),
            MachineView::intra_node(gpu(0, 2), 1),
            MachineView::intra_node(gpu(0, 0), 2),
        ]
        .into_iter()
        .collect();
        assert_eq!(get_allowed_machine_views(&spec, &task, DeviceType::Gpu), expected);
    }

    #[test]
    fn test_two_degrees_of_parallelism() {
        let spec = MachineSpecification::new(3, 3, 3, 0.0, 0.0);
        let task = OperatorTaskSpace::new(vec![2, 3]);
        let expected: BTreeSet<_> = [
            view_2d(0, 0, 1, 1, InterNode, IntraNode),
            view_2d(1, 0, 1, 1, InterNode, IntraNode),
            view_2d(0, 0, 2, 1, InterNode, IntraNode),
            view_2d(0, 0, 1, 1, IntraNode, InterNode),
            view_2d(0, 1, 1, 1, IntraNode, InterNode),
            view_2d(0, 0, 2, 1, IntraNode, InterNode),
        ]
        .into_iter()
        .collect();
        assert_eq!(get_allowed_machine_views(&spec, &task, DeviceType::Gpu), expected);
    }

    #[test]
    fn test_task_too_large_has_no_views() {
        let spec = MachineSpecification::new(1, 1, 2, 0.0, 0.0);
        let task = OperatorTaskSpace::new(vec![4]);
        assert!(get_allowed_machine_views(&spec, &task, DeviceType::Gpu).is_empty());
    }

    #[test]
    fn test_degree_one_uses_total_as_stride_bound() {
        let spec = MachineSpecification::new(1, 1, 2, 0.0, 0.0);
        let task = OperatorTaskSpace::new(vec![1]);
        // strides 1..=2 × two starts × both projections; a single task never
        // leaves its start device
        let views = get_allowed_machine_views(&spec, &task, DeviceType::Gpu);
        assert_eq!(views.len(), 2 * 2 * 2);
    }

    #[test]
    fn test_device_type_is_respected() {
        let spec = MachineSpecification::new(1, 2, 4, 0.0, 0.0);
        let task = OperatorTaskSpace::new(vec![4]);
        assert!(get_allowed_machine_views(&spec, &task, DeviceType::Cpu).is_empty());
        assert!(!get_allowed_machine_views(&spec, &task, DeviceType::Gpu).is_empty());
    }
}
