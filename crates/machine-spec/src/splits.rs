// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Bipartitioning a machine for parallel branches.

use crate::MachineSpecification;

/// Returns every way to cut `spec` into two complementary halves.
///
/// Cuts are taken along one axis at a time, at power-of-two offsets:
/// `(i, n - i)` nodes for `i = 1, 2, 4, … < num_nodes`, then the same over
/// GPUs per node. Each cut is returned in both orientations. Order is
/// deterministic and duplicates are removed.
///
/// ```
/// use machine_spec::{get_machine_resource_splits, MachineSpecification};
///
/// let m = MachineSpecification::new(2, 1, 1, 1.0, 1.0);
/// let splits = get_machine_resource_splits(&m);
/// assert_eq!(splits.len(), 1);
/// assert_eq!(splits[0].0.num_nodes, 1);
/// ```
pub fn get_machine_resource_splits(
    spec: &MachineSpecification,
) -> Vec<(MachineSpecification, MachineSpecification)> {
    let mut splits: Vec<(MachineSpecification, MachineSpecification)> = Vec::new();
    let mut push = |pair: (MachineSpecification, MachineSpecification)| {
        if !splits.contains(&pair) {
            splits.push(pair);
        }
    };

    for i in powers_of_two_below(spec.num_nodes) {
        let with_nodes = |n| MachineSpecification {
            num_nodes: n,
            ..spec.clone()
        };
        let rest = spec.num_nodes - i;
        push((with_nodes(i), with_nodes(rest)));
        push((with_nodes(rest), with_nodes(i)));
    }

    for i in powers_of_two_below(spec.num_gpus_per_node) {
        let with_gpus = |g| MachineSpecification {
            num_gpus_per_node: g,
            ..spec.clone()
        };
        let rest = spec.num_gpus_per_node - i;
        push((with_gpus(i), with_gpus(rest)));
        push((with_gpus(rest), with_gpus(i)));
    }

    splits
}

fn powers_of_two_below(n: usize) -> impl Iterator<Item = usize> {
    std::iter::successors(Some(1usize), |i| i.checked_mul(2)).take_while(move |&i| i < n)
}
