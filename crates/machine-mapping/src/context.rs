// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Read-only collaborators shared by every step of a search.

use crate::CostEstimator;
use machine_spec::{get_allowed_machine_views, DeviceType, MachineSpecification, MachineView};
use problem_tree::{OptimizerAttrs, UnmappedOpCostEstimateKey};
use std::collections::BTreeSet;

/// Reports the placements an operator may take on a pool of resources.
///
/// An empty set means the operator cannot be placed on `resources`.
pub trait AllowedMachineViews: Send + Sync {
    fn allowed_machine_views(
        &self,
        op: &UnmappedOpCostEstimateKey,
        resources: &MachineSpecification,
    ) -> BTreeSet<MachineView>;
}

impl<F> AllowedMachineViews for F
where
    F: Fn(&UnmappedOpCostEstimateKey, &MachineSpecification) -> BTreeSet<MachineView> + Send + Sync,
{
    fn allowed_machine_views(
        &self,
        op: &UnmappedOpCostEstimateKey,
        resources: &MachineSpecification,
    ) -> BTreeSet<MachineView> {
        self(op, resources)
    }
}

/// Derives placements from the operator's task space.
///
/// Every operator goes on devices of one type; its parallel degrees come from
/// its first output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpaceViews {
    pub device_type: DeviceType,
}

impl TaskSpaceViews {
    pub fn new(device_type: DeviceType) -> Self {
        Self { device_type }
    }
}

impl Default for TaskSpaceViews {
    fn default() -> Self {
        Self::new(DeviceType::Gpu)
    }
}

impl AllowedMachineViews for TaskSpaceViews {
    fn allowed_machine_views(
        &self,
        op: &UnmappedOpCostEstimateKey,
        resources: &MachineSpecification,
    ) -> BTreeSet<MachineView> {
        get_allowed_machine_views(resources, &op.operator_task_space(), self.device_type)
    }
}

/// Everything a search needs besides the problem itself.
#[derive(Clone, Copy)]
pub struct MachineMappingContext<'a> {
    pub cost_estimator: &'a dyn CostEstimator,
    /// Attached to every leaf before it is priced.
    pub optimizer_attrs: &'a OptimizerAttrs,
    pub allowed_machine_views: &'a dyn AllowedMachineViews,
}

impl<'a> MachineMappingContext<'a> {
    pub fn new(
        cost_estimator: &'a dyn CostEstimator,
        optimizer_attrs: &'a OptimizerAttrs,
        allowed_machine_views: &'a dyn AllowedMachineViews,
    ) -> Self {
        Self {
            cost_estimator,
            optimizer_attrs,
            allowed_machine_views,
        }
    }
}
