// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Machine topology description.

use crate::{MachineSpaceCoordinate, MachineSpecError};
use ordered_float::OrderedFloat;
use std::fmt;

/// The kind of device an operator is placed on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Gpu,
    Cpu,
}

impl DeviceType {
    /// Parses a device type, case-insensitively.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gpu" | "cuda" => Some(Self::Gpu),
            "cpu" | "host" => Some(Self::Cpu),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gpu => "gpu",
            Self::Cpu => "cpu",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pool of machine resources a (sub)problem may be mapped onto.
///
/// Immutable value type. Bandwidths are wrapped in [`OrderedFloat`] so the
/// whole specification is `Eq + Hash + Ord` and can be part of a cache key.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct MachineSpecification {
    pub num_nodes: usize,
    pub num_cpus_per_node: usize,
    pub num_gpus_per_node: usize,
    /// Bandwidth between devices on different nodes.
    pub inter_node_bandwidth: OrderedFloat<f64>,
    /// Bandwidth between devices on the same node.
    pub intra_node_bandwidth: OrderedFloat<f64>,
}

impl MachineSpecification {
    pub fn new(
        num_nodes: usize,
        num_cpus_per_node: usize,
        num_gpus_per_node: usize,
        inter_node_bandwidth: f64,
        intra_node_bandwidth: f64,
    ) -> Self {
        Self {
            num_nodes,
            num_cpus_per_node,
            num_gpus_per_node,
            inter_node_bandwidth: OrderedFloat(inter_node_bandwidth),
            intra_node_bandwidth: OrderedFloat(intra_node_bandwidth),
        }
    }

    /// Checks that the machine has at least one node and one device of each
    /// kind per node, and that bandwidths are non-negative.
    pub fn validate(&self) -> Result<(), MachineSpecError> {
        if self.num_nodes == 0 {
            return Err(MachineSpecError::EmptyResource { what: "node" });
        }
        if self.num_cpus_per_node == 0 {
            return Err(MachineSpecError::EmptyResource { what: "cpu per node" });
        }
        if self.num_gpus_per_node == 0 {
            return Err(MachineSpecError::EmptyResource { what: "gpu per node" });
        }
        for (which, bw) in [
            ("inter-node", self.inter_node_bandwidth),
            ("intra-node", self.intra_node_bandwidth),
        ] {
            if bw.is_nan() || bw.0 < 0.0 {
                return Err(MachineSpecError::InvalidBandwidth {
                    which,
                    value: bw.0,
                });
            }
        }
        Ok(())
    }

    /// Number of devices of the given type on each node.
    pub fn num_devices_per_node(&self, device_type: DeviceType) -> usize {
        match device_type {
            DeviceType::Gpu => self.num_gpus_per_node,
            DeviceType::Cpu => self.num_cpus_per_node,
        }
    }

    /// Total number of devices of the given type.
    pub fn num_devices(&self, device_type: DeviceType) -> usize {
        self.num_nodes * self.num_devices_per_node(device_type)
    }

    /// Returns `true` if the coordinate names a device on this machine.
    pub fn is_valid_coordinate(&self, coord: &MachineSpaceCoordinate) -> bool {
        coord.node_idx < self.num_nodes
            && coord.device_idx < self.num_devices_per_node(coord.device_type)
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "{} node(s) × ({} gpu, {} cpu), bandwidth inter {:.1} / intra {:.1}",
            self.num_nodes,
            self.num_gpus_per_node,
            self.num_cpus_per_node,
            self.inter_node_bandwidth.0,
            self.intra_node_bandwidth.0,
        )
    }
}

impl fmt::Display for MachineSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}n×{}g×{}c",
            self.num_nodes, self.num_gpus_per_node, self.num_cpus_per_node
        )
    }
}
