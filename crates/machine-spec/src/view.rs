// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Device coordinates and machine views.

use crate::DeviceType;
use std::fmt;

/// A single device on the machine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct MachineSpaceCoordinate {
    pub node_idx: usize,
    pub device_idx: usize,
    pub device_type: DeviceType,
}

impl MachineSpaceCoordinate {
    pub fn new(node_idx: usize, device_idx: usize, device_type: DeviceType) -> Self {
        Self {
            node_idx,
            device_idx,
            device_type,
        }
    }

    /// Returns the index along the given machine dimension.
    pub fn index_along(&self, dim: MachineSpecificationDimension) -> usize {
        match dim {
            MachineSpecificationDimension::InterNode => self.node_idx,
            MachineSpecificationDimension::IntraNode => self.device_idx,
        }
    }
}

impl fmt::Display for MachineSpaceCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{})",
            self.device_type, self.node_idx, self.device_idx
        )
    }
}

/// The machine axis a parallel dimension of an operator is laid out along.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MachineSpecificationDimension {
    /// Across nodes.
    InterNode,
    /// Across devices within a node.
    IntraNode,
}

impl MachineSpecificationDimension {
    pub const ALL: [Self; 2] = [Self::InterNode, Self::IntraNode];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InterNode => "inter",
            Self::IntraNode => "intra",
        }
    }
}

/// How one parallel dimension of an operator is laid out on the machine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct MachineViewDimension {
    /// Distance between consecutive tasks along the machine axis (≥ 1).
    pub stride: usize,
    pub projection: MachineSpecificationDimension,
}

impl MachineViewDimension {
    pub fn new(stride: usize, projection: MachineSpecificationDimension) -> Self {
        Self { stride, projection }
    }
}

/// A concrete device placement for one operator.
///
/// A view is a starting device plus one stride/projection per parallel
/// dimension of the operator's task space. Equality, hashing and ordering
/// are purely structural.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct MachineView {
    pub start: MachineSpaceCoordinate,
    pub dimensions: Vec<MachineViewDimension>,
}

impl MachineView {
    pub fn new(start: MachineSpaceCoordinate, dimensions: Vec<MachineViewDimension>) -> Self {
        Self { start, dimensions }
    }

    /// A view with a single intra-node dimension, the common 1-D case.
    pub fn intra_node(start: MachineSpaceCoordinate, stride: usize) -> Self {
        Self::new(
            start,
            vec![MachineViewDimension::new(
                stride,
                MachineSpecificationDimension::IntraNode,
            )],
        )
    }

    pub fn num_dims(&self) -> usize {
        self.dimensions.len()
    }

    pub fn device_type(&self) -> DeviceType {
        self.start.device_type
    }

    pub fn strides(&self) -> Vec<usize> {
        self.dimensions.iter().map(|d| d.stride).collect()
    }

    pub fn projections(&self) -> Vec<MachineSpecificationDimension> {
        self.dimensions.iter().map(|d| d.projection).collect()
    }
}

impl fmt::Display for MachineView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.start)?;
        for (i, d) in self.dimensions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", d.stride, d.projection.as_str())?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let v = MachineView::new(
            MachineSpaceCoordinate::new(0, 1, DeviceType::Gpu),
            vec![
                MachineViewDimension::new(2, MachineSpecificationDimension::InterNode),
                MachineViewDimension::new(1, MachineSpecificationDimension::IntraNode),
            ],
        );
        assert_eq!(format!("{v}"), "gpu(0,1)[2:inter, 1:intra]");
        assert_eq!(v.strides(), vec![2, 1]);
        assert_eq!(v.num_dims(), 2);
    }

    #[test]
    fn test_structural_equality() {
        let a = MachineView::intra_node(MachineSpaceCoordinate::new(0, 0, DeviceType::Gpu), 1);
        let b = MachineView::intra_node(MachineSpaceCoordinate::new(0, 0, DeviceType::Gpu), 1);
        let c = MachineView::intra_node(MachineSpaceCoordinate::new(0, 0, DeviceType::Gpu), 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
    }

    #[test]
    fn test_serde_shape() {
        let v = MachineView::intra_node(MachineSpaceCoordinate::new(1, 0, DeviceType::Cpu), 1);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["start"]["device_type"], "cpu");
        assert_eq!(json["dimensions"][0]["projection"], "intra_node");
    }
}
