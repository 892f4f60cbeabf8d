// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor movements across a series split.
//!
//! A series node records which tensors flow from its left subtree to its
//! right subtree. In abstracted form the endpoints are leaf paths: sources
//! relative to the left child, destinations relative to the right child.
//! Once boundary leaves are given machine views the movement is concretized
//! into device-level endpoints a cost estimator can price.

use crate::{BinaryTreePath, MachineMapping, ProblemTreeError};
use machine_spec::MachineView;
use std::collections::BTreeSet;
use tensor_core::ParallelTensorShape;

/// One tensor crossing a series split, with leaf-path endpoints.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct AbstractedSingleTensorMovement {
    pub shape: ParallelTensorShape,
    /// Producing leaves, relative to the left child.
    #[serde(default)]
    pub src_paths: BTreeSet<BinaryTreePath>,
    /// Consuming leaves, relative to the right child.
    #[serde(default)]
    pub dst_paths: BTreeSet<BinaryTreePath>,
}

/// Every tensor crossing a series split.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct AbstractedTensorSetMovement {
    #[serde(default)]
    pub movements: Vec<AbstractedSingleTensorMovement>,
}

impl AbstractedTensorSetMovement {
    pub fn new(movements: Vec<AbstractedSingleTensorMovement>) -> Self {
        Self { movements }
    }

    /// No data crosses the split.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }

    /// Boundary leaves on the producing side.
    pub fn src_layers(&self) -> BTreeSet<BinaryTreePath> {
        self.movements
            .iter()
            .flat_map(|m| m.src_paths.iter().cloned())
            .collect()
    }

    /// Boundary leaves on the consuming side.
    pub fn dst_layers(&self) -> BTreeSet<BinaryTreePath> {
        self.movements
            .iter()
            .flat_map(|m| m.dst_paths.iter().cloned())
            .collect()
    }

    /// Resolves every endpoint to the view its leaf was assigned.
    ///
    /// `pre` must cover every source path and `post` every destination path.
    pub fn concretize(
        &self,
        pre: &MachineMapping,
        post: &MachineMapping,
    ) -> Result<TensorSetMovement, ProblemTreeError> {
        let resolve = |paths: &BTreeSet<BinaryTreePath>, mapping: &MachineMapping| {
            paths
                .iter()
                .map(|p| {
                    mapping
                        .get(p)
                        .cloned()
                        .ok_or_else(|| ProblemTreeError::UnmappedPath { path: p.clone() })
                })
                .collect::<Result<BTreeSet<MachineView>, _>>()
        };

        let movements = self
            .movements
            .iter()
            .map(|m| {
                Ok(SingleTensorMovement {
                    shape: m.shape.clone(),
                    src_views: resolve(&m.src_paths, pre)?,
                    dst_views: resolve(&m.dst_paths, post)?,
                })
            })
            .collect::<Result<Vec<_>, ProblemTreeError>>()?;

        Ok(TensorSetMovement { movements })
    }
}

/// One tensor crossing a split, with device-level endpoints.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct SingleTensorMovement {
    pub shape: ParallelTensorShape,
    pub src_views: BTreeSet<MachineView>,
    pub dst_views: BTreeSet<MachineView>,
}

/// Every tensor crossing a split, with device-level endpoints.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct TensorSetMovement {
    pub movements: Vec<SingleTensorMovement>,
}

impl TensorSetMovement {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }

    /// Total bytes moved, counting each tensor once.
    pub fn total_bytes(&self) -> usize {
        self.movements.iter().map(|m| m.shape.size_bytes()).sum()
    }
}
