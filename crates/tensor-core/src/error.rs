// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for shape construction.

/// Errors that can occur when building or sharding a shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// The number of shard degrees does not match the tensor rank.
    #[error("rank mismatch: shape has {rank} dims, got {degrees} shard degrees")]
    RankMismatch { rank: usize, degrees: usize },

    /// A parallel degree was zero.
    #[error("parallel degree for dim {dim} must be at least 1")]
    ZeroDegree { dim: usize },

    /// A shard degree does not evenly divide its dimension.
    #[error("degree {degree} does not divide dim {dim} of size {size}")]
    IndivisibleDegree {
        dim: usize,
        size: usize,
        degree: usize,
    },
}
