// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Parallel tensor shapes: logical dimensions plus parallel degrees.
//!
//! A tensor in a parallel computation graph is split in up to three ways:
//!
//! ```text
//! shard degree (per dim) : the dimension is cut into `degree` pieces
//! sum degree             : partial sums that must be reduced
//! discard-copy degree    : identical replicas
//! ```
//!
//! The product of all degrees is the number of device-local pieces.

use crate::{DType, Shape, ShapeError};
use std::fmt;

/// One logical dimension and the number of shards it is cut into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ShardDim {
    pub size: usize,
    pub degree: usize,
}

/// A tensor shape annotated with how it is parallelised across devices.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ParallelTensorShape {
    pub dims: Vec<ShardDim>,
    #[serde(default = "one")]
    pub sum_degree: usize,
    #[serde(default = "one")]
    pub discard_copy_degree: usize,
    pub dtype: DType,
}

fn one() -> usize {
    1
}

impl ParallelTensorShape {
    /// Lifts a logical shape to an unparallelised one (every degree is 1).
    pub fn lift(shape: &Shape, dtype: DType) -> Self {
        Self {
            dims: shape
                .dims()
                .iter()
                .map(|&size| ShardDim { size, degree: 1 })
                .collect(),
            sum_degree: 1,
            discard_copy_degree: 1,
            dtype,
        }
    }

    /// Returns a copy with the given per-dimension shard degrees.
    ///
    /// Every degree must be non-zero and divide its dimension.
    pub fn with_shard_degrees(mut self, degrees: &[usize]) -> Result<Self, ShapeError> {
        if degrees.len() != self.dims.len() {
            return Err(ShapeError::RankMismatch {
                rank: self.dims.len(),
                degrees: degrees.len(),
            });
        }
        for (dim, (shard, &degree)) in self.dims.iter_mut().zip(degrees).enumerate() {
            if degree == 0 {
                return Err(ShapeError::ZeroDegree { dim });
            }
            if shard.size % degree != 0 {
                return Err(ShapeError::IndivisibleDegree {
                    dim,
                    size: shard.size,
                    degree,
                });
            }
            shard.degree = degree;
        }
        Ok(self)
    }

    /// Returns a copy with the given replica degrees.
    pub fn with_replica_degrees(
        mut self,
        sum_degree: usize,
        discard_copy_degree: usize,
    ) -> Result<Self, ShapeError> {
        if sum_degree == 0 || discard_copy_degree == 0 {
            return Err(ShapeError::ZeroDegree {
                dim: self.dims.len(),
            });
        }
        self.sum_degree = sum_degree;
        self.discard_copy_degree = discard_copy_degree;
        Ok(self)
    }

    /// Returns the tensor rank.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the per-dimension shard degrees.
    pub fn shard_degrees(&self) -> Vec<usize> {
        self.dims.iter().map(|d| d.degree).collect()
    }

    /// Returns the product of every parallel degree.
    pub fn total_parallel_degree(&self) -> usize {
        self.dims.iter().map(|d| d.degree).product::<usize>()
            * self.sum_degree
            * self.discard_copy_degree
    }

    /// Returns the logical (unsharded) shape.
    pub fn logical_shape(&self) -> Shape {
        Shape::new(self.dims.iter().map(|d| d.size).collect())
    }

    /// Returns the shape of the piece each device holds.
    pub fn piece_shape(&self) -> Shape {
        Shape::new(
            self.dims
                .iter()
                .map(|d| d.size / d.degree.max(1))
                .collect(),
        )
    }

    /// Returns `true` if the logical shape contains a zero dimension.
    pub fn is_degenerate(&self) -> bool {
        self.dims.iter().any(|d| d.size == 0)
    }

    /// Size of the full logical tensor in bytes.
    pub fn size_bytes(&self) -> usize {
        self.logical_shape().size_bytes(self.dtype)
    }

    /// Size of one device-local piece in bytes.
    pub fn piece_size_bytes(&self) -> usize {
        self.piece_shape().size_bytes(self.dtype)
    }
}

impl fmt::Display for ParallelTensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if d.degree == 1 {
                write!(f, "{}", d.size)?;
            } else {
                write!(f, "{}/{}", d.size, d.degree)?;
            }
        }
        write!(
            f,
            "] {} sum={} copy={}",
            self.dtype, self.sum_degree, self.discard_copy_degree
        )
    }
}
