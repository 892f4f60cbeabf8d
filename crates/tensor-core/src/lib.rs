// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Shape descriptors shared by the machine-mapping crates.
//!
//! This crate provides:
//! - [`Shape`]: logical (unsharded) tensor dimensions.
//! - [`DType`]: supported element data types.
//! - [`ParallelTensorShape`]: a shape annotated with per-dimension shard
//!   degrees plus the sum and discard-copy replica degrees, i.e. how a
//!   tensor is spread over devices.
//!
//! No tensor data lives here: the planner only reasons about sizes.
//!
//! # Example
//! ```
//! use tensor_core::{DType, ParallelTensorShape, Shape};
//!
//! let logical = Shape::matrix(12, 8);
//! let sharded = ParallelTensorShape::lift(&logical, DType::F32)
//!     .with_shard_degrees(&[2, 1])
//!     .unwrap();
//! assert_eq!(sharded.total_parallel_degree(), 2);
//! assert_eq!(sharded.piece_shape().dims(), &[6, 8]);
//! ```

mod dtype;
mod error;
mod parallel;
mod shape;

pub use dtype::DType;
pub use error::ShapeError;
pub use parallel::{ParallelTensorShape, ShardDim};
pub use shape::Shape;
