// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for problem-tree construction, loading and queries.

use crate::BinaryTreePath;

/// Errors that can occur when working with problem trees.
#[derive(Debug, thiserror::Error)]
pub enum ProblemTreeError {
    /// A path does not name any node of the tree.
    #[error("no node at path {path}")]
    UnknownPath { path: BinaryTreePath },

    /// A path names an interior node where a leaf was required.
    #[error("node at path {path} is not a leaf")]
    NotALeaf { path: BinaryTreePath },

    /// A movement endpoint has no machine view in the supplied mapping.
    #[error("no machine view assigned to path {path}")]
    UnmappedPath { path: BinaryTreePath },

    /// A path string could not be parsed.
    #[error("invalid tree path '{0}': expected a sequence of 'L' and 'R'")]
    InvalidPath(String),

    /// The tree is structurally malformed.
    #[error("invalid problem tree: {0}")]
    InvalidTree(String),

    /// The problem file could not be read.
    #[error("failed to read problem file: {0}")]
    Io(#[from] std::io::Error),

    /// The problem JSON is malformed.
    #[error("failed to parse problem: {0}")]
    Parse(#[from] serde_json::Error),
}
