// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Root-to-node paths in a binary tree.
//!
//! Paths identify nodes by position rather than by pointer, so structurally
//! identical subtrees in different places of a larger tree agree on the
//! paths of their own leaves.
//!
//! ```text
//!            <root>
//!           /      \
//!          L        R
//!        /   \
//!       LL    LR
//! ```

use crate::ProblemTreeError;
use std::fmt;
use std::str::FromStr;

/// One step down a binary tree.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum BinaryTreePathEntry {
    LeftChild,
    RightChild,
}

impl BinaryTreePathEntry {
    fn as_char(self) -> char {
        match self {
            Self::LeftChild => 'L',
            Self::RightChild => 'R',
        }
    }
}

/// An ordered sequence of steps from a root to a node. Empty is the root.
///
/// Serialised as a compact string (`""` for the root, `"LR"` for the right
/// child of the left child) so it can key JSON maps.
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
#[serde(try_from = "String", into = "String")]
pub struct BinaryTreePath {
    entries: Vec<BinaryTreePathEntry>,
}

impl BinaryTreePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(entries: Vec<BinaryTreePathEntry>) -> Self {
        Self { entries }
    }

    pub fn left() -> Self {
        Self::new(vec![BinaryTreePathEntry::LeftChild])
    }

    pub fn right() -> Self {
        Self::new(vec![BinaryTreePathEntry::RightChild])
    }

    pub fn is_root(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[BinaryTreePathEntry] {
        &self.entries
    }

    /// Returns this path with `entry` inserted at the front.
    pub fn prepend(&self, entry: BinaryTreePathEntry) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.push(entry);
        entries.extend_from_slice(&self.entries);
        Self { entries }
    }

    /// Returns this path extended by one step at the end.
    pub fn child(&self, entry: BinaryTreePathEntry) -> Self {
        let mut entries = self.entries.clone();
        entries.push(entry);
        Self { entries }
    }

    /// Splits off the first step. `None` for the root.
    pub fn split_first(&self) -> Option<(BinaryTreePathEntry, BinaryTreePath)> {
        self.entries
            .split_first()
            .map(|(first, rest)| (*first, Self::new(rest.to_vec())))
    }

    /// If this path starts with `entry`, returns the remainder.
    pub fn strip_prefix(&self, entry: BinaryTreePathEntry) -> Option<BinaryTreePath> {
        match self.split_first() {
            Some((first, rest)) if first == entry => Some(rest),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryTreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("<root>");
        }
        for e in &self.entries {
            write!(f, "{}", e.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for BinaryTreePath {
    type Err = ProblemTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "<root>" {
            return Ok(Self::root());
        }
        s.chars()
            .map(|c| match c.to_ascii_uppercase() {
                'L' => Ok(BinaryTreePathEntry::LeftChild),
                'R' => Ok(BinaryTreePathEntry::RightChild),
                _ => Err(ProblemTreeError::InvalidPath(s.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

impl TryFrom<String> for BinaryTreePath {
    type Error = ProblemTreeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<BinaryTreePath> for String {
    fn from(p: BinaryTreePath) -> Self {
        p.entries.iter().map(|e| e.as_char()).collect()
    }
}
