// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Path-keyed machine mappings.

use crate::{BinaryTreePath, BinaryTreePathEntry};
use machine_spec::MachineView;
use std::collections::BTreeMap;
use std::fmt;

/// An assignment of machine views to leaves, keyed by tree path.
///
/// Keys are relative to whichever (sub)tree the mapping was produced for,
/// so a mapping is independent of layer identity and can be reused for any
/// structurally identical subtree.
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
#[serde(transparent)]
pub struct MachineMapping {
    views: BTreeMap<BinaryTreePath, MachineView>,
}

impl MachineMapping {
    pub fn new(views: BTreeMap<BinaryTreePath, MachineView>) -> Self {
        Self { views }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// A mapping for a single-leaf tree.
    pub fn singleton_root(view: MachineView) -> Self {
        Self::new(BTreeMap::from([(BinaryTreePath::root(), view)]))
    }

    /// Joins the mappings of two sibling subtrees into one for their parent.
    ///
    /// Every path of `left` gains a leading left step, every path of `right`
    /// a leading right step, so the result never has colliding keys.
    pub fn combine(left: &MachineMapping, right: &MachineMapping) -> Self {
        let prefixed = |m: &MachineMapping, entry| {
            m.views
                .iter()
                .map(move |(p, v)| (p.prepend(entry), v.clone()))
                .collect::<Vec<_>>()
        };
        let mut views = BTreeMap::new();
        views.extend(prefixed(left, BinaryTreePathEntry::LeftChild));
        views.extend(prefixed(right, BinaryTreePathEntry::RightChild));
        Self { views }
    }

    pub fn get(&self, path: &BinaryTreePath) -> Option<&MachineView> {
        self.views.get(path)
    }

    pub fn insert(&mut self, path: BinaryTreePath, view: MachineView) -> Option<MachineView> {
        self.views.insert(path, view)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BinaryTreePath, &MachineView)> {
        self.views.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &BinaryTreePath> {
        self.views.keys()
    }
}

impl FromIterator<(BinaryTreePath, MachineView)> for MachineMapping {
    fn from_iter<I: IntoIterator<Item = (BinaryTreePath, MachineView)>>(iter: I) -> Self {
        Self {
            views: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<BinaryTreePath, MachineView>> for MachineMapping {
    fn from(views: BTreeMap<BinaryTreePath, MachineView>) -> Self {
        Self::new(views)
    }
}

impl fmt::Display for MachineMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (path, view)) in self.views.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{path} → {view}")?;
        }
        write!(f, "}}")
    }
}
