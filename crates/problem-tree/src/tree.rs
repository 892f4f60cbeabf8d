// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The series-parallel problem tree.
//!
//! ```text
//!                 Series(movement)
//!                /                \
//!         Leaf(embed)        Parallel
//!                            /      \
//!                      Leaf(a)      Leaf(b)
//! ```
//!
//! Trees are immutable values. Children sit behind [`Arc`] so cloning a
//! subtree (to build a cache key, or to reuse it under a synthetic series
//! node) is cheap. Equality stays structural. Each split carries a
//! fingerprint of its whole subtree, computed once when the node is built,
//! so hashing a tree only touches its root.

use crate::{
    AbstractedTensorSetMovement, BinaryTreePath, BinaryTreePathEntry, ProblemTreeError,
    UnmappedOpCostEstimateKey,
};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

// ── Fingerprinted ──────────────────────────────────────────────────

/// A split node together with the structural hash of its subtree.
///
/// Children are hashed through their own fingerprints, so building a node
/// costs time proportional to the node itself, not to its subtree.
#[derive(Debug, Clone)]
pub struct Fingerprinted<T> {
    fingerprint: u64,
    inner: T,
}

impl<T: Hash> Fingerprinted<T> {
    pub fn new(inner: T) -> Self {
        let mut hasher = DefaultHasher::new();
        inner.hash(&mut hasher);
        Self {
            fingerprint: hasher.finish(),
            inner,
        }
    }
}

impl<T> Fingerprinted<T> {
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

impl<T> Deref for Fingerprinted<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: PartialEq> PartialEq for Fingerprinted<T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
            || (self.fingerprint == other.fingerprint && self.inner == other.inner)
    }
}

impl<T: Eq> Eq for Fingerprinted<T> {}

impl<T> Hash for Fingerprinted<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint);
    }
}

impl<T: serde::Serialize> serde::Serialize for Fingerprinted<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.serialize(serializer)
    }
}

impl<'de, T: serde::Deserialize<'de> + Hash> serde::Deserialize<'de> for Fingerprinted<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::new)
    }
}

// ── Tree ───────────────────────────────────────────────────────────

/// A sequential composition: `left` runs before `right`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SeriesSplit {
    /// Tensors flowing from `left` into `right`.
    #[serde(default)]
    pub tensor_movement: AbstractedTensorSetMovement,
    pub left: ProblemTree,
    pub right: ProblemTree,
}

/// An independent composition: no data flows between the branches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ParallelSplit {
    pub left: ProblemTree,
    pub right: ProblemTree,
}

/// A machine-mapping problem tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProblemTree {
    Leaf(Arc<UnmappedOpCostEstimateKey>),
    Series(Arc<Fingerprinted<SeriesSplit>>),
    Parallel(Arc<Fingerprinted<ParallelSplit>>),
}

impl ProblemTree {
    pub fn leaf(key: UnmappedOpCostEstimateKey) -> Self {
        Self::Leaf(Arc::new(key))
    }

    pub fn series(
        tensor_movement: AbstractedTensorSetMovement,
        left: ProblemTree,
        right: ProblemTree,
    ) -> Self {
        Self::Series(Arc::new(Fingerprinted::new(SeriesSplit {
            tensor_movement,
            left,
            right,
        })))
    }

    pub fn parallel(left: ProblemTree, right: ProblemTree) -> Self {
        Self::Parallel(Arc::new(Fingerprinted::new(ParallelSplit { left, right })))
    }

    /// Short name of the node kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "leaf",
            Self::Series(_) => "series",
            Self::Parallel(_) => "parallel",
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&UnmappedOpCostEstimateKey> {
        match self {
            Self::Leaf(key) => Some(key),
            _ => None,
        }
    }

    /// The child reached by one step, if this is an interior node.
    pub fn child(&self, entry: BinaryTreePathEntry) -> Option<&ProblemTree> {
        let (left, right) = match self {
            Self::Leaf(_) => return None,
            Self::Series(s) => (&s.left, &s.right),
            Self::Parallel(p) => (&p.left, &p.right),
        };
        Some(match entry {
            BinaryTreePathEntry::LeftChild => left,
            BinaryTreePathEntry::RightChild => right,
        })
    }

    /// Paths of every leaf, relative to this node.
    pub fn all_leaf_paths(&self) -> BTreeSet<BinaryTreePath> {
        let mut out = BTreeSet::new();
        self.collect_leaf_paths(BinaryTreePath::root(), &mut out);
        out
    }

    fn collect_leaf_paths(&self, here: BinaryTreePath, out: &mut BTreeSet<BinaryTreePath>) {
        if self.is_leaf() {
            out.insert(here);
            return;
        }
        for entry in [BinaryTreePathEntry::LeftChild, BinaryTreePathEntry::RightChild] {
            if let Some(child) = self.child(entry) {
                child.collect_leaf_paths(here.child(entry), out);
            }
        }
    }

    /// The node at `path`, if there is one.
    pub fn subtree_at_path(&self, path: &BinaryTreePath) -> Option<&ProblemTree> {
        path.entries()
            .iter()
            .try_fold(self, |node, &entry| node.child(entry))
    }

    /// The leaf key at `path`.
    pub fn leaf_at_path(
        &self,
        path: &BinaryTreePath,
    ) -> Result<&UnmappedOpCostEstimateKey, ProblemTreeError> {
        let node = self
            .subtree_at_path(path)
            .ok_or_else(|| ProblemTreeError::UnknownPath { path: path.clone() })?;
        node.as_leaf()
            .ok_or_else(|| ProblemTreeError::NotALeaf { path: path.clone() })
    }

    pub fn num_leaves(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Series(s) => s.left.num_leaves() + s.right.num_leaves(),
            Self::Parallel(p) => p.left.num_leaves() + p.right.num_leaves(),
        }
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 0,
            Self::Series(s) => 1 + s.left.depth().max(s.right.depth()),
            Self::Parallel(p) => 1 + p.left.depth().max(p.right.depth()),
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, prefix: &str, last: bool, root: bool) -> fmt::Result {
        let (branch, extend) = match (root, last) {
            (true, _) => ("", ""),
            (false, true) => ("└── ", "    "),
            (false, false) => ("├── ", "│   "),
        };
        match self {
            Self::Leaf(key) => writeln!(f, "{prefix}{branch}{key}")?,
            Self::Series(s) => {
                if s.tensor_movement.is_empty() {
                    writeln!(f, "{prefix}{branch}series")?;
                } else {
                    writeln!(
                        f,
                        "{prefix}{branch}series ({} tensor(s) moved)",
                        s.tensor_movement.movements.len()
                    )?;
                }
            }
            Self::Parallel(_) => writeln!(f, "{prefix}{branch}parallel")?,
        }
        let child_prefix = format!("{prefix}{extend}");
        if let (Some(l), Some(r)) = (
            self.child(BinaryTreePathEntry::LeftChild),
            self.child(BinaryTreePathEntry::RightChild),
        ) {
            l.render(f, &child_prefix, false, false)?;
            r.render(f, &child_prefix, true, false)?;
        }
        Ok(())
    }
}

impl fmt::Display for ProblemTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, "", true, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OperatorAttrs, OperatorType};
    use BinaryTreePathEntry::{LeftChild, RightChild};

    fn leaf(op: OperatorType) -> ProblemTree {
        ProblemTree::leaf(UnmappedOpCostEstimateKey::new(OperatorAttrs::new(op)))
    }

    fn sample() -> ProblemTree {
        ProblemTree::series(
            AbstractedTensorSetMovement::empty(),
            leaf(OperatorType::Input),
            ProblemTree::parallel(leaf(OperatorType::Relu), leaf(OperatorType::Softmax)),
        )
    }

    #[test]
    fn test_all_leaf_paths() {
        let paths: Vec<String> = sample().all_leaf_paths().iter().map(|p| p.to_string()).collect();
        assert_eq!(paths, vec!["L", "RL", "RR"]);
        assert_eq!(
            leaf(OperatorType::Input).all_leaf_paths(),
            BTreeSet::from([BinaryTreePath::root()])
        );
    }

    #[test]
    fn test_leaf_at_path() {
        let tree = sample();
        let rl = BinaryTreePath::new(vec![RightChild, LeftChild]);
        assert_eq!(tree.leaf_at_path(&rl).unwrap().op_attrs.op_type, OperatorType::Relu);
        assert!(matches!(
            tree.leaf_at_path(&BinaryTreePath::right()),
            Err(ProblemTreeError::NotALeaf { .. })
        ));
        assert!(matches!(
            tree.leaf_at_path(&BinaryTreePath::new(vec![LeftChild, LeftChild])),
            Err(ProblemTreeError::UnknownPath { .. })
        ));
    }

    #[test]
    fn test_counts() {
        let tree = sample();
        assert_eq!(tree.num_leaves(), 3);
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.subtree_at_path(&BinaryTreePath::root()), Some(&tree));
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(sample(), sample());
        let other = ProblemTree::parallel(leaf(OperatorType::Input), leaf(OperatorType::Input));
        assert_ne!(sample(), other);
    }

    #[test]
    fn test_equal_trees_share_fingerprint() {
        let fingerprint = |t: &ProblemTree| match t {
            ProblemTree::Series(s) => s.fingerprint(),
            _ => unreachable!(),
        };
        assert_eq!(fingerprint(&sample()), fingerprint(&sample()));

        let swapped = ProblemTree::series(
            AbstractedTensorSetMovement::empty(),
            leaf(OperatorType::Softmax),
            leaf(OperatorType::Input),
        );
        assert_ne!(fingerprint(&sample()), fingerprint(&swapped));

        let back: ProblemTree =
            serde_json::from_value(serde_json::to_value(sample()).unwrap()).unwrap();
        assert_eq!(fingerprint(&back), fingerprint(&sample()));
    }

    #[test]
    fn test_render() {
        let s = format!("{}", sample());
        assert!(s.starts_with("series\n"));
        assert!(s.contains("├── input"));
        assert!(s.contains("└── parallel"));
        assert!(s.contains("    └── softmax"));
    }

    #[test]
    fn test_serde_tagged() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["kind"], "series");
        assert_eq!(json["right"]["kind"], "parallel");
        let back: ProblemTree = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }
}
