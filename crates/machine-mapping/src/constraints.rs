// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Placement constraints: views already decided for some leaves.
//!
//! Constraints cover every leaf of the subproblem being solved. Each leaf is
//! either free (`None`) or pinned to a view. Recursing into a child strips
//! the leading path step, so the child sees paths relative to itself.

use crate::MappingError;
use machine_spec::MachineView;
use problem_tree::{BinaryTreePath, BinaryTreePathEntry, MachineMapping, ProblemTree};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Per-leaf placement constraints for a subproblem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MachineMappingConstraints {
    views: BTreeMap<BinaryTreePath, Option<MachineView>>,
}

impl MachineMappingConstraints {
    /// No leaf pinned.
    pub fn unconstrained_for<I>(leaf_paths: I) -> Self
    where
        I: IntoIterator<Item = BinaryTreePath>,
    {
        Self {
            views: leaf_paths.into_iter().map(|p| (p, None)).collect(),
        }
    }

    /// No leaf of `tree` pinned.
    pub fn for_tree(tree: &ProblemTree) -> Self {
        Self::unconstrained_for(tree.all_leaf_paths())
    }

    pub fn paths(&self) -> impl Iterator<Item = &BinaryTreePath> {
        self.views.keys()
    }

    pub fn contains_path(&self, path: &BinaryTreePath) -> bool {
        self.views.contains_key(path)
    }

    /// The pinned view for `path`, if any.
    pub fn pinned(&self, path: &BinaryTreePath) -> Option<&MachineView> {
        self.views.get(path).and_then(Option::as_ref)
    }

    pub fn num_pinned(&self) -> usize {
        self.views.values().filter(|v| v.is_some()).count()
    }

    pub fn restrict_to_left_child(&self) -> Self {
        self.restrict_to_child(BinaryTreePathEntry::LeftChild)
    }

    pub fn restrict_to_right_child(&self) -> Self {
        self.restrict_to_child(BinaryTreePathEntry::RightChild)
    }

    /// Keeps the paths under one child, re-rooted at that child.
    pub fn restrict_to_child(&self, entry: BinaryTreePathEntry) -> Self {
        Self {
            views: self
                .views
                .iter()
                .filter_map(|(p, v)| p.strip_prefix(entry).map(|rest| (rest, v.clone())))
                .collect(),
        }
    }

    /// Pins every view of `mapping`.
    ///
    /// Fails if a path is not covered by these constraints, or is already
    /// pinned to a different view. Re-pinning to the same view is allowed.
    pub fn with_additional_constraints(&self, mapping: &MachineMapping) -> Result<Self, MappingError> {
        let mut out = self.clone();
        for (path, view) in mapping.iter() {
            let slot = out
                .views
                .get_mut(path)
                .ok_or_else(|| MappingError::UnknownConstraintPath { path: path.clone() })?;
            if let Some(existing) = slot.as_ref() {
                if existing != view {
                    return Err(MappingError::ConflictingConstraint {
                        path: path.clone(),
                        existing: existing.clone(),
                        requested: view.clone(),
                    });
                }
            }
            *slot = Some(view.clone());
        }
        Ok(out)
    }

    /// For a single-leaf subproblem: the pinned view of the root, if any.
    ///
    /// Fails unless the constraints cover exactly the root path.
    pub fn require_only_root(&self) -> Result<Option<&MachineView>, MappingError> {
        let root = BinaryTreePath::root();
        let keys: BTreeSet<&BinaryTreePath> = self.views.keys().collect();
        if keys.len() != 1 || !keys.contains(&root) {
            return Err(MappingError::InvalidConstraints(format!(
                "expected constraints for the root leaf only, found {} path(s)",
                keys.len()
            )));
        }
        Ok(self.pinned(&root))
    }
}

impl fmt::Display for MachineMappingConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (path, view)) in self.views.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match view {
                Some(v) => write!(f, "{path} = {v}")?,
                None => write!(f, "{path} free")?,
            }
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use machine_spec::{DeviceType, MachineSpaceCoordinate};
    use BinaryTreePathEntry::{LeftChild, RightChild};

    fn view(stride: usize) -> MachineView {
        MachineView::intra_node(MachineSpaceCoordinate::new(0, 0, DeviceType::Gpu), stride)
    }

    fn path(s: &str) -> BinaryTreePath {
        s.parse().unwrap()
    }

    fn three_leaves() -> MachineMappingConstraints {
        MachineMappingConstraints::unconstrained_for([path("L"), path("RL"), path("RR")])
    }

    #[test]
    fn test_restrict_strips_prefix() {
        let c = three_leaves()
            .with_additional_constraints(&MachineMapping::new(BTreeMap::from([(path("RL"), view(2))])))
            .unwrap();
        let right = c.restrict_to_right_child();
        assert_eq!(right.paths().cloned().collect::<Vec<_>>(), vec![path("L"), path("R")]);
        assert_eq!(right.pinned(&path("L")), Some(&view(2)));
        assert_eq!(right.pinned(&path("R")), None);

        let left = c.restrict_to_left_child();
        assert_eq!(left.paths().cloned().collect::<Vec<_>>(), vec![BinaryTreePath::root()]);
        assert_eq!(left.restrict_to_child(LeftChild).paths().count(), 0);
        assert_eq!(c.restrict_to_child(RightChild), right);
    }

    #[test]
    fn test_unknown_path_errors() {
        let err = three_leaves()
            .with_additional_constraints(&MachineMapping::singleton_root(view(1)))
            .unwrap_err();
        assert!(matches!(err, MappingError::UnknownConstraintPath { .. }));
    }

    #[test]
    fn test_conflicting_constraint_errors() {
        let pin = |v| MachineMapping::new(BTreeMap::from([(path("L"), v)]));
        let c = three_leaves().with_additional_constraints(&pin(view(1))).unwrap();
        assert!(c.with_additional_constraints(&pin(view(1))).is_ok());
        assert!(matches!(
            c.with_additional_constraints(&pin(view(2))),
            Err(MappingError::ConflictingConstraint { .. })
        ));
        assert_eq!(c.num_pinned(), 1);
    }

    #[test]
    fn test_require_only_root() {
        let free = MachineMappingConstraints::unconstrained_for([BinaryTreePath::root()]);
        assert_eq!(free.require_only_root().unwrap(), None);

        let pinned = free
            .with_additional_constraints(&MachineMapping::singleton_root(view(3)))
            .unwrap();
        assert_eq!(pinned.require_only_root().unwrap(), Some(&view(3)));

        assert!(three_leaves().require_only_root().is_err());
        assert!(MachineMappingConstraints::default().require_only_root().is_err());
    }

    #[test]
    fn test_equal_constraints_hash_equal() {
        use std::collections::HashSet;
        let set: HashSet<_> = [three_leaves(), three_leaves()].into_iter().collect();
        assert_eq!(set.len(), 1);
    }
}
