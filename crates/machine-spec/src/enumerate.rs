// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Combinatorial enumeration helpers.
//!
//! Both functions are exhaustive and deterministic: output order follows the
//! input order (row-major, last position varying fastest).

use std::collections::{BTreeMap, BTreeSet};

/// Every sequence that picks one element from each input set, in order.
///
/// The product over zero sets is a single empty sequence; if any set is
/// empty the product is empty.
pub fn cartesian_product<T: Clone>(sets: &[Vec<T>]) -> Vec<Vec<T>> {
    let mut acc: Vec<Vec<T>> = vec![Vec::with_capacity(sets.len())];
    for set in sets {
        let mut next = Vec::with_capacity(acc.len() * set.len());
        for prefix in &acc {
            for item in set {
                let mut seq = prefix.clone();
                seq.push(item.clone());
                next.push(seq);
            }
        }
        acc = next;
    }
    acc
}

/// Every total assignment choosing one value per key.
///
/// ```
/// use machine_spec::enumerate::all_assignments;
/// use std::collections::{BTreeMap, BTreeSet};
///
/// let options = BTreeMap::from([
///     ("a", BTreeSet::from([1, 2])),
///     ("b", BTreeSet::from([3])),
/// ]);
/// assert_eq!(all_assignments(&options).len(), 2);
/// ```
pub fn all_assignments<K, V>(options: &BTreeMap<K, BTreeSet<V>>) -> Vec<BTreeMap<K, V>>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    let keys: Vec<&K> = options.keys().collect();
    let values: Vec<Vec<V>> = options
        .values()
        .map(|set| set.iter().cloned().collect())
        .collect();

    cartesian_product(&values)
        .into_iter()
        .map(|choice| keys.iter().map(|&k| k.clone()).zip(choice).collect())
        .collect()
}
