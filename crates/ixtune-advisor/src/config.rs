//! Sets of hypothetical indexes under evaluation.
//!
//! A [`Configuration`] is what the cost oracle prices: a set of interned
//! index handles with deterministic iteration order. Equality is set
//! equality; the hash is order-independent (XOR of member identities), so a
//! configuration hashes the same no matter how it was assembled.

use crate::key::IndexKey;
use crate::pool::IndexHandle;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A set of hypothetical indexes.
///
/// Members iterate in canonical order (sorted by canonical string). All
/// handles in one configuration must come from the same [`crate::IndexPool`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    indexes: BTreeSet<IndexHandle>,
}

impl Configuration {
    /// The empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from handles.
    #[must_use]
    pub fn from_handles(handles: impl IntoIterator<Item = IndexHandle>) -> Self {
        Self {
            indexes: handles.into_iter().collect(),
        }
    }

    /// Insert a handle. No-op if already present.
    pub fn add(&mut self, handle: IndexHandle) {
        self.indexes.insert(handle);
    }

    /// Remove a handle. No-op if absent.
    pub fn remove(&mut self, handle: &IndexHandle) {
        self.indexes.remove(handle);
    }

    /// Number of member indexes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// Whether the configuration has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, handle: &IndexHandle) -> bool {
        self.indexes.contains(handle)
    }

    /// Iterate members in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexHandle> {
        self.indexes.iter()
    }

    /// Members of `self` not in `other`, as a new configuration.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        Self {
            indexes: self.indexes.difference(&other.indexes).cloned().collect(),
        }
    }

    /// In-place union with `other`.
    pub fn union_with(&mut self, other: &Self) {
        for handle in &other.indexes {
            self.indexes.insert(handle.clone());
        }
    }

    /// Order-independent set hash: XOR of member identities.
    ///
    /// Two configurations equal as sets produce the same value regardless of
    /// insertion order.
    #[must_use]
    pub fn set_hash(&self) -> u64 {
        self.indexes
            .iter()
            .fold(0u64, |acc, handle| acc ^ handle.ident())
    }

    /// Canonical string form: members' canonical strings in order, space
    /// separated.
    #[must_use]
    pub fn canonical(&self) -> String {
        let parts: Vec<&str> = self.indexes.iter().map(IndexHandle::canonical).collect();
        parts.join(" ")
    }

    /// Clone out the member keys, in canonical order. This is the shape
    /// consumers map to `CREATE INDEX` requests.
    #[must_use]
    pub fn to_keys(&self) -> Vec<IndexKey> {
        self.indexes.iter().map(|h| h.key().clone()).collect()
    }
}

impl Hash for Configuration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.set_hash());
    }
}

impl PartialOrd for Configuration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Configuration {
    /// Total order for deterministic tie-breaking: size ascending, then
    /// canonical string ascending.
    fn cmp(&self, other: &Self) -> Ordering {
        self.len()
            .cmp(&other.len())
            .then_with(|| self.canonical().cmp(&other.canonical()))
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("{}")
        } else {
            f.write_str(&self.canonical())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::IndexPool;

    fn pool_with_columns(cols: &[u32]) -> (IndexPool, Vec<IndexHandle>) {
        let mut pool = IndexPool::new();
        let handles = cols
            .iter()
            .map(|c| pool.intern(IndexKey::single(1, 10, *c)))
            .collect();
        (pool, handles)
    }

    #[test]
    fn add_is_idempotent() {
        let (_pool, handles) = pool_with_columns(&[100]);
        let mut config = Configuration::new();
        config.add(handles[0].clone());
        config.add(handles[0].clone());
        assert_eq!(config.len(), 1);
    }

    #[test]
    fn remove_absent_is_noop() {
        let (_pool, handles) = pool_with_columns(&[100, 101]);
        let mut config = Configuration::from_handles([handles[0].clone()]);
        config.remove(&handles[1]);
        assert_eq!(config.len(), 1);
        config.remove(&handles[0]);
        assert!(config.is_empty());
    }

    #[test]
    fn iteration_is_canonically_ordered_and_stable() {
        let (_pool, handles) = pool_with_columns(&[102, 100, 101]);
        let config = Configuration::from_handles(handles);
        let first: Vec<String> = config.iter().map(ToString::to_string).collect();
        let second: Vec<String> = config.iter().map(ToString::to_string).collect();
        assert_eq!(first, vec!["1/10/100", "1/10/101", "1/10/102"]);
        assert_eq!(first, second);
    }

    #[test]
    fn difference_laws() {
        let (_pool, handles) = pool_with_columns(&[100, 101, 102]);
        let a = Configuration::from_handles(handles.clone());
        let b = Configuration::from_handles([handles[1].clone()]);
        let diff = a.difference(&b);

        // (A \ B) ∩ B = ∅ and (A \ B) ⊆ A.
        for h in diff.iter() {
            assert!(!b.contains(h));
            assert!(a.contains(h));
        }
        assert_eq!(diff.len(), 2);
    }

    #[test]
    fn union_with_merges_in_place() {
        let (_pool, handles) = pool_with_columns(&[100, 101]);
        let mut a = Configuration::from_handles([handles[0].clone()]);
        let b = Configuration::from_handles([handles[0].clone(), handles[1].clone()]);
        a.union_with(&b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn equality_is_set_equality() {
        let (_pool, handles) = pool_with_columns(&[100, 101]);
        let ab = Configuration::from_handles([handles[0].clone(), handles[1].clone()]);
        let ba = Configuration::from_handles([handles[1].clone(), handles[0].clone()]);
        assert_eq!(ab, ba);
        assert_eq!(ab.set_hash(), ba.set_hash());
    }

    #[test]
    fn total_order_is_size_then_canonical() {
        let (_pool, handles) = pool_with_columns(&[100, 101]);
        let a = Configuration::from_handles([handles[0].clone()]);
        let b = Configuration::from_handles([handles[1].clone()]);
        let ab = Configuration::from_handles(handles);
        assert!(a < b);
        assert!(b < ab);
    }

    #[test]
    fn display_forms() {
        let (_pool, handles) = pool_with_columns(&[100, 101]);
        let empty = Configuration::new();
        assert_eq!(empty.to_string(), "{}");
        let config = Configuration::from_handles(handles);
        assert_eq!(config.to_string(), "1/10/100 1/10/101");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_set_hash_ignores_insertion_order(
                mut cols in proptest::collection::vec(0u32..16, 0..8),
            ) {
                let mut pool = IndexPool::new();
                let forward: Vec<IndexHandle> = cols
                    .iter()
                    .map(|c| pool.intern(IndexKey::single(1, 10, *c)))
                    .collect();
                cols.reverse();
                let backward: Vec<IndexHandle> = cols
                    .iter()
                    .map(|c| pool.intern(IndexKey::single(1, 10, *c)))
                    .collect();

                let a = Configuration::from_handles(forward);
                let b = Configuration::from_handles(backward);
                prop_assert_eq!(&a, &b);
                prop_assert_eq!(a.set_hash(), b.set_hash());
            }

            #[test]
            fn prop_difference_disjoint_from_subtrahend(
                left in proptest::collection::btree_set(0u32..16, 0..8),
                right in proptest::collection::btree_set(0u32..16, 0..8),
            ) {
                let mut pool = IndexPool::new();
                let a = Configuration::from_handles(
                    left.iter().map(|c| pool.intern(IndexKey::single(1, 10, *c))),
                );
                let b = Configuration::from_handles(
                    right.iter().map(|c| pool.intern(IndexKey::single(1, 10, *c))),
                );
                let diff = a.difference(&b);
                for h in diff.iter() {
                    prop_assert!(a.contains(h));
                    prop_assert!(!b.contains(h));
                }
                // |A \ B| + |A ∩ B| = |A|
                let overlap = left.intersection(&right).count();
                prop_assert_eq!(diff.len() + overlap, a.len());
            }
        }
    }
}
