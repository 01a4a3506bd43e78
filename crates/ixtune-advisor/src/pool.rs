//! Content-addressed pool interning index keys.
//!
//! Every [`IndexKey`] the advisor touches is interned exactly once per run;
//! the rest of the engine passes around cheap [`IndexHandle`]s. Two handles
//! to the same interned key are the same allocation, so configuration
//! membership, memo keys, and search tie-breaks all reduce to comparisons on
//! a precomputed 64-bit identity instead of re-deriving key strings.

use crate::key::IndexKey;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_64;

struct PoolEntry {
    key: IndexKey,
    canonical: String,
    ident: u64,
}

/// A shared, non-owning reference to an index key interned in an
/// [`IndexPool`].
///
/// Handles are cheap to clone and remain valid for the pool's lifetime. All
/// handles held by one configuration come from one pool, where equal keys
/// are the same allocation; equality, hashing, and ordering therefore agree
/// with key identity.
#[derive(Clone)]
pub struct IndexHandle(Arc<PoolEntry>);

impl IndexHandle {
    /// The interned key.
    #[must_use]
    pub fn key(&self) -> &IndexKey {
        &self.0.key
    }

    /// Canonical string form of the interned key.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.0.canonical
    }

    /// Stable 64-bit identity: the xxh3 hash of the canonical form.
    #[must_use]
    pub fn ident(&self) -> u64 {
        self.0.ident
    }
}

impl PartialEq for IndexHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.canonical == other.0.canonical
    }
}

impl Eq for IndexHandle {}

impl Hash for IndexHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.ident);
    }
}

impl PartialOrd for IndexHandle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexHandle {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.canonical.cmp(&other.0.canonical)
    }
}

impl fmt::Debug for IndexHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IndexHandle({})", self.0.canonical)
    }
}

impl fmt::Display for IndexHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.canonical)
    }
}

/// Interning store mapping [`IndexKey`]s to [`IndexHandle`]s.
///
/// One pool lives for one advisor invocation; handles it hands out outlive
/// individual configurations but not the pool's run.
#[derive(Default)]
pub struct IndexPool {
    entries: HashMap<IndexKey, IndexHandle>,
}

impl IndexPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a key: return the existing handle for an equal key, or insert
    /// `key` and return a fresh handle. Idempotent.
    pub fn intern(&mut self, key: IndexKey) -> IndexHandle {
        if let Some(handle) = self.entries.get(&key) {
            return handle.clone();
        }
        let canonical = key.canonical();
        let ident = xxh3_64(canonical.as_bytes());
        let handle = IndexHandle(Arc::new(PoolEntry {
            key: key.clone(),
            canonical,
            ident,
        }));
        self.entries.insert(key, handle.clone());
        handle
    }

    /// Non-inserting lookup.
    #[must_use]
    pub fn lookup(&self, key: &IndexKey) -> Option<IndexHandle> {
        self.entries.get(key).cloned()
    }

    /// Number of interned keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for IndexPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IndexPool({} keys)", self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut pool = IndexPool::new();
        let h1 = pool.intern(IndexKey::single(1, 10, 100));
        let h2 = pool.intern(IndexKey::single(1, 10, 100));
        assert_eq!(h1, h2);
        assert_eq!(h1.ident(), h2.ident());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn distinct_keys_get_distinct_handles() {
        let mut pool = IndexPool::new();
        let a = pool.intern(IndexKey::single(1, 10, 100));
        let b = pool.intern(IndexKey::single(1, 10, 101));
        assert_ne!(a, b);
        assert_ne!(a.ident(), b.ident());
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn lookup_does_not_insert() {
        let mut pool = IndexPool::new();
        assert!(pool.lookup(&IndexKey::single(1, 10, 100)).is_none());
        assert!(pool.is_empty());

        let h = pool.intern(IndexKey::single(1, 10, 100));
        let found = pool.lookup(&IndexKey::single(1, 10, 100)).unwrap();
        assert_eq!(h, found);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn handles_order_by_canonical_form() {
        let mut pool = IndexPool::new();
        let b = pool.intern(IndexKey::single(1, 10, 101));
        let a = pool.intern(IndexKey::single(1, 10, 100));
        assert!(a < b);
    }

    #[test]
    fn merged_key_resolves_to_same_handle() {
        let mut pool = IndexPool::new();
        let a = IndexKey::single(1, 10, 100);
        let b = IndexKey::single(1, 10, 101);
        let first = pool.intern(a.merge(&b));
        let second = pool.intern(a.merge(&b));
        assert_eq!(first, second);
        assert_eq!(pool.len(), 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_key() -> impl Strategy<Value = IndexKey> {
            (
                0u32..3,
                0u32..3,
                proptest::collection::btree_set(0u32..8, 1..4),
            )
                .prop_map(|(db, table, cols)| {
                    IndexKey::multi(db, table, cols.into_iter().collect()).unwrap()
                })
        }

        proptest! {
            #[test]
            fn prop_intern_identity(k1 in arb_key(), k2 in arb_key()) {
                let mut pool = IndexPool::new();
                let h1 = pool.intern(k1.clone());
                let h2 = pool.intern(k2.clone());
                // intern(k1) == intern(k2) ⇔ k1 == k2
                prop_assert_eq!(h1 == h2, k1 == k2);
            }
        }
    }
}
