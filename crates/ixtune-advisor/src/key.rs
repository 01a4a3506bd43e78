//! Identity of a single hypothetical index.
//!
//! An [`IndexKey`] names one index the optimizer could be asked to cost:
//! a database, a table, and an *ordered* list of column OIDs. Column order
//! is significant — an index on `(a, b)` is not an index on `(b, a)`.
//!
//! The canonical string form `"db/table/c1,c2,…"` is the single source of
//! truth for equality, hashing, and ordering of keys.

use ixtune_error::{IxtuneError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// OID of a database.
pub type DatabaseOid = u32;
/// OID of a table.
pub type TableOid = u32;
/// OID of a column.
pub type ColumnOid = u32;

/// The identity of one hypothetical index.
///
/// Immutable once constructed; the constructors validate that the column
/// list is non-empty and duplicate-free.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexKey {
    db_oid: DatabaseOid,
    table_oid: TableOid,
    columns: Vec<ColumnOid>,
}

impl IndexKey {
    /// A single-column index key.
    #[must_use]
    pub fn single(db_oid: DatabaseOid, table_oid: TableOid, column: ColumnOid) -> Self {
        Self {
            db_oid,
            table_oid,
            columns: vec![column],
        }
    }

    /// A multi-column index key.
    ///
    /// # Errors
    ///
    /// Returns [`IxtuneError::EmptyColumnList`] for an empty column list and
    /// [`IxtuneError::DuplicateColumn`] when a column repeats.
    pub fn multi(
        db_oid: DatabaseOid,
        table_oid: TableOid,
        columns: Vec<ColumnOid>,
    ) -> Result<Self> {
        if columns.is_empty() {
            return Err(IxtuneError::EmptyColumnList);
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].contains(col) {
                return Err(IxtuneError::DuplicateColumn { column: *col });
            }
        }
        Ok(Self {
            db_oid,
            table_oid,
            columns,
        })
    }

    /// OID of the database this index belongs to.
    #[must_use]
    pub const fn db_oid(&self) -> DatabaseOid {
        self.db_oid
    }

    /// OID of the indexed table.
    #[must_use]
    pub const fn table_oid(&self) -> TableOid {
        self.table_oid
    }

    /// Ordered column OIDs, leftmost first.
    #[must_use]
    pub fn columns(&self) -> &[ColumnOid] {
        &self.columns
    }

    /// Number of indexed columns (the index width).
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Whether `other` can be merged with this key into a wider index:
    /// both must name the same database and table.
    #[must_use]
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.db_oid == other.db_oid && self.table_oid == other.table_oid
    }

    /// Merge two compatible keys into a wider one.
    ///
    /// The result's columns are `self`'s columns followed by those of
    /// `other` not already present, first occurrence preserved. Not
    /// commutative: `a.merge(b)` orders `a`'s columns first.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        debug_assert!(self.is_compatible(other));
        let mut columns = self.columns.clone();
        for col in &other.columns {
            if !columns.contains(col) {
                columns.push(*col);
            }
        }
        Self {
            db_oid: self.db_oid,
            table_oid: self.table_oid,
            columns,
        }
    }

    /// Canonical string form: `"db/table/c1,c2,…"`.
    ///
    /// Injective over keys, so it doubles as the equality/order witness.
    #[must_use]
    pub fn canonical(&self) -> String {
        let cols: Vec<String> = self.columns.iter().map(ToString::to_string).collect();
        format!("{}/{}/{}", self.db_oid, self.table_oid, cols.join(","))
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical().cmp(&other.canonical())
    }
}
