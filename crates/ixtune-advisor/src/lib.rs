//! What-if index selection engine.
//!
//! Given a workload of bound SQL statements and a [`cost::WhatIfOracle`],
//! the advisor recommends a set of hypothetical secondary indexes that
//! minimizes the workload's estimated cost. The pipeline per statement:
//!
//! 1. [`admissible::admissible_indexes`] extracts single-column candidates
//!    from predicates, GROUP BY, and ORDER BY.
//! 2. Cross-product merging widens candidates up to
//!    [`Knobs::max_index_width`] columns.
//! 3. Candidates that help no statement are pruned.
//! 4. [`select::IndexAdvisor`] runs an exhaustive pass over subsets of size
//!    ≤ m, then greedily extends the cheapest seed up to k indexes.
//!
//! Costing goes through a per-run memo so the oracle sees each
//! `(configuration, statement)` pair at most once. The run is synchronous,
//! single-threaded, and deterministic for identical inputs.
//!
//! Parsing, binding, the oracle implementation, and index materialization
//! are the host database's business; this crate only decides *which*
//! indexes to ask for.

pub mod admissible;
pub mod config;
pub mod cost;
pub mod key;
pub mod pool;
pub mod select;
pub mod workload;

use ixtune_error::{IxtuneError, Result};
use serde::{Deserialize, Serialize};

pub use admissible::admissible_indexes;
pub use config::Configuration;
pub use cost::{CostMemo, WhatIfEstimate, WhatIfOracle};
pub use key::{ColumnOid, DatabaseOid, IndexKey, TableOid};
pub use pool::{IndexHandle, IndexPool};
pub use select::IndexAdvisor;
pub use workload::{StatementId, Workload};

/// Search knobs bounding the configuration space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Knobs {
    /// Maximum number of columns in one recommended index.
    pub max_index_width: usize,
    /// Exhaustive-enumeration ceiling m: subsets of size ≤ m are costed in
    /// full during the seed phase.
    pub naive_enumeration_threshold: usize,
    /// Upper bound k on the indexes recommended per statement. Must be
    /// ≥ `naive_enumeration_threshold`.
    pub num_indexes: usize,
    /// Also admit the SET-target columns of UPDATE statements.
    #[serde(default)]
    pub index_updated_columns: bool,
}

impl Default for Knobs {
    fn default() -> Self {
        Self {
            max_index_width: 2,
            naive_enumeration_threshold: 2,
            num_indexes: 3,
            index_updated_columns: false,
        }
    }
}

impl Knobs {
    /// Check the knob preconditions.
    ///
    /// # Errors
    ///
    /// [`IxtuneError::InvalidKnobs`] when any numeric knob is zero or the
    /// enumeration threshold exceeds the result bound.
    pub fn validate(&self) -> Result<()> {
        if self.max_index_width == 0 {
            return Err(IxtuneError::invalid_knobs("max_index_width must be positive"));
        }
        if self.naive_enumeration_threshold == 0 {
            return Err(IxtuneError::invalid_knobs(
                "naive_enumeration_threshold must be positive",
            ));
        }
        if self.num_indexes == 0 {
            return Err(IxtuneError::invalid_knobs("num_indexes must be positive"));
        }
        if self.naive_enumeration_threshold > self.num_indexes {
            return Err(IxtuneError::invalid_knobs(format!(
                "naive_enumeration_threshold {} exceeds num_indexes {}",
                self.naive_enumeration_threshold, self.num_indexes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_knobs_validate() {
        assert!(Knobs::default().validate().is_ok());
    }

    #[test]
    fn zero_knobs_are_rejected() {
        for knobs in [
            Knobs {
                max_index_width: 0,
                ..Knobs::default()
            },
            Knobs {
                naive_enumeration_threshold: 0,
                ..Knobs::default()
            },
            Knobs {
                num_indexes: 0,
                ..Knobs::default()
            },
        ] {
            assert!(matches!(
                knobs.validate(),
                Err(IxtuneError::InvalidKnobs { .. })
            ));
        }
    }

    #[test]
    fn threshold_above_result_bound_is_rejected() {
        let knobs = Knobs {
            naive_enumeration_threshold: 4,
            num_indexes: 2,
            ..Knobs::default()
        };
        assert!(matches!(
            knobs.validate(),
            Err(IxtuneError::InvalidKnobs { .. })
        ));
    }

    #[test]
    fn knobs_roundtrip_through_json() {
        let knobs = Knobs {
            max_index_width: 3,
            naive_enumeration_threshold: 1,
            num_indexes: 5,
            index_updated_columns: true,
        };
        let json = serde_json::to_string(&knobs).unwrap();
        let back: Knobs = serde_json::from_str(&json).unwrap();
        assert_eq!(knobs, back);
    }

    #[test]
    fn updated_columns_flag_defaults_off_in_json() {
        let back: Knobs = serde_json::from_str(
            r#"{"max_index_width":2,"naive_enumeration_threshold":2,"num_indexes":3}"#,
        )
        .unwrap();
        assert!(!back.index_updated_columns);
    }
}
