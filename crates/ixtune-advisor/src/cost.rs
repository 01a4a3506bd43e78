//! What-if cost oracle contract and per-run memoization.
//!
//! The engine never talks to the optimizer directly; it asks a
//! [`WhatIfOracle`] to price a `(statement, configuration)` pair and caches
//! the answer in a [`CostMemo`] keyed on configuration set-hash plus
//! statement identity. Within one run the oracle is invoked at most once per
//! distinct pair.

use crate::config::Configuration;
use crate::workload::{StatementId, Workload};
use ixtune_ast::Statement;
use ixtune_error::{IxtuneError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// One what-if answer: the estimated plan cost and an opaque rendering of
/// the plan the optimizer would choose under the hypothetical configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct WhatIfEstimate {
    /// Estimated execution cost. Must be finite.
    pub cost: f64,
    /// Optional plan text, for diagnostics only.
    pub plan: Option<String>,
}

impl WhatIfEstimate {
    /// An estimate with no plan text.
    #[must_use]
    pub const fn of(cost: f64) -> Self {
        Self { cost, plan: None }
    }
}

/// The what-if interface of the host optimizer.
///
/// Implementations must be pure and deterministic per
/// `(statement, config, database)` triple: repeated calls with the same
/// arguments return the same cost. Latency is the implementation's business;
/// the engine calls synchronously.
pub trait WhatIfOracle {
    /// Estimate the cost of `statement` if `config` were materialized on
    /// `database`.
    ///
    /// # Errors
    ///
    /// Implementations surface their own failures; the engine propagates
    /// them and aborts the invocation.
    fn estimate(
        &self,
        statement: &Statement,
        config: &Configuration,
        database: &str,
    ) -> Result<WhatIfEstimate>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoKey {
    config: Configuration,
    statement: StatementId,
}

/// Per-run cost cache over `(configuration, statement)` pairs.
#[derive(Default)]
pub struct CostMemo {
    costs: HashMap<MemoKey, f64>,
    hits: u64,
    misses: u64,
}

impl CostMemo {
    /// An empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cost of `config` for one statement, memoized.
    ///
    /// # Errors
    ///
    /// Propagates oracle failures; rejects non-finite costs with
    /// [`IxtuneError::NonFiniteCost`].
    pub fn statement_cost(
        &mut self,
        oracle: &dyn WhatIfOracle,
        config: &Configuration,
        statement: &Arc<Statement>,
        database: &str,
    ) -> Result<f64> {
        let key = MemoKey {
            config: config.clone(),
            statement: StatementId::of(statement),
        };
        if let Some(cost) = self.costs.get(&key) {
            self.hits += 1;
            return Ok(*cost);
        }
        self.misses += 1;
        let estimate = oracle.estimate(statement, config, database)?;
        if !estimate.cost.is_finite() {
            tracing::warn!(
                statement = %statement,
                config = %config,
                cost = estimate.cost,
                "oracle.non_finite_cost"
            );
            return Err(IxtuneError::NonFiniteCost {
                statement: statement.to_string(),
            });
        }
        self.costs.insert(key, estimate.cost);
        Ok(estimate.cost)
    }

    /// Cost of `config` for a whole workload: the sum of per-statement
    /// memoized costs.
    ///
    /// # Errors
    ///
    /// Propagates the first per-statement failure.
    pub fn workload_cost(
        &mut self,
        oracle: &dyn WhatIfOracle,
        config: &Configuration,
        workload: &Workload,
    ) -> Result<f64> {
        let mut total = 0.0;
        for statement in workload.iter() {
            total += self.statement_cost(oracle, config, statement, workload.database())?;
        }
        Ok(total)
    }

    /// Memo hits so far.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Memo misses (oracle calls) so far.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::IndexKey;
    use crate::pool::IndexPool;
    use ixtune_ast::SelectStatement;
    use std::cell::Cell;

    /// Oracle charging a fixed cost and counting invocations.
    struct CountingOracle {
        cost: f64,
        calls: Cell<u64>,
    }

    impl CountingOracle {
        fn of(cost: f64) -> Self {
            Self {
                cost,
                calls: Cell::new(0),
            }
        }
    }

    impl WhatIfOracle for CountingOracle {
        fn estimate(
            &self,
            _statement: &Statement,
            _config: &Configuration,
            _database: &str,
        ) -> Result<WhatIfEstimate> {
            self.calls.set(self.calls.get() + 1);
            Ok(WhatIfEstimate::of(self.cost))
        }
    }

    fn one_query_workload() -> Workload {
        Workload::from_statements(
            "db",
            [Statement::Select(SelectStatement::star_from("t"))],
        )
    }

    #[test]
    fn memo_invokes_oracle_once_per_pair() {
        let oracle = CountingOracle::of(42.0);
        let mut memo = CostMemo::new();
        let workload = one_query_workload();
        let empty = Configuration::new();

        let first = memo.workload_cost(&oracle, &empty, &workload).unwrap();
        let second = memo.workload_cost(&oracle, &empty, &workload).unwrap();
        assert_eq!(first, 42.0);
        assert_eq!(second, 42.0);
        assert_eq!(oracle.calls.get(), 1);
        assert_eq!(memo.misses(), 1);
        assert_eq!(memo.hits(), 1);
    }

    #[test]
    fn memo_distinguishes_configurations() {
        let oracle = CountingOracle::of(7.0);
        let mut memo = CostMemo::new();
        let workload = one_query_workload();

        let mut pool = IndexPool::new();
        let mut config = Configuration::new();
        config.add(pool.intern(IndexKey::single(1, 10, 100)));

        memo.workload_cost(&oracle, &Configuration::new(), &workload)
            .unwrap();
        memo.workload_cost(&oracle, &config, &workload).unwrap();
        assert_eq!(oracle.calls.get(), 2);
    }

    #[test]
    fn equal_sets_share_memo_entries() {
        let oracle = CountingOracle::of(7.0);
        let mut memo = CostMemo::new();
        let workload = one_query_workload();

        let mut pool = IndexPool::new();
        let a = pool.intern(IndexKey::single(1, 10, 100));
        let b = pool.intern(IndexKey::single(1, 10, 101));

        // Same set, assembled in opposite orders.
        let mut forward = Configuration::new();
        forward.add(a.clone());
        forward.add(b.clone());
        let mut backward = Configuration::new();
        backward.add(b);
        backward.add(a);

        memo.workload_cost(&oracle, &forward, &workload).unwrap();
        memo.workload_cost(&oracle, &backward, &workload).unwrap();
        assert_eq!(oracle.calls.get(), 1);
    }

    #[test]
    fn workload_cost_sums_statements() {
        let oracle = CountingOracle::of(10.0);
        let mut memo = CostMemo::new();
        let workload = Workload::from_statements(
            "db",
            [
                Statement::Select(SelectStatement::star_from("t")),
                Statement::Select(SelectStatement::star_from("u")),
            ],
        );
        let total = memo
            .workload_cost(&oracle, &Configuration::new(), &workload)
            .unwrap();
        assert_eq!(total, 20.0);
        assert_eq!(oracle.calls.get(), 2);
    }

    #[test]
    fn non_finite_cost_is_rejected() {
        struct NanOracle;
        impl WhatIfOracle for NanOracle {
            fn estimate(
                &self,
                _statement: &Statement,
                _config: &Configuration,
                _database: &str,
            ) -> Result<WhatIfEstimate> {
                Ok(WhatIfEstimate::of(f64::NAN))
            }
        }

        let mut memo = CostMemo::new();
        let workload = one_query_workload();
        let err = memo
            .workload_cost(&NanOracle, &Configuration::new(), &workload)
            .unwrap_err();
        assert!(matches!(err, IxtuneError::NonFiniteCost { .. }));
    }

    #[test]
    fn oracle_failure_propagates() {
        struct FailingOracle;
        impl WhatIfOracle for FailingOracle {
            fn estimate(
                &self,
                _statement: &Statement,
                _config: &Configuration,
                _database: &str,
            ) -> Result<WhatIfEstimate> {
                Err(IxtuneError::oracle("optimizer unavailable"))
            }
        }

        let mut memo = CostMemo::new();
        let workload = one_query_workload();
        let err = memo
            .workload_cost(&FailingOracle, &Configuration::new(), &workload)
            .unwrap_err();
        assert!(err.is_oracle_error());
    }
}
