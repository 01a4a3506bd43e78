//! Two-phase index selection over a memoized what-if oracle.
//!
//! Per statement, the advisor extracts admissible single-column indexes,
//! widens them by compatible cross-product merges, prunes candidates that
//! help nothing, then searches configurations in two phases: an exhaustive
//! pass over small subsets picks a seed, and a greedy pass extends the seed
//! while additions keep paying for themselves. The union of the per-statement
//! winners is the recommendation.
//!
//! Every phase is deterministic: candidates iterate in canonical order and
//! cost ties break toward the configuration that sorts first.

use crate::admissible::admissible_indexes;
use crate::config::Configuration;
use crate::cost::{CostMemo, WhatIfOracle};
use crate::pool::{IndexHandle, IndexPool};
use crate::workload::Workload;
use crate::Knobs;
use ixtune_error::Result;
use std::collections::BTreeSet;
use std::sync::Arc;

/// One advisor run: owns the pool and memo, borrows the oracle.
///
/// Construct per invocation; pool handles and memo entries do not survive
/// the instance.
pub struct IndexAdvisor<'o> {
    oracle: &'o dyn WhatIfOracle,
    knobs: Knobs,
    pool: IndexPool,
    memo: CostMemo,
}

impl<'o> IndexAdvisor<'o> {
    /// Create an advisor run with validated knobs.
    ///
    /// # Errors
    ///
    /// [`ixtune_error::IxtuneError::InvalidKnobs`] if the knobs fail
    /// validation.
    pub fn new(oracle: &'o dyn WhatIfOracle, knobs: Knobs) -> Result<Self> {
        knobs.validate()?;
        Ok(Self {
            oracle,
            knobs,
            pool: IndexPool::new(),
            memo: CostMemo::new(),
        })
    }

    /// Recommend a configuration for the workload.
    ///
    /// Statements are tuned independently, in workload order; each
    /// contributes at most `num_indexes` members. The union across
    /// statements may exceed that bound. An empty workload yields the empty
    /// configuration.
    ///
    /// # Errors
    ///
    /// Extraction errors (`UnboundColumn`, `UnsupportedExpression`) and
    /// oracle failures abort the run.
    pub fn best_indexes(&mut self, workload: &Workload) -> Result<Configuration> {
        let mut recommended = Configuration::new();
        if workload.is_empty() {
            tracing::debug!("advisor.empty_workload");
            return Ok(recommended);
        }

        for statement in workload.iter() {
            let admissible =
                admissible_indexes(statement, &mut self.pool, self.knobs.index_updated_columns)?;
            let single_query = Workload::single(workload.database(), Arc::clone(statement));

            let grown = self.gen_multi_column(&admissible);
            let candidates = self.prune_useless(&grown, &single_query)?;
            let chosen = self.enumerate(&candidates, &single_query)?;

            tracing::debug!(
                statement = %statement,
                admissible = admissible.len(),
                candidates = candidates.len(),
                chosen = chosen.len(),
                "advisor.statement_tuned"
            );
            recommended.union_with(&chosen);
        }

        tracing::debug!(
            memo_hits = self.memo.hits(),
            memo_misses = self.memo.misses(),
            recommended = recommended.len(),
            "advisor.done"
        );
        Ok(recommended)
    }

    /// Widen single-column candidates into multi-column ones.
    ///
    /// Level n+1 is the cross product of level n with the single-column set,
    /// keeping compatible merges only, up to `max_index_width` columns. The
    /// returned set is the union of all levels.
    fn gen_multi_column(&mut self, single: &Configuration) -> Configuration {
        let mut all = single.clone();
        if single.is_empty() {
            return all;
        }
        let mut level = single.clone();
        for _ in 1..self.knobs.max_index_width {
            level = self.crossproduct(&level, single);
            if level.is_empty() {
                break;
            }
            all.union_with(&level);
        }
        all
    }

    /// Cross product of two candidate sets under merge.
    ///
    /// `{I1} × {I2, I3} = {merge(I1,I2), merge(I1,I3)}`, incompatible pairs
    /// and self-merges skipped (a self-merge reproduces its left operand).
    /// Merged keys dedup through the pool.
    fn crossproduct(&mut self, config: &Configuration, single: &Configuration) -> Configuration {
        let mut result = Configuration::new();
        for index in config.iter() {
            for column in single.iter() {
                if index == column || !index.key().is_compatible(column.key()) {
                    continue;
                }
                let merged = index.key().merge(column.key());
                result.add(self.pool.intern(merged));
            }
        }
        result
    }

    /// Drop candidates whose presence reduces no single statement's cost
    /// versus the empty configuration. Idempotent.
    fn prune_useless(
        &mut self,
        candidates: &Configuration,
        workload: &Workload,
    ) -> Result<Configuration> {
        if candidates.is_empty() {
            return Ok(Configuration::new());
        }
        let empty = Configuration::new();
        let mut kept = Configuration::new();
        for handle in candidates.iter() {
            let alone = Configuration::from_handles([handle.clone()]);
            let mut helps = false;
            for statement in workload.iter() {
                let base =
                    self.memo
                        .statement_cost(self.oracle, &empty, statement, workload.database())?;
                let with =
                    self.memo
                        .statement_cost(self.oracle, &alone, statement, workload.database())?;
                if with < base {
                    helps = true;
                    break;
                }
            }
            if helps {
                kept.add(handle.clone());
            }
        }
        if kept.len() < candidates.len() {
            tracing::debug!(
                before = candidates.len(),
                after = kept.len(),
                "advisor.candidates_pruned"
            );
        }
        Ok(kept)
    }

    /// Two-phase search: exhaustive seed, then greedy extension up to
    /// `num_indexes` members.
    fn enumerate(
        &mut self,
        candidates: &Configuration,
        workload: &Workload,
    ) -> Result<Configuration> {
        if candidates.is_empty() {
            return Ok(Configuration::new());
        }
        let k = self.knobs.num_indexes;
        let m = self.knobs.naive_enumeration_threshold;

        // Seed: cheapest subset of size <= min(m, k), found exhaustively.
        let subsets = Self::subsets_up_to(candidates, m.min(k));
        let seed = self.cheapest_subset(&subsets, workload)?;
        tracing::debug!(
            seed = %seed,
            evaluated = subsets.len(),
            "enumerate.seed_chosen"
        );
        if m >= k {
            return Ok(seed);
        }

        let remaining = candidates.difference(&seed);
        self.greedy(seed, &remaining, workload, k)
    }

    /// All non-empty subsets of `candidates` with at most `cap` members.
    ///
    /// Breadth-first expansion: `running` holds subsets that may still grow,
    /// `result` those that reached the cap. Each candidate extends a snapshot
    /// of `running`; the tail merge collects the still-growing subsets.
    fn subsets_up_to(candidates: &Configuration, cap: usize) -> Vec<Configuration> {
        let mut running: BTreeSet<Configuration> = BTreeSet::new();
        let mut result: BTreeSet<Configuration> = BTreeSet::new();
        running.insert(Configuration::new());

        for handle in candidates.iter() {
            let snapshot: Vec<Configuration> = running.iter().cloned().collect();
            for subset in snapshot {
                let mut extended = subset;
                extended.add(handle.clone());
                if extended.len() >= cap {
                    result.insert(extended);
                } else {
                    running.insert(extended);
                }
            }
        }
        for subset in running {
            if !subset.is_empty() {
                result.insert(subset);
            }
        }
        result.into_iter().collect()
    }

    /// Evaluate subsets and return the cheapest; ties break toward the
    /// configuration that sorts first (size, then canonical string).
    fn cheapest_subset(
        &mut self,
        subsets: &[Configuration],
        workload: &Workload,
    ) -> Result<Configuration> {
        let mut best: Option<(f64, &Configuration)> = None;
        for subset in subsets {
            let cost = self.cost(subset, workload)?;
            let better = match best {
                None => true,
                Some((best_cost, best_subset)) => {
                    cost < best_cost || (cost == best_cost && subset < best_subset)
                }
            };
            if better {
                best = Some((cost, subset));
            }
        }
        Ok(best.map(|(_, subset)| subset.clone()).unwrap_or_default())
    }

    /// Greedy extension: keep adding the candidate that lowers the workload
    /// cost the most, stopping at `k` members or when no addition strictly
    /// improves on the current cost.
    fn greedy(
        &mut self,
        seed: Configuration,
        remaining: &Configuration,
        workload: &Workload,
        k: usize,
    ) -> Result<Configuration> {
        let mut current = seed;
        let mut remaining = remaining.clone();
        let mut current_cost = self.cost(&current, workload)?;

        while current.len() < k && !remaining.is_empty() {
            let mut round_best: Option<(f64, IndexHandle)> = None;
            for handle in remaining.iter() {
                let mut trial = current.clone();
                trial.add(handle.clone());
                let cost = self.cost(&trial, workload)?;
                // Strict < keeps the canonically-first candidate on ties.
                let better = match &round_best {
                    None => true,
                    Some((best_cost, _)) => cost < *best_cost,
                };
                if better {
                    round_best = Some((cost, handle.clone()));
                }
            }
            let Some((cost, handle)) = round_best else {
                break;
            };
            if cost < current_cost {
                tracing::debug!(added = %handle, cost, "enumerate.greedy_step");
                current.add(handle.clone());
                remaining.remove(&handle);
                current_cost = cost;
            } else {
                break;
            }
        }
        Ok(current)
    }

    fn cost(&mut self, config: &Configuration, workload: &Workload) -> Result<f64> {
        self.memo.workload_cost(self.oracle, config, workload)
    }
}
