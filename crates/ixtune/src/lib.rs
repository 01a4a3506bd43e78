//! Public API facade for ixtune.
//!
//! Re-exports the advisor surface so embedders depend on one crate: build a
//! [`Workload`] of bound statements, implement [`WhatIfOracle`] over your
//! optimizer's what-if interface, and ask an [`IndexAdvisor`] for
//! [`IndexAdvisor::best_indexes`].

pub use ixtune_advisor::{
    Configuration, CostMemo, IndexAdvisor, IndexHandle, IndexKey, IndexPool, Knobs, StatementId,
    WhatIfEstimate, WhatIfOracle, Workload, admissible_indexes,
};
pub use ixtune_ast as ast;
pub use ixtune_error::{IxtuneError, Result};
