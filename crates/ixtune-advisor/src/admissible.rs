//! Admissible-column extraction.
//!
//! A column is *admissible* for a statement when a single-column index on it
//! could plausibly be exploited by the optimizer:
//!
//! 1. It appears in the WHERE clause as `column OP expr` with
//!    `OP ∈ {=, <>, <, <=, >, >=, LIKE, NOT LIKE, IN}` and exactly one side
//!    of the comparison is a bound column reference.
//! 2. It is a GROUP BY column (SELECT only).
//! 3. It is an ORDER BY column (SELECT only).
//! 4. For UPDATE, the WHERE columns; optionally also the SET-target columns.
//! 5. For `INSERT … SELECT`, the inner SELECT's WHERE columns.
//! 6. For DELETE, its WHERE columns.
//!
//! Each admissible column contributes one single-column [`IndexKey`],
//! interned through the pool into the output [`Configuration`].

use crate::config::Configuration;
use crate::key::IndexKey;
use crate::pool::IndexPool;
use ixtune_ast::{ColumnRef, Expr, Statement};
use ixtune_error::{IxtuneError, Result};

/// Extract the admissible single-column index set of one bound statement.
///
/// `include_updated_columns` additionally admits the SET-target columns of
/// UPDATE statements (see [`crate::Knobs::index_updated_columns`]).
///
/// # Errors
///
/// [`IxtuneError::UnboundColumn`] if any admissible column reference lacks
/// resolved OIDs, [`IxtuneError::UnsupportedExpression`] if a predicate
/// contains a node kind outside the allowed set.
pub fn admissible_indexes(
    statement: &Statement,
    pool: &mut IndexPool,
    include_updated_columns: bool,
) -> Result<Configuration> {
    let mut config = Configuration::new();

    match statement {
        Statement::Select(select) => {
            collect_where(select.where_clause.as_ref(), pool, &mut config)?;
            for term in &select.order_by {
                collect_clause_column(&term.expr, "ORDER BY", pool, &mut config)?;
            }
            for expr in &select.group_by {
                collect_clause_column(expr, "GROUP BY", pool, &mut config)?;
            }
        }
        Statement::Insert(insert) => {
            // Only INSERT ... SELECT can benefit: the read side of the load.
            if let ixtune_ast::InsertSource::Select(select) = &insert.source {
                collect_where(select.where_clause.as_ref(), pool, &mut config)?;
            }
        }
        Statement::Update(update) => {
            collect_where(update.where_clause.as_ref(), pool, &mut config)?;
            if include_updated_columns {
                for assignment in &update.assignments {
                    intern_column(&assignment.column, pool, &mut config)?;
                }
            }
        }
        Statement::Delete(delete) => {
            collect_where(delete.where_clause.as_ref(), pool, &mut config)?;
        }
    }

    Ok(config)
}

/// Walk a WHERE tree, admitting the column side of each comparison.
fn collect_where(
    where_clause: Option<&Expr>,
    pool: &mut IndexPool,
    config: &mut Configuration,
) -> Result<()> {
    let Some(expr) = where_clause else {
        tracing::debug!("admissible.no_where_clause");
        return Ok(());
    };
    walk_predicate(expr, pool, config)
}

fn walk_predicate(expr: &Expr, pool: &mut IndexPool, config: &mut Configuration) -> Result<()> {
    match expr {
        Expr::Logical { left, right, .. } => {
            walk_predicate(left, pool, config)?;
            walk_predicate(right, pool, config)
        }
        Expr::Compare { lhs, rhs, .. } => {
            // Exactly one side must be a column reference.
            let column = match (lhs.as_ref(), rhs.as_ref()) {
                (Expr::Column(col, _), other) if !matches!(other, Expr::Column(..)) => col,
                (other, Expr::Column(col, _)) if !matches!(other, Expr::Column(..)) => col,
                _ => {
                    return Err(IxtuneError::unsupported(format!(
                        "comparison without a single column side: {expr}"
                    )));
                }
            };
            intern_column(column, pool, config)
        }
        Expr::InList { expr: lhs, .. } => match lhs.as_ref() {
            Expr::Column(col, _) => intern_column(col, pool, config),
            other => Err(IxtuneError::unsupported(format!(
                "IN list over a {}",
                other.kind_name()
            ))),
        },
        other => Err(IxtuneError::unsupported(other.kind_name().to_owned())),
    }
}

/// Admit a bare column from a GROUP BY / ORDER BY clause. Anything other
/// than a plain column reference in these positions is rejected.
fn collect_clause_column(
    expr: &Expr,
    clause: &str,
    pool: &mut IndexPool,
    config: &mut Configuration,
) -> Result<()> {
    match expr {
        Expr::Column(col, _) => intern_column(col, pool, config),
        other => Err(IxtuneError::unsupported(format!(
            "{clause} over a {}",
            other.kind_name()
        ))),
    }
}

/// Intern one admissible column as a single-column index key.
fn intern_column(
    column: &ColumnRef,
    pool: &mut IndexPool,
    config: &mut Configuration,
) -> Result<()> {
    let Some(oid) = column.binding else {
        return Err(IxtuneError::unbound(column.display_name()));
    };
    let handle = pool.intern(IndexKey::single(oid.db, oid.table, oid.column));
    config.add(handle);
    Ok(())
}
