//! Bound SQL statement model for the ixtune index advisor.
//!
//! The advisor sits downstream of a SQL parser *and* binder: every statement
//! it sees has already been name-resolved, so column references carry their
//! catalog OIDs. This crate defines that contract — the DML statement kinds
//! the advisor analyzes, a tagged expression tree for predicates, and
//! [`BoundOid`] for resolved column identity. Parsing and binding themselves
//! live with the host database, not here.

mod display;

use std::fmt;

// ---------------------------------------------------------------------------
// Span — source location tracking
// ---------------------------------------------------------------------------

/// A byte-offset range into the original SQL source text.
///
/// Carried by every expression node so diagnostics can point back at the
/// exact predicate the advisor rejected.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Byte offset of the first character (inclusive).
    pub start: u32,
    /// Byte offset one past the last character (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span from start (inclusive) to end (exclusive) byte offsets.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// A zero-length span at position 0, used as a placeholder.
    pub const ZERO: Self = Self { start: 0, end: 0 };

    /// Merge two spans into one that covers both.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Column references and binding
// ---------------------------------------------------------------------------

/// The resolved catalog identity of a column: database, table, and column
/// OIDs, attached by the binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundOid {
    /// OID of the database.
    pub db: u32,
    /// OID of the table within the database.
    pub table: u32,
    /// OID of the column within the table.
    pub column: u32,
}

impl BoundOid {
    /// Create a resolved OID triple.
    #[must_use]
    pub const fn new(db: u32, table: u32, column: u32) -> Self {
        Self { db, table, column }
    }
}

/// A column reference, possibly table-qualified, with the binder's resolution
/// attached when available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    /// Optional table (or alias) qualifier.
    pub table: Option<String>,
    /// Column name.
    pub column: String,
    /// Resolved OIDs, present once the binder has run.
    pub binding: Option<BoundOid>,
}

impl ColumnRef {
    /// Create an unqualified, unbound column reference.
    #[must_use]
    pub fn bare(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
            binding: None,
        }
    }

    /// Create a table-qualified, unbound column reference.
    #[must_use]
    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
            binding: None,
        }
    }

    /// Attach a binder resolution to this reference.
    #[must_use]
    pub fn bound(mut self, oid: BoundOid) -> Self {
        self.binding = Some(oid);
        self
    }

    /// Whether the binder has resolved this reference.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// The display name, `table.column` or bare `column`.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.table {
            Some(t) => format!("{t}.{}", self.column),
            None => self.column.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// A literal constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// NULL.
    Null,
    /// Integer literal.
    Integer(i64),
    /// Floating-point literal.
    Real(f64),
    /// String literal.
    Text(String),
}

/// Comparison operators the advisor understands in predicate position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>` / `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
}

impl CompareOp {
    /// SQL spelling of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
        }
    }
}

/// Logical connectives in predicate trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// `AND`
    And,
    /// `OR`
    Or,
}

/// A bound SQL expression.
///
/// The tree is deliberately small: it models what a binder hands the advisor,
/// not the full surface grammar. Node kinds the advisor cannot analyze
/// (function calls, subqueries, arithmetic) are still representable so the
/// advisor can reject them with a precise diagnostic instead of never seeing
/// them.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal constant.
    Literal(Literal, Span),

    /// A column reference.
    Column(ColumnRef, Span),

    /// A binary comparison: `lhs op rhs`.
    Compare {
        op: CompareOp,
        lhs: Box<Self>,
        rhs: Box<Self>,
        span: Span,
    },

    /// `expr IN (item, ...)`.
    InList {
        expr: Box<Self>,
        items: Vec<Self>,
        span: Span,
    },

    /// `left AND right` / `left OR right`.
    Logical {
        op: LogicalOp,
        left: Box<Self>,
        right: Box<Self>,
        span: Span,
    },

    /// A function call: `name(args...)`.
    Function {
        name: String,
        args: Vec<Self>,
        span: Span,
    },

    /// An arithmetic or other binary operation the advisor does not analyze.
    Arithmetic {
        op: char,
        lhs: Box<Self>,
        rhs: Box<Self>,
        span: Span,
    },

    /// An opaque scalar subquery.
    Subquery(Span),
}

impl Expr {
    /// The source span of this expression.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Literal(_, span) | Self::Column(_, span) | Self::Subquery(span) => *span,
            Self::Compare { span, .. }
            | Self::InList { span, .. }
            | Self::Logical { span, .. }
            | Self::Function { span, .. }
            | Self::Arithmetic { span, .. } => *span,
        }
    }

    /// Short description of the node kind, for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Literal(..) => "literal",
            Self::Column(..) => "column reference",
            Self::Compare { .. } => "comparison",
            Self::InList { .. } => "IN list",
            Self::Logical { .. } => "logical connective",
            Self::Function { .. } => "function call",
            Self::Arithmetic { .. } => "arithmetic expression",
            Self::Subquery(..) => "subquery",
        }
    }

    /// Convenience constructor for a bound column expression.
    #[must_use]
    pub fn column(col: ColumnRef, span: Span) -> Self {
        Self::Column(col, span)
    }

    /// Convenience constructor for an integer literal.
    #[must_use]
    pub const fn integer(value: i64) -> Self {
        Self::Literal(Literal::Integer(value), Span::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Ordering terms
// ---------------------------------------------------------------------------

/// ASC or DESC in an ORDER BY term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending (the default).
    Asc,
    /// Descending.
    Desc,
}

/// A single ORDER BY term.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderingTerm {
    /// The ordered expression.
    pub expr: Expr,
    /// ASC or DESC, if written.
    pub direction: Option<SortDirection>,
}

impl OrderingTerm {
    /// An ordering term over an expression with no explicit direction.
    #[must_use]
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            direction: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Table references and statements
// ---------------------------------------------------------------------------

/// A (possibly database-qualified) table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    /// Optional database qualifier.
    pub database: Option<String>,
    /// Table name.
    pub name: String,
}

impl TableRef {
    /// An unqualified table reference.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            database: None,
            name: name.into(),
        }
    }
}

/// One output column of a SELECT.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultColumn {
    /// `*`
    Star,
    /// An expression with an optional alias.
    Expr {
        expr: Expr,
        alias: Option<String>,
    },
}

/// A bound SELECT statement, reduced to the clauses the advisor reads.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Output columns.
    pub columns: Vec<ResultColumn>,
    /// Source table.
    pub from: Option<TableRef>,
    /// WHERE clause.
    pub where_clause: Option<Expr>,
    /// GROUP BY expressions.
    pub group_by: Vec<Expr>,
    /// ORDER BY terms.
    pub order_by: Vec<OrderingTerm>,
    /// LIMIT row count.
    pub limit: Option<u64>,
}

impl SelectStatement {
    /// A `SELECT * FROM table` skeleton to be filled in by builders.
    #[must_use]
    pub fn star_from(table: impl Into<String>) -> Self {
        Self {
            columns: vec![ResultColumn::Star],
            from: Some(TableRef::named(table)),
            where_clause: None,
            group_by: vec![],
            order_by: vec![],
            limit: None,
        }
    }
}

/// Source of rows for an INSERT.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// `VALUES (...), (...)`.
    Values(Vec<Vec<Expr>>),
    /// `INSERT ... SELECT ...`.
    Select(Box<SelectStatement>),
}

/// A bound INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table.
    pub table: TableRef,
    /// Optional column name list.
    pub columns: Vec<String>,
    /// Row source.
    pub source: InsertSource,
}

/// A single `SET column = value` assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Assigned column.
    pub column: ColumnRef,
    /// Assigned value.
    pub value: Expr,
}

/// A bound UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Target table.
    pub table: TableRef,
    /// SET assignments.
    pub assignments: Vec<Assignment>,
    /// WHERE clause.
    pub where_clause: Option<Expr>,
}

/// A bound DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Target table.
    pub table: TableRef,
    /// WHERE clause.
    pub where_clause: Option<Expr>,
}

/// A bound DML statement, the advisor's unit of input.
///
/// DDL and transaction-control statements never reach the advisor; the host's
/// workload capture filters them before handing statements over.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}

impl Statement {
    /// Statement kind name for diagnostics and tracing.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Select(_) => "SELECT",
            Self::Insert(_) => "INSERT",
            Self::Update(_) => "UPDATE",
            Self::Delete(_) => "DELETE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_merge_covers_both() {
        let a = Span::new(3, 7);
        let b = Span::new(5, 12);
        assert_eq!(a.merge(b), Span::new(3, 12));
        assert_eq!(b.merge(a), Span::new(3, 12));
    }

    #[test]
    fn column_ref_builders() {
        let col = ColumnRef::bare("a");
        assert!(!col.is_bound());
        assert_eq!(col.display_name(), "a");

        let col = ColumnRef::qualified("t", "a").bound(BoundOid::new(1, 10, 100));
        assert!(col.is_bound());
        assert_eq!(col.display_name(), "t.a");
        assert_eq!(col.binding.unwrap().column, 100);
    }

    #[test]
    fn expr_span_propagation() {
        let expr = Expr::Compare {
            op: CompareOp::Eq,
            lhs: Box::new(Expr::Column(ColumnRef::bare("a"), Span::new(0, 1))),
            rhs: Box::new(Expr::integer(1)),
            span: Span::new(0, 5),
        };
        assert_eq!(expr.span(), Span::new(0, 5));
        assert_eq!(expr.kind_name(), "comparison");
    }

    #[test]
    fn statement_kind_names() {
        let select = Statement::Select(SelectStatement::star_from("t"));
        assert_eq!(select.kind_name(), "SELECT");

        let delete = Statement::Delete(DeleteStatement {
            table: TableRef::named("t"),
            where_clause: None,
        });
        assert_eq!(delete.kind_name(), "DELETE");
    }
}
