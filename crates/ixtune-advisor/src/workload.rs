//! Workloads: the ordered statement sets the advisor tunes for.

use ixtune_ast::Statement;
use std::sync::Arc;

/// Stable identity of one statement within a run, used in memo keys.
///
/// Derived from the `Arc` allocation address, so it is unique among the live
/// statements of a workload and costs nothing to compare. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatementId(usize);

impl StatementId {
    /// Identity of a shared statement.
    #[must_use]
    pub fn of(statement: &Arc<Statement>) -> Self {
        Self(Arc::as_ptr(statement) as usize)
    }
}

/// An ordered sequence of bound statements plus the target database name.
///
/// Statements are shared immutably; the advisor never mutates them.
#[derive(Debug, Clone)]
pub struct Workload {
    statements: Vec<Arc<Statement>>,
    database: String,
}

impl Workload {
    /// An empty workload against the named database.
    #[must_use]
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            statements: Vec::new(),
            database: database.into(),
        }
    }

    /// A workload holding a single shared statement.
    #[must_use]
    pub fn single(database: impl Into<String>, statement: Arc<Statement>) -> Self {
        Self {
            statements: vec![statement],
            database: database.into(),
        }
    }

    /// Build a workload from owned statements, in order.
    #[must_use]
    pub fn from_statements(
        database: impl Into<String>,
        statements: impl IntoIterator<Item = Statement>,
    ) -> Self {
        Self {
            statements: statements.into_iter().map(Arc::new).collect(),
            database: database.into(),
        }
    }

    /// Append a statement.
    pub fn push(&mut self, statement: Statement) {
        self.statements.push(Arc::new(statement));
    }

    /// Target database name.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Iterate statements in workload order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Statement>> {
        self.statements.iter()
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether the workload has no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
