use thiserror::Error;

/// Primary error type for ixtune operations.
///
/// Structured variants for the failure modes the advisor can surface to a
/// caller. Every variant is fatal for the invocation that raised it; the
/// engine never retries internally.
#[derive(Error, Debug)]
pub enum IxtuneError {
    // === Input validation ===
    /// A column reference reached the advisor without resolved OIDs.
    ///
    /// The advisor operates strictly post-binding; an unbound reference means
    /// the caller handed over a statement the binder never saw.
    #[error("unbound column reference: {name}")]
    UnboundColumn { name: String },

    /// A predicate contains an expression kind the advisor cannot analyze.
    #[error("unsupported expression in predicate: {found}")]
    UnsupportedExpression { found: String },

    /// A statement kind outside SELECT/INSERT/UPDATE/DELETE was submitted.
    #[error("cannot advise on statement: {kind}")]
    UnsupportedStatement { kind: String },

    /// Search knobs failed validation.
    #[error("invalid knobs: {detail}")]
    InvalidKnobs { detail: String },

    // === Index key construction ===
    /// An index key was constructed with an empty column list.
    #[error("index key requires at least one column")]
    EmptyColumnList,

    /// An index key was constructed with a repeated column.
    #[error("duplicate column {column} in index key")]
    DuplicateColumn { column: u32 },

    // === Cost oracle ===
    /// The what-if oracle reported a failure.
    #[error("what-if oracle failed: {detail}")]
    OracleFailure { detail: String },

    /// The what-if oracle returned a cost that is NaN or infinite.
    #[error("what-if oracle returned a non-finite cost for statement '{statement}'")]
    NonFiniteCost { statement: String },

    // === Ambient ===
    /// File I/O error (workload import, report export).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal invariant breach (should never happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl IxtuneError {
    /// Create an unbound-column error from a display name.
    pub fn unbound(name: impl Into<String>) -> Self {
        Self::UnboundColumn { name: name.into() }
    }

    /// Create an unsupported-expression error from a node description.
    pub fn unsupported(found: impl Into<String>) -> Self {
        Self::UnsupportedExpression {
            found: found.into(),
        }
    }

    /// Create a knob-validation error.
    pub fn invalid_knobs(detail: impl Into<String>) -> Self {
        Self::InvalidKnobs {
            detail: detail.into(),
        }
    }

    /// Create an oracle-failure error.
    pub fn oracle(detail: impl Into<String>) -> Self {
        Self::OracleFailure {
            detail: detail.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error indicates bad input (statements or knobs) rather
    /// than an engine or oracle defect. Input errors are actionable by the
    /// caller; the rest warrant a bug report.
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnboundColumn { .. }
                | Self::UnsupportedExpression { .. }
                | Self::UnsupportedStatement { .. }
                | Self::InvalidKnobs { .. }
                | Self::EmptyColumnList
                | Self::DuplicateColumn { .. }
        )
    }

    /// Whether this error originated in the what-if oracle.
    pub const fn is_oracle_error(&self) -> bool {
        matches!(
            self,
            Self::OracleFailure { .. } | Self::NonFiniteCost { .. }
        )
    }
}

/// Result type alias using `IxtuneError`.
pub type Result<T> = std::result::Result<T, IxtuneError>;
