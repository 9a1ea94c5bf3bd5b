//! Error types for selection variants
//!
//! Every failure in this crate is a malformed-input condition: callers
//! passed a bad sign, option, property name or JSON document.

/// Errors raised while building or parsing a selection variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// Property or parameter name was empty
    #[error("property name must not be empty")]
    EmptyPropertyName,

    /// Sign code other than `I` / `E`
    #[error("unknown sign: '{0}'")]
    UnknownSign(String),

    /// Option code outside the closed option set
    #[error("unknown select option: '{0}'")]
    UnknownOption(String),

    /// Condition operator name outside the closed operator set
    #[error("unknown condition operator: '{0}'")]
    UnknownCondition(String),

    /// Range option needs an upper bound but none was given
    #[error("option {option} on '{property}' requires a high value")]
    MissingHigh {
        /// Property the range was added to
        property: String,
        /// Option code that needs a high value
        option: String,
    },

    /// Wrong number of values for a condition operator
    #[error("operator {operator} expects {expected} value(s), got {actual}")]
    ConditionArity {
        /// Operator name
        operator: &'static str,
        /// Values the operator takes
        expected: usize,
        /// Values given
        actual: usize,
    },

    /// Rename target already taken
    #[error("cannot rename '{from}' to '{to}': target already exists")]
    RenameCollision {
        /// Current name
        from: String,
        /// Name already in use
        to: String,
    },

    /// Rename source does not exist
    #[error("cannot rename '{0}': no such entry")]
    RenameMissing(String),

    /// JSON text or value does not have the selection variant shape
    #[error("malformed selection variant: {0}")]
    Malformed(String),
}

impl SelectionError {
    /// Create malformed-document error
    #[inline]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

/// Result alias for selection variant operations
pub type SelectionResult<T> = Result<T, SelectionError>;
