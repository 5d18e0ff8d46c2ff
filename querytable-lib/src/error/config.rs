//! Table configuration errors

/// Raised when a table is declared in a way that cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Both a visible list and a hidden list were given.
    #[error("Cannot use visible columns and hidden columns at the same time")]
    ConflictingVisibility,

    /// A shorthand operation name that is not a known format.
    #[error("Method '{0}' not found")]
    UnknownOperation(String),

    /// A format shorthand was called with neither 1 nor 2 arguments.
    #[error("'{operation}' takes 1 or 2 arguments, got {count}")]
    ArgumentCount { operation: String, count: usize },
}

impl ConfigError {
    /// Creates a new unknown operation error.
    pub fn unknown_operation(name: impl Into<String>) -> Self {
        Self::UnknownOperation(name.into())
    }

    /// Creates a new argument count error.
    pub fn argument_count(operation: impl Into<String>, count: usize) -> Self {
        Self::ArgumentCount {
            operation: operation.into(),
            count,
        }
    }
}
