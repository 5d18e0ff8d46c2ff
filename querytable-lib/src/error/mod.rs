//! Error types

mod config;
mod field;
mod format;

pub use config::*;
pub use field::*;
pub use format::*;

/// Errors that can abort a table build.
///
/// Configuration and format errors originate in this crate. Errors raised by
/// the query source or by caller-supplied callbacks are passed through
/// unchanged; a [`FieldError`] from a typed row read inside a callback
/// arrives as [`Error::Source`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The table was declared inconsistently.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A named format step could not convert a cell value.
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// The SQLite source failed.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A custom query source, format step or search callback failed.
    #[error("Source error: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps an error raised outside the crate: a custom
    /// [`QuerySource`](crate::source::QuerySource), a fallible format step or
    /// a fallible custom search.
    pub fn source(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Source(err.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
