//! Format step errors

/// Raised when a named format cannot convert a value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    /// The value could not be read as a date, time or datetime.
    #[error("Could not parse '{value}' as a date/time for format '{format}'")]
    InvalidDateTime { format: &'static str, value: String },
}

impl FormatError {
    /// Creates a new datetime parse error.
    pub fn invalid_datetime(format: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidDateTime {
            format,
            value: value.into(),
        }
    }
}
