//! Cell value formatting
//!
//! A column renders each cell through an ordered list of [`FormatStep`]s.
//! Named steps resolve to a built-in [`Format`]; custom steps are closures
//! that also see the whole row.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::Utc;

use crate::error::Error;
use crate::error::FormatError;
use crate::model::Record;
use crate::model::Value;

/// The built-in named formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// `DD/MM/YYYY`
    Date,
    /// `DD/MM/YYYY HH:mm:ss`
    DateTime,
    /// `HH:mm:ss`
    Time,
    /// Numeric coercion, truncated to an integer.
    Integer,
    /// Numeric coercion to floating point.
    Float,
    /// Truthiness.
    Boolean,
    /// Pass-through.
    Text,
    Uppercase,
    Lowercase,
    /// Capitalize each word, lowercase the rest.
    Titlecase,
    /// Capitalize the first character only.
    Ucfirst,
}

impl Format {
    /// Every built-in format.
    pub const ALL: [Format; 11] = [
        Format::Date,
        Format::DateTime,
        Format::Time,
        Format::Integer,
        Format::Float,
        Format::Boolean,
        Format::Text,
        Format::Uppercase,
        Format::Lowercase,
        Format::Titlecase,
        Format::Ucfirst,
    ];

    /// Returns the identifier of this format.
    pub fn id(&self) -> &'static str {
        match self {
            Format::Date => "date",
            Format::DateTime => "datetime",
            Format::Time => "time",
            Format::Integer => "integer",
            Format::Float => "float",
            Format::Boolean => "boolean",
            Format::Text => "text",
            Format::Uppercase => "uppercase",
            Format::Lowercase => "lowercase",
            Format::Titlecase => "titlecase",
            Format::Ucfirst => "ucfirst",
        }
    }

    /// Looks up a format by identifier. Identifiers are case-sensitive.
    pub fn from_id(id: &str) -> Option<Format> {
        Format::ALL.into_iter().find(|format| format.id() == id)
    }

    /// Returns `true` if `id` names a built-in format.
    pub fn in_list(id: &str) -> bool {
        Format::from_id(id).is_some()
    }

    /// Formats one value.
    ///
    /// Null passes through the date formats unchanged.
    pub fn apply(&self, value: &Value) -> Result<Value, FormatError> {
        let formatted = match self {
            Format::Date => return render_datetime(self, value, "%d/%m/%Y"),
            Format::DateTime => return render_datetime(self, value, "%d/%m/%Y %H:%M:%S"),
            Format::Time => return render_datetime(self, value, "%H:%M:%S"),
            Format::Integer => Value::Int(value.to_int()),
            Format::Float => Value::Float(value.to_float()),
            Format::Boolean => Value::Bool(value.is_truthy()),
            Format::Text => value.clone(),
            Format::Uppercase => Value::String(value.to_text().to_uppercase()),
            Format::Lowercase => Value::String(value.to_text().to_lowercase()),
            Format::Titlecase => Value::String(titlecase(&value.to_text())),
            Format::Ucfirst => Value::String(ucfirst(&value.to_text())),
        };
        Ok(formatted)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::from_id(s).ok_or_else(|| format!("unknown format '{}'", s))
    }
}

/// A custom formatter: receives the whole row and the current cell value.
///
/// Errors abort the build and reach the caller unchanged.
pub type FormatFn = Arc<dyn Fn(&Record, Value) -> Result<Value, Error> + Send + Sync>;

/// One step of a column's format pipeline.
///
/// # Example
///
/// ```
/// use querytable_lib::format::{Format, FormatStep};
/// use querytable_lib::model::{Record, Value};
///
/// let steps = [
///     FormatStep::from(Format::Uppercase),
///     FormatStep::custom(|_row, value| Value::String(format!("<{}>", value.to_text()))),
/// ];
///
/// let row = Record::new();
/// let mut value = Value::from("ok");
/// for step in &steps {
///     value = step.apply(&row, value).unwrap();
/// }
/// assert_eq!(value, Value::from("<OK>"));
/// ```
#[derive(Clone)]
pub enum FormatStep {
    /// A format identifier. Unknown identifiers leave the value unchanged.
    Named(String),
    /// A caller-supplied function.
    Custom(FormatFn),
}

impl FormatStep {
    /// Creates a named step.
    pub fn named(id: impl Into<String>) -> Self {
        FormatStep::Named(id.into())
    }

    /// Creates a custom step that cannot fail.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Record, Value) -> Value + Send + Sync + 'static,
    {
        FormatStep::Custom(Arc::new(move |row, value| Ok(f(row, value))))
    }

    /// Creates a custom step that may fail.
    ///
    /// A returned error is wrapped in [`Error::Source`].
    pub fn try_custom<F, E>(f: F) -> Self
    where
        F: Fn(&Record, Value) -> Result<Value, E> + Send + Sync + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        FormatStep::Custom(Arc::new(move |row, value| f(row, value).map_err(Error::source)))
    }

    /// Runs this step on `value`.
    pub fn apply(&self, row: &Record, value: Value) -> Result<Value, Error> {
        match self {
            FormatStep::Named(id) => match Format::from_id(id) {
                Some(format) => Ok(format.apply(&value)?),
                None => Ok(value),
            },
            FormatStep::Custom(f) => f(row, value),
        }
    }
}

impl fmt::Debug for FormatStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatStep::Named(id) => f.debug_tuple("Named").field(id).finish(),
            FormatStep::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<Format> for FormatStep {
    fn from(format: Format) -> Self {
        FormatStep::Named(format.id().to_string())
    }
}

impl From<&str> for FormatStep {
    fn from(id: &str) -> Self {
        FormatStep::named(id)
    }
}

impl From<String> for FormatStep {
    fn from(id: String) -> Self {
        FormatStep::Named(id)
    }
}

// =============================================================================
// Text helpers
// =============================================================================

fn titlecase(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            at_word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

fn ucfirst(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Date/time parsing
// =============================================================================

const DATETIME_LAYOUTS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const TIME_LAYOUTS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

fn render_datetime(format: &Format, value: &Value, layout: &str) -> Result<Value, FormatError> {
    let parsed = match value {
        Value::Null => return Ok(Value::Null),
        Value::DateTime(dt) => Some(*dt),
        Value::String(s) => parse_datetime(s.trim()),
        _ => None,
    };
    parsed
        .map(|dt| Value::String(dt.format(layout).to_string()))
        .ok_or_else(|| FormatError::invalid_datetime(format.id(), value.to_text()))
}

/// Reads a date, datetime or time-of-day string.
///
/// A bare time of day is placed on today's (UTC) date.
fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Some(dt) = DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(s, layout).ok())
    {
        return Some(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    TIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveTime::parse_from_str(s, layout).ok())
        .map(|time| Utc::now().date_naive().and_time(time))
}
