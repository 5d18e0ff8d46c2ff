//! Column declarations

use log::debug;
use serde::Serialize;

use crate::error::Error;
use crate::format::FormatStep;
use crate::model::Record;
use crate::model::Value;
use crate::query::Query;
use crate::request::Request;

/// One declared column of a table.
///
/// The key is fixed at construction and identifies the column inside its
/// table. Everything else is configured through [`ColumnMut`].
#[derive(Debug, Clone)]
pub struct Column {
    key: String,
    display: String,
    sortable: bool,
    searchable: bool,
    hidden: bool,
    has_custom_search: bool,
    format: Vec<FormatStep>,
}

/// Snapshot of a column's declared capabilities, as sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub key: String,
    pub display: String,
    pub sortable: bool,
    pub searchable: bool,
    #[serde(rename = "hide")]
    pub hidden: bool,
}

impl Column {
    /// Creates a column. Without a display label, one is derived from the key:
    /// `created_at` becomes `Created at`.
    pub fn new(key: impl Into<String>, display: Option<String>) -> Self {
        let key = key.into();
        let display = display.unwrap_or_else(|| default_display(&key));
        Self {
            key,
            display,
            sortable: false,
            searchable: false,
            hidden: false,
            has_custom_search: false,
            format: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn has_custom_search(&self) -> bool {
        self.has_custom_search
    }

    pub fn format_steps(&self) -> &[FormatStep] {
        &self.format
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Adds this column's per-column filter to `query`.
    ///
    /// Only searchable columns without a custom search take part, and only
    /// when the request carries a non-empty filter value for the key.
    pub fn apply_default_search(&self, request: &Request, query: &mut Query) {
        if !self.searchable || self.has_custom_search {
            return;
        }
        let Some(value) = request.filter_value(&self.key).filter(|v| !v.is_empty()) else {
            return;
        };
        debug!("column {}: filter contains {:?}", self.key, value);
        query.where_like(self.key.as_str(), value);
    }

    /// Runs a raw cell value through the format steps, left to right.
    pub fn render_value(&self, row: &Record, value: Value) -> Result<Value, Error> {
        self.format
            .iter()
            .try_fold(value, |value, step| step.apply(row, value))
    }

    /// Returns the descriptor for this column.
    pub fn describe(&self) -> ColumnDescriptor {
        ColumnDescriptor {
            key: self.key.clone(),
            display: self.display.clone(),
            sortable: self.sortable,
            searchable: self.searchable,
            hidden: self.hidden,
        }
    }
}

fn default_display(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Chained configuration for one column of a [`Table`](crate::table::Table).
///
/// Holds the column together with the table's query, so a custom search can
/// attach its predicate the moment it is declared.
///
/// # Example
///
/// ```
/// use querytable_lib::query::Filter;
/// use querytable_lib::request::Request;
/// use querytable_lib::source::MemorySource;
/// use querytable_lib::table::Table;
///
/// let mut table = Table::new(MemorySource::default(), Request::new());
/// table.column("name").sortable(true).searchable(true).format("titlecase");
/// table.column("status").custom_search(|query, key| {
///     query.filter(Filter::ne(key, "archived"));
/// });
/// ```
pub struct ColumnMut<'a> {
    column: &'a mut Column,
    query: &'a mut Query,
}

impl<'a> ColumnMut<'a> {
    pub(crate) fn new(column: &'a mut Column, query: &'a mut Query) -> Self {
        Self { column, query }
    }

    /// Marks the column as sortable (or not).
    pub fn sortable(self, sortable: bool) -> Self {
        self.column.sortable = sortable;
        self
    }

    /// Marks the column as searchable (or not).
    pub fn searchable(self, searchable: bool) -> Self {
        self.column.searchable = searchable;
        self
    }

    /// Hides the column from rendered rows (or shows it again).
    pub fn hide(self, hidden: bool) -> Self {
        self.column.hidden = hidden;
        self
    }

    /// Replaces the format pipeline with a single step.
    pub fn format(self, step: impl Into<FormatStep>) -> Self {
        self.column.format = vec![step.into()];
        self
    }

    /// Replaces the format pipeline with `steps`, applied in order.
    pub fn with_format<I>(self, steps: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<FormatStep>,
    {
        self.column.format = steps.into_iter().map(Into::into).collect();
        self
    }

    /// Registers a custom search.
    ///
    /// `search` runs immediately with the table's query and this column's
    /// key. From then on the column's default per-column filter is skipped.
    pub fn custom_search<F>(self, search: F) -> Self
    where
        F: FnOnce(&mut Query, &str),
    {
        debug!("column {}: custom search registered", self.column.key);
        search(&mut *self.query, &self.column.key);
        self.column.has_custom_search = true;
        self
    }

    /// Registers a custom search that may fail.
    ///
    /// Like [`ColumnMut::custom_search`], but an error returned by `search`
    /// is passed back as [`Error::Source`] and the column is left without a
    /// custom search.
    pub fn try_custom_search<F, E>(self, search: F) -> Result<Self, Error>
    where
        F: FnOnce(&mut Query, &str) -> Result<(), E>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        search(&mut *self.query, &self.column.key).map_err(Error::source)?;
        debug!("column {}: custom search registered", self.column.key);
        self.column.has_custom_search = true;
        Ok(self)
    }

    /// Returns the column being configured.
    pub fn column(&self) -> &Column {
        self.column
    }
}
