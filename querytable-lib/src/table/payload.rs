//! Build output

use indexmap::IndexMap;
use serde::Serialize;

use crate::column::ColumnDescriptor;
use crate::model::Value;
use crate::query::Direction;

/// The display-ready result of a table build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    pub meta: Meta,
    /// One descriptor per declared column, hidden ones included.
    pub columns: Vec<ColumnDescriptor>,
    /// Formatted rows holding the visible columns only.
    pub rows: Vec<IndexMap<String, Value>>,
}

/// Pagination and request echo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meta {
    pub per_page: usize,
    pub current_page: usize,
    pub last_page: usize,
    pub from: Option<usize>,
    pub to: Option<usize>,
    /// The parsed request sort, as requested.
    pub sort: IndexMap<String, Direction>,
    /// The request search term.
    pub q: Option<String>,
}

impl Payload {
    /// Serializes the payload to a JSON value.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
