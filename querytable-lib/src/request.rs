//! Inbound request snapshot

use std::collections::HashMap;

use indexmap::IndexMap;
use log::warn;
use url::form_urlencoded;

use crate::config::RequestKeys;
use crate::query::Direction;

/// The list-view parameters of one inbound request.
///
/// Built once per request and read-only afterwards. It can be filled from a
/// URL query string or set field by field.
///
/// # Example
///
/// ```
/// use querytable_lib::query::Direction;
/// use querytable_lib::request::Request;
///
/// let request = Request::from_query_str("filter[status]=open&sort=name:desc,id&q=ann&limit=25");
///
/// assert_eq!(request.filter_value("status"), Some("open"));
/// assert_eq!(request.search(), Some("ann"));
/// assert_eq!(request.limit(), Some(25));
///
/// let sort = request.sort();
/// assert_eq!(sort.get("name"), Some(&Direction::Desc));
/// assert_eq!(sort.get("id"), Some(&Direction::Asc));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    filters: Option<HashMap<String, String>>,
    sort: Option<String>,
    search: Option<String>,
    limit: Option<usize>,
    page: Option<usize>,
}

impl Request {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a URL query string using the default parameter names.
    ///
    /// A leading `?` is ignored.
    pub fn from_query_str(query: &str) -> Self {
        Self::from_query_str_with(query, &RequestKeys::default())
    }

    /// Parses a URL query string using the given parameter names.
    pub fn from_query_str_with(query: &str, keys: &RequestKeys) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(form_urlencoded::parse(query.as_bytes()), keys)
    }

    /// Builds a request from already-decoded parameter pairs.
    ///
    /// When a parameter repeats, the last occurrence wins.
    pub fn from_pairs<I, K, V>(pairs: I, keys: &RequestKeys) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let filter_prefix = format!("{}[", keys.filter);
        let mut request = Request::new();

        for (name, value) in pairs {
            let (name, value) = (name.as_ref(), value.as_ref());

            if let Some(column) = name
                .strip_prefix(filter_prefix.as_str())
                .and_then(|rest| rest.strip_suffix(']'))
            {
                request = request.with_filter(column, value);
            } else if name == keys.sort {
                request.sort = Some(value.to_string());
            } else if name == keys.search {
                request.search = Some(value.to_string());
            } else if name == keys.limit {
                request.limit = parse_positive(name, value);
            } else if name == keys.page {
                request.page = parse_positive(name, value);
            }
        }

        request
    }

    // =========================================================================
    // Builders
    // =========================================================================

    /// Sets the filter value for one column.
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets the raw sort specification, e.g. `"name:desc,id"`.
    pub fn with_sort(mut self, spec: impl Into<String>) -> Self {
        self.sort = Some(spec.into());
        self
    }

    /// Sets the global search term.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Sets the requested page size.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit).filter(|n| *n > 0);
        self
    }

    /// Sets the requested page number (1-based).
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page).filter(|n| *n > 0);
        self
    }

    // =========================================================================
    // Readers
    // =========================================================================

    /// Returns the filter value for `key`, if the request carries one.
    pub fn filter_value(&self, key: &str) -> Option<&str> {
        self.filters.as_ref()?.get(key).map(String::as_str)
    }

    /// Returns the raw sort specification.
    pub fn sort_spec(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    /// Parses the sort specification into an ordered column → direction map.
    ///
    /// Segments are `column` or `column:direction`. A missing or unknown
    /// direction reads as ascending. A column named twice keeps its first
    /// position and its last direction. Segments with an empty column name
    /// are skipped.
    pub fn sort(&self) -> IndexMap<String, Direction> {
        let mut order = IndexMap::new();
        let Some(spec) = self.sort.as_deref() else {
            return order;
        };

        for segment in spec.split(',') {
            let mut parts = segment.split(':');
            let column = parts.next().unwrap_or_default();
            if column.is_empty() {
                continue;
            }
            // Only `column:direction` carries a direction; extra colons void it.
            let direction = match (parts.next(), parts.next()) {
                (Some(direction), None) => Direction::parse_lenient(direction),
                _ => Direction::Asc,
            };
            order.insert(column.to_string(), direction);
        }

        order
    }

    /// Returns the global search term. An empty term counts as absent.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().filter(|term| !term.is_empty())
    }

    /// Returns the requested page size.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the requested page number.
    pub fn page(&self) -> Option<usize> {
        self.page
    }
}

fn parse_positive(name: &str, value: &str) -> Option<usize> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            warn!("request: ignoring {}={:?}, expected a positive integer", name, value);
            None
        }
    }
}
