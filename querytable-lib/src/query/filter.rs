//! Filter conditions for queries.

use crate::model::Value;

/// A filter condition for querying rows.
///
/// Filters are scoped to one column each and can be grouped with `And`/`Or`.
/// An empty group matches every row.
///
/// # Example
///
/// ```
/// use querytable_lib::query::Filter;
///
/// // Simple equality filter
/// let filter = Filter::eq("status", "active");
///
/// // Either-or search
/// let filter = Filter::or([
///     Filter::contains("name", "ann"),
///     Filter::contains("email", "ann"),
/// ]);
///
/// // Using combinators
/// let filter = Filter::eq("status", "active")
///     .and_also(Filter::gt("age", 18));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Equality: `field = value`
    Eq(String, Value),
    /// Not equal: `field <> value`
    Ne(String, Value),
    /// Greater than: `field > value`
    Gt(String, Value),
    /// Greater than or equal: `field >= value`
    Ge(String, Value),
    /// Less than: `field < value`
    Lt(String, Value),
    /// Less than or equal: `field <= value`
    Le(String, Value),
    /// Case-insensitive substring: `field LIKE '%value%'`
    Contains(String, String),
    /// Case-insensitive prefix: `field LIKE 'value%'`
    StartsWith(String, String),
    /// Case-insensitive suffix: `field LIKE '%value'`
    EndsWith(String, String),
    /// Is null: `field IS NULL`
    IsNull(String),
    /// Is not null: `field IS NOT NULL`
    IsNotNull(String),
    /// Logical AND of multiple filters.
    And(Vec<Filter>),
    /// Logical OR of multiple filters.
    Or(Vec<Filter>),
}

impl Filter {
    /// Creates an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    /// Creates a not-equal filter.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ne(field.into(), value.into())
    }

    /// Creates a greater-than filter.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gt(field.into(), value.into())
    }

    /// Creates a greater-than-or-equal filter.
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ge(field.into(), value.into())
    }

    /// Creates a less-than filter.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lt(field.into(), value.into())
    }

    /// Creates a less-than-or-equal filter.
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Le(field.into(), value.into())
    }

    /// Creates a contains filter.
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Contains(field.into(), value.into())
    }

    /// Creates a starts-with filter.
    pub fn starts_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::StartsWith(field.into(), value.into())
    }

    /// Creates an ends-with filter.
    pub fn ends_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::EndsWith(field.into(), value.into())
    }

    /// Creates an is-null filter.
    pub fn is_null(field: impl Into<String>) -> Self {
        Filter::IsNull(field.into())
    }

    /// Creates an is-not-null filter.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Filter::IsNotNull(field.into())
    }

    /// Creates a logical AND of multiple filters.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(filters.into_iter().collect())
    }

    /// Creates a logical OR of multiple filters.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(filters.into_iter().collect())
    }

    /// Combines this filter with another using logical AND.
    pub fn and_also(self, other: Filter) -> Self {
        match self {
            Filter::And(mut filters) => {
                filters.push(other);
                Filter::And(filters)
            }
            _ => Filter::And(vec![self, other]),
        }
    }

    /// Combines this filter with another using logical OR.
    pub fn or_else(self, other: Filter) -> Self {
        match self {
            Filter::Or(mut filters) => {
                filters.push(other);
                Filter::Or(filters)
            }
            _ => Filter::Or(vec![self, other]),
        }
    }

    /// Returns the column this filter reads, or `None` for groups.
    pub fn field(&self) -> Option<&str> {
        match self {
            Filter::Eq(f, _)
            | Filter::Ne(f, _)
            | Filter::Gt(f, _)
            | Filter::Ge(f, _)
            | Filter::Lt(f, _)
            | Filter::Le(f, _)
            | Filter::Contains(f, _)
            | Filter::StartsWith(f, _)
            | Filter::EndsWith(f, _)
            | Filter::IsNull(f)
            | Filter::IsNotNull(f) => Some(f),
            Filter::And(_) | Filter::Or(_) => None,
        }
    }
}
