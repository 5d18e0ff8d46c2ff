//! Query builder.

use log::debug;

use super::Direction;
use super::Filter;
use super::OrderBy;

/// Accumulates filters and orderings for one table build.
///
/// Top-level filters are combined with AND. Orderings apply in the order
/// they were added.
///
/// # Example
///
/// ```
/// use querytable_lib::query::{Direction, Filter, Query};
///
/// let mut query = Query::new();
/// query
///     .filter(Filter::eq("active", true))
///     .where_like("name", "ann")
///     .or_where_group(|group| {
///         group.or_where_like("name", "bob").or_where_like("email", "bob");
///     })
///     .order_by("name", Direction::Asc);
///
/// assert_eq!(query.filters().len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<Filter>,
    order: OrderBy,
}

impl Query {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter condition.
    pub fn filter(&mut self, filter: Filter) -> &mut Self {
        debug!("query: filter {:?}", filter);
        self.filters.push(filter);
        self
    }

    /// Adds a case-insensitive contains predicate on a column.
    pub fn where_like(&mut self, column: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.filter(Filter::contains(column, value))
    }

    /// Adds one OR group built by `build`.
    ///
    /// A group that ends up with no members is not added.
    pub fn or_where_group<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut OrGroup),
    {
        let mut group = OrGroup::default();
        build(&mut group);
        if !group.filters.is_empty() {
            self.filter(Filter::Or(group.filters));
        }
        self
    }

    /// Adds an ordering clause.
    pub fn order_by(&mut self, column: impl Into<String>, direction: Direction) -> &mut Self {
        let column = column.into();
        debug!("query: order by {} {}", column, direction);
        self.order.push(column, direction);
        self
    }

    /// Returns the top-level filters.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Returns the accumulated ordering.
    pub fn order(&self) -> &OrderBy {
        &self.order
    }

    /// Returns `true` if nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.order.is_empty()
    }
}

/// Members of one OR group, see [`Query::or_where_group`].
#[derive(Debug, Default)]
pub struct OrGroup {
    filters: Vec<Filter>,
}

impl OrGroup {
    /// Adds an alternative condition.
    pub fn or_filter(&mut self, filter: Filter) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Adds an alternative case-insensitive contains predicate.
    pub fn or_where_like(&mut self, column: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.or_filter(Filter::contains(column, value))
    }

    /// Returns the number of alternatives so far.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if no alternatives have been added.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
