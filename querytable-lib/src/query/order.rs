//! Ordering types for queries.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Sort direction for ordering results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// Reads a direction from request text.
    ///
    /// Case-insensitive. Anything other than `asc` or `desc`, including an
    /// empty string, reads as [`Direction::Asc`].
    pub fn parse_lenient(s: &str) -> Self {
        if s.eq_ignore_ascii_case("desc") {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Specifies the ordering of query results.
///
/// Multiple fields can be chained together for secondary, tertiary, etc. sorting.
///
/// # Example
///
/// ```
/// use querytable_lib::query::OrderBy;
///
/// // Single field ordering
/// let order = OrderBy::desc("created_at");
///
/// // Multiple field ordering
/// let order = OrderBy::desc("created_at")
///     .then_asc("name");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBy {
    pub(crate) fields: Vec<(String, Direction)>,
}

impl OrderBy {
    /// Creates an empty ordering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an ascending order on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new().then(field, Direction::Asc)
    }

    /// Creates a descending order on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new().then(field, Direction::Desc)
    }

    /// Adds a further ordering on a field.
    pub fn then(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.push(field, direction);
        self
    }

    /// Adds a secondary ascending order on a field.
    pub fn then_asc(self, field: impl Into<String>) -> Self {
        self.then(field, Direction::Asc)
    }

    /// Adds a secondary descending order on a field.
    pub fn then_desc(self, field: impl Into<String>) -> Self {
        self.then(field, Direction::Desc)
    }

    pub(crate) fn push(&mut self, field: impl Into<String>, direction: Direction) {
        self.fields.push((field.into(), direction));
    }

    /// Returns the ordered fields with their directions.
    pub fn fields(&self) -> &[(String, Direction)] {
        &self.fields
    }

    /// Returns `true` if no ordering has been added.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient() {
        assert_eq!(Direction::parse_lenient("desc"), Direction::Desc);
        assert_eq!(Direction::parse_lenient("DESC"), Direction::Desc);
        assert_eq!(Direction::parse_lenient("asc"), Direction::Asc);
        assert_eq!(Direction::parse_lenient(""), Direction::Asc);
        assert_eq!(Direction::parse_lenient("sideways"), Direction::Asc);
    }

    #[test]
    fn test_chained_order() {
        let order = OrderBy::desc("created_at").then_asc("name");
        assert_eq!(
            order.fields(),
            &[
                ("created_at".to_string(), Direction::Desc),
                ("name".to_string(), Direction::Asc),
            ]
        );
    }

    #[test]
    fn test_direction_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Direction::Desc).unwrap(), "\"desc\"");
    }
}
