//! Page type for paginated query results.

use crate::model::Record;

/// One page of query results with length-aware pagination info.
///
/// # Example
///
/// ```
/// use querytable_lib::model::Record;
/// use querytable_lib::query::Page;
///
/// let records = vec![Record::new().set("id", 16i64), Record::new().set("id", 17i64)];
/// let page = Page::new(records, 15, 2, 17);
///
/// assert_eq!(page.last_page(), 2);
/// assert_eq!(page.from(), Some(16));
/// assert_eq!(page.to(), Some(17));
/// ```
#[derive(Debug, Clone)]
pub struct Page {
    records: Vec<Record>,
    per_page: usize,
    current_page: usize,
    /// Number of rows matching the query across all pages.
    total: usize,
}

impl Page {
    /// Creates a page. `per_page` and `current_page` are clamped to at least 1.
    pub fn new(records: Vec<Record>, per_page: usize, current_page: usize, total: usize) -> Self {
        Self {
            records,
            per_page: per_page.max(1),
            current_page: current_page.max(1),
            total,
        }
    }

    /// Returns a reference to the records in this page.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the page and returns the records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of the last page; 1 when nothing matched.
    pub fn last_page(&self) -> usize {
        self.total.div_ceil(self.per_page).max(1)
    }

    /// 1-based index of the first row on this page, `None` if the page is empty.
    pub fn from(&self) -> Option<usize> {
        if self.records.is_empty() {
            None
        } else {
            Some((self.current_page - 1) * self.per_page + 1)
        }
    }

    /// 1-based index of the last row on this page, `None` if the page is empty.
    pub fn to(&self) -> Option<usize> {
        self.from().map(|from| from + self.records.len() - 1)
    }

    /// Returns `true` if this page has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of records in this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are more pages after this one.
    pub fn has_more(&self) -> bool {
        self.current_page < self.last_page()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<Record> {
        (0..n).map(|i| Record::new().set("id", i as i64)).collect()
    }

    #[test]
    fn test_empty_result() {
        let page = Page::new(Vec::new(), 15, 1, 0);
        assert_eq!(page.last_page(), 1);
        assert_eq!(page.from(), None);
        assert_eq!(page.to(), None);
        assert!(!page.has_more());
    }

    #[test]
    fn test_first_page() {
        let page = Page::new(records(15), 15, 1, 40);
        assert_eq!(page.last_page(), 3);
        assert_eq!(page.from(), Some(1));
        assert_eq!(page.to(), Some(15));
        assert!(page.has_more());
    }

    #[test]
    fn test_past_last_page() {
        let page = Page::new(Vec::new(), 10, 9, 25);
        assert_eq!(page.last_page(), 3);
        assert_eq!(page.current_page(), 9);
        assert_eq!(page.from(), None);
    }
}
