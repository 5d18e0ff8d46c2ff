//! In-memory query source

use std::cmp::Ordering;

use log::debug;

use super::QuerySource;
use crate::error::Error;
use crate::model::Record;
use crate::model::Value;
use crate::query::Direction;
use crate::query::Filter;
use crate::query::Page;
use crate::query::Query;

/// A query source backed by a vector of records.
///
/// Text predicates match case-insensitively on the cell's text. Comparisons
/// never match a null cell. Sorting is stable, so rows that tie on every
/// ordering keep their original order.
///
/// # Example
///
/// ```
/// use querytable_lib::model::Record;
/// use querytable_lib::source::MemorySource;
///
/// let source = MemorySource::new(vec![
///     Record::new().set("name", "Ann"),
///     Record::new().set("name", "Bob"),
/// ]);
/// assert_eq!(source.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<Record>,
}

impl MemorySource {
    /// Creates a source over the given records.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Appends a record.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Returns the number of records (before filtering).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the source holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<Record> for MemorySource {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl QuerySource for MemorySource {
    fn paginate(&self, query: &Query, per_page: usize, page: usize) -> Result<Page, Error> {
        let per_page = per_page.max(1);
        let page = page.max(1);

        let mut matched: Vec<&Record> = self
            .records
            .iter()
            .filter(|record| query.filters().iter().all(|f| eval(f, record)))
            .collect();

        let order = query.order().fields();
        if !order.is_empty() {
            matched.sort_by(|a, b| {
                order
                    .iter()
                    .map(|(field, direction)| {
                        let left = cell(a, field);
                        let right = cell(b, field);
                        match direction {
                            Direction::Asc => left.compare(right),
                            Direction::Desc => right.compare(left),
                        }
                    })
                    .find(|ordering| *ordering != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let total = matched.len();
        let records: Vec<Record> = matched
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .cloned()
            .collect();

        debug!(
            "memory source: {} of {} records matched, page {} holds {}",
            total,
            self.records.len(),
            page,
            records.len()
        );

        Ok(Page::new(records, per_page, page, total))
    }
}

/// Evaluates one filter against a record.
fn eval(filter: &Filter, record: &Record) -> bool {
    let at = |field: &str| cell(record, field);

    match filter {
        Filter::Eq(field, value) => compare(at(field), value) == Some(Ordering::Equal),
        Filter::Ne(field, value) => matches!(compare(at(field), value), Some(o) if o != Ordering::Equal),
        Filter::Gt(field, value) => compare(at(field), value) == Some(Ordering::Greater),
        Filter::Ge(field, value) => matches!(compare(at(field), value), Some(Ordering::Greater | Ordering::Equal)),
        Filter::Lt(field, value) => compare(at(field), value) == Some(Ordering::Less),
        Filter::Le(field, value) => matches!(compare(at(field), value), Some(Ordering::Less | Ordering::Equal)),
        Filter::Contains(field, needle) => text_test(at(field), needle, |h, n| h.contains(n)),
        Filter::StartsWith(field, needle) => text_test(at(field), needle, |h, n| h.starts_with(n)),
        Filter::EndsWith(field, needle) => text_test(at(field), needle, |h, n| h.ends_with(n)),
        Filter::IsNull(field) => at(field).is_null(),
        Filter::IsNotNull(field) => !at(field).is_null(),
        Filter::And(filters) => filters.iter().all(|f| eval(f, record)),
        Filter::Or(filters) => filters.is_empty() || filters.iter().any(|f| eval(f, record)),
    }
}

fn cell<'r>(record: &'r Record, field: &str) -> &'r Value {
    const NULL: &Value = &Value::Null;
    record.get(field).unwrap_or(NULL)
}

/// Compares a cell against a filter operand. Null on either side is unknown.
fn compare(cell: &Value, operand: &Value) -> Option<Ordering> {
    if cell.is_null() || operand.is_null() {
        return None;
    }
    Some(cell.compare(operand))
}

fn text_test(cell: &Value, needle: &str, test: impl Fn(&str, &str) -> bool) -> bool {
    if cell.is_null() {
        return false;
    }
    test(&cell.to_text().to_lowercase(), &needle.to_lowercase())
}
