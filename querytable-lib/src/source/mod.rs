//! Query sources
//!
//! A [`QuerySource`] executes a composed [`Query`] and returns one [`Page`].
//! Two implementations ship with the crate: [`MemorySource`] over a vector
//! of records and [`SqliteSource`] over a SQLite table.

mod memory;
pub mod sql;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

use crate::error::Error;
use crate::query::Page;
use crate::query::Query;

/// Executes a composed query.
///
/// `page` is 1-based. Implementations must honor every filter and ordering in
/// the query, return at most `per_page` records, and report the total number
/// of matching rows on the returned [`Page`].
///
/// # Example
///
/// ```
/// use querytable_lib::model::Record;
/// use querytable_lib::query::Query;
/// use querytable_lib::source::{MemorySource, QuerySource};
///
/// let source = MemorySource::new(vec![Record::new().set("name", "Ann")]);
/// let page = source.paginate(&Query::new(), 15, 1).unwrap();
/// assert_eq!(page.total(), 1);
/// ```
pub trait QuerySource {
    /// Runs `query` and returns the requested page.
    fn paginate(&self, query: &Query, per_page: usize, page: usize) -> Result<Page, Error>;
}

impl<S: QuerySource + ?Sized> QuerySource for &S {
    fn paginate(&self, query: &Query, per_page: usize, page: usize) -> Result<Page, Error> {
        (**self).paginate(query, per_page, page)
    }
}

impl<S: QuerySource + ?Sized> QuerySource for Box<S> {
    fn paginate(&self, query: &Query, per_page: usize, page: usize) -> Result<Page, Error> {
        (**self).paginate(query, per_page, page)
    }
}
