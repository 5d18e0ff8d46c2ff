//! SQLite-backed query source.

use std::path::Path;

use log::debug;
use rusqlite::Connection;
use rusqlite::ToSql;
use rusqlite::params_from_iter;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;

use super::QuerySource;
use super::sql::quote_identifier;
use super::sql::render_order;
use super::sql::render_where;
use crate::error::Error;
use crate::model::DATETIME_TEXT;
use crate::model::Record;
use crate::model::Value;
use crate::query::Page;
use crate::query::Query;

/// A query source reading one SQLite table.
///
/// Each page costs two statements: a `COUNT(*)` over the filtered table and a
/// `SELECT *` with `LIMIT`/`OFFSET`. Rows come back as [`Record`]s keyed by
/// column name.
///
/// # Example
///
/// ```
/// use querytable_lib::query::Query;
/// use querytable_lib::source::{QuerySource, SqliteSource};
///
/// let source = SqliteSource::open_in_memory("users").unwrap();
/// source
///     .connection()
///     .execute_batch("CREATE TABLE users (id INTEGER, name TEXT);
///                     INSERT INTO users VALUES (1, 'Ann');")
///     .unwrap();
///
/// let page = source.paginate(&Query::new(), 15, 1).unwrap();
/// assert_eq!(page.total(), 1);
/// ```
pub struct SqliteSource {
    conn: Connection,
    table: String,
}

impl SqliteSource {
    /// Opens the database at `path` and reads from `table`.
    pub fn open(path: impl AsRef<Path>, table: impl Into<String>) -> Result<Self, Error> {
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn, table))
    }

    /// Opens an in-memory database. Useful for testing.
    pub fn open_in_memory(table: impl Into<String>) -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn, table))
    }

    /// Wraps an existing connection.
    pub fn from_connection(conn: Connection, table: impl Into<String>) -> Self {
        Self {
            conn,
            table: table.into(),
        }
    }

    /// Returns the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns the table name.
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl QuerySource for SqliteSource {
    fn paginate(&self, query: &Query, per_page: usize, page: usize) -> Result<Page, Error> {
        let per_page = per_page.max(1);
        let page = page.max(1);

        let mut params = Vec::new();
        let mut from = format!("FROM {}", quote_identifier(&self.table));
        if let Some(condition) = render_where(query, &mut params) {
            from.push_str(" WHERE ");
            from.push_str(&condition);
        }

        let count_sql = format!("SELECT COUNT(*) {}", from);
        debug!("sqlite source: {}", count_sql);
        let total: i64 = self
            .conn
            .query_row(&count_sql, params_from_iter(params.iter()), |row| row.get(0))?;

        let mut select_sql = format!("SELECT * {}", from);
        if let Some(order) = render_order(query.order()) {
            select_sql.push_str(" ORDER BY ");
            select_sql.push_str(&order);
        }
        select_sql.push_str(" LIMIT ? OFFSET ?");
        params.push(Value::Int(to_i64(per_page)));
        params.push(Value::Int(to_i64((page - 1).saturating_mul(per_page))));
        debug!("sqlite source: {}", select_sql);

        let mut stmt = self.conn.prepare(&select_sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let records: Vec<Record> = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                let mut record = Record::new();
                for (index, name) in names.iter().enumerate() {
                    record.insert(name.as_str(), from_sql(row.get_ref(index)?));
                }
                Ok(record)
            })?
            .collect::<rusqlite::Result<_>>()?;

        Ok(Page::new(
            records,
            per_page,
            page,
            usize::try_from(total).unwrap_or(0),
        ))
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Int(n),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Bool(b) => ToSqlOutput::Borrowed(ValueRef::Integer(i64::from(*b))),
            Value::Int(n) => ToSqlOutput::Borrowed(ValueRef::Integer(*n)),
            Value::Float(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Value::String(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::DateTime(dt) => {
                ToSqlOutput::Owned(rusqlite::types::Value::Text(dt.format(DATETIME_TEXT).to_string()))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Direction;
    use crate::query::Filter;

    fn source() -> SqliteSource {
        let source = SqliteSource::open_in_memory("people").unwrap();
        source
            .connection()
            .execute_batch(
                "CREATE TABLE people (id INTEGER, name TEXT, score REAL, joined TEXT);
                 INSERT INTO people VALUES (1, 'Ann', 9.5, '2024-01-02 10:00:00');
                 INSERT INTO people VALUES (2, 'Bob', NULL, '2024-02-03 11:30:00');
                 INSERT INTO people VALUES (3, 'Joanne', 7.0, NULL);
                 INSERT INTO people VALUES (4, '50% Carl', 8.0, NULL);",
            )
            .unwrap();
        source
    }

    fn ids(page: &Page) -> Vec<i64> {
        page.records()
            .iter()
            .map(|r| r.get_int("id").unwrap().unwrap())
            .collect()
    }

    #[test]
    fn test_rows_map_to_records() {
        let mut query = Query::new();
        query.filter(Filter::eq("id", 1i64));
        let page = source().paginate(&query, 15, 1).unwrap();
        let record = &page.records()[0];
        assert_eq!(record.get_string("name").unwrap(), Some("Ann"));
        assert_eq!(record.get_float("score").unwrap(), Some(9.5));
        assert_eq!(record.get_string("joined").unwrap(), Some("2024-01-02 10:00:00"));
    }

    #[test]
    fn test_like_is_case_insensitive_and_literal() {
        let mut query = Query::new();
        query.where_like("name", "ANN");
        assert_eq!(ids(&source().paginate(&query, 15, 1).unwrap()), [1, 3]);

        let mut query = Query::new();
        query.where_like("name", "0%");
        assert_eq!(ids(&source().paginate(&query, 15, 1).unwrap()), [4]);
    }

    #[test]
    fn test_comparisons_and_affixes_match_memory_semantics() {
        let matching = |filter: Filter| {
            let mut query = Query::new();
            query.filter(filter).order_by("id", Direction::Asc);
            ids(&source().paginate(&query, 15, 1).unwrap())
        };
        assert_eq!(matching(Filter::gt("score", 8.0)), [1]);
        assert_eq!(matching(Filter::ge("score", 8i64)), [1, 4]);
        assert_eq!(matching(Filter::lt("score", 9.5)), [3, 4]);
        assert_eq!(matching(Filter::le("score", 9.5)), [1, 3, 4]);
        assert_eq!(matching(Filter::is_not_null("joined")), [1, 2]);
        assert_eq!(matching(Filter::starts_with("name", "jo")), [3]);
        assert_eq!(matching(Filter::ends_with("name", "CARL")), [4]);
    }

    #[test]
    fn test_order_and_limit() {
        let mut query = Query::new();
        query.order_by("id", Direction::Desc);
        let page = source().paginate(&query, 2, 2).unwrap();
        assert_eq!(ids(&page), [2, 1]);
        assert_eq!(page.total(), 4);
        assert_eq!(page.last_page(), 2);
        assert_eq!(page.from(), Some(3));
        assert_eq!(page.to(), Some(4));
    }

    #[test]
    fn test_missing_table_is_an_error() {
        let source = SqliteSource::open_in_memory("nope").unwrap();
        let err = source.paginate(&Query::new(), 15, 1).unwrap_err();
        assert!(matches!(err, Error::Sqlite(_)));
    }
}
