//! Table composition pipeline
//!
//! A [`Table`] binds a [`QuerySource`] and a [`Request`] to a set of declared
//! columns. Building it runs one fixed pass:
//!
//! 1. per-column filters from `filter[key]` (searchable columns without a
//!    custom search)
//! 2. visible/hidden overrides
//! 3. the global search as one OR group over every searchable column
//! 4. requested sort, then default sort for keys the request left out
//! 5. column descriptors snapshot
//! 6. pagination, row projection and formatting
//!
//! Steps 1-5 are [`Table::apply`]; step 6 is [`Prepared::paginate`].
//! Both consume their receiver, so a table is built at most once.

mod payload;

pub use payload::*;

use indexmap::IndexMap;
use log::debug;
use log::trace;

use crate::column::Column;
use crate::column::ColumnDescriptor;
use crate::column::ColumnMut;
use crate::config::TableConfig;
use crate::error::ConfigError;
use crate::error::Error;
use crate::format::Format;
use crate::query::Direction;
use crate::query::Query;
use crate::request::Request;
use crate::source::QuerySource;

/// A server-side list view over one query source.
///
/// # Example
///
/// ```
/// use querytable_lib::model::{Record, Value};
/// use querytable_lib::request::Request;
/// use querytable_lib::source::MemorySource;
/// use querytable_lib::table::Table;
///
/// let source = MemorySource::new(vec![
///     Record::new().set("id", 1i64).set("name", "ann lee"),
///     Record::new().set("id", 2i64).set("name", "bob stone"),
/// ]);
/// let request = Request::from_query_str("q=ann&sort=id:desc");
///
/// let mut table = Table::new(source, request);
/// table.column("id").sortable(true).hide(true);
/// table.column("name").searchable(true).format("titlecase");
///
/// let payload = table.build().unwrap();
/// assert_eq!(payload.rows.len(), 1);
/// assert_eq!(payload.rows[0]["name"], Value::from("Ann Lee"));
/// assert!(!payload.rows[0].contains_key("id"));
/// ```
pub struct Table<S> {
    source: S,
    request: Request,
    query: Query,
    columns: IndexMap<String, Column>,
    visible_columns: Vec<String>,
    hidden_columns: Vec<String>,
    default_sort: IndexMap<String, Direction>,
    per_page: usize,
}

impl<S> Table<S> {
    /// Creates a table with the default configuration.
    pub fn new(source: S, request: Request) -> Self {
        Self::with_config(source, request, &TableConfig::default())
    }

    /// Creates a table with the given configuration.
    pub fn with_config(source: S, request: Request, config: &TableConfig) -> Self {
        Self {
            source,
            request,
            query: Query::new(),
            columns: IndexMap::new(),
            visible_columns: Vec::new(),
            hidden_columns: Vec::new(),
            default_sort: IndexMap::new(),
            per_page: config.per_page.max(1),
        }
    }

    /// Adds base conditions to the query, e.g. tenant scoping.
    pub fn with_query<F>(&mut self, scope: F) -> &mut Self
    where
        F: FnOnce(&mut Query),
    {
        scope(&mut self.query);
        self
    }

    // =========================================================================
    // Column declarations
    // =========================================================================

    /// Declares a column with a display label derived from its key.
    ///
    /// Declaring a key again replaces the earlier column in place.
    pub fn column(&mut self, key: impl Into<String>) -> ColumnMut<'_> {
        self.declare(key.into(), None)
    }

    /// Declares a column with an explicit display label.
    pub fn column_as(&mut self, key: impl Into<String>, display: impl Into<String>) -> ColumnMut<'_> {
        self.declare(key.into(), Some(display.into()))
    }

    fn declare(&mut self, key: String, display: Option<String>) -> ColumnMut<'_> {
        let column = Column::new(key.clone(), display);
        let (index, _) = self.columns.insert_full(key, column);
        ColumnMut::new(&mut self.columns[index], &mut self.query)
    }

    /// Declares (or reuses) a column and sets `format` as its only format step.
    ///
    /// `display` is used only when the column is new.
    pub fn format_column(
        &mut self,
        format: Format,
        key: impl Into<String>,
        display: Option<&str>,
    ) -> ColumnMut<'_> {
        let key = key.into();
        let index = match self.columns.get_index_of(&key) {
            Some(index) => index,
            None => {
                let column = Column::new(key.clone(), display.map(str::to_string));
                self.columns.insert_full(key, column).0
            }
        };
        ColumnMut::new(&mut self.columns[index], &mut self.query).format(format)
    }

    /// Format shorthand dispatched by name: `call("date", &["created_at"])`.
    ///
    /// `name` must be a format identifier and `args` must be `[key]` or
    /// `[key, display]`.
    pub fn call(&mut self, name: &str, args: &[&str]) -> Result<ColumnMut<'_>, Error> {
        let format = Format::from_id(name).ok_or_else(|| ConfigError::unknown_operation(name))?;
        match *args {
            [key] => Ok(self.format_column(format, key, None)),
            [key, display] => Ok(self.format_column(format, key, Some(display))),
            _ => Err(ConfigError::argument_count(name, args.len()).into()),
        }
    }

    // =========================================================================
    // Table configuration
    // =========================================================================

    /// Columns to force visible. Cannot be combined with [`Table::hide_columns`].
    pub fn visible_columns<I>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.visible_columns = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Columns to force hidden. Cannot be combined with [`Table::visible_columns`].
    pub fn hide_columns<I>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.hidden_columns = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Adds default orderings written as `key` or `key:direction`.
    ///
    /// The direction reads like a request sort segment.
    pub fn default_sort<I>(&mut self, specs: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for spec in specs {
            let spec = spec.as_ref();
            let (key, direction) = match spec.split_once(':') {
                Some((key, direction)) => (key, Direction::parse_lenient(direction)),
                None => (spec, Direction::Asc),
            };
            if !key.is_empty() {
                self.default_sort.insert(key.to_string(), direction);
            }
        }
        self
    }

    /// Adds one default ordering.
    pub fn default_sort_by(&mut self, key: impl Into<String>, direction: Direction) -> &mut Self {
        self.default_sort.insert(key.into(), direction);
        self
    }

    /// Sets the page size used when the request carries no limit.
    pub fn per_page(&mut self, per_page: usize) -> &mut Self {
        self.per_page = per_page.max(1);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the declared columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Returns the column with the given key.
    pub fn get_column(&self, key: &str) -> Option<&Column> {
        self.columns.get(key)
    }

    /// Returns the query as composed so far.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Returns the bound request.
    pub fn request(&self) -> &Request {
        &self.request
    }

    // =========================================================================
    // Apply
    // =========================================================================

    /// Composes filters, visibility and ordering into the query.
    pub fn apply(mut self) -> Result<Prepared<S>, Error> {
        self.apply_column_filters();
        self.apply_visibility()?;
        self.apply_search();
        self.apply_sort();
        let descriptors = self.columns.values().map(Column::describe).collect();
        Ok(Prepared {
            table: self,
            descriptors,
        })
    }

    fn apply_column_filters(&mut self) {
        for column in self.columns.values() {
            column.apply_default_search(&self.request, &mut self.query);
        }
    }

    fn apply_visibility(&mut self) -> Result<(), ConfigError> {
        if !self.visible_columns.is_empty() && !self.hidden_columns.is_empty() {
            return Err(ConfigError::ConflictingVisibility);
        }
        let overrides = self
            .visible_columns
            .iter()
            .map(|key| (key, false))
            .chain(self.hidden_columns.iter().map(|key| (key, true)));
        for (key, hidden) in overrides {
            match self.columns.get_mut(key) {
                Some(column) => column.set_hidden(hidden),
                None => trace!("table: visibility override for unknown column {}", key),
            }
        }
        Ok(())
    }

    fn apply_search(&mut self) {
        let Some(term) = self.request.search() else {
            return;
        };
        let searchable: Vec<&str> = self
            .columns
            .values()
            .filter(|column| column.is_searchable())
            .map(Column::key)
            .collect();
        if searchable.is_empty() {
            debug!("table: search {:?} ignored, no searchable columns", term);
            return;
        }
        self.query.or_where_group(|group| {
            for key in &searchable {
                group.or_where_like(*key, term);
            }
        });
    }

    fn apply_sort(&mut self) {
        let requested = self.request.sort();
        let sorts = requested.iter().chain(
            self.default_sort
                .iter()
                .filter(|(key, _)| !requested.contains_key(*key)),
        );
        for (key, direction) in sorts {
            match self.columns.get(key) {
                Some(column) if column.is_sortable() => {
                    self.query.order_by(key.as_str(), *direction);
                }
                Some(_) => trace!("table: column {} is not sortable", key),
                None => trace!("table: sort on unknown column {}", key),
            }
        }
    }
}

impl<S: QuerySource> Table<S> {
    /// Applies the table and renders one page.
    pub fn build(self) -> Result<Payload, Error> {
        self.apply()?.paginate()
    }
}

/// A table whose query has been fully composed.
pub struct Prepared<S> {
    table: Table<S>,
    descriptors: Vec<ColumnDescriptor>,
}

impl<S> Prepared<S> {
    /// Returns the composed query.
    pub fn query(&self) -> &Query {
        &self.table.query
    }

    /// Returns the column descriptors, in declaration order.
    pub fn descriptors(&self) -> &[ColumnDescriptor] {
        &self.descriptors
    }

    /// Page size for this build: the request limit, else the table default.
    pub fn page_size(&self) -> usize {
        self.table.request.limit().unwrap_or(self.table.per_page)
    }

    /// Page number for this build: the request page, else 1.
    pub fn page_number(&self) -> usize {
        self.table.request.page().unwrap_or(1)
    }
}

impl<S: QuerySource> Prepared<S> {
    /// Executes the query and renders the payload.
    pub fn paginate(self) -> Result<Payload, Error> {
        let per_page = self.page_size();
        let page = self
            .table
            .source
            .paginate(&self.table.query, per_page, self.page_number())?;

        let visible: Vec<&Column> = self
            .table
            .columns
            .values()
            .filter(|column| !column.is_hidden())
            .collect();

        let rows = page
            .records()
            .iter()
            .map(|record| {
                record
                    .project(visible.iter().map(|column| column.key()))
                    .into_iter()
                    .zip(&visible)
                    .map(|((key, raw), column)| {
                        column.render_value(record, raw).map(|value| (key, value))
                    })
                    .collect::<Result<IndexMap<_, _>, Error>>()
            })
            .collect::<Result<Vec<_>, Error>>()?;

        debug!(
            "table: rendered {} rows, page {} of {}",
            rows.len(),
            page.current_page(),
            page.last_page()
        );

        Ok(Payload {
            meta: Meta {
                per_page: page.per_page(),
                current_page: page.current_page(),
                last_page: page.last_page(),
                from: page.from(),
                to: page.to(),
                sort: self.table.request.sort(),
                q: self.table.request.search().map(str::to_string),
            },
            columns: self.descriptors,
            rows,
        })
    }
}
