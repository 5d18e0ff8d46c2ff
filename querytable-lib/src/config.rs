//! Table configuration

/// Default number of rows per page.
pub const DEFAULT_PER_PAGE: usize = 15;

/// Names of the request parameters a [`Request`](crate::request::Request) reads.
///
/// # Example
///
/// ```
/// use querytable_lib::config::RequestKeys;
///
/// let keys = RequestKeys::default().with_search("search").with_limit("per_page");
/// assert_eq!(keys.search, "search");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestKeys {
    /// Map parameter holding per-column filters, read as `filter[key]=value`.
    ///
    /// Default: `filter`
    pub filter: String,

    /// Sort specification, `col:dir,col2:dir2`.
    ///
    /// Default: `sort`
    pub sort: String,

    /// Global search term.
    ///
    /// Default: `q`
    pub search: String,

    /// Page size.
    ///
    /// Default: `limit`
    pub limit: String,

    /// 1-based page number.
    ///
    /// Default: `page`
    pub page: String,
}

impl Default for RequestKeys {
    fn default() -> Self {
        Self {
            filter: "filter".to_string(),
            sort: "sort".to_string(),
            search: "q".to_string(),
            limit: "limit".to_string(),
            page: "page".to_string(),
        }
    }
}

impl RequestKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, key: impl Into<String>) -> Self {
        self.filter = key.into();
        self
    }

    pub fn with_sort(mut self, key: impl Into<String>) -> Self {
        self.sort = key.into();
        self
    }

    pub fn with_search(mut self, key: impl Into<String>) -> Self {
        self.search = key.into();
        self
    }

    pub fn with_limit(mut self, key: impl Into<String>) -> Self {
        self.limit = key.into();
        self
    }

    pub fn with_page(mut self, key: impl Into<String>) -> Self {
        self.page = key.into();
        self
    }
}

/// Configuration shared by the tables an endpoint builds.
///
/// # Example
///
/// ```
/// use querytable_lib::config::TableConfig;
///
/// let config = TableConfig::default().with_per_page(25);
/// assert_eq!(config.per_page, 25);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Page size used when the request carries no limit.
    ///
    /// Default: 15
    pub per_page: usize,

    /// Request parameter names.
    pub request_keys: RequestKeys,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            request_keys: RequestKeys::default(),
        }
    }
}

impl TableConfig {
    /// Creates a new table config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default page size. Zero is raised to 1.
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Sets the request parameter names.
    pub fn with_request_keys(mut self, keys: RequestKeys) -> Self {
        self.request_keys = keys;
        self
    }
}
