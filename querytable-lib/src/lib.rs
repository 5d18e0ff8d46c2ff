//! Server-side list views
//!
//! Declare the columns of a list view once, then turn each inbound request
//! (per-column filters, a search term, a sort spec, a page size) into a
//! composed query and a paginated, display-ready payload.
//!
//! ```
//! use querytable_lib::model::{Record, Value};
//! use querytable_lib::request::Request;
//! use querytable_lib::source::MemorySource;
//! use querytable_lib::table::Table;
//!
//! let source = MemorySource::new(vec![
//!     Record::new().set("id", 1i64).set("created_at", "2024-05-01 09:30:00"),
//! ]);
//!
//! let mut table = Table::new(source, Request::from_query_str("limit=10"));
//! table.column("id").sortable(true);
//! table.call("date", &["created_at", "Created"]).unwrap();
//!
//! let payload = table.build().unwrap();
//! assert_eq!(payload.meta.per_page, 10);
//! assert_eq!(payload.rows[0]["created_at"], Value::from("01/05/2024"));
//! ```

pub mod column;
pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod query;
pub mod request;
pub mod source;
pub mod table;

pub use error::Error;
pub use error::Result;
