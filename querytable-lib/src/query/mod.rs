//! Recording query builder.
//!
//! A [`Query`] accumulates the predicates and orderings a table composes from
//! its columns and the inbound request. It does not run anything; a
//! [`QuerySource`](crate::source::QuerySource) executes it and returns a
//! [`Page`].
//!
//! # Shared Types
//!
//! - [`Filter`] - Column-scoped filter conditions
//! - [`OrderBy`] - Ordering specification for query results
//! - [`Page`] - A page of query results with pagination info

mod builder;
mod filter;
mod order;
mod page;

pub use builder::OrGroup;
pub use builder::Query;
pub use filter::Filter;
pub use order::Direction;
pub use order::OrderBy;
pub use page::Page;
