//! Search query construction against the document index.
//!
//! Raw request options are parsed once into a typed [`SearchOptions`]
//! value, then compiled by [`QueryBuilder`] into a single composite query
//! document: full-text must clauses, AND-combined filters
//! ([`FilterBuilder`]), OR-semantics should groups, and the selected facet
//! catalog ([`AggregationsBuilder`]).

mod aggregations;
pub(crate) mod client;
mod cursor;
mod filters;
mod options;
mod query;
pub(crate) mod response;

pub use aggregations::{AggregationsBuilder, aggregation_definitions, all_aggregation_keys};
pub use client::SearchClient;
pub use cursor::Cursor;
pub use filters::FilterBuilder;
pub use options::{Page, SearchOptions};
pub use query::QueryBuilder;
pub use response::{SearchHit, SearchResponse, TermsBucket};
