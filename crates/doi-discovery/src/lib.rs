//! Query construction and event aggregation core for a DOI discovery API.
//!
//! This crate compiles client-facing filter parameters into faceted
//! full-text search queries against a document index, pages through deep
//! result sets with opaque cursors, and computes citation, view, and
//! download counts from a pre-aggregated event store.
//!
//! # Components
//!
//! - **Query building**: [`search::QueryBuilder`] composes full-text match
//!   clauses, filters ([`search::FilterBuilder`]), OR-semantics should
//!   groups, and a fixed facet catalog ([`search::AggregationsBuilder`])
//!   into one composite query document.
//! - **Events**: [`events::EventsQuery`] queries the event store in both
//!   citation directions and merges bucketed counts into per-DOI metric
//!   rows, zero-filled for every requested identifier.
//! - **Pagination**: [`connection::Connection`] wraps a result page with
//!   forward-only cursor semantics for a graph-style API layer.
//!
//! # Example
//!
//! ```no_run
//! use doi_discovery::config::Config;
//! use doi_discovery::search::{QueryBuilder, SearchClient, SearchOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let client = SearchClient::new(&config)?;
//!
//!     let mut options = SearchOptions::default();
//!     options.resource_type = Some("Dataset,Software".into());
//!     let query = QueryBuilder::new(Some("climate"), &options).build_full_search_query();
//!     let page = client.search::<serde_json::Value>(&query).await?;
//!     println!("{} results", page.total());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod facets;
pub mod identifiers;
pub mod search;
pub(crate) mod strings;

pub use config::Config;
pub use connection::{Connection, ConnectionArgs};
pub use error::{ClientError, PaginationError};
pub use events::EventsQuery;
pub use search::{AggregationsBuilder, Cursor, FilterBuilder, QueryBuilder, SearchOptions};
