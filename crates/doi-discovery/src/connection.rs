//! Forward-only cursor pagination over a search result page.
//!
//! The index pages with `search_after`, which can only walk forward, so
//! the connection exposes the forward half of the usual graph connection
//! surface and fails loudly on the backward half. Silently returning
//! wrong page info would corrupt client-side infinite-scroll state.

use serde_json::Value;

use crate::config::query::DEFAULT_MAX_CONNECTION_PAGE_SIZE;
use crate::error::PaginationError;
use crate::search::{Cursor, SearchHit, SearchResponse};

/// Pagination arguments as received from the API layer.
#[derive(Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Requested page size. Clamped into `[0, max_page_size]`; absent
    /// means a full `max_page_size` page.
    pub first: Option<i64>,

    /// Opaque cursor after which to resume. The empty string means the
    /// same as absent.
    pub after: Option<String>,
}

impl ConnectionArgs {
    /// The resume cursor, if one was meaningfully supplied.
    #[must_use]
    pub fn after(&self) -> Option<&str> {
        self.after.as_deref().filter(|token| !token.is_empty())
    }

    /// The effective page size for a given cap.
    #[must_use]
    pub fn page_size(&self, max_page_size: i64) -> i64 {
        self.first.unwrap_or(max_page_size).clamp(0, max_page_size)
    }
}

/// One page of results plus the page info a graph-style API layer needs.
#[derive(Debug, Clone)]
pub struct Connection<T> {
    nodes: Vec<SearchHit<T>>,
    total_count: i64,
    aggregations: Option<Value>,
    page_size: i64,
}

impl<T> Connection<T> {
    /// Wrap a search response with the default page-size cap.
    #[must_use]
    pub fn new(response: SearchResponse<T>, args: &ConnectionArgs) -> Self {
        Self::with_max_page_size(response, args, DEFAULT_MAX_CONNECTION_PAGE_SIZE)
    }

    /// Wrap a search response with an explicit page-size cap.
    #[must_use]
    pub fn with_max_page_size(
        response: SearchResponse<T>,
        args: &ConnectionArgs,
        max_page_size: i64,
    ) -> Self {
        Self {
            total_count: response.total(),
            nodes: response.hits.hits,
            aggregations: response.aggregations,
            page_size: args.page_size(max_page_size),
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[SearchHit<T>] {
        &self.nodes
    }

    #[must_use]
    pub fn total_count(&self) -> i64 {
        self.total_count
    }

    /// Raw aggregation bucket trees, for facet shaping.
    #[must_use]
    pub fn aggregations(&self) -> Option<&Value> {
        self.aggregations.as_ref()
    }

    /// The clamped page size this page was built for.
    #[must_use]
    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Whether a further page exists.
    ///
    /// True only when this page came back full and more results remain.
    /// A partial page always reports `false`, even when `total_count`
    /// suggests otherwise; the total is approximate for capped counts
    /// and a false positive would send clients chasing empty pages.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        let returned = self.nodes.len() as i64;
        returned == self.page_size && returned < self.total_count
    }

    /// Cursor of the first node on this page.
    #[must_use]
    pub fn start_cursor(&self) -> Option<String> {
        self.nodes.first().map(|hit| hit.cursor().encode())
    }

    /// Cursor of the last node on this page, to resume from.
    #[must_use]
    pub fn end_cursor(&self) -> Option<String> {
        self.nodes.last().map(|hit| hit.cursor().encode())
    }

    /// Backward pagination is unsupported by the underlying index walk.
    ///
    /// # Errors
    ///
    /// Always returns [`PaginationError::NotImplemented`].
    pub fn has_previous_page(&self) -> Result<bool, PaginationError> {
        Err(PaginationError::NotImplemented("has_previous_page"))
    }

    /// Backward pagination is unsupported by the underlying index walk.
    ///
    /// # Errors
    ///
    /// Always returns [`PaginationError::NotImplemented`].
    pub fn last(&self, _last: i64) -> Result<Vec<SearchHit<T>>, PaginationError> {
        Err(PaginationError::NotImplemented("last"))
    }

    /// Backward pagination is unsupported by the underlying index walk.
    ///
    /// # Errors
    ///
    /// Always returns [`PaginationError::NotImplemented`].
    pub fn before(&self, _before: &str) -> Result<Vec<SearchHit<T>>, PaginationError> {
        Err(PaginationError::NotImplemented("before"))
    }

    /// The resume cursor decoded from the API arguments.
    #[must_use]
    pub fn cursor_from_args(args: &ConnectionArgs) -> Cursor {
        args.after().map(Cursor::decode).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn response(total: i64, count: usize) -> SearchResponse<Value> {
        let hits: Vec<Value> = (0..count)
            .map(|i| json!({ "_source": { "uid": format!("10.1/{i}") }, "sort": [i, format!("10.1/{i}")] }))
            .collect();
        serde_json::from_value(json!({
            "hits": { "total": { "value": total }, "hits": hits }
        }))
        .unwrap()
    }

    #[test]
    fn test_partial_page_has_no_next_page() {
        let args = ConnectionArgs { first: Some(25), after: None };
        let connection = Connection::new(response(1000, 10), &args);
        assert!(!connection.has_next_page());
    }

    #[test]
    fn test_full_page_with_more_results_has_next_page() {
        let args = ConnectionArgs { first: Some(10), after: None };
        let connection = Connection::new(response(1000, 10), &args);
        assert!(connection.has_next_page());
    }

    #[test]
    fn test_full_page_at_end_has_no_next_page() {
        let args = ConnectionArgs { first: Some(10), after: None };
        let connection = Connection::new(response(10, 10), &args);
        assert!(!connection.has_next_page());
    }

    #[test]
    fn test_first_defaults_to_and_clamps_at_max() {
        let args = ConnectionArgs::default();
        assert_eq!(args.page_size(1000), 1000);

        let args = ConnectionArgs { first: Some(5000), after: None };
        assert_eq!(args.page_size(1000), 1000);

        let args = ConnectionArgs { first: Some(-3), after: None };
        assert_eq!(args.page_size(1000), 0);
    }

    #[test]
    fn test_empty_after_means_absent() {
        let args = ConnectionArgs { first: None, after: Some(String::new()) };
        assert_eq!(args.after(), None);
        assert_eq!(Connection::<Value>::cursor_from_args(&args), Cursor::default());
    }

    #[test]
    fn test_end_cursor_round_trips() {
        let args = ConnectionArgs { first: Some(3), after: None };
        let connection = Connection::new(response(5, 3), &args);
        let token = connection.end_cursor().unwrap();
        assert_eq!(Cursor::decode(&token), Cursor::new(2, "10.1/2"));
    }

    #[test]
    fn test_backward_pagination_is_not_implemented() {
        let args = ConnectionArgs::default();
        let connection = Connection::new(response(0, 0), &args);
        assert!(matches!(
            connection.has_previous_page(),
            Err(PaginationError::NotImplemented("has_previous_page"))
        ));
        assert!(connection.last(5).is_err());
        assert!(connection.before("abc").is_err());
    }
}
