//! Configuration for the discovery query core.

use std::time::Duration;

/// Store endpoint and client constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the document index (search engine).
    pub const SEARCH_URL: &str = "http://elasticsearch:9200/dois";

    /// Base URL for the event store.
    pub const EVENTS_URL: &str = "http://elasticsearch:9200/events";

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Cache TTL (5 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum cache size.
    pub const CACHE_MAX_SIZE: u64 = 1000;

    /// Keepalive connections per host.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Query construction constants.
pub mod query {
    /// Page size when the caller does not supply one. Zero is valid for
    /// aggregation-only queries.
    pub const DEFAULT_PAGE_SIZE: i64 = 0;

    /// Largest page size any caller may request.
    pub const MAX_PAGE_SIZE: i64 = 10_000;

    /// Default bucket size for terms facets.
    pub const DEFAULT_FACET_COUNT: i64 = 10;

    /// Default page cap for cursor connections.
    pub const DEFAULT_MAX_CONNECTION_PAGE_SIZE: i64 = 1_000;

    /// Full-text query fields with boosts. The identifier field dominates
    /// so that exact DOI lookups rank first.
    pub const QUERY_FIELDS: &[&str] = &[
        "uid^50",
        "related_identifiers.relatedIdentifier^3",
        "titles.title^3",
        "creator_names^3",
        "creators.id^3",
        "publisher^3",
        "descriptions.description^3",
        "subjects.subject^3",
    ];

    /// camelCase API field names rewritten to the index's underscore names
    /// before a free-text query is embedded in a query_string clause.
    pub const QUERY_SUBSTITUTIONS: &[(&str, &str)] = &[
        ("publicationYear", "publication_year"),
        ("relatedIdentifiers", "related_identifiers"),
        ("relatedItems", "related_items"),
        ("rightsList", "rights_list"),
        ("fundingReferences", "funding_references"),
        ("geoLocations", "geo_locations"),
        ("version:", "version_info:"),
        ("landingPage", "landing_page"),
        ("contentUrl", "content_url"),
        ("citationCount", "citation_count"),
        ("viewCount", "view_count"),
        ("downloadCount", "download_count"),
    ];
}

/// Relation-type vocabularies for the event store.
pub mod relations {
    /// Relation types where the identifier is the object of the citation
    /// (something else cites it).
    pub const ACTIVE_RELATION_TYPES: &[&str] = &["cites", "is-supplement-to", "references"];

    /// Relation types where the identifier is the subject of the citation
    /// (it is being cited).
    pub const PASSIVE_RELATION_TYPES: &[&str] =
        &["is-cited-by", "is-supplemented-by", "is-referenced-by"];

    /// COUNTER relation type counted as views.
    pub const VIEWS_RELATION_TYPE: &str = "unique-dataset-investigations-regular";

    /// COUNTER relation type counted as downloads.
    pub const DOWNLOADS_RELATION_TYPE: &str = "unique-dataset-requests-regular";
}

/// Store configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Document index base URL.
    pub search_url: String,

    /// Event store base URL.
    pub events_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Cache TTL.
    pub cache_ttl: Duration,

    /// Maximum cache size.
    pub cache_max_size: u64,
}

impl Config {
    /// Create a configuration pointing at the given store URLs.
    #[must_use]
    pub fn new(search_url: impl Into<String>, events_url: impl Into<String>) -> Self {
        Self {
            search_url: search_url.into(),
            events_url: events_url.into(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
        }
    }

    /// Create configuration from `SEARCH_URL` / `EVENTS_URL` environment
    /// variables, falling back to the compiled-in defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let search_url =
            std::env::var("SEARCH_URL").unwrap_or_else(|_| api::SEARCH_URL.to_string());
        let events_url =
            std::env::var("EVENTS_URL").unwrap_or_else(|_| api::EVENTS_URL.to_string());
        Self::new(search_url, events_url)
    }

    /// Create a test configuration with both stores pointed at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            search_url: format!("{}/dois", base_url),
            events_url: format!("{}/events", base_url),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            cache_ttl: Duration::from_secs(0), // No caching in tests
            cache_max_size: 0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(api::SEARCH_URL, api::EVENTS_URL)
    }
}
