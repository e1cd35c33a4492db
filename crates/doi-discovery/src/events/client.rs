//! Event store client.
//!
//! The event store exposes a query endpoint taking a free-text query
//! string plus filter options (`doi`, a named aggregation profile, page
//! parameters) and returning aggregation bucket trees. Retry and caching
//! follow the search client.

use std::time::Duration;

use moka::future::Cache;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde_json::{Value, json};
use tracing::debug;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::search::client::{cache_key, handle_response};

use super::response::EventStoreResponse;

/// One aggregation-only query against the event store.
#[derive(Debug, Clone)]
pub struct EventStoreRequest {
    /// Free-text/structured query string.
    pub query: String,

    /// Comma-separated DOI filter.
    pub doi: String,

    /// Named aggregation profile to compute.
    pub aggregations: &'static str,
}

/// HTTP client for the event store.
#[derive(Clone)]
pub struct EventStoreClient {
    client: ClientWithMiddleware,
    cache: Cache<String, Value>,
    events_url: String,
}

impl EventStoreClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
            .build_with_max_retries(3);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let cache = Cache::builder()
            .max_capacity(config.cache_max_size)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self { client, cache, events_url: config.events_url.clone() })
    }

    /// Execute an aggregation query. Page size is pinned to 0; only the
    /// aggregations are consumed.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status, or a
    /// response that does not match the event response schema.
    pub async fn query(&self, request: &EventStoreRequest) -> ClientResult<EventStoreResponse> {
        let params = vec![
            ("query".to_string(), request.query.clone()),
            ("doi".to_string(), request.doi.clone()),
            ("aggregations".to_string(), request.aggregations.to_string()),
            ("page[size]".to_string(), "0".to_string()),
        ];

        let key = cache_key(&self.events_url, &json!(params));
        if let Some(cached) = self.cache.get(&key).await {
            return serde_json::from_value(cached).map_err(ClientError::from);
        }

        debug!(url = %self.events_url, aggregations = request.aggregations, "issuing event query");
        let response = self.client.get(&self.events_url).query(&params).send().await?;
        let response = handle_response(response).await?;
        let value: Value = response.json().await?;

        self.cache.insert(key, value.clone()).await;

        serde_json::from_value(value).map_err(ClientError::from)
    }
}

impl std::fmt::Debug for EventStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStoreClient").field("events_url", &self.events_url).finish()
    }
}
