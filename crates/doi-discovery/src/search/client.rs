//! Search engine client.
//!
//! The index is a black box exposing a query-and-aggregate `_search`
//! endpoint. This client owns connection pooling, retry with exponential
//! backoff, and a short-lived response cache; retry/backoff policy lives
//! here, never in the query builders.

use std::time::Duration;

use moka::future::Cache;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde_json::Value;
use tracing::debug;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};

use super::response::SearchResponse;

/// HTTP client for the document index.
#[derive(Clone)]
pub struct SearchClient {
    client: ClientWithMiddleware,
    cache: Cache<String, Value>,
    search_url: String,
}

impl SearchClient {
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

        Ok(Self { client, cache, search_url: config.search_url.clone() })
    }

    /// Execute a query document against the index's `_search` endpoint.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status, or a
    /// response that does not match the search response schema.
    pub async fn search<T>(&self, query: &Value) -> ClientResult<SearchResponse<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/_search", self.search_url);

        let cache_key = cache_key(&url, query);
        if let Some(cached) = self.cache.get(&cache_key).await {
            return serde_json::from_value(cached).map_err(ClientError::from);
        }

        debug!(url = %url, "issuing search query");
        let response = self.client.post(&url).json(query).send().await?;
        let response = handle_response(response).await?;
        let value: Value = response.json().await?;

        self.cache.insert(cache_key, value.clone()).await;

        serde_json::from_value(value).map_err(ClientError::from)
    }
}

/// Map non-success status codes onto client errors.
pub(crate) async fn handle_response(
    response: reqwest::Response,
) -> ClientResult<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        400 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::bad_request(text))
        }
        404 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::not_found(text))
        }
        500..=599 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::server(status.as_u16(), text))
        }
        _ => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
        }
    }
}

/// Cache key over the endpoint and the full query document.
pub(crate) fn cache_key(url: &str, body: &Value) -> String {
    use md5::{Digest, Md5};

    let mut hasher = Md5::new();
    hasher.update(url.as_bytes());
    hasher.update(b"|");
    hasher.update(body.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient").field("search_url", &self.search_url).finish()
    }
}
