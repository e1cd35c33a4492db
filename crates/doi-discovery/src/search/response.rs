//! Typed search engine responses.
//!
//! Responses are decoded once at the store boundary; downstream code
//! works with typed hits and buckets instead of stringly nested lookups.

use serde::Deserialize;
use serde::de::Deserializer;
use serde_json::{Map, Value};

use super::cursor::Cursor;

/// A full search response: hits plus optional aggregation bucket trees
/// keyed by facet name.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse<T> {
    pub hits: Hits<T>,

    #[serde(default)]
    pub aggregations: Option<Value>,
}

impl<T> SearchResponse<T> {
    /// Total result count reported by the index.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.hits.total.value
    }

    /// The documents on this page.
    #[must_use]
    pub fn nodes(&self) -> &[SearchHit<T>] {
        &self.hits.hits
    }

    /// Decode one named facet's terms buckets, if present.
    #[must_use]
    pub fn terms_buckets(&self, facet: &str) -> Vec<TermsBucket> {
        self.aggregations
            .as_ref()
            .and_then(|aggs| aggs.get(facet))
            .and_then(|agg| agg.get("buckets"))
            .and_then(|buckets| serde_json::from_value(buckets.clone()).ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hits<T> {
    pub total: Total,

    #[serde(default = "Vec::new")]
    pub hits: Vec<SearchHit<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Total {
    pub value: i64,
}

/// One identifier-bearing document plus its sort tuple.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit<T> {
    #[serde(rename = "_source")]
    pub source: T,

    #[serde(default)]
    pub sort: Vec<Value>,
}

impl<T> SearchHit<T> {
    /// The cursor pointing at this hit, for `search_after` pagination.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        Cursor::from_sort(&self.sort)
    }
}

/// One grouped-count entry within a terms or date-histogram aggregation.
#[derive(Debug, Clone, Deserialize)]
pub struct TermsBucket {
    /// Bucket key; numeric keys are stringified at decode time.
    #[serde(deserialize_with = "key_to_string")]
    pub key: String,

    /// Formatted key for date-histogram buckets.
    #[serde(default)]
    pub key_as_string: Option<String>,

    #[serde(default)]
    pub doc_count: i64,

    /// Nested sub-aggregations keyed by name.
    #[serde(flatten)]
    pub nested: Map<String, Value>,
}

impl TermsBucket {
    /// Decode a named nested sub-aggregation's buckets.
    #[must_use]
    pub fn nested_buckets(&self, name: &str) -> Vec<TermsBucket> {
        self.nested
            .get(name)
            .and_then(|agg| agg.get("buckets"))
            .and_then(|buckets| serde_json::from_value(buckets.clone()).ok())
            .unwrap_or_default()
    }
}

pub(crate) fn key_to_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        other => other.to_string(),
    })
}
