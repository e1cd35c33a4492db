//! Typed event store responses.
//!
//! One struct per aggregation profile, decoded once at the store
//! boundary. Bucket totals come from a `total` sum sub-aggregation;
//! absence of any branch decodes to an empty default rather than an
//! error.

use serde::Deserialize;

/// Envelope returned by the event store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventStoreResponse {
    #[serde(default)]
    pub results: EventResults,

    #[serde(default)]
    pub response: EventResponseBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventResults {
    #[serde(default)]
    pub total: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventResponseBody {
    #[serde(default)]
    pub aggregations: EventAggregations,
}

/// Aggregation trees keyed by profile name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventAggregations {
    /// Per-identifier citation counts (subject- or object-side).
    #[serde(default)]
    pub citations: KeyedAggregation,

    /// Per-identifier usage buckets with relation-type sub-buckets.
    #[serde(default)]
    pub usage: KeyedAggregation,

    /// Year or year-month histogram for a single identifier.
    #[serde(default)]
    pub histogram: KeyedAggregation,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyedAggregation {
    #[serde(default)]
    pub buckets: Vec<EventBucket>,
}

/// One bucket: identifier (or date) key, document count, summed event
/// total, and optional relation-type sub-buckets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventBucket {
    /// Bucket key; numeric date-histogram keys are stringified at decode time.
    #[serde(default, deserialize_with = "crate::search::response::key_to_string")]
    pub key: String,

    #[serde(default)]
    pub key_as_string: Option<String>,

    #[serde(default)]
    pub doc_count: i64,

    #[serde(default)]
    pub total: TotalValue,

    #[serde(default)]
    pub relation_types: Option<KeyedAggregation>,
}

impl EventBucket {
    /// Summed event count for this bucket.
    #[must_use]
    pub fn total_value(&self) -> i64 {
        self.total.value as i64
    }

    /// The summed total of the named relation-type sub-bucket, or 0 when
    /// the sub-bucket is absent.
    #[must_use]
    pub fn relation_type_total(&self, relation_type: &str) -> i64 {
        self.relation_types
            .as_ref()
            .and_then(|agg| agg.buckets.iter().find(|bucket| bucket.key == relation_type))
            .map_or(0, EventBucket::total_value)
    }
}

/// Sum aggregation value; the store reports sums as floats.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TotalValue {
    #[serde(default)]
    pub value: f64,
}
