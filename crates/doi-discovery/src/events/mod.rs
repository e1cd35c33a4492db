//! Citation, view, and download metrics from the event store.
//!
//! A citation involves two identifiers: the DOI under inspection may be
//! the subject of a passive relation (`is-cited-by` and friends) or the
//! object of an active one (`cites` and friends). Both directions are
//! queried independently and the per-identifier counts summed; the merge
//! is additive and commutative, so the two queries run concurrently.

mod client;
mod response;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::relations::{
    ACTIVE_RELATION_TYPES, DOWNLOADS_RELATION_TYPE, PASSIVE_RELATION_TYPES, VIEWS_RELATION_TYPE,
};
use crate::error::ClientResult;
use crate::identifiers::doi_from_url;

pub use client::{EventStoreClient, EventStoreRequest};
pub use response::{EventAggregations, EventBucket, EventStoreResponse, KeyedAggregation};

/// Per-identifier citation count row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRow {
    pub id: String,
    pub citations: i64,
}

/// Per-identifier usage count row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRow {
    pub id: String,
    pub views: i64,
    pub downloads: i64,
}

/// Combined per-identifier metric row mixed into entity representations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRow {
    pub id: String,
    pub citations: i64,
    pub views: i64,
    pub downloads: i64,
}

/// One histogram row (year or year-month bucket).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramRow {
    pub id: String,
    pub title: String,
    pub sum: i64,
}

/// Issues aggregation queries against the event store and reshapes the
/// bucketed results into per-identifier metric rows.
#[derive(Debug, Clone)]
pub struct EventsQuery {
    client: EventStoreClient,
}

impl EventsQuery {
    #[must_use]
    pub fn new(client: EventStoreClient) -> Self {
        Self { client }
    }

    /// Citation counts for a comma-separated identifier list.
    ///
    /// Every supplied identifier gets a row, zero-filled when it appears
    /// in no bucket; row ids are the caller's identifiers lower-cased.
    pub async fn citations(&self, ids: &str) -> ClientResult<Vec<CitationRow>> {
        let requested = requested_ids(ids);
        if requested.is_empty() {
            return Ok(Vec::new());
        }

        let pids = canonical_pids(&requested);
        let doi_filter = doi_filter(&requested);

        let subject_request = EventStoreRequest {
            query: direction_query("subj_id", &pids, PASSIVE_RELATION_TYPES),
            doi: doi_filter.clone(),
            aggregations: "citations_by_subject",
        };
        let object_request = EventStoreRequest {
            query: direction_query("obj_id", &pids, ACTIVE_RELATION_TYPES),
            doi: doi_filter,
            aggregations: "citations_by_object",
        };
        let (subject_response, object_response) = tokio::try_join!(
            self.client.query(&subject_request),
            self.client.query(&object_request),
        )?;

        let merged = merge_counts(
            bucket_counts(&subject_response.response.aggregations.citations),
            bucket_counts(&object_response.response.aggregations.citations),
        );

        Ok(requested
            .iter()
            .map(|id| CitationRow { id: id.to_lowercase(), citations: count_for(&merged, id) })
            .collect())
    }

    /// View and download counts for a comma-separated identifier list,
    /// from one combined usage query.
    pub async fn views_and_downloads(&self, ids: &str) -> ClientResult<Vec<UsageRow>> {
        let requested = requested_ids(ids);
        if requested.is_empty() {
            return Ok(Vec::new());
        }

        let pids = canonical_pids(&requested);
        let response = self
            .client
            .query(&EventStoreRequest {
                query: usage_query(&pids),
                doi: doi_filter(&requested),
                aggregations: "usage_by_doi",
            })
            .await?;

        let usage = &response.response.aggregations.usage;
        let views: HashMap<String, i64> = usage
            .buckets
            .iter()
            .map(|b| (bare_doi(&b.key), b.relation_type_total(VIEWS_RELATION_TYPE)))
            .collect();
        let downloads: HashMap<String, i64> = usage
            .buckets
            .iter()
            .map(|b| (bare_doi(&b.key), b.relation_type_total(DOWNLOADS_RELATION_TYPE)))
            .collect();

        Ok(requested
            .iter()
            .map(|id| UsageRow {
                id: id.to_lowercase(),
                views: count_for(&views, id),
                downloads: count_for(&downloads, id),
            })
            .collect())
    }

    /// View counts only.
    pub async fn views(&self, ids: &str) -> ClientResult<Vec<CitationRow>> {
        Ok(self
            .views_and_downloads(ids)
            .await?
            .into_iter()
            .map(|row| CitationRow { id: row.id, citations: row.views })
            .collect())
    }

    /// Download counts only.
    pub async fn downloads(&self, ids: &str) -> ClientResult<Vec<CitationRow>> {
        Ok(self
            .views_and_downloads(ids)
            .await?
            .into_iter()
            .map(|row| CitationRow { id: row.id, citations: row.downloads })
            .collect())
    }

    /// Citation, view, and download counts in one merged row per
    /// identifier. The citation and usage queries run concurrently.
    pub async fn metrics(&self, ids: &str) -> ClientResult<Vec<MetricRow>> {
        let (citations, usage) =
            tokio::try_join!(self.citations(ids), self.views_and_downloads(ids))?;

        let usage_by_id: HashMap<String, UsageRow> =
            usage.into_iter().map(|row| (row.id.clone(), row)).collect();

        Ok(citations
            .into_iter()
            .map(|row| {
                let usage = usage_by_id.get(&row.id);
                MetricRow {
                    citations: row.citations,
                    views: usage.map_or(0, |u| u.views),
                    downloads: usage.map_or(0, |u| u.downloads),
                    id: row.id,
                }
            })
            .collect())
    }

    /// Citation counts by year for a single identifier. Only the first
    /// identifier of a comma list is used; histograms are a
    /// single-entity operation, unlike the batch count calls.
    pub async fn citations_histogram(&self, id: &str) -> ClientResult<Vec<HistogramRow>> {
        let Some(first) = requested_ids(id).into_iter().next() else {
            return Ok(Vec::new());
        };
        let pids = canonical_pids(std::slice::from_ref(&first));

        let query = format!(
            "({}) OR ({})",
            direction_query("subj_id", &pids, PASSIVE_RELATION_TYPES),
            direction_query("obj_id", &pids, ACTIVE_RELATION_TYPES),
        );
        let response = self
            .client
            .query(&EventStoreRequest {
                query,
                doi: first.to_lowercase(),
                aggregations: "citations_histogram",
            })
            .await?;

        Ok(histogram_rows(&response.response.aggregations.histogram))
    }

    /// View counts by year-month for a single identifier.
    pub async fn views_histogram(&self, id: &str) -> ClientResult<Vec<HistogramRow>> {
        self.usage_histogram(id, VIEWS_RELATION_TYPE).await
    }

    /// Download counts by year-month for a single identifier.
    pub async fn downloads_histogram(&self, id: &str) -> ClientResult<Vec<HistogramRow>> {
        self.usage_histogram(id, DOWNLOADS_RELATION_TYPE).await
    }

    async fn usage_histogram(
        &self,
        id: &str,
        relation_type: &str,
    ) -> ClientResult<Vec<HistogramRow>> {
        let Some(first) = requested_ids(id).into_iter().next() else {
            return Ok(Vec::new());
        };
        let pids = canonical_pids(std::slice::from_ref(&first));

        let response = self
            .client
            .query(&EventStoreRequest {
                query: direction_query("obj_id", &pids, &[relation_type]),
                doi: first.to_lowercase(),
                aggregations: "usage_histogram",
            })
            .await?;

        Ok(histogram_rows(&response.response.aggregations.histogram))
    }
}

/// Additively merge two identifier-keyed count maps. Keys present in
/// both sum their counts; keys unique to one side pass through. The
/// operation is commutative, so the two citation directions may be
/// merged in either order.
#[must_use]
pub fn merge_counts(
    left: HashMap<String, i64>,
    right: HashMap<String, i64>,
) -> HashMap<String, i64> {
    let mut merged = left;
    for (key, count) in right {
        *merged.entry(key).or_insert(0) += count;
    }
    merged
}

/// The caller-supplied identifier list, comma-split with blanks dropped.
fn requested_ids(ids: &str) -> Vec<String> {
    ids.split(',').map(str::trim).filter(|id| !id.is_empty()).map(String::from).collect()
}

/// Canonical resolver-form pids for the store query, one per requested
/// identifier. The store keys events by `https://doi.org/...` URLs, so
/// every id is folded to its bare form and re-prefixed.
fn canonical_pids(ids: &[String]) -> Vec<String> {
    ids.iter().map(|id| format!("https://doi.org/{}", bare_doi(id))).collect()
}

fn doi_filter(ids: &[String]) -> String {
    ids.iter().map(|id| id.to_lowercase()).collect::<Vec<_>>().join(",")
}

/// Query string for one citation direction, e.g.
/// `(subj_id:"pid") AND (relation_type_id:is-cited-by OR ...)`.
fn direction_query(id_field: &str, pids: &[String], relation_types: &[&str]) -> String {
    let id_clause = pids
        .iter()
        .map(|pid| format!("{id_field}:\"{pid}\""))
        .collect::<Vec<_>>()
        .join(" OR ");
    let relation_clause = relation_types
        .iter()
        .map(|relation_type| format!("relation_type_id:{relation_type}"))
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("({id_clause}) AND ({relation_clause})")
}

fn usage_query(pids: &[String]) -> String {
    direction_query("obj_id", pids, &[VIEWS_RELATION_TYPE, DOWNLOADS_RELATION_TYPE])
}

/// Identifier-keyed totals from one aggregation's buckets. Bucket keys
/// are canonical pids; they are folded to bare lower-case DOIs so rows
/// can be re-matched to caller-supplied identifiers.
fn bucket_counts(aggregation: &KeyedAggregation) -> HashMap<String, i64> {
    aggregation
        .buckets
        .iter()
        .map(|bucket| (bare_doi(&bucket.key), bucket.total_value()))
        .collect()
}

/// Count for one caller-supplied identifier, zero when absent.
fn count_for(counts: &HashMap<String, i64>, id: &str) -> i64 {
    counts.get(&bare_doi(id)).copied().unwrap_or(0)
}

/// The bare lower-cased DOI of an identifier in any accepted form. When
/// the strict DOI pattern does not match, the resolver prefix is still
/// stripped before folding, so bucket keys and caller ids always land on
/// the same form.
fn bare_doi(id: &str) -> String {
    if let Some(doi) = doi_from_url(id) {
        return doi;
    }
    let trimmed = id.trim();
    ["https://doi.org/", "http://doi.org/", "https://dx.doi.org/", "http://dx.doi.org/", "doi:"]
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed)
        .to_lowercase()
}

fn histogram_rows(aggregation: &KeyedAggregation) -> Vec<HistogramRow> {
    aggregation
        .buckets
        .iter()
        .map(|bucket| {
            let key = bucket.key_as_string.clone().unwrap_or_else(|| bucket.key.clone());
            HistogramRow { id: key.clone(), title: key, sum: bucket.total_value() }
        })
        .collect()
}
