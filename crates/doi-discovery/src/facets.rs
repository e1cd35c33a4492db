//! Facet shaping.
//!
//! Aggregation bucket trees come back from the index keyed by facet name;
//! these functions reshape them into the flat `{id, title, count}` rows
//! the API layer exposes, plus the richer author/funder and
//! relation-type shapes.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::search::TermsBucket;
use crate::strings::{parameterize, titleize};

/// Years before this are dropped from year-range facets.
const LOWER_BOUND_YEAR: i64 = 2010;

/// One facet row exposed to the API layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub id: String,
    pub title: String,
    pub count: i64,
}

/// A year-month sub-row within a relation-type facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearMonthFacet {
    pub id: String,
    pub title: String,
    pub sum: i64,
}

/// A relation-type facet row with nested year-month sums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationTypeFacet {
    pub id: String,
    pub title: String,
    pub count: i64,
    pub year_months: Vec<YearMonthFacet>,
}

/// Plain terms facet; titles are titleized keys.
#[must_use]
pub fn facet_by_key(buckets: &[TermsBucket]) -> Vec<Facet> {
    buckets
        .iter()
        .map(|bucket| Facet {
            id: bucket.key.clone(),
            title: titleize(&bucket.key),
            count: bucket.doc_count,
        })
        .collect()
}

/// Date-histogram facet keyed by the formatted key string.
#[must_use]
pub fn facet_by_key_as_string(buckets: &[TermsBucket]) -> Vec<Facet> {
    buckets
        .iter()
        .map(|bucket| {
            let key = bucket.key_as_string.clone().unwrap_or_else(|| bucket.key.clone());
            Facet { id: key.clone(), title: key, count: bucket.doc_count }
        })
        .collect()
}

/// Year facet from a date histogram; keeps the 4-digit year of each key.
#[must_use]
pub fn facet_by_year(buckets: &[TermsBucket]) -> Vec<Facet> {
    buckets
        .iter()
        .map(|bucket| {
            let key = bucket.key_as_string.as_deref().unwrap_or(&bucket.key);
            let year: String = key.chars().take(4).collect();
            Facet { id: year.clone(), title: year, count: bucket.doc_count }
        })
        .collect()
}

/// Year facet with future years removed and only the window back to 2010
/// kept.
#[must_use]
pub fn facet_by_range(buckets: &[TermsBucket]) -> Vec<Facet> {
    let current_year = i64::from(Utc::now().year());
    let window = (current_year - LOWER_BOUND_YEAR + 1) as usize;

    buckets
        .iter()
        .filter(|bucket| {
            let key = bucket.key_as_string.as_deref().unwrap_or(&bucket.key);
            key.parse::<i64>().is_ok_and(|year| year <= current_year)
        })
        .take(window)
        .map(|bucket| {
            let key =
                bucket.key_as_string.clone().unwrap_or_else(|| bucket.key.clone());
            Facet { id: key.clone(), title: key, count: bucket.doc_count }
        })
        .collect()
}

/// Facet over `id:title` combined index keys.
#[must_use]
pub fn facet_by_combined_key(buckets: &[TermsBucket]) -> Vec<Facet> {
    buckets
        .iter()
        .map(|bucket| {
            let (id, title) = match bucket.key.split_once(':') {
                Some((id, title)) => (id.to_string(), title.to_string()),
                None => (bucket.key.clone(), bucket.key.clone()),
            };
            Facet { id, title, count: bucket.doc_count }
        })
        .collect()
}

/// Fields-of-science facet: strip the `FOS: ` prefix and parameterize the
/// id.
#[must_use]
pub fn facet_by_fos(buckets: &[TermsBucket]) -> Vec<Facet> {
    buckets
        .iter()
        .map(|bucket| {
            let title = bucket.key.replace("FOS: ", "");
            Facet { id: parameterize(&title, '_'), title, count: bucket.doc_count }
        })
        .collect()
}

/// Resource-type facet with dasherized ids.
#[must_use]
pub fn facet_by_resource_type(buckets: &[TermsBucket]) -> Vec<Facet> {
    buckets
        .iter()
        .map(|bucket| Facet {
            id: parameterize(&bucket.key, '-'),
            title: bucket.key.clone(),
            count: bucket.doc_count,
        })
        .collect()
}

/// Relation-type facet with nested year-month event sums.
#[must_use]
pub fn facet_by_relation_type(buckets: &[TermsBucket]) -> Vec<RelationTypeFacet> {
    buckets
        .iter()
        .map(|bucket| {
            let year_months = bucket
                .nested_buckets("year_month")
                .iter()
                .map(|sub| {
                    let key =
                        sub.key_as_string.clone().unwrap_or_else(|| sub.key.clone());
                    YearMonthFacet { id: key.clone(), title: key, sum: sub.doc_count }
                })
                .collect();
            RelationTypeFacet {
                id: bucket.key.clone(),
                title: bucket.key.clone(),
                count: bucket.doc_count,
                year_months,
            }
        })
        .collect()
}

/// Author facet: bucket keys are ORCID URLs and the display name comes
/// from the `top_hits` sub-aggregation's creator list, matched back to
/// the bucket key by name identifier.
#[must_use]
pub fn facet_by_authors(buckets: &[TermsBucket]) -> Vec<Facet> {
    buckets
        .iter()
        .map(|bucket| {
            let title = top_hit_source(bucket, "authors")
                .and_then(|source| source.get("creators").cloned())
                .and_then(|creators| {
                    creators.as_array().and_then(|list| {
                        list.iter()
                            .find(|creator| {
                                creator
                                    .get("nameIdentifiers")
                                    .and_then(Value::as_array)
                                    .is_some_and(|ids| {
                                        ids.iter().any(|id| {
                                            id.get("nameIdentifier").and_then(Value::as_str)
                                                == Some(bucket.key.as_str())
                                        })
                                    })
                            })
                            .and_then(|creator| {
                                creator.get("name").and_then(Value::as_str).map(String::from)
                            })
                    })
                })
                .unwrap_or_else(|| bucket.key.clone());
            Facet { id: bucket.key.clone(), title, count: bucket.doc_count }
        })
        .collect()
}

/// Funder facet: bucket keys are funder DOIs named from the funding
/// reference list.
#[must_use]
pub fn facet_by_funders(buckets: &[TermsBucket]) -> Vec<Facet> {
    buckets
        .iter()
        .map(|bucket| {
            let title = top_hit_source(bucket, "funders")
                .and_then(|source| source.get("funding_references").cloned())
                .and_then(|refs| {
                    find_by_identifier(&refs, "funderIdentifier", &bucket.key)
                        .and_then(|entry| entry.get("funderName").and_then(Value::as_str).map(String::from))
                })
                .unwrap_or_else(|| bucket.key.clone());
            Facet { id: bucket.key.clone(), title, count: bucket.doc_count }
        })
        .collect()
}

/// The `_source` of the first top hit under the named sub-aggregation.
fn top_hit_source(bucket: &TermsBucket, agg_name: &str) -> Option<Value> {
    bucket
        .nested
        .get(agg_name)?
        .get("hits")?
        .get("hits")?
        .get(0)?
        .get("_source")
        .cloned()
}

fn find_by_identifier<'a>(entries: &'a Value, field: &str, key: &str) -> Option<&'a Value> {
    entries
        .as_array()?
        .iter()
        .find(|entry| entry.get(field).and_then(Value::as_str) == Some(key))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn bucket(value: Value) -> TermsBucket {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_facet_by_key_titleizes() {
        let facets = facet_by_key(&[bucket(json!({ "key": "is_active", "doc_count": 3 }))]);
        assert_eq!(facets, vec![Facet { id: "is_active".into(), title: "Is Active".into(), count: 3 }]);
    }

    #[test]
    fn test_facet_by_year_truncates() {
        let facets = facet_by_year(&[bucket(json!({
            "key": 1_577_836_800_000_i64,
            "key_as_string": "2020-01-01",
            "doc_count": 9
        }))]);
        assert_eq!(facets[0].id, "2020");
        assert_eq!(facets[0].count, 9);
    }

    #[test]
    fn test_facet_by_range_drops_future_years() {
        let next_year = (Utc::now().year() + 1).to_string();
        let facets = facet_by_range(&[
            bucket(json!({ "key": 0, "key_as_string": next_year, "doc_count": 1 })),
            bucket(json!({ "key": 0, "key_as_string": "2019", "doc_count": 5 })),
        ]);
        assert_eq!(facets.len(), 1);
        assert_eq!(facets[0].id, "2019");
    }

    #[test]
    fn test_facet_by_combined_key() {
        let facets = facet_by_combined_key(&[bucket(json!({
            "key": "dryad.dryad:Dryad Digital Repository",
            "doc_count": 12
        }))]);
        assert_eq!(facets[0].id, "dryad.dryad");
        assert_eq!(facets[0].title, "Dryad Digital Repository");
    }

    #[test]
    fn test_facet_by_fos() {
        let facets = facet_by_fos(&[bucket(json!({ "key": "FOS: Earth science", "doc_count": 4 }))]);
        assert_eq!(facets[0].id, "earth_science");
        assert_eq!(facets[0].title, "Earth science");
    }

    #[test]
    fn test_facet_by_authors_uses_top_hit_name() {
        let facets = facet_by_authors(&[bucket(json!({
            "key": "https://orcid.org/0000-0003-1419-2405",
            "doc_count": 6,
            "authors": { "hits": { "hits": [{ "_source": {
                "creators": [{
                    "name": "Fenner, Martin",
                    "nameIdentifiers": [{ "nameIdentifier": "https://orcid.org/0000-0003-1419-2405" }]
                }]
            } }] } }
        }))]);
        assert_eq!(facets[0].title, "Fenner, Martin");
        assert_eq!(facets[0].id, "https://orcid.org/0000-0003-1419-2405");
    }

    #[test]
    fn test_facet_by_funders_falls_back_to_key() {
        let facets = facet_by_funders(&[bucket(json!({
            "key": "https://doi.org/10.13039/501100000780",
            "doc_count": 2
        }))]);
        assert_eq!(facets[0].title, "https://doi.org/10.13039/501100000780");
    }

    #[test]
    fn test_facet_by_relation_type_nested_sums() {
        let facets = facet_by_relation_type(&[bucket(json!({
            "key": "references",
            "doc_count": 11,
            "year_month": { "buckets": [
                { "key": 0, "key_as_string": "2020-06", "doc_count": 7 },
                { "key": 0, "key_as_string": "2020-05", "doc_count": 4 }
            ] }
        }))]);
        assert_eq!(facets[0].year_months.len(), 2);
        assert_eq!(facets[0].year_months[0].sum, 7);
    }
}
