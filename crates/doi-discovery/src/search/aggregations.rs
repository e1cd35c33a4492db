//! Facet (aggregation) selection and sizing.
//!
//! A fixed catalog of named aggregation definitions is produced fresh for
//! every build, then narrowed to the requested subset and resized. The
//! catalog function returns a new tree each call, so concurrent builds
//! never share mutable aggregation state.

use std::collections::HashMap;

use serde_json::{Map, Value, json};

use crate::config::query::DEFAULT_FACET_COUNT;

use super::options::{SearchOptions, split_values};

/// Selects and sizes the facet catalog for one request.
pub struct AggregationsBuilder<'a> {
    options: &'a SearchOptions,
    facet_count: i64,
}

enum Requested {
    All,
    None,
    Named(Vec<String>),
}

impl<'a> AggregationsBuilder<'a> {
    #[must_use]
    pub fn new(options: &'a SearchOptions) -> Self {
        let facet_count = options.facet_count.unwrap_or(DEFAULT_FACET_COUNT);
        Self { options, facet_count }
    }

    /// Build the aggregation map for the request.
    ///
    /// A global facet count of 0 disables all aggregations, the escape
    /// hatch for list-only queries.
    #[must_use]
    pub fn build(&self) -> Map<String, Value> {
        if self.facet_count == 0 {
            return Map::new();
        }

        let mut aggs = self.selected_aggs();
        for (key, size) in self.facet_sizes(&aggs) {
            if let Some(terms) = aggs.get_mut(&key).and_then(|agg| agg.get_mut("terms")) {
                terms["size"] = json!(size);
            }
        }
        aggs
    }

    /// Resolved per-facet sizes: explicit `facet_sizes` overrides win for
    /// facets they name; a non-default global `facet_count` applies to
    /// every other selected terms facet.
    fn facet_sizes(&self, selected: &Map<String, Value>) -> HashMap<String, i64> {
        let mut sizes: HashMap<String, i64> = HashMap::new();

        if self.facet_count != DEFAULT_FACET_COUNT && self.facet_count > 0 {
            for (key, agg) in selected {
                if agg.get("terms").is_some() {
                    sizes.insert(key.clone(), self.facet_count);
                }
            }
        }

        for (key, &size) in &self.options.facet_sizes {
            if size > 0 && selected.contains_key(key) {
                sizes.insert(key.clone(), size);
            }
        }

        sizes
    }

    fn requested_aggs(&self) -> Requested {
        match self.options.include_aggregations.as_deref() {
            None => Requested::All,
            Some(value) => {
                let names = split_values(value);
                if names.iter().any(|name| name == "none") {
                    Requested::None
                } else if names.iter().any(|name| name == "all") {
                    Requested::All
                } else {
                    Requested::Named(names)
                }
            }
        }
    }

    /// The requested subset of the catalog; unknown facet names are
    /// silently dropped for forward/backward API compatibility.
    fn selected_aggs(&self) -> Map<String, Value> {
        let catalog = aggregation_definitions();
        match self.requested_aggs() {
            Requested::All => catalog,
            Requested::None => Map::new(),
            Requested::Named(names) => {
                let mut selected = Map::new();
                for name in names {
                    if let Some(agg) = catalog.get(&name) {
                        selected.insert(name, agg.clone());
                    }
                }
                selected
            }
        }
    }
}

/// All facet names in the catalog.
#[must_use]
pub fn all_aggregation_keys() -> Vec<String> {
    aggregation_definitions().keys().cloned().collect()
}

/// The full aggregation catalog, built fresh on every call so callers may
/// resize the returned tree freely.
#[must_use]
pub fn aggregation_definitions() -> Map<String, Value> {
    let Value::Object(catalog) = json!({
        "resource_types": {
            "terms": {
                "field": "resource_type_id_and_name",
                "size": DEFAULT_FACET_COUNT,
                "min_doc_count": 1,
                "missing": "__missing__",
            },
        },
        "clients": {
            "terms": {
                "field": "client_id_and_name",
                "size": DEFAULT_FACET_COUNT,
                "min_doc_count": 1,
            },
        },
        "open_licenses": {
            "filter": { "terms": {
                "rights_list.rightsIdentifier": [
                    "cc-by-1.0",
                    "cc-by-2.0",
                    "cc-by-2.5",
                    "cc-by-3.0",
                    "cc-by-3.0-at",
                    "cc-by-3.0-us",
                    "cc-by-4.0",
                    "cc-pddc",
                    "cc0-1.0",
                    "cc-pdm-1.0",
                ],
            } },
            "aggs": {
                "resource_types": {
                    "terms": {
                        "field": "resource_type_id_and_name",
                        "size": DEFAULT_FACET_COUNT,
                        "min_doc_count": 1,
                    },
                },
            },
        },
        "published": {
            "date_histogram": {
                "field": "publication_year",
                "interval": "year",
                "format": "year",
                "order": { "_key": "desc" },
                "min_doc_count": 1,
            },
        },
        "registration_agencies": {
            "terms": { "field": "agency", "size": DEFAULT_FACET_COUNT, "min_doc_count": 1 },
        },
        "affiliations": {
            "terms": {
                "field": "affiliation_id_and_name",
                "size": DEFAULT_FACET_COUNT,
                "min_doc_count": 1,
                "missing": "__missing__",
            },
        },
        "authors": {
            "terms": {
                "field": "creators.nameIdentifiers.nameIdentifier",
                "size": DEFAULT_FACET_COUNT,
                "min_doc_count": 1,
                "include": "https?://orcid.org/.*",
            },
            "aggs": {
                "authors": {
                    "top_hits": {
                        "_source": {
                            "includes": [
                                "creators.name",
                                "creators.nameIdentifiers.nameIdentifier",
                            ],
                        },
                        "size": 1,
                    },
                },
            },
        },
        "creators_and_contributors": {
            "terms": {
                "field": "creators_and_contributors.nameIdentifiers.nameIdentifier",
                "size": DEFAULT_FACET_COUNT,
                "min_doc_count": 1,
                "include": "https?://orcid.org/.*",
            },
            "aggs": {
                "creators_and_contributors": {
                    "top_hits": {
                        "_source": {
                            "includes": [
                                "creators_and_contributors.name",
                                "creators_and_contributors.nameIdentifiers.nameIdentifier",
                            ],
                        },
                        "size": 1,
                    },
                },
                "work_types": {
                    "terms": {
                        "field": "resource_type_id_and_name",
                        "min_doc_count": 1,
                    },
                },
            },
        },
        "funders": {
            "terms": {
                "field": "funding_references.funderIdentifier",
                "size": DEFAULT_FACET_COUNT,
                "min_doc_count": 1,
            },
            "aggs": {
                "funders": {
                    "top_hits": {
                        "_source": {
                            "includes": [
                                "funding_references.funderName",
                                "funding_references.funderIdentifier",
                            ],
                        },
                        "size": 1,
                    },
                },
            },
        },
        "pid_entities": {
            "filter": { "term": { "subjects.subjectScheme": "PidEntity" } },
            "aggs": {
                "subject": { "terms": {
                    "field": "subjects.subject",
                    "size": DEFAULT_FACET_COUNT,
                    "min_doc_count": 1,
                    "include": [
                        "Dataset",
                        "Publication",
                        "Software",
                        "Organization",
                        "Funder",
                        "Person",
                        "Grant",
                        "Sample",
                        "Instrument",
                        "Repository",
                        "Project",
                    ],
                } },
            },
        },
        "fields_of_science": {
            "filter": {
                "term": { "subjects.subjectScheme": "Fields of Science and Technology (FOS)" },
            },
            "aggs": {
                "subject": { "terms": {
                    "field": "subjects.subject",
                    "size": DEFAULT_FACET_COUNT,
                    "min_doc_count": 1,
                    "include": "FOS:.*",
                } },
            },
        },
        "fields_of_science_combined": {
            "terms": {
                "field": "fields_of_science_combined",
                "size": DEFAULT_FACET_COUNT,
                "min_doc_count": 1,
            },
        },
        "fields_of_science_repository": {
            "terms": {
                "field": "fields_of_science_repository",
                "size": DEFAULT_FACET_COUNT,
                "min_doc_count": 1,
            },
        },
        "licenses": {
            "terms": {
                "field": "rights_list.rightsIdentifier",
                "size": DEFAULT_FACET_COUNT,
                "min_doc_count": 1,
                "missing": "__missing__",
            },
        },
        "languages": {
            "terms": { "field": "language", "size": DEFAULT_FACET_COUNT, "min_doc_count": 1 },
        },
        "view_count": { "sum": { "field": "view_count" } },
        "download_count": { "sum": { "field": "download_count" } },
        "citation_count": { "sum": { "field": "citation_count" } },
        "content_url_count": { "value_count": { "field": "content_url" } },
        "client_types": {
            "terms": { "field": "client.client_type", "size": DEFAULT_FACET_COUNT, "min_doc_count": 1 },
        },
    }) else {
        unreachable!("catalog literal is an object")
    };
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_isolated_per_call() {
        let mut first = aggregation_definitions();
        first["clients"]["terms"]["size"] = json!(99);
        let second = aggregation_definitions();
        assert_eq!(second["clients"]["terms"]["size"], json!(DEFAULT_FACET_COUNT));
    }

    #[test]
    fn test_unknown_facet_names_dropped() {
        let options = SearchOptions {
            include_aggregations: Some("clients,not_a_facet".into()),
            ..Default::default()
        };
        let aggs = AggregationsBuilder::new(&options).build();
        assert_eq!(aggs.len(), 1);
        assert!(aggs.contains_key("clients"));
    }

    #[test]
    fn test_none_selects_nothing() {
        let options =
            SearchOptions { include_aggregations: Some("none".into()), ..Default::default() };
        assert!(AggregationsBuilder::new(&options).build().is_empty());
    }

    #[test]
    fn test_override_ignored_for_non_terms_facet() {
        let options = SearchOptions {
            facet_sizes: [("view_count".to_string(), 5)].into(),
            ..Default::default()
        };
        let aggs = AggregationsBuilder::new(&options).build();
        // sum aggregations carry no size
        assert_eq!(aggs["view_count"], json!({ "sum": { "field": "view_count" } }));
    }
}
