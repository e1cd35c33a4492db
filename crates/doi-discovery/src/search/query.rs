//! Composite search query construction.
//!
//! Compiles an optional free-text query plus [`SearchOptions`] into the
//! single document sent to the index: boosted full-text must clause,
//! AND-combined filters, OR-semantics should groups, selected facets,
//! fixed sort, and `search_after` pagination.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value, json};

use crate::config::query::{QUERY_FIELDS, QUERY_SUBSTITUTIONS};
use crate::identifiers::{doi_from_url, ror_from_url};

use super::aggregations::AggregationsBuilder;
use super::cursor::Cursor;
use super::filters::FilterBuilder;
use super::options::{SearchOptions, split_values};

static PUBLISHER_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"publisher\.(name|publisherIdentifier|publisherIdentifierScheme|schemeUri|lang)")
        .expect("valid publisher attribute regex")
});

/// Should clauses plus the shared `minimum_should_match` threshold.
struct ShouldClause {
    should: Vec<Value>,
    minimum_should_match: i64,
}

/// Compiles one request into a full search query document.
pub struct QueryBuilder<'a> {
    query: Option<&'a str>,
    options: &'a SearchOptions,
}

impl<'a> QueryBuilder<'a> {
    #[must_use]
    pub fn new(query: Option<&'a str>, options: &'a SearchOptions) -> Self {
        Self { query, options }
    }

    /// Build the complete query document. Empty top-level keys are
    /// omitted before the document is sent to the index.
    #[must_use]
    pub fn build_full_search_query(&self) -> Value {
        let mut document = Map::new();
        document.insert("size".into(), json!(self.size()));
        document.insert("search_after".into(), self.cursor().to_search_after());
        document.insert("sort".into(), self.sort());
        document.insert("query".into(), self.inner_query());

        let aggregations = AggregationsBuilder::new(self.options).build();
        if !aggregations.is_empty() {
            document.insert("aggregations".into(), Value::Object(aggregations));
        }
        document.insert("track_total_hits".into(), json!(true));

        Value::Object(document)
    }

    /// Page size; 0 (the default) is valid for aggregation-only queries.
    #[must_use]
    pub fn size(&self) -> i64 {
        self.options.page.clamped_size()
    }

    /// Fixed tie-broken sort. Never client-overridable on this path, so
    /// deep pagination stays deterministic.
    fn sort(&self) -> Value {
        json!([{ "created": "asc", "uid": "asc" }])
    }

    /// The decoded `search_after` cursor; absent or malformed input
    /// degrades to the start of the result set.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        match self.options.page.cursor.as_deref() {
            None | Some("") => Cursor::default(),
            Some(token) => Cursor::decode(token),
        }
    }

    /// Rewrite camelCase API field names to the index's underscore names
    /// and escape forward slashes, so a DOI in the query is not parsed as
    /// a path expression.
    #[must_use]
    pub fn clean_query(&self) -> String {
        let Some(raw) = self.query else { return String::new() };
        if raw.trim().is_empty() {
            return String::new();
        }

        let mut cleaned = raw.to_string();
        for (from, to) in QUERY_SUBSTITUTIONS {
            cleaned = cleaned.replace(from, to);
        }
        cleaned = PUBLISHER_ATTR_RE.replace_all(&cleaned, "publisher_obj.$1").into_owned();
        cleaned.replace('/', "\\/")
    }

    fn must(&self) -> Vec<Value> {
        let cleaned = self.clean_query();
        if cleaned.is_empty() {
            vec![json!({ "match_all": {} })]
        } else {
            vec![json!({
                "query_string": {
                    "query": cleaned,
                    "fields": QUERY_FIELDS,
                    "default_operator": "AND",
                    "phrase_slop": 1
                }
            })]
        }
    }

    /// All OR-semantics groups share one `minimum_should_match` flag: any
    /// non-empty group sets it to 1, and a hit then only needs to satisfy
    /// one should clause across all groups. Known broadening, kept
    /// deliberately.
    fn should_clause(&self) -> ShouldClause {
        let options = self.options;
        let mut should = Vec::new();
        let mut minimum_should_match = 0;

        if let Some(provider_id) = &options.provider_id {
            for id in split_values(provider_id) {
                should.push(json!({ "term": {
                    "provider_id": { "value": id, "case_insensitive": true }
                } }));
            }
            minimum_should_match = 1;
        }
        if let Some(client_id) = &options.client_id {
            for id in split_values(client_id) {
                should.push(json!({ "term": {
                    "client_id": { "value": id, "case_insensitive": true }
                } }));
            }
            minimum_should_match = 1;
        }

        // match either one of has_organization, has_affiliation,
        // has_funder or has_member
        if options.has_organization {
            should
                .push(json!({ "term": { "creators.nameIdentifiers.nameIdentifierScheme": "ROR" } }));
            should.push(
                json!({ "term": { "contributors.nameIdentifiers.nameIdentifierScheme": "ROR" } }),
            );
            minimum_should_match = 1;
        }
        if options.has_affiliation {
            should.push(
                json!({ "term": { "creators.affiliation.affiliationIdentifierScheme": "ROR" } }),
            );
            should.push(
                json!({ "term": { "contributors.affiliation.affiliationIdentifierScheme": "ROR" } }),
            );
            minimum_should_match = 1;
        }
        if options.has_funder {
            should.push(
                json!({ "term": { "funding_references.funderIdentifierType": "Crossref Funder ID" } }),
            );
            minimum_should_match = 1;
        }
        if options.has_member {
            should.push(json!({ "exists": { "field": "provider.ror_id" } }));
            minimum_should_match = 1;
        }

        // match a specific ROR ID or Crossref Funder ID
        if let Some(organization_id) = &options.organization_id {
            let ror = ror_from_url(organization_id).unwrap_or_default();
            should.push(json!({ "term": {
                "creators.nameIdentifiers.nameIdentifier": format!("https://{ror}")
            } }));
            should.push(json!({ "term": {
                "contributors.nameIdentifiers.nameIdentifier": format!("https://{ror}")
            } }));
            should.push(json!({ "term": { "organization_id": ror } }));
            minimum_should_match = 1;
        }
        if let Some(fair_organization_id) = &options.fair_organization_id {
            let ror = ror_from_url(fair_organization_id).unwrap_or_default();
            should.push(json!({ "term": { "organization_id": ror } }));
            should.push(json!({ "term": { "affiliation_id": ror } }));
            should.push(json!({ "term": { "related_dmp_organization_id": ror } }));
            minimum_should_match = 1;
        }
        if let Some(affiliation_id) = &options.affiliation_id {
            let ror = ror_from_url(affiliation_id).unwrap_or_default();
            should.push(json!({ "term": { "affiliation_id": ror } }));
            minimum_should_match = 1;
        }
        if let Some(funder_id) = &options.funder_id {
            let funder_dois: Vec<String> = split_values(funder_id)
                .iter()
                .filter_map(|id| doi_from_url(id))
                .map(|doi| format!("https://doi.org/{doi}"))
                .collect();
            should
                .push(json!({ "terms": { "funding_references.funderIdentifier": funder_dois } }));
            minimum_should_match = 1;
        }
        if let Some(member_id) = &options.member_id {
            let ror = ror_from_url(member_id).unwrap_or_default();
            should.push(json!({ "term": { "provider.ror_id": format!("https://{ror}") } }));
            minimum_should_match = 1;
        }

        ShouldClause { should, minimum_should_match }
    }

    fn inner_query(&self) -> Value {
        let should = self.should_clause();
        let mut bool_query = Map::new();
        bool_query.insert("must".into(), Value::Array(self.must()));

        let filters = FilterBuilder::new(self.options).build();
        if !filters.is_empty() {
            bool_query.insert("filter".into(), Value::Array(filters));
        }
        if !should.should.is_empty() {
            bool_query.insert("should".into(), Value::Array(should.should));
            bool_query
                .insert("minimum_should_match".into(), json!(should.minimum_should_match));
        }

        json!({ "bool": bool_query })
    }
}
