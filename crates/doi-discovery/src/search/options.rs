//! Typed request options for the search query builder.
//!
//! Every supported filter is an explicit optional field here, so the set
//! of filters is statically enumerable and each one is testable in
//! isolation. Multi-value options stay comma-separated strings, as they
//! arrive at the API boundary; splitting happens in the clause builders.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::query::MAX_PAGE_SIZE;

/// Cursor-based page parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Requested page size. Zero is valid for aggregation-only queries.
    #[serde(default)]
    pub size: Option<i64>,

    /// Opaque cursor from the previous page, if any.
    #[serde(default)]
    pub cursor: Option<String>,
}

impl Page {
    /// Page size clamped to `[0, 10000]`, defaulting to 0.
    ///
    /// Out-of-range input is recovered locally rather than rejected.
    #[must_use]
    pub fn clamped_size(&self) -> i64 {
        self.size.unwrap_or(0).clamp(0, MAX_PAGE_SIZE)
    }
}

/// All supported search options.
///
/// An absent field is the absence of a constraint, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOptions {
    // Term/terms filters
    /// Comma-separated list of DOIs to restrict the result set to.
    pub ids: Option<String>,
    pub uid: Option<String>,
    /// Resource type id in camelCase API form, e.g. `JournalArticle`.
    pub resource_type_id: Option<String>,
    /// Comma-separated resource type names, e.g. `Dataset,Software`.
    pub resource_type: Option<String>,
    pub agency: Option<String>,
    pub prefix: Option<String>,
    pub language: Option<String>,
    /// Metadata schema version suffix, e.g. `4`.
    pub schema_version: Option<String>,
    pub subject: Option<String>,
    pub license: Option<String>,
    pub source: Option<String>,
    pub state: Option<String>,
    pub consortium_id: Option<String>,
    pub re3data_id: Option<String>,
    pub opendoar_id: Option<String>,
    pub certificate: Option<String>,
    /// Comma-separated ORCID iDs (bare or URL form).
    pub user_id: Option<String>,
    pub client_type: Option<String>,

    // Year-range filters, comma-separated bounds
    pub created: Option<String>,
    pub published: Option<String>,
    pub registered: Option<String>,

    // Count thresholds; the value is the minimum count
    pub has_references: Option<String>,
    pub has_citations: Option<String>,
    pub has_parts: Option<String>,
    pub has_part_of: Option<String>,
    pub has_versions: Option<String>,
    pub has_version_of: Option<String>,
    pub has_views: Option<String>,
    pub has_downloads: Option<String>,

    // Landing page link checker filters
    pub link_check_status: Option<String>,
    pub link_checked: bool,
    pub link_check_has_schema_org: Option<String>,
    pub link_check_body_has_pid: Option<String>,
    pub link_check_found_schema_org_id: bool,
    pub link_check_found_dc_identifier: bool,
    pub link_check_found_citation_doi: bool,
    pub link_check_redirect_count_gte: Option<i64>,

    // Presence flags
    pub has_person: bool,

    // Composite filters
    pub pid_entity: Option<String>,
    pub field_of_science: Option<String>,
    pub field_of_science_repository: Option<String>,
    pub field_of_science_combined: Option<String>,

    // Should-clause options (OR-semantics groups)
    pub provider_id: Option<String>,
    pub client_id: Option<String>,
    pub has_organization: bool,
    pub has_affiliation: bool,
    pub has_funder: bool,
    pub has_member: bool,
    pub organization_id: Option<String>,
    pub fair_organization_id: Option<String>,
    pub affiliation_id: Option<String>,
    pub funder_id: Option<String>,
    pub member_id: Option<String>,

    // Facet selection and sizing
    /// Global default bucket size for terms facets; 0 disables facets.
    pub facet_count: Option<i64>,
    /// `all`, `none`, or a comma-separated list of facet names.
    pub include_aggregations: Option<String>,
    /// Per-facet size overrides; non-positive values are ignored.
    pub facet_sizes: HashMap<String, i64>,

    // Pagination
    pub page: Page,
}

/// Comma-split a multi-value option, dropping empty segments.
pub(crate) fn split_values(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}

/// Lenient integer coercion with Ruby `to_i` semantics: the leading
/// integer prefix, or 0 when there is none.
pub(crate) fn coerce_i64(value: &str) -> i64 {
    let trimmed = value.trim();
    let end = trimmed
        .char_indices()
        .take_while(|&(i, c)| c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    trimmed[..end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_clamping() {
        assert_eq!(Page::default().clamped_size(), 0);
        assert_eq!(Page { size: Some(25), cursor: None }.clamped_size(), 25);
        assert_eq!(Page { size: Some(-5), cursor: None }.clamped_size(), 0);
        assert_eq!(Page { size: Some(50_000), cursor: None }.clamped_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_split_values() {
        assert_eq!(split_values("Dataset,Software"), vec!["Dataset", "Software"]);
        assert_eq!(split_values("Dataset, ,Software,"), vec!["Dataset", "Software"]);
    }

    #[test]
    fn test_coerce_i64() {
        assert_eq!(coerce_i64("1"), 1);
        assert_eq!(coerce_i64("42abc"), 42);
        assert_eq!(coerce_i64("-3"), -3);
        assert_eq!(coerce_i64("true"), 0);
        assert_eq!(coerce_i64(""), 0);
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let options: SearchOptions = serde_json::from_value(serde_json::json!({
            "resourceType": "Dataset",
            "hasCitations": "1",
            "facetCount": 5,
            "page": { "size": 10, "cursor": "MTIzNCwxMC4xL3h5eg" }
        }))
        .unwrap();

        assert_eq!(options.resource_type.as_deref(), Some("Dataset"));
        assert_eq!(options.has_citations.as_deref(), Some("1"));
        assert_eq!(options.facet_count, Some(5));
        assert_eq!(options.page.clamped_size(), 10);
    }
}
