//! Filter clause construction.
//!
//! Each option maps to zero or one structured filter clause (two for the
//! composite subject-scheme filters). Absent options produce no clause,
//! so the filter set is sparse and all clauses are AND-combined by the
//! enclosing bool query. Building is a pure function of the options with
//! a fixed declaration order.

use serde_json::{Value, json};
use tracing::warn;

use crate::identifiers::{doi_from_url, orcid_from_url};
use crate::strings::{humanize, underscore_dasherize};

use super::options::{SearchOptions, coerce_i64, split_values};

/// Compiles [`SearchOptions`] into the AND-combined filter clause list.
pub struct FilterBuilder<'a> {
    options: &'a SearchOptions,
}

impl<'a> FilterBuilder<'a> {
    #[must_use]
    pub fn new(options: &'a SearchOptions) -> Self {
        Self { options }
    }

    /// Build the filter clause list in fixed declaration order.
    #[must_use]
    pub fn build(&self) -> Vec<Value> {
        let options = self.options;
        let mut filter = Vec::new();

        if let Some(ids) = &options.ids {
            let upcased: Vec<String> =
                split_values(ids).iter().map(|id| id.to_uppercase()).collect();
            filter.push(json!({ "terms": { "doi": upcased } }));
        }
        if let Some(uid) = &options.uid {
            filter.push(json!({ "terms": { "uid": [uid] } }));
        }
        if let Some(resource_type_id) = &options.resource_type_id {
            filter.push(
                json!({ "terms": { "resource_type_id": [underscore_dasherize(resource_type_id)] } }),
            );
        }
        if let Some(resource_type) = &options.resource_type {
            filter.push(json!({ "terms": { "types.resourceType": split_values(resource_type) } }));
        }
        if let Some(agency) = &options.agency {
            let downcased: Vec<String> =
                split_values(agency).iter().map(|a| a.to_lowercase()).collect();
            filter.push(json!({ "terms": { "agency": downcased } }));
        }
        if let Some(prefix) = &options.prefix {
            filter.push(json!({ "terms": { "prefix": split_values(prefix) } }));
        }
        if let Some(language) = &options.language {
            let downcased: Vec<String> =
                split_values(language).iter().map(|l| l.to_lowercase()).collect();
            filter.push(json!({ "terms": { "language": downcased } }));
        }
        if let Some(created) = &options.created {
            filter.push(year_range_filter("created", created));
        }
        if let Some(published) = &options.published {
            filter.push(year_range_filter("publication_year", published));
        }
        if let Some(schema_version) = &options.schema_version {
            filter.push(json!({ "terms": {
                "schema_version": [format!("http://datacite.org/schema/kernel-{schema_version}")]
            } }));
        }
        if let Some(subject) = &options.subject {
            filter.push(json!({ "terms": { "subjects.subject": split_values(subject) } }));
        }
        if let Some(license) = &options.license {
            filter
                .push(json!({ "terms": { "rights_list.rightsIdentifier": split_values(license) } }));
        }
        if let Some(source) = &options.source {
            filter.push(json!({ "terms": { "source": [source] } }));
        }
        if let Some(value) = &options.has_references {
            filter.push(json!({ "range": { "reference_count": { "gte": coerce_i64(value) } } }));
        }
        if let Some(value) = &options.has_citations {
            filter.push(json!({ "range": { "citation_count": { "gte": coerce_i64(value) } } }));
        }
        if let Some(value) = &options.has_parts {
            filter.push(json!({ "range": { "part_count": { "gte": coerce_i64(value) } } }));
        }
        if let Some(value) = &options.has_part_of {
            filter.push(json!({ "range": { "part_of_count": { "gte": coerce_i64(value) } } }));
        }
        if let Some(value) = &options.has_versions {
            filter.push(json!({ "range": { "version_count": { "gte": coerce_i64(value) } } }));
        }
        if let Some(value) = &options.has_version_of {
            filter.push(json!({ "range": { "version_of_count": { "gte": coerce_i64(value) } } }));
        }
        if let Some(value) = &options.has_views {
            filter.push(json!({ "range": { "view_count": { "gte": coerce_i64(value) } } }));
        }
        if let Some(value) = &options.has_downloads {
            filter.push(json!({ "range": { "download_count": { "gte": coerce_i64(value) } } }));
        }
        if let Some(status) = &options.link_check_status {
            filter.push(json!({ "terms": { "landing_page.status": [status] } }));
        }
        if options.link_checked {
            filter.push(json!({ "exists": { "field": "landing_page.checked" } }));
        }
        if let Some(value) = &options.link_check_has_schema_org {
            filter.push(json!({ "terms": { "landing_page.hasSchemaOrg": [value] } }));
        }
        if let Some(value) = &options.link_check_body_has_pid {
            filter.push(json!({ "terms": { "landing_page.bodyHasPid": [value] } }));
        }
        if options.link_check_found_schema_org_id {
            filter.push(json!({ "exists": { "field": "landing_page.schemaOrgId" } }));
        }
        if options.link_check_found_dc_identifier {
            filter.push(json!({ "exists": { "field": "landing_page.dcIdentifier" } }));
        }
        if options.link_check_found_citation_doi {
            filter.push(json!({ "exists": { "field": "landing_page.citationDoi" } }));
        }
        if let Some(count) = options.link_check_redirect_count_gte {
            filter.push(json!({ "range": { "landing_page.redirectCount": { "gte": count } } }));
        }
        if let Some(state) = &options.state {
            filter.push(json!({ "terms": { "aasm_state": split_values(state) } }));
        }
        if let Some(registered) = &options.registered {
            filter.push(year_range_filter("registered", registered));
        }
        if let Some(consortium_id) = &options.consortium_id {
            filter.push(json!({ "terms": { "consortium_id": [consortium_id.to_lowercase()] } }));
        }
        if let Some(re3data_id) = &options.re3data_id {
            filter.push(json!({ "terms": {
                "client.re3data_id": normalized_or_empty(doi_from_url(re3data_id), re3data_id)
            } }));
        }
        if let Some(opendoar_id) = &options.opendoar_id {
            filter.push(json!({ "terms": { "client.opendoar_id": [opendoar_id] } }));
        }
        if let Some(certificate) = &options.certificate {
            filter.push(json!({ "terms": { "client.certificate": split_values(certificate) } }));
        }
        if let Some(user_id) = &options.user_id {
            filter.push(json!({ "terms": {
                "creators.nameIdentifiers.nameIdentifier": orcid_urls(user_id)
            } }));
        }
        if options.has_person {
            filter.push(
                json!({ "terms": { "creators.nameIdentifiers.nameIdentifierScheme": ["ORCID"] } }),
            );
        }
        if let Some(client_type) = &options.client_type {
            filter.push(json!({ "terms": { "client.client_type": [client_type] } }));
            if client_type == "igsnCatalog" {
                filter
                    .push(json!({ "terms": { "types.resourceTypeGeneral": ["PhysicalObject"] } }));
            }
        }
        if let Some(pid_entity) = &options.pid_entity {
            filter.extend(pid_entity_filter(pid_entity));
        }
        if let Some(field_of_science) = &options.field_of_science {
            filter.extend(field_of_science_filter(field_of_science));
        }
        if let Some(value) = &options.field_of_science_repository {
            let humanized: Vec<String> = split_values(value).iter().map(|s| humanize(s)).collect();
            filter.push(json!({ "terms": { "fields_of_science_repository": humanized } }));
        }
        if let Some(value) = &options.field_of_science_combined {
            let humanized: Vec<String> = split_values(value).iter().map(|s| humanize(s)).collect();
            filter.push(json!({ "terms": { "fields_of_science_combined": humanized } }));
        }

        filter
    }
}

/// Inclusive year-granularity range: `gte` is the minimum of the
/// comma-separated bounds, `lte` the maximum; a single value yields a
/// single-year range.
fn year_range_filter(field: &str, value: &str) -> Value {
    let years: Vec<i64> = split_values(value).iter().map(|y| coerce_i64(y)).collect();
    let min = years.iter().min().copied().unwrap_or(0);
    let max = years.iter().max().copied().unwrap_or(0);
    json!({ "range": { field: {
        "gte": format!("{min:04}"),
        "lte": format!("{max:04}"),
        "format": "yyyy"
    } } })
}

/// Two AND-combined clauses: select the `PidEntity` subject scheme, then
/// match any of the humanized entity values.
fn pid_entity_filter(value: &str) -> Vec<Value> {
    let humanized: Vec<String> = split_values(value).iter().map(|s| humanize(s)).collect();
    vec![
        json!({ "terms": { "subjects.subjectScheme": ["PidEntity"] } }),
        json!({ "terms": { "subjects.subject": humanized } }),
    ]
}

/// Two AND-combined clauses for the OECD fields-of-science vocabulary.
fn field_of_science_filter(value: &str) -> Vec<Value> {
    let subjects: Vec<String> =
        split_values(value).iter().map(|s| format!("FOS: {}", humanize(s))).collect();
    vec![
        json!({ "terms": { "subjects.subjectScheme": ["Fields of Science and Technology (FOS)"] } }),
        json!({ "terms": { "subjects.subject": subjects } }),
    ]
}

/// ORCID URLs for a comma-separated id list. Malformed ids are dropped,
/// which leaves a filter that matches nothing rather than an error.
fn orcid_urls(user_id: &str) -> Vec<String> {
    split_values(user_id)
        .iter()
        .filter_map(|id| match orcid_from_url(id) {
            Some(orcid) => Some(format!("https://orcid.org/{orcid}")),
            None => {
                warn!(id = %id, "dropping malformed ORCID id from user filter");
                None
            }
        })
        .collect()
}

/// A one-element terms list, or an empty (match-nothing) list when
/// normalization failed.
fn normalized_or_empty(normalized: Option<String>, raw: &str) -> Vec<String> {
    match normalized {
        Some(value) => vec![value],
        None => {
            warn!(value = %raw, "identifier did not normalize; filter will match nothing");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_build_no_clauses() {
        let options = SearchOptions::default();
        assert!(FilterBuilder::new(&options).build().is_empty());
    }

    #[test]
    fn test_year_range_single_value() {
        let clause = year_range_filter("created", "2020");
        assert_eq!(
            clause,
            json!({ "range": { "created": { "gte": "2020", "lte": "2020", "format": "yyyy" } } })
        );
    }

    #[test]
    fn test_pid_entity_expands_to_two_clauses() {
        let clauses = pid_entity_filter("dataset,publication");
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[1], json!({ "terms": { "subjects.subject": ["Dataset", "Publication"] } }));
    }

    #[test]
    fn test_malformed_orcid_matches_nothing() {
        assert!(orcid_urls("not-an-orcid").is_empty());
    }
}
