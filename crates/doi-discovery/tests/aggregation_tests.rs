//! Facet selection and sizing tests.

use serde_json::json;

use doi_discovery::search::{
    AggregationsBuilder, SearchOptions, aggregation_definitions, all_aggregation_keys,
};

#[test]
fn test_default_build_selects_whole_catalog() {
    let options = SearchOptions::default();
    let aggs = AggregationsBuilder::new(&options).build();
    assert_eq!(aggs.len(), all_aggregation_keys().len());
    assert!(aggs.contains_key("resource_types"));
    assert!(aggs.contains_key("client_types"));
}

#[test]
fn test_global_facet_count_resizes_terms_facets() {
    let options = SearchOptions { facet_count: Some(50), ..Default::default() };
    let aggs = AggregationsBuilder::new(&options).build();

    assert_eq!(aggs["clients"]["terms"]["size"], json!(50));
    assert_eq!(aggs["languages"]["terms"]["size"], json!(50));
    // sum aggregations have no size to resize
    assert_eq!(aggs["view_count"], json!({ "sum": { "field": "view_count" } }));
}

#[test]
fn test_per_facet_override_beats_global_count() {
    let options = SearchOptions {
        facet_count: Some(50),
        facet_sizes: [("clients".to_string(), 100)].into(),
        ..Default::default()
    };
    let aggs = AggregationsBuilder::new(&options).build();

    assert_eq!(aggs["clients"]["terms"]["size"], json!(100));
    assert_eq!(aggs["languages"]["terms"]["size"], json!(50));
}

#[test]
fn test_override_with_default_global_leaves_others_at_default() {
    let options = SearchOptions {
        facet_sizes: [("clients".to_string(), 25)].into(),
        ..Default::default()
    };
    let aggs = AggregationsBuilder::new(&options).build();

    assert_eq!(aggs["clients"]["terms"]["size"], json!(25));
    assert_eq!(aggs["languages"]["terms"]["size"], json!(10));
}

#[test]
fn test_non_positive_override_ignored() {
    let options = SearchOptions {
        facet_sizes: [("clients".to_string(), -5)].into(),
        ..Default::default()
    };
    let aggs = AggregationsBuilder::new(&options).build();
    assert_eq!(aggs["clients"]["terms"]["size"], json!(10));
}

#[test]
fn test_sequential_builds_do_not_share_state() {
    let resized = SearchOptions {
        facet_sizes: [("clients".to_string(), 100)].into(),
        ..Default::default()
    };
    let first = AggregationsBuilder::new(&resized).build();
    assert_eq!(first["clients"]["terms"]["size"], json!(100));

    // a later default build must see the pristine catalog
    let defaults = SearchOptions::default();
    let second = AggregationsBuilder::new(&defaults).build();
    assert_eq!(second["clients"]["terms"]["size"], json!(10));

    let catalog = aggregation_definitions();
    assert_eq!(catalog["clients"]["terms"]["size"], json!(10));
}

#[test]
fn test_named_selection_keeps_only_known_facets() {
    let options = SearchOptions {
        include_aggregations: Some("published,funders,bogus".into()),
        ..Default::default()
    };
    let aggs = AggregationsBuilder::new(&options).build();

    assert_eq!(aggs.len(), 2);
    assert!(aggs.contains_key("published"));
    assert!(aggs.contains_key("funders"));
}

#[test]
fn test_none_and_zero_count_disable_facets() {
    let none = SearchOptions { include_aggregations: Some("none".into()), ..Default::default() };
    assert!(AggregationsBuilder::new(&none).build().is_empty());

    let zero = SearchOptions { facet_count: Some(0), ..Default::default() };
    assert!(AggregationsBuilder::new(&zero).build().is_empty());
}

#[test]
fn test_filtered_sub_aggregation_shape() {
    let aggs = aggregation_definitions();

    // pid_entities is a filter aggregation with a nested subject terms agg
    assert_eq!(
        aggs["pid_entities"]["filter"],
        json!({ "term": { "subjects.subjectScheme": "PidEntity" } })
    );
    assert_eq!(aggs["pid_entities"]["aggs"]["subject"]["terms"]["field"], json!("subjects.subject"));
}
