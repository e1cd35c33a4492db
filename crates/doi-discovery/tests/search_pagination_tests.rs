//! Search client and cursor pagination tests using wiremock.

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doi_discovery::config::Config;
use doi_discovery::connection::{Connection, ConnectionArgs};
use doi_discovery::error::ClientError;
use doi_discovery::search::{Cursor, Page, QueryBuilder, SearchClient, SearchOptions};

fn setup_client(mock_server: &MockServer) -> SearchClient {
    SearchClient::new(&Config::for_testing(&mock_server.uri())).unwrap()
}

/// A search response body with `count` hits out of `total`.
fn search_body(total: i64, count: i64) -> Value {
    let hits: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "_source": { "uid": format!("10.1/{i}"), "doi": format!("10.1/{i}") },
                "sort": [1_594_897_200_000_i64 + i, format!("10.1/{i}")]
            })
        })
        .collect();
    json!({
        "hits": { "total": { "value": total, "relation": "eq" }, "hits": hits },
        "aggregations": {
            "clients": { "buckets": [{ "key": "dryad.dryad:Dryad", "doc_count": 7 }] }
        }
    })
}

#[tokio::test]
async fn test_search_decodes_hits_and_aggregations() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dois/_search"))
        .and(body_partial_json(json!({ "track_total_hits": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(42, 2)))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let options =
        SearchOptions { page: Page { size: Some(2), cursor: None }, ..Default::default() };
    let query = QueryBuilder::new(Some("climate"), &options).build_full_search_query();
    let response = client.search::<Value>(&query).await.unwrap();

    assert_eq!(response.total(), 42);
    assert_eq!(response.nodes().len(), 2);
    assert_eq!(response.nodes()[0].source["uid"], json!("10.1/0"));

    let buckets = response.terms_buckets("clients");
    assert_eq!(buckets[0].key, "dryad.dryad:Dryad");
    assert_eq!(buckets[0].doc_count, 7);
}

#[tokio::test]
async fn test_bad_request_maps_to_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dois/_search"))
        .respond_with(ResponseTemplate::new(400).set_body_string("parsing_exception"))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let query = QueryBuilder::new(None, &SearchOptions::default()).build_full_search_query();
    let err = client.search::<Value>(&query).await.unwrap_err();
    assert!(matches!(err, ClientError::BadRequest { .. }));
}

#[tokio::test]
async fn test_missing_index_maps_to_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dois/_search"))
        .respond_with(ResponseTemplate::new(404).set_body_string("index_not_found_exception"))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let query = QueryBuilder::new(None, &SearchOptions::default()).build_full_search_query();
    let err = client.search::<Value>(&query).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));
}

// =============================================================================
// Connection page info
// =============================================================================

#[tokio::test]
async fn test_partial_page_reports_no_next_page() {
    let mock_server = MockServer::start().await;

    // 10 of 1000 results come back for a first=25 request
    Mock::given(method("POST"))
        .and(path("/dois/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(1000, 10)))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let args = ConnectionArgs { first: Some(25), after: None };
    let options = SearchOptions {
        page: Page { size: Some(args.page_size(1000)), cursor: None },
        ..Default::default()
    };
    let query = QueryBuilder::new(None, &options).build_full_search_query();
    let response = client.search::<Value>(&query).await.unwrap();

    let connection = Connection::new(response, &args);
    assert_eq!(connection.total_count(), 1000);
    assert!(!connection.has_next_page());
}

#[tokio::test]
async fn test_full_page_resumes_from_end_cursor() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dois/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(1000, 25)))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let args = ConnectionArgs { first: Some(25), after: None };
    let options = SearchOptions {
        page: Page { size: Some(args.page_size(1000)), cursor: None },
        ..Default::default()
    };
    let query = QueryBuilder::new(None, &options).build_full_search_query();
    let response = client.search::<Value>(&query).await.unwrap();

    let connection = Connection::new(response, &args);
    assert!(connection.has_next_page());

    // the end cursor decodes to the last hit's sort tuple
    let token = connection.end_cursor().unwrap();
    assert_eq!(Cursor::decode(&token), Cursor::new(1_594_897_200_024, "10.1/24"));

    // and feeds the next page's search_after
    let next_options = SearchOptions {
        page: Page { size: Some(25), cursor: Some(token) },
        ..Default::default()
    };
    let next_query = QueryBuilder::new(None, &next_options).build_full_search_query();
    assert_eq!(next_query["search_after"], json!([1_594_897_200_024_i64, "10.1/24"]));
}
