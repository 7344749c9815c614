//! Integration tests for the semantic index REST API.
//!
//! Uses a mock triple-store (no network) to test handler logic via
//! tower::ServiceExt (no TCP listener needed).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use semindex_config::SemindexConfig;
use semindex_core::{Entity, EntityCatalog, RawRow};
use semindex_server::handlers;
use semindex_server::state::AppState;
use semindex_sparql::{QueryMethod, QueryStore, SparqlError, TripleStore};

// ---------------------------------------------------------------------------
// Mock triple-store
// ---------------------------------------------------------------------------

enum Outcome {
    Rows(Vec<RawRow>),
    Unavailable,
    Timeout,
}

/// Records every executed query and answers by substring match: the first
/// configured needle contained in the query decides the outcome. Queries
/// matching nothing get an empty result set.
struct MockTripleStore {
    executed: Mutex<Vec<(String, QueryMethod)>>,
    outcomes: Vec<(String, Outcome)>,
}

impl MockTripleStore {
    fn new() -> Self {
        Self {
            executed: Mutex::new(Vec::new()),
            outcomes: Vec::new(),
        }
    }

    fn with_rows(mut self, needle: &str, rows: Vec<RawRow>) -> Self {
        self.outcomes.push((needle.to_string(), Outcome::Rows(rows)));
        self
    }

    fn with_failure(mut self, needle: &str) -> Self {
        self.outcomes
            .push((needle.to_string(), Outcome::Unavailable));
        self
    }

    fn with_timeout(mut self, needle: &str) -> Self {
        self.outcomes.push((needle.to_string(), Outcome::Timeout));
        self
    }

    fn executed(&self) -> Vec<(String, QueryMethod)> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl TripleStore for MockTripleStore {
    async fn execute(&self, query: &str, method: QueryMethod) -> Result<Vec<RawRow>, SparqlError> {
        self.executed
            .lock()
            .unwrap()
            .push((query.to_string(), method));
        for (needle, outcome) in &self.outcomes {
            if query.contains(needle.as_str()) {
                return match outcome {
                    Outcome::Rows(rows) => Ok(rows.clone()),
                    Outcome::Unavailable => {
                        Err(SparqlError::EndpointUnavailable("mock failure".into()))
                    }
                    Outcome::Timeout => Err(SparqlError::Timeout("mock timeout".into())),
                };
            }
        }
        Ok(Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn entity(uri: &str, label: &str) -> Entity {
    Entity {
        entity_uri: uri.to_string(),
        entity_label: label.to_string(),
        entity_pref_label: None,
        entity_type: String::new(),
        count: 0,
    }
}

fn test_catalog() -> EntityCatalog {
    let mut catalog = EntityCatalog::from_entries(
        "agrovocdescr",
        vec![
            entity("http://vocab/c_1", "Coffee"),
            entity("http://vocab/c_2", "Coffee Rust"),
            entity("http://vocab/c_3", "Arabica Coffee"),
            entity("http://vocab/c_4", "Maize"),
        ],
    );
    catalog.push_source(
        "wikidata",
        vec![
            entity("http://wd/Q1", "Coffea arabica"),
            entity("http://wd/Q2", "Wheat"),
        ],
    );
    catalog
}

fn test_queries() -> QueryStore {
    QueryStore::from_templates([
        ("getArticleMetadata.sparql", "SELECT * WHERE { <{id}> a ?t } # metadata"),
        ("getArticleAuthors.sparql", "SELECT * WHERE { <{id}> a ?t } # authors"),
        ("getNamedEntities.sparql", "SELECT * WHERE { <{id}> a ?t } # named-entities"),
        (
            "getGeographicNamedEntities.sparql",
            "SELECT * WHERE { <{id}> a ?t } # geographic",
        ),
        ("getArticleDescriptors.sparql", "SELECT * WHERE { <{id}> a ?t } # descriptors"),
        ("searchArticleByDescriptor.sparql", "SELECT * WHERE {\n{triples}} # search"),
        (
            "searchArticleByDescriptorExtended.sparql",
            "SELECT * WHERE {\n{triples}} # search-extended",
        ),
    ])
}

fn make_state(store: Arc<MockTripleStore>) -> Arc<AppState> {
    let config = SemindexConfig::default();
    Arc::new(AppState::new(test_catalog(), test_queries(), store, config))
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route(
            "/getArticleMetadata/",
            get(handlers::get_article_metadata_handler),
        )
        .route(
            "/getArticleAuthors/",
            get(handlers::get_article_authors_handler),
        )
        .route(
            "/getAbstractNamedEntities/",
            get(handlers::get_abstract_named_entities_handler),
        )
        .route(
            "/getGeographicNamedEntities/",
            get(handlers::get_geographic_named_entities_handler),
        )
        .route(
            "/getArticleDescriptors/",
            get(handlers::get_article_descriptors_handler),
        )
        .route("/autoComplete/", get(handlers::auto_complete_handler))
        .route(
            "/searchDocumentsByDescriptor/",
            get(handlers::search_documents_by_descriptor_handler),
        )
        .route(
            "/searchDocumentsByDescriptorSubConcept/",
            get(handlers::search_documents_by_descriptor_sub_concept_handler),
        )
        .route(
            "/searchDocumentsByDescriptorRelated/",
            get(handlers::search_documents_by_descriptor_related_handler),
        )
        .with_state(state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn row(pairs: &[(&str, &str)]) -> RawRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<HashMap<_, _>>()
}

// ---------------------------------------------------------------------------
// Health & Metrics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let store = Arc::new(MockTripleStore::new());
    let state = make_state(store);

    let (status, body) = get_json(app(state), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["catalog_entities"], 6);
    let sources: Vec<&str> = body["catalog_sources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(sources, vec!["agrovocdescr", "wikidata"]);
}

#[tokio::test]
async fn test_metrics_shape() {
    let store = Arc::new(MockTripleStore::new());
    let state = make_state(store);

    let (status, body) = get_json(app(state), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_queries"], 0);
    assert_eq!(body["total_searches"], 0);
    assert!(body["uptime_secs"].is_u64());
}

// ---------------------------------------------------------------------------
// Document query relays
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_get_article_metadata_relays_rows() {
    let store = Arc::new(MockTripleStore::new().with_rows(
        "# metadata",
        vec![row(&[("title", "Coffee leaf rust"), ("date", "2021")])],
    ));
    let state = make_state(store.clone());

    let (status, body) = get_json(
        app(state),
        "/getArticleMetadata/?uri=http://data/doc1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"][0]["title"], "Coffee leaf rust");
    assert_eq!(body["result"][0]["date"], "2021");

    // The template was rendered with the document URI and sent as GET.
    let executed = store.executed();
    assert_eq!(executed.len(), 1);
    assert!(executed[0].0.contains("<http://data/doc1>"));
    assert_eq!(executed[0].1, QueryMethod::Get);
}

#[tokio::test]
async fn test_abstract_named_entities_appends_fragment() {
    let store = Arc::new(MockTripleStore::new());
    let state = make_state(store.clone());

    let (status, _) = get_json(
        app(state),
        "/getAbstractNamedEntities/?uri=http://data/doc1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let executed = store.executed();
    assert_eq!(executed.len(), 1);
    assert!(executed[0].0.contains("<http://data/doc1#abstract>"));
}

#[tokio::test]
async fn test_geographic_named_entities_uses_post() {
    let store = Arc::new(MockTripleStore::new());
    let state = make_state(store.clone());

    let (status, _) = get_json(
        app(state),
        "/getGeographicNamedEntities/?uri=http://data/doc1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let executed = store.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].1, QueryMethod::Post);
}

#[tokio::test]
async fn test_upstream_failure_maps_to_502() {
    let store = Arc::new(MockTripleStore::new().with_failure("# authors"));
    let state = make_state(store);

    let (status, body) = get_json(
        app(state),
        "/getArticleAuthors/?uri=http://data/doc1",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "UPSTREAM_UNAVAILABLE");
}

#[tokio::test]
async fn test_upstream_timeout_maps_to_504() {
    let store = Arc::new(MockTripleStore::new().with_timeout("# metadata"));
    let state = make_state(store);

    let (status, body) = get_json(
        app(state),
        "/getArticleMetadata/?uri=http://data/doc1",
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["code"], "UPSTREAM_TIMEOUT");
}

// ---------------------------------------------------------------------------
// Autocomplete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_autocomplete_ranks_prefix_before_substring() {
    let store = Arc::new(MockTripleStore::new());
    let state = make_state(store);

    let (status, body) = get_json(app(state), "/autoComplete/?input=coff").await;
    assert_eq!(status, StatusCode::OK);

    let labels: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["entityLabel"].as_str().unwrap())
        .collect();
    // Prefix matches first (alphabetically), then substring matches.
    assert_eq!(
        labels,
        vec!["Coffea arabica", "Coffee", "Coffee Rust", "Arabica Coffee"]
    );
}

#[tokio::test]
async fn test_autocomplete_filters_by_source_tag() {
    let store = Arc::new(MockTripleStore::new());
    let state = make_state(store);

    let (status, body) =
        get_json(app(state), "/autoComplete/?input=coff&entityType=wikidata").await;
    assert_eq!(status, StatusCode::OK);

    let labels: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["entityLabel"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Coffea arabica"]);
}

#[tokio::test]
async fn test_autocomplete_unknown_tag_is_400() {
    let store = Arc::new(MockTripleStore::new());
    let state = make_state(store);

    let (status, body) =
        get_json(app(state), "/autoComplete/?input=coff&entityType=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ARGUMENT");
    assert_eq!(
        body["message"],
        "invalid value 'bogus' for argument entityType"
    );
}

// ---------------------------------------------------------------------------
// Descriptor search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_search_without_uris_returns_empty() {
    let store = Arc::new(MockTripleStore::new());
    let state = make_state(store.clone());

    let (status, body) = get_json(app(state), "/searchDocumentsByDescriptor/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], serde_json::json!([]));
    // No query is dispatched for an empty URI list.
    assert!(store.executed().is_empty());
}

#[tokio::test]
async fn test_search_plain_sends_one_query_with_all_patterns() {
    let store = Arc::new(MockTripleStore::new().with_rows(
        "# search",
        vec![row(&[
            ("document", "http://data/doc1"),
            ("title", "Coffee agronomy"),
            ("date", "2020"),
            ("authors", "Ann$$Bob"),
        ])],
    ));
    let state = make_state(store.clone());

    let (status, body) = get_json(
        app(state),
        "/searchDocumentsByDescriptor/?uri=http://vocab/c_1,http://vocab/c_2",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // One query carrying a triple pattern per URI.
    let executed = store.executed();
    assert_eq!(executed.len(), 1);
    assert!(executed[0].0.contains("<http://vocab/c_1>"));
    assert!(executed[0].0.contains("<http://vocab/c_2>"));

    let doc = &body["result"][0];
    assert_eq!(doc["document"], "http://data/doc1");
    assert_eq!(doc["title"], "Coffee agronomy");
    assert_eq!(doc["authors"], serde_json::json!(["Ann", "Bob"]));
    // The plain search does not decode matched entities.
    assert!(doc.get("matchedEntities").is_none());
}

#[tokio::test]
async fn test_search_sub_concept_intersects_and_merges() {
    let store = Arc::new(
        MockTripleStore::new()
            .with_rows(
                "<http://vocab/c_1>",
                vec![
                    row(&[
                        ("document", "http://data/doc1"),
                        ("title", "Doc one"),
                        ("matchedEntities", "http://vocab/c_1$Coffee"),
                    ]),
                    row(&[
                        ("document", "http://data/doc2"),
                        ("title", "Doc two"),
                        ("matchedEntities", "http://vocab/c_1$Coffee"),
                    ]),
                ],
            )
            .with_rows(
                "<http://vocab/c_4>",
                vec![
                    row(&[
                        ("document", "http://data/doc2"),
                        ("title", "Doc two"),
                        ("matchedEntities", "http://vocab/c_4$Maize"),
                    ]),
                    row(&[
                        ("document", "http://data/doc3"),
                        ("title", "Doc three"),
                        ("matchedEntities", "http://vocab/c_4$Maize"),
                    ]),
                ],
            ),
    );
    let state = make_state(store.clone());

    let (status, body) = get_json(
        app(state),
        "/searchDocumentsByDescriptorSubConcept/?uri=http://vocab/c_1,http://vocab/c_4",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // One query per URI.
    assert_eq!(store.executed().len(), 2);

    // Only doc2 appears in both result sets; its matches are merged.
    let result = body["result"].as_array().unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0]["document"], "http://data/doc2");
    let matched = result[0]["matchedEntities"].as_array().unwrap();
    let labels: Vec<&str> = matched
        .iter()
        .map(|m| m["entityLabel"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Coffee", "Maize"]);
}

#[tokio::test]
async fn test_search_failed_branch_empties_intersection() {
    let store = Arc::new(
        MockTripleStore::new()
            .with_rows(
                "<http://vocab/c_1>",
                vec![row(&[
                    ("document", "http://data/doc1"),
                    ("title", "Doc one"),
                ])],
            )
            .with_failure("<http://vocab/c_4>"),
    );
    let state = make_state(store);

    let (status, body) = get_json(
        app(state),
        "/searchDocumentsByDescriptorRelated/?uri=http://vocab/c_1,http://vocab/c_4",
    )
    .await;
    // A failed branch contributes an empty set, not an error response.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], serde_json::json!([]));
}

#[tokio::test]
async fn test_search_too_many_uris_is_400() {
    let store = Arc::new(MockTripleStore::new());
    let state = make_state(store.clone());

    // Default limit is 10 URIs.
    let uris: Vec<String> = (0..11).map(|i| format!("http://vocab/c_{}", i)).collect();
    let uri = format!("/searchDocumentsByDescriptor/?uri={}", uris.join(","));

    let (status, body) = get_json(app(state), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ARGUMENT");
    assert!(store.executed().is_empty());
}

#[tokio::test]
async fn test_search_accepts_repeated_uri_params() {
    let store = Arc::new(MockTripleStore::new());
    let state = make_state(store.clone());

    let (status, _) = get_json(
        app(state),
        "/searchDocumentsByDescriptor/?uri=http://vocab/c_1&uri=http://vocab/c_2",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let executed = store.executed();
    assert_eq!(executed.len(), 1);
    assert!(executed[0].0.contains("<http://vocab/c_1>"));
    assert!(executed[0].0.contains("<http://vocab/c_2>"));
}
