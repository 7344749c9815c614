//! Axum route handlers for the semantic index REST API.
//!
//! The single-document endpoints are one parameterized relay: load a query
//! template, substitute the document URI, submit it to the triple-store and
//! hand the rows back. The search endpoints add the core's decision logic on
//! top — autocomplete ranking and the multi-query intersection.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;

use semindex_core::{
    decode_document_row, join_by_intersection, parse_filters, suggest, Entity, RawRow,
};
use semindex_sparql::{
    QueryMethod, PLAIN_DESCRIPTOR_PATTERN, RELATED_CONCEPT_PATTERN, SUB_CONCEPT_PATTERN,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::types::*;

/// Templates every deployment must provide. Checked once at startup so a
/// missing template can never surface as a per-request failure.
pub const REQUIRED_TEMPLATES: &[&str] = &[
    "getArticleMetadata.sparql",
    "getArticleAuthors.sparql",
    "getNamedEntities.sparql",
    "getGeographicNamedEntities.sparql",
    "getArticleDescriptors.sparql",
    "searchArticleByDescriptor.sparql",
    "searchArticleByDescriptorExtended.sparql",
];

/// Render a template for `uri` and relay it to the triple-store.
async fn run_document_query(
    state: &AppState,
    template: &str,
    uri: &str,
    method: QueryMethod,
) -> Result<Vec<RawRow>, AppError> {
    let query = state.queries.render(template, uri)?;
    tracing::debug!(template, uri, "submitting SPARQL query");
    state.total_queries.fetch_add(1, Ordering::Relaxed);
    let rows = state.store.execute(&query, method).await?;
    tracing::debug!(template, rows = rows.len(), "SPARQL query returned");
    Ok(rows)
}

/// Collect descriptor URIs from the raw query pairs. Accepts both
/// `uri=a,b,...` and repeated `uri=a&uri=b` forms.
fn collect_uris(params: &[(String, String)]) -> Vec<String> {
    params
        .iter()
        .filter(|(key, _)| key == "uri")
        .flat_map(|(_, value)| value.split(','))
        .map(str::trim)
        .filter(|uri| !uri.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reject a fan-out wider than the configured limit.
fn check_uri_limit(state: &AppState, uris: &[String]) -> Result<(), AppError> {
    let max = state.config.search.max_uris;
    if uris.len() > max {
        return Err(AppError::invalid_argument(format!(
            "too many uri values: {} given, at most {} accepted",
            uris.len(),
            max
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Health & Metrics
// ---------------------------------------------------------------------------

/// Health check endpoint returning server status and catalog shape.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse)
    )
)]
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        sparql_endpoint: state.config.sparql.endpoint.clone(),
        catalog_entities: state.catalog.len(),
        catalog_sources: state.catalog.source_tags().iter().cloned().collect(),
    })
}

/// Server metrics including request counts and uptime.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Server metrics", body = MetricsResponse)
    )
)]
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        total_requests: state.total_requests.load(Ordering::Relaxed),
        total_queries: state.total_queries.load(Ordering::Relaxed),
        total_searches: state.total_searches.load(Ordering::Relaxed),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

// ---------------------------------------------------------------------------
// Document query relays
// ---------------------------------------------------------------------------

/// Article metadata (title, date, article type, ...) without the authors.
#[utoipa::path(
    get,
    path = "/getArticleMetadata/",
    tag = "Documents",
    params(ArticleParams),
    responses(
        (status = 200, description = "SPARQL result rows", body = QueryResponse),
        (status = 502, description = "Upstream query failed", body = ApiErrorResponse)
    )
)]
pub async fn get_article_metadata_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ArticleParams>,
) -> Result<Json<QueryResponse>, AppError> {
    tracing::info!(uri = %params.uri, "getArticleMetadata");
    let result =
        run_document_query(&state, "getArticleMetadata.sparql", &params.uri, QueryMethod::Get)
            .await?;
    Ok(Json(QueryResponse { result }))
}

/// Article authors.
#[utoipa::path(
    get,
    path = "/getArticleAuthors/",
    tag = "Documents",
    params(ArticleParams),
    responses(
        (status = 200, description = "SPARQL result rows", body = QueryResponse),
        (status = 502, description = "Upstream query failed", body = ApiErrorResponse)
    )
)]
pub async fn get_article_authors_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ArticleParams>,
) -> Result<Json<QueryResponse>, AppError> {
    tracing::info!(uri = %params.uri, "getArticleAuthors");
    let result =
        run_document_query(&state, "getArticleAuthors.sparql", &params.uri, QueryMethod::Get)
            .await?;
    Ok(Json(QueryResponse { result }))
}

/// Named entities found in the article abstract.
#[utoipa::path(
    get,
    path = "/getAbstractNamedEntities/",
    tag = "Documents",
    params(ArticleParams),
    responses(
        (status = 200, description = "SPARQL result rows", body = QueryResponse),
        (status = 502, description = "Upstream query failed", body = ApiErrorResponse)
    )
)]
pub async fn get_abstract_named_entities_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ArticleParams>,
) -> Result<Json<QueryResponse>, AppError> {
    tracing::info!(uri = %params.uri, "getAbstractNamedEntities");
    // Annotations on the abstract live under a dedicated fragment URI.
    let uri = format!("{}#abstract", params.uri);
    let result =
        run_document_query(&state, "getNamedEntities.sparql", &uri, QueryMethod::Get).await?;
    Ok(Json(QueryResponse { result }))
}

/// Geographic named entities, whatever the article part.
#[utoipa::path(
    get,
    path = "/getGeographicNamedEntities/",
    tag = "Documents",
    params(ArticleParams),
    responses(
        (status = 200, description = "SPARQL result rows", body = QueryResponse),
        (status = 502, description = "Upstream query failed", body = ApiErrorResponse)
    )
)]
pub async fn get_geographic_named_entities_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ArticleParams>,
) -> Result<Json<QueryResponse>, AppError> {
    tracing::info!(uri = %params.uri, "getGeographicNamedEntities");
    // This query exceeds common URL length limits, so it goes as a POST.
    let result = run_document_query(
        &state,
        "getGeographicNamedEntities.sparql",
        &params.uri,
        QueryMethod::Post,
    )
    .await?;
    Ok(Json(QueryResponse { result }))
}

/// Global descriptors: concepts characterizing the article as a whole.
#[utoipa::path(
    get,
    path = "/getArticleDescriptors/",
    tag = "Documents",
    params(ArticleParams),
    responses(
        (status = 200, description = "SPARQL result rows", body = QueryResponse),
        (status = 502, description = "Upstream query failed", body = ApiErrorResponse)
    )
)]
pub async fn get_article_descriptors_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ArticleParams>,
) -> Result<Json<QueryResponse>, AppError> {
    tracing::info!(uri = %params.uri, "getArticleDescriptors");
    let result =
        run_document_query(&state, "getArticleDescriptors.sparql", &params.uri, QueryMethod::Get)
            .await?;
    Ok(Json(QueryResponse { result }))
}

// ---------------------------------------------------------------------------
// Autocomplete
// ---------------------------------------------------------------------------

/// Complete the user's input from the vocabulary catalog.
///
/// Prefix matches rank above substring matches; results are capped per
/// filter invocation by `search.max_autocomplete`.
#[utoipa::path(
    get,
    path = "/autoComplete/",
    tag = "Search",
    params(AutocompleteParams),
    responses(
        (status = 200, description = "Ranked entity suggestions", body = Vec<Entity>),
        (status = 400, description = "Unrecognized entityType tag", body = ApiErrorResponse)
    )
)]
pub async fn auto_complete_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AutocompleteParams>,
) -> Result<Json<Vec<Entity>>, AppError> {
    tracing::info!(input = %params.input, entity_type = ?params.entity_type, "autoComplete");
    state.total_searches.fetch_add(1, Ordering::Relaxed);

    let filters = parse_filters(&state.catalog, params.entity_type.as_deref())
        .map_err(|e| AppError::invalid_argument(e.to_string()))?;

    let suggestions = suggest(
        &state.catalog,
        &params.input,
        &filters,
        state.config.search.max_autocomplete,
    );
    Ok(Json(suggestions))
}

// ---------------------------------------------------------------------------
// Descriptor search
// ---------------------------------------------------------------------------

/// Search for documents annotated with all of the given descriptors.
///
/// A single query carries one triple pattern per URI, so the triple-store
/// computes the conjunction itself.
#[utoipa::path(
    get,
    path = "/searchDocumentsByDescriptor/",
    tag = "Search",
    params(
        ("uri" = String, Query, description = "Descriptor URIs, comma-separated or repeated")
    ),
    responses(
        (status = 200, description = "Matching documents", body = SearchResponse),
        (status = 400, description = "Too many descriptor URIs", body = ApiErrorResponse),
        (status = 502, description = "Upstream query failed", body = ApiErrorResponse)
    )
)]
pub async fn search_documents_by_descriptor_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<SearchResponse>, AppError> {
    let uris = collect_uris(&params);
    tracing::info!(uris = ?uris, "searchDocumentsByDescriptor");
    if uris.is_empty() {
        return Ok(Json(SearchResponse { result: Vec::new() }));
    }
    check_uri_limit(&state, &uris)?;
    state.total_searches.fetch_add(1, Ordering::Relaxed);

    let query = state.queries.render_triples(
        "searchArticleByDescriptor.sparql",
        PLAIN_DESCRIPTOR_PATTERN,
        &uris,
    )?;
    state.total_queries.fetch_add(1, Ordering::Relaxed);
    let rows = state.store.execute(&query, QueryMethod::Get).await?;
    tracing::info!(results = rows.len(), "searchDocumentsByDescriptor returned");

    let result = rows
        .iter()
        .filter_map(|row| decode_document_row(row, false))
        .collect();
    Ok(Json(SearchResponse { result }))
}

/// Shared implementation of the two intersection search endpoints: one
/// query per URI, then a client-side intersection keyed by document.
async fn search_with_intersection(
    state: Arc<AppState>,
    params: Vec<(String, String)>,
    line_template: &'static str,
    endpoint: &'static str,
) -> Result<Json<SearchResponse>, AppError> {
    let uris = collect_uris(&params);
    tracing::info!(uris = ?uris, "{endpoint}");
    if uris.is_empty() {
        return Ok(Json(SearchResponse { result: Vec::new() }));
    }
    check_uri_limit(&state, &uris)?;
    state.total_searches.fetch_add(1, Ordering::Relaxed);

    let result = join_by_intersection(&uris, |uri| {
        let state = state.clone();
        async move {
            let query = state.queries.render_triples(
                "searchArticleByDescriptorExtended.sparql",
                line_template,
                std::slice::from_ref(&uri),
            )?;
            state.total_queries.fetch_add(1, Ordering::Relaxed);
            let rows = state.store.execute(&query, QueryMethod::Get).await?;
            Ok::<_, anyhow::Error>(rows)
        }
    })
    .await;

    tracing::info!(results = result.len(), "{endpoint} returned");
    Ok(Json(SearchResponse { result }))
}

/// Search for documents annotated with the descriptors or any of their
/// sub-concepts.
#[utoipa::path(
    get,
    path = "/searchDocumentsByDescriptorSubConcept/",
    tag = "Search",
    params(
        ("uri" = String, Query, description = "Descriptor URIs, comma-separated or repeated")
    ),
    responses(
        (status = 200, description = "Documents matching every descriptor", body = SearchResponse),
        (status = 400, description = "Too many descriptor URIs", body = ApiErrorResponse)
    )
)]
pub async fn search_documents_by_descriptor_sub_concept_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<SearchResponse>, AppError> {
    search_with_intersection(
        state,
        params,
        SUB_CONCEPT_PATTERN,
        "searchDocumentsByDescriptorSubConcept",
    )
    .await
}

/// Search for documents annotated with concepts related to the descriptors.
#[utoipa::path(
    get,
    path = "/searchDocumentsByDescriptorRelated/",
    tag = "Search",
    params(
        ("uri" = String, Query, description = "Descriptor URIs, comma-separated or repeated")
    ),
    responses(
        (status = 200, description = "Documents matching every descriptor", body = SearchResponse),
        (status = 400, description = "Too many descriptor URIs", body = ApiErrorResponse)
    )
)]
pub async fn search_documents_by_descriptor_related_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<SearchResponse>, AppError> {
    search_with_intersection(
        state,
        params,
        RELATED_CONCEPT_PATTERN,
        "searchDocumentsByDescriptorRelated",
    )
    .await
}
