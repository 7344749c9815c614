//! Request and response types for the semantic index REST API.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use semindex_core::{DocumentResult, RawRow};

/// Query parameters for the single-document endpoints.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ArticleParams {
    /// URI of the document.
    pub uri: String,
}

/// Query parameters for `/autoComplete/`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AutocompleteParams {
    /// Text entered by the user so far.
    pub input: String,
    /// Optional comma-separated list of source tags
    /// (`agrovocdescr`, `wikidata`, `all`).
    #[serde(rename = "entityType")]
    pub entity_type: Option<String>,
}

/// Raw SPARQL result rows relayed to the caller.
#[derive(Debug, Serialize, ToSchema)]
pub struct QueryResponse {
    pub result: Vec<RawRow>,
}

/// Decoded documents from the descriptor search endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub result: Vec<DocumentResult>,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Configured upstream SPARQL endpoint.
    pub sparql_endpoint: String,
    /// Number of entities loaded into the catalog.
    pub catalog_entities: usize,
    /// Source tags the catalog was loaded with.
    pub catalog_sources: Vec<String>,
}

/// Server metrics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MetricsResponse {
    pub total_requests: u64,
    /// Queries relayed to the triple-store.
    pub total_queries: u64,
    /// Autocomplete and descriptor search invocations.
    pub total_searches: u64,
    pub uptime_secs: u64,
}

/// Error body shape, for API documentation.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    pub code: String,
    pub message: String,
}
