//! HTTP client for the upstream SPARQL endpoint.
//!
//! Speaks the SPARQL protocol: GET with a `query` parameter by default, or
//! form-encoded POST for queries too long for a URL (the geographic named
//! entity search needs this). Responses are expected in the SPARQL JSON
//! results format and are flattened into plain `variable → value` rows.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use semindex_core::RawRow;

/// Failure modes of a SPARQL query execution.
#[derive(Debug, Error)]
pub enum SparqlError {
    /// The endpoint could not be reached.
    #[error("SPARQL endpoint unavailable: {0}")]
    EndpointUnavailable(String),
    /// The query did not complete within the configured timeout.
    #[error("SPARQL query timed out: {0}")]
    Timeout(String),
    /// The endpoint rejected the query (HTTP 4xx).
    #[error("SPARQL endpoint rejected the query: {0}")]
    MalformedQuery(String),
    /// The endpoint answered with something other than SPARQL JSON results.
    #[error("unexpected response from SPARQL endpoint: {0}")]
    InvalidResponse(String),
}

/// HTTP method used toward the SPARQL endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMethod {
    #[default]
    Get,
    Post,
}

/// The call contract the core needs from a triple-store.
///
/// Injected into the request handlers as a trait object so integration tests
/// can substitute a mock store.
#[async_trait]
pub trait TripleStore: Send + Sync {
    /// Execute a SPARQL query and return its result rows.
    async fn execute(&self, query: &str, method: QueryMethod) -> Result<Vec<RawRow>, SparqlError>;
}

/// SPARQL JSON results envelope (the subset this backend reads).
#[derive(Debug, Deserialize)]
struct SparqlResults {
    results: SparqlBindings,
}

#[derive(Debug, Deserialize)]
struct SparqlBindings {
    bindings: Vec<HashMap<String, SparqlValue>>,
}

#[derive(Debug, Deserialize)]
struct SparqlValue {
    value: String,
}

/// reqwest-backed [`TripleStore`] implementation.
pub struct HttpSparqlClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSparqlClient {
    /// Create a client for `endpoint` with a per-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Create a client with a caller-provided `reqwest::Client`.
    /// Useful for tests and custom TLS/proxy setups.
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// The configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TripleStore for HttpSparqlClient {
    async fn execute(&self, query: &str, method: QueryMethod) -> Result<Vec<RawRow>, SparqlError> {
        let request = match method {
            QueryMethod::Get => self
                .client
                .get(&self.endpoint)
                .query(&[("query", query)]),
            QueryMethod::Post => self
                .client
                .post(&self.endpoint)
                .form(&[("query", query)]),
        };

        let response = request
            .header("Accept", "application/sparql-results+json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SparqlError::Timeout(e.to_string())
                } else {
                    SparqlError::EndpointUnavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(SparqlError::MalformedQuery(format!("{}: {}", status, body)));
        }
        if !status.is_success() {
            return Err(SparqlError::EndpointUnavailable(format!(
                "endpoint answered {}",
                status
            )));
        }

        let results: SparqlResults = response
            .json()
            .await
            .map_err(|e| SparqlError::InvalidResponse(e.to_string()))?;

        Ok(results
            .results
            .bindings
            .into_iter()
            .map(|binding| {
                binding
                    .into_iter()
                    .map(|(var, value)| (var, value.value))
                    .collect()
            })
            .collect())
    }
}
