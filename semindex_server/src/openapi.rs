//! OpenAPI 3.1 specification generation for the semantic index REST API.
//!
//! Uses utoipa to generate the spec from annotated handlers and types.
//! The spec is served at `/openapi.json` and Swagger UI at `/swagger-ui`.

use utoipa::OpenApi;

use crate::handlers;
use crate::types::*;

/// OpenAPI specification for the semantic index REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Semantic Index API",
        description = "REST facade over a SPARQL triple-store: per-document annotation \
                       queries, vocabulary autocomplete over in-memory entity dumps, and \
                       concept-based document search with hierarchy expansion.",
        version = "0.3.0",
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:8180", description = "Local development server")
    ),
    tags(
        (name = "Health", description = "Server health and metrics endpoints"),
        (name = "Documents", description = "Per-document annotation queries relayed to the triple-store"),
        (name = "Search", description = "Vocabulary autocomplete and concept-based document search")
    ),
    paths(
        handlers::health_handler,
        handlers::metrics_handler,
        handlers::get_article_metadata_handler,
        handlers::get_article_authors_handler,
        handlers::get_abstract_named_entities_handler,
        handlers::get_geographic_named_entities_handler,
        handlers::get_article_descriptors_handler,
        handlers::auto_complete_handler,
        handlers::search_documents_by_descriptor_handler,
        handlers::search_documents_by_descriptor_sub_concept_handler,
        handlers::search_documents_by_descriptor_related_handler,
    ),
    components(schemas(
        QueryResponse,
        SearchResponse,
        HealthResponse,
        MetricsResponse,
        ApiErrorResponse,
        semindex_core::Entity,
        semindex_core::EntityMatch,
        semindex_core::DocumentResult,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        let json = spec.to_json().expect("Failed to serialize OpenAPI spec");
        assert!(json.contains("Semantic Index API"));
        assert!(json.contains("/health"));
        assert!(json.contains("/autoComplete/"));
        assert!(json.contains("/searchDocumentsByDescriptor/"));
    }

    #[test]
    fn test_openapi_spec_has_all_endpoints() {
        let spec = ApiDoc::openapi();
        let json = spec.to_json().expect("Failed to serialize OpenAPI spec");

        let paths = [
            "/health",
            "/metrics",
            "/getArticleMetadata/",
            "/getArticleAuthors/",
            "/getAbstractNamedEntities/",
            "/getGeographicNamedEntities/",
            "/getArticleDescriptors/",
            "/autoComplete/",
            "/searchDocumentsByDescriptor/",
            "/searchDocumentsByDescriptorSubConcept/",
            "/searchDocumentsByDescriptorRelated/",
        ];
        for path in paths {
            assert!(json.contains(path), "Missing path: {}", path);
        }
    }

    #[test]
    fn test_openapi_spec_has_schemas() {
        let spec = ApiDoc::openapi();
        let json = spec.to_json().expect("Failed to serialize OpenAPI spec");

        let schemas = [
            "QueryResponse",
            "SearchResponse",
            "HealthResponse",
            "MetricsResponse",
            "ApiErrorResponse",
            "Entity",
            "EntityMatch",
            "DocumentResult",
        ];
        for schema in schemas {
            assert!(json.contains(schema), "Missing schema: {}", schema);
        }
    }

    #[test]
    fn test_openapi_spec_valid_json() {
        let spec = ApiDoc::openapi();
        let json_str = spec.to_json().expect("Failed to serialize OpenAPI spec");
        let parsed: serde_json::Value =
            serde_json::from_str(&json_str).expect("OpenAPI spec is not valid JSON");

        assert!(parsed.get("openapi").is_some());
        assert!(parsed.get("info").is_some());
        assert!(parsed.get("paths").is_some());
        assert!(parsed.get("components").is_some());
    }
}
