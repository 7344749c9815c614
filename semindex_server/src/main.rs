//! # Semantic Index Server
//!
//! REST facade over a SPARQL triple-store for a corpus of annotated articles.
//!
//! Provides:
//! - Per-document annotation queries (metadata, authors, named entities, descriptors)
//! - Vocabulary autocomplete over in-memory entity dumps
//! - Concept-based document search with hierarchy and relation expansion
//! - Middleware: logging, request counting, CORS
//!
//! # Configuration
//!
//! Set `SEMINDEX_CONFIG` env var to a TOML config file path, or use defaults.
//! The server binds to the configured `host:port` (default `0.0.0.0:8180`).
//!
//! # CLI Usage
//!
//! ```bash
//! # Start server with default config
//! semindex_server
//!
//! # Start server with custom config file
//! semindex_server --config semindex.toml
//!
//! # Generate example config file with inline documentation
//! semindex_server --init-config
//!
//! # Override specific settings via env vars
//! SEMINDEX_SERVER_PORT=9000 semindex_server
//! ```

use axum::extract::State;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use semindex_config::SemindexConfig;
use semindex_server::handlers;
use semindex_server::openapi::ApiDoc;
use semindex_server::state::AppState;
use semindex_sparql::{HttpSparqlClient, QueryStore, TripleStore};

/// Semantic index server.
#[derive(Parser, Debug)]
#[command(name = "semindex_server")]
#[command(about = "Semantic index server: SPARQL query relay, autocomplete and document search")]
#[command(version)]
struct Cli {
    /// Path to semindex.toml config file.
    /// Can also be set via SEMINDEX_CONFIG env var.
    #[arg(short, long, env = "SEMINDEX_CONFIG")]
    config: Option<String>,

    /// Generate an example semindex.toml config file with documentation and exit.
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Handle --init-config: print example config and exit.
    if cli.init_config {
        print!("{}", SemindexConfig::example_toml_commented());
        return Ok(());
    }

    // Load configuration from file or defaults, then apply env var overrides.
    let config = if let Some(path) = &cli.config {
        SemindexConfig::from_file(path)?
    } else {
        let mut cfg = SemindexConfig::default();
        cfg.apply_env_overrides();
        cfg.validate()?;
        cfg
    };

    init_tracing(&config);

    tracing::info!(
        "Semantic index server starting on {}:{}",
        config.server.host,
        config.server.port
    );
    tracing::info!("SPARQL endpoint: {}", config.sparql.endpoint);

    // Load the entity catalog. A missing or malformed dump is a startup
    // failure, never a degraded-mode run.
    let sources: Vec<(String, String)> = config
        .catalog
        .sources
        .iter()
        .map(|s| (s.tag.clone(), s.path.clone()))
        .collect();
    let catalog = semindex_core::EntityCatalog::load(&sources)?;
    tracing::info!(
        "Entity catalog loaded: {} entries from {} sources",
        catalog.len(),
        catalog.source_tags().len()
    );

    // Load query templates and check the required set up front.
    let queries = QueryStore::load(
        std::path::Path::new(&config.queries.template_dir),
        handlers::REQUIRED_TEMPLATES,
    )?;
    tracing::info!(
        "Query templates loaded from {}",
        config.queries.template_dir
    );

    let store: Arc<dyn TripleStore> = Arc::new(HttpSparqlClient::new(
        &config.sparql.endpoint,
        std::time::Duration::from_secs(config.sparql.timeout_secs),
    )?);

    let state = Arc::new(AppState::new(catalog, queries, store, config.clone()));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the Axum router.
    let app = Router::new()
        // Health & Metrics
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        // Document query relays
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
        // Autocomplete
        .route("/autoComplete/", get(handlers::auto_complete_handler))
        // Descriptor search
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
        // Swagger UI for interactive API exploration
        // SwaggerUi serves the OpenAPI JSON at the URL passed to .url()
        .merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", ApiDoc::openapi()))
        // Middleware (order matters: first added = outermost)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            request_counter_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Bind and serve.
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize the tracing subscriber from the config's log level and format.
fn init_tracing(config: &SemindexConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));

    if config.server.log_format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Middleware that increments the global request counter.
async fn request_counter_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    state.total_requests.fetch_add(1, Ordering::Relaxed);
    next.run(request).await
}
