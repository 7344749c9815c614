//! # Semindex Config
//!
//! Configuration system for the semantic index backend.
//!
//! Provides TOML-based configuration parsing and validation for the HTTP
//! server, the upstream SPARQL endpoint, the vocabulary catalog dumps, the
//! query template directory, and the search limits.
//!
//! # Configuration Schema
//!
//! The configuration file (`semindex.toml`) supports the following sections:
//! - `[server]` — HTTP server settings (host, port, log_level, log_format)
//! - `[sparql]` — upstream SPARQL endpoint URL and request timeout
//! - `[catalog]` — static vocabulary dump files, one per source tag
//! - `[queries]` — directory holding the `.sparql` query templates
//! - `[search]` — autocomplete result cap and descriptor fan-out limit
//!
//! # Environment Variable Overrides
//!
//! Every scalar field can be overridden via environment variables using the
//! `SEMINDEX_` prefix and `_` as section separator:
//! - `SEMINDEX_SERVER_HOST` → `server.host`
//! - `SEMINDEX_SERVER_PORT` → `server.port`
//! - `SEMINDEX_SPARQL_ENDPOINT` → `sparql.endpoint`
//! - `SEMINDEX_SEARCH_MAX_AUTOCOMPLETE` → `search.max_autocomplete`
//! - etc.

use serde::{Deserialize, Serialize};

/// Top-level semindex configuration.
///
/// Parsed from `semindex.toml` or constructed programmatically.
/// Environment variables with the `SEMINDEX_` prefix override TOML values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemindexConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream SPARQL endpoint settings.
    #[serde(default)]
    pub sparql: SparqlConfig,
    /// Vocabulary catalog dump files.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Query template settings.
    #[serde(default)]
    pub queries: QueriesConfig,
    /// Search limits.
    #[serde(default)]
    pub search: SearchConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default: "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// HTTP port (default: 8180).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Log level (default: "info").
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log format: "text" (default) or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8180
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

/// Upstream SPARQL endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparqlConfig {
    /// SPARQL endpoint URL the backend relays queries to.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Per-query HTTP timeout in seconds (default: 30). One slow upstream
    /// query must not block an intersection search indefinitely.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SparqlConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:8890/sparql".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

/// One static vocabulary dump file and the source tag it loads under.
///
/// The tag is what the `entityType` autocomplete parameter selects on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSource {
    /// Source tag, e.g. "agrovocdescr" or "wikidata".
    pub tag: String,
    /// Path to the JSON entity dump.
    pub path: String,
}

/// Vocabulary catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Dump files to load at startup, concatenated in order.
    #[serde(default = "default_catalog_sources")]
    pub sources: Vec<CatalogSource>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            sources: default_catalog_sources(),
        }
    }
}

fn default_catalog_sources() -> Vec<CatalogSource> {
    vec![
        CatalogSource {
            tag: "agrovocdescr".to_string(),
            path: "data/dumpAgrovocDescriptors.json".to_string(),
        },
        CatalogSource {
            tag: "wikidata".to_string(),
            path: "data/dumpWikidataNamedEntities.json".to_string(),
        },
    ]
}

/// Query template configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueriesConfig {
    /// Directory holding the `.sparql` template files (default: "queries").
    #[serde(default = "default_template_dir")]
    pub template_dir: String,
}

impl Default for QueriesConfig {
    fn default() -> Self {
        Self {
            template_dir: default_template_dir(),
        }
    }
}

fn default_template_dir() -> String {
    "queries".to_string()
}

/// Search limit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of autocomplete suggestions per filter invocation
    /// (default: 15).
    #[serde(default = "default_max_autocomplete")]
    pub max_autocomplete: usize,
    /// Maximum number of descriptor URIs accepted by one search request;
    /// this caps the query fan-out toward the triple-store (default: 10).
    #[serde(default = "default_max_uris")]
    pub max_uris: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_autocomplete: default_max_autocomplete(),
            max_uris: default_max_uris(),
        }
    }
}

fn default_max_autocomplete() -> usize {
    15
}
fn default_max_uris() -> usize {
    10
}

impl SemindexConfig {
    /// Load configuration from a TOML file, then apply environment variable
    /// overrides and validate.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;
        Self::parse_toml(&contents)
    }

    /// Parse configuration from a TOML string, apply env overrides, then validate.
    pub fn parse_toml(toml_str: &str) -> anyhow::Result<Self> {
        let mut config: SemindexConfig = toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Variables use the `SEMINDEX_` prefix with `_` as section separator:
    /// - `SEMINDEX_SERVER_HOST` → `server.host`
    /// - `SEMINDEX_SERVER_PORT` → `server.port`
    /// - `SEMINDEX_SERVER_LOG_LEVEL` → `server.log_level`
    /// - `SEMINDEX_SERVER_LOG_FORMAT` → `server.log_format`
    /// - `SEMINDEX_SPARQL_ENDPOINT` → `sparql.endpoint`
    /// - `SEMINDEX_SPARQL_TIMEOUT_SECS` → `sparql.timeout_secs`
    /// - `SEMINDEX_QUERIES_TEMPLATE_DIR` → `queries.template_dir`
    /// - `SEMINDEX_SEARCH_MAX_AUTOCOMPLETE` → `search.max_autocomplete`
    /// - `SEMINDEX_SEARCH_MAX_URIS` → `search.max_uris`
    pub fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(v) = std::env::var("SEMINDEX_SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = std::env::var("SEMINDEX_SERVER_PORT") {
            if let Ok(port) = v.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(v) = std::env::var("SEMINDEX_SERVER_LOG_LEVEL") {
            self.server.log_level = v;
        }
        if let Ok(v) = std::env::var("SEMINDEX_SERVER_LOG_FORMAT") {
            self.server.log_format = v;
        }

        // SPARQL overrides
        if let Ok(v) = std::env::var("SEMINDEX_SPARQL_ENDPOINT") {
            self.sparql.endpoint = v;
        }
        if let Ok(v) = std::env::var("SEMINDEX_SPARQL_TIMEOUT_SECS") {
            if let Ok(secs) = v.parse::<u64>() {
                self.sparql.timeout_secs = secs;
            }
        }

        // Queries overrides
        if let Ok(v) = std::env::var("SEMINDEX_QUERIES_TEMPLATE_DIR") {
            self.queries.template_dir = v;
        }

        // Search overrides
        if let Ok(v) = std::env::var("SEMINDEX_SEARCH_MAX_AUTOCOMPLETE") {
            if let Ok(n) = v.parse::<usize>() {
                self.search.max_autocomplete = n;
            }
        }
        if let Ok(v) = std::env::var("SEMINDEX_SEARCH_MAX_URIS") {
            if let Ok(n) = v.parse::<usize>() {
                self.search.max_uris = n;
            }
        }
    }

    /// Validate configuration values with detailed error messages.
    pub fn validate(&self) -> anyhow::Result<()> {
        // --- Server validation ---
        if self.server.port == 0 {
            anyhow::bail!(
                "server.port must be > 0 (got 0). Set a valid port in semindex.toml or via SEMINDEX_SERVER_PORT env var."
            );
        }
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.server.log_level.as_str()) {
            anyhow::bail!(
                "server.log_level must be one of: {} (got '{}').",
                valid_log_levels.join(", "),
                self.server.log_level
            );
        }
        let valid_log_formats = ["text", "json"];
        if !valid_log_formats.contains(&self.server.log_format.as_str()) {
            anyhow::bail!(
                "server.log_format must be one of: {} (got '{}').",
                valid_log_formats.join(", "),
                self.server.log_format
            );
        }

        // --- SPARQL validation ---
        if self.sparql.endpoint.is_empty() {
            anyhow::bail!(
                "sparql.endpoint must not be empty. Set the upstream SPARQL endpoint URL in semindex.toml or via SEMINDEX_SPARQL_ENDPOINT env var."
            );
        }
        if !self.sparql.endpoint.starts_with("http://")
            && !self.sparql.endpoint.starts_with("https://")
        {
            anyhow::bail!(
                "sparql.endpoint must be an http(s) URL (got '{}').",
                self.sparql.endpoint
            );
        }
        if self.sparql.timeout_secs == 0 {
            anyhow::bail!("sparql.timeout_secs must be > 0.");
        }

        // --- Catalog validation ---
        if self.catalog.sources.is_empty() {
            anyhow::bail!("catalog.sources must list at least one dump file.");
        }
        for source in &self.catalog.sources {
            if source.tag.is_empty() || source.tag == "all" {
                anyhow::bail!(
                    "catalog source tags must be non-empty and must not shadow the reserved 'all' filter (got '{}').",
                    source.tag
                );
            }
            if source.path.is_empty() {
                anyhow::bail!("catalog source '{}' has an empty path.", source.tag);
            }
        }

        // --- Search validation ---
        if self.search.max_autocomplete == 0 {
            anyhow::bail!("search.max_autocomplete must be > 0.");
        }
        if self.search.max_uris == 0 {
            anyhow::bail!("search.max_uris must be > 0.");
        }

        Ok(())
    }

    /// Generate an example `semindex.toml` with inline documentation,
    /// printed by `--init-config`.
    pub fn example_toml_commented() -> String {
        r#"# Semindex backend configuration.
# Every scalar value can be overridden with a SEMINDEX_* environment
# variable, e.g. SEMINDEX_SERVER_PORT=9000 or SEMINDEX_SPARQL_ENDPOINT=...

[server]
# Bind address and port for the HTTP API.
host = "0.0.0.0"
port = 8180
# Log level: trace, debug, info, warn, error.
log_level = "info"
# Log format: "text" or "json".
log_format = "text"

[sparql]
# Upstream SPARQL endpoint all document queries are relayed to.
endpoint = "http://localhost:8890/sparql"
# Per-query HTTP timeout in seconds.
timeout_secs = 30

# Static vocabulary dumps loaded into the in-memory catalog at startup.
# The tag is what the autoComplete entityType parameter selects on.
[[catalog.sources]]
tag = "agrovocdescr"
path = "data/dumpAgrovocDescriptors.json"

[[catalog.sources]]
tag = "wikidata"
path = "data/dumpWikidataNamedEntities.json"

[queries]
# Directory holding the .sparql query templates.
template_dir = "queries"

[search]
# Maximum autocomplete suggestions per filter invocation.
max_autocomplete = 15
# Maximum descriptor URIs per search request (caps the query fan-out).
max_uris = 10
"#
        .to_string()
    }
}
