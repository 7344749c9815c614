//! Application state shared across all request handlers.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;

use semindex_config::SemindexConfig;
use semindex_core::EntityCatalog;
use semindex_sparql::{QueryStore, TripleStore};

/// Shared application state threaded through Axum handlers.
///
/// Wrapped in `Arc` and shared via Axum's `State` extractor. The catalog and
/// query store are built once at startup and read-only afterwards, so no
/// locking is needed during request handling.
pub struct AppState {
    /// Immutable vocabulary catalog.
    pub catalog: EntityCatalog,
    /// Preloaded SPARQL query templates.
    pub queries: QueryStore,
    /// Triple-store client (mockable in tests).
    pub store: Arc<dyn TripleStore>,
    /// Full configuration.
    pub config: SemindexConfig,
    /// Server start time (for uptime metric).
    pub start_time: Instant,
    /// Request counters for metrics.
    pub total_requests: AtomicU64,
    pub total_queries: AtomicU64,
    pub total_searches: AtomicU64,
}

impl AppState {
    pub fn new(
        catalog: EntityCatalog,
        queries: QueryStore,
        store: Arc<dyn TripleStore>,
        config: SemindexConfig,
    ) -> Self {
        Self {
            catalog,
            queries,
            store,
            config,
            start_time: Instant::now(),
            total_requests: AtomicU64::new(0),
            total_queries: AtomicU64::new(0),
            total_searches: AtomicU64::new(0),
        }
    }
}
