//! Immutable entity catalog loaded from static vocabulary dumps.
//!
//! The catalog is built once during startup and injected into request
//! handlers; it is never mutated afterwards. Each configured dump file is
//! parsed as a JSON array of entities and concatenated into one combined
//! catalog, with every record tagged by the source it was loaded under.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;

use crate::types::Entity;

/// Process-wide, read-only collection of vocabulary entities.
///
/// Sub-catalogs are addressed by source tag; the combined catalog preserves
/// the concatenation order of the sources it was loaded from.
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    entries: Vec<Entity>,
    tags: BTreeSet<String>,
}

impl EntityCatalog {
    /// Load the catalog from `(tag, path)` pairs of JSON dump files.
    ///
    /// Fails if any file is unreadable or does not parse as an entity array —
    /// the process must not start with a partial catalog.
    pub fn load(sources: &[(String, String)]) -> anyhow::Result<Self> {
        let mut catalog = Self::default();
        for (tag, path) in sources {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read catalog dump '{}'", path))?;
            let entities: Vec<Entity> = serde_json::from_str(&contents)
                .with_context(|| format!("catalog dump '{}' is not a valid entity array", path))?;
            tracing::info!(
                source = %tag,
                path = %path,
                entities = entities.len(),
                "loaded catalog dump"
            );
            catalog.push_source(tag, entities);
        }
        Ok(catalog)
    }

    /// Load a single dump file under the given source tag.
    pub fn load_source(tag: &str, path: &Path) -> anyhow::Result<Self> {
        Self::load(&[(tag.to_string(), path.display().to_string())])
    }

    /// Build a catalog from in-memory entries, tagging each with `tag`.
    /// Used by tests and by callers that assemble dumps themselves.
    pub fn from_entries(tag: &str, entries: Vec<Entity>) -> Self {
        let mut catalog = Self::default();
        catalog.push_source(tag, entries);
        catalog
    }

    /// Append another source's entries, overriding their `entity_type` with
    /// the source tag so filter tags and record tags always agree.
    pub fn push_source(&mut self, tag: &str, entries: Vec<Entity>) {
        self.tags.insert(tag.to_string());
        self.entries.extend(entries.into_iter().map(|mut e| {
            e.entity_type = tag.to_string();
            e
        }));
    }

    /// All entries, in load order.
    pub fn entries(&self) -> &[Entity] {
        &self.entries
    }

    /// The set of source tags this catalog was loaded with.
    pub fn source_tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Whether `tag` names a loaded sub-catalog.
    pub fn has_source(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
