//! Query store: parameterized SPARQL templates read from disk at startup.
//!
//! Templates carry either a single `{id}` scalar placeholder (replaced with
//! a document or concept URI) or a `{triples}` placeholder replaced with a
//! generated block of triple-pattern lines, one per searched URI. All
//! templates a deployment needs are loaded and checked when the process
//! starts, so a missing template is a startup failure, never a per-request
//! one.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

/// Scalar placeholder replaced by [`QueryStore::render`].
pub const ID_PLACEHOLDER: &str = "{id}";
/// Block placeholder replaced by [`QueryStore::render_triples`].
pub const TRIPLES_PLACEHOLDER: &str = "{triples}";
/// Per-URI placeholder inside a triple-pattern line template.
pub const URI_PLACEHOLDER: &str = "{uri}";

/// Triple pattern matching documents annotated with the descriptor itself.
pub const PLAIN_DESCRIPTOR_PATTERN: &str =
    "    ?document ^oa:hasTarget [ oa:hasBody <{uri}> ].";
/// Triple pattern widening the match to the descriptor's sub-concepts.
pub const SUB_CONCEPT_PATTERN: &str =
    "    ?document ^oa:hasTarget [ oa:hasBody/(skos:broader|^agron:includes)* <{uri}> ].";
/// Triple pattern widening the match to related concepts.
pub const RELATED_CONCEPT_PATTERN: &str =
    "    ?document ^oa:hasTarget [ oa:hasBody/skos:broader*/skos:related <{uri}> ].";

/// Expand a triple-pattern line template into one line per URI.
pub fn triple_block(line_template: &str, uris: &[String]) -> String {
    uris.iter()
        .map(|uri| format!("{}\n", line_template.replace(URI_PLACEHOLDER, uri)))
        .collect()
}

/// In-memory store of ready-to-substitute query templates.
#[derive(Debug, Clone, Default)]
pub struct QueryStore {
    templates: HashMap<String, String>,
}

impl QueryStore {
    /// Load every `.sparql` file in `dir`, then verify that all `required`
    /// template names are present. Call this once at startup and fail the
    /// process on error.
    pub fn load(dir: &Path, required: &[&str]) -> anyhow::Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("failed to read template directory '{}'", dir.display()))?;

        let mut templates = HashMap::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("sparql") {
                continue;
            }
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n.to_string(),
                None => continue,
            };
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read query template '{}'", path.display()))?;
            templates.insert(name, contents);
        }
        tracing::info!(dir = %dir.display(), templates = templates.len(), "loaded query templates");

        let store = Self { templates };
        for name in required {
            if !store.templates.contains_key(*name) {
                anyhow::bail!(
                    "required query template '{}' not found in '{}'",
                    name,
                    dir.display()
                );
            }
        }
        Ok(store)
    }

    /// Build a store from in-memory templates. Used by tests.
    pub fn from_templates<I, K, V>(templates: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            templates: templates
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Render a template by replacing every `{id}` occurrence with `id`.
    pub fn render(&self, name: &str, id: &str) -> anyhow::Result<String> {
        let template = self
            .templates
            .get(name)
            .with_context(|| format!("query template '{}' not loaded", name))?;
        Ok(template.replace(ID_PLACEHOLDER, id))
    }

    /// Render a template by replacing the `{triples}` block with one
    /// triple-pattern line per URI.
    pub fn render_triples(
        &self,
        name: &str,
        line_template: &str,
        uris: &[String],
    ) -> anyhow::Result<String> {
        let template = self
            .templates
            .get(name)
            .with_context(|| format!("query template '{}' not loaded", name))?;
        Ok(template.replace(TRIPLES_PLACEHOLDER, &triple_block(line_template, uris)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_every_id_occurrence() {
        let store = QueryStore::from_templates([(
            "getArticleMetadata.sparql",
            "SELECT * WHERE { <{id}> ?p ?o. <{id}> a ?t }",
        )]);
        let query = store
            .render("getArticleMetadata.sparql", "http://d.org/doc1")
            .unwrap();
        assert_eq!(
            query,
            "SELECT * WHERE { <http://d.org/doc1> ?p ?o. <http://d.org/doc1> a ?t }"
        );
    }

    #[test]
    fn test_render_unknown_template_fails() {
        let store = QueryStore::default();
        let err = store.render("missing.sparql", "x").unwrap_err();
        assert!(err.to_string().contains("not loaded"));
    }

    #[test]
    fn test_triple_block_one_line_per_uri() {
        let uris = vec!["http://v.org/c1".to_string(), "http://v.org/c2".to_string()];
        let block = triple_block(PLAIN_DESCRIPTOR_PATTERN, &uris);
        assert_eq!(
            block,
            concat!(
                "    ?document ^oa:hasTarget [ oa:hasBody <http://v.org/c1> ].\n",
                "    ?document ^oa:hasTarget [ oa:hasBody <http://v.org/c2> ].\n",
            )
        );
    }

    #[test]
    fn test_render_triples() {
        let store = QueryStore::from_templates([(
            "searchArticleByDescriptor.sparql",
            "SELECT ?document WHERE {\n{triples}}",
        )]);
        let query = store
            .render_triples(
                "searchArticleByDescriptor.sparql",
                SUB_CONCEPT_PATTERN,
                &["http://v.org/c1".to_string()],
            )
            .unwrap();
        assert!(query.contains("(skos:broader|^agron:includes)* <http://v.org/c1>"));
        assert!(!query.contains(TRIPLES_PLACEHOLDER));
    }

    #[test]
    fn test_load_checks_required_templates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("present.sparql"), "SELECT * WHERE {}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a template").unwrap();

        let store = QueryStore::load(dir.path(), &["present.sparql"]).unwrap();
        assert!(store.render("present.sparql", "x").is_ok());
        // Non-.sparql files are not picked up.
        assert!(store.render("notes.txt", "x").is_err());

        let err = QueryStore::load(dir.path(), &["absent.sparql"]).unwrap_err();
        assert!(err.to_string().contains("absent.sparql"));
    }
}
