//! Shared data model for the semantic index core.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row of a SPARQL result set: a flat mapping from variable name to
/// string value, as decoded from the endpoint's JSON results format.
pub type RawRow = HashMap<String, String>;

/// A vocabulary entity from one of the static catalog dumps.
///
/// Immutable after load. `entity_type` carries the source tag the entity was
/// loaded under (e.g. `"agrovocdescr"` or `"wikidata"`), which is also the
/// tag autocomplete filters select on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Entity {
    /// Stable identifier, unique within a source vocabulary.
    #[serde(rename = "entityUri")]
    pub entity_uri: String,
    /// Display label. Not guaranteed unique; alternate labels share a URI.
    #[serde(rename = "entityLabel")]
    pub entity_label: String,
    /// Preferred label when `entity_label` is an alternate form.
    #[serde(rename = "entityPrefLabel", skip_serializing_if = "Option::is_none")]
    pub entity_pref_label: Option<String>,
    /// Source vocabulary tag.
    #[serde(rename = "entityType")]
    pub entity_type: String,
    /// Number of documents tagged with this entity.
    #[serde(default)]
    pub count: u64,
}

/// A `(URI, label)` pair decoded from a delimiter-encoded match field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EntityMatch {
    #[serde(rename = "entityUri")]
    pub entity_uri: String,
    #[serde(rename = "entityLabel")]
    pub entity_label: String,
}

/// A document produced by the descriptor search endpoints.
///
/// `matched_entities` is `Some` only on the intersection endpoints, where it
/// accumulates the union of per-descriptor matches deduplicated by URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DocumentResult {
    /// Document URI — the join key.
    pub document: String,
    pub title: String,
    pub date: String,
    pub publisher: String,
    pub lang: String,
    #[serde(rename = "linkPDF")]
    pub link_pdf: String,
    pub authors: Vec<String>,
    #[serde(rename = "matchedEntities", skip_serializing_if = "Option::is_none")]
    pub matched_entities: Option<Vec<EntityMatch>>,
}
