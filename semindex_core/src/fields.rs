//! Decoding of delimiter-encoded multi-value fields.
//!
//! SPARQL result rows pack multi-valued fields into one string using a
//! two-level scheme: entries are separated by `$$`, and within an entry the
//! URI and label are separated by `$`. Authors use the entry separator only.
//!
//! Decoding is lossy-safe only as long as delimiters never occur inside the
//! encoded values. An entry with an empty URI or label is malformed: it is
//! skipped and logged, never an error — one bad sub-entry must not take down
//! the request.

use crate::types::{DocumentResult, EntityMatch, RawRow};

/// Separator between encoded entries.
pub const ENTRY_SEPARATOR: &str = "$$";
/// Separator between the URI and label inside one entry.
pub const FIELD_SEPARATOR: char = '$';

/// Decode a `$$`/`$`-encoded entity match field into `(URI, label)` pairs.
pub fn decode_entity_matches(raw: &str) -> Vec<EntityMatch> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(ENTRY_SEPARATOR)
        .filter_map(|entry| {
            let (uri, label) = entry.split_once(FIELD_SEPARATOR)?;
            if uri.is_empty() || label.is_empty() {
                tracing::warn!(entry = %entry, "skipping malformed entity match entry");
                return None;
            }
            Some(EntityMatch {
                entity_uri: uri.to_string(),
                entity_label: label.to_string(),
            })
        })
        .collect()
}

/// Decode a `$$`-separated author list, dropping empty entries.
pub fn decode_authors(raw: &str) -> Vec<String> {
    raw.split(ENTRY_SEPARATOR)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode one raw result row into a [`DocumentResult`].
///
/// Returns `None` (with a log line) when the row has no `document` binding —
/// such a row cannot participate in the intersection. `with_entities`
/// controls whether the `matchedEntities` field is decoded; the plain
/// descriptor search omits it.
pub fn decode_document_row(row: &RawRow, with_entities: bool) -> Option<DocumentResult> {
    let document = match row.get("document") {
        Some(d) if !d.is_empty() => d.clone(),
        _ => {
            tracing::warn!("skipping result row without a document binding");
            return None;
        }
    };

    let field = |name: &str| row.get(name).cloned().unwrap_or_default();

    Some(DocumentResult {
        document,
        title: field("title"),
        date: field("date"),
        publisher: field("publisher"),
        lang: field("lang"),
        link_pdf: field("linkPDF"),
        authors: decode_authors(&field("authors")),
        matched_entities: with_entities
            .then(|| decode_entity_matches(&field("matchedEntities"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn pair(uri: &str, label: &str) -> EntityMatch {
        EntityMatch {
            entity_uri: uri.to_string(),
            entity_label: label.to_string(),
        }
    }

    fn encode(matches: &[EntityMatch]) -> String {
        matches
            .iter()
            .map(|m| format!("{}{}{}", m.entity_uri, FIELD_SEPARATOR, m.entity_label))
            .collect::<Vec<_>>()
            .join(ENTRY_SEPARATOR)
    }

    #[test]
    fn test_decode_round_trip() {
        let original = vec![pair("u1", "l1"), pair("u2", "l2")];
        let encoded = encode(&original);
        assert_eq!(encoded, "u1$l1$$u2$l2");
        assert_eq!(decode_entity_matches(&encoded), original);
    }

    #[test]
    fn test_decode_single_entry() {
        assert_eq!(
            decode_entity_matches("http://w.org/Q1$Brazil"),
            vec![pair("http://w.org/Q1", "Brazil")]
        );
    }

    #[test]
    fn test_decode_empty_string() {
        assert!(decode_entity_matches("").is_empty());
    }

    #[test]
    fn test_malformed_entries_are_skipped_not_fatal() {
        // Missing label, missing URI, and no separator at all.
        assert_eq!(decode_entity_matches("u1$"), Vec::<EntityMatch>::new());
        assert_eq!(decode_entity_matches("$l1"), Vec::<EntityMatch>::new());
        assert_eq!(decode_entity_matches("laurel"), Vec::<EntityMatch>::new());
        // A malformed entry between two valid ones drops only itself.
        assert_eq!(
            decode_entity_matches("u1$l1$$broken$$u2$l2"),
            vec![pair("u1", "l1"), pair("u2", "l2")]
        );
    }

    #[test]
    fn test_decode_authors() {
        assert_eq!(
            decode_authors("Doe, J.$$Pérez, M."),
            vec!["Doe, J.".to_string(), "Pérez, M.".to_string()]
        );
        assert!(decode_authors("").is_empty());
    }

    #[test]
    fn test_decode_document_row() {
        let mut row: RawRow = HashMap::new();
        row.insert("document".into(), "http://d.org/doc1".into());
        row.insert("title".into(), "Coffee rust outlook".into());
        row.insert("date".into(), "2021-03-01".into());
        row.insert("authors".into(), "Doe, J.$$Roe, R.".into());
        row.insert("matchedEntities".into(), "u1$Coffee$$u2$Rust".into());

        let doc = decode_document_row(&row, true).unwrap();
        assert_eq!(doc.document, "http://d.org/doc1");
        assert_eq!(doc.authors.len(), 2);
        assert_eq!(
            doc.matched_entities.unwrap(),
            vec![pair("u1", "Coffee"), pair("u2", "Rust")]
        );
        // Absent bindings decode to empty strings.
        assert_eq!(doc.publisher, "");
    }

    #[test]
    fn test_decode_document_row_without_entities() {
        let mut row: RawRow = HashMap::new();
        row.insert("document".into(), "http://d.org/doc1".into());
        row.insert("matchedEntities".into(), "u1$Coffee".into());

        let doc = decode_document_row(&row, false).unwrap();
        assert!(doc.matched_entities.is_none());
    }

    #[test]
    fn test_decode_document_row_requires_document_key() {
        let mut row: RawRow = HashMap::new();
        row.insert("title".into(), "orphan row".into());
        assert!(decode_document_row(&row, true).is_none());

        row.insert("document".into(), String::new());
        assert!(decode_document_row(&row, true).is_none());
    }
}
