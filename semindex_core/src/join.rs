//! N-way intersection of per-descriptor document result sets.
//!
//! Each descriptor URI gets its own independent query; the engine waits for
//! every outcome to settle (a barrier, not a race) and then reduces the
//! result sets in the order the identifiers were supplied:
//!
//! - the first identifier's rows seed the accumulator, keyed by `document`;
//! - every later result set filters the accumulator down to documents it
//!   also contains (strict intersection), then merges its entity matches
//!   into the survivors, deduplicated by URI with the first-seen label kept.
//!
//! A query that settles with an error contributes an empty result set, which
//! empties the intersection: a document only appears in the output when every
//! identifier's query vouched for it. The failure is logged, never read as a
//! success value, and never aborts queries still in flight.
//!
//! The engine is parameterized by the row-producing function, so the
//! sub-concept and related-concept endpoints share it unchanged.

use std::collections::HashMap;
use std::future::Future;

use futures::future::join_all;

use crate::fields::{decode_document_row, decode_entity_matches};
use crate::types::{DocumentResult, RawRow};

/// Intersect the result sets of one query per identifier.
///
/// Returns immediately with an empty vector when `identifiers` is empty —
/// no query is dispatched. Output preserves the insertion order of the
/// seeding identifier's rows, filtered by the later intersections.
pub async fn join_by_intersection<F, Fut, E>(
    identifiers: &[String],
    run_query: F,
) -> Vec<DocumentResult>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<RawRow>, E>>,
    E: std::fmt::Display,
{
    if identifiers.is_empty() {
        return Vec::new();
    }

    // Dispatch all queries in parallel and wait for every outcome.
    let outcomes = join_all(identifiers.iter().map(|id| run_query(id.clone()))).await;

    let mut accumulator: Vec<DocumentResult> = Vec::new();
    for (index, (identifier, outcome)) in identifiers.iter().zip(outcomes).enumerate() {
        let rows = match outcome {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(
                    identifier = %identifier,
                    error = %err,
                    "descriptor query failed; treating its result set as empty"
                );
                Vec::new()
            }
        };

        if index == 0 {
            accumulator = rows
                .iter()
                .filter_map(|row| decode_document_row(row, true))
                .collect();
            continue;
        }

        // Key this identifier's rows by document; the first row wins when a
        // document appears more than once.
        let mut by_document: HashMap<&str, &RawRow> = HashMap::new();
        for row in &rows {
            if let Some(document) = row.get("document") {
                by_document.entry(document.as_str()).or_insert(row);
            }
        }

        // Strict AND: drop documents this identifier did not return.
        accumulator.retain(|doc| by_document.contains_key(doc.document.as_str()));

        // Merge the survivors' matched entities, first-seen label wins.
        for doc in &mut accumulator {
            let Some(row) = by_document.get(doc.document.as_str()) else {
                continue;
            };
            let incoming = row
                .get("matchedEntities")
                .map(|raw| decode_entity_matches(raw))
                .unwrap_or_default();
            let merged = doc.matched_entities.get_or_insert_with(Vec::new);
            for candidate in incoming {
                if !merged.iter().any(|m| m.entity_uri == candidate.entity_uri) {
                    merged.push(candidate);
                }
            }
        }
    }

    accumulator
}
