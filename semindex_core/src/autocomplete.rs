//! Two-tier autocomplete ranking over the entity catalog.
//!
//! Ranking policy, per filter invocation:
//!
//! 1. **Tier 1** — entries whose lowercased label *starts with* the lowercased
//!    input, collected in catalog order while a shared counter is below the
//!    cap, then sorted case-insensitively by label (stable on ties).
//! 2. **Tier 2** — entries whose lowercased label *contains* the input and
//!    that are not already in Tier 1 (keyed by `(lowercased label, URI)` so a
//!    same-label, different-URI entity still qualifies), collected only while
//!    the same counter remains below the cap, sorted the same way.
//!
//! The result is Tier 1 followed by Tier 2 — never re-merged, so a prefix
//! match always outranks a substring match regardless of label. When several
//! source filters are requested, each filter re-applies the full cap and the
//! concatenated result is re-sorted case-insensitively.
//!
//! Fully synchronous and deterministic; no I/O.

use std::collections::HashSet;

use thiserror::Error;

use crate::catalog::EntityCatalog;
use crate::types::Entity;

/// Tag selecting which sub-catalog an autocomplete invocation searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFilter {
    /// The full combined catalog (`all` tag or absent parameter).
    All,
    /// One named sub-catalog.
    Source(String),
}

/// A filter tag that names no loaded sub-catalog.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value '{0}' for argument entityType")]
pub struct UnknownSourceTag(pub String);

/// Parse the raw `entityType` parameter into source filters.
///
/// `raw` is a comma-separated tag list; `None` or an empty string selects the
/// combined catalog. Any unrecognized tag fails the whole parse — a request
/// mixing valid and invalid tags must not get partial results.
pub fn parse_filters(
    catalog: &EntityCatalog,
    raw: Option<&str>,
) -> Result<Vec<SourceFilter>, UnknownSourceTag> {
    let raw = match raw {
        Some(r) if !r.trim().is_empty() => r,
        _ => return Ok(vec![SourceFilter::All]),
    };

    let mut filters = Vec::new();
    for tag in raw.split(',') {
        let tag = tag.trim();
        if tag == "all" {
            filters.push(SourceFilter::All);
        } else if catalog.has_source(tag) {
            filters.push(SourceFilter::Source(tag.to_string()));
        } else {
            return Err(UnknownSourceTag(tag.to_string()));
        }
    }
    Ok(filters)
}

/// Rank catalog entries against `input` under the given filters and cap.
///
/// Each filter invocation independently applies the full `cap`; with more
/// than one filter the concatenated lists are re-sorted case-insensitively
/// by label before being returned. Empty input matches every entry.
pub fn suggest(
    catalog: &EntityCatalog,
    input: &str,
    filters: &[SourceFilter],
    cap: usize,
) -> Vec<Entity> {
    let input_lower = input.to_lowercase();

    let mut results = Vec::new();
    for filter in filters {
        results.extend(suggest_source(catalog, filter, &input_lower, cap));
    }

    if filters.len() > 1 {
        results.sort_by(|a, b| {
            a.entity_label
                .to_lowercase()
                .cmp(&b.entity_label.to_lowercase())
        });
    }
    results
}

/// One filter invocation of the two-tier ranking.
fn suggest_source(
    catalog: &EntityCatalog,
    filter: &SourceFilter,
    input_lower: &str,
    cap: usize,
) -> Vec<Entity> {
    let candidates: Vec<&Entity> = match filter {
        SourceFilter::All => catalog.entries().iter().collect(),
        SourceFilter::Source(tag) => catalog
            .entries()
            .iter()
            .filter(|e| e.entity_type == *tag)
            .collect(),
    };

    // Tier 1: prefix matches, in catalog order, counted against the cap.
    let mut tier1: Vec<Entity> = Vec::new();
    let mut tier1_keys: HashSet<(String, String)> = HashSet::new();
    for entity in &candidates {
        if tier1.len() >= cap {
            break;
        }
        let label_lower = entity.entity_label.to_lowercase();
        if label_lower.starts_with(input_lower) {
            tier1_keys.insert((label_lower, entity.entity_uri.clone()));
            tier1.push((*entity).clone());
        }
    }

    // Tier 2: substring matches not already selected, sharing the counter.
    let mut selected = tier1.len();
    let mut tier2: Vec<Entity> = Vec::new();
    for entity in &candidates {
        if selected >= cap {
            break;
        }
        let label_lower = entity.entity_label.to_lowercase();
        if label_lower.contains(input_lower)
            && !tier1_keys.contains(&(label_lower, entity.entity_uri.clone()))
        {
            tier2.push((*entity).clone());
            selected += 1;
        }
    }

    let by_label =
        |a: &Entity, b: &Entity| a.entity_label.to_lowercase().cmp(&b.entity_label.to_lowercase());
    tier1.sort_by(by_label);
    tier2.sort_by(by_label);

    tier1.extend(tier2);
    tier1
}
