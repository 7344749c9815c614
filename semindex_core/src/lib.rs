//! # Semindex Core
//!
//! Pure in-memory core of the semantic index backend. This crate has no
//! network or disk I/O on the request path: the entity catalog is built once
//! at startup, and the autocomplete and join engines compute over data that
//! callers hand them.
//!
//! The three pieces worth knowing:
//! - [`catalog`] — the immutable vocabulary catalog loaded from static dumps
//! - [`autocomplete`] — two-tier prefix/substring ranking under a result cap
//! - [`join`] — N-way intersection of per-descriptor document result sets

pub mod autocomplete;
pub mod catalog;
pub mod fields;
pub mod join;
pub mod types;

pub use autocomplete::{parse_filters, suggest, SourceFilter, UnknownSourceTag};
pub use catalog::EntityCatalog;
pub use fields::{decode_authors, decode_document_row, decode_entity_matches};
pub use join::join_by_intersection;
pub use types::{DocumentResult, Entity, EntityMatch, RawRow};
