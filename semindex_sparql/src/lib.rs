//! # Semindex SPARQL
//!
//! The two external collaborators of the semantic index core:
//!
//! - [`templates`] — the query store: `.sparql` templates loaded from disk at
//!   startup, with `{id}` scalar substitution and `{triples}` block
//!   substitution for the multi-URI search queries.
//! - [`client`] — the triple-store client: a [`TripleStore`] trait (so
//!   handlers can be tested against a mock) and the [`HttpSparqlClient`]
//!   implementation speaking the SPARQL protocol over HTTP.

pub mod client;
pub mod templates;

pub use client::{HttpSparqlClient, QueryMethod, SparqlError, TripleStore};
pub use templates::{
    triple_block, QueryStore, PLAIN_DESCRIPTOR_PATTERN, RELATED_CONCEPT_PATTERN,
    SUB_CONCEPT_PATTERN,
};
