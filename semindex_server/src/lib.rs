//! # Semindex Server Library
//!
//! Shared types, application state, and route handlers for the semantic
//! index REST API.
//!
//! Separated from `main.rs` so that handlers can be integration-tested with
//! a mock triple-store and without starting a real TCP listener.

pub mod error;
pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;
