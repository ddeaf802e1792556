//! Shared domain model for the circulation workspace.
//!
//! Everything in this crate is plain data: entities, typed identifiers,
//! the error taxonomy, and the injected clock / id-generation capabilities.
//! Behavior lives in `circ-core`.

pub mod clock;
pub mod config;
pub mod error;
pub mod ident;
pub mod model;
