//! # coherent-core
//!
//! Core types for the coherent workspace: shared data structures used across
//! all crates.
//!
//! This crate provides:
//! - **Mention types**: `Mention`, `CandidateMap`, `Span`, `Document`
//! - **Result layer**: `CoherenceMention`, the re-ranked copy of a mention
//!
//! All other crates in the workspace depend on `coherent-core` so that the
//! algorithm, the annotation adapter and the evaluator agree on one model.

#![warn(missing_docs)]

pub mod error;
pub mod mention;

pub use error::{Error, Result};
pub use mention::{CandidateMap, CoherenceMention, Document, EntityId, Mention, Span};
