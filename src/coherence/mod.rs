//! Relational coherence re-ranking.
//!
//! Mentions in the same document tend to refer to entities that are related
//! in a knowledge base. Given the linker's candidates for every mention, this
//! module re-ranks each mention's candidates by how strongly they connect to
//! what the rest of the document mentions.
//!
//! ```text
//!   Document ──► DocumentOrchestrator
//!                    │  for each mention m
//!                    ├─► DisambiguationContext::build(m, siblings, strategy)
//!                    ├─► confidence_margin(m)           (baseline)
//!                    └─► CoherenceScorer::select(m, context)
//!                              │
//!                              └─► RelationLookup::related(candidate, e)
//!                    ▼
//!   Vec<CoherenceMention>   (same spans, re-ranked labels)
//! ```
//!
//! # Example
//!
//! ```
//! use coherent::coherence::DocumentOrchestrator;
//! use coherent::RelationIndex;
//! use coherent_core::{Document, Mention};
//!
//! let index = RelationIndex::from_triples([("Paris", "capital_of", "France")]);
//! let doc = Document::new("d1", vec![
//!     Mention::new("Paris", 0, 1, "Paris")
//!         .with_candidate("Paris", 0.9)
//!         .with_candidate("Berlin", 0.1),
//!     Mention::new("France", 4, 5, "France")
//!         .with_candidate("France", 0.8)
//!         .with_candidate("Germany", 0.2),
//! ]);
//!
//! let layer = DocumentOrchestrator::new(&index).process(&doc).unwrap();
//! assert_eq!(layer[0].label, "Paris");
//! assert_eq!(layer[1].label, "France");
//! ```

pub mod confidence;
pub mod context;
pub mod orchestrator;
pub mod scorer;

pub use confidence::confidence_margin;
pub use context::{ContextStrategy, DisambiguationContext};
pub use orchestrator::{
    labels_changed, BatchOutcome, DocumentFailure, DocumentOrchestrator, DocumentResult,
};
pub use scorer::{CoherenceScorer, Selection};
