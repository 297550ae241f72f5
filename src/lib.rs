//! # coherent
//!
//! Relational coherence re-ranking for entity linking.
//!
//! An entity linker proposes, for every mention in a document, a scored set
//! of knowledge-base candidates. `coherent` re-ranks those candidates using
//! the relations between candidate entities across the whole document: a
//! candidate connected to many things the rest of the document talks about
//! is preferred, unless the linker was already confident.
//!
//! - **Relations**: [`RelationIndex`] loads `head \t relation \t tail` triples
//!   into a symmetric adjacency map.
//! - **Coherence**: [`coherence`] builds per-mention contexts, scores
//!   candidates and drives whole documents.
//! - **Annotation I/O**: [`annotation`] reads and writes TextAnnotation JSON,
//!   [`offset`] aligns char-offset gold mentions to tokens.
//! - **Datasets**: [`wned`] reads WNED gold mentions, which
//!   [`pipeline::gold_dir`] attaches to tokenized documents.
//! - **Evaluation**: [`eval`] computes bracket-averaged accuracy of the
//!   linker and coherence layers.
//!
//! ## Quick Start
//!
//! ```rust
//! use coherent::{DocumentOrchestrator, RelationIndex};
//! use coherent_core::{Document, Mention};
//!
//! let index = RelationIndex::from_triples([("Paris", "capital_of", "France")]);
//! let doc = Document::new("d1", vec![
//!     Mention::new("Paris", 0, 1, "Paris")
//!         .with_candidate("Paris", 0.9)
//!         .with_candidate("Berlin", 0.1),
//!     Mention::new("France", 3, 4, "Germany")
//!         .with_candidate("Germany", 0.5)
//!         .with_candidate("France", 0.45),
//! ]);
//!
//! let layer = DocumentOrchestrator::new(&index).process(&doc).unwrap();
//! assert_eq!(layer[1].label, "France");
//! ```
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! coherent = "0.1"                                        # library + CLI modules
//! coherent = { version = "0.1", default-features = false } # library only
//! coherent = { version = "0.1", features = ["parallel"] }  # rayon over documents
//! ```

#![warn(missing_docs)]

pub mod annotation;
#[cfg(feature = "cli")]
pub mod cli;
pub mod coherence;
pub mod config;
mod error;
pub mod eval;
pub mod offset;
pub mod pipeline;
pub mod relation;
pub mod wned;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use coherent::prelude::*;
    //!
    //! let index = RelationIndex::from_triples([("A", "r", "B")]);
    //! let orchestrator = DocumentOrchestrator::new(&index).with_strategy(ContextStrategy::Narrow);
    //! assert_eq!(orchestrator.strategy(), ContextStrategy::Narrow);
    //! ```
    pub use crate::coherence::{
        ContextStrategy, CoherenceScorer, DisambiguationContext, DocumentOrchestrator,
    };
    pub use crate::config::CoherenceConfig;
    pub use crate::error::{Error, Result};
    pub use crate::relation::{RelationIndex, RelationLookup};
    pub use coherent_core::{CandidateMap, CoherenceMention, Document, Mention};
}

// Re-exports
pub use coherence::{
    confidence_margin, BatchOutcome, CoherenceScorer, ContextStrategy, DisambiguationContext,
    DocumentFailure, DocumentOrchestrator, DocumentResult, Selection,
};
pub use config::CoherenceConfig;
pub use error::{Error, Result};
pub use pipeline::{
    annotate_coherence, gold_dir, rerank_dir, AnnotationSummary, GoldRun, RerankRun,
};
pub use relation::{RelationIndex, RelationLookup};
