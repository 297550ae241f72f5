//! Document-level driver: one coherence layer per document.

use super::context::{ContextStrategy, DisambiguationContext};
use super::scorer::CoherenceScorer;
use crate::relation::RelationLookup;
use coherent_core::{CoherenceMention, Document, Error as CoreError};
use serde::Serialize;

/// Runs context building and scoring over every mention of a document.
pub struct DocumentOrchestrator<'g, G: RelationLookup + ?Sized> {
    scorer: CoherenceScorer<'g, G>,
    strategy: ContextStrategy,
}

impl<G: RelationLookup + ?Sized> std::fmt::Debug for DocumentOrchestrator<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentOrchestrator")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl<'g, G: RelationLookup + ?Sized> DocumentOrchestrator<'g, G> {
    /// Create an orchestrator using the default (broad) context strategy.
    pub fn new(relations: &'g G) -> Self {
        Self {
            scorer: CoherenceScorer::new(relations),
            strategy: ContextStrategy::default(),
        }
    }

    /// Set the context strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ContextStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Context strategy in use.
    pub fn strategy(&self) -> ContextStrategy {
        self.strategy
    }

    /// Re-rank every mention of `document`.
    ///
    /// The output has one entry per input mention, in input order, each with
    /// the input span copied verbatim. The document is not modified.
    ///
    /// # Errors
    ///
    /// [`CoreError::NoCandidates`] for the first mention with an empty
    /// candidate map. The whole document is validated before any mention is
    /// scored.
    pub fn process(&self, document: &Document) -> Result<Vec<CoherenceMention>, CoreError> {
        document.validate()?;
        let mentions = &document.mentions;
        let mut results = Vec::with_capacity(mentions.len());
        for (i, mention) in mentions.iter().enumerate() {
            let others = mentions
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, m)| m);
            let context = DisambiguationContext::build(mention, others, self.strategy);
            let selection = self.scorer.select(mention, &context)?;
            results.push(CoherenceMention::from_mention(
                mention,
                selection.label,
                selection.score,
            ));
        }

        log::debug!(
            "Document '{}': {} mentions, {} labels changed by coherence",
            document.id,
            mentions.len(),
            labels_changed(document, &results)
        );
        Ok(results)
    }

    /// Re-rank a batch of documents, isolating failures per document.
    ///
    /// A document that fails is logged and reported in
    /// [`BatchOutcome::failures`]; the rest of the batch still runs. Results
    /// keep the input order of the successful documents, and each carries
    /// its position in `documents`. With the `parallel` feature documents
    /// are scored on the rayon pool.
    pub fn process_batch(&self, documents: &[Document]) -> BatchOutcome {
        #[cfg(feature = "parallel")]
        let outcomes: Vec<_> = {
            use rayon::prelude::*;
            documents
                .par_iter()
                .enumerate()
                .map(|(index, doc)| (index, doc, self.process(doc)))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<_> = documents
            .iter()
            .enumerate()
            .map(|(index, doc)| (index, doc, self.process(doc)))
            .collect();

        let mut batch = BatchOutcome::default();
        for (index, doc, outcome) in outcomes {
            match outcome {
                Ok(mentions) => batch.documents.push(DocumentResult {
                    index,
                    doc_id: doc.id.clone(),
                    changed: labels_changed(doc, &mentions),
                    mentions,
                }),
                Err(error) => {
                    log::warn!("Skipping document '{}': {}", doc.id, error);
                    batch.failures.push(DocumentFailure {
                        doc_id: doc.id.clone(),
                        error: error.to_string(),
                    });
                }
            }
        }
        batch
    }
}

/// Number of mentions whose coherence label differs from the linker's.
#[must_use]
pub fn labels_changed(document: &Document, layer: &[CoherenceMention]) -> usize {
    layer
        .iter()
        .zip(&document.mentions)
        .filter(|(out, m)| out.label != m.label)
        .count()
}

/// Coherence layer of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentResult {
    /// Position of the document in the batch.
    pub index: usize,
    /// Document id.
    pub doc_id: String,
    /// Re-ranked mentions, in input order.
    pub mentions: Vec<CoherenceMention>,
    /// Mentions whose label changed.
    pub changed: usize,
}

/// A document that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    /// Document id.
    pub doc_id: String,
    /// Rendered error.
    pub error: String,
}

/// Result of [`DocumentOrchestrator::process_batch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// Successfully processed documents.
    pub documents: Vec<DocumentResult>,
    /// Documents skipped because of data errors.
    pub failures: Vec<DocumentFailure>,
}

impl BatchOutcome {
    /// True when every document was processed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
