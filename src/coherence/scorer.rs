//! Coherence scoring: relational evidence plus the linker's prior.
//!
//! # Algorithm
//!
//! For a mention with candidates `c₁..cₙ` and disambiguation context `C`:
//!
//! ```text
//!   rel(c)      = |{ e ∈ C : related(c, e) }|
//!   norm(c)     = rel(c) / (|C| - 1)          (0 when |C| - 1 ≤ 0)
//!   combined(c) = norm(c) + prior(c)
//!
//!   best ← (margin, linker label)
//!   for c in candidates, in insertion order:
//!       if combined(c) > best.score: best ← (combined(c), c)
//! ```
//!
//! The seed is the confidence margin, so the linker's pick survives unless
//! some candidate's combined score strictly exceeds it. Strict `>` means the
//! first candidate in insertion order wins an exact tie. Single-candidate
//! mentions short-circuit before any relation lookup.
//!
//! The normalizer is `|C| - 1`, not `|C|`; scores stay comparable with
//! earlier coherence runs.

use super::confidence::confidence_margin;
use super::context::DisambiguationContext;
use crate::relation::RelationLookup;
use coherent_core::{EntityId, Mention, Result};

/// Outcome of scoring one mention.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Selected entity id.
    pub label: EntityId,
    /// Score of the selected entity (the margin if nothing beat it).
    pub score: f64,
}

/// Re-ranks a mention's candidates using a shared relation lookup.
pub struct CoherenceScorer<'g, G: RelationLookup + ?Sized> {
    relations: &'g G,
}

impl<G: RelationLookup + ?Sized> Clone for CoherenceScorer<'_, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G: RelationLookup + ?Sized> Copy for CoherenceScorer<'_, G> {}

impl<G: RelationLookup + ?Sized> std::fmt::Debug for CoherenceScorer<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoherenceScorer").finish_non_exhaustive()
    }
}

impl<'g, G: RelationLookup + ?Sized> CoherenceScorer<'g, G> {
    /// Create a scorer over a read-only relation lookup.
    pub fn new(relations: &'g G) -> Self {
        Self { relations }
    }

    /// Number of context entities related to `candidate`.
    pub fn relational_score(&self, candidate: &str, context: &DisambiguationContext<'_>) -> usize {
        context
            .iter()
            .filter(|entity| self.relations.related(candidate, entity))
            .count()
    }

    /// Relational score divided by `|context| - 1`, or 0 when that is not positive.
    pub fn normalized_relational_score(
        &self,
        candidate: &str,
        context: &DisambiguationContext<'_>,
    ) -> f64 {
        let Some(normalizer) = context.len().checked_sub(1).filter(|z| *z > 0) else {
            return 0.0;
        };
        self.relational_score(candidate, context) as f64 / normalizer as f64
    }

    /// Pick the final label for `mention` given its context.
    ///
    /// # Errors
    ///
    /// [`coherent_core::Error::NoCandidates`] when the mention has no
    /// candidates; nothing is scored in that case.
    pub fn select(
        &self,
        mention: &Mention,
        context: &DisambiguationContext<'_>,
    ) -> Result<Selection> {
        mention.ensure_candidates()?;
        let baseline = confidence_margin(&mention.candidates)?;

        if let Some((label, _)) = mention.candidates.sole() {
            return Ok(Selection {
                label: label.to_string(),
                score: baseline,
            });
        }

        let mut best_score = baseline;
        let mut best_label = mention.label.as_str();
        for (candidate, prior) in mention.candidates.iter() {
            let combined = self.normalized_relational_score(candidate, context) + prior;
            if combined > best_score {
                best_score = combined;
                best_label = candidate;
            }
        }

        Ok(Selection {
            label: best_label.to_string(),
            score: best_score,
        })
    }
}
