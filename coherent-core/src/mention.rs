//! Mentions, candidate maps, and the coherence layer they produce.
//!
//! A [`Mention`] is a token span that an upstream linker has already
//! resolved once: it carries the linker's pick (`label`) together with every
//! candidate title it considered and the raw score it gave each one.
//!
//! ```text
//!   tokens   "Paris"            span [4, 5)
//!   label    "Paris"            (the linker's pick)
//!   candidates
//!     Paris           0.90      ─┐
//!     Paris_Hilton    0.07       ├─ insertion order is preserved
//!     Paris,_Texas    0.03      ─┘
//! ```
//!
//! Re-ranking never mutates a mention. It emits a [`CoherenceMention`] that
//! copies the span verbatim, so downstream consumers can join the original,
//! gold and coherence layers on `start`.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque knowledge-base identifier (e.g. a Wikipedia title).
pub type EntityId = String;

// =============================================================================
// Span
// =============================================================================

/// Half-open token span `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    /// First token index.
    pub start: usize,
    /// One past the last token index.
    pub end: usize,
}

impl Span {
    /// Create a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of tokens covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when the span covers no tokens.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// =============================================================================
// CandidateMap
// =============================================================================

/// Insertion-ordered map from candidate entity id to the linker's raw score.
///
/// Scores are unbounded reals; they are not probabilities and are never
/// clamped. Iteration order is the order candidates were inserted (or the
/// order they appeared in the source JSON), which makes "first candidate
/// wins a tie" a well-defined rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateMap(IndexMap<EntityId, f64>);

impl CandidateMap {
    /// Create an empty candidate map.
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Add a candidate, builder style.
    #[must_use]
    pub fn with_candidate(mut self, id: impl Into<EntityId>, score: f64) -> Self {
        self.insert(id, score);
        self
    }

    /// Insert or overwrite a candidate. Overwriting keeps the original position.
    pub fn insert(&mut self, id: impl Into<EntityId>, score: f64) -> Option<f64> {
        self.0.insert(id.into(), score)
    }

    /// Raw score of a candidate.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<f64> {
        self.0.get(id).copied()
    }

    /// Whether `id` is one of the candidates.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Candidate ids in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    /// Raw scores in insertion order.
    pub fn scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.values().copied()
    }

    /// `(id, score)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.0.iter().map(|(id, score)| (id.as_str(), *score))
    }

    /// The only candidate, if there is exactly one.
    #[must_use]
    pub fn sole(&self) -> Option<(&str, f64)> {
        if self.0.len() == 1 {
            self.iter().next()
        } else {
            None
        }
    }
}

impl<K: Into<EntityId>> FromIterator<(K, f64)> for CandidateMap {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// =============================================================================
// Mention
// =============================================================================

/// A linked mention as produced by the upstream entity linker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    /// Surface text of the mention.
    pub tokens: String,
    /// First token index.
    pub start: usize,
    /// One past the last token index.
    pub end: usize,
    /// Label currently assigned by the linker.
    pub label: EntityId,
    /// Base confidence the linker attached to `label`.
    #[serde(default = "default_score")]
    pub score: f64,
    /// Every candidate the linker considered.
    #[serde(default)]
    pub candidates: CandidateMap,
}

fn default_score() -> f64 {
    1.0
}

impl Mention {
    /// Create a mention with no candidates yet.
    #[must_use]
    pub fn new(
        tokens: impl Into<String>,
        start: usize,
        end: usize,
        label: impl Into<EntityId>,
    ) -> Self {
        Self {
            tokens: tokens.into(),
            start,
            end,
            label: label.into(),
            score: default_score(),
            candidates: CandidateMap::new(),
        }
    }

    /// Add a single candidate.
    #[must_use]
    pub fn with_candidate(mut self, id: impl Into<EntityId>, score: f64) -> Self {
        self.candidates.insert(id, score);
        self
    }

    /// Replace the whole candidate map.
    #[must_use]
    pub fn with_candidates(mut self, candidates: CandidateMap) -> Self {
        self.candidates = candidates;
        self
    }

    /// Set the base confidence score.
    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// The span identity key.
    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Fail unless the mention can be scored.
    ///
    /// # Errors
    ///
    /// [`Error::NoCandidates`] when the candidate map is empty.
    pub fn ensure_candidates(&self) -> Result<()> {
        if self.candidates.is_empty() {
            return Err(Error::no_candidates(&self.tokens, self.start, self.end));
        }
        Ok(())
    }
}

// =============================================================================
// Document
// =============================================================================

/// The mentions of one entity-linking view of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier (usually the dataset's document name).
    pub id: String,
    /// Mentions in view order.
    pub mentions: Vec<Mention>,
}

impl Document {
    /// Create a document.
    #[must_use]
    pub fn new(id: impl Into<String>, mentions: Vec<Mention>) -> Self {
        Self {
            id: id.into(),
            mentions,
        }
    }

    /// Number of mentions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    /// True when there are no mentions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    /// Check every mention has at least one candidate.
    ///
    /// # Errors
    ///
    /// The first [`Error::NoCandidates`] found, in mention order.
    pub fn validate(&self) -> Result<()> {
        self.mentions.iter().try_for_each(Mention::ensure_candidates)
    }
}

// =============================================================================
// CoherenceMention
// =============================================================================

/// A mention of the coherence layer: the input span with its re-ranked label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceMention {
    /// Surface text, copied from the input mention.
    pub tokens: String,
    /// Start token index, identical to the input mention's.
    pub start: usize,
    /// End token index, identical to the input mention's.
    pub end: usize,
    /// Selected entity id.
    pub label: EntityId,
    /// Score of the selected label.
    pub score: f64,
}

impl CoherenceMention {
    /// Build a result for `mention`, copying its span.
    #[must_use]
    pub fn from_mention(mention: &Mention, label: impl Into<EntityId>, score: f64) -> Self {
        Self {
            tokens: mention.tokens.clone(),
            start: mention.start,
            end: mention.end,
            label: label.into(),
            score,
        }
    }

    /// The span identity key.
    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}
