//! Bracket-averaged linking accuracy.
//!
//! Documents are grouped into brackets (e.g. by difficulty); accuracy is
//! computed per bracket from pooled counts, then averaged over brackets so
//! that each bracket weighs the same regardless of its size.
//!
//! ```text
//!   doc ──► DocumentTally::score ──► BracketEvaluator::add(doc_id)
//!                                        │  BracketMap: doc_id → bracket
//!                                        ▼
//!                                    per-bracket sums ──► BracketReport
//! ```

use crate::annotation::TextAnnotation;
use crate::config::CoherenceConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::AddAssign;
use std::path::Path;

/// Label a linker emits when it has no knowledge-base entry for a mention.
pub const UNKNOWN_WID: &str = "<unk_wid>";

// =============================================================================
// Bracket map
// =============================================================================

/// Document id → bracket assignment, read from a `doc_id \t bracket` TSV.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BracketMap {
    by_doc: HashMap<String, String>,
    brackets: BTreeSet<String>,
}

impl BracketMap {
    /// Load a bracket TSV from disk.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be opened, [`Error::Evaluation`] for
    /// a malformed row.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let map = Self::from_reader(BufReader::new(File::open(path)?))?;
        log::info!(
            "Loaded bracket map {}: {} documents in {} brackets",
            path.display(),
            map.len(),
            map.brackets.len()
        );
        Ok(map)
    }

    /// Parse bracket rows. Blank lines are skipped; extra columns are ignored.
    ///
    /// # Errors
    ///
    /// [`Error::Evaluation`] naming the first row with fewer than two columns.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut map = Self::default();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut cols = line.split('\t');
            match (cols.next(), cols.next()) {
                (Some(doc), Some(bracket)) => map.insert(doc, bracket),
                _ => {
                    return Err(Error::evaluation(format!(
                        "bracket map line {}: expected `doc_id<TAB>bracket`",
                        i + 1
                    )))
                }
            }
        }
        Ok(map)
    }

    /// Assign `doc_id` to `bracket`.
    pub fn insert(&mut self, doc_id: impl Into<String>, bracket: impl Into<String>) {
        let bracket = bracket.into();
        self.brackets.insert(bracket.clone());
        self.by_doc.insert(doc_id.into(), bracket);
    }

    /// Bracket of `doc_id`.
    #[must_use]
    pub fn bracket(&self, doc_id: &str) -> Option<&str> {
        self.by_doc.get(doc_id).map(String::as_str)
    }

    /// All brackets, sorted.
    pub fn brackets(&self) -> impl Iterator<Item = &str> + '_ {
        self.brackets.iter().map(String::as_str)
    }

    /// Number of assigned documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_doc.len()
    }

    /// True when no document is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_doc.is_empty()
    }
}

// =============================================================================
// Per-document counts
// =============================================================================

/// Names of the views and key an evaluation reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalViews {
    /// Linker output view.
    pub el_view: String,
    /// Gold label view.
    pub gold_view: String,
    /// Re-ranked view.
    pub coherence_view: String,
    /// Candidate map key on linker constituents.
    pub candidate_map: String,
}

impl From<&CoherenceConfig> for EvalViews {
    fn from(config: &CoherenceConfig) -> Self {
        Self {
            el_view: config.el_view.clone(),
            gold_view: config.gold_view.clone(),
            coherence_view: config.coherence_view.clone(),
            candidate_map: config.candidate_map.clone(),
        }
    }
}

impl Default for EvalViews {
    fn default() -> Self {
        Self::from(&CoherenceConfig::default())
    }
}

/// Counts for one document (or, summed, for a bracket).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTally {
    /// Gold mentions.
    pub mentions: usize,
    /// Linker labels equal to gold.
    pub correct: usize,
    /// Linker labels equal to [`UNKNOWN_WID`].
    pub unknown: usize,
    /// Linker labels other than [`UNKNOWN_WID`].
    pub known: usize,
    /// Known linker labels equal to gold.
    pub known_correct: usize,
    /// Mentions whose gold label is among the candidates.
    pub gold_in_candidates: usize,
    /// As above, restricted to capitalized gold labels.
    pub gold_in_candidates_capitalized: usize,
    /// Re-ranked labels equal to gold.
    pub coherence_correct: usize,
    /// Mentions whose re-ranked label differs from the linker's.
    pub changed: usize,
}

impl DocumentTally {
    /// Count one document.
    ///
    /// Linker, coherence and gold constituents are joined on their `start`
    /// token.
    ///
    /// # Errors
    ///
    /// [`Error::MissingView`] for an absent view; [`Error::Evaluation`] when a
    /// linker or coherence mention has no gold or coherence counterpart at
    /// the same start; [`Error::Annotation`] for a malformed candidate map.
    pub fn score(ta: &TextAnnotation, views: &EvalViews) -> Result<Self> {
        let gold = ta.labels_by_start(&views.gold_view)?;
        let coherence = ta.labels_by_start(&views.coherence_view)?;
        let el = ta.require_view(&views.el_view)?;

        let mut tally = Self {
            mentions: gold.len(),
            ..Self::default()
        };

        for c in el.constituents() {
            let gold_label = join(&gold, &ta.id, c.start, &views.gold_view)?;
            let coherence_label = join(&coherence, &ta.id, c.start, &views.coherence_view)?;
            let label = c.label.as_str();

            if coherence_label != label {
                log::debug!(
                    "{}@{}: {} -> {} (gold {})",
                    ta.id,
                    c.start,
                    label,
                    coherence_label,
                    gold_label
                );
                tally.changed += 1;
            }
            if label == UNKNOWN_WID {
                tally.unknown += 1;
            } else {
                tally.known += 1;
                if label == gold_label {
                    tally.correct += 1;
                    tally.known_correct += 1;
                }
            }

            let candidates = c
                .candidate_map(&views.candidate_map)
                .map_err(|e| Error::annotation(format!("document '{}': {}", ta.id, e)))?;
            if candidates.contains(&gold_label) {
                tally.gold_in_candidates += 1;
                if gold_label.chars().next().is_some_and(char::is_uppercase) {
                    tally.gold_in_candidates_capitalized += 1;
                }
            }
        }

        for c in ta.require_view(&views.coherence_view)?.constituents() {
            if join(&gold, &ta.id, c.start, &views.gold_view)? == c.label {
                tally.coherence_correct += 1;
            }
        }
        Ok(tally)
    }
}

impl AddAssign for DocumentTally {
    fn add_assign(&mut self, rhs: Self) {
        self.mentions += rhs.mentions;
        self.correct += rhs.correct;
        self.unknown += rhs.unknown;
        self.known += rhs.known;
        self.known_correct += rhs.known_correct;
        self.gold_in_candidates += rhs.gold_in_candidates;
        self.gold_in_candidates_capitalized += rhs.gold_in_candidates_capitalized;
        self.coherence_correct += rhs.coherence_correct;
        self.changed += rhs.changed;
    }
}

fn join(labels: &HashMap<usize, &str>, doc: &str, start: usize, view: &str) -> Result<String> {
    labels.get(&start).map(|s| s.to_string()).ok_or_else(|| {
        Error::evaluation(format!(
            "document '{}': no {} mention starting at token {}",
            doc, view, start
        ))
    })
}

fn ratio(num: usize, den: usize) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

// =============================================================================
// Accumulation and report
// =============================================================================

/// Accumulates document tallies per bracket.
#[derive(Debug, Clone)]
pub struct BracketEvaluator<'a> {
    map: &'a BracketMap,
    sums: BTreeMap<String, (usize, DocumentTally)>,
}

impl<'a> BracketEvaluator<'a> {
    /// Start an evaluation over the brackets of `map`.
    #[must_use]
    pub fn new(map: &'a BracketMap) -> Self {
        Self {
            map,
            sums: BTreeMap::new(),
        }
    }

    /// Add the tally of `doc_id` to its bracket.
    ///
    /// # Errors
    ///
    /// [`Error::Evaluation`] when `doc_id` has no bracket.
    pub fn add(&mut self, doc_id: &str, tally: DocumentTally) -> Result<()> {
        let bracket = self
            .map
            .bracket(doc_id)
            .ok_or_else(|| Error::evaluation(format!("document '{}' has no bracket", doc_id)))?;
        let entry = self.sums.entry(bracket.to_string()).or_default();
        entry.0 += 1;
        entry.1 += tally;
        Ok(())
    }

    /// Documents added so far.
    #[must_use]
    pub fn documents(&self) -> usize {
        self.sums.values().map(|(n, _)| n).sum()
    }

    /// Per-bracket tallies and bracket-averaged accuracies.
    ///
    /// Every bracket of the map is reported. A bracket with no mentions (or
    /// no known labels, for known accuracy) has no accuracy and is left out
    /// of the corresponding average.
    #[must_use]
    pub fn report(&self) -> BracketReport {
        let brackets: Vec<BracketSummary> = self
            .map
            .brackets()
            .map(|name| {
                let (documents, tally) = self.sums.get(name).copied().unwrap_or_default();
                if tally.mentions == 0 {
                    log::warn!("Bracket '{}' has no mentions; excluded from averages", name);
                }
                BracketSummary {
                    bracket: name.to_string(),
                    documents,
                    accuracy: ratio(tally.correct, tally.mentions),
                    known_accuracy: ratio(tally.known_correct, tally.known),
                    coherence_accuracy: ratio(tally.coherence_correct, tally.mentions),
                    tally,
                }
            })
            .collect();

        let average = |f: fn(&BracketSummary) -> Option<f64>| {
            let values: Vec<f64> = brackets.iter().filter_map(f).collect();
            (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
        };

        let report = BracketReport {
            documents: self.documents(),
            accuracy: average(|b| b.accuracy),
            known_accuracy: average(|b| b.known_accuracy),
            coherence_accuracy: average(|b| b.coherence_accuracy),
            brackets,
        };
        log::info!(
            "Evaluated {} documents: accuracy {}, coherence accuracy {}",
            report.documents,
            fmt_pct(report.accuracy),
            fmt_pct(report.coherence_accuracy)
        );
        report
    }
}

/// One bracket of a [`BracketReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketSummary {
    /// Bracket name.
    pub bracket: String,
    /// Documents in this bracket.
    pub documents: usize,
    /// Pooled counts.
    pub tally: DocumentTally,
    /// `correct / mentions`.
    pub accuracy: Option<f64>,
    /// `known_correct / known`.
    pub known_accuracy: Option<f64>,
    /// `coherence_correct / mentions`.
    pub coherence_accuracy: Option<f64>,
}

/// Bracket-averaged accuracies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketReport {
    /// Documents evaluated.
    pub documents: usize,
    /// Mean linker accuracy over brackets with mentions.
    pub accuracy: Option<f64>,
    /// Mean accuracy on known labels over brackets with known labels.
    pub known_accuracy: Option<f64>,
    /// Mean coherence accuracy over brackets with mentions.
    pub coherence_accuracy: Option<f64>,
    /// Per-bracket detail, sorted by bracket name.
    pub brackets: Vec<BracketSummary>,
}

fn fmt_pct(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| format!("{:.1}%", v * 100.0))
}

impl BracketReport {
    /// Human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== Bracket Evaluation ({} documents) ===\n", self.documents));
        out.push_str(&format!("  Average accuracy:           {}\n", fmt_pct(self.accuracy)));
        out.push_str(&format!("  Average known accuracy:     {}\n", fmt_pct(self.known_accuracy)));
        out.push_str(&format!(
            "  Average coherence accuracy: {}\n",
            fmt_pct(self.coherence_accuracy)
        ));
        if !self.brackets.is_empty() {
            out.push_str("\n## Per Bracket\n");
            for b in &self.brackets {
                out.push_str(&format!(
                    "  {:12} docs={:<4} mentions={:<5} acc={:>6} coh={:>6} changed={}\n",
                    b.bracket,
                    b.documents,
                    b.tally.mentions,
                    fmt_pct(b.accuracy),
                    fmt_pct(b.coherence_accuracy),
                    b.tally.changed
                ));
            }
        }
        out
    }
}
