//! Evaluation of linker and coherence layers against gold labels.
//!
//! # Example
//!
//! ```rust,ignore
//! use coherent::eval::{evaluate_dir, BracketMap, EvalViews};
//!
//! let brackets = BracketMap::load("data/wikipedia-name2bracket.tsv")?;
//! let run = evaluate_dir("out/annotated", &brackets, &EvalViews::default())?;
//! println!("{}", run.report.summary());
//! ```

pub mod bracket;

pub use bracket::{
    BracketEvaluator, BracketMap, BracketReport, BracketSummary, DocumentTally, EvalViews,
    UNKNOWN_WID,
};

use crate::annotation::{self, TextAnnotation};
use crate::coherence::DocumentFailure;
use crate::error::Result;
use std::path::Path;

/// Report plus the documents that could not be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRun {
    /// Bracket-averaged results over the evaluated documents.
    pub report: BracketReport,
    /// Documents skipped (unreadable, missing views, no bracket).
    pub skipped: Vec<DocumentFailure>,
}

/// Evaluate a set of documents.
///
/// Documents that fail to score or have no bracket are logged and skipped.
pub fn evaluate_documents<'a>(
    documents: impl IntoIterator<Item = &'a TextAnnotation>,
    brackets: &BracketMap,
    views: &EvalViews,
) -> EvaluationRun {
    let mut evaluator = BracketEvaluator::new(brackets);
    let mut skipped = Vec::new();
    for ta in documents {
        let outcome = DocumentTally::score(ta, views).and_then(|t| evaluator.add(&ta.id, t));
        if let Err(e) = outcome {
            log::warn!("Skipping document '{}' in evaluation: {}", ta.id, e);
            skipped.push(DocumentFailure {
                doc_id: ta.id.clone(),
                error: e.to_string(),
            });
        }
    }
    EvaluationRun {
        report: evaluator.report(),
        skipped,
    }
}

/// Evaluate every document of an annotated directory.
///
/// # Errors
///
/// [`crate::Error::Io`] if the directory cannot be listed. Per-file read
/// errors are reported in [`EvaluationRun::skipped`].
pub fn evaluate_dir(
    dir: impl AsRef<Path>,
    brackets: &BracketMap,
    views: &EvalViews,
) -> Result<EvaluationRun> {
    let mut unreadable = Vec::new();
    let mut documents = Vec::new();
    for (path, parsed) in annotation::read_dir(dir)? {
        match parsed {
            Ok(ta) => documents.push(ta),
            Err(e) => {
                log::warn!("Skipping unreadable document {}: {}", path.display(), e);
                unreadable.push(DocumentFailure {
                    doc_id: path.display().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }
    let mut run = evaluate_documents(&documents, brackets, views);
    unreadable.append(&mut run.skipped);
    run.skipped = unreadable;
    Ok(run)
}
