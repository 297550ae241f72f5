//! Directory-level runs over annotation documents.
//!
//! - [`rerank_dir`]: read, score, attach the coherence view, write.
//! - [`gold_dir`]: attach NER and gold views from a WNED dataset.
//!
//! Both isolate failures per document.

use crate::annotation::{self, coherence_view, TextAnnotation};
use crate::coherence::{labels_changed, DocumentFailure, DocumentOrchestrator};
use crate::config::CoherenceConfig;
use crate::error::{Error, Result};
use crate::offset::add_gold_views;
use crate::relation::RelationLookup;
use crate::wned::WnedDocument;
use std::fs;
use std::path::{Path, PathBuf};

/// What re-ranking did to one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationSummary {
    /// Mentions re-ranked.
    pub mentions: usize,
    /// Mentions whose label changed.
    pub changed: usize,
}

/// Re-rank the linker view of `ta` and attach the coherence view.
///
/// The view names and candidate-map key come from `config`; an existing
/// view with the coherence view's name is replaced.
///
/// # Errors
///
/// Missing linker view, malformed candidate maps, or a mention with no
/// candidates. `ta` is left unchanged on error.
pub fn annotate_coherence<G: RelationLookup + ?Sized>(
    ta: &mut TextAnnotation,
    orchestrator: &DocumentOrchestrator<'_, G>,
    config: &CoherenceConfig,
) -> Result<AnnotationSummary> {
    let document = ta.document(&config.el_view, &config.candidate_map)?;
    let layer = orchestrator.process(&document)?;
    let changed = labels_changed(&document, &layer);
    ta.set_view(coherence_view(&config.coherence_view, &layer));
    Ok(AnnotationSummary {
        mentions: layer.len(),
        changed,
    })
}

/// Outcome of [`rerank_dir`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RerankRun {
    /// Files written.
    pub written: Vec<PathBuf>,
    /// Mentions re-ranked across written documents.
    pub mentions: usize,
    /// Labels changed across written documents.
    pub changed: usize,
    /// Documents that could not be read, re-ranked or written.
    pub failures: Vec<DocumentFailure>,
}

impl RerankRun {
    /// True when documents were found and every one of them failed.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.written.is_empty() && !self.failures.is_empty()
    }
}

/// Re-rank every document in `input` and write the results to `output`.
///
/// Documents are scored through [`DocumentOrchestrator::process_batch`].
/// Failures are per document: logged, recorded and skipped.
///
/// # Errors
///
/// Only when `input` cannot be listed.
pub fn rerank_dir<G: RelationLookup + ?Sized>(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    orchestrator: &DocumentOrchestrator<'_, G>,
    config: &CoherenceConfig,
) -> Result<RerankRun> {
    let output = output.as_ref();
    let mut run = RerankRun::default();

    let mut annotations = Vec::new();
    let mut documents = Vec::new();
    for (path, parsed) in annotation::read_dir(input)? {
        let extracted = parsed.and_then(|ta| {
            let document = ta.document(&config.el_view, &config.candidate_map)?;
            Ok((ta, document))
        });
        match extracted {
            Ok((ta, document)) => {
                annotations.push(ta);
                documents.push(document);
            }
            Err(e) => run.failures.push(failure(path.display().to_string(), &e)),
        }
    }

    let batch = orchestrator.process_batch(&documents);
    run.failures.extend(batch.failures);
    for result in batch.documents {
        let ta = &mut annotations[result.index];
        ta.set_view(coherence_view(&config.coherence_view, &result.mentions));
        match annotation::write_document(output, ta) {
            Ok(path) => {
                run.written.push(path);
                run.mentions += result.mentions.len();
                run.changed += result.changed;
            }
            Err(e) => run.failures.push(failure(result.doc_id, &e)),
        }
    }

    log::info!(
        "Re-ranked {} documents ({} mentions, {} changed), {} failed",
        run.written.len(),
        run.mentions,
        run.changed,
        run.failures.len()
    );
    Ok(run)
}

fn failure(doc_id: String, error: &Error) -> DocumentFailure {
    log::warn!("Skipping document '{}': {}", doc_id, error);
    DocumentFailure {
        doc_id,
        error: error.to_string(),
    }
}

/// Outcome of [`gold_dir`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoldRun {
    /// Files written.
    pub written: Vec<PathBuf>,
    /// Gold annotations attached across written documents.
    pub annotations: usize,
    /// Dataset documents that could not be read, aligned or written.
    pub failures: Vec<DocumentFailure>,
}

impl GoldRun {
    /// True when the dataset had documents and every one of them failed.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.written.is_empty() && !self.failures.is_empty()
    }
}

/// Attach NER and gold views to the tokenized documents of a WNED dataset.
///
/// For each dataset document, `input/<doc_name>` is read, its `tokenOffsets`
/// are used to align the gold annotations, and the result is written to
/// `output/<doc_name>` with its id set to the dataset name.
///
/// Every failure is per document; nothing aborts the run.
pub fn gold_dir(
    dataset: &[WnedDocument],
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> GoldRun {
    let (input, output) = (input.as_ref(), output.as_ref());
    let mut run = GoldRun::default();
    for doc in dataset {
        match attach_gold(doc, input, output) {
            Ok(path) => {
                run.written.push(path);
                run.annotations += doc.annotations.len();
            }
            Err(e) => run.failures.push(failure(doc.doc_name.clone(), &e)),
        }
    }
    log::info!(
        "Added gold views to {} documents ({} annotations), {} failed",
        run.written.len(),
        run.annotations,
        run.failures.len()
    );
    run
}

fn attach_gold(doc: &WnedDocument, input: &Path, output: &Path) -> Result<PathBuf> {
    let path = annotation::document_path(input, &doc.doc_name)?;
    let mut ta = TextAnnotation::from_json_str(&fs::read_to_string(&path)?)?;
    ta.id = doc.doc_name.clone();
    add_gold_views(&mut ta, &doc.annotations)?;
    annotation::write_document(output, &ta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Constituent, View};
    use crate::relation::RelationIndex;
    use serde_json::json;

    fn linked(id: &str) -> TextAnnotation {
        let mut ta = TextAnnotation::new(id, ["Paris", "and", "France"].map(String::from).to_vec());
        let mut paris = Constituent::new("Paris", "Paris", 0.9, 0, 1);
        paris.extra.insert("labelScoreMap".into(), json!({"Paris": 0.9, "Berlin": 0.1}));
        let mut france = Constituent::new("France", "Germany", 0.5, 2, 3);
        france.extra.insert("labelScoreMap".into(), json!({"Germany": 0.5, "France": 0.45}));
        ta.set_view(View::span_label("English_WIKIFIERVIEW", vec![paris, france]));
        ta
    }

    #[test]
    fn attaches_coherence_view() {
        let index = RelationIndex::from_triples([("Paris", "capital_of", "France")]);
        let orch = DocumentOrchestrator::new(&index);
        let mut ta = linked("d");
        let summary = annotate_coherence(&mut ta, &orch, &CoherenceConfig::default()).unwrap();
        assert_eq!(summary, AnnotationSummary { mentions: 2, changed: 1 });

        let view = ta.view("COHERENCE").unwrap();
        let labels: Vec<_> = view.constituents().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Paris", "France"]);
        assert_eq!(view.constituents()[1].start, 2);
    }

    #[test]
    fn failure_leaves_document_untouched() {
        let index = RelationIndex::from_triples([("A", "r", "B")]);
        let orch = DocumentOrchestrator::new(&index);
        let mut ta = TextAnnotation::new("bare", vec![]);
        let before = ta.clone();
        assert!(annotate_coherence(&mut ta, &orch, &CoherenceConfig::default()).is_err());
        assert_eq!(ta, before);
    }

    #[test]
    fn rerank_dir_isolates_failures() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        annotation::write_document(input.path(), &linked("good")).unwrap();
        annotation::write_document(input.path(), &TextAnnotation::new("no_views", vec![])).unwrap();
        std::fs::write(input.path().join("zz_corrupt"), "{not json").unwrap();

        let index = RelationIndex::from_triples([("Paris", "capital_of", "France")]);
        let run = rerank_dir(
            input.path(),
            output.path(),
            &DocumentOrchestrator::new(&index),
            &CoherenceConfig::default(),
        )
        .unwrap();

        assert_eq!(run.written, vec![output.path().join("good")]);
        assert_eq!(run.failures.len(), 2);
        assert_eq!(run.changed, 1);
        assert!(!run.all_failed());
    }

    fn tokenized(id: &str) -> TextAnnotation {
        let tokens = ["the", "Austrian", "army"].map(String::from).to_vec();
        let mut ta = TextAnnotation::new(id, tokens);
        ta.extra.insert(
            "tokenOffsets".into(),
            json!([
                {"form": "the", "startCharOffset": 0, "endCharOffset": 3},
                {"form": "Austrian", "startCharOffset": 4, "endCharOffset": 12},
                {"form": "army", "startCharOffset": 13, "endCharOffset": 17}
            ]),
        );
        ta
    }

    #[test]
    fn gold_dir_attaches_views_and_isolates_failures() {
        use crate::offset::{GoldAnnotation, GOLD_VIEW, NER_VIEW};

        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        annotation::write_document(input.path(), &tokenized("army")).unwrap();
        annotation::write_document(input.path(), &tokenized("short")).unwrap();
        let dataset = vec![
            WnedDocument {
                doc_name: "army".into(),
                annotations: vec![GoldAnnotation::new("Austria", "Austria", 4, 7)],
            },
            WnedDocument {
                doc_name: "missing".into(),
                annotations: vec![],
            },
            WnedDocument {
                doc_name: "short".into(),
                annotations: vec![GoldAnnotation::new("tail", "Tail", 15, 10)],
            },
        ];

        let run = gold_dir(&dataset, input.path(), output.path());
        assert_eq!(run.written, vec![output.path().join("army")]);
        assert_eq!(run.annotations, 1);
        let failed: Vec<&str> = run.failures.iter().map(|f| f.doc_id.as_str()).collect();
        assert_eq!(failed, vec!["missing", "short"]);
        assert!(!run.all_failed());

        let raw = fs::read_to_string(output.path().join("army")).unwrap();
        let ta = TextAnnotation::from_json_str(&raw).unwrap();
        let gold = ta.view(GOLD_VIEW).unwrap().constituents();
        assert_eq!((gold[0].start, gold[0].end), (1, 2));
        assert_eq!(gold[0].label, "Austria");
        assert_eq!(ta.view(NER_VIEW).unwrap().constituents()[0].label, "UNK");
    }
}
