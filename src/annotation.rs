//! Adapter for serialized TextAnnotation documents.
//!
//! Documents arrive as one JSON file per document, each holding the text,
//! its tokens, and a list of named *views* (token-span annotation layers):
//!
//! ```text
//! {
//!   "id": "Abraham_Lincoln",
//!   "tokens": ["Lincoln", "was", "born", ...],
//!   "views": [
//!     { "viewName": "English_WIKIFIERVIEW",
//!       "viewData": [ { "viewType": "...SpanLabelView",
//!                       "constituents": [
//!                         { "tokens": "Lincoln", "start": 0, "end": 1,
//!                           "label": "Abraham_Lincoln", "score": 0.7,
//!                           "labelScoreMap": { "Abraham_Lincoln": 0.7, ... } } ] } ] },
//!     { "viewName": "GOLD_WIKI_LABELS", ... }
//!   ]
//! }
//! ```
//!
//! Only the fields this crate needs are typed. Everything else (sentences,
//! token offsets, other views' payloads) rides along in `extra` maps, so a
//! document written back out loses nothing but gains a view.

use crate::error::{Error, Result};
use coherent_core::{CandidateMap, CoherenceMention, Document, Mention};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// `viewType` written for every span-label view this crate creates.
pub const SPAN_LABEL_VIEW: &str =
    "edu.illinois.cs.cogcomp.core.datastructures.textannotation.SpanLabelView";

/// `generator` written for views this crate creates.
pub const DEFAULT_GENERATOR: &str = "gold_annotation";

// =============================================================================
// JSON model
// =============================================================================

/// One serialized document with its annotation views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    /// Document id; also the file name it is written under.
    pub id: String,
    /// Token surface forms, when present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<String>,
    /// Annotation views.
    #[serde(default)]
    pub views: Vec<View>,
    /// Fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named annotation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    /// View name, e.g. `GOLD_WIKI_LABELS`.
    pub view_name: String,
    /// Payloads; span-label views carry exactly one.
    #[serde(default)]
    pub view_data: Vec<ViewData>,
    /// Fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The payload of a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewData {
    /// View name, repeated.
    pub view_name: String,
    /// View class name.
    #[serde(default)]
    pub view_type: String,
    /// Producer of the view.
    #[serde(default)]
    pub generator: String,
    /// View-level score.
    #[serde(default)]
    pub score: f64,
    /// Labeled spans.
    #[serde(default)]
    pub constituents: Vec<Constituent>,
    /// Fields this crate does not interpret (e.g. `relations`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A labeled token span inside a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constituent {
    /// Surface text of the span, when the producer wrote it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<String>,
    /// Label.
    pub label: String,
    /// Label score.
    #[serde(default)]
    pub score: f64,
    /// First token index.
    pub start: usize,
    /// One past the last token index.
    pub end: usize,
    /// Fields this crate does not interpret, including candidate maps.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Constituent {
    /// Create a constituent with no extra fields.
    #[must_use]
    pub fn new(
        tokens: impl Into<String>,
        label: impl Into<String>,
        score: f64,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            tokens: Some(tokens.into()),
            label: label.into(),
            score,
            start,
            end,
            extra: Map::new(),
        }
    }

    /// Read the candidate map stored under `key`.
    ///
    /// # Errors
    ///
    /// [`Error::Annotation`] when the key is absent or is not an object of
    /// numbers.
    pub fn candidate_map(&self, key: &str) -> Result<CandidateMap> {
        let raw = self.extra.get(key).ok_or_else(|| {
            Error::annotation(format!(
                "constituent [{}, {}) '{}' has no '{}'",
                self.start, self.end, self.label, key
            ))
        })?;
        CandidateMap::deserialize(raw).map_err(|e| {
            Error::annotation(format!(
                "constituent [{}, {}) has a malformed '{}': {}",
                self.start, self.end, key, e
            ))
        })
    }
}

impl From<&CoherenceMention> for Constituent {
    fn from(m: &CoherenceMention) -> Self {
        Constituent::new(m.tokens.clone(), m.label.clone(), m.score, m.start, m.end)
    }
}

// =============================================================================
// Views
// =============================================================================

impl View {
    /// Create a span-label view holding `constituents`.
    #[must_use]
    pub fn span_label(name: impl Into<String>, constituents: Vec<Constituent>) -> Self {
        let name = name.into();
        Self {
            view_name: name.clone(),
            view_data: vec![ViewData {
                view_name: name,
                view_type: SPAN_LABEL_VIEW.to_string(),
                generator: DEFAULT_GENERATOR.to_string(),
                score: 1.0,
                constituents,
                extra: Map::new(),
            }],
            extra: Map::new(),
        }
    }

    /// Constituents of the first payload (empty if there is none).
    #[must_use]
    pub fn constituents(&self) -> &[Constituent] {
        self.view_data
            .first()
            .map_or(&[], |data| data.constituents.as_slice())
    }
}

// =============================================================================
// TextAnnotation
// =============================================================================

impl TextAnnotation {
    /// Create an empty document.
    #[must_use]
    pub fn new(id: impl Into<String>, tokens: Vec<String>) -> Self {
        Self {
            id: id.into(),
            tokens,
            views: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Parse a document from JSON.
    ///
    /// # Errors
    ///
    /// [`Error::Json`] for invalid JSON or a missing required field.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty JSON rendering.
    ///
    /// # Errors
    ///
    /// [`Error::Json`] if a value cannot be serialized (non-finite scores).
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a view by name.
    #[must_use]
    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.view_name == name)
    }

    /// Look up a view by name, failing if it is absent.
    ///
    /// # Errors
    ///
    /// [`Error::MissingView`].
    pub fn require_view(&self, name: &str) -> Result<&View> {
        self.view(name)
            .ok_or_else(|| Error::missing_view(&self.id, name))
    }

    /// Replace the view with the same name, or append it.
    pub fn set_view(&mut self, view: View) {
        match self.views.iter_mut().find(|v| v.view_name == view.view_name) {
            Some(slot) => *slot = view,
            None => self.views.push(view),
        }
    }

    /// Text of tokens `[start, end)`, joined by spaces.
    #[must_use]
    pub fn span_text(&self, start: usize, end: usize) -> Option<String> {
        self.tokens.get(start..end).map(|toks| toks.join(" "))
    }

    /// Extract the mentions of view `view` as a [`Document`].
    ///
    /// Each constituent's candidates are read from `candidate_map`. A
    /// constituent without surface text gets it from the document tokens.
    ///
    /// # Errors
    ///
    /// [`Error::MissingView`] or [`Error::Annotation`] for a constituent with
    /// a missing or malformed candidate map.
    pub fn document(&self, view: &str, candidate_map: &str) -> Result<Document> {
        let view = self.require_view(view)?;
        let mentions = view
            .constituents()
            .iter()
            .map(|c| {
                let tokens = c
                    .tokens
                    .clone()
                    .or_else(|| self.span_text(c.start, c.end))
                    .unwrap_or_default();
                let candidates = c
                    .candidate_map(candidate_map)
                    .map_err(|e| Error::annotation(format!("document '{}': {}", self.id, e)))?;
                Ok(Mention::new(tokens, c.start, c.end, c.label.clone())
                    .with_score(c.score)
                    .with_candidates(candidates))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Document::new(self.id.clone(), mentions))
    }

    /// Labels of view `view` keyed by constituent start.
    ///
    /// # Errors
    ///
    /// [`Error::MissingView`].
    pub fn labels_by_start(&self, view: &str) -> Result<std::collections::HashMap<usize, &str>> {
        Ok(self
            .require_view(view)?
            .constituents()
            .iter()
            .map(|c| (c.start, c.label.as_str()))
            .collect())
    }
}

/// Build a span-label view from a coherence layer.
#[must_use]
pub fn coherence_view(name: &str, mentions: &[CoherenceMention]) -> View {
    View::span_label(name, mentions.iter().map(Constituent::from).collect())
}

// =============================================================================
// Directory IO
// =============================================================================

/// Read every regular file in `dir` as a document, in path order.
///
/// Each file gets its own result so one corrupt file does not hide the
/// rest. A directory entry that cannot be read is reported under `dir`'s
/// own path.
///
/// # Errors
///
/// Only when the directory itself cannot be listed.
pub fn read_dir(dir: impl AsRef<Path>) -> Result<Vec<(PathBuf, Result<TextAnnotation>)>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir)?.map(|entry| entry.map(|e| e.path()));
    Ok(read_entries(dir, entries))
}

fn read_entries(
    dir: &Path,
    entries: impl IntoIterator<Item = std::io::Result<PathBuf>>,
) -> Vec<(PathBuf, Result<TextAnnotation>)> {
    let mut results = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => {
                let parsed = fs::read_to_string(&path)
                    .map_err(Error::from)
                    .and_then(|json| TextAnnotation::from_json_str(&json));
                results.push((path, parsed));
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Unreadable entry in {}: {}", dir.display(), e);
                results.push((dir.to_path_buf(), Err(Error::from(e))));
            }
        }
    }
    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

/// Path of the document with id `id` inside `dir`.
///
/// # Errors
///
/// [`Error::Annotation`] for ids that are empty or would escape `dir`.
pub fn document_path(dir: &Path, id: &str) -> Result<PathBuf> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
        return Err(Error::annotation(format!(
            "document id '{id}' cannot be used as a file name"
        )));
    }
    Ok(dir.join(id))
}

/// Write one document into `dir` (created if needed), named by its id.
///
/// # Errors
///
/// IO/JSON errors, or an unusable id.
pub fn write_document(dir: impl AsRef<Path>, ta: &TextAnnotation) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = document_path(dir, &ta.id)?;
    fs::write(&path, ta.to_json_pretty()?)?;
    log::debug!("Wrote {}", path.display());
    Ok(path)
}

/// Write documents into `dir`, stopping at the first failure.
///
/// # Errors
///
/// See [`write_document`].
pub fn write_dir<'a>(
    dir: impl AsRef<Path>,
    docs: impl IntoIterator<Item = &'a TextAnnotation>,
) -> Result<Vec<PathBuf>> {
    docs.into_iter()
        .map(|ta| write_document(dir.as_ref(), ta))
        .collect()
}
