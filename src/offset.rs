//! Character-offset to token-index alignment for gold mentions.
//!
//! Dataset annotations give a mention as a character offset and length,
//! while views index tokens. Most mentions line up with token boundaries,
//! but some gold mentions are stemmed relative to the text:
//!
//! ```text
//!   text     ...  the   Austrian   army  ...
//!                 │     │        │
//!   tokens        12    13       14
//!   chars         60    64       72
//!
//!   gold     "Austria" @64, len 7  → ends at 71, inside "Austrian"
//!   gold     "Test"    @105        → starts inside "non-Test"
//! ```
//!
//! A start that is not a token start snaps back to the closest token start
//! before it; an end that is not a token end snaps forward to the closest
//! token end after it. Both are binary searches over sorted boundaries, and
//! both give up (`None`) when there is nothing to snap to instead of
//! probing forever.

use crate::annotation::{Constituent, TextAnnotation, View};
use crate::error::{Error, Result};
use serde::Deserialize;

/// Name of the view holding unlabeled gold mention spans.
pub const NER_VIEW: &str = "NER";

/// Name of the view holding gold entity titles.
pub const GOLD_VIEW: &str = "GOLD_WIKI_LABELS";

/// Label used for mention spans in the NER view.
pub const UNKNOWN_LABEL: &str = "UNK";

/// Sorted token boundaries of one document.
#[derive(Debug, Clone, Default)]
pub struct TokenBoundaries {
    /// `(char_start, token_index)`, sorted by char offset.
    starts: Vec<(usize, usize)>,
    /// `(char_end, token_index)`, sorted by char offset.
    ends: Vec<(usize, usize)>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenOffset {
    start_char_offset: usize,
    end_char_offset: usize,
}

impl TokenBoundaries {
    /// Build from per-token `(char_start, char_end)` pairs, in token order.
    #[must_use]
    pub fn new(offsets: &[(usize, usize)]) -> Self {
        let mut starts: Vec<(usize, usize)> =
            offsets.iter().enumerate().map(|(i, (s, _))| (*s, i)).collect();
        let mut ends: Vec<(usize, usize)> =
            offsets.iter().enumerate().map(|(i, (_, e))| (*e, i)).collect();
        starts.sort_unstable();
        ends.sort_unstable();
        Self { starts, ends }
    }

    /// Read the `tokenOffsets` array of a serialized document.
    ///
    /// # Errors
    ///
    /// [`Error::Annotation`] when the field is missing or malformed.
    pub fn from_annotation(ta: &TextAnnotation) -> Result<Self> {
        let raw = ta.extra.get("tokenOffsets").ok_or_else(|| {
            Error::annotation(format!("document '{}' has no tokenOffsets", ta.id))
        })?;
        let offsets = Vec::<TokenOffset>::deserialize(raw).map_err(|e| {
            Error::annotation(format!("document '{}': malformed tokenOffsets: {}", ta.id, e))
        })?;
        let pairs: Vec<(usize, usize)> = offsets
            .iter()
            .map(|o| (o.start_char_offset, o.end_char_offset))
            .collect();
        Ok(Self::new(&pairs))
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// True when there are no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Token index for a mention starting at char `offset`.
    #[must_use]
    pub fn align_start(&self, offset: usize) -> Option<usize> {
        match self.starts.binary_search_by_key(&offset, |(c, _)| *c) {
            Ok(i) => Some(self.starts[i].1),
            Err(0) => None,
            Err(i) => Some(self.starts[i - 1].1),
        }
    }

    /// Exclusive token index for a mention ending at char `offset`.
    #[must_use]
    pub fn align_end(&self, offset: usize) -> Option<usize> {
        let i = match self.ends.binary_search_by_key(&offset, |(c, _)| *c) {
            Ok(i) => i,
            Err(i) if i < self.ends.len() => i,
            Err(_) => return None,
        };
        Some(self.ends[i].1 + 1)
    }

    /// Token span `[start, end)` for a char span, if both ends align.
    #[must_use]
    pub fn align(&self, char_start: usize, char_end: usize) -> Option<(usize, usize)> {
        let start = self.align_start(char_start)?;
        let end = self.align_end(char_end)?;
        (start < end).then_some((start, end))
    }
}

/// A gold mention as given by a dataset: char offset, length and title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldAnnotation {
    /// Mention surface text as the dataset spells it.
    pub mention: String,
    /// Knowledge-base title, spaces replaced by underscores.
    pub title: String,
    /// Char offset of the mention start.
    pub char_start: usize,
    /// Char length of the mention.
    pub char_len: usize,
}

impl GoldAnnotation {
    /// Create an annotation, normalizing the title (`" New York "` → `"New_York"`).
    #[must_use]
    pub fn new(
        mention: impl Into<String>,
        title: &str,
        char_start: usize,
        char_len: usize,
    ) -> Self {
        Self {
            mention: mention.into(),
            title: title.trim().replace(' ', "_"),
            char_start,
            char_len,
        }
    }

    /// Char offset one past the mention end.
    #[must_use]
    pub fn char_end(&self) -> usize {
        self.char_start + self.char_len
    }
}

/// Build the NER and gold views for a document's gold annotations.
///
/// Both views share the same spans; the NER view labels them
/// [`UNKNOWN_LABEL`], the gold view with the title.
///
/// # Errors
///
/// [`Error::Annotation`] naming the first annotation that cannot be aligned.
pub fn gold_views(
    annotations: &[GoldAnnotation],
    boundaries: &TokenBoundaries,
) -> Result<(View, View)> {
    let mut ner = Vec::with_capacity(annotations.len());
    let mut gold = Vec::with_capacity(annotations.len());
    for anno in annotations {
        let (start, end) = boundaries
            .align(anno.char_start, anno.char_end())
            .ok_or_else(|| {
                Error::annotation(format!(
                    "cannot align '{}' at chars [{}, {})",
                    anno.mention,
                    anno.char_start,
                    anno.char_end()
                ))
            })?;
        ner.push(Constituent::new(&anno.mention, UNKNOWN_LABEL, 1.0, start, end));
        gold.push(Constituent::new(&anno.mention, &anno.title, 1.0, start, end));
    }
    Ok((View::span_label(NER_VIEW, ner), View::span_label(GOLD_VIEW, gold)))
}

/// Attach NER and gold views to `ta`, aligning against its `tokenOffsets`.
///
/// # Errors
///
/// See [`TokenBoundaries::from_annotation`] and [`gold_views`].
pub fn add_gold_views(ta: &mut TextAnnotation, annotations: &[GoldAnnotation]) -> Result<()> {
    let boundaries = TokenBoundaries::from_annotation(ta)?;
    let (ner, gold) = gold_views(annotations, &boundaries)?;
    ta.set_view(ner);
    ta.set_view(gold);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// "the Austrian army near non-Test site"
    fn boundaries() -> TokenBoundaries {
        TokenBoundaries::new(&[(0, 3), (4, 12), (13, 17), (18, 22), (23, 31), (32, 36)])
    }

    #[test]
    fn exact_boundaries_map_directly() {
        let b = boundaries();
        assert_eq!(b.align_start(4), Some(1));
        assert_eq!(b.align_end(12), Some(2));
        assert_eq!(b.align(4, 17), Some((1, 3)));
    }

    #[test]
    fn stemmed_end_snaps_forward() {
        // "Austria" (len 7) inside "Austrian"
        assert_eq!(boundaries().align(4, 11), Some((1, 2)));
    }

    #[test]
    fn prefixed_start_snaps_back() {
        // "Test" inside "non-Test"
        assert_eq!(boundaries().align(27, 31), Some((4, 5)));
    }

    #[test]
    fn out_of_range_gives_none() {
        let b = boundaries();
        assert_eq!(b.align_end(40), None);
        let shifted = TokenBoundaries::new(&[(5, 8)]);
        assert_eq!(shifted.align_start(2), None);
        assert_eq!(TokenBoundaries::default().align(0, 1), None);
    }

    #[test]
    fn title_is_normalized() {
        let g = GoldAnnotation::new("New York", " New York City ", 10, 8);
        assert_eq!(g.title, "New_York_City");
        assert_eq!(g.char_end(), 18);
    }

    #[test]
    fn gold_views_share_spans() {
        let annos = vec![
            GoldAnnotation::new("Austria", "Austria", 4, 7),
            GoldAnnotation::new("army", "Army", 13, 4),
        ];
        let (ner, gold) = gold_views(&annos, &boundaries()).unwrap();
        assert_eq!(ner.view_name, NER_VIEW);
        assert_eq!(gold.view_name, GOLD_VIEW);
        let spans = |v: &View| {
            v.constituents()
                .iter()
                .map(|c| (c.start, c.end))
                .collect::<Vec<_>>()
        };
        assert_eq!(spans(&ner), vec![(1, 2), (2, 3)]);
        assert_eq!(spans(&ner), spans(&gold));
        assert!(ner.constituents().iter().all(|c| c.label == UNKNOWN_LABEL));
        assert_eq!(gold.constituents()[0].label, "Austria");
    }

    #[test]
    fn unalignable_annotation_is_an_error() {
        let annos = vec![GoldAnnotation::new("tail", "Tail", 34, 10)];
        assert!(gold_views(&annos, &boundaries()).is_err());
    }

    #[test]
    fn reads_token_offsets_from_document() {
        let ta = TextAnnotation::from_json_str(
            r#"{"id": "d", "tokens": ["the", "Austrian"],
                "tokenOffsets": [
                    {"form": "the", "startCharOffset": 0, "endCharOffset": 3},
                    {"form": "Austrian", "startCharOffset": 4, "endCharOffset": 12}
                ]}"#,
        )
        .unwrap();
        let mut ta = ta;
        add_gold_views(&mut ta, &[GoldAnnotation::new("Austria", "Austria", 4, 7)]).unwrap();
        let gold = ta.view(GOLD_VIEW).unwrap();
        assert_eq!(gold.constituents()[0].start, 1);
        assert_eq!(gold.constituents()[0].end, 2);
    }
}
