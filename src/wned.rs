//! Reader for the WNED entity-linking datasets.
//!
//! WNED-Wikipedia and WNED-Clueweb list their gold mentions in a single XML
//! file, one `<document>` per raw text:
//!
//! ```xml
//! <wikipedia.entityAnnotation>
//!   <document docName="Alexander_Haig">
//!     <annotation>
//!       <mention>Haig</mention>
//!       <wikiName>Alexander Haig</wikiName>
//!       <offset>10</offset>
//!       <length>4</length>
//!     </annotation>
//!   </document>
//! </wikipedia.entityAnnotation>
//! ```
//!
//! Offsets and lengths are in characters of the raw text. Turning them into
//! token spans is [`crate::offset`]'s job; this module only reads them.

use crate::error::{Error, Result};
use crate::offset::GoldAnnotation;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;

/// Title used when an annotation has an empty `wikiName`.
pub const NIL_TITLE: &str = "NIL";

/// Gold mentions of one dataset document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WnedDocument {
    /// The `docName` attribute; also the name of the document's file.
    pub doc_name: String,
    /// Gold annotations, in file order.
    pub annotations: Vec<GoldAnnotation>,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Mention,
    WikiName,
    Offset,
    Length,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"mention" => Some(Self::Mention),
            b"wikiName" => Some(Self::WikiName),
            b"offset" => Some(Self::Offset),
            b"length" => Some(Self::Length),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct PendingAnnotation {
    mention: String,
    wiki_name: String,
    offset: String,
    length: String,
}

impl PendingAnnotation {
    fn push(&mut self, field: Field, text: &str) {
        let slot = match field {
            Field::Mention => &mut self.mention,
            Field::WikiName => &mut self.wiki_name,
            Field::Offset => &mut self.offset,
            Field::Length => &mut self.length,
        };
        slot.push_str(text);
    }

    fn finish(self, doc_name: &str) -> Result<GoldAnnotation> {
        let number = |name: &str, raw: &str| {
            raw.trim().parse::<usize>().map_err(|_| {
                Error::dataset(format!(
                    "document '{}', mention '{}': bad {} '{}'",
                    doc_name, self.mention, name, raw
                ))
            })
        };
        let offset = number("offset", &self.offset)?;
        let length = number("length", &self.length)?;
        let title = if self.wiki_name.trim().is_empty() {
            NIL_TITLE
        } else {
            self.wiki_name.as_str()
        };
        Ok(GoldAnnotation::new(self.mention.as_str(), title, offset, length))
    }
}

fn doc_name(start: &BytesStart<'_>) -> Result<String> {
    let attr = start
        .try_get_attribute("docName")
        .map_err(|e| Error::dataset(format!("bad document attributes: {}", e)))?
        .ok_or_else(|| Error::dataset("<document> without a docName attribute"))?;
    let value = attr
        .unescape_value()
        .map_err(|e| Error::dataset(format!("bad docName: {}", e)))?;
    Ok(value.into_owned())
}

/// Parse a WNED dataset file's contents.
///
/// Titles are trimmed and spaces become underscores; an empty `wikiName`
/// becomes [`NIL_TITLE`]. Unknown elements are ignored.
///
/// # Errors
///
/// [`Error::Dataset`] for malformed XML, a `<document>` without `docName`,
/// an `<annotation>` outside a document, or a non-numeric offset/length.
pub fn parse_str(xml: &str) -> Result<Vec<WnedDocument>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut documents = Vec::new();
    let mut current: Option<WnedDocument> = None;
    let mut pending: Option<PendingAnnotation> = None;
    let mut field: Option<Field> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::dataset(format!("XML error at byte {}: {}", reader.buffer_position(), e))
        })?;
        match event {
            Event::Start(start) => match start.name().as_ref() {
                b"document" => {
                    current = Some(WnedDocument {
                        doc_name: doc_name(&start)?,
                        annotations: Vec::new(),
                    });
                }
                b"annotation" => {
                    if current.is_none() {
                        return Err(Error::dataset("<annotation> outside a <document>"));
                    }
                    pending = Some(PendingAnnotation::default());
                }
                tag => field = Field::from_tag(tag),
            },
            Event::Empty(start) if start.name().as_ref() == b"document" => {
                documents.push(WnedDocument {
                    doc_name: doc_name(&start)?,
                    annotations: Vec::new(),
                });
            }
            Event::Text(text) => {
                if let (Some(f), Some(anno)) = (field, pending.as_mut()) {
                    let text = text
                        .unescape()
                        .map_err(|e| Error::dataset(format!("bad text: {}", e)))?;
                    anno.push(f, &text);
                }
            }
            Event::End(end) => match end.name().as_ref() {
                b"annotation" => {
                    if let (Some(anno), Some(doc)) = (pending.take(), current.as_mut()) {
                        let gold = anno.finish(&doc.doc_name)?;
                        doc.annotations.push(gold);
                    }
                }
                b"document" => {
                    if let Some(doc) = current.take() {
                        documents.push(doc);
                    }
                }
                _ => field = None,
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(documents)
}

/// Read a WNED dataset file.
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be read, otherwise see [`parse_str`].
pub fn load(path: impl AsRef<Path>) -> Result<Vec<WnedDocument>> {
    let path = path.as_ref();
    let xml = fs::read_to_string(path)?;
    let documents = parse_str(&xml)?;
    log::info!(
        "Loaded {} dataset documents ({} annotations) from {}",
        documents.len(),
        documents.iter().map(|d| d.annotations.len()).sum::<usize>(),
        path.display()
    );
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wikipedia.entityAnnotation>
  <document docName="Austrian_army">
    <annotation>
      <mention>Austria</mention>
      <wikiName> Austria Hungary </wikiName>
      <offset>4</offset>
      <length>7</length>
    </annotation>
    <annotation>
      <mention>AT&amp;T</mention>
      <wikiName/>
      <offset>23</offset>
      <length>4</length>
    </annotation>
  </document>
  <document docName="empty_doc"/>
  <document docName="second">
    <annotation>
      <mention>Paris</mention>
      <wikiName>Paris</wikiName>
      <offset>0</offset>
      <length>5</length>
    </annotation>
  </document>
</wikipedia.entityAnnotation>
"#;

    #[test]
    fn reads_documents_in_order() {
        let docs = parse_str(DATASET).unwrap();
        let names: Vec<&str> = docs.iter().map(|d| d.doc_name.as_str()).collect();
        assert_eq!(names, vec!["Austrian_army", "empty_doc", "second"]);
        assert_eq!(docs[0].annotations.len(), 2);
        assert!(docs[1].annotations.is_empty());
        assert_eq!(docs[2].annotations[0], GoldAnnotation::new("Paris", "Paris", 0, 5));
    }

    #[test]
    fn titles_are_normalized() {
        let docs = parse_str(DATASET).unwrap();
        let first = &docs[0].annotations[0];
        assert_eq!(first.mention, "Austria");
        assert_eq!(first.title, "Austria_Hungary");
        assert_eq!((first.char_start, first.char_end()), (4, 11));
    }

    #[test]
    fn empty_title_is_nil_and_text_is_unescaped() {
        let docs = parse_str(DATASET).unwrap();
        let second = &docs[0].annotations[1];
        assert_eq!(second.mention, "AT&T");
        assert_eq!(second.title, NIL_TITLE);
    }

    #[test]
    fn bad_offset_names_the_document() {
        let xml = r#"<root><document docName="d1"><annotation>
            <mention>x</mention><wikiName>X</wikiName>
            <offset>four</offset><length>1</length>
        </annotation></document></root>"#;
        let err = parse_str(xml).unwrap_err();
        assert!(matches!(err, Error::Dataset(_)));
        assert!(err.to_string().contains("d1"));
        assert!(err.to_string().contains("offset"));
    }

    #[test]
    fn document_without_name_is_an_error() {
        assert!(parse_str("<root><document></document></root>").is_err());
    }

    #[test]
    fn annotation_outside_document_is_an_error() {
        assert!(parse_str("<root><annotation></annotation></root>").is_err());
    }

    #[test]
    fn mismatched_tags_are_an_error() {
        assert!(parse_str("<root><document docName=\"d\"></root>").is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wikipedia.xml");
        fs::write(&path, DATASET).unwrap();
        assert_eq!(load(&path).unwrap().len(), 3);
    }
}
