//! Symmetric relation index over knowledge-base entity ids.
//!
//! The index is built once from a tab-separated triple table
//! (`head \t relation \t tail`, e.g. FB15k-237 mapped to Wikipedia titles)
//! and is read-only afterwards. Direction and relation label are discarded:
//! every triple becomes an undirected edge.
//!
//! ```text
//!   Paris   /location/capital_of   France
//!
//!   Paris  ──  France        related("Paris", "France")  == true
//!                            related("France", "Paris")  == true
//!                            related("Paris", "Narnia")  == false  (unknown id)
//! ```

use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read-only relatedness lookup.
///
/// This is the seam between the scorer and the relation source. Lookups for
/// ids the source has never seen must return `false`, not fail.
pub trait RelationLookup: Send + Sync {
    /// Whether `a` and `b` share at least one relation.
    fn related(&self, a: &str, b: &str) -> bool;
}

/// Immutable symmetric adjacency built from a relation triple table.
#[derive(Debug, Clone, Default)]
pub struct RelationIndex {
    adjacency: HashMap<String, HashSet<String>>,
    triples: usize,
}

impl RelationIndex {
    /// Load a relation table from a TSV file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, when a non-blank row has fewer
    /// than three tab-separated columns, or when the table holds no
    /// relations at all. There is no partial index: coherence is meaningless
    /// without the full table.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let index = Self::from_reader(BufReader::new(file))?;
        if index.is_empty() {
            return Err(Error::EmptyRelationTable(path.display().to_string()));
        }
        log::info!(
            "Loaded {} relations over {} entities from {}",
            index.triples,
            index.adjacency.len(),
            path.display()
        );
        Ok(index)
    }

    /// Build an index from TSV rows.
    ///
    /// Blank lines are skipped and columns past the third are ignored.
    ///
    /// # Errors
    ///
    /// IO errors from the reader, or [`Error::RelationTable`] for a short row.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut index = Self::default();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let row = line.trim();
            if row.is_empty() {
                continue;
            }
            let mut cols = row.split('\t');
            match (cols.next(), cols.next(), cols.next()) {
                (Some(head), Some(_relation), Some(tail)) => index.insert(head, tail),
                _ => {
                    return Err(Error::relation_table(
                        idx + 1,
                        format!("expected 3 tab-separated columns, got '{row}'"),
                    ))
                }
            }
        }
        Ok(index)
    }

    /// Build an index from `(head, relation, tail)` triples.
    pub fn from_triples<I, S>(triples: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: AsRef<str>,
    {
        let mut index = Self::default();
        for (head, _relation, tail) in triples {
            index.insert(head.as_ref(), tail.as_ref());
        }
        index
    }

    fn insert(&mut self, head: &str, tail: &str) {
        self.adjacency
            .entry(head.to_string())
            .or_default()
            .insert(tail.to_string());
        self.adjacency
            .entry(tail.to_string())
            .or_default()
            .insert(head.to_string());
        self.triples += 1;
    }

    /// Whether `b` is adjacent to `a`. Unknown ids are simply unrelated.
    #[must_use]
    pub fn related(&self, a: &str, b: &str) -> bool {
        self.adjacency.get(a).is_some_and(|set| set.contains(b))
    }

    /// Entities adjacent to `id`, in no particular order.
    pub fn neighbors<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.adjacency
            .get(id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Number of neighbors of `id` (0 for unknown ids).
    #[must_use]
    pub fn degree(&self, id: &str) -> usize {
        self.adjacency.get(id).map_or(0, HashSet::len)
    }

    /// Number of distinct entities that appear in any relation.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of triples read (duplicates included).
    #[must_use]
    pub fn triple_count(&self) -> usize {
        self.triples
    }

    /// True when no relation was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

impl RelationLookup for RelationIndex {
    fn related(&self, a: &str, b: &str) -> bool {
        RelationIndex::related(self, a, b)
    }
}

impl<T: RelationLookup + ?Sized> RelationLookup for &T {
    fn related(&self, a: &str, b: &str) -> bool {
        (**self).related(a, b)
    }
}

impl<T: RelationLookup + ?Sized> RelationLookup for std::sync::Arc<T> {
    fn related(&self, a: &str, b: &str) -> bool {
        (**self).related(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TABLE: &str = "Paris\t/location/capital_of\tFrance\n\
                         Berlin\t/location/capital_of\tGermany\n\
                         \n\
                         France\t/location/borders\tGermany\n";

    #[test]
    fn edges_are_symmetric() {
        let index = RelationIndex::from_reader(Cursor::new(TABLE)).unwrap();
        assert!(index.related("Paris", "France"));
        assert!(index.related("France", "Paris"));
        assert!(index.related("Germany", "France"));
        assert!(!index.related("Paris", "Germany"));
        assert_eq!(index.triple_count(), 3);
        assert_eq!(index.entity_count(), 4);
    }

    #[test]
    fn unknown_ids_are_unrelated() {
        let index = RelationIndex::from_reader(Cursor::new(TABLE)).unwrap();
        assert!(!index.related("Narnia", "Paris"));
        assert!(!index.related("Paris", "Narnia"));
        assert_eq!(index.degree("Narnia"), 0);
        assert_eq!(index.neighbors("Narnia").count(), 0);
    }

    #[test]
    fn relation_label_and_extra_columns_ignored() {
        let index =
            RelationIndex::from_reader(Cursor::new("A\tr1\tB\textra\tcols\nA\tr2\tB\n")).unwrap();
        assert_eq!(index.degree("A"), 1);
        assert_eq!(index.triple_count(), 2);
    }

    #[test]
    fn short_row_is_fatal() {
        let err = RelationIndex::from_reader(Cursor::new("A\tr\tB\nbroken row\n")).unwrap_err();
        match err {
            Error::RelationTable { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn load_missing_file_fails() {
        assert!(matches!(
            RelationIndex::load("/nonexistent/relations.tsv"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn load_empty_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.tsv");
        std::fs::write(&path, "\n\n").unwrap();
        assert!(matches!(
            RelationIndex::load(&path),
            Err(Error::EmptyRelationTable(_))
        ));
    }

    #[test]
    fn from_triples_matches_reader() {
        let index = RelationIndex::from_triples([("Paris", "r", "France")]);
        assert!(index.related("France", "Paris"));
        let mut neighbors: Vec<&str> = index.neighbors("Paris").collect();
        neighbors.sort_unstable();
        assert_eq!(neighbors, vec!["France"]);
    }

    #[test]
    fn self_loop_counts_once() {
        let index = RelationIndex::from_triples([("A", "r", "A")]);
        assert!(index.related("A", "A"));
        assert_eq!(index.degree("A"), 1);
    }
}
