//! Error types for coherent.

use thiserror::Error;

/// Result type for coherent operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for coherent operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Mention/candidate data error from the core types.
    #[error(transparent)]
    Core(#[from] coherent_core::Error),

    /// Malformed row in the relation table.
    #[error("Relation table line {line}: {reason}")]
    RelationTable {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the row.
        reason: String,
    },

    /// The relation table produced no edges.
    #[error("Relation table {0} contains no relations")]
    EmptyRelationTable(String),

    /// A required view is absent from an annotation document.
    #[error("Document '{doc}' has no view named '{view}'")]
    MissingView {
        /// Document id.
        doc: String,
        /// Requested view name.
        view: String,
    },

    /// Annotation document is structurally invalid.
    #[error("Annotation error: {0}")]
    Annotation(String),

    /// Dataset file (WNED XML) is malformed.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Evaluation error.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a relation table error.
    pub fn relation_table(line: usize, reason: impl Into<String>) -> Self {
        Error::RelationTable {
            line,
            reason: reason.into(),
        }
    }

    /// Create a missing view error.
    pub fn missing_view(doc: impl Into<String>, view: impl Into<String>) -> Self {
        Error::MissingView {
            doc: doc.into(),
            view: view.into(),
        }
    }

    /// Create an annotation error.
    pub fn annotation(msg: impl Into<String>) -> Self {
        Error::Annotation(msg.into())
    }

    /// Create a dataset error.
    pub fn dataset(msg: impl Into<String>) -> Self {
        Error::Dataset(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an evaluation error.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Error::Evaluation(msg.into())
    }
}
