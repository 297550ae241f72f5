//! Error types for coherent-core.

use thiserror::Error;

/// Result type for coherent-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for coherent-core operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A mention reached scoring with an empty candidate map.
    #[error("Mention '{tokens}' [{start}, {end}) has no candidates")]
    NoCandidates {
        /// Surface text of the offending mention.
        tokens: String,
        /// Start token index.
        start: usize,
        /// End token index (exclusive).
        end: usize,
    },

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a no-candidates error for the given span.
    #[must_use]
    pub fn no_candidates(tokens: impl Into<String>, start: usize, end: usize) -> Self {
        Self::NoCandidates {
            tokens: tokens.into(),
            start,
            end,
        }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
