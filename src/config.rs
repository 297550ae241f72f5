//! Run configuration: view names, candidate-map key, strategy, relation table.
//!
//! Loaded from TOML; every field has a default so a config file only needs
//! the keys it changes:
//!
//! ```toml
//! relations = "data/relations.tsv"
//! el_view = "NEUREL"
//! candidate_map = "jointScoreMap"
//! strategy = "narrow"
//! ```

use crate::coherence::ContextStrategy;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default view holding the linker's mentions.
pub const DEFAULT_EL_VIEW: &str = "English_WIKIFIERVIEW";
/// Default constituent key holding the candidate map.
pub const DEFAULT_CANDIDATE_MAP: &str = "labelScoreMap";
/// Default name of the view written by re-ranking.
pub const DEFAULT_COHERENCE_VIEW: &str = "COHERENCE";
/// Default view holding gold labels.
pub const DEFAULT_GOLD_VIEW: &str = "GOLD_WIKI_LABELS";

/// Settings shared by the rerank and evaluate runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoherenceConfig {
    /// Relation table (TSV). Required for re-ranking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relations: Option<PathBuf>,
    /// View holding the linker's mentions.
    pub el_view: String,
    /// Constituent key holding the candidate map.
    pub candidate_map: String,
    /// View written by re-ranking.
    pub coherence_view: String,
    /// View holding gold labels.
    pub gold_view: String,
    /// Context strategy.
    pub strategy: ContextStrategy,
}

impl Default for CoherenceConfig {
    fn default() -> Self {
        Self {
            relations: None,
            el_view: DEFAULT_EL_VIEW.to_string(),
            candidate_map: DEFAULT_CANDIDATE_MAP.to_string(),
            coherence_view: DEFAULT_COHERENCE_VIEW.to_string(),
            gold_view: DEFAULT_GOLD_VIEW.to_string(),
            strategy: ContextStrategy::default(),
        }
    }
}

impl CoherenceConfig {
    /// Parse a TOML config.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for malformed TOML, unknown keys or bad values.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::config(e.to_string()))
    }

    /// Read a TOML config file.
    ///
    /// A relative `relations` path is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
        let mut config: Self = toml::from_str(&raw)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
        if let (Some(rel), Some(dir)) = (config.relations.as_mut(), path.parent()) {
            if rel.is_relative() {
                *rel = dir.join(&*rel);
            }
        }
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Set the relation table path.
    #[must_use]
    pub fn with_relations(mut self, path: impl Into<PathBuf>) -> Self {
        self.relations = Some(path.into());
        self
    }

    /// Set the context strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ContextStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Relation table path, or a config error when none is set.
    ///
    /// # Errors
    ///
    /// [`Error::Config`].
    pub fn require_relations(&self) -> Result<&Path> {
        self.relations.as_deref().ok_or_else(|| {
            Error::config("no relation table given (set `relations` or pass --relations)")
        })
    }
}
