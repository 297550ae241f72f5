//! Utility functions for CLI commands

use crate::config::CoherenceConfig;
use clap::Args;
use std::path::Path;

/// Format error message for display
pub fn format_error(operation: &str, details: &str) -> String {
    format!("ERROR: {} - {}", operation, details)
}

/// Load a config file, or the defaults when none is given
pub fn load_config(path: Option<&Path>) -> Result<CoherenceConfig, String> {
    match path {
        Some(p) => CoherenceConfig::from_file(p)
            .map_err(|e| format_error("load config", &e.to_string())),
        None => Ok(CoherenceConfig::default()),
    }
}

/// View-name flags shared by commands that read annotation documents
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// View holding the linker's mentions [default: English_WIKIFIERVIEW]
    #[arg(long, value_name = "VIEW")]
    pub el_view: Option<String>,

    /// Constituent key holding candidate scores [default: labelScoreMap]
    #[arg(long, value_name = "KEY")]
    pub candidate_map: Option<String>,

    /// View holding the re-ranked mentions [default: COHERENCE]
    #[arg(long, value_name = "VIEW")]
    pub coherence_view: Option<String>,
}

impl ViewArgs {
    /// Override config values with the flags that were given
    pub fn apply(&self, config: &mut CoherenceConfig) {
        if let Some(v) = &self.el_view {
            config.el_view.clone_from(v);
        }
        if let Some(v) = &self.candidate_map {
            config.candidate_map.clone_from(v);
        }
        if let Some(v) = &self.coherence_view {
            config.coherence_view.clone_from(v);
        }
    }
}
