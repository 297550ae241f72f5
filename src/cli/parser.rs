//! CLI argument parsing and structure definitions

use clap::{Parser, Subcommand, ValueEnum};

use super::commands;

/// Relational coherence re-ranking for entity linking
#[derive(Parser, Debug)]
#[command(name = "coherent")]
#[command(
    author,
    version,
    about = "Relational coherence re-ranking for entity linking",
    long_about = r#"
coherent - re-rank entity linker candidates by document-level coherence

Every mention's candidates are re-scored by how many knowledge-base relations
they share with what the rest of the document mentions. A candidate with a
confident linker score keeps its label unless coherence clearly beats it.

CONTEXT STRATEGIES:
  • broad  (alias: cucerzan) - all candidates of the other mentions
  • narrow (alias: vinculum) - only the labels assigned to the other mentions

EXAMPLES:
  coherent rerank data/linked --relations fb15k.tsv --output data/coherent
  coherent evaluate data/coherent --brackets name2bracket.tsv
  coherent inspect --relations fb15k.tsv Paris France
  coherent gold wikipedia.xml data/tokenized --output data/gold
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a coherence view to every document in a directory
    #[command(visible_alias = "r")]
    Rerank(commands::RerankArgs),

    /// Bracket-averaged accuracy of the linker and coherence views
    #[command(visible_alias = "e", alias = "eval")]
    Evaluate(commands::EvaluateArgs),

    /// Relation table statistics and entity neighborhoods
    #[command(visible_alias = "i")]
    Inspect(commands::InspectArgs),

    /// Attach NER and gold views from a WNED dataset
    #[command(visible_alias = "g")]
    Gold(commands::GoldArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Report format for commands that print results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output (default)
    #[default]
    Human,
    /// Pretty-printed JSON
    Json,
}
